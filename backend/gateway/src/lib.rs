pub mod server;

pub use server::{GatewayState, build_router, start_server};
