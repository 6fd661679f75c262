pub mod client;

pub use client::{ImageGenClient, build_prompt, parse_generation_response};
