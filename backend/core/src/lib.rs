pub mod error;
pub mod types;

pub use error::{ExtractFailure, GenerateFailure};
pub use types::{DishRecord, ExtractionResult, GeneratedImageRef, PLACEHOLDER_DISH_NAME};
