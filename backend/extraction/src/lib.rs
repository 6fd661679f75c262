pub mod encode;
pub mod normalize;
pub mod vision;

pub use encode::{encode_image, image_data_uri};
pub use normalize::{NormalizeError, normalize};
pub use vision::VisionClient;
