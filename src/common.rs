mod ard_box;
mod ard_detection;
mod ard_image;
mod detection_result;
mod inference_device;
mod model_config;
mod model_shape;

pub use ard_box::*;
pub use ard_detection::*;
pub use ard_image::*;
pub use detection_result::*;
pub use inference_device::*;
pub use model_config::*;
pub use model_shape::*;
