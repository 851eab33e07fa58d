mod class_names;
mod config_ort;
mod time_calc;
pub mod send_channels;

pub use class_names::{ClassNames, DOG_BREEDS};
pub use config_ort::{ConfigOrt, ModelSource};
pub use time_calc::{TimeCalc, TIMING_WINDOW};

pub use crate::detection_runners::ort_detector::input_wrapper::X;

pub(crate) const CROSS_MARK: &str = "❌";
