pub mod decoder;
pub mod direction;
pub mod motion_detector;
pub mod preprocessor;
pub mod region;
