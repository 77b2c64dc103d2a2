//! Foundation utilities: math types, logging, and frame timing

pub mod logging;
pub mod math;
pub mod time;

pub use math::{Color, Vec3};
pub use time::FrameTimer;
