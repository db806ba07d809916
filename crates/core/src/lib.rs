pub mod config;
pub mod error;
pub mod payload;
pub mod promotion;

pub use config::AppConfig;
pub use error::{PointPulseError, PointPulseResult};
