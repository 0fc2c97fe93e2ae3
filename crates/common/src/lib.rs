pub mod config;
pub mod errors;
pub mod logging;

pub use crate::config::AppConfig;
pub use crate::errors::{AppError, Result};
