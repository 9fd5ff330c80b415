pub mod config;
pub mod console_mode;
pub mod error;
pub mod path_resolver;
pub mod rules;
mod telemetry;

mod app;

pub use app::*;
pub use error::{NativeError, Result};
