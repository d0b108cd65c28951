//! Configuration loading

#[allow(clippy::module_inception)]
mod config;

pub use config::{Config, CONFIG_DIR_ENV, CONFIG_FILE_NAME};
