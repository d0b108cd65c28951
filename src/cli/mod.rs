//! CLI argument parsing and processing

pub mod args;
pub mod process;

// Re-exports
pub use args::{Args, LogFormat, OutputFormat, Shell};
pub use process::{parse_server_arg, process_servers};
