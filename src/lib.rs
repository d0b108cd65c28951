//! apigee-variabilizer library interface
//!
//! Turns the per-environment backend server URLs of an API proxy into one
//! URL template backed by Key-Value-Map variables.
//!
//! # Module Organization
//!
//! - [`variabilize`] - URL splitting, comparison, environment back-fill and the
//!   variabilizer itself
//! - [`openapi`] - Server extraction from OpenAPI 3.x / Swagger 2.0 documents
//! - [`config`] - `config.toml` loading
//! - [`errors`] - Error types (VariabilizerError, Result)
//! - [`report`] - JSON/YAML/summary rendering
//! - [`status`] - Exit status codes (ExitStatus)
//! - [`core`] - CLI execution logic

pub mod cli;
pub mod config;
pub mod core;
pub mod errors;
pub mod openapi;
pub mod report;
pub mod status;
pub mod variabilize;

pub use errors::{Result, VariabilizerError};
pub use variabilize::{
    variabilize, BackendInfoEntry, ServerDescriptor, VariabilizationResult,
    VariabilizationSession, Variabilizer, VariabilizerSettings,
};
