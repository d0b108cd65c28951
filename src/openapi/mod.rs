//! OpenAPI/Swagger server ingestion

mod parser;

pub use parser::{parse_spec, parse_spec_value, OpenApiSpec, Server, ServerVariable};
