//! OpenAPI/Swagger specification parser
//!
//! Supports both OpenAPI 2.0 (Swagger) and OpenAPI 3.x formats. Only the
//! document info and the declared servers are extracted.

use std::fs;
use std::path::Path;
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;
use crate::errors::VariabilizerError;
use crate::variabilize::ServerDescriptor;

/// Maximum spec file size (16 MB)
const MAX_SPEC_FILE_SIZE: u64 = 16 * 1024 * 1024;

/// Server extension carrying an already-known environment tag
const ENVIRONMENT_EXTENSION: &str = "x-environment";

/// Unified representation of an OpenAPI specification
#[derive(Debug, Clone)]
pub struct OpenApiSpec {
    /// API title
    pub title: String,
    /// API description
    pub description: Option<String>,
    /// API version
    pub version: String,
    /// Declared backend servers
    pub servers: Vec<Server>,
}

/// Server information
#[derive(Debug, Clone)]
pub struct Server {
    pub url: String,
    pub description: Option<String>,
    pub environment: Option<String>,
    pub variables: IndexMap<String, ServerVariable>,
}

/// Server variable for templated URLs
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServerVariable {
    pub default: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "enum", skip_serializing_if = "Vec::is_empty")]
    pub enum_values: Vec<String>,
}

impl OpenApiSpec {
    /// Servers in the form the variabilizer consumes
    pub fn server_descriptors(&self) -> Vec<ServerDescriptor> {
        self.servers.iter().map(ServerDescriptor::from).collect()
    }

    /// Declared server variables across all servers; the first declaration of
    /// a name wins
    pub fn server_variables(&self) -> IndexMap<String, ServerVariable> {
        let mut variables = IndexMap::new();
        for server in &self.servers {
            for (name, var) in &server.variables {
                variables.entry(name.clone()).or_insert_with(|| var.clone());
            }
        }
        variables
    }
}

impl From<&Server> for ServerDescriptor {
    fn from(server: &Server) -> Self {
        ServerDescriptor {
            url: server.url.clone(),
            description: server.description.clone(),
            environment: server.environment.clone(),
        }
    }
}

/// Parse an OpenAPI specification from a file
pub fn parse_spec(path: &Path) -> Result<OpenApiSpec, VariabilizerError> {
    // Check file size
    let metadata = fs::metadata(path)?;

    if metadata.len() > MAX_SPEC_FILE_SIZE {
        return Err(VariabilizerError::Argument(format!(
            "OpenAPI spec file too large: {} bytes (max {} bytes)",
            metadata.len(), MAX_SPEC_FILE_SIZE
        )));
    }

    let content = fs::read_to_string(path)?;

    // Detect format and parse
    let value: Value = if path.extension().map_or(false, |e| e == "yaml" || e == "yml") {
        serde_yaml::from_str(&content)
            .map_err(|e| VariabilizerError::OpenApi(format!("Failed to parse YAML: {}", e)))?
    } else if path.extension().map_or(false, |e| e == "json") {
        serde_json::from_str(&content)
            .map_err(|e| VariabilizerError::OpenApi(format!("Failed to parse JSON: {}", e)))?
    } else {
        // Try JSON first, then YAML
        serde_json::from_str(&content)
            .or_else(|_| serde_yaml::from_str(&content))
            .map_err(|e| VariabilizerError::OpenApi(format!("Failed to parse spec: {}", e)))?
    };

    parse_spec_value(&value)
}

/// Parse an already-deserialized specification document
pub fn parse_spec_value(value: &Value) -> Result<OpenApiSpec, VariabilizerError> {
    // Detect OpenAPI version
    if value.get("openapi").is_some() {
        parse_openapi_3(value)
    } else if value.get("swagger").is_some() {
        parse_swagger_2(value)
    } else {
        Err(VariabilizerError::OpenApi(
            "Unknown spec format: missing 'openapi' or 'swagger' field".to_string()
        ))
    }
}

/// Title, description and version from the `info` object
fn parse_info(value: &Value) -> Result<(String, Option<String>, String), VariabilizerError> {
    let info = value.get("info")
        .ok_or_else(|| VariabilizerError::OpenApi("Missing 'info' field".to_string()))?;

    let title = info.get("title")
        .and_then(|v| v.as_str())
        .unwrap_or("Untitled API")
        .to_string();

    let description = info.get("description")
        .and_then(|v| v.as_str())
        .map(|s| s.to_string());

    let version = info.get("version")
        .and_then(|v| v.as_str())
        .unwrap_or("1.0.0")
        .to_string();

    Ok((title, description, version))
}

/// Parse OpenAPI 3.x specification
fn parse_openapi_3(value: &Value) -> Result<OpenApiSpec, VariabilizerError> {
    let (title, description, version) = parse_info(value)?;

    Ok(OpenApiSpec {
        title,
        description,
        version,
        servers: parse_servers_v3(value.get("servers")),
    })
}

/// Parse Swagger 2.0 specification
fn parse_swagger_2(value: &Value) -> Result<OpenApiSpec, VariabilizerError> {
    let (title, description, version) = parse_info(value)?;

    // Build server URL from host, basePath, schemes
    Ok(OpenApiSpec {
        title,
        description,
        version,
        servers: parse_servers_v2(value),
    })
}

/// Parse servers from OpenAPI 3.x
fn parse_servers_v3(servers: Option<&Value>) -> Vec<Server> {
    let Some(servers) = servers.and_then(|s| s.as_array()) else {
        return Vec::new();
    };

    servers.iter().filter_map(|s| {
        let url = s.get("url")?.as_str()?.trim().to_string();
        if url.is_empty() {
            return None;
        }
        let description = s.get("description").and_then(|d| d.as_str()).map(|s| s.to_string());
        let environment = s.get(ENVIRONMENT_EXTENSION).and_then(|e| e.as_str()).map(|s| s.to_string());

        let mut variables = IndexMap::new();
        if let Some(vars) = s.get("variables").and_then(|v| v.as_object()) {
            for (name, var) in vars {
                if let Some(default) = var.get("default").and_then(|d| d.as_str()) {
                    variables.insert(name.clone(), ServerVariable {
                        default: default.to_string(),
                        description: var.get("description").and_then(|d| d.as_str()).map(|s| s.to_string()),
                        enum_values: var.get("enum")
                            .and_then(|e| e.as_array())
                            .map(|arr| arr.iter().filter_map(|v| v.as_str().map(|s| s.to_string())).collect())
                            .unwrap_or_default(),
                    });
                }
            }
        }

        Some(Server { url, description, environment, variables })
    }).collect()
}

/// Parse servers from Swagger 2.0
///
/// Without a `host` the servers are relative to the `basePath`.
fn parse_servers_v2(value: &Value) -> Vec<Server> {
    let base_path = value.get("basePath")
        .and_then(|b| b.as_str())
        .unwrap_or("");

    let Some(host) = value.get("host").and_then(|h| h.as_str()) else {
        if base_path.is_empty() {
            return Vec::new();
        }
        return vec![Server {
            url: base_path.to_string(),
            description: None,
            environment: None,
            variables: IndexMap::new(),
        }];
    };

    let schemes = value.get("schemes")
        .and_then(|s| s.as_array())
        .map(|arr| arr.iter().filter_map(|v| v.as_str()).collect::<Vec<_>>())
        .filter(|schemes| !schemes.is_empty())
        .unwrap_or_else(|| vec!["https"]);

    schemes.into_iter().map(|scheme| {
        Server {
            url: format!("{}://{}{}", scheme, host, base_path),
            description: None,
            environment: None,
            variables: IndexMap::new(),
        }
    }).collect()
}
