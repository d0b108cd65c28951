//! Rendering variabilization reports as JSON, YAML or a text summary

use std::fmt::Write;
use indexmap::IndexMap;
use serde::Serialize;
use crate::cli::OutputFormat;
use crate::errors::VariabilizerError;
use crate::openapi::{OpenApiSpec, ServerVariable};
use crate::variabilize::{ServerDescriptor, VariabilizationResult, Variabilizer};

/// A server as reported, with the environment it was classified as
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerReport {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub environment: String,
}

/// Outcome for one server group (one OpenAPI document or the `--server` list)
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupReport {
    /// Spec path, or `--server` for ad hoc servers
    pub source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub servers: Vec<ServerReport>,
    /// Declared server variables, hints for filling placeholder entries
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub variables: IndexMap<String, ServerVariable>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<VariabilizationResult>,
}

impl GroupReport {
    pub fn new(source: impl Into<String>, servers: &[ServerDescriptor], variabilizer: &Variabilizer) -> Self {
        Self {
            source: source.into(),
            title: None,
            version: None,
            description: None,
            servers: servers.iter().map(|s| ServerReport {
                url: s.url.clone(),
                description: s.description.clone(),
                environment: variabilizer.environment_of(s),
            }).collect(),
            variables: IndexMap::new(),
            result: None,
        }
    }

    /// Report for an OpenAPI document, carrying its info and server variables
    pub fn from_spec(source: impl Into<String>, spec: &OpenApiSpec, variabilizer: &Variabilizer) -> Self {
        let mut report = Self::new(source, &spec.server_descriptors(), variabilizer);
        report.title = Some(spec.title.clone());
        report.version = Some(spec.version.clone());
        report.description = spec.description.clone();
        report.variables = spec.server_variables();
        report
    }
}

/// Render reports in the requested format
pub fn render(reports: &[GroupReport], format: OutputFormat) -> Result<String, VariabilizerError> {
    match format {
        OutputFormat::Json => {
            let mut out = serde_json::to_string_pretty(reports)?;
            out.push('\n');
            Ok(out)
        }
        OutputFormat::Yaml => Ok(serde_yaml::to_string(reports)?),
        OutputFormat::Summary => Ok(render_summary(reports)),
    }
}

fn render_summary(reports: &[GroupReport]) -> String {
    let mut out = String::new();

    for (i, report) in reports.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }

        match (&report.title, &report.version) {
            (Some(title), Some(version)) => {
                let _ = writeln!(out, "{}: {} v{}", report.source, title, version);
            }
            (Some(title), None) => {
                let _ = writeln!(out, "{}: {}", report.source, title);
            }
            _ => {
                let _ = writeln!(out, "{}", report.source);
            }
        }
        if let Some(desc) = &report.description {
            let _ = writeln!(out, "  {}", desc.lines().next().unwrap_or_default());
        }

        let _ = writeln!(out, "  Servers ({}):", report.servers.len());
        for server in &report.servers {
            match &server.description {
                Some(desc) => {
                    let _ = writeln!(out, "    [{}] {} ({})", server.environment, server.url, desc);
                }
                None => {
                    let _ = writeln!(out, "    [{}] {}", server.environment, server.url);
                }
            }
        }

        let Some(result) = &report.result else {
            continue;
        };

        if !result.has_variabilization {
            let _ = writeln!(out, "  No variabilization needed");
        }
        if let Some(host) = &result.variabilized_host {
            let _ = writeln!(out, "  Host: {}", host);
        }
        let _ = writeln!(out, "  Path: {}", result.variabilized_path);

        if !result.resolved_hosts.is_empty() {
            let _ = writeln!(out, "  Resolved hosts:");
            for (env, host) in &result.resolved_hosts {
                let _ = writeln!(out, "    {:<10} {}", env, host);
            }
        }

        if !result.kvm_entries.is_empty() {
            let _ = writeln!(out, "  KVM entries ({}):", result.kvm_entries.len());
            for entry in &result.kvm_entries {
                let _ = writeln!(out, "    {} ({}): {}", entry.name, entry.original_name, entry.description);
                if let Some(var) = report.variables.get(&entry.original_name) {
                    let _ = writeln!(out, "      {:<10} {:?}", "default", var.default);
                    if !var.enum_values.is_empty() {
                        let _ = writeln!(out, "      {:<10} {}", "allowed", var.enum_values.join(", "));
                    }
                }
                for (env, value) in &entry.values {
                    let _ = writeln!(out, "      {:<10} {:?}", env, value);
                }
            }
        }
    }

    out
}
