//! Placeholder-safe URL splitting
//!
//! Server URLs taken from OpenAPI documents routinely carry `{name}` template
//! placeholders. Generic URL parsers percent-encode `{` and `}`, which corrupts
//! those placeholders, so URLs are split by hand here:
//!
//! - a leading `/` means a relative URL: the whole string is the path
//! - otherwise an optional `scheme://` prefix is stripped and the remainder is
//!   split on the first `/`; everything before it is the host, the rest is the path
//! - a trailing numeric `:port` on the host is split off
//!
//! IPv6 literals, userinfo, query strings and fragments are not recognised and
//! produce best-effort splits.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

/// Default protocol when a URL has none
pub const DEFAULT_PROTOCOL: &str = "https";

/// Template placeholder regex (`{name}`)
static TEMPLATE_VAR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\{([^}]+)\}").expect("Invalid template variable regex")
});

/// URL component a template variable was found in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UrlComponent {
    Host,
    Path,
}

/// A `{name}` placeholder found inside a URL
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TemplateVariable {
    /// Bare variable name, without braces
    pub name: String,
    /// Character offset of the opening brace within its component
    pub offset: usize,
    pub component: UrlComponent,
}

/// A URL decomposed without touching its placeholders
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedUrl {
    /// Scheme without `://` (empty for relative URLs)
    pub protocol: String,
    /// Host without port (empty for relative URLs)
    pub host: String,
    pub port: Option<u16>,
    pub path: String,
    pub host_variables: Vec<TemplateVariable>,
    pub path_variables: Vec<TemplateVariable>,
}

impl ParsedUrl {
    /// Host with its explicit port, if any (`api.example.com:8443`)
    pub fn authority(&self) -> String {
        match self.port {
            Some(port) => format!("{}:{}", self.host, port),
            None => self.host.clone(),
        }
    }

    /// Whether this URL had no host component
    pub fn is_relative(&self) -> bool {
        self.host.is_empty()
    }
}

/// Raw components produced by the manual split
struct UrlParts<'a> {
    protocol: Option<&'a str>,
    host: &'a str,
    port: Option<u16>,
    path: &'a str,
}

fn split_url(url: &str) -> UrlParts<'_> {
    let url = url.trim();

    if url.starts_with('/') {
        return UrlParts { protocol: None, host: "", port: None, path: url };
    }

    let (protocol, rest) = match url.split_once("://") {
        // Only a scheme when `://` comes before any path separator
        Some((scheme, rest)) if !scheme.contains('/') => (Some(scheme), rest),
        _ => (None, url),
    };

    let (authority, path) = match rest.find('/') {
        Some(idx) => (&rest[..idx], &rest[idx..]),
        None => (rest, ""),
    };

    let (host, port) = split_port(authority);

    UrlParts { protocol, host, port, path }
}

/// Split a trailing numeric `:port` off a host. Non-numeric suffixes such as
/// `:{port}` stay in the host so their placeholders are still detected.
fn split_port(authority: &str) -> (&str, Option<u16>) {
    if let Some((host, port)) = authority.rsplit_once(':') {
        if !port.is_empty() && port.chars().all(|c| c.is_ascii_digit()) {
            if let Ok(port) = port.parse::<u16>() {
                return (host, Some(port));
            }
        }
    }
    (authority, None)
}

fn scan_component(text: &str, component: UrlComponent) -> Vec<TemplateVariable> {
    TEMPLATE_VAR_RE
        .captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let name = caps.get(1)?;
            Some(TemplateVariable {
                name: name.as_str().to_string(),
                offset: text[..whole.start()].chars().count(),
                component,
            })
        })
        .collect()
}

/// Find every `{name}` placeholder in a URL, host occurrences first
///
/// # Examples
/// ```
/// use apigee_variabilizer::variabilize::{detect_template_variables, UrlComponent};
///
/// let vars = detect_template_variables("https://api-{env}.example.com/{version}/users");
/// assert_eq!(vars.len(), 2);
/// assert_eq!(vars[0].name, "env");
/// assert_eq!(vars[0].component, UrlComponent::Host);
/// assert_eq!(vars[1].name, "version");
/// assert_eq!(vars[1].component, UrlComponent::Path);
/// ```
pub fn detect_template_variables(url: &str) -> Vec<TemplateVariable> {
    let parts = split_url(url);
    let mut vars = scan_component(parts.host, UrlComponent::Host);
    vars.extend(scan_component(parts.path, UrlComponent::Path));
    vars
}

/// Decompose a URL into protocol, host, port and path
///
/// # Examples
/// ```
/// use apigee_variabilizer::variabilize::parse_url;
///
/// let parsed = parse_url("api.example.com:8443/v1");
/// assert_eq!(parsed.protocol, "https");
/// assert_eq!(parsed.host, "api.example.com");
/// assert_eq!(parsed.port, Some(8443));
/// assert_eq!(parsed.path, "/v1");
/// ```
pub fn parse_url(url: &str) -> ParsedUrl {
    let parts = split_url(url);
    let relative = parts.host.is_empty() && parts.protocol.is_none();

    let protocol = match parts.protocol {
        Some(p) if !p.is_empty() => p.to_ascii_lowercase(),
        _ if relative => String::new(),
        _ => DEFAULT_PROTOCOL.to_string(),
    };

    let path = if parts.path.is_empty() { "/" } else { parts.path };

    ParsedUrl {
        protocol,
        host: parts.host.to_string(),
        port: parts.port,
        path: path.to_string(),
        host_variables: scan_component(parts.host, UrlComponent::Host),
        path_variables: scan_component(path, UrlComponent::Path),
    }
}
