//! Post-processing argument logic
//!
//! Turns `--server` values into server descriptors.

use crate::errors::VariabilizerError;
use crate::variabilize::ServerDescriptor;

/// Check if a string has a valid URL scheme (e.g., "http://", "https://")
/// Per RFC 3986: scheme = ALPHA *( ALPHA / DIGIT / "+" / "-" / "." )
fn has_url_scheme(s: &str) -> bool {
    if let Some(pos) = s.find("://") {
        let scheme = &s[..pos];
        !scheme.is_empty()
            && scheme.chars().next().map(|c| c.is_ascii_alphabetic()).unwrap_or(false)
            && scheme.chars().skip(1).all(|c| c.is_ascii_alphanumeric() || c == '+' || c == '-' || c == '.')
    } else {
        false
    }
}

/// Parse one `--server` value: `URL` or `ENV=URL`
///
/// The text before the first `=` is an environment tag only when it looks
/// like an identifier, so URLs carrying `=` in a query are left intact.
pub fn parse_server_arg(value: &str) -> Result<ServerDescriptor, VariabilizerError> {
    let value = value.trim();

    if let Some((env, url)) = value.split_once('=') {
        let is_tag = !env.is_empty()
            && !has_url_scheme(env)
            && env.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if is_tag {
            if url.trim().is_empty() {
                return Err(VariabilizerError::Argument(format!(
                    "Missing URL for server environment '{}'", env
                )));
            }
            return Ok(ServerDescriptor::new(url.trim()).with_environment(env));
        }
    }

    if value.is_empty() {
        return Err(VariabilizerError::Argument("Empty --server value".to_string()));
    }

    Ok(ServerDescriptor::new(value))
}

/// Parse every `--server` value, failing on the first invalid one
pub fn process_servers(values: &[String]) -> Result<Vec<ServerDescriptor>, VariabilizerError> {
    values.iter().map(|v| parse_server_arg(v)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_url() {
        let server = parse_server_arg("https://api.example.com/v1").unwrap();
        assert_eq!(server.url, "https://api.example.com/v1");
        assert_eq!(server.environment, None);
    }

    #[test]
    fn test_env_prefixed_url() {
        let server = parse_server_arg("prod1=https://api.example.com/v1").unwrap();
        assert_eq!(server.url, "https://api.example.com/v1");
        assert_eq!(server.environment.as_deref(), Some("prod1"));
    }

    #[test]
    fn test_query_equals_not_treated_as_tag() {
        let server = parse_server_arg("https://api.example.com/v1?key=value").unwrap();
        assert_eq!(server.url, "https://api.example.com/v1?key=value");
        assert_eq!(server.environment, None);
    }

    #[test]
    fn test_invalid_values() {
        assert!(parse_server_arg("").is_err());
        assert!(parse_server_arg("dev1=").is_err());
    }
}
