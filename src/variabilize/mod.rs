//! Backend URL variabilization
//!
//! Given the backend server URLs declared for a proxy, decides whether they
//! vary across deployment environments and, if so, produces a single URL
//! template whose varying parts reference KVM-backed configuration variables,
//! together with the per-environment values of those variables.
//!
//! Three situations are handled, and may combine:
//!
//! 1. explicit `{name}` placeholders in the host or path: one variable per
//!    distinct placeholder, values left empty for the user to fill in
//! 2. hosts or paths that differ between environments: differing hosts are
//!    kept verbatim per environment, a differing path segment becomes one
//!    `path_segment` variable
//! 3. nothing varies: the first server's host and path are used as-is
//!
//! The computation is pure and never fails; unparseable URLs degrade to a
//! best-effort split.

mod compare;
mod environment;
mod session;
mod url;

pub use compare::{compare_urls, find_common_prefix, find_common_suffix, ComparisonResult};
pub use environment::{
    backfill_environment_values, default_detection_rules, is_prod_environment, match_environment,
    DetectionRule, DEFAULT_DETECTION_RULES, DEFAULT_ENVIRONMENTS,
};
pub use session::VariabilizationSession;
pub use url::{
    detect_template_variables, parse_url, ParsedUrl, TemplateVariable, UrlComponent,
    DEFAULT_PROTOCOL,
};

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Original name given to variables synthesized from a differing path
pub const PATH_SEGMENT_NAME: &str = "path_segment";

/// A backend endpoint declared for a proxy
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerDescriptor {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Environment this server was already classified as, if known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment: Option<String>,
}

impl ServerDescriptor {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_environment(mut self, environment: impl Into<String>) -> Self {
        self.environment = Some(environment.into());
        self
    }
}

/// One synthesized KVM configuration variable
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BackendInfoEntry {
    pub index: u32,
    /// External KVM key, derived from the index
    pub name: String,
    /// Placeholder name, or [`PATH_SEGMENT_NAME`]
    pub original_name: String,
    pub description: String,
    /// Value per environment; every configured environment is present
    pub values: IndexMap<String, String>,
}

/// Aggregate outcome of one variabilization run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VariabilizationResult {
    /// Host template shared by every environment, `None` when hosts differ
    pub variabilized_host: Option<String>,
    pub variabilized_path: String,
    pub kvm_entries: Vec<BackendInfoEntry>,
    /// Fully resolved host per environment
    pub resolved_hosts: IndexMap<String, String>,
    pub has_variabilization: bool,
}

impl Default for VariabilizationResult {
    fn default() -> Self {
        Self {
            variabilized_host: None,
            variabilized_path: "/".to_string(),
            kvm_entries: Vec::new(),
            resolved_hosts: IndexMap::new(),
            has_variabilization: false,
        }
    }
}

/// Tunables for [`Variabilizer`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VariabilizerSettings {
    /// Supported environments, in output order
    pub environments: Vec<String>,
    /// Ordered environment detection rules
    pub detection: Vec<DetectionRule>,
    /// Flow-variable scope the KVM values are read into
    pub reference_scope: String,
    /// Prefix of the KVM key, followed by the entry index
    pub variable_prefix: String,
}

impl Default for VariabilizerSettings {
    fn default() -> Self {
        Self {
            environments: DEFAULT_ENVIRONMENTS.iter().map(|e| e.to_string()).collect(),
            detection: default_detection_rules(),
            reference_scope: "private.".to_string(),
            variable_prefix: "backend_info_".to_string(),
        }
    }
}

/// Computes [`VariabilizationResult`]s for groups of servers
#[derive(Debug, Clone, Default)]
pub struct Variabilizer {
    settings: VariabilizerSettings,
}

impl Variabilizer {
    pub fn new(mut settings: VariabilizerSettings) -> Self {
        let defaults = VariabilizerSettings::default();
        if settings.environments.is_empty() {
            settings.environments = defaults.environments;
        }
        if settings.detection.is_empty() {
            settings.detection = defaults.detection;
        }

        // Rules may only resolve to configured environments
        let environments = &settings.environments;
        settings.detection.retain_mut(|rule| {
            match environments.iter().find(|e| e.eq_ignore_ascii_case(&rule.environment)) {
                Some(env) => {
                    rule.environment = env.clone();
                    true
                }
                None => {
                    debug!(environment = %rule.environment, "Dropping detection rule for unconfigured environment");
                    false
                }
            }
        });

        Self { settings }
    }

    pub fn settings(&self) -> &VariabilizerSettings {
        &self.settings
    }

    /// KVM key for an entry index (`backend_info_3`)
    pub fn variable_name(&self, index: u32) -> String {
        format!("{}{}", self.settings.variable_prefix, index)
    }

    /// Message-template reference to an entry (`{private.backend_info_3}`)
    pub fn reference(&self, index: u32) -> String {
        format!("{{{}{}}}", self.settings.reference_scope, self.variable_name(index))
    }

    /// Environment a server belongs to
    ///
    /// An explicit tag naming a configured environment is used as-is. Otherwise
    /// the tag, then the URL and description, are matched against the detection
    /// rules; with no match the first configured environment is assumed.
    pub fn environment_of(&self, server: &ServerDescriptor) -> String {
        let environments = &self.settings.environments;
        let rules = &self.settings.detection;

        if let Some(tag) = server.environment.as_deref() {
            if let Some(env) = environments.iter().find(|e| e.eq_ignore_ascii_case(tag)) {
                return env.clone();
            }
            if let Some(env) = match_environment(tag, rules) {
                return env.to_string();
            }
        }

        let text = match server.description.as_deref() {
            Some(desc) => format!("{} {}", server.url, desc),
            None => server.url.clone(),
        };

        match_environment(&text, rules)
            .map(str::to_string)
            .or_else(|| environments.first().cloned())
            .unwrap_or_default()
    }

    fn backfill(&self, partial: &IndexMap<String, String>) -> IndexMap<String, String> {
        backfill_environment_values(partial, &self.settings.environments)
    }

    /// Take the next index, or `None` once the `u32` range is used up
    fn allocate(
        &self,
        next_index: &mut Option<u32>,
        original_name: &str,
        description: String,
        values: IndexMap<String, String>,
    ) -> Option<BackendInfoEntry> {
        let Some(index) = *next_index else {
            warn!(original_name, "KVM index range exhausted, entry not allocated");
            return None;
        };
        *next_index = index.checked_add(1);
        debug!(index, original_name, "Allocated KVM entry");
        Some(BackendInfoEntry {
            index,
            name: self.variable_name(index),
            original_name: original_name.to_string(),
            description,
            values,
        })
    }

    /// Replace every `{name}` placeholder in `template` with a new KVM reference
    fn substitute_placeholders(
        &self,
        template: &str,
        names: &IndexSet<String>,
        component: UrlComponent,
        next_index: &mut Option<u32>,
        entries: &mut Vec<BackendInfoEntry>,
    ) -> String {
        let label = match component {
            UrlComponent::Host => "Host",
            UrlComponent::Path => "Path",
        };

        let mut rewritten = template.to_string();
        for name in names {
            let placeholder = format!("{{{}}}", name);
            if !template.contains(&placeholder) {
                warn!(
                    placeholder = %placeholder,
                    template,
                    "Placeholder not present in first server URL"
                );
            }
            let Some(entry) = self.allocate(
                next_index,
                name,
                format!("{} template variable {}", label, placeholder),
                self.backfill(&IndexMap::new()),
            ) else {
                continue;
            };
            rewritten = rewritten.replace(&placeholder, &self.reference(entry.index));
            entries.push(entry);
        }
        rewritten
    }

    /// Variabilize a group of servers, numbering new entries from `starting_index`
    pub fn variabilize(
        &self,
        servers: &[ServerDescriptor],
        starting_index: u32,
    ) -> VariabilizationResult {
        self.variabilize_from(servers, Some(starting_index)).0
    }

    /// Variabilize from a running index and return the index that follows the
    /// allocated entries (`None` when no index is left)
    pub(crate) fn variabilize_from(
        &self,
        servers: &[ServerDescriptor],
        mut next_index: Option<u32>,
    ) -> (VariabilizationResult, Option<u32>) {
        let Some(first_server) = servers.first() else {
            debug!("No servers to variabilize");
            return (VariabilizationResult::default(), next_index);
        };

        let first = parse_url(&first_server.url);
        let mut entries = Vec::new();

        // Explicit placeholders, union across servers in order of first appearance
        let mut host_names = IndexSet::new();
        let mut path_names = IndexSet::new();
        for server in servers {
            for var in detect_template_variables(&server.url) {
                match var.component {
                    UrlComponent::Host => host_names.insert(var.name),
                    UrlComponent::Path => path_names.insert(var.name),
                };
            }
        }

        let host_template = (!host_names.is_empty()).then(|| {
            self.substitute_placeholders(
                &first.authority(),
                &host_names,
                UrlComponent::Host,
                &mut next_index,
                &mut entries,
            )
        });

        let mut path_template = (!path_names.is_empty()).then(|| {
            self.substitute_placeholders(
                &first.path,
                &path_names,
                UrlComponent::Path,
                &mut next_index,
                &mut entries,
            )
        });

        let mut resolved_hosts = host_template.as_ref().map(|template| {
            self.settings
                .environments
                .iter()
                .map(|env| (env.clone(), template.clone()))
                .collect::<IndexMap<_, _>>()
        });

        let mut has_variabilization = !entries.is_empty();
        let mut hosts_differ = false;

        // Cross-environment differences
        if servers.len() > 1 {
            let tagged: Vec<(&str, String)> = servers
                .iter()
                .map(|s| (s.url.as_str(), self.environment_of(s)))
                .collect();
            let comparison = compare_urls(&tagged);

            if comparison.hosts_differ && host_template.is_none() {
                has_variabilization = true;
                hosts_differ = true;
                resolved_hosts = Some(self.backfill(&comparison.host_values));
            }

            if comparison.paths_differ && path_template.is_none() {
                has_variabilization = true;
                if let Some(entry) = self.allocate(
                    &mut next_index,
                    PATH_SEGMENT_NAME,
                    "Environment-specific path segment".to_string(),
                    self.backfill(&comparison.path_values),
                ) {
                    path_template = Some(format!(
                        "{}{}{}",
                        comparison.common_path_prefix,
                        self.reference(entry.index),
                        comparison.common_path_suffix
                    ));
                    entries.push(entry);
                }
            }
        }

        let resolved_hosts = resolved_hosts.unwrap_or_else(|| {
            let mut own = IndexMap::new();
            for server in servers {
                own.entry(self.environment_of(server))
                    .or_insert_with(|| parse_url(&server.url).authority());
            }
            self.backfill(&own)
        });

        let variabilized_host = match host_template {
            Some(template) => Some(template),
            None if hosts_differ || first.is_relative() => None,
            None => Some(first.authority()),
        };

        let result = VariabilizationResult {
            variabilized_host,
            variabilized_path: path_template.unwrap_or(first.path),
            kvm_entries: entries,
            resolved_hosts,
            has_variabilization,
        };

        debug!(
            servers = servers.len(),
            entries = result.kvm_entries.len(),
            has_variabilization = result.has_variabilization,
            path = %result.variabilized_path,
            "Variabilized servers"
        );

        (result, next_index)
    }
}

/// Variabilize with the default settings
///
/// # Examples
/// ```
/// use apigee_variabilizer::variabilize::{variabilize, ServerDescriptor};
///
/// let result = variabilize(&[ServerDescriptor::new("https://api.example.com/v1")], 1);
/// assert!(!result.has_variabilization);
/// assert_eq!(result.variabilized_path, "/v1");
/// ```
pub fn variabilize(servers: &[ServerDescriptor], starting_index: u32) -> VariabilizationResult {
    Variabilizer::default().variabilize(servers, starting_index)
}
