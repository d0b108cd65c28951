//! Deployment environments: keyword detection and value back-filling

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Environments a proxy is deployed to, in output order
pub const DEFAULT_ENVIRONMENTS: [&str; 4] = ["dev1", "uat1", "staging", "prod1"];

/// Ordered keyword table used to classify a server URL.
///
/// Rules are evaluated top to bottom and the first keyword hit wins, so
/// `preprod` resolves to staging before the prod rule is consulted.
pub const DEFAULT_DETECTION_RULES: &[(&str, &[&str])] = &[
    ("dev1", &["dev", "development", "sandbox"]),
    ("uat1", &["uat", "test", "qa"]),
    ("staging", &["stag", "preprod"]),
    ("prod1", &["prod", "production", "live"]),
];

/// One environment detection rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectionRule {
    pub environment: String,
    pub keywords: Vec<String>,
}

/// Build the owned form of [`DEFAULT_DETECTION_RULES`]
pub fn default_detection_rules() -> Vec<DetectionRule> {
    DEFAULT_DETECTION_RULES
        .iter()
        .map(|(env, keywords)| DetectionRule {
            environment: env.to_string(),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
        })
        .collect()
}

/// Whether an environment identifier denotes production
pub fn is_prod_environment(environment: &str) -> bool {
    environment.to_ascii_lowercase().contains("prod")
}

/// Classify free text (URL, description, loose tag) against the rule table
///
/// Returns `None` when no keyword matches.
pub fn match_environment<'a>(text: &str, rules: &'a [DetectionRule]) -> Option<&'a str> {
    let text = text.to_ascii_lowercase();
    rules
        .iter()
        .find(|rule| {
            rule.keywords
                .iter()
                .any(|kw| text.contains(&kw.to_ascii_lowercase()))
        })
        .map(|rule| rule.environment.as_str())
}

/// Fill every missing environment slot from a prod and a non-prod representative
///
/// The prod representative is the first non-empty value whose environment id
/// contains `prod`; the non-prod representative is the first non-empty value of
/// any other environment. Missing prod-like environments receive the prod
/// representative, the rest receive the non-prod one. When one side has no
/// representative the other side's value is used, and when neither exists the
/// slot is left empty.
///
/// Values already present are never overwritten. The result follows the order
/// of `environments`; keys outside that list are kept after it.
///
/// # Examples
/// ```
/// use indexmap::IndexMap;
/// use apigee_variabilizer::variabilize::backfill_environment_values;
///
/// let mut partial = IndexMap::new();
/// partial.insert("dev1".to_string(), "/dev".to_string());
/// partial.insert("prod1".to_string(), "/prod".to_string());
///
/// let envs = ["dev1", "uat1", "staging", "prod1"];
/// let filled = backfill_environment_values(&partial, &envs);
/// assert_eq!(filled["uat1"], "/dev");
/// assert_eq!(filled["staging"], "/dev");
/// assert_eq!(filled["prod1"], "/prod");
/// ```
pub fn backfill_environment_values<S: AsRef<str>>(
    partial: &IndexMap<String, String>,
    environments: &[S],
) -> IndexMap<String, String> {
    let prod = representative(partial, true);
    let non_prod = representative(partial, false);

    let mut filled = IndexMap::with_capacity(environments.len().max(partial.len()));

    for env in environments {
        let env = env.as_ref();
        let value = match partial.get(env) {
            Some(value) => value.as_str(),
            None if is_prod_environment(env) => prod.or(non_prod).unwrap_or_default(),
            None => non_prod.or(prod).unwrap_or_default(),
        };
        filled.insert(env.to_string(), value.to_string());
    }

    for (env, value) in partial {
        if !filled.contains_key(env) {
            filled.insert(env.clone(), value.clone());
        }
    }

    filled
}

fn representative(partial: &IndexMap<String, String>, prod: bool) -> Option<&str> {
    partial
        .iter()
        .find(|(env, value)| is_prod_environment(env) == prod && !value.is_empty())
        .map(|(_, value)| value.as_str())
}
