//! Common prefix/suffix computation and multi-URL comparison

use indexmap::{IndexMap, IndexSet};
use serde::Serialize;
use tracing::debug;

use super::url::parse_url;

/// Outcome of comparing the server URLs of several environments
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonResult {
    pub hosts_differ: bool,
    pub paths_differ: bool,
    pub common_host_prefix: String,
    pub common_host_suffix: String,
    pub common_path_prefix: String,
    pub common_path_suffix: String,
    /// Full host (with port) per environment, populated when hosts differ
    pub host_values: IndexMap<String, String>,
    /// Differing path fragment per environment, populated when paths differ
    pub path_values: IndexMap<String, String>,
}

/// Byte length of the longest common prefix of two strings, on a char boundary
fn shared_prefix_len(a: &str, b: &str) -> usize {
    a.char_indices()
        .zip(b.chars())
        .find(|((_, x), y)| x != y)
        .map(|((idx, _), _)| idx)
        .unwrap_or_else(|| a.len().min(b.len()))
}

/// Longest string that is a prefix of every value
///
/// # Examples
/// ```
/// use apigee_variabilizer::variabilize::find_common_prefix;
/// assert_eq!(find_common_prefix(&["abcxyz", "abcqrs"]), "abc");
/// assert_eq!(find_common_prefix(&["solo"]), "solo");
/// ```
pub fn find_common_prefix<S: AsRef<str>>(values: &[S]) -> String {
    let Some((first, rest)) = values.split_first() else {
        return String::new();
    };

    let first = first.as_ref();
    let len = rest
        .iter()
        .fold(first.len(), |len, other| shared_prefix_len(&first[..len], other.as_ref()));

    first[..len].to_string()
}

/// Longest string that is a suffix of every value
///
/// A single value has an empty common suffix.
///
/// # Examples
/// ```
/// use apigee_variabilizer::variabilize::find_common_suffix;
/// assert_eq!(find_common_suffix(&["abcxyz", "qrsxyz"]), "xyz");
/// assert_eq!(find_common_suffix(&["solo"]), "");
/// ```
pub fn find_common_suffix<S: AsRef<str>>(values: &[S]) -> String {
    if values.len() < 2 {
        return String::new();
    }

    let reversed: Vec<String> = values
        .iter()
        .map(|v| v.as_ref().chars().rev().collect())
        .collect();

    find_common_prefix(&reversed).chars().rev().collect()
}

/// Trim a common path prefix back to a `/` segment boundary.
///
/// The prefix is kept when every path continues with `/` (or ends) right after
/// it; otherwise it is cut just before its last `/`.
fn align_path_prefix(prefix: &str, paths: &[&str]) -> usize {
    let on_boundary = paths
        .iter()
        .all(|p| matches!(p[prefix.len()..].chars().next(), None | Some('/')));

    if on_boundary {
        prefix.len()
    } else {
        prefix.rfind('/').unwrap_or(0)
    }
}

/// Advance a common path suffix to start at a `/` segment boundary.
fn align_path_suffix(suffix: &str) -> &str {
    if suffix.is_empty() || suffix.starts_with('/') {
        return suffix;
    }
    match suffix.find('/') {
        Some(idx) => &suffix[idx..],
        None => "",
    }
}

/// Compare the URLs of several environments
///
/// Each item is `(url, environment)`. When more than one distinct host is
/// present, every environment's full host is recorded. When more than one
/// distinct path is present, the fragment of each path lying between the
/// common prefix and suffix is recorded. Both are aligned to `/` segments, and
/// the suffix is taken from what remains after the prefix so they never overlap.
/// When several URLs share one environment the first one wins.
pub fn compare_urls<U, E>(urls: &[(U, E)]) -> ComparisonResult
where
    U: AsRef<str>,
    E: AsRef<str>,
{
    let parsed: Vec<_> = urls
        .iter()
        .map(|(url, env)| (parse_url(url.as_ref()), env.as_ref()))
        .collect();

    let hosts: Vec<String> = parsed.iter().map(|(p, _)| p.authority()).collect();
    let paths: Vec<&str> = parsed.iter().map(|(p, _)| p.path.as_str()).collect();

    let hosts_differ = hosts.iter().collect::<IndexSet<_>>().len() > 1;
    let paths_differ = paths.iter().collect::<IndexSet<_>>().len() > 1;

    let mut result = ComparisonResult {
        hosts_differ,
        paths_differ,
        ..Default::default()
    };

    if hosts_differ {
        result.common_host_prefix = find_common_prefix(&hosts);
        result.common_host_suffix = find_common_suffix(&hosts);
        for ((_, env), host) in parsed.iter().zip(&hosts) {
            result
                .host_values
                .entry(env.to_string())
                .or_insert_with(|| host.clone());
        }
    }

    if paths_differ {
        let raw_prefix = find_common_prefix(&paths);
        let prefix_len = align_path_prefix(&raw_prefix, &paths);
        let remainders: Vec<&str> = paths.iter().map(|p| &p[prefix_len..]).collect();
        let raw_suffix = find_common_suffix(&remainders);
        let suffix = align_path_suffix(&raw_suffix);

        for ((_, env), remainder) in parsed.iter().zip(&remainders) {
            let fragment = &remainder[..remainder.len() - suffix.len()];
            result
                .path_values
                .entry(env.to_string())
                .or_insert_with(|| fragment.to_string());
        }

        result.common_path_prefix = raw_prefix[..prefix_len].to_string();
        result.common_path_suffix = suffix.to_string();
    }

    debug!(
        hosts_differ,
        paths_differ,
        path_prefix = %result.common_path_prefix,
        path_suffix = %result.common_path_suffix,
        "Compared server URLs"
    );

    result
}
