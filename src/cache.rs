//! Cache-proxy URL rewriting.
//!
//! Operators can front artifact downloads with a caching proxy keyed by
//! content hash. The proxy location is configured as a URL template; fetches
//! are rerouted through it by literal placeholder substitution.

use crate::checksum::Checksums;

pub const FILENAME_PLACEHOLDER: &str = "#filename#";
pub const ALGORITHM_PLACEHOLDER: &str = "#algorithm#";
pub const HASH_PLACEHOLDER: &str = "#hash#";

/// Rewrite `original` through the cache template, if one is configured.
///
/// The highest-preference declared checksum supplies the algorithm and hash.
/// Without a template, or without any checksum to key the cache on, the
/// original URL is returned unchanged. Placeholders missing from the
/// template are simply left alone.
pub fn substitute_cache_url(
    original: &str,
    name: &str,
    checksums: &Checksums,
    template: Option<&str>,
) -> String {
    let template = match template {
        Some(t) if !t.is_empty() => t,
        _ => return original.to_string(),
    };
    let (algorithm, hash) = match checksums.preferred() {
        Some(entry) => entry,
        None => return original.to_string(),
    };

    let rewritten = template
        .replace(FILENAME_PLACEHOLDER, name)
        .replace(ALGORITHM_PLACEHOLDER, algorithm.name())
        .replace(HASH_PLACEHOLDER, hash);
    tracing::debug!(%original, %rewritten, "fetch rerouted through cache");
    rewritten
}
