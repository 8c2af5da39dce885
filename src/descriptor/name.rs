//! Artifact name derivation from source references.

/// Extracts the last path segment from a URL for use as an artifact name.
///
/// Returns `None` if the URL cannot be parsed or the path is empty/root.
pub fn filename_from_url(url: &str) -> Option<String> {
    let parsed = url::Url::parse(url).ok()?;
    let segment = parsed.path().split('/').filter(|s| !s.is_empty()).last()?;
    if segment == "." || segment == ".." {
        return None;
    }
    Some(segment.to_string())
}

/// Repository base name for a git URL: the last path segment with a trailing
/// `.git` stripped, or the URL itself when it has no path separators.
pub fn repo_base_name(url: &str) -> String {
    let tail = url
        .rsplit('/')
        .find(|s| !s.is_empty())
        .unwrap_or(url);
    tail.strip_suffix(".git").unwrap_or(tail).to_string()
}
