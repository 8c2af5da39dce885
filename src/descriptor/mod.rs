//! Resource descriptors: one declared external artifact each.
//!
//! A descriptor is built once from a parsed fragment (mapping with `name`,
//! one of `git`/`url`/`path`, and optional checksum fields) and consumed by
//! a single `resolve()` call that materializes the artifact and returns its
//! local path.

mod name;

use crate::cache;
use crate::checksum::Checksums;
use crate::config::BuildConfig;
use crate::error::ResolveError;
use crate::fetcher;
use serde_json::Value;
use std::path::{Path, PathBuf};

/// Where an artifact comes from. Exactly one kind per descriptor, enforced
/// at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    /// Repository checkout pinned to a branch, tag, or revision.
    Git { url: String, gitref: String },
    /// Plain http(s) download.
    Http { url: String },
    /// Reference to a local file or directory; never copied.
    Path { path: PathBuf },
}

/// One declared external artifact.
#[derive(Debug, Clone)]
pub struct ResourceDescriptor {
    /// Non-empty identifier; derived from the source when not declared.
    pub name: String,
    pub source: Source,
    pub checksums: Checksums,
}

fn string_field(obj: &serde_json::Map<String, Value>, key: &str) -> Result<Option<String>, ResolveError> {
    match obj.get(key) {
        None => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(ResolveError::config(format!(
            "artifact field '{}' must be a string",
            key
        ))),
    }
}

impl ResourceDescriptor {
    /// Build a descriptor from a parsed artifact fragment. Relative `path`
    /// sources are resolved against `base_dir` (the directory the descriptor
    /// document was declared in).
    pub fn from_value(value: &Value, base_dir: &Path) -> Result<Self, ResolveError> {
        let obj = value
            .as_object()
            .ok_or_else(|| ResolveError::config("artifact entry must be a mapping"))?;

        let git = obj.get("git");
        let url = string_field(obj, "url")?;
        let path = string_field(obj, "path")?;

        let kinds = [git.is_some(), url.is_some(), path.is_some()]
            .iter()
            .filter(|set| **set)
            .count();
        if kinds == 0 {
            return Err(ResolveError::config(
                "artifact defines no source; expected one of git, url, path",
            ));
        }
        if kinds > 1 {
            return Err(ResolveError::config(
                "artifact defines more than one source kind",
            ));
        }

        let source = if let Some(git) = git {
            let git = git
                .as_object()
                .ok_or_else(|| ResolveError::config("git source must be a mapping"))?;
            let url = string_field(git, "url")?
                .ok_or_else(|| ResolveError::config("git source requires a url"))?;
            let gitref = string_field(git, "ref")?
                .ok_or_else(|| ResolveError::config("git source requires a ref"))?;
            Source::Git { url, gitref }
        } else if let Some(url) = url {
            let parsed = url::Url::parse(&url)
                .map_err(|e| ResolveError::config(format!("invalid url '{}': {}", url, e)))?;
            match parsed.scheme() {
                "http" | "https" => {}
                other => {
                    return Err(ResolveError::config(format!(
                        "unsupported url scheme '{}' for artifact url '{}'",
                        other, url
                    )))
                }
            }
            Source::Http { url }
        } else {
            // kinds == 1, so `path` is the remaining source
            let path = PathBuf::from(path.unwrap_or_default());
            let path = if path.is_absolute() {
                path
            } else {
                base_dir.join(path)
            };
            Source::Path { path }
        };

        let checksums = Checksums {
            md5: string_field(obj, "md5")?,
            sha1: string_field(obj, "sha1")?,
            sha256: string_field(obj, "sha256")?,
        };
        checksums.validate()?;

        let name = match string_field(obj, "name")? {
            Some(name) => name,
            None => derive_name(&source)?,
        };
        if name.is_empty() {
            return Err(ResolveError::config("artifact name must not be empty"));
        }

        Ok(ResourceDescriptor {
            name,
            source,
            checksums,
        })
    }

    /// Deterministic destination for this artifact under `target_dir`.
    /// Git checkouts land in `<dir>/<repo>-<ref>`, downloads in
    /// `<dir>/<name>`; path sources are already local and keep their path.
    pub fn target_path(&self, target_dir: &Path) -> PathBuf {
        match &self.source {
            Source::Git { url, gitref } => {
                target_dir.join(format!("{}-{}", name::repo_base_name(url), gitref))
            }
            Source::Http { .. } => target_dir.join(&self.name),
            Source::Path { path } => path.clone(),
        }
    }

    /// Materialize the artifact under `target_dir` and return its path.
    ///
    /// A verified local copy is reused without touching the network; content
    /// without any declared checksum is always re-fetched since its
    /// integrity cannot be asserted. A freshly fetched file failing
    /// verification is an error even though the transfer succeeded.
    pub fn resolve(&self, target_dir: &Path, cfg: &BuildConfig) -> Result<PathBuf, ResolveError> {
        match &self.source {
            Source::Path { path } => Ok(path.clone()),
            Source::Git { url, gitref } => {
                let target = self.target_path(target_dir);
                if target.is_dir() {
                    tracing::debug!(artifact = %self.name, path = %target.display(),
                        "checkout already present");
                    return Ok(target);
                }
                fetcher::git::clone_shallow(url, gitref, &target)?;
                Ok(target)
            }
            Source::Http { url } => {
                let target = self.target_path(target_dir);
                if target.exists() && self.checksums.matches_any(&target) {
                    tracing::info!(artifact = %self.name, path = %target.display(),
                        "reusing verified local copy");
                    return Ok(target);
                }
                let effective = cache::substitute_cache_url(
                    url,
                    &self.name,
                    &self.checksums,
                    cfg.cache_url.as_deref(),
                );
                fetcher::http::download(&effective, &target, cfg)?;
                self.checksums.verify_all(&target)?;
                Ok(target)
            }
        }
    }
}

fn derive_name(source: &Source) -> Result<String, ResolveError> {
    match source {
        Source::Git { url, .. } => Ok(name::repo_base_name(url)),
        Source::Http { url } => name::filename_from_url(url).ok_or_else(|| {
            ResolveError::config(format!("cannot derive artifact name from url '{}'", url))
        }),
        Source::Path { path } => path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| {
                ResolveError::config(format!(
                    "cannot derive artifact name from path '{}'",
                    path.display()
                ))
            }),
    }
}

/// Build descriptors for every entry of a descriptor tree's `artifacts`
/// list. A tree without artifacts yields an empty list.
pub fn descriptors_from_tree(
    tree: &Value,
    base_dir: &Path,
) -> Result<Vec<ResourceDescriptor>, ResolveError> {
    let artifacts: &[Value] = match tree.get("artifacts") {
        None => &[],
        Some(Value::Array(entries)) => entries,
        Some(_) => return Err(ResolveError::config("'artifacts' must be a list")),
    };
    artifacts
        .iter()
        .map(|entry| ResourceDescriptor::from_value(entry, base_dir))
        .collect()
}
