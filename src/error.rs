//! Error type shared by descriptor construction, fetching, and verification.

use crate::checksum::Algorithm;
use std::io;
use std::path::PathBuf;

/// Error raised while constructing or resolving a resource descriptor.
///
/// The three variants mirror the three failure classes of the resolution
/// layer: a malformed descriptor, a failed transfer, and content that does
/// not match its declared digest. `Io` wraps filesystem failures with the
/// operation that caused them.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    /// Malformed descriptor: no source kind, multiple source kinds, missing
    /// git ref, unknown checksum algorithm, or a malformed digest string.
    #[error("invalid descriptor: {0}")]
    Configuration(String),

    /// Git subprocess failure, non-200 HTTP status, or transport failure.
    #[error("fetch of {url} failed: {reason}")]
    Fetch { url: String, reason: String },

    /// Computed digest does not match the declared checksum. Fatal on a
    /// freshly fetched file; on a pre-existing file it only disables reuse.
    #[error(
        "checksum mismatch for {}: {algorithm} expected {expected}, computed {actual}",
        path.display()
    )]
    Integrity {
        path: PathBuf,
        algorithm: Algorithm,
        expected: String,
        actual: String,
    },

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },
}

impl ResolveError {
    pub fn config(reason: impl Into<String>) -> Self {
        ResolveError::Configuration(reason.into())
    }

    pub fn fetch(url: impl Into<String>, reason: impl Into<String>) -> Self {
        ResolveError::Fetch {
            url: url.into(),
            reason: reason.into(),
        }
    }

    pub fn io(context: impl Into<String>, source: io::Error) -> Self {
        ResolveError::Io {
            context: context.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_carry_full_context() {
        let err = ResolveError::Integrity {
            path: PathBuf::from("/work/file"),
            algorithm: Algorithm::Sha256,
            expected: "aa".into(),
            actual: "bb".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("/work/file"));
        assert!(msg.contains("sha256"));
        assert!(msg.contains("aa"));
        assert!(msg.contains("bb"));

        let err = ResolveError::fetch("http://host/a", "bad status code: 404");
        assert!(err.to_string().contains("http://host/a"));
        assert!(err.to_string().contains("404"));
    }

    #[test]
    fn io_errors_keep_their_source() {
        use std::error::Error;
        let err = ResolveError::io(
            "open /work/file",
            io::Error::new(io::ErrorKind::NotFound, "gone"),
        );
        assert!(err.source().is_some());
        assert!(err.to_string().starts_with("open /work/file"));
    }
}
