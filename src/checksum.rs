//! Checksum computation and verification for declared artifacts.
//!
//! Digests are computed in fixed-size chunks to keep memory use bounded;
//! suitable for large files. Comparison against declared digests is
//! case-insensitive, mismatches carry the full context needed for reporting.

use crate::error::ResolveError;
use md5::Md5;
use serde::{Deserialize, Serialize};
use sha1::Sha1;
use sha2::{Digest, Sha256};
use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;

const BUF_SIZE: usize = 64 * 1024;

/// Supported digest algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Algorithm {
    Md5,
    Sha1,
    Sha256,
}

/// Preference order used wherever exactly one digest must be chosen
/// (e.g. cache-URL substitution). Strongest first, as an explicit list
/// rather than relying on any map iteration order.
pub const PREFERENCE: [Algorithm; 3] = [Algorithm::Sha256, Algorithm::Sha1, Algorithm::Md5];

impl Algorithm {
    pub fn name(self) -> &'static str {
        match self {
            Algorithm::Md5 => "md5",
            Algorithm::Sha1 => "sha1",
            Algorithm::Sha256 => "sha256",
        }
    }

    /// Length of a well-formed hex digest for this algorithm.
    pub fn hex_len(self) -> usize {
        match self {
            Algorithm::Md5 => 32,
            Algorithm::Sha1 => 40,
            Algorithm::Sha256 => 64,
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Algorithm {
    type Err = ResolveError;

    /// Unknown algorithm names are a configuration error, not an integrity error.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "md5" => Ok(Algorithm::Md5),
            "sha1" => Ok(Algorithm::Sha1),
            "sha256" => Ok(Algorithm::Sha256),
            other => Err(ResolveError::config(format!(
                "unsupported checksum algorithm: {}",
                other
            ))),
        }
    }
}

fn digest_reader<D: Digest>(mut reader: impl Read) -> std::io::Result<String> {
    let mut hasher = D::new();
    let mut buf = [0u8; BUF_SIZE];
    loop {
        let n = reader.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hex::encode(hasher.finalize()))
}

/// Compute the digest of a file and return it as lowercase hex.
pub fn digest_path(path: &Path, algorithm: Algorithm) -> Result<String, ResolveError> {
    let file =
        File::open(path).map_err(|e| ResolveError::io(format!("open {}", path.display()), e))?;
    let result = match algorithm {
        Algorithm::Md5 => digest_reader::<Md5>(file),
        Algorithm::Sha1 => digest_reader::<Sha1>(file),
        Algorithm::Sha256 => digest_reader::<Sha256>(file),
    };
    result.map_err(|e| ResolveError::io(format!("read {}", path.display()), e))
}

/// Verify a file against an expected digest. Comparison is case-insensitive;
/// a mismatch reports path, algorithm, expected and computed values.
pub fn verify(path: &Path, algorithm: Algorithm, expected: &str) -> Result<(), ResolveError> {
    let actual = digest_path(path, algorithm)?;
    if actual.eq_ignore_ascii_case(expected) {
        tracing::debug!(path = %path.display(), %algorithm, "checksum verified");
        Ok(())
    } else {
        Err(ResolveError::Integrity {
            path: path.to_path_buf(),
            algorithm,
            expected: expected.to_ascii_lowercase(),
            actual,
        })
    }
}

/// Declared checksums of one artifact. Any subset of the supported
/// algorithms may be present.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checksums {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub md5: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sha1: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sha256: Option<String>,
}

impl Checksums {
    pub fn is_empty(&self) -> bool {
        self.md5.is_none() && self.sha1.is_none() && self.sha256.is_none()
    }

    pub fn get(&self, algorithm: Algorithm) -> Option<&str> {
        match algorithm {
            Algorithm::Md5 => self.md5.as_deref(),
            Algorithm::Sha1 => self.sha1.as_deref(),
            Algorithm::Sha256 => self.sha256.as_deref(),
        }
    }

    /// Declared entries in preference order, strongest first.
    pub fn entries(&self) -> impl Iterator<Item = (Algorithm, &str)> + '_ {
        PREFERENCE
            .iter()
            .filter_map(move |&a| self.get(a).map(|d| (a, d)))
    }

    /// The highest-preference declared entry, if any.
    pub fn preferred(&self) -> Option<(Algorithm, &str)> {
        self.entries().next()
    }

    /// Reject digests that are not well-formed hex of the algorithm's length.
    pub fn validate(&self) -> Result<(), ResolveError> {
        for (algorithm, digest) in self.entries() {
            let well_formed =
                digest.len() == algorithm.hex_len() && digest.chars().all(|c| c.is_ascii_hexdigit());
            if !well_formed {
                return Err(ResolveError::config(format!(
                    "malformed {} digest: {}",
                    algorithm, digest
                )));
            }
        }
        Ok(())
    }

    /// Whether an existing local file may be reused: at least one entry is
    /// declared and every declared entry verifies. An unreadable file or any
    /// failing entry disables reuse.
    pub fn matches_any(&self, path: &Path) -> bool {
        if self.is_empty() {
            return false;
        }
        self.entries()
            .all(|(algorithm, digest)| match verify(path, algorithm, digest) {
                Ok(()) => true,
                Err(e) => {
                    tracing::debug!(path = %path.display(), %algorithm, "local copy not reusable: {}", e);
                    false
                }
            })
    }

    /// Verify every declared entry, failing on the first mismatch.
    pub fn verify_all(&self, path: &Path) -> Result<(), ResolveError> {
        for (algorithm, digest) in self.entries() {
            verify(path, algorithm, digest)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn file_with(content: &[u8]) -> tempfile::NamedTempFile {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(content).unwrap();
        f.flush().unwrap();
        f
    }

    #[test]
    fn sha256_empty_file() {
        let f = tempfile::NamedTempFile::new().unwrap();
        let digest = digest_path(f.path(), Algorithm::Sha256).unwrap();
        assert_eq!(
            digest,
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn known_digests_per_algorithm() {
        let f = file_with(b"hello\n");
        assert_eq!(
            digest_path(f.path(), Algorithm::Sha256).unwrap(),
            "5891b5b522d5df086d0ff0b110fbd9d21bb4fc7163af34d08286a2e846f6be03"
        );
        assert_eq!(
            digest_path(f.path(), Algorithm::Sha1).unwrap(),
            "f572d396fae9206628714fb2ce00f72e94f2258f"
        );
        assert_eq!(
            digest_path(f.path(), Algorithm::Md5).unwrap(),
            "b1946ac92492d2347c6235b4d2611184"
        );
    }

    #[test]
    fn verify_is_case_insensitive() {
        let f = file_with(b"hello\n");
        verify(f.path(), Algorithm::Md5, "B1946AC92492D2347C6235B4D2611184").unwrap();
    }

    #[test]
    fn verify_mismatch_reports_context() {
        let f = file_with(b"hello\n");
        let err = verify(f.path(), Algorithm::Md5, "0".repeat(32).as_str()).unwrap_err();
        match err {
            ResolveError::Integrity {
                algorithm, actual, ..
            } => {
                assert_eq!(algorithm, Algorithm::Md5);
                assert_eq!(actual, "b1946ac92492d2347c6235b4d2611184");
            }
            other => panic!("expected integrity error, got {}", other),
        }
    }

    #[test]
    fn unknown_algorithm_is_configuration_error() {
        let err = "crc32".parse::<Algorithm>().unwrap_err();
        assert!(matches!(err, ResolveError::Configuration(_)));
    }

    #[test]
    fn preferred_follows_priority_order() {
        let all = Checksums {
            md5: Some("a".into()),
            sha1: Some("b".into()),
            sha256: Some("c".into()),
        };
        assert_eq!(all.preferred(), Some((Algorithm::Sha256, "c")));

        let weaker = Checksums {
            md5: Some("a".into()),
            sha1: Some("b".into()),
            sha256: None,
        };
        assert_eq!(weaker.preferred(), Some((Algorithm::Sha1, "b")));
        assert_eq!(Checksums::default().preferred(), None);
    }

    #[test]
    fn matches_any_requires_all_present_entries_to_pass() {
        let f = file_with(b"hello\n");
        let good = Checksums {
            md5: Some("b1946ac92492d2347c6235b4d2611184".into()),
            sha1: None,
            sha256: None,
        };
        assert!(good.matches_any(f.path()));

        // one good entry plus one bad entry: reuse is disallowed
        let mixed = Checksums {
            md5: Some("b1946ac92492d2347c6235b4d2611184".into()),
            sha1: None,
            sha256: Some("0".repeat(64)),
        };
        assert!(!mixed.matches_any(f.path()));

        assert!(!Checksums::default().matches_any(f.path()));
    }

    #[test]
    fn validate_rejects_malformed_digests() {
        let short = Checksums {
            md5: Some("123456".into()),
            sha1: None,
            sha256: None,
        };
        assert!(matches!(
            short.validate(),
            Err(ResolveError::Configuration(_))
        ));

        let non_hex = Checksums {
            md5: None,
            sha1: None,
            sha256: Some("z".repeat(64)),
        };
        assert!(non_hex.validate().is_err());

        let ok = Checksums {
            md5: None,
            sha1: None,
            sha256: Some(
                "5891b5b522d5df086d0ff0b110fbd9d21bb4fc7163af34d08286a2e846f6be03".into(),
            ),
        };
        ok.validate().unwrap();
    }
}
