//! Streamed HTTP(S) GET to a local file.
//!
//! The body is written sequentially to a `.part` sibling and renamed into
//! place only after the transfer succeeded, so a failed download never
//! leaves a plausible-looking artifact behind.

use crate::config::BuildConfig;
use crate::error::ResolveError;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Temporary file suffix used before the final rename.
pub const TEMP_SUFFIX: &str = ".part";

const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_TIMEOUT_SECS: u64 = 3600;

fn temp_path_for(dest: &Path) -> PathBuf {
    let mut os = dest.as_os_str().to_os_string();
    os.push(TEMP_SUFFIX);
    PathBuf::from(os)
}

/// TLS verification settings for one transfer. Peer certificate and
/// hostname verification are switched together by `ssl_verify`; the mode is
/// derived from the config alone, so direct and cache-rewritten URLs get
/// identical treatment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TlsMode {
    pub verify_peer: bool,
    pub verify_host: bool,
}

impl TlsMode {
    pub fn from_config(cfg: &BuildConfig) -> Self {
        Self {
            verify_peer: cfg.ssl_verify,
            verify_host: cfg.ssl_verify,
        }
    }

    fn apply(self, easy: &mut curl::easy::Easy) -> Result<(), curl::Error> {
        easy.ssl_verify_peer(self.verify_peer)?;
        easy.ssl_verify_host(self.verify_host)
    }
}

/// Download `url` into `dest`, overwriting any existing file.
///
/// TLS peer and hostname verification follow `cfg.ssl_verify`; this applies
/// identically whether `url` is the original or a cache-rewritten one. Only
/// status 200 counts as success. Redirects are followed by the transport.
pub fn download(url: &str, dest: &Path, cfg: &BuildConfig) -> Result<(), ResolveError> {
    let temp_path = temp_path_for(dest);
    let result = transfer(url, &temp_path, cfg);
    match result {
        Ok(()) => {
            fs::rename(&temp_path, dest).map_err(|e| {
                ResolveError::io(format!("finalize {}", dest.display()), e)
            })?;
            tracing::info!(%url, dest = %dest.display(), "downloaded artifact");
            Ok(())
        }
        Err(e) => {
            let _ = fs::remove_file(&temp_path);
            Err(e)
        }
    }
}

fn transfer(url: &str, temp_path: &Path, cfg: &BuildConfig) -> Result<(), ResolveError> {
    let mut file = File::create(temp_path)
        .map_err(|e| ResolveError::io(format!("create {}", temp_path.display()), e))?;

    let curl_err = |e: curl::Error| ResolveError::fetch(url, e.to_string());

    let mut easy = curl::easy::Easy::new();
    easy.url(url).map_err(curl_err)?;
    easy.follow_location(true).map_err(curl_err)?;
    easy.max_redirections(10).map_err(curl_err)?;
    TlsMode::from_config(cfg).apply(&mut easy).map_err(curl_err)?;
    easy.connect_timeout(Duration::from_secs(
        cfg.connect_timeout_secs.unwrap_or(DEFAULT_CONNECT_TIMEOUT_SECS),
    ))
    .map_err(curl_err)?;
    easy.timeout(Duration::from_secs(
        cfg.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS),
    ))
    .map_err(curl_err)?;

    let mut write_error: Option<std::io::Error> = None;
    {
        let mut transfer = easy.transfer();
        transfer
            .write_function(|data| match file.write_all(data) {
                Ok(()) => Ok(data.len()),
                Err(e) => {
                    write_error = Some(e);
                    Ok(0) // abort transfer
                }
            })
            .map_err(|e| ResolveError::fetch(url, e.to_string()))?;
        transfer
            .perform()
            .map_err(|e| ResolveError::fetch(url, e.to_string()))?;
    }

    if let Some(e) = write_error {
        return Err(ResolveError::io(
            format!("write {}", temp_path.display()),
            e,
        ));
    }

    let code = easy.response_code().map_err(curl_err)?;
    if code != 200 {
        return Err(ResolveError::fetch(url, format!("bad status code: {}", code)));
    }

    file.flush()
        .map_err(|e| ResolveError::io(format!("flush {}", temp_path.display()), e))?;
    Ok(())
}
