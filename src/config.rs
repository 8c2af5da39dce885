use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Global build configuration loaded from `~/.config/artifetch/config.toml`.
///
/// Passed immutably into every resolution call; fetches never consult
/// process-wide state, which keeps parallel resolution safe and tests
/// hermetic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildConfig {
    /// Directory where artifacts are materialized when the caller does not
    /// supply one explicitly.
    #[serde(default = "default_work_dir")]
    pub work_dir: PathBuf,
    /// TLS hostname and certificate verification for HTTPS fetches.
    /// Disabling applies to both direct and cache-rewritten URLs.
    #[serde(default = "default_ssl_verify")]
    pub ssl_verify: bool,
    /// Caching-proxy URL template with `#filename#`, `#algorithm#` and
    /// `#hash#` placeholders. Absent means fetch from the original URL.
    #[serde(default)]
    pub cache_url: Option<String>,
    /// Connect timeout in seconds (default 30).
    #[serde(default)]
    pub connect_timeout_secs: Option<u64>,
    /// Overall transfer timeout in seconds (default 3600).
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

fn default_work_dir() -> PathBuf {
    std::env::temp_dir().join("artifetch")
}

fn default_ssl_verify() -> bool {
    true
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            work_dir: default_work_dir(),
            ssl_verify: true,
            cache_url: None,
            connect_timeout_secs: None,
            timeout_secs: None,
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("artifetch")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<BuildConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = BuildConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)?;
    let cfg: BuildConfig = toml::from_str(&data)?;
    Ok(cfg)
}
