use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{CryptarError, CryptarResult};

/// Top-level configuration (loaded from config.toml)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CryptarConfig {
    pub log: LogConfig,
    pub crypto: CryptoConfig,
    pub archive: ArchiveConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Log level filter (default: warn)
    pub level: String,
    /// Log format: "json" or "text"
    pub format: String,
}

/// Key derivation settings.
///
/// The cost is not recorded in the archive: an archive sealed with the
/// interactive preset (or custom overrides) must be opened with the same.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CryptoConfig {
    /// Use the low-cost interactive preset instead of the archival one
    pub interactive: bool,
    /// Argon2id memory cost override in KiB
    pub argon2_mem_cost_kib: Option<u32>,
    /// Argon2id time cost override
    pub argon2_time_cost: Option<u32>,
    /// Argon2id parallelism override
    pub argon2_parallelism: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ArchiveConfig {
    /// zstd compression level for packed bundles (default: 19)
    pub compression_level: i32,
    /// Output path for `pack` when none is given
    pub pack_output: PathBuf,
    /// Output path for `unpack` when none is given
    pub unpack_output: PathBuf,
    /// Output path for `extract` when none is given
    pub extract_output: PathBuf,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "warn".into(),
            format: "text".into(),
        }
    }
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            compression_level: 19,
            pack_output: PathBuf::from("files.enc"),
            unpack_output: PathBuf::from("."),
            extract_output: PathBuf::from("files.tar.zst"),
        }
    }
}

impl CryptarConfig {
    /// Load configuration from `path`, falling back to defaults if it does
    /// not exist.
    pub fn load(path: &Path) -> CryptarResult<Self> {
        if !path.exists() {
            tracing::debug!("config file not found: {}  (using defaults)", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| CryptarError::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }
}

/// `$XDG_CONFIG_HOME/cryptar/config.toml`, else `~/.config/cryptar/config.toml`.
pub fn default_config_path() -> PathBuf {
    let base = std::env::var_os("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|| std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".config")))
        .unwrap_or_else(|| PathBuf::from("."));
    base.join("cryptar").join("config.toml")
}
