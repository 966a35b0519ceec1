//! Configuration file and home directory layout
//!
//! ```text
//! ~/.solizard/
//!   config.toml          rpc_url, private_key, chain_id, wait_time_secs
//!   contract_infos.json  address book
//!   chains_mini.json     chain names and native currencies
//!   abis/                *.abi / *.json interface files
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use color_eyre::eyre::{bail, Result, WrapErr};
use serde::{Deserialize, Serialize};
use solizard::Settings;

/// `config.toml`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rpc_url: Option<String>,

    /// Kept as loaded on write-back; keys typed during a session never land here
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub private_key: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chain_id: Option<u64>,

    /// Seconds to wait for a transaction to be mined before fetching its receipt
    #[serde(default = "default_wait_time_secs")]
    pub wait_time_secs: u64,

    /// Older duration form (`"5s"`, `"1m30s"`); takes precedence when present
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wait_time: Option<String>,
}

fn default_wait_time_secs() -> u64 {
    5
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            rpc_url: None,
            private_key: None,
            chain_id: None,
            wait_time_secs: default_wait_time_secs(),
            wait_time: None,
        }
    }
}

impl ConfigFile {
    /// Load from a specific path
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .wrap_err_with(|| format!("Failed to read {}", path.display()))?;
        let config: Self = toml::from_str(&content)
            .wrap_err_with(|| format!("Invalid config file {}", path.display()))?;
        if let Some(wait_time) = &config.wait_time {
            if parse_duration(wait_time).is_none() {
                bail!(
                    "Invalid config file {}: wait_time {:?} is not a duration",
                    path.display(),
                    wait_time
                );
            }
        }
        Ok(config)
    }

    /// Load from `path`, or defaults when the file does not exist
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Save to a specific path
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .wrap_err_with(|| format!("Failed to create {}", parent.display()))?;
        }

        let content = toml::to_string_pretty(self).wrap_err("Failed to serialize config")?;
        std::fs::write(path, content)
            .wrap_err_with(|| format!("Failed to write {}", path.display()))?;

        Ok(())
    }

    /// Whether the file carries anything worth applying to a session
    pub fn has_session_values(&self) -> bool {
        self.rpc_url.is_some() || self.private_key.is_some() || self.chain_id.is_some()
    }

    pub fn to_settings(&self) -> Settings {
        Settings {
            rpc_url: self.rpc_url.clone(),
            private_key: self.private_key.clone(),
            chain_id: self.chain_id,
        }
    }

    pub fn wait_time(&self) -> Duration {
        self.wait_time
            .as_deref()
            .and_then(parse_duration)
            .unwrap_or(Duration::from_secs(self.wait_time_secs))
    }
}

/// Parses durations like `5s`, `500ms` or `1m30s` (units `h`, `m`, `s`, `ms`)
fn parse_duration(text: &str) -> Option<Duration> {
    let mut rest = text.trim();
    if rest.is_empty() {
        return None;
    }

    let mut total = Duration::ZERO;
    while !rest.is_empty() {
        let digits = rest.find(|c: char| !c.is_ascii_digit()).unwrap_or(rest.len());
        if digits == 0 {
            return None;
        }
        let amount: u64 = rest[..digits].parse().ok()?;
        rest = &rest[digits..];

        let unit = rest.find(|c: char| c.is_ascii_digit()).unwrap_or(rest.len());
        let part = match &rest[..unit] {
            "h" => Duration::from_secs(amount.checked_mul(3600)?),
            "m" => Duration::from_secs(amount.checked_mul(60)?),
            "s" => Duration::from_secs(amount),
            "ms" => Duration::from_millis(amount),
            _ => return None,
        };
        total = total.checked_add(part)?;
        rest = &rest[unit..];
    }
    Some(total)
}

/// Locations of everything solizard keeps on disk
#[derive(Debug, Clone)]
pub struct Home {
    root: PathBuf,
}

impl Home {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// `~/.solizard`
    pub fn default_root() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".solizard")
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_path(&self) -> PathBuf {
        self.root.join("config.toml")
    }

    pub fn address_book_path(&self) -> PathBuf {
        self.root.join("contract_infos.json")
    }

    pub fn abi_dir(&self) -> PathBuf {
        self.root.join("abis")
    }

    pub fn chains_path(&self) -> PathBuf {
        self.root.join("chains_mini.json")
    }

    /// Creates the root and the ABI directory
    pub fn ensure(&self) -> Result<()> {
        std::fs::create_dir_all(self.abi_dir())
            .wrap_err_with(|| format!("Failed to create {}", self.abi_dir().display()))
    }
}
