//! Chain names and native currencies from `chains_mini.json`
//!
//! Entries follow the chainid.network format; fields other than the ones below
//! are ignored.

use std::path::{Path, PathBuf};

use color_eyre::eyre::{Result, WrapErr};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Written into the home directory when missing
const BUNDLED: &str = include_str!("../assets/chains_mini.json");

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NativeCurrency {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainInfo {
    pub name: String,
    pub chain_id: u64,
    pub native_currency: NativeCurrency,
}

/// Known chains, looked up by id
#[derive(Debug, Clone, Default)]
pub struct ChainList {
    chains: Vec<ChainInfo>,
}

impl ChainList {
    /// Writes the bundled list to `path` unless a file is already there
    pub fn seed(path: &Path) -> Result<bool> {
        if path.exists() {
            return Ok(false);
        }
        std::fs::write(path, BUNDLED)
            .wrap_err_with(|| format!("Failed to write {}", path.display()))?;
        info!(path = %path.display(), "Seeded chain list");
        Ok(true)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .wrap_err_with(|| format!("Failed to read {}", path.display()))?;
        Self::parse(&content).wrap_err_with(|| format!("Invalid chain list {}", path.display()))
    }

    fn parse(content: &str) -> Result<Self> {
        let chains = serde_json::from_str(content)?;
        Ok(Self { chains })
    }

    /// Seeds `path` if needed, then loads it
    pub fn load_or_seed(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        Self::seed(&path)?;
        Self::load(&path)
    }

    pub fn get(&self, chain_id: u64) -> Option<&ChainInfo> {
        self.chains.iter().find(|c| c.chain_id == chain_id)
    }

    pub fn len(&self) -> usize {
        self.chains.len()
    }
}
