//! `contract_infos.json`: contract addresses remembered per interface

use std::path::{Path, PathBuf};

use alloy::primitives::Address;
use serde::{Deserialize, Serialize};
use solizard::validation::parse_address;
use solizard::{AddressBook, Error, Result};
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractInfo {
    pub name: String,
    pub address: String,
}

impl ContractInfo {
    pub fn validate(&self) -> Result<Address> {
        if self.name.trim().is_empty() {
            return Err(Error::Validation("contract name is empty".to_string()));
        }
        parse_address(&self.address).map_err(|_| {
            Error::Validation(format!(
                "contract {} has invalid address '{}'",
                self.name, self.address
            ))
        })
    }
}

/// Address book backed by a JSON file, rewritten on every change
#[derive(Debug, Clone)]
pub struct FileAddressBook {
    path: PathBuf,
    entries: Vec<ContractInfo>,
}

impl FileAddressBook {
    /// Loads and validates the book; a missing file is an empty book
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let entries: Vec<ContractInfo> = if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            if content.trim().is_empty() {
                Vec::new()
            } else {
                serde_json::from_str(&content)?
            }
        } else {
            Vec::new()
        };

        for entry in &entries {
            entry.validate()?;
        }

        Ok(Self { path, entries })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn entries(&self) -> &[ContractInfo] {
        &self.entries
    }

    fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(&self.entries)?;
        std::fs::write(&self.path, content)?;
        Ok(())
    }
}

impl AddressBook for FileAddressBook {
    fn addresses(&self, interface: &str) -> Vec<Address> {
        self.entries
            .iter()
            .filter(|e| e.name == interface)
            .filter_map(|e| match e.validate() {
                Ok(address) => Some(address),
                Err(err) => {
                    warn!(error = %err, "Skipping address book entry");
                    None
                }
            })
            .collect()
    }

    fn remember(&mut self, interface: &str, address: Address) -> Result<()> {
        if self.addresses(interface).contains(&address) {
            return Ok(());
        }
        self.entries.push(ContractInfo {
            name: interface.to_string(),
            address: address.to_checksum(None),
        });
        self.save()
    }
}
