//! Directory of ABI files, one interface per file

use std::path::{Path, PathBuf};

use solizard::{Error, InterfaceSource, Result};
use tracing::{debug, info};

/// ABIs shipped with the binary, written into the ABI directory when missing
const BUNDLED: &[(&str, &str)] = &[("ERC20.abi", include_str!("../assets/ERC20.abi"))];

const EXTENSIONS: &[&str] = &["abi", "json"];

/// Interfaces stored as `<name>.abi` or `<name>.json`
#[derive(Debug, Clone)]
pub struct AbiDir {
    path: PathBuf,
}

impl AbiDir {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes bundled ABIs that are not present yet; returns how many were written
    pub fn seed(&self) -> Result<usize> {
        std::fs::create_dir_all(&self.path)?;

        let mut written = 0;
        for (file, content) in BUNDLED {
            let target = self.path.join(file);
            if !target.exists() {
                std::fs::write(&target, content)?;
                info!(path = %target.display(), "Seeded ABI");
                written += 1;
            }
        }
        Ok(written)
    }

    fn files(&self) -> Result<Vec<(String, PathBuf)>> {
        let read_dir = std::fs::read_dir(&self.path).map_err(|e| Error::InterfaceLoad {
            name: self.path.display().to_string(),
            reason: format!("failed to read ABI directory: {e}"),
        })?;

        let mut files = Vec::new();
        for entry in read_dir {
            let path = entry?.path();
            if !path.is_file() {
                continue;
            }
            let has_abi_ext = path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| EXTENSIONS.contains(&e));
            let stem = path.file_stem().and_then(|s| s.to_str()).map(String::from);
            match (has_abi_ext, stem) {
                (true, Some(stem)) => files.push((stem, path)),
                _ => debug!(path = %path.display(), "Skipping non-ABI file"),
            }
        }
        files.sort();
        files.dedup_by(|a, b| a.0 == b.0);
        Ok(files)
    }
}

impl InterfaceSource for AbiDir {
    fn list_available(&self) -> Result<Vec<String>> {
        Ok(self.files()?.into_iter().map(|(name, _)| name).collect())
    }

    fn load(&self, name: &str) -> Result<Vec<u8>> {
        let (_, path) = self
            .files()?
            .into_iter()
            .find(|(stem, _)| stem == name)
            .ok_or_else(|| Error::InterfaceLoad {
                name: name.to_string(),
                reason: format!("no ABI file in {}", self.path.display()),
            })?;
        Ok(std::fs::read(path)?)
    }
}
