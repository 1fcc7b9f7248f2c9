// src/config/mod.rs
pub mod dashboard;
pub mod health;

use anyhow::{anyhow, Context, Result};
use serde::de::DeserializeOwned;
use std::fs;
use std::path::{Path, PathBuf};

/// Resolve which config file to read:
/// 1) `$env_key` (must point to an existing file)
/// 2) `fallback` relative to the working directory
/// 3) none, meaning built-in defaults
pub(crate) fn resolve_config_path(env_key: &str, fallback: &str) -> Result<Option<PathBuf>> {
    if let Ok(p) = std::env::var(env_key) {
        let pb = PathBuf::from(p);
        if pb.exists() {
            return Ok(Some(pb));
        }
        return Err(anyhow!("{env_key} points to non-existent path {}", pb.display()));
    }
    let fb = PathBuf::from(fallback);
    if fb.exists() {
        return Ok(Some(fb));
    }
    Ok(None)
}

pub(crate) fn read_toml<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading config from {}", path.display()))?;
    toml::from_str(&content).with_context(|| format!("parsing config {}", path.display()))
}
