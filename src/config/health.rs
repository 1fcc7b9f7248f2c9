// src/config/health.rs
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

use super::{read_toml, resolve_config_path};

pub const ENV_CONFIG_PATH: &str = "HEALTH_CONFIG_PATH";
pub const DEFAULT_CONFIG_PATH: &str = "config/health.toml";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolchainRequirement {
    /// Command whose `--version` output carries the version.
    pub command: String,
    /// "major.minor"
    pub min_version: String,
}

impl Default for ToolchainRequirement {
    fn default() -> Self {
        Self {
            command: "rustc".to_string(),
            min_version: "1.75".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthConfig {
    pub toolchain: ToolchainRequirement,
    /// System libraries looked up through pkg-config.
    pub libraries: Vec<String>,
    pub commands: Vec<String>,
    pub min_free_disk_gib: f64,
    pub probe_url: String,
    pub probe_timeout_secs: u64,
    pub command_timeout_secs: u64,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            toolchain: ToolchainRequirement::default(),
            libraries: vec!["openssl".to_string(), "zlib".to_string()],
            commands: vec!["git".to_string(), "cargo".to_string()],
            min_free_disk_gib: 10.0,
            probe_url: "https://api.github.com".to_string(),
            probe_timeout_secs: 10,
            command_timeout_secs: 5,
        }
    }
}

impl HealthConfig {
    pub fn load_from(path: &Path) -> Result<Self> {
        read_toml(path)
    }

    /// $HEALTH_CONFIG_PATH, then config/health.toml, then defaults.
    pub fn load_default() -> Result<Self> {
        match resolve_config_path(ENV_CONFIG_PATH, DEFAULT_CONFIG_PATH)? {
            Some(p) => Self::load_from(&p),
            None => Ok(Self::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toml_overrides_lists_and_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("health.toml");
        std::fs::write(
            &p,
            r#"
commands = ["git"]
libraries = []

[toolchain]
command = "python3"
min_version = "3.7"
"#,
        )
        .unwrap();
        let cfg = HealthConfig::load_from(&p).unwrap();
        assert_eq!(cfg.commands, vec!["git".to_string()]);
        assert!(cfg.libraries.is_empty());
        assert_eq!(cfg.toolchain.command, "python3");
        assert_eq!(cfg.toolchain.min_version, "3.7");
        assert_eq!(cfg.probe_timeout_secs, 10);
        assert_eq!(cfg.min_free_disk_gib, 10.0);
    }
}
