// src/health/host.rs
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::time::Duration;
use sysinfo::{Disks, System};
use tokio::process::Command;

use super::HostProbe;

/// The machine we are running on.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemHost;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemInfo {
    pub os: String,
    pub kernel: String,
    pub arch: String,
    pub executable: String,
}

pub fn system_info() -> SystemInfo {
    let os = match (System::name(), System::os_version()) {
        (Some(n), Some(v)) => format!("{n} {v}"),
        (Some(n), None) => n,
        _ => std::env::consts::OS.to_string(),
    };
    SystemInfo {
        os,
        kernel: System::kernel_version().unwrap_or_else(|| "unknown".to_string()),
        arch: std::env::consts::ARCH.to_string(),
        executable: std::env::current_exe()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|_| "unknown".to_string()),
    }
}

/// Run `program args..` and return the first non-empty output line, or `None`
/// on spawn failure, non-zero exit, or timeout.
async fn first_output_line(program: &str, args: &[&str], timeout: Duration) -> Option<String> {
    let mut cmd = Command::new(program);
    cmd.args(args).kill_on_drop(true);

    let output = match tokio::time::timeout(timeout, cmd.output()).await {
        Ok(Ok(o)) => o,
        Ok(Err(e)) => {
            tracing::debug!(program, error = %e, "spawn failed");
            return None;
        }
        Err(_) => {
            tracing::debug!(program, ?timeout, "command timed out");
            return None;
        }
    };
    if !output.status.success() {
        return None;
    }

    // Some tools print their version on stderr.
    [output.stdout, output.stderr].iter().find_map(|bytes| {
        String::from_utf8_lossy(bytes)
            .lines()
            .map(str::trim)
            .find(|l| !l.is_empty())
            .map(str::to_string)
    })
}

/// Available bytes on the filesystem holding `path` (longest matching mount point).
pub fn free_disk_bytes(path: &Path) -> Result<u64> {
    let path = path
        .canonicalize()
        .with_context(|| format!("resolving {}", path.display()))?;
    let disks = Disks::new_with_refreshed_list();
    disks
        .list()
        .iter()
        .filter(|d| path.starts_with(d.mount_point()))
        .max_by_key(|d| d.mount_point().as_os_str().len())
        .map(|d| d.available_space())
        .ok_or_else(|| anyhow!("no mounted filesystem contains {}", path.display()))
}

#[async_trait]
impl HostProbe for SystemHost {
    async fn command_version(&self, command: &str, timeout: Duration) -> Option<String> {
        first_output_line(command, &["--version"], timeout).await
    }

    async fn library_version(&self, name: &str, timeout: Duration) -> Option<String> {
        first_output_line("pkg-config", &["--modversion", name], timeout).await
    }

    fn which(&self, command: &str) -> Option<PathBuf> {
        which::which(command).ok()
    }

    fn free_disk_bytes(&self, path: &Path) -> Result<u64> {
        free_disk_bytes(path)
    }

    async fn reach(&self, url: &str, timeout: Duration) -> Result<()> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("repo-dashboard/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .context("building http client")?;
        client
            .get(url)
            .send()
            .await
            .context("probe request")?
            .error_for_status()
            .context("probe non-2xx")?;
        Ok(())
    }
}
