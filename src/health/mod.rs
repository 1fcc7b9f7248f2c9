//! Runner health check: an ordered battery of independent environment checks.
//!
//! Every check reports its own pass/fail and display line; one failing check
//! never prevents the next one from running. The process exit code is derived
//! from the whole report.

pub mod host;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use once_cell::sync::OnceCell;
use regex::Regex;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::config::health::HealthConfig;

const GIB: f64 = 1024.0 * 1024.0 * 1024.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Version {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl Version {
    pub fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// First `major.minor[.patch]` found in free text, e.g. "rustc 1.80.1 (3f5fd8dd4 2024-08-06)".
    pub fn parse(s: &str) -> Option<Self> {
        static RE: OnceCell<Regex> = OnceCell::new();
        let re = RE.get_or_init(|| {
            Regex::new(r"(\d+)\.(\d+)(?:\.(\d+))?").expect("static version regex")
        });
        let caps = re.captures(s)?;
        let num = |i: usize| caps.get(i).and_then(|m| m.as_str().parse::<u32>().ok());
        Some(Self {
            major: num(1)?,
            minor: num(2)?,
            patch: num(3).unwrap_or(0),
        })
    }

    /// Major.minor comparison only.
    pub fn at_least(&self, min: MinVersion) -> bool {
        (self.major, self.minor) >= (min.major, min.minor)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MinVersion {
    pub major: u32,
    pub minor: u32,
}

impl MinVersion {
    pub fn parse(s: &str) -> Result<Self> {
        let v = Version::parse(s).ok_or_else(|| anyhow!("invalid minimum version {s:?}"))?;
        Ok(Self {
            major: v.major,
            minor: v.minor,
        })
    }
}

impl fmt::Display for MinVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Ok,
    /// Not passed, but only advisory (e.g. low disk space).
    Warning,
    Failure,
}

impl Severity {
    pub fn icon(self) -> &'static str {
        match self {
            Severity::Ok => "✅",
            Severity::Warning => "⚠️ ",
            Severity::Failure => "❌",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Toolchain,
    Libraries,
    Commands,
    Resources,
    Network,
}

impl Section {
    pub fn heading(self) -> &'static str {
        match self {
            Section::Toolchain => "🦀 Toolchain:",
            Section::Libraries => "📦 Required Libraries:",
            Section::Commands => "🛠️  Command-line Tools:",
            Section::Resources => "💻 System Resources:",
            Section::Network => "🌐 Network:",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HealthCheckResult {
    pub section: Section,
    pub name: String,
    pub passed: bool,
    pub severity: Severity,
    pub message: String,
}

impl HealthCheckResult {
    fn pass(section: Section, name: &str, message: String) -> Self {
        Self {
            section,
            name: name.to_string(),
            passed: true,
            severity: Severity::Ok,
            message,
        }
    }

    fn fail(section: Section, name: &str, severity: Severity, message: String) -> Self {
        Self {
            section,
            name: name.to_string(),
            passed: false,
            severity,
            message,
        }
    }

    /// Icon plus message, as printed.
    pub fn line(&self) -> String {
        format!("{} {}", self.severity.icon(), self.message)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HealthReport {
    pub results: Vec<HealthCheckResult>,
}

impl HealthReport {
    pub fn passed(&self) -> usize {
        self.results.iter().filter(|r| r.passed).count()
    }

    pub fn total(&self) -> usize {
        self.results.len()
    }

    pub fn all_passed(&self) -> bool {
        self.passed() == self.total()
    }

    /// 0 iff every check passed.
    pub fn exit_code(&self) -> i32 {
        if self.all_passed() {
            0
        } else {
            1
        }
    }
}

/// Everything the checks need to know about the machine they run on.
#[async_trait]
pub trait HostProbe: Send + Sync {
    /// First line of `<command> --version`, `None` on failure or timeout.
    async fn command_version(&self, command: &str, timeout: Duration) -> Option<String>;
    /// Installed version of a system library, `None` when it cannot be found.
    async fn library_version(&self, name: &str, timeout: Duration) -> Option<String>;
    fn which(&self, command: &str) -> Option<PathBuf>;
    fn free_disk_bytes(&self, path: &Path) -> Result<u64>;
    async fn reach(&self, url: &str, timeout: Duration) -> Result<()>;
}

pub fn version_check(command: &str, reported: Option<Version>, min: MinVersion) -> HealthCheckResult {
    match reported {
        Some(v) if v.at_least(min) => {
            HealthCheckResult::pass(Section::Toolchain, command, format!("{command} {v} (OK)"))
        }
        Some(v) => HealthCheckResult::fail(
            Section::Toolchain,
            command,
            Severity::Failure,
            format!("{command} {v} (Need {min}+)"),
        ),
        None => HealthCheckResult::fail(
            Section::Toolchain,
            command,
            Severity::Failure,
            format!("{command} (version unknown, need {min}+)"),
        ),
    }
}

pub fn disk_check(free: Result<u64>, min_free_gib: f64) -> HealthCheckResult {
    match free {
        Ok(bytes) => {
            let gib = bytes as f64 / GIB;
            if gib >= min_free_gib {
                HealthCheckResult::pass(
                    Section::Resources,
                    "disk",
                    format!("Disk space: {gib:.1} GB available"),
                )
            } else {
                HealthCheckResult::fail(
                    Section::Resources,
                    "disk",
                    Severity::Warning,
                    format!("Disk space: {gib:.1} GB available (recommended: {min_free_gib}+ GB)"),
                )
            }
        }
        Err(e) => {
            tracing::debug!(error = %e, "free space lookup failed");
            HealthCheckResult::fail(
                Section::Resources,
                "disk",
                Severity::Failure,
                "Could not check disk space".to_string(),
            )
        }
    }
}

async fn check_toolchain<H: HostProbe + ?Sized>(host: &H, cfg: &HealthConfig) -> HealthCheckResult {
    let command = cfg.toolchain.command.as_str();
    let min = match MinVersion::parse(&cfg.toolchain.min_version) {
        Ok(m) => m,
        Err(e) => {
            return HealthCheckResult::fail(
                Section::Toolchain,
                command,
                Severity::Failure,
                format!("{command} ({e})"),
            )
        }
    };
    let timeout = Duration::from_secs(cfg.command_timeout_secs);
    let reported = host
        .command_version(command, timeout)
        .await
        .as_deref()
        .and_then(Version::parse);
    version_check(command, reported, min)
}

async fn check_library<H: HostProbe + ?Sized>(host: &H, name: &str, timeout: Duration) -> HealthCheckResult {
    match host.library_version(name, timeout).await {
        Some(v) if !v.is_empty() => {
            HealthCheckResult::pass(Section::Libraries, name, format!("{name} {v}"))
        }
        Some(_) => HealthCheckResult::pass(Section::Libraries, name, format!("{name} (installed)")),
        None => HealthCheckResult::fail(
            Section::Libraries,
            name,
            Severity::Failure,
            format!("{name} (not installed)"),
        ),
    }
}

async fn check_command<H: HostProbe + ?Sized>(host: &H, command: &str, timeout: Duration) -> HealthCheckResult {
    if host.which(command).is_none() {
        return HealthCheckResult::fail(
            Section::Commands,
            command,
            Severity::Failure,
            format!("{command} (not found)"),
        );
    }
    // Presence is what counts; the version line is cosmetic.
    match host.command_version(command, timeout).await {
        Some(line) => HealthCheckResult::pass(Section::Commands, command, format!("{command}: {line}")),
        None => HealthCheckResult::pass(Section::Commands, command, format!("{command} (available)")),
    }
}

async fn check_network<H: HostProbe + ?Sized>(host: &H, cfg: &HealthConfig) -> HealthCheckResult {
    let target = reqwest::Url::parse(&cfg.probe_url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_string))
        .unwrap_or_else(|| cfg.probe_url.clone());
    let timeout = Duration::from_secs(cfg.probe_timeout_secs);
    match host.reach(&cfg.probe_url, timeout).await {
        Ok(()) => HealthCheckResult::pass(
            Section::Network,
            "network",
            format!("Network connectivity to {target}"),
        ),
        Err(e) => HealthCheckResult::fail(
            Section::Network,
            "network",
            Severity::Failure,
            format!("Network connectivity to {target}: {e:#}"),
        ),
    }
}

/// Run every check in order against `host`, checking disk space of `workdir`.
pub async fn run_checks<H>(host: &H, cfg: &HealthConfig, workdir: &Path) -> HealthReport
where
    H: HostProbe + ?Sized,
{
    let cmd_timeout = Duration::from_secs(cfg.command_timeout_secs);
    let mut results = Vec::with_capacity(3 + cfg.libraries.len() + cfg.commands.len());

    results.push(check_toolchain(host, cfg).await);
    for lib in &cfg.libraries {
        results.push(check_library(host, lib, cmd_timeout).await);
    }
    for cmd in &cfg.commands {
        results.push(check_command(host, cmd, cmd_timeout).await);
    }
    results.push(disk_check(host.free_disk_bytes(workdir), cfg.min_free_disk_gib));
    results.push(check_network(host, cfg).await);

    for r in &results {
        tracing::debug!(check = %r.name, passed = r.passed, "health check finished");
    }
    HealthReport { results }
}
