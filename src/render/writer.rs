// src/render/writer.rs
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

pub trait ArtifactWriter {
    /// Store `bytes` at `path` (relative to the writer's root), replacing what was there.
    fn write(&self, path: &Path, bytes: &[u8]) -> Result<()>;
}

/// Writes under a root directory, creating parent directories on demand.
pub struct FsWriter {
    root: PathBuf,
}

impl FsWriter {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl ArtifactWriter for FsWriter {
    fn write(&self, path: &Path, bytes: &[u8]) -> Result<()> {
        let full = self.root.join(path);
        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating directory {}", parent.display()))?;
        }
        fs::write(&full, bytes).with_context(|| format!("writing {}", full.display()))
    }
}

// --- Test helper ---
pub struct MemoryWriter {
    pub files: Mutex<Vec<(PathBuf, Vec<u8>)>>,
}

impl MemoryWriter {
    pub fn new() -> Self {
        Self {
            files: Mutex::new(vec![]),
        }
    }

    /// Latest bytes written to `path`.
    pub fn get_bytes(&self, path: impl AsRef<Path>) -> Option<Vec<u8>> {
        let files = self.files.lock().unwrap_or_else(|e| e.into_inner());
        files
            .iter()
            .rev()
            .find(|(p, _)| p == path.as_ref())
            .map(|(_, b)| b.clone())
    }

    /// Latest content written to `path`, as UTF-8.
    pub fn get(&self, path: impl AsRef<Path>) -> Option<String> {
        self.get_bytes(path)
            .map(|b| String::from_utf8_lossy(&b).into_owned())
    }

    pub fn paths(&self) -> Vec<PathBuf> {
        let files = self.files.lock().unwrap_or_else(|e| e.into_inner());
        files.iter().map(|(p, _)| p.clone()).collect()
    }
}

impl Default for MemoryWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl ArtifactWriter for MemoryWriter {
    fn write(&self, path: &Path, bytes: &[u8]) -> Result<()> {
        self.files
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push((path.to_path_buf(), bytes.to_vec()));
        Ok(())
    }
}
