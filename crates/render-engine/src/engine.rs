//! Transcoding engine interface and the ffmpeg-backed implementation.
//!
//! An engine owns a flat, job-scoped file namespace (the "virtual
//! filesystem"). Callers stage input bytes under a name, run an ffmpeg-style
//! argument list that refers to those names, read the output back, and
//! delete both files.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use reelcut_common::config::PipelineDefaults;
use reelcut_common::error::ReelError;
use tokio::process::Command;

/// Errors raised by a transcoding engine call.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("Transcoding engine unavailable: {0}")]
    Unavailable(String),

    #[error("Virtual file not found: {0}")]
    NotFound(String),

    #[error("Invalid virtual file name: {0:?}")]
    InvalidName(String),

    #[error("Transcoder exited with {status}: {stderr}")]
    ExecutionFailed { status: String, stderr: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl EngineError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

impl From<EngineError> for ReelError {
    fn from(err: EngineError) -> Self {
        ReelError::pipeline(err.to_string())
    }
}

/// A transcoding engine with its own file namespace.
#[async_trait::async_trait]
pub trait TranscodeEngine: Send + Sync {
    /// Engine name for logs.
    fn name(&self) -> &str;

    /// Write `bytes` to the namespace under `name`.
    async fn stage(&mut self, name: &str, bytes: &[u8]) -> Result<(), EngineError>;

    /// Run one instruction sequence (ffmpeg-style arguments).
    async fn execute(&mut self, args: &[String]) -> Result<(), EngineError>;

    /// Read a file back out of the namespace.
    async fn read(&self, name: &str) -> Result<Vec<u8>, EngineError>;

    /// Remove a file. Missing files yield [`EngineError::NotFound`].
    async fn delete(&mut self, name: &str) -> Result<(), EngineError>;

    /// Names currently present in the namespace, sorted.
    async fn files(&self) -> Result<Vec<String>, EngineError>;
}

/// Process-backed engine: a scratch directory is the namespace and ffmpeg
/// runs with it as working directory, so plain names resolve inside it.
#[derive(Debug)]
pub struct FfmpegEngine {
    binary: String,
    root: PathBuf,
    version: String,
}

impl FfmpegEngine {
    /// Probe the ffmpeg binary and create a fresh scratch directory.
    ///
    /// This is the expensive step; do it once and reuse the engine.
    pub async fn load(config: &PipelineDefaults) -> Result<Self, EngineError> {
        let output = Command::new(&config.ffmpeg_binary)
            .arg("-version")
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| {
                EngineError::Unavailable(format!("failed to run {}: {e}", config.ffmpeg_binary))
            })?;
        if !output.status.success() {
            return Err(EngineError::Unavailable(format!(
                "{} -version exited with {}",
                config.ffmpeg_binary, output.status
            )));
        }
        let version = String::from_utf8_lossy(&output.stdout)
            .lines()
            .next()
            .unwrap_or_default()
            .trim()
            .to_string();

        let root = config
            .scratch_dir
            .join(format!("reelcut-{}", uuid::Uuid::new_v4().simple()));
        tokio::fs::create_dir_all(&root).await?;

        tracing::info!(
            binary = %config.ffmpeg_binary,
            version = %version,
            root = %root.display(),
            "Transcoding engine loaded"
        );

        Ok(Self {
            binary: config.ffmpeg_binary.clone(),
            root,
            version,
        })
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// Scratch directory backing the namespace.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Remove the scratch directory.
    pub async fn unload(self) -> Result<(), EngineError> {
        tokio::fs::remove_dir_all(&self.root).await?;
        tracing::debug!(root = %self.root.display(), "Transcoding engine unloaded");
        Ok(())
    }

    fn resolve(&self, name: &str) -> Result<PathBuf, EngineError> {
        validate_name(name)?;
        Ok(self.root.join(name))
    }
}

/// Names are flat: no separators, no parent references, no hidden files.
pub(crate) fn validate_name(name: &str) -> Result<(), EngineError> {
    let flat = !name.is_empty()
        && !name.starts_with('.')
        && !name.contains(['/', '\\'])
        && !name.contains("..");
    if flat {
        Ok(())
    } else {
        Err(EngineError::InvalidName(name.to_string()))
    }
}

fn map_not_found(err: std::io::Error, name: &str) -> EngineError {
    if err.kind() == std::io::ErrorKind::NotFound {
        EngineError::NotFound(name.to_string())
    } else {
        EngineError::Io(err)
    }
}

#[async_trait::async_trait]
impl TranscodeEngine for FfmpegEngine {
    fn name(&self) -> &str {
        "ffmpeg"
    }

    async fn stage(&mut self, name: &str, bytes: &[u8]) -> Result<(), EngineError> {
        let path = self.resolve(name)?;
        tokio::fs::write(&path, bytes).await?;
        tracing::debug!(name, bytes = bytes.len(), "Staged virtual file");
        Ok(())
    }

    async fn execute(&mut self, args: &[String]) -> Result<(), EngineError> {
        tracing::debug!(?args, "Running ffmpeg");
        let output = Command::new(&self.binary)
            .args(["-hide_banner", "-nostdin", "-loglevel", "error", "-y"])
            .args(args)
            .current_dir(&self.root)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| EngineError::Unavailable(format!("failed to start {}: {e}", self.binary)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(EngineError::ExecutionFailed {
                status: output.status.to_string(),
                stderr: tail(&stderr, 20),
            });
        }
        Ok(())
    }

    async fn read(&self, name: &str) -> Result<Vec<u8>, EngineError> {
        let path = self.resolve(name)?;
        tokio::fs::read(&path)
            .await
            .map_err(|e| map_not_found(e, name))
    }

    async fn delete(&mut self, name: &str) -> Result<(), EngineError> {
        let path = self.resolve(name)?;
        tokio::fs::remove_file(&path)
            .await
            .map_err(|e| map_not_found(e, name))
    }

    async fn files(&self) -> Result<Vec<String>, EngineError> {
        let mut entries = tokio::fs::read_dir(&self.root).await?;
        let mut names = vec![];
        while let Some(entry) = entries.next_entry().await? {
            if entry.file_type().await?.is_file() {
                names.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        names.sort();
        Ok(names)
    }
}

/// Last `lines` lines of `text`, trimmed.
fn tail(text: &str, lines: usize) -> String {
    let all: Vec<&str> = text.trim().lines().collect();
    all[all.len().saturating_sub(lines)..].join("\n")
}
