//! Application configuration.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{ReelError, ReelResult};

/// Global application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Media pipeline defaults.
    pub pipeline: PipelineDefaults,

    /// Caption editor defaults.
    pub editor: EditorDefaults,

    /// Logging configuration.
    pub logging: LoggingConfig,
}

/// Parameters for the transcoding jobs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineDefaults {
    /// Transcoder binary used by the process-backed engine.
    pub ffmpeg_binary: String,

    /// Parent directory for the engine's scratch namespace.
    pub scratch_dir: PathBuf,

    /// Sample rate of extracted audio (Hz). Sized for transcription, not playback.
    pub audio_sample_rate: u32,

    /// Bitrate of extracted audio in kbps.
    pub audio_bitrate_kbps: u32,

    /// Thumbnail output width in pixels (height follows aspect).
    pub thumbnail_width: u32,

    /// JPEG quality scale for thumbnails (2 = best, 31 = worst).
    pub thumbnail_quality: u32,
}

/// Timeline editor parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorDefaults {
    /// Fixed row height of the caption list (px).
    pub row_height: f64,

    /// Extra rows rendered above and below the viewport.
    pub overscan_rows: usize,

    /// Frame rate used for preview and overlay planning.
    pub preview_fps: u32,

    /// Default normalized caption anchor `(x, y)`.
    pub caption_anchor: (f64, f64),
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "reelcut=debug,warn").
    pub level: String,

    /// Whether to output structured JSON logs.
    pub json: bool,

    /// Optional log file path.
    pub file: Option<PathBuf>,
}

impl Default for PipelineDefaults {
    fn default() -> Self {
        Self {
            ffmpeg_binary: "ffmpeg".to_string(),
            scratch_dir: std::env::temp_dir(),
            audio_sample_rate: 16_000,
            audio_bitrate_kbps: 32,
            thumbnail_width: 320,
            thumbnail_quality: 5,
        }
    }
}

impl Default for EditorDefaults {
    fn default() -> Self {
        Self {
            row_height: 44.0,
            overscan_rows: 4,
            preview_fps: 30,
            caption_anchor: (0.5, 0.8),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            file: None,
        }
    }
}

impl AppConfig {
    /// Load config from the standard location, falling back to defaults.
    pub fn load() -> Self {
        let config_path = config_file_path();
        if !config_path.exists() {
            return Self::default();
        }
        match Self::load_from(&config_path) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Failed to load config at {:?}: {}", config_path, e);
                Self::default()
            }
        }
    }

    /// Load config from an explicit path.
    pub fn load_from(path: &Path) -> ReelResult<Self> {
        if !path.exists() {
            return Err(ReelError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| ReelError::config(format!("{}: {e}", path.display())))
    }

    /// Save config to the standard location.
    pub fn save(&self) -> ReelResult<()> {
        self.save_to(&config_file_path())
    }

    /// Save config to an explicit path, creating parent directories.
    pub fn save_to(&self, path: &Path) -> ReelResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

/// Standard config file location.
pub fn config_file_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("reelcut").join("config.json")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pipeline_defaults_target_transcription_audio() {
        let config = AppConfig::default();
        assert_eq!(config.pipeline.audio_sample_rate, 16_000);
        assert_eq!(config.pipeline.audio_bitrate_kbps, 32);
        assert_eq!(config.pipeline.thumbnail_width, 320);
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let parsed: AppConfig =
            serde_json::from_str(r#"{"editor":{"row_height":60.0}}"#).unwrap();
        assert!((parsed.editor.row_height - 60.0).abs() < 1e-9);
        assert_eq!(parsed.editor.overscan_rows, 4);
        assert_eq!(parsed.pipeline.ffmpeg_binary, "ffmpeg");
        assert_eq!(parsed.logging.level, "info");
    }

    fn scratch_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("reelcut-config-{}-{name}", std::process::id()))
            .join("config.json")
    }

    #[test]
    fn test_missing_config_is_file_not_found() {
        let path = scratch_path("missing");
        let err = AppConfig::load_from(&path).unwrap_err();
        assert!(matches!(err, ReelError::FileNotFound { path: p } if p == path));
    }

    #[test]
    fn test_malformed_config_is_config_error() {
        let path = scratch_path("malformed");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "{ not json").unwrap();

        let err = AppConfig::load_from(&path).unwrap_err();
        assert!(matches!(err, ReelError::Config { .. }));
        assert!(err.to_string().contains("config.json"));

        std::fs::remove_dir_all(path.parent().unwrap()).ok();
    }

    #[test]
    fn test_save_then_load_round_trips() {
        let path = scratch_path("saved");
        let mut config = AppConfig::default();
        config.editor.preview_fps = 24;
        config.pipeline.ffmpeg_binary = "/opt/ffmpeg/bin/ffmpeg".to_string();

        config.save_to(&path).unwrap();
        let loaded = AppConfig::load_from(&path).unwrap();
        assert_eq!(loaded.editor.preview_fps, 24);
        assert_eq!(loaded.pipeline.ffmpeg_binary, "/opt/ffmpeg/bin/ffmpeg");

        std::fs::remove_dir_all(path.parent().unwrap()).ok();
    }
}
