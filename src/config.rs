//! Runtime configuration for the demo host.
//!
//! Settings are loaded from an INI configuration file with safe defaults for
//! startup. Missing values retain their defaults.
//!
//! # Configuration File Format
//!
//! ```ini
//! [loop]
//! target_fps = 60
//! frames = 300
//!
//! [time]
//! scale = 1.0
//! ```

use configparser::ini::Ini;
use log::info;
use std::path::PathBuf;

/// Default safe values for startup
const DEFAULT_TARGET_FPS: u32 = 60;
const DEFAULT_FRAMES: u64 = 300;
const DEFAULT_TIME_SCALE: f32 = 1.0;
const DEFAULT_CONFIG_PATH: &str = "./config.ini";

/// Host loop configuration.
///
/// Stores frame pacing and time-scale settings for the demo frame loop.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Target frames per second of the host loop.
    pub target_fps: u32,
    /// Number of frames the demo runs before shutting down.
    pub frames: u64,
    /// Logical time multiplier applied by the frame clock.
    pub time_scale: f32,
    /// Path to the configuration file.
    pub config_path: PathBuf,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl RuntimeConfig {
    /// Create a new configuration with safe default values.
    pub fn new() -> Self {
        Self {
            target_fps: DEFAULT_TARGET_FPS,
            frames: DEFAULT_FRAMES,
            time_scale: DEFAULT_TIME_SCALE,
            config_path: PathBuf::from(DEFAULT_CONFIG_PATH),
        }
    }

    /// Create a new configuration with a custom config file path.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: path.into(),
            ..Self::new()
        }
    }

    /// Load configuration from the INI file.
    ///
    /// Missing values retain their current (default) values.
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_from_file(&mut self) -> Result<(), String> {
        let mut config = Ini::new();
        config
            .load(&self.config_path)
            .map_err(|e| format!("Failed to load config file: {}", e))?;

        // [loop] section
        if let Some(fps) = config.getuint("loop", "target_fps").ok().flatten() {
            self.target_fps = fps as u32;
        }
        if let Some(frames) = config.getuint("loop", "frames").ok().flatten() {
            self.frames = frames;
        }

        // [time] section
        if let Some(scale) = config.getfloat("time", "scale").ok().flatten() {
            self.time_scale = scale as f32;
        }

        info!(
            "Loaded config: fps={}, frames={}, time_scale={}",
            self.target_fps, self.frames, self.time_scale
        );

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_safe() {
        let config = RuntimeConfig::new();
        assert_eq!(config.target_fps, 60);
        assert_eq!(config.frames, 300);
        assert_eq!(config.time_scale, 1.0);
    }

    #[test]
    fn test_load_missing_file_reports_error_and_keeps_defaults() {
        let mut config = RuntimeConfig::with_path("./definitely-not-here.ini");
        assert!(config.load_from_file().is_err());
        assert_eq!(config.target_fps, 60);
    }
}
