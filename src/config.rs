//! Configuration file and defaults.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::{
    Error, Result, CAPTURE_THROTTLE_MS, FRAME_HEIGHT, FRAME_RATE, FRAME_WIDTH, IDLE_SLEEP_MS,
};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub camera: CameraConfig,
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub pipeline: PipelineConfig,
    #[serde(default)]
    pub dispatch: DispatchConfig,
}

/// Capture request. Devices may honour only part of it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub index: u32,
    pub width: u32,
    pub height: u32,
    pub fps: u32,
    /// Ask for a compressed (MJPEG) stream
    pub mjpeg: bool,
    pub autofocus: bool,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            index: 0,
            width: FRAME_WIDTH,
            height: FRAME_HEIGHT,
            fps: FRAME_RATE,
            mjpeg: true,
            autofocus: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub path: PathBuf,
    /// Square input edge of the landmark network, in pixels
    pub input_size: u32,
    /// Hand presence score below which a detection is discarded
    pub min_presence: f32,
    pub threads: usize,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("models/hand_landmark.onnx"),
            input_size: 224,
            min_presence: 0.7,
            threads: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub capture_throttle_ms: u64,
    pub idle_sleep_ms: u64,
    /// Flip frames horizontally before detection and display
    pub mirror: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            capture_throttle_ms: CAPTURE_THROTTLE_MS,
            idle_sleep_ms: IDLE_SLEEP_MS,
            mirror: true,
        }
    }
}

impl PipelineConfig {
    pub fn capture_throttle(&self) -> Duration {
        Duration::from_millis(self.capture_throttle_ms)
    }

    pub fn idle_sleep(&self) -> Duration {
        Duration::from_millis(self.idle_sleep_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchConfig {
    /// Inject keys; when false actions are only logged
    pub enabled: bool,
    /// Pause after play/pause, track and mute keys
    pub pause_ms: u64,
    /// Pause after a volume step
    pub volume_pause_ms: u64,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            pause_ms: 500,
            volume_pause_ms: 300,
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        let cam = &self.camera;
        if cam.width == 0 || cam.height == 0 {
            return Err(Error::Config(format!(
                "camera resolution must be non-zero, got {}x{}",
                cam.width, cam.height
            )));
        }
        if cam.fps == 0 {
            return Err(Error::Config("camera fps must be > 0".to_string()));
        }
        if !(0.0..=1.0).contains(&self.model.min_presence) {
            return Err(Error::Config(format!(
                "min_presence must be in [0, 1], got {}",
                self.model.min_presence
            )));
        }
        if self.model.input_size == 0 {
            return Err(Error::Config("model input_size must be > 0".to_string()));
        }
        if self.model.threads == 0 {
            return Err(Error::Config("model threads must be > 0".to_string()));
        }
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path` if given, otherwise fall back to defaults
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::Config(e.to_string()))
    }
}
