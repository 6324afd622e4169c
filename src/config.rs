use anyhow::{anyhow, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::detect::{BlobParams, DEFAULT_PERSON_CLASS_INDEX};
use crate::proximity::DEFAULT_MIN_DISTANCE;

const DEFAULT_MIN_CONFIDENCE: f32 = 0.2;
const DEFAULT_NMS_THRESHOLD: f32 = 0.3;
const DEFAULT_MODEL_PATH: &str = "mobilenet-ssd/MobileNetSSD_deploy.onnx";
const DEFAULT_FRAME_WIDTH: u32 = 700;
const DEFAULT_INPUT: &str = "stub://camera";

#[derive(Debug, Deserialize, Default)]
struct MonitorConfigFile {
    min_confidence: Option<f32>,
    nms_threshold: Option<f32>,
    min_distance: Option<f64>,
    use_accelerated_inference: Option<bool>,
    person_class_index: Option<i64>,
    model_path: Option<PathBuf>,
    frame_width: Option<u32>,
    blob: Option<BlobConfigFile>,
    io: Option<IoConfigFile>,
}

#[derive(Debug, Deserialize, Default)]
struct BlobConfigFile {
    scale: Option<f32>,
    size: Option<u32>,
    mean: Option<f32>,
    swap_rb: Option<bool>,
}

#[derive(Debug, Deserialize, Default)]
struct IoConfigFile {
    input: Option<String>,
    output_dir: Option<PathBuf>,
    font_path: Option<PathBuf>,
}

/// Immutable monitor configuration, built once and passed to every component.
#[derive(Debug, Clone, PartialEq)]
pub struct MonitorConfig {
    /// Detections at or below this confidence are dropped.
    pub min_confidence: f32,
    /// Declared for parity with the deployed model config. No suppression step
    /// reads it.
    pub nms_threshold: f32,
    /// Minimum safe distance between centroids, in pixels.
    pub min_distance: f64,
    pub use_accelerated_inference: bool,
    pub person_class_index: i64,
    pub model_path: PathBuf,
    /// Frames are resized to this width before detection.
    pub frame_width: u32,
    pub blob: BlobParams,
    pub io: IoSettings,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IoSettings {
    /// `stub://<name>` or a local video file path.
    pub input: String,
    /// Annotated frames are written here as JPEG files when set.
    pub output_dir: Option<PathBuf>,
    /// TrueType/OpenType font for the violation counter overlay.
    pub font_path: Option<PathBuf>,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        // An empty file section resolves every field to its default.
        Self::from_file(MonitorConfigFile::default())
    }
}

impl MonitorConfig {
    /// Load from `SOCIAL_DISTANCE_CONFIG` (if set), apply env overrides, validate.
    pub fn load() -> Result<Self> {
        let config_path = std::env::var("SOCIAL_DISTANCE_CONFIG").ok();
        let file_cfg = match config_path.as_deref() {
            Some(path) if !path.trim().is_empty() => Some(read_config_file(Path::new(path))?),
            _ => None,
        };
        let mut cfg = Self::from_file(file_cfg.unwrap_or_default());
        cfg.apply_env()?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Load from an explicit file, then apply env overrides and validate.
    pub fn load_from(path: &Path) -> Result<Self> {
        let mut cfg = Self::from_file(read_config_file(path)?);
        cfg.apply_env()?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn from_file(file: MonitorConfigFile) -> Self {
        let defaults = BlobParams::default();
        let blob = BlobParams {
            scale: file
                .blob
                .as_ref()
                .and_then(|blob| blob.scale)
                .unwrap_or(defaults.scale),
            size: file
                .blob
                .as_ref()
                .and_then(|blob| blob.size)
                .unwrap_or(defaults.size),
            mean: file
                .blob
                .as_ref()
                .and_then(|blob| blob.mean)
                .unwrap_or(defaults.mean),
            swap_rb: file
                .blob
                .as_ref()
                .and_then(|blob| blob.swap_rb)
                .unwrap_or(defaults.swap_rb),
        };
        let io = IoSettings {
            input: file
                .io
                .as_ref()
                .and_then(|io| io.input.clone())
                .unwrap_or_else(|| DEFAULT_INPUT.to_string()),
            output_dir: file.io.as_ref().and_then(|io| io.output_dir.clone()),
            font_path: file.io.and_then(|io| io.font_path),
        };
        Self {
            min_confidence: file.min_confidence.unwrap_or(DEFAULT_MIN_CONFIDENCE),
            nms_threshold: file.nms_threshold.unwrap_or(DEFAULT_NMS_THRESHOLD),
            min_distance: file.min_distance.unwrap_or(DEFAULT_MIN_DISTANCE),
            use_accelerated_inference: file.use_accelerated_inference.unwrap_or(false),
            person_class_index: file
                .person_class_index
                .unwrap_or(DEFAULT_PERSON_CLASS_INDEX),
            model_path: file
                .model_path
                .unwrap_or_else(|| PathBuf::from(DEFAULT_MODEL_PATH)),
            frame_width: file.frame_width.unwrap_or(DEFAULT_FRAME_WIDTH),
            blob,
            io,
        }
    }

    fn apply_env(&mut self) -> Result<()> {
        if let Some(value) = env_value("SOCIAL_DISTANCE_MIN_CONF") {
            self.min_confidence = value
                .parse()
                .map_err(|_| anyhow!("SOCIAL_DISTANCE_MIN_CONF must be a number"))?;
        }
        if let Some(value) = env_value("SOCIAL_DISTANCE_NMS_THRESH") {
            self.nms_threshold = value
                .parse()
                .map_err(|_| anyhow!("SOCIAL_DISTANCE_NMS_THRESH must be a number"))?;
        }
        if let Some(value) = env_value("SOCIAL_DISTANCE_PERSON_CLASS") {
            self.person_class_index = value
                .parse()
                .map_err(|_| anyhow!("SOCIAL_DISTANCE_PERSON_CLASS must be an integer class index"))?;
        }
        if let Some(value) = env_value("SOCIAL_DISTANCE_MIN_DISTANCE") {
            self.min_distance = value
                .parse()
                .map_err(|_| anyhow!("SOCIAL_DISTANCE_MIN_DISTANCE must be a number of pixels"))?;
        }
        if let Some(value) = env_value("SOCIAL_DISTANCE_USE_GPU") {
            self.use_accelerated_inference = parse_bool(&value)
                .ok_or_else(|| anyhow!("SOCIAL_DISTANCE_USE_GPU must be true/false or 1/0"))?;
        }
        if let Some(value) = env_value("SOCIAL_DISTANCE_MODEL_PATH") {
            self.model_path = PathBuf::from(value);
        }
        if let Some(value) = env_value("SOCIAL_DISTANCE_INPUT") {
            self.io.input = value;
        }
        if let Some(value) = env_value("SOCIAL_DISTANCE_OUTPUT_DIR") {
            self.io.output_dir = Some(PathBuf::from(value));
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.min_confidence) {
            return Err(anyhow!("min_confidence must be within [0, 1]"));
        }
        if !(0.0..=1.0).contains(&self.nms_threshold) {
            return Err(anyhow!("nms_threshold must be within [0, 1]"));
        }
        if !self.min_distance.is_finite() || self.min_distance < 0.0 {
            return Err(anyhow!("min_distance must be a non-negative number of pixels"));
        }
        if self.person_class_index < 0 {
            return Err(anyhow!("person_class_index must not be negative"));
        }
        if self.frame_width == 0 {
            return Err(anyhow!("frame_width must be greater than zero"));
        }
        if self.blob.size == 0 {
            return Err(anyhow!("blob.size must be greater than zero"));
        }
        if !self.blob.scale.is_finite() || !self.blob.mean.is_finite() {
            return Err(anyhow!("blob.scale and blob.mean must be finite"));
        }
        if self.io.input.trim().is_empty() {
            return Err(anyhow!("io.input must not be empty"));
        }
        Ok(())
    }
}

fn read_config_file(path: &Path) -> Result<MonitorConfigFile> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow!("failed to read config file {}: {}", path.display(), e))?;
    let is_toml = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));
    let cfg = if is_toml {
        toml::from_str(&raw).map_err(|e| anyhow!("invalid config file {}: {}", path.display(), e))?
    } else {
        serde_json::from_str(&raw)
            .map_err(|e| anyhow!("invalid config file {}: {}", path.display(), e))?
    };
    Ok(cfg)
}

fn env_value(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .filter(|value| !value.trim().is_empty())
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_deployment() {
        let cfg = MonitorConfig::default();
        assert_eq!(cfg.min_confidence, 0.2);
        assert_eq!(cfg.nms_threshold, 0.3);
        assert_eq!(cfg.min_distance, 50.0);
        assert!(!cfg.use_accelerated_inference);
        assert_eq!(cfg.person_class_index, 15);
        assert_eq!(cfg.frame_width, 700);
        assert_eq!(cfg.blob, BlobParams::default());
        assert_eq!(cfg.io.input, "stub://camera");
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn validate_rejects_out_of_range_values() {
        let cfg = MonitorConfig {
            min_confidence: 1.5,
            ..MonitorConfig::default()
        };
        assert!(cfg.validate().is_err());

        let cfg = MonitorConfig {
            min_distance: f64::NAN,
            ..MonitorConfig::default()
        };
        assert!(cfg.validate().is_err());

        let cfg = MonitorConfig {
            person_class_index: -1,
            ..MonitorConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn parse_bool_accepts_common_spellings() {
        assert_eq!(parse_bool("TRUE"), Some(true));
        assert_eq!(parse_bool(" 0 "), Some(false));
        assert_eq!(parse_bool("maybe"), None);
    }
}
