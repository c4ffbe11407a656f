//! Simulation parameters and layered session configuration.
//!
//! Config files are YAML or JSON, picked by extension. Every field has a
//! default, so a file only needs the values it changes.

use glam::Vec2;
use phosphor_common::ViewMode;
use phosphor_render::{Camera, RenderConfig};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::arena::ArenaConfig;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid YAML config: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid JSON config: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unsupported config format {0:?}, expected .yaml, .yml or .json")]
    UnsupportedFormat(PathBuf),
}

/// Tunables shared by the pong systems. Distances are normalized field units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimParams {
    /// Units per second.
    pub paddle_speed: f32,
    pub paddle_length: f32,
    pub paddle_thickness: f32,
    pub ball_size: f32,
    pub serve_speed: f32,
    /// Multiplier applied to the reflected velocity component.
    pub bounce_factor: f32,
    /// Largest random change to the parallel velocity component on a bounce.
    pub bounce_jitter: f32,
    pub max_ball_speed: f32,
    /// Pixel size of the planar render space.
    pub field_size: Vec2,
}

impl Default for SimParams {
    fn default() -> Self {
        Self {
            paddle_speed: 1.2,
            paddle_length: 0.3,
            paddle_thickness: 0.04,
            ball_size: 0.04,
            serve_speed: 1.0,
            bounce_factor: 1.05,
            bounce_jitter: 0.1,
            max_ball_speed: 3.0,
            field_size: Vec2::new(800.0, 600.0),
        }
    }
}

impl SimParams {
    /// Clamp values into workable ranges, warning about each change.
    pub fn sanitized(mut self) -> Self {
        fn clamp_field(name: &str, value: &mut f32, min: f32, max: f32) {
            let clamped = if value.is_nan() { min } else { value.clamp(min, max) };
            if clamped != *value {
                tracing::warn!(field = name, value = *value, clamped, "sim parameter clamped");
                *value = clamped;
            }
        }
        clamp_field("paddle_speed", &mut self.paddle_speed, 0.0, 100.0);
        clamp_field("paddle_length", &mut self.paddle_length, 0.01, 2.0);
        clamp_field("paddle_thickness", &mut self.paddle_thickness, 0.001, 0.5);
        clamp_field("ball_size", &mut self.ball_size, 0.001, 0.5);
        clamp_field("serve_speed", &mut self.serve_speed, 0.0, 100.0);
        clamp_field("bounce_factor", &mut self.bounce_factor, 1.0, 4.0);
        clamp_field("bounce_jitter", &mut self.bounce_jitter, 0.0, 1.0);
        clamp_field("max_ball_speed", &mut self.max_ball_speed, 0.01, 100.0);
        clamp_field("field_size.x", &mut self.field_size.x, 1.0, 16384.0);
        clamp_field("field_size.y", &mut self.field_size.y, 1.0, 16384.0);
        self
    }
}

/// Everything needed to start a [`crate::Session`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub seed: u64,
    pub view_mode: ViewMode,
    pub render: RenderConfig,
    pub sim: SimParams,
    pub camera: Camera,
    pub arena: ArenaConfig,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            view_mode: ViewMode::Spatial,
            render: RenderConfig::default(),
            sim: SimParams::default(),
            camera: Camera::default(),
            arena: ArenaConfig::default(),
        }
    }
}

impl SessionConfig {
    /// Load from a `.yaml`, `.yml` or `.json` file and sanitize.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        let config = match ext.as_deref() {
            Some("yaml" | "yml") => Self::from_yaml_str(&text)?,
            Some("json") => Self::from_json_str(&text)?,
            _ => return Err(ConfigError::UnsupportedFormat(path.to_path_buf())),
        };
        tracing::info!(path = %path.display(), "loaded session config");
        Ok(config)
    }

    pub fn from_yaml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(text)?;
        Ok(config.sanitized())
    }

    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        Ok(config.sanitized())
    }

    pub fn to_yaml_string(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Clamp every section. The planar field always matches the viewport.
    pub fn sanitized(mut self) -> Self {
        self.render = self.render.sanitized();
        self.sim = self.sim.sanitized();
        let viewport = self.render.viewport();
        if self.sim.field_size != viewport {
            tracing::debug!(?viewport, "field size follows the render viewport");
            self.sim.field_size = viewport;
        }
        self.camera.set_aspect(self.render.width, self.render.height);
        self
    }
}
