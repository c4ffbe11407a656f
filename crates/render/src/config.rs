use phosphor_common::Color;
use serde::{Deserialize, Serialize};

use crate::Projection;

/// Winding that marks a face as front-facing when seen from outside.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FrontFace {
    #[default]
    CounterClockwise,
    Clockwise,
}

/// Visual settings for the wireframe pipeline.
///
/// Owned by the host application and handed to the renderer; partial
/// config files fill the rest from [`Default`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub width: u32,
    pub height: u32,
    pub phosphor_color: Color,
    pub background_color: Color,
    pub line_width: f32,
    /// 0 disables glow, 2 is the maximum.
    pub glow_intensity: f32,
    /// 0 disables scanlines, 1 darkens scanline rows to black.
    pub scanline_intensity: f32,
    /// Seconds for the scanline pattern to scroll one period.
    pub scanline_speed: f32,
    pub hidden_line_removal: bool,
    pub backface_culling: bool,
    pub front_face: FrontFace,
    pub projection: Projection,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            phosphor_color: Color::PHOSPHOR_GREEN,
            background_color: Color::BLACK,
            line_width: 1.5,
            glow_intensity: 0.5,
            scanline_intensity: 0.15,
            scanline_speed: 2.0,
            hidden_line_removal: true,
            backface_culling: true,
            front_face: FrontFace::CounterClockwise,
            projection: Projection::Perspective,
        }
    }
}

impl RenderConfig {
    /// Clamp out-of-range values into their documented ranges.
    ///
    /// Every adjusted field is reported with a `warn!`.
    pub fn sanitized(mut self) -> Self {
        let glow = self.glow_intensity.clamp(0.0, 2.0);
        if glow != self.glow_intensity || glow.is_nan() {
            tracing::warn!(value = self.glow_intensity, "glow_intensity clamped to [0, 2]");
            self.glow_intensity = if glow.is_nan() { 0.0 } else { glow };
        }
        let scan = self.scanline_intensity.clamp(0.0, 1.0);
        if scan != self.scanline_intensity || scan.is_nan() {
            tracing::warn!(value = self.scanline_intensity, "scanline_intensity clamped to [0, 1]");
            self.scanline_intensity = if scan.is_nan() { 0.0 } else { scan };
        }
        if self.line_width.is_nan() || self.line_width <= 0.0 {
            tracing::warn!(value = self.line_width, "line_width must be positive, using 1");
            self.line_width = 1.0;
        }
        if self.scanline_speed.is_nan() || self.scanline_speed <= 0.0 {
            tracing::warn!(value = self.scanline_speed, "scanline_speed must be positive, using 1");
            self.scanline_speed = 1.0;
        }
        if self.width == 0 || self.height == 0 {
            tracing::warn!(width = self.width, height = self.height, "empty viewport, using 800x600");
            self.width = 800;
            self.height = 600;
        }
        self
    }

    pub fn viewport(&self) -> glam::Vec2 {
        glam::Vec2::new(self.width as f32, self.height as f32)
    }
}
