use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Opaque identifier for an entity. Carries no data of its own; it is only a
/// key into component storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub u64);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A handle referencing a shared mesh in a mesh library.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MeshHandle(pub u64);

/// Linear RGBA color, components in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    #[serde(default = "opaque")]
    pub a: f32,
}

fn opaque() -> f32 {
    1.0
}

impl Color {
    pub const BLACK: Self = Self::rgb(0.0, 0.0, 0.0);
    pub const WHITE: Self = Self::rgb(1.0, 1.0, 1.0);
    /// Classic P1 green phosphor.
    pub const PHOSPHOR_GREEN: Self = Self::rgb(0.2, 1.0, 0.4);
    pub const AMBER: Self = Self::rgb(1.0, 0.7, 0.1);

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub fn with_alpha(self, a: f32) -> Self {
        Self {
            a: a.clamp(0.0, 1.0),
            ..self
        }
    }

    /// Quantize to 8-bit RGB, dropping alpha.
    pub fn to_rgb8(self) -> [u8; 3] {
        let q = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        [q(self.r), q(self.g), q(self.b)]
    }

    pub fn from_rgb8(rgb: [u8; 3]) -> Self {
        Self::rgb(
            rgb[0] as f32 / 255.0,
            rgb[1] as f32 / 255.0,
            rgb[2] as f32 / 255.0,
        )
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::PHOSPHOR_GREEN
    }
}

/// Geometric representation an entity is currently rendered with.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum ViewMode {
    #[default]
    #[serde(rename = "2d")]
    Planar,
    #[serde(rename = "3d")]
    Spatial,
}

impl ViewMode {
    pub fn other(self) -> Self {
        match self {
            Self::Planar => Self::Spatial,
            Self::Spatial => Self::Planar,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Planar => "2d",
            Self::Spatial => "3d",
        }
    }
}

impl fmt::Display for ViewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One of the four field boundaries. A paddle guards exactly one side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Left,
    Right,
    Top,
    Bottom,
}

impl Side {
    pub const ALL: [Side; 4] = [Side::Left, Side::Right, Side::Top, Side::Bottom];

    /// Index of the coordinate a paddle on this side slides along (0 = x, 1 = y).
    pub fn travel_axis(self) -> usize {
        match self {
            Self::Left | Self::Right => 1,
            Self::Top | Self::Bottom => 0,
        }
    }

    /// Index of the coordinate that crosses this side's boundary.
    pub fn normal_axis(self) -> usize {
        1 - self.travel_axis()
    }

    /// Sign of the boundary along [`Side::normal_axis`]: +1 for right and top.
    pub fn sign(self) -> f32 {
        match self {
            Self::Right | Self::Top => 1.0,
            Self::Left | Self::Bottom => -1.0,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
            Self::Top => "top",
            Self::Bottom => "bottom",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown view mode {0:?}, expected \"2d\" or \"3d\"")]
pub struct ParseViewModeError(pub String);

impl FromStr for ViewMode {
    type Err = ParseViewModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "2d" => Ok(Self::Planar),
            "3d" => Ok(Self::Spatial),
            other => Err(ParseViewModeError(other.to_string())),
        }
    }
}
