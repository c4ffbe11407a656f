use glam::Vec2;
use serde::{Deserialize, Serialize};
use std::f32::consts::TAU;

/// Outline geometry for planar rendering, in local pixel units around the
/// shape origin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Shape2D {
    /// Axis-aligned rectangle centered on the origin.
    Rect { size: Vec2 },
    /// Regular polygon centered on the origin.
    Polygon { radius: f32, sides: u32 },
}

impl Shape2D {
    /// Closed outline as a list of corner points.
    pub fn outline(&self) -> Vec<Vec2> {
        match *self {
            Self::Rect { size } => {
                let h = size * 0.5;
                vec![
                    Vec2::new(-h.x, -h.y),
                    Vec2::new(h.x, -h.y),
                    Vec2::new(h.x, h.y),
                    Vec2::new(-h.x, h.y),
                ]
            }
            Self::Polygon { radius, sides } => {
                let sides = sides.max(3);
                (0..sides)
                    .map(|i| {
                        let a = TAU * i as f32 / sides as f32;
                        Vec2::new(a.cos(), a.sin()) * radius
                    })
                    .collect()
            }
        }
    }
}
