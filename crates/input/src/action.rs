use glam::Vec2;
use phosphor_common::{Side, ViewMode};
use serde::{Deserialize, Serialize};

/// A high-level control action.
///
/// Mouse, keyboard, gamepad or scripted drivers all map onto these; the
/// session consumes actions, never raw device events.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    /// Rotate the camera around its target, in radians.
    Orbit { azimuth: f32, elevation: f32 },
    /// Move the camera toward (positive) or away from its target.
    Zoom { delta: f32 },
    /// Slide camera and target across the view plane.
    Pan { delta: Vec2 },
    /// Drive a player paddle: -1, 0 or +1 along its travel axis.
    MovePaddle { side: Side, direction: f32 },
    SetViewMode { mode: ViewMode },
    ToggleViewMode,
    ToggleHiddenLines,
    ToggleCulling,
    /// Unbound input.
    Noop,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn actions_parse_from_tagged_json() {
        let a: Action =
            serde_json::from_str(r#"{"action":"move_paddle","side":"left","direction":1.0}"#).unwrap();
        assert_eq!(
            a,
            Action::MovePaddle {
                side: Side::Left,
                direction: 1.0
            }
        );
        let m: Action = serde_json::from_str(r#"{"action":"set_view_mode","mode":"3d"}"#).unwrap();
        assert_eq!(m, Action::SetViewMode { mode: ViewMode::Spatial });
    }
}
