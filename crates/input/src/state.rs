use glam::Vec2;
use phosphor_common::{Side, ViewMode};
use std::collections::BTreeMap;

use crate::Action;

/// Camera motion gathered since the last frame.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CameraDelta {
    /// Azimuth and elevation, radians.
    pub orbit: Vec2,
    pub zoom: f32,
    pub pan: Vec2,
}

impl CameraDelta {
    pub fn is_zero(&self) -> bool {
        *self == Self::default()
    }
}

/// Control state read once at the start of each frame.
#[derive(Debug, Clone, PartialEq)]
pub struct InputState {
    view_mode: ViewMode,
    hidden_line_removal: bool,
    backface_culling: bool,
    paddles: BTreeMap<Side, f32>,
    camera: CameraDelta,
}

impl Default for InputState {
    fn default() -> Self {
        Self {
            view_mode: ViewMode::Planar,
            hidden_line_removal: true,
            backface_culling: true,
            paddles: BTreeMap::new(),
            camera: CameraDelta::default(),
        }
    }
}

impl InputState {
    pub fn new(view_mode: ViewMode) -> Self {
        Self {
            view_mode,
            ..Self::default()
        }
    }

    /// Fold one action into the state.
    pub fn apply(&mut self, action: Action) {
        match action {
            Action::Orbit { azimuth, elevation } => {
                self.camera.orbit += Vec2::new(azimuth, elevation);
            }
            Action::Zoom { delta } => self.camera.zoom += delta,
            Action::Pan { delta } => self.camera.pan += delta,
            Action::MovePaddle { side, direction } => {
                let direction = if direction.is_finite() {
                    direction.clamp(-1.0, 1.0)
                } else {
                    0.0
                };
                self.paddles.insert(side, direction);
            }
            Action::SetViewMode { mode } => self.set_view_mode(mode),
            Action::ToggleViewMode => self.set_view_mode(self.view_mode.other()),
            Action::ToggleHiddenLines => self.hidden_line_removal = !self.hidden_line_removal,
            Action::ToggleCulling => self.backface_culling = !self.backface_culling,
            Action::Noop => {}
        }
    }

    pub fn apply_all(&mut self, actions: impl IntoIterator<Item = Action>) {
        for action in actions {
            self.apply(action);
        }
    }

    fn set_view_mode(&mut self, mode: ViewMode) {
        if mode != self.view_mode {
            tracing::debug!(from = %self.view_mode, to = %mode, "view mode requested");
        }
        self.view_mode = mode;
    }

    pub fn view_mode(&self) -> ViewMode {
        self.view_mode
    }

    pub fn hidden_line_removal(&self) -> bool {
        self.hidden_line_removal
    }

    pub fn backface_culling(&self) -> bool {
        self.backface_culling
    }

    /// Last requested direction for a player paddle; 0 when none was given.
    pub fn paddle_direction(&self, side: Side) -> f32 {
        self.paddles.get(&side).copied().unwrap_or(0.0)
    }

    /// Take the accumulated camera motion, leaving zero behind.
    pub fn take_camera_delta(&mut self) -> CameraDelta {
        std::mem::take(&mut self.camera)
    }
}
