//! Component payloads and the closed [`Component`] model.
//!
//! Positions and velocities are in normalized field space, x and y in [-1, 1]
//! with y pointing up. Transforms carry the render-space copy.

use glam::{Vec2, Vec3};
use phosphor_common::{Color, MeshHandle, Shape2D, Side, Transform, ViewMode};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Human-readable label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Name(pub String);

/// Normalized-space position. For boxes this is the minimum corner.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position(pub Vec2);

/// Normalized units per second.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Velocity(pub Vec2);

/// Axis-aligned box extending `size` from the entity's position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub size: Vec2,
}

impl Aabb {
    pub fn overlaps(&self, at: Vec2, other: &Aabb, other_at: Vec2) -> bool {
        at.x < other_at.x + other.size.x
            && other_at.x < at.x + self.size.x
            && at.y < other_at.y + other.size.y
            && other_at.y < at.y + self.size.y
    }
}

/// A paddle guarding one side. `length` runs along the side's travel axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Paddle {
    pub side: Side,
    pub length: f32,
    pub speed: f32,
}

impl Paddle {
    /// Lowest and highest allowed position along the travel axis.
    pub fn travel_range(&self) -> (f32, f32) {
        (-1.0, 1.0 - self.length)
    }
}

/// Paddle driven by the player's input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerControl;

/// Paddle that tracks the nearest ball.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaddleAi;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ball {
    /// Speed of a freshly served ball.
    pub serve_speed: f32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Score {
    pub points: u32,
}

/// Planar outline drawn in pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Renderable2D {
    pub shape: Shape2D,
    pub color: Color,
}

/// Reference into a mesh library. `None` color uses the phosphor color.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Mesh3D {
    pub handle: MeshHandle,
    pub color: Option<Color>,
}

/// Geometry an entity shows in one view mode.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Geometry {
    Shape(Renderable2D),
    Mesh(Mesh3D),
}

/// Declares which view modes an entity supports and what it draws in each.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewModeComponent {
    pub supported: BTreeSet<ViewMode>,
    pub current_mode: ViewMode,
    pub geometry: BTreeMap<ViewMode, Geometry>,
}

impl ViewModeComponent {
    /// An entity that can switch between a planar shape and a mesh.
    pub fn dual(current_mode: ViewMode, shape: Renderable2D, mesh: Mesh3D) -> Self {
        Self {
            supported: [ViewMode::Planar, ViewMode::Spatial].into(),
            current_mode,
            geometry: [
                (ViewMode::Planar, Geometry::Shape(shape)),
                (ViewMode::Spatial, Geometry::Mesh(mesh)),
            ]
            .into(),
        }
    }

    pub fn supports(&self, mode: ViewMode) -> bool {
        self.supported.contains(&mode)
    }
}

/// Constant spin, radians per second about each axis.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RotationBehavior {
    pub angular_velocity: Vec3,
}

/// Typed access to one [`Component`] variant.
pub trait ComponentData: Clone + Sized {
    const KIND: ComponentKind;

    fn into_component(self) -> Component;

    fn from_component(component: &Component) -> Option<&Self>;
}

macro_rules! component_model {
    ($($variant:ident($ty:ty) => $name:literal,)+) => {
        /// Every component the simulation knows about, tagged by name.
        #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
        #[serde(tag = "component", content = "value")]
        pub enum Component {
            $(#[serde(rename = $name)] $variant($ty),)+
        }

        /// Component name without its payload; the key of a storage column.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub enum ComponentKind {
            $(#[serde(rename = $name)] $variant,)+
        }

        impl Component {
            pub fn kind(&self) -> ComponentKind {
                match self {
                    $(Self::$variant(_) => ComponentKind::$variant,)+
                }
            }
        }

        impl ComponentKind {
            pub const ALL: &'static [ComponentKind] = &[$(ComponentKind::$variant,)+];

            pub fn name(self) -> &'static str {
                match self {
                    $(Self::$variant => $name,)+
                }
            }
        }

        $(
            impl ComponentData for $ty {
                const KIND: ComponentKind = ComponentKind::$variant;

                fn into_component(self) -> Component {
                    Component::$variant(self)
                }

                fn from_component(component: &Component) -> Option<&Self> {
                    match component {
                        Component::$variant(value) => Some(value),
                        #[allow(unreachable_patterns)]
                        _ => None,
                    }
                }
            }

            impl From<$ty> for Component {
                fn from(value: $ty) -> Self {
                    Component::$variant(value)
                }
            }
        )+
    };
}

component_model! {
    Name(Name) => "name",
    Position(Position) => "position",
    Velocity(Velocity) => "velocity",
    Aabb(Aabb) => "aabb",
    Paddle(Paddle) => "paddle",
    PlayerControl(PlayerControl) => "playerControl",
    PaddleAi(PaddleAi) => "paddleAI",
    Ball(Ball) => "ball",
    Score(Score) => "score",
    Transform(Transform) => "transform",
    Renderable2D(Renderable2D) => "renderable2D",
    Mesh3D(Mesh3D) => "mesh3D",
    ViewMode(ViewModeComponent) => "viewMode",
    RotationBehavior(RotationBehavior) => "rotationBehavior",
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
