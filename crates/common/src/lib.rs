//! Shared types for the phosphor workspace: vector/matrix math, the two-shape
//! `Transform`, view modes, colors and opaque identifiers.
//!
//! # Invariants
//! - Math never fails: degenerate input resolves to a documented default.
//! - A `Transform` is either planar or spatial; nothing here converts between them.

pub mod math;
pub mod shape;
pub mod transform;
pub mod types;

pub use shape::Shape2D;
pub use transform::{Transform, Transform2D, Transform3D};
pub use types::{Color, EntityId, MeshHandle, ParseViewModeError, Side, ViewMode};

pub use glam::{Mat4, Vec2, Vec3, Vec4};
