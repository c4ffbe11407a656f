use glam::{Vec2, Vec3};
use phosphor_common::{Transform, Transform2D, Transform3D, ViewMode};
use phosphor_ecs::{Aabb, ComponentKind, ComponentStore};

use super::paddle::center_of;
use super::{System, SystemContext};
use crate::SimParams;

/// Half-width of the spatial cube the normalized field maps onto.
pub const SPATIAL_EXTENT: f32 = 10.0;

/// Normalized field coordinates (y up) to planar pixel coordinates (y down).
pub fn to_pixel(p: Vec2, field: Vec2) -> Vec2 {
    Vec2::new((p.x + 1.0) * 0.5 * field.x, (1.0 - p.y) * 0.5 * field.y)
}

/// Normalized field coordinates to the x/y plane of the spatial cube.
pub fn to_spatial(p: Vec2) -> Vec2 {
    p * SPATIAL_EXTENT
}

/// Pixel scale for a unit-sized planar shape covering `size` normalized units.
pub fn planar_scale(size: Vec2, field: Vec2) -> Vec2 {
    size * field * 0.5
}

/// Fresh transform of the given shape for a box centered at `center`.
pub fn render_transform(center: Vec2, size: Vec2, mode: ViewMode, params: &SimParams) -> Transform {
    match mode {
        ViewMode::Planar => Transform::Planar(Transform2D {
            position: to_pixel(center, params.field_size),
            rotation: 0.0,
            scale: planar_scale(size, params.field_size),
        }),
        ViewMode::Spatial => {
            let scale = to_spatial(size);
            Transform::Spatial(Transform3D {
                position: to_spatial(center).extend(0.0),
                rotation: Vec3::ZERO,
                scale: scale.extend(scale.x.min(scale.y)),
            })
        }
    }
}

/// Copies each entity's normalized position into its transform.
///
/// The transform keeps whatever shape it has; only the view mode adapter
/// converts between shapes. Rotation and the spatial z axis are left alone.
pub struct TransformSyncSystem;

impl System for TransformSyncSystem {
    fn name(&self) -> &'static str {
        "transform_sync"
    }

    fn execute(&mut self, store: &mut ComponentStore, _dt: f32, ctx: &mut SystemContext<'_>) {
        let field = ctx.params.field_size;
        for entity in store.query(&[ComponentKind::Position, ComponentKind::Transform]) {
            let (Some(center), Some(&current)) = (center_of(store, entity), store.get::<Transform>(entity))
            else {
                continue;
            };
            let size = store.get::<Aabb>(entity).map(|b| b.size);

            let synced = match current {
                Transform::Planar(mut t) => {
                    t.position = to_pixel(center, field);
                    if let Some(size) = size {
                        t.scale = planar_scale(size, field);
                    }
                    Transform::Planar(t)
                }
                Transform::Spatial(mut t) => {
                    let xy = to_spatial(center);
                    t.position = xy.extend(t.position.z);
                    if let Some(size) = size {
                        let s = to_spatial(size);
                        t.scale = s.extend(t.scale.z);
                    }
                    Transform::Spatial(t)
                }
            };
            if synced != current {
                store.add_component(entity, synced);
            }
        }
    }
}
