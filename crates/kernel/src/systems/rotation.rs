use phosphor_common::Transform;
use phosphor_ecs::{ComponentKind, ComponentStore, RotationBehavior};

use super::{System, SystemContext};

/// Spins transforms at a constant angular velocity.
///
/// Planar transforms only carry the y component, matching how the view
/// mode adapter maps a planar rotation onto the spatial y axis.
pub struct RotationSystem;

impl System for RotationSystem {
    fn name(&self) -> &'static str {
        "rotation"
    }

    fn execute(&mut self, store: &mut ComponentStore, dt: f32, _ctx: &mut SystemContext<'_>) {
        let kinds = [ComponentKind::RotationBehavior, ComponentKind::Transform];
        for entity in store.query(&kinds) {
            let (Some(&spin), Some(&transform)) = (
                store.get::<RotationBehavior>(entity),
                store.get::<Transform>(entity),
            ) else {
                continue;
            };
            if spin.angular_velocity == glam::Vec3::ZERO {
                continue;
            }
            let rotated = match transform {
                Transform::Planar(mut t) => {
                    t.rotation += spin.angular_velocity.y * dt;
                    Transform::Planar(t)
                }
                Transform::Spatial(mut t) => {
                    t.rotation += spin.angular_velocity * dt;
                    Transform::Spatial(t)
                }
            };
            store.add_component(entity, rotated);
        }
    }
}
