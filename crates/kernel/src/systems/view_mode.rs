use glam::{Vec2, Vec3};
use phosphor_common::{Transform, Transform2D, Transform3D, ViewMode};
use phosphor_ecs::{
    ComponentKind, ComponentStore, Geometry, Mesh3D, Renderable2D, ViewModeComponent,
};

use super::transform_sync::SPATIAL_EXTENT;
use super::{System, SystemContext};
use crate::world::WorldEvent;

/// Pixel transform to the spatial cube. Rotation lands on the y axis and z is 0.
pub fn planar_to_spatial(t: &Transform2D, field: Vec2) -> Transform3D {
    let span = 2.0 * SPATIAL_EXTENT;
    let position = Vec2::new(
        t.position.x / field.x * span - SPATIAL_EXTENT,
        SPATIAL_EXTENT - t.position.y / field.y * span,
    );
    let scale = t.scale * span / field;
    Transform3D {
        position: position.extend(0.0),
        rotation: Vec3::new(0.0, t.rotation, 0.0),
        scale: scale.extend(scale.x.min(scale.y)),
    }
}

/// Inverse of [`planar_to_spatial`]. Drops z and any x/z tilt.
pub fn spatial_to_planar(t: &Transform3D, field: Vec2) -> Transform2D {
    let span = 2.0 * SPATIAL_EXTENT;
    Transform2D {
        position: Vec2::new(
            (t.position.x + SPATIAL_EXTENT) / span * field.x,
            (SPATIAL_EXTENT - t.position.y) / span * field.y,
        ),
        rotation: t.rotation.y,
        scale: t.scale.truncate() * field / span,
    }
}

/// Brings every mode-aware entity in line with the global view mode.
///
/// This is the only place a transform changes shape. Entities that do not
/// support the requested mode keep their current one.
pub struct ViewModeAdapter;

impl System for ViewModeAdapter {
    fn name(&self) -> &'static str {
        "view_mode_adapter"
    }

    fn execute(&mut self, store: &mut ComponentStore, _dt: f32, ctx: &mut SystemContext<'_>) {
        let target = ctx.view_mode;
        let field = ctx.params.field_size;
        for entity in store.query(&[ComponentKind::ViewMode, ComponentKind::Transform]) {
            let (Some(vm), Some(&transform)) = (
                store.get::<ViewModeComponent>(entity),
                store.get::<Transform>(entity),
            ) else {
                continue;
            };
            if vm.current_mode == target && transform.mode() == target {
                continue;
            }
            if !vm.supports(target) {
                if ctx.mode_changed {
                    tracing::warn!(%entity, mode = %target, "entity does not support view mode");
                }
                continue;
            }

            let mut vm = vm.clone();
            let converted = match transform {
                Transform::Planar(t) if target == ViewMode::Spatial => {
                    Transform::Spatial(planar_to_spatial(&t, field))
                }
                Transform::Spatial(t) if target == ViewMode::Planar => {
                    Transform::Planar(spatial_to_planar(&t, field))
                }
                same => same,
            };
            store.add_component(entity, converted);

            match vm.geometry.get(&target).copied() {
                Some(Geometry::Shape(shape)) => {
                    store.remove::<Mesh3D>(entity);
                    store.add_component(entity, shape);
                }
                Some(Geometry::Mesh(mesh)) => {
                    store.remove::<Renderable2D>(entity);
                    store.add_component(entity, mesh);
                }
                None => {
                    tracing::debug!(%entity, mode = %target, "no geometry for view mode");
                    store.remove::<Mesh3D>(entity);
                    store.remove::<Renderable2D>(entity);
                }
            }

            vm.current_mode = target;
            store.add_component(entity, vm);
            tracing::debug!(%entity, mode = %target, "view mode switched");
            ctx.events.push(WorldEvent::ModeSwitched { entity, mode: target });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::systems::testing::Harness;
    use approx::assert_abs_diff_eq;
    use phosphor_common::{Color, EntityId, MeshHandle, Shape2D};
    use std::collections::{BTreeMap, BTreeSet};

    const FIELD: Vec2 = Vec2::new(800.0, 600.0);

    fn shape() -> Renderable2D {
        Renderable2D {
            shape: Shape2D::Rect { size: Vec2::ONE },
            color: Color::WHITE,
        }
    }

    fn mesh() -> Mesh3D {
        Mesh3D {
            handle: MeshHandle(1),
            color: None,
        }
    }

    fn dual_entity(store: &mut ComponentStore, t: Transform2D) -> EntityId {
        let e = store.spawn();
        store.add_component(e, ViewModeComponent::dual(ViewMode::Planar, shape(), mesh()));
        store.add_component(e, Transform::Planar(t));
        store.add_component(e, shape());
        e
    }

    #[test]
    fn planar_spatial_planar_round_trip() {
        let t = Transform2D {
            position: Vec2::new(123.0, 456.0),
            rotation: 0.7,
            scale: Vec2::new(16.0, 90.0),
        };
        let back = spatial_to_planar(&planar_to_spatial(&t, FIELD), FIELD);
        assert_abs_diff_eq!(back.position.x, t.position.x, epsilon = 1e-3);
        assert_abs_diff_eq!(back.position.y, t.position.y, epsilon = 1e-3);
        assert_abs_diff_eq!(back.rotation, t.rotation, epsilon = 1e-6);
        assert_abs_diff_eq!(back.scale.x, t.scale.x, epsilon = 1e-3);
        assert_abs_diff_eq!(back.scale.y, t.scale.y, epsilon = 1e-3);
    }

    #[test]
    fn spatial_tilt_is_lost_on_round_trip() {
        let t = Transform3D {
            position: Vec3::new(2.0, -3.0, 4.0),
            rotation: Vec3::new(0.3, 0.5, 0.2),
            scale: Vec3::ONE,
        };
        let back = planar_to_spatial(&spatial_to_planar(&t, FIELD), FIELD);
        assert_abs_diff_eq!(back.position.x, 2.0, epsilon = 1e-4);
        assert_abs_diff_eq!(back.position.y, -3.0, epsilon = 1e-4);
        assert_eq!(back.position.z, 0.0);
        assert_eq!(back.rotation, Vec3::new(0.0, 0.5, 0.0));
    }

    #[test]
    fn field_center_maps_to_origin() {
        let t = planar_to_spatial(&Transform2D::from_position(FIELD * 0.5), FIELD);
        assert_eq!(t.position, Vec3::ZERO);
    }

    #[test]
    fn switch_swaps_transform_and_geometry() {
        let mut store = ComponentStore::new();
        let e = dual_entity(&mut store, Transform2D::from_position(Vec2::new(400.0, 300.0)));

        let mut h = Harness::new();
        h.view_mode = ViewMode::Spatial;
        h.run(&mut ViewModeAdapter, &mut store, 0.016);

        assert_eq!(store.get::<Transform>(e).map(Transform::mode), Some(ViewMode::Spatial));
        assert_eq!(store.get::<Mesh3D>(e), Some(&mesh()));
        assert!(store.get::<Renderable2D>(e).is_none());
        assert_eq!(
            store.get::<ViewModeComponent>(e).map(|vm| vm.current_mode),
            Some(ViewMode::Spatial)
        );
        assert!(matches!(
            h.events.as_slice(),
            [WorldEvent::ModeSwitched {
                mode: ViewMode::Spatial,
                ..
            }]
        ));

        h.events.clear();
        h.run(&mut ViewModeAdapter, &mut store, 0.016);
        assert!(h.events.is_empty());

        h.view_mode = ViewMode::Planar;
        h.run(&mut ViewModeAdapter, &mut store, 0.016);
        let t = *store.get::<Transform>(e).unwrap().as_planar().unwrap();
        assert_abs_diff_eq!(t.position.x, 400.0, epsilon = 1e-3);
        assert_abs_diff_eq!(t.position.y, 300.0, epsilon = 1e-3);
        assert_eq!(store.get::<Renderable2D>(e), Some(&shape()));
        assert!(store.get::<Mesh3D>(e).is_none());
    }

    #[test]
    fn unsupported_mode_is_left_alone() {
        let mut store = ComponentStore::new();
        let e = store.spawn();
        store.add_component(
            e,
            ViewModeComponent {
                supported: BTreeSet::from([ViewMode::Planar]),
                current_mode: ViewMode::Planar,
                geometry: BTreeMap::from([(ViewMode::Planar, Geometry::Shape(shape()))]),
            },
        );
        store.add_component(e, Transform::Planar(Transform2D::default()));

        let mut h = Harness::new();
        h.view_mode = ViewMode::Spatial;
        h.run(&mut ViewModeAdapter, &mut store, 0.016);

        assert_eq!(store.get::<Transform>(e).map(Transform::mode), Some(ViewMode::Planar));
        assert!(h.events.is_empty());
    }
}
