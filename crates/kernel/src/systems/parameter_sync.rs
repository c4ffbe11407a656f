use glam::Vec2;
use phosphor_ecs::{Aabb, Ball, ComponentKind, ComponentStore, Paddle, Position, Velocity};

use super::{System, SystemContext};

/// Pushes the live [`crate::SimParams`] into paddle and ball components.
///
/// Runs last so a parameter change made between ticks is visible to every
/// system on the next one. Unchanged components are not rewritten.
pub struct ParameterSyncSystem;

impl System for ParameterSyncSystem {
    fn name(&self) -> &'static str {
        "parameter_sync"
    }

    fn execute(&mut self, store: &mut ComponentStore, _dt: f32, ctx: &mut SystemContext<'_>) {
        let params = ctx.params;

        for entity in store.query(&[ComponentKind::Paddle]) {
            let Some(&paddle) = store.get::<Paddle>(entity) else {
                continue;
            };
            let synced = Paddle {
                speed: params.paddle_speed,
                length: params.paddle_length,
                ..paddle
            };
            if synced != paddle {
                store.add_component(entity, synced);
            }

            let travel = synced.side.travel_axis();
            let mut size = Vec2::ZERO;
            size[travel] = params.paddle_length;
            size[1 - travel] = params.paddle_thickness;
            if store.get::<Aabb>(entity).map(|b| b.size) != Some(size) {
                store.add_component(entity, Aabb { size });
            }

            if let Some(&Position(p)) = store.get::<Position>(entity) {
                let (lo, hi) = synced.travel_range();
                let mut clamped = p;
                clamped[travel] = p[travel].clamp(lo, hi);
                if clamped != p {
                    store.add_component(entity, Position(clamped));
                }
            }
        }

        for entity in store.query(&[ComponentKind::Ball]) {
            let Some(&ball) = store.get::<Ball>(entity) else {
                continue;
            };
            if ball.serve_speed != params.serve_speed {
                store.add_component(
                    entity,
                    Ball {
                        serve_speed: params.serve_speed,
                    },
                );
            }

            let size = Vec2::splat(params.ball_size);
            if store.get::<Aabb>(entity).map(|b| b.size) != Some(size) {
                store.add_component(entity, Aabb { size });
            }

            if let Some(&Velocity(v)) = store.get::<Velocity>(entity) {
                let limited = v.clamp_length_max(params.max_ball_speed);
                if limited != v {
                    tracing::trace!(%entity, speed = v.length(), "ball speed limited");
                    store.add_component(entity, Velocity(limited));
                }
            }
        }
    }
}
