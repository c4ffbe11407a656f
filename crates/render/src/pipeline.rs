//! Per-frame transform, project, cull, sort and draw.
//!
//! Occlusion comes only from back-face culling and a global far-to-near sort
//! of edge midpoint depths. An edge shared by a visible and a hidden face is
//! still drawn.

use glam::{Mat4, Vec2, Vec3, Vec4};
use phosphor_assets::Mesh;
use phosphor_common::math::{perspective_divide, signed_area};
use phosphor_common::{Color, Shape2D, Transform2D, Transform3D};
use std::sync::Arc;

use crate::{Camera, Canvas, FrontFace, RenderConfig};

/// Vertical period of the scanline pattern, in pixels.
pub const SCANLINE_PERIOD: f32 = 4.0;

/// A shared mesh placed in the world.
#[derive(Debug, Clone)]
pub struct MeshInstance {
    pub mesh: Arc<Mesh>,
    pub transform: Transform3D,
    pub color: Color,
}

/// A planar outline placed in pixel space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShapeInstance {
    pub shape: Shape2D,
    pub transform: Transform2D,
    pub color: Color,
}

/// One visibility-resolved screen-space stroke.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineSegment {
    pub p1: Vec2,
    pub p2: Vec2,
    /// Mean NDC depth of the endpoints; larger is farther.
    pub depth: f32,
    pub color: Color,
}

#[derive(Debug, Clone, Copy)]
struct Projected {
    screen: Vec2,
    depth: f32,
}

/// A transformed vertex. `projected` is `None` when the vertex lies in front
/// of the near plane (or behind the eye).
#[derive(Debug, Clone, Copy)]
struct Vertex {
    clip: Vec4,
    projected: Option<Projected>,
}

/// Wireframe renderer with approximate hidden-line removal.
#[derive(Debug, Clone)]
pub struct WireframeRenderer {
    config: RenderConfig,
    elapsed: f32,
}

impl WireframeRenderer {
    pub fn new(config: RenderConfig) -> Self {
        Self {
            config: config.sanitized(),
            elapsed: 0.0,
        }
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Replace the configuration; values are clamped into range.
    pub fn set_config(&mut self, config: RenderConfig) {
        self.config = config.sanitized();
    }

    /// Seconds accumulated across rendered frames; drives the scanline scroll.
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Render mesh instances and return the drawn segments in draw order.
    pub fn render(
        &mut self,
        instances: &[MeshInstance],
        camera: &Camera,
        dt: f32,
        canvas: &mut dyn Canvas,
    ) -> Vec<LineSegment> {
        self.render_frame(instances, &[], camera, dt, canvas)
    }

    /// Render meshes and planar shapes together.
    ///
    /// Planar outlines sit at depth 0 and are drawn after the mesh edges.
    pub fn render_frame(
        &mut self,
        instances: &[MeshInstance],
        shapes: &[ShapeInstance],
        camera: &Camera,
        dt: f32,
        canvas: &mut dyn Canvas,
    ) -> Vec<LineSegment> {
        let _span = tracing::debug_span!(
            "render_frame",
            meshes = instances.len(),
            shapes = shapes.len()
        )
        .entered();

        if dt.is_finite() && dt > 0.0 {
            self.elapsed += dt;
        }

        let mut segments = self.resolve(instances, camera);
        segments.extend(self.resolve_shapes(shapes));

        canvas.clear(self.config.background_color);
        for seg in &segments {
            self.draw_segment(seg, canvas);
        }
        self.apply_scanlines(canvas);

        tracing::trace!(segments = segments.len(), "frame drawn");
        segments
    }

    /// Visibility-resolved segments for mesh instances, in draw order.
    ///
    /// This is exactly what [`WireframeRenderer::render`] strokes; exporters
    /// can reuse it without a canvas.
    pub fn resolve(&self, instances: &[MeshInstance], camera: &Camera) -> Vec<LineSegment> {
        let view_proj = camera.view_projection(self.config.projection);
        let viewport = self.config.viewport();
        let cull = self.culling_enabled();

        let mut segments = Vec::new();
        for instance in instances {
            let mvp = view_proj * instance.transform.model_matrix();
            let vertices = project_vertices(instance.mesh.vertices(), &mvp, viewport);
            let mesh = &instance.mesh;

            let ends: Vec<_> = mesh
                .edges()
                .iter()
                .map(|&[a, b]| near_clipped(vertices[a], vertices[b], viewport))
                .collect();

            let mut draw = vec![false; mesh.edge_count()];
            if cull {
                for (face, front) in self.front_faces(mesh, &vertices).into_iter().enumerate() {
                    if front {
                        for &edge in mesh.face_edges(face) {
                            draw[edge] = true;
                        }
                    }
                }
                for &edge in mesh.loose_edges() {
                    draw[edge] = ends[edge].is_some_and(|e| touches_viewport(e, viewport));
                }
            } else {
                for (i, end) in ends.iter().enumerate() {
                    draw[i] = end.is_some_and(|e| touches_viewport(e, viewport));
                }
            }

            for (i, end) in ends.into_iter().enumerate() {
                if !draw[i] {
                    continue;
                }
                if let Some((pa, pb)) = end {
                    segments.push(LineSegment {
                        p1: pa.screen,
                        p2: pb.screen,
                        depth: (pa.depth + pb.depth) * 0.5,
                        color: instance.color,
                    });
                }
            }
        }

        if self.config.hidden_line_removal {
            // stable, so equal depths keep submission order
            segments.sort_by(|a, b| b.depth.total_cmp(&a.depth));
        }
        segments
    }

    /// Closed outlines of planar shapes in pixel space.
    pub fn resolve_shapes(&self, shapes: &[ShapeInstance]) -> Vec<LineSegment> {
        let mut segments = Vec::new();
        for instance in shapes {
            let affine = instance.transform.affine();
            let points: Vec<Vec2> = instance
                .shape
                .outline()
                .into_iter()
                .map(|p| affine.transform_point2(p))
                .collect();
            for (i, &p1) in points.iter().enumerate() {
                let p2 = points[(i + 1) % points.len()];
                segments.push(LineSegment {
                    p1,
                    p2,
                    depth: 0.0,
                    color: instance.color,
                });
            }
        }
        segments
    }

    /// Indices of faces that face the camera, or every face when culling is off.
    pub fn visible_faces(&self, instance: &MeshInstance, camera: &Camera) -> Vec<usize> {
        let mesh = &instance.mesh;
        if !self.culling_enabled() {
            return (0..mesh.face_count()).collect();
        }
        let mvp = camera.view_projection(self.config.projection) * instance.transform.model_matrix();
        let vertices = project_vertices(mesh.vertices(), &mvp, self.config.viewport());
        self.front_faces(mesh, &vertices)
            .into_iter()
            .enumerate()
            .filter_map(|(i, front)| front.then_some(i))
            .collect()
    }

    fn culling_enabled(&self) -> bool {
        self.config.hidden_line_removal && self.config.backface_culling
    }

    /// Front-facing flag per face. Faces touching a vertex in front of the
    /// near plane count as hidden.
    fn front_faces(&self, mesh: &Mesh, vertices: &[Vertex]) -> Vec<bool> {
        mesh.faces()
            .iter()
            .map(|face| {
                let corner = |k: usize| vertices[face[k]].projected.map(|p| p.screen);
                if face.iter().any(|&v| vertices[v].projected.is_none()) {
                    return false;
                }
                let (Some(a), Some(b), Some(c)) = (corner(0), corner(1), corner(2)) else {
                    return false;
                };
                // screen y points down, which flips the apparent winding
                let area = signed_area(a, b, c);
                match self.config.front_face {
                    FrontFace::CounterClockwise => area < 0.0,
                    FrontFace::Clockwise => area > 0.0,
                }
            })
            .collect()
    }

    fn draw_segment(&self, seg: &LineSegment, canvas: &mut dyn Canvas) {
        let glow = self.config.glow_intensity;
        let width = self.config.line_width;
        let layers = (glow * 2.0).ceil() as u32;
        for i in (1..=layers).rev() {
            let spread = i as f32;
            let alpha = (0.15 * glow / spread).min(1.0) * seg.color.a;
            canvas.stroke_line(
                seg.p1,
                seg.p2,
                width * (1.0 + 2.0 * spread),
                seg.color.with_alpha(alpha),
            );
        }
        canvas.stroke_line(seg.p1, seg.p2, width, seg.color);
    }

    fn apply_scanlines(&self, canvas: &mut dyn Canvas) {
        let intensity = self.config.scanline_intensity;
        if intensity <= 0.0 {
            return;
        }
        let offset = (self.elapsed / self.config.scanline_speed).fract() * SCANLINE_PERIOD;
        let (_, height) = canvas.size();
        for y in 0..height {
            if (y as f32 + offset) % SCANLINE_PERIOD < 1.0 {
                canvas.darken_row(y, intensity);
            }
        }
    }
}

impl Default for WireframeRenderer {
    fn default() -> Self {
        Self::new(RenderConfig::default())
    }
}

fn project_vertices(vertices: &[Vec3], mvp: &Mat4, viewport: Vec2) -> Vec<Vertex> {
    vertices
        .iter()
        .map(|v| {
            let clip = *mvp * v.extend(1.0);
            let visible = clip.w > 0.0 && clip.z >= -clip.w;
            Vertex {
                clip,
                projected: visible.then(|| to_screen(clip, viewport)),
            }
        })
        .collect()
}

fn to_screen(clip: Vec4, viewport: Vec2) -> Projected {
    let ndc = perspective_divide(clip);
    Projected {
        screen: Vec2::new(
            (ndc.x + 1.0) * 0.5 * viewport.x,
            (1.0 - ndc.y) * 0.5 * viewport.y,
        ),
        depth: ndc.z,
    }
}

/// Screen endpoints of an edge after clipping it to the near plane
/// (`z = -w` in clip space). `None` when the whole edge is in front of it.
fn near_clipped(a: Vertex, b: Vertex, viewport: Vec2) -> Option<(Projected, Projected)> {
    match (a.projected, b.projected) {
        (Some(pa), Some(pb)) => Some((pa, pb)),
        (None, None) => None,
        (Some(pa), None) => Some((pa, near_point(a.clip, b.clip, viewport)?)),
        (None, Some(pb)) => Some((near_point(b.clip, a.clip, viewport)?, pb)),
    }
}

/// Where the clip-space edge from `inside` to `outside` meets the near plane.
fn near_point(inside: Vec4, outside: Vec4, viewport: Vec2) -> Option<Projected> {
    let (di, d_o) = (inside.z + inside.w, outside.z + outside.w);
    let t = di / (di - d_o);
    let clip = inside.lerp(outside, t);
    (t.is_finite() && clip.w > 0.0).then(|| to_screen(clip, viewport))
}

fn touches_viewport((a, b): (Projected, Projected), viewport: Vec2) -> bool {
    let inside = |p: Projected| {
        p.screen.x >= 0.0 && p.screen.y >= 0.0 && p.screen.x <= viewport.x && p.screen.y <= viewport.y
    };
    inside(a) || inside(b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Framebuffer, Projection};

    fn cube_instance() -> MeshInstance {
        MeshInstance {
            mesh: Arc::new(Mesh::cube(1.0)),
            transform: Transform3D::default(),
            color: Color::WHITE,
        }
    }

    fn quiet_config() -> RenderConfig {
        RenderConfig {
            width: 64,
            height: 48,
            glow_intensity: 0.0,
            scanline_intensity: 0.0,
            ..RenderConfig::default()
        }
    }

    #[test]
    fn corner_view_of_cube_draws_three_faces() {
        let renderer = WireframeRenderer::new(quiet_config());
        let camera = Camera::new(Vec3::new(5.0, 4.0, 6.0), Vec3::ZERO);
        let cube = cube_instance();
        assert_eq!(renderer.visible_faces(&cube, &camera).len(), 3);
        assert_eq!(renderer.resolve(&[cube], &camera).len(), 9);
    }

    #[test]
    fn culling_is_a_strict_subset_from_many_angles() {
        let renderer = WireframeRenderer::new(quiet_config());
        let sphere = MeshInstance {
            mesh: Arc::new(Mesh::icosphere(1.0, 1)),
            transform: Transform3D::default(),
            color: Color::WHITE,
        };
        let cube = cube_instance();
        for i in 0..12 {
            let mut camera = Camera::new(Vec3::new(0.0, 0.0, 8.0), Vec3::ZERO);
            camera.orbit(i as f32 * 0.55, (i as f32 * 0.37).sin());
            for instance in [&sphere, &cube] {
                let visible = renderer.visible_faces(instance, &camera).len();
                assert!(visible > 0, "no faces visible at step {i}");
                assert!(visible < instance.mesh.face_count(), "all faces visible at step {i}");
            }
        }
    }

    #[test]
    fn without_culling_every_onscreen_edge_is_kept() {
        let renderer = WireframeRenderer::new(RenderConfig {
            backface_culling: false,
            ..quiet_config()
        });
        let camera = Camera::new(Vec3::new(5.0, 4.0, 6.0), Vec3::ZERO);
        assert_eq!(renderer.visible_faces(&cube_instance(), &camera).len(), 6);
        assert_eq!(renderer.resolve(&[cube_instance()], &camera).len(), 12);
    }

    #[test]
    fn segments_are_sorted_far_to_near() {
        let renderer = WireframeRenderer::new(quiet_config());
        let camera = Camera::new(Vec3::new(3.0, 2.0, 9.0), Vec3::ZERO);
        let mut instances = vec![cube_instance()];
        instances.push(MeshInstance {
            mesh: Arc::new(Mesh::icosphere(0.8, 2)),
            transform: Transform3D::from_position(Vec3::new(1.5, 0.0, -2.0)),
            color: Color::AMBER,
        });
        let segments = renderer.resolve(&instances, &camera);
        assert!(!segments.is_empty());
        assert!(segments.windows(2).all(|w| w[0].depth >= w[1].depth));
    }

    #[test]
    fn geometry_behind_the_camera_is_skipped() {
        let renderer = WireframeRenderer::new(quiet_config());
        let camera = Camera::new(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO);
        let behind = MeshInstance {
            transform: Transform3D::from_position(Vec3::new(0.0, 0.0, 20.0)),
            ..cube_instance()
        };
        assert!(renderer.resolve(&[behind], &camera).is_empty());
    }

    fn loose_edge(a: Vec3, b: Vec3) -> MeshInstance {
        MeshInstance {
            mesh: Arc::new(Mesh::new(vec![a, b], vec![[0, 1]], vec![]).unwrap()),
            transform: Transform3D::default(),
            color: Color::WHITE,
        }
    }

    #[test]
    fn edge_crossing_the_near_plane_is_clipped_to_it() {
        let renderer = WireframeRenderer::new(quiet_config());
        let camera = Camera::new(Vec3::new(0.0, 0.0, 10.0), Vec3::ZERO);
        let edge = loose_edge(Vec3::ZERO, Vec3::new(1000.0, 0.0, 9.9999));

        let segments = renderer.resolve(&[edge], &camera);
        assert_eq!(segments.len(), 1);
        let seg = segments[0];
        assert!(seg.p1.is_finite() && seg.p2.is_finite());
        assert!((seg.p1 - Vec2::new(32.0, 24.0)).length() < 1e-3);
        // the clipped end sits on the near plane, NDC z = -1
        assert!(seg.depth > -1.0 && seg.depth < 1.0);
        assert!(seg.p2.x > seg.p1.x);
    }

    #[test]
    fn edge_entirely_inside_the_near_plane_is_dropped() {
        let renderer = WireframeRenderer::new(RenderConfig {
            backface_culling: false,
            ..quiet_config()
        });
        let camera = Camera::new(Vec3::new(0.0, 0.0, 10.0), Vec3::ZERO);
        let edge = loose_edge(Vec3::new(0.0, 0.0, 9.95), Vec3::new(0.01, 0.0, 9.99));
        assert!(renderer.resolve(&[edge], &camera).is_empty());
    }

    #[test]
    fn partly_offscreen_cube_keeps_edges_touching_the_viewport() {
        let renderer = WireframeRenderer::new(RenderConfig {
            backface_culling: false,
            ..quiet_config()
        });
        let camera = Camera::new(Vec3::new(0.0, 0.0, 6.0), Vec3::ZERO);
        let cube = MeshInstance {
            transform: Transform3D::from_position(Vec3::new(3.3, 0.0, 0.0)),
            ..cube_instance()
        };
        let segments = renderer.resolve(&[cube], &camera);
        assert!(!segments.is_empty() && segments.len() < 12);
        let inside = |p: Vec2| p.x >= 0.0 && p.y >= 0.0 && p.x <= 64.0 && p.y <= 48.0;
        assert!(segments.iter().all(|s| inside(s.p1) || inside(s.p2)));
    }

    #[test]
    fn offscreen_strokes_render_in_bounded_time() {
        let config = RenderConfig::default();
        let mut renderer = WireframeRenderer::new(config.clone());
        let camera = Camera::new(Vec3::new(0.0, 0.0, 10.0), Vec3::ZERO);
        let edge = loose_edge(Vec3::ZERO, Vec3::new(1000.0, 0.0, 9.9999));
        let mut fb = Framebuffer::new(config.width, config.height);

        let started = std::time::Instant::now();
        let drawn = renderer.render(&[edge], &camera, 0.016, &mut fb);
        assert!(started.elapsed() < std::time::Duration::from_secs(5));
        assert_eq!(drawn.len(), 1);
        assert!(fb.pixel(600, 300).unwrap().g > 0.0);
    }

    #[test]
    fn loose_edges_survive_culling() {
        let mesh = Mesh::new(
            vec![Vec3::new(-1.0, 0.0, 0.0), Vec3::new(1.0, 0.0, 0.0)],
            vec![[0, 1]],
            vec![],
        )
        .unwrap();
        let instance = MeshInstance {
            mesh: Arc::new(mesh),
            transform: Transform3D::default(),
            color: Color::WHITE,
        };
        let renderer = WireframeRenderer::new(quiet_config());
        let camera = Camera::new(Vec3::new(0.0, 0.0, 6.0), Vec3::ZERO);
        assert_eq!(renderer.resolve(&[instance], &camera).len(), 1);
    }

    #[test]
    fn orthographic_projection_keeps_cube_centered() {
        let renderer = WireframeRenderer::new(RenderConfig {
            projection: Projection::Orthographic,
            ..quiet_config()
        });
        let camera = Camera::new(Vec3::new(0.0, 0.0, 10.0), Vec3::ZERO);
        let segments = renderer.resolve(&[cube_instance()], &camera);
        // only the +z face looks at the camera
        assert_eq!(segments.len(), 4);
        for seg in segments {
            assert!((seg.p1.x - 32.0).abs() < 5.0);
            assert!((seg.p1.y - 24.0).abs() < 5.0);
        }
    }

    #[test]
    fn shapes_outline_in_pixel_space() {
        let renderer = WireframeRenderer::default();
        let rect = ShapeInstance {
            shape: Shape2D::Rect {
                size: Vec2::new(4.0, 2.0),
            },
            transform: Transform2D::from_position(Vec2::new(10.0, 10.0)),
            color: Color::WHITE,
        };
        let segments = renderer.resolve_shapes(&[rect]);
        assert_eq!(segments.len(), 4);
        assert_eq!(segments[0].p1, Vec2::new(8.0, 9.0));
        assert_eq!(segments[3].p2, Vec2::new(8.0, 9.0));
    }

    #[test]
    fn render_returns_what_it_drew_and_advances_time() {
        let mut renderer = WireframeRenderer::new(quiet_config());
        let camera = Camera::new(Vec3::new(5.0, 4.0, 6.0), Vec3::ZERO);
        let mut fb = Framebuffer::new(64, 48);
        let drawn = renderer.render(&[cube_instance()], &camera, 0.25, &mut fb);
        assert_eq!(drawn, renderer.resolve(&[cube_instance()], &camera));
        assert!((renderer.elapsed() - 0.25).abs() < 1e-6);

        let start = drawn[0].p1;
        assert_eq!(fb.pixel(start.x as u32, start.y as u32), Some(Color::WHITE));
    }

    #[test]
    fn glow_spreads_beyond_the_crisp_line() {
        let line = ShapeInstance {
            shape: Shape2D::Rect {
                size: Vec2::new(40.0, 0.0),
            },
            transform: Transform2D::from_position(Vec2::new(30.5, 20.5)),
            color: Color::WHITE,
        };
        let mut plain = WireframeRenderer::new(quiet_config());
        let mut fb = Framebuffer::new(64, 48);
        plain.render_frame(&[], &[line], &Camera::default(), 0.0, &mut fb);
        assert_eq!(fb.pixel(20, 22), Some(Color::BLACK));

        let mut glowing = WireframeRenderer::new(RenderConfig {
            glow_intensity: 1.0,
            ..quiet_config()
        });
        glowing.render_frame(&[], &[line], &Camera::default(), 0.0, &mut fb);
        assert!(fb.pixel(20, 22).unwrap().g > 0.0);
        assert_eq!(fb.pixel(20, 20), Some(Color::WHITE));
    }

    #[test]
    fn scanlines_darken_every_fourth_row() {
        let mut renderer = WireframeRenderer::new(RenderConfig {
            background_color: Color::WHITE,
            scanline_intensity: 0.5,
            ..quiet_config()
        });
        let mut fb = Framebuffer::new(64, 48);
        renderer.render(&[], &Camera::default(), 0.0, &mut fb);
        let dark = (0..48)
            .filter(|&y| fb.pixel(0, y) != Some(Color::WHITE))
            .count();
        assert_eq!(dark, 12);
        assert_eq!(fb.pixel(0, 0), Some(Color::rgb(0.5, 0.5, 0.5)));
    }
}
