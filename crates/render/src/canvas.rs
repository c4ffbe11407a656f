use glam::Vec2;
use phosphor_common::Color;
use phosphor_common::math::clip_segment;
use std::collections::HashSet;
use std::io::{self, Write};
use std::path::Path;

/// Drawing surface the wireframe pipeline strokes onto.
pub trait Canvas {
    /// Surface size in pixels.
    fn size(&self) -> (u32, u32);

    fn clear(&mut self, color: Color);

    /// Stroke a line of the given width, blending with `color.a`.
    fn stroke_line(&mut self, from: Vec2, to: Vec2, width: f32, color: Color);

    /// Scale one pixel row toward black by `amount` in [0, 1].
    fn darken_row(&mut self, y: u32, amount: f32);
}

/// Software RGB canvas.
#[derive(Debug, Clone)]
pub struct Framebuffer {
    width: u32,
    height: u32,
    pixels: Vec<[f32; 3]>,
}

impl Framebuffer {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![[0.0; 3]; width as usize * height as usize],
        }
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Color> {
        self.index(x as i64, y as i64)
            .map(|i| Color::rgb(self.pixels[i][0], self.pixels[i][1], self.pixels[i][2]))
    }

    /// Binary PPM (P6) encoding of the current contents.
    pub fn to_ppm(&self) -> Vec<u8> {
        let mut out = format!("P6\n{} {}\n255\n", self.width, self.height).into_bytes();
        out.reserve(self.pixels.len() * 3);
        for px in &self.pixels {
            out.extend_from_slice(&Color::rgb(px[0], px[1], px[2]).to_rgb8());
        }
        out
    }

    pub fn write_ppm(&self, path: &Path) -> io::Result<()> {
        let mut file = io::BufWriter::new(std::fs::File::create(path)?);
        file.write_all(&self.to_ppm())?;
        file.flush()
    }

    fn index(&self, x: i64, y: i64) -> Option<usize> {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return None;
        }
        Some(y as usize * self.width as usize + x as usize)
    }

    /// Pixels covered by a stroke. Each pixel appears once so overlapping
    /// samples along one stroke do not blend twice.
    ///
    /// The stroke is clipped to the surface (grown by its radius) first, so
    /// the walk is bounded by the surface size.
    fn coverage(&self, from: Vec2, to: Vec2, width: f32) -> HashSet<usize> {
        let radius = (width * 0.5).max(0.5);
        let mut covered = HashSet::new();
        let bounds = Vec2::new(self.width as f32, self.height as f32) + radius;
        let Some((from, to)) = clip_segment(from, to, Vec2::splat(-radius), bounds) else {
            return covered;
        };
        let steps = (to - from).abs().max_element().ceil().max(1.0) as usize;

        for i in 0..=steps {
            let p = from.lerp(to, i as f32 / steps as f32);
            if let Some(idx) = self.index(p.x.floor() as i64, p.y.floor() as i64) {
                covered.insert(idx);
            }
            let (x0, x1) = ((p.x - radius).floor() as i64, (p.x + radius).ceil() as i64);
            let (y0, y1) = ((p.y - radius).floor() as i64, (p.y + radius).ceil() as i64);
            for y in y0..y1 {
                for x in x0..x1 {
                    let center = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
                    if center.distance_squared(p) <= radius * radius {
                        if let Some(idx) = self.index(x, y) {
                            covered.insert(idx);
                        }
                    }
                }
            }
        }
        covered
    }
}

impl Canvas for Framebuffer {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn clear(&mut self, color: Color) {
        self.pixels.fill([color.r, color.g, color.b]);
    }

    fn stroke_line(&mut self, from: Vec2, to: Vec2, width: f32, color: Color) {
        if !(from.is_finite() && to.is_finite()) {
            return;
        }
        let a = color.a.clamp(0.0, 1.0);
        let src = [color.r, color.g, color.b];
        for idx in self.coverage(from, to, width) {
            for (dst, s) in self.pixels[idx].iter_mut().zip(src) {
                *dst = *dst * (1.0 - a) + s * a;
            }
        }
    }

    fn darken_row(&mut self, y: u32, amount: f32) {
        if y >= self.height {
            return;
        }
        let keep = 1.0 - amount.clamp(0.0, 1.0);
        let start = y as usize * self.width as usize;
        for px in &mut self.pixels[start..start + self.width as usize] {
            for c in px.iter_mut() {
                *c *= keep;
            }
        }
    }
}
