use glam::{IVec2, Vec2};
use phosphor_common::math::clip_segment;
use std::fmt;

use crate::LineSegment;

/// Character-grid rendering of a resolved segment list.
///
/// Segments are drawn in the order given, so a depth-sorted list keeps the
/// same occlusion the pixel pipeline produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextArt {
    cols: usize,
    rows: usize,
    cells: Vec<char>,
}

impl TextArt {
    pub fn blank(cols: usize, rows: usize) -> Self {
        Self {
            cols,
            rows,
            cells: vec![' '; cols * rows],
        }
    }

    /// Scale segments from a pixel `viewport` onto a `cols` x `rows` grid.
    pub fn from_segments(segments: &[LineSegment], viewport: Vec2, cols: usize, rows: usize) -> Self {
        let mut art = Self::blank(cols, rows);
        if viewport.x <= 0.0 || viewport.y <= 0.0 {
            return art;
        }
        let scale = Vec2::new(cols as f32 / viewport.x, rows as f32 / viewport.y);

        for seg in segments {
            if !(seg.p1.is_finite() && seg.p2.is_finite()) {
                continue;
            }
            art.cells_line((seg.p1 * scale).floor(), (seg.p2 * scale).floor());
        }
        art
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn get(&self, col: usize, row: usize) -> Option<char> {
        (col < self.cols && row < self.rows).then(|| self.cells[row * self.cols + col])
    }

    /// Bresenham walk from `a` to `b` with a single glyph for the whole line.
    ///
    /// Cells outside the grid are never visited; the glyph still follows the
    /// full line's angle.
    pub fn line(&mut self, a: IVec2, b: IVec2) {
        self.cells_line(a.as_vec2(), b.as_vec2());
    }

    fn cells_line(&mut self, a: Vec2, b: Vec2) {
        if self.cols == 0 || self.rows == 0 {
            return;
        }
        let glyph = line_glyph(b - a);
        let last = Vec2::new(self.cols as f32 - 1.0, self.rows as f32 - 1.0);
        let Some((a, b)) = clip_segment(a, b, Vec2::ZERO, last) else {
            return;
        };
        self.walk(a.round().as_ivec2(), b.round().as_ivec2(), glyph);
    }

    fn walk(&mut self, a: IVec2, b: IVec2, glyph: char) {
        let d = (b - a).abs();
        let step = IVec2::new(if a.x < b.x { 1 } else { -1 }, if a.y < b.y { 1 } else { -1 });
        let mut err = d.x - d.y;
        let mut p = a;
        loop {
            self.put(p, glyph);
            if p == b {
                break;
            }
            let e2 = 2 * err;
            if e2 > -d.y {
                err -= d.y;
                p.x += step.x;
            }
            if e2 < d.x {
                err += d.x;
                p.y += step.y;
            }
        }
    }

    fn put(&mut self, p: IVec2, glyph: char) {
        if p.x >= 0 && p.y >= 0 && (p.x as usize) < self.cols && (p.y as usize) < self.rows {
            self.cells[p.y as usize * self.cols + p.x as usize] = glyph;
        }
    }
}

/// Glyph for a line with the given cell delta (y grows downward).
fn line_glyph(delta: Vec2) -> char {
    let (dx, dy) = (delta.x, delta.y);
    if dx == 0.0 && dy == 0.0 {
        '*'
    } else if dx == 0.0 {
        '|'
    } else if dy == 0.0 {
        '-'
    } else {
        let angle = dy.abs().atan2(dx.abs()).to_degrees();
        if angle < 20.0 {
            '-'
        } else if angle < 70.0 {
            if (dx > 0.0) == (dy > 0.0) { '\\' } else { '/' }
        } else {
            '|'
        }
    }
}

impl fmt::Display for TextArt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, row) in self.cells.chunks(self.cols.max(1)).enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            let line: String = row.iter().collect();
            f.write_str(line.trim_end())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use phosphor_common::Color;

    fn seg(p1: (f32, f32), p2: (f32, f32)) -> LineSegment {
        LineSegment {
            p1: Vec2::new(p1.0, p1.1),
            p2: Vec2::new(p2.0, p2.1),
            depth: 0.0,
            color: Color::WHITE,
        }
    }

    #[test]
    fn glyph_follows_angle() {
        assert_eq!(line_glyph(Vec2::ZERO), '*');
        assert_eq!(line_glyph(Vec2::new(0.0, 5.0)), '|');
        assert_eq!(line_glyph(Vec2::new(5.0, 0.0)), '-');
        assert_eq!(line_glyph(Vec2::new(10.0, 1.0)), '-');
        assert_eq!(line_glyph(Vec2::new(3.0, 3.0)), '\\');
        assert_eq!(line_glyph(Vec2::new(-3.0, -3.0)), '\\');
        assert_eq!(line_glyph(Vec2::new(3.0, -3.0)), '/');
        assert_eq!(line_glyph(Vec2::new(1.0, 10.0)), '|');
    }

    #[test]
    fn horizontal_segment_fills_a_row() {
        let art = TextArt::from_segments(&[seg((0.0, 5.0), (99.0, 5.0))], Vec2::new(100.0, 100.0), 10, 10);
        assert!((0..10).all(|c| art.get(c, 0) == Some('-')));
        assert_eq!(art.get(0, 1), Some(' '));
    }

    #[test]
    fn later_segments_overwrite_earlier_ones() {
        let segments = [seg((0.0, 0.0), (9.0, 0.0)), seg((5.0, 0.0), (5.0, 9.0))];
        let art = TextArt::from_segments(&segments, Vec2::splat(10.0), 10, 10);
        assert_eq!(art.get(5, 0), Some('|'));
        assert_eq!(art.get(4, 0), Some('-'));
    }

    #[test]
    fn offscreen_points_are_dropped() {
        let art = TextArt::from_segments(&[seg((-50.0, -50.0), (-10.0, -20.0))], Vec2::splat(10.0), 4, 4);
        assert_eq!(art, TextArt::blank(4, 4));
    }

    #[test]
    fn far_endpoints_are_clipped_to_the_grid() {
        let art = TextArt::from_segments(
            &[seg((400.0, 300.0), (7_232_817_700.0, 300.0))],
            Vec2::new(800.0, 600.0),
            80,
            40,
        );
        assert!((40..80).all(|c| art.get(c, 20) == Some('-')));
        assert_eq!(art.get(39, 20), Some(' '));

        let mut art = TextArt::blank(4, 4);
        art.line(IVec2::new(i32::MIN, 1), IVec2::new(i32::MAX, 1));
        assert!((0..4).all(|c| art.get(c, 1) == Some('-')));
    }

    #[test]
    fn display_joins_trimmed_rows() {
        let mut art = TextArt::blank(3, 2);
        art.line(IVec2::new(0, 1), IVec2::new(0, 1));
        assert_eq!(art.to_string(), "\n*");
    }
}
