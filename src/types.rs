// Core types shared by the stroke pipeline and the window shell.

use glam::Vec2;
use serde::Deserialize;

/// A software surface the window can show directly.
/// Visual: every pixel of the sketch pad (or of one undo layer) lives here.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameBuffer {
    pub width: usize,      // how wide the surface is (pixels)
    pub height: usize,     // how tall the surface is (pixels)
    pub pixels: Vec<u32>,  // each entry is 0x00RRGGBB for minifb
}

impl FrameBuffer {
    /// A surface of the given size, filled with one color.
    pub fn new(width: usize, height: usize, fill: Color) -> Self {
        Self { width, height, pixels: vec![fill.to_u32(); width * height] }
    }

    /// Paint every pixel with `color` (the "clear" before a full re-render).
    pub fn fill(&mut self, color: Color) {
        let packed = color.to_u32();
        for px in &mut self.pixels { *px = packed; }
    }

    /// Copy-and-replace at a new size. The overlapping top-left region is kept,
    /// newly exposed pixels get `fill`.
    /// Visual: after a window resize the drawing stays where it was.
    pub fn resized(&self, width: usize, height: usize, fill: Color) -> Self {
        let mut out = Self::new(width, height, fill);
        let keep_w = self.width.min(width);
        for y in 0..self.height.min(height) {
            let src = y * self.width;
            let dst = y * width;
            out.pixels[dst..dst + keep_w].copy_from_slice(&self.pixels[src..src + keep_w]);
        }
        out
    }

    /// Pixel at (x,y), or None outside the surface.
    #[cfg(test)]
    pub fn pixel(&self, x: i32, y: i32) -> Option<u32> {
        if x < 0 || y < 0 { return None; }
        let (x, y) = (x as usize, y as usize);
        if x >= self.width || y >= self.height { return None; }
        Some(self.pixels[y * self.width + x])
    }
}

/// Straight (non-premultiplied) RGBA color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    #[serde(default = "opaque")]
    pub a: u8,
}

fn opaque() -> u8 { 255 }

impl Color {
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const BLACK: Color = Color::rgb(0, 0, 0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self { Self { r, g, b, a: 255 } }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self { Self { r, g, b, a } }

    /// Pack as 0x00RRGGBB; alpha is dropped (the window has no alpha channel).
    #[inline]
    pub fn to_u32(self) -> u32 {
        ((self.r as u32) << 16) | ((self.g as u32) << 8) | self.b as u32
    }
}

/// One sampled location along a stroke.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
    pub thickness: u8,
    /// False marks the last point of a stroke (pen lifted).
    pub connects_to_next: bool,
}

impl Point {
    pub fn new(x: f32, y: f32, thickness: u8, connects_to_next: bool) -> Self {
        Self { x, y, thickness, connects_to_next }
    }

    #[inline]
    pub fn pos(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }
}

/// View transform: stroke space is scaled by `scale`, then shifted by `offset`.
/// Visual: dragging with the pan tool slides the drawing, the wheel zooms it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pan {
    pub offset: Vec2,
    pub scale: f32,
}

impl Default for Pan {
    fn default() -> Self {
        Self { offset: Vec2::ZERO, scale: 1.0 }
    }
}

/// Wheel zoom tuning: each wheel step multiplies the scale by `step`,
/// the result is clamped to `[min, max]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Zoom {
    pub step: f32,
    pub min: f32,
    pub max: f32,
}

impl Default for Zoom {
    fn default() -> Self {
        Self { step: 1.1, min: 0.1, max: 2.0 }
    }
}

impl Pan {
    /// Shift the view by a relative pointer motion.
    pub fn by(&mut self, dx: f32, dy: f32) {
        self.offset += Vec2::new(dx, dy);
    }

    /// Zoom by `steps` wheel notches around `cursor` (screen space); the stroke
    /// point under the cursor stays under it. Returns false when the scale was
    /// already at its limit.
    pub fn zoom_at(&mut self, cursor: Vec2, steps: f32, zoom: Zoom) -> bool {
        let anchor = self.unapply(cursor.x, cursor.y);
        let scale = (self.scale * zoom.step.powf(steps)).clamp(zoom.min, zoom.max);
        if scale == self.scale {
            return false;
        }
        self.scale = scale;
        self.offset = cursor - anchor * scale;
        true
    }

    /// Stroke space -> screen space.
    #[inline]
    pub fn apply(&self, p: Vec2) -> Vec2 {
        p * self.scale + self.offset
    }

    /// Screen space -> stroke space (where new points are stored).
    #[inline]
    pub fn unapply(&self, x: f32, y: f32) -> Vec2 {
        (Vec2::new(x, y) - self.offset) / self.scale
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resize_keeps_overlap_and_fills_the_rest() {
        let mut fb = FrameBuffer::new(3, 2, Color::BLACK);
        fb.pixels[1] = 0x00_12_34_56;
        fb.pixels[3 + 2] = 0x00_FF_00_00;

        let grown = fb.resized(4, 3, Color::WHITE);
        assert_eq!(grown.pixel(1, 0), Some(0x00_12_34_56));
        assert_eq!(grown.pixel(2, 1), Some(0x00_FF_00_00));
        assert_eq!(grown.pixel(3, 0), Some(0x00_FF_FF_FF));
        assert_eq!(grown.pixel(0, 2), Some(0x00_FF_FF_FF));

        let shrunk = fb.resized(2, 1, Color::WHITE);
        assert_eq!(shrunk.pixels, vec![0, 0x00_12_34_56]);
    }

    #[test]
    fn pan_round_trips_between_spaces() {
        let mut pan = Pan::default();
        pan.by(10.0, -4.0);
        pan.by(0.5, 0.5);
        let stored = pan.unapply(100.0, 100.0);
        assert_eq!(stored, Vec2::new(89.5, 103.5));
        assert_eq!(pan.apply(stored), Vec2::new(100.0, 100.0));
    }

    #[test]
    fn zoom_keeps_the_point_under_the_cursor() {
        let mut pan = Pan::default();
        pan.by(30.0, -20.0);
        let cursor = Vec2::new(200.0, 150.0);
        let under = pan.unapply(cursor.x, cursor.y);

        assert!(pan.zoom_at(cursor, 2.0, Zoom::default()));
        assert!((pan.scale - 1.21).abs() < 1e-5);
        assert!(pan.apply(under).distance(cursor) < 1e-3);

        assert!(pan.zoom_at(cursor, -3.0, Zoom::default()));
        assert!(pan.apply(under).distance(cursor) < 1e-3);
        assert!(pan.unapply(cursor.x, cursor.y).distance(under) < 1e-3);
    }

    #[test]
    fn zoom_is_clamped_and_reports_no_change_at_the_limit() {
        let zoom = Zoom::default();
        let mut pan = Pan::default();
        assert!(pan.zoom_at(Vec2::new(10.0, 10.0), 50.0, zoom));
        assert_eq!(pan.scale, 2.0);
        let before = pan;
        assert!(!pan.zoom_at(Vec2::new(90.0, 40.0), 1.0, zoom));
        assert_eq!(pan, before);

        assert!(pan.zoom_at(Vec2::ZERO, -100.0, zoom));
        assert_eq!(pan.scale, 0.1);
    }
}
