// Stroke rendering: points -> anti-aliased lines and cubic curves on a surface.
// Visual outcomes:
// - Finished strokes appear as smooth curves (4-point sliding Bezier window).
// - Edges are soft: every line is drawn with Xiaolin Wu's algorithm.
// - The stroke still being drawn shows as a thin straight-segment preview.

use crate::gamma;
use crate::points::PointBuffer;
use crate::simplify::perpendicular_distance;
use crate::types::{Color, FrameBuffer, Pan};
use glam::Vec2;

/// Anything the renderer can paint on.
pub trait Canvas {
    /// (width, height) in pixels; used to skip lines that are fully off-surface.
    fn size(&self) -> (usize, usize);

    /// Paint one pixel with `color`, scaled by `intensity` in [0,1].
    /// Out-of-bounds coordinates must be ignored.
    fn plot(&mut self, x: i32, y: i32, color: Color, intensity: f32);
}

impl Canvas for FrameBuffer {
    fn size(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    #[inline]
    fn plot(&mut self, x: i32, y: i32, color: Color, intensity: f32) {
        if x < 0 || y < 0 {
            return;
        }
        let (x, y) = (x as usize, y as usize);
        if x >= self.width || y >= self.height {
            return;
        }
        let idx = y * self.width + x;
        self.pixels[idx] = gamma::lut().blend(self.pixels[idx], color, intensity);
    }
}

#[inline]
fn fpart(x: f32) -> f32 {
    x - x.floor()
}

#[inline]
fn rfpart(x: f32) -> f32 {
    1.0 - fpart(x)
}

/// Draw an anti-aliased line with Xiaolin Wu's algorithm.
/// Returns false when the line was skipped for lying entirely off the canvas.
pub fn wu_line<C: Canvas + ?Sized>(canvas: &mut C, from: Vec2, to: Vec2, color: Color) -> bool {
    let (w, h) = canvas.size();
    let (w, h) = (w as f32, h as f32);
    let (mut x0, mut y0, mut x1, mut y1) = (from.x, from.y, to.x, to.y);

    if (x0 < 0.0 && x1 < 0.0) || (x0 > w && x1 > w) || (y0 < 0.0 && y1 < 0.0) || (y0 > h && y1 > h) {
        return false;
    }

    // Walk the long axis.
    let steep = (y1 - y0).abs() > (x1 - x0).abs();
    let long_extent = (if steep { h } else { w }) as i32;
    if steep {
        std::mem::swap(&mut x0, &mut y0);
        std::mem::swap(&mut x1, &mut y1);
    }
    if x0 > x1 {
        std::mem::swap(&mut x0, &mut x1);
        std::mem::swap(&mut y0, &mut y1);
    }

    let dx = x1 - x0;
    let dy = y1 - y0;
    let gradient = if dx.abs() < 1e-6 { 1.0 } else { dy / dx };

    let mut plot = |x: i32, y: i32, c: f32| {
        if steep {
            canvas.plot(y, x, color, c);
        } else {
            canvas.plot(x, y, color, c);
        }
    };

    // First endpoint
    let xend = x0.round();
    let yend = y0 + gradient * (xend - x0);
    let xgap = rfpart(x0 + 0.5);
    let xpxl1 = xend as i32;
    let ypxl1 = yend.floor() as i32;
    plot(xpxl1, ypxl1, rfpart(yend) * xgap);
    plot(xpxl1, ypxl1 + 1, fpart(yend) * xgap);
    let first_y = yend;

    // Second endpoint
    let xend = x1.round();
    let yend = y1 + gradient * (xend - x1);
    let xgap = fpart(x1 + 0.5);
    let xpxl2 = xend as i32;
    let ypxl2 = yend.floor() as i32;
    plot(xpxl2, ypxl2, rfpart(yend) * xgap);
    plot(xpxl2, ypxl2 + 1, fpart(yend) * xgap);

    // Everything in between straddles two pixels on the short axis.
    // Only the stretch over the canvas is walked.
    let first = xpxl1.saturating_add(1).max(0);
    let last = xpxl2.min(long_extent + 1);
    let mut intery = first_y + gradient * (first as f32 - xpxl1 as f32);
    for x in first..last {
        let y = intery.floor() as i32;
        plot(x, y, rfpart(intery));
        plot(x, y + 1, fpart(intery));
        intery += gradient;
    }
    true
}

/// A cubic Bezier segment given by its four control points.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CubicBezier {
    pub p0: Vec2,
    pub p1: Vec2,
    pub p2: Vec2,
    pub p3: Vec2,
}

impl CubicBezier {
    pub fn new(p0: Vec2, p1: Vec2, p2: Vec2, p3: Vec2) -> Self {
        Self { p0, p1, p2, p3 }
    }

    /// Three points: the last one doubles as both trailing control points.
    pub fn from_three(p0: Vec2, p1: Vec2, p2: Vec2) -> Self {
        Self::new(p0, p1, p2, p2)
    }

    /// Point at parameter `t` (de Casteljau).
    pub fn point_at(&self, t: f32) -> Vec2 {
        let a = self.p0.lerp(self.p1, t);
        let b = self.p1.lerp(self.p2, t);
        let c = self.p2.lerp(self.p3, t);
        let d = a.lerp(b, t);
        let e = b.lerp(c, t);
        d.lerp(e, t)
    }

    /// Largest distance of an inner control point from the chord, over the chord length.
    /// Zero for a straight curve; the chord length is floored so a closed curve stays finite.
    pub fn deviation_factor(&self) -> f32 {
        let (a, b) = (self.p0.as_dvec2(), self.p3.as_dvec2());
        let deviation = perpendicular_distance(self.p1.as_dvec2(), a, b)
            .max(perpendicular_distance(self.p2.as_dvec2(), a, b)) as f32;
        let length = self.p0.distance(self.p3).max(1e-5);
        deviation / length
    }

    /// The `steps` points after `p0`, ending exactly at `p3`.
    pub fn tessellate(&self, steps: u32) -> impl Iterator<Item = Vec2> + '_ {
        let steps = steps.max(1);
        (1..=steps).map(move |i| self.point_at(i as f32 / steps as f32))
    }
}

/// Tessellation density: `clamp(base + deviation_factor * range, min, max)`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StepRange {
    pub base: f32,
    pub range: f32,
    pub min: u32,
    pub max: u32,
}

impl Default for StepRange {
    fn default() -> Self {
        // 70 segments for a flat curve, up to 200 for a sharp one
        Self { base: 70.0, range: 200.0, min: 70, max: 200 }
    }
}

impl StepRange {
    pub fn estimate(&self, curve: &CubicBezier) -> u32 {
        let raw = self.base + curve.deviation_factor() * self.range;
        let raw = if raw.is_finite() { raw } else { self.max as f32 };
        (raw.max(0.0) as u32).clamp(self.min, self.max.max(self.min))
    }
}

/// What one render call put on the canvas.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RenderStats {
    pub lines: usize,     // 2-point windows drawn as a straight line
    pub curves: usize,    // 3- and 4-point windows drawn as cubics
    pub segments: usize,  // Wu line calls in total (curves contribute one per step)
}

/// Turns the point buffer into ink. Holds only tuning; progress lives in the buffer.
#[derive(Clone, Copy, Debug, Default)]
pub struct StrokeRenderer {
    pub steps: StepRange,
}

impl StrokeRenderer {
    pub fn new(steps: StepRange) -> Self {
        Self { steps }
    }

    /// Render points `[from, to]` (inclusive, `to` clamped to the buffer) with
    /// the 4-point sliding window. When the range starts inside the already
    /// drawn prefix, `rendered_till` moves past `to`; a detached range leaves it.
    /// `to <= from` or an empty buffer draws nothing.
    pub fn render_range<C: Canvas + ?Sized>(
        &self,
        canvas: &mut C,
        buffer: &mut PointBuffer,
        pan: Pan,
        from: usize,
        to: usize,
        color: Color,
    ) -> RenderStats {
        let mut stats = RenderStats::default();
        if buffer.is_empty() || to <= from || from >= buffer.len() {
            return stats;
        }
        let to = to.min(buffer.len() - 1);

        let mut window: Vec<Vec2> = Vec::with_capacity(4);
        for p in &buffer.points()[from..=to] {
            window.push(pan.apply(p.pos()));

            if !p.connects_to_next {
                self.flush(canvas, &window, color, &mut stats);
                window.clear();
            }

            if window.len() == 4 {
                self.draw_curve(canvas, CubicBezier::new(window[0], window[1], window[2], window[3]), color, &mut stats);
                // The curve continues from its own endpoint.
                let last = window[3];
                window.clear();
                window.push(last);
            }
        }
        self.flush(canvas, &window, color, &mut stats);

        // Only a range that joins the drawn prefix extends it.
        if from <= buffer.rendered_till() {
            buffer.set_rendered_till(buffer.rendered_till().max(to + 1));
        }
        stats
    }

    /// Render the whole buffer (after a pan, resize or undo). Leaves
    /// `rendered_till` at the point count.
    pub fn render_all<C: Canvas + ?Sized>(
        &self,
        canvas: &mut C,
        buffer: &mut PointBuffer,
        pan: Pan,
        color: Color,
    ) -> RenderStats {
        if buffer.is_empty() {
            return RenderStats::default();
        }
        let last = buffer.len() - 1;
        let stats = self.render_range(canvas, buffer, pan, 0, last, color);
        buffer.set_rendered_till(buffer.len());
        stats
    }

    /// Straight-segment preview of points not yet on the layer.
    /// Visual: the in-progress stroke follows the cursor before it is smoothed.
    /// Does not move `rendered_till`.
    pub fn render_preview<C: Canvas + ?Sized>(
        &self,
        canvas: &mut C,
        buffer: &PointBuffer,
        pan: Pan,
        color: Color,
    ) -> RenderStats {
        let mut stats = RenderStats::default();
        let points = buffer.points();
        let from = buffer.rendered_till();
        if points.len() < 2 || from + 1 >= points.len() {
            return stats;
        }
        for pair in points[from..].windows(2) {
            if pair[0].connects_to_next {
                wu_line(canvas, pan.apply(pair[0].pos()), pan.apply(pair[1].pos()), color);
                stats.lines += 1;
                stats.segments += 1;
            }
        }
        stats
    }

    // Draw a cut-short window: 2 points are a line, 3 a degenerate cubic, 4 a cubic.
    fn flush<C: Canvas + ?Sized>(&self, canvas: &mut C, window: &[Vec2], color: Color, stats: &mut RenderStats) {
        match *window {
            [a, b] => {
                wu_line(canvas, a, b, color);
                stats.lines += 1;
                stats.segments += 1;
            }
            [a, b, c] => self.draw_curve(canvas, CubicBezier::from_three(a, b, c), color, stats),
            [a, b, c, d] => self.draw_curve(canvas, CubicBezier::new(a, b, c, d), color, stats),
            _ => {}
        }
    }

    fn draw_curve<C: Canvas + ?Sized>(&self, canvas: &mut C, curve: CubicBezier, color: Color, stats: &mut RenderStats) {
        let steps = self.steps.estimate(&curve);
        let mut prev = curve.p0;
        for next in curve.tessellate(steps) {
            wu_line(canvas, prev, next, color);
            stats.segments += 1;
            prev = next;
        }
        stats.curves += 1;
    }
}
