// Line simplification for finished strokes (Ramer-Douglas-Peucker).
// Visual: none directly; the stroke looks the same but is stored with far
// fewer points, which also gives the curve renderer cleaner control points.

use crate::error::SimplifyError;
use crate::points::PointBuffer;
use crate::types::Point;
use glam::DVec2;
use tracing::debug;

/// How far a dropped point may sit from the simplified path.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Tolerance {
    /// Derived from the stroke itself: `max((mean + stddev) * scale, min)` of the
    /// interior points' distances to the stroke chord. Passes repeat until one
    /// removes nothing, so the result is a fixed point.
    Adaptive { scale: f64, min: f64 },
    /// One pass with a caller-chosen epsilon.
    Fixed(f64),
}

impl Default for Tolerance {
    fn default() -> Self {
        Tolerance::Adaptive { scale: 1e-3, min: 1e-3 }
    }
}

/// Outcome of one [`simplify`] call.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Simplified {
    pub before: usize,  // points in the range before
    pub after: usize,   // points in the range after
    pub epsilon: f64,   // tolerance used by the last pass
    pub passes: usize,
}

impl Simplified {
    pub fn removed(&self) -> usize {
        self.before - self.after
    }
}

/// Distance from `pt` to the infinite line through `start` and `end`.
/// A zero-length chord falls back to the plain distance to `start`.
pub fn perpendicular_distance(pt: DVec2, start: DVec2, end: DVec2) -> f64 {
    let d = end - start;
    if d.x == 0.0 && d.y == 0.0 {
        return pt.distance(start);
    }
    let num = (d.y * pt.x - d.x * pt.y + end.x * start.y - end.y * start.x).abs();
    num / d.length()
}

#[inline]
fn pos64(p: &Point) -> DVec2 {
    DVec2::new(p.x as f64, p.y as f64)
}

/// Adaptive epsilon for one stroke (see [`Tolerance::Adaptive`]).
pub fn adaptive_epsilon(stroke: &[Point], scale: f64, min: f64) -> f64 {
    if stroke.len() < 3 {
        return min;
    }
    let (a, b) = (pos64(&stroke[0]), pos64(&stroke[stroke.len() - 1]));
    let interior = &stroke[1..stroke.len() - 1];
    let n = interior.len() as f64;

    let mean = interior.iter().map(|p| perpendicular_distance(pos64(p), a, b)).sum::<f64>() / n;
    let variance = interior
        .iter()
        .map(|p| {
            let d = perpendicular_distance(pos64(p), a, b) - mean;
            d * d
        })
        .sum::<f64>()
        / n;

    ((mean + variance.sqrt()) * scale).max(min)
}

/// Mark the points of `stroke` that RDP keeps at `epsilon`.
/// Splits on `max_dist >= epsilon`; a zero maximum never splits.
/// Uses an explicit work stack so very long strokes cannot overflow the call stack.
fn mark_kept(stroke: &[Point], epsilon: f64, keep: &mut [bool]) {
    let last = stroke.len() - 1;
    keep[0] = true;
    keep[last] = true;

    let mut pending = vec![(0usize, last)];
    while let Some((start, end)) = pending.pop() {
        if end <= start + 1 {
            continue;
        }

        let (a, b) = (pos64(&stroke[start]), pos64(&stroke[end]));
        let mut max_dist = 0.0;
        let mut index = start;
        for (i, p) in stroke.iter().enumerate().take(end).skip(start + 1) {
            let dist = perpendicular_distance(pos64(p), a, b);
            if dist > max_dist {
                max_dist = dist;
                index = i;
            }
        }

        if index != start && max_dist >= epsilon {
            keep[index] = true;
            pending.push((index, end));
            pending.push((start, index));
        }
    }
}

/// Simplify the stroke stored at `[start, end]` (inclusive) in place.
///
/// The first and last point of the range always survive, points after `end`
/// shift left, and `rendered_till` moves to the new count. An empty buffer is
/// a no-op.
pub fn simplify(
    buffer: &mut PointBuffer,
    start: usize,
    end: usize,
    tolerance: Tolerance,
) -> Result<Simplified, SimplifyError> {
    if buffer.is_empty() {
        return Ok(Simplified { before: 0, after: 0, epsilon: 0.0, passes: 0 });
    }
    if start > end || end >= buffer.len() {
        return Err(SimplifyError::Range { start, end, len: buffer.len() });
    }

    let before = end + 1 - start;
    let mut end = end;
    let mut report = Simplified { before, after: before, epsilon: 0.0, passes: 0 };

    loop {
        let stroke = &buffer.points()[start..=end];
        let epsilon = match tolerance {
            Tolerance::Adaptive { scale, min } => adaptive_epsilon(stroke, scale, min),
            Tolerance::Fixed(eps) => eps,
        };

        let mut keep = Vec::new();
        keep.try_reserve_exact(stroke.len()).map_err(SimplifyError::Alloc)?;
        keep.resize(stroke.len(), false);
        mark_kept(stroke, epsilon, &mut keep);

        let removed = buffer.compact_range(start, end, &keep);
        end -= removed;
        report.epsilon = epsilon;
        report.passes += 1;

        let again = matches!(tolerance, Tolerance::Adaptive { .. }) && removed > 0;
        if !again {
            break;
        }
    }

    report.after = end + 1 - start;
    debug!(
        start,
        before = report.before,
        after = report.after,
        epsilon = report.epsilon,
        passes = report.passes,
        "simplified stroke"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buffer_of(coords: &[(f32, f32)]) -> PointBuffer {
        let mut buf = PointBuffer::new();
        for (i, &(x, y)) in coords.iter().enumerate() {
            buf.append(x, y, 3, i + 1 != coords.len()).unwrap();
        }
        buf
    }

    fn xy(buf: &PointBuffer) -> Vec<(f32, f32)> {
        buf.points().iter().map(|p| (p.x, p.y)).collect()
    }

    fn wobbly_stroke() -> Vec<(f32, f32)> {
        (0..200)
            .map(|i| {
                let t = i as f32 * 0.1;
                (t * 12.0, 40.0 * t.sin() + 0.3 * (t * 7.0).cos())
            })
            .collect()
    }

    const OUTLIER: [(f32, f32); 6] =
        [(0.0, 0.0), (1.0, 0.001), (2.0, 0.001), (3.0, 50.0), (4.0, 0.001), (5.0, 0.0)];

    #[test]
    fn distance_to_a_degenerate_chord_is_euclidean() {
        let p = DVec2::new(3.0, 4.0);
        let c = DVec2::new(0.0, 0.0);
        assert_eq!(perpendicular_distance(p, c, c), 5.0);
    }

    #[test]
    fn distance_to_a_chord() {
        let d = perpendicular_distance(DVec2::new(5.0, 3.0), DVec2::new(0.0, 0.0), DVec2::new(10.0, 0.0));
        assert!((d - 3.0).abs() < 1e-12);
    }

    #[test]
    fn adaptive_epsilon_is_mean_plus_stddev_scaled() {
        // Interior distances to the chord (0,0)-(10,0) are 1 and 3: mean 2, stddev 1.
        let stroke = [
            Point::new(0.0, 0.0, 3, true),
            Point::new(3.0, 1.0, 3, true),
            Point::new(6.0, -3.0, 3, true),
            Point::new(10.0, 0.0, 3, false),
        ];
        assert!((adaptive_epsilon(&stroke, 1.0, 0.0) - 3.0).abs() < 1e-12);
        assert!((adaptive_epsilon(&stroke, 1e-3, 1e-3) - 3e-3).abs() < 1e-12);
        assert_eq!(adaptive_epsilon(&stroke, 1e-3, 5.0), 5.0);
        assert_eq!(adaptive_epsilon(&stroke[..2], 1.0, 0.25), 0.25);
    }

    #[test]
    fn noisier_strokes_get_a_looser_epsilon() {
        let zigzag = |amp: f32| -> Vec<Point> {
            (0..=20)
                .map(|i| {
                    let y = if i == 0 || i == 20 { 0.0 } else if i % 2 == 0 { amp } else { -amp };
                    Point::new(i as f32, y, 3, i != 20)
                })
                .collect()
        };
        let flat = adaptive_epsilon(&zigzag(0.1), 1e-3, 0.0);
        let noisy = adaptive_epsilon(&zigzag(5.0), 1e-3, 0.0);
        assert!(flat > 0.0);
        assert!(noisy > flat * 10.0, "flat {flat}, noisy {noisy}");
    }

    #[test]
    fn default_tolerance_on_the_outlier_stroke() {
        let mut buf = buffer_of(&OUTLIER);
        let out = simplify(&mut buf, 0, 5, Tolerance::default()).unwrap();
        // Pass one drops (1, 0.001); pass two recomputes epsilon and removes nothing.
        assert_eq!(out.passes, 2);
        assert!(out.epsilon > 0.0400 && out.epsilon < 0.0405, "epsilon {}", out.epsilon);
        assert_eq!(xy(&buf), vec![(0.0, 0.0), (2.0, 0.001), (3.0, 50.0), (4.0, 0.001), (5.0, 0.0)]);
    }

    #[test]
    fn straight_stroke_collapses_to_its_endpoints() {
        let coords: Vec<(f32, f32)> = (0..50).map(|i| (i as f32, 2.0 * i as f32)).collect();

        let mut buf = buffer_of(&coords);
        let out = simplify(&mut buf, 0, 49, Tolerance::default()).unwrap();
        assert_eq!(out.after, 2);
        assert_eq!(xy(&buf), vec![(0.0, 0.0), (49.0, 98.0)]);

        let mut buf = buffer_of(&coords);
        simplify(&mut buf, 0, 49, Tolerance::Fixed(1e-9)).unwrap();
        assert_eq!(buf.len(), 2);
    }

    #[test]
    fn outlier_survives_a_small_epsilon() {
        let mut buf = buffer_of(&OUTLIER);
        simplify(&mut buf, 0, 5, Tolerance::Fixed(10.0)).unwrap();
        assert_eq!(xy(&buf), vec![(0.0, 0.0), (3.0, 50.0), (5.0, 0.0)]);
    }

    #[test]
    fn outlier_goes_with_a_large_epsilon() {
        let mut buf = buffer_of(&OUTLIER);
        simplify(&mut buf, 0, 5, Tolerance::Fixed(60.0)).unwrap();
        assert_eq!(xy(&buf), vec![(0.0, 0.0), (5.0, 0.0)]);
    }

    #[test]
    fn point_exactly_at_epsilon_is_kept() {
        // (1,2) is exactly 2 away from the chord (0,0)-(2,0).
        let mut buf = buffer_of(&[(0.0, 0.0), (1.0, 2.0), (2.0, 0.0)]);
        simplify(&mut buf, 0, 2, Tolerance::Fixed(2.0)).unwrap();
        assert_eq!(buf.len(), 3);
    }

    #[test]
    fn adaptive_simplification_is_idempotent() {
        let coords = wobbly_stroke();
        let mut buf = buffer_of(&coords);
        let first = simplify(&mut buf, 0, coords.len() - 1, Tolerance::default()).unwrap();
        assert!(first.after < first.before);
        assert!(first.after >= 2);

        let snapshot = xy(&buf);
        let end = buf.len() - 1;
        let second = simplify(&mut buf, 0, end, Tolerance::default()).unwrap();
        assert_eq!(second.removed(), 0);
        assert_eq!(second.passes, 1);
        assert_eq!(xy(&buf), snapshot);
    }

    #[test]
    fn fixed_simplification_is_idempotent() {
        let coords = wobbly_stroke();
        let mut buf = buffer_of(&coords);
        simplify(&mut buf, 0, coords.len() - 1, Tolerance::Fixed(0.5)).unwrap();
        let snapshot = xy(&buf);
        let end = buf.len() - 1;
        let again = simplify(&mut buf, 0, end, Tolerance::Fixed(0.5)).unwrap();
        assert_eq!(again.removed(), 0);
        assert_eq!(xy(&buf), snapshot);
    }

    #[test]
    fn endpoints_always_survive() {
        let coords = wobbly_stroke();
        for eps in [0.01, 1.0, 1e6] {
            let mut buf = buffer_of(&coords);
            simplify(&mut buf, 0, coords.len() - 1, Tolerance::Fixed(eps)).unwrap();
            assert_eq!(xy(&buf).first(), coords.first());
            assert_eq!(xy(&buf).last(), coords.last());
            assert!(buf.len() >= 2 && buf.len() <= coords.len());
        }
    }

    #[test]
    fn only_the_given_range_is_touched() {
        let mut coords = vec![(-5.0, -5.0), (-4.0, -5.0)];
        coords.extend((0..10).map(|i| (i as f32, 0.0)));
        coords.push((100.0, 100.0));
        let mut buf = buffer_of(&coords);

        let out = simplify(&mut buf, 2, 11, Tolerance::default()).unwrap();
        assert_eq!(out.before, 10);
        assert_eq!(out.after, 2);
        assert_eq!(
            xy(&buf),
            vec![(-5.0, -5.0), (-4.0, -5.0), (0.0, 0.0), (9.0, 0.0), (100.0, 100.0)]
        );
        assert_eq!(buf.rendered_till(), 5);
    }

    #[test]
    fn closed_loop_does_not_produce_nan() {
        let coords: Vec<(f32, f32)> = (0..=40)
            .map(|i| {
                let a = i as f32 / 40.0 * std::f32::consts::TAU;
                (50.0 + 20.0 * a.cos(), 50.0 + 20.0 * a.sin())
            })
            .collect();
        let mut buf = buffer_of(&coords);
        let out = simplify(&mut buf, 0, 40, Tolerance::default()).unwrap();
        assert!(out.epsilon.is_finite());
        assert!(out.after > 2);
    }

    #[test]
    fn single_segment_and_empty_are_no_ops() {
        let mut buf = buffer_of(&[(0.0, 0.0), (3.0, 3.0)]);
        let out = simplify(&mut buf, 0, 1, Tolerance::default()).unwrap();
        assert_eq!(out.after, 2);

        let mut empty = PointBuffer::new();
        assert_eq!(simplify(&mut empty, 0, 0, Tolerance::default()).unwrap().after, 0);
    }

    #[test]
    fn bad_range_is_rejected() {
        let mut buf = buffer_of(&[(0.0, 0.0), (3.0, 3.0)]);
        assert_eq!(
            simplify(&mut buf, 0, 2, Tolerance::default()),
            Err(SimplifyError::Range { start: 0, end: 2, len: 2 })
        );
        assert!(simplify(&mut buf, 1, 0, Tolerance::default()).is_err());
    }
}
