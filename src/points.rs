// The point buffer: every sampled pointer position of the session.
// Visual: nothing on its own; the renderer turns these into ink.

use crate::error::PointError;
use crate::types::Point;

/// 16-bit count ceiling. Appending past this fails instead of growing.
pub const MAX_POINTS: usize = u16::MAX as usize;

/// What happened to an accepted call to [`PointBuffer::append`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Appended {
    Added,
    /// Sub-pixel jitter next to the previous point; nothing stored.
    Skipped,
}

/// Ordered, growable storage for all strokes, plus the incremental-render cursor.
#[derive(Debug, Default)]
pub struct PointBuffer {
    points: Vec<Point>,
    capacity: usize,       // logical capacity (doubling policy), <= MAX_POINTS
    rendered_till: usize,  // points [0, rendered_till) are already on the layer
    min_spacing_sq: f32,   // 0 disables de-duplication
}

impl PointBuffer {
    /// An empty buffer without de-duplication.
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty buffer that drops connected points closer than
    /// `min_spacing_sq` (squared screen units) to their predecessor.
    pub fn with_min_spacing(min_spacing_sq: f32) -> Self {
        Self { min_spacing_sq: min_spacing_sq.max(0.0), ..Self::default() }
    }

    /// Append one sample. Fails with `Full` at the ceiling (no-op) and with
    /// `Alloc` when growing the storage fails (the buffer is left untouched).
    pub fn append(
        &mut self,
        x: f32,
        y: f32,
        thickness: u8,
        connects_to_next: bool,
    ) -> Result<Appended, PointError> {
        if self.is_jitter(x, y, connects_to_next) {
            return Ok(Appended::Skipped);
        }
        if self.points.len() >= MAX_POINTS {
            return Err(PointError::Full(self.points.len()));
        }

        if self.points.len() >= self.capacity {
            let new_capacity = if self.capacity == 0 { 1 } else { (self.capacity << 1).min(MAX_POINTS) };
            self.points
                .try_reserve_exact(new_capacity - self.points.len())
                .map_err(PointError::Alloc)?;
            self.capacity = new_capacity;
        }

        self.points.push(Point::new(x, y, thickness, connects_to_next));
        Ok(Appended::Added)
    }

    // Only a point that continues a stroke can be dropped; the pen-up point
    // always lands so the stroke keeps its terminator.
    fn is_jitter(&self, x: f32, y: f32, connects_to_next: bool) -> bool {
        if self.min_spacing_sq <= 0.0 || !connects_to_next {
            return false;
        }
        match self.points.last() {
            Some(prev) if prev.connects_to_next => {
                let (dx, dy) = (x - prev.x, y - prev.y);
                dx * dx + dy * dy < self.min_spacing_sq
            }
            _ => false,
        }
    }

    /// Mark the last stored point as a stroke end.
    /// Used when a stroke is cut short (buffer full) so it still terminates.
    pub fn terminate_last(&mut self) {
        if let Some(last) = self.points.last_mut() {
            last.connects_to_next = false;
        }
    }

    /// Keep only the points of `[start, end]` whose `keep` flag is set
    /// (`keep[i - start]`), shifting everything after `end` left. Returns the
    /// number of points removed and moves `rendered_till` to the new count.
    pub(crate) fn compact_range(&mut self, start: usize, end: usize, keep: &[bool]) -> usize {
        debug_assert_eq!(keep.len(), end + 1 - start);
        let before = self.points.len();
        let mut idx = 0usize;
        self.points.retain(|_| {
            let kept = idx < start || idx > end || keep[idx - start];
            idx += 1;
            kept
        });
        self.rendered_till = self.points.len();
        before - self.points.len()
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn rendered_till(&self) -> usize {
        self.rendered_till
    }

    /// Record that everything before `count` has been rasterized.
    pub fn set_rendered_till(&mut self, count: usize) {
        self.rendered_till = count.min(self.points.len());
    }

    /// Forget everything from `len` on (used when new ink replaces undone strokes).
    pub fn truncate(&mut self, len: usize) {
        self.points.truncate(len);
        self.rendered_till = self.rendered_till.min(self.points.len());
    }
}
