// Undo/redo by layer snapshots.
// Visual: Ctrl+Z steps back one finished stroke, Ctrl+Y steps forward again.

use crate::types::{Color, FrameBuffer};

/// One snapshot: the pixels after a stroke, and how many points were drawn into them.
#[derive(Clone, Debug)]
pub struct Layer {
    pub pixels: FrameBuffer,
    pub points: usize,
}

pub struct LayerHistory {
    layers: Vec<Layer>,
    current: usize,
}

impl LayerHistory {
    /// Start with one blank layer (nothing to undo).
    pub fn new(width: usize, height: usize, background: Color) -> Self {
        Self {
            layers: vec![Layer { pixels: FrameBuffer::new(width, height, background), points: 0 }],
            current: 0,
        }
    }

    pub fn current(&self) -> &Layer {
        &self.layers[self.current]
    }

    pub fn current_mut(&mut self) -> &mut Layer {
        &mut self.layers[self.current]
    }

    pub fn index(&self) -> usize {
        self.current
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    /// True when redo steps exist past the current layer.
    pub fn has_redo(&self) -> bool {
        self.current + 1 < self.layers.len()
    }

    /// A copy of the current layer to draw the next stroke onto.
    pub fn begin(&self) -> FrameBuffer {
        self.current().pixels.clone()
    }

    /// Make `pixels` the newest layer. Any redo steps are discarded.
    pub fn commit(&mut self, pixels: FrameBuffer, points: usize) {
        self.layers.truncate(self.current + 1);
        self.layers.push(Layer { pixels, points });
        self.current = self.layers.len() - 1;
    }

    /// Step back; false when already at the first layer.
    pub fn undo(&mut self) -> bool {
        if self.current == 0 {
            return false;
        }
        self.current -= 1;
        true
    }

    /// Step forward; false when already at the newest layer.
    pub fn redo(&mut self) -> bool {
        if !self.has_redo() {
            return false;
        }
        self.current += 1;
        true
    }

    /// Copy-and-replace every snapshot at the new window size.
    pub fn resize(&mut self, width: usize, height: usize, background: Color) {
        for layer in &mut self.layers {
            layer.pixels = layer.pixels.resized(width, height, background);
        }
    }
}
