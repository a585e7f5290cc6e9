// The drawing session: selected tool, pan offset, and the point buffer that
// pointer events feed.
// Visual outcomes:
// - Drawing mode: press-drag-release leaves a stroke.
// - Pan mode: dragging slides everything drawn so far.
// - Any mode: the wheel zooms around the cursor.
// - Eraser / Typing: selectable, nothing happens to the ink.

use crate::error::PointError;
use crate::points::{Appended, PointBuffer};
use crate::types::{Pan, Zoom};
use glam::Vec2;
use tracing::{error, trace, warn};

/// Tool modes. A press runs in the mode selected at press time until release.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Mode {
    #[default]
    None,
    Drawing,
    Pan,
    Eraser,
    Typing,
}

impl Mode {
    /// Upper-case name for the HUD.
    pub fn label(self) -> &'static str {
        match self {
            Mode::None => "NONE",
            Mode::Drawing => "DRAW",
            Mode::Pan => "PAN",
            Mode::Eraser => "ERASE",
            Mode::Typing => "TYPE",
        }
    }
}

/// What the frame loop has to do after an input event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    Idle,
    /// Pen lifted; points `[start, end]` form one stroke, ready to simplify.
    StrokeFinished { start: usize, end: usize },
    /// The view moved or zoomed; the layer has to be drawn again from scratch.
    Rerender,
}

pub struct Session {
    pub points: PointBuffer,
    pub pan: Pan,
    tool: Mode,
    active: Mode,
    stroke_start: Option<usize>,
    stroke_full: bool,
    thickness: u8,
    zoom: Zoom,
}

impl Session {
    pub fn new(points: PointBuffer, thickness: u8, zoom: Zoom) -> Self {
        Self {
            points,
            pan: Pan::default(),
            tool: Mode::Drawing,
            active: Mode::None,
            stroke_start: None,
            stroke_full: false,
            thickness,
            zoom,
        }
    }

    /// Select a tool. A press already in progress keeps its mode.
    pub fn select(&mut self, tool: Mode) {
        self.tool = tool;
    }

    pub fn tool(&self) -> Mode {
        self.tool
    }

    /// Mode of the press in progress (`None` when the button is up).
    pub fn active(&self) -> Mode {
        self.active
    }

    pub fn pointer_down(&mut self, x: f32, y: f32) -> Result<Outcome, PointError> {
        self.active = self.tool;
        if self.active == Mode::Drawing {
            self.stroke_full = false;
            self.stroke_start = match self.push(x, y, true)? {
                Some(Appended::Added) => Some(self.points.len() - 1),
                _ => None,
            };
        }
        Ok(Outcome::Idle)
    }

    /// `dx, dy` is the motion since the previous event (used by the pan tool).
    pub fn pointer_move(&mut self, x: f32, y: f32, dx: f32, dy: f32) -> Result<Outcome, PointError> {
        match self.active {
            Mode::Drawing if self.stroke_start.is_some() => {
                self.push(x, y, true)?;
                Ok(Outcome::Idle)
            }
            Mode::Pan => {
                self.pan.by(dx, dy);
                trace!(x = self.pan.offset.x, y = self.pan.offset.y, "pan");
                Ok(Outcome::Rerender)
            }
            _ => Ok(Outcome::Idle),
        }
    }

    pub fn pointer_up(&mut self, x: f32, y: f32) -> Result<Outcome, PointError> {
        let was = std::mem::replace(&mut self.active, Mode::None);
        if was != Mode::Drawing {
            return Ok(Outcome::Idle);
        }
        let Some(start) = self.stroke_start.take() else {
            return Ok(Outcome::Idle);
        };

        if self.push(x, y, false)?.is_none() {
            // Out of room: end the stroke on the last point that made it in.
            self.points.terminate_last();
        }
        let end = self.points.len() - 1;
        if end > start {
            Ok(Outcome::StrokeFinished { start, end })
        } else {
            Ok(Outcome::Idle)
        }
    }

    /// Wheel motion at (x,y). Points already stored keep their stroke-space
    /// positions, only the view changes.
    pub fn wheel(&mut self, x: f32, y: f32, steps: f32) -> Outcome {
        if steps == 0.0 || !self.pan.zoom_at(Vec2::new(x, y), steps, self.zoom) {
            return Outcome::Idle;
        }
        trace!(scale = self.pan.scale, "zoom");
        Outcome::Rerender
    }

    // Screen position -> stroke space, then into the buffer.
    // `None` means the buffer is full (logged once per stroke).
    fn push(&mut self, x: f32, y: f32, connects: bool) -> Result<Option<Appended>, PointError> {
        let p = self.pan.unapply(x, y);
        match self.points.append(p.x, p.y, self.thickness, connects) {
            Ok(appended) => Ok(Some(appended)),
            Err(PointError::Full(n)) => {
                if !self.stroke_full {
                    warn!(points = n, "point buffer full, stroke stops growing");
                    self.stroke_full = true;
                }
                Ok(None)
            }
            Err(e) => {
                error!(error = %e, "cannot grow point buffer");
                Err(e)
            }
        }
    }
}
