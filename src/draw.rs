// Window + input plumbing, and a tiny bitmap font for the HUD.
// Visual effects provided here:
// 1) A resizable window that shows the sketch pad.
// 2) The system cursor changes with the selected tool.
// 3) A 5x7 bitmap font renders the HUD (tool name + point count).
// 4) An optional background grid that follows pan and zoom.

use crate::error::Error;
use crate::session::Mode;
use crate::types::{FrameBuffer, Pan};
use minifb::{CursorStyle, Key, KeyRepeat, MouseButton, MouseMode, Window, WindowOptions};

/// Pointer activity since the previous frame (left button and wheel).
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PointerEvent {
    Down { x: f32, y: f32 },
    Move { x: f32, y: f32, dx: f32, dy: f32 },
    Up { x: f32, y: f32 },
    /// One notch per frame of wheel motion: +1 zooms in, -1 out.
    Wheel { x: f32, y: f32, steps: f32 },
}

/// Ctrl+<key> actions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Shortcut {
    Save,
    Undo,
    Redo,
}

pub struct Drawer {
    window: Window,               // the on-screen window you see
    was_down: bool,               // left button state last frame
    last_pos: Option<(f32, f32)>, // pointer position last frame
}

impl Drawer {
    /// Create a resizable window.
    /// Visual: a new empty window appears with your chosen title.
    pub fn new(title: &str, width: usize, height: usize) -> Result<Self, Error> {
        let options = WindowOptions { resize: true, ..WindowOptions::default() };
        let mut window =
            Window::new(title, width, height, options).map_err(|e| Error::WindowInit(e.to_string()))?;
        window.set_target_fps(60);
        Ok(Self { window, was_down: false, last_pos: None })
    }

    /// Push the pixels for this frame to the screen.
    pub fn present(&mut self, framebuffer: &FrameBuffer) -> Result<(), Error> {
        self.window
            .update_with_buffer(&framebuffer.pixels, framebuffer.width, framebuffer.height)
            .map_err(|e| Error::WindowUpdate(e.to_string()))
    }

    /// Returns false when the user closes the window (so we can stop the loop).
    pub fn is_open(&self) -> bool {
        self.window.is_open()
    }

    pub fn esc_pressed(&self) -> bool {
        self.window.is_key_down(Key::Escape)
    }

    /// Current client size; differs from the frame size right after a resize.
    pub fn size(&self) -> (usize, usize) {
        self.window.get_size()
    }

    /// Turn this frame's button state into press / drag / release events.
    pub fn pointer_events(&mut self) -> Vec<PointerEvent> {
        let mut events = Vec::new();
        let down = self.window.get_mouse_down(MouseButton::Left);
        let pos = self.window.get_mouse_pos(MouseMode::Clamp);

        match (self.was_down, down, pos) {
            (false, true, Some((x, y))) => events.push(PointerEvent::Down { x, y }),
            (true, true, Some((x, y))) => {
                if let Some((lx, ly)) = self.last_pos {
                    if (lx, ly) != (x, y) {
                        events.push(PointerEvent::Move { x, y, dx: x - lx, dy: y - ly });
                    }
                }
            }
            (true, false, _) => {
                // Release outside the window still ends the stroke at the last known spot.
                let (x, y) = pos.or(self.last_pos).unwrap_or_default();
                events.push(PointerEvent::Up { x, y });
            }
            _ => {}
        }

        if let (Some((x, y)), Some((_, wheel))) = (pos, self.window.get_scroll_wheel()) {
            if wheel != 0.0 {
                events.push(PointerEvent::Wheel { x, y, steps: wheel.signum() });
            }
        }

        self.was_down = down;
        if pos.is_some() {
            self.last_pos = pos;
        }
        events
    }

    /// D / P / E / T / N pick a tool (only without Ctrl, so Ctrl+S etc. don't switch).
    pub fn tool_pressed(&self) -> Option<Mode> {
        if self.ctrl_down() {
            return None;
        }
        [
            (Key::D, Mode::Drawing),
            (Key::P, Mode::Pan),
            (Key::E, Mode::Eraser),
            (Key::T, Mode::Typing),
            (Key::N, Mode::None),
        ]
        .into_iter()
        .find(|(key, _)| self.window.is_key_pressed(*key, KeyRepeat::No))
        .map(|(_, mode)| mode)
    }

    /// G shows / hides the grid.
    pub fn grid_toggled(&self) -> bool {
        !self.ctrl_down() && self.window.is_key_pressed(Key::G, KeyRepeat::No)
    }

    pub fn shortcut_pressed(&self) -> Option<Shortcut> {
        if !self.ctrl_down() {
            return None;
        }
        [(Key::S, Shortcut::Save), (Key::Z, Shortcut::Undo), (Key::Y, Shortcut::Redo)]
            .into_iter()
            .find(|(key, _)| self.window.is_key_pressed(*key, KeyRepeat::Yes))
            .map(|(_, action)| action)
    }

    fn ctrl_down(&self) -> bool {
        self.window.is_key_down(Key::LeftCtrl) || self.window.is_key_down(Key::RightCtrl)
    }

    /// Visual: crosshair while drawing, a hand while panning, an arrow otherwise.
    pub fn set_cursor_for(&mut self, mode: Mode) {
        let style = match mode {
            Mode::Drawing | Mode::Eraser => CursorStyle::Crosshair,
            Mode::Pan => CursorStyle::ClosedHand,
            Mode::Typing => CursorStyle::Ibeam,
            Mode::None => CursorStyle::Arrow,
        };
        self.window.set_cursor_style(style);
    }
}

/* ---------- Software drawing: pixels + tiny bitmap font ---------- */

/// Put a pixel on the framebuffer if (x,y) is inside bounds.
#[inline]
fn put_pixel(fb: &mut FrameBuffer, x: i32, y: i32, color: u32) {
    if x < 0 || y < 0 {
        return;
    }
    let (x, y) = (x as usize, y as usize);
    if x >= fb.width || y >= fb.height {
        return;
    }
    let idx = y * fb.width + x;
    fb.pixels[idx] = color;
}

/// Grid lines every `spacing` stroke-space units, placed through the view.
/// Visual: faint squares that slide with pan and grow/shrink with zoom.
/// Skipped when the zoomed spacing is under 2 pixels (it would fill the pad).
pub fn draw_grid(fb: &mut FrameBuffer, pan: Pan, spacing: f32, color: u32) {
    let step = spacing * pan.scale;
    if !step.is_finite() || step < 2.0 {
        return;
    }
    let lines = move |offset: f32, extent: usize| {
        let first = (-offset / step).ceil();
        (0..)
            .map(move |k| ((first + k as f32) * step + offset).round() as i32)
            .take_while(move |&at| at < extent as i32)
    };
    for x in lines(pan.offset.x, fb.width) {
        for y in 0..fb.height as i32 {
            put_pixel(fb, x, y, color);
        }
    }
    for y in lines(pan.offset.y, fb.height) {
        for x in 0..fb.width as i32 {
            put_pixel(fb, x, y, color);
        }
    }
}

/// Return a 5x7 glyph bitmap for the HUD character set.
/// Each u8 is a row; the low 5 bits are the pixels (bit 4 = leftmost).
fn glyph5x7(ch: char) -> Option<[u8; 7]> {
    macro_rules! g { ($a:expr,$b:expr,$c:expr,$d:expr,$e:expr,$f:expr,$g:expr) => {
        Some([$a,$b,$c,$d,$e,$f,$g])
    }; }

    match ch {
        '0' => g!(0b01110,0b10001,0b10011,0b10101,0b11001,0b10001,0b01110),
        '1' => g!(0b00100,0b01100,0b00100,0b00100,0b00100,0b00100,0b01110),
        '2' => g!(0b01110,0b10001,0b00001,0b00010,0b00100,0b01000,0b11111),
        '3' => g!(0b11110,0b00001,0b00001,0b01110,0b00001,0b00001,0b11110),
        '4' => g!(0b00010,0b00110,0b01010,0b10010,0b11111,0b00010,0b00010),
        '5' => g!(0b11111,0b10000,0b11110,0b00001,0b00001,0b10001,0b01110),
        '6' => g!(0b00110,0b01000,0b10000,0b11110,0b10001,0b10001,0b01110),
        '7' => g!(0b11111,0b00001,0b00010,0b00100,0b01000,0b01000,0b01000),
        '8' => g!(0b01110,0b10001,0b10001,0b01110,0b10001,0b10001,0b01110),
        '9' => g!(0b01110,0b10001,0b10001,0b01111,0b00001,0b00010,0b01100),

        // Tool names and "PTS": A D E N O P R S T W Y
        'A' => g!(0b01110,0b10001,0b10001,0b11111,0b10001,0b10001,0b10001),
        'D' => g!(0b11100,0b10010,0b10001,0b10001,0b10001,0b10010,0b11100),
        'E' => g!(0b11111,0b10000,0b10000,0b11110,0b10000,0b10000,0b11111),
        'N' => g!(0b10001,0b11001,0b10101,0b10011,0b10001,0b10001,0b10001),
        'O' => g!(0b01110,0b10001,0b10001,0b10001,0b10001,0b10001,0b01110),
        'P' => g!(0b11110,0b10001,0b10001,0b11110,0b10000,0b10000,0b10000),
        'R' => g!(0b11110,0b10001,0b10001,0b11110,0b10100,0b10010,0b10001),
        'S' => g!(0b01111,0b10000,0b10000,0b01110,0b00001,0b00001,0b11110),
        'T' => g!(0b11111,0b00100,0b00100,0b00100,0b00100,0b00100,0b00100),
        'W' => g!(0b10001,0b10001,0b10001,0b10101,0b10101,0b10101,0b01010),
        'Y' => g!(0b10001,0b10001,0b01010,0b00100,0b00100,0b00100,0b00100),

        ' ' => g!(0b00000,0b00000,0b00000,0b00000,0b00000,0b00000,0b00000),
        '|' => g!(0b00100,0b00100,0b00100,0b00100,0b00100,0b00100,0b00100),
        ':' => g!(0b00000,0b00100,0b00000,0b00000,0b00100,0b00000,0b00000),

        _ => None,
    }
}

/// Draw a single 5x7 character at (x,y) with a 1-pixel black shadow.
fn draw_char_5x7(fb: &mut FrameBuffer, x: i32, y: i32, ch: char, color: u32) {
    let Some(rows) = glyph5x7(ch) else { return };
    for (offset, ink) in [(1, 0x00000000), (0, color)] {
        for (ry, rowbits) in rows.iter().enumerate() {
            for rx in 0..5 {
                if (rowbits & (1 << (4 - rx))) != 0 {
                    put_pixel(fb, x + rx + offset, y + ry as i32 + offset, ink);
                }
            }
        }
    }
}

/// Draw a text string using 5x7 glyphs (1-pixel spacing).
pub fn draw_text_5x7(fb: &mut FrameBuffer, mut x: i32, y: i32, text: &str, color: u32) {
    for ch in text.chars() {
        draw_char_5x7(fb, x, y, ch, color);
        x += 6;
    }
}

/// HUD line: tool name and number of stored points.
pub fn hud_text(mode: Mode, points: usize) -> String {
    format!("{} | PTS: {}", mode.label(), points)
}
