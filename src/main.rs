// What you SEE:
// • A black pad; hold Left Mouse to draw. Releasing smooths the stroke into curves.
// • D draw, P pan (drag to move the drawing), E eraser, T typing, N none.
// • Mouse wheel zooms around the cursor, G shows/hides the grid.
// • Ctrl+Z undo, Ctrl+Y redo, Ctrl+S saves a PNG. ESC quits.

mod config;
mod draw;
mod error;
mod export;
mod gamma;
mod layers;
mod points;
mod render;
mod session;
mod simplify;
mod types;

use anyhow::Context;
use clap::Parser;
use config::Config;
use draw::{draw_grid, draw_text_5x7, hud_text, Drawer, PointerEvent, Shortcut};
use error::Error;
use layers::{Layer, LayerHistory};
use points::PointBuffer;
use render::StrokeRenderer;
use session::{Mode, Outcome, Session};
use std::path::PathBuf;
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;
use types::{Color, FrameBuffer};

/// Freehand sketch pad with stroke smoothing.
#[derive(Parser, Debug)]
#[command(name = "scratch-pad", version, about, long_about = None)]
struct Args {
    /// TOML configuration file (defaults are used when absent or unreadable)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Folder for Ctrl+S exports (overrides the config file)
    #[arg(long)]
    export_dir: Option<PathBuf>,

    /// More logging: -v debug, -vv trace (RUST_LOG wins when set)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_logging(verbose: u8) -> anyhow::Result<()> {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("scratch_pad={level}")));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to install log subscriber: {e}"))
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.verbose)?;

    let mut cfg = match &args.config {
        Some(path) => Config::load(path).unwrap_or_else(|e| {
            warn!(error = %e, "using default configuration");
            Config::default()
        }),
        None => Config::default(),
    };
    if let Some(dir) = args.export_dir {
        cfg.export.directory = dir;
    }
    debug!(?cfg, "configuration");

    run(&cfg).context("sketch pad stopped")
}

fn run(cfg: &Config) -> Result<(), Error> {
    /* --- Window + surfaces ---
       Visual: window opens with an empty pad. */
    let mut drawer = Drawer::new(&cfg.window.title, cfg.window.width, cfg.window.height)?;
    let (w, h) = (cfg.window.width, cfg.window.height);
    let background = cfg.stroke.background;

    // What gets presented each frame: current layer + preview + HUD.
    let mut screen = FrameBuffer::new(w, h, background);
    let mut history = LayerHistory::new(w, h, background);

    /* --- Stroke pipeline ---
       Visual: points in, smooth ink out. */
    let mut session = Session::new(
        PointBuffer::with_min_spacing(cfg.stroke.min_spacing),
        cfg.stroke.thickness,
        cfg.view.zoom(),
    );
    let renderer = StrokeRenderer::new(cfg.render.step_range());
    let tolerance = cfg.simplify.tolerance();
    let mut show_grid = cfg.view.show_grid;
    // First frame paints the grid onto the blank layer.
    let mut rerender = true;

    info!(width = w, height = h, "sketch pad ready");

    /* ------------------------------ Main loop ------------------------------ */
    while drawer.is_open() && !drawer.esc_pressed() {
        /* 1) Resize: copy-and-replace every layer, keep all points. */
        let (nw, nh) = drawer.size();
        if resize(&mut history, &mut screen, nw, nh, background) {
            // Ink past the old edge was never drawn into the layers.
            rerender = true;
        }

        /* 2) Keys: tool selection and Ctrl shortcuts. */
        if let Some(mode) = drawer.tool_pressed() {
            session.select(mode);
            info!(tool = mode.label(), "tool selected");
        }
        if drawer.grid_toggled() {
            show_grid = !show_grid;
            rerender = true;
        }
        match drawer.shortcut_pressed() {
            Some(Shortcut::Save) => {
                // Visual: none; the last presented frame is written out.
                if let Err(e) = export::export_png(&screen, &cfg.export.directory, &cfg.export.prefix) {
                    error!(error = %e, "export failed");
                }
            }
            Some(Shortcut::Undo) => {
                if history.undo() {
                    info!(layer = history.index(), "undo");
                    rerender = true;
                }
            }
            Some(Shortcut::Redo) => {
                if history.redo() {
                    info!(layer = history.index(), "redo");
                    rerender = true;
                }
            }
            None => {}
        }

        /* 3) Pointer: feed the session, finish strokes on release. */
        for event in drawer.pointer_events() {
            let outcome = match event {
                PointerEvent::Down { x, y } => {
                    if session.tool() == Mode::Drawing {
                        // New ink after an undo replaces the undone strokes.
                        session.points.truncate(history.current().points);
                    }
                    session.pointer_down(x, y)?
                }
                PointerEvent::Move { x, y, dx, dy } => session.pointer_move(x, y, dx, dy)?,
                PointerEvent::Up { x, y } => session.pointer_up(x, y)?,
                PointerEvent::Wheel { x, y, steps } => session.wheel(x, y, steps),
            };
            match outcome {
                Outcome::StrokeFinished { start, end } => {
                    finish_stroke(cfg, &renderer, tolerance, &mut session, &mut history, start, end)?;
                }
                Outcome::Rerender => rerender = true,
                Outcome::Idle => {}
            }
        }

        /* 4) Full re-render of the current layer after a pan, zoom, resize,
              grid toggle or undo/redo. */
        if rerender {
            repaint(cfg, &renderer, history.current_mut(), &mut session, show_grid);
            rerender = false;
        }

        /* 5) Compose: layer, then the live preview, then the HUD. */
        screen.pixels.copy_from_slice(&history.current().pixels.pixels);
        renderer.render_preview(&mut screen, &session.points, session.pan, cfg.stroke.preview_color);
        let hud = hud_text(session.tool(), session.points.len());
        draw_text_5x7(&mut screen, 8, 8, &hud, 0x00_FF_FF_FF);

        /* 6) Present. */
        let shown = match session.active() {
            Mode::None => session.tool(),
            pressed => pressed,
        };
        drawer.set_cursor_for(shown);
        drawer.present(&screen)?;
    }

    info!(
        points = session.points.len(),
        capacity = session.points.capacity(),
        layers = history.len(),
        "sketch pad closed"
    );
    Ok(())
}

/// Rebuild every surface at a new window size. False when the size is unchanged
/// (or zero, as while minimized).
fn resize(history: &mut LayerHistory, screen: &mut FrameBuffer, width: usize, height: usize, background: Color) -> bool {
    if (width, height) == (screen.width, screen.height) || width == 0 || height == 0 {
        return false;
    }
    debug!(width, height, "resized");
    history.resize(width, height, background);
    *screen = FrameBuffer::new(width, height, background);
    true
}

/// Clear `layer` and draw it again from the point buffer: grid first, then the
/// strokes this layer holds.
fn repaint(cfg: &Config, renderer: &StrokeRenderer, layer: &mut Layer, session: &mut Session, show_grid: bool) {
    layer.pixels.fill(cfg.stroke.background);
    if show_grid {
        draw_grid(&mut layer.pixels, session.pan, cfg.view.grid_spacing, cfg.view.grid_color.to_u32());
    }
    if layer.points == session.points.len() {
        renderer.render_all(&mut layer.pixels, &mut session.points, session.pan, cfg.stroke.color);
    } else {
        // Undone strokes are still buffered (for redo) but must stay off this layer.
        let last = layer.points.saturating_sub(1);
        renderer.render_range(&mut layer.pixels, &mut session.points, session.pan, 0, last, cfg.stroke.color);
    }
}

/// Simplify the finished stroke, draw it onto a copy of the current layer and
/// push that copy as the newest undo step.
fn finish_stroke(
    cfg: &Config,
    renderer: &StrokeRenderer,
    tolerance: simplify::Tolerance,
    session: &mut Session,
    history: &mut LayerHistory,
    start: usize,
    end: usize,
) -> Result<(), Error> {
    let report = simplify::simplify(&mut session.points, start, end, tolerance)?;
    let end = start + report.after - 1;

    let mut layer = history.begin();
    let stats = renderer.render_range(&mut layer, &mut session.points, session.pan, start, end, cfg.stroke.color);
    history.commit(layer, session.points.len());

    debug!(
        removed = report.removed(),
        after = report.after,
        curves = stats.curves,
        lines = stats.lines,
        segments = stats.segments,
        "stroke committed"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Zoom;

    fn pad(width: usize, height: usize) -> (Config, LayerHistory, FrameBuffer, Session) {
        let mut cfg = Config::default();
        cfg.view.show_grid = false;
        let history = LayerHistory::new(width, height, cfg.stroke.background);
        let screen = FrameBuffer::new(width, height, cfg.stroke.background);
        let session = Session::new(PointBuffer::new(), 3, Zoom::default());
        (cfg, history, screen, session)
    }

    #[test]
    fn growing_the_window_brings_back_clipped_ink() {
        let (cfg, mut history, mut screen, mut session) = pad(20, 20);
        let renderer = StrokeRenderer::default();

        // A stroke running off the right edge of a 20px pad.
        session.pointer_down(5.0, 10.0).unwrap();
        session.pointer_move(30.0, 10.0, 25.0, 0.0).unwrap();
        let Outcome::StrokeFinished { start, end } = session.pointer_up(55.0, 10.0).unwrap() else {
            panic!("stroke did not finish");
        };
        finish_stroke(&cfg, &renderer, cfg.simplify.tolerance(), &mut session, &mut history, start, end).unwrap();

        assert!(!resize(&mut history, &mut screen, 20, 20, cfg.stroke.background));
        assert!(!resize(&mut history, &mut screen, 0, 40, cfg.stroke.background));
        assert!(resize(&mut history, &mut screen, 80, 20, cfg.stroke.background));
        let ink = cfg.stroke.color.to_u32();
        assert_ne!(history.current().pixels.pixels[10 * 80 + 40], ink);

        repaint(&cfg, &renderer, history.current_mut(), &mut session, false);
        assert_eq!(history.current().pixels.pixels[10 * 80 + 40], ink);
        assert_eq!(screen.width, 80);
    }

    #[test]
    fn repaint_after_undo_leaves_undone_strokes_off() {
        let (cfg, mut history, _, mut session) = pad(60, 20);
        let renderer = StrokeRenderer::default();

        for y in [5.0, 15.0] {
            session.pointer_down(5.0, y).unwrap();
            session.pointer_move(30.0, y, 25.0, 0.0).unwrap();
            if let Outcome::StrokeFinished { start, end } = session.pointer_up(50.0, y).unwrap() {
                finish_stroke(&cfg, &renderer, cfg.simplify.tolerance(), &mut session, &mut history, start, end)
                    .unwrap();
            }
        }
        assert!(history.undo());
        repaint(&cfg, &renderer, history.current_mut(), &mut session, true);

        let ink = cfg.stroke.color.to_u32();
        let px = &history.current().pixels.pixels;
        assert_eq!(px[5 * 60 + 20], ink);
        assert_ne!(px[15 * 60 + 20], ink);
        // Grid line at x = 50 (spacing 50), away from the ink.
        assert_eq!(px[10 * 60 + 50], cfg.view.grid_color.to_u32());
    }
}
