// Save what is on screen as a PNG.
// Visual: nothing changes in the window; a new file appears in the export folder.

use crate::error::Error;
use crate::types::FrameBuffer;
use image::ExtendedColorType;
use std::path::{Path, PathBuf};
use tracing::info;

/// Next free `<prefix><NNNNN>.png` in `dir`. Numbering starts at the number of
/// entries already in the folder and counts up until the name is unused.
pub fn unique_name(dir: &Path, prefix: &str) -> Result<PathBuf, Error> {
    if !dir.is_dir() {
        return Err(Error::ExportDirMissing(dir.to_path_buf()));
    }
    let mut count = std::fs::read_dir(dir)?.count();
    loop {
        let candidate = dir.join(format!("{prefix}{count:05}.png"));
        if !candidate.exists() {
            return Ok(candidate);
        }
        count += 1;
    }
}

/// Write `frame` (0x00RRGGBB) as an RGB PNG and return where it went.
pub fn export_png(frame: &FrameBuffer, dir: &Path, prefix: &str) -> Result<PathBuf, Error> {
    let path = unique_name(dir, prefix)?;

    let mut bytes = Vec::with_capacity(frame.pixels.len() * 3);
    for px in &frame.pixels {
        bytes.push(((px >> 16) & 0xFF) as u8);
        bytes.push(((px >> 8) & 0xFF) as u8);
        bytes.push((px & 0xFF) as u8);
    }

    image::save_buffer(&path, &bytes, frame.width as u32, frame.height as u32, ExtendedColorType::Rgb8)?;
    info!(path = %path.display(), width = frame.width, height = frame.height, "exported canvas");
    Ok(path)
}
