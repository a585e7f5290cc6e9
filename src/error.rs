// Error types. Every variant states *where* things went wrong.

use std::collections::TryReserveError;
use std::path::PathBuf;
use thiserror::Error;

/// Application-level failures (window, config, export, fatal allocation).
#[derive(Debug, Error)]
pub enum Error {
    #[error("window init error: {0}")]
    WindowInit(String),
    #[error("window update error: {0}")]
    WindowUpdate(String),
    #[error("failed to read config file {path}: {source}")]
    ConfigRead { path: PathBuf, source: std::io::Error },
    #[error("failed to parse config file {path}: {source}")]
    ConfigParse { path: PathBuf, source: toml::de::Error },
    #[error("export directory {0} does not exist")]
    ExportDirMissing(PathBuf),
    #[error("export failed: {0}")]
    ExportIo(#[from] std::io::Error),
    #[error("export failed: {0}")]
    ExportEncode(#[from] image::ImageError),
    #[error(transparent)]
    Points(#[from] PointError),
    #[error(transparent)]
    Simplify(#[from] SimplifyError),
}

/// Why a point could not be appended.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PointError {
    /// The 16-bit ceiling was reached; the stroke stops growing. Not fatal.
    #[error("point buffer is full ({0} points)")]
    Full(usize),
    /// Growing the buffer failed. The current stroke cannot continue.
    #[error("point buffer allocation failed: {0}")]
    Alloc(TryReserveError),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SimplifyError {
    #[error("stroke range {start}..={end} is outside the buffer ({len} points)")]
    Range { start: usize, end: usize, len: usize },
    #[error("keep-mask allocation failed: {0}")]
    Alloc(TryReserveError),
}
