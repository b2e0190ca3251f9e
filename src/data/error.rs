use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by the data layer (loading, transforming, catalog lookup).
#[derive(Error, Debug)]
pub enum SpectrumError {
    #[error("File: {} should be a .fits/.fits.gz file", .0.display())]
    UnsupportedExtension(PathBuf),
    #[error("FITS I/O error: {0}")]
    Fits(#[from] fitsio::errors::Error),
    #[error("Missing header key '{key}': {reason}")]
    MissingKey { key: String, reason: String },
    #[error("Unexpected payload shape: {0}")]
    Shape(String),
    #[error("Row {row} out of range: payload has {rows} row(s)")]
    RowOutOfRange { row: usize, rows: usize },
    #[error("Spectrum has no pixels (axis length {0})")]
    EmptySpectrum(i64),
    #[error("Flux length mismatch: {left} vs {right}")]
    LengthMismatch { left: usize, right: usize },
    #[error("Invalid smoothing window: {0}")]
    InvalidWindow(String),
    #[error("Unknown window shape '{0}'")]
    UnknownWindow(String),
    #[error("Line '{0}' not found in catalog")]
    LineNotFound(String),
    #[error("Invalid line catalog: {0}")]
    Catalog(String),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T, E = SpectrumError> = std::result::Result<T, E>;
