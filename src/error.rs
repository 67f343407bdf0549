use std::path::PathBuf;

use plotters::drawing::DrawingAreaErrorKind;
use thiserror::Error;

/// Errors raised while turning result tables into figures.
#[derive(Error, Debug)]
pub enum FigureError {
    #[error("input file not found: {}", .0.display())]
    MissingFile(PathBuf),

    #[error("column '{column}' not found in table '{table}'")]
    MissingColumn { table: String, column: String },

    #[error("column '{column}' in table '{table}' has non-numeric value '{value}' at row {row}")]
    NotNumeric {
        table: String,
        column: String,
        row: usize,
        value: String,
    },

    #[error("population '{label}' has no region in the {panel} map")]
    UnmappedPopulation { panel: &'static str, label: String },

    #[error("x has {x} values but y has {y}")]
    LengthMismatch { x: usize, y: usize },

    #[error("nothing to plot: {0}")]
    EmptyInput(String),

    #[error("unsupported file extension: .{0}")]
    UnsupportedFormat(String),

    #[error("failed to draw chart: {0}")]
    Render(String),

    #[error("failed to write PDF: {0}")]
    Pdf(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Image(#[from] image::ImageError),
}

impl<E> From<DrawingAreaErrorKind<E>> for FigureError
where
    E: std::error::Error + Send + Sync,
{
    fn from(err: DrawingAreaErrorKind<E>) -> Self {
        FigureError::Render(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, FigureError>;
