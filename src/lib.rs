//! Publication figures comparing mutation age estimates from tsdate, Relate
//! and GEVA, rendered to PNG and PDF from the pipeline's result files.

pub mod cli;
pub mod color;
pub mod config;
pub mod data;
pub mod error;
pub mod figures;
pub mod render;
pub mod sample;
pub mod stats;

pub use config::Config;
pub use error::{FigureError, Result};
