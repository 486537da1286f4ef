//! Data handling for the threat visualization widgets
//!
//! Sliding-window streams with synthetic generation, widget configuration
//! and the default demo datasets.

pub mod config;
pub mod demo;
pub mod stream;

use thiserror::Error;
use tv_core::ConfigError;

// Re-exports
pub use config::{DashboardConfig, Dimensions, WidgetConfig, WidgetKind};
pub use stream::{synthesize, StreamBuffer, SynthesisParams};

/// Errors that can occur while loading data or configuration
#[derive(Error, Debug)]
pub enum DataError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),
}
