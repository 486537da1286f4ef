//! Core functionality for the threat visualization engine
//!
//! This crate provides the numeric normalizer, the coordinate projectors and
//! the data/state model shared by every widget.

pub mod color;
pub mod data;
pub mod error;
pub mod events;
pub mod normalize;
pub mod projection;
pub mod state;

// Re-export commonly used types
pub use color::{categorical_color, parse_color_token, ColorMap};
pub use data::{DataPoint, DataSource, GeoMarker, PointFlags, Series, Severity, ThreatBlip, ThreatLevel};
pub use error::{ConfigError, ConfigResult};
pub use events::EventBus;
pub use normalize::{denormalize, normalize, Range};
pub use state::{EntityRef, HoverEvent, InteractionState, ViewportState, WidgetId};
