//! Widgets for the threat visualization dashboard
//!
//! Every widget owns its data, its animation scheduler and its pointer state.
//! The host drives them with frames and pointer events; widgets draw onto a
//! [`tv_render::Surface`].

pub mod animation;
pub mod dashboard;
pub mod interaction;
pub mod pipeline;
mod widget;
pub mod widgets;

pub use animation::{AnimationId, AnimationScheduler, AnimationSpec, AnimationState, Easing, ProgressCell, RefreshTimer};
pub use dashboard::Dashboard;
pub use interaction::{HitScene, HoverChange, PointerResolver};
pub use pipeline::{FrameComposer, RenderPipeline, Tooltip, TooltipStyle};
pub use widget::{HoverCallback, HoverUpdate, MountState, Widget, WidgetCore};
pub use widgets::{
    build_widget, AnomalyChart, ChartMode, DistributionChart, ScoreGauge, ScoreRadar, ThreatMap, ThreatScanner,
};
