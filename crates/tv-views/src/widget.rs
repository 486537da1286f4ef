//! Widget abstraction - base trait for every dashboard visualization

use egui::Pos2;
use serde_json::Value;
use tracing::{debug, warn};
use uuid::Uuid;

use tv_core::{ColorMap, ConfigResult, DataSource, EntityRef, HoverEvent, InteractionState, ViewportState, WidgetId};
use tv_data::{WidgetConfig, WidgetKind};
use tv_render::Surface;

use crate::animation::{AnimationId, AnimationScheduler, AnimationSpec, Easing, ProgressCell};
use crate::interaction::{HitScene, HoverChange, PointerResolver};
use crate::pipeline::RenderPipeline;

/// Hover callback; `None` when the pointer leaves every entity
pub type HoverCallback = Box<dyn FnMut(Option<&HoverEvent>) + Send + Sync>;

/// Hover transition reported to the host
#[derive(Debug, Clone, PartialEq)]
pub enum HoverUpdate {
    Entered(HoverEvent),
    Cleared,
}

/// Base trait for all widgets
///
/// Time only enters through `mount` and `on_frame`; rendering reads state and
/// never advances it.
pub trait Widget: Send + Sync {
    /// Get the unique ID of this widget
    fn id(&self) -> WidgetId;

    fn kind(&self) -> WidgetKind;

    fn title(&self) -> &str;

    fn viewport(&self) -> ViewportState;

    /// Start entrance and continuous animations and the refresh timer
    fn mount(&mut self);

    /// Recompute geometry for a new surface size
    fn resize(&mut self, width: f32, height: f32) -> ConfigResult<()>;

    /// Replace the widget's data; mismatched shapes are rejected
    fn set_data(&mut self, data: DataSource) -> ConfigResult<()>;

    /// Advance animations and timers to `now_ms`
    fn on_frame(&mut self, now_ms: f64);

    /// Draw the current state
    fn render(&self, surface: &mut dyn Surface);

    fn pointer_moved(&mut self, pos: Pos2) -> Option<HoverUpdate>;

    fn pointer_left(&mut self) -> Option<HoverUpdate>;

    fn interaction(&self) -> &InteractionState;

    /// Hover transition raised outside pointer handling, such as a data
    /// replacement dropping the hovered entity. Taken at most once.
    fn take_hover_update(&mut self) -> Option<HoverUpdate>;

    /// Cancel every animation and timer; the widget ignores frames afterwards
    fn unmount(&mut self);

    fn is_mounted(&self) -> bool;

    /// Whether the next frame would look different from the last
    fn needs_repaint(&self) -> bool;

    /// Save configuration
    fn save_config(&self) -> Value;

    /// Get as any for downcasting
    fn as_any(&self) -> &dyn std::any::Any;

    /// Get as any mut for downcasting
    fn as_any_mut(&mut self) -> &mut dyn std::any::Any;
}

/// Mount lifecycle of a widget
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MountState {
    Created,
    Mounted,
    Unmounted,
}

/// State shared by every widget implementation
pub struct WidgetCore {
    pub id: WidgetId,
    pub title: String,
    pub config: WidgetConfig,
    pub viewport: ViewportState,
    pub colors: ColorMap,
    pub scheduler: AnimationScheduler,
    pub resolver: PointerResolver,
    pub pipeline: RenderPipeline,
    mount_state: MountState,
    on_hover: Option<HoverCallback>,
    pending_hover: Option<HoverUpdate>,
}

impl WidgetCore {
    /// Validate `config` and build the shared state
    pub fn new(config: WidgetConfig, title: impl Into<String>) -> ConfigResult<Self> {
        let title = title.into();
        if let Err(e) = config.validate() {
            warn!("Rejected {} config for '{}': {}", config.kind.name(), title, e);
            return Err(e);
        }
        Ok(Self {
            id: Uuid::new_v4(),
            viewport: config.viewport()?,
            colors: config.color_map()?,
            title,
            config,
            scheduler: AnimationScheduler::new(),
            resolver: PointerResolver::new(),
            pipeline: RenderPipeline::new(),
            mount_state: MountState::Created,
            on_hover: None,
            pending_hover: None,
        })
    }

    pub fn set_on_hover(&mut self, callback: HoverCallback) {
        self.on_hover = Some(callback);
    }

    pub fn mount_state(&self) -> MountState {
        self.mount_state
    }

    pub fn is_mounted(&self) -> bool {
        self.mount_state == MountState::Mounted
    }

    /// Mark mounted; `false` if already mounted or torn down
    pub fn begin_mount(&mut self) -> bool {
        if self.mount_state != MountState::Created {
            return false;
        }
        self.mount_state = MountState::Mounted;
        debug!("Mounted {} '{}' ({})", self.config.kind.name(), self.title, self.id);
        true
    }

    pub fn teardown(&mut self) {
        if self.mount_state == MountState::Unmounted {
            return;
        }
        self.scheduler.cancel_all();
        self.scheduler.prune();
        self.resolver.reset();
        self.pending_hover = None;
        self.mount_state = MountState::Unmounted;
        debug!("Unmounted {} '{}' ({})", self.config.kind.name(), self.title, self.id);
    }

    /// Tick the scheduler; `false` when the widget is not live
    pub fn tick(&mut self, now_ms: f64) -> bool {
        if !self.is_mounted() {
            return false;
        }
        self.scheduler.tick(now_ms);
        true
    }

    pub fn resize(&mut self, width: f32, height: f32) -> ConfigResult<()> {
        self.viewport = ViewportState::new(width, height)?;
        self.config.dimensions.width = width;
        self.config.dimensions.height = height;
        self.clear_hover();
        Ok(())
    }

    /// Animation of `duration_ms` writing eased progress into `cell`
    pub fn animate(&mut self, spec: AnimationSpec, cell: &ProgressCell) -> AnimationId {
        self.scheduler.start(spec, cell.setter())
    }

    /// Restart an entrance animation on `config.animation_ms`, replacing `previous`
    pub fn restart_entrance(
        &mut self,
        previous: Option<AnimationId>,
        easing: Easing,
        cell: &ProgressCell,
    ) -> ConfigResult<Option<AnimationId>> {
        if let Some(id) = previous {
            self.scheduler.cancel(id);
            self.scheduler.prune();
        }
        if !self.is_mounted() {
            return Ok(None);
        }
        cell.set(0.0);
        let spec = AnimationSpec::new(self.config.animation_ms)?.with_easing(easing);
        Ok(Some(self.animate(spec, cell)))
    }

    /// Resolve the pointer; `Some` only when the hovered entity changed
    pub fn track_pointer(&mut self, pos: Pos2, scene: &HitScene<'_>) -> Option<HoverChange> {
        if !self.is_mounted() {
            return None;
        }
        self.resolver.pointer_moved(pos, scene)
    }

    pub fn pointer_left(&mut self) -> Option<HoverUpdate> {
        self.resolver.pointer_left()?;
        Some(self.notify(None))
    }

    /// Drop the hovered entity after its entity set changed
    ///
    /// The callback hears the clear right away; the host picks it up through
    /// [`Widget::take_hover_update`].
    pub fn clear_hover(&mut self) {
        let was_hovering = self.resolver.state().is_hovering();
        self.resolver.reset();
        if was_hovering {
            self.queue_hover(None);
        }
    }

    /// Report a hover change that did not come from the pointer
    pub fn queue_hover(&mut self, event: Option<HoverEvent>) {
        let update = self.notify(event);
        self.pending_hover = Some(update);
    }

    pub fn take_hover_update(&mut self) -> Option<HoverUpdate> {
        self.pending_hover.take()
    }

    /// Deliver a hover transition to the callback
    pub fn notify(&mut self, event: Option<HoverEvent>) -> HoverUpdate {
        if let Some(callback) = self.on_hover.as_mut() {
            callback(event.as_ref());
        }
        match event {
            Some(event) => HoverUpdate::Entered(event),
            None => HoverUpdate::Cleared,
        }
    }

    /// Hover payload for an entity of this widget
    pub fn hover_event(&self, entity: EntityRef, entity_id: impl Into<String>, label: impl Into<String>, value: f64) -> HoverEvent {
        HoverEvent {
            widget_id: self.id,
            entity,
            entity_id: entity_id.into(),
            label: label.into(),
            value,
        }
    }

    /// Shape error for data this widget cannot show
    pub fn reject(&self, data: &DataSource, expected: &'static str) -> tv_core::ConfigError {
        warn!(
            "{} '{}' cannot show {} data",
            self.config.kind.name(),
            self.title,
            data.kind()
        );
        tv_core::ConfigError::DataShape {
            widget: self.config.kind.name().to_string(),
            expected,
        }
    }

    pub fn render(&self, surface: &mut dyn Surface, composer: &dyn crate::pipeline::FrameComposer) {
        self.pipeline
            .render(surface, &self.viewport, composer, self.resolver.state());
    }
}
