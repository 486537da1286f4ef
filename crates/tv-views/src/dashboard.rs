//! Dashboard - ordered registry of mounted widgets
//!
//! The dashboard owns every widget, forwards host frames and pointer input to
//! them, and reports lifecycle and hover changes on the [`EventBus`]. Widgets
//! never see each other.

use std::sync::Arc;

use egui::Pos2;
use indexmap::IndexMap;
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use tv_core::events::events::{HoverChanged, WidgetMounted, WidgetRejected, WidgetUnmounted};
use tv_core::{EventBus, WidgetId};
use tv_data::DashboardConfig;
use tv_render::Surface;

use crate::widget::{HoverUpdate, Widget};
use crate::widgets::build_widget;

struct Slot {
    name: String,
    widget: Box<dyn Widget>,
}

pub struct Dashboard {
    title: String,
    slots: IndexMap<WidgetId, Slot>,
    bus: Arc<EventBus>,
}

impl Dashboard {
    pub fn new(title: impl Into<String>) -> Self {
        Self::with_bus(title, Arc::new(EventBus::new()))
    }

    pub fn with_bus(title: impl Into<String>, bus: Arc<EventBus>) -> Self {
        Self {
            title: title.into(),
            slots: IndexMap::new(),
            bus,
        }
    }

    /// Build and mount every widget of `config`
    ///
    /// A widget whose configuration fails validation is skipped and reported
    /// as [`WidgetRejected`]; the rest of the dashboard still comes up.
    pub fn from_config(config: &DashboardConfig, bus: Arc<EventBus>) -> Self {
        let mut dashboard = Self::with_bus(config.title.clone(), bus);
        for (name, widget_config) in &config.widgets {
            let kind = widget_config.kind;
            match build_widget(widget_config.clone()) {
                Ok(widget) => {
                    dashboard.mount(name.clone(), widget);
                }
                Err(e) => {
                    warn!("Skipping widget '{}': {}", name, e);
                    dashboard.bus.publish(WidgetRejected {
                        widget_type: kind.name().to_string(),
                        error: e.to_string(),
                    });
                }
            }
        }
        info!("Dashboard '{}' ready with {} widgets", dashboard.title, dashboard.len());
        dashboard
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn bus(&self) -> &Arc<EventBus> {
        &self.bus
    }

    /// Mount `widget` and append it to the layout order
    pub fn mount(&mut self, name: impl Into<String>, mut widget: Box<dyn Widget>) -> WidgetId {
        let id = widget.id();
        let name = name.into();
        widget.mount();
        debug!("Dashboard mounted '{}' as {}", name, widget.kind().name());
        self.bus.publish(WidgetMounted {
            widget_id: id,
            widget_type: widget.kind().name().to_string(),
        });
        self.slots.insert(id, Slot { name, widget });
        id
    }

    /// Tear the widget down and hand it back
    pub fn unmount(&mut self, id: WidgetId) -> Option<Box<dyn Widget>> {
        let mut slot = self.slots.shift_remove(&id)?;
        slot.widget.unmount();
        debug!("Dashboard unmounted '{}'", slot.name);
        self.bus.publish(WidgetUnmounted { widget_id: id });
        Some(slot.widget)
    }

    pub fn unmount_all(&mut self) {
        let ids: Vec<WidgetId> = self.slots.keys().copied().collect();
        for id in ids {
            self.unmount(id);
        }
    }

    /// Advance every widget to `now_ms`; `true` if any still animates
    ///
    /// Hover changes a widget raised on its own since the last frame are
    /// published here.
    pub fn frame(&mut self, now_ms: f64) -> bool {
        let mut repaint = false;
        for (id, slot) in self.slots.iter_mut() {
            if let Some(update) = slot.widget.take_hover_update() {
                publish_hover(&self.bus, *id, &update);
            }
            slot.widget.on_frame(now_ms);
            if let Some(update) = slot.widget.take_hover_update() {
                publish_hover(&self.bus, *id, &update);
            }
            repaint |= slot.widget.needs_repaint();
        }
        repaint
    }

    pub fn needs_repaint(&self) -> bool {
        self.slots.values().any(|s| s.widget.needs_repaint())
    }

    /// Route a pointer move, in the widget's local coordinates
    pub fn pointer_moved(&mut self, id: WidgetId, pos: Pos2) -> Option<HoverUpdate> {
        let update = self.slots.get_mut(&id)?.widget.pointer_moved(pos)?;
        publish_hover(&self.bus, id, &update);
        Some(update)
    }

    pub fn pointer_left(&mut self, id: WidgetId) -> Option<HoverUpdate> {
        let update = self.slots.get_mut(&id)?.widget.pointer_left()?;
        publish_hover(&self.bus, id, &update);
        Some(update)
    }


    /// Draw one widget; `false` if it is not on the dashboard
    pub fn render(&self, id: WidgetId, surface: &mut dyn Surface) -> bool {
        match self.slots.get(&id) {
            Some(slot) => {
                slot.widget.render(surface);
                true
            }
            None => false,
        }
    }

    /// Widgets in layout order with their names
    pub fn widgets(&self) -> impl Iterator<Item = (&str, &dyn Widget)> + '_ {
        self.slots.values().map(|s| (s.name.as_str(), s.widget.as_ref()))
    }

    pub fn ids(&self) -> Vec<WidgetId> {
        self.slots.keys().copied().collect()
    }

    pub fn get(&self, id: WidgetId) -> Option<&dyn Widget> {
        self.slots.get(&id).map(|s| s.widget.as_ref())
    }

    pub fn get_mut(&mut self, id: WidgetId) -> Option<&mut Box<dyn Widget>> {
        self.slots.get_mut(&id).map(|s| &mut s.widget)
    }

    pub fn find(&self, name: &str) -> Option<WidgetId> {
        self.slots.iter().find(|(_, s)| s.name == name).map(|(id, _)| *id)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Saved state of every widget, keyed by name
    pub fn save_config(&self) -> Value {
        let widgets: serde_json::Map<String, Value> = self
            .slots
            .values()
            .map(|s| (s.name.clone(), s.widget.save_config()))
            .collect();
        json!({
            "title": self.title,
            "widgets": widgets,
        })
    }
}

fn publish_hover(bus: &EventBus, id: WidgetId, update: &HoverUpdate) {
    let (entity_id, value) = match update {
        HoverUpdate::Entered(event) => (Some(event.entity_id.clone()), Some(event.value)),
        HoverUpdate::Cleared => (None, None),
    };
    bus.publish(HoverChanged {
        widget_id: id,
        entity_id,
        value,
    });
}

impl Drop for Dashboard {
    fn drop(&mut self) {
        self.unmount_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use tv_core::events::handler_from_fn;
    use tv_core::EntityRef;
    use tv_data::{WidgetConfig, WidgetKind};
    use tv_render::DisplayList;

    use crate::widgets::ScoreGauge;

    #[derive(Default)]
    struct Log {
        mounted: Vec<String>,
        unmounted: usize,
        hovers: Vec<Option<String>>,
        rejected: Vec<String>,
    }

    fn recording_bus() -> (Arc<EventBus>, Arc<Mutex<Log>>) {
        let bus = Arc::new(EventBus::new());
        let log = Arc::new(Mutex::new(Log::default()));

        let sink = log.clone();
        bus.subscribe::<WidgetMounted>(handler_from_fn(move |e| {
            if let Some(e) = e.as_any().downcast_ref::<WidgetMounted>() {
                sink.lock().mounted.push(e.widget_type.clone());
            }
        }));
        let sink = log.clone();
        bus.subscribe::<WidgetUnmounted>(handler_from_fn(move |_| {
            sink.lock().unmounted += 1;
        }));
        let sink = log.clone();
        bus.subscribe::<HoverChanged>(handler_from_fn(move |e| {
            if let Some(e) = e.as_any().downcast_ref::<HoverChanged>() {
                sink.lock().hovers.push(e.entity_id.clone());
            }
        }));
        let sink = log.clone();
        bus.subscribe::<WidgetRejected>(handler_from_fn(move |e| {
            if let Some(e) = e.as_any().downcast_ref::<WidgetRejected>() {
                sink.lock().rejected.push(e.widget_type.clone());
            }
        }));
        (bus, log)
    }

    #[test]
    fn test_default_dashboard_mounts_in_order() {
        let (bus, log) = recording_bus();
        let dashboard = Dashboard::from_config(&DashboardConfig::default(), bus);
        assert_eq!(dashboard.len(), 6);

        let names: Vec<&str> = dashboard.widgets().map(|(name, _)| name).collect();
        assert_eq!(
            names,
            vec!["anomalies", "detection", "scanner", "content", "geography", "threat-score"]
        );
        assert!(dashboard.widgets().all(|(_, w)| w.is_mounted()));
        assert_eq!(log.lock().mounted.len(), 6);
        assert_eq!(log.lock().mounted[0], WidgetKind::AnomalyChart.name());
    }

    #[test]
    fn test_rejected_widget_is_skipped() {
        let (bus, log) = recording_bus();
        let mut config = DashboardConfig::new();
        config.widgets.clear();
        config.insert("gauge", WidgetConfig::new(WidgetKind::ScoreGauge));
        config.insert("broken", WidgetConfig::new(WidgetKind::ThreatMap).with_dimensions(0.0, 300.0));

        let dashboard = Dashboard::from_config(&config, bus);
        assert_eq!(dashboard.len(), 1);
        assert!(dashboard.find("broken").is_none());
        assert_eq!(log.lock().rejected, vec![WidgetKind::ThreatMap.name().to_string()]);
    }

    #[test]
    fn test_config_file_with_bad_entry_still_mounts_the_rest() {
        let json = r#"{
            "title": "Mixed",
            "widgets": {
                "gauge": {
                    "kind": "score_gauge",
                    "dimensions": { "width": 300, "height": 180 },
                    "animation_ms": 2000
                },
                "bad": {
                    "kind": "anomaly_chart",
                    "capacity": 0,
                    "dimensions": { "width": 800, "height": 300 },
                    "animation_ms": 2000
                }
            }
        }"#;
        let config = DashboardConfig::from_json_str(json).unwrap();

        let (bus, log) = recording_bus();
        let dashboard = Dashboard::from_config(&config, bus);
        assert_eq!(dashboard.title(), "Mixed");
        assert_eq!(dashboard.len(), 1);
        assert!(dashboard.find("gauge").is_some());
        assert_eq!(log.lock().rejected, vec![WidgetKind::AnomalyChart.name().to_string()]);
    }

    #[test]
    fn test_frames_pointer_and_unmount() {
        let (bus, log) = recording_bus();
        let mut dashboard = Dashboard::with_bus("test", bus);
        let gauge = ScoreGauge::new(WidgetConfig::new(WidgetKind::ScoreGauge)).unwrap();
        let id = dashboard.mount("gauge", Box::new(gauge));

        assert!(dashboard.frame(0.0));
        assert!(!dashboard.frame(2000.0));

        let projector = dashboard
            .get(id)
            .and_then(|w| w.as_any().downcast_ref::<ScoreGauge>())
            .map(|g| g.projector())
            .unwrap();
        let update = dashboard.pointer_moved(id, projector.point_at(10.0, projector.radius()));
        assert!(matches!(update, Some(HoverUpdate::Entered(_))));
        assert_eq!(dashboard.get(id).unwrap().interaction().hovered, Some(EntityRef::Gauge));
        assert_eq!(dashboard.pointer_left(id), Some(HoverUpdate::Cleared));
        assert_eq!(
            log.lock().hovers,
            vec![Some("threat-score".to_string()), None]
        );

        let mut list = DisplayList::new();
        assert!(dashboard.render(id, &mut list));
        assert!(list.contains_text("Elevated Risk"));

        let widget = dashboard.unmount(id).unwrap();
        assert!(!widget.is_mounted());
        assert!(dashboard.is_empty());
        assert_eq!(log.lock().unmounted, 1);
        assert_eq!(dashboard.pointer_moved(id, Pos2::ZERO), None);
        assert!(!dashboard.render(id, &mut DisplayList::new()));
    }

    #[test]
    fn test_widget_side_hover_clear_is_published() {
        let (bus, log) = recording_bus();
        let mut dashboard = Dashboard::with_bus("test", bus);
        let gauge = ScoreGauge::new(WidgetConfig::new(WidgetKind::ScoreGauge)).unwrap();
        let id = dashboard.mount("gauge", Box::new(gauge));
        dashboard.frame(0.0);
        dashboard.frame(2000.0);

        let projector = dashboard
            .get(id)
            .and_then(|w| w.as_any().downcast_ref::<ScoreGauge>())
            .map(|g| g.projector())
            .unwrap();
        dashboard.pointer_moved(id, projector.point_at(10.0, projector.radius()));

        let gauge = dashboard
            .get_mut(id)
            .and_then(|w| w.as_any_mut().downcast_mut::<ScoreGauge>())
            .unwrap();
        gauge.set_score(80.0).unwrap();
        assert_eq!(log.lock().hovers, vec![Some("threat-score".to_string())]);

        dashboard.frame(2016.0);
        assert_eq!(log.lock().hovers, vec![Some("threat-score".to_string()), None]);
        dashboard.frame(2032.0);
        assert_eq!(log.lock().hovers.len(), 2);
    }

    #[test]
    fn test_drop_unmounts_everything() {
        let (bus, log) = recording_bus();
        {
            let _dashboard = Dashboard::from_config(&DashboardConfig::default(), bus);
        }
        assert_eq!(log.lock().unmounted, 6);
    }

    #[test]
    fn test_save_config_keys_by_name() {
        let dashboard = Dashboard::from_config(&DashboardConfig::default(), Arc::new(EventBus::new()));
        let saved = dashboard.save_config();
        assert_eq!(saved["widgets"]["threat-score"]["score"], json!(42.0));
        assert_eq!(saved["widgets"].as_object().map(|m| m.len()), Some(6));
    }
}
