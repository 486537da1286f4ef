//! Desktop host for the threat dashboard

use std::sync::Arc;

use eframe::egui::{self, Context, RichText, Sense, Ui, Vec2};
use parking_lot::Mutex;
use tracing::{debug, info};

use tv_core::events::events::HoverChanged;
use tv_core::events::handler_from_fn;
use tv_core::{EventBus, WidgetId};
use tv_data::DashboardConfig;
use tv_render::PainterSurface;
use tv_views::{ChartMode, Dashboard, DistributionChart, ThreatScanner};

/// Application state
pub struct ThreatDashboardApp {
    config: DashboardConfig,
    dashboard: Dashboard,
    /// Last hover reported on the bus, shown in the status bar
    hover_status: Arc<Mutex<Option<String>>>,
    chart_mode: ChartMode,
    scanner_filter: Option<String>,
}

impl ThreatDashboardApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, config: DashboardConfig) -> Self {
        let hover_status = Arc::new(Mutex::new(None));
        let dashboard = Self::build_dashboard(&config, hover_status.clone());
        Self {
            config,
            dashboard,
            hover_status,
            chart_mode: ChartMode::default(),
            scanner_filter: None,
        }
    }

    fn build_dashboard(config: &DashboardConfig, hover_status: Arc<Mutex<Option<String>>>) -> Dashboard {
        let bus = Arc::new(EventBus::new());
        bus.subscribe::<HoverChanged>(handler_from_fn(move |event| {
            if let Some(hover) = event.as_any().downcast_ref::<HoverChanged>() {
                *hover_status.lock() = match (&hover.entity_id, hover.value) {
                    (Some(entity), Some(value)) => Some(format!("{}: {:.1}", entity, value)),
                    _ => None,
                };
            }
        }));
        Dashboard::from_config(config, bus)
    }

    fn reset(&mut self) {
        info!("Rebuilding dashboard '{}'", self.config.title);
        *self.hover_status.lock() = None;
        self.dashboard = Self::build_dashboard(&self.config, self.hover_status.clone());
        self.chart_mode = ChartMode::default();
        self.scanner_filter = None;
    }

    fn apply_chart_mode(&mut self, mode: ChartMode) {
        self.chart_mode = mode;
        for id in self.dashboard.ids() {
            let Some(widget) = self.dashboard.get_mut(id) else {
                continue;
            };
            if let Some(chart) = widget.as_any_mut().downcast_mut::<DistributionChart>() {
                if let Err(e) = chart.set_mode(mode) {
                    debug!("Chart mode change ignored: {}", e);
                }
            }
        }
    }

    fn apply_scanner_filter(&mut self, filter: Option<String>) {
        for id in self.dashboard.ids() {
            if let Some(scanner) = self
                .dashboard
                .get_mut(id)
                .and_then(|w| w.as_any_mut().downcast_mut::<ThreatScanner>())
            {
                scanner.set_category_filter(filter.as_deref());
            }
        }
        self.scanner_filter = filter;
    }

    fn scanner_categories(&self) -> Vec<String> {
        self.dashboard
            .widgets()
            .find_map(|(_, w)| w.as_any().downcast_ref::<ThreatScanner>())
            .map(|s| s.categories().into_iter().map(str::to_string).collect())
            .unwrap_or_default()
    }

    fn handle_menu(&mut self, ctx: &Context) {
        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.menu_button("Dashboard", |ui| {
                    if ui.button("Reset").clicked() {
                        self.reset();
                        ui.close_menu();
                    }
                });

                ui.menu_button("View", |ui| {
                    ui.label("Content distribution");
                    let mut mode = self.chart_mode;
                    ui.radio_value(&mut mode, ChartMode::Pie, "Pie");
                    ui.radio_value(&mut mode, ChartMode::Bar, "Bar");
                    if mode != self.chart_mode {
                        self.apply_chart_mode(mode);
                    }

                    ui.separator();
                    ui.label("Scanner category");
                    let mut filter = self.scanner_filter.clone();
                    ui.radio_value(&mut filter, None, "All");
                    for category in self.scanner_categories() {
                        ui.radio_value(&mut filter, Some(category.clone()), category);
                    }
                    if filter != self.scanner_filter {
                        self.apply_scanner_filter(filter);
                    }
                });
            });
        });
    }

    fn show_widget(&mut self, ui: &mut Ui, id: WidgetId) {
        let Some(widget) = self.dashboard.get(id) else {
            return;
        };
        let title = widget.title().to_string();
        let viewport = widget.viewport();

        ui.group(|ui| {
            ui.vertical(|ui| {
                ui.label(RichText::new(title).strong());
                let size = Vec2::new(viewport.width_px, viewport.height_px);
                let (response, painter) = ui.allocate_painter(size, Sense::hover());

                match response.hover_pos() {
                    Some(pos) => {
                        let local = (pos - response.rect.min).to_pos2();
                        self.dashboard.pointer_moved(id, local);
                    }
                    None => {
                        self.dashboard.pointer_left(id);
                    }
                }

                let mut surface = PainterSurface::new(painter, response.rect.min);
                self.dashboard.render(id, &mut surface);
            });
        });
    }
}

impl eframe::App for ThreatDashboardApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        let now_ms = ctx.input(|i| i.time) * 1000.0;
        let animating = self.dashboard.frame(now_ms);

        self.handle_menu(ctx);

        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label(format!("{} widgets", self.dashboard.len()));
                ui.separator();
                match self.hover_status.lock().as_deref() {
                    Some(status) => ui.label(status),
                    None => ui.weak("Hover a chart for details"),
                };
            });
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                ui.horizontal_wrapped(|ui| {
                    for id in self.dashboard.ids() {
                        self.show_widget(ui, id);
                    }
                });
            });
        });

        if animating {
            ctx.request_repaint();
        }
    }
}
