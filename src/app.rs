use eframe::egui::{self, ScrollArea, Ui};

use crate::state::AppState;
use crate::ui::{panels, plot};

/// Smallest height a chart region is squeezed to.
const MIN_CHART_HEIGHT: f32 = 260.0;

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct LaunchDashApp {
    pub state: AppState,
}

impl LaunchDashApp {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }
}

impl eframe::App for LaunchDashApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: heading ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &self.state);
        });

        // ---- Left side panel: controls ----
        egui::SidePanel::left("control_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: charts, in layout order ----
        egui::CentralPanel::default().show(ctx, |ui| {
            let graphs = self.state.layout.graphs.clone();
            let height = chart_height(ui, graphs.len());
            ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui: &mut Ui| {
                    for graph in graphs {
                        plot::chart_region(ui, &self.state, graph, height);
                        ui.separator();
                    }
                });
        });
    }
}

/// Share the central panel between `charts` regions, leaving room for the
/// per-chart heading row.
fn chart_height(ui: &Ui, charts: usize) -> f32 {
    let per_chart = ui.available_height() / charts.max(1) as f32 - 48.0;
    per_chart.max(MIN_CHART_HEIGHT)
}
