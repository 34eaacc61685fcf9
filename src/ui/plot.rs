use std::f64::consts::{FRAC_PI_2, TAU};

use eframe::egui::{Color32, RichText, Stroke, Ui};
use egui_plot::{Legend, MarkerShape, Plot, PlotPoint, PlotPoints, Points, Polygon, Text};

use crate::color::{ColorMap, FAILURE_COLOR, SUCCESS_COLOR};
use crate::data::model::OutcomeClass;
use crate::state::AppState;
use crate::view::chart::{ChartBody, PieChart, ScatterChart, ScatterSeries};
use crate::view::layout::GraphId;

/// Wedges wider than this are split so every polygon stays convex.
const MAX_WEDGE: f64 = FRAC_PI_2;
/// Arc segments per full turn.
const ARC_RESOLUTION: f64 = 96.0;
/// Slices below this share get no percentage label.
const MIN_LABELLED_SHARE: f64 = 0.03;

// ---------------------------------------------------------------------------
// Chart region (central panel)
// ---------------------------------------------------------------------------

/// Render one chart region: title, copy button and the figure itself.
pub fn chart_region(ui: &mut Ui, state: &AppState, graph: GraphId, height: f32) {
    let Some(spec) = state.figure(graph) else {
        ui.weak(format!("{graph}: not computed"));
        return;
    };

    ui.horizontal(|ui: &mut Ui| {
        ui.heading(&spec.title);
        if ui.small_button("Copy spec").clicked() {
            match spec.to_json() {
                Ok(json) => ui.ctx().copy_text(json),
                Err(e) => log::error!("Failed to serialize {graph}: {e}"),
            }
        }
        if spec.is_empty() {
            ui.label(RichText::new("No data").italics().weak());
        }
    });

    match &spec.body {
        ChartBody::Pie(pie) => pie_chart(ui, graph, pie, height),
        ChartBody::Scatter(scatter) => {
            scatter_chart(ui, graph, scatter, &state.category_colors, height)
        }
    }
}

// ---------------------------------------------------------------------------
// Pie
// ---------------------------------------------------------------------------

fn pie_chart(ui: &mut Ui, graph: GraphId, pie: &PieChart, height: f32) {
    let total = pie.total();
    let colors = slice_colors(pie);

    Plot::new(graph.as_str())
        .legend(Legend::default())
        .height(height)
        .data_aspect(1.0)
        .show_axes(false)
        .show_grid(false)
        .show_x(false)
        .show_y(false)
        .allow_drag(false)
        .allow_zoom(false)
        .allow_scroll(false)
        .allow_boxed_zoom(false)
        .include_x(-1.1)
        .include_x(1.1)
        .include_y(-1.1)
        .include_y(1.1)
        .show(ui, |plot_ui| {
            if total <= 0.0 {
                return;
            }
            // Slices run clockwise from twelve o'clock.
            let mut start = FRAC_PI_2;
            for slice in &pie.slices {
                if slice.value <= 0.0 {
                    continue;
                }
                let share = slice.value / total;
                let sweep = share * TAU;
                let color = colors.color_for(&slice.label);

                for (from, to) in wedge_spans(start, start - sweep) {
                    plot_ui.polygon(
                        Polygon::new(wedge_points(from, to))
                            .name(&slice.label)
                            .fill_color(color)
                            .stroke(Stroke::new(1.0, Color32::WHITE)),
                    );
                }

                if share >= MIN_LABELLED_SHARE {
                    let mid = start - sweep / 2.0;
                    plot_ui.text(Text::new(
                        PlotPoint::new(0.65 * mid.cos(), 0.65 * mid.sin()),
                        RichText::new(format!("{:.1}%", share * 100.0)).color(Color32::WHITE),
                    ));
                }
                start -= sweep;
            }
        });
}

/// Palette colours per slice label, with the outcome split pinned to
/// green for success and red for failure.
fn slice_colors(pie: &PieChart) -> ColorMap {
    let labels: Vec<&str> = pie.slices.iter().map(|s| s.label.as_str()).collect();
    ColorMap::new(labels.as_slice())
        .pin(OutcomeClass::Success.label(), SUCCESS_COLOR)
        .pin(OutcomeClass::Failure.label(), FAILURE_COLOR)
}

/// Split the arc `from → to` (clockwise, radians) into pieces no wider than
/// [`MAX_WEDGE`].
fn wedge_spans(from: f64, to: f64) -> Vec<(f64, f64)> {
    let sweep = from - to;
    let pieces = (sweep / MAX_WEDGE - 1e-9).ceil().max(1.0) as usize;
    let step = sweep / pieces as f64;
    (0..pieces)
        .map(|i| (from - step * i as f64, from - step * (i + 1) as f64))
        .collect()
}

/// Closed wedge outline on the unit circle: centre, then the arc.
fn wedge_points(from: f64, to: f64) -> Vec<[f64; 2]> {
    let segments = (((from - to) / TAU) * ARC_RESOLUTION).ceil().max(1.0) as usize;
    let mut points = vec![[0.0, 0.0]];
    points.extend((0..=segments).map(|i| {
        let angle = from - (from - to) * i as f64 / segments as f64;
        [angle.cos(), angle.sin()]
    }));
    points
}

// ---------------------------------------------------------------------------
// Scatter
// ---------------------------------------------------------------------------

fn scatter_chart(
    ui: &mut Ui,
    graph: GraphId,
    scatter: &ScatterChart,
    colors: &ColorMap,
    height: f32,
) {
    let series = scatter.series.clone();
    let x_axis = scatter.x_axis.clone();
    let y_axis = scatter.y_axis.clone();

    Plot::new(graph.as_str())
        .legend(Legend::default())
        .height(height)
        .x_axis_label(scatter.x_axis.as_str())
        .y_axis_label(scatter.y_axis.as_str())
        .include_y(-0.2)
        .include_y(1.2)
        .include_x(0.0)
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .label_formatter(move |name, value| hover_text(&series, &x_axis, &y_axis, name, value))
        .show(ui, |plot_ui| {
            for s in &scatter.series {
                let points: PlotPoints = s.points.iter().map(|p| [p.x, p.y]).collect();
                plot_ui.points(
                    Points::new(points)
                        .name(&s.name)
                        .color(colors.color_for(&s.name))
                        .shape(MarkerShape::Circle)
                        .filled(true)
                        .radius(4.0),
                );
            }
        });
}

/// Hover label for a scatter point: coordinates plus the point's hover
/// fields. Off-item hovers show bare coordinates.
fn hover_text(
    series: &[ScatterSeries],
    x_axis: &str,
    y_axis: &str,
    name: &str,
    value: &PlotPoint,
) -> String {
    let mut text = String::new();
    if !name.is_empty() {
        text.push_str(name);
        text.push('\n');
    }
    text.push_str(&format!("{x_axis}: {:.0}\n{y_axis}: {:.0}", value.x, value.y));

    let nearest = series
        .iter()
        .filter(|s| s.name == name)
        .flat_map(|s| s.points.iter())
        .min_by(|a, b| {
            let da = (a.x - value.x).abs() + (a.y - value.y).abs();
            let db = (b.x - value.x).abs() + (b.y - value.y).abs();
            da.total_cmp(&db)
        });
    if let Some(point) = nearest {
        for (field, v) in &point.hover {
            text.push_str(&format!("\n{field}: {v}"));
        }
    }
    text
}
