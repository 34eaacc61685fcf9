use eframe::egui::{self, pos2, vec2, Align2, Color32, Rect, RichText, Sense, TextStyle, Ui};

use crate::state::AppState;
use crate::view::layout::RangeSlider;

// ---------------------------------------------------------------------------
// Left side panel – control widgets
// ---------------------------------------------------------------------------

/// Render the site dropdown and the payload range slider.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filters");
    ui.separator();

    site_dropdown(ui, state);
    ui.add_space(12.0);
    payload_slider(ui, state);
}

fn site_dropdown(ui: &mut Ui, state: &mut AppState) {
    ui.strong("Launch site");

    let dropdown = state.layout.dropdown.clone();
    let current = state.controls().site.clone();
    let mut picked = None;

    egui::ComboBox::from_id_salt(dropdown.id.as_str())
        .selected_text(dropdown.label_for(&current))
        .width(ui.available_width())
        .show_ui(ui, |ui: &mut Ui| {
            if dropdown.searchable {
                ui.add(
                    egui::TextEdit::singleline(&mut state.site_query)
                        .hint_text(dropdown.placeholder.as_str()),
                );
                ui.separator();
            }
            let mut any = false;
            for option in dropdown.matching(&state.site_query) {
                any = true;
                if ui
                    .selectable_label(option.value == current, &option.label)
                    .clicked()
                {
                    picked = Some(option.value.clone());
                }
            }
            if !any {
                ui.weak("No matching sites");
            }
        });

    if let Some(site) = picked {
        state.site_query.clear();
        state.set_site(site);
    }
}

fn payload_slider(ui: &mut Ui, state: &mut AppState) {
    ui.strong("Payload range (kg)");

    let slider = state.layout.slider.clone();
    let current = state.controls().payload;
    let mut lo = current.min;
    let mut hi = current.max;

    let lo_response = ui.add(
        egui::Slider::new(&mut lo, slider.min..=slider.max)
            .step_by(slider.step)
            .text("min"),
    );
    let hi_changed = ui
        .add(
            egui::Slider::new(&mut hi, slider.min..=slider.max)
                .step_by(slider.step)
                .text("max"),
        )
        .changed();
    let lo_changed = lo_response.changed();

    tick_marks(ui, &slider, lo_response.rect);

    if lo_changed || hi_changed {
        let range = slider.settle(lo, hi, lo_changed);
        if let Err(e) = state.set_payload_range(range.min, range.max) {
            log::debug!("Slider move {lo}..{hi} not applied: {e}");
        }
    }
}

/// Labelled ticks under the slider rail, each at its value's position.
fn tick_marks(ui: &mut Ui, slider: &RangeSlider, slider_rect: Rect) {
    let font = TextStyle::Small.resolve(ui.style());
    let color = ui.visuals().weak_text_color();
    let (row, _) = ui.allocate_exact_size(
        vec2(ui.available_width(), font.size + 4.0),
        Sense::hover(),
    );

    // egui insets the handle travel by the handle radius at both ends.
    let inset = slider_rect.height() / 2.5;
    let left = slider_rect.left() + inset;
    let right = slider_rect.left() + ui.spacing().slider_width - inset;

    let painter = ui.painter();
    for (at, label) in &slider.marks {
        let x = egui::lerp(left..=right, slider.fraction(*at) as f32);
        painter.text(pos2(x, row.top()), Align2::CENTER_TOP, label, font.clone(), color);
    }
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the page heading and the dataset summary.
pub fn top_bar(ui: &mut Ui, state: &AppState) {
    ui.horizontal(|ui: &mut Ui| {
        ui.label(
            RichText::new(&state.layout.title)
                .size(24.0)
                .color(ui.visuals().strong_text_color()),
        );

        ui.separator();

        let ds = state.dataset();
        ui.label(format!(
            "{} launches from {} sites",
            ds.len(),
            ds.distinct_sites().len()
        ));

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}
