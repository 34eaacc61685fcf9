use std::collections::BTreeMap;

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.75, 0.55);
            let rgb: Srgb = hsl.into_color();
            Color32::from_rgb(
                (rgb.red * 255.0) as u8,
                (rgb.green * 255.0) as u8,
                (rgb.blue * 255.0) as u8,
            )
        })
        .collect()
}

/// Fixed colours for the two outcome slices of a single-site pie.
pub const SUCCESS_COLOR: Color32 = Color32::from_rgb(44, 160, 44);
pub const FAILURE_COLOR: Color32 = Color32::from_rgb(214, 39, 40);

// ---------------------------------------------------------------------------
// Color mapping: category label → Color32
// ---------------------------------------------------------------------------

/// Maps category labels (booster categories, pie slice labels) to distinct
/// colours. Colours are handed out in the order the labels are given, so a
/// map built from the whole dataset keeps each category's colour stable
/// while filters change.
#[derive(Debug, Clone)]
pub struct ColorMap {
    mapping: BTreeMap<String, Color32>,
    default_color: Color32,
}

impl ColorMap {
    pub fn new<S: AsRef<str>>(labels: &[S]) -> Self {
        let mut order: Vec<String> = Vec::with_capacity(labels.len());
        for label in labels {
            if !order.iter().any(|l| l == label.as_ref()) {
                order.push(label.as_ref().to_string());
            }
        }
        let mapping = order
            .iter()
            .cloned()
            .zip(generate_palette(order.len()))
            .collect();

        ColorMap {
            mapping,
            default_color: Color32::GRAY,
        }
    }

    /// Force `label` to `color`, whatever the palette handed out.
    pub fn pin(mut self, label: &str, color: Color32) -> Self {
        self.mapping.insert(label.to_string(), color);
        self
    }

    /// Look up the colour for a label; unknown labels are grey.
    pub fn color_for(&self, label: &str) -> Color32 {
        self.mapping
            .get(label)
            .copied()
            .unwrap_or(self.default_color)
    }
}
