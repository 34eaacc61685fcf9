use std::fmt;

use thiserror::Error;

use crate::config::DashConfig;
use crate::data::filter::{PayloadRange, SiteSelector};
use crate::data::model::Dataset;

// ---------------------------------------------------------------------------
// Identifiers
// ---------------------------------------------------------------------------

/// Inputs a derivation can depend on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ControlId {
    SiteDropdown,
    PayloadSlider,
}

impl ControlId {
    pub fn as_str(self) -> &'static str {
        match self {
            ControlId::SiteDropdown => "site-dropdown",
            ControlId::PayloadSlider => "payload-slider",
        }
    }
}

impl fmt::Display for ControlId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Chart regions a derivation can write to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum GraphId {
    SuccessPieChart,
    SuccessPayloadScatterChart,
}

impl GraphId {
    pub fn as_str(self) -> &'static str {
        match self {
            GraphId::SuccessPieChart => "success-pie-chart",
            GraphId::SuccessPayloadScatterChart => "success-payload-scatter-chart",
        }
    }
}

impl fmt::Display for GraphId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Controls
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct DropdownOption {
    pub label: String,
    pub value: SiteSelector,
}

/// Single-choice, searchable site picker.
#[derive(Debug, Clone, PartialEq)]
pub struct SiteDropdown {
    pub id: ControlId,
    pub options: Vec<DropdownOption>,
    pub default: SiteSelector,
    pub placeholder: String,
    pub searchable: bool,
}

impl SiteDropdown {
    /// Options whose label contains `query` (case-insensitive). An empty
    /// query keeps every option.
    pub fn matching<'a>(&'a self, query: &str) -> impl Iterator<Item = &'a DropdownOption> + 'a {
        let needle = query.trim().to_lowercase();
        self.options
            .iter()
            .filter(move |opt| needle.is_empty() || opt.label.to_lowercase().contains(&needle))
    }

    pub fn label_for(&self, value: &SiteSelector) -> String {
        self.options
            .iter()
            .find(|opt| &opt.value == value)
            .map(|opt| opt.label.clone())
            .unwrap_or_else(|| value.to_string())
    }
}

/// Malformed value pushed into a control.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ControlError {
    #[error("payload range bound is not a number")]
    NotANumber,
    #[error("payload range {min}..{max} is inverted")]
    Inverted { min: f64, max: f64 },
    #[error("payload range {min}..{max} exceeds slider bounds {lower}..{upper}")]
    OutOfBounds {
        min: f64,
        max: f64,
        lower: f64,
        upper: f64,
    },
}

/// Two-handle numeric slider over `[min, max]`.
#[derive(Debug, Clone, PartialEq)]
pub struct RangeSlider {
    pub id: ControlId,
    pub min: f64,
    pub max: f64,
    pub step: f64,
    /// Tick positions with their labels.
    pub marks: Vec<(f64, String)>,
    pub default: PayloadRange,
}

impl RangeSlider {
    pub fn new(id: ControlId, max: f64, step: f64, mark_interval: f64) -> Self {
        // Tolerate `max / interval` landing just under a whole number.
        let count = (max / mark_interval + 1e-9).floor() as usize;
        let decimals = mark_decimals(mark_interval);
        let marks = (0..=count)
            .map(|i| {
                let at = (i as f64 * mark_interval).min(max);
                (at, format!("{at:.decimals$}"))
            })
            .collect();
        RangeSlider {
            id,
            min: 0.0,
            max,
            step,
            marks,
            default: PayloadRange::new(0.0, max),
        }
    }

    /// Position of `at` along the rail, 0 at `min` and 1 at `max`.
    pub fn fraction(&self, at: f64) -> f64 {
        if self.max > self.min {
            ((at - self.min) / (self.max - self.min)).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    /// Accept a range only if it is ordered and inside the slider bounds.
    pub fn validate(&self, min: f64, max: f64) -> Result<PayloadRange, ControlError> {
        if min.is_nan() || max.is_nan() {
            return Err(ControlError::NotANumber);
        }
        if min > max {
            return Err(ControlError::Inverted { min, max });
        }
        if min < self.min || max > self.max {
            return Err(ControlError::OutOfBounds {
                min,
                max,
                lower: self.min,
                upper: self.max,
            });
        }
        Ok(PayloadRange::new(min, max))
    }

    /// Handles cannot cross: moving the lower handle above the upper one
    /// pushes the upper one along, and vice versa. `moved_lower` says which
    /// handle the user dragged.
    pub fn settle(&self, min: f64, max: f64, moved_lower: bool) -> PayloadRange {
        let min = min.clamp(self.min, self.max);
        let max = max.clamp(self.min, self.max);
        if min <= max {
            PayloadRange::new(min, max)
        } else if moved_lower {
            PayloadRange::new(min, min)
        } else {
            PayloadRange::new(max, max)
        }
    }
}

/// Fraction digits needed to print multiples of `interval` exactly.
fn mark_decimals(interval: f64) -> usize {
    (0..6)
        .find(|&d| {
            let scaled = interval * 10f64.powi(d as i32);
            (scaled - scaled.round()).abs() < 1e-9 * scaled.max(1.0)
        })
        .unwrap_or(6)
}

// ---------------------------------------------------------------------------
// Page layout
// ---------------------------------------------------------------------------

/// Declarative description of the dashboard page: heading, the two controls
/// and the chart placeholders, top to bottom.
#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    pub title: String,
    pub dropdown: SiteDropdown,
    pub slider: RangeSlider,
    pub graphs: Vec<GraphId>,
}

impl Layout {
    pub fn launch_dashboard(dataset: &Dataset, config: &DashConfig) -> Self {
        let options = std::iter::once(DropdownOption {
            label: "All Sites".to_string(),
            value: SiteSelector::All,
        })
        .chain(dataset.distinct_sites().iter().map(|site| DropdownOption {
            label: site.clone(),
            value: SiteSelector::Site(site.clone()),
        }))
        .collect();

        Layout {
            title: config.title.clone(),
            dropdown: SiteDropdown {
                id: ControlId::SiteDropdown,
                options,
                default: SiteSelector::All,
                placeholder: "Select a launch site".to_string(),
                searchable: true,
            },
            slider: RangeSlider::new(
                ControlId::PayloadSlider,
                config.payload_ceiling,
                config.payload_step,
                config.mark_interval,
            ),
            graphs: vec![GraphId::SuccessPieChart, GraphId::SuccessPayloadScatterChart],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::tests::record;
    use crate::data::model::OutcomeClass::Success;

    fn layout() -> Layout {
        let ds = Dataset::from_records(vec![
            record("CCAFS LC-40", 100.0, Success, "v1.0"),
            record("VAFB SLC-4E", 200.0, Success, "FT"),
            record("KSC LC-39A", 300.0, Success, "FT"),
        ]);
        Layout::launch_dashboard(&ds, &DashConfig::default())
    }

    #[test]
    fn dropdown_offers_all_plus_each_site() {
        let layout = layout();
        let values: Vec<&str> = layout.dropdown.options.iter().map(|o| o.value.as_str()).collect();
        assert_eq!(values, ["ALL", "CCAFS LC-40", "VAFB SLC-4E", "KSC LC-39A"]);
        assert_eq!(layout.dropdown.options[0].label, "All Sites");
        assert_eq!(layout.dropdown.default, SiteSelector::All);
    }

    #[test]
    fn dropdown_search_is_case_insensitive() {
        let layout = layout();
        let hits: Vec<&str> = layout.dropdown.matching("ccafs").map(|o| o.label.as_str()).collect();
        assert_eq!(hits, ["CCAFS LC-40"]);
        assert_eq!(layout.dropdown.matching("  ").count(), 4);
    }

    #[test]
    fn slider_defaults_to_full_range_with_marks_every_2000() {
        let slider = layout().slider;
        assert_eq!(slider.default, PayloadRange::new(0.0, 10000.0));
        assert_eq!(slider.step, 1000.0);
        let ticks: Vec<f64> = slider.marks.iter().map(|(at, _)| *at).collect();
        assert_eq!(ticks, [0.0, 2000.0, 4000.0, 6000.0, 8000.0, 10000.0]);
        assert_eq!(slider.marks[1].1, "2000");
    }

    #[test]
    fn fractional_marks_are_exact_and_reach_the_ceiling() {
        let slider = RangeSlider::new(ControlId::PayloadSlider, 1.0, 0.1, 0.1);
        let labels: Vec<&str> = slider.marks.iter().map(|(_, l)| l.as_str()).collect();
        assert_eq!(
            labels,
            ["0.0", "0.1", "0.2", "0.3", "0.4", "0.5", "0.6", "0.7", "0.8", "0.9", "1.0"]
        );
        assert_eq!(slider.marks.last().map(|(at, _)| *at), Some(1.0));

        let quarters = RangeSlider::new(ControlId::PayloadSlider, 1.0, 0.25, 0.25);
        assert_eq!(quarters.marks[1].1, "0.25");
        assert_eq!(quarters.marks.len(), 5);
    }

    #[test]
    fn marks_sit_proportionally_along_the_rail() {
        let slider = layout().slider;
        let fractions: Vec<f64> = slider.marks.iter().map(|(at, _)| slider.fraction(*at)).collect();
        assert_eq!(fractions, [0.0, 0.2, 0.4, 0.6, 0.8, 1.0]);
        assert_eq!(slider.fraction(20000.0), 1.0);
    }

    #[test]
    fn slider_rejects_inverted_and_out_of_bounds_ranges() {
        let slider = layout().slider;
        assert_eq!(
            slider.validate(5000.0, 1000.0),
            Err(ControlError::Inverted { min: 5000.0, max: 1000.0 })
        );
        assert!(matches!(
            slider.validate(0.0, 12000.0),
            Err(ControlError::OutOfBounds { .. })
        ));
        assert_eq!(slider.validate(f64::NAN, 1.0), Err(ControlError::NotANumber));
        assert_eq!(slider.validate(2000.0, 2000.0), Ok(PayloadRange::new(2000.0, 2000.0)));
    }

    #[test]
    fn settled_handles_never_cross() {
        let slider = layout().slider;
        assert_eq!(slider.settle(7000.0, 4000.0, true), PayloadRange::new(7000.0, 7000.0));
        assert_eq!(slider.settle(7000.0, 4000.0, false), PayloadRange::new(4000.0, 4000.0));
        assert_eq!(slider.settle(-5.0, 20000.0, true), PayloadRange::new(0.0, 10000.0));
    }
}
