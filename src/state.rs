use std::collections::BTreeMap;
use std::sync::Arc;

use crate::color::ColorMap;
use crate::config::DashConfig;
use crate::data::filter::SiteSelector;
use crate::data::model::Dataset;
use crate::view::chart::ChartSpec;
use crate::view::derive::{outcome_distribution_chart, payload_scatter_chart, Controls};
use crate::view::layout::{ControlError, ControlId, GraphId, Layout};
use crate::view::registry::{Registry, RegistryError};

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full dashboard state, independent of rendering.
pub struct AppState {
    /// Launch table, loaded once at startup and never mutated.
    dataset: Arc<Dataset>,

    /// Page description: heading, controls, chart placeholders.
    pub layout: Layout,

    /// Current control values.
    controls: Controls,

    /// Derivations subscribed to the controls.
    registry: Registry,

    /// Latest figure per chart region.
    figures: BTreeMap<GraphId, ChartSpec>,

    /// Stable colour per booster category.
    pub category_colors: ColorMap,

    /// Search text typed into the site dropdown.
    pub site_query: String,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    /// Build the layout, subscribe both derivations and render the initial
    /// figures from the default control values.
    pub fn new(dataset: Arc<Dataset>, config: &DashConfig) -> Result<Self, RegistryError> {
        let layout = Layout::launch_dashboard(&dataset, config);
        let controls = Controls {
            site: layout.dropdown.default.clone(),
            payload: layout.slider.default,
        };

        let mut registry = Registry::new();
        registry
            .register(
                GraphId::SuccessPieChart,
                [layout.dropdown.id],
                outcome_distribution_chart,
            )?
            .register(
                GraphId::SuccessPayloadScatterChart,
                [layout.dropdown.id, layout.slider.id],
                payload_scatter_chart,
            )?;

        let figures = registry.evaluate_all(&dataset, &controls).into_iter().collect();
        let category_colors = ColorMap::new(dataset.booster_categories());

        Ok(Self {
            dataset,
            layout,
            controls,
            registry,
            figures,
            category_colors,
            site_query: String::new(),
            status_message: None,
        })
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn controls(&self) -> &Controls {
        &self.controls
    }

    pub fn figure(&self, graph: GraphId) -> Option<&ChartSpec> {
        self.figures.get(&graph)
    }

    /// Select a site. Unknown sites are accepted and simply match nothing.
    /// Returns whether anything was recomputed.
    pub fn set_site(&mut self, site: SiteSelector) -> bool {
        if site == self.controls.site {
            return false;
        }
        if let SiteSelector::Site(name) = &site {
            if !self.dataset.has_site(name) {
                log::warn!("Site {name:?} is not in the dataset; charts will be empty");
            }
        }
        log::info!("Site changed to {site}");
        self.controls.site = site;
        self.status_message = None;
        self.control_changed(self.layout.dropdown.id);
        true
    }

    /// Set the payload window. Rejected values leave the controls and
    /// figures untouched and are reported in the status line.
    pub fn set_payload_range(&mut self, min: f64, max: f64) -> Result<bool, ControlError> {
        let range = match self.layout.slider.validate(min, max) {
            Ok(range) => range,
            Err(e) => {
                log::error!("Rejected payload range: {e}");
                self.status_message = Some(format!("Error: {e}"));
                return Err(e);
            }
        };
        if range == self.controls.payload {
            return Ok(false);
        }
        log::info!("Payload range changed to {}..={} kg", range.min, range.max);
        self.controls.payload = range;
        self.status_message = None;
        self.control_changed(self.layout.slider.id);
        Ok(true)
    }

    /// Recompute the figures that depend on `control`.
    fn control_changed(&mut self, control: ControlId) {
        let updated = self.registry.dispatch(control, &self.dataset, &self.controls);
        for (graph, spec) in updated {
            self.figures.insert(graph, spec);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filter::PayloadRange;
    use crate::data::model::tests::record;
    use crate::data::model::OutcomeClass::{Failure, Success};

    fn state() -> AppState {
        let ds = Dataset::from_records(vec![
            record("A", 500.0, Success, "FT"),
            record("A", 2500.0, Success, "FT"),
            record("A", 4500.0, Failure, "v1.1"),
            record("B", 1500.0, Failure, "v1.1"),
            record("B", 3500.0, Failure, "B4"),
            record("B", 5500.0, Failure, "FT"),
        ]);
        AppState::new(Arc::new(ds), &DashConfig::default()).unwrap()
    }

    fn title(state: &AppState, graph: GraphId) -> &str {
        &state.figure(graph).unwrap().title
    }

    #[test]
    fn initial_figures_use_default_controls() {
        let state = state();
        assert_eq!(state.controls().site, SiteSelector::All);
        assert_eq!(state.controls().payload, PayloadRange::new(0.0, 10000.0));
        assert_eq!(
            title(&state, GraphId::SuccessPieChart),
            "Total Successful Launches for All Sites"
        );
        assert_eq!(
            title(&state, GraphId::SuccessPayloadScatterChart),
            "Payload vs. Launch Success for ALL"
        );
    }

    #[test]
    fn site_change_updates_both_charts() {
        let mut state = state();
        assert!(state.set_site(SiteSelector::parse("B")));
        assert_eq!(title(&state, GraphId::SuccessPieChart), "Success vs Failure for B");
        assert_eq!(
            title(&state, GraphId::SuccessPayloadScatterChart),
            "Payload vs. Launch Success for B"
        );
        assert!(!state.set_site(SiteSelector::parse("B")));
    }

    #[test]
    fn payload_change_leaves_pie_untouched() {
        let mut state = state();
        let pie_before = state.figure(GraphId::SuccessPieChart).cloned();
        let scatter_before = state.figure(GraphId::SuccessPayloadScatterChart).cloned();

        assert_eq!(state.set_payload_range(0.0, 2000.0), Ok(true));
        assert_eq!(state.figure(GraphId::SuccessPieChart).cloned(), pie_before);
        assert_ne!(state.figure(GraphId::SuccessPayloadScatterChart).cloned(), scatter_before);
        assert_eq!(state.set_payload_range(0.0, 2000.0), Ok(false));
    }

    #[test]
    fn inverted_range_is_reported_and_ignored() {
        let mut state = state();
        let err = state.set_payload_range(6000.0, 1000.0).unwrap_err();
        assert_eq!(err, ControlError::Inverted { min: 6000.0, max: 1000.0 });
        assert!(state.status_message.is_some());
        assert_eq!(state.controls().payload, PayloadRange::new(0.0, 10000.0));
    }

    #[test]
    fn unknown_site_renders_empty_charts() {
        let mut state = state();
        assert!(state.set_site(SiteSelector::parse("UNKNOWN_SITE")));
        assert!(state.figure(GraphId::SuccessPieChart).unwrap().is_empty());
        assert!(state.figure(GraphId::SuccessPayloadScatterChart).unwrap().is_empty());
    }
}
