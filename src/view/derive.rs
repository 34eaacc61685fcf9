//! The two chart derivations. Each is a pure function of the dataset and the
//! current control values.

use std::collections::BTreeMap;

use crate::data::filter::{
    select_outcome_distribution, select_payload_subset, PayloadRange, SiteSelector,
};
use crate::data::loader::{COL_BOOSTER_VERSION, COL_PAYLOAD_MASS};
use crate::data::model::Dataset;

use super::chart::{ChartSpec, PieSlice, ScatterChart, ScatterPoint, ScatterSeries};

pub const OUTCOME_AXIS_LABEL: &str = "Launch Outcome";

/// Current value of every control on the page.
#[derive(Debug, Clone, PartialEq)]
pub struct Controls {
    pub site: SiteSelector,
    pub payload: PayloadRange,
}

/// Pie of successes per site, or success vs. failure at one site.
pub fn outcome_distribution_chart(dataset: &Dataset, controls: &Controls) -> ChartSpec {
    let dist = select_outcome_distribution(dataset, &controls.site);
    let title = match &controls.site {
        SiteSelector::All => "Total Successful Launches for All Sites".to_string(),
        SiteSelector::Site(site) => format!("Success vs Failure for {site}"),
    };
    let slices = dist
        .labels
        .into_iter()
        .zip(dist.values)
        .map(|(label, value)| PieSlice {
            label,
            value: value as f64,
        })
        .collect();
    ChartSpec::pie(title, slices)
}

/// Payload mass vs. outcome class, one series per booster category.
pub fn payload_scatter_chart(dataset: &Dataset, controls: &Controls) -> ChartSpec {
    let subset = select_payload_subset(dataset, &controls.site, controls.payload);

    // Series appear in the order their category is first seen in the subset.
    let mut series: Vec<ScatterSeries> = Vec::new();
    for record in subset {
        let point = ScatterPoint {
            x: record.payload_mass_kg,
            y: record.outcome.as_f64(),
            hover: BTreeMap::from([(
                COL_BOOSTER_VERSION.to_string(),
                record.booster_version.clone(),
            )]),
        };
        match series
            .iter_mut()
            .find(|s| s.name == record.booster_version_category)
        {
            Some(s) => s.points.push(point),
            None => series.push(ScatterSeries {
                name: record.booster_version_category.clone(),
                points: vec![point],
            }),
        }
    }

    ChartSpec::scatter(
        format!("Payload vs. Launch Success for {}", controls.site),
        ScatterChart {
            x_axis: COL_PAYLOAD_MASS.to_string(),
            y_axis: OUTCOME_AXIS_LABEL.to_string(),
            series,
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::tests::record;
    use crate::data::model::OutcomeClass::{Failure, Success};
    use crate::view::chart::ChartBody;

    fn dataset() -> Dataset {
        Dataset::from_records(vec![
            record("A", 500.0, Success, "v1.0"),
            record("A", 9999.0, Failure, "FT"),
            record("B", 15000.0, Success, "FT"),
            record("B", 3000.0, Failure, "v1.0"),
        ])
    }

    fn controls(site: &str, min: f64, max: f64) -> Controls {
        Controls {
            site: SiteSelector::parse(site),
            payload: PayloadRange::new(min, max),
        }
    }

    #[test]
    fn pie_title_depends_on_selector() {
        let ds = dataset();
        let all = outcome_distribution_chart(&ds, &controls("ALL", 0.0, 10000.0));
        assert_eq!(all.title, "Total Successful Launches for All Sites");
        let a = outcome_distribution_chart(&ds, &controls("A", 0.0, 10000.0));
        assert_eq!(a.title, "Success vs Failure for A");

        let ChartBody::Pie(pie) = a.body else {
            panic!("expected a pie chart");
        };
        let labels: Vec<&str> = pie.slices.iter().map(|s| s.label.as_str()).collect();
        assert_eq!(labels, ["success", "failure"]);
        assert_eq!(pie.total(), 2.0);
    }

    #[test]
    fn scatter_groups_points_by_booster_category() {
        let spec = payload_scatter_chart(&dataset(), &controls("ALL", 0.0, 10000.0));
        assert_eq!(spec.title, "Payload vs. Launch Success for ALL");

        let ChartBody::Scatter(scatter) = spec.body else {
            panic!("expected a scatter chart");
        };
        assert_eq!(scatter.x_axis, "Payload Mass (kg)");
        assert_eq!(scatter.y_axis, "Launch Outcome");
        let names: Vec<&str> = scatter.series.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["v1.0", "FT"]);
        assert_eq!(scatter.point_count(), 3);

        let ft = &scatter.series[1].points[0];
        assert_eq!((ft.x, ft.y), (9999.0, 0.0));
        assert_eq!(ft.hover["Booster Version"], "FT B9999");
    }

    #[test]
    fn scatter_for_unmatched_range_is_an_empty_chart() {
        let spec = payload_scatter_chart(&dataset(), &controls("B", 0.0, 1000.0));
        assert_eq!(spec.title, "Payload vs. Launch Success for B");
        assert!(spec.is_empty());
    }

    #[test]
    fn derivations_are_idempotent() {
        let ds = dataset();
        for c in [controls("ALL", 0.0, 10000.0), controls("B", 2000.0, 16000.0)] {
            assert_eq!(outcome_distribution_chart(&ds, &c), outcome_distribution_chart(&ds, &c));
            assert_eq!(payload_scatter_chart(&ds, &c), payload_scatter_chart(&ds, &c));
        }
    }
}
