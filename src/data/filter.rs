use std::fmt;

use serde::Serialize;

use super::model::{Dataset, LaunchRecord, OutcomeClass};

// ---------------------------------------------------------------------------
// Filter inputs
// ---------------------------------------------------------------------------

/// Which launch site the dashboard is showing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize)]
pub enum SiteSelector {
    /// No site restriction.
    #[default]
    All,
    Site(String),
}

impl SiteSelector {
    /// Control value that stands for "every site".
    pub const ALL: &'static str = "ALL";

    /// Interpret a raw dropdown value. `"ALL"` is the sentinel; anything else
    /// names a site, whether or not the dataset contains it.
    pub fn parse(value: &str) -> Self {
        if value == Self::ALL {
            SiteSelector::All
        } else {
            SiteSelector::Site(value.to_string())
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            SiteSelector::All => Self::ALL,
            SiteSelector::Site(site) => site,
        }
    }

    /// Whether a record at `site` passes this selector.
    pub fn matches(&self, site: &str) -> bool {
        match self {
            SiteSelector::All => true,
            SiteSelector::Site(selected) => selected == site,
        }
    }
}

impl fmt::Display for SiteSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Inclusive payload mass window in kilograms.
///
/// `min <= max` is enforced by the range-slider control, not here: an
/// inverted range simply matches nothing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PayloadRange {
    pub min: f64,
    pub max: f64,
}

impl PayloadRange {
    pub fn new(min: f64, max: f64) -> Self {
        PayloadRange { min, max }
    }

    pub fn contains(&self, payload_mass_kg: f64) -> bool {
        self.min <= payload_mass_kg && payload_mass_kg <= self.max
    }
}

// ---------------------------------------------------------------------------
// Outcome distribution (pie chart input)
// ---------------------------------------------------------------------------

/// Parallel label / value vectors for a categorical chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutcomeDistribution {
    pub labels: Vec<String>,
    pub values: Vec<u64>,
}

/// Success counts per site for [`SiteSelector::All`], or the success vs.
/// failure split within one site otherwise.
///
/// * `All` → one entry per distinct site (first-appearance order), valued by
///   the sum of the outcome class, i.e. the number of successes. Sites with
///   no success keep a zero entry.
/// * `Site(s)` → exactly `["success", "failure"]` with their counts at `s`.
///   An unknown site yields `[0, 0]`.
pub fn select_outcome_distribution(
    dataset: &Dataset,
    selector: &SiteSelector,
) -> OutcomeDistribution {
    match selector {
        SiteSelector::All => {
            let values = dataset
                .distinct_sites()
                .iter()
                .map(|site| {
                    dataset
                        .records()
                        .iter()
                        .filter(|r| &r.launch_site == site)
                        .map(|r| u64::from(r.outcome.as_u8()))
                        .sum()
                })
                .collect();
            OutcomeDistribution {
                labels: dataset.distinct_sites().to_vec(),
                values,
            }
        }
        SiteSelector::Site(site) => {
            let (successes, failures) = dataset
                .records()
                .iter()
                .filter(|r| &r.launch_site == site)
                .fold((0u64, 0u64), |(ok, failed), r| {
                    if r.outcome.is_success() {
                        (ok + 1, failed)
                    } else {
                        (ok, failed + 1)
                    }
                });
            OutcomeDistribution {
                labels: vec![
                    OutcomeClass::Success.label().to_string(),
                    OutcomeClass::Failure.label().to_string(),
                ],
                values: vec![successes, failures],
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Payload subset (scatter chart input)
// ---------------------------------------------------------------------------

/// Records whose payload mass lies in `range` (inclusive) and whose site
/// passes `selector`, in dataset order.
pub fn select_payload_subset<'a>(
    dataset: &'a Dataset,
    selector: &SiteSelector,
    range: PayloadRange,
) -> Vec<&'a LaunchRecord> {
    dataset
        .records()
        .iter()
        .filter(|r| range.contains(r.payload_mass_kg) && selector.matches(&r.launch_site))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::tests::record;
    use crate::data::model::OutcomeClass::{Failure, Success};

    /// Sites A (2 successes, 1 failure) and B (3 failures).
    fn two_sites() -> Dataset {
        Dataset::from_records(vec![
            record("A", 500.0, Success, "FT"),
            record("B", 1500.0, Failure, "v1.1"),
            record("A", 2500.0, Failure, "FT"),
            record("B", 3500.0, Failure, "B4"),
            record("A", 4500.0, Success, "B5"),
            record("B", 5500.0, Failure, "FT"),
        ])
    }

    #[test]
    fn all_sites_sums_successes_per_site() {
        let dist = select_outcome_distribution(&two_sites(), &SiteSelector::All);
        assert_eq!(dist.labels, ["A", "B"]);
        assert_eq!(dist.values, [2, 0]);
    }

    #[test]
    fn single_site_splits_success_and_failure() {
        let ds = two_sites();
        let b = select_outcome_distribution(&ds, &SiteSelector::parse("B"));
        assert_eq!(b.labels, ["success", "failure"]);
        assert_eq!(b.values, [0, 3]);

        let a = select_outcome_distribution(&ds, &SiteSelector::parse("A"));
        assert_eq!(a.values, [2, 1]);
    }

    #[test]
    fn distribution_labels_follow_selector_kind() {
        let ds = two_sites();
        for site in ds.distinct_sites() {
            let dist = select_outcome_distribution(&ds, &SiteSelector::Site(site.clone()));
            assert_eq!(dist.labels, ["success", "failure"]);
        }
        let all = select_outcome_distribution(&ds, &SiteSelector::All);
        assert_eq!(all.labels, ds.distinct_sites());
    }

    #[test]
    fn unknown_site_distribution_is_all_zero() {
        let dist = select_outcome_distribution(&two_sites(), &SiteSelector::parse("UNKNOWN_SITE"));
        assert_eq!(dist.labels, ["success", "failure"]);
        assert_eq!(dist.values, [0, 0]);
    }

    #[test]
    fn payload_range_is_inclusive_and_ignores_out_of_range() {
        let ds = Dataset::from_records(vec![
            record("A", 500.0, Success, "FT"),
            record("A", 9999.0, Failure, "FT"),
            record("A", 15000.0, Success, "FT"),
        ]);
        let subset = select_payload_subset(&ds, &SiteSelector::All, PayloadRange::new(0.0, 10000.0));
        let masses: Vec<f64> = subset.iter().map(|r| r.payload_mass_kg).collect();
        assert_eq!(masses, [500.0, 9999.0]);

        let edge = select_payload_subset(&ds, &SiteSelector::All, PayloadRange::new(500.0, 500.0));
        assert_eq!(edge.len(), 1);
    }

    #[test]
    fn zero_width_range_without_zero_payloads_is_empty() {
        let ds = two_sites();
        let subset = select_payload_subset(&ds, &SiteSelector::All, PayloadRange::new(0.0, 0.0));
        assert!(subset.is_empty());
    }

    #[test]
    fn payload_subset_restricts_to_selected_site() {
        let ds = two_sites();
        let subset =
            select_payload_subset(&ds, &SiteSelector::parse("A"), PayloadRange::new(0.0, 10000.0));
        assert_eq!(subset.len(), 3);
        assert!(subset.iter().all(|r| r.launch_site == "A"));
    }

    #[test]
    fn unknown_site_payload_subset_is_empty() {
        let ds = two_sites();
        let subset = select_payload_subset(
            &ds,
            &SiteSelector::parse("UNKNOWN_SITE"),
            PayloadRange::new(0.0, 10000.0),
        );
        assert!(subset.is_empty());
    }

    #[test]
    fn widening_the_range_never_shrinks_the_subset() {
        let ds = two_sites();
        let ranges = [(2000.0, 3000.0), (1000.0, 4000.0), (0.0, 5000.0), (0.0, 10000.0)];
        for selector in [SiteSelector::All, SiteSelector::parse("A"), SiteSelector::parse("B")] {
            let mut previous = 0;
            for (lo, hi) in ranges {
                let n = select_payload_subset(&ds, &selector, PayloadRange::new(lo, hi)).len();
                assert!(n >= previous, "{selector}: [{lo}, {hi}] gave {n} < {previous}");
                previous = n;
            }
        }
    }

    #[test]
    fn selector_parses_sentinel() {
        assert_eq!(SiteSelector::parse("ALL"), SiteSelector::All);
        assert_eq!(SiteSelector::parse("KSC LC-39A").as_str(), "KSC LC-39A");
        assert_eq!(SiteSelector::All.to_string(), "ALL");
    }
}
