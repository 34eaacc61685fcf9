use std::collections::BTreeSet;
use std::fmt;

use serde::Serialize;

// ---------------------------------------------------------------------------
// OutcomeClass – the binary `class` column
// ---------------------------------------------------------------------------

/// Launch outcome as stored in the `class` column (1 = success, 0 = failure).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum OutcomeClass {
    Failure = 0,
    Success = 1,
}

impl OutcomeClass {
    /// Interpret a numeric cell. Only exact 0 and 1 are accepted.
    pub fn from_value(value: f64) -> Option<Self> {
        if value == 0.0 {
            Some(OutcomeClass::Failure)
        } else if value == 1.0 {
            Some(OutcomeClass::Success)
        } else {
            None
        }
    }

    pub fn as_u8(self) -> u8 {
        self as u8
    }

    pub fn as_f64(self) -> f64 {
        f64::from(self.as_u8())
    }

    pub fn is_success(self) -> bool {
        self == OutcomeClass::Success
    }

    /// Category label used by the per-site success/failure split.
    pub fn label(self) -> &'static str {
        match self {
            OutcomeClass::Success => "success",
            OutcomeClass::Failure => "failure",
        }
    }
}

impl fmt::Display for OutcomeClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_u8())
    }
}

// ---------------------------------------------------------------------------
// LaunchRecord – one row of the source table
// ---------------------------------------------------------------------------

/// A single launch event.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LaunchRecord {
    pub launch_site: String,
    pub payload_mass_kg: f64,
    pub outcome: OutcomeClass,
    pub booster_version: String,
    pub booster_version_category: String,
}

// ---------------------------------------------------------------------------
// Dataset – the complete loaded table
// ---------------------------------------------------------------------------

/// The full launch table with pre-computed category indices.
///
/// Built once at startup and shared read-only (behind an `Arc`) for the rest
/// of the process.
#[derive(Debug, Clone)]
pub struct Dataset {
    records: Vec<LaunchRecord>,
    /// Distinct launch sites in order of first appearance.
    sites: Vec<String>,
    /// Distinct booster categories in order of first appearance.
    categories: Vec<String>,
}

impl Dataset {
    /// Build the category indices from the loaded records.
    pub fn from_records(records: Vec<LaunchRecord>) -> Self {
        let sites = first_appearance(records.iter().map(|r| r.launch_site.as_str()));
        let categories =
            first_appearance(records.iter().map(|r| r.booster_version_category.as_str()));
        Dataset {
            records,
            sites,
            categories,
        }
    }

    pub fn records(&self) -> &[LaunchRecord] {
        &self.records
    }

    /// Distinct `launch_site` values, ordered by first appearance.
    pub fn distinct_sites(&self) -> &[String] {
        &self.sites
    }

    /// Distinct `booster_version_category` values, ordered by first appearance.
    pub fn booster_categories(&self) -> &[String] {
        &self.categories
    }

    pub fn has_site(&self, site: &str) -> bool {
        self.sites.iter().any(|s| s == site)
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

fn first_appearance<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen: BTreeSet<&str> = BTreeSet::new();
    let mut ordered = Vec::new();
    for value in values {
        if seen.insert(value) {
            ordered.push(value.to_string());
        }
    }
    ordered
}
