use std::collections::BTreeMap;

use serde::Serialize;

// ---------------------------------------------------------------------------
// ChartSpec – renderer-agnostic figure description
// ---------------------------------------------------------------------------

/// A declarative chart: title plus a typed body. Built by a derivation,
/// handed to the renderer, and replaced wholesale on the next recompute.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSpec {
    pub title: String,
    #[serde(flatten)]
    pub body: ChartBody,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChartBody {
    Pie(PieChart),
    Scatter(ScatterChart),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PieChart {
    pub slices: Vec<PieSlice>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PieSlice {
    pub label: String,
    pub value: f64,
}

impl PieChart {
    pub fn total(&self) -> f64 {
        self.slices.iter().map(|s| s.value).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterChart {
    pub x_axis: String,
    pub y_axis: String,
    /// One series per colour group, in legend order.
    pub series: Vec<ScatterSeries>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterSeries {
    pub name: String,
    pub points: Vec<ScatterPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterPoint {
    pub x: f64,
    pub y: f64,
    /// Extra fields shown on hover: column name → value.
    pub hover: BTreeMap<String, String>,
}

impl ScatterChart {
    pub fn point_count(&self) -> usize {
        self.series.iter().map(|s| s.points.len()).sum()
    }
}

impl ChartSpec {
    pub fn pie(title: impl Into<String>, slices: Vec<PieSlice>) -> Self {
        ChartSpec {
            title: title.into(),
            body: ChartBody::Pie(PieChart { slices }),
        }
    }

    pub fn scatter(title: impl Into<String>, chart: ScatterChart) -> Self {
        ChartSpec {
            title: title.into(),
            body: ChartBody::Scatter(chart),
        }
    }

    /// Whether there is nothing to draw (no slices with weight, no points).
    pub fn is_empty(&self) -> bool {
        match &self.body {
            ChartBody::Pie(pie) => pie.total() <= 0.0,
            ChartBody::Scatter(scatter) => scatter.point_count() == 0,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
