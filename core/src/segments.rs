//! Segment derivation — categorical bands from continuous model scores.
//!
//! Two columns are derived once per dataset load:
//!   1. repurchase_segment: fixed edges over the 90-day purchase probability
//!   2. value_potential:    quartile edges over the 90-day CLV
//!
//! RULE: derivation never fails. Any problem degrades the affected column
//! to a sentinel label and is recorded on the dataset's SegmentReport.

use crate::{
    dataset::{AccountRecord, Dataset},
    types::SourceColumn,
};
use serde::Serialize;
use thiserror::Error;

pub const NO_DATA: &str = "Sin datos";
pub const SINGLE_VALUE: &str = "Valor Único";
pub const UNDETERMINED: &str = "Indeterminado";

/// Bin edges for purchase probability. The outer edges sit just past
/// 0 and 1 so both endpoints land inside the first and last band.
pub const REPURCHASE_EDGES: [f64; 5] = [-0.001, 0.25, 0.50, 0.75, 1.001];

pub const VALUE_QUANTILES: [f64; 5] = [0.0, 0.25, 0.50, 0.75, 1.0];

/// Value labels, lowest first. Fewer edges use a prefix of this list.
pub const VALUE_LABELS: [&str; 4] = ["Valor Bronce", "Valor Plata", "Valor Oro", "Valor Diamante"];

// ── Repurchase bands ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RepurchaseBand {
    Low,
    Medium,
    High,
    VeryHigh,
}

impl RepurchaseBand {
    pub const ALL: [RepurchaseBand; 4] = [Self::Low, Self::Medium, Self::High, Self::VeryHigh];

    pub fn label(self) -> &'static str {
        match self {
            Self::Low      => "Baja Propensión",
            Self::Medium   => "Propensión Media",
            Self::High     => "Alta Propensión",
            Self::VeryHigh => "Muy Alta Propensión",
        }
    }

    pub fn rank(self) -> usize {
        self as usize
    }

    /// Right-closed fixed-edge binning. Values outside the extended
    /// range (or NaN) fall in no band.
    pub fn classify(probability: f64) -> Option<Self> {
        bin_index(probability, &REPURCHASE_EDGES, false).map(|i| Self::ALL[i])
    }
}

// ── Report ───────────────────────────────────────────────────────────────────

/// Why a derived column was degraded to a sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentFallback {
    /// Source column absent or entirely null.
    MissingColumn,
    /// Fewer than two distinct quantile edges.
    DegenerateDistribution,
    /// Edges could not be computed or used.
    ComputationFailure,
}

impl SegmentFallback {
    pub fn label(self) -> &'static str {
        match self {
            Self::MissingColumn          => NO_DATA,
            Self::DegenerateDistribution => SINGLE_VALUE,
            Self::ComputationFailure     => UNDETERMINED,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SegmentReport {
    pub repurchase_fallback: Option<SegmentFallback>,
    pub value_fallback:      Option<SegmentFallback>,
    /// Distinct CLV quartile edges actually used for binning.
    pub value_edges:         Vec<f64>,
}

#[derive(Error, Debug, PartialEq)]
pub enum BinningError {
    #[error("no values to bin")]
    Empty,

    #[error("non-finite value {0} in column")]
    NonFinite(f64),

    #[error("bin edges must increase monotonically")]
    UnsortedEdges,
}

// ── Derivation ───────────────────────────────────────────────────────────────

/// Add both derived columns to a raw dataset.
pub fn derive(mut raw: Dataset) -> Dataset {
    let report = derive_segments(&mut raw);
    raw.set_segment_report(report);
    raw
}

fn derive_segments(dataset: &mut Dataset) -> SegmentReport {
    let repurchase_fallback = derive_repurchase(dataset);
    let (value_fallback, value_edges) = derive_value_potential(dataset);

    log::debug!(
        "Derived segments for {} rows (repurchase: {:?}, value: {:?}, edges: {:?})",
        dataset.len(),
        repurchase_fallback,
        value_fallback,
        value_edges,
    );

    SegmentReport { repurchase_fallback, value_fallback, value_edges }
}

fn derive_repurchase(dataset: &mut Dataset) -> Option<SegmentFallback> {
    let usable = dataset.has_column(SourceColumn::PurchaseProbability90d)
        && dataset.rows().iter().any(|r| r.purchase_probability_90d.is_some());

    if !usable {
        log::warn!("Purchase probability unavailable; repurchase segment set to '{NO_DATA}'");
        fill(dataset, |row, label| row.repurchase_segment = label, NO_DATA);
        return Some(SegmentFallback::MissingColumn);
    }

    for row in dataset.rows_mut() {
        row.repurchase_segment = row
            .purchase_probability_90d
            .and_then(RepurchaseBand::classify)
            .map(|band| band.label().to_string());
    }
    None
}

fn derive_value_potential(dataset: &mut Dataset) -> (Option<SegmentFallback>, Vec<f64>) {
    let values: Vec<f64> = if dataset.has_column(SourceColumn::Clv90d) {
        dataset.rows().iter().filter_map(|r| r.clv_90d).collect()
    } else {
        Vec::new()
    };

    if values.is_empty() {
        log::warn!("CLV unavailable; value potential set to '{NO_DATA}'");
        fill(dataset, |row, label| row.value_potential = label, NO_DATA);
        return (Some(SegmentFallback::MissingColumn), Vec::new());
    }

    let edges = match quantile_edges(&values) {
        Ok(edges) => edges,
        Err(e) => {
            log::warn!("CLV binning failed ({e}); value potential set to '{UNDETERMINED}'");
            fill(dataset, |row, label| row.value_potential = label, UNDETERMINED);
            return (Some(SegmentFallback::ComputationFailure), Vec::new());
        }
    };

    if edges.len() < 2 {
        log::info!("CLV has a single distinct value; value potential set to '{SINGLE_VALUE}'");
        fill(dataset, |row, label| row.value_potential = label, SINGLE_VALUE);
        return (Some(SegmentFallback::DegenerateDistribution), edges);
    }

    let labels = &VALUE_LABELS[..edges.len() - 1];
    for row in dataset.rows_mut() {
        row.value_potential = row
            .clv_90d
            .and_then(|v| bin_index(v, &edges, true))
            .map(|i| labels[i].to_string());
    }
    (None, edges)
}

fn fill(
    dataset: &mut Dataset,
    assign: impl Fn(&mut AccountRecord, Option<String>),
    label: &str,
) {
    for row in dataset.rows_mut() {
        assign(row, Some(label.to_string()));
    }
}

// ── Binning primitives ───────────────────────────────────────────────────────

/// Quantile of sorted data with linear interpolation between order
/// statistics.
pub fn quantile(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let position = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = position.floor() as usize;
    let hi = position.ceil() as usize;
    Some(lerp(sorted[lo], sorted[hi], position - lo as f64))
}

fn lerp(a: f64, b: f64, t: f64) -> f64 {
    let diff = b - a;
    if t >= 0.5 {
        b - diff * (1.0 - t)
    } else {
        a + diff * t
    }
}

/// Distinct 0/25/50/75/100th percentile edges of the values.
/// May return a single edge when the distribution is degenerate.
pub fn quantile_edges(values: &[f64]) -> Result<Vec<f64>, BinningError> {
    if values.is_empty() {
        return Err(BinningError::Empty);
    }
    if let Some(&bad) = values.iter().find(|v| !v.is_finite()) {
        return Err(BinningError::NonFinite(bad));
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let mut edges: Vec<f64> = VALUE_QUANTILES
        .iter()
        .filter_map(|&q| quantile(&sorted, q))
        .collect();
    edges.dedup();

    if edges.windows(2).any(|w| w[0] >= w[1]) {
        return Err(BinningError::UnsortedEdges);
    }
    Ok(edges)
}

/// Index of the right-closed bin `(edges[i], edges[i + 1]]` holding `value`.
/// With `include_lowest` the first bin is closed on the left as well.
pub fn bin_index(value: f64, edges: &[f64], include_lowest: bool) -> Option<usize> {
    if edges.len() < 2 || value.is_nan() {
        return None;
    }
    if include_lowest && value == edges[0] {
        return Some(0);
    }
    edges
        .windows(2)
        .position(|w| value > w[0] && value <= w[1])
}
