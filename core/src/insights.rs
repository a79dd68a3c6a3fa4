//! Aggregates over a filtered view, consumed by the presentation layer.
//!
//! Means skip nulls and are `None` when nothing contributes; sums of
//! nothing are zero.

use crate::{
    dataset::AccountRecord,
    filter::FilteredView,
    types::{AccountId, Category, Dimension},
};
use serde::Serialize;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryMetrics {
    pub accounts:                 usize,
    pub avg_churn_probability:    Option<f64>,
    pub total_clv_90d:            f64,
    pub avg_purchase_probability: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Insights {
    /// Value potential in the top tiers (Diamante or Oro).
    pub vip_accounts:   usize,
    /// High or very high repurchase propensity.
    pub upcoming_sales: usize,
    /// Risk category containing "Alta".
    pub critical_risk:  usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryCount {
    pub category: Category,
    pub accounts: usize,
}

/// Projection used for the account explorer table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableRow {
    pub account_id:         AccountId,
    pub business_type:      Option<String>,
    pub rfm_segment:        Option<String>,
    pub value_potential:    Option<String>,
    pub repurchase_segment: Option<String>,
    pub clv_90d:            Option<f64>,
}

impl From<&AccountRecord> for TableRow {
    fn from(r: &AccountRecord) -> Self {
        Self {
            account_id:         r.account_id.clone(),
            business_type:      r.business_type.clone(),
            rfm_segment:        r.rfm_segment.clone(),
            value_potential:    r.value_potential.clone(),
            repurchase_segment: r.repurchase_segment.clone(),
            clv_90d:            r.clv_90d,
        }
    }
}

pub fn summarize(view: &FilteredView<'_>) -> SummaryMetrics {
    SummaryMetrics {
        accounts:                 view.len(),
        avg_churn_probability:    mean(view.rows().filter_map(|r| r.churn_probability)),
        total_clv_90d:            view.rows().filter_map(|r| r.clv_90d).fold(0.0, |acc, v| acc + v),
        avg_purchase_probability: mean(view.rows().filter_map(|r| r.purchase_probability_90d)),
    }
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, n) = values.fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    (n > 0).then(|| sum / n as f64)
}

fn contains_any(value: Option<&str>, needles: &[&str]) -> bool {
    value.is_some_and(|v| needles.iter().any(|n| v.contains(n)))
}

pub fn insights(view: &FilteredView<'_>) -> Insights {
    let count = |dimension: Dimension, needles: &[&str]| {
        view.rows()
            .filter(|r| contains_any(r.dimension_value(dimension), needles))
            .count()
    };
    Insights {
        vip_accounts:   count(Dimension::ValuePotential, &["Diamante", "Oro"]),
        upcoming_sales: count(Dimension::RepurchaseSegment, &["Muy Alta", "Alta"]),
        critical_risk:  count(Dimension::ChurnRiskCategory, &["Alta"]),
    }
}

/// Accounts per category, largest first; ties break on the label.
pub fn distribution(view: &FilteredView<'_>, dimension: Dimension) -> Vec<CategoryCount> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for value in view.rows().filter_map(|r| r.dimension_value(dimension)) {
        *counts.entry(value).or_default() += 1;
    }
    let mut out: Vec<CategoryCount> = counts
        .into_iter()
        .map(|(category, accounts)| CategoryCount { category: category.to_string(), accounts })
        .collect();
    out.sort_by(|a, b| b.accounts.cmp(&a.accounts).then_with(|| a.category.cmp(&b.category)));
    out
}

/// Case-insensitive substring search over account ids.
/// A blank query matches everything.
pub fn search_accounts<'a>(view: &FilteredView<'a>, query: &str) -> FilteredView<'a> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return view.clone();
    }
    view.retain(|r| r.account_id.to_lowercase().contains(&needle))
}

/// Rows usable for the propensity-vs-amount plot, in dataset order.
pub fn predictive_sample<'a>(view: &FilteredView<'a>, limit: usize) -> Vec<&'a AccountRecord> {
    view.rows()
        .filter(|r| r.purchase_probability_90d.is_some() && r.expected_amount_90d.is_some())
        .take(limit)
        .collect()
}

pub fn table_rows(view: &FilteredView<'_>, limit: usize) -> Vec<TableRow> {
    view.rows().take(limit).map(TableRow::from).collect()
}
