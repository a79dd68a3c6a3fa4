//! Account records and the in-memory table they live in.
//!
//! RULE: a Dataset is read-only once derived. Filtering produces views
//! over row indices; it never mutates or reorders rows.

use crate::{
    segments::SegmentReport,
    types::{AccountId, Dimension, SourceColumn},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// One row of the scored customer table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AccountRecord {
    pub account_id:               AccountId,
    pub business_type:            Option<String>,
    pub churn_probability:        Option<f64>,
    pub purchase_probability_90d: Option<f64>,
    pub expected_amount_90d:      Option<f64>,
    pub clv_90d:                  Option<f64>,
    pub rfm_segment:              Option<String>,
    pub churn_risk_category:      Option<String>,
    // Derived during load
    pub repurchase_segment:       Option<String>,
    pub value_potential:          Option<String>,
}

impl AccountRecord {
    pub fn new(account_id: impl Into<AccountId>) -> Self {
        Self {
            account_id: account_id.into(),
            ..Self::default()
        }
    }

    /// The category this row holds for a filter dimension.
    pub fn dimension_value(&self, dimension: Dimension) -> Option<&str> {
        match dimension {
            Dimension::BusinessType      => self.business_type.as_deref(),
            Dimension::RepurchaseSegment => self.repurchase_segment.as_deref(),
            Dimension::ValuePotential    => self.value_potential.as_deref(),
            Dimension::RfmSegment        => self.rfm_segment.as_deref(),
            Dimension::ChurnRiskCategory => self.churn_risk_category.as_deref(),
        }
    }
}

/// A table of accounts plus the set of columns the source actually had.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    columns:  BTreeSet<SourceColumn>,
    rows:     Vec<AccountRecord>,
    segments: Option<SegmentReport>,
}

impl Dataset {
    /// Build a raw (not yet derived) dataset. The account key column is
    /// always considered present.
    pub fn new(
        columns: impl IntoIterator<Item = SourceColumn>,
        rows: Vec<AccountRecord>,
    ) -> Self {
        let mut columns: BTreeSet<SourceColumn> = columns.into_iter().collect();
        columns.insert(SourceColumn::AccountId);
        Self { columns, rows, segments: None }
    }

    /// Raw dataset where every source column is present.
    pub fn with_all_columns(rows: Vec<AccountRecord>) -> Self {
        Self::new(SourceColumn::ALL, rows)
    }

    pub fn rows(&self) -> &[AccountRecord] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, column: SourceColumn) -> bool {
        self.columns.contains(&column)
    }

    /// Derived dimensions exist once segments have been computed;
    /// source dimensions exist when their column was loaded.
    pub fn has_dimension(&self, dimension: Dimension) -> bool {
        match dimension.source_column() {
            Some(column) => self.has_column(column),
            None         => self.segments.is_some(),
        }
    }

    pub fn is_derived(&self) -> bool {
        self.segments.is_some()
    }

    pub fn segment_report(&self) -> Option<&SegmentReport> {
        self.segments.as_ref()
    }

    /// Copy of the given rows, keeping column presence and derivation.
    pub fn subset(&self, indices: &[usize]) -> Dataset {
        Dataset {
            columns:  self.columns.clone(),
            rows:     indices.iter().filter_map(|&i| self.rows.get(i).cloned()).collect(),
            segments: self.segments.clone(),
        }
    }

    pub fn profile(&self) -> DatasetProfile {
        DatasetProfile {
            rows:        self.rows.len(),
            columns:     self.columns.iter().map(|c| c.name().to_string()).collect(),
            derived:     self.is_derived(),
            profiled_at: Utc::now(),
        }
    }

    pub(crate) fn rows_mut(&mut self) -> &mut [AccountRecord] {
        &mut self.rows
    }

    pub(crate) fn set_segment_report(&mut self, report: SegmentReport) {
        self.segments = Some(report);
    }
}

/// Shape summary of a loaded table.
#[derive(Debug, Clone, Serialize)]
pub struct DatasetProfile {
    pub rows:        usize,
    pub columns:     Vec<String>,
    pub derived:     bool,
    pub profiled_at: DateTime<Utc>,
}
