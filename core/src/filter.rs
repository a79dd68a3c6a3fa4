//! Row selection — the conjunction of per-dimension inclusion sets.
//!
//! A row is in the view iff, for every dimension present in the dataset,
//! its value belongs to the selected set. Dimensions the dataset lacks
//! are skipped. Null values never match.

use crate::{
    dataset::{AccountRecord, Dataset},
    selection::SelectionState,
    types::Dimension,
};
use std::collections::HashSet;

/// Row indices into a dataset that pass a selection.
#[derive(Debug, Clone)]
pub struct FilteredView<'a> {
    dataset: &'a Dataset,
    indices: Vec<usize>,
}

impl<'a> FilteredView<'a> {
    /// View over every row.
    pub fn all(dataset: &'a Dataset) -> Self {
        Self { dataset, indices: (0..dataset.len()).collect() }
    }

    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn rows(&self) -> impl Iterator<Item = &'a AccountRecord> + '_ {
        let rows = self.dataset.rows();
        self.indices.iter().map(move |&i| &rows[i])
    }

    /// Narrow this view further by a selection.
    pub fn refine(&self, selection: &SelectionState) -> FilteredView<'a> {
        let matcher = Matcher::new(self.dataset, selection);
        self.retain(|row| matcher.admits(row))
    }

    /// Narrow this view by an arbitrary row predicate.
    pub fn retain(&self, mut keep: impl FnMut(&AccountRecord) -> bool) -> FilteredView<'a> {
        let rows = self.dataset.rows();
        FilteredView {
            dataset: self.dataset,
            indices: self.indices.iter().copied().filter(|&i| keep(&rows[i])).collect(),
        }
    }

    /// Materialize the view as a standalone dataset.
    pub fn to_dataset(&self) -> Dataset {
        self.dataset.subset(&self.indices)
    }
}

/// Apply a selection to a dataset.
pub fn apply<'a>(dataset: &'a Dataset, selection: &SelectionState) -> FilteredView<'a> {
    let view = FilteredView::all(dataset).refine(selection);
    log::debug!("Selection kept {} of {} rows", view.len(), dataset.len());
    view
}

struct Matcher<'s> {
    checks: Vec<(Dimension, HashSet<&'s str>)>,
}

impl<'s> Matcher<'s> {
    fn new(dataset: &Dataset, selection: &'s SelectionState) -> Self {
        let checks = Dimension::ALL
            .into_iter()
            .filter(|&d| dataset.has_dimension(d))
            .map(|d| (d, selection.values(d).iter().map(String::as_str).collect()))
            .collect();
        Self { checks }
    }

    fn admits(&self, row: &AccountRecord) -> bool {
        self.checks.iter().all(|(dimension, allowed)| {
            row.dimension_value(*dimension)
                .is_some_and(|value| allowed.contains(value))
        })
    }
}
