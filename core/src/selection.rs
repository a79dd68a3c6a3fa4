//! Filter selection state and strategy resolution.
//!
//! RULE: selection is a pure function of the last applied strategy and
//! the manual edits made since. There is no hidden state: resolving a
//! strategy always starts from the full universe, and every edit is an
//! explicit `SelectionEdit` applied against the same universe.

use crate::{
    dataset::Dataset,
    rfm,
    strategy::Strategy,
    types::{Category, Dimension},
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashSet};

// ── Universe ─────────────────────────────────────────────────────────────────

/// Observed distinct values per dimension, in display order.
/// Dimensions absent from the dataset have no entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Universe {
    values: BTreeMap<Dimension, Vec<Category>>,
}

impl Universe {
    pub fn from_dataset(dataset: &Dataset) -> Self {
        Self::from_values(
            Dimension::ALL
                .into_iter()
                .filter(|&d| dataset.has_dimension(d))
                .map(|d| {
                    let values = dataset
                        .rows()
                        .iter()
                        .filter_map(|r| r.dimension_value(d))
                        .map(str::to_string);
                    (d, values.collect::<Vec<_>>())
                }),
        )
    }

    /// Build from raw value lists. Values are deduplicated and ordered:
    /// RFM by rank, everything else lexically.
    pub fn from_values<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (Dimension, Vec<Category>)>,
    {
        let values = entries
            .into_iter()
            .map(|(dimension, raw)| {
                let mut ordered: Vec<Category> =
                    raw.into_iter().collect::<BTreeSet<_>>().into_iter().collect();
                if dimension == Dimension::RfmSegment {
                    rfm::sort_by_rank(&mut ordered);
                }
                (dimension, ordered)
            })
            .collect();
        Self { values }
    }

    pub fn values(&self, dimension: Dimension) -> &[Category] {
        self.values.get(&dimension).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn contains(&self, dimension: Dimension, value: &str) -> bool {
        self.values(dimension).iter().any(|v| v == value)
    }

    pub fn has_dimension(&self, dimension: Dimension) -> bool {
        self.values.contains_key(&dimension)
    }

    pub fn dimensions(&self) -> impl Iterator<Item = Dimension> + '_ {
        self.values.keys().copied()
    }
}

// ── Selection ────────────────────────────────────────────────────────────────

/// Included values per dimension, each list kept in universe order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionState {
    selected: BTreeMap<Dimension, Vec<Category>>,
}

/// An explicit change to the selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SelectionEdit {
    /// Add or remove a single value in one dimension.
    Toggle {
        dimension: Dimension,
        value:     Category,
        included:  bool,
    },
    /// The "select all" checkbox: full universe or nothing.
    SelectAll {
        dimension: Dimension,
        included:  bool,
    },
    /// Overwrite one dimension with the given values.
    Replace {
        dimension: Dimension,
        values:    Vec<Category>,
    },
    /// Overwrite every dimension with a preset.
    ApplyStrategy { strategy: Strategy },
    /// Back to the manual default.
    Reset,
}

impl SelectionState {
    /// Every dimension of the universe fully included.
    pub fn full(universe: &Universe) -> Self {
        Self {
            selected: universe
                .dimensions()
                .map(|d| (d, universe.values(d).to_vec()))
                .collect(),
        }
    }

    pub fn values(&self, dimension: Dimension) -> &[Category] {
        self.selected.get(&dimension).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn contains(&self, dimension: Dimension, value: &str) -> bool {
        self.values(dimension).iter().any(|v| v == value)
    }

    pub fn dimensions(&self) -> impl Iterator<Item = Dimension> + '_ {
        self.selected.keys().copied()
    }

    /// Set a dimension verbatim, without checking the values against any
    /// universe.
    pub fn with(mut self, dimension: Dimension, values: Vec<Category>) -> Self {
        self.selected.insert(dimension, values);
        self
    }

    /// Apply one edit in place. Values outside the universe are ignored.
    pub fn apply_edit(&mut self, edit: &SelectionEdit, universe: &Universe) {
        match edit {
            SelectionEdit::Toggle { dimension, value, included } => {
                if !universe.contains(*dimension, value) {
                    log::warn!("Ignoring toggle of unknown {} value '{value}'", dimension.name());
                    return;
                }
                let mut current: HashSet<&str> =
                    self.values(*dimension).iter().map(String::as_str).collect();
                if *included {
                    current.insert(value.as_str());
                } else {
                    current.remove(value.as_str());
                }
                let updated = in_universe_order(universe, *dimension, &current);
                self.selected.insert(*dimension, updated);
            }
            SelectionEdit::SelectAll { dimension, included } => {
                let values = if *included {
                    universe.values(*dimension).to_vec()
                } else {
                    Vec::new()
                };
                self.selected.insert(*dimension, values);
            }
            SelectionEdit::Replace { dimension, values } => {
                let wanted: HashSet<&str> = values.iter().map(String::as_str).collect();
                let updated = in_universe_order(universe, *dimension, &wanted);
                if updated.len() < wanted.len() {
                    log::warn!(
                        "Dropped {} {} value(s) not present in the data",
                        wanted.len() - updated.len(),
                        dimension.name(),
                    );
                }
                self.selected.insert(*dimension, updated);
            }
            SelectionEdit::ApplyStrategy { strategy } => {
                *self = resolve_selection(*strategy, universe);
            }
            SelectionEdit::Reset => {
                *self = resolve_selection(Strategy::Manual, universe);
            }
        }
    }
}

fn in_universe_order(universe: &Universe, dimension: Dimension, keep: &HashSet<&str>) -> Vec<Category> {
    universe
        .values(dimension)
        .iter()
        .filter(|v| keep.contains(v.as_str()))
        .cloned()
        .collect()
}

/// Default selection for a strategy: every dimension reset to its full
/// universe, then the preset's dimensions narrowed by its rules.
pub fn resolve_selection(strategy: Strategy, universe: &Universe) -> SelectionState {
    let mut selection = SelectionState::full(universe);

    for rule in strategy.rules() {
        if !universe.has_dimension(rule.dimension) {
            continue;
        }
        let narrowed: Vec<Category> = universe
            .values(rule.dimension)
            .iter()
            .filter(|v| rule.narrowing.admits(v.as_str()))
            .cloned()
            .collect();
        log::debug!(
            "{}: {} narrowed to {} of {} value(s)",
            strategy.slug(),
            rule.dimension.name(),
            narrowed.len(),
            universe.values(rule.dimension).len(),
        );
        selection.selected.insert(rule.dimension, narrowed);
    }

    selection
}
