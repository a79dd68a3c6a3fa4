//! The dashboard session — one loaded dataset and its filter state.
//!
//! LIFECYCLE:
//!   1. Load the raw table once (store → Dataset).
//!   2. Derive segment columns once; the dataset is read-only afterwards.
//!   3. Compute the universe of observed values per dimension.
//!   4. Resolve the default strategy into a selection.
//!   5. Apply strategies and manual edits; every read goes through a
//!      fresh FilteredView over the same immutable dataset.

use crate::{
    config::DashboardConfig,
    dataset::Dataset,
    error::DashResult,
    filter::{self, FilteredView},
    insights::{self, CategoryCount, Insights, SummaryMetrics, TableRow},
    segments::{self, SegmentReport},
    selection::{resolve_selection, SelectionEdit, SelectionState, Universe},
    store::AccountStore,
    strategy::Strategy,
    types::Dimension,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

pub struct DashboardSession {
    pub session_id: String,
    pub loaded_at:  DateTime<Utc>,
    config:         DashboardConfig,
    dataset:        Dataset,
    universe:       Universe,
    strategy:       Strategy,
    selection:      SelectionState,
}

/// Everything the presentation layer needs to draw one frame.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardState {
    pub session_id:           String,
    pub strategy:             Strategy,
    pub strategy_name:        &'static str,
    pub strategy_description: &'static str,
    pub universe:             Universe,
    pub selection:            SelectionState,
    pub metrics:              SummaryMetrics,
    pub insights:             Insights,
    pub rfm_distribution:     Vec<CategoryCount>,
    pub value_distribution:   Vec<CategoryCount>,
    pub predictive_points:    usize,
    pub table_matches:        usize,
    pub table:                Vec<TableRow>,
    pub segments:             Option<SegmentReport>,
}

impl DashboardSession {
    /// Derive segments for a raw dataset and start on the configured
    /// default strategy.
    pub fn new(raw: Dataset, config: DashboardConfig) -> Self {
        let dataset = segments::derive(raw);
        let universe = Universe::from_dataset(&dataset);
        let strategy = Strategy::parse(&config.default_strategy);
        let selection = resolve_selection(strategy, &universe);
        let session_id = Uuid::new_v4().to_string();

        log::info!(
            "Session {session_id}: {} accounts, strategy '{}'",
            dataset.len(),
            strategy.display_name(),
        );

        Self {
            session_id,
            loaded_at: Utc::now(),
            config,
            dataset,
            universe,
            strategy,
            selection,
        }
    }

    /// Load the configured table from a store and start a session on it.
    pub fn load(store: &AccountStore, config: DashboardConfig) -> DashResult<Self> {
        let raw = store.load_dataset(&config.source, &config.missing_marker)?;
        Ok(Self::new(raw, config))
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn universe(&self) -> &Universe {
        &self.universe
    }

    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    /// Overwrite the whole selection with a preset.
    pub fn apply_strategy(&mut self, strategy: Strategy) {
        self.apply_edit(SelectionEdit::ApplyStrategy { strategy });
    }

    /// Restore the manual default.
    pub fn reset(&mut self) {
        self.apply_edit(SelectionEdit::Reset);
    }

    pub fn apply_edit(&mut self, edit: SelectionEdit) {
        match &edit {
            SelectionEdit::ApplyStrategy { strategy } => {
                log::info!("Strategy set to '{}'", strategy.display_name());
                self.strategy = *strategy;
            }
            SelectionEdit::Reset => {
                log::info!("Filters reset");
                self.strategy = Strategy::Manual;
            }
            _ => log::debug!("Selection edit: {edit:?}"),
        }
        self.selection.apply_edit(&edit, &self.universe);
    }

    pub fn filtered(&self) -> FilteredView<'_> {
        filter::apply(&self.dataset, &self.selection)
    }

    /// Snapshot of the current view. `search` narrows only the table.
    pub fn state(&self, search: Option<&str>) -> DashboardState {
        let view = self.filtered();
        let table_view = insights::search_accounts(&view, search.unwrap_or_default());

        DashboardState {
            session_id:           self.session_id.clone(),
            strategy:             self.strategy,
            strategy_name:        self.strategy.display_name(),
            strategy_description: self.strategy.description(),
            universe:             self.universe.clone(),
            selection:            self.selection.clone(),
            metrics:              insights::summarize(&view),
            insights:             insights::insights(&view),
            rfm_distribution:     insights::distribution(&view, Dimension::RfmSegment),
            value_distribution:   insights::distribution(&view, Dimension::ValuePotential),
            predictive_points:    insights::predictive_sample(&view, self.config.predictive_sample_limit)
                .len(),
            table_matches:        table_view.len(),
            table:                insights::table_rows(&table_view, self.config.table_row_limit),
            segments:             self.dataset.segment_report().cloned(),
        }
    }
}
