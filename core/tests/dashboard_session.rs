//! Session lifecycle: load, derive, strategies, edits and the state
//! handed to the presentation layer.

use quintiles_core::{
    config::DashboardConfig,
    dashboard::DashboardSession,
    dataset::{AccountRecord, Dataset},
    insights,
    selection::{SelectionEdit, SelectionState},
    store::AccountStore,
    strategy::Strategy,
    synth::SyntheticAccounts,
    types::Dimension,
};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn synthetic_session(rows: usize, null_rate: f64) -> DashboardSession {
    let raw = SyntheticAccounts::new(99).with_null_rate(null_rate).dataset(rows);
    DashboardSession::new(raw, DashboardConfig::default_test())
}

/// Four accounts with one of each band, so every count is predictable.
fn ladder_session() -> DashboardSession {
    let rows = [
        ("A1", 0.1, 0.1, 10.0, "Baja"),
        ("A2", 0.2, 0.3, 20.0, "Media"),
        ("A3", 0.3, 0.6, 30.0, "Alta"),
        ("A4", 0.4, 0.9, 40.0, "Muy alta"),
    ]
    .into_iter()
    .map(|(id, churn, purchase, clv, risk)| AccountRecord {
        business_type:            Some("Farmacia".into()),
        churn_probability:        Some(churn),
        purchase_probability_90d: Some(purchase),
        expected_amount_90d:      Some(clv / 2.0),
        clv_90d:                  Some(clv),
        rfm_segment:              Some("Campeones".into()),
        churn_risk_category:      Some(risk.into()),
        ..AccountRecord::new(id)
    })
    .collect();
    DashboardSession::new(Dataset::with_all_columns(rows), DashboardConfig::default_test())
}

#[test]
fn new_session_starts_on_manual_with_everything_selected() {
    init_logging();
    let session = synthetic_session(300, 0.0);
    assert_eq!(session.strategy(), Strategy::Manual);
    assert!(session.dataset().is_derived());
    assert_eq!(session.selection(), &SelectionState::full(session.universe()));
    assert_eq!(session.filtered().len(), 300);
    assert!(!session.session_id.is_empty());
}

#[test]
fn configured_default_strategy_is_applied_on_start() {
    let mut config = DashboardConfig::default_test();
    config.default_strategy = "Caja Rápida (Conversión)".into();
    let raw = SyntheticAccounts::new(1).dataset(200);
    let session = DashboardSession::new(raw, config);
    assert_eq!(session.strategy(), Strategy::FastCash);
}

#[test]
fn shield_view_only_holds_matching_accounts() {
    let mut session = synthetic_session(2000, 0.02);
    session.apply_strategy(Strategy::Shield);

    let view = session.filtered();
    assert!(!view.is_empty());
    for row in view.rows() {
        let rfm = row.rfm_segment.as_deref().unwrap_or_default();
        assert!(["Campeones", "VIPs Leales", "Alto Potencial"].contains(&rfm), "{rfm}");
        let risk = row.churn_risk_category.as_deref().unwrap_or_default();
        assert!(risk.contains("Alta") || risk.contains("Muy alta"), "{risk}");
        let value = row.value_potential.as_deref().unwrap_or_default();
        assert!(value == "Valor Oro" || value == "Valor Diamante", "{value}");
    }
}

#[test]
fn reset_returns_to_manual() {
    let mut session = synthetic_session(300, 0.0);
    session.apply_strategy(Strategy::Lazarus);
    session.apply_edit(SelectionEdit::SelectAll {
        dimension: Dimension::BusinessType,
        included:  false,
    });
    assert!(session.filtered().is_empty());

    session.reset();
    assert_eq!(session.strategy(), Strategy::Manual);
    assert_eq!(session.filtered().len(), 300);
}

#[test]
fn manual_edits_keep_the_last_strategy_label() {
    let mut session = synthetic_session(100, 0.0);
    session.apply_strategy(Strategy::RoughDiamonds);
    session.apply_edit(SelectionEdit::Toggle {
        dimension: Dimension::RfmSegment,
        value:     "Campeones".into(),
        included:  true,
    });
    assert_eq!(session.strategy(), Strategy::RoughDiamonds);
    assert!(session.selection().contains(Dimension::RfmSegment, "Campeones"));
}

#[test]
fn metrics_and_insights_over_a_ladder() {
    let session = ladder_session();
    let state = session.state(None);

    assert_eq!(
        session.dataset().segment_report().map(|r| r.value_edges.clone()),
        Some(vec![10.0, 17.5, 25.0, 32.5, 40.0])
    );

    let m = &state.metrics;
    assert_eq!(m.accounts, 4);
    assert!((m.avg_churn_probability.unwrap_or_default() - 0.25).abs() < 1e-9);
    assert!((m.total_clv_90d - 100.0).abs() < 1e-9);
    assert!((m.avg_purchase_probability.unwrap_or_default() - 0.475).abs() < 1e-9);

    assert_eq!(state.insights.vip_accounts, 2);
    assert_eq!(state.insights.upcoming_sales, 2);
    // "Muy alta" is lower-case and does not count as critical.
    assert_eq!(state.insights.critical_risk, 1);

    assert_eq!(state.value_distribution.len(), 4);
    assert!(state.value_distribution.iter().all(|c| c.accounts == 1));
    // Ties are ordered by label.
    assert_eq!(state.value_distribution[0].category, "Valor Bronce");
    assert_eq!(state.rfm_distribution.len(), 1);
    assert_eq!(state.rfm_distribution[0].accounts, 4);
}

#[test]
fn empty_view_has_zero_metrics() {
    let mut session = ladder_session();
    session.apply_edit(SelectionEdit::Replace {
        dimension: Dimension::RfmSegment,
        values:    Vec::new(),
    });
    let state = session.state(None);
    assert_eq!(state.metrics.accounts, 0);
    assert_eq!(state.metrics.avg_churn_probability, None);
    assert_eq!(state.metrics.total_clv_90d, 0.0);
    assert_eq!(state.insights.vip_accounts, 0);
    assert!(state.rfm_distribution.is_empty());
}

#[test]
fn search_narrows_only_the_table() {
    let session = synthetic_session(100, 0.0);
    let state = session.state(Some("c00001"));

    assert_eq!(state.table_matches, 10);
    assert_eq!(state.table.len(), 10);
    assert!(state.table.iter().all(|r| r.account_id.starts_with("C00001")));
    assert_eq!(state.metrics.accounts, 100);

    let blank = session.state(Some("   "));
    assert_eq!(blank.table_matches, 100);
}

#[test]
fn table_and_predictive_sample_respect_limits() {
    let mut config = DashboardConfig::default_test();
    config.table_row_limit = 25;
    config.predictive_sample_limit = 40;
    let raw = SyntheticAccounts::new(4).with_null_rate(0.0).dataset(120);
    let session = DashboardSession::new(raw, config);

    let state = session.state(None);
    assert_eq!(state.table_matches, 120);
    assert_eq!(state.table.len(), 25);
    assert_eq!(state.predictive_points, 40);

    let view = session.filtered();
    let sample = insights::predictive_sample(&view, 1000);
    assert_eq!(sample.len(), 120);
}

#[test]
fn state_serializes_with_strategy_slug() {
    let mut session = synthetic_session(50, 0.0);
    session.apply_strategy(Strategy::Shield);
    let json = serde_json::to_string(&session.state(None)).expect("serialize state");
    assert!(json.contains(r#""strategy":"shield""#), "{json}");
    assert!(json.contains("Escudo de Oro"));
}

#[test]
fn session_loads_through_the_store() {
    let config = DashboardConfig::default_test();
    let store = AccountStore::in_memory().expect("store");
    store.migrate().expect("migrate");
    let accounts = SyntheticAccounts::new(21).generate(80);
    store.insert_accounts(&config.source, &accounts).expect("insert");

    let session = DashboardSession::load(&store, config).expect("session");
    assert_eq!(session.dataset().len(), 80);
    assert_eq!(session.filtered().len(), 80);
    assert!(session.universe().has_dimension(Dimension::ValuePotential));
}
