//! Segment derivation: fixed repurchase bands and CLV quartile bands.

use quintiles_core::{
    dataset::{AccountRecord, Dataset},
    segments::{self, RepurchaseBand, SegmentFallback, NO_DATA, SINGLE_VALUE, UNDETERMINED},
    synth::SyntheticAccounts,
    types::SourceColumn,
};

// ── Helpers ──────────────────────────────────────────────────────────────────

fn with_scores(purchase: &[Option<f64>], clv: &[Option<f64>]) -> Dataset {
    let rows = purchase
        .iter()
        .zip(clv)
        .enumerate()
        .map(|(i, (&p, &v))| AccountRecord {
            purchase_probability_90d: p,
            clv_90d: v,
            ..AccountRecord::new(format!("A{i}"))
        })
        .collect();
    Dataset::with_all_columns(rows)
}

fn labels<'a>(dataset: &'a Dataset, pick: fn(&AccountRecord) -> Option<&str>) -> Vec<Option<&'a str>> {
    dataset.rows().iter().map(pick).collect()
}

fn value_of(r: &AccountRecord) -> Option<&str> {
    r.value_potential.as_deref()
}

fn repurchase_of(r: &AccountRecord) -> Option<&str> {
    r.repurchase_segment.as_deref()
}

// ── Repurchase ───────────────────────────────────────────────────────────────

/// Sweeping [0, 1] in steps of 0.001 never moves to a lower band.
#[test]
fn repurchase_binning_is_monotonic() {
    let mut previous = 0;
    for step in 0..=1000 {
        let p = step as f64 / 1000.0;
        let band = RepurchaseBand::classify(p)
            .unwrap_or_else(|| panic!("probability {p} fell outside every band"));
        assert!(band.rank() >= previous, "band rank dropped at p={p}");
        previous = band.rank();
    }
    assert_eq!(previous, RepurchaseBand::VeryHigh.rank());
}

#[test]
fn repurchase_edges_are_right_closed_and_cover_endpoints() {
    assert_eq!(RepurchaseBand::classify(0.0), Some(RepurchaseBand::Low));
    assert_eq!(RepurchaseBand::classify(0.25), Some(RepurchaseBand::Low));
    assert_eq!(RepurchaseBand::classify(0.2501), Some(RepurchaseBand::Medium));
    assert_eq!(RepurchaseBand::classify(0.50), Some(RepurchaseBand::Medium));
    assert_eq!(RepurchaseBand::classify(0.75), Some(RepurchaseBand::High));
    assert_eq!(RepurchaseBand::classify(0.76), Some(RepurchaseBand::VeryHigh));
    assert_eq!(RepurchaseBand::classify(1.0), Some(RepurchaseBand::VeryHigh));
    assert_eq!(RepurchaseBand::classify(1.5), None);
    assert_eq!(RepurchaseBand::classify(-0.5), None);
}

#[test]
fn partially_null_purchase_column_leaves_null_rows_unsegmented() {
    let ds = segments::derive(with_scores(
        &[Some(0.1), None, Some(0.9)],
        &[Some(1.0), Some(2.0), Some(3.0)],
    ));
    assert_eq!(
        labels(&ds, repurchase_of),
        vec![Some("Baja Propensión"), None, Some("Muy Alta Propensión")]
    );
    assert_eq!(ds.segment_report().and_then(|r| r.repurchase_fallback), None);
}

#[test]
fn all_null_purchase_column_yields_sentinel_for_every_row() {
    let ds = segments::derive(with_scores(&[None, None, None], &[Some(1.0), None, Some(2.0)]));
    assert!(ds.rows().iter().all(|r| r.repurchase_segment.as_deref() == Some(NO_DATA)));
    assert_eq!(
        ds.segment_report().and_then(|r| r.repurchase_fallback),
        Some(SegmentFallback::MissingColumn)
    );
}

#[test]
fn absent_score_columns_yield_sentinels() {
    let rows = vec![AccountRecord::new("A1"), AccountRecord::new("A2")];
    let raw = Dataset::new([SourceColumn::RfmSegment, SourceColumn::ChurnRiskCategory], rows);
    let ds = segments::derive(raw);

    for r in ds.rows() {
        assert_eq!(r.repurchase_segment.as_deref(), Some(NO_DATA));
        assert_eq!(r.value_potential.as_deref(), Some(NO_DATA));
    }
    let report = ds.segment_report().expect("derived dataset has a report");
    assert_eq!(report.value_fallback, Some(SegmentFallback::MissingColumn));
}

// ── Value potential ──────────────────────────────────────────────────────────

#[test]
fn clv_quartiles_assign_all_four_labels() {
    let clv: Vec<Option<f64>> = (1..=8).map(|v| Some(v as f64)).collect();
    let ds = segments::derive(with_scores(&[Some(0.5); 8], &clv));

    assert_eq!(
        ds.segment_report().map(|r| r.value_edges.clone()),
        Some(vec![1.0, 2.75, 4.5, 6.25, 8.0])
    );
    assert_eq!(
        labels(&ds, value_of),
        vec![
            Some("Valor Bronce"),
            Some("Valor Bronce"),
            Some("Valor Plata"),
            Some("Valor Plata"),
            Some("Valor Oro"),
            Some("Valor Oro"),
            Some("Valor Diamante"),
            Some("Valor Diamante"),
        ]
    );
}

/// Three distinct edges produce two bins, labelled from the low end.
#[test]
fn fewer_edges_truncate_labels_from_the_top() {
    let clv = [Some(1.0), Some(1.0), Some(1.0), Some(2.0), Some(3.0)];
    let ds = segments::derive(with_scores(&[Some(0.5); 5], &clv));

    assert_eq!(
        ds.segment_report().map(|r| r.value_edges.clone()),
        Some(vec![1.0, 2.0, 3.0])
    );
    assert_eq!(
        labels(&ds, value_of),
        vec![
            Some("Valor Bronce"),
            Some("Valor Bronce"),
            Some("Valor Bronce"),
            Some("Valor Bronce"),
            Some("Valor Plata"),
        ]
    );
}

#[test]
fn single_unique_clv_yields_single_label_for_all_rows() {
    let ds = segments::derive(with_scores(
        &[Some(0.2), Some(0.4), Some(0.6)],
        &[Some(100.0), None, Some(100.0)],
    ));
    assert!(ds.rows().iter().all(|r| r.value_potential.as_deref() == Some(SINGLE_VALUE)));
    assert_eq!(
        ds.segment_report().and_then(|r| r.value_fallback),
        Some(SegmentFallback::DegenerateDistribution)
    );
}

#[test]
fn non_finite_clv_degrades_to_undetermined() {
    let ds = segments::derive(with_scores(
        &[Some(0.2), Some(0.4)],
        &[Some(10.0), Some(f64::INFINITY)],
    ));
    assert!(ds.rows().iter().all(|r| r.value_potential.as_deref() == Some(UNDETERMINED)));
    assert_eq!(
        ds.segment_report().and_then(|r| r.value_fallback),
        Some(SegmentFallback::ComputationFailure)
    );
    // The other derived column is unaffected.
    assert_eq!(ds.rows()[1].repurchase_segment.as_deref(), Some("Propensión Media"));
}

// ── Determinism ──────────────────────────────────────────────────────────────

#[test]
fn derivation_is_deterministic() {
    let raw = SyntheticAccounts::new(0xC1A0).with_null_rate(0.1).dataset(500);
    let a = segments::derive(raw.clone());
    let b = segments::derive(raw);
    assert_eq!(a, b);
    assert!(a.is_derived());
}
