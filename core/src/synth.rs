//! Deterministic synthetic account tables.
//!
//! RULE: nothing here may call a platform RNG. Every table is derived
//! from an explicit seed, so the same seed always yields the same rows.
//! Used by demo runs and tests.

use crate::{
    dataset::{AccountRecord, Dataset},
    rfm::RfmSegment,
};
use rand::{RngCore, SeedableRng};
use rand_pcg::Pcg64Mcg;

pub const BUSINESS_TYPES: [&str; 4] = ["Abarrotes", "Farmacia", "Ferretería", "Restaurante"];
pub const RISK_CATEGORIES: [&str; 4] = ["Baja", "Media", "Alta", "Muy alta"];

pub struct SyntheticAccounts {
    inner:     Pcg64Mcg,
    null_rate: f64,
}

impl SyntheticAccounts {
    pub fn new(seed: u64) -> Self {
        Self {
            inner:     Pcg64Mcg::seed_from_u64(seed),
            null_rate: 0.0,
        }
    }

    /// Probability that any optional field of a row is null.
    pub fn with_null_rate(mut self, null_rate: f64) -> Self {
        self.null_rate = null_rate.clamp(0.0, 1.0);
        self
    }

    /// Roll a float in [0.0, 1.0).
    pub fn next_f64(&mut self) -> f64 {
        let bits = self.inner.next_u64();
        (bits >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
    }

    /// Roll a usize in [0, n).
    pub fn next_below(&mut self, n: usize) -> usize {
        assert!(n > 0, "n must be > 0");
        (self.inner.next_u64() % n as u64) as usize
    }

    /// Bernoulli trial: returns true with probability p.
    pub fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }

    /// Simplified Pareto draw, used for spend amounts.
    pub fn pareto(&mut self, x_min: f64, alpha: f64) -> f64 {
        let u = self.next_f64().max(1e-10);
        x_min * u.powf(-1.0 / alpha)
    }

    fn maybe<T>(&mut self, value: T) -> Option<T> {
        if self.chance(self.null_rate) {
            None
        } else {
            Some(value)
        }
    }

    fn pick(&mut self, items: &[&str]) -> String {
        items[self.next_below(items.len())].to_string()
    }

    /// Probability in [0, 1], with both endpoints reachable.
    fn probability(&mut self) -> f64 {
        match self.next_below(50) {
            0 => 0.0,
            1 => 1.0,
            _ => (self.next_f64() * 100.0).round() / 100.0,
        }
    }

    pub fn account(&mut self, index: usize) -> AccountRecord {
        let expected = (self.pareto(50.0, 1.6) * 100.0).round() / 100.0;
        let clv = (expected * (1.0 + self.next_f64() * 3.0) * 100.0).round() / 100.0;
        let rfm = RfmSegment::ALL[self.next_below(RfmSegment::ALL.len())];

        let business_type = self.pick(&BUSINESS_TYPES);
        let churn = self.probability();
        let purchase = self.probability();
        let risk = self.pick(&RISK_CATEGORIES);

        AccountRecord {
            account_id:               format!("C{index:06}"),
            business_type:            self.maybe(business_type),
            churn_probability:        self.maybe(churn),
            purchase_probability_90d: self.maybe(purchase),
            expected_amount_90d:      self.maybe(expected),
            clv_90d:                  self.maybe(clv),
            rfm_segment:              self.maybe(rfm.label().to_string()),
            churn_risk_category:      self.maybe(risk),
            repurchase_segment:       None,
            value_potential:          None,
        }
    }

    pub fn generate(&mut self, n: usize) -> Vec<AccountRecord> {
        (0..n).map(|i| self.account(i)).collect()
    }

    /// Raw dataset with every source column present.
    pub fn dataset(&mut self, n: usize) -> Dataset {
        Dataset::with_all_columns(self.generate(n))
    }
}
