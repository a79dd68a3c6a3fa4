//! Shared primitive types used across the entire dashboard core.

use crate::error::DashError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// A stable, unique identifier for a customer account.
pub type AccountId = String;

/// A category label exactly as it appears in the data.
pub type Category = String;

/// Columns a data source may provide.
/// Only `AccountId` is mandatory; every other column may be absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceColumn {
    AccountId,
    BusinessType,
    ChurnProbability,
    #[serde(rename = "purchase_probability_90d")]
    PurchaseProbability90d,
    #[serde(rename = "expected_amount_90d")]
    ExpectedAmount90d,
    #[serde(rename = "clv_90d")]
    Clv90d,
    RfmSegment,
    ChurnRiskCategory,
}

impl SourceColumn {
    pub const ALL: [SourceColumn; 8] = [
        Self::AccountId,
        Self::BusinessType,
        Self::ChurnProbability,
        Self::PurchaseProbability90d,
        Self::ExpectedAmount90d,
        Self::Clv90d,
        Self::RfmSegment,
        Self::ChurnRiskCategory,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::AccountId              => "account_id",
            Self::BusinessType           => "business_type",
            Self::ChurnProbability       => "churn_probability",
            Self::PurchaseProbability90d => "purchase_probability_90d",
            Self::ExpectedAmount90d      => "expected_amount_90d",
            Self::Clv90d                 => "clv_90d",
            Self::RfmSegment             => "rfm_segment",
            Self::ChurnRiskCategory      => "churn_risk_category",
        }
    }
}

/// The five filterable dimensions.
/// Two of them are derived from scores; the other three come straight
/// from the source table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    BusinessType,
    RepurchaseSegment,
    ValuePotential,
    RfmSegment,
    ChurnRiskCategory,
}

impl Dimension {
    pub const ALL: [Dimension; 5] = [
        Self::BusinessType,
        Self::RepurchaseSegment,
        Self::ValuePotential,
        Self::RfmSegment,
        Self::ChurnRiskCategory,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::BusinessType      => "business_type",
            Self::RepurchaseSegment => "repurchase_segment",
            Self::ValuePotential    => "value_potential",
            Self::RfmSegment        => "rfm_segment",
            Self::ChurnRiskCategory => "churn_risk_category",
        }
    }

    /// Heading shown by the presentation layer above each filter.
    pub fn label(&self) -> &'static str {
        match self {
            Self::BusinessType      => "Tipo de Negocio",
            Self::RepurchaseSegment => "Propensión de Recompra",
            Self::ValuePotential    => "Nivel de Valor Futuro",
            Self::RfmSegment        => "Segmentos RFM",
            Self::ChurnRiskCategory => "Niveles de Riesgo",
        }
    }

    /// The source column backing this dimension, or `None` when the
    /// dimension is derived during load.
    pub fn source_column(&self) -> Option<SourceColumn> {
        match self {
            Self::BusinessType      => Some(SourceColumn::BusinessType),
            Self::RfmSegment        => Some(SourceColumn::RfmSegment),
            Self::ChurnRiskCategory => Some(SourceColumn::ChurnRiskCategory),
            Self::RepurchaseSegment | Self::ValuePotential => None,
        }
    }
}

impl FromStr for Dimension {
    type Err = DashError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|d| d.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| DashError::UnknownDimension { name: wanted.to_string() })
    }
}
