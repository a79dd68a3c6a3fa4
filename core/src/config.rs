use crate::types::SourceColumn;
use serde::{Deserialize, Serialize};

/// Name of each logical field in the source table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnMap {
    pub account_id:               String,
    pub business_type:            String,
    pub churn_probability:        String,
    pub purchase_probability_90d: String,
    pub expected_amount_90d:      String,
    pub clv_90d:                  String,
    pub rfm_segment:              String,
    pub churn_risk_category:      String,
}

impl Default for ColumnMap {
    fn default() -> Self {
        Self {
            account_id:               "CUENTA".into(),
            business_type:            "NEGOCIO".into(),
            churn_probability:        "Probabilidad_Churn".into(),
            purchase_probability_90d: "Probabilidad_Compra_90d".into(),
            expected_amount_90d:      "Monto_Esperado_90d".into(),
            clv_90d:                  "CLV_90dias".into(),
            rfm_segment:              "Segmento_RFM".into(),
            churn_risk_category:      "Categoria_Probabilidad_Abandono".into(),
        }
    }
}

impl ColumnMap {
    pub fn get(&self, column: SourceColumn) -> &str {
        match column {
            SourceColumn::AccountId              => &self.account_id,
            SourceColumn::BusinessType           => &self.business_type,
            SourceColumn::ChurnProbability       => &self.churn_probability,
            SourceColumn::PurchaseProbability90d => &self.purchase_probability_90d,
            SourceColumn::ExpectedAmount90d      => &self.expected_amount_90d,
            SourceColumn::Clv90d                 => &self.clv_90d,
            SourceColumn::RfmSegment             => &self.rfm_segment,
            SourceColumn::ChurnRiskCategory      => &self.churn_risk_category,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceConfig {
    #[serde(default = "default_table")]
    pub table: String,
    #[serde(default)]
    pub columns: ColumnMap,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self { table: default_table(), columns: ColumnMap::default() }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardConfig {
    #[serde(default)]
    pub source: SourceConfig,
    /// Cell text the source uses for "no value".
    #[serde(default = "default_missing_marker")]
    pub missing_marker: String,
    #[serde(default = "default_predictive_sample_limit")]
    pub predictive_sample_limit: usize,
    #[serde(default = "default_table_row_limit")]
    pub table_row_limit: usize,
    #[serde(default = "default_strategy")]
    pub default_strategy: String,
}

fn default_table() -> String {
    "rfm_churn_ltv".into()
}

fn default_missing_marker() -> String {
    "Dato no disponible".into()
}

fn default_predictive_sample_limit() -> usize {
    3000
}

fn default_table_row_limit() -> usize {
    500
}

fn default_strategy() -> String {
    "manual".into()
}

impl DashboardConfig {
    /// Load `{data_dir}/dashboard.json`.
    pub fn load(data_dir: &str) -> anyhow::Result<Self> {
        let path = format!("{data_dir}/dashboard.json");
        let content = std::fs::read_to_string(&path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let config: DashboardConfig = serde_json::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Invalid {path}: {e}"))?;
        log::debug!("Loaded dashboard config from {path}");
        Ok(config)
    }

    /// Config with hardcoded defaults for use in unit tests.
    pub fn default_test() -> Self {
        Self {
            source:                  SourceConfig::default(),
            missing_marker:          default_missing_marker(),
            predictive_sample_limit: default_predictive_sample_limit(),
            table_row_limit:         default_table_row_limit(),
            default_strategy:        default_strategy(),
        }
    }
}
