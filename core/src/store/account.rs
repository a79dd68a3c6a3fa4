use super::{quote_ident, AccountStore};
use crate::{
    config::{ColumnMap, SourceConfig},
    dataset::{AccountRecord, Dataset},
    error::{DashError, DashResult},
    types::SourceColumn,
};
use rusqlite::{types::ValueRef, ToSql};

impl AccountStore {
    // ── Writing ────────────────────────────────────────────────

    /// Insert one account into the configured table, writing every mapped
    /// column. Derived segments are never persisted.
    pub fn insert_account(&self, source: &SourceConfig, account: &AccountRecord) -> DashResult<()> {
        let columns: Vec<String> = SourceColumn::ALL
            .iter()
            .map(|&c| quote_ident(source.columns.get(c)))
            .collect();
        let placeholders: Vec<String> = (1..=columns.len()).map(|i| format!("?{i}")).collect();
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            quote_ident(&source.table),
            columns.join(", "),
            placeholders.join(", "),
        );
        let values: [&dyn ToSql; 8] = [
            &account.account_id,
            &account.business_type,
            &account.churn_probability,
            &account.purchase_probability_90d,
            &account.expected_amount_90d,
            &account.clv_90d,
            &account.rfm_segment,
            &account.churn_risk_category,
        ];
        self.conn.execute(&sql, &values[..])?;
        Ok(())
    }

    pub fn insert_accounts(&self, source: &SourceConfig, accounts: &[AccountRecord]) -> DashResult<()> {
        let tx = self.conn.unchecked_transaction()?;
        for account in accounts {
            self.insert_account(source, account)?;
        }
        tx.commit()?;
        Ok(())
    }

    // ── Loading ────────────────────────────────────────────────

    /// Load the configured table as a raw dataset.
    ///
    /// Optional columns that the table lacks are recorded as absent.
    /// Cells equal to `missing_marker` become null; numeric columns that do
    /// not parse become null.
    pub fn load_dataset(&self, source: &SourceConfig, missing_marker: &str) -> DashResult<Dataset> {
        let declared = self.table_columns(&source.table)?;
        if declared.is_empty() {
            return Err(DashError::TableNotFound { table: source.table.clone() });
        }

        let present = resolve_columns(&declared, &source.columns);
        if !present.iter().any(|(c, _)| *c == SourceColumn::AccountId) {
            return Err(DashError::MissingColumn {
                table:  source.table.clone(),
                column: source.columns.account_id.clone(),
            });
        }

        let select: Vec<String> = present.iter().map(|(_, name)| quote_ident(name)).collect();
        let sql = format!("SELECT {} FROM {}", select.join(", "), quote_ident(&source.table));
        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query([])?;

        let mut accounts = Vec::new();
        let mut missing_ids = 0usize;
        while let Some(row) = rows.next()? {
            let mut account = AccountRecord::default();
            for (i, (column, _)) in present.iter().enumerate() {
                let value = row.get_ref(i)?;
                assign(&mut account, *column, value, missing_marker);
            }
            if account.account_id.is_empty() {
                missing_ids += 1;
            }
            accounts.push(account);
        }
        if missing_ids > 0 {
            log::warn!("{missing_ids} row(s) in '{}' have no account id", source.table);
        }

        let absent: Vec<&str> = SourceColumn::ALL
            .iter()
            .filter(|c| !present.iter().any(|(p, _)| p == *c))
            .map(|c| c.name())
            .collect();
        if !absent.is_empty() {
            log::warn!("Table '{}' lacks optional column(s): {}", source.table, absent.join(", "));
        }
        log::info!("Loaded {} accounts from '{}'", accounts.len(), source.table);

        Ok(Dataset::new(present.into_iter().map(|(c, _)| c), accounts))
    }
}

/// Match configured column names against the declared ones, ignoring
/// surrounding whitespace on either side.
fn resolve_columns(declared: &[String], columns: &ColumnMap) -> Vec<(SourceColumn, String)> {
    SourceColumn::ALL
        .iter()
        .filter_map(|&column| {
            let wanted = columns.get(column).trim();
            declared
                .iter()
                .find(|name| name.trim() == wanted)
                .map(|name| (column, name.clone()))
        })
        .collect()
}

fn assign(account: &mut AccountRecord, column: SourceColumn, value: ValueRef<'_>, missing_marker: &str) {
    match column {
        SourceColumn::AccountId => {
            account.account_id = text_value(value, missing_marker).unwrap_or_default();
        }
        SourceColumn::BusinessType      => account.business_type = text_value(value, missing_marker),
        SourceColumn::RfmSegment        => account.rfm_segment = text_value(value, missing_marker),
        SourceColumn::ChurnRiskCategory => {
            account.churn_risk_category = text_value(value, missing_marker);
        }
        SourceColumn::ChurnProbability => {
            account.churn_probability = numeric_value(value, missing_marker);
        }
        SourceColumn::PurchaseProbability90d => {
            account.purchase_probability_90d = numeric_value(value, missing_marker);
        }
        SourceColumn::ExpectedAmount90d => {
            account.expected_amount_90d = numeric_value(value, missing_marker);
        }
        SourceColumn::Clv90d => account.clv_90d = numeric_value(value, missing_marker),
    }
}

fn text_value(value: ValueRef<'_>, missing_marker: &str) -> Option<String> {
    let text = match value {
        ValueRef::Null       => return None,
        ValueRef::Integer(i) => i.to_string(),
        ValueRef::Real(f)    => f.to_string(),
        ValueRef::Text(t)    => String::from_utf8_lossy(t).into_owned(),
        ValueRef::Blob(_)    => return None,
    };
    (!text.trim().is_empty() && text != missing_marker).then_some(text)
}

fn numeric_value(value: ValueRef<'_>, missing_marker: &str) -> Option<f64> {
    let number = match value {
        ValueRef::Null       => None,
        ValueRef::Integer(i) => Some(i as f64),
        ValueRef::Real(f)    => Some(f),
        ValueRef::Text(t)    => std::str::from_utf8(t)
            .ok()
            .map(str::trim)
            .filter(|s| !s.is_empty() && *s != missing_marker)
            .and_then(|s| s.parse::<f64>().ok()),
        ValueRef::Blob(_)    => None,
    };
    number.filter(|f| !f.is_nan())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_text_is_coerced() {
        assert_eq!(numeric_value(ValueRef::Text(b" 0.5 "), "NA"), Some(0.5));
        assert_eq!(numeric_value(ValueRef::Text(b"abc"), "NA"), None);
        assert_eq!(numeric_value(ValueRef::Text(b"NA"), "NA"), None);
        assert_eq!(numeric_value(ValueRef::Integer(3), "NA"), Some(3.0));
        assert_eq!(numeric_value(ValueRef::Real(f64::NAN), "NA"), None);
    }

    #[test]
    fn missing_marker_becomes_null_text() {
        assert_eq!(text_value(ValueRef::Text(b"Dato no disponible"), "Dato no disponible"), None);
        assert_eq!(text_value(ValueRef::Text(b"Campeones"), "Dato no disponible"), Some("Campeones".into()));
        assert_eq!(text_value(ValueRef::Integer(7), "x"), Some("7".into()));
        assert_eq!(text_value(ValueRef::Text(b""), "x"), None);
        assert_eq!(text_value(ValueRef::Text(b"   "), "x"), None);
    }
}
