use crate::error::{Result, TreasuryError};
use crate::period::LAST_MONTH_ORDINAL;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
#[serde(default)]
pub struct ResidentColumns {
    #[schemars(description = "Header of the resident identifier column")]
    pub id: String,

    #[schemars(description = "Header of the resident name column. Rows with a blank name are skipped.")]
    pub name: String,

    #[schemars(description = "Header of the housing block column (e.g. 'A', 'B2')")]
    pub block: String,

    #[schemars(description = "Header of the unit/house number column")]
    pub unit: String,

    #[schemars(
        description = "Header of the start period column. Accepts 'YYYY/M' or the older 'YYYY Mon' spelling. Blank means every period is tracked."
    )]
    pub start_period: String,

    #[schemars(
        description = "Additional non-payment columns to ignore when reading payment columns (e.g. notes, phone numbers)"
    )]
    pub ignored: Vec<String>,
}

impl Default for ResidentColumns {
    fn default() -> Self {
        Self {
            id: "No".to_string(),
            name: "Nama".to_string(),
            block: "Blok".to_string(),
            unit: "Nomor".to_string(),
            start_period: "Mulai".to_string(),
            ignored: Vec::new(),
        }
    }
}

impl ResidentColumns {
    /// Every column that identifies the resident rather than a payment.
    pub fn identity_columns(&self) -> Vec<&str> {
        let mut columns = vec![
            self.id.as_str(),
            self.name.as_str(),
            self.block.as_str(),
            self.unit.as_str(),
            self.start_period.as_str(),
        ];
        columns.extend(self.ignored.iter().map(String::as_str));
        columns
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
#[serde(default)]
pub struct LedgerColumns {
    #[schemars(description = "Header of the transaction date column")]
    pub date: String,

    #[schemars(description = "Header of the free-text description column")]
    pub description: String,

    #[schemars(description = "Header of the category column. Blank categories are grouped as 'Uncategorized'.")]
    pub category: String,

    #[schemars(description = "Header of the cash-in (income) amount column")]
    pub income: String,

    #[schemars(description = "Header of the cash-out (expense) amount column")]
    pub expense: String,
}

impl Default for LedgerColumns {
    fn default() -> Self {
        Self {
            date: "Tanggal".to_string(),
            description: "Keterangan".to_string(),
            category: "Kategori".to_string(),
            income: "Masuk".to_string(),
            expense: "Keluar".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[serde(default)]
pub struct DashboardConfig {
    #[schemars(description = "Name of the residential community shown on the dashboard")]
    pub organization_name: String,

    #[schemars(description = "Name of the spreadsheet tab holding resident dues")]
    pub dues_sheet: String,

    #[schemars(description = "Name of the spreadsheet tab holding cash transactions")]
    pub cash_sheet: String,

    pub resident_columns: ResidentColumns,

    pub ledger_columns: LedgerColumns,

    #[schemars(
        description = "Display labels for special levies keyed by ordinal (must be greater than 12), e.g. {\"13\": \"Meeting Fee\"}"
    )]
    pub special_labels: BTreeMap<u32, String>,

    #[schemars(description = "Cash balance carried into the first transaction of the cash sheet")]
    pub opening_balance: f64,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        let mut special_labels = BTreeMap::new();
        special_labels.insert(13, "Meeting Fee".to_string());

        Self {
            organization_name: "Residents' Association".to_string(),
            dues_sheet: "Iuran".to_string(),
            cash_sheet: "Kas".to_string(),
            resident_columns: ResidentColumns::default(),
            ledger_columns: LedgerColumns::default(),
            special_labels,
            opening_balance: 0.0,
        }
    }
}

impl DashboardConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    pub fn validate(&self) -> Result<()> {
        let required = [
            ("resident_columns.name", &self.resident_columns.name),
            ("ledger_columns.date", &self.ledger_columns.date),
            ("ledger_columns.income", &self.ledger_columns.income),
            ("ledger_columns.expense", &self.ledger_columns.expense),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(TreasuryError::MissingColumnName(field));
            }
        }

        if let Some(ordinal) = self
            .special_labels
            .keys()
            .find(|ordinal| **ordinal <= LAST_MONTH_ORDINAL)
        {
            return Err(TreasuryError::InvalidSpecialOrdinal(*ordinal));
        }

        if !self.opening_balance.is_finite() {
            return Err(TreasuryError::InvalidConfig(format!(
                "opening_balance must be finite, got {}",
                self.opening_balance
            )));
        }

        Ok(())
    }

    pub fn special_label(&self, ordinal: u32) -> Option<&str> {
        self.special_labels.get(&ordinal).map(String::as_str)
    }

    pub fn generate_json_schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(DashboardConfig)
    }

    pub fn schema_as_json() -> std::result::Result<String, serde_json::Error> {
        let schema = Self::generate_json_schema();
        serde_json::to_string_pretty(&schema)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_generation() {
        let schema_json = DashboardConfig::schema_as_json().unwrap();
        assert!(schema_json.contains("organization_name"));
        assert!(schema_json.contains("resident_columns"));
        assert!(schema_json.contains("special_labels"));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = DashboardConfig::from_json_str(
            r#"{
                "organization_name": "Perumahan Griya Asri",
                "resident_columns": { "unit": "No Rumah" },
                "special_labels": { "13": "Iuran Rapat", "14": "Kerja Bakti" }
            }"#,
        )
        .unwrap();

        assert_eq!(config.organization_name, "Perumahan Griya Asri");
        assert_eq!(config.resident_columns.unit, "No Rumah");
        assert_eq!(config.resident_columns.name, "Nama");
        assert_eq!(config.ledger_columns, LedgerColumns::default());
        assert_eq!(config.special_label(14), Some("Kerja Bakti"));
        assert_eq!(config.special_label(15), None);
    }

    #[test]
    fn test_rejects_monthly_ordinal_label() {
        let err = DashboardConfig::from_json_str(r#"{ "special_labels": { "12": "Desember" } }"#)
            .unwrap_err();
        assert!(matches!(err, TreasuryError::InvalidSpecialOrdinal(12)));
    }

    #[test]
    fn test_rejects_blank_name_column() {
        let err = DashboardConfig::from_json_str(r#"{ "resident_columns": { "name": " " } }"#)
            .unwrap_err();
        assert!(matches!(
            err,
            TreasuryError::MissingColumnName("resident_columns.name")
        ));
    }

    #[test]
    fn test_identity_columns_include_ignored() {
        let columns = ResidentColumns {
            ignored: vec!["Telepon".to_string()],
            ..ResidentColumns::default()
        };
        let identity = columns.identity_columns();
        assert!(identity.contains(&"Nama"));
        assert!(identity.contains(&"Mulai"));
        assert!(identity.contains(&"Telepon"));
    }
}
