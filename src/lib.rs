//! # Community Treasury
//!
//! Typed view models for a residential-community treasury whose system of
//! record is a shared spreadsheet: one tab of resident dues and one tab of
//! cash transactions.
//!
//! ## Core Concepts
//!
//! - **Period key**: `"year/ordinal"`. Ordinals 1-12 are calendar months, larger
//!   ordinals are special levies for that year (e.g. the annual meeting fee)
//! - **Start period**: the first month a resident owes dues. Earlier periods are
//!   shown but never counted
//! - **Reconciliation**: per resident, which counted periods are paid, and the
//!   resulting percentage
//! - **Ledger**: income/expense totals, monthly cash flow and running balance
//!
//! ## Example
//!
//! ```rust,ignore
//! use community_treasury::*;
//!
//! let dues = read_sheet_csv_str(include_str!("dues.csv"))?;
//! let cash = read_sheet_csv_str(include_str!("cash.csv"))?;
//!
//! let processor = TreasuryProcessor::new(DashboardConfig::default());
//! let dashboard = processor.process_rows(&dues, &cash, YearMonth::current())?;
//!
//! for status in &dashboard.monitoring.residents {
//!     println!("{}: {}%", status.resident.name, status.summary.percentage);
//! }
//! ```

pub mod columns;
pub mod error;
pub mod ingestion;
pub mod ledger;
pub mod monitoring;
pub mod period;
pub mod schema;
pub mod summary;
pub mod timeline;
pub mod utils;

#[cfg(feature = "sheets")]
pub mod sheets;

pub use columns::{parse_payment_columns, split_column_name, FieldKind, RawPaymentFields};
pub use error::{Result, TreasuryError};
pub use ingestion::*;
pub use ledger::*;
pub use monitoring::*;
pub use period::{evaluate, PeriodEvaluation, PeriodKey, StartPeriod, YearMonth};
pub use schema::*;
pub use summary::{is_paid_amount, PaymentSummary};
pub use timeline::{PaymentTimeline, TimelineYear};

use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::io::Read;

/// Everything a dashboard page renders, produced from one fetch of both tabs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreasuryDashboard {
    pub organization_name: String,
    pub as_of: YearMonth,
    pub monitoring: MonitoringReport,
    pub ledger: LedgerSummary,
}

impl TreasuryDashboard {
    pub fn timeline(&self, resident_id: &str) -> Option<PaymentTimeline> {
        self.monitoring
            .find(resident_id)
            .map(PaymentTimeline::from_status)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

pub struct TreasuryProcessor {
    config: DashboardConfig,
}

impl TreasuryProcessor {
    pub fn new(config: DashboardConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    pub fn process_rows(
        &self,
        dues_rows: &[SheetRow],
        cash_rows: &[SheetRow],
        today: YearMonth,
    ) -> Result<TreasuryDashboard> {
        self.config.validate()?;

        info!(
            "Processing treasury for {} as of {}",
            self.config.organization_name, today
        );

        let residents = residents_from_rows(dues_rows, &self.config.resident_columns);
        let transactions = transactions_from_rows(cash_rows, &self.config.ledger_columns);
        debug!(
            "Kept {}/{} dues rows and {}/{} cash rows",
            residents.len(),
            dues_rows.len(),
            transactions.len(),
            cash_rows.len()
        );

        let monitoring = MonitoringReport::build(&residents, today, &self.config);
        let ledger = LedgerSummary::build(&transactions, self.config.opening_balance);

        Ok(TreasuryDashboard {
            organization_name: self.config.organization_name.clone(),
            as_of: today,
            monitoring,
            ledger,
        })
    }

    pub fn process_csv<D: Read, C: Read>(
        &self,
        dues_csv: D,
        cash_csv: C,
        today: YearMonth,
    ) -> Result<TreasuryDashboard> {
        let dues_rows = read_sheet_csv(dues_csv)?;
        let cash_rows = read_sheet_csv(cash_csv)?;
        self.process_rows(&dues_rows, &cash_rows, today)
    }

    /// Reconciles the dues tab only.
    pub fn monitor(&self, dues_rows: &[SheetRow], today: YearMonth) -> MonitoringReport {
        let residents = residents_from_rows(dues_rows, &self.config.resident_columns);
        MonitoringReport::build(&residents, today, &self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DUES: &str = "\
No,Nama,Blok,Nomor,Mulai,2024/1 (tgl),2024/1 (jml),2024/2 (tgl),2024/2 (jml),2024/13 (jml)
1,Budi,A,1,,05/01/2024,50000,03/02/2024,50000,100000
2,Ani,A,2,2024/2,,,,,
";

    const CASH: &str = "\
Tanggal,Keterangan,Kategori,Masuk,Keluar
05/01/2024,Iuran Budi,Iuran,50000,
03/02/2024,Iuran Budi,Iuran,50000,
10/02/2024,Lampu jalan,Perawatan,,30000
";

    #[test]
    fn test_end_to_end_processing() {
        let processor = TreasuryProcessor::new(DashboardConfig {
            opening_balance: 100_000.0,
            ..DashboardConfig::default()
        });

        let dashboard = processor
            .process_csv(DUES.as_bytes(), CASH.as_bytes(), YearMonth::new(2024, 2).unwrap())
            .unwrap();

        assert_eq!(dashboard.monitoring.residents.len(), 2);
        assert_eq!(dashboard.monitoring.overall.total, 3);
        assert_eq!(dashboard.monitoring.overall.paid, 2);
        assert_eq!(dashboard.monitoring.fully_paid, 1);

        assert!((dashboard.ledger.closing_balance - 170_000.0).abs() < 0.01);

        let timeline = dashboard.timeline("1").unwrap();
        assert_eq!(timeline.years.len(), 1);
        assert_eq!(timeline.years[0].specials[0].label, "Meeting Fee 2024");
        assert!(dashboard.timeline("99").is_none());
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let mut config = DashboardConfig::default();
        config.special_labels.insert(5, "Mei".to_string());

        let result = TreasuryProcessor::new(config).process_rows(
            &[],
            &[],
            YearMonth::new(2024, 1).unwrap(),
        );
        assert!(matches!(result, Err(TreasuryError::InvalidSpecialOrdinal(5))));
    }

    #[test]
    fn test_dashboard_serializes() {
        let dashboard = TreasuryProcessor::new(DashboardConfig::default())
            .process_csv(DUES.as_bytes(), CASH.as_bytes(), YearMonth::new(2024, 2).unwrap())
            .unwrap();
        let json = dashboard.to_json().unwrap();
        assert!(json.contains("\"monitoring\""));
        assert!(json.contains("\"closing_balance\""));
        assert!(json.contains("\"status\": \"paid\""));
    }
}
