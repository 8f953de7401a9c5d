use crate::error::{Result, TreasuryError};
use crate::ingestion::{read_sheet_csv_str, SheetRow};
use crate::period::YearMonth;
use crate::schema::DashboardConfig;
use crate::{TreasuryDashboard, TreasuryProcessor};
use futures::future::try_join_all;
use log::{debug, info};
use reqwest::Client;

const SHEETS_BASE_URL: &str = "https://docs.google.com/spreadsheets/d";

/// Reads tabs of a published Google Sheet through its CSV export.
#[derive(Clone)]
pub struct SheetsClient {
    client: Client,
    spreadsheet_id: String,
    base_url: String,
}

impl SheetsClient {
    pub fn new(spreadsheet_id: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            spreadsheet_id: spreadsheet_id.into(),
            base_url: SHEETS_BASE_URL.to_string(),
        }
    }

    /// Points the client at a mirror or proxy serving the same URL layout.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_http_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    pub fn export_url(&self) -> String {
        format!("{}/{}/gviz/tq", self.base_url, self.spreadsheet_id)
    }

    pub async fn fetch_rows(&self, sheet: &str) -> Result<Vec<SheetRow>> {
        let url = self.export_url();
        debug!("Fetching sheet '{}' from {}", sheet, url);

        let res = self
            .client
            .get(&url)
            .query(&[("tqx", "out:csv"), ("sheet", sheet)])
            .send()
            .await?;

        let status = res.status();
        if !status.is_success() {
            let error_text = res.text().await.unwrap_or_default();
            return Err(TreasuryError::FetchFailed {
                sheet: sheet.to_string(),
                details: format!("status {}: {}", status, error_text),
            });
        }

        let body = res.text().await?;
        let rows = read_sheet_csv_str(&body)?;
        info!("Fetched {} rows from sheet '{}'", rows.len(), sheet);
        Ok(rows)
    }

    /// Fetches several tabs concurrently, preserving the requested order.
    pub async fn fetch_many(&self, sheets: &[&str]) -> Result<Vec<Vec<SheetRow>>> {
        try_join_all(sheets.iter().map(|sheet| self.fetch_rows(sheet))).await
    }

    /// Fetches the dues and cash tabs named in `config` and builds the
    /// dashboard for `today`.
    pub async fn fetch_dashboard(
        &self,
        config: &DashboardConfig,
        today: YearMonth,
    ) -> Result<TreasuryDashboard> {
        let (dues_rows, cash_rows) = tokio::try_join!(
            self.fetch_rows(&config.dues_sheet),
            self.fetch_rows(&config.cash_sheet)
        )?;

        TreasuryProcessor::new(config.clone()).process_rows(&dues_rows, &cash_rows, today)
    }
}
