use crate::columns::parse_payment_columns;
use crate::error::{Result, TreasuryError};
use crate::ledger::{CashTransaction, TransactionKind};
use crate::monitoring::ResidentRecord;
use crate::period::StartPeriod;
use crate::schema::{LedgerColumns, ResidentColumns};
use crate::utils::{parse_currency, parse_sheet_date};
use log::debug;
use std::collections::BTreeMap;
use std::io::Read;

/// One data row of a sheet, keyed by trimmed header.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SheetRow {
    /// 1-based data row number, counting blank rows, so it matches the
    /// sheet row just below the header.
    pub position: usize,
    pub cells: BTreeMap<String, String>,
}

impl SheetRow {
    pub fn new(position: usize, cells: BTreeMap<String, String>) -> Self {
        Self { position, cells }
    }

    /// Trimmed cell value; headers match exactly first, then ignoring case.
    pub fn get(&self, column: &str) -> &str {
        let column = column.trim();
        self.cells
            .get(column)
            .or_else(|| {
                self.cells
                    .iter()
                    .find(|(header, _)| header.eq_ignore_ascii_case(column))
                    .map(|(_, value)| value)
            })
            .map(|v| v.trim())
            .unwrap_or("")
    }

    pub fn is_blank(&self) -> bool {
        self.cells.values().all(|v| v.trim().is_empty())
    }
}

/// Reads a CSV export. The first record is the header row.
pub fn read_sheet_csv<R: Read>(reader: R) -> Result<Vec<SheetRow>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let mut records = csv_reader.records();
    let headers: Vec<String> = match records.next() {
        Some(header) => header?.iter().map(|h| h.trim().to_string()).collect(),
        None => return Err(TreasuryError::MissingHeader),
    };

    let mut rows = Vec::new();
    for (idx, record) in records.enumerate() {
        let record = record?;
        let mut cells = BTreeMap::new();
        for (col, header) in headers.iter().enumerate() {
            if header.is_empty() {
                continue;
            }
            let value = record.get(col).unwrap_or("").to_string();
            cells.entry(header.clone()).or_insert(value);
        }

        let row = SheetRow::new(idx + 1, cells);
        if row.is_blank() {
            continue;
        }
        rows.push(row);
    }

    debug!("Read {} data rows with {} columns", rows.len(), headers.len());
    Ok(rows)
}

pub fn read_sheet_csv_str(content: &str) -> Result<Vec<SheetRow>> {
    read_sheet_csv(content.as_bytes())
}

impl ResidentRecord {
    /// Builds a resident from a dues-sheet row. Rows without a name are not
    /// residents (totals, notes, spacer rows) and yield `None`.
    pub fn from_row(row: &SheetRow, columns: &ResidentColumns) -> Option<Self> {
        let name = row.get(&columns.name);
        if name.is_empty() {
            debug!("Skipping dues row {}: no resident name", row.position);
            return None;
        }

        // Prefixed so a generated id never shadows a numbered resident.
        let id = match row.get(&columns.id) {
            "" => format!("row-{}", row.position),
            id => id.to_string(),
        };

        let identity = columns.identity_columns();
        let payments = parse_payment_columns(&row.cells, &identity);

        Some(Self {
            id,
            name: name.to_string(),
            block: row.get(&columns.block).to_string(),
            unit: row.get(&columns.unit).to_string(),
            start_period: StartPeriod::parse_lenient(row.get(&columns.start_period)),
            payments,
        })
    }
}

impl CashTransaction {
    /// Builds a transaction from a cash-sheet row. Rows without a readable
    /// date or a positive amount yield `None`.
    pub fn from_row(row: &SheetRow, columns: &LedgerColumns) -> Option<Self> {
        let Some(date) = parse_sheet_date(row.get(&columns.date)) else {
            debug!("Skipping cash row {}: unreadable date", row.position);
            return None;
        };

        let income = parse_currency(row.get(&columns.income)).filter(|v| *v != 0.0);
        let expense = parse_currency(row.get(&columns.expense)).filter(|v| *v != 0.0);

        let (kind, amount) = match (income, expense) {
            (Some(amount), None) if amount > 0.0 => (TransactionKind::Income, amount),
            (None, Some(amount)) if amount > 0.0 => (TransactionKind::Expense, amount),
            // A negative income is a refund/correction, i.e. money out.
            (Some(amount), None) => (TransactionKind::Expense, -amount),
            (None, Some(amount)) => (TransactionKind::Income, -amount),
            (Some(_), Some(_)) => {
                debug!(
                    "Skipping cash row {}: both income and expense filled",
                    row.position
                );
                return None;
            }
            (None, None) => {
                debug!("Skipping cash row {}: no amount", row.position);
                return None;
            }
        };

        Some(Self {
            date,
            description: row.get(&columns.description).to_string(),
            category: row.get(&columns.category).to_string(),
            kind,
            amount,
        })
    }
}

pub fn residents_from_rows(rows: &[SheetRow], columns: &ResidentColumns) -> Vec<ResidentRecord> {
    rows.iter()
        .filter_map(|row| ResidentRecord::from_row(row, columns))
        .collect()
}

pub fn transactions_from_rows(rows: &[SheetRow], columns: &LedgerColumns) -> Vec<CashTransaction> {
    rows.iter()
        .filter_map(|row| CashTransaction::from_row(row, columns))
        .collect()
}
