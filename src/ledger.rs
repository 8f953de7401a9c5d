use crate::utils::last_day_of_month;
use chrono::{Datelike, NaiveDate};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const UNCATEGORIZED: &str = "Uncategorized";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Income,
    Expense,
}

/// One row of the cash sheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CashTransaction {
    pub date: NaiveDate,
    pub description: String,
    pub category: String,
    pub kind: TransactionKind,
    /// Always positive; `kind` carries the direction.
    pub amount: f64,
}

impl CashTransaction {
    pub fn signed_amount(&self) -> f64 {
        match self.kind {
            TransactionKind::Income => self.amount,
            TransactionKind::Expense => -self.amount,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MonthlyCashFlow {
    pub income: f64,
    pub expense: f64,
    pub net: f64,
    pub closing_balance: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryTotal {
    pub income: f64,
    pub expense: f64,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerSummary {
    pub opening_balance: f64,
    pub total_income: f64,
    pub total_expense: f64,
    pub closing_balance: f64,
    /// Keyed by the last day of each month that has activity.
    pub monthly: BTreeMap<NaiveDate, MonthlyCashFlow>,
    pub by_category: BTreeMap<String, CategoryTotal>,
    /// Sorted by date, oldest first; same-day rows keep sheet order.
    pub transactions: Vec<CashTransaction>,
}

impl LedgerSummary {
    pub fn build(transactions: &[CashTransaction], opening_balance: f64) -> Self {
        let mut sorted = transactions.to_vec();
        sorted.sort_by_key(|t| t.date);

        let mut monthly: BTreeMap<NaiveDate, MonthlyCashFlow> = BTreeMap::new();
        let mut by_category: BTreeMap<String, CategoryTotal> = BTreeMap::new();
        let mut total_income = 0.0;
        let mut total_expense = 0.0;

        for tx in &sorted {
            let month_end = last_day_of_month(tx.date.year(), tx.date.month());
            let flow = monthly.entry(month_end).or_default();
            let category = by_category
                .entry(category_name(&tx.category).to_string())
                .or_default();
            category.count += 1;

            match tx.kind {
                TransactionKind::Income => {
                    total_income += tx.amount;
                    flow.income += tx.amount;
                    category.income += tx.amount;
                }
                TransactionKind::Expense => {
                    total_expense += tx.amount;
                    flow.expense += tx.amount;
                    category.expense += tx.amount;
                }
            }
        }

        let mut balance = opening_balance;
        for flow in monthly.values_mut() {
            flow.net = flow.income - flow.expense;
            balance += flow.net;
            flow.closing_balance = balance;
        }

        debug!(
            "Ledger built from {} transactions across {} months",
            sorted.len(),
            monthly.len()
        );

        Self {
            opening_balance,
            total_income,
            total_expense,
            closing_balance: opening_balance + total_income - total_expense,
            monthly,
            by_category,
            transactions: sorted,
        }
    }

    /// The `n` most recent transactions, newest first.
    pub fn recent(&self, n: usize) -> Vec<&CashTransaction> {
        self.transactions.iter().rev().take(n).collect()
    }

    /// Balance after each transaction, in date order.
    pub fn running_balance(&self) -> Vec<(&CashTransaction, f64)> {
        let mut balance = self.opening_balance;
        self.transactions
            .iter()
            .map(|tx| {
                balance += tx.signed_amount();
                (tx, balance)
            })
            .collect()
    }

    pub fn month(&self, year: i32, month: u32) -> Option<&MonthlyCashFlow> {
        if !(1..=12).contains(&month) {
            return None;
        }
        self.monthly.get(&last_day_of_month(year, month))
    }
}

fn category_name(raw: &str) -> &str {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        UNCATEGORIZED
    } else {
        trimmed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tx(y: i32, m: u32, d: u32, category: &str, kind: TransactionKind, amount: f64) -> CashTransaction {
        CashTransaction {
            date: NaiveDate::from_ymd_opt(y, m, d).unwrap(),
            description: format!("{} {}", category, d),
            category: category.to_string(),
            kind,
            amount,
        }
    }

    fn sample() -> Vec<CashTransaction> {
        vec![
            tx(2024, 2, 3, "Kebersihan", TransactionKind::Expense, 150_000.0),
            tx(2024, 1, 10, "Iuran", TransactionKind::Income, 500_000.0),
            tx(2024, 1, 20, "Keamanan", TransactionKind::Expense, 200_000.0),
            tx(2024, 2, 10, "Iuran", TransactionKind::Income, 450_000.0),
            tx(2024, 2, 28, "", TransactionKind::Expense, 25_000.0),
        ]
    }

    #[test]
    fn test_totals_and_closing_balance() {
        let ledger = LedgerSummary::build(&sample(), 1_000_000.0);

        assert!((ledger.total_income - 950_000.0).abs() < 0.01);
        assert!((ledger.total_expense - 375_000.0).abs() < 0.01);
        assert!((ledger.closing_balance - 1_575_000.0).abs() < 0.01);
    }

    #[test]
    fn test_monthly_flow_carries_balance_forward() {
        let ledger = LedgerSummary::build(&sample(), 1_000_000.0);

        assert_eq!(ledger.monthly.len(), 2);
        let jan = ledger.month(2024, 1).unwrap();
        assert!((jan.net - 300_000.0).abs() < 0.01);
        assert!((jan.closing_balance - 1_300_000.0).abs() < 0.01);

        let feb = ledger.month(2024, 2).unwrap();
        assert!((feb.income - 450_000.0).abs() < 0.01);
        assert!((feb.expense - 175_000.0).abs() < 0.01);
        assert!((feb.closing_balance - ledger.closing_balance).abs() < 0.01);

        assert!(ledger.month(2024, 3).is_none());
        assert!(ledger.month(2024, 13).is_none());
    }

    #[test]
    fn test_categories() {
        let ledger = LedgerSummary::build(&sample(), 0.0);

        let dues = &ledger.by_category["Iuran"];
        assert_eq!(dues.count, 2);
        assert!((dues.income - 950_000.0).abs() < 0.01);
        assert!(ledger.by_category.contains_key(UNCATEGORIZED));
    }

    #[test]
    fn test_recent_and_running_balance() {
        let ledger = LedgerSummary::build(&sample(), 0.0);

        let recent = ledger.recent(2);
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].date, NaiveDate::from_ymd_opt(2024, 2, 28).unwrap());

        let running = ledger.running_balance();
        assert_eq!(running.len(), 5);
        assert!((running[0].1 - 500_000.0).abs() < 0.01);
        let (_, last) = running.last().unwrap();
        assert!((last - ledger.closing_balance).abs() < 0.01);
    }

    #[test]
    fn test_empty_ledger() {
        let ledger = LedgerSummary::build(&[], 250_000.0);
        assert!(ledger.monthly.is_empty());
        assert!((ledger.closing_balance - 250_000.0).abs() < 0.01);
        assert!(ledger.recent(5).is_empty());
    }
}
