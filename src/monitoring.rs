use crate::columns::RawPaymentFields;
use crate::period::{PeriodKey, StartPeriod, YearMonth};
use crate::schema::DashboardConfig;
use crate::summary::{is_paid_amount, PaymentSummary};
use crate::utils::{natural_cmp, parse_leading_amount, parse_sheet_date};
use chrono::NaiveDate;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// One row of the dues sheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResidentRecord {
    pub id: String,
    pub name: String,
    pub block: String,
    pub unit: String,
    /// `None` means every period up to today is owed.
    pub start_period: Option<StartPeriod>,
    /// Raw payment fields keyed by bare period key (e.g. `"2024/3"`).
    pub payments: BTreeMap<String, RawPaymentFields>,
}

impl ResidentRecord {
    /// `"A-12"` style address used in tables.
    pub fn address(&self) -> String {
        match (self.block.is_empty(), self.unit.is_empty()) {
            (false, false) => format!("{}-{}", self.block, self.unit),
            (false, true) => self.block.clone(),
            (true, false) => self.unit.clone(),
            (true, true) => String::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Paid,
    /// Owed and not yet paid.
    Unpaid,
    /// Before the resident's start period.
    NotTracked,
    /// After the current month.
    Upcoming,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentEntry {
    pub key: PeriodKey,
    pub label: String,
    pub raw_date: String,
    pub raw_amount: String,
    pub paid_on: Option<NaiveDate>,
    pub amount: Option<f64>,
    pub is_paid: bool,
    pub counts_toward_total: bool,
    pub is_future: bool,
    pub is_special: bool,
    pub status: PaymentStatus,
}

impl PaymentEntry {
    pub fn evaluate(
        key: PeriodKey,
        raw: &RawPaymentFields,
        start: Option<StartPeriod>,
        today: YearMonth,
        special_label: Option<&str>,
    ) -> Self {
        let evaluation = key.evaluate(start, today);
        let is_paid = is_paid_amount(raw.amount_str());

        let status = if is_paid {
            PaymentStatus::Paid
        } else if evaluation.is_future {
            PaymentStatus::Upcoming
        } else if evaluation.counts_toward_total {
            PaymentStatus::Unpaid
        } else {
            PaymentStatus::NotTracked
        };

        Self {
            key,
            label: key.label(special_label),
            raw_date: raw.date_str().to_string(),
            raw_amount: raw.amount_str().to_string(),
            paid_on: parse_sheet_date(raw.date_str()),
            amount: parse_leading_amount(raw.amount_str()),
            is_paid,
            counts_toward_total: evaluation.counts_toward_total,
            is_future: evaluation.is_future,
            is_special: key.is_special(),
            status,
        }
    }
}

/// Summarizes entries that are not special levies and count toward the total.
pub fn summarize(entries: &[PaymentEntry]) -> PaymentSummary {
    PaymentSummary::aggregate(
        entries
            .iter()
            .map(|e| (e.is_special, e.counts_toward_total, e.is_paid)),
    )
}

/// A resident with every period evaluated, as shown on the monitoring table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResidentStatus {
    pub resident: ResidentRecord,
    pub entries: Vec<PaymentEntry>,
    pub summary: PaymentSummary,
}

impl ResidentStatus {
    pub fn evaluate(
        record: &ResidentRecord,
        today: YearMonth,
        special_labels: &BTreeMap<u32, String>,
    ) -> Self {
        let mut by_key: BTreeMap<PeriodKey, RawPaymentFields> = BTreeMap::new();

        for (raw_key, fields) in &record.payments {
            let Some(key) = PeriodKey::parse(raw_key) else {
                debug!(
                    "Resident '{}': ignoring malformed period key '{}'",
                    record.name, raw_key
                );
                continue;
            };
            match by_key.get_mut(&key) {
                Some(existing) => {
                    debug!(
                        "Resident '{}': merging duplicate column '{}' into period {}",
                        record.name, raw_key, key
                    );
                    existing.fill_missing(fields);
                }
                None => {
                    by_key.insert(key, fields.clone());
                }
            }
        }

        let entries: Vec<PaymentEntry> = by_key
            .iter()
            .map(|(key, fields)| {
                let label = special_labels.get(&key.ordinal).map(String::as_str);
                PaymentEntry::evaluate(*key, fields, record.start_period, today, label)
            })
            .collect();

        let summary = summarize(&entries);

        Self {
            resident: record.clone(),
            entries,
            summary,
        }
    }

    pub fn outstanding(&self) -> impl Iterator<Item = &PaymentEntry> {
        self.entries
            .iter()
            .filter(|e| e.status == PaymentStatus::Unpaid)
    }

    pub fn special_entries(&self) -> impl Iterator<Item = &PaymentEntry> {
        self.entries.iter().filter(|e| e.is_special)
    }
}

/// The monitoring view: every resident plus community-wide totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonitoringReport {
    pub organization_name: String,
    pub as_of: YearMonth,
    pub residents: Vec<ResidentStatus>,
    pub overall: PaymentSummary,
    pub fully_paid: usize,
    pub blocks: Vec<String>,
}

impl MonitoringReport {
    pub fn build(records: &[ResidentRecord], today: YearMonth, config: &DashboardConfig) -> Self {
        let mut residents: Vec<ResidentStatus> = records
            .iter()
            .map(|r| ResidentStatus::evaluate(r, today, &config.special_labels))
            .collect();

        residents.sort_by(|a, b| {
            a.resident
                .block
                .to_lowercase()
                .cmp(&b.resident.block.to_lowercase())
                .then_with(|| natural_cmp(&a.resident.unit, &b.resident.unit))
                .then_with(|| a.resident.name.cmp(&b.resident.name))
        });

        let overall = residents
            .iter()
            .fold(PaymentSummary::default(), |acc, s| acc.merge(&s.summary));
        let fully_paid = residents
            .iter()
            .filter(|s| s.summary.is_complete())
            .count();
        let blocks: Vec<String> = residents
            .iter()
            .map(|s| s.resident.block.clone())
            .filter(|b| !b.is_empty())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        info!(
            "Monitoring report as of {}: {} residents, {}/{} periods paid ({}%)",
            today,
            residents.len(),
            overall.paid,
            overall.total,
            overall.percentage
        );

        Self {
            organization_name: config.organization_name.clone(),
            as_of: today,
            residents,
            overall,
            fully_paid,
            blocks,
        }
    }

    /// Case-insensitive match on name, block, unit or `block-unit` address.
    pub fn search(&self, query: &str) -> Vec<&ResidentStatus> {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return self.residents.iter().collect();
        }

        self.residents
            .iter()
            .filter(|s| {
                let r = &s.resident;
                [&r.name, &r.block, &r.unit, &r.address()]
                    .iter()
                    .any(|field| field.to_lowercase().contains(&query))
            })
            .collect()
    }

    pub fn for_block(&self, block: &str) -> Vec<&ResidentStatus> {
        self.residents
            .iter()
            .filter(|s| s.resident.block.eq_ignore_ascii_case(block.trim()))
            .collect()
    }

    /// Residents with unpaid periods, most periods owed first.
    pub fn in_arrears(&self) -> Vec<&ResidentStatus> {
        let mut owing: Vec<&ResidentStatus> = self
            .residents
            .iter()
            .filter(|s| s.summary.unpaid > 0)
            .collect();
        owing.sort_by(|a, b| b.summary.unpaid.cmp(&a.summary.unpaid));
        owing
    }

    pub fn find(&self, resident_id: &str) -> Option<&ResidentStatus> {
        self.residents.iter().find(|s| s.resident.id == resident_id)
    }
}
