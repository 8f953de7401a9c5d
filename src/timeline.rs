use crate::monitoring::{summarize, PaymentEntry, ResidentRecord, ResidentStatus};
use crate::summary::PaymentSummary;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineYear {
    pub year: i32,
    pub months: Vec<PaymentEntry>,
    pub specials: Vec<PaymentEntry>,
    pub summary: PaymentSummary,
}

/// A resident's payment history grouped by year, oldest first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentTimeline {
    pub resident: ResidentRecord,
    pub years: Vec<TimelineYear>,
    pub summary: PaymentSummary,
}

impl PaymentTimeline {
    pub fn from_status(status: &ResidentStatus) -> Self {
        let mut grouped: BTreeMap<i32, (Vec<PaymentEntry>, Vec<PaymentEntry>)> = BTreeMap::new();

        for entry in &status.entries {
            let (months, specials) = grouped.entry(entry.key.year).or_default();
            if entry.is_special {
                specials.push(entry.clone());
            } else {
                months.push(entry.clone());
            }
        }

        let years = grouped
            .into_iter()
            .map(|(year, (months, specials))| TimelineYear {
                year,
                summary: summarize(&months),
                months,
                specials,
            })
            .collect();

        Self {
            resident: status.resident.clone(),
            years,
            summary: status.summary,
        }
    }

    pub fn year(&self, year: i32) -> Option<&TimelineYear> {
        self.years.iter().find(|y| y.year == year)
    }

    /// The most recent paid monthly entry, if any.
    pub fn last_payment(&self) -> Option<&PaymentEntry> {
        self.years
            .iter()
            .rev()
            .flat_map(|y| y.months.iter().rev())
            .find(|e| e.is_paid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::columns::RawPaymentFields;
    use crate::period::{StartPeriod, YearMonth};

    fn status() -> ResidentStatus {
        let payments = [
            ("2023/11", "50000"),
            ("2023/12", ""),
            ("2023/13", "100000"),
            ("2024/1", "50000"),
            ("2024/2", ""),
            ("2024/3", "50000"),
            ("2024/4", ""),
        ]
        .iter()
        .map(|(k, amount)| {
            (
                k.to_string(),
                RawPaymentFields {
                    date: None,
                    amount: (!amount.is_empty()).then(|| amount.to_string()),
                },
            )
        })
        .collect();

        let record = ResidentRecord {
            id: "7".to_string(),
            name: "Siti".to_string(),
            block: "C".to_string(),
            unit: "3".to_string(),
            start_period: StartPeriod::new(2023, 12),
            payments,
        };

        ResidentStatus::evaluate(
            &record,
            YearMonth::new(2024, 3).unwrap(),
            &BTreeMap::new(),
        )
    }

    #[test]
    fn test_groups_by_year() {
        let timeline = PaymentTimeline::from_status(&status());

        assert_eq!(timeline.years.len(), 2);
        let y2023 = timeline.year(2023).unwrap();
        assert_eq!(y2023.months.len(), 2);
        assert_eq!(y2023.specials.len(), 1);
        // 2023/11 precedes the start period
        assert_eq!(y2023.summary.total, 1);
        assert_eq!(y2023.summary.paid, 0);

        let y2024 = timeline.year(2024).unwrap();
        assert_eq!(y2024.months.len(), 4);
        assert_eq!(y2024.summary.total, 3);
        assert_eq!(y2024.summary.paid, 2);
    }

    #[test]
    fn test_year_summaries_add_up() {
        let timeline = PaymentTimeline::from_status(&status());
        let combined = timeline
            .years
            .iter()
            .fold(PaymentSummary::default(), |acc, y| acc.merge(&y.summary));
        assert_eq!(combined, timeline.summary);
    }

    #[test]
    fn test_last_payment() {
        let timeline = PaymentTimeline::from_status(&status());
        let last = timeline.last_payment().unwrap();
        assert_eq!(last.key.to_string(), "2024/3");
    }
}
