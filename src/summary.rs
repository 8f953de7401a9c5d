use crate::utils::parse_leading_amount;
use serde::{Deserialize, Serialize};

/// An amount cell counts as paid when it reads as a finite positive number.
pub fn is_paid_amount(raw: &str) -> bool {
    parse_leading_amount(raw).is_some_and(|v| v > 0.0)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentSummary {
    pub paid: u32,
    pub unpaid: u32,
    pub total: u32,
    pub percentage: u32,
}

impl PaymentSummary {
    pub fn from_counts(paid: u32, total: u32) -> Self {
        let paid = paid.min(total);
        let percentage = if total == 0 {
            0
        } else {
            (paid as f64 / total as f64 * 100.0).round() as u32
        };

        Self {
            paid,
            unpaid: total - paid,
            total,
            percentage,
        }
    }

    /// Folds `(is_special, counts_toward_total, is_paid)` triples.
    /// Special levies never enter the counts.
    pub fn aggregate<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (bool, bool, bool)>,
    {
        let (paid, total) = entries
            .into_iter()
            .filter(|(is_special, counts, _)| !is_special && *counts)
            .fold((0u32, 0u32), |(paid, total), (_, _, is_paid)| {
                (paid + u32::from(is_paid), total + 1)
            });

        Self::from_counts(paid, total)
    }

    /// Combines two summaries, recomputing the percentage over the union.
    pub fn merge(&self, other: &Self) -> Self {
        Self::from_counts(self.paid + other.paid, self.total + other.total)
    }

    pub fn is_complete(&self) -> bool {
        self.total > 0 && self.paid == self.total
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_paid_amount() {
        assert!(is_paid_amount("50000"));
        assert!(is_paid_amount("Rp 50.000"));
        assert!(!is_paid_amount(""));
        assert!(!is_paid_amount("0"));
        assert!(!is_paid_amount("-50000"));
        assert!(!is_paid_amount("belum"));
    }

    #[test]
    fn test_zero_total_has_zero_percentage() {
        let summary = PaymentSummary::aggregate(Vec::<(bool, bool, bool)>::new());
        assert_eq!(summary, PaymentSummary::default());
        assert_eq!(summary.percentage, 0);
        assert!(!summary.is_complete());
    }

    #[test]
    fn test_special_and_excluded_entries_are_ignored() {
        let summary = PaymentSummary::aggregate(vec![
            (false, true, true),
            (false, true, false),
            (false, false, true),
            (true, true, true),
            (true, true, false),
        ]);
        assert_eq!(summary.total, 2);
        assert_eq!(summary.paid, 1);
        assert_eq!(summary.unpaid, 1);
        assert_eq!(summary.percentage, 50);
    }

    #[test]
    fn test_percentage_rounds_to_nearest() {
        assert_eq!(PaymentSummary::from_counts(1, 3).percentage, 33);
        assert_eq!(PaymentSummary::from_counts(2, 3).percentage, 67);
        assert_eq!(PaymentSummary::from_counts(1, 8).percentage, 13);
        assert_eq!(PaymentSummary::from_counts(3, 3).percentage, 100);
    }

    #[test]
    fn test_merge() {
        let a = PaymentSummary::from_counts(3, 4);
        let b = PaymentSummary::from_counts(1, 4);
        let merged = a.merge(&b);
        assert_eq!(merged.paid, 4);
        assert_eq!(merged.total, 8);
        assert_eq!(merged.unpaid, 4);
        assert_eq!(merged.percentage, 50);
        assert!(PaymentSummary::from_counts(4, 4).is_complete());
    }
}
