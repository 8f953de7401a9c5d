//! Turns the flat column layout of the dues sheet into per-period fields.
//!
//! Payment columns come in pairs named `"<year>/<ordinal> (tgl)"` for the
//! payment date and `"<year>/<ordinal> (jml)"` for the amount.

use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

const DATE_SUFFIX: &str = "(tgl)";
const AMOUNT_SUFFIX: &str = "(jml)";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldKind {
    Date,
    Amount,
}

/// The raw date and amount cells recorded for one period.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawPaymentFields {
    pub date: Option<String>,
    pub amount: Option<String>,
}

impl RawPaymentFields {
    pub fn set(&mut self, kind: FieldKind, value: String) {
        match kind {
            FieldKind::Date => self.date = Some(value),
            FieldKind::Amount => self.amount = Some(value),
        }
    }

    /// Fills fields still missing here from `other`.
    pub fn fill_missing(&mut self, other: &RawPaymentFields) {
        if self.date.is_none() {
            self.date = other.date.clone();
        }
        if self.amount.is_none() {
            self.amount = other.amount.clone();
        }
    }

    pub fn date_str(&self) -> &str {
        self.date.as_deref().unwrap_or("")
    }

    pub fn amount_str(&self) -> &str {
        self.amount.as_deref().unwrap_or("")
    }
}

/// Splits `"2024/3 (jml)"` into its bare key and field kind.
pub fn split_column_name(column: &str) -> Option<(&str, FieldKind)> {
    let column = column.trim();
    let (head, kind) = strip_suffix_ignore_case(column, DATE_SUFFIX)
        .map(|head| (head, FieldKind::Date))
        .or_else(|| {
            strip_suffix_ignore_case(column, AMOUNT_SUFFIX).map(|head| (head, FieldKind::Amount))
        })?;

    let key = head.trim();
    if key.is_empty() {
        return None;
    }
    Some((key, kind))
}

fn strip_suffix_ignore_case<'a>(s: &'a str, suffix: &str) -> Option<&'a str> {
    let split = s.len().checked_sub(suffix.len())?;
    if !s.is_char_boundary(split) {
        return None;
    }
    let (head, tail) = s.split_at(split);
    tail.eq_ignore_ascii_case(suffix).then_some(head)
}

/// Groups payment columns by bare period key.
///
/// Identity columns and columns without a date/amount suffix are dropped.
/// Keys are not validated here; a key that is not `year/ordinal` is left for
/// the evaluator to exclude.
pub fn parse_payment_columns<'a, I>(
    cells: I,
    identity_columns: &[&str],
) -> BTreeMap<String, RawPaymentFields>
where
    I: IntoIterator<Item = (&'a String, &'a String)>,
{
    let mut periods: BTreeMap<String, RawPaymentFields> = BTreeMap::new();

    for (column, value) in cells {
        let column_trimmed = column.trim();
        if identity_columns
            .iter()
            .any(|identity| identity.trim().eq_ignore_ascii_case(column_trimmed))
        {
            continue;
        }

        let Some((key, kind)) = split_column_name(column_trimmed) else {
            debug!("Skipping non-payment column '{}'", column_trimmed);
            continue;
        };

        let entry = periods.entry(key.to_string()).or_default();
        let value = value.trim();
        if !value.is_empty() {
            entry.set(kind, value.to_string());
        }
    }

    periods
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[(&str, &str)]) -> BTreeMap<String, String> {
        cells
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_split_column_name() {
        assert_eq!(
            split_column_name("2024/3 (tgl)"),
            Some(("2024/3", FieldKind::Date))
        );
        assert_eq!(
            split_column_name(" 2024/13(JML) "),
            Some(("2024/13", FieldKind::Amount))
        );
        assert_eq!(split_column_name("Nama"), None);
        assert_eq!(split_column_name("(jml)"), None);
    }

    #[test]
    fn test_parse_payment_columns_groups_pairs() {
        let cells = row(&[
            ("Nama", "Budi"),
            ("Blok", "A"),
            ("2024/1 (tgl)", "05/01/2024"),
            ("2024/1 (jml)", "50000"),
            ("2024/2 (jml)", ""),
            ("2024/13 (jml)", "100000"),
            ("Catatan", "pindahan"),
        ]);

        let periods = parse_payment_columns(&cells, &["Nama", "Blok"]);

        assert_eq!(periods.len(), 3);
        let jan = &periods["2024/1"];
        assert_eq!(jan.date.as_deref(), Some("05/01/2024"));
        assert_eq!(jan.amount.as_deref(), Some("50000"));

        let feb = &periods["2024/2"];
        assert_eq!(feb.amount, None);
        assert_eq!(feb.amount_str(), "");

        assert_eq!(periods["2024/13"].amount_str(), "100000");
        assert!(!periods.contains_key("Catatan"));
    }

    #[test]
    fn test_identity_columns_are_excluded_even_with_suffix() {
        let cells = row(&[("Mulai (tgl)", "2024/1"), ("2024/4 (tgl)", "01/04/2024")]);
        let periods = parse_payment_columns(&cells, &["mulai (tgl)"]);
        assert_eq!(periods.len(), 1);
        assert!(periods.contains_key("2024/4"));
    }

    #[test]
    fn test_malformed_keys_are_kept_for_evaluator() {
        let cells = row(&[("Lain-lain (jml)", "20000")]);
        let periods = parse_payment_columns(&cells, &[]);
        assert!(periods.contains_key("Lain-lain"));
    }
}
