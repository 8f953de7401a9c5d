use chrono::{Days, NaiveDate};
use std::cmp::Ordering;

const MONTH_NAMES: [(u32, &[&str]); 12] = [
    (1, &["jan", "januari", "january"]),
    (2, &["feb", "februari", "february", "peb", "pebruari"]),
    (3, &["mar", "maret", "march"]),
    (4, &["apr", "april"]),
    (5, &["mei", "may"]),
    (6, &["jun", "juni", "june"]),
    (7, &["jul", "juli", "july"]),
    (8, &["agu", "agt", "agus", "agustus", "aug", "august"]),
    (9, &["sep", "sept", "september"]),
    (10, &["okt", "oktober", "oct", "october"]),
    (11, &["nov", "nop", "november", "nopember"]),
    (12, &["des", "desember", "dec", "december"]),
];

const MONTH_ABBREVIATIONS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

const SHEET_DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%d/%m/%Y", "%d-%m-%Y", "%Y/%m/%d"];

pub fn last_day_of_month(year: i32, month: u32) -> NaiveDate {
    let next_month = if month == 12 { 1 } else { month + 1 };
    let next_year = if month == 12 { year + 1 } else { year };

    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|d| d.checked_sub_days(Days::new(1)))
        .unwrap_or(NaiveDate::MAX)
}

/// Resolves an English or Indonesian month name (full or abbreviated,
/// case-insensitive) to its 1-based number.
pub fn month_from_name(name: &str) -> Option<u32> {
    let name = name.trim().trim_end_matches('.').to_lowercase();
    if name.is_empty() {
        return None;
    }

    MONTH_NAMES
        .iter()
        .find(|(_, names)| names.contains(&name.as_str()))
        .map(|(month, _)| *month)
}

pub fn month_abbreviation(month: u32) -> Option<&'static str> {
    month
        .checked_sub(1)
        .and_then(|idx| MONTH_ABBREVIATIONS.get(idx as usize))
        .copied()
}

/// Parses a date cell as exported by the spreadsheet. Blank or
/// unrecognised cells yield `None`.
pub fn parse_sheet_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    SHEET_DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
}

/// Keeps digits, `.` and `-`, then reads the longest leading number.
///
/// Mirrors how the dashboard front-end reads amount cells: `"Rp 50.000"`
/// becomes `50.0` and `"Rp -"` is not a number.
pub fn parse_leading_amount(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();
    let bytes = cleaned.as_bytes();

    let mut end = 0;
    if bytes.first() == Some(&b'-') {
        end = 1;
    }

    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let int_digits = end - int_start;

    let mut frac_digits = 0;
    if end < bytes.len() && bytes[end] == b'.' {
        let mut scan = end + 1;
        while scan < bytes.len() && bytes[scan].is_ascii_digit() {
            scan += 1;
        }
        frac_digits = scan - end - 1;
        if frac_digits > 0 {
            end = scan;
        }
    }

    if int_digits + frac_digits == 0 {
        return None;
    }

    cleaned[..end].parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parses a currency cell in Indonesian (`1.250.000,50`) or English
/// (`1,250,000.50`) notation. Parentheses or a leading minus mark a
/// negative amount.
pub fn parse_currency(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    // "Rp 50.000,-" marks a whole amount; the trailing dash is not a sign.
    let body = trimmed
        .trim_end_matches(|c: char| matches!(c, '-' | ',' | '.') || c.is_whitespace());
    let first_digit = body.find(|c: char| c.is_ascii_digit())?;
    let (prefix, digits) = body.split_at(first_digit);
    let negative = prefix.contains('-') || (trimmed.starts_with('(') && trimmed.ends_with(')'));

    let cleaned: String = digits
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == ',')
        .collect();

    let decimal_sep = match (cleaned.rfind('.'), cleaned.rfind(',')) {
        (Some(dot), Some(comma)) => Some(if dot > comma { '.' } else { ',' }),
        (Some(_), None) => single_separator_role(&cleaned, '.'),
        (None, Some(_)) => single_separator_role(&cleaned, ','),
        (None, None) => None,
    };

    let normalized: String = cleaned
        .chars()
        .filter_map(|c| match c {
            '0'..='9' => Some(c),
            c if Some(c) == decimal_sep => Some('.'),
            _ => None,
        })
        .collect();

    let value = normalized.parse::<f64>().ok().filter(|v| v.is_finite())?;
    Some(if negative { -value } else { value })
}

/// A separator used once with anything but exactly three trailing digits is
/// a decimal point; otherwise it groups thousands.
fn single_separator_role(cleaned: &str, sep: char) -> Option<char> {
    let occurrences = cleaned.matches(sep).count();
    if occurrences > 1 {
        return None;
    }

    let trailing = cleaned
        .rsplit(sep)
        .next()
        .map(|tail| tail.len())
        .unwrap_or(0);
    if trailing == 3 {
        None
    } else {
        Some(sep)
    }
}

/// Orders unit numbers like `"2"`, `"10"`, `"10A"` numerically first.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    natural_key(a).cmp(&natural_key(b))
}

fn natural_key(s: &str) -> (u64, String) {
    let s = s.trim();
    let digits: String = s.chars().take_while(|c| c.is_ascii_digit()).collect();
    let number = digits.parse::<u64>().unwrap_or(u64::MAX);
    (number, s.to_lowercase())
}
