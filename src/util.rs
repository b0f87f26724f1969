// Utility helpers for parsing and number formatting.
//
// This module centralizes the "dirty" CSV/workbook number handling so the
// aggregator can assume typed, optional values, and keeps all string
// formatting in one place for the rendering step.
use num_format::{Locale, ToFormattedString};

/// Parse a string-like value into `f64` while being forgiving about
/// formatting issues that are common in roster exports.
///
/// - Trims whitespace.
/// - Rejects values that contain alphabetic characters (`"TBA"`, `"N/A"`).
/// - Strips thousands separators like `","` before parsing.
/// - Returns `None` for anything that cannot be safely parsed.
pub fn parse_f64_safe(s: Option<&str>) -> Option<f64> {
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    if s.chars().any(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    let s = s.replace(',', "");
    s.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Trimmed owned string, empty when the field is missing.
pub fn clean_text(s: Option<String>) -> String {
    s.map(|v| v.trim().to_string()).unwrap_or_default()
}

pub fn format_number(n: f64, decimals: usize) -> String {
    // Fixed decimals plus locale-aware thousands separators (`1,234,567.89`).
    let neg = n.is_sign_negative() && n != 0.0;
    let s = format!("{:.*}", decimals, n.abs());
    let mut parts = s.split('.');
    let int_part = parts.next().unwrap_or("0");
    let frac_part = parts.next();
    let int_val: i64 = int_part.parse().unwrap_or(0);
    let mut res = int_val.to_formatted_string(&Locale::en);
    if let Some(frac) = frac_part {
        if decimals > 0 {
            res.push('.');
            res.push_str(frac);
        }
    }
    if neg && res.chars().any(|c| c.is_ascii_digit() && c != '0') {
        format!("-{}", res)
    } else {
        res
    }
}

pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    // Counts in console messages (e.g., `1,204 sections loaded`).
    n.to_formatted_string(&Locale::en)
}

/// Currency rendering for Generated FTE values: `$1,234.56`.
pub fn money(n: f64) -> String {
    let body = format_number(n.abs(), 2);
    if n < 0.0 && body.chars().any(|c| c.is_ascii_digit() && c != '0') {
        format!("-${}", body)
    } else {
        format!("${}", body)
    }
}

/// Inverse of [`money`]; accepts `$1,234.56` and `-$1,234.56`.
pub fn parse_money(s: &str) -> Option<f64> {
    let s = s.trim();
    let (neg, rest) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s),
    };
    let rest = rest.strip_prefix('$').unwrap_or(rest);
    let v = parse_f64_safe(Some(rest))?;
    Some(if neg { -v } else { v })
}

/// Plain rendering for optional numbers coming straight from the roster:
/// whole numbers print without decimals, missing values print blank.
pub fn display_number(v: Option<f64>) -> String {
    match v {
        Some(n) if n.fract() == 0.0 && n.abs() < 1e15 => format!("{}", n as i64),
        Some(n) => format!("{}", n),
        None => String::new(),
    }
}

/// Total FTE rendering with three decimals, blank when missing.
pub fn display_fte(v: Option<f64>) -> String {
    v.map(|n| format!("{:.3}", n)).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_f64_safe_handles_roster_noise() {
        assert_eq!(parse_f64_safe(Some(" 30 ")), Some(30.0));
        assert_eq!(parse_f64_safe(Some("1,250.5")), Some(1250.5));
        assert_eq!(parse_f64_safe(Some("TBA")), None);
        assert_eq!(parse_f64_safe(Some("")), None);
        assert_eq!(parse_f64_safe(None), None);
    }

    #[test]
    fn format_number_inserts_separators() {
        assert_eq!(format_number(1234567.891, 2), "1,234,567.89");
        assert_eq!(format_number(0.0, 2), "0.00");
        assert_eq!(format_number(-42.5, 1), "-42.5");
        assert_eq!(format_number(999.0, 0), "999");
    }

    #[test]
    fn money_formatting() {
        assert_eq!(money(9880.0), "$9,880.00");
        assert_eq!(money(1000000.99), "$1,000,000.99");
        assert_eq!(money(0.0), "$0.00");
        assert_eq!(money(-500.0), "-$500.00");
    }

    #[test]
    fn money_parses_back_to_two_decimals() {
        for v in [0.0, 12.345, 9880.0, 1_234_567.891, -77.1] {
            let parsed = parse_money(&money(v)).unwrap();
            assert!((parsed - v).abs() <= 0.005 + 1e-9, "{} -> {}", v, parsed);
        }
        assert_eq!(parse_money("not money"), None);
    }

    #[test]
    fn display_helpers() {
        assert_eq!(display_number(Some(30.0)), "30");
        assert_eq!(display_number(Some(12.5)), "12.5");
        assert_eq!(display_number(None), "");
        assert_eq!(display_fte(Some(5.0)), "5.000");
        assert_eq!(display_fte(None), "");
    }
}
