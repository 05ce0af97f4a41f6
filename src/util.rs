// Utility helpers for parsing, unit conversion and number formatting.
//
// CSV cleanup lives here so the loader can hand the engine typed values.
use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime};
use num_format::{Locale, ToFormattedString};

/// Kilometers to statute miles.
pub const MILES_PER_KM: f64 = 0.621371;

pub fn km_to_miles(km: f64) -> f64 {
    km * MILES_PER_KM
}

/// Parse a string-like value into `f64` while being forgiving about
/// formatting issues that are common in CSV exports.
///
/// - Trims whitespace.
/// - Rejects values that contain alphabetic characters.
/// - Strips thousands separators like `","` before parsing.
pub fn parse_f64_safe(s: Option<&str>) -> Option<f64> {
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    if s.chars().any(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    let s = s.replace(',', "");
    s.parse::<f64>().ok()
}

/// Counts sometimes come out of spreadsheets as `12.0`; accept those too.
pub fn parse_u32_safe(s: Option<&str>) -> Option<u32> {
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(v) = s.parse::<u32>() {
        return Some(v);
    }
    let v = parse_f64_safe(Some(s))?;
    if v.fract() == 0.0 && v >= 0.0 && v <= u32::MAX as f64 {
        Some(v as u32)
    } else {
        None
    }
}

pub fn parse_date_safe(s: Option<&str>) -> Option<NaiveDate> {
    // `YYYY-MM-DD`, optionally followed by a midnight-style time component.
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
                .ok()
                .map(|dt| dt.date())
        })
}

pub fn parse_text(s: Option<String>) -> Option<String> {
    let s = s?.trim().to_string();
    (!s.is_empty()).then_some(s)
}

/// Arithmetic mean, `None` for an empty slice so callers never see NaN.
pub fn mean(v: &[f64]) -> Option<f64> {
    if v.is_empty() {
        return None;
    }
    let sum: f64 = v.iter().copied().sum();
    Some(sum / v.len() as f64)
}

/// The Monday that opens the 7-day week containing `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_monday() as i64)
}

pub fn format_number(n: f64, decimals: usize) -> String {
    // Fixed decimals plus locale thousands separators (e.g., `1,234,567.89`).
    let neg = n.is_sign_negative() && n != 0.0;
    let s = format!("{:.*}", decimals, n.abs());
    let mut parts = s.split('.');
    let int_part = parts.next().unwrap_or("0");
    let frac_part = parts.next();
    // Beyond i64 (or non-finite): skip the separators.
    let Ok(int_val) = int_part.parse::<i64>() else {
        return format!("{:.*}", decimals, n);
    };
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

/// Share in `[0, 1]` rendered as a whole percentage, e.g. `0.667` -> `67%`.
pub fn format_percent(share: f64) -> String {
    format!("{}%", format_number(share * 100.0, 0))
}

/// Render an optional KPI, using an em-dash placeholder for "no value".
pub fn format_optional(n: Option<f64>, decimals: usize) -> String {
    match n {
        Some(v) => format_number(v, decimals),
        None => "\u{2014}".to_string(),
    }
}

pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    n.to_formatted_string(&Locale::en)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_week_start_wednesday_maps_to_monday() {
        // 2024-01-03 is a Wednesday
        assert_eq!(week_start(d("2024-01-03")), d("2024-01-01"));
    }

    #[test]
    fn test_week_start_monday_and_sunday() {
        assert_eq!(week_start(d("2024-01-08")), d("2024-01-08"));
        assert_eq!(week_start(d("2024-01-14")), d("2024-01-08"));
    }

    #[test]
    fn test_mean_empty_is_none() {
        assert_eq!(mean(&[]), None);
        assert_eq!(mean(&[2.0, 4.0]), Some(3.0));
    }

    #[test]
    fn test_parse_helpers() {
        assert_eq!(parse_f64_safe(Some(" 1,250.5 ")), Some(1250.5));
        assert_eq!(parse_f64_safe(Some("n/a")), None);
        assert_eq!(parse_u32_safe(Some("12.0")), Some(12));
        assert_eq!(parse_u32_safe(Some("-3")), None);
        assert_eq!(parse_date_safe(Some("2024-02-29 00:00:00")), Some(d("2024-02-29")));
        assert_eq!(parse_text(Some("  ".to_string())), None);
    }

    #[test]
    fn test_format_number_and_percent() {
        assert_eq!(format_number(1234567.891, 2), "1,234,567.89");
        assert_eq!(format_number(-9.32, 1), "-9.3");
        assert_eq!(format_number(-0.01, 1), "0.0");
        assert_eq!(format_percent(2.0 / 3.0), "67%");
        assert_eq!(format_optional(None, 1), "\u{2014}");
    }

    #[test]
    fn test_format_number_outside_i64_keeps_digits() {
        assert_eq!(format_number(1e20, 0), "100000000000000000000");
        assert_eq!(format_number(-1e20, 1), "-100000000000000000000.0");
        assert_eq!(format_number(f64::INFINITY, 2), "inf");
    }

    #[test]
    fn test_km_to_miles_factor() {
        assert_eq!(km_to_miles(10.0), 10.0 * 0.621371);
    }
}
