// src/export/excel_date.rs

use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// Prova a interpretare una stringa come data o data/ora,
/// restituendo il *seriale Excel* + formattazione numerica.
///
/// Timestamps with an offset are written as their local wall-clock time.
pub(crate) fn parse_to_excel_date(s: &str) -> Option<(&'static str, f64)> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return excel_serial(&dt.naive_local()).map(|v| ("yyyy-mm-dd hh:mm", v));
    }

    let dt_formats = ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M"];
    for fmt in dt_formats.iter() {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return excel_serial(&dt).map(|v| ("yyyy-mm-dd hh:mm", v));
        }
    }

    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return d
            .and_hms_opt(0, 0, 0)
            .and_then(|dt| excel_serial(&dt))
            .map(|v| ("yyyy-mm-dd", v));
    }

    None
}

fn excel_serial(dt: &NaiveDateTime) -> Option<f64> {
    let excel_epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;
    let secs = (*dt - excel_epoch).num_seconds() as f64;
    Some(secs / 86_400.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dates_and_timestamps_become_serials() {
        assert_eq!(parse_to_excel_date("2025-01-01"), Some(("yyyy-mm-dd", 45658.0)));
        let (fmt, v) = parse_to_excel_date("2025-01-01T12:00:00+02:00").unwrap();
        assert_eq!(fmt, "yyyy-mm-dd hh:mm");
        assert_eq!(v, 45658.5);
        assert_eq!(parse_to_excel_date("Chiller 1"), None);
        assert_eq!(parse_to_excel_date("12.5"), None);
    }
}
