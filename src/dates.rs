use time::{format_description::BorrowedFormatItem, macros::format_description, Date, OffsetDateTime};

use crate::error::ApiError;

const ISO_DATE: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");

pub fn today_utc() -> Date {
    OffsetDateTime::now_utc().date()
}

/// Parses a `YYYY-MM-DD` query/body parameter.
pub fn parse_iso(s: &str) -> Result<Date, ApiError> {
    Date::parse(s.trim(), ISO_DATE).map_err(|_| {
        ApiError::Validation("Định dạng ngày không hợp lệ. Dùng YYYY-MM-DD".into())
    })
}

pub fn iso(date: Date) -> String {
    format!(
        "{:04}-{:02}-{:02}",
        date.year(),
        u8::from(date.month()),
        date.day()
    )
}

pub fn dd_mm_yyyy(date: Date) -> String {
    format!(
        "{:02}/{:02}/{:04}",
        date.day(),
        u8::from(date.month()),
        date.year()
    )
}

pub fn dd_mm(date: Date) -> String {
    format!("{:02}/{:02}", date.day(), u8::from(date.month()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    #[test]
    fn parses_and_formats_iso_dates() {
        let d = parse_iso("2025-03-07").expect("valid date");
        assert_eq!(d, date!(2025 - 03 - 07));
        assert_eq!(iso(d), "2025-03-07");
        assert_eq!(dd_mm_yyyy(d), "07/03/2025");
        assert_eq!(dd_mm(d), "07/03");
    }

    #[test]
    fn rejects_malformed_dates() {
        assert!(parse_iso("07/03/2025").is_err());
        assert!(parse_iso("2025-13-01").is_err());
        assert!(parse_iso("").is_err());
    }

    #[test]
    fn trims_surrounding_whitespace() {
        assert!(parse_iso(" 2025-01-01 ").is_ok());
    }
}
