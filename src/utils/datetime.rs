//! Date utility functions
//!
//! Task dates travel as `YYYY-MM-DD` strings (the format of an HTML date input,
//! which the task API inherited). This module parses them, renders them for
//! cards, and provides the serde adapter used by [`crate::backend::Task`].

use chrono::{Datelike, Local, NaiveDate};

/// Date format used by the task API and the task form
pub const TASK_DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse a date string in YYYY-MM-DD format to NaiveDate
pub fn parse_date(date_str: &str) -> Result<NaiveDate, chrono::ParseError> {
    NaiveDate::parse_from_str(date_str.trim(), TASK_DATE_FORMAT)
}

/// Format a NaiveDate to YYYY-MM-DD string
pub fn format_ymd(d: NaiveDate) -> String {
    d.format(TASK_DATE_FORMAT).to_string()
}

/// Format current local date to YYYY-MM-DD string
pub fn format_today() -> String {
    format_ymd(Local::now().date_naive())
}

/// Format an optional task date for display, using "-" when unset
pub fn display_date(date: Option<NaiveDate>) -> String {
    date.map(format_ymd).unwrap_or_else(|| "-".to_string())
}

/// Short relative description of a date compared to `today`
///
/// Used next to the end date on task cards ("due today", "2 days overdue").
pub fn relative_to(date: NaiveDate, today: NaiveDate) -> String {
    let days = (date - today).num_days();
    match days {
        0 => "today".to_string(),
        1 => "tomorrow".to_string(),
        -1 => "yesterday".to_string(),
        d if (2..=30).contains(&d) => format!("in {} days", d),
        d if (-30..=-2).contains(&d) => format!("{} days ago", -d),
        _ if date.year() == today.year() => date.format("%b %d").to_string(),
        _ => date.format("%b %d, %Y").to_string(),
    }
}

/// Serde adapter for optional task dates.
///
/// Missing fields, `null` and empty strings all decode to `None`; values are
/// encoded as `YYYY-MM-DD` strings, and `None` as an empty string so the API
/// receives the same shape the browser form used to send.
pub mod optional_date {
    use super::{format_ymd, parse_date};
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &Option<NaiveDate>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(date) => serializer.serialize_str(&format_ymd(*date)),
            None => serializer.serialize_str(""),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        match raw.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(text) => {
                // Some records carry a full timestamp; the date part is all we keep.
                let date_part = text.get(..10).unwrap_or(text);
                parse_date(date_part).map(Some).map_err(serde::de::Error::custom)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_descriptions() {
        let today = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
        assert_eq!(relative_to(today, today), "today");
        assert_eq!(relative_to(NaiveDate::from_ymd_opt(2025, 3, 11).unwrap(), today), "tomorrow");
        assert_eq!(relative_to(NaiveDate::from_ymd_opt(2025, 3, 7).unwrap(), today), "3 days ago");
        assert_eq!(relative_to(NaiveDate::from_ymd_opt(2025, 8, 1).unwrap(), today), "Aug 01");
    }

    #[test]
    fn display_date_handles_missing() {
        assert_eq!(display_date(None), "-");
        assert_eq!(
            display_date(NaiveDate::from_ymd_opt(2024, 11, 29)),
            "2024-11-29".to_string()
        );
    }
}
