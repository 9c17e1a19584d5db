// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared helpers for calendar dates.

use chrono::{Datelike, Local, NaiveDate};

use crate::error::{ClientError, Result};

/// Format a date the way the API expects it (`YYYY-MM-DD`).
pub fn format_api_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Parse a `YYYY-MM-DD` date from user input.
pub fn parse_api_date(input: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d")
        .map_err(|_| ClientError::Validation(format!("Invalid date '{}', expected YYYY-MM-DD", input)))
}

/// Today's date in the local time zone.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Number of days in the month containing `date`.
///
/// Computed as the day before the first of the following month, so leap
/// years come out right without any table.
pub fn days_in_month(date: NaiveDate) -> u32 {
    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };

    NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|first_of_next| first_of_next.pred_opt())
        .map(|last| last.day())
        // Only reachable at the very end of chrono's supported range
        .unwrap_or(31)
}
