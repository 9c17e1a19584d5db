// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Body weight input and history.

use chrono::{Days, NaiveDate};
use std::collections::BTreeMap;
use std::str::FromStr;

use crate::error::{ClientError, Result};
use crate::models::WeightEntry;

/// Heaviest weight accepted, in kilograms.
pub const MAX_WEIGHT_KG: f64 = 500.0;

/// Parse a weight typed by the user. Accepts `82.5` and `82,5`.
pub fn parse_weight(input: &str) -> Result<f64> {
    let normalized = input.trim().replace(',', ".");
    let weight: f64 = normalized
        .parse()
        .map_err(|_| ClientError::Validation("Enter a valid weight (kg)".to_string()))?;

    if !weight.is_finite() || weight <= 0.0 || weight > MAX_WEIGHT_KG {
        return Err(ClientError::Validation(format!(
            "Weight must be greater than 0 and at most {} kg",
            MAX_WEIGHT_KG
        )));
    }
    Ok(weight)
}

/// Window shown in the weight chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HistoryRange {
    #[default]
    Days30,
    Days90,
    Year,
}

impl HistoryRange {
    pub fn days(self) -> u64 {
        match self {
            HistoryRange::Days30 => 30,
            HistoryRange::Days90 => 90,
            HistoryRange::Year => 365,
        }
    }

    /// `(from, to)` ending today, both inclusive.
    pub fn bounds(self, today: NaiveDate) -> (NaiveDate, NaiveDate) {
        let from = today.checked_sub_days(Days::new(self.days())).unwrap_or(today);
        (from, today)
    }
}

impl FromStr for HistoryRange {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "30" | "30d" => Ok(HistoryRange::Days30),
            "90" | "90d" => Ok(HistoryRange::Days90),
            "365" | "365d" | "1y" | "year" => Ok(HistoryRange::Year),
            other => Err(ClientError::Validation(format!(
                "Unknown range '{}', expected 30d, 90d or 1y",
                other
            ))),
        }
    }
}

/// Weight entries keyed by date. Saving a date that is already present
/// replaces its value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WeightLog {
    entries: BTreeMap<NaiveDate, f64>,
}

impl WeightLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite. Returns the previous value for that date.
    pub fn upsert(&mut self, entry: WeightEntry) -> Option<f64> {
        self.entries.insert(entry.date, entry.weight_kg)
    }

    pub fn get(&self, date: NaiveDate) -> Option<f64> {
        self.entries.get(&date).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in `[from, to]`, oldest first.
    pub fn range(&self, from: NaiveDate, to: NaiveDate) -> Vec<WeightEntry> {
        if from > to {
            return Vec::new();
        }
        self.entries
            .range(from..=to)
            .map(|(&date, &weight_kg)| WeightEntry { date, weight_kg })
            .collect()
    }

    pub fn latest(&self) -> Option<WeightEntry> {
        self.entries
            .iter()
            .next_back()
            .map(|(&date, &weight_kg)| WeightEntry { date, weight_kg })
    }

    /// Change from the first to the last entry in the range.
    pub fn change(&self, from: NaiveDate, to: NaiveDate) -> Option<f64> {
        let entries = self.range(from, to);
        match (entries.first(), entries.last()) {
            (Some(first), Some(last)) if entries.len() > 1 => {
                Some(last.weight_kg - first.weight_kg)
            }
            _ => None,
        }
    }
}

impl FromIterator<WeightEntry> for WeightLog {
    fn from_iter<I: IntoIterator<Item = WeightEntry>>(iter: I) -> Self {
        let mut log = WeightLog::new();
        for entry in iter {
            log.upsert(entry);
        }
        log
    }
}
