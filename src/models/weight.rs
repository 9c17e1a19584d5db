//! Body weight models.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// One weight measurement. At most one per calendar day per user.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(feature = "binding-generation", ts(export, export_to = "bindings/"))]
pub struct WeightEntry {
    pub date: NaiveDate,
    pub weight_kg: f64,
}

/// `GET /api/weight?date=` response. `weight_kg` is null when nothing was
/// logged that day.
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
pub struct DayWeight {
    #[serde(default)]
    pub weight_kg: Option<f64>,
}
