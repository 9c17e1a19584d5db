// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Coach and coaching-relationship models.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

/// Program length offered when a coach has not configured any.
pub const DEFAULT_PROGRAM_WEEKS: u32 = 12;

/// The current user's coaching relationship (`GET /api/me/coach`).
///
/// Ending access flips `has_access` but keeps the record and its dates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoachRelationship {
    pub id: String,
    pub coach_id: String,
    #[serde(rename = "coach_navn")]
    pub coach_name: String,
    pub coach_email: String,
    #[serde(rename = "coach_beskrivelse", default)]
    pub coach_description: String,
    #[serde(rename = "coach_spesialiseringer", default)]
    pub coach_specialties: String,
    #[serde(rename = "coach_bilde", default)]
    pub coach_image: Option<String>,
    #[serde(rename = "start_dato", default, deserialize_with = "lenient_date")]
    pub start_date: Option<NaiveDate>,
    #[serde(rename = "slutt_dato", default, deserialize_with = "lenient_date")]
    pub end_date: Option<NaiveDate>,
    #[serde(rename = "har_tilgang")]
    pub has_access: bool,
}

impl CoachRelationship {
    /// Relationship with `coach` as known before the server confirms it.
    ///
    /// The id and dates stay empty until the next successful fetch.
    pub fn unconfirmed(coach: &Coach) -> Self {
        Self {
            id: String::new(),
            coach_id: coach.id.clone(),
            coach_name: coach.name.clone(),
            coach_email: coach.email.clone(),
            coach_description: coach.description.clone(),
            coach_specialties: coach.specialties.clone(),
            coach_image: coach.image.clone(),
            start_date: None,
            end_date: None,
            has_access: true,
        }
    }
}

/// A coach as listed in `GET /api/coaches` and `GET /api/coaches/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coach {
    pub id: String,
    #[serde(rename = "navn")]
    pub name: String,
    pub email: String,
    #[serde(rename = "coach_beskrivelse", default)]
    pub description: String,
    #[serde(rename = "coach_spesialiseringer", default)]
    pub specialties: String,
    #[serde(rename = "coach_bilde", default)]
    pub image: Option<String>,
    /// Offered program lengths in weeks
    #[serde(rename = "program_lengder", default)]
    pub program_lengths: Vec<u32>,
}

impl Coach {
    /// Program lengths the user can choose from.
    pub fn offered_program_lengths(&self) -> Vec<u32> {
        let offered: Vec<u32> = self
            .program_lengths
            .iter()
            .copied()
            .filter(|w| *w > 0)
            .collect();
        if offered.is_empty() {
            vec![DEFAULT_PROGRAM_WEEKS]
        } else {
            offered
        }
    }
}

/// Body of `POST /api/me/coach`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssignCoachRequest {
    pub coach_id: String,
    #[serde(rename = "lengde_uker")]
    pub program_weeks: u32,
}

/// Pending coach application, as seen by an admin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoachRequest {
    pub id: String,
    pub email: String,
    #[serde(rename = "navn", default)]
    pub name: Option<String>,
    #[serde(rename = "opprettet", default)]
    pub created_at: Option<String>,
}

/// Accept `YYYY-MM-DD` or a full ISO 8601 timestamp; keep only the date.
fn lenient_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => {
            let date_part = s.get(..10).unwrap_or(s);
            NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
                .map(Some)
                .map_err(serde::de::Error::custom)
        }
    }
}
