// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Coach assignment workflow.
//!
//! ```text
//! NoCoach ──► Browsing ──► ViewingCoachDetail ──► Assigning ──► Assigned
//!                ▲                                                 │
//!                └─────────────── AccessEnded ◄────────────────────┘
//! ```
//!
//! Every mutation is followed by a fresh `GET /api/me/coach`; the workflow
//! never merges a write into local state while that fetch works. Failures
//! leave the workflow in the stable state it was in before the action, with
//! the message available from [`CoachAssignmentWorkflow::error`]. If the
//! write succeeded but the fetch after it failed, the state reflects the
//! write and the error says the status is stale.

use crate::error::{ClientError, Result};
use crate::models::{AssignCoachRequest, Coach, CoachRelationship};
use crate::services::api::CoachApi;
use crate::services::request::{guarded, BusyFlag, Loadable};

const ASSIGNED_STALE: &str = "Coach assigned, but status could not be refreshed";
const ENDED_STALE: &str = "Coach access ended, but status could not be refreshed";

/// Where the user is in the coaching flow.
#[derive(Debug, Clone, PartialEq)]
pub enum CoachState {
    /// No relationship and no coach list yet
    NoCoach,
    /// Coach list fetched and shown
    Browsing,
    ViewingCoachDetail(Coach),
    /// Assignment request in flight
    Assigning { coach: Coach, program_weeks: u32 },
    Assigned(CoachRelationship),
    /// Relationship kept with `has_access == false`
    AccessEnded(CoachRelationship),
}

impl CoachState {
    fn name(&self) -> &'static str {
        match self {
            CoachState::NoCoach => "no_coach",
            CoachState::Browsing => "browsing",
            CoachState::ViewingCoachDetail(_) => "viewing_coach_detail",
            CoachState::Assigning { .. } => "assigning",
            CoachState::Assigned(_) => "assigned",
            CoachState::AccessEnded(_) => "access_ended",
        }
    }
}

pub struct CoachAssignmentWorkflow<A: CoachApi> {
    api: A,
    state: CoachState,
    relationship: Loadable<Option<CoachRelationship>>,
    coaches: Loadable<Vec<Coach>>,
    error: Option<String>,
    busy: BusyFlag,
}

impl<A: CoachApi> CoachAssignmentWorkflow<A> {
    pub fn new(api: A) -> Self {
        Self {
            api,
            state: CoachState::NoCoach,
            relationship: Loadable::NotRequested,
            coaches: Loadable::NotRequested,
            error: None,
            busy: BusyFlag::new(),
        }
    }

    pub fn state(&self) -> &CoachState {
        &self.state
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    /// Latest relationship from the server, including an ended one.
    pub fn relationship(&self) -> Option<&CoachRelationship> {
        self.relationship.loaded().and_then(Option::as_ref)
    }

    /// Coaches fetched so far; empty until the list is loaded.
    pub fn coaches(&self) -> &[Coach] {
        self.coaches.loaded().map(Vec::as_slice).unwrap_or_default()
    }

    /// Inline error from the last action, if it failed.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Flag held while an assignment or end-of-access request is in flight.
    pub fn busy_flag(&self) -> &BusyFlag {
        &self.busy
    }

    /// Fetch the current relationship and settle into the matching state.
    ///
    /// Without an active relationship the coach list is fetched once, and
    /// the workflow moves on to browsing.
    pub async fn refresh(&mut self) -> &CoachState {
        self.recover();
        self.error = None;
        if let Err(e) = self.reload_relationship().await {
            // Nothing known yet counts as no coach; a known state is kept
            self.error = Some(e.message_or("Could not load current coach"));
        }

        if matches!(self.state, CoachState::NoCoach | CoachState::AccessEnded(_))
            && !matches!(self.coaches, Loadable::Loaded(_))
        {
            // An error from the list fetch is already recorded in `self.error`
            let _ = self.load_coaches().await;
        }
        &self.state
    }

    /// Show the coach list, fetching it if needed.
    pub async fn browse(&mut self) -> Result<&[Coach]> {
        self.recover();
        self.error = None;
        if matches!(self.state, CoachState::Assigning { .. } | CoachState::Assigned(_)) {
            return Err(self.reject("You already have a coach"));
        }

        if let Loadable::Loaded(_) = self.coaches {
            self.transition(CoachState::Browsing);
        } else {
            self.load_coaches().await?;
        }
        Ok(self.coaches())
    }

    /// Open a coach's detail page.
    pub async fn select_coach(&mut self, coach_id: &str) -> Result<&Coach> {
        self.recover();
        self.error = None;
        if !matches!(self.state, CoachState::Browsing) {
            return Err(self.reject("Choose a coach from the list first"));
        }

        match self.api.coach(coach_id).await {
            Ok(coach) => {
                self.transition(CoachState::ViewingCoachDetail(coach));
                match &self.state {
                    CoachState::ViewingCoachDetail(coach) => Ok(coach),
                    _ => Err(ClientError::Internal(anyhow::anyhow!(
                        "coach detail state lost"
                    ))),
                }
            }
            Err(e) => {
                tracing::warn!(coach_id, error = %e, "Could not load coach");
                self.error = Some(e.message_or("Could not load coach"));
                Err(e)
            }
        }
    }

    /// Leave the detail page.
    pub fn back(&mut self) {
        self.recover();
        if matches!(self.state, CoachState::ViewingCoachDetail(_)) {
            self.transition(CoachState::Browsing);
        }
    }

    /// Assign the open coach for `program_weeks` weeks.
    pub async fn assign(&mut self, program_weeks: u32) -> Result<&CoachState> {
        self.recover();
        self.error = None;

        let coach = match &self.state {
            CoachState::ViewingCoachDetail(coach) => coach.clone(),
            CoachState::Assigning { .. } => return Err(ClientError::Busy),
            _ => return Err(self.reject("Open a coach before choosing a program")),
        };
        if !coach.offered_program_lengths().contains(&program_weeks) {
            return Err(self.reject(&format!(
                "{} does not offer a {}-week program",
                coach.name, program_weeks
            )));
        }

        let body = AssignCoachRequest {
            coach_id: coach.id.clone(),
            program_weeks,
        };
        let busy = self.busy.clone();
        self.transition(CoachState::Assigning {
            coach: coach.clone(),
            program_weeks,
        });

        match guarded(&busy, "assign_coach", self.api.assign_coach(&body)).await {
            Ok(()) => {
                tracing::info!(coach_id = %coach.id, program_weeks, "Coach assigned");
                if let Err(e) = self.reload_relationship().await {
                    self.error = Some(ASSIGNED_STALE.to_string());
                    self.relationship = Loadable::Failed(ASSIGNED_STALE.to_string());
                    self.transition(CoachState::Assigned(CoachRelationship::unconfirmed(&coach)));
                    return Err(e);
                }
                Ok(&self.state)
            }
            Err(e) => {
                self.error = Some(e.message_or("Could not assign coach"));
                self.transition(CoachState::ViewingCoachDetail(coach));
                Err(e)
            }
        }
    }

    /// End access to the current coach. History is kept.
    pub async fn end_access(&mut self) -> Result<&CoachState> {
        self.recover();
        self.error = None;
        if !matches!(self.state, CoachState::Assigned(_)) {
            return Err(self.reject("You do not have an active coach"));
        }

        let busy = self.busy.clone();
        match guarded(&busy, "end_coach_access", self.api.end_coach_access()).await {
            Ok(()) => {
                tracing::info!("Coach access ended");
                if let Err(e) = self.reload_relationship().await {
                    self.error = Some(ENDED_STALE.to_string());
                    self.relationship = Loadable::Failed(ENDED_STALE.to_string());
                    if let CoachState::Assigned(rel) = &self.state {
                        let ended = CoachRelationship {
                            has_access: false,
                            ..rel.clone()
                        };
                        self.transition(CoachState::AccessEnded(ended));
                    }
                    return Err(e);
                }
                if !matches!(self.coaches, Loadable::Loaded(_)) {
                    let _ = self.load_coaches().await;
                }
                Ok(&self.state)
            }
            Err(e) => {
                self.error = Some(e.message_or("Could not end coach access"));
                Err(e)
            }
        }
    }

    /// Fetch the relationship. On failure the previous relationship and
    /// state are kept.
    async fn reload_relationship(&mut self) -> Result<()> {
        let previous = std::mem::replace(&mut self.relationship, Loadable::Loading);
        match self.api.my_coach().await {
            Ok(relationship) => {
                let next = match &relationship {
                    Some(rel) if rel.has_access => CoachState::Assigned(rel.clone()),
                    Some(rel) => CoachState::AccessEnded(rel.clone()),
                    None => CoachState::NoCoach,
                };
                self.relationship = Loadable::Loaded(relationship);
                self.transition(next);
                Ok(())
            }
            Err(e) => {
                tracing::warn!(error = %e, "Could not load current coach");
                self.relationship = match previous {
                    Loadable::Loaded(rel) => Loadable::Loaded(rel),
                    _ => Loadable::Failed(e.message_or("Could not load current coach")),
                };
                Err(e)
            }
        }
    }

    async fn load_coaches(&mut self) -> Result<()> {
        self.coaches = Loadable::Loading;
        match self.api.coaches().await {
            Ok(coaches) => {
                tracing::debug!(count = coaches.len(), "Loaded coaches");
                self.coaches = Loadable::Loaded(coaches);
                self.transition(CoachState::Browsing);
                Ok(())
            }
            Err(e) => {
                tracing::warn!(error = %e, "Could not load coaches");
                let message = e.message_or("Could not load coaches");
                self.error = Some(message.clone());
                self.coaches = Loadable::Failed(message);
                Err(e)
            }
        }
    }

    /// Undo an `Assigning` state left behind by a dropped request.
    fn recover(&mut self) {
        if self.busy.is_busy() {
            return;
        }
        if let CoachState::Assigning { coach, .. } = &self.state {
            let coach = coach.clone();
            self.transition(CoachState::ViewingCoachDetail(coach));
        }
    }

    fn reject(&mut self, message: &str) -> ClientError {
        self.error = Some(message.to_string());
        ClientError::Validation(message.to_string())
    }

    fn transition(&mut self, next: CoachState) {
        if self.state.name() != next.name() {
            tracing::debug!(from = self.state.name(), to = next.name(), "Coach workflow transition");
        }
        self.state = next;
    }
}
