// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - client-side business logic and the API client.

pub mod access;
pub mod api;
pub mod auth;
pub mod billing;
pub mod coach_workflow;
pub mod nutrition;
pub mod request;
pub mod session;
pub mod weight;
pub mod workouts;

pub use access::{resolve, AccessDecision, AccessState, Capabilities, View};
pub use api::{AuthorizedClient, CoachApi, HerculesClient, SignupRequest};
pub use auth::{LoginForm, SignupForm};
pub use billing::{first_payment, PricePlan, PricePlanError};
pub use coach_workflow::{CoachAssignmentWorkflow, CoachState};
pub use nutrition::{aggregate_day, remaining_calories, DaySummary, MealDraft};
pub use request::{guarded, BusyFlag, Loadable};
pub use session::{
    FileSessionStore, MemorySessionStore, Session, SessionContext, SessionState, SessionStore,
};
pub use weight::{parse_weight, HistoryRange, WeightLog};
pub use workouts::{Catalog, SessionDraft, WorkoutLog};
