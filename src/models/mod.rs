// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models exchanged with the Hercules API.

pub mod billing;
pub mod coach;
pub mod nutrition;
pub mod user;
pub mod weight;
pub mod workout;

pub use billing::{BillingQuote, BillingSelection, PaymentMethod};
pub use coach::{AssignCoachRequest, Coach, CoachRelationship, CoachRequest};
pub use nutrition::{
    EntrySource, FoodProduct, MacroTotals, MealEntry, MealRecord, NewFoodProduct, NewMeal,
    NewMealEntry, Recipe,
};
pub use user::{AuthResponse, Profile, Role, User};
pub use weight::{DayWeight, WeightEntry};
pub use workout::{
    Exercise, LoggedSession, Program, ProgramDay, ProgramExercise, ProgramKind, SessionExercise,
    SessionMode, SetLog,
};
