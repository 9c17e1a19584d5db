//! Workout logging models. Workouts are kept client-side only.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// An exercise in the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exercise {
    pub id: String,
    pub name: String,
    pub description: String,
}

/// An exercise prescribed by a program.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgramExercise {
    pub exercise_id: String,
    pub sets: u32,
    /// Free-form rep target, e.g. "8-10"
    pub suggested_reps: Option<String>,
}

/// One planned day of a multi-day program.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgramDay {
    pub label: String,
    pub exercises: Vec<ProgramExercise>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgramKind {
    /// A single session
    Single,
    /// A plan spread over weeks, followed day by day
    OverTime,
}

/// A training program.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Program {
    pub id: String,
    pub name: String,
    pub kind: ProgramKind,
    pub description: String,
    /// Exercises for [`ProgramKind::Single`] programs
    pub exercises: Vec<ProgramExercise>,
    /// Days for [`ProgramKind::OverTime`] programs
    pub days: Vec<ProgramDay>,
}

/// Reps performed in one set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetLog {
    pub reps: u32,
}

/// An exercise performed within a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionExercise {
    pub id: String,
    pub exercise_id: String,
    pub sets: Vec<SetLog>,
}

/// How the session was put together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum SessionMode {
    /// Exercises picked freely
    Free,
    /// Following a single-session program
    Program { program_id: String },
    /// Following one day of a multi-day program
    OverTime { program_id: String, day_index: usize },
}

/// A logged workout session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggedSession {
    pub id: String,
    pub started_at: NaiveDateTime,
    #[serde(flatten)]
    pub mode: SessionMode,
    pub exercises: Vec<SessionExercise>,
}

impl LoggedSession {
    /// Total reps across all exercises and sets.
    pub fn total_reps(&self) -> u32 {
        self.exercises
            .iter()
            .flat_map(|e| e.sets.iter())
            .map(|s| s.reps)
            .sum()
    }
}
