// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Local workout logging.
//!
//! Sessions are built as a [`SessionDraft`] and then saved into a
//! [`WorkoutLog`]. Program-based drafts start with one empty set per
//! prescribed set; free drafts start empty and grow as exercises are added.

use std::fs;
use std::path::Path;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::{ClientError, Result};
use crate::models::{
    Exercise, LoggedSession, Program, ProgramDay, ProgramExercise, ProgramKind, SessionExercise,
    SessionMode, SetLog,
};

/// Sets given to an exercise added to a free session.
pub const DEFAULT_FREE_SETS: usize = 3;

/// Built-in exercises and programs.
#[derive(Debug, Clone, PartialEq)]
pub struct Catalog {
    exercises: Vec<Exercise>,
    programs: Vec<Program>,
}

fn exercise(id: &str, name: &str, description: &str) -> Exercise {
    Exercise {
        id: id.to_string(),
        name: name.to_string(),
        description: description.to_string(),
    }
}

fn prescribed(exercise_id: &str, sets: u32, reps: &str) -> ProgramExercise {
    ProgramExercise {
        exercise_id: exercise_id.to_string(),
        sets,
        suggested_reps: Some(reps.to_string()),
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl Catalog {
    pub fn new(exercises: Vec<Exercise>, programs: Vec<Program>) -> Self {
        Self {
            exercises,
            programs,
        }
    }

    pub fn builtin() -> Self {
        let exercises = vec![
            exercise("1", "Bench press", "Lie on the bench, lower the bar to the chest and press up. Grip slightly wider than shoulder width."),
            exercise("2", "Deadlift", "Feet shoulder width apart, hinge at the hips with a straight back. Stand up by extending hips and knees."),
            exercise("3", "Squat", "Feet shoulder width apart, bend knees and hips until the thighs are at least parallel to the floor."),
            exercise("4", "Pull-ups", "Hang from a bar with an overhand grip. Pull up until the chin clears the bar, lower under control."),
            exercise("5", "Overhead press", "Bar or dumbbells at shoulder height. Press overhead until the arms are straight."),
            exercise("6", "Rows (barbell or dumbbell)", "Bent over with support, pull the weight towards the lower chest. Squeeze the shoulder blades."),
            exercise("7", "Biceps curls", "Hold the weights at your sides and curl them towards the shoulders."),
            exercise("8", "Plank", "Rest on forearms and toes, keep the body in a straight line with a tight core."),
        ];

        let programs = vec![
            Program {
                id: "p1".to_string(),
                name: "Push / Pull / Legs (single)".to_string(),
                kind: ProgramKind::Single,
                description: "One round: push day with bench and overhead press.".to_string(),
                exercises: vec![prescribed("1", 4, "8-10"), prescribed("5", 3, "10")],
                days: Vec::new(),
            },
            Program {
                id: "p2".to_string(),
                name: "Strength 12 weeks".to_string(),
                kind: ProgramKind::OverTime,
                description: "12 week program with planned days. Follow it week by week, day by day."
                    .to_string(),
                exercises: Vec::new(),
                days: vec![
                    ProgramDay {
                        label: "Week 1 - Day 1 (Push)".to_string(),
                        exercises: vec![prescribed("1", 4, "8"), prescribed("5", 3, "10")],
                    },
                    ProgramDay {
                        label: "Week 1 - Day 2 (Pull)".to_string(),
                        exercises: vec![prescribed("4", 3, "6-8"), prescribed("6", 4, "8")],
                    },
                    ProgramDay {
                        label: "Week 1 - Day 3 (Legs)".to_string(),
                        exercises: vec![prescribed("3", 4, "8"), prescribed("2", 3, "6")],
                    },
                ],
            },
        ];

        Self::new(exercises, programs)
    }

    pub fn exercises(&self) -> &[Exercise] {
        &self.exercises
    }

    pub fn programs(&self) -> &[Program] {
        &self.programs
    }

    pub fn exercise(&self, id: &str) -> Option<&Exercise> {
        self.exercises.iter().find(|e| e.id == id)
    }

    pub fn program(&self, id: &str) -> Option<&Program> {
        self.programs.iter().find(|p| p.id == id)
    }

    /// Display name, `"?"` for an unknown id.
    pub fn exercise_name(&self, id: &str) -> &str {
        self.exercise(id).map(|e| e.name.as_str()).unwrap_or("?")
    }
}

/// A session being filled in.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionDraft {
    mode: SessionMode,
    started_at: NaiveDateTime,
    exercises: Vec<SessionExercise>,
    next_row: usize,
}

impl SessionDraft {
    pub fn free(started_at: NaiveDateTime) -> Self {
        Self {
            mode: SessionMode::Free,
            started_at,
            exercises: Vec::new(),
            next_row: 0,
        }
    }

    /// Draft for a single-session program.
    pub fn program(catalog: &Catalog, program_id: &str, started_at: NaiveDateTime) -> Result<Self> {
        let program = find_program(catalog, program_id, ProgramKind::Single)?;
        Ok(Self::prefilled(
            SessionMode::Program {
                program_id: program.id.clone(),
            },
            started_at,
            &program.exercises,
        ))
    }

    /// Draft for one day of a multi-day program.
    pub fn program_day(
        catalog: &Catalog,
        program_id: &str,
        day_index: usize,
        started_at: NaiveDateTime,
    ) -> Result<Self> {
        let program = find_program(catalog, program_id, ProgramKind::OverTime)?;
        let day = program.days.get(day_index).ok_or_else(|| {
            ClientError::Validation(format!(
                "{} has no day {}",
                program.name,
                day_index + 1
            ))
        })?;
        Ok(Self::prefilled(
            SessionMode::OverTime {
                program_id: program.id.clone(),
                day_index,
            },
            started_at,
            &day.exercises,
        ))
    }

    fn prefilled(mode: SessionMode, started_at: NaiveDateTime, plan: &[ProgramExercise]) -> Self {
        let exercises: Vec<SessionExercise> = plan
            .iter()
            .enumerate()
            .map(|(i, pe)| SessionExercise {
                id: format!("e-{i}"),
                exercise_id: pe.exercise_id.clone(),
                sets: vec![SetLog::default(); pe.sets as usize],
            })
            .collect();
        Self {
            mode,
            started_at,
            next_row: exercises.len(),
            exercises,
        }
    }

    pub fn mode(&self) -> &SessionMode {
        &self.mode
    }

    pub fn exercises(&self) -> &[SessionExercise] {
        &self.exercises
    }

    /// Add an exercise to a free session. Returns the new row id.
    pub fn add_exercise(&mut self, catalog: &Catalog, exercise_id: &str) -> Result<String> {
        if self.mode != SessionMode::Free {
            return Err(ClientError::Validation(
                "Exercises can only be added to a free session".to_string(),
            ));
        }
        if catalog.exercise(exercise_id).is_none() {
            return Err(ClientError::Validation(format!("Unknown exercise '{exercise_id}'")));
        }

        let id = format!("e-{}", self.next_row);
        self.next_row += 1;
        self.exercises.push(SessionExercise {
            id: id.clone(),
            exercise_id: exercise_id.to_string(),
            sets: vec![SetLog::default(); DEFAULT_FREE_SETS],
        });
        Ok(id)
    }

    /// Change the number of sets for a row, keeping reps already entered.
    pub fn set_set_count(&mut self, row_id: &str, sets: usize) -> Result<()> {
        if sets == 0 {
            return Err(ClientError::Validation("At least one set is required".to_string()));
        }
        self.row_mut(row_id)?.sets.resize(sets, SetLog::default());
        Ok(())
    }

    /// Record reps for one set.
    pub fn log_set(&mut self, row_id: &str, set_index: usize, reps: u32) -> Result<()> {
        let row = self.row_mut(row_id)?;
        let set = row.sets.get_mut(set_index).ok_or_else(|| {
            ClientError::Validation(format!("Set {} does not exist", set_index + 1))
        })?;
        set.reps = reps;
        Ok(())
    }

    pub fn remove_exercise(&mut self, row_id: &str) -> bool {
        let before = self.exercises.len();
        self.exercises.retain(|e| e.id != row_id);
        self.exercises.len() != before
    }

    fn row_mut(&mut self, row_id: &str) -> Result<&mut SessionExercise> {
        self.exercises
            .iter_mut()
            .find(|e| e.id == row_id)
            .ok_or_else(|| ClientError::Validation(format!("No exercise row '{row_id}'")))
    }
}

fn find_program<'a>(catalog: &'a Catalog, program_id: &str, kind: ProgramKind) -> Result<&'a Program> {
    match catalog.program(program_id) {
        Some(program) if program.kind == kind => Ok(program),
        Some(program) => Err(ClientError::Validation(format!(
            "{} cannot be logged this way",
            program.name
        ))),
        None => Err(ClientError::Validation(format!("Unknown program '{program_id}'"))),
    }
}

/// Saved sessions, newest first.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct WorkoutLog {
    sessions: Vec<LoggedSession>,
    next_id: u64,
}

impl WorkoutLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Save a draft. A free session needs at least one exercise.
    pub fn save(&mut self, draft: SessionDraft) -> Result<&LoggedSession> {
        if draft.exercises.is_empty() {
            return Err(ClientError::Validation(
                "Add at least one exercise before saving".to_string(),
            ));
        }

        self.next_id += 1;
        let session = LoggedSession {
            id: format!("s-{}", self.next_id),
            started_at: draft.started_at,
            mode: draft.mode,
            exercises: draft.exercises,
        };
        tracing::debug!(session_id = %session.id, reps = session.total_reps(), "Workout saved");
        self.sessions.insert(0, session);
        Ok(&self.sessions[0])
    }

    pub fn sessions(&self) -> &[LoggedSession] {
        &self.sessions
    }

    /// Read a log written by [`WorkoutLog::persist`]. A missing file is an
    /// empty log; an unreadable one is an error so nothing gets overwritten.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(ClientError::Session(e.to_string())),
        };
        serde_json::from_str(&raw).map_err(|e| {
            ClientError::Session(format!("unreadable workout log {}: {}", path.display(), e))
        })
    }

    pub fn persist(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ClientError::Session(e.to_string()))?;
        }
        let json =
            serde_json::to_string_pretty(self).map_err(|e| ClientError::Session(e.to_string()))?;
        fs::write(path, json).map_err(|e| ClientError::Session(e.to_string()))
    }
}
