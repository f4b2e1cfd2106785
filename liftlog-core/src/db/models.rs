use diesel::prelude::*;
use std::fmt;

use crate::db::schema;
use crate::workout::{Exercise, WorkoutSet};

pub const STATUS_PLANNED: &str = "planned";
pub const STATUS_FINISHED: &str = "finished";

// Workout models
#[derive(Queryable, Selectable, Identifiable, Debug, Clone)]
#[diesel(table_name = schema::workouts)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct WorkoutRow {
    pub id: String,
    pub name: String,
    pub status: String,
    pub finished_at: Option<i64>,
    pub created_at: i64,
}

impl WorkoutRow {
    pub fn is_finished(&self) -> bool {
        self.status == STATUS_FINISHED
    }
}

impl fmt::Display for WorkoutRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let finished = self
            .finished_at
            .and_then(|ts| chrono::DateTime::from_timestamp(ts, 0))
            .map(|dt| format!(" (finished {})", dt.format("%Y-%m-%d %H:%M")))
            .unwrap_or_default();
        write!(f, "{}: {} [{}]{}", self.id, self.name, self.status, finished)
    }
}

#[derive(Insertable)]
#[diesel(table_name = schema::workouts)]
pub struct NewWorkout<'a> {
    pub id: &'a str,
    pub name: &'a str,
    pub status: &'a str,
    pub created_at: i64,
}

// Exercise models
#[derive(Queryable, Selectable, Identifiable, Associations, Debug, Clone)]
#[diesel(belongs_to(WorkoutRow, foreign_key = workout_id))]
#[diesel(table_name = schema::workout_exercises)]
#[diesel(primary_key(row_id))]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct ExerciseRow {
    pub row_id: i32,
    pub id: String,
    pub workout_id: String,
    pub position: i32,
    pub name: String,
}

#[derive(Insertable)]
#[diesel(table_name = schema::workout_exercises)]
pub struct NewExercise<'a> {
    pub id: &'a str,
    pub workout_id: &'a str,
    pub position: i32,
    pub name: &'a str,
}

// Set models
#[derive(Queryable, Selectable, Identifiable, Associations, Debug, Clone)]
#[diesel(belongs_to(ExerciseRow, foreign_key = exercise_row_id))]
#[diesel(table_name = schema::workout_sets)]
#[diesel(primary_key(row_id))]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct SetRow {
    pub row_id: i32,
    pub id: String,
    pub exercise_row_id: i32,
    pub position: i32,
    pub reps: String,
    pub weight: String,
    pub rest_seconds: String,
    pub set_type: String,
    pub is_complete: bool,
}

#[derive(Insertable)]
#[diesel(table_name = schema::workout_sets)]
pub struct NewSet<'a> {
    pub id: &'a str,
    pub exercise_row_id: i32,
    pub position: i32,
    pub reps: &'a str,
    pub weight: &'a str,
    pub rest_seconds: &'a str,
    pub set_type: &'a str,
    pub is_complete: bool,
}

impl TryFrom<SetRow> for WorkoutSet {
    type Error = anyhow::Error;

    fn try_from(row: SetRow) -> anyhow::Result<Self> {
        Ok(WorkoutSet {
            set_type: row.set_type.parse()?,
            id: row.id,
            reps: row.reps,
            weight: row.weight,
            rest_seconds: row.rest_seconds,
            is_complete: row.is_complete,
        })
    }
}

impl ExerciseRow {
    pub fn into_exercise(self, sets: Vec<SetRow>) -> anyhow::Result<Exercise> {
        let sets = sets
            .into_iter()
            .map(WorkoutSet::try_from)
            .collect::<anyhow::Result<Vec<_>>>()?;
        Ok(Exercise {
            id: self.id,
            name: self.name,
            sets,
            is_current: false,
            is_in_preview_mode: false,
        })
    }
}
