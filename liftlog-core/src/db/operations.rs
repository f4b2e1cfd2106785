use anyhow::Result;
use diesel::prelude::*;
use log::{debug, warn};
use std::collections::HashMap;

use crate::{
    db::models::{
        ExerciseRow, NewExercise, NewSet, NewWorkout, STATUS_FINISHED, STATUS_PLANNED, SetRow,
        WorkoutRow,
    },
    db::schema::{workout_exercises, workout_sets, workouts},
    workout::Workout,
};

// Workouts
pub fn insert_workout(conn: &mut SqliteConnection, workout: &Workout) -> Result<()> {
    conn.transaction::<_, anyhow::Error, _>(|conn| {
        diesel::insert_into(workouts::table)
            .values(&NewWorkout {
                id: &workout.id,
                name: &workout.name,
                status: STATUS_PLANNED,
                created_at: chrono::Utc::now().timestamp(),
            })
            .execute(conn)?;

        for (position, exercise) in workout.exercises.iter().enumerate() {
            let exercise_row_id: i32 = diesel::insert_into(workout_exercises::table)
                .values(&NewExercise {
                    id: &exercise.id,
                    workout_id: &workout.id,
                    position: position as i32,
                    name: &exercise.name,
                })
                .returning(workout_exercises::row_id)
                .get_result(conn)?;

            let new_sets: Vec<NewSet> = exercise
                .sets
                .iter()
                .enumerate()
                .map(|(position, set)| NewSet {
                    id: &set.id,
                    exercise_row_id,
                    position: position as i32,
                    reps: &set.reps,
                    weight: &set.weight,
                    rest_seconds: &set.rest_seconds,
                    set_type: set.set_type.as_str(),
                    is_complete: set.is_complete,
                })
                .collect();
            if !new_sets.is_empty() {
                diesel::insert_into(workout_sets::table)
                    .values(&new_sets)
                    .execute(conn)?;
            }
        }
        debug!(
            "Inserted workout {} with {} exercises",
            workout.id,
            workout.exercises.len()
        );
        Ok(())
    })
}

pub fn get_workout_row(conn: &mut SqliteConnection, workout_id: &str) -> Result<Option<WorkoutRow>> {
    workouts::table
        .find(workout_id)
        .select(WorkoutRow::as_select())
        .first(conn)
        .optional()
        .map_err(Into::into)
}

/// Load a workout with its exercises and sets in plan order.
pub fn get_workout(conn: &mut SqliteConnection, workout_id: &str) -> Result<Option<Workout>> {
    let Some(row) = get_workout_row(conn, workout_id)? else {
        return Ok(None);
    };

    let exercises = ExerciseRow::belonging_to(&row)
        .select(ExerciseRow::as_select())
        .order(workout_exercises::position.asc())
        .load(conn)?;

    let sets = SetRow::belonging_to(&exercises)
        .select(SetRow::as_select())
        .order(workout_sets::position.asc())
        .load(conn)?;

    let exercises = sets
        .grouped_by(&exercises)
        .into_iter()
        .zip(exercises)
        .map(|(sets, exercise)| exercise.into_exercise(sets))
        .collect::<Result<Vec<_>>>()?;

    Ok(Some(Workout {
        id: row.id,
        name: row.name,
        exercises,
    }))
}

pub fn get_all_workouts(conn: &mut SqliteConnection) -> Result<Vec<WorkoutRow>> {
    workouts::table
        .select(WorkoutRow::as_select())
        .order((workouts::created_at.desc(), workouts::id.asc()))
        .load(conn)
        .map_err(Into::into)
}

/// Write the completion state of every set and mark the workout finished.
/// Returns false when no workout with that id exists.
pub fn save_finished_workout(
    conn: &mut SqliteConnection,
    workout: &Workout,
    finished_at: i64,
) -> Result<bool> {
    conn.transaction::<_, anyhow::Error, _>(|conn| {
        let updated = diesel::update(workouts::table.find(workout.id.as_str()))
            .set((
                workouts::status.eq(STATUS_FINISHED),
                workouts::finished_at.eq(Some(finished_at)),
            ))
            .execute(conn)?;
        if updated == 0 {
            warn!("Cannot finish workout {}: not found", workout.id);
            return Ok(false);
        }

        let owned: HashMap<String, i32> = workout_exercises::table
            .filter(workout_exercises::workout_id.eq(workout.id.as_str()))
            .select((workout_exercises::id, workout_exercises::row_id))
            .load::<(String, i32)>(conn)?
            .into_iter()
            .collect();

        for exercise in &workout.exercises {
            let Some(&exercise_row_id) = owned.get(&exercise.id) else {
                warn!(
                    "Exercise {} does not belong to workout {}, skipping",
                    exercise.id, workout.id
                );
                continue;
            };
            for set in &exercise.sets {
                diesel::update(
                    workout_sets::table
                        .filter(workout_sets::exercise_row_id.eq(exercise_row_id))
                        .filter(workout_sets::id.eq(set.id.as_str())),
                )
                .set(workout_sets::is_complete.eq(set.is_complete))
                .execute(conn)?;
            }
        }
        Ok(true)
    })
}

pub fn delete_workout(conn: &mut SqliteConnection, workout_id: &str) -> Result<usize> {
    conn.transaction::<_, anyhow::Error, _>(|conn| {
        let exercise_rows = workout_exercises::table
            .filter(workout_exercises::workout_id.eq(workout_id))
            .select(workout_exercises::row_id);
        diesel::delete(
            workout_sets::table.filter(workout_sets::exercise_row_id.eq_any(exercise_rows)),
        )
        .execute(conn)?;
        diesel::delete(workout_exercises::table.filter(workout_exercises::workout_id.eq(workout_id)))
            .execute(conn)?;
        let deleted = diesel::delete(workouts::table.find(workout_id)).execute(conn)?;
        Ok(deleted)
    })
}
