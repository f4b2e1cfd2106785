use crate::{progress, workout};

#[derive(Debug, Clone, Copy, PartialEq, Eq, uniffi::Enum)]
pub enum SetType {
    Warmup,
    Working,
    Failure,
}

impl From<workout::SetType> for SetType {
    fn from(t: workout::SetType) -> Self {
        match t {
            workout::SetType::Warmup => SetType::Warmup,
            workout::SetType::Working => SetType::Working,
            workout::SetType::Failure => SetType::Failure,
        }
    }
}

#[derive(Debug, Clone, uniffi::Record)]
pub struct WorkoutSet {
    pub id: String,
    pub reps: String,
    pub weight: String,
    pub rest_seconds: String,
    pub set_type: SetType,
    pub is_complete: bool,
}

impl From<workout::WorkoutSet> for WorkoutSet {
    fn from(s: workout::WorkoutSet) -> Self {
        WorkoutSet {
            id: s.id,
            reps: s.reps,
            weight: s.weight,
            rest_seconds: s.rest_seconds,
            set_type: s.set_type.into(),
            is_complete: s.is_complete,
        }
    }
}

#[derive(Debug, Clone, uniffi::Record)]
pub struct Exercise {
    pub id: String,
    pub name: String,
    pub sets: Vec<WorkoutSet>,
    pub is_current: bool,
    pub is_in_preview_mode: bool,
    pub is_complete: bool,
}

impl From<workout::Exercise> for Exercise {
    fn from(e: workout::Exercise) -> Self {
        let is_complete = e.is_complete();
        Exercise {
            id: e.id,
            name: e.name,
            sets: e.sets.into_iter().map(WorkoutSet::from).collect(),
            is_current: e.is_current,
            is_in_preview_mode: e.is_in_preview_mode,
            is_complete,
        }
    }
}

#[derive(Debug, Clone, uniffi::Record)]
pub struct Workout {
    pub id: String,
    pub name: String,
    pub exercises: Vec<Exercise>,
    pub completed_sets: u32,
    pub total_sets: u32,
}

impl From<workout::Workout> for Workout {
    fn from(w: workout::Workout) -> Self {
        let completed_sets = w.completed_set_count() as u32;
        let total_sets = w.total_set_count() as u32;
        Workout {
            id: w.id,
            name: w.name,
            exercises: w.exercises.into_iter().map(Exercise::from).collect(),
            completed_sets,
            total_sets,
        }
    }
}

#[derive(Debug, Clone, uniffi::Record)]
pub struct WorkoutProgressUiState {
    pub is_loading: bool,
    pub is_error: bool,
    pub is_saving: bool,
    pub save_failed: bool,
    pub workout: Workout,
}

impl From<progress::WorkoutProgressState> for WorkoutProgressUiState {
    fn from(s: progress::WorkoutProgressState) -> Self {
        WorkoutProgressUiState {
            is_loading: s.is_loading,
            is_error: s.is_error,
            is_saving: s.is_saving,
            save_failed: s.save_failed,
            workout: s.workout.into(),
        }
    }
}

/// Intents the app can send. Load and save completions stay internal.
#[derive(Debug, Clone, uniffi::Enum)]
pub enum ProgressIntent {
    LoadWorkout { workout_id: String },
    ToggleExerciseStatus { exercise_id: String },
    ToggleSetStatus { exercise_id: String, set_id: String },
    ToggleExercisePreview { exercise_id: String },
    CompleteWorkout,
    FinishWorkout,
}

impl From<ProgressIntent> for progress::WorkoutProgressIntent {
    fn from(i: ProgressIntent) -> Self {
        match i {
            ProgressIntent::LoadWorkout { workout_id } => {
                progress::WorkoutProgressIntent::LoadWorkout { workout_id }
            }
            ProgressIntent::ToggleExerciseStatus { exercise_id } => {
                progress::WorkoutProgressIntent::ToggleExerciseStatus { exercise_id }
            }
            ProgressIntent::ToggleSetStatus {
                exercise_id,
                set_id,
            } => progress::WorkoutProgressIntent::ToggleSetStatus {
                exercise_id,
                set_id,
            },
            ProgressIntent::ToggleExercisePreview { exercise_id } => {
                progress::WorkoutProgressIntent::ToggleExercisePreview { exercise_id }
            }
            ProgressIntent::CompleteWorkout => progress::WorkoutProgressIntent::CompleteWorkout,
            ProgressIntent::FinishWorkout => progress::WorkoutProgressIntent::FinishWorkout,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, uniffi::Enum)]
pub enum ProgressSignal {
    NavigateHome,
}

impl From<progress::WorkoutProgressSignal> for ProgressSignal {
    fn from(s: progress::WorkoutProgressSignal) -> Self {
        match s {
            progress::WorkoutProgressSignal::NavigateHome => ProgressSignal::NavigateHome,
        }
    }
}
