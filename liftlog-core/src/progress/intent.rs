use crate::workout::Workout;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkoutProgressIntent {
    /// Start fetching a workout by id.
    LoadWorkout { workout_id: String },
    /// Fetch result, tagged with the id it was requested for.
    WorkoutLoaded { workout_id: String, workout: Workout },
    WorkoutLoadFailed { workout_id: String },
    ToggleExerciseStatus { exercise_id: String },
    ToggleSetStatus { exercise_id: String, set_id: String },
    ToggleExercisePreview { exercise_id: String },
    CompleteWorkout,
    /// Persist the workout as it stands.
    FinishWorkout,
    /// Persistence finished; `saved` is what the repository reported.
    WorkoutSaved { saved: bool },
    WorkoutSaveFailed,
}

impl WorkoutProgressIntent {
    pub fn name(&self) -> &'static str {
        match self {
            WorkoutProgressIntent::LoadWorkout { .. } => "LoadWorkout",
            WorkoutProgressIntent::WorkoutLoaded { .. } => "WorkoutLoaded",
            WorkoutProgressIntent::WorkoutLoadFailed { .. } => "WorkoutLoadFailed",
            WorkoutProgressIntent::ToggleExerciseStatus { .. } => "ToggleExerciseStatus",
            WorkoutProgressIntent::ToggleSetStatus { .. } => "ToggleSetStatus",
            WorkoutProgressIntent::ToggleExercisePreview { .. } => "ToggleExercisePreview",
            WorkoutProgressIntent::CompleteWorkout => "CompleteWorkout",
            WorkoutProgressIntent::FinishWorkout => "FinishWorkout",
            WorkoutProgressIntent::WorkoutSaved { .. } => "WorkoutSaved",
            WorkoutProgressIntent::WorkoutSaveFailed => "WorkoutSaveFailed",
        }
    }
}

/// One-shot notifications for the UI. They are delivered once and never
/// stored in the state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkoutProgressSignal {
    NavigateHome,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEffect {
    FetchWorkout { workout_id: String },
    PersistWorkout(Workout),
    Signal(WorkoutProgressSignal),
}
