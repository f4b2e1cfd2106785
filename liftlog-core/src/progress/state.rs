use crate::workout::Workout;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkoutProgressState {
    pub is_loading: bool,
    pub is_error: bool,
    /// Id of the most recent load request still waiting for its result.
    pub loading_workout_id: Option<String>,
    pub is_saving: bool,
    /// The last finish attempt did not persist the workout.
    pub save_failed: bool,
    pub workout: Workout,
}

impl Default for WorkoutProgressState {
    fn default() -> Self {
        Self {
            is_loading: true,
            is_error: false,
            loading_workout_id: None,
            is_saving: false,
            save_failed: false,
            workout: Workout::default(),
        }
    }
}

impl WorkoutProgressState {
    pub fn with_workout(workout: Workout) -> Self {
        Self {
            is_loading: false,
            workout,
            ..Default::default()
        }
    }
}
