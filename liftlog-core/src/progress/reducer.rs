use log::debug;

use super::intent::{ProgressEffect, WorkoutProgressIntent, WorkoutProgressSignal};
use super::state::WorkoutProgressState;
use crate::workout::Exercise;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reduction {
    pub state: WorkoutProgressState,
    pub effect: Option<ProgressEffect>,
}

impl Reduction {
    fn state(state: WorkoutProgressState) -> Self {
        Self {
            state,
            effect: None,
        }
    }

    fn with_effect(state: WorkoutProgressState, effect: ProgressEffect) -> Self {
        Self {
            state,
            effect: Some(effect),
        }
    }
}

/// Marks the first incomplete exercise as current and clears the flag
/// everywhere else. Leaves nothing current when every exercise is complete.
pub fn recompute_current_exercise(exercises: &mut [Exercise]) {
    let current = exercises.iter().position(|e| !e.is_complete());
    for (index, exercise) in exercises.iter_mut().enumerate() {
        exercise.is_current = Some(index) == current;
    }
}

/// Only the result of the latest load request is applied. Earlier requests
/// it replaced are dropped, whatever order their results arrive in.
fn is_awaited_load(state: &WorkoutProgressState, workout_id: &str) -> bool {
    state.is_loading && state.loading_workout_id.as_deref() == Some(workout_id)
}

/// Fold one intent into the state. Never fails: intents naming an exercise or
/// set that does not exist leave the state untouched.
pub fn reduce(mut state: WorkoutProgressState, intent: WorkoutProgressIntent) -> Reduction {
    match intent {
        WorkoutProgressIntent::LoadWorkout { workout_id } => {
            state.is_loading = true;
            state.is_error = false;
            state.loading_workout_id = Some(workout_id.clone());
            Reduction::with_effect(state, ProgressEffect::FetchWorkout { workout_id })
        }

        WorkoutProgressIntent::WorkoutLoaded {
            workout_id,
            mut workout,
        } => {
            if !is_awaited_load(&state, &workout_id) {
                debug!("Ignoring stale load result for workout {}", workout_id);
                return Reduction::state(state);
            }
            for (index, exercise) in workout.exercises.iter_mut().enumerate() {
                exercise.is_current = index == 0;
            }
            state.is_loading = false;
            state.is_error = false;
            state.loading_workout_id = None;
            state.workout = workout;
            Reduction::state(state)
        }

        WorkoutProgressIntent::WorkoutLoadFailed { workout_id } => {
            if !is_awaited_load(&state, &workout_id) {
                debug!("Ignoring stale load failure for workout {}", workout_id);
                return Reduction::state(state);
            }
            state.is_loading = false;
            state.is_error = true;
            state.loading_workout_id = None;
            Reduction::state(state)
        }

        // Toggles leave is_loading/is_error alone so a load still in flight
        // keeps its gate.
        WorkoutProgressIntent::ToggleExerciseStatus { exercise_id } => {
            let exercises = &mut state.workout.exercises;
            let Some(exercise) = exercises.iter_mut().find(|e| e.id == exercise_id) else {
                debug!("ToggleExerciseStatus: no exercise {}", exercise_id);
                return Reduction::state(state);
            };
            let complete = !exercise.is_complete();
            for set in exercise.sets.iter_mut() {
                set.is_complete = complete;
            }
            recompute_current_exercise(exercises);
            Reduction::state(state)
        }

        WorkoutProgressIntent::ToggleSetStatus {
            exercise_id,
            set_id,
        } => {
            let exercises = &mut state.workout.exercises;
            let Some(set) = exercises
                .iter_mut()
                .find(|e| e.id == exercise_id)
                .and_then(|e| e.sets.iter_mut().find(|s| s.id == set_id))
            else {
                debug!("ToggleSetStatus: no set {} in exercise {}", set_id, exercise_id);
                return Reduction::state(state);
            };
            set.is_complete = !set.is_complete;
            recompute_current_exercise(exercises);
            Reduction::state(state)
        }

        WorkoutProgressIntent::ToggleExercisePreview { exercise_id } => {
            if let Some(exercise) = state
                .workout
                .exercises
                .iter_mut()
                .find(|e| e.id == exercise_id)
            {
                exercise.is_in_preview_mode = !exercise.is_in_preview_mode;
            }
            Reduction::state(state)
        }

        // Same as the toggles: loading flags belong to the load intents.
        WorkoutProgressIntent::CompleteWorkout => {
            for exercise in state.workout.exercises.iter_mut() {
                exercise.is_current = false;
                for set in exercise.sets.iter_mut() {
                    set.is_complete = true;
                }
            }
            Reduction::state(state)
        }

        WorkoutProgressIntent::FinishWorkout => {
            if state.is_saving {
                debug!("FinishWorkout while a save is in flight, ignoring");
                return Reduction::state(state);
            }
            state.is_saving = true;
            state.save_failed = false;
            let snapshot = state.workout.clone();
            Reduction::with_effect(state, ProgressEffect::PersistWorkout(snapshot))
        }

        WorkoutProgressIntent::WorkoutSaved { saved } => {
            if !state.is_saving {
                debug!("Ignoring save completion with no save in flight");
                return Reduction::state(state);
            }
            state.is_saving = false;
            if saved {
                Reduction::with_effect(
                    state,
                    ProgressEffect::Signal(WorkoutProgressSignal::NavigateHome),
                )
            } else {
                state.save_failed = true;
                Reduction::state(state)
            }
        }

        WorkoutProgressIntent::WorkoutSaveFailed => {
            if state.is_saving {
                state.is_saving = false;
                state.save_failed = true;
            }
            Reduction::state(state)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workout::fixtures::{exercise, set, workout};
    use crate::workout::Workout;

    fn load(workout_id: &str) -> WorkoutProgressIntent {
        WorkoutProgressIntent::LoadWorkout {
            workout_id: workout_id.into(),
        }
    }

    fn load_result(workout: Workout) -> WorkoutProgressIntent {
        WorkoutProgressIntent::WorkoutLoaded {
            workout_id: workout.id.clone(),
            workout,
        }
    }

    fn load_failure(workout_id: &str) -> WorkoutProgressIntent {
        WorkoutProgressIntent::WorkoutLoadFailed {
            workout_id: workout_id.into(),
        }
    }

    fn loaded(workout: Workout) -> WorkoutProgressState {
        let requested = reduce(WorkoutProgressState::default(), load(&workout.id)).state;
        reduce(requested, load_result(workout)).state
    }

    fn apply(state: WorkoutProgressState, intents: Vec<WorkoutProgressIntent>) -> WorkoutProgressState {
        intents
            .into_iter()
            .fold(state, |state, intent| reduce(state, intent).state)
    }

    fn current_ids(state: &WorkoutProgressState) -> Vec<&str> {
        state
            .workout
            .exercises
            .iter()
            .filter(|e| e.is_current)
            .map(|e| e.id.as_str())
            .collect()
    }

    fn toggle_set(exercise_id: &str, set_id: &str) -> WorkoutProgressIntent {
        WorkoutProgressIntent::ToggleSetStatus {
            exercise_id: exercise_id.into(),
            set_id: set_id.into(),
        }
    }

    fn toggle_exercise(exercise_id: &str) -> WorkoutProgressIntent {
        WorkoutProgressIntent::ToggleExerciseStatus {
            exercise_id: exercise_id.into(),
        }
    }

    #[test]
    fn load_request_emits_fetch() {
        let mut state = WorkoutProgressState::with_workout(workout(vec![]));
        state.is_error = true;
        let reduction = reduce(
            state,
            WorkoutProgressIntent::LoadWorkout {
                workout_id: "w1".into(),
            },
        );
        assert!(reduction.state.is_loading);
        assert!(!reduction.state.is_error);
        assert_eq!(reduction.state.loading_workout_id.as_deref(), Some("w1"));
        assert_eq!(
            reduction.effect,
            Some(ProgressEffect::FetchWorkout {
                workout_id: "w1".into()
            })
        );
    }

    #[test]
    fn loaded_marks_first_exercise_current_regardless_of_completion() {
        let state = loaded(workout(vec![
            exercise("e1", vec![set("s1", true)]),
            exercise("e2", vec![set("s2", false)]),
        ]));
        assert!(!state.is_loading);
        assert!(!state.is_error);
        assert_eq!(current_ids(&state), vec!["e1"]);
    }

    #[test]
    fn loaded_clears_stale_current_flags() {
        let mut plan = workout(vec![
            exercise("e1", vec![set("s1", false)]),
            exercise("e2", vec![set("s2", false)]),
        ]);
        plan.exercises[1].is_current = true;
        assert_eq!(current_ids(&loaded(plan)), vec!["e1"]);
    }

    #[test]
    fn load_completions_without_load_in_flight_are_ignored() {
        let state = WorkoutProgressState::with_workout(workout(vec![exercise("e1", vec![])]));
        let after = reduce(state.clone(), load_result(workout(vec![])));
        assert_eq!(after.state, state);
        let after = reduce(state.clone(), load_failure("w1"));
        assert_eq!(after.state, state);

        // A fresh store has no request yet either.
        let fresh = WorkoutProgressState::default();
        assert_eq!(reduce(fresh.clone(), load_result(workout(vec![]))).state, fresh);
    }

    #[test]
    fn load_failure_sets_error() {
        let requested = reduce(WorkoutProgressState::default(), load("w1")).state;
        let reduction = reduce(requested, load_failure("w1"));
        assert!(!reduction.state.is_loading);
        assert!(reduction.state.is_error);
        assert!(reduction.state.loading_workout_id.is_none());
        assert!(reduction.effect.is_none());
    }

    #[test]
    fn only_the_latest_load_request_is_applied() {
        let mut first = workout(vec![exercise("a1", vec![set("s1", false)])]);
        first.id = "a".into();
        let mut second = workout(vec![exercise("b1", vec![set("s1", false)])]);
        second.id = "b".into();

        let state = apply(WorkoutProgressState::default(), vec![load("a"), load("b")]);

        // Results of the replaced request change nothing, success or failure.
        let state = apply(state.clone(), vec![load_result(first.clone()), load_failure("a")]);
        assert!(state.is_loading);
        assert!(!state.is_error);
        assert!(state.workout.exercises.is_empty());

        let state = reduce(state, load_result(second)).state;
        assert!(!state.is_loading);
        assert_eq!(state.workout.id, "b");

        let state = reduce(state, load_result(first)).state;
        assert_eq!(state.workout.id, "b");
    }

    #[test]
    fn completing_set_moves_current_to_next_exercise() {
        let state = loaded(workout(vec![
            exercise("e1", vec![set("s1", false)]),
            exercise("e2", vec![set("s2", false)]),
        ]));
        assert_eq!(current_ids(&state), vec!["e1"]);

        let state = reduce(state, toggle_set("e1", "s1")).state;
        assert!(state.workout.exercises[0].is_complete());
        assert_eq!(current_ids(&state), vec!["e2"]);
    }

    #[test]
    fn toggle_exercise_flips_all_sets_by_aggregate() {
        let state = loaded(workout(vec![exercise(
            "e1",
            vec![set("s1", true), set("s2", false)],
        )]));

        let state = reduce(state, toggle_exercise("e1")).state;
        assert!(state.workout.exercises[0].sets.iter().all(|s| s.is_complete));
        assert!(current_ids(&state).is_empty());

        let state = reduce(state, toggle_exercise("e1")).state;
        assert!(state.workout.exercises[0].sets.iter().all(|s| !s.is_complete));
        assert_eq!(current_ids(&state), vec!["e1"]);
    }

    #[test]
    fn double_toggle_restores_uniform_sets() {
        let original = loaded(workout(vec![
            exercise("e1", vec![set("s1", false), set("s2", false)]),
            exercise("e2", vec![set("s3", true), set("s4", true)]),
        ]));
        let state = apply(
            original.clone(),
            vec![toggle_exercise("e2"), toggle_exercise("e2")],
        );
        assert_eq!(state.workout.exercises[1].sets, original.workout.exercises[1].sets);
        let state = apply(
            original.clone(),
            vec![toggle_exercise("e1"), toggle_exercise("e1")],
        );
        assert_eq!(state.workout.exercises[0].sets, original.workout.exercises[0].sets);
    }

    #[test]
    fn toggling_last_incomplete_exercise_leaves_nothing_current() {
        let state = loaded(workout(vec![
            exercise("e1", vec![set("s1", true)]),
            exercise("e2", vec![set("s2", false), set("s3", true)]),
        ]));
        let state = reduce(state, toggle_exercise("e2")).state;
        assert!(state.workout.is_complete());
        assert!(current_ids(&state).is_empty());
    }

    #[test]
    fn unknown_ids_leave_state_untouched() {
        let state = loaded(workout(vec![
            exercise("e1", vec![set("s1", true)]),
            exercise("e2", vec![set("s2", false)]),
        ]));
        for intent in [
            toggle_exercise("nope"),
            toggle_set("e1", "nope"),
            toggle_set("nope", "s1"),
            WorkoutProgressIntent::ToggleExercisePreview {
                exercise_id: "nope".into(),
            },
        ] {
            let reduction = reduce(state.clone(), intent);
            assert_eq!(reduction.state, state);
            assert!(reduction.effect.is_none());
        }
    }

    #[test]
    fn preview_toggle_does_not_move_current() {
        let state = loaded(workout(vec![
            exercise("e1", vec![set("s1", false)]),
            exercise("e2", vec![set("s2", false)]),
        ]));
        let state = reduce(
            state,
            WorkoutProgressIntent::ToggleExercisePreview {
                exercise_id: "e2".into(),
            },
        )
        .state;
        assert!(state.workout.exercises[1].is_in_preview_mode);
        assert!(!state.workout.exercises[0].is_in_preview_mode);
        assert_eq!(current_ids(&state), vec!["e1"]);
    }

    #[test]
    fn complete_workout_then_toggle_set_reopens_one_set() {
        let state = loaded(workout(vec![
            exercise("e1", vec![set("s1", false), set("s2", false)]),
            exercise("e2", vec![set("s3", false)]),
        ]));
        let state = reduce(state, WorkoutProgressIntent::CompleteWorkout).state;
        assert!(state.workout.is_complete());
        assert!(current_ids(&state).is_empty());

        let state = reduce(state, toggle_set("e2", "s3")).state;
        let open: Vec<_> = state
            .workout
            .exercises
            .iter()
            .flat_map(|e| e.sets.iter())
            .filter(|s| !s.is_complete)
            .map(|s| s.id.as_str())
            .collect();
        assert_eq!(open, vec!["s3"]);
        assert_eq!(current_ids(&state), vec!["e2"]);
    }

    #[test]
    fn at_most_one_current_exercise_over_a_session() {
        let mut state = loaded(workout(vec![
            exercise("e1", vec![set("s1", false), set("s2", false)]),
            exercise("e2", vec![set("s3", false)]),
            exercise("e3", vec![set("s4", true)]),
        ]));
        let intents = vec![
            toggle_set("e1", "s1"),
            toggle_exercise("e2"),
            toggle_set("e1", "s2"),
            toggle_exercise("e3"),
            toggle_set("e1", "s1"),
            WorkoutProgressIntent::CompleteWorkout,
            toggle_exercise("e1"),
            toggle_set("e2", "s3"),
        ];
        for intent in intents {
            state = reduce(state, intent).state;
            let current = current_ids(&state);
            let expected: Vec<&str> = state
                .workout
                .exercises
                .iter()
                .find(|e| !e.is_complete())
                .map(|e| vec![e.id.as_str()])
                .unwrap_or_default();
            assert_eq!(current, expected);
        }
    }

    #[test]
    fn finish_emits_persist_then_single_navigation() {
        let state = loaded(workout(vec![exercise("e1", vec![set("s1", true)])]));
        let before = state.clone();

        let reduction = reduce(state, WorkoutProgressIntent::FinishWorkout);
        assert!(reduction.state.is_saving);
        assert_eq!(
            reduction.effect,
            Some(ProgressEffect::PersistWorkout(before.workout.clone()))
        );

        let again = reduce(reduction.state.clone(), WorkoutProgressIntent::FinishWorkout);
        assert!(again.effect.is_none());

        let saved = reduce(reduction.state, WorkoutProgressIntent::WorkoutSaved { saved: true });
        assert_eq!(
            saved.effect,
            Some(ProgressEffect::Signal(WorkoutProgressSignal::NavigateHome))
        );
        assert_eq!(saved.state, before);

        let replay = reduce(saved.state, WorkoutProgressIntent::WorkoutSaved { saved: true });
        assert!(replay.effect.is_none());
    }

    #[test]
    fn save_failures_are_surfaced() {
        let state = loaded(workout(vec![exercise("e1", vec![set("s1", true)])]));
        let saving = reduce(state, WorkoutProgressIntent::FinishWorkout).state;

        let failed = reduce(saving.clone(), WorkoutProgressIntent::WorkoutSaveFailed);
        assert!(failed.state.save_failed);
        assert!(!failed.state.is_saving);
        assert!(failed.effect.is_none());

        let rejected = reduce(saving, WorkoutProgressIntent::WorkoutSaved { saved: false });
        assert!(rejected.state.save_failed);
        assert!(rejected.effect.is_none());

        let retry = reduce(rejected.state, WorkoutProgressIntent::FinishWorkout);
        assert!(!retry.state.save_failed);
        assert!(matches!(retry.effect, Some(ProgressEffect::PersistWorkout(_))));
    }
}
