use crate::progress::{WorkoutProgressState, WorkoutProgressStore};
use crate::repository::WorkoutRepository;
use crate::uniffi_interface::errors::LiftlogError;
use crate::uniffi_interface::objects::{ProgressIntent, ProgressSignal, WorkoutProgressUiState};
use crate::workout::Workout;
use crate::db;
use log::*;
use std::sync::{Arc, Mutex};

/// A workout-progress screen as seen from the app. Closing it (or letting it
/// be freed) stops the underlying store.
#[derive(uniffi::Object)]
pub struct WorkoutProgressSession {
    store: Mutex<Option<WorkoutProgressStore>>,
}

impl WorkoutProgressSession {
    fn with_store<T>(
        &self,
        f: impl FnOnce(&WorkoutProgressStore) -> T,
    ) -> std::result::Result<T, LiftlogError> {
        let guard = self
            .store
            .lock()
            .map_err(|e| LiftlogError::Common(e.to_string()))?;
        guard.as_ref().map(f).ok_or(LiftlogError::SessionClosed)
    }
}

#[uniffi::export]
impl WorkoutProgressSession {
    pub fn dispatch(&self, intent: ProgressIntent) -> std::result::Result<(), LiftlogError> {
        debug!("WorkoutProgressSession::dispatch {:?}", intent);
        self.with_store(|store| store.dispatch(intent.into()))??;
        Ok(())
    }

    pub fn state(&self) -> std::result::Result<WorkoutProgressUiState, LiftlogError> {
        self.with_store(|store| store.state().into())
    }

    /// Drain pending one-shot signals. Each signal is returned exactly once.
    pub fn take_signals(&self) -> std::result::Result<Vec<ProgressSignal>, LiftlogError> {
        self.with_store(|store| {
            std::iter::from_fn(|| store.try_next_signal())
                .map(ProgressSignal::from)
                .collect()
        })
    }

    pub fn close(&self) {
        if let Ok(mut guard) = self.store.lock() {
            if guard.take().is_some() {
                info!("WorkoutProgressSession closed");
            }
        }
    }
}

#[uniffi::export]
pub fn open_workout_progress(
    db_path: &str,
    workout_id: &str,
) -> std::result::Result<Arc<WorkoutProgressSession>, LiftlogError> {
    let rt = crate::runtime::init_global_runtime_blocking();
    let repository = Arc::new(WorkoutRepository::open_sqlite(db_path)?);
    let store =
        WorkoutProgressStore::spawn_on(rt.handle(), repository, WorkoutProgressState::default());
    store.load(workout_id)?;
    Ok(Arc::new(WorkoutProgressSession {
        store: Mutex::new(Some(store)),
    }))
}

/// Store a workout plan given as JSON and return its id.
#[uniffi::export]
pub fn import_workout_json(db_path: &str, json: &str) -> std::result::Result<String, LiftlogError> {
    let mut workout = Workout::from_json(json)?;
    workout.assign_missing_ids()?;
    let rt = crate::runtime::init_global_runtime_blocking();
    let repository = WorkoutRepository::open_sqlite(db_path)?;
    rt.block_on(repository.import_workout(&workout))?;
    info!("Imported workout {} ({})", workout.id, workout.name);
    Ok(workout.id)
}

#[uniffi::export]
pub fn reset_database(db_path: &str) -> std::result::Result<(), LiftlogError> {
    let pool = db::open(db_path)?;
    let mut conn = pool.get().map_err(|e| LiftlogError::Common(e.to_string()))?;
    db::drop_all_tables(&mut conn)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    const PLAN: &str = r#"{"id":"w1","name":"Pull","exercises":[
        {"id":"e1","name":"Row","sets":[{"id":"s1","reps":"8","weight":"70","rest_seconds":"120","type":"working"}]},
        {"id":"e2","name":"Curl","sets":[{"id":"s2","reps":"12","weight":"15","rest_seconds":"60","type":"failure"}]}
    ]}"#;

    fn poll_state(
        session: &WorkoutProgressSession,
        mut predicate: impl FnMut(&WorkoutProgressUiState) -> bool,
    ) -> WorkoutProgressUiState {
        let deadline = Instant::now() + Duration::from_secs(5);
        loop {
            let state = session.state().unwrap();
            if predicate(&state) || Instant::now() > deadline {
                return state;
            }
            std::thread::sleep(Duration::from_millis(10));
        }
    }

    #[test]
    fn session_tracks_and_finishes_workout() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bindings.db");
        let path = path.to_str().unwrap();
        assert_eq!(import_workout_json(path, PLAN).unwrap(), "w1");

        let session = open_workout_progress(path, "w1").unwrap();
        let state = poll_state(&session, |s| !s.is_loading);
        assert!(!state.is_error);
        assert!(state.workout.exercises[0].is_current);

        session
            .dispatch(ProgressIntent::ToggleExerciseStatus {
                exercise_id: "e1".into(),
            })
            .unwrap();
        let state = poll_state(&session, |s| s.workout.exercises[1].is_current);
        assert_eq!(state.workout.completed_sets, 1);

        session.dispatch(ProgressIntent::FinishWorkout).unwrap();
        let mut signals = Vec::new();
        let deadline = Instant::now() + Duration::from_secs(5);
        while signals.is_empty() && Instant::now() < deadline {
            signals.extend(session.take_signals().unwrap());
            std::thread::sleep(Duration::from_millis(10));
        }
        assert_eq!(signals, vec![ProgressSignal::NavigateHome]);
        assert!(session.take_signals().unwrap().is_empty());

        session.close();
        assert!(matches!(
            session.dispatch(ProgressIntent::CompleteWorkout),
            Err(LiftlogError::SessionClosed)
        ));
    }
}
