use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use anyhow::{Result, anyhow};
use futures::FutureExt;
use log::{debug, error, info, warn};
use tokio::runtime::Handle;
use tokio::sync::{Mutex, mpsc, watch};
use tokio::task::{AbortHandle, JoinHandle, JoinSet};

use super::intent::{ProgressEffect, WorkoutProgressIntent, WorkoutProgressSignal};
use super::reducer::{Reduction, reduce};
use super::state::WorkoutProgressState;
use crate::repository::WorkoutRepository;

/// Owns the progress state of one workout screen.
///
/// Intents are reduced one at a time on a dedicated task. Fetching and
/// persisting run as separate tasks whose results are fed back through the
/// same loop. Dropping the store (or calling [`shutdown`](Self::shutdown))
/// stops the loop and aborts whatever is still in flight, so late results
/// never reach the state.
pub struct WorkoutProgressStore {
    intents: mpsc::UnboundedSender<WorkoutProgressIntent>,
    state: watch::Receiver<WorkoutProgressState>,
    signals: Mutex<mpsc::UnboundedReceiver<WorkoutProgressSignal>>,
    task: JoinHandle<()>,
}

impl WorkoutProgressStore {
    /// Spawn the store on the runtime the caller is running in.
    pub fn spawn(repository: Arc<WorkoutRepository>, initial: WorkoutProgressState) -> Result<Self> {
        let handle = Handle::try_current()
            .map_err(|e| anyhow!("WorkoutProgressStore needs a tokio runtime: {}", e))?;
        Ok(Self::spawn_on(&handle, repository, initial))
    }

    pub fn spawn_on(
        handle: &Handle,
        repository: Arc<WorkoutRepository>,
        initial: WorkoutProgressState,
    ) -> Self {
        let (intents_tx, intents_rx) = mpsc::unbounded_channel();
        let (state_tx, state_rx) = watch::channel(initial);
        let (signals_tx, signals_rx) = mpsc::unbounded_channel();

        let store_loop = StoreLoop {
            repository,
            intents: intents_rx,
            state: state_tx,
            signals: signals_tx,
            effects: JoinSet::new(),
            pending_fetch: None,
        };
        let task = handle.spawn(store_loop.run());

        Self {
            intents: intents_tx,
            state: state_rx,
            signals: Mutex::new(signals_rx),
            task,
        }
    }

    pub fn dispatch(&self, intent: WorkoutProgressIntent) -> Result<()> {
        self.intents
            .send(intent)
            .map_err(|e| anyhow!("Workout progress store is closed, dropped {}", e.0.name()))
    }

    pub fn load(&self, workout_id: &str) -> Result<()> {
        self.dispatch(WorkoutProgressIntent::LoadWorkout {
            workout_id: workout_id.to_string(),
        })
    }

    pub fn state(&self) -> WorkoutProgressState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<WorkoutProgressState> {
        self.state.clone()
    }

    /// Wait until the state satisfies `predicate`, checking the current value first.
    pub async fn wait_for(
        &self,
        predicate: impl FnMut(&WorkoutProgressState) -> bool,
    ) -> Result<WorkoutProgressState> {
        let mut rx = self.state.clone();
        let state = rx
            .wait_for(predicate)
            .await
            .map_err(|_| anyhow!("Workout progress store stopped"))?;
        Ok(state.clone())
    }

    /// Next one-shot signal. `None` once the store has stopped and every
    /// signal has been taken.
    pub async fn next_signal(&self) -> Option<WorkoutProgressSignal> {
        self.signals.lock().await.recv().await
    }

    pub fn try_next_signal(&self) -> Option<WorkoutProgressSignal> {
        self.signals.try_lock().ok()?.try_recv().ok()
    }

    /// Stop accepting intents, discard in-flight work and wait for the loop
    /// to finish.
    pub async fn shutdown(self) {
        let Self { intents, task, .. } = self;
        drop(intents);
        if let Err(e) = task.await {
            warn!("Workout progress loop ended abnormally: {}", e);
        }
    }
}

struct StoreLoop {
    repository: Arc<WorkoutRepository>,
    intents: mpsc::UnboundedReceiver<WorkoutProgressIntent>,
    state: watch::Sender<WorkoutProgressState>,
    signals: mpsc::UnboundedSender<WorkoutProgressSignal>,
    effects: JoinSet<WorkoutProgressIntent>,
    pending_fetch: Option<AbortHandle>,
}

impl StoreLoop {
    async fn run(mut self) {
        debug!("Workout progress loop started");
        loop {
            // Queued intents go before effect results.
            let intent = tokio::select! {
                biased;
                incoming = self.intents.recv() => match incoming {
                    Some(intent) => intent,
                    None => break,
                },
                Some(joined) = self.effects.join_next() => match joined {
                    Ok(intent) => intent,
                    // Only replaced fetches are aborted; panics are caught in spawn_effect.
                    Err(e) => {
                        debug!("Workout progress effect cancelled: {}", e);
                        continue;
                    }
                },
            };
            self.apply(intent);
        }

        if !self.effects.is_empty() {
            info!(
                "Workout progress store closed, discarding {} in-flight operations",
                self.effects.len()
            );
        }
        self.effects.shutdown().await;
        debug!("Workout progress loop stopped");
    }

    fn apply(&mut self, intent: WorkoutProgressIntent) {
        debug!("Reducing {}", intent.name());
        let previous = self.state.borrow().clone();
        let Reduction { state, effect } = reduce(previous, intent);
        self.state.send_if_modified(|current| {
            if *current == state {
                false
            } else {
                *current = state;
                true
            }
        });
        if let Some(effect) = effect {
            self.run_effect(effect);
        }
    }

    fn run_effect(&mut self, effect: ProgressEffect) {
        match effect {
            ProgressEffect::FetchWorkout { workout_id } => {
                if let Some(previous) = self.pending_fetch.take() {
                    previous.abort();
                }
                let repository = Arc::clone(&self.repository);
                let on_panic = WorkoutProgressIntent::WorkoutLoadFailed {
                    workout_id: workout_id.clone(),
                };
                let handle = self.spawn_effect(on_panic, async move {
                    let fetched = repository.fetch_workout(&workout_id).await;
                    match fetched {
                        Ok(workout) => WorkoutProgressIntent::WorkoutLoaded { workout_id, workout },
                        Err(e) => {
                            warn!("Failed to load workout {}: {:#}", workout_id, e);
                            WorkoutProgressIntent::WorkoutLoadFailed { workout_id }
                        }
                    }
                });
                self.pending_fetch = Some(handle);
            }
            ProgressEffect::PersistWorkout(workout) => {
                let repository = Arc::clone(&self.repository);
                self.spawn_effect(WorkoutProgressIntent::WorkoutSaveFailed, async move {
                    match repository.persist_finished_workout(&workout).await {
                        Ok(saved) => {
                            if !saved {
                                warn!("Workout {} was not saved", workout.id);
                            }
                            WorkoutProgressIntent::WorkoutSaved { saved }
                        }
                        Err(e) => {
                            warn!("Failed to save workout {}: {:#}", workout.id, e);
                            WorkoutProgressIntent::WorkoutSaveFailed
                        }
                    }
                });
            }
            ProgressEffect::Signal(signal) => {
                if self.signals.send(signal).is_err() {
                    debug!("No receiver for {:?}", signal);
                }
            }
        }
    }

    /// Run `task` on the effect set. A panic inside it is reported back to the
    /// loop as `on_panic` so the matching in-flight flag gets cleared.
    fn spawn_effect(
        &mut self,
        on_panic: WorkoutProgressIntent,
        task: impl Future<Output = WorkoutProgressIntent> + Send + 'static,
    ) -> AbortHandle {
        self.effects.spawn(async move {
            match AssertUnwindSafe(task).catch_unwind().await {
                Ok(intent) => intent,
                Err(_) => {
                    error!("Workout progress effect panicked, reporting {}", on_panic.name());
                    on_panic
                }
            }
        })
    }
}
