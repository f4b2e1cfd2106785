//! Where workouts come from and where finished ones go.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use anyhow::{Result, anyhow};
use futures::future::BoxFuture;
use log::{debug, info};

use crate::db::{self, DbPool, operations};
use crate::workout::Workout;

type FetchFn = Arc<dyn Fn(String) -> BoxFuture<'static, Result<Workout>> + Send + Sync>;
type PersistFn = Arc<dyn Fn(Workout) -> BoxFuture<'static, Result<bool>> + Send + Sync>;

enum RepositoryBackend {
    Sqlite { pool: DbPool },
    Mock { fetch: FetchFn, persist: PersistFn },
}

pub struct WorkoutRepository {
    backend: RepositoryBackend,
}

impl WorkoutRepository {
    pub fn new_sqlite(pool: DbPool) -> Self {
        Self {
            backend: RepositoryBackend::Sqlite { pool },
        }
    }

    /// Open (and migrate) the database at `db_path`.
    pub fn open_sqlite(db_path: &str) -> Result<Self> {
        info!("WorkoutRepository::open_sqlite path={}", db_path);
        Ok(Self::new_sqlite(db::open(db_path)?))
    }

    pub fn new_mock_fn<F, FFut, P, PFut>(fetch: F, persist: P) -> Self
    where
        F: Fn(String) -> FFut + Send + Sync + 'static,
        FFut: Future<Output = Result<Workout>> + Send + 'static,
        P: Fn(Workout) -> PFut + Send + Sync + 'static,
        PFut: Future<Output = Result<bool>> + Send + 'static,
    {
        debug!("WorkoutRepository::new_mock_fn creating mock backend");
        Self {
            backend: RepositoryBackend::Mock {
                fetch: Arc::new(move |id: String| -> BoxFuture<'static, Result<Workout>> {
                    Box::pin(fetch(id))
                }),
                persist: Arc::new(move |workout: Workout| -> BoxFuture<'static, Result<bool>> {
                    Box::pin(persist(workout))
                }),
            },
        }
    }

    /// Mock backend serving workouts from a map. Persisting succeeds for any
    /// workout the map knows about.
    pub fn new_mock_map(map: HashMap<String, Workout>) -> Self {
        debug!(
            "WorkoutRepository::new_mock_map creating mock map backend with {} entries",
            map.len()
        );
        let m = Arc::new(map);
        let known = Arc::clone(&m);
        Self::new_mock_fn(
            move |id| {
                let found = m.get(&id).cloned();
                async move { found.ok_or_else(|| anyhow!("Workout {} not found", id)) }
            },
            move |workout| {
                let saved = known.contains_key(&workout.id);
                async move { Ok(saved) }
            },
        )
    }

    pub async fn fetch_workout(&self, workout_id: &str) -> Result<Workout> {
        debug!("WorkoutRepository::fetch_workout id={}", workout_id);
        match &self.backend {
            RepositoryBackend::Sqlite { pool } => {
                let pool = pool.clone();
                let id = workout_id.to_string();
                tokio::task::spawn_blocking(move || -> Result<Workout> {
                    let mut conn = pool.get()?;
                    operations::get_workout(&mut conn, &id)?
                        .ok_or_else(|| anyhow!("Workout {} not found", id))
                })
                .await?
            }
            RepositoryBackend::Mock { fetch, .. } => fetch(workout_id.to_string()).await,
        }
    }

    pub async fn persist_finished_workout(&self, workout: &Workout) -> Result<bool> {
        debug!(
            "WorkoutRepository::persist_finished_workout id={} completed_sets={}/{}",
            workout.id,
            workout.completed_set_count(),
            workout.total_set_count()
        );
        match &self.backend {
            RepositoryBackend::Sqlite { pool } => {
                let pool = pool.clone();
                let workout = workout.clone();
                tokio::task::spawn_blocking(move || -> Result<bool> {
                    let mut conn = pool.get()?;
                    operations::save_finished_workout(
                        &mut conn,
                        &workout,
                        chrono::Utc::now().timestamp(),
                    )
                })
                .await?
            }
            RepositoryBackend::Mock { persist, .. } => persist(workout.clone()).await,
        }
    }

    /// Store a new workout plan. Only the SQLite backend keeps plans.
    pub async fn import_workout(&self, workout: &Workout) -> Result<()> {
        match &self.backend {
            RepositoryBackend::Sqlite { pool } => {
                let pool = pool.clone();
                let workout = workout.clone();
                tokio::task::spawn_blocking(move || -> Result<()> {
                    let mut conn = pool.get()?;
                    operations::insert_workout(&mut conn, &workout)
                })
                .await?
            }
            RepositoryBackend::Mock { .. } => Err(anyhow!("Mock repository cannot import workouts")),
        }
    }
}
