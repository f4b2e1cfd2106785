//! Workout domain model shared by the progress reducer, the database layer
//! and the bindings.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SetType {
    Warmup,
    #[default]
    Working,
    Failure,
}

impl SetType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SetType::Warmup => "warmup",
            SetType::Working => "working",
            SetType::Failure => "failure",
        }
    }
}

impl fmt::Display for SetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SetType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "warmup" => Ok(SetType::Warmup),
            "working" => Ok(SetType::Working),
            "failure" => Ok(SetType::Failure),
            other => Err(anyhow::anyhow!("unknown set type: {}", other)),
        }
    }
}

/// A single set. Reps, weight and rest are kept as the free-form strings the
/// user typed into the plan.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WorkoutSet {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub reps: String,
    #[serde(default)]
    pub weight: String,
    #[serde(default)]
    pub rest_seconds: String,
    #[serde(default, rename = "type")]
    pub set_type: SetType,
    #[serde(default)]
    pub is_complete: bool,
}

impl fmt::Display for WorkoutSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mark = if self.is_complete { "x" } else { " " };
        write!(
            f,
            "[{}] {} {} x {} reps, rest {}s",
            mark, self.set_type, self.weight, self.reps, self.rest_seconds
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Exercise {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub sets: Vec<WorkoutSet>,
    #[serde(default, skip_serializing)]
    pub is_current: bool,
    #[serde(default, skip_serializing)]
    pub is_in_preview_mode: bool,
}

impl Exercise {
    /// An exercise is complete once every one of its sets is. An exercise
    /// without sets counts as complete.
    pub fn is_complete(&self) -> bool {
        self.sets.iter().all(|s| s.is_complete)
    }

    pub fn completed_set_count(&self) -> usize {
        self.sets.iter().filter(|s| s.is_complete).count()
    }

    pub fn find_set(&self, set_id: &str) -> Option<&WorkoutSet> {
        self.sets.iter().find(|s| s.id == set_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Workout {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub exercises: Vec<Exercise>,
}

impl Workout {
    pub fn find_exercise(&self, exercise_id: &str) -> Option<&Exercise> {
        self.exercises.iter().find(|e| e.id == exercise_id)
    }

    pub fn current_exercise(&self) -> Option<&Exercise> {
        self.exercises.iter().find(|e| e.is_current)
    }

    pub fn is_complete(&self) -> bool {
        self.exercises.iter().all(Exercise::is_complete)
    }

    pub fn total_set_count(&self) -> usize {
        self.exercises.iter().map(|e| e.sets.len()).sum()
    }

    pub fn completed_set_count(&self) -> usize {
        self.exercises.iter().map(Exercise::completed_set_count).sum()
    }

    /// Give exercises and sets without an id one derived from their parent
    /// and position. The workout itself must already have an id.
    pub fn assign_missing_ids(&mut self) -> anyhow::Result<()> {
        if self.id.trim().is_empty() {
            return Err(anyhow::anyhow!("Workout id is required"));
        }
        for (e_idx, exercise) in self.exercises.iter_mut().enumerate() {
            if exercise.id.trim().is_empty() {
                exercise.id = format!("{}-e{}", self.id, e_idx + 1);
            }
            for (s_idx, set) in exercise.sets.iter_mut().enumerate() {
                if set.id.trim().is_empty() {
                    set.id = format!("{}-s{}", exercise.id, s_idx + 1);
                }
            }
        }
        Ok(())
    }

    /// Parse a workout plan from JSON.
    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        serde_json::from_str(json).map_err(|e| anyhow::anyhow!("Invalid workout JSON: {}", e))
    }
}
