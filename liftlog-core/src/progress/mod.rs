//! Workout-progress screen state.
//!
//! Intents from the UI (and completions of fetch/persist work) are folded into
//! a [`WorkoutProgressState`] by [`reduce`]. Anything that has to leave the
//! reducer comes back as a [`ProgressEffect`]; the [`WorkoutProgressStore`]
//! owns the state for one screen and runs those effects.

mod intent;
mod reducer;
mod state;
mod store;

pub use intent::{ProgressEffect, WorkoutProgressIntent, WorkoutProgressSignal};
pub use reducer::{Reduction, recompute_current_exercise, reduce};
pub use state::WorkoutProgressState;
pub use store::WorkoutProgressStore;
