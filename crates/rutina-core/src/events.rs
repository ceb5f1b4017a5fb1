//! Events emitted by the live-run engine.
//!
//! Every observable change in a run produces an event; hosts subscribe to
//! the batch returned by each command instead of polling internals. Events
//! serialize with a `type` tag so shells and logs share one format.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What finished a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FinishCause {
    /// The countdown budget ran out.
    Budget,
    /// Marked done by hand.
    Manual,
}

/// A state change in a live routine run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum RunnerEvent {
    /// A step began counting (or waiting, for steps without a timer).
    StepStarted {
        step_id: String,
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    /// A running step was sent back to todo because another step started.
    /// Its remaining time is kept for a later restart.
    StepDemoted {
        step_id: String,
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    /// A step reached done.
    StepFinished {
        step_id: String,
        cause: FinishCause,
        at: DateTime<Utc>,
    },
    /// The run froze; elapsed time stops accruing.
    RoutinePaused {
        total_remaining_secs: u64,
        at: DateTime<Utc>,
    },
    /// The run thawed; counting restarts from this instant.
    RoutineResumed {
        total_remaining_secs: u64,
        at: DateTime<Utc>,
    },
    /// Every step went back to todo with a full budget.
    RoutineReset {
        routine_id: String,
        at: DateTime<Utc>,
    },
    /// The last step of the run turned done. Fires once per run.
    RoutineCompleted {
        routine_id: String,
        at: DateTime<Utc>,
    },
    /// Point-in-time view of a run, for status displays.
    Snapshot {
        routine_id: String,
        routine_title: String,
        paused: bool,
        total_secs: u64,
        total_remaining_secs: u64,
        steps_done: usize,
        steps_total: usize,
        progress: f64,
        at: DateTime<Utc>,
    },
}

impl RunnerEvent {
    /// True for the once-per-run completion signal.
    pub fn is_completion(&self) -> bool {
        matches!(self, RunnerEvent::RoutineCompleted { .. })
    }
}
