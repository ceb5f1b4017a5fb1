//! Reconciliation between settings edits and the live run.
//!
//! The settings surface edits routine definitions while a run may be in
//! flight. Every edit funnels through [`RoutineSync`], which decides
//! whether the live runner is affected at all and, when it is, how much
//! in-flight progress to keep.

use serde::{Deserialize, Serialize};

use crate::events::RunnerEvent;
use crate::routine::Routine;
use crate::runner::RoutineRunner;

/// What happens to in-flight progress when the live routine is edited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SyncPolicy {
    /// Keep progress for steps whose ids survive the edit; countdowns
    /// clamp into the new budgets.
    #[default]
    Preserve,
    /// Restart the run from the top on the edited definition.
    Reset,
}

/// Outcome of one reconciliation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// The edit targeted a different routine; the live run is untouched.
    Ignored,
    /// The live routine was hot-swapped with progress carried over.
    Swapped,
    /// The live run restarted on the edited definition.
    Restarted,
}

/// Applies routine edits to a live run according to policy.
#[derive(Debug, Clone, Copy, Default)]
pub struct RoutineSync {
    policy: SyncPolicy,
}

impl RoutineSync {
    pub fn new(policy: SyncPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> SyncPolicy {
        self.policy
    }

    /// Reconcile an edited definition with a live run. Routine ids must
    /// match for the edit to reach the runner at all; edits to other
    /// routines (or other profiles) leave the run alone.
    pub fn reconcile(
        &self,
        runner: &mut RoutineRunner,
        edited: &Routine,
    ) -> (SyncOutcome, Vec<RunnerEvent>) {
        self.reconcile_at(runner, edited, crate::runner::now_ms())
    }

    /// Timestamped form for hosts that carry their own clock.
    pub fn reconcile_at(
        &self,
        runner: &mut RoutineRunner,
        edited: &Routine,
        now_ms: u64,
    ) -> (SyncOutcome, Vec<RunnerEvent>) {
        if runner.routine().id != edited.id {
            return (SyncOutcome::Ignored, Vec::new());
        }
        match self.policy {
            SyncPolicy::Preserve => (SyncOutcome::Swapped, runner.hot_swap_at(edited, now_ms)),
            SyncPolicy::Reset => (SyncOutcome::Restarted, runner.replace(edited.clone())),
        }
    }
}
