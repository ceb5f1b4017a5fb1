//! The live-run state machine.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::{SystemTime, UNIX_EPOCH};

use super::clock::ElapsedClock;
use crate::events::{FinishCause, RunnerEvent};
use crate::routine::{Routine, StepStatus};

/// How many steps may run at the same time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RunPolicy {
    /// Any number of steps may run at once; elapsed time applies to all
    /// of them.
    #[default]
    Concurrent,
    /// Starting a step sends every other running step back to todo,
    /// keeping its remaining time for a later restart.
    Exclusive,
}

/// Drives one routine through a live run.
///
/// The runner owns its copy of the routine for the duration of the run and
/// works purely on wall-clock deltas: mutating commands take an explicit
/// epoch-millisecond timestamp (the `*_at` forms), with thin wrappers that
/// read the system clock. There is no internal thread; the host calls
/// [`tick`](RoutineRunner::tick) on its own cadence and routes visibility
/// or focus resumes through [`resume_hint`](RoutineRunner::resume_hint).
///
/// Two countdowns run side by side. Each counting step burns its own
/// `remaining_secs`, and an aggregate countdown tracks time left for the
/// whole run. The aggregate activates at the first timed start and then
/// free-runs until pause, reset or completion, so it keeps draining while
/// nothing is counting. Each countdown has its own [`ElapsedClock`] anchor,
/// and the whole runner serializes anchors included, which lets a
/// short-lived host resume a run and count the downtime as elapsed.
///
/// Commands return the batch of [`RunnerEvent`]s they caused; an unknown
/// step id or an already-satisfied command returns an empty batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutineRunner {
    routine: Routine,
    paused: bool,
    #[serde(default)]
    policy: RunPolicy,
    /// Aggregate budget for this run, frozen at open/reset.
    total_secs: u64,
    total_remaining_secs: u64,
    /// Set at the first timed start; cleared by pause only indirectly
    /// (the anchor freezes), by reset, and by completion.
    #[serde(default)]
    total_active: bool,
    #[serde(default)]
    step_clock: ElapsedClock,
    #[serde(default)]
    total_clock: ElapsedClock,
    /// Completion latch: the signal fires once per run.
    #[serde(default)]
    completion_fired: bool,
    /// Completion guard: at least one step actually reached done this
    /// run. Keeps an untouched or empty routine from reading as complete.
    #[serde(default)]
    any_done: bool,
}

impl RoutineRunner {
    /// Open a routine for a fresh run: every step back to todo with a full
    /// budget, aggregate re-derived from the step budgets.
    pub fn open(mut routine: Routine, policy: RunPolicy) -> Self {
        debug_assert!(
            unique_step_ids(&routine),
            "duplicate step id in routine {}",
            routine.id
        );
        routine.reset_all();
        let total = routine.total_budget_secs();
        Self {
            routine,
            paused: false,
            policy,
            total_secs: total,
            total_remaining_secs: total,
            total_active: false,
            step_clock: ElapsedClock::default(),
            total_clock: ElapsedClock::default(),
            completion_fired: false,
            any_done: false,
        }
    }

    pub fn routine(&self) -> &Routine {
        &self.routine
    }

    pub(crate) fn routine_mut(&mut self) -> &mut Routine {
        &mut self.routine
    }

    pub fn paused(&self) -> bool {
        self.paused
    }

    pub fn policy(&self) -> RunPolicy {
        self.policy
    }

    /// Aggregate budget for this run, in seconds.
    pub fn total_secs(&self) -> u64 {
        self.total_secs
    }

    /// Aggregate countdown, in seconds.
    pub fn total_remaining_secs(&self) -> u64 {
        self.total_remaining_secs
    }

    /// The completion signal already fired for this run.
    pub fn is_complete(&self) -> bool {
        self.completion_fired
    }

    /// Fraction of the aggregate budget consumed, `0.0..=1.0`.
    pub fn progress(&self) -> f64 {
        if self.total_secs == 0 {
            return 0.0;
        }
        1.0 - (self.total_remaining_secs as f64 / self.total_secs as f64)
    }

    /// Point-in-time view for status displays.
    pub fn snapshot(&self) -> RunnerEvent {
        RunnerEvent::Snapshot {
            routine_id: self.routine.id.clone(),
            routine_title: self.routine.title.clone(),
            paused: self.paused,
            total_secs: self.total_secs,
            total_remaining_secs: self.total_remaining_secs,
            steps_done: self.routine.done_count(),
            steps_total: self.routine.steps.len(),
            progress: self.progress(),
            at: Utc::now(),
        }
    }

    /// Start a todo step. Done and already-running steps are left alone,
    /// as are unknown ids. Elapsed time up to `now_ms` is flushed first,
    /// so a step is only ever charged for time it spent running. The step
    /// resumes from its current remaining time; only a todo reset or
    /// [`reset`](RoutineRunner::reset) re-seeds the budget.
    pub fn start_step(&mut self, step_id: &str) -> Vec<RunnerEvent> {
        self.start_step_at(step_id, now_ms())
    }

    pub fn start_step_at(&mut self, step_id: &str, now_ms: u64) -> Vec<RunnerEvent> {
        match self.routine.step(step_id) {
            Some(step) if step.status == StepStatus::Todo => {}
            _ => return Vec::new(),
        }

        // elapsed up to now belongs to the steps that were counting;
        // flush before the counting set changes
        let mut events = self.tick_at(now_ms);

        if self.policy == RunPolicy::Exclusive {
            for step in &mut self.routine.steps {
                if step.id != step_id && step.status == StepStatus::Running {
                    // back to todo but keep the countdown, unlike a
                    // user-facing todo reset
                    step.status = StepStatus::Todo;
                    events.push(RunnerEvent::StepDemoted {
                        step_id: step.id.clone(),
                        remaining_secs: step.remaining_secs,
                        at: Utc::now(),
                    });
                }
            }
        }

        self.routine.set_status(step_id, StepStatus::Running);
        let remaining = self.routine.step(step_id).map_or(0, |s| s.remaining_secs);
        events.push(RunnerEvent::StepStarted {
            step_id: step_id.to_string(),
            remaining_secs: remaining,
            at: Utc::now(),
        });

        self.sync_anchors(now_ms);
        events
    }

    /// Mark a step done by hand. Unknown ids and already-done steps are
    /// no-ops.
    pub fn complete_step(&mut self, step_id: &str) -> Vec<RunnerEvent> {
        self.complete_step_at(step_id, now_ms())
    }

    pub fn complete_step_at(&mut self, step_id: &str, now_ms: u64) -> Vec<RunnerEvent> {
        let mut events = Vec::new();
        match self.routine.step(step_id) {
            Some(step) if step.status != StepStatus::Done => {}
            _ => return events,
        }

        self.routine.set_status(step_id, StepStatus::Done);
        self.any_done = true;
        events.push(RunnerEvent::StepFinished {
            step_id: step_id.to_string(),
            cause: FinishCause::Manual,
            at: Utc::now(),
        });

        self.detect_completion(&mut events);
        self.sync_anchors(now_ms);
        events
    }

    /// Apply wall-clock time to the run.
    ///
    /// One funnel serves the periodic tick and every resume path, so a
    /// long suspension is caught up in a single jump rather than lost or
    /// double-counted. Elapsed whole seconds go to every counting step;
    /// steps that hit zero turn done. The aggregate countdown drains
    /// through its own anchor whenever it is active.
    pub fn tick(&mut self) -> Vec<RunnerEvent> {
        self.tick_at(now_ms())
    }

    pub fn tick_at(&mut self, now_ms: u64) -> Vec<RunnerEvent> {
        let mut events = Vec::new();
        if self.paused {
            return events;
        }

        let step_secs = if self.routine.has_counting_step() {
            self.step_clock.observe_secs_at(now_ms)
        } else {
            self.step_clock.clear();
            0
        };

        if step_secs > 0 {
            for step in &mut self.routine.steps {
                if !step.is_counting() {
                    continue;
                }
                step.remaining_secs = step.remaining_secs.saturating_sub(step_secs);
                if step.remaining_secs == 0 {
                    step.status = StepStatus::Done;
                    self.any_done = true;
                    events.push(RunnerEvent::StepFinished {
                        step_id: step.id.clone(),
                        cause: FinishCause::Budget,
                        at: Utc::now(),
                    });
                }
            }
        }

        if self.total_active {
            let total_secs = self.total_clock.observe_secs_at(now_ms);
            self.total_remaining_secs = self.total_remaining_secs.saturating_sub(total_secs);
        }

        self.detect_completion(&mut events);
        self.sync_anchors(now_ms);
        events
    }

    /// The host surface became visible or regained focus. Same elapsed
    /// funnel as the periodic tick.
    pub fn resume_hint(&mut self) -> Vec<RunnerEvent> {
        self.resume_hint_at(now_ms())
    }

    pub fn resume_hint_at(&mut self, now_ms: u64) -> Vec<RunnerEvent> {
        self.tick_at(now_ms)
    }

    /// Freeze the run. Elapsed time up to `now_ms` is flushed first, then
    /// the anchors drop so the paused span contributes nothing.
    pub fn pause(&mut self) -> Vec<RunnerEvent> {
        self.pause_at(now_ms())
    }

    pub fn pause_at(&mut self, now_ms: u64) -> Vec<RunnerEvent> {
        if self.paused {
            return Vec::new();
        }
        let mut events = self.tick_at(now_ms);
        // the flush may have completed the routine, which pauses on its own
        if !self.paused {
            self.paused = true;
            self.step_clock.clear();
            self.total_clock.clear();
            events.push(RunnerEvent::RoutinePaused {
                total_remaining_secs: self.total_remaining_secs,
                at: Utc::now(),
            });
        }
        events
    }

    /// Thaw a paused run. Counting restarts from `now_ms`; the paused span
    /// is never applied.
    pub fn resume(&mut self) -> Vec<RunnerEvent> {
        self.resume_at(now_ms())
    }

    pub fn resume_at(&mut self, now_ms: u64) -> Vec<RunnerEvent> {
        if !self.paused {
            return Vec::new();
        }
        self.paused = false;
        self.sync_anchors(now_ms);
        vec![RunnerEvent::RoutineResumed {
            total_remaining_secs: self.total_remaining_secs,
            at: Utc::now(),
        }]
    }

    pub fn toggle_pause(&mut self) -> Vec<RunnerEvent> {
        self.toggle_pause_at(now_ms())
    }

    pub fn toggle_pause_at(&mut self, now_ms: u64) -> Vec<RunnerEvent> {
        if self.paused {
            self.resume_at(now_ms)
        } else {
            self.pause_at(now_ms)
        }
    }

    /// Restart the run from the top: all steps todo with full budgets,
    /// aggregate re-derived, completion latch cleared so the signal can
    /// fire again.
    pub fn reset(&mut self) -> Vec<RunnerEvent> {
        self.routine.reset_all();
        self.total_secs = self.routine.total_budget_secs();
        self.total_remaining_secs = self.total_secs;
        self.paused = false;
        self.total_active = false;
        self.step_clock.clear();
        self.total_clock.clear();
        self.completion_fired = false;
        self.any_done = false;
        vec![RunnerEvent::RoutineReset {
            routine_id: self.routine.id.clone(),
            at: Utc::now(),
        }]
    }

    /// Swap in an edited definition, carrying progress for steps whose ids
    /// survive the edit.
    ///
    /// Elapsed time up to `now_ms` is flushed to the outgoing definition
    /// first. Carried countdowns clamp into the edited budgets; a running
    /// timed step whose new budget is already consumed turns done. Steps
    /// new to the definition arrive as fresh todos. The aggregate
    /// re-derives from the swapped-in steps and the completion latch
    /// re-seats, so an edit that reopens a completed routine can complete
    /// it again.
    pub fn hot_swap(&mut self, edited: &Routine) -> Vec<RunnerEvent> {
        self.hot_swap_at(edited, now_ms())
    }

    pub fn hot_swap_at(&mut self, edited: &Routine, now_ms: u64) -> Vec<RunnerEvent> {
        debug_assert!(
            unique_step_ids(edited),
            "duplicate step id in routine {}",
            edited.id
        );
        // the backlog settles against the outgoing budgets before any
        // carry-over reads them
        let mut events = self.tick_at(now_ms);
        let mut swapped = edited.clone();
        for step in &mut swapped.steps {
            match self.routine.step(&step.id) {
                Some(old) => {
                    step.status = old.status;
                    step.remaining_secs = match old.status {
                        StepStatus::Done => 0,
                        StepStatus::Todo => step.budget_secs(),
                        StepStatus::Running => old.remaining_secs.min(step.budget_secs()),
                    };
                    if step.is_counting() && step.remaining_secs == 0 {
                        step.status = StepStatus::Done;
                    }
                }
                None => {
                    step.status = StepStatus::Todo;
                    step.remaining_secs = step.budget_secs();
                }
            }
        }

        self.routine = swapped;
        self.total_secs = self.routine.total_budget_secs();
        self.total_remaining_secs = self.routine.total_remaining_secs();
        self.any_done = self.routine.any_done();
        if !self.routine.all_done() {
            self.completion_fired = false;
        }

        self.detect_completion(&mut events);
        self.sync_anchors(now_ms);
        events
    }

    /// Replace the definition outright and restart the run from the top.
    pub fn replace(&mut self, edited: Routine) -> Vec<RunnerEvent> {
        let routine_id = edited.id.clone();
        *self = RoutineRunner::open(edited, self.policy);
        vec![RunnerEvent::RoutineReset {
            routine_id,
            at: Utc::now(),
        }]
    }

    /// Completion is edge-triggered: fires once when the last step turns
    /// done, auto-pausing the run. A reset (or an edit that reopens the
    /// routine) re-arms it. The guard keeps a run in which nothing ever
    /// finished from reading as complete.
    fn detect_completion(&mut self, events: &mut Vec<RunnerEvent>) {
        if self.completion_fired || !self.any_done || !self.routine.all_done() {
            return;
        }
        self.completion_fired = true;
        self.paused = true;
        self.total_active = false;
        self.total_remaining_secs = self.routine.total_remaining_secs();
        events.push(RunnerEvent::RoutineCompleted {
            routine_id: self.routine.id.clone(),
            at: Utc::now(),
        });
    }

    /// Re-seat the anchors after a state change. The step anchor is armed
    /// exactly while some step is counting and the run is live; the
    /// aggregate anchor while the aggregate is active and the run is live.
    /// Arming keeps an existing anchor, so in-flight sub-second remainders
    /// survive command boundaries.
    fn sync_anchors(&mut self, now_ms: u64) {
        if self.routine.has_counting_step() && !self.paused {
            self.step_clock.arm_at(now_ms);
            self.total_active = true;
        } else {
            self.step_clock.clear();
        }
        if self.total_active && !self.paused {
            self.total_clock.arm_at(now_ms);
        } else {
            self.total_clock.clear();
        }
    }
}

fn unique_step_ids(routine: &Routine) -> bool {
    let mut seen = HashSet::new();
    routine.steps.iter().all(|s| seen.insert(s.id.as_str()))
}

pub(crate) fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
