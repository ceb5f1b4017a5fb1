//! Routine and step models.
//!
//! Pure data with no clocks attached: everything time-related lives in the
//! runner. A step is todo, running or done; `remaining_secs` is the live
//! countdown value, re-seeded from `duration_min` whenever the step returns
//! to todo through [`Routine::set_status`] or [`Routine::reset_all`].

mod defaults;

pub use defaults::{default_evening_routine, default_morning_routine, empty_routine};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lifecycle state of a single step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    Todo,
    Running,
    Done,
}

impl StepStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            StepStatus::Todo => "todo",
            StepStatus::Running => "running",
            StepStatus::Done => "done",
        }
    }
}

impl fmt::Display for StepStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for StepStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "todo" => Ok(StepStatus::Todo),
            "running" => Ok(StepStatus::Running),
            "done" => Ok(StepStatus::Done),
            other => Err(format!("unknown step status: {other}")),
        }
    }
}

fn default_true() -> bool {
    true
}

/// One entry in a routine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    pub id: String,
    pub title: String,
    /// Configured budget in minutes; source of truth for resets.
    pub duration_min: u64,
    /// Live countdown value, `0..=duration_min * 60`.
    pub remaining_secs: u64,
    pub status: StepStatus,
    /// Steps without a timer keep their budget untouched and wait for a
    /// manual done.
    #[serde(default = "default_true")]
    pub timer_enabled: bool,
    #[serde(default)]
    pub icon: Option<String>,
}

impl Step {
    /// A fresh timed step: todo, full budget.
    pub fn new(id: impl Into<String>, title: impl Into<String>, duration_min: u64) -> Self {
        let duration_secs = duration_min.saturating_mul(60);
        Self {
            id: id.into(),
            title: title.into(),
            duration_min,
            remaining_secs: duration_secs,
            status: StepStatus::Todo,
            timer_enabled: true,
            icon: None,
        }
    }

    /// A step with no countdown. Completed by hand.
    pub fn untimed(id: impl Into<String>, title: impl Into<String>) -> Self {
        let mut step = Self::new(id, title, 0);
        step.timer_enabled = false;
        step
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    pub fn with_timer(mut self, enabled: bool) -> Self {
        self.timer_enabled = enabled;
        self
    }

    /// Configured budget in seconds.
    pub fn budget_secs(&self) -> u64 {
        self.duration_min.saturating_mul(60)
    }

    /// Running with an enabled timer, so elapsed time applies to it.
    pub fn is_counting(&self) -> bool {
        self.status == StepStatus::Running && self.timer_enabled
    }
}

/// An ordered list of steps with a title.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Routine {
    pub id: String,
    pub title: String,
    pub steps: Vec<Step>,
}

impl Routine {
    pub fn new(id: impl Into<String>, title: impl Into<String>, steps: Vec<Step>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            steps,
        }
    }

    pub fn step(&self, step_id: &str) -> Option<&Step> {
        self.steps.iter().find(|s| s.id == step_id)
    }

    pub fn step_mut(&mut self, step_id: &str) -> Option<&mut Step> {
        self.steps.iter_mut().find(|s| s.id == step_id)
    }

    /// Move one step to a new status, keeping the countdown coherent:
    /// done zeroes the remaining time, todo re-seeds the full budget,
    /// running leaves it untouched so a restart resumes where it left off.
    ///
    /// An unknown id is a silent no-op. Returns whether anything changed.
    pub fn set_status(&mut self, step_id: &str, status: StepStatus) -> bool {
        let Some(step) = self.step_mut(step_id) else {
            return false;
        };
        let remaining = match status {
            StepStatus::Done => 0,
            StepStatus::Todo => step.budget_secs(),
            StepStatus::Running => step.remaining_secs,
        };
        let changed = step.status != status || step.remaining_secs != remaining;
        step.status = status;
        step.remaining_secs = remaining;
        changed
    }

    /// Every step back to todo with a full budget.
    pub fn reset_all(&mut self) {
        for step in &mut self.steps {
            step.status = StepStatus::Todo;
            step.remaining_secs = step.budget_secs();
        }
    }

    /// Sum of live countdown values across all steps.
    pub fn total_remaining_secs(&self) -> u64 {
        self.steps.iter().map(|s| s.remaining_secs).sum()
    }

    /// Sum of configured budgets across all steps.
    pub fn total_budget_secs(&self) -> u64 {
        self.steps.iter().map(|s| s.budget_secs()).sum()
    }

    pub fn all_done(&self) -> bool {
        self.steps.iter().all(|s| s.status == StepStatus::Done)
    }

    pub fn any_done(&self) -> bool {
        self.steps.iter().any(|s| s.status == StepStatus::Done)
    }

    pub fn done_count(&self) -> usize {
        self.steps.iter().filter(|s| s.status == StepStatus::Done).count()
    }

    /// At least one step is actively consuming time.
    pub fn has_counting_step(&self) -> bool {
        self.steps.iter().any(Step::is_counting)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn routine() -> Routine {
        Routine::new(
            "r1",
            "Test",
            vec![
                Step::new("a", "First", 2),
                Step::new("b", "Second", 3),
                Step::untimed("c", "Third"),
            ],
        )
    }

    #[test]
    fn new_step_has_full_budget() {
        let step = Step::new("a", "First", 2);
        assert_eq!(step.status, StepStatus::Todo);
        assert_eq!(step.budget_secs(), 120);
        assert_eq!(step.remaining_secs, 120);
        assert!(step.timer_enabled);
    }

    #[test]
    fn untimed_step_never_counts() {
        let mut step = Step::untimed("c", "Third");
        assert!(!step.timer_enabled);
        step.status = StepStatus::Running;
        assert!(!step.is_counting());
    }

    #[test]
    fn set_status_done_zeroes_remaining() {
        let mut r = routine();
        assert!(r.set_status("a", StepStatus::Done));
        let a = r.step("a").unwrap();
        assert_eq!(a.status, StepStatus::Done);
        assert_eq!(a.remaining_secs, 0);
    }

    #[test]
    fn set_status_todo_reseeds_budget() {
        let mut r = routine();
        r.set_status("a", StepStatus::Running);
        r.step_mut("a").unwrap().remaining_secs = 45;
        assert!(r.set_status("a", StepStatus::Todo));
        let a = r.step("a").unwrap();
        assert_eq!(a.status, StepStatus::Todo);
        assert_eq!(a.remaining_secs, 120);
    }

    #[test]
    fn set_status_running_preserves_remaining() {
        let mut r = routine();
        r.set_status("a", StepStatus::Running);
        r.step_mut("a").unwrap().remaining_secs = 45;
        r.set_status("a", StepStatus::Todo);
        r.step_mut("a").unwrap().remaining_secs = 80;
        r.set_status("a", StepStatus::Running);
        assert_eq!(r.step("a").unwrap().remaining_secs, 80);
    }

    #[test]
    fn set_status_unknown_id_is_noop() {
        let mut r = routine();
        let before = r.clone();
        assert!(!r.set_status("missing", StepStatus::Done));
        assert_eq!(r, before);
    }

    #[test]
    fn reset_all_is_idempotent() {
        let mut r = routine();
        r.set_status("a", StepStatus::Done);
        r.set_status("b", StepStatus::Running);
        r.step_mut("b").unwrap().remaining_secs = 10;

        r.reset_all();
        let once = r.clone();
        r.reset_all();
        assert_eq!(r, once);
        assert!(r.steps.iter().all(|s| s.status == StepStatus::Todo));
        assert!(r.steps.iter().all(|s| s.remaining_secs == s.budget_secs()));
    }

    #[test]
    fn totals() {
        let mut r = routine();
        assert_eq!(r.total_budget_secs(), 300);
        assert_eq!(r.total_remaining_secs(), 300);
        r.set_status("a", StepStatus::Done);
        assert_eq!(r.total_remaining_secs(), 180);
        assert_eq!(r.total_budget_secs(), 300);
    }

    #[test]
    fn all_done_and_counting() {
        let mut r = routine();
        assert!(!r.all_done());
        assert!(!r.has_counting_step());
        r.set_status("a", StepStatus::Running);
        assert!(r.has_counting_step());
        r.set_status("c", StepStatus::Running);
        r.set_status("a", StepStatus::Done);
        assert!(!r.has_counting_step());
        r.set_status("b", StepStatus::Done);
        r.set_status("c", StepStatus::Done);
        assert!(r.all_done());
    }

    #[test]
    fn status_serializes_lowercase() {
        let json = serde_json::to_string(&StepStatus::Running).unwrap();
        assert_eq!(json, "\"running\"");
        let parsed: StepStatus = serde_json::from_str("\"done\"").unwrap();
        assert_eq!(parsed, StepStatus::Done);
    }

    #[test]
    fn step_parses_without_optional_fields() {
        let json = r#"{
            "id": "a",
            "title": "First",
            "duration_min": 2,
            "remaining_secs": 120,
            "status": "todo"
        }"#;
        let step: Step = serde_json::from_str(json).unwrap();
        assert!(step.timer_enabled);
        assert_eq!(step.icon, None);
    }

    #[test]
    fn status_from_str_rejects_unknown() {
        assert!("paused".parse::<StepStatus>().is_err());
        assert_eq!("todo".parse::<StepStatus>().unwrap(), StepStatus::Todo);
    }
}
