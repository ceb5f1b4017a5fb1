//! The owned application-state container.
//!
//! Every mutation funnels through a command method here. The controller
//! owns the [`StoredState`], drives the live runner, routes routine edits
//! through reconciliation and persists after each command, so hosts never
//! hold a mutable alias into the state: they read snapshots and issue
//! commands. Command methods return the runner events they caused.

use crate::events::RunnerEvent;
use crate::profile::{ChildProfile, ColorTheme, ViewMode};
use crate::routine::{empty_routine, Routine};
use crate::runner::{RoutineRunner, RunPolicy};
use crate::state::{Screen, StoredState, DEMO_CHILD_NAME};
use crate::storage::{Config, StateDb};
use crate::sync::RoutineSync;

pub struct AppController {
    db: StateDb,
    state: StoredState,
    run_policy: RunPolicy,
    sync: RoutineSync,
}

impl AppController {
    /// Load persisted state, or seed a first run, and bind the configured
    /// policies.
    pub fn bootstrap(db: StateDb, config: &Config) -> Self {
        let state = StoredState::load(&db);
        Self {
            db,
            state,
            run_policy: config.policy.running,
            sync: RoutineSync::new(config.policy.edit_sync),
        }
    }

    pub fn state(&self) -> &StoredState {
        &self.state
    }

    pub fn screen(&self) -> Screen {
        self.state.screen
    }

    pub fn active_child(&self) -> Option<&ChildProfile> {
        self.state.active_child()
    }

    pub fn run(&self) -> Option<&RoutineRunner> {
        self.state.run.as_ref()
    }

    // ── Run control ────────────────────────────────────────────────────

    /// Open one of the active child's routines for a fresh run and show
    /// the routine surface. Replaces any run already live.
    pub fn open_routine(&mut self, routine_id: &str) -> Vec<RunnerEvent> {
        let Some(routine) = self
            .active_child()
            .and_then(|c| c.routine(routine_id))
            .cloned()
        else {
            return Vec::new();
        };
        let runner = RoutineRunner::open(routine, self.run_policy);
        let snapshot = runner.snapshot();
        self.state.run = Some(runner);
        self.state.screen = Screen::Routine;
        self.persist();
        vec![snapshot]
    }

    /// Abandon the live run and return to the start surface.
    pub fn close_routine(&mut self) {
        self.state.run = None;
        self.state.screen = Screen::Start;
        self.persist();
    }

    pub fn start_step(&mut self, step_id: &str) -> Vec<RunnerEvent> {
        self.run_command(|run| run.start_step(step_id))
    }

    pub fn complete_step(&mut self, step_id: &str) -> Vec<RunnerEvent> {
        self.run_command(|run| run.complete_step(step_id))
    }

    pub fn tick(&mut self) -> Vec<RunnerEvent> {
        self.run_command(RoutineRunner::tick)
    }

    /// Timestamped tick for hosts that carry their own clock.
    pub fn tick_at(&mut self, now_ms: u64) -> Vec<RunnerEvent> {
        self.run_command(|run| run.tick_at(now_ms))
    }

    /// The host surface became visible or regained focus.
    pub fn resume_hint(&mut self) -> Vec<RunnerEvent> {
        self.run_command(RoutineRunner::resume_hint)
    }

    pub fn resume_hint_at(&mut self, now_ms: u64) -> Vec<RunnerEvent> {
        self.run_command(|run| run.resume_hint_at(now_ms))
    }

    pub fn pause(&mut self) -> Vec<RunnerEvent> {
        self.run_command(RoutineRunner::pause)
    }

    pub fn resume(&mut self) -> Vec<RunnerEvent> {
        self.run_command(RoutineRunner::resume)
    }

    pub fn toggle_pause(&mut self) -> Vec<RunnerEvent> {
        self.run_command(RoutineRunner::toggle_pause)
    }

    pub fn reset_run(&mut self) -> Vec<RunnerEvent> {
        self.run_command(RoutineRunner::reset)
    }

    fn run_command<F>(&mut self, f: F) -> Vec<RunnerEvent>
    where
        F: FnOnce(&mut RoutineRunner) -> Vec<RunnerEvent>,
    {
        let Some(run) = self.state.run.as_mut() else {
            return Vec::new();
        };
        let events = f(run);
        self.persist();
        events
    }

    // ── Profiles ───────────────────────────────────────────────────────

    /// Add a profile seeded with the default routines and make it active.
    /// Returns the new profile's id. Like [`select_child`], switching the
    /// active profile abandons the previous profile's run.
    ///
    /// [`select_child`]: AppController::select_child
    pub fn add_child(&mut self, name: &str) -> String {
        let child = ChildProfile::new(name);
        let id = child.id.clone();
        self.state.children.push(child);
        self.state.active_child_id = id.clone();
        self.state.run = None;
        self.state.screen = Screen::Start;
        self.persist();
        id
    }

    /// Delete a profile. Deleting the active profile abandons its live run
    /// and activates the first remaining profile; deleting the last
    /// profile re-seeds the demo profile so the app never faces an empty
    /// list.
    pub fn delete_child(&mut self, child_id: &str) {
        let before = self.state.children.len();
        self.state.children.retain(|c| c.id != child_id);
        if self.state.children.len() == before {
            return;
        }
        let was_active = self.state.active_child_id == child_id;
        if was_active {
            self.state.run = None;
            if self.state.screen == Screen::Routine {
                self.state.screen = Screen::Start;
            }
        }
        if self.state.children.is_empty() {
            let demo = ChildProfile::new(DEMO_CHILD_NAME);
            self.state.active_child_id = demo.id.clone();
            self.state.children.push(demo);
        } else if was_active {
            self.state.active_child_id = self.state.children[0].id.clone();
        }
        self.persist();
    }

    /// Switch the active profile and return to the start surface. Any live
    /// run belongs to the previous profile and is abandoned.
    pub fn select_child(&mut self, child_id: &str) {
        if !self.state.children.iter().any(|c| c.id == child_id) {
            return;
        }
        self.state.active_child_id = child_id.to_string();
        self.state.run = None;
        self.state.screen = Screen::Start;
        self.persist();
    }

    pub fn rename_child(&mut self, child_id: &str, name: &str) {
        let Some(child) = self.child_mut(child_id) else {
            return;
        };
        child.name = name.to_string();
        self.persist();
    }

    pub fn set_color_theme(&mut self, child_id: &str, theme: ColorTheme) {
        let Some(child) = self.child_mut(child_id) else {
            return;
        };
        child.color_theme = theme;
        self.persist();
    }

    pub fn set_view_mode(&mut self, child_id: &str, mode: ViewMode) {
        let Some(child) = self.child_mut(child_id) else {
            return;
        };
        child.view_mode = mode;
        self.persist();
    }

    fn child_mut(&mut self, child_id: &str) -> Option<&mut ChildProfile> {
        self.state.children.iter_mut().find(|c| c.id == child_id)
    }

    // ── Routine editing ────────────────────────────────────────────────

    /// Add a routine with one placeholder step to a profile. Returns the
    /// new routine's id.
    pub fn add_routine(&mut self, child_id: &str, title: &str) -> Option<String> {
        let routine = empty_routine(title);
        let id = routine.id.clone();
        let child = self.child_mut(child_id)?;
        child.routines.push(routine);
        self.persist();
        Some(id)
    }

    /// Delete a routine. A live run on the deleted routine closes with it.
    pub fn delete_routine(&mut self, child_id: &str, routine_id: &str) {
        let Some(child) = self.child_mut(child_id) else {
            return;
        };
        let before = child.routines.len();
        child.routines.retain(|r| r.id != routine_id);
        if child.routines.len() == before {
            return;
        }
        if self.state.active_child_id == child_id {
            let live = self
                .state
                .run
                .as_ref()
                .is_some_and(|run| run.routine().id == routine_id);
            if live {
                self.state.run = None;
                if self.state.screen == Screen::Routine {
                    self.state.screen = Screen::Start;
                }
            }
        }
        self.persist();
    }

    /// Store an edited routine definition and reconcile it with the live
    /// run. The run is only affected when the edit targets the active
    /// profile's live routine; edits elsewhere just land in the profile.
    pub fn update_routine(&mut self, child_id: &str, edited: Routine) -> Vec<RunnerEvent> {
        {
            let Some(child) = self.child_mut(child_id) else {
                return Vec::new();
            };
            let Some(slot) = child.routine_mut(&edited.id) else {
                return Vec::new();
            };
            *slot = edited.clone();
        }

        let mut events = Vec::new();
        if self.state.active_child_id == child_id {
            if let Some(run) = self.state.run.as_mut() {
                let (_, evts) = self.sync.reconcile(run, &edited);
                events = evts;
            }
        }
        self.persist();
        events
    }

    // ── Settings surface ───────────────────────────────────────────────

    pub fn enter_settings(&mut self) {
        self.state.screen = Screen::Settings;
        self.persist();
    }

    /// Leave settings for whichever surface makes sense. Edits were
    /// reconciled as they happened, so this only restores the screen.
    pub fn leave_settings(&mut self) {
        self.state.screen = if self.state.run.is_some() {
            Screen::Routine
        } else {
            Screen::Start
        };
        self.persist();
    }

    /// Fire-and-forget save. Storage trouble is reported but never stops
    /// the timers.
    fn persist(&self) {
        if let Err(e) = self.state.save(&self.db) {
            eprintln!("warning: failed to persist state: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routine::{Step, StepStatus};

    fn controller() -> AppController {
        let db = StateDb::open_memory().unwrap();
        AppController::bootstrap(db, &Config::default())
    }

    fn morning_id(app: &AppController) -> String {
        app.active_child().unwrap().routines[0].id.clone()
    }

    #[test]
    fn bootstrap_seeds_demo_child() {
        let app = controller();
        assert_eq!(app.active_child().unwrap().name, DEMO_CHILD_NAME);
        assert_eq!(app.screen(), Screen::Start);
        assert!(app.run().is_none());
    }

    #[test]
    fn open_routine_starts_fresh_run() {
        let mut app = controller();
        let id = morning_id(&app);
        let events = app.open_routine(&id);
        assert!(matches!(events[0], RunnerEvent::Snapshot { .. }));
        assert_eq!(app.screen(), Screen::Routine);
        let run = app.run().unwrap();
        assert_eq!(run.routine().id, id);
        assert!(run.routine().steps.iter().all(|s| s.status == StepStatus::Todo));
    }

    #[test]
    fn open_unknown_routine_is_noop() {
        let mut app = controller();
        assert!(app.open_routine("missing").is_empty());
        assert!(app.run().is_none());
        assert_eq!(app.screen(), Screen::Start);
    }

    #[test]
    fn run_commands_without_run_are_noops() {
        let mut app = controller();
        assert!(app.start_step("x").is_empty());
        assert!(app.tick().is_empty());
        assert!(app.pause().is_empty());
        assert!(app.reset_run().is_empty());
    }

    #[test]
    fn step_flow_through_controller() {
        let mut app = controller();
        let id = morning_id(&app);
        app.open_routine(&id);

        let events = app.start_step("morning-wake");
        assert!(matches!(events[0], RunnerEvent::StepStarted { .. }));

        let events = app.complete_step("morning-wake");
        assert!(matches!(
            events[0],
            RunnerEvent::StepFinished { .. }
        ));
        assert_eq!(
            app.run().unwrap().routine().step("morning-wake").unwrap().status,
            StepStatus::Done
        );
    }

    #[test]
    fn close_routine_returns_to_start() {
        let mut app = controller();
        let id = morning_id(&app);
        app.open_routine(&id);
        app.close_routine();
        assert!(app.run().is_none());
        assert_eq!(app.screen(), Screen::Start);
    }

    #[test]
    fn add_child_becomes_active() {
        let mut app = controller();
        let id = app.add_child("Alva");
        assert_eq!(app.active_child().unwrap().id, id);
        assert_eq!(app.active_child().unwrap().name, "Alva");
        assert_eq!(app.state().children.len(), 2);
    }

    #[test]
    fn delete_last_child_reseeds_demo() {
        let mut app = controller();
        let id = app.active_child().unwrap().id.clone();
        app.delete_child(&id);
        assert_eq!(app.state().children.len(), 1);
        assert_eq!(app.active_child().unwrap().name, DEMO_CHILD_NAME);
        assert_ne!(app.active_child().unwrap().id, id);
    }

    #[test]
    fn delete_active_child_drops_run_and_reactivates() {
        let mut app = controller();
        let first = app.active_child().unwrap().id.clone();
        let second = app.add_child("Alva");
        let routine_id = morning_id(&app);
        app.open_routine(&routine_id);
        assert!(app.run().is_some());

        app.delete_child(&second);
        assert!(app.run().is_none());
        assert_eq!(app.active_child().unwrap().id, first);
    }

    #[test]
    fn delete_unknown_child_is_noop() {
        let mut app = controller();
        app.delete_child("missing");
        assert_eq!(app.state().children.len(), 1);
    }

    #[test]
    fn select_child_abandons_run() {
        let mut app = controller();
        let first = app.active_child().unwrap().id.clone();
        app.add_child("Alva");
        let routine_id = morning_id(&app);
        app.open_routine(&routine_id);
        assert!(app.run().is_some());

        app.select_child(&first);
        assert_eq!(app.active_child().unwrap().id, first);
        assert!(app.run().is_none());
        assert_eq!(app.screen(), Screen::Start);

        app.select_child("missing");
        assert_eq!(app.active_child().unwrap().id, first);
    }

    #[test]
    fn profile_preferences() {
        let mut app = controller();
        let id = app.active_child().unwrap().id.clone();
        app.rename_child(&id, "Siri");
        app.set_color_theme(&id, ColorTheme::HighContrast);
        app.set_view_mode(&id, ViewMode::List);
        let child = app.active_child().unwrap();
        assert_eq!(child.name, "Siri");
        assert_eq!(child.color_theme, ColorTheme::HighContrast);
        assert_eq!(child.view_mode, ViewMode::List);
    }

    #[test]
    fn add_and_delete_routine() {
        let mut app = controller();
        let child_id = app.active_child().unwrap().id.clone();
        let routine_id = app.add_routine(&child_id, "Helgrutin").unwrap();
        assert_eq!(app.active_child().unwrap().routines.len(), 3);

        app.open_routine(&routine_id);
        assert!(app.run().is_some());
        app.delete_routine(&child_id, &routine_id);
        assert_eq!(app.active_child().unwrap().routines.len(), 2);
        assert!(app.run().is_none());
        assert_eq!(app.screen(), Screen::Start);
    }

    #[test]
    fn update_routine_reconciles_live_run() {
        let mut app = controller();
        let child_id = app.active_child().unwrap().id.clone();
        let routine_id = morning_id(&app);
        app.open_routine(&routine_id);
        app.start_step("morning-wake");

        let mut edited = app.active_child().unwrap().routine(&routine_id).unwrap().clone();
        edited.title = "Morgon 2.0".into();
        edited.steps.push(Step::new("morning-shoes", "Ta på skorna", 2));
        app.update_routine(&child_id, edited);

        let run = app.run().unwrap();
        assert_eq!(run.routine().title, "Morgon 2.0");
        assert_eq!(
            run.routine().step("morning-wake").unwrap().status,
            StepStatus::Running
        );
        assert!(run.routine().step("morning-shoes").is_some());
        // the stored definition matches what was edited
        assert_eq!(
            app.active_child().unwrap().routine(&routine_id).unwrap().title,
            "Morgon 2.0"
        );
    }

    #[test]
    fn update_routine_for_other_child_leaves_run_alone() {
        let mut app = controller();
        let demo_id = app.active_child().unwrap().id.clone();
        let other = app.add_child("Alva");
        app.select_child(&demo_id);
        let routine_id = morning_id(&app);
        app.open_routine(&routine_id);

        let other_routine = app.state().children[1].routines[0].clone();
        let mut edited = other_routine;
        edited.title = "Annan morgon".into();
        let events = app.update_routine(&other, edited);
        assert!(events.is_empty());
        assert_ne!(app.run().unwrap().routine().title, "Annan morgon");
    }

    #[test]
    fn settings_screen_round_trip() {
        let mut app = controller();
        app.enter_settings();
        assert_eq!(app.screen(), Screen::Settings);
        app.leave_settings();
        assert_eq!(app.screen(), Screen::Start);

        let routine_id = morning_id(&app);
        app.open_routine(&routine_id);
        app.enter_settings();
        app.leave_settings();
        assert_eq!(app.screen(), Screen::Routine);
    }

    #[test]
    fn state_survives_rebootstrap() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.db");
        let routine_id;
        {
            let db = StateDb::open_at(&path).unwrap();
            let mut app = AppController::bootstrap(db, &Config::default());
            routine_id = morning_id(&app);
            app.open_routine(&routine_id);
            app.start_step("morning-wake");
        }
        let db = StateDb::open_at(&path).unwrap();
        let app = AppController::bootstrap(db, &Config::default());
        let run = app.run().unwrap();
        assert_eq!(run.routine().id, routine_id);
        assert_eq!(
            run.routine().step("morning-wake").unwrap().status,
            StepStatus::Running
        );
    }
}
