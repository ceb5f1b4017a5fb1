//! The persisted application state.
//!
//! Everything the app remembers lives in one [`StoredState`] blob: the
//! profiles, the active selection, which surface is showing, and the live
//! run with its clock anchors. The blob is JSON under a versioned key in
//! the state store; bump [`STATE_KEY`] when the shape changes.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::profile::ChildProfile;
use crate::routine::Routine;
use crate::runner::RoutineRunner;
use crate::storage::StateDb;

/// Storage key for the state blob.
pub const STATE_KEY: &str = "rutina-state-v2";

/// Name given to the profile seeded on first run and after the last
/// profile is deleted.
pub const DEMO_CHILD_NAME: &str = "Demobarn";

/// Which surface the app is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Screen {
    #[default]
    Start,
    Routine,
    Settings,
}

/// Root persisted object.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredState {
    pub active_child_id: String,
    pub children: Vec<ChildProfile>,
    #[serde(default)]
    pub screen: Screen,
    /// The live run; `None` when no routine is open.
    #[serde(default)]
    pub run: Option<RoutineRunner>,
}

impl StoredState {
    /// Fresh first-run state: one demo profile, start screen, no run.
    pub fn first_run() -> Self {
        let demo = ChildProfile::new(DEMO_CHILD_NAME);
        Self {
            active_child_id: demo.id.clone(),
            children: vec![demo],
            screen: Screen::Start,
            run: None,
        }
    }

    pub fn active_child(&self) -> Option<&ChildProfile> {
        self.children.iter().find(|c| c.id == self.active_child_id)
    }

    pub fn active_child_mut(&mut self) -> Option<&mut ChildProfile> {
        self.children.iter_mut().find(|c| c.id == self.active_child_id)
    }

    /// Load from the store. A missing key or a blob that no longer parses
    /// falls back to the first-run default rather than failing; losing a
    /// run beats refusing to start. Legacy icon names migrate on every
    /// load.
    pub fn load(db: &StateDb) -> Self {
        let mut state = db
            .kv_get(STATE_KEY)
            .ok()
            .flatten()
            .and_then(|json| serde_json::from_str::<StoredState>(&json).ok())
            .unwrap_or_else(StoredState::first_run);
        migrate_icon_names(&mut state);
        state
    }

    /// Persist the whole state as one JSON blob.
    pub fn save(&self, db: &StateDb) -> Result<()> {
        let json = serde_json::to_string(self)?;
        db.kv_set(STATE_KEY, &json)?;
        Ok(())
    }
}

/// Early releases used dotted icon names; stored blobs may still carry
/// them. The live run holds its own copy of a routine, so it migrates too.
fn migrate_icon_names(state: &mut StoredState) {
    for child in &mut state.children {
        for routine in &mut child.routines {
            migrate_routine_icons(routine);
        }
    }
    if let Some(run) = &mut state.run {
        migrate_routine_icons(run.routine_mut());
    }
}

fn migrate_routine_icons(routine: &mut Routine) {
    for step in &mut routine.steps {
        let renamed = match step.icon.as_deref() {
            Some("moon.stars") => "moon-stars",
            Some("lamp.table") => "lamp-table",
            _ => continue,
        };
        step.icon = Some(renamed.to_string());
    }
}
