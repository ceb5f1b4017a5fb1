//! # Rutina Core Library
//!
//! Core engine for Rutina, a visual routine timer for children. A routine
//! is an ordered list of steps (get up, brush teeth, get dressed), each
//! with a minute budget; the engine walks a routine through a live run,
//! counting wall-clock time against the steps and raising events as they
//! finish.
//!
//! ## Architecture
//!
//! - **routine**: pure step and routine models, no clocks attached
//! - **runner**: the live-run state machine, driven by host ticks
//! - **sync**: reconciliation of settings edits with a run in flight
//! - **profile**: child profiles owning their routines
//! - **controller**: the owned state container all commands funnel through
//! - **storage**: SQLite state blob and TOML configuration
//!
//! The engine never spawns a thread. Hosts call
//! [`tick`](controller::AppController::tick) on their own cadence and
//! forward visibility or focus resumes; elapsed time is computed from
//! persisted wall-clock anchors, so runs survive suspension and process
//! restarts without drifting.

pub mod controller;
pub mod error;
pub mod events;
pub mod profile;
pub mod routine;
pub mod runner;
pub mod state;
pub mod storage;
pub mod sync;

pub use controller::AppController;
pub use error::{ConfigError, CoreError, Result, StoreError};
pub use events::{FinishCause, RunnerEvent};
pub use profile::{ChildProfile, ColorTheme, ViewMode};
pub use routine::{Routine, Step, StepStatus};
pub use runner::{ElapsedClock, RoutineRunner, RunPolicy};
pub use state::{Screen, StoredState};
pub use storage::{Config, StateDb};
pub use sync::{RoutineSync, SyncOutcome, SyncPolicy};
