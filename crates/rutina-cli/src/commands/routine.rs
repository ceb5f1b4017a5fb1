//! Routine editing commands.
//!
//! Edits use the same funnel a settings surface would: clone the stored
//! definition, change it, hand it back to the controller. Reconciliation
//! with a live run happens there, and any resulting events print.

use clap::Subcommand;
use rutina_core::{AppController, Config, Routine, StateDb, Step, StepStatus};
use uuid::Uuid;

#[derive(Subcommand)]
pub enum RoutineAction {
    /// List the active profile's routines
    List,
    /// Show one routine as JSON
    Show {
        /// Routine id
        routine_id: String,
    },
    /// Add a routine with one placeholder step
    Add {
        /// Routine title
        title: String,
    },
    /// Delete a routine; a live run on it closes
    Remove {
        /// Routine id
        routine_id: String,
    },
    /// Rename a routine
    Rename {
        /// Routine id
        routine_id: String,
        /// New title
        title: String,
    },
    /// Append a step to a routine
    AddStep {
        /// Routine id
        routine_id: String,
        /// Step title
        title: String,
        /// Budget in minutes
        #[arg(long, default_value = "5")]
        minutes: u64,
        /// Icon name
        #[arg(long)]
        icon: Option<String>,
        /// Create the step without a countdown
        #[arg(long)]
        no_timer: bool,
    },
    /// Edit a step in place
    EditStep {
        /// Routine id
        routine_id: String,
        /// Step id
        step_id: String,
        /// New title
        #[arg(long)]
        title: Option<String>,
        /// New budget in minutes
        #[arg(long)]
        minutes: Option<u64>,
        /// New icon name
        #[arg(long)]
        icon: Option<String>,
        /// Enable or disable the countdown
        #[arg(long)]
        timer: Option<bool>,
    },
    /// Remove a step from a routine
    RemoveStep {
        /// Routine id
        routine_id: String,
        /// Step id
        step_id: String,
    },
}

pub fn run(action: RoutineAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let db = StateDb::open()?;
    let mut app = AppController::bootstrap(db, &config);

    match action {
        RoutineAction::List => match app.active_child() {
            Some(child) => {
                for routine in &child.routines {
                    println!(
                        "{}  {}  ({} steps, {} min)",
                        routine.id,
                        routine.title,
                        routine.steps.len(),
                        routine.total_budget_secs() / 60
                    );
                }
            }
            None => println!("No active profile"),
        },
        RoutineAction::Show { routine_id } => {
            match app.active_child().and_then(|c| c.routine(&routine_id)) {
                Some(routine) => println!("{}", serde_json::to_string_pretty(routine)?),
                None => println!("Routine not found: {routine_id}"),
            }
        }
        RoutineAction::Add { title } => {
            let Some(child_id) = active_child_id(&app) else {
                println!("No active profile");
                return Ok(());
            };
            match app.add_routine(&child_id, &title) {
                Some(id) => println!("Routine created: {id}"),
                None => println!("No active profile"),
            }
        }
        RoutineAction::Remove { routine_id } => {
            let Some(child_id) = active_child_id(&app) else {
                println!("No active profile");
                return Ok(());
            };
            app.delete_routine(&child_id, &routine_id);
            println!("Routine removed: {routine_id}");
        }
        RoutineAction::Rename { routine_id, title } => {
            apply_edit(&mut app, &routine_id, |routine| {
                routine.title = title.clone();
            })?;
        }
        RoutineAction::AddStep {
            routine_id,
            title,
            minutes,
            icon,
            no_timer,
        } => {
            let step_id = format!("step-{}", Uuid::new_v4());
            apply_edit(&mut app, &routine_id, |routine| {
                let mut step =
                    Step::new(step_id.as_str(), title.as_str(), minutes).with_timer(!no_timer);
                step.icon = icon.clone();
                routine.steps.push(step);
            })?;
        }
        RoutineAction::EditStep {
            routine_id,
            step_id,
            title,
            minutes,
            icon,
            timer,
        } => {
            if !step_exists(&app, &routine_id, &step_id) {
                println!("Step not found: {step_id}");
                return Ok(());
            }
            apply_edit(&mut app, &routine_id, |routine| {
                let Some(step) = routine.step_mut(&step_id) else {
                    return;
                };
                if let Some(t) = &title {
                    step.title = t.clone();
                }
                if let Some(m) = minutes {
                    step.duration_min = m;
                    // a waiting step re-seeds from the new budget; running
                    // and done steps reconcile inside the controller
                    if step.status == StepStatus::Todo {
                        step.remaining_secs = step.budget_secs();
                    }
                }
                if let Some(i) = &icon {
                    step.icon = Some(i.clone());
                }
                if let Some(enabled) = timer {
                    step.timer_enabled = enabled;
                }
            })?;
        }
        RoutineAction::RemoveStep {
            routine_id,
            step_id,
        } => {
            if !step_exists(&app, &routine_id, &step_id) {
                println!("Step not found: {step_id}");
                return Ok(());
            }
            apply_edit(&mut app, &routine_id, |routine| {
                routine.steps.retain(|s| s.id != step_id);
            })?;
        }
    }
    Ok(())
}

fn active_child_id(app: &AppController) -> Option<String> {
    app.active_child().map(|c| c.id.clone())
}

fn step_exists(app: &AppController, routine_id: &str, step_id: &str) -> bool {
    app.active_child()
        .and_then(|c| c.routine(routine_id))
        .is_some_and(|r| r.step(step_id).is_some())
}

/// Clone the stored definition, apply the edit, hand it back through the
/// controller and print whatever the live run had to say about it.
fn apply_edit<F>(
    app: &mut AppController,
    routine_id: &str,
    edit: F,
) -> Result<(), Box<dyn std::error::Error>>
where
    F: FnOnce(&mut Routine),
{
    let Some(child_id) = active_child_id(app) else {
        println!("No active profile");
        return Ok(());
    };
    let Some(mut edited) = app
        .active_child()
        .and_then(|c| c.routine(routine_id))
        .cloned()
    else {
        println!("Routine not found: {routine_id}");
        return Ok(());
    };
    edit(&mut edited);
    let events = app.update_routine(&child_id, edited);
    println!("Routine updated: {routine_id}");
    for event in &events {
        println!("{}", serde_json::to_string_pretty(event)?);
    }
    Ok(())
}
