//! Live run commands.
//!
//! Each invocation loads the persisted state, applies one command and
//! saves. The countdown itself lives in the state blob's wall-clock
//! anchors, so ticking from a shell, a cron job or a GUI shell all land
//! on the same accounting.

use clap::Subcommand;
use rutina_core::{AppController, Config, RunnerEvent, StateDb};

#[derive(Subcommand)]
pub enum RunAction {
    /// Open a routine of the active profile for a fresh run
    Open {
        /// Routine id, or its exact title
        routine: String,
    },
    /// Print a snapshot of the live run, applying elapsed time first
    Status,
    /// Apply elapsed wall-clock time to the live run
    Tick,
    /// Start a step
    Start {
        /// Step id
        step_id: String,
    },
    /// Mark a step done
    Done {
        /// Step id
        step_id: String,
    },
    /// Freeze the live run
    Pause,
    /// Thaw the live run
    Resume,
    /// Pause when running, resume when paused
    Toggle,
    /// Restart the run from the top
    Reset,
    /// Abandon the live run
    Close,
    /// Tick on a cadence until the run completes or pauses
    Watch {
        /// Seconds between ticks; defaults to timer.tick_secs
        #[arg(long)]
        interval_secs: Option<u64>,
    },
}

pub fn run(action: RunAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();

    match action {
        RunAction::Open { routine } => {
            let mut app = open_app(&config)?;
            let found = app.active_child().and_then(|child| {
                child
                    .routines
                    .iter()
                    .find(|r| r.id == routine || r.title.eq_ignore_ascii_case(&routine))
                    .map(|r| r.id.clone())
            });
            match found {
                Some(id) => print_events(&app.open_routine(&id))?,
                None => println!("Routine not found: {routine}"),
            }
        }
        RunAction::Status => {
            let mut app = open_app(&config)?;
            app.resume_hint();
            match app.run() {
                Some(run) => println!("{}", serde_json::to_string_pretty(&run.snapshot())?),
                None => println!("No live run"),
            }
        }
        RunAction::Tick => {
            let mut app = open_app(&config)?;
            print_events(&app.tick())?;
        }
        RunAction::Start { step_id } => {
            let mut app = open_app(&config)?;
            print_events(&app.start_step(&step_id))?;
        }
        RunAction::Done { step_id } => {
            let mut app = open_app(&config)?;
            print_events(&app.complete_step(&step_id))?;
        }
        RunAction::Pause => {
            let mut app = open_app(&config)?;
            print_events(&app.pause())?;
        }
        RunAction::Resume => {
            let mut app = open_app(&config)?;
            print_events(&app.resume())?;
        }
        RunAction::Toggle => {
            let mut app = open_app(&config)?;
            print_events(&app.toggle_pause())?;
        }
        RunAction::Reset => {
            let mut app = open_app(&config)?;
            print_events(&app.reset_run())?;
        }
        RunAction::Close => {
            let mut app = open_app(&config)?;
            app.close_routine();
            println!("Run closed");
        }
        RunAction::Watch { interval_secs } => {
            let interval = interval_secs.unwrap_or(config.timer.tick_secs).max(1);
            // fresh load every iteration, so commands issued from another
            // terminal are picked up instead of overwritten
            loop {
                let stop = {
                    let mut app = open_app(&config)?;
                    let events = app.tick();
                    for event in &events {
                        println!("{}", serde_json::to_string_pretty(event)?);
                    }
                    match app.run() {
                        None => {
                            println!("No live run");
                            true
                        }
                        Some(run) if run.is_complete() => {
                            println!("{}", serde_json::to_string_pretty(&run.snapshot())?);
                            true
                        }
                        Some(run) if run.paused() => {
                            println!("Run is paused");
                            true
                        }
                        Some(_) => false,
                    }
                };
                if stop {
                    break;
                }
                std::thread::sleep(std::time::Duration::from_secs(interval));
            }
        }
    }
    Ok(())
}

fn open_app(config: &Config) -> Result<AppController, Box<dyn std::error::Error>> {
    let db = StateDb::open()?;
    Ok(AppController::bootstrap(db, config))
}

fn print_events(events: &[RunnerEvent]) -> Result<(), Box<dyn std::error::Error>> {
    if events.is_empty() {
        println!("No changes");
        return Ok(());
    }
    for event in events {
        println!("{}", serde_json::to_string_pretty(event)?);
    }
    Ok(())
}
