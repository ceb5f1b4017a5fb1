//! Child profile commands.

use clap::Subcommand;
use rutina_core::{AppController, ColorTheme, Config, StateDb, ViewMode};

#[derive(Subcommand)]
pub enum ProfileAction {
    /// List profiles; the active one is marked with *
    List,
    /// Add a profile seeded with the default routines and make it active
    Add {
        /// Child's name
        name: String,
    },
    /// Delete a profile
    Remove {
        /// Profile id
        child_id: String,
    },
    /// Make a profile active
    Select {
        /// Profile id
        child_id: String,
    },
    /// Rename a profile
    Rename {
        /// Profile id
        child_id: String,
        /// New name
        name: String,
    },
    /// Set the color theme
    Theme {
        /// Profile id
        child_id: String,
        /// calm or highContrast
        theme: String,
    },
    /// Set the view mode
    View {
        /// Profile id
        child_id: String,
        /// focus or list
        mode: String,
    },
}

pub fn run(action: ProfileAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let db = StateDb::open()?;
    let mut app = AppController::bootstrap(db, &config);

    match action {
        ProfileAction::List => {
            let state = app.state();
            for child in &state.children {
                let marker = if child.id == state.active_child_id { "*" } else { " " };
                println!(
                    "{marker} {}  {}  ({} routines)",
                    child.id,
                    child.name,
                    child.routines.len()
                );
            }
        }
        ProfileAction::Add { name } => {
            let id = app.add_child(&name);
            println!("Profile created: {id}");
        }
        ProfileAction::Remove { child_id } => {
            app.delete_child(&child_id);
            println!("Profile removed: {child_id}");
        }
        ProfileAction::Select { child_id } => {
            app.select_child(&child_id);
            println!("Active profile: {child_id}");
        }
        ProfileAction::Rename { child_id, name } => {
            app.rename_child(&child_id, &name);
            println!("Profile renamed: {child_id}");
        }
        ProfileAction::Theme { child_id, theme } => {
            let theme: ColorTheme = theme.parse()?;
            app.set_color_theme(&child_id, theme);
            println!("Color theme set: {theme}");
        }
        ProfileAction::View { child_id, mode } => {
            let mode: ViewMode = mode.parse()?;
            app.set_view_mode(&child_id, mode);
            println!("View mode set: {mode}");
        }
    }
    Ok(())
}
