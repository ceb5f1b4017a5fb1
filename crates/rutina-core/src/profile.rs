//! Child profiles.
//!
//! A profile owns its routines plus two display preferences. Profiles are
//! edited on the settings surface; the live run never holds one, it holds
//! a copy of a single routine.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::routine::{default_evening_routine, default_morning_routine, Routine};

/// Color palette for a profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum ColorTheme {
    #[default]
    Calm,
    HighContrast,
}

impl fmt::Display for ColorTheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ColorTheme::Calm => "calm",
            ColorTheme::HighContrast => "highContrast",
        };
        write!(f, "{s}")
    }
}

impl FromStr for ColorTheme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "calm" => Ok(ColorTheme::Calm),
            "highContrast" => Ok(ColorTheme::HighContrast),
            other => Err(format!("unknown color theme: {other}")),
        }
    }
}

/// How a routine is presented: one big step at a time, or the whole list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    #[default]
    Focus,
    List,
}

impl fmt::Display for ViewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ViewMode::Focus => "focus",
            ViewMode::List => "list",
        };
        write!(f, "{s}")
    }
}

impl FromStr for ViewMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "focus" => Ok(ViewMode::Focus),
            "list" => Ok(ViewMode::List),
            other => Err(format!("unknown view mode: {other}")),
        }
    }
}

/// One child and their routines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChildProfile {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub color_theme: ColorTheme,
    #[serde(default)]
    pub view_mode: ViewMode,
    pub routines: Vec<Routine>,
}

impl ChildProfile {
    /// New profile seeded with the default morning and evening routines.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            color_theme: ColorTheme::default(),
            view_mode: ViewMode::default(),
            routines: vec![default_morning_routine(), default_evening_routine()],
        }
    }

    pub fn routine(&self, routine_id: &str) -> Option<&Routine> {
        self.routines.iter().find(|r| r.id == routine_id)
    }

    pub fn routine_mut(&mut self, routine_id: &str) -> Option<&mut Routine> {
        self.routines.iter_mut().find(|r| r.id == routine_id)
    }
}
