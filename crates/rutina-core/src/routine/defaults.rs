//! Seed routines.
//!
//! New profiles start with a morning and an evening routine so the app is
//! usable before anyone opens the settings.

use uuid::Uuid;

use super::{Routine, Step};

/// Morning routine seeded into every new profile.
pub fn default_morning_routine() -> Routine {
    Routine::new(
        format!("morning-{}", Uuid::new_v4()),
        "Morgonrutin",
        vec![
            Step::new("morning-wake", "Gå upp", 2).with_icon("wake-up"),
            Step::new("morning-brush", "Borsta tänderna", 3).with_icon("brush-teeth"),
            Step::new("morning-dress", "Klä på dig", 5).with_icon("get-dressed"),
            Step::new("morning-eat", "Äta frukost", 10).with_icon("eat-breakfast"),
        ],
    )
}

/// Evening routine seeded into every new profile. The last step has no
/// timer; falling asleep is not on a countdown.
pub fn default_evening_routine() -> Routine {
    Routine::new(
        format!("evening-{}", Uuid::new_v4()),
        "Kvällsrutin",
        vec![
            Step::new("evening-brush", "Borsta tänderna", 3).with_icon("brush-teeth"),
            Step::new("evening-pyjamas", "Ta på pyjamas", 4).with_icon("get-dressed"),
            Step::new("evening-read", "Läsa bok", 10).with_icon("read-book"),
            Step::untimed("evening-sleep", "Sova").with_icon("bedtime"),
        ],
    )
}

/// A new routine created from the settings screen: one placeholder step.
pub fn empty_routine(title: impl Into<String>) -> Routine {
    Routine::new(
        format!("routine-{}", Uuid::new_v4()),
        title,
        vec![Step::new("step-1", "Steg 1", 5)],
    )
}
