//! CLI command modules.

pub mod config;
pub mod profile;
pub mod routine;
pub mod run;
