//! Business logic behind the CLI commands.

pub mod assets;
pub mod attendance;
pub mod config;
pub mod dashboard;
pub mod log;
pub mod schedules;
pub mod site;
pub mod tickets;
pub mod tracking;
