/// ANSI color helper utilities for terminal output.
pub const RESET: &str = "\x1b[0m";

pub const GREY: &str = "\x1b[90m";

pub const RED: &str = "\x1b[31m";
pub const GREEN: &str = "\x1b[32m";

pub const YELLOW: &str = "\x1b[33m";
pub const CYAN: &str = "\x1b[36m";

/// Health score color:
/// \>= 80 → green
/// \>= 50 → yellow
/// otherwise → red
pub fn color_for_health(score: u32) -> &'static str {
    if score >= 80 {
        GREEN
    } else if score >= 50 {
        YELLOW
    } else {
        RED
    }
}

pub fn colorize_allowed(value: &str, allowed: bool) -> String {
    if allowed {
        format!("{GREEN}{value}{RESET}")
    } else {
        format!("{RED}{value}{RESET}")
    }
}
