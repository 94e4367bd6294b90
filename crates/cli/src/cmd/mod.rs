//! CLI command implementations

pub mod check;
pub mod example;
pub mod run;

use std::io::IsTerminal;

/// Colored console output unless stdout is redirected or NO_COLOR is set
pub fn use_color() -> bool {
    std::io::stdout().is_terminal() && std::env::var_os("NO_COLOR").is_none()
}
