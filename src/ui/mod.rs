//! User interface
//!
//! CLI parsing, terminal colors, progress bars and shell completions.

pub mod cli;
pub mod color;
pub mod completion;
pub mod progress;

pub use cli::{Cli, Commands, cli_to_config};
pub use completion::{completion_script, print_completions};
pub use progress::ProgressReporter;
