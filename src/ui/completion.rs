//! Shell completion scripts for urlsweep

use clap::{Command, CommandFactory};
use clap_complete::{Generator, Shell, generate};

use std::io::Write;

/// Generate shell completions for the given shell
pub fn print_completions<G: Generator>(generator: G, app: &mut Command) {
    write_completions(generator, app, &mut std::io::stdout());
}

/// Write the completion script for `generator` into `out`
pub fn write_completions<G: Generator>(generator: G, app: &mut Command, out: &mut dyn Write) {
    let name = app.get_name().to_string();
    generate(generator, app, name, out);
}

/// Completion script for `shell`, built from the full CLI definition
pub fn completion_script(shell: Shell) -> String {
    let mut cmd = crate::ui::cli::Cli::command();
    let mut buf = Vec::new();
    write_completions(shell, &mut cmd, &mut buf);
    String::from_utf8_lossy(&buf).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bash_script_mentions_subcommands() {
        let script = completion_script(Shell::Bash);
        assert!(script.contains("urlsweep"));
        assert!(script.contains("harvest"));
        assert!(script.contains("probe"));
        assert!(script.contains("alive"));
    }

    #[test]
    fn test_every_supported_shell_generates_output() {
        for shell in [
            Shell::Bash,
            Shell::Zsh,
            Shell::Fish,
            Shell::PowerShell,
            Shell::Elvish,
        ] {
            assert!(
                !completion_script(shell).is_empty(),
                "{shell:?} completion should generate output"
            );
        }
    }
}
