//! Completions command handler.

use clap_complete::Shell;

/// Completions command.
///
/// Writes the completion script for `shell` to stdout.
pub fn cmd_completions(
    shell: Shell,
    mut command: clap::Command,
) -> Result<(), Box<dyn std::error::Error>> {
    let name = command.get_name().to_string();
    clap_complete::generate(shell, &mut command, name, &mut std::io::stdout());
    Ok(())
}
