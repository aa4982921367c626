//! Config command handler.
//!
//! Contains the implementation of the `config` CLI command.

use faildigest::config::FaildigestConfig;

/// Config command.
pub fn cmd_config(config: &FaildigestConfig, show: bool) -> Result<(), Box<dyn std::error::Error>> {
    if !show {
        println!("Use --show to display the effective configuration.");
        return Ok(());
    }

    println!("# Effective configuration (defaults, config file, environment)");
    print!("{}", config.to_toml()?);
    Ok(())
}
