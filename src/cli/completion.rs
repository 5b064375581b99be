//! Shell completion generation for docquery

use clap::CommandFactory;
use clap_complete::{Shell, generate};

use crate::cli::CliArgs;
use crate::error::{ConfigError, Result};

/// Print the completion script for `shell_name` to stdout.
pub fn generate_completion(shell_name: &str) -> Result<()> {
    print!("{}", completion_script(shell_name)?);
    Ok(())
}

/// Render the completion script for `shell_name` (bash, zsh or fish).
pub fn completion_script(shell_name: &str) -> Result<String> {
    let shell = parse_shell(shell_name)?;
    let mut cmd = CliArgs::command();
    let mut buffer = Vec::new();
    generate(shell, &mut cmd, "docquery", &mut buffer);
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

fn parse_shell(shell_name: &str) -> Result<Shell> {
    match shell_name.to_lowercase().as_str() {
        "bash" => Ok(Shell::Bash),
        "zsh" => Ok(Shell::Zsh),
        "fish" => Ok(Shell::Fish),
        _ => Err(ConfigError::InvalidValue {
            field: "shell".to_string(),
            value: format!("{shell_name} (supported: bash, zsh, fish)"),
        }
        .into()),
    }
}
