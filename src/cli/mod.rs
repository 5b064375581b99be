//! Command-line interface for docquery
//!
//! This module handles:
//! - Command-line argument parsing using clap
//! - Configuration loading and CLI overrides
//! - Reading the chain script (file, stdin or `--eval`)
//! - Running the chain and formatting its output

mod completion;

use clap::{Parser, Subcommand};
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::{
    Config, LogLevel, OutputFormat, validate_collection_name, validate_database_name,
};
use crate::error::{DocQueryError, Result};
use crate::formatter::Formatter;
use crate::parser::{ChainScript, Terminal};

pub use completion::{completion_script, generate_completion};

/// Build document-database commands from chain scripts
#[derive(Parser, Debug)]
#[command(
    name = "docquery",
    version,
    about = "Fluent query builder for document databases",
    long_about = "Runs a JSON chain script of builder calls, e.g.
[[\"find\"], [\"field\", \"age\"], [\"gte\", 18], [\"limit\", 10]]
and prints the assembled command."
)]
pub struct CliArgs {
    /// Chain script file (`-` reads standard input)
    #[arg(value_name = "SCRIPT")]
    pub script: Option<PathBuf>,

    /// Inline chain script
    #[arg(short = 'e', long, value_name = "JSON", conflicts_with = "script")]
    pub eval: Option<String>,

    /// Database name (overrides the script and config)
    #[arg(long, value_name = "NAME")]
    pub database: Option<String>,

    /// Collection name (overrides the script and config)
    #[arg(long, value_name = "NAME")]
    pub collection: Option<String>,

    /// Configuration file path
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    pub config_file: Option<PathBuf>,

    /// Output format (json, json-pretty)
    #[arg(long, value_name = "FORMAT")]
    pub format: Option<String>,

    /// Disable colored output
    #[arg(long = "no-color")]
    pub no_color: bool,

    /// Print the builder's debug view instead of the assembled command
    #[arg(long)]
    pub debug: bool,

    /// Verbose mode (debug logging)
    #[arg(short = 'v', long)]
    pub verbose: bool,

    /// Very verbose mode (trace logging)
    #[arg(long = "vv")]
    pub very_verbose: bool,

    /// Subcommands
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Subcommands for docquery
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show version information
    Version,

    /// Generate shell completion script
    Completion {
        /// Shell type (bash, zsh, fish)
        #[arg(value_name = "SHELL")]
        shell: String,
    },

    /// Show configuration
    Config {
        /// Show effective configuration
        #[arg(long)]
        show: bool,

        /// Validate configuration file
        #[arg(long)]
        validate: bool,
    },
}

/// CLI interface handler
pub struct CliInterface {
    args: CliArgs,
    config: Config,
}

impl CliInterface {
    /// Parse the process arguments and load configuration.
    pub fn new() -> Result<Self> {
        Self::from_args(CliArgs::parse())
    }

    pub fn from_args(args: CliArgs) -> Result<Self> {
        let config = Self::load_config(&args)?;
        Ok(Self { args, config })
    }

    fn load_config(args: &CliArgs) -> Result<Config> {
        let mut config = Config::load(args.config_file.as_deref())?;
        Self::apply_args_to_config(&mut config, args)?;
        Ok(config)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn args(&self) -> &CliArgs {
        &self.args
    }

    /// Override configuration values with CLI arguments where provided
    fn apply_args_to_config(config: &mut Config, args: &CliArgs) -> Result<()> {
        if let Some(format) = &args.format {
            config.display.format = format.parse::<OutputFormat>()?;
        }
        if args.no_color {
            config.display.color_output = false;
        }

        config.logging.level = if args.very_verbose {
            LogLevel::Trace
        } else if args.verbose {
            LogLevel::Debug
        } else {
            config.logging.level
        };

        Ok(())
    }

    /// Handle subcommands
    ///
    /// Returns `true` if a subcommand ran and nothing else should happen.
    pub fn handle_subcommand(&self) -> Result<bool> {
        match &self.args.command {
            Some(Commands::Version) => {
                self.show_version();
                Ok(true)
            }
            Some(Commands::Completion { shell }) => {
                generate_completion(shell)?;
                Ok(true)
            }
            Some(Commands::Config { show, validate }) => {
                self.handle_config_command(*show, *validate)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn show_version(&self) {
        println!("docquery version {}", env!("CARGO_PKG_VERSION"));
        println!("Rust version: {}", env!("CARGO_PKG_RUST_VERSION"));
    }

    fn handle_config_command(&self, show: bool, validate: bool) -> Result<()> {
        if validate {
            self.validate_config_file()?;
        }

        if show {
            self.show_config()?;
        }

        Ok(())
    }

    fn validate_config_file(&self) -> Result<()> {
        let path = self.get_config_path();
        println!("Validating configuration file: {}", path.display());

        if !path.exists() {
            println!("Configuration file does not exist");
            return Ok(());
        }

        match Config::from_file(&path) {
            Ok(config) => match config.validate() {
                Ok(_) => println!("Configuration is valid"),
                Err(e) => println!("Configuration validation failed: {}", e),
            },
            Err(e) => println!("Failed to load configuration: {}", e),
        }

        Ok(())
    }

    fn show_config(&self) -> Result<()> {
        let path = self.get_config_path();
        println!("Configuration file: {}", path.display());
        println!();
        println!("=== Effective Configuration ===");
        println!();
        println!("{}", self.config.to_toml()?);
        Ok(())
    }

    fn get_config_path(&self) -> PathBuf {
        self.args
            .config_file
            .clone()
            .unwrap_or_else(Config::default_path)
    }

    /// The chain script text from `--eval`, the script file or stdin.
    pub fn read_script(&self) -> Result<String> {
        if let Some(eval) = &self.args.eval {
            return Ok(eval.clone());
        }

        match self.args.script.as_deref() {
            Some(path) if path == Path::new("-") => {
                let mut input = String::new();
                io::stdin().read_to_string(&mut input)?;
                Ok(input)
            }
            Some(path) => {
                debug!("Reading chain script from {}", path.display());
                Ok(fs::read_to_string(path)?)
            }
            None => Err(DocQueryError::Generic(
                "No chain script given (pass a file, '-' for stdin, or --eval)".to_string(),
            )),
        }
    }

    /// Run a chain script and return the formatted output.
    pub fn run_script(&self, input: &str) -> Result<String> {
        let mut script = ChainScript::from_json(input)?;
        if let Some(database) = &self.args.database {
            validate_database_name("--database", database)?;
            script.database = Some(database.clone());
        }
        if let Some(collection) = &self.args.collection {
            validate_collection_name("--collection", collection)?;
            script.collection = Some(collection.clone());
        }

        let (builder, terminal) = script.build(&self.config.default_namespace())?;
        let terminal = if self.args.debug {
            Terminal::Debug
        } else {
            terminal
        };

        let formatter = Formatter::from_config(&self.config.display);
        match terminal {
            Terminal::Assemble => formatter.format_command(&builder.assemble()),
            Terminal::Debug => formatter.format_document(&builder.debug()?),
            Terminal::DebugEntry(name) => {
                formatter.format_value(builder.debug_entry(&name)?.as_ref())
            }
        }
    }

    /// Read the script and run it.
    pub fn run(&self) -> Result<String> {
        let input = self.read_script()?;
        self.run_script(&input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cli(argv: &[&str]) -> CliInterface {
        let args = CliArgs::try_parse_from(argv).unwrap();
        let mut config = Config::default();
        CliInterface::apply_args_to_config(&mut config, &args).unwrap();
        CliInterface { args, config }
    }

    #[test]
    fn test_cli_args_parsing() {
        let args = CliArgs::try_parse_from(["docquery"]).unwrap();
        assert!(args.script.is_none());
        assert!(args.eval.is_none());
        assert!(args.command.is_none());
    }

    #[test]
    fn test_cli_args_with_flags() {
        let args =
            CliArgs::try_parse_from(["docquery", "chain.json", "--no-color", "--debug", "-v"])
                .unwrap();
        assert_eq!(args.script, Some(PathBuf::from("chain.json")));
        assert!(args.no_color);
        assert!(args.debug);
        assert!(args.verbose);
    }

    #[test]
    fn test_eval_conflicts_with_script() {
        assert!(CliArgs::try_parse_from(["docquery", "a.json", "--eval", "[]"]).is_err());
    }

    #[test]
    fn test_subcommands() {
        let args = CliArgs::try_parse_from(["docquery", "completion", "zsh"]).unwrap();
        assert!(matches!(args.command, Some(Commands::Completion { shell }) if shell == "zsh"));

        let args = CliArgs::try_parse_from(["docquery", "config", "--show"]).unwrap();
        assert!(matches!(
            args.command,
            Some(Commands::Config { show: true, validate: false })
        ));
    }

    #[test]
    fn test_args_override_config() {
        let cli = cli(&["docquery", "--format", "json", "--no-color", "--vv"]);
        assert_eq!(cli.config().display.format, OutputFormat::Json);
        assert!(!cli.config().display.color_output);
        assert_eq!(cli.config().logging.level, LogLevel::Trace);
    }

    #[test]
    fn test_unknown_format_is_rejected() {
        let args = CliArgs::try_parse_from(["docquery", "--format", "table"]).unwrap();
        let mut config = Config::default();
        assert!(CliInterface::apply_args_to_config(&mut config, &args).is_err());
    }

    #[test]
    fn test_read_script_from_eval() {
        let cli = cli(&["docquery", "--eval", "[[\"count\"]]"]);
        assert_eq!(cli.read_script().unwrap(), "[[\"count\"]]");
    }

    #[test]
    fn test_read_script_missing() {
        let cli = cli(&["docquery"]);
        assert!(cli.read_script().is_err());
    }

    #[test]
    fn test_run_script_assembles() {
        let cli = cli(&["docquery", "--format", "json", "--collection", "users"]);
        let output = cli
            .run_script(r#"{"collection": "ignored", "chain": [["field", "age"], ["gt", 30]]}"#)
            .unwrap();
        assert_eq!(
            output,
            r#"{"type":"find","database":"test","collection":"users","query":{"age":{"$gt":30}}}"#
        );
    }

    #[test]
    fn test_run_script_debug_entry() {
        let cli = cli(&["docquery", "--format", "json"]);
        let output = cli
            .run_script(r#"[["sort", "a", -1], ["debug", "sort"]]"#)
            .unwrap();
        assert_eq!(output, r#"{"a":-1}"#);
    }

    #[test]
    fn test_run_script_debug_flag() {
        let cli = cli(&["docquery", "--format", "json", "--debug"]);
        let output = cli.run_script(r#"[["limit", 3]]"#).unwrap();
        assert_eq!(output, r#"{"type":"find","limit":3}"#);
    }

    #[test]
    fn test_namespace_overrides_are_validated() {
        let empty_database = cli(&["docquery", "--database", ""]);
        assert!(empty_database.run_script(r#"[["count"]]"#).is_err());

        let bad_collection = cli(&["docquery", "--collection", "bad$name"]);
        let err = bad_collection.run_script(r#"[["count"]]"#).unwrap_err();
        assert!(err.to_string().contains("--collection"));
    }

    #[test]
    fn test_run_script_reports_invalid_call() {
        let cli = cli(&["docquery"]);
        let err = cli.run_script(r#"[["finalize", "function() {}"]]"#).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid call: mapReduce(), map() or group() must precede finalize()"
        );
    }
}
