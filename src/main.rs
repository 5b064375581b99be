//! docquery - fluent query builder for document databases
//!
//! Reads a JSON chain script of builder calls and prints the assembled
//! command.
//!
//! # Usage
//!
//! ```bash
//! docquery --eval '[["find"], ["field", "age"], ["gte", 18], ["limit", 10]]'
//! docquery --debug chain.json
//! echo '[["count"]]' | docquery - --collection users
//! ```

use tracing::Level;

use docquery::cli::CliInterface;
use docquery::error::Result;

/// Application entry point
fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Parse arguments, set up logging, then either run a subcommand or the
/// chain script.
fn run() -> Result<()> {
    let cli = CliInterface::new()?;

    initialize_logging(&cli);

    if cli.handle_subcommand()? {
        return Ok(());
    }

    let output = cli.run()?;
    println!("{}", output);
    Ok(())
}

/// Initialize logging from the effective configuration
///
/// Logs go to stderr so stdout only carries the rendered command.
fn initialize_logging(cli: &CliInterface) {
    let level: Level = cli.config().logging.level.to_tracing_level();

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr);

    if cli.config().logging.timestamps {
        subscriber.init();
    } else {
        subscriber.without_time().init();
    }
}
