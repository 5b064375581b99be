//! docquery library
//!
//! A fluent, stateful query builder for a document database. A
//! [`Builder`] accumulates the operation type, criteria, update operators
//! and result shaping through chained calls and is finally frozen into an
//! immutable [`Command`].
//!
//! # Modules
//!
//! - `query`: the builder, its configuration and the assembled command
//! - `expr`: the criteria / update accumulator and GeoJSON values
//! - `parser`: JSON chain scripts dispatched onto a builder
//! - `formatter`: JSON rendering of commands
//! - `config`: TOML configuration with environment overrides
//! - `cli`: command-line interface of the `docquery` binary
//! - `error`: error types and handling
//!
//! # Example
//!
//! ```
//! use bson::doc;
//! use docquery::Builder;
//!
//! let mut qb = Builder::new("shop", "products");
//! qb.update_many()
//!     .field("stock").lte(0)
//!     .field("status").set("sold-out", true);
//!
//! let command = qb.assemble();
//! assert_eq!(command.new_obj(), &doc! { "$set": { "status": "sold-out" } });
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod expr;
pub mod formatter;
pub mod parser;
pub mod query;

// Re-export commonly used types
pub use config::Config;
pub use error::{DocQueryError, Result};
pub use expr::Expr;
pub use formatter::Formatter;
pub use parser::ChainScript;
pub use query::{Builder, Command, CommandKind, OperationType};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get library version string
pub fn version() -> &'static str {
    VERSION
}
