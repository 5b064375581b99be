//! Output formatting for assembled commands
//!
//! Renders what a chain produced (the assembled [`Command`], the `debug()`
//! view or a single debug entry) as compact or pretty JSON, optionally
//! colored.

mod json;

pub use json::JsonFormatter;

use bson::{Bson, Document};

use crate::config::{DisplayConfig, OutputFormat};
use crate::error::Result;
use crate::query::Command;

/// Main formatter for chain output
pub struct Formatter {
    format_type: OutputFormat,
    use_colors: bool,
}

impl Formatter {
    pub fn new(format_type: OutputFormat, use_colors: bool) -> Self {
        Self {
            format_type,
            use_colors,
        }
    }

    pub fn from_config(config: &DisplayConfig) -> Self {
        Self::new(config.format, config.color_output)
    }

    fn json(&self) -> JsonFormatter {
        JsonFormatter::new(self.format_type.is_pretty(), self.use_colors, 2)
    }

    /// Format the wire-style view of a command.
    pub fn format_command(&self, command: &Command) -> Result<String> {
        self.format_document(&command.to_document())
    }

    pub fn format_document(&self, doc: &Document) -> Result<String> {
        self.json().format_document(doc)
    }

    /// Format a single value; a missing value prints as `null`.
    pub fn format_value(&self, value: Option<&Bson>) -> Result<String> {
        self.json().format_value(value.unwrap_or(&Bson::Null))
    }
}

impl Default for Formatter {
    fn default() -> Self {
        Self::from_config(&DisplayConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::Builder;

    #[test]
    fn test_format_command_compact() {
        let mut qb = Builder::new("shop", "orders");
        qb.count().field("status").equals("open");

        let output = Formatter::new(OutputFormat::Json, true)
            .format_command(&qb.assemble())
            .unwrap();
        assert_eq!(
            output,
            r#"{"type":"count","database":"shop","collection":"orders","query":{"status":"open"}}"#
        );
    }

    #[test]
    fn test_format_missing_value() {
        let output = Formatter::new(OutputFormat::Json, false)
            .format_value(None)
            .unwrap();
        assert_eq!(output, "null");
    }

    #[test]
    fn test_pretty_without_color() {
        let output = Formatter::new(OutputFormat::JsonPretty, false)
            .format_value(Some(&Bson::Int32(3)))
            .unwrap();
        assert_eq!(output, "3");
    }
}
