//! JSON rendering of BSON documents
//!
//! Documents are converted with relaxed extended JSON, so plain numbers
//! and strings stay plain while JavaScript code, dates and the like keep
//! their `$code` / `$date` wrappers.

use bson::{Bson, Document};
use colored_json::prelude::*;
use serde::Serialize;

use crate::error::{DocQueryError, Result};

/// JSON formatter with pretty printing support
pub struct JsonFormatter {
    pretty: bool,
    indent: usize,
    use_colors: bool,
}

impl JsonFormatter {
    pub fn new(pretty: bool, use_colors: bool, indent: usize) -> Self {
        Self {
            pretty,
            indent,
            use_colors,
        }
    }

    pub fn format_document(&self, doc: &Document) -> Result<String> {
        self.format_value(&Bson::Document(doc.clone()))
    }

    pub fn format_value(&self, value: &Bson) -> Result<String> {
        let json = value.clone().into_relaxed_extjson();

        let json_str = if self.pretty {
            self.to_pretty_string(&json)?
        } else {
            serde_json::to_string(&json)?
        };

        // Compact output stays uncolored for piping
        if self.use_colors && self.pretty {
            Ok(json_str.to_colored_json_auto().unwrap_or(json_str))
        } else {
            Ok(json_str)
        }
    }

    fn to_pretty_string<T: Serialize>(&self, value: &T) -> Result<String> {
        let mut buf = Vec::new();
        let indent = " ".repeat(self.indent);
        let formatter = serde_json::ser::PrettyFormatter::with_indent(indent.as_bytes());
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
        value.serialize(&mut ser)?;
        String::from_utf8(buf).map_err(|e| DocQueryError::Generic(e.to_string()))
    }
}

impl Default for JsonFormatter {
    fn default() -> Self {
        Self::new(true, false, 2)
    }
}
