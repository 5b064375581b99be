//! Chain-script parser
//!
//! A chain script is a JSON description of a builder session:
//!
//! ```json
//! {
//!   "database": "shop",
//!   "collection": "orders",
//!   "chain": [
//!     ["find"],
//!     ["field", "status"], ["equals", "open"],
//!     ["sort", {"created": -1}],
//!     ["limit", 20]
//!   ]
//! }
//! ```
//!
//! A bare array of steps is accepted too, in which case the namespace comes
//! from the caller. Argument values go through BSON extended JSON, so
//! `{"$date": ...}` or `{"$oid": ...}` literals work as usual.
//!
//! # Examples
//!
//! ```
//! use docquery::parser::{ChainScript, Terminal};
//! use docquery::query::Namespace;
//!
//! let script = ChainScript::from_json(r#"[["count"], ["field", "a"], ["gt", 1]]"#).unwrap();
//! let (builder, terminal) = script.build(&Namespace::new("test", "items")).unwrap();
//!
//! assert_eq!(terminal, Terminal::Assemble);
//! assert_eq!(builder.assemble().to_string(), "count on test.items");
//! ```

mod args;
mod chain;

pub use args::ArgParser;
pub use chain::{ChainHandler, ChainMethod, Terminal};

use bson::Bson;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::error::{ParseError, Result};
use crate::query::{Builder, Namespace};

#[derive(Deserialize)]
#[serde(untagged)]
enum RawScript {
    Full {
        database: Option<String>,
        collection: Option<String>,
        chain: Vec<Vec<Value>>,
    },
    Steps(Vec<Vec<Value>>),
}

/// A parsed chain script.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ChainScript {
    pub database: Option<String>,
    pub collection: Option<String>,
    pub chain: Vec<ChainMethod>,
}

impl ChainScript {
    /// Parse a script from JSON text.
    pub fn from_json(input: &str) -> Result<Self> {
        let raw: RawScript = serde_json::from_str(input)
            .map_err(|e| ParseError::InvalidScript(e.to_string()))?;

        let (database, collection, steps) = match raw {
            RawScript::Full {
                database,
                collection,
                chain,
            } => (database, collection, chain),
            RawScript::Steps(chain) => (None, None, chain),
        };

        let chain = steps
            .into_iter()
            .enumerate()
            .map(|(position, step)| Self::parse_step(position, step))
            .collect::<Result<Vec<_>>>()?;

        debug!("Parsed chain script with {} steps", chain.len());
        Ok(Self {
            database,
            collection,
            chain,
        })
    }

    fn parse_step(position: usize, step: Vec<Value>) -> Result<ChainMethod> {
        let mut values = step.into_iter();
        let name = match values.next() {
            Some(Value::String(name)) => name,
            _ => {
                return Err(ParseError::InvalidScript(format!(
                    "step {} must start with a method name",
                    position + 1
                ))
                .into());
            }
        };

        let args = values
            .map(|value| {
                Bson::try_from(value).map_err(|e| {
                    ParseError::InvalidScript(format!("step {} ({name}): {e}", position + 1))
                })
            })
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(ChainMethod { name, args })
    }

    /// The script's namespace, falling back to `default` per component.
    pub fn namespace(&self, default: &Namespace) -> Namespace {
        Namespace::new(
            self.database.clone().unwrap_or_else(|| default.database.clone()),
            self.collection.clone().unwrap_or_else(|| default.collection.clone()),
        )
    }

    /// Run the chain on a fresh builder.
    pub fn build(&self, default: &Namespace) -> Result<(Builder, Terminal)> {
        let mut builder = Builder::from_namespace(self.namespace(default));
        let terminal = ChainHandler::apply_chain_methods(&mut builder, &self.chain)?;
        Ok((builder, terminal))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DocQueryError;
    use crate::query::OperationType;
    use bson::doc;

    fn default_namespace() -> Namespace {
        Namespace::new("test", "test")
    }

    #[test]
    fn test_full_script() {
        let script = ChainScript::from_json(
            r#"{
                "database": "shop",
                "chain": [
                    ["findAndUpdate"],
                    ["field", "qty"], ["gt", 0], ["inc", -1],
                    ["new"]
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(script.chain.len(), 5);
        let (builder, _) = script.build(&default_namespace()).unwrap();
        assert_eq!(builder.namespace(), &Namespace::new("shop", "test"));
        assert_eq!(builder.get_type(), OperationType::FindAndUpdate);
        assert!(builder.configuration().return_new);
        assert_eq!(builder.get_query_array(), &doc! { "qty": { "$gt": 0 } });
        assert_eq!(builder.get_new_obj(), &doc! { "$inc": { "qty": -1 } });
    }

    #[test]
    fn test_bare_step_list() {
        let script = ChainScript::from_json(r#"[["distinct", "city"]]"#).unwrap();
        assert!(script.database.is_none());

        let (builder, _) = script.build(&Namespace::new("geo", "places")).unwrap();
        assert_eq!(builder.assemble().to_string(), "distinct on geo.places");
    }

    #[test]
    fn test_extended_json_arguments() {
        let script = ChainScript::from_json(
            r#"[["field", "n"], ["equals", {"$numberLong": "7"}]]"#,
        )
        .unwrap();
        assert_eq!(script.chain[1].args, vec![Bson::Int64(7)]);
    }

    #[test]
    fn test_invalid_scripts() {
        for input in ["not json", r#"{"chain": [[1, 2]]}"#, r#"[[]]"#, r#"{"database": "x"}"#] {
            let err = ChainScript::from_json(input).unwrap_err();
            assert!(
                matches!(err, DocQueryError::Parse(ParseError::InvalidScript(_))),
                "unexpected error for {input}: {err}"
            );
        }
    }
}
