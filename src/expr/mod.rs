//! Expression accumulator
//!
//! `Expr` owns the two documents a command is built from:
//! - the criteria document (`query`): nested predicates describing which
//!   documents match
//! - the mutation document (`new_obj`): update operators or a plain
//!   replacement document
//!
//! Predicate and update calls apply to the *current field*, selected with
//! [`Expr::field`]. Without a current field, predicates apply to the top level
//! of the criteria document.
//!
//! # Example
//!
//! ```
//! use bson::doc;
//! use docquery::expr::Expr;
//!
//! let mut expr = Expr::new();
//! expr.field("age").gte(18).lt(65);
//! expr.field("visits").inc(1);
//!
//! assert_eq!(expr.get_query(), &doc! { "age": { "$gte": 18, "$lt": 65 } });
//! assert_eq!(expr.get_new_obj(), &doc! { "$inc": { "visits": 1 } });
//! ```

mod criteria;
pub mod geometry;
mod update;

use bson::{Bson, Document};

pub use geometry::{Geometry, LineString, NearPoint, Point, Polygon, Position};

/// Accumulates criteria and update operators for one command.
///
/// Cloning an `Expr` copies both documents, so a clone evolves
/// independently of the original.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Expr {
    query: Document,
    new_obj: Document,
    current_field: Option<String>,
}

impl Expr {
    /// Create an empty accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Select the field subsequent predicate and update calls apply to.
    pub fn field(&mut self, name: impl Into<String>) -> &mut Self {
        self.current_field = Some(name.into());
        self
    }

    /// The criteria document.
    pub fn get_query(&self) -> &Document {
        &self.query
    }

    /// Replace the criteria document wholesale.
    pub fn set_query(&mut self, query: Document) -> &mut Self {
        self.query = query;
        self
    }

    /// The mutation document.
    pub fn get_new_obj(&self) -> &Document {
        &self.new_obj
    }

    /// Replace the mutation document wholesale.
    pub fn set_new_obj(&mut self, new_obj: Document) -> &mut Self {
        self.new_obj = new_obj;
        self
    }
}

/// An accumulator passed where a criteria value is expected contributes its
/// criteria document.
impl From<Expr> for Bson {
    fn from(expr: Expr) -> Self {
        Bson::Document(expr.query)
    }
}

/// Insert `key: value` into the sub-document stored under `parent`,
/// creating (or replacing a non-document) entry as needed.
///
/// Existing keys keep their position in both documents.
pub(crate) fn merge_into(doc: &mut Document, parent: &str, key: &str, value: Bson) {
    if let Some(Bson::Document(sub)) = doc.get_mut(parent) {
        sub.insert(key, value);
        return;
    }
    let mut sub = Document::new();
    sub.insert(key, value);
    doc.insert(parent, sub);
}

/// Append `value` to the array stored under `key`, creating it if needed.
pub(crate) fn append_to(doc: &mut Document, key: &str, value: Bson) {
    if let Some(Bson::Array(items)) = doc.get_mut(key) {
        items.push(value);
        return;
    }
    doc.insert(key, Bson::Array(vec![value]));
}
