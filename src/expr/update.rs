//! Update operators
//!
//! Each operator merges `{$op: {field: value}}` into the mutation document.
//! All of them need a current field; without one the call is logged and
//! dropped.

use bson::{Bson, Document, doc};
use tracing::warn;

use super::{Expr, merge_into};

/// Walk (creating as needed) the dotted `path` and store `value` at its end.
fn set_path(doc: &mut Document, path: &[&str], value: Bson) {
    match path {
        [] => {}
        [last] => {
            doc.insert(*last, value);
        }
        [head, rest @ ..] => {
            if !matches!(doc.get(*head), Some(Bson::Document(_))) {
                doc.insert(*head, Document::new());
            }
            if let Some(Bson::Document(child)) = doc.get_mut(*head) {
                set_path(child, rest, value);
            }
        }
    }
}

/// `$push` modifiers must follow `$each`, so a modifier document is
/// rebuilt with `$each` (empty if absent) in first position.
fn normalize_push_modifiers(value: Bson) -> Bson {
    match value {
        Bson::Document(mut modifiers)
            if modifiers.keys().next().is_some_and(|k| k.starts_with('$')) =>
        {
            let each = modifiers
                .remove("$each")
                .unwrap_or_else(|| Bson::Array(Vec::new()));
            let mut ordered = doc! { "$each": each };
            for (key, modifier) in modifiers {
                ordered.insert(key, modifier);
            }
            Bson::Document(ordered)
        }
        other => other,
    }
}

impl Expr {
    fn update_operator(&mut self, op: &str, value: Bson) -> &mut Self {
        match &self.current_field {
            Some(field) => merge_into(&mut self.new_obj, op, field, value),
            None => warn!("{op} requires a current field; call field() first"),
        }
        self
    }

    /// Assign `value` to the current field.
    ///
    /// With `atomic` the assignment is expressed as `$set`; otherwise the
    /// value is written straight into the mutation document, following
    /// dotted field names as a nested path.
    pub fn set(&mut self, value: impl Into<Bson>, atomic: bool) -> &mut Self {
        let value = value.into();
        if atomic {
            return self.update_operator("$set", value);
        }

        let Some(field) = self.current_field.as_deref() else {
            warn!("set() requires a current field; call field() first");
            return self;
        };
        if field.contains('.') {
            let path: Vec<&str> = field.split('.').collect();
            set_path(&mut self.new_obj, &path, value);
        } else {
            self.new_obj.insert(field, value);
        }
        self
    }

    pub fn set_on_insert(&mut self, value: impl Into<Bson>) -> &mut Self {
        self.update_operator("$setOnInsert", value.into())
    }

    pub fn inc(&mut self, value: impl Into<Bson>) -> &mut Self {
        self.update_operator("$inc", value.into())
    }

    pub fn mul(&mut self, value: impl Into<Bson>) -> &mut Self {
        self.update_operator("$mul", value.into())
    }

    pub fn min(&mut self, value: impl Into<Bson>) -> &mut Self {
        self.update_operator("$min", value.into())
    }

    pub fn max(&mut self, value: impl Into<Bson>) -> &mut Self {
        self.update_operator("$max", value.into())
    }

    pub fn rename(&mut self, new_name: impl Into<String>) -> &mut Self {
        self.update_operator("$rename", Bson::String(new_name.into()))
    }

    /// `$currentDate` with `type` either `"date"` or `"timestamp"`.
    pub fn current_date(&mut self, date_type: &str) -> &mut Self {
        self.update_operator("$currentDate", Bson::Document(doc! { "$type": date_type }))
    }

    pub fn unset_field(&mut self) -> &mut Self {
        self.update_operator("$unset", Bson::Int32(1))
    }

    pub fn push(&mut self, value: impl Into<Bson>) -> &mut Self {
        self.update_operator("$push", normalize_push_modifiers(value.into()))
    }

    pub fn push_all(&mut self, values: impl Into<Bson>) -> &mut Self {
        self.update_operator("$pushAll", values.into())
    }

    pub fn add_to_set(&mut self, value: impl Into<Bson>) -> &mut Self {
        self.update_operator("$addToSet", value.into())
    }

    pub fn add_many_to_set(&mut self, values: impl Into<Bson>) -> &mut Self {
        self.update_operator("$addToSet", Bson::Document(doc! { "$each": values.into() }))
    }

    pub fn pop_first(&mut self) -> &mut Self {
        self.update_operator("$pop", Bson::Int32(-1))
    }

    pub fn pop_last(&mut self) -> &mut Self {
        self.update_operator("$pop", Bson::Int32(1))
    }

    pub fn pull(&mut self, value: impl Into<Bson>) -> &mut Self {
        self.update_operator("$pull", value.into())
    }

    pub fn pull_all(&mut self, values: impl Into<Bson>) -> &mut Self {
        self.update_operator("$pullAll", values.into())
    }

    pub fn bit_and(&mut self, value: i64) -> &mut Self {
        self.update_operator("$bit", Bson::Document(doc! { "and": value }))
    }

    pub fn bit_or(&mut self, value: i64) -> &mut Self {
        self.update_operator("$bit", Bson::Document(doc! { "or": value }))
    }

    pub fn bit_xor(&mut self, value: i64) -> &mut Self {
        self.update_operator("$bit", Bson::Document(doc! { "xor": value }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_atomic_set_and_inc() {
        let mut expr = Expr::new();
        expr.field("name").set("ann", true).field("n").inc(2);
        assert_eq!(
            expr.get_new_obj(),
            &doc! { "$set": { "name": "ann" }, "$inc": { "n": 2 } }
        );
    }

    #[test]
    fn test_plain_set_follows_dotted_path() {
        let mut expr = Expr::new();
        expr.field("a.b.c").set(1, false).field("a.d").set(2, false);
        assert_eq!(expr.get_new_obj(), &doc! { "a": { "b": { "c": 1 }, "d": 2 } });
    }

    #[test]
    fn test_update_without_field_is_dropped() {
        let mut expr = Expr::new();
        expr.inc(1).set(3, false);
        assert!(expr.get_new_obj().is_empty());
    }

    #[test]
    fn test_pop_and_unset() {
        let mut expr = Expr::new();
        expr.field("q").pop_first().field("s").pop_last().field("gone").unset_field();
        assert_eq!(
            expr.get_new_obj(),
            &doc! { "$pop": { "q": -1, "s": 1 }, "$unset": { "gone": 1 } }
        );
    }

    #[test]
    fn test_push_modifiers_put_each_first() {
        let mut modifiers = Expr::new();
        modifiers.slice(-5).each(vec![1, 2]).position(0);

        let mut expr = Expr::new();
        expr.field("scores").push(modifiers);

        let pushed = expr
            .get_new_obj()
            .get_document("$push")
            .unwrap()
            .get_document("scores")
            .unwrap();
        let keys: Vec<&str> = pushed.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["$each", "$slice", "$position"]);
    }

    #[test]
    fn test_push_plain_value() {
        let mut expr = Expr::new();
        expr.field("tags").push("new");
        assert_eq!(expr.get_new_obj(), &doc! { "$push": { "tags": "new" } });
    }

    #[test]
    fn test_add_many_to_set_uses_each() {
        let mut expr = Expr::new();
        expr.field("tags").add_many_to_set(vec!["a", "b"]);
        assert_eq!(
            expr.get_new_obj(),
            &doc! { "$addToSet": { "tags": { "$each": ["a", "b"] } } }
        );
    }

    #[test]
    fn test_field_operators() {
        let mut expr = Expr::new();
        expr.field("updated").current_date("timestamp");
        expr.field("flags").bit_or(4);
        expr.field("old").rename("new");
        assert_eq!(
            expr.get_new_obj(),
            &doc! {
                "$currentDate": { "updated": { "$type": "timestamp" } },
                "$bit": { "flags": { "or": 4_i64 } },
                "$rename": { "old": "new" },
            }
        );
    }
}
