//! Sort specification

use bson::{Bson, Document, doc};
use serde::{Serialize, Serializer};

/// One sort entry: a numeric direction or a `$meta` sort (e.g. text score).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SortOrder {
    Direction(i32),
    Meta(String),
}

impl SortOrder {
    pub const ASC: SortOrder = SortOrder::Direction(1);
    pub const DESC: SortOrder = SortOrder::Direction(-1);
}

/// `"asc"` (any case) is ascending; every other string is descending.
impl From<&str> for SortOrder {
    fn from(order: &str) -> Self {
        if order.eq_ignore_ascii_case("asc") {
            SortOrder::ASC
        } else {
            SortOrder::DESC
        }
    }
}

impl From<String> for SortOrder {
    fn from(order: String) -> Self {
        SortOrder::from(order.as_str())
    }
}

impl From<i32> for SortOrder {
    fn from(order: i32) -> Self {
        SortOrder::Direction(order)
    }
}

impl From<i64> for SortOrder {
    fn from(order: i64) -> Self {
        let clamped = order.clamp(i32::MIN.into(), i32::MAX.into());
        SortOrder::Direction(clamped as i32)
    }
}

impl From<f64> for SortOrder {
    fn from(order: f64) -> Self {
        SortOrder::Direction(order as i32)
    }
}

impl From<bool> for SortOrder {
    fn from(order: bool) -> Self {
        SortOrder::Direction(i32::from(order))
    }
}

/// Loose conversion used for sort documents and chain scripts: numbers and
/// booleans are truncated to an integer, strings follow the `"asc"` rule,
/// `{$meta: name}` documents stay meta sorts.
impl From<&Bson> for SortOrder {
    fn from(order: &Bson) -> Self {
        match order {
            Bson::String(s) => SortOrder::from(s.as_str()),
            Bson::Int32(n) => SortOrder::from(*n),
            Bson::Int64(n) => SortOrder::from(*n),
            Bson::Double(n) => SortOrder::from(*n),
            Bson::Boolean(b) => SortOrder::from(*b),
            Bson::Null => SortOrder::Direction(0),
            Bson::Document(doc) => match doc.get_str("$meta") {
                Ok(meta) => SortOrder::Meta(meta.to_string()),
                Err(_) => SortOrder::Direction(i32::from(!doc.is_empty())),
            },
            Bson::Array(items) => SortOrder::Direction(i32::from(!items.is_empty())),
            _ => SortOrder::ASC,
        }
    }
}

impl From<SortOrder> for Bson {
    fn from(order: SortOrder) -> Self {
        match order {
            SortOrder::Direction(n) => Bson::Int32(n),
            SortOrder::Meta(meta) => Bson::Document(doc! { "$meta": meta }),
        }
    }
}

/// Ordered field → order mapping. Updating an existing field keeps its
/// original position.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SortSpec {
    entries: Vec<(String, SortOrder)>,
}

impl SortSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, field: impl Into<String>, order: SortOrder) {
        let field = field.into();
        match self.entries.iter_mut().find(|(name, _)| *name == field) {
            Some(entry) => entry.1 = order,
            None => self.entries.push((field, order)),
        }
    }

    pub fn get(&self, field: &str) -> Option<&SortOrder> {
        self.entries
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, order)| order)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SortOrder)> {
        self.entries.iter().map(|(name, order)| (name.as_str(), order))
    }

    pub fn to_document(&self) -> Document {
        let mut doc = Document::new();
        for (field, order) in &self.entries {
            doc.insert(field.clone(), Bson::from(order.clone()));
        }
        doc
    }
}

impl Serialize for SortSpec {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_document().serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_directions() {
        assert_eq!(SortOrder::from("asc"), SortOrder::ASC);
        assert_eq!(SortOrder::from("ASC"), SortOrder::ASC);
        assert_eq!(SortOrder::from("desc"), SortOrder::DESC);
        assert_eq!(SortOrder::from("ascending"), SortOrder::DESC);
    }

    #[test]
    fn test_numeric_coercion() {
        assert_eq!(SortOrder::from(true), SortOrder::Direction(1));
        assert_eq!(SortOrder::from(false), SortOrder::Direction(0));
        assert_eq!(SortOrder::from(-1.7), SortOrder::Direction(-1));
        assert_eq!(SortOrder::from(&Bson::Int64(-1)), SortOrder::DESC);
    }

    #[test]
    fn test_out_of_range_direction_keeps_sign() {
        assert_eq!(SortOrder::from(4_294_967_295_i64), SortOrder::Direction(i32::MAX));
        assert_eq!(SortOrder::from(i64::MIN), SortOrder::Direction(i32::MIN));
        assert_eq!(SortOrder::from(1e12), SortOrder::Direction(i32::MAX));
    }

    #[test]
    fn test_meta_from_bson() {
        let order = SortOrder::from(&Bson::Document(doc! { "$meta": "textScore" }));
        assert_eq!(order, SortOrder::Meta("textScore".to_string()));
    }

    #[test]
    fn test_update_keeps_position() {
        let mut spec = SortSpec::new();
        spec.set("a", SortOrder::ASC);
        spec.set("b", SortOrder::DESC);
        spec.set("a", SortOrder::DESC);
        assert_eq!(spec.to_document(), doc! { "a": -1, "b": -1 });
        assert_eq!(spec.iter().map(|(f, _)| f).collect::<Vec<_>>(), vec!["a", "b"]);
    }
}
