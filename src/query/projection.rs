//! Projection specification
//!
//! Plain inclusion flags and operator projections share one map keyed by
//! field name; the last write for a field wins.

use std::collections::BTreeMap;

use bson::{Bson, Document, doc};
use serde::{Serialize, Serializer};

/// Payload of a `$slice` projection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slice {
    /// A single count (negative counts take from the end).
    Count(i64),
    /// `[skip, limit]`.
    Range(i64, i64),
}

impl From<Slice> for Bson {
    fn from(slice: Slice) -> Self {
        match slice {
            Slice::Count(n) => Bson::Int64(n),
            Slice::Range(skip, limit) => Bson::Array(vec![Bson::Int64(skip), Bson::Int64(limit)]),
        }
    }
}

/// How a single field is projected.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldProjection {
    Include,
    Exclude,
    Slice(Slice),
    ElemMatch(Bson),
    Meta(String),
}

impl From<FieldProjection> for Bson {
    fn from(projection: FieldProjection) -> Self {
        match projection {
            FieldProjection::Include => Bson::Int32(1),
            FieldProjection::Exclude => Bson::Int32(0),
            FieldProjection::Slice(slice) => Bson::Document(doc! { "$slice": slice }),
            FieldProjection::ElemMatch(criteria) => {
                Bson::Document(doc! { "$elemMatch": criteria })
            }
            FieldProjection::Meta(meta) => Bson::Document(doc! { "$meta": meta }),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Projection {
    fields: BTreeMap<String, FieldProjection>,
}

impl Projection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, field: impl Into<String>, projection: FieldProjection) {
        self.fields.insert(field.into(), projection);
    }

    pub fn get(&self, field: &str) -> Option<&FieldProjection> {
        self.fields.get(field)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn to_document(&self) -> Document {
        self.fields
            .iter()
            .map(|(field, projection)| (field.clone(), Bson::from(projection.clone())))
            .collect()
    }
}

impl Serialize for Projection {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_document().serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_last_write_wins() {
        let mut projection = Projection::new();
        projection.set("a", FieldProjection::Include);
        projection.set("a", FieldProjection::Exclude);
        assert_eq!(projection.get("a"), Some(&FieldProjection::Exclude));
        assert_eq!(projection.len(), 1);
    }

    #[test]
    fn test_document_shapes() {
        let mut projection = Projection::new();
        projection.set("name", FieldProjection::Include);
        projection.set("tags", FieldProjection::Slice(Slice::Range(5, 10)));
        projection.set("last", FieldProjection::Slice(Slice::Count(-1)));
        projection.set("score", FieldProjection::Meta("textScore".to_string()));
        assert_eq!(
            projection.to_document(),
            doc! {
                "last": { "$slice": -1_i64 },
                "name": 1,
                "score": { "$meta": "textScore" },
                "tags": { "$slice": [5_i64, 10_i64] },
            }
        );
    }
}
