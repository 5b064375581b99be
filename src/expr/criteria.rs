//! Criteria operators
//!
//! Every operator merges one `$op: value` entry into the criteria document
//! under the current field (or at the top level when no field is selected).

use bson::{Bson, Document, doc};
use tracing::warn;

use super::geometry::{Geometry, NearPoint, Position, pair_to_bson, positions_to_bson};
use super::{Expr, append_to, merge_into};
use crate::query::SortOrder;

/// Symbolic names accepted by `$type`, mapped to their numeric codes.
const BSON_TYPE_CODES: &[(&str, i32)] = &[
    ("double", 1),
    ("string", 2),
    ("object", 3),
    ("array", 4),
    ("binary", 5),
    ("undefined", 6),
    ("objectid", 7),
    ("boolean", 8),
    ("date", 9),
    ("null", 10),
    ("regex", 11),
    ("jscode", 13),
    ("symbol", 14),
    ("jscodewithscope", 15),
    ("integer32", 16),
    ("timestamp", 17),
    ("integer64", 18),
    ("maxkey", 127),
    ("minkey", 255),
];

fn is_operator_key(key: &str) -> bool {
    key.starts_with('$')
}

/// True when the value already holds operators (or nothing), as opposed to
/// a plain equality value.
fn holds_operators(value: &Bson) -> bool {
    match value {
        Bson::Document(doc) => doc.keys().next().is_none_or(|k| is_operator_key(k)),
        _ => false,
    }
}

impl Expr {
    /// Match the current field against `value` exactly.
    ///
    /// Without a current field, a document value replaces the whole criteria
    /// document.
    pub fn equals(&mut self, value: impl Into<Bson>) -> &mut Self {
        let value = value.into();
        match &self.current_field {
            Some(field) => {
                self.query.insert(field.clone(), value);
            }
            None => match value {
                Bson::Document(doc) => self.query = doc,
                other => warn!("equals({other}) without a current field is ignored"),
            },
        }
        self
    }

    /// Merge `op: value` into the criteria for the current field.
    pub fn operator(&mut self, op: &str, value: impl Into<Bson>) -> &mut Self {
        let value = value.into();
        self.wrap_equality_criteria();
        match &self.current_field {
            Some(field) => merge_into(&mut self.query, field, op, value),
            None => {
                self.query.insert(op, value);
            }
        }
        self
    }

    /// A plain equality value cannot carry operators next to it, so it is
    /// rewritten as `{$in: [value]}` before the first operator is added.
    fn wrap_equality_criteria(&mut self) {
        match &self.current_field {
            Some(field) => {
                let Some(existing) = self.query.get(field) else {
                    return;
                };
                if holds_operators(existing) {
                    return;
                }
                let wrapped = doc! { "$in": [existing.clone()] };
                self.query.insert(field.clone(), wrapped);
            }
            None => {
                if self.query.keys().next().is_none_or(|k| is_operator_key(k)) {
                    return;
                }
                let existing = std::mem::take(&mut self.query);
                self.query = doc! { "$in": [existing] };
            }
        }
    }

    pub fn not_equal(&mut self, value: impl Into<Bson>) -> &mut Self {
        self.operator("$ne", value)
    }

    pub fn in_values(&mut self, values: impl Into<Bson>) -> &mut Self {
        self.operator("$in", values)
    }

    pub fn not_in(&mut self, values: impl Into<Bson>) -> &mut Self {
        self.operator("$nin", values)
    }

    pub fn gt(&mut self, value: impl Into<Bson>) -> &mut Self {
        self.operator("$gt", value)
    }

    pub fn gte(&mut self, value: impl Into<Bson>) -> &mut Self {
        self.operator("$gte", value)
    }

    pub fn lt(&mut self, value: impl Into<Bson>) -> &mut Self {
        self.operator("$lt", value)
    }

    pub fn lte(&mut self, value: impl Into<Bson>) -> &mut Self {
        self.operator("$lte", value)
    }

    /// Half-open range: `start <= field < end`.
    pub fn range(&mut self, start: impl Into<Bson>, end: impl Into<Bson>) -> &mut Self {
        self.operator("$gte", start).operator("$lt", end)
    }

    pub fn size(&mut self, size: i64) -> &mut Self {
        self.operator("$size", size)
    }

    pub fn exists(&mut self, exists: bool) -> &mut Self {
        self.operator("$exists", exists)
    }

    /// `$type` match. Symbolic names like `"string"` become numeric codes;
    /// anything else is passed through.
    pub fn bson_type(&mut self, type_spec: impl Into<Bson>) -> &mut Self {
        let type_spec = match type_spec.into() {
            Bson::String(name) => BSON_TYPE_CODES
                .iter()
                .find(|(alias, _)| *alias == name)
                .map(|(_, code)| Bson::Int32(*code))
                .unwrap_or(Bson::String(name)),
            other => other,
        };
        self.operator("$type", type_spec)
    }

    pub fn all(&mut self, values: impl Into<Bson>) -> &mut Self {
        self.operator("$all", values)
    }

    pub fn modulo(&mut self, divisor: impl Into<Bson>, remainder: impl Into<Bson>) -> &mut Self {
        self.operator("$mod", vec![divisor.into(), remainder.into()])
    }

    /// Top-level `$where` clause; ignores the current field.
    pub fn where_js(&mut self, code: impl Into<String>) -> &mut Self {
        self.query.insert("$where", Bson::JavaScriptCode(code.into()));
        self
    }

    pub fn near(&mut self, point: impl Into<NearPoint>) -> &mut Self {
        self.near_operator("$near", point.into())
    }

    pub fn near_sphere(&mut self, point: impl Into<NearPoint>) -> &mut Self {
        self.near_operator("$nearSphere", point.into())
    }

    fn near_operator(&mut self, op: &str, point: NearPoint) -> &mut Self {
        match point {
            NearPoint::Coordinates(..) => self.operator(op, point),
            NearPoint::Geometry(p) => self.operator(op, doc! { "$geometry": p }),
        }
    }

    /// `$maxDistance` for a preceding `near`/`nearSphere`. With a GeoJSON
    /// point it is nested inside that operator.
    pub fn max_distance(&mut self, distance: f64) -> &mut Self {
        self.distance_bound("$maxDistance", distance)
    }

    pub fn min_distance(&mut self, distance: f64) -> &mut Self {
        self.distance_bound("$minDistance", distance)
    }

    fn distance_bound(&mut self, op: &str, distance: f64) -> &mut Self {
        let criteria = match &self.current_field {
            Some(field) => match self.query.get_mut(field) {
                Some(Bson::Document(doc)) => Some(doc),
                _ => None,
            },
            None => Some(&mut self.query),
        };

        if let Some(criteria) = criteria {
            for near_op in ["$near", "$nearSphere"] {
                if let Some(Bson::Document(near)) = criteria.get_mut(near_op) {
                    if near.contains_key("$geometry") {
                        near.insert(op, distance);
                        return self;
                    }
                }
            }
        }
        self.operator(op, distance)
    }

    pub fn within_box(&mut self, x1: f64, y1: f64, x2: f64, y2: f64) -> &mut Self {
        self.operator("$within", box_shape(x1, y1, x2, y2))
    }

    pub fn within_center(&mut self, x: f64, y: f64, radius: f64) -> &mut Self {
        self.operator("$within", circle_shape("$center", x, y, radius))
    }

    pub fn within_center_sphere(&mut self, x: f64, y: f64, radius: f64) -> &mut Self {
        self.operator("$within", circle_shape("$centerSphere", x, y, radius))
    }

    pub fn within_polygon(&mut self, points: &[Position]) -> &mut Self {
        self.operator("$within", doc! { "$polygon": positions_to_bson(points) })
    }

    pub fn geo_within_box(&mut self, x1: f64, y1: f64, x2: f64, y2: f64) -> &mut Self {
        self.operator("$geoWithin", box_shape(x1, y1, x2, y2))
    }

    pub fn geo_within_center(&mut self, x: f64, y: f64, radius: f64) -> &mut Self {
        self.operator("$geoWithin", circle_shape("$center", x, y, radius))
    }

    pub fn geo_within_center_sphere(&mut self, x: f64, y: f64, radius: f64) -> &mut Self {
        self.operator("$geoWithin", circle_shape("$centerSphere", x, y, radius))
    }

    pub fn geo_within_polygon(&mut self, points: &[Position]) -> &mut Self {
        self.operator("$geoWithin", doc! { "$polygon": positions_to_bson(points) })
    }

    pub fn geo_within(&mut self, geometry: impl Into<Geometry>) -> &mut Self {
        let geometry: Geometry = geometry.into();
        self.operator("$geoWithin", doc! { "$geometry": geometry })
    }

    pub fn geo_intersects(&mut self, geometry: impl Into<Geometry>) -> &mut Self {
        let geometry: Geometry = geometry.into();
        self.operator("$geoIntersects", doc! { "$geometry": geometry })
    }

    pub fn elem_match(&mut self, criteria: impl Into<Bson>) -> &mut Self {
        self.operator("$elemMatch", criteria)
    }

    #[allow(clippy::should_implement_trait)]
    pub fn not(&mut self, criteria: impl Into<Bson>) -> &mut Self {
        self.operator("$not", criteria)
    }

    pub fn add_or(&mut self, criteria: impl Into<Bson>) -> &mut Self {
        append_to(&mut self.query, "$or", criteria.into());
        self
    }

    pub fn add_and(&mut self, criteria: impl Into<Bson>) -> &mut Self {
        append_to(&mut self.query, "$and", criteria.into());
        self
    }

    pub fn add_nor(&mut self, criteria: impl Into<Bson>) -> &mut Self {
        append_to(&mut self.query, "$nor", criteria.into());
        self
    }

    /// Top-level `$text` search.
    pub fn text(&mut self, search: impl Into<String>) -> &mut Self {
        merge_into(&mut self.query, "$text", "$search", Bson::String(search.into()));
        self
    }

    pub fn language(&mut self, language: impl Into<String>) -> &mut Self {
        merge_into(&mut self.query, "$text", "$language", Bson::String(language.into()));
        self
    }

    pub fn comment(&mut self, comment: impl Into<String>) -> &mut Self {
        self.query.insert("$comment", comment.into());
        self
    }

    /// `$each` modifier for `push`/`add_to_set`.
    pub fn each(&mut self, values: impl Into<Bson>) -> &mut Self {
        self.operator("$each", values)
    }

    /// `$slice` modifier for `push`.
    pub fn slice(&mut self, slice: i64) -> &mut Self {
        self.operator("$slice", slice)
    }

    /// `$position` modifier for `push`.
    pub fn position(&mut self, position: i64) -> &mut Self {
        self.operator("$position", position)
    }

    /// `$sort` modifier for `push`.
    pub fn sort(&mut self, field: impl Into<String>, order: impl Into<SortOrder>) -> &mut Self {
        let mut spec = Document::new();
        spec.insert(field.into(), Bson::from(order.into()));
        self.operator("$sort", spec)
    }
}

fn box_shape(x1: f64, y1: f64, x2: f64, y2: f64) -> Document {
    doc! { "$box": [pair_to_bson((x1, y1)), pair_to_bson((x2, y2))] }
}

fn circle_shape(shape: &str, x: f64, y: f64, radius: f64) -> Document {
    let mut doc = Document::new();
    doc.insert(shape, vec![pair_to_bson((x, y)), Bson::Double(radius)]);
    doc
}
