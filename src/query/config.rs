//! Accumulated configuration of one in-progress command

use std::fmt;

use bson::{Bson, Document, doc};
use serde::{Serialize, Serializer};

use super::projection::Projection;
use super::sort::SortSpec;
use crate::expr::NearPoint;

/// The kind of command being built. Exactly one is active; the last
/// type-selecting call wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum OperationType {
    #[default]
    Find,
    Count,
    FindAndUpdate,
    FindAndRemove,
    Update,
    Insert,
    Remove,
    Group,
    #[serde(rename = "distinct")]
    DistinctField,
    GeoNear,
    MapReduce,
}

impl OperationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationType::Find => "find",
            OperationType::Count => "count",
            OperationType::FindAndUpdate => "findAndUpdate",
            OperationType::FindAndRemove => "findAndRemove",
            OperationType::Update => "update",
            OperationType::Insert => "insert",
            OperationType::Remove => "remove",
            OperationType::Group => "group",
            OperationType::DistinctField => "distinct",
            OperationType::GeoNear => "geoNear",
            OperationType::MapReduce => "mapReduce",
        }
    }

    /// Which sub-document `reduce()`/`finalize()` write into.
    pub fn reduce_context(&self) -> ReduceContext {
        match self {
            OperationType::Group => ReduceContext::Group,
            OperationType::MapReduce => ReduceContext::MapReduce,
            _ => ReduceContext::None,
        }
    }
}

impl fmt::Display for OperationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Write target shared by `reduce()` and `finalize()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReduceContext {
    Group,
    MapReduce,
    None,
}

/// Parameters of a `group` command.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroupSpec {
    /// Key document, or a key function.
    pub keys: Bson,
    pub initial: Document,
    pub reduce: Option<String>,
    pub options: Document,
}

impl GroupSpec {
    pub fn to_document(&self) -> Document {
        let mut doc = doc! {
            "keys": self.keys.clone(),
            "initial": self.initial.clone(),
        };
        if let Some(reduce) = &self.reduce {
            doc.insert("reduce", Bson::JavaScriptCode(reduce.clone()));
        }
        doc.insert("options", self.options.clone());
        doc
    }
}

/// Parameters of a `mapReduce` command.
#[derive(Debug, Clone, PartialEq)]
pub struct MapReduceSpec {
    pub map: String,
    pub reduce: Option<String>,
    /// Output target: `{inline: true}`, a collection name, or an output document.
    pub out: Bson,
    pub options: Document,
}

impl MapReduceSpec {
    pub fn default_out() -> Bson {
        Bson::Document(doc! { "inline": true })
    }

    pub fn new(map: impl Into<String>) -> Self {
        Self {
            map: map.into(),
            reduce: None,
            out: Self::default_out(),
            options: Document::new(),
        }
    }

    pub fn to_document(&self) -> Document {
        let mut doc = doc! { "map": Bson::JavaScriptCode(self.map.clone()) };
        if let Some(reduce) = &self.reduce {
            doc.insert("reduce", Bson::JavaScriptCode(reduce.clone()));
        }
        doc.insert("out", self.out.clone());
        doc.insert("options", self.options.clone());
        doc
    }
}

impl Default for MapReduceSpec {
    fn default() -> Self {
        Self::new(String::new())
    }
}

/// Parameters of a `geoNear` command.
#[derive(Debug, Clone, PartialEq)]
pub struct GeoNearSpec {
    pub near: NearPoint,
    pub distance_multiplier: Option<f64>,
    pub max_distance: Option<f64>,
    pub min_distance: Option<f64>,
    pub spherical: Option<bool>,
}

impl GeoNearSpec {
    /// A fresh spec; a GeoJSON point implies a spherical search.
    pub fn new(near: NearPoint) -> Self {
        Self {
            near,
            distance_multiplier: None,
            max_distance: None,
            min_distance: None,
            spherical: near.is_geometry().then_some(true),
        }
    }

    pub fn to_document(&self) -> Document {
        let mut doc = doc! { "near": self.near };
        if let Some(multiplier) = self.distance_multiplier {
            doc.insert("distanceMultiplier", multiplier);
        }
        if let Some(max) = self.max_distance {
            doc.insert("maxDistance", max);
        }
        if let Some(min) = self.min_distance {
            doc.insert("minDistance", min);
        }
        if let Some(spherical) = self.spherical {
            doc.insert("spherical", spherical);
        }
        doc
    }
}

macro_rules! serialize_via_document {
    ($($ty:ty),+) => {
        $(
            impl Serialize for $ty {
                fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                    self.to_document().serialize(serializer)
                }
            }
        )+
    };
}

serialize_via_document!(GroupSpec, MapReduceSpec, GeoNearSpec);

/// Builder-local state of one command.
///
/// Sub-specs for other operation types may linger after the type changes;
/// they are kept so that re-selecting the type resumes them, and they are
/// ignored when the command is assembled.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryConfiguration {
    #[serde(rename = "type")]
    pub operation: OperationType,

    #[serde(rename = "select")]
    pub projection: Projection,

    pub sort: SortSpec,

    pub limit: Option<i64>,

    pub skip: Option<i64>,

    /// Index hints in the order they were added.
    pub hints: Vec<Bson>,

    pub immortal: bool,

    pub snapshot: bool,

    /// Unset, or explicitly allowed/denied.
    pub slave_okay: Option<bool>,

    pub eager_cursor: bool,

    #[serde(rename = "distinct")]
    pub distinct_field: Option<String>,

    pub group: Option<GroupSpec>,

    pub map_reduce: Option<MapReduceSpec>,

    pub geo_near: Option<GeoNearSpec>,

    #[serde(rename = "new")]
    pub return_new: bool,

    pub upsert: bool,

    pub multiple: bool,
}
