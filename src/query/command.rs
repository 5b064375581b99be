//! Terminal command artifact
//!
//! A [`Command`] is produced once by [`Builder::assemble`](super::Builder::assemble)
//! and never changes afterwards. Only the sub-spec that belongs to the
//! selected operation type is carried over.

use std::fmt;

use bson::{Bson, Document};

use super::config::{GeoNearSpec, GroupSpec, MapReduceSpec, OperationType, QueryConfiguration};
use super::projection::Projection;
use super::sort::SortSpec;

/// Database and collection a command is bound to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Namespace {
    pub database: String,
    pub collection: String,
}

impl Namespace {
    pub fn new(database: impl Into<String>, collection: impl Into<String>) -> Self {
        Self {
            database: database.into(),
            collection: collection.into(),
        }
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.database, self.collection)
    }
}

/// The operation with exactly the parameters it needs.
#[derive(Debug, Clone, PartialEq)]
pub enum CommandKind {
    Find,
    Count,
    FindAndUpdate,
    FindAndRemove,
    Update,
    Insert,
    Remove,
    Group(GroupSpec),
    Distinct(String),
    GeoNear(GeoNearSpec),
    MapReduce(MapReduceSpec),
}

impl CommandKind {
    /// Pick the variant for the configuration's active type.
    pub(crate) fn from_configuration(config: &QueryConfiguration) -> Self {
        match config.operation {
            OperationType::Find => CommandKind::Find,
            OperationType::Count => CommandKind::Count,
            OperationType::FindAndUpdate => CommandKind::FindAndUpdate,
            OperationType::FindAndRemove => CommandKind::FindAndRemove,
            OperationType::Update => CommandKind::Update,
            OperationType::Insert => CommandKind::Insert,
            OperationType::Remove => CommandKind::Remove,
            OperationType::Group => CommandKind::Group(config.group.clone().unwrap_or_default()),
            OperationType::DistinctField => {
                CommandKind::Distinct(config.distinct_field.clone().unwrap_or_default())
            }
            OperationType::GeoNear => CommandKind::GeoNear(
                config
                    .geo_near
                    .clone()
                    .unwrap_or_else(|| GeoNearSpec::new((0.0, 0.0).into())),
            ),
            OperationType::MapReduce => {
                CommandKind::MapReduce(config.map_reduce.clone().unwrap_or_default())
            }
        }
    }

    pub fn operation_type(&self) -> OperationType {
        match self {
            CommandKind::Find => OperationType::Find,
            CommandKind::Count => OperationType::Count,
            CommandKind::FindAndUpdate => OperationType::FindAndUpdate,
            CommandKind::FindAndRemove => OperationType::FindAndRemove,
            CommandKind::Update => OperationType::Update,
            CommandKind::Insert => OperationType::Insert,
            CommandKind::Remove => OperationType::Remove,
            CommandKind::Group(_) => OperationType::Group,
            CommandKind::Distinct(_) => OperationType::DistinctField,
            CommandKind::GeoNear(_) => OperationType::GeoNear,
            CommandKind::MapReduce(_) => OperationType::MapReduce,
        }
    }
}

/// Cursor and write flags copied from the builder.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommandOptions {
    pub projection: Projection,
    pub sort: SortSpec,
    pub limit: Option<i64>,
    pub skip: Option<i64>,
    pub hints: Vec<Bson>,
    pub immortal: bool,
    pub snapshot: bool,
    pub slave_okay: Option<bool>,
    pub eager_cursor: bool,
    pub return_new: bool,
    pub upsert: bool,
    pub multiple: bool,
}

impl From<&QueryConfiguration> for CommandOptions {
    fn from(config: &QueryConfiguration) -> Self {
        Self {
            projection: config.projection.clone(),
            sort: config.sort.clone(),
            limit: config.limit,
            skip: config.skip,
            hints: config.hints.clone(),
            immortal: config.immortal,
            snapshot: config.snapshot,
            slave_okay: config.slave_okay,
            eager_cursor: config.eager_cursor,
            return_new: config.return_new,
            upsert: config.upsert,
            multiple: config.multiple,
        }
    }
}

/// Immutable description of one database command.
#[derive(Debug, Clone, PartialEq)]
pub struct Command {
    namespace: Namespace,
    kind: CommandKind,
    options: CommandOptions,
    query: Document,
    new_obj: Document,
}

impl Command {
    pub(crate) fn new(
        namespace: Namespace,
        config: &QueryConfiguration,
        query: Document,
        new_obj: Document,
    ) -> Self {
        Self {
            namespace,
            kind: CommandKind::from_configuration(config),
            options: CommandOptions::from(config),
            query,
            new_obj,
        }
    }

    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    pub fn kind(&self) -> &CommandKind {
        &self.kind
    }

    pub fn operation_type(&self) -> OperationType {
        self.kind.operation_type()
    }

    pub fn options(&self) -> &CommandOptions {
        &self.options
    }

    /// The criteria document.
    pub fn query(&self) -> &Document {
        &self.query
    }

    /// The mutation document.
    pub fn new_obj(&self) -> &Document {
        &self.new_obj
    }

    /// Wire-style view: shared entries plus the one kind-specific entry.
    pub fn to_document(&self) -> Document {
        let options = &self.options;
        let mut doc = Document::new();
        doc.insert("type", self.operation_type().as_str());
        doc.insert("database", self.namespace.database.clone());
        doc.insert("collection", self.namespace.collection.clone());
        doc.insert("query", self.query.clone());
        if !self.new_obj.is_empty() {
            doc.insert("newObj", self.new_obj.clone());
        }
        if !options.projection.is_empty() {
            doc.insert("select", options.projection.to_document());
        }
        if !options.sort.is_empty() {
            doc.insert("sort", options.sort.to_document());
        }
        if let Some(limit) = options.limit {
            doc.insert("limit", limit);
        }
        if let Some(skip) = options.skip {
            doc.insert("skip", skip);
        }
        if !options.hints.is_empty() {
            doc.insert("hints", options.hints.clone());
        }
        if let Some(slave_okay) = options.slave_okay {
            doc.insert("slaveOkay", slave_okay);
        }
        let flags = [
            ("immortal", options.immortal),
            ("snapshot", options.snapshot),
            ("eagerCursor", options.eager_cursor),
            ("new", options.return_new),
            ("upsert", options.upsert),
            ("multiple", options.multiple),
        ];
        for (name, value) in flags {
            if value {
                doc.insert(name, true);
            }
        }

        match &self.kind {
            CommandKind::Group(spec) => {
                doc.insert("group", spec.to_document());
            }
            CommandKind::Distinct(field) => {
                doc.insert("distinct", field.clone());
            }
            CommandKind::GeoNear(spec) => {
                doc.insert("geoNear", spec.to_document());
            }
            CommandKind::MapReduce(spec) => {
                doc.insert("mapReduce", spec.to_document());
            }
            _ => {}
        }
        doc
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} on {}", self.operation_type(), self.namespace)
    }
}
