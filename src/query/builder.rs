//! Fluent command builder
//!
//! [`Builder`] tracks which kind of command is being built, which
//! configuration methods are legal for it, and the shape options
//! (projection, sort, paging, hints). Field-level predicates and update
//! operators are forwarded to the owned [`Expr`] (see `delegate.rs`).

use bson::{Bson, Document};
use tracing::{debug, trace};

use super::command::{Command, Namespace};
use super::config::{
    GeoNearSpec, GroupSpec, MapReduceSpec, OperationType, QueryConfiguration, ReduceContext,
};
use super::projection::{FieldProjection, Slice};
use super::sort::SortOrder;
use crate::error::{BuilderError, Result};
use crate::expr::{Expr, NearPoint};

/// Builds one [`Command`] through chained method calls.
///
/// Cloning a builder deep-copies its accumulator, so criteria and update
/// state of the clone evolve independently.
///
/// # Example
///
/// ```
/// use bson::doc;
/// use docquery::query::{Builder, OperationType};
///
/// let mut qb = Builder::new("shop", "orders");
/// qb.find()
///     .field("status").equals("open")
///     .field("total").gte(100)
///     .sort("created", "desc")
///     .limit(20);
///
/// let command = qb.assemble();
/// assert_eq!(command.operation_type(), OperationType::Find);
/// assert_eq!(command.query(), &doc! { "status": "open", "total": { "$gte": 100 } });
/// ```
#[derive(Debug, Clone)]
pub struct Builder {
    namespace: Namespace,
    pub(super) config: QueryConfiguration,
    pub(super) expr: Expr,
}

impl Builder {
    /// Create a builder for `database.collection`, starting as a find.
    pub fn new(database: impl Into<String>, collection: impl Into<String>) -> Self {
        Self::from_namespace(Namespace::new(database, collection))
    }

    pub fn from_namespace(namespace: Namespace) -> Self {
        Self {
            namespace,
            config: QueryConfiguration::default(),
            expr: Expr::new(),
        }
    }

    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    pub fn configuration(&self) -> &QueryConfiguration {
        &self.config
    }

    pub fn get_type(&self) -> OperationType {
        self.config.operation
    }

    /// A fresh, empty accumulator for composing `add_or`, `elem_match`,
    /// `push` and similar arguments.
    pub fn expr(&self) -> Expr {
        Expr::new()
    }

    fn set_type(&mut self, operation: OperationType) -> &mut Self {
        if self.config.operation != operation {
            trace!(from = %self.config.operation, to = %operation, "switching operation type");
        }
        self.config.operation = operation;
        self
    }

    /* ========================= Type selection ========================= */

    pub fn find(&mut self) -> &mut Self {
        self.set_type(OperationType::Find)
    }

    pub fn count(&mut self) -> &mut Self {
        self.set_type(OperationType::Count)
    }

    pub fn find_and_update(&mut self) -> &mut Self {
        self.set_type(OperationType::FindAndUpdate)
    }

    pub fn find_and_remove(&mut self) -> &mut Self {
        self.set_type(OperationType::FindAndRemove)
    }

    pub fn update(&mut self) -> &mut Self {
        self.set_type(OperationType::Update)
    }

    /// Update at most one document.
    pub fn update_one(&mut self) -> &mut Self {
        self.update().multiple(false)
    }

    /// Update every matching document.
    pub fn update_many(&mut self) -> &mut Self {
        self.update().multiple(true)
    }

    pub fn insert(&mut self) -> &mut Self {
        self.set_type(OperationType::Insert)
    }

    pub fn remove(&mut self) -> &mut Self {
        self.set_type(OperationType::Remove)
    }

    /// Select a group command, replacing any earlier group spec.
    pub fn group(
        &mut self,
        keys: impl Into<Bson>,
        initial: Document,
        reduce: Option<&str>,
        options: Option<Document>,
    ) -> &mut Self {
        self.config.group = Some(GroupSpec {
            keys: keys.into(),
            initial,
            reduce: reduce.map(str::to_string),
            options: options.unwrap_or_default(),
        });
        self.set_type(OperationType::Group)
    }

    pub fn distinct(&mut self, field: impl Into<String>) -> &mut Self {
        self.config.distinct_field = Some(field.into());
        self.set_type(OperationType::DistinctField)
    }

    /// Select a geoNear command around `near`, discarding earlier geoNear
    /// options.
    pub fn geo_near(&mut self, near: impl Into<NearPoint>) -> &mut Self {
        self.config.geo_near = Some(GeoNearSpec::new(near.into()));
        self.set_type(OperationType::GeoNear)
    }

    /// Select a mapReduce command, replacing any earlier map-reduce spec.
    /// `out` defaults to inline output.
    pub fn map_reduce(
        &mut self,
        map: impl Into<String>,
        reduce: impl Into<String>,
        out: Option<Bson>,
        options: Option<Document>,
    ) -> &mut Self {
        self.config.map_reduce = Some(MapReduceSpec {
            map: map.into(),
            reduce: Some(reduce.into()),
            out: out.unwrap_or_else(MapReduceSpec::default_out),
            options: options.unwrap_or_default(),
        });
        self.set_type(OperationType::MapReduce)
    }

    /// Select a mapReduce command, setting only the map function.
    pub fn map(&mut self, map: impl Into<String>) -> &mut Self {
        let map = map.into();
        match &mut self.config.map_reduce {
            Some(spec) => spec.map = map,
            None => self.config.map_reduce = Some(MapReduceSpec::new(map)),
        }
        self.set_type(OperationType::MapReduce)
    }

    fn map_reduce_spec_mut(&mut self) -> &mut MapReduceSpec {
        self.config.map_reduce.get_or_insert_with(MapReduceSpec::default)
    }

    /// Set the map-reduce output target.
    pub fn out(&mut self, out: impl Into<Bson>) -> &mut Self {
        self.map_reduce_spec_mut().out = out.into();
        self
    }

    /// Replace the map-reduce options document.
    pub fn map_reduce_options(&mut self, options: Document) -> &mut Self {
        self.map_reduce_spec_mut().options = options;
        self
    }

    /* ========================= Guarded methods ========================= */

    fn geo_near_spec_mut(&mut self, method: &'static str) -> Result<&mut GeoNearSpec> {
        match (self.config.operation, self.config.geo_near.as_mut()) {
            (OperationType::GeoNear, Some(spec)) => Ok(spec),
            _ => Err(BuilderError::RequiresGeoNear { method }.into()),
        }
    }

    pub fn distance_multiplier(&mut self, multiplier: f64) -> Result<&mut Self> {
        self.geo_near_spec_mut("distanceMultiplier")?.distance_multiplier = Some(multiplier);
        Ok(self)
    }

    pub fn spherical(&mut self, spherical: bool) -> Result<&mut Self> {
        self.geo_near_spec_mut("spherical")?.spherical = Some(spherical);
        Ok(self)
    }

    /// For a geoNear command this sets its `maxDistance` option; otherwise
    /// it adds `$maxDistance` to the current field's criteria.
    pub fn max_distance(&mut self, distance: f64) -> &mut Self {
        match self.geo_near_spec_mut("maxDistance") {
            Ok(spec) => spec.max_distance = Some(distance),
            Err(_) => {
                self.expr.max_distance(distance);
            }
        }
        self
    }

    /// Same dual behaviour as [`Builder::max_distance`].
    pub fn min_distance(&mut self, distance: f64) -> &mut Self {
        match self.geo_near_spec_mut("minDistance") {
            Ok(spec) => spec.min_distance = Some(distance),
            Err(_) => {
                self.expr.min_distance(distance);
            }
        }
        self
    }

    /// Set the reduce function of the group or map-reduce spec.
    pub fn reduce(&mut self, reduce: impl Into<String>) -> Result<&mut Self> {
        let reduce = Some(reduce.into());
        match self.config.operation.reduce_context() {
            ReduceContext::MapReduce => self.map_reduce_spec_mut().reduce = reduce,
            ReduceContext::Group => {
                self.config.group.get_or_insert_with(GroupSpec::default).reduce = reduce
            }
            ReduceContext::None => {
                return Err(BuilderError::RequiresAggregation { method: "reduce" }.into());
            }
        }
        Ok(self)
    }

    /// Set the finalize function in the group or map-reduce options.
    pub fn finalize(&mut self, finalize: impl Into<String>) -> Result<&mut Self> {
        let finalize = Bson::JavaScriptCode(finalize.into());
        let options = match self.config.operation.reduce_context() {
            ReduceContext::MapReduce => &mut self.map_reduce_spec_mut().options,
            ReduceContext::Group => {
                &mut self.config.group.get_or_insert_with(GroupSpec::default).options
            }
            ReduceContext::None => {
                return Err(BuilderError::RequiresAggregation { method: "finalize" }.into());
            }
        };
        options.insert("finalize", finalize);
        Ok(self)
    }

    /* ========================= Shape ========================= */

    /// Include the given fields in the projection.
    pub fn select<I, S>(&mut self, fields: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for field in fields {
            self.config.projection.set(field, FieldProjection::Include);
        }
        self
    }

    /// Exclude the given fields from the projection.
    pub fn exclude<I, S>(&mut self, fields: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for field in fields {
            self.config.projection.set(field, FieldProjection::Exclude);
        }
        self
    }

    /// `$slice` projection: a single count, or `[skip, limit]` when `limit`
    /// is given.
    pub fn select_slice(
        &mut self,
        field: impl Into<String>,
        count_or_skip: i64,
        limit: Option<i64>,
    ) -> &mut Self {
        let slice = match limit {
            Some(limit) => Slice::Range(count_or_skip, limit),
            None => Slice::Count(count_or_skip),
        };
        self.config.projection.set(field, FieldProjection::Slice(slice));
        self
    }

    /// `$elemMatch` projection; an `Expr` contributes its criteria document.
    pub fn select_elem_match(
        &mut self,
        field: impl Into<String>,
        criteria: impl Into<Bson>,
    ) -> &mut Self {
        self.config
            .projection
            .set(field, FieldProjection::ElemMatch(criteria.into()));
        self
    }

    /// `$meta` projection, e.g. `select_meta("score", "textScore")`.
    pub fn select_meta(&mut self, field: impl Into<String>, meta: impl Into<String>) -> &mut Self {
        self.config
            .projection
            .set(field, FieldProjection::Meta(meta.into()));
        self
    }

    /// Add or update one sort entry. Strings follow the `"asc"`/other rule,
    /// numbers and booleans are truncated to integers.
    pub fn sort(&mut self, field: impl Into<String>, order: impl Into<SortOrder>) -> &mut Self {
        self.config.sort.set(field, order.into());
        self
    }

    /// Apply [`Builder::sort`] to each entry in order.
    pub fn sort_all<I, K, O>(&mut self, entries: I) -> &mut Self
    where
        I: IntoIterator<Item = (K, O)>,
        K: Into<String>,
        O: Into<SortOrder>,
    {
        for (field, order) in entries {
            self.sort(field, order);
        }
        self
    }

    pub fn sort_meta(&mut self, field: impl Into<String>, meta: impl Into<String>) -> &mut Self {
        self.config.sort.set(field, SortOrder::Meta(meta.into()));
        self
    }

    pub fn limit(&mut self, limit: i64) -> &mut Self {
        self.config.limit = Some(limit);
        self
    }

    pub fn skip(&mut self, skip: i64) -> &mut Self {
        self.config.skip = Some(skip);
        self
    }

    /// Append an index hint (index name or key document).
    pub fn hint(&mut self, index: impl Into<Bson>) -> &mut Self {
        self.config.hints.push(index.into());
        self
    }

    pub fn slave_okay(&mut self, slave_okay: bool) -> &mut Self {
        self.config.slave_okay = Some(slave_okay);
        self
    }

    pub fn eager_cursor(&mut self, eager: bool) -> &mut Self {
        self.config.eager_cursor = eager;
        self
    }

    pub fn snapshot(&mut self, snapshot: bool) -> &mut Self {
        self.config.snapshot = snapshot;
        self
    }

    pub fn immortal(&mut self, immortal: bool) -> &mut Self {
        self.config.immortal = immortal;
        self
    }

    /// Return the modified document from findAndUpdate.
    pub fn return_new(&mut self, return_new: bool) -> &mut Self {
        self.config.return_new = return_new;
        self
    }

    pub fn upsert(&mut self, upsert: bool) -> &mut Self {
        self.config.upsert = upsert;
        self
    }

    pub fn multiple(&mut self, multiple: bool) -> &mut Self {
        self.config.multiple = multiple;
        self
    }

    /* ========================= Assembly ========================= */

    /// Freeze the current state into a [`Command`].
    ///
    /// The builder is left untouched and may keep being used.
    pub fn assemble(&self) -> Command {
        let command = Command::new(
            self.namespace.clone(),
            &self.config,
            self.expr.get_query().clone(),
            self.expr.get_new_obj().clone(),
        );
        debug!("Assembled {}", command);
        command
    }

    fn debug_document(&self) -> Result<Document> {
        let mut doc = bson::to_document(&self.config)?;
        doc.insert("query", self.expr.get_query().clone());
        doc.insert("newObj", self.expr.get_new_obj().clone());
        Ok(doc)
    }

    /// The whole configuration, including the criteria and mutation
    /// documents, with every falsy entry removed. Diagnostics only.
    pub fn debug(&self) -> Result<Document> {
        let doc = self.debug_document()?;
        Ok(doc.into_iter().filter(|(_, value)| !is_falsy(value)).collect())
    }

    /// A single configuration entry by its wire name (`"sort"`, `"geoNear"`,
    /// `"query"`, ...), unfiltered.
    pub fn debug_entry(&self, name: &str) -> Result<Option<Bson>> {
        Ok(self.debug_document()?.get(name).cloned())
    }
}

fn is_falsy(value: &Bson) -> bool {
    match value {
        Bson::Null | Bson::Undefined => true,
        Bson::Boolean(b) => !b,
        Bson::Int32(n) => *n == 0,
        Bson::Int64(n) => *n == 0,
        Bson::Double(n) => *n == 0.0,
        Bson::String(s) => s.is_empty() || s == "0",
        Bson::Array(items) => items.is_empty(),
        Bson::Document(doc) => doc.is_empty(),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;

    #[test]
    fn test_new_builder_is_find() {
        let qb = Builder::new("db", "users");
        assert_eq!(qb.get_type(), OperationType::Find);
        assert_eq!(qb.namespace().to_string(), "db.users");
    }

    #[test]
    fn test_group_replaces_spec() {
        let mut qb = Builder::new("db", "sales");
        qb.group(doc! { "a": 1 }, doc! { "n": 0 }, Some("r1"), None)
            .finalize("f1")
            .unwrap();
        qb.group(doc! { "b": 1 }, doc! {}, None, None);

        let spec = qb.configuration().group.as_ref().unwrap();
        assert_eq!(spec.keys, Bson::Document(doc! { "b": 1 }));
        assert!(spec.reduce.is_none());
        assert!(spec.options.is_empty());
    }

    #[test]
    fn test_map_keeps_existing_spec() {
        let mut qb = Builder::new("db", "events");
        qb.map_reduce("m1", "r1", Some(Bson::String("totals".into())), None);
        qb.map("m2");

        let spec = qb.configuration().map_reduce.as_ref().unwrap();
        assert_eq!(spec.map, "m2");
        assert_eq!(spec.reduce.as_deref(), Some("r1"));
        assert_eq!(spec.out, Bson::String("totals".into()));
    }

    #[test]
    fn test_out_and_options_mutate_in_place() {
        let mut qb = Builder::new("db", "events");
        qb.map("m")
            .out(doc! { "replace": "results" })
            .map_reduce_options(doc! { "jsMode": true });
        qb.finalize("f").unwrap();

        let spec = qb.configuration().map_reduce.as_ref().unwrap();
        assert_eq!(spec.out, Bson::Document(doc! { "replace": "results" }));
        assert_eq!(
            spec.options,
            doc! { "jsMode": true, "finalize": Bson::JavaScriptCode("f".into()) }
        );
    }

    #[test]
    fn test_geo_near_resets_options() {
        let mut qb = Builder::new("db", "places");
        qb.geo_near((1.0, 2.0)).max_distance(10.0);
        qb.spherical(true).unwrap();
        qb.geo_near((3.0, 4.0));

        let spec = qb.configuration().geo_near.as_ref().unwrap();
        assert_eq!(spec.near, NearPoint::Coordinates(3.0, 4.0));
        assert!(spec.max_distance.is_none());
        assert!(spec.spherical.is_none());
    }

    #[test]
    fn test_max_distance_outside_geo_near_goes_to_criteria() {
        let mut qb = Builder::new("db", "places");
        qb.field("loc").near((1.0, 1.0)).max_distance(3.0);
        assert_eq!(
            qb.get_query_array(),
            &doc! { "loc": { "$near": [1.0, 1.0], "$maxDistance": 3.0 } }
        );
        assert!(qb.configuration().geo_near.is_none());
    }

    #[test]
    fn test_min_distance_in_geo_near() {
        let mut qb = Builder::new("db", "places");
        qb.geo_near((0.0, 0.0)).min_distance(2.5);
        assert_eq!(
            qb.configuration().geo_near.as_ref().unwrap().min_distance,
            Some(2.5)
        );
        assert!(qb.get_query_array().is_empty());
    }

    #[test]
    fn test_guard_leaves_state_untouched() {
        let mut qb = Builder::new("db", "places");
        qb.count().limit(3);
        let before = qb.configuration().clone();

        assert!(qb.spherical(true).is_err());
        assert!(qb.finalize("f").is_err());
        assert_eq!(qb.configuration(), &before);
    }

    #[test]
    fn test_select_and_exclude_last_write_wins() {
        let mut qb = Builder::new("db", "users");
        qb.select(["name", "email"]).exclude(vec!["email".to_string()]);

        let projection = qb.configuration().projection.to_document();
        assert_eq!(projection, doc! { "name": 1, "email": 0 });
    }

    #[test]
    fn test_select_elem_match_with_expr() {
        let mut qb = Builder::new("db", "users");
        let mut criteria = qb.expr();
        criteria.field("kind").equals("home");
        qb.select_elem_match("addresses", criteria);

        assert_eq!(
            qb.configuration().projection.to_document(),
            doc! { "addresses": { "$elemMatch": { "kind": "home" } } }
        );
    }

    #[test]
    fn test_update_one_and_many() {
        let mut qb = Builder::new("db", "users");
        qb.update_many();
        assert!(qb.configuration().multiple);
        qb.update_one();
        assert!(!qb.configuration().multiple);
        assert_eq!(qb.get_type(), OperationType::Update);
    }

    #[test]
    fn test_hints_append() {
        let mut qb = Builder::new("db", "users");
        qb.hint("name_1").hint(doc! { "age": -1 });
        assert_eq!(
            qb.configuration().hints,
            vec![
                Bson::String("name_1".into()),
                Bson::Document(doc! { "age": -1 })
            ]
        );
    }

    #[test]
    fn test_debug_strips_falsy_entries() {
        let mut qb = Builder::new("db", "users");
        qb.limit(0).skip(5).slave_okay(false).field("a").equals(1);

        let debug = qb.debug().unwrap();
        assert_eq!(debug.get_str("type").unwrap(), "find");
        assert!(debug.contains_key("skip"));
        assert!(debug.contains_key("query"));
        assert!(!debug.contains_key("limit"));
        assert!(!debug.contains_key("slaveOkay"));
        assert!(!debug.contains_key("newObj"));
        assert!(!debug.contains_key("select"));
    }

    #[test]
    fn test_debug_entry_is_unfiltered() {
        let mut qb = Builder::new("db", "users");
        qb.limit(0).sort("a", "asc");

        assert_eq!(qb.debug_entry("limit").unwrap(), Some(Bson::Int64(0)));
        assert_eq!(
            qb.debug_entry("sort").unwrap(),
            Some(Bson::Document(doc! { "a": 1 }))
        );
        assert_eq!(qb.debug_entry("missing").unwrap(), None);
    }
}
