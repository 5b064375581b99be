//! Chain method dispatch
//!
//! Each step of a chain script names one builder method in camelCase and
//! carries its arguments as BSON values, e.g. `["field", "age"]`,
//! `["gte", 18]`, `["sort", {"age": -1}]`.

use bson::Bson;
use tracing::trace;

use crate::error::{ParseError, Result};
use crate::query::{Builder, SortOrder};

use super::args::ArgParser;

/// One chained method call.
#[derive(Debug, Clone, PartialEq)]
pub struct ChainMethod {
    pub name: String,
    pub args: Vec<Bson>,
}

impl ChainMethod {
    pub fn new(name: impl Into<String>, args: Vec<Bson>) -> Self {
        Self {
            name: name.into(),
            args,
        }
    }
}

/// What a chain asks to be produced once every step has run.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Terminal {
    /// The assembled command (`getQuery`).
    #[default]
    Assemble,
    /// The full `debug()` view.
    Debug,
    /// One `debug(name)` entry.
    DebugEntry(String),
}

/// Applies chain methods to a [`Builder`].
pub struct ChainHandler;

impl ChainHandler {
    /// Apply every method in order. Stops at the first failing step and
    /// returns the last terminal requested (`getQuery` when none was).
    pub fn apply_chain_methods(builder: &mut Builder, methods: &[ChainMethod]) -> Result<Terminal> {
        let mut terminal = Terminal::default();
        for method in methods {
            trace!(method = %method.name, args = method.args.len(), "applying chain method");
            if let Some(requested) = Self::apply_single_chain_method(builder, method)? {
                terminal = requested;
            }
        }
        Ok(terminal)
    }

    fn apply_single_chain_method(
        qb: &mut Builder,
        method: &ChainMethod,
    ) -> Result<Option<Terminal>> {
        let args = ArgParser::new(&method.name, &method.args);

        match method.name.as_str() {
            // Operation type
            "find" => {
                qb.find();
            }
            "count" => {
                qb.count();
            }
            "findAndUpdate" => {
                qb.find_and_update();
            }
            "findAndRemove" => {
                qb.find_and_remove();
            }
            "update" => {
                qb.update();
            }
            "updateOne" => {
                qb.update_one();
            }
            "updateMany" => {
                qb.update_many();
            }
            "insert" => {
                qb.insert();
            }
            "remove" => {
                qb.remove();
            }
            "group" => {
                let reduce = args.optional_string(2)?;
                qb.group(
                    args.value(0)?,
                    args.document(1)?,
                    reduce.as_deref(),
                    args.optional_document(3)?,
                );
            }
            "distinct" => {
                qb.distinct(args.string(0)?);
            }
            "geoNear" => {
                qb.geo_near(args.near_point(0)?);
            }
            "mapReduce" => {
                qb.map_reduce(
                    args.string(0)?,
                    args.string(1)?,
                    args.optional(2).cloned(),
                    args.optional_document(3)?,
                );
            }
            "map" => {
                qb.map(args.string(0)?);
            }
            "out" => {
                qb.out(args.value(0)?);
            }
            "mapReduceOptions" => {
                qb.map_reduce_options(args.document(0)?);
            }

            // Guarded
            "reduce" => {
                qb.reduce(args.string(0)?)?;
            }
            "finalize" => {
                qb.finalize(args.string(0)?)?;
            }
            "distanceMultiplier" => {
                qb.distance_multiplier(args.f64(0)?)?;
            }
            "spherical" => {
                qb.spherical(args.bool_or(0, true)?)?;
            }
            "maxDistance" => {
                qb.max_distance(args.f64(0)?);
            }
            "minDistance" => {
                qb.min_distance(args.f64(0)?);
            }

            // Shape
            "select" => {
                qb.select(args.strings_from(0)?);
            }
            "exclude" => {
                qb.exclude(args.strings_from(0)?);
            }
            "selectSlice" => {
                qb.select_slice(args.string(0)?, args.i64(1)?, args.optional_i64(2)?);
            }
            "selectElemMatch" => {
                qb.select_elem_match(args.string(0)?, args.value(1)?);
            }
            "selectMeta" => {
                qb.select_meta(args.string(0)?, args.string(1)?);
            }
            "sort" => match args.optional(0) {
                Some(Bson::Document(mapping)) => {
                    qb.sort_all(
                        mapping
                            .iter()
                            .map(|(field, order)| (field.clone(), SortOrder::from(order))),
                    );
                }
                _ => {
                    let order = args.optional(1).map_or(SortOrder::ASC, SortOrder::from);
                    qb.sort(args.string(0)?, order);
                }
            },
            "sortMeta" => {
                qb.sort_meta(args.string(0)?, args.string(1)?);
            }
            "limit" => {
                qb.limit(args.i64(0)?);
            }
            "skip" => {
                qb.skip(args.i64(0)?);
            }
            "hint" => {
                qb.hint(args.value(0)?);
            }
            "slaveOkay" => {
                qb.slave_okay(args.bool_or(0, true)?);
            }
            "eagerCursor" => {
                qb.eager_cursor(args.bool_or(0, true)?);
            }
            "snapshot" => {
                qb.snapshot(args.bool_or(0, true)?);
            }
            "immortal" => {
                qb.immortal(args.bool_or(0, true)?);
            }
            "new" | "returnNew" => {
                qb.return_new(args.bool_or(0, true)?);
            }
            "upsert" => {
                qb.upsert(args.bool_or(0, true)?);
            }
            "multiple" => {
                qb.multiple(args.bool_or(0, true)?);
            }

            // Criteria
            "field" => {
                qb.field(args.string(0)?);
            }
            "equals" => {
                qb.equals(args.value(0)?);
            }
            "notEqual" => {
                qb.not_equal(args.value(0)?);
            }
            "in" => {
                qb.in_values(args.value(0)?);
            }
            "notIn" => {
                qb.not_in(args.value(0)?);
            }
            "gt" => {
                qb.gt(args.value(0)?);
            }
            "gte" => {
                qb.gte(args.value(0)?);
            }
            "lt" => {
                qb.lt(args.value(0)?);
            }
            "lte" => {
                qb.lte(args.value(0)?);
            }
            "range" => {
                qb.range(args.value(0)?, args.value(1)?);
            }
            "size" => {
                qb.size(args.i64(0)?);
            }
            "exists" => {
                qb.exists(args.bool_or(0, true)?);
            }
            "type" => {
                qb.bson_type(args.value(0)?);
            }
            "all" => {
                qb.all(args.value(0)?);
            }
            "mod" => {
                qb.modulo(args.value(0)?, args.value(1)?);
            }
            "where" => {
                qb.where_js(args.string(0)?);
            }
            "text" => {
                qb.text(args.string(0)?);
            }
            "language" => {
                qb.language(args.string(0)?);
            }
            "comment" => {
                qb.comment(args.string(0)?);
            }
            "elemMatch" => {
                qb.elem_match(args.value(0)?);
            }
            "not" => {
                qb.not(args.value(0)?);
            }
            "addOr" => {
                qb.add_or(args.value(0)?);
            }
            "addAnd" => {
                qb.add_and(args.value(0)?);
            }
            "addNor" => {
                qb.add_nor(args.value(0)?);
            }

            // Geospatial criteria
            "near" => {
                qb.near(args.near_point(0)?);
            }
            "nearSphere" => {
                qb.near_sphere(args.near_point(0)?);
            }
            "withinBox" => {
                qb.within_box(args.f64(0)?, args.f64(1)?, args.f64(2)?, args.f64(3)?);
            }
            "withinCenter" => {
                qb.within_center(args.f64(0)?, args.f64(1)?, args.f64(2)?);
            }
            "withinCenterSphere" => {
                qb.within_center_sphere(args.f64(0)?, args.f64(1)?, args.f64(2)?);
            }
            "withinPolygon" => {
                qb.within_polygon(&args.positions_from(0)?);
            }
            "geoWithinBox" => {
                qb.geo_within_box(args.f64(0)?, args.f64(1)?, args.f64(2)?, args.f64(3)?);
            }
            "geoWithinCenter" => {
                qb.geo_within_center(args.f64(0)?, args.f64(1)?, args.f64(2)?);
            }
            "geoWithinCenterSphere" => {
                qb.geo_within_center_sphere(args.f64(0)?, args.f64(1)?, args.f64(2)?);
            }
            "geoWithinPolygon" => {
                qb.geo_within_polygon(&args.positions_from(0)?);
            }
            "geoWithin" => {
                qb.geo_within(args.geometry(0)?);
            }
            "geoIntersects" => {
                qb.geo_intersects(args.geometry(0)?);
            }

            // Updates
            "set" => {
                qb.set(args.value(0)?, args.bool_or(1, true)?);
            }
            "setOnInsert" => {
                qb.set_on_insert(args.value(0)?);
            }
            "inc" => {
                qb.inc(args.value(0)?);
            }
            "mul" => {
                qb.mul(args.value(0)?);
            }
            "min" => {
                qb.min(args.value(0)?);
            }
            "max" => {
                qb.max(args.value(0)?);
            }
            "rename" => {
                qb.rename(args.string(0)?);
            }
            "currentDate" => {
                let date_type = args.optional_string(0)?;
                qb.current_date(date_type.as_deref().unwrap_or("date"));
            }
            "unsetField" => {
                qb.unset_field();
            }
            "push" => {
                qb.push(args.value(0)?);
            }
            "pushAll" => {
                qb.push_all(args.value(0)?);
            }
            "addToSet" => {
                qb.add_to_set(args.value(0)?);
            }
            "addManyToSet" => {
                qb.add_many_to_set(args.value(0)?);
            }
            "popFirst" => {
                qb.pop_first();
            }
            "popLast" => {
                qb.pop_last();
            }
            "pull" => {
                qb.pull(args.value(0)?);
            }
            "pullAll" => {
                qb.pull_all(args.value(0)?);
            }
            "bitAnd" => {
                qb.bit_and(args.i64(0)?);
            }
            "bitOr" => {
                qb.bit_or(args.i64(0)?);
            }
            "bitXor" => {
                qb.bit_xor(args.i64(0)?);
            }

            // Raw documents
            "setQueryArray" => {
                qb.set_query_array(args.document(0)?);
            }
            "setNewObj" => {
                qb.set_new_obj(args.document(0)?);
            }

            // Terminals
            "getQuery" => return Ok(Some(Terminal::Assemble)),
            "debug" => {
                return Ok(Some(match args.optional_string(0)? {
                    Some(name) => Terminal::DebugEntry(name),
                    None => Terminal::Debug,
                }));
            }

            other => return Err(ParseError::UnknownMethod(other.to_string()).into()),
        }

        Ok(None)
    }
}
