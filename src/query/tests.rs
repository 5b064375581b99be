//! Behavioural tests for the builder state machine
//!
//! These cover the cross-method rules: last type wins, guarded methods,
//! shape merging, insert-vs-update assignment and copy semantics.

#[cfg(test)]
mod tests {
    use bson::{Bson, doc};

    use crate::error::{BuilderError, DocQueryError};
    use crate::query::{
        Builder, CommandKind, FieldProjection, OperationType, Slice, SortOrder,
    };

    fn builder() -> Builder {
        Builder::new("test", "things")
    }

    #[test]
    fn test_last_type_selection_wins() {
        let mut qb = builder();
        qb.count().insert().distinct("tag").remove();
        assert_eq!(qb.get_type(), OperationType::Remove);

        qb.geo_near((0.0, 0.0)).find_and_update();
        assert_eq!(qb.get_type(), OperationType::FindAndUpdate);

        qb.map("m").group(doc! { "k": 1 }, doc! {}, None, None);
        assert_eq!(qb.get_type(), OperationType::Group);

        qb.update().find_and_remove().find();
        assert_eq!(qb.get_type(), OperationType::Find);
    }

    #[test]
    fn test_sort_mapping_preserves_order() {
        let mut qb = builder();
        qb.sort_all([("a", "asc"), ("b", "desc")]);

        let sort = &qb.configuration().sort;
        assert_eq!(sort.to_document(), doc! { "a": 1, "b": -1 });
        assert_eq!(sort.iter().map(|(f, _)| f).collect::<Vec<_>>(), vec!["a", "b"]);

        qb.sort("a", -1);
        let sort = &qb.configuration().sort;
        assert_eq!(sort.get("a"), Some(&SortOrder::DESC));
        assert_eq!(sort.iter().map(|(f, _)| f).collect::<Vec<_>>(), vec!["a", "b"]);
    }

    #[test]
    fn test_sort_direction_coercion() {
        let mut qb = builder();
        qb.sort("a", "ASC").sort("b", "whatever").sort("c", true).sort("d", 1.9);

        let sort = &qb.configuration().sort;
        assert_eq!(sort.get("a"), Some(&SortOrder::Direction(1)));
        assert_eq!(sort.get("b"), Some(&SortOrder::Direction(-1)));
        assert_eq!(sort.get("c"), Some(&SortOrder::Direction(1)));
        assert_eq!(sort.get("d"), Some(&SortOrder::Direction(1)));
    }

    #[test]
    fn test_large_sort_direction_does_not_flip() {
        let mut qb = builder();
        qb.sort("a", 4_294_967_295_i64).sort("b", -4_294_967_295_i64);

        let sort = &qb.configuration().sort;
        assert_eq!(sort.get("a"), Some(&SortOrder::Direction(i32::MAX)));
        assert_eq!(sort.get("b"), Some(&SortOrder::Direction(i32::MIN)));
    }

    #[test]
    fn test_cursor_flags_in_wire_document() {
        let mut qb = builder();
        assert_eq!(
            qb.assemble().to_document(),
            doc! { "type": "find", "database": "test", "collection": "things", "query": {} }
        );

        qb.slave_okay(false).immortal(true).snapshot(true).eager_cursor(true);
        assert_eq!(
            qb.assemble().to_document(),
            doc! {
                "type": "find",
                "database": "test",
                "collection": "things",
                "query": {},
                "slaveOkay": false,
                "immortal": true,
                "snapshot": true,
                "eagerCursor": true,
            }
        );

        qb.slave_okay(true).immortal(false).snapshot(false).eager_cursor(false);
        let wire = qb.assemble().to_document();
        assert_eq!(wire.get("slaveOkay"), Some(&Bson::Boolean(true)));
        assert!(!wire.contains_key("immortal"));
        assert!(!wire.contains_key("snapshot"));
        assert!(!wire.contains_key("eagerCursor"));
    }

    #[test]
    fn test_select_slice_shapes() {
        let mut qb = builder();
        qb.select_slice("tags", 5, None);
        assert_eq!(
            qb.configuration().projection.get("tags"),
            Some(&FieldProjection::Slice(Slice::Count(5)))
        );

        qb.select_slice("tags", 5, Some(10));
        assert_eq!(
            qb.configuration().projection.get("tags"),
            Some(&FieldProjection::Slice(Slice::Range(5, 10)))
        );
    }

    #[test]
    fn test_slice_overwrites_plain_inclusion() {
        let mut qb = builder();
        qb.select(["tags"]).select_slice("tags", -3, None);
        assert_eq!(
            qb.configuration().projection.to_document(),
            doc! { "tags": { "$slice": -3_i64 } }
        );
    }

    #[test]
    fn test_reduce_requires_aggregation() {
        let mut qb = builder();
        let err = qb.reduce("function(k, v) {}").unwrap_err();
        assert!(matches!(
            err,
            DocQueryError::Builder(BuilderError::RequiresAggregation { method: "reduce" })
        ));
        assert!(qb.configuration().group.is_none());
        assert!(qb.configuration().map_reduce.is_none());
    }

    #[test]
    fn test_reduce_routes_by_type() {
        let mut qb = builder();
        qb.group(doc! { "k": 1 }, doc! { "n": 0 }, None, None)
            .reduce("groupReduce")
            .unwrap();
        assert_eq!(
            qb.configuration().group.as_ref().unwrap().reduce.as_deref(),
            Some("groupReduce")
        );

        qb.map_reduce("m", "r", None, None).reduce("mrReduce").unwrap();
        assert_eq!(
            qb.configuration().map_reduce.as_ref().unwrap().reduce.as_deref(),
            Some("mrReduce")
        );
        assert_eq!(
            qb.configuration().group.as_ref().unwrap().reduce.as_deref(),
            Some("groupReduce")
        );
    }

    #[test]
    fn test_reduce_after_map() {
        let mut qb = builder();
        qb.map("m").reduce("r").unwrap();
        let spec = qb.configuration().map_reduce.as_ref().unwrap();
        assert_eq!(spec.map, "m");
        assert_eq!(spec.reduce.as_deref(), Some("r"));
    }

    #[test]
    fn test_finalize_routes_by_type() {
        let mut qb = builder();
        assert!(qb.finalize("f").is_err());

        qb.group(doc! { "k": 1 }, doc! {}, Some("r"), Some(doc! { "cond": { "a": 1 } }))
            .finalize("f")
            .unwrap();
        assert_eq!(
            qb.configuration().group.as_ref().unwrap().options,
            doc! { "cond": { "a": 1 }, "finalize": Bson::JavaScriptCode("f".into()) }
        );
    }

    #[test]
    fn test_distance_multiplier_requires_geo_near() {
        let mut qb = builder();
        let err = qb.distance_multiplier(2.0).unwrap_err();
        assert!(matches!(
            err,
            DocQueryError::Builder(BuilderError::RequiresGeoNear { .. })
        ));
        assert_eq!(err.to_string(), "Invalid call: distanceMultiplier() requires geoNear() first");
        assert!(qb.spherical(true).is_err());
    }

    #[test]
    fn test_geo_near_configuration() {
        let mut qb = builder();
        qb.geo_near((1.0, 2.0))
            .distance_multiplier(2.0)
            .unwrap()
            .spherical(true)
            .unwrap();

        let spec = qb.configuration().geo_near.as_ref().unwrap();
        assert_eq!(
            spec.to_document(),
            doc! { "near": [1.0, 2.0], "distanceMultiplier": 2.0, "spherical": true }
        );
    }

    #[test]
    fn test_geo_near_guard_after_type_change() {
        let mut qb = builder();
        qb.geo_near((1.0, 2.0)).find();
        assert!(qb.distance_multiplier(2.0).is_err());
    }

    #[test]
    fn test_insert_set_is_plain_assignment() {
        let mut qb = builder();
        qb.insert().field("x").set(5, true);
        assert_eq!(qb.get_new_obj(), &doc! { "x": 5 });
    }

    #[test]
    fn test_update_set_is_atomic() {
        let mut qb = builder();
        qb.update().field("x").set(5, true).field("y").set(6, false);
        assert_eq!(qb.get_new_obj(), &doc! { "$set": { "x": 5 }, "y": 6 });
    }

    #[test]
    fn test_clone_does_not_share_accumulator() {
        let mut original = builder();
        original.field("a").equals(1);

        let mut copy = original.clone();
        copy.field("a").gt(10).field("b").inc(1);

        assert_eq!(original.get_query_array(), &doc! { "a": 1 });
        assert!(original.get_new_obj().is_empty());
        assert_eq!(copy.get_query_array(), &doc! { "a": { "$in": [1], "$gt": 10 } });
    }

    #[test]
    fn test_assemble_is_repeatable() {
        let mut qb = builder();
        qb.find_and_update()
            .return_new(true)
            .field("n")
            .gt(1)
            .inc(1)
            .sort("n", "desc");

        let first = qb.assemble();
        let second = qb.assemble();
        assert_eq!(first, second);
        assert_eq!(first.query(), second.query());
        assert_eq!(first.new_obj(), second.new_obj());
    }

    #[test]
    fn test_command_is_detached_from_builder() {
        let mut qb = builder();
        qb.field("a").equals(1);
        let command = qb.assemble();

        qb.field("b").equals(2).limit(9);
        assert_eq!(command.query(), &doc! { "a": 1 });
        assert_eq!(command.options().limit, None);
    }

    #[test]
    fn test_stale_specs_resume_but_are_not_assembled() {
        let mut qb = builder();
        qb.map_reduce("m", "r", Some(Bson::String("out".into())), None);
        qb.find();

        let command = qb.assemble();
        assert!(matches!(command.kind(), CommandKind::Find));
        assert!(!command.to_document().contains_key("mapReduce"));

        qb.map("m2");
        let spec = qb.configuration().map_reduce.as_ref().unwrap();
        assert_eq!(spec.reduce.as_deref(), Some("r"));
        assert_eq!(spec.out, Bson::String("out".into()));
    }

    #[test]
    fn test_assembled_kinds_carry_their_spec() {
        let mut qb = builder();
        qb.distinct("city").field("country").equals("NZ");
        let command = qb.assemble();
        assert_eq!(command.kind(), &CommandKind::Distinct("city".to_string()));
        assert_eq!(command.to_document().get_str("distinct").unwrap(), "city");

        qb.group(doc! { "city": 1 }, doc! { "n": 0 }, Some("r"), None);
        let command = qb.assemble();
        match command.kind() {
            CommandKind::Group(spec) => assert_eq!(spec.initial, doc! { "n": 0 }),
            other => panic!("unexpected kind: {other:?}"),
        }
    }

    #[test]
    fn test_command_document_shape() {
        let mut qb = builder();
        qb.update_many()
            .upsert(true)
            .field("status")
            .equals("stale")
            .field("status")
            .set("archived", true)
            .select(["a"])
            .hint("status_1");

        let doc = qb.assemble().to_document();
        assert_eq!(
            doc,
            doc! {
                "type": "update",
                "database": "test",
                "collection": "things",
                "query": { "status": "stale" },
                "newObj": { "$set": { "status": "archived" } },
                "select": { "a": 1 },
                "hints": ["status_1"],
                "upsert": true,
                "multiple": true,
            }
        );
    }

    #[test]
    fn test_logical_helpers_through_builder() {
        let mut qb = builder();
        let mut cheap = qb.expr();
        cheap.field("price").lt(10);
        let mut rated = qb.expr();
        rated.field("stars").gte(4);

        qb.add_or(cheap).add_or(rated).field("tags").elem_match(doc! { "$eq": "new" });
        assert_eq!(
            qb.get_query_array(),
            &doc! {
                "$or": [{ "price": { "$lt": 10 } }, { "stars": { "$gte": 4 } }],
                "tags": { "$elemMatch": { "$eq": "new" } },
            }
        );
    }

    #[test]
    fn test_raw_document_injection() {
        let mut qb = builder();
        qb.set_query_array(doc! { "raw": true })
            .set_new_obj(doc! { "$set": { "x": 1 } });
        let command = qb.assemble();
        assert_eq!(command.query(), &doc! { "raw": true });
        assert_eq!(command.new_obj(), &doc! { "$set": { "x": 1 } });
    }
}
