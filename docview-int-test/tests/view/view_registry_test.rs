use docview::doc;
use docview::errors::ErrorKind;
use docview::pipeline::PipelineDefinition;
use docview::store::memory::InMemoryStore;
use docview::store::RecordStore;
use docview::view::{ViewDefinition, ViewRegistry};
use docview::Value;
use docview_int_test::test_util::{
    cleanup, create_empty_test_context, create_test_context, listing, names, run_test, LISTINGS,
    TOP_RATED_APARTMENTS,
};
use serde_json::json;

fn scenario_pipeline() -> PipelineDefinition {
    PipelineDefinition::from_json(&json!([
        {"$match": {
            "property_type": "Apartment",
            "review_scores.review_scores_cleanliness": 10,
            "accommodates": {"$gt": 4}
        }},
        {"$project": {"name": 1, "price": 1, "_id": 0}},
        {"$sort": {"price": -1}}
    ]))
    .unwrap()
}

#[test]
fn test_end_to_end_scenario() {
    run_test(
        create_empty_test_context,
        |ctx| {
            let store = ctx.store();
            store.insert_many(
                "c",
                vec![
                    doc! {
                        name: "A", property_type: "Apartment", accommodates: 6,
                        review_scores: { review_scores_cleanliness: 10 }, price: 100,
                    },
                    doc! {
                        name: "B", property_type: "Apartment", accommodates: 3,
                        review_scores: { review_scores_cleanliness: 10 }, price: 50,
                    },
                    doc! {
                        name: "C", property_type: "House", accommodates: 6,
                        review_scores: { review_scores_cleanliness: 10 }, price: 200,
                    },
                ],
            )?;

            let registry = ctx.registry();
            registry.create_view("v", "c", scenario_pipeline())?;
            let result = registry.query("v")?;
            assert_eq!(result, vec![doc! { name: "A", price: 100 }]);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_top_rated_apartments() {
    run_test(
        create_test_context,
        |ctx| {
            let registry = ctx.registry();
            registry.create_view_from_json(TOP_RATED_APARTMENTS)?;

            let result = registry.query("topRatedApartments")?;
            assert_eq!(
                names(&result),
                vec![
                    "Apt Linda Vista Lagoa",
                    "New York City - Upper West Side Apt",
                    "Catete's Colonial Big Hause Room",
                ]
            );

            let first = &result[0];
            let keys: Vec<String> = first.keys().cloned().collect();
            assert_eq!(keys, vec!["name", "address", "price", "accommodates"]);
            assert_eq!(first.get("address.market")?, Value::from("Porto"));
            assert!(!first.contains_key("_id"));
            assert!(!first.contains_key("review_scores"));
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_create_view_twice_fails_with_duplicate_name() {
    run_test(
        create_test_context,
        |ctx| {
            let registry = ctx.registry();
            registry.create_view("v", "c", scenario_pipeline())?;
            let err = registry
                .create_view("v", LISTINGS, PipelineDefinition::empty())
                .unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::DuplicateName);

            // first registration wins
            assert_eq!(registry.definition("v")?.source(), "c");
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_unknown_view_fails_with_not_found() {
    run_test(
        create_test_context,
        |ctx| {
            let registry = ctx.registry();
            assert_eq!(registry.drop_view("ghost").unwrap_err().kind(), &ErrorKind::NotFound);
            assert_eq!(registry.query("ghost").unwrap_err().kind(), &ErrorKind::NotFound);
            assert_eq!(registry.invalidate("ghost").unwrap_err().kind(), &ErrorKind::NotFound);
            assert_eq!(registry.definition("ghost").unwrap_err().kind(), &ErrorKind::NotFound);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_view_lifecycle() {
    run_test(
        create_test_context,
        |ctx| {
            let registry = ctx.registry();
            assert!(!registry.has_view("topRatedApartments"));

            registry.create_view_from_json(TOP_RATED_APARTMENTS)?;
            assert!(registry.has_view("topRatedApartments"));
            assert_eq!(registry.len(), 1);

            registry.drop_view("topRatedApartments")?;
            assert!(!registry.has_view("topRatedApartments"));
            assert!(registry.is_empty());
            assert_eq!(
                registry.drop_view("topRatedApartments").unwrap_err().kind(),
                &ErrorKind::NotFound
            );
            assert_eq!(
                registry.query("topRatedApartments").unwrap_err().kind(),
                &ErrorKind::NotFound
            );

            // a dropped name can be registered again
            registry.create_view_from_json(TOP_RATED_APARTMENTS)?;
            assert_eq!(registry.query("topRatedApartments")?.len(), 3);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_create_view_does_not_evaluate_pipeline() {
    run_test(
        create_empty_test_context,
        |ctx| {
            let registry = ctx.registry();
            registry.create_view_from_json(TOP_RATED_APARTMENTS)?;
            assert!(registry.query("topRatedApartments")?.is_empty());

            // the source collection can appear after registration
            ctx.store()
                .insert(LISTINGS, listing("1", "Loft", "Apartment", 6, 10, 90.0))?;
            assert_eq!(names(&registry.query("topRatedApartments")?), vec!["Loft"]);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_query_reflects_source_changes() {
    run_test(
        create_test_context,
        |ctx| {
            let registry = ctx.registry();
            registry.create_view_from_json(TOP_RATED_APARTMENTS)?;
            assert_eq!(registry.query("topRatedApartments")?.len(), 3);

            let store = ctx.store();
            store.insert(LISTINGS, listing("1", "Penthouse", "Apartment", 10, 10, 999.0))?;
            let result = registry.query("topRatedApartments")?;
            assert_eq!(result.len(), 4);
            assert_eq!(names(&result)[0], "Penthouse");

            store.clear(LISTINGS)?;
            assert!(registry.query("topRatedApartments")?.is_empty());
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_query_does_not_modify_source() {
    run_test(
        create_test_context,
        |ctx| {
            let registry = ctx.registry();
            registry.create_view_from_json(TOP_RATED_APARTMENTS)?;
            registry.query("topRatedApartments")?;

            let all = PipelineDefinition::empty();
            registry.create_view("all", LISTINGS, all)?;
            let source = registry.query("all")?;
            assert_eq!(source.len(), 9);
            assert_eq!(source[0].get("_id")?, Value::from("10006546"));
            assert!(source[0].contains_key("review_scores"));
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_registries_are_isolated() {
    run_test(
        create_test_context,
        |ctx| {
            let other = ViewRegistry::new(RecordStore::new(InMemoryStore::new()));
            ctx.registry().create_view_from_json(TOP_RATED_APARTMENTS)?;
            assert!(!other.has_view("topRatedApartments"));

            other.create_view_from_json(TOP_RATED_APARTMENTS)?;
            assert!(other.query("topRatedApartments")?.is_empty());
            assert_eq!(ctx.registry().query("topRatedApartments")?.len(), 3);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_definitions_are_kept_in_registration_order() {
    run_test(
        create_test_context,
        |ctx| {
            let registry = ctx.registry();
            let definition = ViewDefinition::from_json_str(TOP_RATED_APARTMENTS)?;
            registry.create_view_from_definition(definition.clone())?;
            registry.create_view("all", LISTINGS, PipelineDefinition::empty())?;

            assert_eq!(registry.definition("topRatedApartments")?, definition);
            assert_eq!(registry.view_names(), vec!["topRatedApartments", "all"]);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_invalid_definitions_are_rejected() {
    run_test(
        create_test_context,
        |ctx| {
            let registry = ctx.registry();
            let invalid = [
                r#"{"name": "", "source": "c", "pipeline": []}"#,
                r#"{"name": "v", "pipeline": []}"#,
                r#"{"name": "v", "source": "c", "pipeline": [{"$group": {"_id": "$market"}}]}"#,
                r#"{"name": "v", "source": "c", "pipeline": [{"$project": {"a": 1, "b": 0}}]}"#,
                r#"{"name": "v", "source": "c", "pipeline": [{"$sort": {}}]}"#,
            ];
            for json in invalid {
                let err = registry.create_view_from_json(json).unwrap_err();
                assert_eq!(err.kind(), &ErrorKind::InvalidSpec, "{}", json);
            }
            assert!(registry.is_empty());
            Ok(())
        },
        cleanup,
    )
}
