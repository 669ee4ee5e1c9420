use docview::errors::ErrorKind;
use docview::pipeline::PipelineDefinition;
use docview_int_test::test_util::{
    cleanup, create_strict_test_context, create_test_context, names, run_test, sample_listings,
    LISTINGS, TOP_RATED_APARTMENTS,
};
use serde_json::json;

fn pipeline(json: serde_json::Value) -> PipelineDefinition {
    PipelineDefinition::from_json(&json).unwrap()
}

#[test]
fn test_match_before_project_sees_removed_field() {
    run_test(
        create_test_context,
        |ctx| {
            let registry = ctx.registry();
            registry.create_view(
                "match_first",
                LISTINGS,
                pipeline(json!([
                    {"$match": {"price": {"$gt": 500}}},
                    {"$project": {"price": 0}}
                ])),
            )?;
            registry.create_view(
                "project_first",
                LISTINGS,
                pipeline(json!([
                    {"$project": {"price": 0}},
                    {"$match": {"price": {"$gt": 500}}}
                ])),
            )?;

            let result = registry.query("match_first")?;
            assert_eq!(
                names(&result),
                vec!["Apt Linda Vista Lagoa", "Charming Flat in Downtown Moda"]
            );
            assert!(result.iter().all(|d| !d.contains_key("price")));

            // price is gone by the time the match runs
            assert!(registry.query("project_first")?.is_empty());
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_sort_on_removed_field_keeps_input_order() {
    run_test(
        create_test_context,
        |ctx| {
            let registry = ctx.registry();
            registry.create_view(
                "hazard",
                LISTINGS,
                pipeline(json!([
                    {"$project": {"_id": 0, "name": 1}},
                    {"$sort": {"price": -1}}
                ])),
            )?;

            let expected = names(&sample_listings());
            assert_eq!(names(&registry.query("hazard")?), expected);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_sort_and_project_commute_on_kept_fields() {
    run_test(
        create_test_context,
        |ctx| {
            let registry = ctx.registry();
            registry.create_view(
                "sort_first",
                LISTINGS,
                pipeline(json!([
                    {"$match": {"property_type": "Apartment"}},
                    {"$sort": {"price": -1}},
                    {"$project": {"_id": 0, "name": 1, "price": 1}}
                ])),
            )?;
            registry.create_view(
                "project_first",
                LISTINGS,
                pipeline(json!([
                    {"$match": {"property_type": "Apartment"}},
                    {"$project": {"_id": 0, "name": 1, "price": 1}},
                    {"$sort": {"price": -1}}
                ])),
            )?;

            let sort_first = registry.query("sort_first")?;
            assert_eq!(sort_first, registry.query("project_first")?);
            assert_eq!(names(&sort_first)[0], "Apt Linda Vista Lagoa");
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_removed_field_usages_are_reported() {
    let definition = pipeline(json!([
        {"$project": {"name": 1, "price": 1}},
        {"$match": {"accommodates": {"$gt": 4}}},
        {"$sort": {"price": -1}},
        {"$project": {"price": 0}},
        {"$sort": {"price": 1, "name": 1}}
    ]));

    let usages = definition.removed_field_usages();
    let fields: Vec<(usize, &str, usize)> = usages
        .iter()
        .map(|u| (u.stage_index, u.field_name.as_str(), u.project_index))
        .collect();
    assert_eq!(fields, vec![(1, "accommodates", 0), (4, "price", 3)]);
    assert_eq!(usages[0].stage_tag, "match");
    assert_eq!(usages[1].stage_tag, "sort");
}

#[test]
fn test_strict_registry_rejects_removed_field_usage() {
    run_test(
        create_strict_test_context,
        |ctx| {
            let registry = ctx.registry();
            let err = registry
                .create_view(
                    "hazard",
                    LISTINGS,
                    pipeline(json!([
                        {"$project": {"price": 0}},
                        {"$sort": {"price": -1}}
                    ])),
                )
                .unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::InvalidSpec);
            assert!(!registry.has_view("hazard"));

            // well ordered pipelines are still accepted
            registry.create_view_from_json(TOP_RATED_APARTMENTS)?;
            assert_eq!(registry.query("topRatedApartments")?.len(), 3);
            Ok(())
        },
        cleanup,
    )
}
