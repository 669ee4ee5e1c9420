use docview::pipeline::{execute, PipelineDefinition};
use docview::{doc, Value};
use docview_int_test::test_util::{cleanup, create_test_context, names, run_test, sample_listings, LISTINGS};
use serde_json::json;

fn query(ctx: &docview_int_test::test_util::TestContext, pipeline: serde_json::Value) -> Vec<docview::Document> {
    let registry = ctx.registry();
    registry
        .create_view("probe", LISTINGS, PipelineDefinition::from_json(&pipeline).unwrap())
        .unwrap();
    let result = registry.query("probe").unwrap();
    registry.drop_view("probe").unwrap();
    result
}

#[test]
fn test_match_operators() {
    run_test(
        create_test_context,
        |ctx| {
            let not_apartments = query(&ctx, json!([{"$match": {"property_type": {"$ne": "Apartment"}}}]));
            assert_eq!(
                names(&not_apartments),
                vec![
                    "Ribeira Charming Duplex",
                    "Ocean View Waikiki Marina",
                    "Charming Flat in Downtown Moda"
                ]
            );

            assert_eq!(query(&ctx, json!([{"$match": {"accommodates": {"$gte": 6}}}])).len(), 4);
            assert_eq!(query(&ctx, json!([{"$match": {"price": {"$lt": 100}}}])).len(), 2);
            assert_eq!(query(&ctx, json!([{"$match": {"price": {"$lte": 115}}}])).len(), 3);
            assert_eq!(query(&ctx, json!([{"$match": {"price": {"$gt": 100, "$lt": 120}}}])).len(), 2);
            assert_eq!(
                query(&ctx, json!([{"$match": {"property_type": {"$eq": "House"}}}])).len(),
                2
            );
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_match_compares_numbers_across_kinds() {
    run_test(
        create_test_context,
        |ctx| {
            // prices are stored as floats
            let result = query(&ctx, json!([{"$match": {"price": 135}}]));
            assert_eq!(
                names(&result),
                vec!["New York City - Upper West Side Apt", "Catete's Colonial Big Hause Room"]
            );

            // ordering operators never match across kinds
            assert!(query(&ctx, json!([{"$match": {"name": {"$gt": 5}}}])).is_empty());
            assert!(query(&ctx, json!([{"$match": {"price": {"$gt": "100"}}}])).is_empty());
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_match_null_equals_missing() {
    run_test(
        create_test_context,
        |ctx| {
            assert_eq!(query(&ctx, json!([{"$match": {"amenities": null}}])).len(), 9);
            assert!(query(&ctx, json!([{"$match": {"amenities": {"$ne": null}}}])).is_empty());
            assert!(query(&ctx, json!([{"$match": {"address.street": "Porto"}}])).is_empty());
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_nested_inclusion_projection() {
    run_test(
        create_test_context,
        |ctx| {
            let result = query(&ctx, json!([{"$project": {"address.market": 1, "name": 1}}]));
            assert_eq!(result.len(), 9);
            assert_eq!(
                result[0],
                doc! {
                    _id: "10006546",
                    address: { market: "Porto" },
                    name: "Ribeira Charming Duplex",
                }
            );
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_exclusion_projection_keeps_other_fields() {
    run_test(
        create_test_context,
        |ctx| {
            let result = query(
                &ctx,
                json!([{"$project": {"review_scores": 0, "address.country_code": 0, "_id": 0}}]),
            );
            let keys: Vec<String> = result[0].keys().cloned().collect();
            assert_eq!(keys, vec!["name", "property_type", "accommodates", "address", "price"]);
            assert_eq!(result[0].get("address")?, Value::from(doc! { market: "Porto" }));
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_multi_key_sort() {
    run_test(
        create_test_context,
        |ctx| {
            let result = query(&ctx, json!([{"$sort": {"accommodates": -1, "price": 1}}]));
            assert_eq!(
                names(&result),
                vec![
                    "Ribeira Charming Duplex",
                    "Catete's Colonial Big Hause Room",
                    "Charming Flat in Downtown Moda",
                    "Apt Linda Vista Lagoa",
                    "Copacabana Apartment Posto 6",
                    "New York City - Upper West Side Apt",
                    "Horto flat with small garden",
                    "Ocean View Waikiki Marina",
                    "Private Room in Bushwick",
                ]
            );
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_empty_pipeline_returns_source_in_order() {
    let result = execute(sample_listings(), &PipelineDefinition::empty()).unwrap();
    assert_eq!(result, sample_listings());
}
