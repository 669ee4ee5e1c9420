use docview::errors::ErrorKind;
use docview::store::RecordStoreProvider;
use docview::Value;
use docview_int_test::test_util::{
    cleanup, create_empty_test_context, names, run_test, LISTINGS, TOP_RATED_APARTMENTS,
};
use std::path::PathBuf;

const DUMP: &str = r#"{
    "listingsAndReviews": [
        {
            "_id": "10006546",
            "name": "Ribeira Charming Duplex",
            "property_type": "House",
            "accommodates": {"$numberInt": "8"},
            "review_scores": {"review_scores_cleanliness": {"$numberInt": "9"}},
            "price": {"$numberDecimal": "80.00"}
        },
        {
            "_id": "10030955",
            "name": "Apt Linda Vista Lagoa",
            "property_type": "Apartment",
            "accommodates": {"$numberInt": "6"},
            "review_scores": {"review_scores_cleanliness": {"$numberInt": "10"}},
            "price": {"$numberDecimal": "701.00"},
            "last_scraped": {"$date": {"$numberLong": "1550293200000"}}
        },
        {
            "_id": "1003530",
            "name": "New York City - Upper West Side Apt",
            "property_type": "Apartment",
            "accommodates": 5,
            "review_scores": {"review_scores_cleanliness": 10},
            "price": 135.0
        }
    ],
    "hosts": [
        {"_id": {"$oid": "5ca4bbc7a2dd94ee5816238c"}, "host_name": "Ana"}
    ]
}"#;

fn dump_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("docview-{}-{}.json", std::process::id(), name))
}

#[ctor::ctor]
fn init() {
    colog::init();
}

#[test]
fn test_load_dump_unwraps_extended_json() {
    run_test(
        create_empty_test_context,
        |ctx| {
            let store = ctx.store();
            assert_eq!(store.load_json_dump(DUMP)?, 4);
            assert_eq!(store.size(LISTINGS), 3);
            assert_eq!(store.size("hosts"), 1);

            let listings = store.scan(LISTINGS)?;
            assert_eq!(listings[0].get("accommodates")?, Value::I64(8));
            assert_eq!(listings[1].get("price")?, Value::F64(701.0));
            assert_eq!(listings[1].get("last_scraped")?, Value::I64(1550293200000));

            let hosts = store.scan("hosts")?;
            assert_eq!(hosts[0].get("_id")?, Value::from("5ca4bbc7a2dd94ee5816238c"));
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_view_over_loaded_dump() {
    run_test(
        create_empty_test_context,
        |ctx| {
            ctx.store().load_json_dump(DUMP)?;
            let registry = ctx.registry();
            registry.create_view_from_json(TOP_RATED_APARTMENTS)?;

            let result = registry.query("topRatedApartments")?;
            assert_eq!(
                names(&result),
                vec!["Apt Linda Vista Lagoa", "New York City - Upper West Side Apt"]
            );
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_load_dump_file() {
    run_test(
        create_empty_test_context,
        |ctx| {
            let path = dump_path("listings");
            std::fs::write(&path, DUMP)?;
            let loaded = ctx.store().load_json_dump_file(&path);
            std::fs::remove_file(&path)?;

            assert_eq!(loaded?, 4);
            assert_eq!(ctx.store().collection_names()?.len(), 2);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_malformed_dump_leaves_store_unchanged() {
    run_test(
        create_empty_test_context,
        |ctx| {
            let store = ctx.store();
            let invalid = [
                "{broken",
                r#"["not", "an", "object"]"#,
                r#"{"listingsAndReviews": {"_id": 1}}"#,
                r#"{"hosts": [{"_id": 1}], "listingsAndReviews": [1, 2]}"#,
                r#"{"listingsAndReviews": [{"accommodates": {"$numberInt": "eight"}}]}"#,
            ];
            for json in invalid {
                assert!(store.load_json_dump(json).is_err(), "{}", json);
            }
            assert!(store.collection_names()?.is_empty());

            let err = store.load_json_dump_file(dump_path("missing")).unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::IOError);
            Ok(())
        },
        cleanup,
    )
}
