use docview::errors::ErrorKind;
use docview::filter::{field, MatchSpec};
use docview::view_config::CacheMode;
use docview_int_test::test_util::{
    cleanup, create_cached_test_context, create_test_context, listing, names, run_test, LISTINGS,
    TOP_RATED_APARTMENTS,
};

#[test]
fn test_cached_view_serves_first_result() {
    run_test(
        create_cached_test_context,
        |ctx| {
            let registry = ctx.registry();
            assert_eq!(registry.config().cache_mode(), CacheMode::Cached);
            registry.create_view_from_json(TOP_RATED_APARTMENTS)?;

            let first = registry.query("topRatedApartments")?;
            assert_eq!(first.len(), 3);

            ctx.store()
                .insert(LISTINGS, listing("1", "Penthouse", "Apartment", 10, 10, 999.0))?;
            assert_eq!(registry.query("topRatedApartments")?, first);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_invalidate_refreshes_cached_view() {
    run_test(
        create_cached_test_context,
        |ctx| {
            let registry = ctx.registry();
            registry.create_view_from_json(TOP_RATED_APARTMENTS)?;
            registry.query("topRatedApartments")?;

            let store = ctx.store();
            store.insert(LISTINGS, listing("1", "Penthouse", "Apartment", 10, 10, 999.0))?;
            registry.invalidate("topRatedApartments")?;

            let result = registry.query("topRatedApartments")?;
            assert_eq!(names(&result)[0], "Penthouse");

            store.remove_where(LISTINGS, &MatchSpec::new().and(field("price").gt(500)))?;
            assert_eq!(registry.query("topRatedApartments")?.len(), 4);
            registry.invalidate_all();
            assert_eq!(
                names(&registry.query("topRatedApartments")?),
                vec![
                    "New York City - Upper West Side Apt",
                    "Catete's Colonial Big Hause Room"
                ]
            );
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_drop_discards_cached_result() {
    run_test(
        create_cached_test_context,
        |ctx| {
            let registry = ctx.registry();
            registry.create_view_from_json(TOP_RATED_APARTMENTS)?;
            registry.query("topRatedApartments")?;
            registry.drop_view("topRatedApartments")?;

            ctx.store().clear(LISTINGS)?;
            registry.create_view_from_json(TOP_RATED_APARTMENTS)?;
            assert!(registry.query("topRatedApartments")?.is_empty());
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_live_view_ignores_invalidation() {
    run_test(
        create_test_context,
        |ctx| {
            let registry = ctx.registry();
            assert_eq!(registry.config().cache_mode(), CacheMode::Live);
            registry.create_view_from_json(TOP_RATED_APARTMENTS)?;
            registry.invalidate("topRatedApartments")?;
            registry.invalidate_all();
            assert_eq!(registry.query("topRatedApartments")?.len(), 3);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_cache_mode_cannot_change_after_build() {
    run_test(
        create_cached_test_context,
        |ctx| {
            let err = ctx
                .registry()
                .config()
                .set_cache_mode(CacheMode::Live)
                .unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::InvalidOperation);
            assert_eq!(ctx.registry().config().cache_mode(), CacheMode::Cached);
            Ok(())
        },
        cleanup,
    )
}
