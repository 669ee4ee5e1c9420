use docview::collection::Document;
use docview::doc;
use docview::errors::ViewResult;
use docview::store::memory::InMemoryStore;
use docview::store::{RecordStore, RecordStoreProvider};
use docview::view::ViewRegistry;
use docview::view_config::CacheMode;
use std::backtrace::Backtrace;
use std::panic::AssertUnwindSafe;
use std::time::Instant;

pub const LISTINGS: &str = "listingsAndReviews";

/// The `topRatedApartments` view over the Airbnb sample listings.
pub const TOP_RATED_APARTMENTS: &str = r#"{
    "name": "topRatedApartments",
    "source": "listingsAndReviews",
    "pipeline": [
        { "$match": {
            "property_type": "Apartment",
            "review_scores.review_scores_cleanliness": 10,
            "accommodates": { "$gt": 4 }
        } },
        { "$project": { "_id": 0, "name": 1, "address": 1, "price": 1, "accommodates": 1 } },
        { "$sort": { "price": -1 } }
    ]
}"#;

/// Runs a test between a setup and a teardown step.
///
/// `after` runs even when the test fails, so every context is cleaned up.
/// Failures and panics are reported with the elapsed time and a backtrace.
pub fn run_test<T, B, A>(before: B, test: T, after: A)
where
    T: Fn(TestContext) -> ViewResult<()>,
    B: Fn() -> ViewResult<TestContext>,
    A: Fn(TestContext) -> ViewResult<()>,
{
    let start_time = Instant::now();

    let result = std::panic::catch_unwind(AssertUnwindSafe(|| {
        let backtrace = Backtrace::capture();
        let ctx = match before() {
            Ok(ctx) => ctx,
            Err(e) => return Err((format!("Before run failed: {:?}", e), backtrace.to_string())),
        };

        match test(ctx.clone()) {
            Ok(_) => after(ctx)
                .map_err(|e| (format!("After run failed: {:?}", e), backtrace.to_string())),
            Err(e) => {
                let _ = after(ctx);
                Err((format!("Test failed: {:?}", e), backtrace.to_string()))
            }
        }
    }));

    let elapsed = start_time.elapsed();
    let (error, backtrace) = match result {
        Ok(Ok(_)) => return,
        Ok(Err((e, bt))) => (e, bt),
        Err(panic_err) => {
            let err_msg = if let Some(s) = panic_err.downcast_ref::<&str>() {
                s.to_string()
            } else if let Some(s) = panic_err.downcast_ref::<String>() {
                s.clone()
            } else {
                "Unknown panic".to_string()
            };
            (format!("Panic: {}", err_msg), Backtrace::capture().to_string())
        }
    };

    eprintln!("\n==================== TEST FAILED ====================");
    eprintln!("Failed after {:?}", elapsed);
    eprintln!("Error: {}", error);
    if !backtrace.is_empty() && !backtrace.contains("disabled") {
        eprintln!("\nBacktrace:\n{}", backtrace);
    }
    eprintln!("=====================================================\n");

    panic!("Test failed. Error: {}", error);
}

/// A fresh store and registry. Clones share both.
#[derive(Clone)]
pub struct TestContext {
    store: InMemoryStore,
    registry: ViewRegistry,
}

impl TestContext {
    pub fn new(store: InMemoryStore, registry: ViewRegistry) -> Self {
        Self { store, registry }
    }

    pub fn store(&self) -> InMemoryStore {
        self.store.clone()
    }

    pub fn registry(&self) -> ViewRegistry {
        self.registry.clone()
    }
}

/// Live registry over a store seeded with [sample_listings].
pub fn create_test_context() -> ViewResult<TestContext> {
    let store = seeded_store()?;
    let registry = ViewRegistry::new(RecordStore::new(store.clone()));
    Ok(TestContext::new(store, registry))
}

/// Cached registry over a store seeded with [sample_listings].
pub fn create_cached_test_context() -> ViewResult<TestContext> {
    let store = seeded_store()?;
    let registry = ViewRegistry::builder(RecordStore::new(store.clone()))
        .cache_mode(CacheMode::Cached)
        .build()?;
    Ok(TestContext::new(store, registry))
}

/// Strict registry over a store seeded with [sample_listings].
pub fn create_strict_test_context() -> ViewResult<TestContext> {
    let store = seeded_store()?;
    let registry = ViewRegistry::builder(RecordStore::new(store.clone()))
        .strict_field_usage(true)
        .build()?;
    Ok(TestContext::new(store, registry))
}

/// Live registry over an empty store.
pub fn create_empty_test_context() -> ViewResult<TestContext> {
    let store = InMemoryStore::new();
    let registry = ViewRegistry::new(RecordStore::new(store.clone()));
    Ok(TestContext::new(store, registry))
}

/// Drops every view and collection of the context.
pub fn cleanup(ctx: TestContext) -> ViewResult<()> {
    let registry = ctx.registry();
    for name in registry.view_names() {
        registry.drop_view(&name)?;
    }

    let store = ctx.store();
    for collection in store.collection_names()? {
        store.drop_collection(&collection);
    }
    Ok(())
}

fn seeded_store() -> ViewResult<InMemoryStore> {
    let store = InMemoryStore::new();
    store.insert_many(LISTINGS, sample_listings())?;
    Ok(store)
}

/// Builds a listing shaped like the Airbnb sample data set.
pub fn listing(
    id: &str,
    name: &str,
    property_type: &str,
    accommodates: i64,
    cleanliness: i64,
    price: f64,
) -> Document {
    doc! {
        _id: id,
        name: name,
        property_type: property_type,
        accommodates: accommodates,
        address: { market: "Porto", country_code: "PT" },
        review_scores: { review_scores_cleanliness: cleanliness, review_scores_rating: 90 },
        price: price,
    }
}

pub fn sample_listings() -> Vec<Document> {
    vec![
        listing("10006546", "Ribeira Charming Duplex", "House", 8, 9, 80.0),
        listing("10009999", "Horto flat with small garden", "Apartment", 4, 10, 317.0),
        listing("1001265", "Ocean View Waikiki Marina", "Condominium", 2, 10, 115.0),
        listing("10021707", "Private Room in Bushwick", "Apartment", 1, 10, 40.0),
        listing("10030955", "Apt Linda Vista Lagoa", "Apartment", 6, 10, 701.0),
        listing("1003530", "New York City - Upper West Side Apt", "Apartment", 5, 10, 135.0),
        listing("10038496", "Copacabana Apartment Posto 6", "Apartment", 5, 9, 119.0),
        listing("10047964", "Charming Flat in Downtown Moda", "House", 6, 10, 527.0),
        listing("10051164", "Catete's Colonial Big Hause Room", "Apartment", 8, 10, 135.0),
    ]
}

/// Names of the listings, in order. Documents without a string name yield an empty string.
pub fn names(documents: &[Document]) -> Vec<String> {
    documents
        .iter()
        .map(|d| match d.get("name") {
            Ok(value) => value.as_string().cloned().unwrap_or_default(),
            Err(_) => String::new(),
        })
        .collect()
}
