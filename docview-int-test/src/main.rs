use docview::errors::ViewResult;
use docview::store::memory::InMemoryStore;
use docview::store::RecordStore;
use docview::view::ViewRegistry;
use docview_int_test::test_util::{sample_listings, LISTINGS, TOP_RATED_APARTMENTS};
use std::env;

/// Materializes `topRatedApartments` over a database dump given as the first
/// argument, or over the built-in sample listings.
fn main() -> ViewResult<()> {
    colog::init();

    let store = InMemoryStore::new();
    match env::args().nth(1) {
        Some(path) => {
            let count = store.load_json_dump_file(&path)?;
            log::info!("Loaded {} documents from {}", count, path);
        }
        None => {
            store.insert_many(LISTINGS, sample_listings())?;
        }
    }

    let registry = ViewRegistry::new(RecordStore::new(store));
    registry.create_view_from_json(TOP_RATED_APARTMENTS)?;

    for listing in registry.query("topRatedApartments")? {
        println!("{}", listing);
    }
    Ok(())
}
