//! Named views over source collections.
//!
//! A [ViewRegistry] binds view names to a source collection and a pipeline.
//! Registration only stores the definition; a view is materialized when it is
//! queried.
//!
//! # Example
//!
//! ```rust,ignore
//! use docview::store::{memory::InMemoryStore, RecordStore};
//! use docview::view::ViewRegistry;
//!
//! let store = InMemoryStore::new();
//! store.load_json_dump_file("sample_airbnb.json")?;
//!
//! let registry = ViewRegistry::new(RecordStore::new(store));
//! registry.create_view_from_json(r#"{
//!     "name": "topRatedApartments",
//!     "source": "listingsAndReviews",
//!     "pipeline": [
//!         { "$match": { "property_type": "Apartment", "accommodates": { "$gt": 4 } } },
//!         { "$project": { "_id": 0, "name": 1, "price": 1 } },
//!         { "$sort": { "price": -1 } }
//!     ]
//! }"#)?;
//!
//! for listing in registry.query("topRatedApartments")? {
//!     println!("{}", listing);
//! }
//! ```

mod definition;
mod materialized_view;
mod registry;

pub use definition::*;
pub use materialized_view::*;
pub use registry::*;
