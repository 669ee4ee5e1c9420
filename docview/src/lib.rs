//! # docview - Embedded Aggregation Views
//!
//! docview materializes named views over collections of semi-structured
//! documents. A view binds a source collection to an aggregation pipeline of
//! match, project and sort stages; querying the view runs the pipeline against
//! the collection's current contents.
//!
//! ## Key Features
//!
//! - **Typed Pipelines**: stages are checked once when a view is registered
//! - **Mongo-style Specs**: `$match`/`$project`/`$sort` stages, parsed from JSON or built in code
//! - **Dotted Paths**: nested fields such as `review_scores.review_scores_cleanliness`
//! - **Live or Cached Views**: re-evaluate on every query, or keep a result until invalidated
//! - **Pluggable Stores**: any [store::RecordStoreProvider]; an in-memory store is included
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use docview::doc;
//! use docview::store::{memory::InMemoryStore, RecordStore};
//! use docview::view::ViewRegistry;
//!
//! let store = InMemoryStore::new();
//! store.insert("listingsAndReviews", doc!{
//!     name: "A",
//!     property_type: "Apartment",
//!     accommodates: 6,
//!     review_scores: { review_scores_cleanliness: 10 },
//!     price: 100,
//! })?;
//!
//! let registry = ViewRegistry::new(RecordStore::new(store));
//! registry.create_view_from_json(r#"{
//!     "name": "topRatedApartments",
//!     "source": "listingsAndReviews",
//!     "pipeline": [
//!         { "$match": { "property_type": "Apartment",
//!                       "review_scores.review_scores_cleanliness": 10,
//!                       "accommodates": { "$gt": 4 } } },
//!         { "$project": { "_id": 0, "name": 1, "price": 1 } },
//!         { "$sort": { "price": -1 } }
//!     ]
//! }"#)?;
//!
//! let listings = registry.query("topRatedApartments")?;
//! ```
//!
//! ## Module Organization
//!
//! - [`collection`] - Documents and dotted field paths
//! - [`common`] - Values, sort orders, locks and shared helpers
//! - [`errors`] - Error types and result definitions
//! - [`filter`] - Match specifications
//! - [`projection`] - Project specifications
//! - [`sort`] - Sort specifications
//! - [`pipeline`] - Pipeline definitions and the executor
//! - [`store`] - Record store abstraction and the in-memory store
//! - [`view`] - View definitions and the view registry
//! - [`view_builder`] - Registry builder
//! - [`view_config`] - Registry configuration

pub mod collection;
pub mod common;
pub mod errors;
pub mod filter;
pub mod pipeline;
pub mod projection;
pub mod sort;
pub mod store;
pub mod view;
pub mod view_builder;
pub mod view_config;

pub use collection::Document;
pub use common::{SortOrder, Value};
