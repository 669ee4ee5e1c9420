//! Match specifications: the predicate evaluated by match stages.
//!
//! A [MatchSpec] is a conjunction of conditions on dotted field paths. A
//! condition is either a literal equality or a comparison operator.
//!
//! # Creating Specs
//!
//! ```rust,ignore
//! use docview::filter::{field, MatchSpec};
//!
//! let spec = MatchSpec::new()
//!     .and(field("property_type").eq("Apartment"))
//!     .and(field("accommodates").gt(4));
//!
//! let spec = MatchSpec::from_json(&serde_json::json!({
//!     "property_type": "Apartment",
//!     "accommodates": { "$gt": 4 }
//! }))?;
//! ```
//!
//! # Supported Operators
//!
//! - **Equality**: `eq`, `ne` (strict, no coercion between kinds)
//! - **Comparison**: `gt`, `gte`, `lt`, `lte` (same-kind values only)

mod condition;
mod fluent;
mod match_spec;

pub use condition::*;
pub use fluent::*;
pub use match_spec::*;
