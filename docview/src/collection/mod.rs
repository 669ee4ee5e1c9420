//! Documents: the records views are evaluated over.
//!
//! A [Document] is an ordered map from field name to [crate::common::Value].
//! Nested fields are addressed with dotted paths (default separator: ".").
//!
//! ```rust,ignore
//! use docview::collection::Document;
//!
//! let mut doc = Document::new();
//! doc.put("name", "Ribeira Charming Duplex")?;
//! doc.put("address.market", "Porto")?;
//! doc.put("accommodates", 8)?;
//!
//! assert_eq!(doc.get("address.market")?, "Porto".into());
//! ```

mod document;

pub use document::*;
