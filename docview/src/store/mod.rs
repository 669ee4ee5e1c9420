//! Record stores the view engine scans.
//!
//! The engine only needs a full scan of a named collection, expressed by the
//! [RecordStoreProvider] trait. Callers pass a [RecordStore] handle to the view
//! registry; the in-memory implementation lives in [memory].

pub mod memory;
mod record_store;

pub use record_store::*;
