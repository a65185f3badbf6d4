//! Repository layer: raw SQL against the producers table.
//!
//! Functions here perform no validation; `crate::store::RecordStore` owns the
//! name rules and is the only caller outside tests.

mod producer;

pub use producer::*;
