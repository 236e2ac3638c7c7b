//! Associative memory store.
//!
//! Records textual events in SQLite, links them by lexical similarity
//! into a weighted, typed connection graph, and retrieves them by
//! similarity-and-recency-weighted resonance. A maintenance pass
//! strengthens frequently accessed records, fades stale ones, and prunes
//! weak connections; a randomized dream pass injects exploratory links
//! between otherwise unrelated records.

pub mod config;
pub mod error;
pub mod json_bridge;
pub mod record;
pub mod schema;
pub mod store;
pub mod text;
pub mod time;

pub use config::{DreamConfig, StoreConfig};
pub use error::{Result, StoreError};
pub use json_bridge::{CURRENT_VERSION, ExportFile};
pub use record::{Connection, ConnectionKind, MemoryRecord};
pub use store::{EvolveStats, MemoryStore, Statistics};
