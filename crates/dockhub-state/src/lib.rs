//! dockhub-state: the metadata store.
//!
//! Holds the operator-curated service descriptors, category descriptors
//! and category order in one JSON document on disk.
//!
//! # Concurrency
//!
//! `MetadataStore` is `Clone` + `Send` + `Sync`. Every mutation performs
//! load → mutate → save while holding a single process-wide lock, and each
//! save is rejected with [`StateError::Conflict`] if the file changed
//! underneath it since the load.

pub mod error;
pub mod store;

pub use error::{StateError, StateResult};
pub use store::{MetadataStore, Move, Snapshot, Version, known_order};
