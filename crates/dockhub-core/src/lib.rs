//! dockhub-core: data model and the discovery-to-view pipeline.
//!
//! Nothing in this crate performs I/O. The enumerator and the metadata
//! store live in their own crates; this one turns their output into a
//! categorized, partitioned catalog.

pub mod aggregate;
pub mod catalog;
pub mod config;
pub mod exclusion;
pub mod ports;
pub mod resolve;
pub mod types;

pub use aggregate::{Aggregated, CategoryGroup, aggregate};
pub use catalog::{Catalog, build_catalog};
pub use config::{ConfigError, EnvLookup, HubConfig, ViewSettings, process_env};
pub use exclusion::{ExclusionRules, Placement};
pub use ports::{client_host, extract_ports};
pub use resolve::{Resolver, UncategorizedDefaults};
pub use types::*;
