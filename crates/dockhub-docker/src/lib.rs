//! dockhub-docker: container enumeration.
//!
//! The catalog only needs "what is running right now", so enumeration is a
//! single call that never fails: a missing binary, a non-zero exit or a
//! timeout all degrade to an empty list and a log line.

pub mod cli;
pub mod parse;

use async_trait::async_trait;
use dockhub_core::ContainerRecord;

pub use cli::DockerCli;
pub use parse::parse_ps_output;

/// Anything that can list running containers.
#[async_trait]
pub trait ContainerSource: Send + Sync {
    async fn list_containers(&self) -> Vec<ContainerRecord>;
}

/// A fixed container list, for tests and offline rendering.
#[derive(Debug, Clone, Default)]
pub struct StaticContainers {
    records: Vec<ContainerRecord>,
}

impl StaticContainers {
    pub fn new(records: Vec<ContainerRecord>) -> Self {
        Self { records }
    }
}

#[async_trait]
impl ContainerSource for StaticContainers {
    async fn list_containers(&self) -> Vec<ContainerRecord> {
        self.records.clone()
    }
}
