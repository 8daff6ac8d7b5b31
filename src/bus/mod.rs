//! Message bus integration
//!
//! One long-lived broker connection carries three topics: inbound
//! remote-control commands, outbound status events, and outbound
//! normalized search queries. The `Publisher` trait is the seam the
//! session controller publishes through.

pub mod client;
pub mod messages;

pub use client::{BusClient, Topics};
pub use messages::{ControlCommand, StatusUpdate};

use anyhow::Result;
use async_trait::async_trait;

/// Outbound event sink used by the session controller.
#[async_trait]
pub trait Publisher: Send + Sync {
    async fn publish_status(&self, status: StatusUpdate) -> Result<()>;
    async fn publish_query(&self, query: &str) -> Result<()>;
}

#[async_trait]
impl Publisher for BusClient {
    async fn publish_status(&self, status: StatusUpdate) -> Result<()> {
        BusClient::publish_status(self, status).await
    }

    async fn publish_query(&self, query: &str) -> Result<()> {
        BusClient::publish_query(self, query).await
    }
}
