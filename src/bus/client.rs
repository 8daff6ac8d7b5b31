use anyhow::{Context, Result};
use async_nats::Client;
use tracing::{debug, info};

use super::messages::StatusUpdate;

/// Topic names used on the bus.
#[derive(Debug, Clone)]
pub struct Topics {
    /// Inbound remote-trigger commands
    pub control: String,
    /// Outbound status events
    pub status: String,
    /// Outbound normalized search queries
    pub query: String,
}

/// Long-lived connection to the message broker.
///
/// One connection is shared by the publisher side and the remote
/// listener; the client library handles reconnection internally, so
/// there is no per-publish connect/disconnect cycle.
pub struct BusClient {
    client: Client,
    topics: Topics,
}

impl BusClient {
    /// Connect to the broker.
    pub async fn connect(url: &str, topics: Topics) -> Result<Self> {
        info!("Connecting to message bus at {}", url);

        let client = async_nats::connect(url)
            .await
            .context("Failed to connect to message bus")?;

        info!("Connected to message bus");

        Ok(Self { client, topics })
    }

    /// Publish a status event to the status topic.
    pub async fn publish_status(&self, status: StatusUpdate) -> Result<()> {
        debug!(topic = %self.topics.status, status = status.as_str(), "Publishing status");

        self.client
            .publish(self.topics.status.clone(), status.as_str().to_string().into())
            .await
            .context("Failed to publish status")?;

        Ok(())
    }

    /// Publish a search query (or the empty clearing sentinel) to the
    /// query topic.
    pub async fn publish_query(&self, query: &str) -> Result<()> {
        debug!(topic = %self.topics.query, %query, "Publishing query");

        self.client
            .publish(self.topics.query.clone(), query.to_string().into())
            .await
            .context("Failed to publish query")?;

        Ok(())
    }

    /// Subscribe to the remote control topic.
    pub async fn subscribe_control(&self) -> Result<async_nats::Subscriber> {
        info!("Subscribing to control topic {}", self.topics.control);

        let subscriber = self
            .client
            .subscribe(self.topics.control.clone())
            .await
            .context("Failed to subscribe to control topic")?;

        Ok(subscriber)
    }
}
