//! Transport abstraction for the node's broker session
//!
//! The discovery publisher and the node runtime talk to the broker only
//! through [`Transport`], so they can run against the real
//! [`mqtt::ConnectionHandle`] or an in-memory mock in tests.

use crate::protocol::{OutgoingMessage, TopicBuilder, TopicFilter};

pub mod mqtt;

pub use mqtt::ConnectionState;

/// Publish/subscribe surface of a broker session
///
/// Calls hand work off to the session and return; none of them waits for the
/// broker. Implementations must accept calls while disconnected and deliver
/// them once connectivity is restored.
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Topic layout for the node this session belongs to
    fn topics(&self) -> &TopicBuilder;

    /// Queue messages for delivery, in order
    async fn publish(&self, messages: Vec<OutgoingMessage>) -> Result<(), Self::Error>;

    async fn subscribe(&self, filters: Vec<TopicFilter>) -> Result<(), Self::Error>;

    async fn unsubscribe(&self, topics: Vec<String>) -> Result<(), Self::Error>;

    fn connection_state(&self) -> ConnectionState;

    fn is_connected(&self) -> bool {
        self.connection_state() == ConnectionState::Connected
    }
}
