//! In-memory transport for tests
//!
//! Records everything handed to it instead of talking to a broker.

use crate::protocol::{OutgoingMessage, TopicBuilder, TopicError, TopicFilter};
use crate::transport::mqtt::MqttError;
use crate::transport::{ConnectionState, Transport};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Mock transport for testing
#[derive(Debug, Clone)]
pub struct MockTransport {
    topics: TopicBuilder,
    pub published: Arc<Mutex<Vec<OutgoingMessage>>>,
    pub subscriptions: Arc<Mutex<Vec<TopicFilter>>>,
    pub unsubscribed: Arc<Mutex<Vec<String>>>,
    pub state: ConnectionState,
    pub should_fail: bool,
}

impl MockTransport {
    /// Connected mock for `node_id`
    pub fn new(node_id: &str) -> Result<Self, TopicError> {
        Ok(Self {
            topics: TopicBuilder::new(node_id)?,
            published: Arc::default(),
            subscriptions: Arc::default(),
            unsubscribed: Arc::default(),
            state: ConnectionState::Connected,
            should_fail: false,
        })
    }

    /// Mock whose every request fails as if the manager had shut down
    pub fn with_failure(node_id: &str) -> Result<Self, TopicError> {
        Ok(Self {
            should_fail: true,
            state: ConnectionState::Disconnected,
            ..Self::new(node_id)?
        })
    }

    pub async fn published(&self) -> Vec<OutgoingMessage> {
        self.published.lock().await.clone()
    }

    pub async fn published_to(&self, topic: &str) -> Vec<OutgoingMessage> {
        self.published
            .lock()
            .await
            .iter()
            .filter(|m| m.topic == topic)
            .cloned()
            .collect()
    }

    pub async fn subscriptions(&self) -> Vec<TopicFilter> {
        self.subscriptions.lock().await.clone()
    }

    pub async fn clear_history(&self) {
        self.published.lock().await.clear();
        self.subscriptions.lock().await.clear();
        self.unsubscribed.lock().await.clear();
    }

    fn check(&self) -> Result<(), MqttError> {
        if self.should_fail {
            Err(MqttError::ShutDown)
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl Transport for MockTransport {
    type Error = MqttError;

    fn topics(&self) -> &TopicBuilder {
        &self.topics
    }

    async fn publish(&self, messages: Vec<OutgoingMessage>) -> Result<(), MqttError> {
        self.check()?;
        self.published.lock().await.extend(messages);
        Ok(())
    }

    async fn subscribe(&self, filters: Vec<TopicFilter>) -> Result<(), MqttError> {
        self.check()?;
        self.subscriptions.lock().await.extend(filters);
        Ok(())
    }

    async fn unsubscribe(&self, topics: Vec<String>) -> Result<(), MqttError> {
        self.check()?;
        self.unsubscribed.lock().await.extend(topics);
        Ok(())
    }

    fn connection_state(&self) -> ConnectionState {
        self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_records_in_order() {
        let transport = MockTransport::new("n").unwrap();
        transport
            .publish(vec![
                OutgoingMessage::new("n/a", "1"),
                OutgoingMessage::new("n/b", "2"),
            ])
            .await
            .unwrap();

        let published = transport.published().await;
        assert_eq!(published.len(), 2);
        assert_eq!(published[0].topic, "n/a");
        assert_eq!(transport.published_to("n/b").await.len(), 1);
        assert!(transport.is_connected());
    }

    #[tokio::test]
    async fn test_mock_failure() {
        let transport = MockTransport::with_failure("n").unwrap();
        assert!(transport.subscribe(vec![TopicFilter::new("x")]).await.is_err());
        assert!(!transport.is_connected());
        assert!(transport.subscriptions().await.is_empty());
    }
}
