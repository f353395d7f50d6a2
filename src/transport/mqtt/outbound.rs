//! Store-and-forward queue between callers and the MQTT session
//!
//! Callers' publish/subscribe/unsubscribe requests land here first. The
//! supervisor forwards them to rumqttc only while the session is connected,
//! in the order they were accepted. Requests the transport cannot take right
//! now stay at the head of the queue and are retried on the next flush.

use crate::protocol::{OutgoingMessage, TopicFilter};
use rumqttc::v5::mqttbytes::v5::Filter;
use rumqttc::v5::mqttbytes::QoS;
use rumqttc::v5::{AsyncClient, ClientError};
use std::collections::{BTreeMap, VecDeque};
use std::fmt;
use tracing::{debug, warn};

/// A request waiting to be handed to the session
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Publish(OutgoingMessage),
    Subscribe(Vec<TopicFilter>),
    Unsubscribe(String),
}

/// Non-blocking request intake of an MQTT client
pub trait RequestSink {
    type Error: fmt::Display;

    fn try_publish(&self, message: &OutgoingMessage) -> Result<(), Self::Error>;

    fn try_subscribe(&self, filters: &[TopicFilter]) -> Result<(), Self::Error>;

    fn try_unsubscribe(&self, topic: &str) -> Result<(), Self::Error>;
}

impl RequestSink for AsyncClient {
    type Error = ClientError;

    fn try_publish(&self, message: &OutgoingMessage) -> Result<(), ClientError> {
        AsyncClient::try_publish(
            self,
            message.topic.clone(),
            message.qos,
            message.retain,
            message.payload.clone(),
        )
    }

    fn try_subscribe(&self, filters: &[TopicFilter]) -> Result<(), ClientError> {
        AsyncClient::try_subscribe_many(
            self,
            filters
                .iter()
                .map(|f| Filter::new(f.filter.clone(), f.qos))
                .collect::<Vec<_>>(),
        )
    }

    fn try_unsubscribe(&self, topic: &str) -> Result<(), ClientError> {
        AsyncClient::try_unsubscribe(self, topic.to_string())
    }
}

/// Filters the session has asked the broker for, re-issued after reconnects
#[derive(Debug, Default, Clone)]
pub struct SubscriptionSet {
    filters: BTreeMap<String, QoS>,
}

impl SubscriptionSet {
    pub fn record(&mut self, filters: &[TopicFilter]) {
        for f in filters {
            self.filters.insert(f.filter.clone(), f.qos);
        }
    }

    pub fn remove(&mut self, filter: &str) {
        self.filters.remove(filter);
    }

    pub fn contains(&self, filter: &str) -> bool {
        self.filters.contains_key(filter)
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// One subscribe request covering every tracked filter, if any
    pub fn resubscribe(&self) -> Option<Command> {
        if self.filters.is_empty() {
            return None;
        }
        Some(Command::Subscribe(
            self.filters
                .iter()
                .map(|(filter, qos)| TopicFilter::new(filter.clone()).with_qos(*qos))
                .collect(),
        ))
    }
}

/// FIFO backlog of requests not yet handed to the session
#[derive(Debug, Default)]
pub struct OutboundQueue {
    pending: VecDeque<Command>,
}

impl OutboundQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_back(&mut self, command: Command) {
        self.pending.push_back(command);
    }

    /// Jump the queue; used for the presence record and resubscriptions
    pub fn push_front(&mut self, command: Command) {
        self.pending.push_front(command);
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Command> {
        self.pending.iter()
    }

    /// Forward queued requests in order until the queue is empty or the sink
    /// refuses one. Returns how many were forwarded.
    pub fn flush<S: RequestSink>(&mut self, sink: &S, subscriptions: &mut SubscriptionSet) -> usize {
        let mut forwarded = 0;

        while let Some(command) = self.pending.pop_front() {
            let result = match &command {
                Command::Publish(message) => sink.try_publish(message),
                Command::Subscribe(filters) => sink.try_subscribe(filters),
                Command::Unsubscribe(topic) => sink.try_unsubscribe(topic),
            };

            if let Err(e) = result {
                warn!(error = %e, backlog = self.pending.len() + 1, "MQTT request not accepted, will retry");
                self.pending.push_front(command);
                break;
            }

            match &command {
                Command::Subscribe(filters) => subscriptions.record(filters),
                Command::Unsubscribe(topic) => subscriptions.remove(topic),
                Command::Publish(_) => {}
            }
            forwarded += 1;
        }

        if forwarded > 0 {
            debug!(forwarded, backlog = self.pending.len(), "Flushed outbound queue");
        }
        forwarded
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    /// Records accepted requests; refuses everything after `capacity`
    #[derive(Default)]
    struct RecordingSink {
        accepted: RefCell<Vec<String>>,
        capacity: Option<usize>,
    }

    impl RecordingSink {
        fn with_capacity(capacity: usize) -> Self {
            Self {
                capacity: Some(capacity),
                ..Default::default()
            }
        }

        fn accept(&self, entry: String) -> Result<(), String> {
            let mut accepted = self.accepted.borrow_mut();
            if self.capacity.is_some_and(|c| accepted.len() >= c) {
                return Err("request channel full".to_string());
            }
            accepted.push(entry);
            Ok(())
        }
    }

    impl RequestSink for RecordingSink {
        type Error = String;

        fn try_publish(&self, message: &OutgoingMessage) -> Result<(), String> {
            self.accept(format!(
                "pub {} {}",
                message.topic,
                String::from_utf8_lossy(&message.payload)
            ))
        }

        fn try_subscribe(&self, filters: &[TopicFilter]) -> Result<(), String> {
            let names: Vec<_> = filters.iter().map(|f| f.filter.as_str()).collect();
            self.accept(format!("sub {}", names.join(",")))
        }

        fn try_unsubscribe(&self, topic: &str) -> Result<(), String> {
            self.accept(format!("unsub {topic}"))
        }
    }

    fn publish(topic: &str, payload: &'static str) -> Command {
        Command::Publish(OutgoingMessage::new(topic, payload))
    }

    #[test]
    fn test_flush_preserves_enqueue_order() {
        let mut queue = OutboundQueue::new();
        let mut subscriptions = SubscriptionSet::default();
        queue.push_back(publish("a", "1"));
        queue.push_back(publish("a", "2"));

        let sink = RecordingSink::default();
        assert_eq!(queue.flush(&sink, &mut subscriptions), 2);
        assert_eq!(*sink.accepted.borrow(), vec!["pub a 1", "pub a 2"]);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_refused_request_stays_at_head() {
        let mut queue = OutboundQueue::new();
        let mut subscriptions = SubscriptionSet::default();
        for payload in ["1", "2", "3"] {
            queue.push_back(publish("a", payload));
        }

        let full = RecordingSink::with_capacity(1);
        assert_eq!(queue.flush(&full, &mut subscriptions), 1);
        assert_eq!(queue.len(), 2);

        let sink = RecordingSink::default();
        queue.flush(&sink, &mut subscriptions);
        assert_eq!(*sink.accepted.borrow(), vec!["pub a 2", "pub a 3"]);
    }

    #[test]
    fn test_push_front_jumps_backlog() {
        let mut queue = OutboundQueue::new();
        let mut subscriptions = SubscriptionSet::default();
        queue.push_back(publish("a", "queued"));
        queue.push_front(publish("node/connected", "online"));

        let sink = RecordingSink::default();
        queue.flush(&sink, &mut subscriptions);
        assert_eq!(
            *sink.accepted.borrow(),
            vec!["pub node/connected online", "pub a queued"]
        );
    }

    #[test]
    fn test_subscriptions_tracked_when_forwarded() {
        let mut queue = OutboundQueue::new();
        let mut subscriptions = SubscriptionSet::default();
        queue.push_back(Command::Subscribe(vec![
            TopicFilter::new("x/set"),
            TopicFilter::new("y/set"),
        ]));
        queue.push_back(Command::Unsubscribe("x/set".to_string()));

        // Nothing is tracked until the broker request actually goes out
        let refused = RecordingSink::with_capacity(0);
        queue.flush(&refused, &mut subscriptions);
        assert!(subscriptions.is_empty());

        queue.flush(&RecordingSink::default(), &mut subscriptions);
        assert_eq!(subscriptions.len(), 1);
        assert!(subscriptions.contains("y/set"));
        assert!(!subscriptions.contains("x/set"));
    }

    #[test]
    fn test_resubscribe_covers_all_filters() {
        let mut subscriptions = SubscriptionSet::default();
        assert!(subscriptions.resubscribe().is_none());

        subscriptions.record(&[
            TopicFilter::new("b/set"),
            TopicFilter::new("a/set").with_qos(QoS::ExactlyOnce),
        ]);

        match subscriptions.resubscribe() {
            Some(Command::Subscribe(filters)) => {
                assert_eq!(filters.len(), 2);
                assert_eq!(filters[0].filter, "a/set");
                assert_eq!(filters[0].qos, QoS::ExactlyOnce);
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
