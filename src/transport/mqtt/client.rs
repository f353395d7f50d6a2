//! Connection manager: the node's single MQTT session
//!
//! [`MqttConnection`] owns one rumqttc client/event loop pair for the life of
//! the process. A supervisor task polls the event loop, republishes the
//! presence record after every (re)connect, forwards queued requests while
//! connected and fans events out to subscribers. Callers interact through
//! cloneable [`ConnectionHandle`]s that never wait for the broker.

use super::connection::{configure_mqtt_options, ConnectionState, InstanceId, MqttError};
use super::message_handler::{EventRoute, MessageHandler};
use super::outbound::{Command, OutboundQueue, SubscriptionSet};
use super::presence;
use super::state::{SessionEvent, SessionStateMachine};
use crate::config::MqttSection;
use crate::mqtt_span;
use crate::protocol::{
    validate_topic_filter, validate_topic_name, InboundMessage, OutgoingMessage, TopicBuilder,
    TopicFilter,
};
use crate::transport::Transport;
use async_trait::async_trait;
use rumqttc::v5::{AsyncClient, Event, EventLoop};
use std::future::Future;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn, Instrument};

/// How long a clean shutdown waits for the DISCONNECT to go out
const DISCONNECT_TIMEOUT: Duration = Duration::from_secs(2);

/// Lifecycle and message events broadcast to subscribers
#[derive(Debug, Clone)]
pub enum ConnectionEvent {
    /// Session acknowledged and presence record queued
    Connected,
    /// Session lost, a connect attempt failed, or the manager shut down
    Disconnected {
        reason: String,
        /// The session was up before this event
        was_connected: bool,
    },
    /// Message arrived on a subscribed topic
    Message(InboundMessage),
}

/// Owner of the node's MQTT session
///
/// Dropping it without calling [`shutdown`](Self::shutdown) aborts the
/// session without a DISCONNECT, so the broker publishes the last will.
pub struct MqttConnection {
    handle: ConnectionHandle,
    events_tx: broadcast::Sender<ConnectionEvent>,
    shutdown_tx: watch::Sender<bool>,
    supervisor: Option<Supervisor>,
    task: Option<JoinHandle<()>>,
}

impl MqttConnection {
    /// Build the session; nothing touches the network until [`start`](Self::start)
    pub fn new(config: &MqttSection, instance: &InstanceId) -> Result<Self, MqttError> {
        let options = configure_mqtt_options(config, instance)?;
        let topics = TopicBuilder::new(config.node_id.clone())?;
        let (client, eventloop) = AsyncClient::new(options, config.request_capacity);

        let (commands_tx, commands_rx) = mpsc::unbounded_channel();
        let (state_tx, state_rx) = watch::channel(ConnectionState::Disconnected);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let (events_tx, _) = broadcast::channel(config.event_capacity);

        let supervisor = Supervisor {
            client,
            eventloop,
            topics: topics.clone(),
            client_id: instance.client_id(&config.client_id),
            reconnect_delay: Duration::from_millis(config.reconnect_delay_ms),
            commands: commands_rx,
            commands_open: true,
            queue: OutboundQueue::new(),
            subscriptions: SubscriptionSet::default(),
            state_tx,
            events_tx: events_tx.clone(),
            shutdown_rx,
        };

        Ok(Self {
            handle: ConnectionHandle {
                commands: commands_tx,
                state: state_rx,
                topics,
            },
            events_tx,
            shutdown_tx,
            supervisor: Some(supervisor),
            task: None,
        })
    }

    /// Spawn the supervisor task on the current tokio runtime
    ///
    /// Returns as soon as the task is running; connection progress is
    /// reported through events.
    pub fn start(&mut self) -> Result<(), MqttError> {
        let supervisor = self.supervisor.take().ok_or(MqttError::AlreadyStarted)?;
        let span = mqtt_span!(
            node_id = %supervisor.topics.node_id(),
            client_id = %supervisor.client_id
        );
        self.task = Some(tokio::spawn(supervisor.run().instrument(span)));
        Ok(())
    }

    pub fn handle(&self) -> ConnectionHandle {
        self.handle.clone()
    }

    pub fn topics(&self) -> &TopicBuilder {
        &self.handle.topics
    }

    pub fn state(&self) -> ConnectionState {
        self.handle.connection_state()
    }

    /// New receiver for all events broadcast from now on
    pub fn subscribe_events(&self) -> broadcast::Receiver<ConnectionEvent> {
        self.events_tx.subscribe()
    }

    /// Run `handler` for every event, each invocation in its own task
    ///
    /// Handlers run concurrently with each other and with the session's I/O;
    /// a slow handler never delays delivery of later events.
    pub fn spawn_event_handler<F, Fut>(&self, handler: F) -> JoinHandle<()>
    where
        F: Fn(ConnectionEvent) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let mut events = self.events_tx.subscribe();
        tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(event) => {
                        tokio::spawn(handler(event));
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!(skipped, "Event handler fell behind, events dropped");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        })
    }

    /// Close the session cleanly and stop the supervisor
    ///
    /// Sends DISCONNECT, so the broker discards the last will.
    pub async fn shutdown(mut self) -> Result<(), MqttError> {
        let _ = self.shutdown_tx.send(true);

        let Some(task) = self.task.take() else {
            // Never started: nothing was ever connected
            return Ok(());
        };

        match task.await {
            Ok(()) => {
                info!("Connection manager stopped");
                Ok(())
            }
            Err(e) => {
                error!("Connection supervisor ended abnormally: {}", e);
                Err(MqttError::DisconnectFailed(Box::new(e)))
            }
        }
    }
}

impl Drop for MqttConnection {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

/// Cloneable front end of the connection manager
///
/// Requests are validated, queued and handed to the supervisor; they are
/// accepted in any connection state and delivered in order once connected.
#[derive(Debug, Clone)]
pub struct ConnectionHandle {
    commands: mpsc::UnboundedSender<Command>,
    state: watch::Receiver<ConnectionState>,
    topics: TopicBuilder,
}

impl ConnectionHandle {
    fn send(&self, command: Command) -> Result<(), MqttError> {
        self.commands.send(command).map_err(|_| MqttError::ShutDown)
    }

    /// Wait until the session is connected, or give up after `timeout`
    pub async fn wait_until_connected(&self, timeout: Duration) -> Result<(), MqttError> {
        let mut state = self.state.clone();
        let connected = async move {
            state
                .wait_for(|s| *s == ConnectionState::Connected)
                .await
                .map(|_| ())
        };

        match tokio::time::timeout(timeout, connected).await {
            Ok(Ok(_)) => Ok(()),
            Ok(Err(_)) => Err(MqttError::ShutDown),
            Err(_) => Err(MqttError::Timeout {
                timeout,
                state: *self.state.borrow(),
            }),
        }
    }
}

#[async_trait]
impl Transport for ConnectionHandle {
    type Error = MqttError;

    fn topics(&self) -> &TopicBuilder {
        &self.topics
    }

    async fn publish(&self, messages: Vec<OutgoingMessage>) -> Result<(), MqttError> {
        // Reject the whole batch up front so a bad topic never blocks the queue
        for message in &messages {
            validate_topic_name(&message.topic)?;
        }
        for message in messages {
            self.send(Command::Publish(message))?;
        }
        Ok(())
    }

    async fn subscribe(&self, filters: Vec<TopicFilter>) -> Result<(), MqttError> {
        for f in &filters {
            validate_topic_filter(&f.filter)?;
        }
        if filters.is_empty() {
            return Ok(());
        }
        self.send(Command::Subscribe(filters))
    }

    async fn unsubscribe(&self, topics: Vec<String>) -> Result<(), MqttError> {
        for topic in &topics {
            validate_topic_filter(topic)?;
        }
        for topic in topics {
            self.send(Command::Unsubscribe(topic))?;
        }
        Ok(())
    }

    fn connection_state(&self) -> ConnectionState {
        *self.state.borrow()
    }
}

/// Background task owning the rumqttc event loop
struct Supervisor {
    client: AsyncClient,
    eventloop: EventLoop,
    topics: TopicBuilder,
    client_id: String,
    reconnect_delay: Duration,
    commands: mpsc::UnboundedReceiver<Command>,
    commands_open: bool,
    queue: OutboundQueue,
    subscriptions: SubscriptionSet,
    state_tx: watch::Sender<ConnectionState>,
    events_tx: broadcast::Sender<ConnectionEvent>,
    shutdown_rx: watch::Receiver<bool>,
}

impl Supervisor {
    async fn run(mut self) {
        info!(
            reconnect_delay_ms = self.reconnect_delay.as_millis() as u64,
            "Starting MQTT connection supervisor"
        );
        self.transition(SessionEvent::Started);

        loop {
            self.drain_commands();
            let connected = SessionStateMachine::can_flush(self.state());
            if connected {
                self.queue.flush(&self.client, &mut self.subscriptions);
            }
            // rumqttc holds a half-open connection inside the poll future until
            // CONNACK; cancelling it there drops the socket. Requests only wake
            // the loop once the session is up.
            let accept_commands = self.commands_open && connected;

            tokio::select! {
                biased;

                changed = self.shutdown_rx.changed() => {
                    if changed.is_err() {
                        // Owner dropped without shutdown: abandon the socket so the will fires
                        warn!("Connection manager dropped, abandoning MQTT session");
                        return;
                    }
                    if *self.shutdown_rx.borrow() {
                        info!("Shutdown signal received, stopping connection supervisor");
                        break;
                    }
                }

                polled = self.eventloop.poll() => match polled {
                    Ok(event) => self.handle_event(event),
                    Err(e) => {
                        self.handle_loss(e.to_string());
                        if !self.interruptible_sleep().await {
                            break;
                        }
                    }
                },

                command = self.commands.recv(), if accept_commands => match command {
                    Some(command) => self.queue.push_back(command),
                    None => self.commands_open = false,
                },
            }
        }

        self.disconnect_cleanly().await;
    }

    fn state(&self) -> ConnectionState {
        *self.state_tx.borrow()
    }

    /// Apply a session event; returns the state before it
    fn transition(&self, event: SessionEvent) -> ConnectionState {
        let from = self.state();
        let to = SessionStateMachine::next_state(from, &event);
        SessionStateMachine::log_transition(from, to, &event);
        self.state_tx.send_replace(to);
        from
    }

    fn emit(&self, event: ConnectionEvent) {
        // No receivers is fine: nobody is listening yet
        let _ = self.events_tx.send(event);
    }

    /// Move requests accepted by handles into the local queue
    fn drain_commands(&mut self) {
        while let Ok(command) = self.commands.try_recv() {
            self.queue.push_back(command);
        }
    }

    fn handle_event(&mut self, event: Event) {
        match MessageHandler::route_mqtt_event(&event) {
            EventRoute::ConnectionAcknowledged => self.handle_connack(),
            EventRoute::MessageReceived(message) => {
                debug!(topic = %message.topic, bytes = message.payload.len(), "Received MQTT message");
                self.emit(ConnectionEvent::Message(message));
            }
            EventRoute::DisconnectRequested { reason } => {
                warn!(%reason, "Broker is closing the session");
            }
            EventRoute::SubscriptionConfirmed { packet_id, filters } => {
                debug!(packet_id, filters, "Subscription confirmed");
            }
            EventRoute::InfrastructureEvent(event) => {
                tracing::trace!(target: "mqtt_transport", "MQTT event: {}", event);
            }
            EventRoute::OutgoingEvent => {}
        }
    }

    fn handle_connack(&mut self) {
        self.transition(SessionEvent::ConnAckReceived);

        // Presence first, then restore subscriptions, then the backlog
        if let Some(resubscribe) = self.subscriptions.resubscribe() {
            self.queue.push_front(resubscribe);
        }
        self.queue
            .push_front(Command::Publish(presence::online_message(&self.topics)));
        self.queue.flush(&self.client, &mut self.subscriptions);

        self.emit(ConnectionEvent::Connected);
    }

    fn handle_loss(&mut self, reason: String) {
        let from = self.transition(SessionEvent::TransportLost(reason.clone()));
        self.emit(ConnectionEvent::Disconnected {
            reason,
            was_connected: from == ConnectionState::Connected,
        });
    }

    /// Sleep the reconnect delay; false if shutdown was requested meanwhile
    async fn interruptible_sleep(&mut self) -> bool {
        debug!(delay_ms = self.reconnect_delay.as_millis() as u64, "Waiting before reconnect");
        tokio::select! {
            changed = self.shutdown_rx.changed() => {
                if changed.is_err() || *self.shutdown_rx.borrow() {
                    info!("Shutdown signal received during reconnect delay");
                    return false;
                }
                true
            }
            _ = tokio::time::sleep(self.reconnect_delay) => true,
        }
    }

    /// Send DISCONNECT if connected, then settle in `Disconnected`
    async fn disconnect_cleanly(&mut self) {
        let was_connected = self.state() == ConnectionState::Connected;

        if was_connected {
            self.drain_commands();
            self.queue.flush(&self.client, &mut self.subscriptions);

            match self.client.try_disconnect() {
                Ok(()) => {
                    let eventloop = &mut self.eventloop;
                    let drained = tokio::time::timeout(DISCONNECT_TIMEOUT, async {
                        loop {
                            match eventloop.poll().await {
                                // Broker closes the socket once it has the DISCONNECT
                                Ok(_) => continue,
                                Err(_) => break,
                            }
                        }
                    })
                    .await;

                    if drained.is_err() {
                        warn!("DISCONNECT not confirmed within {:?}", DISCONNECT_TIMEOUT);
                    }
                }
                Err(e) => warn!("Failed to request clean disconnect: {}", e),
            }
        }

        if !self.queue.is_empty() {
            warn!(dropped = self.queue.len(), "Discarding undelivered MQTT requests on shutdown");
        }

        self.transition(SessionEvent::ShutDown);
        self.emit(ConnectionEvent::Disconnected {
            reason: "shutdown".to_string(),
            was_connected,
        });
    }
}
