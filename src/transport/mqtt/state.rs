//! Pure session state transitions

use super::connection::ConnectionState;
use tracing::{debug, info, warn};

/// Things that happen to the session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// Supervisor started its first connect attempt
    Started,
    /// Broker acknowledged a (re)connect
    ConnAckReceived,
    /// Transport dropped or a connect attempt failed
    TransportLost(String),
    /// Explicit shutdown completed
    ShutDown,
}

pub struct SessionStateMachine;

impl SessionStateMachine {
    /// Next state after `event`
    ///
    /// Once shut down the session stays `Disconnected`; late acknowledgements
    /// or errors do not revive it.
    pub fn next_state(current: ConnectionState, event: &SessionEvent) -> ConnectionState {
        match (current, event) {
            (_, SessionEvent::ShutDown) => ConnectionState::Disconnected,
            (ConnectionState::Disconnected, SessionEvent::Started) => ConnectionState::Connecting,
            (state, SessionEvent::Started) => state,
            (ConnectionState::Disconnected, _) => ConnectionState::Disconnected,
            (_, SessionEvent::ConnAckReceived) => ConnectionState::Connected,
            (_, SessionEvent::TransportLost(_)) => ConnectionState::Connecting,
        }
    }

    /// Queued work may be handed to the transport
    pub fn can_flush(state: ConnectionState) -> bool {
        state == ConnectionState::Connected
    }

    pub fn log_transition(from: ConnectionState, to: ConnectionState, event: &SessionEvent) {
        match (from, to, event) {
            (ConnectionState::Connecting, ConnectionState::Connected, _) => {
                info!("MQTT session established");
            }
            (ConnectionState::Connected, ConnectionState::Connecting, SessionEvent::TransportLost(reason)) => {
                warn!(%reason, "MQTT session lost, reconnecting");
            }
            (ConnectionState::Connecting, ConnectionState::Connecting, SessionEvent::TransportLost(reason)) => {
                debug!(%reason, "MQTT connect attempt failed");
            }
            (_, ConnectionState::Disconnected, SessionEvent::ShutDown) => {
                info!("MQTT session closed");
            }
            _ => {
                debug!(%from, %to, ?event, "MQTT state transition");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lost() -> SessionEvent {
        SessionEvent::TransportLost("connection refused".to_string())
    }

    #[test]
    fn test_lifecycle() {
        let mut state = ConnectionState::Disconnected;
        for (event, expected) in [
            (SessionEvent::Started, ConnectionState::Connecting),
            (lost(), ConnectionState::Connecting),
            (SessionEvent::ConnAckReceived, ConnectionState::Connected),
            (lost(), ConnectionState::Connecting),
            (SessionEvent::ConnAckReceived, ConnectionState::Connected),
            (SessionEvent::ShutDown, ConnectionState::Disconnected),
        ] {
            state = SessionStateMachine::next_state(state, &event);
            assert_eq!(state, expected, "after {event:?}");
        }
    }

    #[test]
    fn test_shut_down_session_stays_down() {
        let down = ConnectionState::Disconnected;
        assert_eq!(
            SessionStateMachine::next_state(down, &SessionEvent::ConnAckReceived),
            down
        );
        assert_eq!(SessionStateMachine::next_state(down, &lost()), down);
    }

    #[test]
    fn test_started_twice_is_ignored() {
        assert_eq!(
            SessionStateMachine::next_state(ConnectionState::Connected, &SessionEvent::Started),
            ConnectionState::Connected
        );
    }

    #[test]
    fn test_can_flush_only_when_connected() {
        assert!(SessionStateMachine::can_flush(ConnectionState::Connected));
        assert!(!SessionStateMachine::can_flush(ConnectionState::Connecting));
        assert!(!SessionStateMachine::can_flush(ConnectionState::Disconnected));
    }
}
