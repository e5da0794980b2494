//! Connection state machine: `New -> Versioned -> Ready <-> Streaming`,
//! with a sticky `Failed` substate and a terminal `Closed`.

/// The lifecycle state of one Bolt connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    New,
    Versioned,
    Ready,
    Streaming,
    Failed,
    Closed,
}

impl ConnectionState {
    pub fn name(self) -> &'static str {
        match self {
            ConnectionState::New => "NEW",
            ConnectionState::Versioned => "VERSIONED",
            ConnectionState::Ready => "READY",
            ConnectionState::Streaming => "STREAMING",
            ConnectionState::Failed => "FAILED",
            ConnectionState::Closed => "CLOSED",
        }
    }

    /// True once the handshake has selected a protocol version.
    pub fn is_versioned(self) -> bool {
        !matches!(self, ConnectionState::New)
    }
}

impl std::fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A server message tag observed in the READY/STREAMING/FAILED machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerOutcome {
    Success,
    Record,
    Ignored,
    Failure,
}

impl ConnectionState {
    /// Advance the state machine on a client message name, following the
    /// request side of the READY/STREAMING/FAILED cycle.
    pub fn on_client_message(self, name: &str) -> ConnectionState {
        match (self, name) {
            (ConnectionState::Failed, "ACK_FAILURE") => ConnectionState::Ready,
            (ConnectionState::Failed, "RESET") => ConnectionState::Ready,
            (ConnectionState::Failed, _) => ConnectionState::Failed,
            (ConnectionState::Ready, "RUN") => ConnectionState::Streaming,
            (ConnectionState::Streaming, "RESET") => ConnectionState::Ready,
            (state, _) => state,
        }
    }

    /// Advance the state machine on a server response outcome.
    pub fn on_server_outcome(self, outcome: ServerOutcome) -> ConnectionState {
        match outcome {
            ServerOutcome::Failure => ConnectionState::Failed,
            ServerOutcome::Record => ConnectionState::Streaming,
            ServerOutcome::Success | ServerOutcome::Ignored => {
                if self == ConnectionState::Failed {
                    ConnectionState::Failed
                } else {
                    ConnectionState::Ready
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_enters_streaming() {
        assert_eq!(
            ConnectionState::Ready.on_client_message("RUN"),
            ConnectionState::Streaming
        );
    }

    #[test]
    fn failure_is_sticky_until_reset_or_ack() {
        let failed = ConnectionState::Ready.on_server_outcome(ServerOutcome::Failure);
        assert_eq!(failed, ConnectionState::Failed);
        assert_eq!(failed.on_client_message("RUN"), ConnectionState::Failed);
        assert_eq!(failed.on_client_message("RESET"), ConnectionState::Ready);
    }

    #[test]
    fn record_keeps_streaming() {
        assert_eq!(
            ConnectionState::Streaming.on_server_outcome(ServerOutcome::Record),
            ConnectionState::Streaming
        );
    }
}
