//! Handshake state machine.

/// State of one handshake session.
///
/// `Idle → Listening → (Authorized | Denied | TimedOut) → Closed`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum HandshakeState {
    #[default]
    Idle,
    /// Listener bound, waiting for the browser callback.
    Listening,
    /// Callback carried an address and the record was persisted.
    Authorized { address: String },
    /// Callback was malformed or the record could not be persisted.
    Denied { reason: String },
    /// No callback arrived before the deadline.
    TimedOut,
    /// Listener shut down and port released.
    Closed,
}

impl HandshakeState {
    /// Returns `true` once the outcome of the handshake is known.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            HandshakeState::Authorized { .. }
                | HandshakeState::Denied { .. }
                | HandshakeState::TimedOut
                | HandshakeState::Closed
        )
    }
}
