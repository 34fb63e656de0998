use crate::error::{TwircError, TwircResult};

/// Connection phase of a session. Exactly one at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Status {
    #[default]
    Disconnected,
    Connecting,
    Connected,
    Authenticating,
    Authenticated,
}

/// Inputs that move a session between phases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Socket created and connect started.
    Connect,
    /// First write-readiness confirmed the connect.
    Established,
    /// Capability requests and PASS/NICK sent.
    AuthStarted,
    /// Server welcomed us (`001` or `GLOBALUSERSTATE`).
    Welcomed,
    /// Hangup, socket error, EOF or any other fatal transport failure.
    Lost,
    /// Explicit disconnect.
    Closed,
}

impl Status {
    pub fn next(self, transition: Transition) -> TwircResult<Status> {
        use Status::*;
        use Transition::*;

        match (self, transition) {
            (Disconnected, Connect) => Ok(Connecting),
            (Connecting, Established) => Ok(Connected),
            (Connected, AuthStarted) => Ok(Authenticating),
            (Authenticating, Welcomed) => Ok(Authenticated),
            (_, Lost) | (_, Closed) => Ok(Disconnected),
            (from, transition) => Err(TwircError::InvalidTransition { from, transition }),
        }
    }

    /// True once the socket is up, including while logging in and after.
    pub fn is_connected(self) -> bool {
        matches!(
            self,
            Status::Connected | Status::Authenticating | Status::Authenticated
        )
    }

    pub fn is_logged_in(self) -> bool {
        self == Status::Authenticated
    }
}
