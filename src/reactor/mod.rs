use std::io;
use std::ops::{BitOr, BitOrAssign};
use std::time::Duration;

use mio::event::{Event, Source};
use mio::{Events, Interest, Poll, Token};
use tracing::trace;

const SOCKET: Token = Token(0);
const EVENT_CAPACITY: usize = 8;

/// What became ready on the socket since the last wait.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Readiness {
    pub readable: bool,
    pub writable: bool,
    pub hangup: bool,
    pub error: bool,
}

impl Readiness {
    pub const READABLE: Readiness = Readiness {
        readable: true,
        writable: false,
        hangup: false,
        error: false,
    };

    pub const WRITABLE: Readiness = Readiness {
        readable: false,
        writable: true,
        hangup: false,
        error: false,
    };

    pub const HANGUP: Readiness = Readiness {
        readable: false,
        writable: false,
        hangup: true,
        error: false,
    };

    pub const ERROR: Readiness = Readiness {
        readable: false,
        writable: false,
        hangup: false,
        error: true,
    };

    pub fn is_empty(&self) -> bool {
        !(self.readable || self.writable || self.hangup || self.error)
    }
}

impl BitOr for Readiness {
    type Output = Readiness;

    fn bitor(self, rhs: Readiness) -> Readiness {
        Readiness {
            readable: self.readable || rhs.readable,
            writable: self.writable || rhs.writable,
            hangup: self.hangup || rhs.hangup,
            error: self.error || rhs.error,
        }
    }
}

impl BitOrAssign for Readiness {
    fn bitor_assign(&mut self, rhs: Readiness) {
        *self = *self | rhs;
    }
}

impl From<&Event> for Readiness {
    fn from(event: &Event) -> Self {
        Readiness {
            readable: event.is_readable(),
            writable: event.is_writable(),
            hangup: event.is_read_closed() || event.is_write_closed(),
            error: event.is_error(),
        }
    }
}

/// Edge-triggered readiness for a single socket.
///
/// Notifications are not repeated: after a readable edge the caller has to
/// read until `WouldBlock` or it will not hear about that data again.
pub struct Reactor {
    poll: Poll,
    events: Events,
}

impl Reactor {
    pub fn new() -> io::Result<Self> {
        Ok(Self {
            poll: Poll::new()?,
            events: Events::with_capacity(EVENT_CAPACITY),
        })
    }

    pub fn register<S: Source + ?Sized>(&mut self, source: &mut S) -> io::Result<()> {
        self.poll
            .registry()
            .register(source, SOCKET, Interest::READABLE | Interest::WRITABLE)
    }

    pub fn deregister<S: Source + ?Sized>(&mut self, source: &mut S) -> io::Result<()> {
        self.poll.registry().deregister(source)
    }

    /// Blocks for at most `timeout` (`None` waits indefinitely) and returns
    /// the merged readiness of the registered socket, empty on timeout.
    pub fn wait(&mut self, timeout: Option<Duration>) -> io::Result<Readiness> {
        match self.poll.poll(&mut self.events, timeout) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::Interrupted => return Ok(Readiness::default()),
            Err(e) => return Err(e),
        }

        let mut readiness = Readiness::default();
        for event in self.events.iter().filter(|event| event.token() == SOCKET) {
            readiness |= Readiness::from(event);
        }
        if !readiness.is_empty() {
            trace!("Socket ready: {:?}", readiness);
        }
        Ok(readiness)
    }
}
