mod connection;
mod state;
#[cfg(test)]
pub(crate) mod testing;

use std::time::Duration;

use tracing::{debug, error, info, warn};

use crate::buffer::RECV_CHUNK_SIZE;
use crate::dispatch::{self, CtcpPolicy, Events};
use crate::error::{TwircError, TwircResult};
use crate::message::parse_message;
use crate::reactor::Readiness;
use crate::transport::{Connector, IpFamily, TcpConnector};

pub use connection::{Connection, Login};
use connection::Received;
pub use state::{Status, Transition};

/// A single chat connection driven by [`Session::tick`] or [`Session::run`].
///
/// ```no_run
/// use std::time::Duration;
/// use twirc::Session;
///
/// let mut session = Session::new()?;
/// session.events_mut().welcome = Box::new(|conn, _| {
///     let _ = conn.join("#somechannel");
/// });
/// session.events_mut().privmsg = Box::new(|_, msg| {
///     println!("{:?}: {:?}", msg.nick, msg.trailing());
/// });
/// session.connect("irc.chat.twitch.tv", 6667, "oauth:token", "mybot")?;
/// session.run(Some(Duration::from_millis(1000)))?;
/// # Ok::<(), twirc::TwircError>(())
/// ```
pub struct Session {
    conn: Connection,
    events: Events,
    ctcp: CtcpPolicy,
}

impl Session {
    pub fn new() -> TwircResult<Self> {
        Self::with_connector(Box::new(TcpConnector))
    }

    pub fn with_connector(connector: Box<dyn Connector>) -> TwircResult<Self> {
        Ok(Self {
            conn: Connection::new(connector)?,
            events: Events::default(),
            ctcp: CtcpPolicy::default(),
        })
    }

    pub fn set_ip_family(&mut self, family: IpFamily) {
        self.conn.family = family;
    }

    pub fn set_ctcp_policy(&mut self, policy: CtcpPolicy) {
        self.ctcp = policy;
    }

    pub fn events_mut(&mut self) -> &mut Events {
        &mut self.events
    }

    pub fn set_events(&mut self, events: Events) {
        self.events = events;
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub fn connection_mut(&mut self) -> &mut Connection {
        &mut self.conn
    }

    pub fn status(&self) -> Status {
        self.conn.status()
    }

    pub fn is_connected(&self) -> bool {
        self.conn.is_connected()
    }

    pub fn is_logged_in(&self) -> bool {
        self.conn.is_logged_in()
    }

    /// Starts connecting and returns right away; the handshake happens in
    /// later ticks.
    pub fn connect(&mut self, host: &str, port: u16, token: &str, nick: &str) -> TwircResult<()> {
        info!("Connecting to {}:{} as {}", host, port, nick);
        self.conn.open(host, port, token, nick)
    }

    pub fn disconnect(&mut self) -> TwircResult<()> {
        self.conn.disconnect()
    }

    pub fn stop(&mut self) {
        self.conn.stop();
    }

    /// Waits up to `timeout` for the socket and handles whatever is ready.
    ///
    /// Errors returned here mean the connection is gone: the status is
    /// already `Disconnected` and reconnecting is up to the caller.
    pub fn tick(&mut self, timeout: Option<Duration>) -> TwircResult<()> {
        if self.conn.transport.is_none() {
            return Err(TwircError::NotConnected);
        }

        let readiness = match self.conn.reactor.wait(timeout) {
            Ok(readiness) => readiness,
            Err(e) => {
                error!("Waiting for socket events failed: {}", e);
                let err = TwircError::Reactor(e);
                self.lose_connection(&err);
                return Err(err);
            }
        };

        if readiness.is_empty() {
            return Ok(());
        }
        self.handle_readiness(readiness)
    }

    /// Calls [`Session::tick`] until stopped or the connection fails.
    pub fn run(&mut self, timeout: Option<Duration>) -> TwircResult<()> {
        self.conn.running = true;
        while self.conn.running {
            self.tick(timeout)?;
        }
        Ok(())
    }

    /// Reacts to one readiness report. `tick` feeds this from the reactor.
    pub fn handle_readiness(&mut self, readiness: Readiness) -> TwircResult<()> {
        let result = self.process_readiness(readiness);
        if let Err(ref e) = result {
            self.lose_connection(e);
        }
        result
    }

    fn process_readiness(&mut self, readiness: Readiness) -> TwircResult<()> {
        // Callbacks may replace the socket; the rest of this report is about the old one
        let generation = self.conn.generation;
        if readiness.writable {
            self.on_writable()?;
        }
        if readiness.readable && self.conn.is_current(generation) {
            self.on_readable(generation)?;
        }
        if !self.conn.is_current(generation) {
            return Ok(());
        }
        if readiness.hangup {
            return Err(TwircError::ConnectionLost("peer closed the connection".into()));
        }
        if readiness.error {
            return Err(TwircError::ConnectionLost("socket error".into()));
        }
        Ok(())
    }

    fn on_writable(&mut self) -> TwircResult<()> {
        if self.conn.status != Status::Connecting {
            return Ok(());
        }
        let Some(transport) = self.conn.transport.as_mut() else {
            return Err(TwircError::NotConnected);
        };
        if !transport.finish_connect()? {
            debug!("Connect still in progress");
            return Ok(());
        }

        info!("Connection established");
        self.conn.transition(Transition::Established)?;
        self.conn.begin_handshake()?;
        (self.events.connect)(&mut self.conn);
        Ok(())
    }

    fn on_readable(&mut self, generation: u64) -> TwircResult<()> {
        let mut chunk = [0u8; RECV_CHUNK_SIZE];
        while self.conn.is_current(generation) {
            match self.conn.receive(&mut chunk)? {
                Received::Data(n) => {
                    let lines = self.conn.buffer.feed(&chunk[..n])?;
                    for line in lines {
                        if !self.conn.is_current(generation) {
                            debug!("Dropping input from a closed connection");
                            return Ok(());
                        }
                        self.process_line(&line);
                    }
                }
                Received::WouldBlock => break,
                Received::Closed => {
                    return Err(TwircError::ConnectionLost("end of stream".into()));
                }
            }
        }
        Ok(())
    }

    fn process_line(&mut self, line: &str) {
        debug!("> {}", line);
        let message = match parse_message(line) {
            Ok(message) => message,
            Err(e) => {
                warn!("Skipping line {:?}: {}", line, e);
                return;
            }
        };
        if let Err(e) = dispatch::dispatch(&mut self.conn, &mut self.events, self.ctcp, &message) {
            warn!("Error handling {}: {}", message.command, e);
        }
    }

    fn lose_connection(&mut self, reason: &TwircError) {
        let was_connected = self.conn.transport.is_some();
        warn!("Connection lost: {}", reason);
        self.conn.teardown(Transition::Lost);
        if was_connected {
            (self.events.disconnect)(&mut self.conn);
        }
    }
}
