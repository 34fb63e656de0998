use std::fmt;
use std::io;

use tracing::{debug, info, warn};

use crate::buffer::LineBuffer;
use crate::commands;
use crate::error::{TwircError, TwircResult};
use crate::ircv3::Capability;
use crate::message::Message;
use crate::reactor::Reactor;
use crate::transport::{Connector, IpFamily, Transport};

use super::state::{Status, Transition};

/// Credentials and endpoint, copied in at connect time.
#[derive(Clone)]
pub struct Login {
    pub host: String,
    pub port: u16,
    pub nick: String,
    token: String,
}

impl fmt::Debug for Login {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Login")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("nick", &self.nick)
            .field("token", &"<redacted>")
            .finish()
    }
}

pub(crate) enum Received {
    Data(usize),
    WouldBlock,
    Closed,
}

/// The live half of a session: status, socket, reactor and receive buffer.
///
/// Callbacks get a `&mut Connection` so they can reply, join channels or stop
/// the run loop while a message is being dispatched.
pub struct Connection {
    pub(crate) status: Status,
    pub(crate) running: bool,
    pub(crate) family: IpFamily,
    pub(crate) login: Option<Login>,
    pub(crate) transport: Option<Box<dyn Transport>>,
    pub(crate) reactor: Reactor,
    pub(crate) buffer: LineBuffer,
    /// Bumped on every `open`, so stale input can tell it outlived its socket.
    pub(crate) generation: u64,
    connector: Box<dyn Connector>,
}

impl Connection {
    pub(crate) fn new(connector: Box<dyn Connector>) -> TwircResult<Self> {
        Ok(Self {
            status: Status::Disconnected,
            running: false,
            family: IpFamily::default(),
            login: None,
            transport: None,
            reactor: Reactor::new().map_err(TwircError::Reactor)?,
            buffer: LineBuffer::new(),
            generation: 0,
            connector,
        })
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn is_connected(&self) -> bool {
        self.status.is_connected()
    }

    pub fn is_logged_in(&self) -> bool {
        self.status.is_logged_in()
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Ends `Session::run` after the current iteration.
    pub fn stop(&mut self) {
        self.running = false;
    }

    pub fn login(&self) -> Option<&Login> {
        self.login.as_ref()
    }

    /// True while the socket opened as `generation` is still the live one.
    pub(crate) fn is_current(&self, generation: u64) -> bool {
        self.transport.is_some() && self.generation == generation
    }

    pub(crate) fn transition(&mut self, transition: Transition) -> TwircResult<()> {
        let next = self.status.next(transition)?;
        debug!("Status {:?} -> {:?}", self.status, next);
        self.status = next;
        Ok(())
    }

    pub(crate) fn open(&mut self, host: &str, port: u16, token: &str, nick: &str) -> TwircResult<()> {
        if self.status != Status::Disconnected {
            return Err(TwircError::InvalidTransition {
                from: self.status,
                transition: Transition::Connect,
            });
        }

        let mut transport = self.connector.open(self.family, host, port)?;
        self.reactor
            .register(&mut *transport)
            .map_err(TwircError::Reactor)?;

        self.transport = Some(transport);
        self.generation += 1;
        self.login = Some(Login {
            host: host.to_string(),
            port,
            nick: nick.to_string(),
            token: token.to_string(),
        });
        self.buffer.clear();
        self.transition(Transition::Connect)
    }

    /// Sends one line, CRLF appended. A send that would block is reported,
    /// not queued.
    pub fn send_line(&mut self, line: &str) -> TwircResult<()> {
        let transport = self.transport.as_mut().ok_or(TwircError::NotConnected)?;
        let data = commands::frame(line);

        if !commands::is_sensitive(line) {
            debug!("< {}", String::from_utf8_lossy(&data[..data.len() - 2]));
        }

        let mut sent = 0;
        while sent < data.len() {
            match transport.send(&data[sent..]) {
                Ok(0) => {
                    return Err(TwircError::Io(io::Error::new(
                        io::ErrorKind::WriteZero,
                        "transport accepted no bytes",
                    )))
                }
                Ok(n) => sent += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => {
                    return Err(TwircError::SendBlocked {
                        sent,
                        len: data.len(),
                    })
                }
                Err(e) => return Err(TwircError::Io(e)),
            }
        }
        Ok(())
    }

    pub fn send(&mut self, message: &Message) -> TwircResult<()> {
        self.send_line(&message.to_string())
    }

    pub fn pass(&mut self, token: &str) -> TwircResult<()> {
        self.send(&commands::pass(token))
    }

    pub fn nick(&mut self, nick: &str) -> TwircResult<()> {
        self.send(&commands::nick(nick))
    }

    pub fn join(&mut self, channel: &str) -> TwircResult<()> {
        self.send(&commands::join(channel))
    }

    pub fn part(&mut self, channel: &str) -> TwircResult<()> {
        self.send(&commands::part(channel))
    }

    pub fn privmsg(&mut self, channel: &str, text: &str) -> TwircResult<()> {
        self.send(&commands::privmsg(channel, text))
    }

    pub fn action(&mut self, channel: &str, text: &str) -> TwircResult<()> {
        self.send(&commands::action(channel, text))
    }

    pub fn whisper(&mut self, nick: &str, text: &str) -> TwircResult<()> {
        self.send(&commands::whisper(nick, text))
    }

    pub fn pong(&mut self, param: Option<&str>) -> TwircResult<()> {
        self.send(&commands::pong(param))
    }

    pub fn quit(&mut self) -> TwircResult<()> {
        self.send(&commands::quit())
    }

    pub fn request_capability(&mut self, capability: Capability) -> TwircResult<()> {
        self.send(&commands::cap_req(capability))
    }

    /// Requests capabilities, then sends PASS and NICK. Login completes when
    /// the server answers with `001` or `GLOBALUSERSTATE`.
    pub(crate) fn begin_handshake(&mut self) -> TwircResult<()> {
        if matches!(self.status, Status::Authenticating | Status::Authenticated) {
            return Err(TwircError::HandshakeInProgress(self.status));
        }
        let Some(login) = self.login.clone() else {
            return Err(TwircError::NotConnected);
        };

        info!("Requesting capabilities...");
        for capability in Capability::HANDSHAKE {
            self.request_capability(capability)?;
        }

        info!("Authenticating as {}...", login.nick);
        self.pass(&login.token)?;
        self.nick(&login.nick)?;
        self.transition(Transition::AuthStarted)
    }

    pub(crate) fn mark_authenticated(&mut self) -> TwircResult<()> {
        match self.status {
            Status::Authenticating => {
                info!("Logged in");
                self.transition(Transition::Welcomed)
            }
            Status::Authenticated => Ok(()),
            status => {
                warn!("Welcome received while {:?}, ignoring", status);
                Ok(())
            }
        }
    }

    pub(crate) fn receive(&mut self, buf: &mut [u8]) -> TwircResult<Received> {
        let transport = self.transport.as_mut().ok_or(TwircError::NotConnected)?;
        loop {
            match transport.receive(buf) {
                Ok(0) => return Ok(Received::Closed),
                Ok(n) => return Ok(Received::Data(n)),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => return Ok(Received::WouldBlock),
                Err(e) => return Err(TwircError::Io(e)),
            }
        }
    }

    /// Drops the transport without saying goodbye.
    pub(crate) fn teardown(&mut self, transition: Transition) {
        if let Some(mut transport) = self.transport.take() {
            if let Err(e) = self.reactor.deregister(&mut *transport) {
                debug!("Deregistering socket failed: {}", e);
            }
            if let Err(e) = transport.close() {
                debug!("Closing socket failed: {}", e);
            }
        }
        self.buffer.clear();
        self.running = false;
        // Lost and Closed are accepted from every status
        let _ = self.transition(transition);
    }

    /// Sends QUIT (best effort), closes the socket and resets to Disconnected.
    pub fn disconnect(&mut self) -> TwircResult<()> {
        if self.transport.is_some() {
            if let Err(e) = self.quit() {
                debug!("QUIT not delivered: {}", e);
            }
        }

        let closed = match self.transport.take() {
            Some(mut transport) => {
                if let Err(e) = self.reactor.deregister(&mut *transport) {
                    debug!("Deregistering socket failed: {}", e);
                }
                transport.close()
            }
            None => Ok(()),
        };
        self.teardown(Transition::Closed);
        info!("Disconnected");
        closed.map_err(TwircError::Io)
    }
}
