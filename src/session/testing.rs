//! In-memory transport for driving a session without a chat server.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::io;
use std::rc::Rc;

use mio::event::Source;
use mio::net::TcpListener;
use mio::{Interest, Registry, Token};

use crate::error::TwircResult;
use crate::transport::{Connector, IpFamily, Transport};

use super::connection::Connection;
use super::state::Transition;

/// What the fake server will hand out and what it has seen.
#[derive(Debug, Default)]
pub(crate) struct Script {
    pub inbound: VecDeque<Vec<u8>>,
    pub sent: Vec<String>,
    pub fail_sends: bool,
    pub eof: bool,
    pub closed: bool,
    pub connect_pending: bool,
    pub opened: Vec<(IpFamily, String, u16)>,
}

impl Script {
    pub fn push(&mut self, data: &str) {
        self.inbound.push_back(data.as_bytes().to_vec());
    }
}

pub(crate) type SharedScript = Rc<RefCell<Script>>;

pub(crate) struct ScriptedConnector {
    script: SharedScript,
}

impl Connector for ScriptedConnector {
    fn open(&mut self, family: IpFamily, host: &str, port: u16) -> TwircResult<Box<dyn Transport>> {
        self.script
            .borrow_mut()
            .opened
            .push((family, host.to_string(), port));
        // Gives the reactor a real descriptor to register; it never fires
        let anchor = TcpListener::bind("127.0.0.1:0".parse().map_err(|_| {
            io::Error::new(io::ErrorKind::InvalidInput, "bad anchor address")
        })?)?;
        Ok(Box::new(ScriptedTransport {
            script: Rc::clone(&self.script),
            anchor,
        }))
    }
}

pub(crate) struct ScriptedTransport {
    script: SharedScript,
    anchor: TcpListener,
}

impl Transport for ScriptedTransport {
    fn send(&mut self, bytes: &[u8]) -> io::Result<usize> {
        let mut script = self.script.borrow_mut();
        if script.fail_sends {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "scripted send failure"));
        }
        script.sent.push(String::from_utf8_lossy(bytes).into_owned());
        Ok(bytes.len())
    }

    fn receive(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let mut script = self.script.borrow_mut();
        match script.inbound.pop_front() {
            Some(mut chunk) => {
                let n = chunk.len().min(buf.len());
                buf[..n].copy_from_slice(&chunk[..n]);
                if n < chunk.len() {
                    script.inbound.push_front(chunk.split_off(n));
                }
                Ok(n)
            }
            None if script.eof => Ok(0),
            None => Err(io::ErrorKind::WouldBlock.into()),
        }
    }

    fn finish_connect(&mut self) -> io::Result<bool> {
        Ok(!self.script.borrow().connect_pending)
    }

    fn close(&mut self) -> io::Result<()> {
        self.script.borrow_mut().closed = true;
        Ok(())
    }
}

impl Source for ScriptedTransport {
    fn register(&mut self, registry: &Registry, token: Token, interests: Interest) -> io::Result<()> {
        self.anchor.register(registry, token, interests)
    }

    fn reregister(&mut self, registry: &Registry, token: Token, interests: Interest) -> io::Result<()> {
        self.anchor.reregister(registry, token, interests)
    }

    fn deregister(&mut self, registry: &Registry) -> io::Result<()> {
        self.anchor.deregister(registry)
    }
}

pub(crate) fn scripted() -> (Box<dyn Connector>, SharedScript) {
    let script = SharedScript::default();
    let connector = ScriptedConnector {
        script: Rc::clone(&script),
    };
    (Box::new(connector), script)
}

/// A connection that has finished the handshake and is waiting for `001`.
pub(crate) fn authenticating() -> (Connection, SharedScript) {
    let (connector, script) = scripted();
    let mut conn = Connection::new(connector).unwrap();
    conn.open("irc.example", 6667, "abc", "me").unwrap();
    conn.transition(Transition::Established).unwrap();
    conn.begin_handshake().unwrap();
    script.borrow_mut().sent.clear();
    (conn, script)
}
