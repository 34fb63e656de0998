use std::fmt;
use std::io::{self, Read, Write};
use std::net::{Shutdown, SocketAddr, ToSocketAddrs};

use mio::event::Source;
use mio::net::TcpStream;
use mio::{Interest, Registry, Token};
use serde::Deserialize;
use tracing::debug;

use crate::error::{TwircError, TwircResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IpFamily {
    #[default]
    Ipv4,
    Ipv6,
}

impl IpFamily {
    pub fn matches(&self, addr: &SocketAddr) -> bool {
        match self {
            IpFamily::Ipv4 => addr.is_ipv4(),
            IpFamily::Ipv6 => addr.is_ipv6(),
        }
    }
}

impl fmt::Display for IpFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IpFamily::Ipv4 => write!(f, "ipv4"),
            IpFamily::Ipv6 => write!(f, "ipv6"),
        }
    }
}

/// A non-blocking byte pipe to the chat server.
///
/// `receive` follows `io::Read`: `Ok(0)` means the peer closed the stream and
/// `ErrorKind::WouldBlock` means there is nothing more to read right now.
pub trait Transport: Source {
    fn send(&mut self, bytes: &[u8]) -> io::Result<usize>;

    fn receive(&mut self, buf: &mut [u8]) -> io::Result<usize>;

    /// Checks a pending connect after the first write-readiness.
    /// `Ok(false)` means the connect is still in progress.
    fn finish_connect(&mut self) -> io::Result<bool> {
        Ok(true)
    }

    fn close(&mut self) -> io::Result<()>;
}

/// Creates a socket and starts connecting it without waiting for completion.
pub trait Connector {
    fn open(&mut self, family: IpFamily, host: &str, port: u16) -> TwircResult<Box<dyn Transport>>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct TcpConnector;

impl Connector for TcpConnector {
    fn open(&mut self, family: IpFamily, host: &str, port: u16) -> TwircResult<Box<dyn Transport>> {
        let addr = resolve(family, host, port)?;
        debug!("Connecting to {}:{} ({})", host, port, addr);
        let stream = TcpStream::connect(addr)?;
        Ok(Box::new(TcpTransport { stream, peer: addr }))
    }
}

fn resolve(family: IpFamily, host: &str, port: u16) -> TwircResult<SocketAddr> {
    (host, port)
        .to_socket_addrs()?
        .find(|addr| family.matches(addr))
        .ok_or_else(|| TwircError::Resolve {
            host: host.to_string(),
            port,
        })
}

pub struct TcpTransport {
    stream: TcpStream,
    peer: SocketAddr,
}

impl TcpTransport {
    pub fn peer(&self) -> SocketAddr {
        self.peer
    }
}

impl Transport for TcpTransport {
    fn send(&mut self, bytes: &[u8]) -> io::Result<usize> {
        self.stream.write(bytes)
    }

    fn receive(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.stream.read(buf)
    }

    fn finish_connect(&mut self) -> io::Result<bool> {
        if let Some(err) = self.stream.take_error()? {
            return Err(err);
        }
        match self.stream.peer_addr() {
            Ok(_) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotConnected => Ok(false),
            Err(e) => Err(e),
        }
    }

    fn close(&mut self) -> io::Result<()> {
        match self.stream.shutdown(Shutdown::Both) {
            Err(e) if e.kind() != io::ErrorKind::NotConnected => Err(e),
            _ => Ok(()),
        }
    }
}

impl Source for TcpTransport {
    fn register(&mut self, registry: &Registry, token: Token, interests: Interest) -> io::Result<()> {
        self.stream.register(registry, token, interests)
    }

    fn reregister(&mut self, registry: &Registry, token: Token, interests: Interest) -> io::Result<()> {
        self.stream.reregister(registry, token, interests)
    }

    fn deregister(&mut self, registry: &Registry) -> io::Result<()> {
        self.stream.deregister(registry)
    }
}

#[cfg(test)]
mod tests;
