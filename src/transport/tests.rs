use super::*;
use crate::reactor::Reactor;
use std::net::TcpListener;
use std::time::{Duration, Instant};

#[test]
fn test_resolve_ipv4_loopback() {
    let addr = resolve(IpFamily::Ipv4, "127.0.0.1", 6667).unwrap();
    assert_eq!(addr, "127.0.0.1:6667".parse().unwrap());
}

#[test]
fn test_resolve_family_mismatch() {
    let err = resolve(IpFamily::Ipv6, "127.0.0.1", 6667).unwrap_err();
    assert!(matches!(err, TwircError::Resolve { port: 6667, .. }));
}

#[test]
fn test_ip_family_display() {
    assert_eq!(IpFamily::Ipv4.to_string(), "ipv4");
    assert_eq!(IpFamily::Ipv6.to_string(), "ipv6");
    assert_eq!(IpFamily::default(), IpFamily::Ipv4);
}

#[test]
fn test_tcp_transport_connects_and_sends() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();

    let mut transport = TcpConnector.open(IpFamily::Ipv4, "127.0.0.1", port).unwrap();
    let mut reactor = Reactor::new().unwrap();
    reactor.register(&mut *transport).unwrap();

    let deadline = Instant::now() + Duration::from_secs(5);
    loop {
        assert!(Instant::now() < deadline, "connect never completed");
        let readiness = reactor.wait(Some(Duration::from_millis(100))).unwrap();
        if readiness.writable && transport.finish_connect().unwrap() {
            break;
        }
    }

    let (mut server, _) = listener.accept().unwrap();
    assert_eq!(transport.send(b"PING :x\r\n").unwrap(), 9);

    let mut received = [0u8; 9];
    server.read_exact(&mut received).unwrap();
    assert_eq!(&received, b"PING :x\r\n");

    let mut buf = [0u8; 16];
    let err = transport.receive(&mut buf).unwrap_err();
    assert_eq!(err.kind(), io::ErrorKind::WouldBlock);

    transport.close().unwrap();
    reactor.deregister(&mut *transport).unwrap();
}
