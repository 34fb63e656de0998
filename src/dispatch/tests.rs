use std::cell::RefCell;
use std::rc::Rc;

use super::*;
use crate::message::parse_message;
use crate::session::testing::authenticating;
use crate::session::Status;

type Log = Rc<RefCell<Vec<String>>>;

fn record(log: &Log, slot: &'static str) -> Callback {
    let log = Rc::clone(log);
    Box::new(move |_, msg| log.borrow_mut().push(format!("{}:{}", slot, msg.command)))
}

fn recording_events(log: &Log) -> Events {
    Events {
        welcome: record(log, "welcome"),
        globaluserstate: record(log, "globaluserstate"),
        capack: record(log, "capack"),
        ping: record(log, "ping"),
        join: record(log, "join"),
        part: record(log, "part"),
        mode: record(log, "mode"),
        names: record(log, "names"),
        privmsg: record(log, "privmsg"),
        action: record(log, "action"),
        ctcp: record(log, "ctcp"),
        whisper: record(log, "whisper"),
        notice: record(log, "notice"),
        roomstate: record(log, "roomstate"),
        usernotice: record(log, "usernotice"),
        userstate: record(log, "userstate"),
        clearchat: record(log, "clearchat"),
        clearmsg: record(log, "clearmsg"),
        hosttarget: record(log, "hosttarget"),
        reconnect: record(log, "reconnect"),
        unknown: record(log, "unknown"),
        ..Events::default()
    }
}

fn run(events: &mut Events, policy: CtcpPolicy, line: &str) -> Connection {
    let (mut conn, _script) = authenticating();
    let msg = parse_message(line).unwrap();
    dispatch(&mut conn, events, policy, &msg).unwrap();
    conn
}

#[test]
fn test_defaults_are_noops() {
    let mut events = Events::default();
    for line in [
        ":tmi.twitch.tv 001 me :Welcome, GLHF!",
        ":a!a@a.tmi.twitch.tv PRIVMSG #chan :hi",
        ":a!a@a.tmi.twitch.tv PRIVMSG #chan :\u{1}ACTION waves\u{1}",
        ":tmi.twitch.tv CLEARCHAT #chan :someone",
        ":tmi.twitch.tv 372 me :motd",
        "PING :tmi.twitch.tv",
    ] {
        run(&mut events, CtcpPolicy::Separate, line);
    }
}

#[test]
fn test_routes_each_command_to_its_slot() {
    let cases = [
        (":tmi.twitch.tv CAP * ACK :twitch.tv/tags", "capack"),
        (":me!me@me.tmi.twitch.tv JOIN #chan", "join"),
        (":me!me@me.tmi.twitch.tv PART #chan", "part"),
        (":jtv MODE #chan +o someone", "mode"),
        (":me.tmi.twitch.tv 353 me = #chan :a b c", "names"),
        (":a!a@a.tmi.twitch.tv PRIVMSG #chan :hello", "privmsg"),
        (":a!a@a.tmi.twitch.tv WHISPER me :psst", "whisper"),
        (":tmi.twitch.tv NOTICE #chan :Login unsuccessful", "notice"),
        ("@slow=0 :tmi.twitch.tv ROOMSTATE #chan", "roomstate"),
        ("@msg-id=sub :tmi.twitch.tv USERNOTICE #chan :yay", "usernotice"),
        (":tmi.twitch.tv USERSTATE #chan", "userstate"),
        (":tmi.twitch.tv CLEARCHAT #chan :someone", "clearchat"),
        ("@login=a :tmi.twitch.tv CLEARMSG #chan :bad", "clearmsg"),
        (":tmi.twitch.tv HOSTTARGET #chan :other 10", "hosttarget"),
        (":tmi.twitch.tv RECONNECT", "reconnect"),
        (":tmi.twitch.tv 372 me :motd", "unknown"),
        (":tmi.twitch.tv 366 me #chan :End of /NAMES list", "unknown"),
    ];

    for (line, slot) in cases {
        let log = Log::default();
        let mut events = recording_events(&log);
        run(&mut events, CtcpPolicy::Separate, line);
        let seen = log.borrow();
        assert_eq!(seen.len(), 1, "{}", line);
        assert!(seen[0].starts_with(&format!("{}:", slot)), "{} -> {:?}", line, seen);
    }
}

#[test]
fn test_welcome_authenticates() {
    let log = Log::default();
    let mut events = recording_events(&log);
    let conn = run(&mut events, CtcpPolicy::Separate, ":tmi.twitch.tv 001 me :Welcome, GLHF!");
    assert_eq!(conn.status(), Status::Authenticated);
    assert_eq!(*log.borrow(), vec!["welcome:001".to_string()]);
}

#[test]
fn test_globaluserstate_authenticates() {
    let log = Log::default();
    let mut events = recording_events(&log);
    let conn = run(
        &mut events,
        CtcpPolicy::Separate,
        "@display-name=me :tmi.twitch.tv GLOBALUSERSTATE",
    );
    assert!(conn.is_logged_in());
    assert_eq!(*log.borrow(), vec!["globaluserstate:GLOBALUSERSTATE".to_string()]);
}

#[test]
fn test_welcome_callback_sees_logged_in_connection() {
    let seen = Rc::new(RefCell::new(None));
    let captured = Rc::clone(&seen);
    let mut events = Events {
        welcome: Box::new(move |conn, _| *captured.borrow_mut() = Some(conn.status())),
        ..Events::default()
    };
    run(&mut events, CtcpPolicy::Separate, ":tmi.twitch.tv 001 me :Welcome");
    assert_eq!(*seen.borrow(), Some(Status::Authenticated));
}

#[test]
fn test_ping_is_answered_then_reported() {
    let (mut conn, script) = authenticating();
    let log = Log::default();
    let mut events = recording_events(&log);
    let msg = parse_message("PING :tmi.twitch.tv").unwrap();

    dispatch(&mut conn, &mut events, CtcpPolicy::Separate, &msg).unwrap();

    assert_eq!(script.borrow().sent, vec!["PONG :tmi.twitch.tv\r\n".to_string()]);
    assert_eq!(*log.borrow(), vec!["ping:PING".to_string()]);
}

#[test]
fn test_callback_can_reply() {
    let (mut conn, script) = authenticating();
    let mut events = Events {
        privmsg: Box::new(|conn, msg| {
            if msg.trailing() == Some("!ping") {
                conn.privmsg(msg.channel().unwrap_or("#chan"), "pong").unwrap();
            }
        }),
        ..Events::default()
    };
    let msg = parse_message(":a!a@a.tmi.twitch.tv PRIVMSG #chan :!ping").unwrap();

    dispatch(&mut conn, &mut events, CtcpPolicy::Separate, &msg).unwrap();

    assert_eq!(script.borrow().sent, vec!["PRIVMSG #chan :pong\r\n".to_string()]);
}

#[test]
fn test_ctcp_separate() {
    let log = Log::default();
    let mut events = recording_events(&log);
    run(
        &mut events,
        CtcpPolicy::Separate,
        ":a!a@a.tmi.twitch.tv PRIVMSG #chan :\u{1}ACTION waves\u{1}",
    );
    run(
        &mut events,
        CtcpPolicy::Separate,
        ":a!a@a.tmi.twitch.tv PRIVMSG #chan :\u{1}VERSION\u{1}",
    );
    assert_eq!(
        *log.borrow(),
        vec!["action:PRIVMSG".to_string(), "ctcp:PRIVMSG".to_string()]
    );
}

#[test]
fn test_ctcp_as_privmsg() {
    let log = Log::default();
    let mut events = recording_events(&log);
    run(
        &mut events,
        CtcpPolicy::Privmsg,
        ":a!a@a.tmi.twitch.tv PRIVMSG #chan :\u{1}ACTION waves\u{1}",
    );
    assert_eq!(*log.borrow(), vec!["privmsg:PRIVMSG".to_string()]);
}

#[test]
fn test_ctcp_suppressed() {
    let log = Log::default();
    let mut events = recording_events(&log);
    run(
        &mut events,
        CtcpPolicy::Suppress,
        ":a!a@a.tmi.twitch.tv PRIVMSG #chan :\u{1}ACTION waves\u{1}",
    );
    run(&mut events, CtcpPolicy::Suppress, ":a!a@a.tmi.twitch.tv PRIVMSG #chan :plain");
    assert_eq!(*log.borrow(), vec!["privmsg:PRIVMSG".to_string()]);
}

#[test]
fn test_builtin_error_still_runs_callback() {
    let (mut conn, script) = authenticating();
    script.borrow_mut().fail_sends = true;
    let log = Log::default();
    let mut events = recording_events(&log);
    let msg = parse_message("PING :tmi.twitch.tv").unwrap();

    let result = dispatch(&mut conn, &mut events, CtcpPolicy::Separate, &msg);

    assert!(matches!(result, Err(crate::error::TwircError::Io(_))));
    assert_eq!(*log.borrow(), vec!["ping:PING".to_string()]);
}
