mod builtin;

use serde::Deserialize;
use tracing::debug;

use crate::error::TwircResult;
use crate::message::Message;
use crate::session::Connection;

pub type Callback = Box<dyn FnMut(&mut Connection, &Message)>;
pub type LifecycleCallback = Box<dyn FnMut(&mut Connection)>;

fn noop() -> Callback {
    Box::new(|_, _| {})
}

fn noop_lifecycle() -> LifecycleCallback {
    Box::new(|_| {})
}

/// What happens to PRIVMSGs whose text is wrapped in `\x01`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CtcpPolicy {
    /// Dropped after logging.
    Suppress,
    /// Delivered untouched to the `privmsg` callback.
    Privmsg,
    /// `ACTION` goes to `action`, everything else to `ctcp`.
    #[default]
    Separate,
}

/// One user callback per recognized command family.
///
/// Every slot starts out as a no-op, so the dispatcher never has to check
/// whether one was set.
pub struct Events {
    pub connect: LifecycleCallback,
    pub disconnect: LifecycleCallback,
    pub welcome: Callback,
    pub globaluserstate: Callback,
    pub capack: Callback,
    pub ping: Callback,
    pub join: Callback,
    pub part: Callback,
    pub mode: Callback,
    pub names: Callback,
    pub privmsg: Callback,
    pub action: Callback,
    pub ctcp: Callback,
    pub whisper: Callback,
    pub notice: Callback,
    pub roomstate: Callback,
    pub usernotice: Callback,
    pub userstate: Callback,
    pub clearchat: Callback,
    pub clearmsg: Callback,
    pub hosttarget: Callback,
    pub reconnect: Callback,
    pub unknown: Callback,
}

impl Default for Events {
    fn default() -> Self {
        Self {
            connect: noop_lifecycle(),
            disconnect: noop_lifecycle(),
            welcome: noop(),
            globaluserstate: noop(),
            capack: noop(),
            ping: noop(),
            join: noop(),
            part: noop(),
            mode: noop(),
            names: noop(),
            privmsg: noop(),
            action: noop(),
            ctcp: noop(),
            whisper: noop(),
            notice: noop(),
            roomstate: noop(),
            usernotice: noop(),
            userstate: noop(),
            clearchat: noop(),
            clearmsg: noop(),
            hosttarget: noop(),
            reconnect: noop(),
            unknown: noop(),
        }
    }
}

/// Routes one message: built-in handling first, then exactly one callback.
///
/// The callback runs even when the built-in step failed; that failure is
/// what gets returned.
pub fn dispatch(
    conn: &mut Connection,
    events: &mut Events,
    ctcp: CtcpPolicy,
    msg: &Message,
) -> TwircResult<()> {
    let (builtin, callback) = match msg.command.as_str() {
        "001" => (builtin::on_welcome(conn, msg), &mut events.welcome),
        "GLOBALUSERSTATE" => (builtin::on_welcome(conn, msg), &mut events.globaluserstate),
        "CAP" => (builtin::on_cap(msg), &mut events.capack),
        "PING" => (builtin::on_ping(conn, msg), &mut events.ping),
        "RECONNECT" => (builtin::on_reconnect(msg), &mut events.reconnect),
        "JOIN" => (Ok(()), &mut events.join),
        "PART" => (Ok(()), &mut events.part),
        "MODE" => (Ok(()), &mut events.mode),
        "353" => (Ok(()), &mut events.names),
        "PRIVMSG" => match route_privmsg(ctcp, msg, events) {
            Some(callback) => (Ok(()), callback),
            None => {
                debug!("Suppressed CTCP from {:?}", msg.nick);
                return Ok(());
            }
        },
        "WHISPER" => (Ok(()), &mut events.whisper),
        "NOTICE" => (Ok(()), &mut events.notice),
        "ROOMSTATE" => (Ok(()), &mut events.roomstate),
        "USERNOTICE" => (Ok(()), &mut events.usernotice),
        "USERSTATE" => (Ok(()), &mut events.userstate),
        "CLEARCHAT" => (Ok(()), &mut events.clearchat),
        "CLEARMSG" => (Ok(()), &mut events.clearmsg),
        "HOSTTARGET" => (Ok(()), &mut events.hosttarget),
        _ => (Ok(()), &mut events.unknown),
    };

    callback(conn, msg);
    builtin
}

fn route_privmsg<'a>(
    policy: CtcpPolicy,
    msg: &Message,
    events: &'a mut Events,
) -> Option<&'a mut Callback> {
    let Some(ctcp) = msg.ctcp() else {
        return Some(&mut events.privmsg);
    };
    match policy {
        CtcpPolicy::Suppress => None,
        CtcpPolicy::Privmsg => Some(&mut events.privmsg),
        CtcpPolicy::Separate if ctcp.command == "ACTION" => Some(&mut events.action),
        CtcpPolicy::Separate => Some(&mut events.ctcp),
    }
}

#[cfg(test)]
mod tests;
