use tracing::{debug, info, warn};

use crate::error::TwircResult;
use crate::message::Message;
use crate::session::Connection;

/// `001` and `GLOBALUSERSTATE` both mean the login went through.
pub(super) fn on_welcome(conn: &mut Connection, _msg: &Message) -> TwircResult<()> {
    conn.mark_authenticated()
}

pub(super) fn on_ping(conn: &mut Connection, msg: &Message) -> TwircResult<()> {
    conn.pong(msg.param(0))
}

/// > :tmi.twitch.tv CAP * ACK :twitch.tv/tags
pub(super) fn on_cap(msg: &Message) -> TwircResult<()> {
    let caps = msg.trailing().unwrap_or_default();
    match msg.param(1) {
        Some("ACK") => debug!("Capabilities acknowledged: {}", caps),
        Some("NAK") => warn!("Capabilities rejected: {}", caps),
        other => debug!("Unhandled CAP reply {:?}", other),
    }
    Ok(())
}

/// Twitch restarts its chat servers now and then; the socket is closed
/// shortly after this arrives and the application has to reconnect.
pub(super) fn on_reconnect(_msg: &Message) -> TwircResult<()> {
    info!("Server requested a reconnect");
    Ok(())
}
