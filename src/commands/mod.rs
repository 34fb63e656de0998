//! Outbound command formatting.

use crate::buffer::MESSAGE_SIZE;
use crate::ircv3::Capability;
use crate::message::Message;

/// Whispers are sent as a PRIVMSG to this pseudo channel.
pub const WHISPER_CHANNEL: &str = "#jtv";

const TOKEN_PREFIX: &str = "oauth:";

pub fn pass(token: &str) -> Message {
    let token = middle(token);
    let token = if token.starts_with(TOKEN_PREFIX) {
        token
    } else {
        format!("{}{}", TOKEN_PREFIX, token)
    };
    Message::new("PASS", vec![token])
}

pub fn nick(nick: &str) -> Message {
    Message::new("NICK", vec![middle(nick)])
}

pub fn join(channel: &str) -> Message {
    Message::new("JOIN", vec![channel_name(channel)])
}

pub fn part(channel: &str) -> Message {
    Message::new("PART", vec![channel_name(channel)])
}

pub fn privmsg(channel: &str, text: &str) -> Message {
    Message::new("PRIVMSG", vec![channel_name(channel)]).with_trailing(text)
}

pub fn action(channel: &str, text: &str) -> Message {
    privmsg(channel, &format!("\u{1}ACTION {}\u{1}", text))
}

pub fn whisper(nick: &str, text: &str) -> Message {
    privmsg(WHISPER_CHANNEL, &format!("/w {} {}", middle(nick), text))
}

/// The parameter always goes out `:`-prefixed, which is what Twitch expects.
pub fn pong(param: Option<&str>) -> Message {
    let param = param.unwrap_or_default();
    Message::new("PONG", Vec::new()).with_trailing(param.strip_prefix(':').unwrap_or(param))
}

pub fn quit() -> Message {
    Message::new("QUIT", Vec::new())
}

pub fn cap_req(capability: Capability) -> Message {
    Message::new("CAP", vec!["REQ".to_string()]).with_trailing(capability.as_str())
}

pub fn channel_name(channel: &str) -> String {
    let channel = middle(channel);
    if channel.starts_with('#') {
        channel
    } else {
        format!("#{}", channel)
    }
}

/// Whitespace inside a middle parameter would split it into several on the
/// wire, so it is dropped.
fn middle(param: &str) -> String {
    param.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Turns one line into wire bytes: cut at the first CR/LF, truncated to fit
/// a message on a char boundary, then CRLF-terminated.
pub fn frame(line: &str) -> Vec<u8> {
    let line = line.split(['\r', '\n']).next().unwrap_or_default();
    let line = truncate(line, MESSAGE_SIZE - 2);
    let mut data = Vec::with_capacity(line.len() + 2);
    data.extend_from_slice(line.as_bytes());
    data.extend_from_slice(b"\r\n");
    data
}

fn truncate(line: &str, max: usize) -> &str {
    if line.len() <= max {
        return line;
    }
    let mut end = max;
    while !line.is_char_boundary(end) {
        end -= 1;
    }
    &line[..end]
}

/// Lines carrying credentials stay out of the logs.
pub fn is_sensitive(line: &str) -> bool {
    line.contains("PASS")
}
