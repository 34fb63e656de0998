pub mod parser;

use std::fmt;

use chrono::{DateTime, Utc};
use thiserror::Error;

pub use parser::{parse_message, unescape_tag_value};

/// Byte that brackets a CTCP payload inside a PRIVMSG or NOTICE.
pub const CTCP_DELIM: char = '\u{1}';

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("Empty message")]
    Empty,

    #[error("Missing command")]
    MissingCommand,
}

/// A single IRCv3 message tag. The value is stored unescaped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub key: String,
    pub value: String,
}

/// One parsed protocol line.
///
/// Messages are built per line, handed to the dispatcher by reference and
/// dropped afterwards; nothing in the crate keeps one around.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Message {
    pub tags: Vec<Tag>,
    pub prefix: Option<String>,
    pub nick: Option<String>,
    pub command: String,
    pub params: Vec<String>,
    /// Index into `params` of the `:`-introduced final parameter.
    pub trailing: Option<usize>,
}

/// A CTCP request or reply carried inside a PRIVMSG/NOTICE.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ctcp<'a> {
    pub command: &'a str,
    pub args: Option<&'a str>,
}

impl Message {
    pub fn new(command: impl Into<String>, params: Vec<String>) -> Self {
        Self {
            command: command.into(),
            params,
            ..Self::default()
        }
    }

    /// Appends `text` as the trailing parameter.
    pub fn with_trailing(mut self, text: impl Into<String>) -> Self {
        self.params.push(text.into());
        self.trailing = Some(self.params.len() - 1);
        self
    }

    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags
            .iter()
            .find(|tag| tag.key == key)
            .map(|tag| tag.value.as_str())
    }

    pub fn param(&self, index: usize) -> Option<&str> {
        self.params.get(index).map(String::as_str)
    }

    pub fn trailing(&self) -> Option<&str> {
        self.trailing.and_then(|index| self.param(index))
    }

    pub fn is_numeric(&self) -> bool {
        self.command.len() == 3 && self.command.bytes().all(|b| b.is_ascii_digit())
    }

    /// The channel this message refers to, if any.
    ///
    /// Names replies carry the channel further back: `353 <me> = #chan :...`
    /// and `366 <me> #chan :...`.
    pub fn channel(&self) -> Option<&str> {
        let index = match self.command.as_str() {
            "353" => 2,
            "366" => 1,
            _ => 0,
        };
        self.param(index).filter(|param| param.starts_with('#'))
    }

    /// Splits a `\x01COMMAND args\x01` payload out of a PRIVMSG or NOTICE.
    pub fn ctcp(&self) -> Option<Ctcp<'_>> {
        if self.command != "PRIVMSG" && self.command != "NOTICE" {
            return None;
        }
        let text = self.params.get(1)?;
        let inner = text
            .strip_prefix(CTCP_DELIM)?
            .strip_suffix(CTCP_DELIM)?;
        let (command, args) = match inner.split_once(' ') {
            Some((command, args)) => (command, Some(args)),
            None => (inner, None),
        };
        Some(Ctcp { command, args })
    }

    pub fn is_ctcp(&self) -> bool {
        self.ctcp().is_some()
    }

    /// Server receive time from the `tmi-sent-ts` tag (milliseconds since the epoch).
    pub fn sent_at(&self) -> Option<DateTime<Utc>> {
        let millis = self.tag("tmi-sent-ts")?.parse::<i64>().ok()?;
        DateTime::from_timestamp_millis(millis)
    }
}

fn escape_tag_value(f: &mut fmt::Formatter<'_>, value: &str) -> fmt::Result {
    for c in value.chars() {
        match c {
            ';' => f.write_str("\\:")?,
            ' ' => f.write_str("\\s")?,
            '\\' => f.write_str("\\\\")?,
            '\r' => f.write_str("\\r")?,
            '\n' => f.write_str("\\n")?,
            c => write!(f, "{}", c)?,
        }
    }
    Ok(())
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.tags.is_empty() {
            f.write_str("@")?;
            for (i, tag) in self.tags.iter().enumerate() {
                if i > 0 {
                    f.write_str(";")?;
                }
                f.write_str(&tag.key)?;
                if !tag.value.is_empty() {
                    f.write_str("=")?;
                    escape_tag_value(f, &tag.value)?;
                }
            }
            f.write_str(" ")?;
        }

        if let Some(ref prefix) = self.prefix {
            write!(f, ":{} ", prefix)?;
        }

        f.write_str(&self.command)?;

        for (i, param) in self.params.iter().enumerate() {
            if self.trailing == Some(i) {
                write!(f, " :{}", param)?;
            } else {
                write!(f, " {}", param)?;
            }
        }
        Ok(())
    }
}
