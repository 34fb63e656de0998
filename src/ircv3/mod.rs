use std::fmt;
use std::str::FromStr;

/// Twitch-specific IRCv3 capabilities requested during the handshake.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    Tags,
    Membership,
    Commands,
}

impl Capability {
    /// Requested one by one, in this order, right after the socket connects.
    pub const HANDSHAKE: [Capability; 3] = [
        Capability::Tags,
        Capability::Membership,
        Capability::Commands,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::Tags => "twitch.tv/tags",
            Capability::Membership => "twitch.tv/membership",
            Capability::Commands => "twitch.tv/commands",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Capability {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "twitch.tv/tags" => Ok(Capability::Tags),
            "twitch.tv/membership" => Ok(Capability::Membership),
            "twitch.tv/commands" => Ok(Capability::Commands),
            _ => Err(()),
        }
    }
}
