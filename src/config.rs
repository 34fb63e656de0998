use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::dispatch::CtcpPolicy;
use crate::error::{TwircError, TwircResult};
use crate::transport::IpFamily;

#[derive(Debug, Deserialize)]
pub struct ClientConfig {
    #[serde(default)]
    pub server: Server,
    pub login: Login,
    #[serde(default)]
    pub client: Client,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Server {
    pub host: String,
    pub port: u16,
    pub ip_family: IpFamily,
}

impl Default for Server {
    fn default() -> Self {
        Self {
            host: "irc.chat.twitch.tv".to_string(),
            port: 6667,
            ip_family: IpFamily::Ipv4,
        }
    }
}

#[derive(Deserialize)]
pub struct Login {
    pub nick: String,
    pub token: String, // with or without the "oauth:" prefix
}

impl std::fmt::Debug for Login {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Login")
            .field("nick", &self.nick)
            .field("token", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Client {
    pub channels: Vec<String>,
    pub tick_timeout_ms: u64,
    pub ctcp: CtcpPolicy,
}

impl Default for Client {
    fn default() -> Self {
        Self {
            channels: Vec::new(),
            tick_timeout_ms: 1000,
            ctcp: CtcpPolicy::Separate,
        }
    }
}

impl Client {
    /// Zero means block until something happens.
    pub fn tick_timeout(&self) -> Option<Duration> {
        match self.tick_timeout_ms {
            0 => None,
            ms => Some(Duration::from_millis(ms)),
        }
    }
}

impl ClientConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> TwircResult<Self> {
        let contents = fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    pub fn parse(contents: &str) -> TwircResult<Self> {
        let config: ClientConfig =
            toml::from_str(contents).map_err(|e| TwircError::Config(e.to_string()))?;
        if config.login.nick.is_empty() {
            return Err(TwircError::Config("login.nick must not be empty".into()));
        }
        Ok(config)
    }
}
