use clap::Parser;
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,

    /// Generate an example configuration file and exit
    #[arg(short, long)]
    pub generate_config: bool,

    /// Set the log level (error, warn, info, debug, trace)
    #[arg(short, long, default_value = "info")]
    pub log_level: String,
}

pub fn generate_example_config() -> String {
    r##"# twirc example configuration

[server]
host = "irc.chat.twitch.tv"  # Chat server
port = 6667                  # Plain-text IRC port
ip_family = "ipv4"           # "ipv4" or "ipv6"

[login]
nick = "justinfan12345"      # Your bot's login name (justinfan* logs in anonymously)
token = "oauth:changeme"     # OAuth token; "oauth:" is added if missing

[client]
channels = ["#twitchdev"]    # Joined once the server welcomes us
tick_timeout_ms = 1000       # Longest wait per loop iteration, 0 waits forever
ctcp = "separate"            # "separate", "privmsg" or "suppress"
"##
    .to_string()
}
