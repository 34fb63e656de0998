use std::error::Error;

use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::FmtSubscriber;

use twirc::cli::{generate_example_config, Cli};
use twirc::config::ClientConfig;
use twirc::{Events, Session};

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    // Handle config generation
    if cli.generate_config {
        let example_config = generate_example_config();
        println!("{}", example_config);
        return Ok(());
    }

    // Initialize logging
    let log_level = match cli.log_level.to_lowercase().as_str() {
        "error" => "error",
        "warn" => "warn",
        "debug" => "debug",
        "trace" => "trace",
        _ => "info",
    };

    FmtSubscriber::builder()
        .with_file(true)
        .with_line_number(true)
        .with_thread_ids(true)
        .with_target(false)
        .with_env_filter(format!("twirc={}", log_level))
        .init();

    info!("Starting twirc...");

    let config = ClientConfig::load(&cli.config).map_err(|e| {
        tracing::error!("Failed to load configuration from {:?}: {}", cli.config, e);
        e
    })?;

    info!("Configuration loaded successfully");

    let mut session = Session::new()?;
    session.set_ip_family(config.server.ip_family);
    session.set_ctcp_policy(config.client.ctcp);
    session.set_events(events(config.client.channels.clone()));

    session.connect(
        &config.server.host,
        config.server.port,
        &config.login.token,
        &config.login.nick,
    )?;
    session.run(config.client.tick_timeout())?;

    session.disconnect()?;
    Ok(())
}

fn events(channels: Vec<String>) -> Events {
    Events {
        connect: Box::new(|_| info!("Connected, logging in...")),
        disconnect: Box::new(|_| warn!("Disconnected")),
        welcome: Box::new(move |conn, _| {
            for channel in &channels {
                if let Err(e) = conn.join(channel) {
                    warn!("Could not join {}: {}", channel, e);
                }
            }
        }),
        join: Box::new(|conn, msg| {
            let me = conn.login().map(|login| login.nick.as_str());
            if msg.nick.as_deref() == me {
                info!("Joined {}", msg.channel().unwrap_or("?"));
            }
        }),
        privmsg: Box::new(|_, msg| {
            info!(
                "[{}] <{}> {}",
                msg.channel().unwrap_or("?"),
                msg.tag("display-name").or(msg.nick.as_deref()).unwrap_or("?"),
                msg.trailing().unwrap_or_default()
            );
        }),
        action: Box::new(|_, msg| {
            let text = msg.ctcp().and_then(|ctcp| ctcp.args).unwrap_or_default();
            info!(
                "[{}] * {} {}",
                msg.channel().unwrap_or("?"),
                msg.nick.as_deref().unwrap_or("?"),
                text
            );
        }),
        whisper: Box::new(|_, msg| {
            info!(
                "Whisper from {}: {}",
                msg.nick.as_deref().unwrap_or("?"),
                msg.trailing().unwrap_or_default()
            );
        }),
        notice: Box::new(|_, msg| info!("Notice: {}", msg.trailing().unwrap_or_default())),
        reconnect: Box::new(|conn, _| {
            warn!("Server is restarting, stopping");
            conn.stop();
        }),
        ..Events::default()
    }
}
