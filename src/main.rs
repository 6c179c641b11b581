//! luxtronik-ws - command-line access to a Luxtronik heat pump

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use luxtronik_ws::{
    client::NavigationNode,
    logging::{init_logging, LogConfig},
    services::describe_snapshot,
    LuxWebSocketClient, LuxtronikConfig, SnapshotCoordinator, UpdateStatus,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn, Level};

/// Read values from a Luxtronik heat pump over its WebSocket interface
#[derive(Parser, Debug)]
#[command(name = "luxtronik-ws")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Heat pump host or IP address
    #[arg(long, global = true, env = "LUXTRONIK_HOST")]
    host: Option<String>,

    /// WebSocket port
    #[arg(long, global = true, env = "LUXTRONIK_PORT")]
    port: Option<String>,

    /// Web interface password
    #[arg(long, global = true, env = "LUXTRONIK_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch once and print every reading
    Dump {
        /// Print the snapshot as JSON
        #[arg(long)]
        json: bool,

        /// Print sensor metadata instead of raw readings
        #[arg(long)]
        sensors: bool,
    },
    /// Check that the heat pump answers; exit code 1 otherwise
    Test,
    /// Print the navigation tree
    Menu,
    /// Refresh on the configured interval and log each update
    Poll {
        /// Stop after this many refreshes
        #[arg(long)]
        rounds: Option<usize>,

        /// Override the polling interval (e.g. "30s", "2m")
        #[arg(long, value_parser = humantime::parse_duration)]
        interval: Option<std::time::Duration>,
    },
}

impl Cli {
    /// File, then environment, then flags
    fn load_config(&self) -> anyhow::Result<LuxtronikConfig> {
        let mut config = match &self.config {
            Some(path) => LuxtronikConfig::from_file(path)
                .with_context(|| format!("loading {}", path.display()))?,
            None => LuxtronikConfig::default(),
        };
        config.apply_env()?;

        if let Some(host) = &self.host {
            config.connection.host = host.clone();
        }
        if let Some(port) = &self.port {
            config.connection.port = port.clone();
        }
        if let Some(password) = &self.password {
            config.connection.password = password.clone();
        }
        if let Command::Poll {
            interval: Some(interval),
            ..
        } = &self.command
        {
            config.polling.interval = *interval;
        }

        config.validate()?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = cli.load_config()?;

    let mut log_config = LogConfig::from_settings(&config.logging);
    if cli.debug {
        log_config = log_config.with_level(Level::DEBUG);
    }
    init_logging(log_config)?;

    let client = LuxWebSocketClient::new(config.connection.clone(), config.client.clone());

    match cli.command {
        Command::Dump { json, sensors } => dump(&client, json, sensors).await?,
        Command::Test => {
            if client.test_connection().await {
                println!("Luxtronik device at {} is reachable", config.connection.host);
            } else {
                bail!("Luxtronik device at {} is not reachable", config.connection.host);
            }
        }
        Command::Menu => {
            let menu = client.fetch_navigation().await?;
            print_menu(&menu, 0);
        }
        Command::Poll { rounds, .. } => {
            let coordinator = Arc::new(SnapshotCoordinator::new(
                Arc::new(client),
                config.polling.interval,
            ));
            poll(coordinator, rounds).await;
        }
    }

    Ok(())
}

async fn dump(client: &LuxWebSocketClient, json: bool, sensors: bool) -> anyhow::Result<()> {
    let snapshot = client.fetch_snapshot().await?;

    if sensors {
        let descriptors = describe_snapshot(&snapshot);
        if json {
            println!("{}", serde_json::to_string_pretty(&descriptors)?);
        } else {
            for descriptor in &descriptors {
                let value = snapshot
                    .get(&descriptor.key)
                    .and_then(|reading| descriptor.native_value(reading))
                    .map(|v| v.to_string())
                    .unwrap_or_else(|| "-".to_string());
                println!(
                    "{:<60} {} {}",
                    descriptor.key,
                    value,
                    descriptor.native_unit.unwrap_or("")
                );
            }
        }
        return Ok(());
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
        return Ok(());
    }

    let mut keys: Vec<_> = snapshot.keys().collect();
    keys.sort();
    for key in keys {
        if let Some(reading) = snapshot.get(key) {
            let padding = 60usize.saturating_sub(key.chars().count());
            println!("{key}{} {reading}", ".".repeat(padding));
        }
    }

    Ok(())
}

fn print_menu(nodes: &[NavigationNode], depth: usize) {
    for node in nodes {
        println!("{}{} [{}]", "  ".repeat(depth), node.name, node.id);
        print_menu(&node.children, depth + 1);
    }
}

async fn poll(coordinator: Arc<SnapshotCoordinator>, rounds: Option<usize>) {
    let mut status = coordinator.subscribe();
    let reporter = tokio::spawn(async move {
        while status.changed().await.is_ok() {
            match &*status.borrow_and_update() {
                UpdateStatus::Updated { readings, at } => info!("{} readings at {}", readings, at),
                UpdateStatus::Failed { error, .. } => warn!("Update failed: {}", error),
                UpdateStatus::Idle => {}
            }
        }
    });

    info!("Polling every {:?}", coordinator.interval());
    tokio::select! {
        _ = coordinator.run(rounds) => {}
        _ = tokio::signal::ctrl_c() => info!("Interrupted"),
    }

    let stats = coordinator.stats();
    info!(
        fetches = stats.fetches,
        failures = stats.failures,
        "Polling finished"
    );
    reporter.abort();
}
