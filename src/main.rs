//! hamqtt - Home Assistant MQTT discovery node
//!
//! Loads a node configuration, announces every configured entity to the hub
//! and keeps the session (and its presence record) alive until signalled.

use clap::{Parser, Subcommand};
use hamqtt::discovery::{add_default_availability_topic, publish_discovery_document};
use hamqtt::observability::{init_default_logging, init_logging, LogFormat};
use hamqtt::{
    AnyEntity, ConnectionEvent, ConnectionHandle, Discovery, InstanceId, MqttConnection,
    NodeConfig, NodeError, NodeResult, TopicBuilder, TopicFilter, Transport,
};
use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use tokio::signal;
use tracing::{debug, error, info, warn, Level};

/// Home Assistant MQTT discovery node
#[derive(Parser)]
#[command(name = "hamqtt")]
#[command(about = "Expose devices to Home Assistant over MQTT discovery")]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Verbose logging (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Connect and serve the configured entities
    Run,
    /// Validate the configuration
    Config {
        /// Print the configuration with secrets masked
        #[arg(long)]
        show: bool,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    match cli.verbose {
        0 => init_default_logging(),
        1 => init_logging(Level::DEBUG, LogFormat::Compact, false),
        _ => init_logging(Level::TRACE, LogFormat::Compact, true),
    }

    info!("Starting hamqtt v{}", env!("CARGO_PKG_VERSION"));

    let config = match load_configuration(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            process::exit(1);
        }
    };

    let result = match cli.command {
        Commands::Run => run_node(config).await,
        Commands::Config { show } => handle_config_command(&config, show),
    };

    if let Err(e) = result {
        error!("Command failed: {}", e);
        process::exit(if e.is_configuration_error() { 2 } else { 1 });
    }

    info!("Application shutdown complete");
}

fn load_configuration(config_path: &Option<PathBuf>) -> NodeResult<NodeConfig> {
    if let Some(path) = config_path {
        info!("Loading configuration from: {}", path.display());
        return Ok(NodeConfig::load_from_file(path)?);
    }

    for path_str in ["hamqtt.toml", "config/hamqtt.toml"] {
        let path = PathBuf::from(path_str);
        if path.exists() {
            info!("Loading configuration from: {}", path.display());
            return Ok(NodeConfig::load_from_file(&path)?);
        }
    }

    Err(NodeError::internal_error(
        "No configuration file found. Provide one with -c/--config or create hamqtt.toml",
    ))
}

/// Derive topics for every entity and check that each one is publishable
fn prepare_entities(
    entities: Vec<AnyEntity>,
    topics: &TopicBuilder,
) -> NodeResult<Vec<AnyEntity>> {
    let mut prepared = Vec::with_capacity(entities.len());
    for mut entity in entities {
        entity.populate_topics(topics)?;
        if entity.base().availability.is_some() {
            add_default_availability_topic(&mut entity, topics)?;
        }
        entity.validate()?;
        debug!(
            component = entity.component(),
            unique_id = entity.unique_id(),
            "Entity prepared"
        );
        prepared.push(entity);
    }
    Ok(prepared)
}

async fn run_node(config: NodeConfig) -> NodeResult<()> {
    let instance = InstanceId::new();
    info!(
        node_id = %config.mqtt.node_id,
        instance = %instance,
        entities = config.entities.len(),
        "Node starting"
    );

    let mut connection = MqttConnection::new(&config.mqtt, &instance)?;
    let entities = Arc::new(prepare_entities(config.entities, connection.topics())?);
    let handle = connection.handle();

    {
        let handle = handle.clone();
        let entities = entities.clone();
        connection.spawn_event_handler(move |event| {
            let handle = handle.clone();
            let entities = entities.clone();
            async move { handle_connection_event(&handle, &entities, event).await }
        });
    }

    connection.start()?;

    let filters: Vec<TopicFilter> = entities
        .iter()
        .filter_map(|e| e.command_topic())
        .map(TopicFilter::new)
        .collect();
    info!(count = filters.len(), "Subscribing to command topics");
    handle.subscribe(filters).await?;

    let mut sigint = signal::unix::signal(signal::unix::SignalKind::interrupt())?;
    let mut sigterm = signal::unix::signal(signal::unix::SignalKind::terminate())?;

    info!("Node is running");

    tokio::select! {
        _ = sigint.recv() => {
            info!("Received SIGINT, shutting down gracefully...");
        }
        _ = sigterm.recv() => {
            info!("Received SIGTERM, shutting down gracefully...");
        }
    }

    connection.shutdown().await?;
    Ok(())
}

async fn handle_connection_event(
    handle: &ConnectionHandle,
    entities: &[AnyEntity],
    event: ConnectionEvent,
) {
    match event {
        ConnectionEvent::Connected => {
            // Retained documents may have been cleared while we were away
            for entity in entities {
                if let Err(e) = publish_discovery_document(handle, entity).await {
                    error!(
                        unique_id = entity.unique_id(),
                        "Failed to publish discovery document: {}", e
                    );
                }
            }
            info!(count = entities.len(), "Discovery documents published");
        }
        ConnectionEvent::Disconnected {
            reason,
            was_connected,
        } => {
            if was_connected {
                warn!(%reason, "Connection lost");
            } else {
                debug!(%reason, "Connect attempt failed");
            }
        }
        ConnectionEvent::Message(message) => {
            let target = entities
                .iter()
                .find(|e| e.command_topic() == Some(message.topic.as_str()));
            match target {
                Some(entity) => info!(
                    component = entity.component(),
                    unique_id = entity.unique_id(),
                    payload = %message.payload_str(),
                    "Command received"
                ),
                None => debug!(topic = %message.topic, "Message on unrouted topic"),
            }
        }
    }
}

fn handle_config_command(config: &NodeConfig, show: bool) -> NodeResult<()> {
    if show {
        let rendered = toml::to_string_pretty(&config.redacted())
            .map_err(|e| NodeError::internal_error(format!("Failed to render config: {e}")))?;
        println!("{rendered}");
    }

    info!(
        entities = config.entities.len(),
        "Configuration validation complete"
    );
    Ok(())
}
