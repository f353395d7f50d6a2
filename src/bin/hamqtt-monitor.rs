//! hamqtt monitor
//!
//! Watches a broker for node presence records and Home Assistant discovery
//! traffic. Handy for checking what a node announced and whether its last
//! will fired.

use clap::Parser;
use rumqttc::v5::mqttbytes::v5::Packet;
use rumqttc::v5::mqttbytes::QoS;
use rumqttc::v5::{AsyncClient, Event, MqttOptions};
use std::time::Duration;
use tokio::signal;
use tracing::{error, info, warn};

/// Monitor presence and discovery traffic
#[derive(Parser)]
#[command(name = "hamqtt-monitor")]
#[command(about = "Watch node presence and discovery documents on an MQTT broker")]
#[command(version)]
struct Args {
    /// Which traffic to show
    #[arg(short, long, default_value = "all")]
    mode: MonitorMode,

    /// Output format
    #[arg(short, long, default_value = "pretty")]
    format: OutputFormat,

    /// Only show traffic for this node
    #[arg(long)]
    node_id: Option<String>,

    /// Discovery prefix the nodes publish under
    #[arg(long, default_value = "homeassistant")]
    prefix: String,

    /// MQTT broker host
    #[arg(long, default_value = "localhost")]
    broker_host: String,

    /// MQTT broker port
    #[arg(long, default_value_t = 1883)]
    broker_port: u16,

    /// MQTT username (optional)
    #[arg(long)]
    username: Option<String>,

    /// MQTT password (optional)
    #[arg(long)]
    password: Option<String>,
}

#[derive(Clone, Debug, clap::ValueEnum)]
enum MonitorMode {
    /// Presence records and all discovery traffic
    All,
    /// `<node_id>/connected` only
    Presence,
    /// Config documents only
    Discovery,
}

#[derive(Clone, Debug, clap::ValueEnum)]
enum OutputFormat {
    /// Coloured, with pretty-printed JSON
    Pretty,
    /// One line per message
    Compact,
    /// One JSON object per message
    Json,
}

/// What a topic carries, judged from its shape
#[derive(Debug, Clone, PartialEq)]
enum MessageKind {
    Presence,
    Config,
    State,
    Command,
    Other,
}

impl MessageKind {
    fn classify(topic: &str, prefix: &str) -> Self {
        let segments: Vec<&str> = topic.split('/').collect();
        match segments.as_slice() {
            [_, "connected"] => Self::Presence,
            [p, _, _, _, "config"] if *p == prefix => Self::Config,
            [p, _, _, _, "state"] if *p == prefix => Self::State,
            [p, _, _, _, "set"] if *p == prefix => Self::Command,
            _ => Self::Other,
        }
    }

    fn label(&self) -> &'static str {
        match self {
            Self::Presence => "PRESENCE",
            Self::Config => "CONFIG",
            Self::State => "STATE",
            Self::Command => "COMMAND",
            Self::Other => "OTHER",
        }
    }

    fn color_code(&self) -> &'static str {
        match self {
            Self::Presence => "\x1b[1;36m",
            Self::Config => "\x1b[1;32m",
            Self::State => "\x1b[1;33m",
            Self::Command => "\x1b[1;34m",
            Self::Other => "\x1b[0;37m",
        }
    }

    fn is_relevant_for_mode(&self, mode: &MonitorMode) -> bool {
        match mode {
            MonitorMode::All => true,
            MonitorMode::Presence => *self == Self::Presence,
            MonitorMode::Discovery => *self == Self::Config,
        }
    }
}

const RESET: &str = "\x1b[0m";

/// Node a topic belongs to: the first segment of a presence topic, the third
/// of a discovery topic
fn node_of<'a>(topic: &'a str, kind: &MessageKind) -> Option<&'a str> {
    let mut segments = topic.split('/');
    match kind {
        MessageKind::Presence => segments.next(),
        MessageKind::Config | MessageKind::State | MessageKind::Command => segments.nth(2),
        MessageKind::Other => None,
    }
}

fn format_message(
    kind: &MessageKind,
    topic: &str,
    payload: &str,
    retain: bool,
    format: &OutputFormat,
) -> String {
    let timestamp = chrono::Utc::now().format("%H:%M:%S");
    let payload_display = if payload.is_empty() && *kind == MessageKind::Config {
        "<removed>"
    } else {
        payload
    };

    match format {
        OutputFormat::Json => {
            let json_output = serde_json::json!({
                "timestamp": timestamp.to_string(),
                "kind": kind.label(),
                "topic": topic,
                "retain": retain,
                "payload": serde_json::from_str::<serde_json::Value>(payload)
                    .unwrap_or_else(|_| serde_json::Value::String(payload.to_string())),
            });
            json_output.to_string()
        }
        OutputFormat::Compact => format!(
            "{} [{}]{} {} {}",
            timestamp,
            kind.label(),
            if retain { " (retained)" } else { "" },
            topic,
            payload_display
        ),
        OutputFormat::Pretty => {
            let color = kind.color_code();
            let label = kind.label();
            let body = serde_json::from_str::<serde_json::Value>(payload)
                .ok()
                .and_then(|json| serde_json::to_string_pretty(&json).ok())
                .unwrap_or_else(|| payload_display.to_string());
            let retained = if retain { " (retained)" } else { "" };
            format!("{color}[{label}]{RESET}{retained} {timestamp} {topic}\n{body}\n")
        }
    }
}

fn mqtt_options(args: &Args) -> MqttOptions {
    let client_id = format!("hamqtt-monitor-{}", std::process::id());
    let mut options = MqttOptions::new(client_id, &args.broker_host, args.broker_port);
    if let (Some(username), Some(password)) = (&args.username, &args.password) {
        options.set_credentials(username, password);
    }
    options.set_keep_alive(Duration::from_secs(30));
    options.set_clean_start(true);
    options
}

async fn subscribe_to_topics(
    client: &AsyncClient,
    args: &Args,
) -> Result<(), rumqttc::v5::ClientError> {
    let node = args.node_id.as_deref().unwrap_or("+");
    if !matches!(args.mode, MonitorMode::Discovery) {
        client
            .subscribe(format!("{node}/connected"), QoS::AtLeastOnce)
            .await?;
    }
    if !matches!(args.mode, MonitorMode::Presence) {
        client
            .subscribe(format!("{}/#", args.prefix), QoS::AtLeastOnce)
            .await?;
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter("hamqtt_monitor=info,rumqttc=warn")
        .init();

    let args = Args::parse();

    println!("hamqtt monitor");
    println!("==============");
    println!("Mode: {:?}", args.mode);
    println!("Broker: {}:{}", args.broker_host, args.broker_port);
    if let Some(node) = &args.node_id {
        println!("Node filter: {node}");
    }
    println!("Press Ctrl+C to stop monitoring");
    println!();

    let (client, mut eventloop) = AsyncClient::new(mqtt_options(&args), 100);

    let mut reconnect_delay = 1;
    const MAX_RECONNECT_DELAY: u64 = 30;

    loop {
        let event = tokio::select! {
            _ = signal::ctrl_c() => {
                info!("Shutdown signal received, disconnecting...");
                if tokio::time::timeout(Duration::from_millis(500), client.disconnect())
                    .await
                    .is_err()
                {
                    warn!("Disconnect timed out");
                }
                return Ok(());
            }
            event = eventloop.poll() => event,
        };

        match event {
            Ok(Event::Incoming(Packet::Publish(publish))) => {
                let topic = String::from_utf8_lossy(&publish.topic);
                let payload = String::from_utf8_lossy(&publish.payload);
                let kind = MessageKind::classify(&topic, &args.prefix);

                if !kind.is_relevant_for_mode(&args.mode) {
                    continue;
                }
                if let Some(wanted) = &args.node_id {
                    if node_of(&topic, &kind) != Some(wanted.as_str()) {
                        continue;
                    }
                }

                let formatted =
                    format_message(&kind, &topic, &payload, publish.retain, &args.format);
                match args.format {
                    OutputFormat::Pretty => print!("{formatted}"),
                    _ => println!("{formatted}"),
                }
            }
            Ok(Event::Incoming(Packet::ConnAck(_))) => {
                info!("Connected to MQTT broker");
                reconnect_delay = 1;
                if let Err(e) = subscribe_to_topics(&client, &args).await {
                    error!("Failed to subscribe to topics: {}", e);
                }
            }
            Ok(_) => {}
            Err(e) => {
                warn!("MQTT connection error: {}, retrying in {}s", e, reconnect_delay);
                tokio::time::sleep(Duration::from_secs(reconnect_delay)).await;
                reconnect_delay = std::cmp::min(reconnect_delay * 2, MAX_RECONNECT_DELAY);
            }
        }
    }
}
