use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use serde::Deserialize;

use message_store::DEFAULT_CAPACITY;
use pubsub_transport::DEFAULT_ENDPOINT;
use whisper_engine::{DEFAULT_ACK_TIMEOUT, DEFAULT_QUERY_TIMEOUT, DEFAULT_TOKEN_LEN};

use crate::error::ServerError;

#[derive(Parser)]
#[command(name = "whisper-server", about = "Token exchange over Pub/Sub with publisher-side validation")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate tokens and publish them to the topic
    Publisher(PublisherArgs),
    /// Receive pushed tokens and validate them against the publisher
    Subscriber(SubscriberArgs),
    /// Run both roles in one process over an in-memory transport
    Standalone(StandaloneArgs),
}

// ═══════════════════════════════════════════════════════════════
//  CLI args
// ═══════════════════════════════════════════════════════════════

#[derive(Args, Clone, Debug)]
pub struct CommonArgs {
    /// Path to the TOML config file
    #[arg(long, default_value = "whisper.toml", env = "WHISPER_CONFIG")]
    pub config: String,

    /// HTTP listen port
    #[arg(long, env = "PORT")]
    pub port: Option<u16>,

    /// How many recent records the store keeps
    #[arg(long, env = "STORE_CAPACITY")]
    pub capacity: Option<usize>,
}

#[derive(Args, Clone, Debug)]
pub struct PublisherArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// GCP project that owns the topic
    #[arg(long, env = "PROJECT_ID")]
    pub project_id: Option<String>,

    /// Pub/Sub topic id
    #[arg(long, env = "PUBSUB_TOPIC")]
    pub topic: Option<String>,

    /// Pub/Sub REST endpoint (emulator or regional endpoint)
    #[arg(long, env = "PUBSUB_ENDPOINT")]
    pub pubsub_endpoint: Option<String>,

    /// OAuth access token for Pub/Sub
    #[arg(long, env = "PUBSUB_ACCESS_TOKEN", hide_env_values = true)]
    pub pubsub_token: Option<String>,

    /// Hex characters per token
    #[arg(long, env = "TOKEN_LEN")]
    pub token_len: Option<usize>,

    /// How long to wait for the publish acknowledgement, in ms
    #[arg(long, env = "PUBLISH_ACK_TIMEOUT_MS")]
    pub ack_timeout_ms: Option<u64>,
}

#[derive(Args, Clone, Debug)]
pub struct SubscriberArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Base URL of the publisher service
    #[arg(long, env = "PUBLISHER_APP_URL")]
    pub publisher_url: Option<String>,

    /// Identity token presented to the publisher on every validation query
    #[arg(long, env = "PUBLISHER_APP_ID_TOKEN", hide_env_values = true)]
    pub publisher_credential: Option<String>,

    /// Validation query timeout, in ms
    #[arg(long, env = "VALIDATE_TIMEOUT_MS")]
    pub query_timeout_ms: Option<u64>,
}

#[derive(Args, Clone, Debug)]
pub struct StandaloneArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Hex characters per token
    #[arg(long, env = "TOKEN_LEN")]
    pub token_len: Option<usize>,

    /// How long to wait for the publish acknowledgement, in ms
    #[arg(long, env = "PUBLISH_ACK_TIMEOUT_MS")]
    pub ack_timeout_ms: Option<u64>,
}

// ═══════════════════════════════════════════════════════════════
//  Config file (TOML)
// ═══════════════════════════════════════════════════════════════

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub port: Option<u16>,
    pub capacity: Option<usize>,
    #[serde(default)]
    pub publisher: PublisherSection,
    #[serde(default)]
    pub subscriber: SubscriberSection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PublisherSection {
    pub project_id: Option<String>,
    pub topic: Option<String>,
    pub pubsub_endpoint: Option<String>,
    pub pubsub_token: Option<String>,
    pub token_len: Option<usize>,
    pub ack_timeout_ms: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SubscriberSection {
    pub publisher_url: Option<String>,
    pub publisher_credential: Option<String>,
    pub query_timeout_ms: Option<u64>,
}

/// Read the config file. A missing file means defaults; a file that exists
/// but cannot be read or parsed is an error.
pub fn load_file(path: &str) -> Result<FileConfig, ServerError> {
    if !std::path::Path::new(path).exists() {
        return Ok(FileConfig::default());
    }
    let content = std::fs::read_to_string(path).map_err(|e| ServerError::config("read", format!("'{path}': {e}")))?;
    toml::from_str(&content).map_err(|e| ServerError::config("parse", format!("'{path}': {e}")))
}

fn required(value: Option<String>, name: &'static str, env: &str) -> Result<String, ServerError> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| ServerError::config(name, format!("must be set (--{} or {env})", name.replace('_', "-"))))
}

fn nonzero_ms(ms: u64, name: &'static str) -> Result<Duration, ServerError> {
    if ms == 0 {
        return Err(ServerError::config(name, "must be greater than 0"));
    }
    Ok(Duration::from_millis(ms))
}

// ═══════════════════════════════════════════════════════════════
//  Effective settings: config file < env/CLI
// ═══════════════════════════════════════════════════════════════

const DEFAULT_PORT: u16 = 8080;

#[derive(Debug, Clone)]
pub struct PublisherSettings {
    pub port: u16,
    pub capacity: usize,
    pub project_id: String,
    pub topic: String,
    pub pubsub_endpoint: String,
    pub pubsub_token: Option<String>,
    pub token_len: usize,
    pub ack_timeout: Duration,
}

impl PublisherSettings {
    pub fn resolve(args: &PublisherArgs) -> Result<Self, ServerError> {
        let file = load_file(&args.common.config)?;
        let sec = file.publisher;

        Ok(Self {
            port: args.common.port.or(file.port).unwrap_or(DEFAULT_PORT),
            capacity: args.common.capacity.or(file.capacity).unwrap_or(DEFAULT_CAPACITY),
            project_id: required(args.project_id.clone().or(sec.project_id), "project_id", "PROJECT_ID")?,
            topic: required(args.topic.clone().or(sec.topic), "topic", "PUBSUB_TOPIC")?,
            pubsub_endpoint: args
                .pubsub_endpoint
                .clone()
                .or(sec.pubsub_endpoint)
                .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string()),
            pubsub_token: args.pubsub_token.clone().or(sec.pubsub_token),
            token_len: args.token_len.or(sec.token_len).unwrap_or(DEFAULT_TOKEN_LEN),
            ack_timeout: nonzero_ms(
                args.ack_timeout_ms
                    .or(sec.ack_timeout_ms)
                    .unwrap_or(DEFAULT_ACK_TIMEOUT.as_millis() as u64),
                "ack_timeout_ms",
            )?,
        })
    }
}

#[derive(Debug, Clone)]
pub struct SubscriberSettings {
    pub port: u16,
    pub capacity: usize,
    pub publisher_url: String,
    pub publisher_credential: Option<String>,
    pub query_timeout: Duration,
}

impl SubscriberSettings {
    pub fn resolve(args: &SubscriberArgs) -> Result<Self, ServerError> {
        let file = load_file(&args.common.config)?;
        let sec = file.subscriber;

        Ok(Self {
            port: args.common.port.or(file.port).unwrap_or(DEFAULT_PORT),
            capacity: args.common.capacity.or(file.capacity).unwrap_or(DEFAULT_CAPACITY),
            publisher_url: required(
                args.publisher_url.clone().or(sec.publisher_url),
                "publisher_url",
                "PUBLISHER_APP_URL",
            )?,
            publisher_credential: args.publisher_credential.clone().or(sec.publisher_credential),
            query_timeout: nonzero_ms(
                args.query_timeout_ms
                    .or(sec.query_timeout_ms)
                    .unwrap_or(DEFAULT_QUERY_TIMEOUT.as_millis() as u64),
                "query_timeout_ms",
            )?,
        })
    }
}

/// Single-process mode reads the `[publisher]` section for token settings.
#[derive(Debug, Clone)]
pub struct StandaloneSettings {
    pub port: u16,
    pub capacity: usize,
    pub token_len: usize,
    pub ack_timeout: Duration,
}

impl StandaloneSettings {
    pub fn resolve(args: &StandaloneArgs) -> Result<Self, ServerError> {
        let file = load_file(&args.common.config)?;
        let sec = file.publisher;

        Ok(Self {
            port: args.common.port.or(file.port).unwrap_or(DEFAULT_PORT),
            capacity: args.common.capacity.or(file.capacity).unwrap_or(DEFAULT_CAPACITY),
            token_len: args.token_len.or(sec.token_len).unwrap_or(DEFAULT_TOKEN_LEN),
            ack_timeout: nonzero_ms(
                args.ack_timeout_ms
                    .or(sec.ack_timeout_ms)
                    .unwrap_or(DEFAULT_ACK_TIMEOUT.as_millis() as u64),
                "ack_timeout_ms",
            )?,
        })
    }
}
