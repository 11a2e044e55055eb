//! Gnip Consumer - PowerTrack rule management and stream consumer
//!
//! Reads account credentials from the environment, keeps the account's rules
//! in sync and writes every stream record to stdout, one per line.

mod config;
mod consumer;
mod error;
mod sync;

use crate::config::Config;
use crate::consumer::{ConsumerSettings, FirehoseEvent, StreamConsumer};
use crate::error::Result;
use crate::sync::sync_rules;
use clap::{Parser, Subcommand};
use gnip_client::{GnipClient, Rule, RuleRegistry};
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tracing::{error, info, warn};
use tracing_subscriber::{prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "gnip-consumer", about = "Manage PowerTrack rules and consume the stream")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Manage the live stream's rules
    Rules {
        #[command(subcommand)]
        action: RulesAction,
    },
    /// Manage replay (backfill) rules
    Replay {
        #[command(subcommand)]
        action: ReplayAction,
    },
    /// Make the active rules match GNIP_RULES
    Sync,
    /// Consume the stream and print each record to stdout
    Stream {
        /// Sync rules from GNIP_RULES before connecting
        #[arg(long)]
        sync: bool,
    },
}

#[derive(Subcommand)]
enum RulesAction {
    /// Print the active rules
    List,
    /// Add rules
    Add {
        #[arg(required = true)]
        values: Vec<String>,
    },
    /// Remove rules
    Remove {
        #[arg(required = true)]
        values: Vec<String>,
    },
}

#[derive(Subcommand)]
enum ReplayAction {
    /// Add rules to the replay rule set
    Add {
        #[arg(required = true)]
        values: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let env_filter = EnvFilter::from_default_env().add_directive("gnip_consumer=info".parse()?);

    // Logs go to stderr; stdout carries stream records
    if std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false)
    {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_stackdriver::layer().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .init();
    };

    let cli = Cli::parse();
    let config = Config::from_env()?;
    info!(account = %config.account, "Starting Gnip consumer");

    let client = GnipClient::with_endpoints(
        config.credential.clone(),
        &config.account,
        &config.endpoints,
    )?;

    match cli.command {
        Command::Rules { action } => match action {
            RulesAction::List => {
                let mut stdout = tokio::io::stdout();
                for rule in client.list_active_rules().await? {
                    stdout.write_all(rule.value().as_bytes()).await?;
                    stdout.write_all(b"\n").await?;
                }
                stdout.flush().await?;
            }
            RulesAction::Add { values } => {
                let rules = to_rules(values);
                client.add_rules(&rules).await?;
                info!(count = rules.len(), "Rules added");
            }
            RulesAction::Remove { values } => {
                let rules = to_rules(values);
                client.remove_rules(&rules).await?;
                info!(count = rules.len(), "Rules removed");
            }
        },
        Command::Replay {
            action: ReplayAction::Add { values },
        } => {
            let rules = to_rules(values);
            client.add_rules_to_replay(&rules).await?;
            info!(count = rules.len(), "Replay rules added");
        }
        Command::Sync => {
            sync_rules(&client, config.desired_rules()?).await?;
        }
        Command::Stream { sync } => {
            if sync {
                sync_rules(&client, config.desired_rules()?).await?;
            }
            let settings = ConsumerSettings {
                idle_timeout: config.idle_timeout,
                max_reconnect_attempts: config.max_reconnect_attempts,
                ..Default::default()
            };
            stream(client, settings, &mut tokio::io::stdout()).await?;
        }
    }

    Ok(())
}

fn to_rules(values: Vec<String>) -> Vec<Rule> {
    values.into_iter().map(Rule::from).collect()
}

async fn stream<W>(client: GnipClient, settings: ConsumerSettings, out: &mut W) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    // Create channel for stream events
    let (event_tx, mut event_rx) = mpsc::channel::<FirehoseEvent>(1000);
    let consumer = StreamConsumer::new(client, settings, event_tx);
    let consumer_task = tokio::spawn(async move { consumer.run().await });

    let records = write_records(&mut event_rx, out).await?;
    info!(records, "PowerTrack stream finished");

    consumer_task.await?
}

/// Write each record followed by a newline until the channel closes
async fn write_records<W>(
    event_rx: &mut mpsc::Receiver<FirehoseEvent>,
    out: &mut W,
) -> Result<u64>
where
    W: AsyncWrite + Unpin,
{
    let mut records: u64 = 0;

    while let Some(event) = event_rx.recv().await {
        match event {
            FirehoseEvent::Connected => info!("Connected to PowerTrack"),
            FirehoseEvent::Disconnected => warn!(records, "Disconnected from PowerTrack"),
            FirehoseEvent::Error(e) => error!("PowerTrack error: {}", e),
            FirehoseEvent::KeepAlive => {}
            FirehoseEvent::Record(record) => {
                records += 1;
                out.write_all(&record).await?;
                out.write_all(b"\n").await?;
            }
        }
    }
    out.flush().await?;

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConsumerError;
    use bytes::Bytes;
    use gnip_client::{Credential, Endpoints};
    use std::time::Duration;

    #[tokio::test]
    async fn test_write_records_prints_only_records() {
        let (tx, mut rx) = mpsc::channel(16);
        for event in [
            FirehoseEvent::Connected,
            FirehoseEvent::Record(Bytes::from_static(b"{\"id\":1}")),
            FirehoseEvent::KeepAlive,
            FirehoseEvent::Error("no data".to_string()),
            FirehoseEvent::Disconnected,
            FirehoseEvent::Connected,
            FirehoseEvent::Record(Bytes::from_static(b"{\"id\":2}")),
        ] {
            tx.send(event).await.unwrap();
        }
        drop(tx);

        let mut out = Vec::new();
        let records = write_records(&mut rx, &mut out).await.unwrap();
        assert_eq!(records, 2);
        assert_eq!(out, b"{\"id\":1}\n{\"id\":2}\n");
    }

    #[tokio::test]
    async fn test_stream_returns_consumer_failure() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = GnipClient::with_endpoints(
            Credential::new("user", "pass"),
            "acme",
            &Endpoints::single_host(&format!("http://{}", addr)),
        )
        .unwrap();
        let settings = ConsumerSettings {
            max_reconnect_attempts: 1,
            initial_reconnect_delay: Duration::from_millis(1),
            ..Default::default()
        };

        let mut out = Vec::new();
        let result = stream(client, settings, &mut out).await;
        assert!(matches!(result, Err(ConsumerError::MaxReconnectAttempts)));
        assert!(out.is_empty());
    }
}
