//! PowerTrack stream consumer
//!
//! Drives a [`StreamSession`]: splits the body into records, treats blank
//! lines as keep-alives, and reconnects with exponential backoff when the
//! stream ends, fails, or goes quiet for longer than the idle timeout.

use crate::error::{ConsumerError, Result};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use gnip_client::{StreamHandle, StreamSession};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::timeout;
use tracing::{debug, error, info, warn};

const MAX_RECONNECT_DELAY: Duration = Duration::from_secs(300);

/// Events emitted by the stream consumer
#[derive(Debug)]
pub enum FirehoseEvent {
    /// Stream connection established
    Connected,
    /// One activity record, without its line terminator
    Record(Bytes),
    /// Keep-alive newline from the server
    KeepAlive,
    /// Stream connection lost
    Disconnected,
    /// An error occurred
    Error(String),
}

#[derive(Debug, Clone)]
pub struct ConsumerSettings {
    /// Longest wait for the next complete line (a record or a keep-alive)
    /// before the stream is considered stalled
    pub idle_timeout: Duration,
    /// Consecutive failed connects before giving up
    pub max_reconnect_attempts: u32,
    pub initial_reconnect_delay: Duration,
}

impl Default for ConsumerSettings {
    fn default() -> Self {
        Self {
            idle_timeout: Duration::from_secs(30),
            max_reconnect_attempts: 10,
            initial_reconnect_delay: Duration::from_secs(1),
        }
    }
}

enum Consumed {
    Ended,
    ReceiverGone,
}

pub struct StreamConsumer<S> {
    session: S,
    settings: ConsumerSettings,
    event_tx: mpsc::Sender<FirehoseEvent>,
}

impl<S: StreamSession> StreamConsumer<S> {
    pub fn new(session: S, settings: ConsumerSettings, event_tx: mpsc::Sender<FirehoseEvent>) -> Self {
        Self {
            session,
            settings,
            event_tx,
        }
    }

    /// Consume the stream until the receiver goes away or reconnects run out
    ///
    /// Only failed connects count towards `max_reconnect_attempts`; a stream
    /// that connected and later ended is always retried.
    pub async fn run(&self) -> Result<()> {
        let mut reconnect_attempts: u32 = 0;

        loop {
            match self.session.connect().await {
                Ok(handle) => {
                    reconnect_attempts = 0;
                    let connected_at = Utc::now();
                    info!(status = %handle.status(), "PowerTrack stream connected");
                    if !self.emit(FirehoseEvent::Connected).await {
                        return Ok(());
                    }

                    match self.consume(handle, connected_at).await {
                        Consumed::ReceiverGone => return Ok(()),
                        Consumed::Ended => {
                            if !self.emit(FirehoseEvent::Disconnected).await {
                                return Ok(());
                            }
                        }
                    }
                }
                Err(e) => {
                    error!(error = %e, "Failed to connect to PowerTrack stream");
                    if !self.emit(FirehoseEvent::Error(e.to_string())).await {
                        return Ok(());
                    }

                    reconnect_attempts += 1;
                    if reconnect_attempts >= self.settings.max_reconnect_attempts {
                        return Err(ConsumerError::MaxReconnectAttempts);
                    }
                }
            }

            let delay = self.reconnect_delay(reconnect_attempts.max(1));
            warn!(
                "Reconnecting in {:?} (failed attempts {}/{})",
                delay, reconnect_attempts, self.settings.max_reconnect_attempts
            );
            tokio::time::sleep(delay).await;
        }
    }

    async fn consume(&self, mut handle: StreamHandle, connected_at: DateTime<Utc>) -> Consumed {
        let mut records: u64 = 0;

        loop {
            let line = match timeout(self.settings.idle_timeout, handle.next_line()).await {
                Ok(Ok(Some(line))) => line,
                Ok(Ok(None)) => {
                    warn!(records, connected_at = %connected_at, "PowerTrack stream closed by server");
                    return Consumed::Ended;
                }
                Ok(Err(e)) => {
                    error!(error = %e, records, "PowerTrack stream read failed");
                    return self.ended_with(e.to_string()).await;
                }
                Err(_) => {
                    let msg = format!(
                        "no data for {:?}, treating stream as stalled",
                        self.settings.idle_timeout
                    );
                    warn!(records, "{}", msg);
                    return self.ended_with(msg).await;
                }
            };

            let event = if line.is_empty() {
                debug!("Received keep-alive");
                FirehoseEvent::KeepAlive
            } else {
                records += 1;
                FirehoseEvent::Record(line)
            };
            if !self.emit(event).await {
                return Consumed::ReceiverGone;
            }
        }
    }

    async fn ended_with(&self, msg: String) -> Consumed {
        if self.emit(FirehoseEvent::Error(msg)).await {
            Consumed::Ended
        } else {
            Consumed::ReceiverGone
        }
    }

    async fn emit(&self, event: FirehoseEvent) -> bool {
        self.event_tx.send(event).await.is_ok()
    }

    fn reconnect_delay(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.settings
            .initial_reconnect_delay
            .saturating_mul(factor)
            .min(MAX_RECONNECT_DELAY)
    }
}
