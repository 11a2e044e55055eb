//! PowerTrack stream connection
//!
//! `connect` returns as soon as response headers arrive. The body is left
//! open and handed to the caller as a [`StreamHandle`]; reconnects, keep-alive
//! detection and backoff belong to whoever drives the handle.

use crate::client::{api_error, GnipClient};
use crate::error::Result;
use async_trait::async_trait;
use bytes::{Buf, Bytes, BytesMut};
use reqwest::{Method, StatusCode};
use std::collections::VecDeque;
use std::fmt;

/// Receive buffer reserved per stream to absorb bursts (32 MiB)
pub const STREAM_BUFFER_CAPACITY: usize = 33_554_432;

/// Open the account's live stream
#[async_trait]
pub trait StreamSession: Send + Sync {
    async fn connect(&self) -> Result<StreamHandle>;
}

#[async_trait]
impl StreamSession for GnipClient {
    async fn connect(&self) -> Result<StreamHandle> {
        let response = self
            .send(Method::GET, self.account().stream_url(), None)
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.bytes().await?;
            return Err(api_error(status, &body));
        }

        Ok(StreamHandle::new(response))
    }
}

enum Source {
    Remote(reqwest::Response),
    Recorded(VecDeque<Bytes>),
    Closed,
}

/// A live stream body
///
/// Dropping the handle (or calling [`close`](Self::close)) releases the
/// connection. The handle also closes itself once the body ends or a read
/// fails; later reads return `Ok(None)`.
pub struct StreamHandle {
    status: StatusCode,
    source: Source,
    buffer: BytesMut,
    /// Bytes of `buffer` already searched for a newline
    scanned: usize,
}

impl StreamHandle {
    fn new(response: reqwest::Response) -> Self {
        Self::with_source(response.status(), Source::Remote(response))
    }

    /// Build a handle over pre-recorded chunks, for driving stream consumers
    /// without a transport
    pub fn from_chunks<I>(chunks: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Bytes>,
    {
        let chunks = chunks.into_iter().map(Into::into).collect();
        Self::with_source(StatusCode::OK, Source::Recorded(chunks))
    }

    fn with_source(status: StatusCode, source: Source) -> Self {
        Self {
            status,
            source,
            buffer: BytesMut::with_capacity(STREAM_BUFFER_CAPACITY),
            scanned: 0,
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn is_open(&self) -> bool {
        !matches!(self.source, Source::Closed)
    }

    /// Next raw chunk of the body, buffered bytes first
    pub async fn chunk(&mut self) -> Result<Option<Bytes>> {
        if !self.buffer.is_empty() {
            return Ok(Some(self.take_buffered()));
        }
        self.read_source().await
    }

    /// Next newline-delimited record without its `\n` or `\r\n`
    ///
    /// Keep-alive newlines come back as empty records. A trailing fragment
    /// with no newline is returned once the body ends.
    pub async fn next_line(&mut self) -> Result<Option<Bytes>> {
        loop {
            if let Some(pos) = self.buffer[self.scanned..].iter().position(|&b| b == b'\n') {
                let end = self.scanned + pos;
                let len = if end > 0 && self.buffer[end - 1] == b'\r' {
                    end - 1
                } else {
                    end
                };

                // Records are copied out so none of them pins the receive buffer
                let line = Bytes::copy_from_slice(&self.buffer[..len]);
                self.buffer.advance(end + 1);
                self.scanned = 0;
                return Ok(Some(line));
            }
            self.scanned = self.buffer.len();
            self.restore_capacity();

            match self.read_source().await? {
                Some(chunk) => self.buffer.extend_from_slice(&chunk),
                None => {
                    if self.buffer.is_empty() {
                        return Ok(None);
                    }
                    return Ok(Some(self.take_buffered()));
                }
            }
        }
    }

    /// Release the connection
    pub fn close(self) {}

    fn take_buffered(&mut self) -> Bytes {
        let rest = Bytes::copy_from_slice(&self.buffer);
        self.buffer.clear();
        self.scanned = 0;
        self.restore_capacity();
        rest
    }

    /// Reclaim consumed space so the full receive buffer is available again
    fn restore_capacity(&mut self) {
        if self.buffer.capacity() < STREAM_BUFFER_CAPACITY {
            self.buffer.reserve(STREAM_BUFFER_CAPACITY - self.buffer.len());
        }
    }

    async fn read_source(&mut self) -> Result<Option<Bytes>> {
        let next = match &mut self.source {
            Source::Remote(response) => response.chunk().await,
            Source::Recorded(chunks) => Ok(chunks.pop_front()),
            Source::Closed => Ok(None),
        };

        match next {
            Ok(Some(chunk)) => Ok(Some(chunk)),
            Ok(None) => {
                self.source = Source::Closed;
                Ok(None)
            }
            Err(e) => {
                self.source = Source::Closed;
                Err(e.into())
            }
        }
    }
}

impl fmt::Debug for StreamHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamHandle")
            .field("status", &self.status)
            .field("open", &self.is_open())
            .field("buffered", &self.buffer.len())
            .finish()
    }
}
