//! Gnip PowerTrack client
//!
//! Manages an account's track rules (plus the replay rule set used for
//! backfill) and opens the long-lived PowerTrack stream.
//!
//! # Example
//!
//! ```no_run
//! use gnip_client::{GnipClient, Rule, RuleRegistry, StreamSession};
//!
//! # async fn example() -> Result<(), gnip_client::GnipError> {
//! let client = GnipClient::new("user", "password", "account")?;
//!
//! client.add_rules(&[Rule::new("#rustlang")]).await?;
//! for rule in client.list_active_rules().await? {
//!     println!("active: {}", rule);
//! }
//!
//! let mut stream = client.connect().await?;
//! while let Some(line) = stream.next_line().await? {
//!     if !line.is_empty() {
//!         println!("{}", String::from_utf8_lossy(&line));
//!     }
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # API Coverage
//!
//! - `GET|POST|DELETE /accounts/{account}/publishers/twitter/streams/track/Production/rules.json`
//! - `POST /accounts/{account}/publishers/twitter/replay/track/Production/rules.json`
//! - `GET /accounts/{account}/publishers/twitter/streams/track/Production.json`

mod client;
mod endpoints;
mod error;
mod rules;
mod stream;
mod types;

pub use client::GnipClient;
pub use endpoints::{AccountContext, Endpoints, DEFAULT_API_BASE_URL, DEFAULT_STREAM_BASE_URL};
pub use error::{GnipError, Result};
pub use rules::RuleRegistry;
pub use stream::{StreamHandle, StreamSession, STREAM_BUFFER_CAPACITY};
pub use types::{Credential, Rule, RuleSet};
