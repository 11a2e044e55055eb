//! Gnip client facade: credentials, account URLs and request signing

use crate::endpoints::{AccountContext, Endpoints};
use crate::error::{GnipError, Result};
use crate::types::Credential;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Method, StatusCode};
use std::time::Duration;
use tracing::debug;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Client for one Gnip PowerTrack account
///
/// Holds the credential and the account's endpoint URLs, both fixed at
/// construction. Rule management lives in [`RuleRegistry`](crate::RuleRegistry)
/// and streaming in [`StreamSession`](crate::StreamSession), both implemented
/// on this type.
#[derive(Debug, Clone)]
pub struct GnipClient {
    http: reqwest::Client,
    credential: Credential,
    account: AccountContext,
}

impl GnipClient {
    /// Create a client for `account` against the production endpoints
    pub fn new(username: &str, password: &str, account: &str) -> Result<Self> {
        Self::with_endpoints(
            Credential::new(username, password),
            account,
            &Endpoints::default(),
        )
    }

    /// Create a client against custom base URLs
    ///
    /// The default transport only bounds the connect phase; a total request
    /// timeout would cut the stream.
    pub fn with_endpoints(
        credential: Credential,
        account: &str,
        endpoints: &Endpoints,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .build()?;

        Ok(Self::with_http_client(
            http,
            credential,
            AccountContext::new(account, endpoints),
        ))
    }

    /// Create a client around a caller-configured transport
    pub fn with_http_client(
        http: reqwest::Client,
        credential: Credential,
        account: AccountContext,
    ) -> Self {
        Self {
            http,
            credential,
            account,
        }
    }

    pub fn account(&self) -> &AccountContext {
        &self.account
    }

    pub fn username(&self) -> &str {
        self.credential.username()
    }

    /// Send one authenticated request; every remote call goes through here
    pub(crate) async fn send(
        &self,
        method: Method,
        url: &str,
        body: Option<Vec<u8>>,
    ) -> Result<reqwest::Response> {
        debug!(method = %method, url = %url, "Sending Gnip request");

        let mut request = self
            .http
            .request(method, url)
            .basic_auth(self.credential.username(), Some(self.credential.password()));
        if let Some(body) = body {
            request = request.header(CONTENT_TYPE, "application/json").body(body);
        }

        Ok(request.send().await?)
    }
}

/// Turn a drained non-success response into an `Api` error
pub(crate) fn api_error(status: StatusCode, body: &[u8]) -> GnipError {
    GnipError::Api {
        status: status.as_u16(),
        body: String::from_utf8_lossy(body).trim().to_string(),
    }
}
