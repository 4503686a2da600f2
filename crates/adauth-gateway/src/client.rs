//! Asynchronous gateway client implementation.

use crate::Result;
use adauth_core::client::{
    ClientConfig, RetryPolicy, DEFAULT_POOL_IDLE_TIMEOUT, DEFAULT_POOL_MAX_IDLE_PER_HOST,
    GATEWAY_DEFAULT_TIMEOUT,
};
use adauth_core::services::RequestGateway;
use adauth_core::types::{AuthResult, CredentialRequest};
use adauth_core::Error;
use async_trait::async_trait;
use reqwest::{Client, ClientBuilder, RequestBuilder};
use secrecy::{ExposeSecret, SecretString};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info};
use url::Url;

const USER_AGENT: &str = concat!("adauth-gateway/", env!("CARGO_PKG_VERSION"));

/// Builder for [`GatewayClient`].
#[derive(Debug)]
pub struct GatewayClientBuilder {
    base_url: Url,
    http_config: ClientConfig,
    retry_policy: RetryPolicy,
    token: Option<SecretString>,
}

impl GatewayClientBuilder {
    /// Create a new builder with the provided gateway base URL.
    ///
    /// The URL should include the protocol and hostname
    /// (e.g. `https://queue.example.com`).
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigError`] if the URL is invalid.
    pub fn new(base_url: impl AsRef<str>) -> Result<Self> {
        let url = Url::parse(base_url.as_ref()).map_err(|err| {
            Error::ConfigError(format!(
                "Invalid gateway base URL `{}`: {err}",
                base_url.as_ref()
            ))
        })?;

        let client_config = ClientConfig::new()
            .with_timeout(Duration::from_secs(GATEWAY_DEFAULT_TIMEOUT))
            .with_pool_idle_timeout(Duration::from_secs(DEFAULT_POOL_IDLE_TIMEOUT))
            .with_pool_max_idle(DEFAULT_POOL_MAX_IDLE_PER_HOST);

        Ok(Self {
            base_url: url,
            retry_policy: client_config.retry_policy,
            http_config: client_config,
            token: None,
        })
    }

    /// Configure the bearer token sent in the `Authorization` header.
    #[must_use]
    pub fn with_token(mut self, token: SecretString) -> Self {
        self.token = Some(token);
        self
    }

    /// Override the retry policy used for fetches.
    #[must_use]
    pub fn with_retry_policy(mut self, retry_policy: RetryPolicy) -> Self {
        self.retry_policy = retry_policy;
        self
    }

    /// Override the HTTP client configuration.
    #[must_use]
    pub fn with_http_config(mut self, config: ClientConfig) -> Self {
        self.retry_policy = config.retry_policy;
        self.http_config = config;
        self
    }

    /// Build the gateway client.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigError`] if the HTTP client cannot be built.
    pub fn build(self) -> Result<GatewayClient> {
        let mut builder = ClientBuilder::new()
            .timeout(self.http_config.timeout)
            .user_agent(USER_AGENT)
            .pool_idle_timeout(self.http_config.pool_idle_timeout)
            .pool_max_idle_per_host(self.http_config.pool_max_idle_per_host)
            .connect_timeout(Duration::from_secs(10));

        if !self.http_config.enable_compression {
            builder = builder.no_gzip();
        }

        let http = builder.build().map_err(|err| {
            Error::ConfigError(format!("Failed to build gateway HTTP client: {err}"))
        })?;

        Ok(GatewayClient {
            http,
            base_url: self.base_url,
            retry_policy: self.retry_policy,
            token: self.token,
        })
    }
}

/// Asynchronous client for the credential-verification request queue.
#[derive(Clone)]
pub struct GatewayClient {
    http: Client,
    base_url: Url,
    retry_policy: RetryPolicy,
    token: Option<SecretString>,
}

impl GatewayClient {
    /// Create a builder for the given base URL.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigError`] if the URL is invalid.
    pub fn builder(base_url: impl AsRef<str>) -> Result<GatewayClientBuilder> {
        GatewayClientBuilder::new(base_url)
    }

    /// Access the underlying base URL.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn build_url(&self, path: &str) -> Result<Url> {
        let normalized = path.strip_prefix('/').unwrap_or(path);

        self.base_url.join(normalized).map_err(|err| {
            Error::ConfigError(format!("Invalid gateway path `{path}`: {err}"))
        })
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        let request = request.header("Accept", "application/json");
        match &self.token {
            Some(token) => request.bearer_auth(token.expose_secret()),
            None => request,
        }
    }

    /// Fetch the batch of pending credential-verification requests.
    ///
    /// Transport failures and server errors are retried per the configured
    /// policy; a client-error status fails immediately.
    ///
    /// # Errors
    ///
    /// Returns [`Error::FetchError`] for a non-success status and
    /// [`Error::ParseError`] for an unparseable body.
    pub async fn fetch_pending(&self) -> Result<Vec<CredentialRequest>> {
        let mut last_error: Option<Error> = None;
        let mut attempt = 0;

        loop {
            let url = self.build_url("auth")?;
            let request = self.authorized(self.http.get(url));

            info!(attempt, "fetching pending credential requests");

            match request.send().await {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        return response
                            .json::<Vec<CredentialRequest>>()
                            .await
                            .map_err(|err| {
                                Error::ParseError(format!(
                                    "Failed to parse pending requests: {err}"
                                ))
                            });
                    }

                    let text = response
                        .text()
                        .await
                        .unwrap_or_else(|_| "Unknown error".to_string());
                    let error = Error::FetchError(format!("status {status}: {text}"));
                    if status.is_server_error() {
                        last_error = Some(error);
                    } else {
                        return Err(error);
                    }
                }
                Err(err) => {
                    let error = Error::from(err);
                    if matches!(
                        error,
                        Error::Timeout(_) | Error::ConnectionError(_) | Error::HttpError(_)
                    ) {
                        last_error = Some(error);
                    } else {
                        return Err(error);
                    }
                }
            }

            attempt += 1;
            if attempt > self.retry_policy.max_retries {
                break;
            }
            let delay = self.retry_policy.delay_for_attempt(attempt);
            if delay > Duration::from_millis(0) {
                debug!("Retrying fetch after {:?}", delay);
                sleep(delay).await;
            }
        }

        Err(last_error.unwrap_or_else(|| {
            Error::FetchError("request failed after retries".to_string())
        }))
    }

    /// Report the outcome for one request.
    ///
    /// Exactly one attempt is made: result reporting is not idempotent.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SendError`] carrying the status code and response
    /// body for a non-success status.
    pub async fn send_result(&self, request_id: &str, result: &AuthResult) -> Result<()> {
        let url = self.build_url(&format!("auth/{request_id}"))?;
        let request = self.authorized(self.http.post(url)).json(result);

        info!(request_id, success = result.success, "sending authentication result");

        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        Err(Error::SendError {
            status: status.as_u16(),
            body,
        })
    }
}

#[async_trait]
impl RequestGateway for GatewayClient {
    async fn fetch_pending(&self) -> Result<Vec<CredentialRequest>> {
        GatewayClient::fetch_pending(self).await
    }

    async fn send_result(&self, request_id: &str, result: &AuthResult) -> Result<()> {
        GatewayClient::send_result(self, request_id, result).await
    }
}
