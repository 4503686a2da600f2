//! Authentication orchestration loop.
//!
//! Drives the cycle: fetch a batch of pending credential requests, verify
//! each against the directory, report outcomes to the gateway, sleep, repeat.
//! Processing is strictly sequential; the single directory connection's bound
//! identity serializes through authenticate/unbind pairs. Every error
//! reaching the loop terminates it — recovery is the enclosing process's
//! responsibility (log and restart externally).

#![deny(missing_docs)]

use adauth_core::services::{DirectoryService, RequestGateway};
use adauth_core::types::AuthResult;
use adauth_core::Result;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, error, warn};

/// Default sleep between polling cycles.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// The orchestration loop over a directory service and a request gateway.
pub struct AuthAgent {
    directory: Box<dyn DirectoryService>,
    gateway: Box<dyn RequestGateway>,
    poll_interval: Duration,
}

impl AuthAgent {
    /// Creates an agent with the default one-second poll interval.
    #[must_use]
    pub fn new(directory: Box<dyn DirectoryService>, gateway: Box<dyn RequestGateway>) -> Self {
        Self {
            directory,
            gateway,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// Overrides the post-batch poll interval.
    #[must_use]
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Runs the loop until an error terminates it.
    ///
    /// # Errors
    ///
    /// Returns the first error produced by fetching or by any per-request
    /// step; the error is logged with its code and failure scope before
    /// being propagated.
    pub async fn run(&mut self) -> Result<()> {
        loop {
            if let Err(err) = self.process_batch().await {
                error!(
                    code = err.error_code(),
                    scope = ?err.scope(),
                    "authentication loop terminating: {err}"
                );
                return Err(err);
            }
            sleep(self.poll_interval).await;
        }
    }

    /// Closes the directory connection.
    ///
    /// # Errors
    ///
    /// Forwards the backend error when the teardown fails.
    pub async fn shutdown(mut self) -> Result<()> {
        self.directory.close().await
    }

    async fn process_batch(&mut self) -> Result<()> {
        let requests = self.gateway.fetch_pending().await?;
        if !requests.is_empty() {
            debug!(count = requests.len(), "processing credential batch");
        }

        for request in &requests {
            let authenticated = self
                .directory
                .authenticate(&request.username, &request.password)
                .await?;

            if !authenticated {
                debug!(
                    request_id = %request.request_id,
                    username = %request.username,
                    "credentials not accepted; skipping"
                );
                continue;
            }

            let profile = self.directory.lookup_user(&request.username).await?;
            let result = AuthResult::accepted(request.request_id.clone(), profile);
            self.gateway.send_result(&request.request_id, &result).await?;

            // Identity reset is best-effort; the next authenticate rebinds anyway.
            if let Err(err) = self.directory.unbind().await {
                warn!(
                    request_id = %request.request_id,
                    "failed to reset directory identity: {err}"
                );
            }
        }

        Ok(())
    }
}
