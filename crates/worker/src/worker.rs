//! The route worker: registration, the request loop, and reply framing.
//!
//! The worker handles strictly one request at a time:
//!
//! 1. register once by sending the route name,
//! 2. block until the broker forwards a request,
//! 3. hand the payload to the [`RequestHandler`],
//! 4. answer with exactly one four-frame reply, whatever the outcome,
//! 5. repeat.
//!
//! Per-request failures are logged and answered, never propagated. The loop
//! ends on a transport failure, on a shutdown signal received while idle, or
//! when storage stays unreachable for too many requests in a row. The socket
//! is closed in every case.

use std::future::Future;

use polyblog_core::reply::{Reply, ReplyMode};
use polyblog_core::types::RouteName;
use polyblog_db::StoreError;
use tracing::Instrument;
use uuid::Uuid;

use crate::config::WorkerConfig;
use crate::handler::{HandlerError, RequestHandler};
use crate::health::{BackoffConfig, StorageHealth, StorageStatus};
use crate::identity::RegistrationIdentity;
use crate::store::PostStore;
use crate::transport::{Frames, Transport, TransportError};

/// Reasons the request loop stops other than a shutdown signal.
#[derive(Debug, thiserror::Error)]
pub enum WorkerError {
    #[error("Broker transport failed: {0}")]
    Transport(#[from] TransportError),

    #[error("Storage unavailable for {failures} consecutive requests")]
    StorageExhausted { failures: u32 },
}

pub struct RouteWorker<T, S> {
    transport: T,
    handler: RequestHandler<S>,
    identity: RegistrationIdentity,
    route: RouteName,
    redirect_location: String,
    reply_mode: ReplyMode,
    health: StorageHealth,
    served: u64,
}

impl<T, S> RouteWorker<T, S>
where
    T: Transport,
    S: PostStore,
{
    pub fn new(
        transport: T,
        handler: RequestHandler<S>,
        identity: RegistrationIdentity,
        config: &WorkerConfig,
    ) -> Self {
        Self {
            transport,
            handler,
            identity,
            route: config.route.clone(),
            redirect_location: config.redirect_location.clone(),
            reply_mode: config.reply_mode,
            health: StorageHealth::new(config.storage_failure_limit, BackoffConfig::default()),
            served: 0,
        }
    }

    /// Replace the backoff applied between requests while storage is down.
    pub fn with_backoff(mut self, backoff: BackoffConfig) -> Self {
        self.health = StorageHealth::new(self.health.limit(), backoff);
        self
    }

    /// Register, then serve requests until `shutdown` resolves or the loop
    /// fails. Returns the number of requests answered.
    pub async fn run<F>(mut self, shutdown: F) -> Result<u64, WorkerError>
    where
        F: Future<Output = ()>,
    {
        let result = self.serve(shutdown).await;

        tracing::info!(served = self.served, "Closing broker socket");
        self.transport.close().await;

        result
    }

    async fn serve<F>(&mut self, shutdown: F) -> Result<u64, WorkerError>
    where
        F: Future<Output = ()>,
    {
        self.register().await?;
        tokio::pin!(shutdown);

        loop {
            let request = tokio::select! {
                biased;
                () = &mut shutdown => {
                    tracing::info!("Shutdown requested, leaving request loop");
                    return Ok(self.served);
                }
                request = self.transport.recv() => request?,
            };
            self.serve_request(request).await?;
        }
    }

    /// Announce availability to the broker with a single route-name frame.
    async fn register(&mut self) -> Result<(), TransportError> {
        self.transport
            .send(vec![self.route.as_bytes().to_vec()])
            .await?;
        tracing::info!(
            route = %self.route,
            identity = %self.identity,
            "Responder ready",
        );
        Ok(())
    }

    /// Handle one request and send its reply.
    async fn serve_request(&mut self, request: Frames) -> Result<(), WorkerError> {
        self.served += 1;
        let span = tracing::info_span!("request", seq = self.served);

        async move {
            let mut frames = request.into_iter();
            let payload = frames.next().unwrap_or_default();
            if frames.len() > 0 {
                tracing::debug!(extra_frames = frames.len(), "Ignoring trailing request frames");
            }

            let result = self.handler.handle(&payload).await;
            let reply = self.reply_for(&result);
            self.transport.send(reply.to_frames(&self.route)).await?;
            tracing::debug!(status = reply.status, "Reply sent");

            self.track_storage(&result).await
        }
        .instrument(span)
        .await
    }

    fn reply_for(&self, result: &Result<Uuid, HandlerError>) -> Reply {
        match result {
            Ok(uuid) => {
                tracing::info!(%uuid, "Stored post");
                self.reply_mode.reply(&self.redirect_location, None)
            }
            Err(e) => {
                if let HandlerError::Storage(_) = e {
                    tracing::error!(error = %e, "Failed to store post");
                } else {
                    tracing::warn!(error = %e, "Rejected request");
                }
                let detail = e.client_detail();
                self.reply_mode
                    .reply(&self.redirect_location, Some((e.rejection(), &detail)))
            }
        }
    }

    /// Update storage health after a reply went out, backing off or giving
    /// up when the database keeps refusing connections.
    async fn track_storage(
        &mut self,
        result: &Result<Uuid, HandlerError>,
    ) -> Result<(), WorkerError> {
        let status = match result {
            Err(HandlerError::Storage(StoreError::Unavailable(_))) => {
                self.health.record_unavailable()
            }
            Ok(_) | Err(HandlerError::Storage(StoreError::Write(_))) => {
                self.health.record_reachable()
            }
            // Never reached the database.
            Err(HandlerError::Request(_)) => return Ok(()),
        };

        match status {
            StorageStatus::Healthy => Ok(()),
            StorageStatus::Degraded { failures, delay } => {
                tracing::warn!(
                    failures,
                    delay_ms = delay.as_millis() as u64,
                    "Storage unavailable, backing off before next request",
                );
                tokio::time::sleep(delay).await;
                Ok(())
            }
            StorageStatus::Exhausted { failures } => {
                Err(WorkerError::StorageExhausted { failures })
            }
        }
    }
}
