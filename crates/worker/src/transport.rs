//! Messaging transport between the worker and the request broker.
//!
//! [`Transport`] is the seam the route worker talks through: multi-frame
//! messages out, multi-frame messages in. [`ZmqTransport`] is the
//! production implementation, a ZeroMQ REQ socket connected to the broker
//! under the worker's registration identity.

use async_trait::async_trait;
use bytes::Bytes;
use zeromq::util::PeerIdentity;
use zeromq::{ReqSocket, Socket, SocketOptions, SocketRecv, SocketSend, ZmqMessage};

use crate::health::BackoffConfig;
use crate::identity::RegistrationIdentity;

/// A message as an ordered list of frames.
pub type Frames = Vec<Vec<u8>>;

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("ZeroMQ error: {0}")]
    Zmq(#[from] zeromq::ZmqError),

    #[error("Socket is closed")]
    Closed,

    #[error("Refusing to send a message with no frames")]
    EmptyMessage,
}

/// Request/reply channel to the broker. Sends and receives strictly
/// alternate, starting with a send.
#[async_trait]
pub trait Transport: Send {
    /// Send one multi-frame message.
    async fn send(&mut self, frames: Frames) -> Result<(), TransportError>;

    /// Wait, without timeout, for the next message.
    async fn recv(&mut self) -> Result<Frames, TransportError>;

    /// Release the underlying socket. Further calls fail with
    /// [`TransportError::Closed`].
    async fn close(&mut self);
}

/// ZeroMQ REQ socket connected to the broker.
pub struct ZmqTransport {
    socket: Option<ReqSocket>,
}

impl ZmqTransport {
    /// Open a REQ socket carrying `identity` and connect it to `endpoint`
    /// (e.g. `tcp://localhost:4321`).
    pub async fn connect(
        endpoint: &str,
        identity: &RegistrationIdentity,
    ) -> Result<Self, TransportError> {
        let mut options = SocketOptions::default();
        options.peer_identity(PeerIdentity::try_from(identity.to_bytes())?);

        let mut socket = ReqSocket::with_options(options);
        socket.connect(endpoint).await?;
        tracing::debug!(endpoint, %identity, "Connected to broker");

        Ok(Self {
            socket: Some(socket),
        })
    }

    /// Like [`connect`](Self::connect), but keeps retrying with growing
    /// pauses while the broker is not accepting connections yet.
    ///
    /// Gives up with the last error after `max_attempts` failed attempts;
    /// `None` retries until the returned future is dropped.
    pub async fn connect_with_retry(
        endpoint: &str,
        identity: &RegistrationIdentity,
        backoff: &BackoffConfig,
        max_attempts: Option<u32>,
    ) -> Result<Self, TransportError> {
        let mut delay = backoff.initial_delay;
        let mut attempt = 0u32;

        loop {
            attempt += 1;
            match Self::connect(endpoint, identity).await {
                Ok(transport) => {
                    if attempt > 1 {
                        tracing::info!(endpoint, attempt, "Broker reachable");
                    }
                    return Ok(transport);
                }
                Err(e) if max_attempts.is_some_and(|max| attempt >= max) => return Err(e),
                Err(e) => {
                    tracing::warn!(
                        endpoint,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "Broker not reachable, retrying",
                    );
                    tokio::time::sleep(delay).await;
                    delay = backoff.next_delay(delay);
                }
            }
        }
    }

    fn socket(&mut self) -> Result<&mut ReqSocket, TransportError> {
        self.socket.as_mut().ok_or(TransportError::Closed)
    }
}

#[async_trait]
impl Transport for ZmqTransport {
    async fn send(&mut self, frames: Frames) -> Result<(), TransportError> {
        let mut frames = frames.into_iter().map(Bytes::from);
        let mut message = ZmqMessage::from(frames.next().ok_or(TransportError::EmptyMessage)?);
        for frame in frames {
            message.push_back(frame);
        }
        self.socket()?.send(message).await?;
        Ok(())
    }

    async fn recv(&mut self) -> Result<Frames, TransportError> {
        let message = self.socket()?.recv().await?;
        Ok(message
            .into_vec()
            .into_iter()
            .map(|frame| frame.to_vec())
            .collect())
    }

    async fn close(&mut self) {
        if let Some(socket) = self.socket.take() {
            for e in socket.close().await {
                tracing::warn!(error = %e, "Error while closing broker socket");
            }
        }
    }
}
