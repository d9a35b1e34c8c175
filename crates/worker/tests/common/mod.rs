//! Shared fakes for route worker integration tests: a scripted broker
//! transport and a store that records inserts in memory.
#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use polyblog_db::models::post::CreatePost;
use polyblog_db::StoreError;
use polyblog_worker::config::WorkerConfig;
use polyblog_worker::handler::RequestHandler;
use polyblog_worker::health::BackoffConfig;
use polyblog_worker::identity::RegistrationIdentity;
use polyblog_worker::store::PostStore;
use polyblog_worker::transport::{Frames, Transport, TransportError};
use polyblog_worker::worker::RouteWorker;

pub const ROUTE: &str = "POST/_/post";

// ---------------------------------------------------------------------------
// Transport
// ---------------------------------------------------------------------------

/// Everything the worker did on its socket, observable after `run` returns.
#[derive(Debug, Default)]
pub struct BrokerLog {
    pub sent: Vec<Frames>,
    pub closed: bool,
}

/// Hands out queued requests in order, then reports the socket as closed.
pub struct ScriptedTransport {
    inbound: VecDeque<Result<Frames, TransportError>>,
    log: Arc<Mutex<BrokerLog>>,
}

impl ScriptedTransport {
    pub fn new(requests: Vec<Frames>) -> (Self, Arc<Mutex<BrokerLog>>) {
        Self::with_results(requests.into_iter().map(Ok).collect())
    }

    pub fn with_results(
        inbound: Vec<Result<Frames, TransportError>>,
    ) -> (Self, Arc<Mutex<BrokerLog>>) {
        let log = Arc::new(Mutex::new(BrokerLog::default()));
        let transport = Self {
            inbound: inbound.into(),
            log: Arc::clone(&log),
        };
        (transport, log)
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&mut self, frames: Frames) -> Result<(), TransportError> {
        let mut log = self.log.lock().unwrap();
        if log.closed {
            return Err(TransportError::Closed);
        }
        log.sent.push(frames);
        Ok(())
    }

    async fn recv(&mut self) -> Result<Frames, TransportError> {
        self.inbound.pop_front().unwrap_or(Err(TransportError::Closed))
    }

    async fn close(&mut self) {
        self.log.lock().unwrap().closed = true;
    }
}

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

/// Records inserted posts; failures can be queued ahead of time.
#[derive(Clone, Default)]
pub struct RecordingStore {
    posts: Arc<Mutex<Vec<CreatePost>>>,
    failures: Arc<Mutex<VecDeque<StoreError>>>,
}

impl RecordingStore {
    /// Make the next `n` inserts fail as if the database were down.
    pub fn fail_unavailable(&self, n: usize) {
        let mut failures = self.failures.lock().unwrap();
        for _ in 0..n {
            failures.push_back(StoreError::Unavailable(sqlx::Error::PoolTimedOut));
        }
    }

    /// Make the next insert fail after reaching the database.
    pub fn fail_write(&self) {
        self.failures
            .lock()
            .unwrap()
            .push_back(StoreError::Write(sqlx::Error::RowNotFound));
    }

    pub fn posts(&self) -> Vec<CreatePost> {
        self.posts.lock().unwrap().clone()
    }
}

#[async_trait]
impl PostStore for RecordingStore {
    async fn insert(&self, post: &CreatePost) -> Result<(), StoreError> {
        if let Some(err) = self.failures.lock().unwrap().pop_front() {
            return Err(err);
        }
        self.posts.lock().unwrap().push(post.clone());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

pub fn frame(payload: &str) -> Frames {
    vec![payload.as_bytes().to_vec()]
}

pub fn post_form(title: &str, content: &str) -> Frames {
    frame(&format!(
        r#"{{"PostForm":{{"title":[{}],"content":[{}]}}}}"#,
        serde_json::Value::from(title),
        serde_json::Value::from(content),
    ))
}

/// The reply every request gets in redirect mode.
pub fn redirect_reply() -> Frames {
    vec![
        ROUTE.as_bytes().to_vec(),
        b"302".to_vec(),
        br#"{"Location":"/_/"}"#.to_vec(),
        Vec::new(),
    ]
}

pub fn registration() -> Frames {
    vec![ROUTE.as_bytes().to_vec()]
}

/// A worker over the given fakes that never sleeps between failures.
pub fn worker(
    transport: ScriptedTransport,
    store: RecordingStore,
    config: &WorkerConfig,
) -> RouteWorker<ScriptedTransport, RecordingStore> {
    RouteWorker::new(
        transport,
        RequestHandler::new(store, config.limits),
        RegistrationIdentity::generate(),
        config,
    )
    .with_backoff(BackoffConfig {
        initial_delay: Duration::ZERO,
        max_delay: Duration::ZERO,
        multiplier: 2.0,
    })
}
