//! `polyblog-worker` library crate.
//!
//! A route worker registers with the request broker under a route name,
//! then answers form submissions one at a time: each is parsed, validated,
//! stored as a post, and answered with a four-frame reply. The binary
//! entrypoint lives in `main.rs`; modules are public for integration tests.

pub mod config;
pub mod handler;
pub mod health;
pub mod identity;
pub mod store;
pub mod transport;
pub mod worker;
