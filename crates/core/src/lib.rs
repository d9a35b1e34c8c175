//! Domain logic for the post-submission route worker: request extraction,
//! validation and reply framing. Free of I/O so it can be tested directly.

pub mod error;
pub mod form;
pub mod reply;
pub mod types;
pub mod validation;
