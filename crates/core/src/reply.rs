//! Reply payloads and their four-frame wire encoding.
//!
//! Every request is answered with exactly four frames, in order:
//!
//! | Frame | Content                                   |
//! |-------|-------------------------------------------|
//! | 1     | route name (the broker routes on it)      |
//! | 2     | status code as a decimal string           |
//! | 3     | JSON object body                          |
//! | 4     | empty terminator                          |

use std::str::FromStr;

use serde_json::{json, Value};

use crate::types::RouteName;

/// Number of frames in every reply.
pub const REPLY_FRAME_COUNT: usize = 4;

pub const STATUS_FOUND: u16 = 302;
pub const STATUS_BAD_REQUEST: u16 = 400;
pub const STATUS_UNPROCESSABLE: u16 = 422;
pub const STATUS_INTERNAL_ERROR: u16 = 500;
pub const STATUS_UNAVAILABLE: u16 = 503;

/// Where clients are sent after submitting a post.
pub const DEFAULT_REDIRECT_LOCATION: &str = "/_/";

/// Status code and JSON body of a single reply.
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub status: u16,
    pub body: Value,
}

/// Why a request did not produce a stored post.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// Payload unreadable or missing the form structure.
    Malformed,
    /// Fields present but failed validation.
    Invalid,
    /// No storage connection could be obtained.
    StorageUnavailable,
    /// The insert itself failed.
    StorageFailed,
}

impl Rejection {
    pub fn status(self) -> u16 {
        match self {
            Self::Malformed => STATUS_BAD_REQUEST,
            Self::Invalid => STATUS_UNPROCESSABLE,
            Self::StorageUnavailable => STATUS_UNAVAILABLE,
            Self::StorageFailed => STATUS_INTERNAL_ERROR,
        }
    }
}

impl Reply {
    /// `302` pointing the client at `location`.
    pub fn redirect(location: &str) -> Self {
        Self {
            status: STATUS_FOUND,
            body: json!({ "Location": location }),
        }
    }

    /// Error reply carrying a short description of the failure.
    pub fn rejected(rejection: Rejection, detail: &str) -> Self {
        Self {
            status: rejection.status(),
            body: json!({ "error": detail }),
        }
    }

    /// Encode as the four reply frames addressed to `route`.
    pub fn to_frames(&self, route: &RouteName) -> Vec<Vec<u8>> {
        let mut frames = Vec::with_capacity(REPLY_FRAME_COUNT);
        frames.push(route.as_bytes().to_vec());
        frames.push(self.status.to_string().into_bytes());
        frames.push(self.body.to_string().into_bytes());
        frames.push(Vec::new());
        frames
    }
}

/// How request failures are reflected in the reply.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReplyMode {
    /// Always redirect, whatever happened to the request.
    #[default]
    Redirect,
    /// Redirect on success; report failures with an error status.
    Outcome,
}

impl ReplyMode {
    /// Build the reply for a request that ended with `rejection`
    /// (`None` when the post was stored).
    pub fn reply(self, location: &str, rejection: Option<(Rejection, &str)>) -> Reply {
        match (self, rejection) {
            (Self::Outcome, Some((rejection, detail))) => Reply::rejected(rejection, detail),
            _ => Reply::redirect(location),
        }
    }
}

impl FromStr for ReplyMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "redirect" => Ok(Self::Redirect),
            "outcome" => Ok(Self::Outcome),
            other => Err(format!(
                "unknown reply mode \"{other}\" (expected \"redirect\" or \"outcome\")"
            )),
        }
    }
}
