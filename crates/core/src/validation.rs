//! Optional length and charset rules applied to a submission before it is
//! stored. With [`PostLimits::default`] every submission passes, so posts
//! are never dropped unless limits were configured.

use crate::error::CoreError;
use crate::form::PostSubmission;

/// Rules a submission must satisfy. Each rule is off unless set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PostLimits {
    /// Maximum `title` length in characters.
    pub max_title_len: Option<usize>,
    /// Maximum `content` length in characters.
    pub max_content_len: Option<usize>,
    /// Reject control characters other than tab, CR and LF.
    pub reject_control_chars: bool,
}

impl PostLimits {
    pub fn is_unrestricted(&self) -> bool {
        *self == Self::default()
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Validate a submission against `limits`.
pub fn validate_submission(post: &PostSubmission, limits: &PostLimits) -> Result<(), CoreError> {
    validate_field("title", &post.title, limits.max_title_len, limits)?;
    validate_field("content", &post.content, limits.max_content_len, limits)?;
    Ok(())
}

fn validate_field(
    name: &str,
    value: &str,
    max_len: Option<usize>,
    limits: &PostLimits,
) -> Result<(), CoreError> {
    if let Some(max_len) = max_len {
        let len = value.chars().count();
        if len > max_len {
            return Err(CoreError::Validation(format!(
                "{name} must not exceed {max_len} characters (got {len})"
            )));
        }
    }
    if limits.reject_control_chars {
        if let Some(pos) = value.chars().position(is_disallowed) {
            return Err(CoreError::Validation(format!(
                "{name} contains a control character at position {pos}"
            )));
        }
    }
    Ok(())
}

fn is_disallowed(c: char) -> bool {
    c.is_control() && !matches!(c, '\n' | '\r' | '\t')
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
