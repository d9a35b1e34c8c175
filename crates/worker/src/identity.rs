use std::fmt;

use uuid::Uuid;

/// Transport identity presented to the broker for the life of the process.
///
/// Generated once in `main` and only ever read afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegistrationIdentity(Uuid);

impl RegistrationIdentity {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Identity bytes as sent on the socket: the hyphenated UUID text.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.0.to_string().into_bytes()
    }
}

impl fmt::Display for RegistrationIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
