//! Signed, time-limited CSRF tokens.
//!
//! A token is `<unix-seconds>.<hex sha256(secret ":" unix-seconds)>` and is
//! accepted for [`TOKEN_TTL`] after it was issued.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use sha2::{Digest, Sha256};

/// Name of the hidden form field carrying the token.
pub const CSRF_FIELD: &str = "csrf_token";

/// How long an issued token stays valid.
pub const TOKEN_TTL: Duration = Duration::from_secs(3600);

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum CsrfError {
    #[error("The CSRF token is missing.")]
    Missing,
    #[error("The CSRF token is invalid or has expired.")]
    Invalid,
}

/// Issues and checks tokens signed with the application secret.
#[derive(Clone)]
pub struct CsrfGuard {
    secret: String,
}

impl std::fmt::Debug for CsrfGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CsrfGuard").finish_non_exhaustive()
    }
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

impl CsrfGuard {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    fn sign(&self, timestamp: u64) -> String {
        let digest = Sha256::new()
            .chain_update(self.secret.as_bytes())
            .chain_update(b":")
            .chain_update(timestamp.to_string().as_bytes())
            .finalize();
        format!("{digest:x}")
    }

    /// Token for the current time.
    pub fn issue(&self) -> String {
        self.issue_at(now_secs())
    }

    pub fn issue_at(&self, timestamp: u64) -> String {
        format!("{timestamp}.{}", self.sign(timestamp))
    }

    /// Check a submitted token against the current time.
    pub fn verify(&self, token: Option<&str>) -> Result<(), CsrfError> {
        self.verify_at(token, now_secs())
    }

    pub fn verify_at(&self, token: Option<&str>, now: u64) -> Result<(), CsrfError> {
        let token = token.map(str::trim).filter(|t| !t.is_empty()).ok_or(CsrfError::Missing)?;
        let (timestamp, signature) = token.split_once('.').ok_or(CsrfError::Invalid)?;
        let timestamp: u64 = timestamp.parse().map_err(|_| CsrfError::Invalid)?;

        if timestamp > now || now - timestamp > TOKEN_TTL.as_secs() {
            return Err(CsrfError::Invalid);
        }
        if self.sign(timestamp) != signature {
            return Err(CsrfError::Invalid);
        }
        Ok(())
    }
}
