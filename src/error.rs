use crate::domain::identity::{ProvisionError, TeardownError};
use crate::domain::reset::ResetError;
use crate::domain::session::AuthError;
use std::fmt;

/// Failure of one login during a bulk operation
#[derive(Debug)]
pub struct EntryFailure<E> {
    pub index: usize,
    pub identity_id: String,
    pub error: E,
}

impl<E: fmt::Display> fmt::Display for EntryFailure<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "login {} ({}): {}", self.index, self.identity_id, self.error)
    }
}

/// Main login cache error type
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("failed to provision login {index}: {source}")]
    Provision {
        index: usize,
        #[source]
        source: ProvisionError,
    },

    #[error("failed to authenticate login {index} ({identity_id}): {source}")]
    Auth {
        index: usize,
        identity_id: String,
        #[source]
        source: AuthError,
    },

    #[error("login pool exhausted: no clean or unprovisioned login left of {registered} registered")]
    PoolExhausted { registered: usize },

    #[error("login {index} is no longer checked out by this handle")]
    StaleLogin { index: usize },

    #[error("failed to clean {} login(s): {}", .failures.len(), join(.failures))]
    CleanFailed { failures: Vec<EntryFailure<ResetError>> },

    #[error("failed to tear down {} login(s): {}", .failures.len(), join(.failures))]
    TeardownFailed {
        failures: Vec<EntryFailure<TeardownError>>,
    },
}

fn join<E: fmt::Display>(failures: &[EntryFailure<E>]) -> String {
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Custom result type for the login cache
pub type CacheResult<T> = Result<T, CacheError>;
