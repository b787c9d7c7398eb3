#[derive(Debug, thiserror::Error)]
pub enum ProvisionError {
    #[error("identity service unreachable: {0}")]
    Unreachable(String),
    #[error("identity creation rejected: {0}")]
    Rejected(String),
    #[error("failed to confirm identity {username}: {reason}")]
    Confirmation { username: String, reason: String },
}

#[derive(Debug, thiserror::Error)]
pub enum TeardownError {
    #[error("identity service unreachable: {0}")]
    Unreachable(String),
    #[error("identity deletion rejected: {0}")]
    Rejected(String),
}
