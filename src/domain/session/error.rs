#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("invalid credentials for {0}")]
    InvalidCredentials(String),
    #[error("unsupported authentication challenge: {0}")]
    Challenge(String),
    #[error("token exchange failed: {0}")]
    Exchange(String),
    #[error("invalid token: {0}")]
    InvalidToken(String),
    #[error("token subject {actual} does not match identity {expected}")]
    SubjectMismatch { expected: String, actual: String },
}
