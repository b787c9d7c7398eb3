use super::{Identity, IdentityOptions, ProvisionError, TeardownError};
use async_trait::async_trait;

/// Creates and deletes external identities.
/// Abstracts the underlying identity provider (Cognito user pool, test doubles, ...)
///
/// Implementations do not track what they create: ownership of a new
/// identity passes to the caller as soon as `create` returns.
#[async_trait]
pub trait IdentityProvisioner: Send + Sync {
    /// Register a brand new account, optionally confirming it
    ///
    /// # Errors
    /// Returns `ProvisionError` when the provider is unreachable or rejects
    /// the sign-up. Never retried here: retrying creation under a fixed
    /// identity would break uniqueness.
    async fn create(&self, options: IdentityOptions) -> Result<Identity, ProvisionError>;

    /// Permanently delete an account. An account that is already gone is a success.
    async fn delete(&self, identity: &Identity) -> Result<(), TeardownError>;
}
