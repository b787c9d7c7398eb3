use super::AuthError;
use crate::domain::identity::Identity;
use crate::infrastructure::graphql::GraphqlSession;
use async_trait::async_trait;

/// Turns identity credentials into an authorized GraphQL client.
#[async_trait]
pub trait SessionFactory: Send + Sync {
    /// Run the token exchange for `identity` and build a session bound to it
    ///
    /// Must be safe to call repeatedly for the same identity; every call
    /// returns a functionally equivalent session.
    ///
    /// # Errors
    /// `AuthError` is fatal for the owning login: it is never retried.
    async fn authenticate(&self, identity: &Identity) -> Result<GraphqlSession, AuthError>;
}
