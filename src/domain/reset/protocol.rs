use super::ResetError;
use crate::infrastructure::graphql::GraphqlSession;
use async_trait::async_trait;

/// Returns an exercised account to a test-ready state.
///
/// This is not a full account wipe: implementations only touch the state
/// the calling suite is known to perturb. Reset is idempotent, so state that
/// is already absent counts as success.
#[async_trait]
pub trait ResetProtocol: Send + Sync {
    async fn reset(&self, session: &GraphqlSession) -> Result<(), ResetError>;
}

/// Reset for suites that track no per-account state
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopReset;

#[async_trait]
impl ResetProtocol for NoopReset {
    async fn reset(&self, _session: &GraphqlSession) -> Result<(), ResetError> {
        Ok(())
    }
}
