use crate::infrastructure::graphql::GraphqlClientError;

#[derive(Debug, thiserror::Error)]
pub enum ResetError {
    #[error("reset step '{step}' failed: {source}")]
    Transport {
        step: String,
        #[source]
        source: GraphqlClientError,
    },
    #[error("reset step '{step}' rejected: {reason}")]
    Rejected { step: String, reason: String },
}
