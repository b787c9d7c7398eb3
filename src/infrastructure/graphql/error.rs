use super::GraphqlError;

#[derive(Debug, thiserror::Error)]
pub enum GraphqlClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP status {status} with body: {body}")]
    Status { status: u16, body: String },

    #[error("GraphQL errors: {}", describe_all(.errors))]
    GraphqlErrors { errors: Vec<GraphqlError> },

    #[error("missing GraphQL data")]
    MissingData,

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

fn describe_all(errors: &[GraphqlError]) -> String {
    errors
        .iter()
        .map(GraphqlError::describe)
        .collect::<Vec<_>>()
        .join("; ")
}
