use serde::{Deserialize, Serialize};

/// GraphQL request payload
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphqlRequest<'a, V> {
    pub query: &'a str,
    pub variables: V,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operation_name: Option<&'a str>,
}

/// GraphQL response container
#[derive(Debug, Clone, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct GraphqlResponse<T> {
    #[serde(default)]
    pub data: Option<T>,
    #[serde(default)]
    pub errors: Vec<GraphqlError>,
}

/// A single entry of the `errors` array
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphqlError {
    pub message: String,
    #[serde(default)]
    pub path: Vec<serde_json::Value>,
    /// AppSync reports the error class here (e.g. "DynamoDB:ConditionalCheckFailedException")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extensions: Option<serde_json::Value>,
}

impl GraphqlError {
    /// Message and error type joined, for matching and logs
    pub fn describe(&self) -> String {
        match &self.error_type {
            Some(error_type) => format!("{}: {}", error_type, self.message),
            None => self.message.clone(),
        }
    }
}
