use super::{GraphqlClientError, GraphqlRequest, GraphqlResponse};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt;

/// How the token is presented in the `Authorization` header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthScheme {
    /// Raw token, as AppSync user-pool authorization expects
    #[default]
    Raw,
    /// `Bearer <token>`
    Bearer,
}

/// Authenticated GraphQL client bound to one identity
#[derive(Clone)]
pub struct GraphqlSession {
    endpoint: String,
    identity_id: String,
    token: String,
    auth_scheme: AuthScheme,
    expires_at: Option<DateTime<Utc>>,
    http_client: reqwest::Client,
}

impl fmt::Debug for GraphqlSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GraphqlSession")
            .field("endpoint", &self.endpoint)
            .field("identity_id", &self.identity_id)
            .field("auth_scheme", &self.auth_scheme)
            .field("expires_at", &self.expires_at)
            .finish_non_exhaustive()
    }
}

impl GraphqlSession {
    pub fn new(
        endpoint: impl Into<String>,
        identity_id: impl Into<String>,
        token: impl Into<String>,
    ) -> Self {
        Self {
            endpoint: endpoint.into(),
            identity_id: identity_id.into(),
            token: token.into(),
            auth_scheme: AuthScheme::default(),
            expires_at: None,
            http_client: reqwest::Client::new(),
        }
    }

    pub fn with_auth_scheme(mut self, auth_scheme: AuthScheme) -> Self {
        self.auth_scheme = auth_scheme;
        self
    }

    pub fn with_expiry(mut self, expires_at: DateTime<Utc>) -> Self {
        self.expires_at = Some(expires_at);
        self
    }

    /// Share a connection pool between sessions
    pub fn with_http_client(mut self, http_client: reqwest::Client) -> Self {
        self.http_client = http_client;
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn identity_id(&self) -> &str {
        &self.identity_id
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }

    pub fn is_expired(&self) -> bool {
        self.expires_at.map(|at| at <= Utc::now()).unwrap_or(false)
    }

    fn authorization_header(&self) -> String {
        match self.auth_scheme {
            AuthScheme::Raw => self.token.clone(),
            AuthScheme::Bearer => format!("Bearer {}", self.token),
        }
    }

    /// Execute a query or mutation and return the full response, GraphQL errors included
    pub async fn execute<V, T>(
        &self,
        query: &str,
        variables: V,
    ) -> Result<GraphqlResponse<T>, GraphqlClientError>
    where
        V: Serialize,
        T: DeserializeOwned,
    {
        let request = GraphqlRequest {
            query,
            variables,
            operation_name: None,
        };

        tracing::debug!(
            identity_id = %self.identity_id,
            endpoint = %self.endpoint,
            "Executing GraphQL request"
        );

        let response = self
            .http_client
            .post(&self.endpoint)
            .header("Authorization", self.authorization_header())
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            tracing::warn!(
                identity_id = %self.identity_id,
                status = status.as_u16(),
                "GraphQL request failed"
            );
            return Err(GraphqlClientError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Execute and return data only; any GraphQL error fails the call
    pub async fn execute_strict<V, T>(&self, query: &str, variables: V) -> Result<T, GraphqlClientError>
    where
        V: Serialize,
        T: DeserializeOwned,
    {
        let response = self.execute::<V, T>(query, variables).await?;
        if !response.errors.is_empty() {
            return Err(GraphqlClientError::GraphqlErrors {
                errors: response.errors,
            });
        }
        response.data.ok_or(GraphqlClientError::MissingData)
    }
}
