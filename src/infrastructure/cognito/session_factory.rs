use crate::domain::identity::Identity;
use crate::domain::session::{bind_session, AuthError, SessionFactory};
use crate::infrastructure::graphql::{AuthScheme, GraphqlSession};
use async_trait::async_trait;
use aws_sdk_cognitoidentityprovider::{
    error::DisplayErrorContext, types::AuthFlowType, Client as CognitoClient,
};
use std::sync::Arc;

/// Exchanges user-pool credentials for an ID token and binds a GraphQL session to it
pub struct CognitoSessionFactory {
    client: Arc<CognitoClient>,
    client_id: String,
    graphql_url: String,
    auth_scheme: AuthScheme,
    http_client: reqwest::Client,
}

impl CognitoSessionFactory {
    pub fn new(
        client: Arc<CognitoClient>,
        client_id: String,
        graphql_url: String,
        auth_scheme: AuthScheme,
    ) -> Self {
        Self {
            client,
            client_id,
            graphql_url,
            auth_scheme,
            http_client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl SessionFactory for CognitoSessionFactory {
    async fn authenticate(&self, identity: &Identity) -> Result<GraphqlSession, AuthError> {
        let username = identity.username();

        let output = self
            .client
            .initiate_auth()
            .auth_flow(AuthFlowType::UserPasswordAuth)
            .client_id(&self.client_id)
            .auth_parameters("USERNAME", username)
            .auth_parameters("PASSWORD", identity.credentials.password())
            .send()
            .await
            .map_err(|e| {
                tracing::error!(
                    error_display = %DisplayErrorContext(&e),
                    identity_id = %identity.id,
                    "Cognito initiate_auth failed"
                );
                match e.as_service_error() {
                    Some(service_error)
                        if service_error.is_not_authorized_exception()
                            || service_error.is_user_not_found_exception()
                            || service_error.is_user_not_confirmed_exception() =>
                    {
                        AuthError::InvalidCredentials(username.to_string())
                    }
                    _ => AuthError::Exchange(format!("{}", DisplayErrorContext(&e))),
                }
            })?;

        if let Some(challenge) = output.challenge_name() {
            return Err(AuthError::Challenge(challenge.as_str().to_string()));
        }

        let id_token = output
            .authentication_result()
            .and_then(|result| result.id_token())
            .ok_or_else(|| AuthError::InvalidToken("missing ID token".to_string()))?;

        let session = bind_session(&self.graphql_url, identity, id_token)?
            .with_auth_scheme(self.auth_scheme)
            .with_http_client(self.http_client.clone());

        tracing::info!(
            identity_id = %identity.id,
            expires_at = ?session.expires_at(),
            "Session authenticated"
        );

        Ok(session)
    }
}
