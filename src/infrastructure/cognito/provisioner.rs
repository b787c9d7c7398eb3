use crate::domain::identity::{
    generate_email, generate_password, ContactPoint, Credentials, Identity, IdentityOptions,
    IdentityProvisioner, ProvisionError, TeardownError,
};
use async_trait::async_trait;
use aws_sdk_cognitoidentityprovider::{
    error::DisplayErrorContext, types::AttributeType, Client as CognitoClient,
};
use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Cognito user pool implementation of the identity provisioner
pub struct CognitoIdentityProvisioner {
    client: Arc<CognitoClient>,
    client_id: String,
    user_pool_id: String,
    email_prefix: String,
    email_domain: String,
}

impl CognitoIdentityProvisioner {
    pub fn new(
        client: Arc<CognitoClient>,
        client_id: String,
        user_pool_id: String,
        email_prefix: String,
        email_domain: String,
    ) -> Self {
        Self {
            client,
            client_id,
            user_pool_id,
            email_prefix,
            email_domain,
        }
    }

    async fn confirm(&self, username: &str) -> Result<(), String> {
        self.client
            .admin_confirm_sign_up()
            .user_pool_id(&self.user_pool_id)
            .username(username)
            .send()
            .await
            .map(|_| ())
            .map_err(|e| format!("{}", DisplayErrorContext(&e)))
    }

    async fn delete_user(&self, username: &str) -> Result<(), TeardownError> {
        match self
            .client
            .admin_delete_user()
            .user_pool_id(&self.user_pool_id)
            .username(username)
            .send()
            .await
        {
            Ok(_) => Ok(()),
            Err(e) => match e.as_service_error() {
                Some(service_error) if service_error.is_user_not_found_exception() => {
                    tracing::debug!(username = %username, "Identity already deleted");
                    Ok(())
                }
                Some(_) => Err(TeardownError::Rejected(format!("{}", DisplayErrorContext(&e)))),
                None => Err(TeardownError::Unreachable(format!("{}", DisplayErrorContext(&e)))),
            },
        }
    }
}

#[async_trait]
impl IdentityProvisioner for CognitoIdentityProvisioner {
    async fn create(&self, options: IdentityOptions) -> Result<Identity, ProvisionError> {
        let contact = options
            .contact
            .unwrap_or_else(|| ContactPoint::Email(generate_email(&self.email_prefix, &self.email_domain)));
        let username = contact.value().to_string();
        let password = generate_password();

        let attribute = AttributeType::builder()
            .name(contact.attribute_name())
            .value(contact.value())
            .build()
            .map_err(|e| ProvisionError::Rejected(e.to_string()))?;

        tracing::info!(
            username = %username,
            auto_confirm = options.auto_confirm,
            "Signing up test identity"
        );

        let output = self
            .client
            .sign_up()
            .client_id(&self.client_id)
            .username(&username)
            .password(&password)
            .user_attributes(attribute)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(
                    error_display = %DisplayErrorContext(&e),
                    username = %username,
                    "Cognito sign_up failed"
                );
                match e.as_service_error() {
                    Some(_) => ProvisionError::Rejected(format!("{}", DisplayErrorContext(&e))),
                    None => ProvisionError::Unreachable(format!("{}", DisplayErrorContext(&e))),
                }
            })?;

        let identity_id = output.user_sub().to_string();
        let mut confirmed = output.user_confirmed();

        if options.auto_confirm && !confirmed {
            if let Err(reason) = self.confirm(&username).await {
                // Nobody owns the half-created account yet, so release it here
                if let Err(delete_error) = self.delete_user(&username).await {
                    tracing::warn!(
                        username = %username,
                        error = %delete_error,
                        "Failed to delete unconfirmed identity"
                    );
                }
                return Err(ProvisionError::Confirmation { username, reason });
            }
            confirmed = true;
        }

        let mut extras = BTreeMap::new();
        extras.insert("username".to_string(), username.clone());
        extras.insert(contact.attribute_name().to_string(), contact.value().to_string());

        tracing::info!(
            identity_id = %identity_id,
            username = %username,
            confirmed = confirmed,
            "Test identity created"
        );

        Ok(Identity {
            id: identity_id,
            credentials: Credentials::new(username, password),
            contact,
            confirmed,
            extras,
            created_at: Utc::now(),
        })
    }

    async fn delete(&self, identity: &Identity) -> Result<(), TeardownError> {
        tracing::info!(
            identity_id = %identity.id,
            username = %identity.username(),
            "Deleting test identity"
        );
        self.delete_user(identity.username()).await
    }
}
