use crate::e2e::helpers;

use chrono::Utc;
use helpers::cognito_mocks::{cognito_error, cognito_ok, create_mock_cognito_client, generate_id_token};
use login_cache::domain::identity::{
    ContactPoint, Credentials, Identity, IdentityOptions, IdentityProvisioner, ProvisionError,
};
use login_cache::domain::session::{AuthError, SessionFactory};
use login_cache::infrastructure::cognito::{CognitoIdentityProvisioner, CognitoSessionFactory};
use login_cache::infrastructure::graphql::AuthScheme;
use serde_json::json;
use std::collections::BTreeMap;
use std::sync::Arc;
use wiremock::MockServer;

fn provisioner(server: &MockServer) -> CognitoIdentityProvisioner {
    CognitoIdentityProvisioner::new(
        Arc::new(create_mock_cognito_client(server)),
        "test-client-id".to_string(),
        "us-east-1_TestPool".to_string(),
        "login-cache".to_string(),
        "example.com".to_string(),
    )
}

fn session_factory(server: &MockServer) -> CognitoSessionFactory {
    CognitoSessionFactory::new(
        Arc::new(create_mock_cognito_client(server)),
        "test-client-id".to_string(),
        "https://api.example.com/graphql".to_string(),
        AuthScheme::Raw,
    )
}

fn identity(id: &str) -> Identity {
    let username = format!("{}@example.com", id);
    Identity {
        id: id.to_string(),
        credentials: Credentials::new(username.clone(), "Lc!password9z"),
        contact: ContactPoint::Email(username),
        confirmed: true,
        extras: BTreeMap::new(),
        created_at: Utc::now(),
    }
}

fn authentication_result(id_token: &str) -> serde_json::Value {
    json!({
        "AuthenticationResult": {
            "IdToken": id_token,
            "AccessToken": "access-token",
            "RefreshToken": "refresh-token",
            "ExpiresIn": 3600,
            "TokenType": "Bearer"
        },
        "ChallengeParameters": {}
    })
}

#[tokio::test]
async fn it_should_sign_up_and_confirm_a_fresh_identity() {
    let server = MockServer::start().await;
    cognito_ok("SignUp", json!({ "UserSub": "sub-123", "UserConfirmed": false }))
        .expect(1)
        .mount(&server)
        .await;
    cognito_ok("AdminConfirmSignUp", json!({}))
        .expect(1)
        .mount(&server)
        .await;

    let identity = provisioner(&server)
        .create(IdentityOptions::default())
        .await
        .unwrap();

    assert_eq!(identity.id, "sub-123");
    assert!(identity.confirmed);
    assert!(identity.username().starts_with("login-cache+"));
    assert!(identity.username().ends_with("@example.com"));
    assert_eq!(
        identity.extras.get("email").map(String::as_str),
        Some(identity.username())
    );
}

#[tokio::test]
async fn it_should_leave_identity_unconfirmed_when_asked() {
    let server = MockServer::start().await;
    cognito_ok("SignUp", json!({ "UserSub": "sub-456", "UserConfirmed": false }))
        .expect(1)
        .mount(&server)
        .await;
    cognito_ok("AdminConfirmSignUp", json!({}))
        .expect(0)
        .mount(&server)
        .await;

    let options = IdentityOptions::default()
        .with_contact(ContactPoint::Phone("+15555550123".to_string()))
        .unconfirmed();
    let identity = provisioner(&server).create(options).await.unwrap();

    assert!(!identity.confirmed);
    assert_eq!(identity.username(), "+15555550123");
    assert!(identity.extras.contains_key("phone_number"));
}

#[tokio::test]
async fn it_should_report_rejected_sign_up() {
    let server = MockServer::start().await;
    cognito_error(
        "SignUp",
        "InvalidPasswordException",
        "Password did not conform with policy",
    )
    .mount(&server)
    .await;

    let result = provisioner(&server).create(IdentityOptions::default()).await;

    assert!(matches!(result, Err(ProvisionError::Rejected(_))));
}

#[tokio::test]
async fn it_should_delete_the_account_when_confirmation_fails() {
    let server = MockServer::start().await;
    cognito_ok("SignUp", json!({ "UserSub": "sub-789", "UserConfirmed": false }))
        .mount(&server)
        .await;
    cognito_error(
        "AdminConfirmSignUp",
        "NotAuthorizedException",
        "User cannot be confirmed",
    )
    .mount(&server)
    .await;
    cognito_ok("AdminDeleteUser", json!({}))
        .expect(1)
        .mount(&server)
        .await;

    let result = provisioner(&server).create(IdentityOptions::default()).await;

    assert!(matches!(result, Err(ProvisionError::Confirmation { .. })));
}

#[tokio::test]
async fn it_should_treat_missing_user_as_deleted() {
    let server = MockServer::start().await;
    cognito_error("AdminDeleteUser", "UserNotFoundException", "User does not exist.")
        .expect(1)
        .mount(&server)
        .await;

    provisioner(&server)
        .delete(&identity("sub-123"))
        .await
        .unwrap();
}

#[tokio::test]
async fn it_should_bind_a_session_to_the_identity() {
    let server = MockServer::start().await;
    cognito_ok("InitiateAuth", authentication_result(&generate_id_token("sub-123")))
        .expect(1)
        .mount(&server)
        .await;

    let session = session_factory(&server)
        .authenticate(&identity("sub-123"))
        .await
        .unwrap();

    assert_eq!(session.identity_id(), "sub-123");
    assert_eq!(session.endpoint(), "https://api.example.com/graphql");
    assert!(session.expires_at().is_some());
    assert!(!session.is_expired());
}

#[tokio::test]
async fn it_should_reject_a_token_for_another_subject() {
    let server = MockServer::start().await;
    cognito_ok("InitiateAuth", authentication_result(&generate_id_token("sub-other")))
        .mount(&server)
        .await;

    let result = session_factory(&server)
        .authenticate(&identity("sub-123"))
        .await;

    match result {
        Err(AuthError::SubjectMismatch { expected, actual }) => {
            assert_eq!(expected, "sub-123");
            assert_eq!(actual, "sub-other");
        }
        other => panic!("expected subject mismatch, got {:?}", other),
    }
}

#[tokio::test]
async fn it_should_map_not_authorized_to_invalid_credentials() {
    let server = MockServer::start().await;
    cognito_error(
        "InitiateAuth",
        "NotAuthorizedException",
        "Incorrect username or password.",
    )
    .mount(&server)
    .await;

    let result = session_factory(&server)
        .authenticate(&identity("sub-123"))
        .await;

    assert!(matches!(result, Err(AuthError::InvalidCredentials(_))));
}

#[tokio::test]
async fn it_should_surface_unanswered_challenges() {
    let server = MockServer::start().await;
    cognito_ok(
        "InitiateAuth",
        json!({
            "ChallengeName": "NEW_PASSWORD_REQUIRED",
            "Session": "challenge-session",
            "ChallengeParameters": {}
        }),
    )
    .mount(&server)
    .await;

    let result = session_factory(&server)
        .authenticate(&identity("sub-123"))
        .await;

    match result {
        Err(AuthError::Challenge(name)) => assert_eq!(name, "NEW_PASSWORD_REQUIRED"),
        other => panic!("expected challenge, got {:?}", other),
    }
}
