pub mod provisioner;
pub mod session_factory;

pub use provisioner::CognitoIdentityProvisioner;
pub use session_factory::CognitoSessionFactory;

use aws_sdk_cognitoidentityprovider::Client as CognitoClient;

/// Build a Cognito client from the default AWS credential chain
pub async fn create_client(region: &str) -> CognitoClient {
    let aws_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(aws_config::Region::new(region.to_string()))
        .load()
        .await;

    tracing::info!(
        region = ?aws_config.region(),
        "AWS configuration loaded"
    );

    CognitoClient::new(&aws_config)
}
