use login_cache::domain::identity::IdentityOptions;
use login_cache::domain::reset::NoopReset;
use login_cache::infrastructure::cognito::{
    create_client, CognitoIdentityProvisioner, CognitoSessionFactory,
};
use login_cache::infrastructure::config::{Config, LogFormat};
use login_cache::LoginCache;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Smoke run of the full login lifecycle against real infrastructure:
/// register, provision, clean, tear down.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = Config::from_env().map_err(|e| anyhow::anyhow!("invalid configuration: {}", e))?;

    // Initialize logging
    init_logging(&config);

    tracing::info!(
        graphql_url = %config.graphql_url,
        region = %config.aws_region,
        logins = config.login_count,
        "Starting login cache smoke run"
    );

    let cognito = Arc::new(create_client(&config.aws_region).await);

    let provisioner = Arc::new(CognitoIdentityProvisioner::new(
        cognito.clone(),
        config.cognito_client_id.clone(),
        config.cognito_user_pool_id.clone(),
        config.email_prefix.clone(),
        config.email_domain.clone(),
    ));
    let session_factory = Arc::new(CognitoSessionFactory::new(
        cognito,
        config.cognito_client_id.clone(),
        config.graphql_url.clone(),
        config.graphql_auth_scheme,
    ));

    let identity_options = IdentityOptions {
        contact: None,
        auto_confirm: config.auto_confirm,
    };
    let cache = LoginCache::new(provisioner, session_factory, Arc::new(NoopReset))
        .with_identity_options(identity_options);
    cache.register_intended_use(config.login_count);

    let outcome = exercise(&cache, config.login_count).await;

    // Teardown runs even when the lifecycle failed half way
    let teardown = cache.teardown_all().await;

    outcome?;
    teardown?;

    tracing::info!("Login cache smoke run completed");
    Ok(())
}

async fn exercise(cache: &LoginCache, count: usize) -> anyhow::Result<()> {
    let mut logins = Vec::with_capacity(count);
    for _ in 0..count {
        let login = cache.acquire().await?;
        tracing::info!(
            index = login.index(),
            identity_id = %login.identity_id(),
            username = %login.username(),
            "Acquired login"
        );
        logins.push(login);
    }
    drop(logins);

    cache.clean_all().await?;

    let again = cache.acquire().await?;
    tracing::info!(index = again.index(), "Reacquired clean login");

    Ok(())
}

fn init_logging(config: &Config) {
    if config.log_format == LogFormat::Json {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "login_cache=debug".into()),
            )
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "login_cache=debug".into()),
            )
            .with(tracing_subscriber::fmt::layer().pretty())
            .init();
    }
}
