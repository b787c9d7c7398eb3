use crate::infrastructure::graphql::AuthScheme;
use serde::Deserialize;
use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub graphql_url: String,
    pub graphql_auth_scheme: AuthScheme,
    pub aws_region: String,
    // Cognito user pool
    pub cognito_client_id: String,
    pub cognito_user_pool_id: String,
    // Test identities
    pub email_prefix: String,
    pub email_domain: String,
    pub auto_confirm: bool,
    pub login_count: usize,
    pub environment: Environment,
    pub log_format: LogFormat,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Development,
    Production,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

impl Config {
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        dotenvy::dotenv().ok();

        let config = Config {
            graphql_url: env::var("GRAPHQL_URL")?,
            graphql_auth_scheme: match env::var("GRAPHQL_AUTH_SCHEME")
                .unwrap_or_else(|_| "raw".to_string())
                .to_lowercase()
                .as_str()
            {
                "bearer" => AuthScheme::Bearer,
                _ => AuthScheme::Raw,
            },
            aws_region: env::var("AWS_REGION").unwrap_or_else(|_| "eu-west-1".to_string()),
            cognito_client_id: env::var("COGNITO_CLIENT_ID")?,
            cognito_user_pool_id: env::var("COGNITO_USER_POOL_ID")?,
            email_prefix: env::var("TEST_EMAIL_PREFIX")
                .unwrap_or_else(|_| "login-cache".to_string()),
            email_domain: env::var("TEST_EMAIL_DOMAIN")
                .unwrap_or_else(|_| "example.com".to_string()),
            auto_confirm: env::var("AUTO_CONFIRM")
                .unwrap_or_else(|_| "true".to_string())
                .parse::<String>()
                .map(|s| matches!(s.to_lowercase().as_str(), "true" | "1" | "yes"))
                .unwrap_or(true),
            login_count: env::var("LOGIN_COUNT")
                .unwrap_or_else(|_| "2".to_string())
                .parse()?,
            environment: match env::var("ENVIRONMENT")
                .unwrap_or_else(|_| "development".to_string())
                .as_str()
            {
                "production" => Environment::Production,
                _ => Environment::Development,
            },
            log_format: match env::var("LOG_FORMAT")
                .unwrap_or_else(|_| "pretty".to_string())
                .as_str()
            {
                "json" => LogFormat::Json,
                _ => LogFormat::Pretty,
            },
        };

        Ok(config)
    }

    pub fn is_development(&self) -> bool {
        self.environment == Environment::Development
    }
}
