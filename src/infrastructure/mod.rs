pub mod cognito;
pub mod config;
pub mod graphql;
