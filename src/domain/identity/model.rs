use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::fmt;
use uuid::Uuid;

/// Where the identity provider sends confirmation codes for an account
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContactPoint {
    Email(String),
    Phone(String),
}

impl ContactPoint {
    /// Attribute name the identity provider stores this contact under
    pub fn attribute_name(&self) -> &'static str {
        match self {
            ContactPoint::Email(_) => "email",
            ContactPoint::Phone(_) => "phone_number",
        }
    }

    pub fn value(&self) -> &str {
        match self {
            ContactPoint::Email(value) | ContactPoint::Phone(value) => value,
        }
    }
}

/// Options for creating one identity
#[derive(Debug, Clone)]
pub struct IdentityOptions {
    /// Explicit contact point. A fresh random email is generated when absent.
    pub contact: Option<ContactPoint>,
    /// Confirm the account administratively right after sign-up
    pub auto_confirm: bool,
}

impl Default for IdentityOptions {
    fn default() -> Self {
        Self {
            contact: None,
            auto_confirm: true,
        }
    }
}

impl IdentityOptions {
    pub fn with_contact(mut self, contact: ContactPoint) -> Self {
        self.contact = Some(contact);
        self
    }

    pub fn unconfirmed(mut self) -> Self {
        self.auto_confirm = false;
        self
    }
}

/// Secret material needed to rebuild a session for an identity
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    username: String,
    password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password(&self) -> &str {
        &self.password
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// An external account created by an identity provisioner
#[derive(Debug, Clone)]
pub struct Identity {
    /// Provider subject, stable for the lifetime of the account
    pub id: String,
    pub credentials: Credentials,
    pub contact: ContactPoint,
    pub confirmed: bool,
    /// Provider metadata returned at creation (display username, contact, ...)
    pub extras: BTreeMap<String, String>,
    pub created_at: DateTime<Utc>,
}

impl Identity {
    pub fn username(&self) -> &str {
        self.credentials.username()
    }
}

/// Generate a unique email address under the given prefix and domain
pub fn generate_email(prefix: &str, domain: &str) -> String {
    format!("{}+{}@{}", prefix, Uuid::new_v4().simple(), domain)
}

/// Generate a random password that satisfies the usual pool policies
/// (upper, lower, digit and symbol, well over the minimum length)
pub fn generate_password() -> String {
    format!("Lc!{}9z", Uuid::new_v4().simple())
}
