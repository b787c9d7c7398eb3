pub mod error;
pub mod model;
pub mod provisioner;

pub use error::{ProvisionError, TeardownError};
pub use model::{generate_email, generate_password, ContactPoint, Credentials, Identity, IdentityOptions};
pub use provisioner::IdentityProvisioner;
