pub mod error;
pub mod factory;
pub mod token;

pub use error::AuthError;
pub use factory::SessionFactory;
pub use token::{bind_session, inspect_id_token, IdTokenClaims};
