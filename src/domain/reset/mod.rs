pub mod error;
pub mod protocol;

pub use error::ResetError;
pub use protocol::{NoopReset, ResetProtocol};
