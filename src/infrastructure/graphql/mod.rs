pub mod error;
pub mod operation;
pub mod reset;
pub mod session;

pub use error::GraphqlClientError;
pub use operation::{GraphqlError, GraphqlRequest, GraphqlResponse};
pub use reset::{GraphqlResetProtocol, ResetStep};
pub use session::{AuthScheme, GraphqlSession};
