pub mod domain;
pub mod error;
pub mod infrastructure;

pub use domain::login_cache::{EntryState, Login, LoginCache};
pub use error::{CacheError, CacheResult, EntryFailure};
