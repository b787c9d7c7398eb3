pub mod cache;
pub mod entry;

pub use cache::LoginCache;
pub use entry::{EntryState, Login};
