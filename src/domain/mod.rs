pub mod identity;
pub mod login_cache;
pub mod reset;
pub mod session;
