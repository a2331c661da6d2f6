pub mod base;
pub mod http_session;

// Re-export from base.rs so we can do "use crate::session::*;"
pub use base::AuthSession;
pub use http_session::HttpAuthSession;
