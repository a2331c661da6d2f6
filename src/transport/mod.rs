pub mod base;
pub mod reqwest_transport;

// Re-export from base.rs so we can do "use crate::transport::*;"
pub use base::Transport;
pub use reqwest_transport::ReqwestTransport;
