pub mod request;
pub mod response;
pub mod token;

// Re-export the model types so callers can do "use crate::models::*;"
pub use request::ApiRequest;
pub use response::ApiResponse;
pub use token::{Credentials, SessionToken};
