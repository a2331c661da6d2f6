//! Library exports for the storefront client, shared between the binary and tests.

pub mod client;
pub mod config;
pub mod error;
pub mod feedback;
pub mod interceptor;
pub mod metrics;
pub mod models;
pub mod session;
pub mod startup;
pub mod state;
pub mod store;
pub mod transport;
pub mod utils;
