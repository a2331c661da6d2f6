//! Recovers requests that failed because the session expired.
//!
//! [`AuthRefreshInterceptor`] sits between callers and the [`Transport`](crate::transport::Transport).
//! The first request to hit a 401/403 refreshes the session; requests failing
//! while that refresh is in flight wait for it instead of starting their own.

pub mod interceptor;
pub mod refresh_state;

pub use interceptor::{AuthRefreshInterceptor, InterceptedTransport, InterceptorSettings};
pub use refresh_state::{LeaderGuard, RefreshCoordinator, RefreshOutcome, Ticket};
