//! User-facing side effects of a torn-down session.
//!
//! Both are best-effort: the interceptor logs their failures and carries on.

pub mod navigator;
pub mod notifier;

pub use navigator::{HeadlessNavigator, Navigator};
pub use notifier::{LogNotifier, Notifier, Toast, ToastKind};
