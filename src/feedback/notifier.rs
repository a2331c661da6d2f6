use std::collections::VecDeque;
use std::sync::Mutex;

use tracing::{info, warn};

use crate::error::NotifyError;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ToastKind {
    Error,
    Success,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Toast {
    pub kind: ToastKind,
    pub title: String,
    pub message: String,
}

/// Shows short messages to the user.
#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    async fn show_error_toast(&self, title: &str, message: &str) -> Result<(), NotifyError>;

    async fn show_success_toast(&self, title: &str, message: &str) -> Result<(), NotifyError>;
}

/// Writes toasts to the log and remembers the most recent ones.
///
/// Used by the CLI, which has no UI to draw on.
pub struct LogNotifier {
    capacity: usize,
    history: Mutex<VecDeque<Toast>>,
}

impl LogNotifier {
    pub fn new(capacity: usize) -> Self {
        LogNotifier {
            capacity,
            history: Mutex::new(VecDeque::with_capacity(capacity)),
        }
    }

    /// Most recent toasts, oldest first.
    pub fn history(&self) -> Vec<Toast> {
        match self.history.lock() {
            Ok(history) => history.iter().cloned().collect(),
            Err(poisoned) => poisoned.into_inner().iter().cloned().collect(),
        }
    }

    fn push(&self, toast: Toast) -> Result<(), NotifyError> {
        if self.capacity == 0 {
            return Ok(());
        }
        let mut history = self
            .history
            .lock()
            .map_err(|_| NotifyError("toast history lock poisoned".to_string()))?;
        while history.len() >= self.capacity {
            history.pop_front();
        }
        history.push_back(toast);
        Ok(())
    }
}

#[async_trait::async_trait]
impl Notifier for LogNotifier {
    async fn show_error_toast(&self, title: &str, message: &str) -> Result<(), NotifyError> {
        warn!(
            event_name = "ui.toast.error",
            event_domain = "storefront",
            "{}: {}", title, message
        );
        self.push(Toast {
            kind: ToastKind::Error,
            title: title.to_string(),
            message: message.to_string(),
        })
    }

    async fn show_success_toast(&self, title: &str, message: &str) -> Result<(), NotifyError> {
        info!(
            event_name = "ui.toast.success",
            event_domain = "storefront",
            "{}: {}", title, message
        );
        self.push(Toast {
            kind: ToastKind::Success,
            title: title.to_string(),
            message: message.to_string(),
        })
    }
}
