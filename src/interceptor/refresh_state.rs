use std::sync::{Mutex, MutexGuard};

use tokio::sync::oneshot;

use crate::models::SessionToken;

/// How a refresh ended, as seen by the requests that waited on it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RefreshOutcome {
    Refreshed,
    Failed,
}

enum RefreshState {
    Idle,
    Refreshing {
        waiters: Vec<oneshot::Sender<RefreshOutcome>>,
    },
}

struct Inner {
    state: RefreshState,
    latest_token: Option<SessionToken>,
}

/// Single-flight gate around the session refresh.
///
/// The lock is only ever taken for synchronous bookkeeping and never held
/// across an `.await`.
pub struct RefreshCoordinator {
    inner: Mutex<Inner>,
}

/// What a request that failed authentication should do next.
pub enum Ticket<'a> {
    /// Run the refresh and settle it through the guard.
    Leader(LeaderGuard<'a>),
    /// Wait for the refresh already in flight.
    Waiter(oneshot::Receiver<RefreshOutcome>),
}

impl RefreshCoordinator {
    pub fn new() -> Self {
        RefreshCoordinator {
            inner: Mutex::new(Inner {
                state: RefreshState::Idle,
                latest_token: None,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // Every critical section leaves `Inner` consistent, so a poisoned
        // lock is still safe to use.
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Either starts a refresh (check and set in one critical section) or
    /// joins the one in flight.
    pub fn begin(&self) -> Ticket<'_> {
        let mut guard = self.lock();
        let inner = &mut *guard;
        match &mut inner.state {
            RefreshState::Refreshing { waiters } => {
                let (tx, rx) = oneshot::channel();
                waiters.push(tx);
                Ticket::Waiter(rx)
            }
            RefreshState::Idle => {
                inner.state = RefreshState::Refreshing {
                    waiters: Vec::new(),
                };
                inner.latest_token = None;
                Ticket::Leader(LeaderGuard {
                    coordinator: self,
                    settled: false,
                })
            }
        }
    }

    pub fn is_refreshing(&self) -> bool {
        matches!(self.lock().state, RefreshState::Refreshing { .. })
    }

    /// The token stored by the last successful refresh, `None` while a
    /// refresh is in flight or after one failed.
    pub fn latest_token(&self) -> Option<SessionToken> {
        self.lock().latest_token.clone()
    }

    pub fn waiter_count(&self) -> usize {
        match &self.lock().state {
            RefreshState::Refreshing { waiters } => waiters.len(),
            RefreshState::Idle => 0,
        }
    }

    fn settle(&self, outcome: RefreshOutcome, token: Option<SessionToken>) -> usize {
        let waiters = {
            let mut inner = self.lock();
            inner.latest_token = token;
            match std::mem::replace(&mut inner.state, RefreshState::Idle) {
                RefreshState::Refreshing { waiters } => waiters,
                RefreshState::Idle => Vec::new(),
            }
        };
        let count = waiters.len();
        for waiter in waiters {
            // A waiter whose caller went away has nobody to tell.
            let _ = waiter.send(outcome);
        }
        count
    }
}

impl Default for RefreshCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

/// Held by the request running the refresh.
///
/// Dropping it unsettled (the refreshing future was cancelled) settles the
/// refresh as failed, so the coordinator always returns to idle.
pub struct LeaderGuard<'a> {
    coordinator: &'a RefreshCoordinator,
    settled: bool,
}

impl LeaderGuard<'_> {
    /// Stores the new token and releases every waiter to retry. Returns how
    /// many waiters were released.
    pub fn succeed(mut self, token: SessionToken) -> usize {
        self.settled = true;
        self.coordinator
            .settle(RefreshOutcome::Refreshed, Some(token))
    }

    /// Releases every waiter with a failure. Returns how many were released.
    pub fn fail(mut self) -> usize {
        self.settled = true;
        self.coordinator.settle(RefreshOutcome::Failed, None)
    }
}

impl Drop for LeaderGuard<'_> {
    fn drop(&mut self) {
        if !self.settled {
            self.coordinator.settle(RefreshOutcome::Failed, None);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leader(ticket: Ticket<'_>) -> LeaderGuard<'_> {
        match ticket {
            Ticket::Leader(guard) => guard,
            Ticket::Waiter(_) => panic!("expected to lead the refresh"),
        }
    }

    fn waiter(ticket: Ticket<'_>) -> oneshot::Receiver<RefreshOutcome> {
        match ticket {
            Ticket::Waiter(rx) => rx,
            Ticket::Leader(_) => panic!("expected to wait on the refresh"),
        }
    }

    #[tokio::test]
    async fn test_first_leads_others_wait() {
        let coordinator = RefreshCoordinator::new();
        let guard = leader(coordinator.begin());
        assert!(coordinator.is_refreshing());

        let first = waiter(coordinator.begin());
        let second = waiter(coordinator.begin());
        assert_eq!(coordinator.waiter_count(), 2);

        assert_eq!(guard.succeed(SessionToken::new("fresh")), 2);
        assert!(!coordinator.is_refreshing());
        assert_eq!(first.await.unwrap(), RefreshOutcome::Refreshed);
        assert_eq!(second.await.unwrap(), RefreshOutcome::Refreshed);
        assert_eq!(coordinator.latest_token().unwrap().access_token, "fresh");
    }

    #[tokio::test]
    async fn test_failure_releases_waiters() {
        let coordinator = RefreshCoordinator::new();
        let guard = leader(coordinator.begin());
        let rx = waiter(coordinator.begin());

        assert_eq!(guard.fail(), 1);
        assert_eq!(rx.await.unwrap(), RefreshOutcome::Failed);
        assert!(!coordinator.is_refreshing());
        assert!(coordinator.latest_token().is_none());
    }

    #[tokio::test]
    async fn test_dropped_leader_settles_as_failed() {
        let coordinator = RefreshCoordinator::new();
        let guard = leader(coordinator.begin());
        let rx = waiter(coordinator.begin());

        drop(guard);
        assert_eq!(rx.await.unwrap(), RefreshOutcome::Failed);
        assert!(!coordinator.is_refreshing());
        assert_eq!(coordinator.waiter_count(), 0);
    }

    #[test]
    fn test_new_refresh_resets_latest_token() {
        let coordinator = RefreshCoordinator::new();
        leader(coordinator.begin()).succeed(SessionToken::new("one"));
        assert!(coordinator.latest_token().is_some());

        let guard = leader(coordinator.begin());
        assert!(coordinator.latest_token().is_none());
        guard.succeed(SessionToken::new("two"));
        assert_eq!(coordinator.latest_token().unwrap().access_token, "two");
    }

    #[test]
    fn test_departed_waiter_does_not_block_settle() {
        let coordinator = RefreshCoordinator::new();
        let guard = leader(coordinator.begin());
        drop(waiter(coordinator.begin()));
        assert_eq!(guard.succeed(SessionToken::new("fresh")), 1);
        assert!(!coordinator.is_refreshing());
    }
}
