use std::sync::RwLock;

use tracing::info;

use crate::error::NavigationError;

/// Moves the user to another screen.
#[async_trait::async_trait]
pub trait Navigator: Send + Sync {
    /// Returns `false` when the user is already on `route`.
    async fn navigate(&self, route: &str) -> Result<bool, NavigationError>;
}

/// Tracks the current route without rendering anything.
pub struct HeadlessNavigator {
    current: RwLock<String>,
}

impl HeadlessNavigator {
    pub fn new(initial_route: impl Into<String>) -> Self {
        HeadlessNavigator {
            current: RwLock::new(initial_route.into()),
        }
    }

    pub fn current_route(&self) -> String {
        match self.current.read() {
            Ok(route) => route.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl Default for HeadlessNavigator {
    fn default() -> Self {
        Self::new("/")
    }
}

#[async_trait::async_trait]
impl Navigator for HeadlessNavigator {
    async fn navigate(&self, route: &str) -> Result<bool, NavigationError> {
        if !route.starts_with('/') {
            return Err(NavigationError::InvalidRoute(route.to_string()));
        }
        let mut current = self
            .current
            .write()
            .map_err(|_| NavigationError::Rejected("route lock poisoned".to_string()))?;
        if *current == route {
            return Ok(false);
        }
        info!(
            event_name = "ui.navigation",
            event_domain = "storefront",
            from = %current,
            to = %route,
            "Navigating"
        );
        *current = route.to_string();
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_navigate_updates_route() {
        let nav = HeadlessNavigator::default();
        assert_eq!(nav.current_route(), "/");
        assert!(nav.navigate("/login").await.unwrap());
        assert_eq!(nav.current_route(), "/login");
        assert!(!nav.navigate("/login").await.unwrap());
    }

    #[tokio::test]
    async fn test_relative_route_rejected() {
        let nav = HeadlessNavigator::new("/cart");
        let err = nav.navigate("login").await.unwrap_err();
        assert!(matches!(err, NavigationError::InvalidRoute(r) if r == "login"));
        assert_eq!(nav.current_route(), "/cart");
    }
}
