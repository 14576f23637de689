//! Per-navigation access control.

use std::sync::Arc;

use parking_lot::RwLock;
use pdap_session::SessionStore;
use tracing::{debug, warn};

use crate::route::{DEFAULT_DESCRIPTION, DEFAULT_TITLE, RouteTable, SIGN_IN_PATH, path_only};

/// What the guard decided for a navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationOutcome {
    Proceed,
    Redirect { to: String, replace: bool },
}

/// Why a navigation did not complete. Reported, never fatal.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NavigationFailure {
    #[error("navigation to {to} was aborted")]
    Aborted { to: String },

    #[error("already at {to}")]
    Duplicated { to: String },
}

/// Title and description of the current page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageHead {
    pub title: String,
    pub description: String,
}

impl Default for PageHead {
    fn default() -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
            description: DEFAULT_DESCRIPTION.to_string(),
        }
    }
}

/// Enforces `auth` route metadata against the session store.
#[derive(Debug)]
pub struct RouteGuard {
    routes: Arc<RouteTable>,
    session: Arc<SessionStore>,
    head: RwLock<PageHead>,
}

impl RouteGuard {
    pub fn new(routes: Arc<RouteTable>, session: Arc<SessionStore>) -> Self {
        Self {
            routes,
            session,
            head: RwLock::new(PageHead::default()),
        }
    }

    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    /// Page metadata set by the last navigation.
    pub fn head(&self) -> PageHead {
        self.head.read().clone()
    }

    /// Run before a navigation to `to` commits.
    ///
    /// Updates the page head, then:
    /// - gated route, no user: record the path of `to` and redirect to sign-in
    /// - gated route, signed in: forget any recorded path and proceed
    /// - otherwise proceed
    pub fn before_each(&self, to: &str) -> NavigationOutcome {
        let route = self.routes.resolve(to);
        self.update_head(route.map(|r| &r.meta));

        let gated = route.is_some_and(|r| r.meta.auth);
        if !gated {
            return NavigationOutcome::Proceed;
        }

        if self.session.is_authenticated() {
            self.session.set_redirect_to(None);
            NavigationOutcome::Proceed
        } else {
            debug!(to, "Gated route, redirecting to sign-in");
            self.session.set_redirect_to(Some(path_only(to).to_string()));
            NavigationOutcome::Redirect {
                to: SIGN_IN_PATH.to_string(),
                replace: true,
            }
        }
    }

    /// Run after a navigation settles. Failures are logged only.
    pub fn after_each(&self, to: &str, from: &str, failure: Option<&NavigationFailure>) {
        if let Some(failure) = failure {
            warn!(to, from, %failure, "Navigation failed");
        }
    }

    fn update_head(&self, meta: Option<&crate::RouteMeta>) {
        let mut head = self.head.write();
        head.title = meta
            .and_then(|m| m.title.as_deref())
            .map(|t| format!("{t} | {DEFAULT_TITLE}"))
            .unwrap_or_else(|| DEFAULT_TITLE.to_string());
        head.description = meta
            .and_then(|m| m.description.clone())
            .unwrap_or_else(|| DEFAULT_DESCRIPTION.to_string());
    }
}
