use std::sync::Arc;

use pdap_session::SessionStore;
use tracing::debug;

use crate::guard::{NavigationFailure, NavigationOutcome, RouteGuard};
use crate::navigator::Navigator;
use crate::route::RouteTable;

/// Redirects followed for one navigation before it is aborted.
const MAX_REDIRECTS: usize = 5;

/// Guarded navigation over a [`Navigator`].
#[derive(Debug)]
pub struct Router {
    guard: RouteGuard,
    navigator: Arc<dyn Navigator>,
}

impl Router {
    pub fn new(
        routes: Arc<RouteTable>,
        session: Arc<SessionStore>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            guard: RouteGuard::new(routes, session),
            navigator,
        }
    }

    pub fn guard(&self) -> &RouteGuard {
        &self.guard
    }

    pub fn navigator(&self) -> &Arc<dyn Navigator> {
        &self.navigator
    }

    /// Navigate to `to`, pushing a history entry unless the guard redirects.
    ///
    /// Returns the location that was committed.
    pub fn navigate(&self, to: &str) -> Result<String, NavigationFailure> {
        let from = self.navigator.current();
        if from == to {
            let failure = NavigationFailure::Duplicated { to: to.to_string() };
            self.guard.after_each(to, &from, Some(&failure));
            return Err(failure);
        }

        match self.guard.before_each(to) {
            NavigationOutcome::Proceed => {
                self.navigator.push(to);
                self.guard.after_each(to, &from, None);
                Ok(to.to_string())
            }
            NavigationOutcome::Redirect {
                to: mut target,
                mut replace,
            } => {
                debug!(from = %from, to, redirected_to = %target, "Navigation redirected");
                // Redirect targets are guarded too and may redirect again.
                let mut hops = 1;
                while let NavigationOutcome::Redirect {
                    to: next,
                    replace: next_replace,
                } = self.guard.before_each(&target)
                {
                    hops += 1;
                    if hops > MAX_REDIRECTS {
                        let failure = NavigationFailure::Aborted { to: to.to_string() };
                        self.guard.after_each(to, &from, Some(&failure));
                        return Err(failure);
                    }
                    debug!(from = %target, redirected_to = %next, "Navigation redirected again");
                    target = next;
                    replace = next_replace;
                }

                if replace {
                    self.navigator.replace(&target);
                } else {
                    self.navigator.push(&target);
                }
                self.guard.after_each(&target, &from, None);
                Ok(target)
            }
        }
    }
}
