//! Page routing with access-control guards.
//!
//! - [`RouteTable`] maps paths to [`RouteMeta`] (gating flag, page title)
//! - [`RouteGuard`] decides, per navigation, whether to proceed or send the
//!   user to sign-in, and remembers where they were headed
//! - [`Navigator`] abstracts the history the router drives
//! - [`Router`] ties the three together
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use pdap_router::{MemoryHistory, RouteTable, Router};
//! use pdap_session::{SessionStore, SystemClock};
//!
//! let session = Arc::new(SessionStore::new(Arc::new(SystemClock)));
//! let history = Arc::new(MemoryHistory::new("/"));
//! let router = Router::new(Arc::new(RouteTable::site()), session, history.clone());
//!
//! router.navigate("/profile");
//! assert_eq!(history.current(), "/sign-in");
//! ```

mod guard;
mod navigator;
mod route;
mod router;

pub use guard::{NavigationFailure, NavigationOutcome, PageHead, RouteGuard};
pub use navigator::{MemoryHistory, Navigator};
pub use route::{
    DEFAULT_DESCRIPTION, DEFAULT_TITLE, HOME_PATH, Route, RouteMeta, RouteTable, SIGN_IN_PATH,
    path_only,
};
pub use router::Router;
