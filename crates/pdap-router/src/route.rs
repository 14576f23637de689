//! Route table and per-route metadata.

/// Page unauthenticated users are sent to.
pub const SIGN_IN_PATH: &str = "/sign-in";

/// Landing page.
pub const HOME_PATH: &str = "/";

/// Title used when a route sets none.
pub const DEFAULT_TITLE: &str = "Police Data Accessibility Project";

/// Description used when a route sets none.
pub const DEFAULT_DESCRIPTION: &str = "Search for police data sources across the United States.";

/// Static metadata attached to a route.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteMeta {
    /// Route requires a signed-in user.
    pub auth: bool,
    pub title: Option<String>,
    pub description: Option<String>,
}

impl RouteMeta {
    /// Metadata for a public page.
    pub fn public(title: impl Into<String>) -> Self {
        Self {
            auth: false,
            title: Some(title.into()),
            description: None,
        }
    }

    /// Metadata for a gated page.
    pub fn gated(title: impl Into<String>) -> Self {
        Self {
            auth: true,
            title: Some(title.into()),
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// A path pattern and its metadata.
///
/// Patterns are `/`-separated; a segment starting with `:` matches any
/// single non-empty segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub pattern: String,
    pub meta: RouteMeta,
}

impl Route {
    /// Whether `path` (without query or fragment) matches this route.
    pub fn matches(&self, path: &str) -> bool {
        let pattern: Vec<&str> = segments(&self.pattern).collect();
        let path: Vec<&str> = segments(path).collect();

        pattern.len() == path.len()
            && pattern
                .iter()
                .zip(&path)
                .all(|(p, s)| p.starts_with(':') && !s.is_empty() || p == s)
    }
}

fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.trim_matches('/').split('/').filter(|s| !s.is_empty())
}

/// Strip the query string and fragment from a location.
pub fn path_only(location: &str) -> &str {
    let end = location.find(['?', '#']).unwrap_or(location.len());
    &location[..end]
}

/// Ordered set of routes. The first matching route wins.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: Vec<Route>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a route.
    pub fn route(mut self, pattern: impl Into<String>, meta: RouteMeta) -> Self {
        self.routes.push(Route {
            pattern: pattern.into(),
            meta,
        });
        self
    }

    /// Routes of the data sources app.
    pub fn site() -> Self {
        Self::new()
            .route(HOME_PATH, RouteMeta::public("Search"))
            .route(SIGN_IN_PATH, RouteMeta::public("Sign In"))
            .route("/sign-up", RouteMeta::public("Sign Up"))
            .route(
                "/request-reset-password",
                RouteMeta::public("Request Password Reset"),
            )
            .route("/reset-password/:token", RouteMeta::public("Reset Password"))
            .route("/change-password", RouteMeta::gated("Change Password"))
            .route("/profile", RouteMeta::gated("Profile"))
            .route(
                "/data-source/create",
                RouteMeta::gated("Submit a Data Source")
                    .with_description("Tell us about a data source we are missing."),
            )
            .route("/data-source/:id", RouteMeta::public("Data Source"))
            .route("/search/results", RouteMeta::public("Search Results"))
    }

    /// Find the route for a location.
    pub fn resolve(&self, location: &str) -> Option<&Route> {
        let path = path_only(location);
        self.routes.iter().find(|r| r.matches(path))
    }

    /// Whether a location is gated. Unknown paths are public.
    pub fn requires_auth(&self, location: &str) -> bool {
        self.resolve(location).is_some_and(|r| r.meta.auth)
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }
}
