//! Main client implementation.

use std::sync::Arc;
use std::time::Duration;

use pdap_router::{MemoryHistory, Navigator, RouteTable, Router};
use pdap_session::{CacheConfig, CacheState, SessionStore, SystemClock};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::{Method, RequestBuilder};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::api::{AuthApi, DataSourcesApi, SearchApi, UsersApi};
use crate::error::{Error, ErrorResponse, Result};

/// Default timeout for requests.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Web app base URL used when none is set.
pub const DEFAULT_APP_BASE_URL: &str = "http://localhost:5173";

/// Which credential a request carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum AuthMode {
    /// No `Authorization` header.
    None,
    /// `Basic <service key>`.
    Service,
    /// `Bearer <access token>`.
    User,
    /// `Bearer <refresh token>`.
    Refresh,
}

/// PDAP data sources API client.
///
/// Cheap to clone; clones share the HTTP pool, session store and caches.
///
/// # Example
///
/// ```no_run
/// use pdap_client::PdapClient;
///
/// # async fn example() -> pdap_client::Result<()> {
/// let client = PdapClient::builder()
///     .base_url("http://localhost:8080")
///     .service_key("secret")
///     .build()?;
///
/// client.auth().login_with_email("me@example.org", "hunter2").await?;
/// let source = client.data_sources().get("rec123").await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct PdapClient {
    inner: Arc<ClientInner>,
}

/// Inner client state (shared across clones).
pub(crate) struct ClientInner {
    pub(crate) http: reqwest::Client,
    pub(crate) base_url: Url,
    pub(crate) app_base_url: String,
    service_key: Option<String>,
    pub(crate) timeout: Duration,
    pub(crate) session: Arc<SessionStore>,
    pub(crate) cache: Arc<CacheState>,
    pub(crate) navigator: Arc<dyn Navigator>,
    pub(crate) routes: Arc<RouteTable>,
}

impl std::fmt::Debug for PdapClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PdapClient")
            .field("base_url", &self.inner.base_url.as_str())
            .field("app_base_url", &self.inner.app_base_url)
            .field("has_service_key", &self.inner.service_key.is_some())
            .finish_non_exhaustive()
    }
}

impl PdapClient {
    /// Create a new client builder.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Get the API base URL.
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// Get the web app base URL.
    pub fn app_base_url(&self) -> &str {
        &self.inner.app_base_url
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        &self.inner.session
    }

    pub fn cache(&self) -> &Arc<CacheState> {
        &self.inner.cache
    }

    pub fn navigator(&self) -> &Arc<dyn Navigator> {
        &self.inner.navigator
    }

    pub fn routes(&self) -> &Arc<RouteTable> {
        &self.inner.routes
    }

    /// A guarded router over this client's session and navigator.
    pub fn router(&self) -> Router {
        Router::new(
            self.inner.routes.clone(),
            self.inner.session.clone(),
            self.inner.navigator.clone(),
        )
    }

    // ─────────────────────────────────────────────────────────────────────────
    // API accessors
    // ─────────────────────────────────────────────────────────────────────────

    /// Access login, logout and token refresh.
    pub fn auth(&self) -> AuthApi {
        AuthApi::new(self.clone())
    }

    /// Access account management.
    pub fn users(&self) -> UsersApi {
        UsersApi::new(self.clone())
    }

    /// Access the data sources API.
    pub fn data_sources(&self) -> DataSourcesApi {
        DataSourcesApi::new(self.clone())
    }

    /// Access search and followed searches.
    pub fn search(&self) -> SearchApi {
        SearchApi::new(self.clone())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Internal HTTP methods
    // ─────────────────────────────────────────────────────────────────────────

    /// Build a URL for an API path.
    pub(crate) fn url(&self, path: &str) -> Result<Url> {
        let path = path.trim_start_matches('/');
        self.inner.base_url.join(path).map_err(Error::from)
    }

    /// Start a request carrying the credential for `auth`.
    fn request(&self, method: Method, path: &str, auth: AuthMode) -> Result<RequestBuilder> {
        let url = self.url(path)?;
        debug!(%method, %url, ?auth, "API request");

        let builder = self
            .inner
            .http
            .request(method, url)
            .timeout(self.inner.timeout);

        let header = match auth {
            AuthMode::None => return Ok(builder),
            AuthMode::Service => {
                let key = self.inner.service_key.as_deref().ok_or_else(|| {
                    Error::Config("service key is required for this request".to_string())
                })?;
                format!("Basic {key}")
            }
            AuthMode::User => {
                let token = self
                    .inner
                    .session
                    .access_token()
                    .ok_or(Error::NotAuthenticated)?;
                format!("Bearer {token}")
            }
            AuthMode::Refresh => {
                let token = self
                    .inner
                    .session
                    .refresh_token()
                    .ok_or(Error::NotAuthenticated)?;
                format!("Bearer {token}")
            }
        };

        let value = HeaderValue::from_str(&header)
            .map_err(|_| Error::Config("credential is not a valid header value".to_string()))?;
        Ok(builder.header(AUTHORIZATION, value))
    }

    /// Make a GET request.
    pub(crate) async fn get<T: DeserializeOwned>(&self, path: &str, auth: AuthMode) -> Result<T> {
        let response = self.request(Method::GET, path, auth)?.send().await?;
        self.handle_response(response).await
    }

    /// Make a GET request with query parameters.
    pub(crate) async fn get_with_query<T, Q>(
        &self,
        path: &str,
        auth: AuthMode,
        query: &Q,
    ) -> Result<T>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        let response = self
            .request(Method::GET, path, auth)?
            .query(query)
            .send()
            .await?;
        self.handle_response(response).await
    }

    /// Make a POST request with a JSON body.
    pub(crate) async fn post<T, B>(&self, path: &str, auth: AuthMode, body: &B) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let response = self
            .request(Method::POST, path, auth)?
            .json(body)
            .send()
            .await?;
        self.handle_response(response).await
    }

    /// Make a POST request with query parameters and no body.
    pub(crate) async fn post_with_query<T, Q>(
        &self,
        path: &str,
        auth: AuthMode,
        query: &Q,
    ) -> Result<T>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        let response = self
            .request(Method::POST, path, auth)?
            .query(query)
            .send()
            .await?;
        self.handle_response(response).await
    }

    /// Make a PUT request.
    pub(crate) async fn put<T, B>(&self, path: &str, auth: AuthMode, body: &B) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let response = self
            .request(Method::PUT, path, auth)?
            .json(body)
            .send()
            .await?;
        self.handle_response(response).await
    }

    /// Make a DELETE request with query parameters.
    pub(crate) async fn delete_with_query<T, Q>(
        &self,
        path: &str,
        auth: AuthMode,
        query: &Q,
    ) -> Result<T>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        let response = self
            .request(Method::DELETE, path, auth)?
            .query(query)
            .send()
            .await?;
        self.handle_response(response).await
    }

    /// Handle a response, extracting the body or error.
    ///
    /// An empty success body decodes as JSON `null`, or `{}` for types
    /// that do not accept `null`.
    async fn handle_response<T: DeserializeOwned>(&self, response: reqwest::Response) -> Result<T> {
        if !response.status().is_success() {
            return Err(self.extract_error(response).await);
        }

        let bytes = response.bytes().await?;
        if bytes.is_empty() {
            return serde_json::from_value(Value::Null)
                .or_else(|_| serde_json::from_value(Value::Object(Default::default())))
                .map_err(Error::from);
        }
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Extract an error from a failed response.
    async fn extract_error(&self, response: reqwest::Response) -> Error {
        let status = response.status().as_u16();

        let message = match response.json::<ErrorResponse>().await {
            Ok(err) => err.message,
            Err(_) => format!("HTTP {}", status),
        };

        match status {
            401 => Error::Auth(message),
            404 => Error::NotFound(message),
            _ => Error::Api { status, message },
        }
    }
}

/// Builder for creating a [`PdapClient`].
pub struct ClientBuilder {
    base_url: Option<String>,
    app_base_url: Option<String>,
    service_key: Option<String>,
    timeout: Duration,
    user_agent: Option<String>,
    session: Option<Arc<SessionStore>>,
    cache: Option<Arc<CacheState>>,
    navigator: Option<Arc<dyn Navigator>>,
    routes: Option<Arc<RouteTable>>,
}

impl ClientBuilder {
    /// Create a new builder with defaults.
    pub fn new() -> Self {
        Self {
            base_url: None,
            app_base_url: None,
            service_key: None,
            timeout: DEFAULT_TIMEOUT,
            user_agent: None,
            session: None,
            cache: None,
            navigator: None,
            routes: None,
        }
    }

    /// Set the API base URL.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the web app base URL used in OAuth return links.
    pub fn app_base_url(mut self, url: impl Into<String>) -> Self {
        self.app_base_url = Some(url.into());
        self
    }

    /// Set the service key sent with anonymous calls.
    pub fn service_key(mut self, key: impl Into<String>) -> Self {
        self.service_key = Some(key.into());
        self
    }

    /// Set the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set a custom user agent.
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    /// Share an existing session store.
    pub fn session(mut self, session: Arc<SessionStore>) -> Self {
        self.session = Some(session);
        self
    }

    /// Share existing response caches.
    pub fn cache(mut self, cache: Arc<CacheState>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Set the navigator driven by logout and OAuth login.
    pub fn navigator(mut self, navigator: Arc<dyn Navigator>) -> Self {
        self.navigator = Some(navigator);
        self
    }

    /// Set the route table.
    pub fn routes(mut self, routes: Arc<RouteTable>) -> Self {
        self.routes = Some(routes);
        self
    }

    /// Build the client.
    pub fn build(self) -> Result<PdapClient> {
        let base_url = self
            .base_url
            .ok_or_else(|| Error::Config("base_url is required".to_string()))?;

        // Parse and normalize base URL
        let mut base_url = Url::parse(&base_url)?;
        if !base_url.path().ends_with('/') {
            base_url.set_path(&format!("{}/", base_url.path()));
        }

        let app_base_url = self
            .app_base_url
            .unwrap_or_else(|| DEFAULT_APP_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let user_agent = self
            .user_agent
            .unwrap_or_else(|| format!("pdap-client/{}", env!("CARGO_PKG_VERSION")));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .user_agent(user_agent)
            .build()?;

        let session = self
            .session
            .unwrap_or_else(|| Arc::new(SessionStore::new(Arc::new(SystemClock))));
        let cache = self.cache.unwrap_or_else(|| {
            Arc::new(CacheState::new(CacheConfig::default(), Arc::new(SystemClock)))
        });
        let navigator = self
            .navigator
            .unwrap_or_else(|| Arc::new(MemoryHistory::default()));
        let routes = self
            .routes
            .unwrap_or_else(|| Arc::new(RouteTable::site()));

        Ok(PdapClient {
            inner: Arc::new(ClientInner {
                http,
                base_url,
                app_base_url,
                service_key: self.service_key,
                timeout: self.timeout,
                session,
                cache,
                navigator,
                routes,
            }),
        })
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
