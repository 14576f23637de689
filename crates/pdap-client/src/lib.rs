//! HTTP client for the Police Data Accessibility Project data sources API.
//!
//! The client owns the pieces a signed-in user needs:
//!
//! - a [`SessionStore`] holding identity, tokens and the post-login redirect
//! - a [`CacheState`] of recent data source and search responses
//! - a [`Navigator`] and [`RouteTable`] for logout and OAuth redirects
//!
//! Anonymous calls carry `Basic <service key>`, user calls carry
//! `Bearer <access token>`.
//!
//! # Example
//!
//! ```no_run
//! use pdap_client::{PdapClient, Result, SearchParams};
//!
//! # async fn example() -> Result<()> {
//! let client = PdapClient::builder()
//!     .base_url("http://localhost:8080")
//!     .service_key("secret")
//!     .build()?;
//!
//! let params = SearchParams::new()
//!     .with("state", "Pennsylvania")
//!     .with("county", "Allegheny");
//! let results = client.search().search(&params).await?;
//! println!("{results}");
//!
//! client.auth().login_with_email("me@example.org", "hunter2").await?;
//! client.search().follow(&params).await?;
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod client;
pub mod error;
pub mod types;

pub use api::{AuthApi, DEFAULT_OAUTH_RETURN_PATH, DataSourcesApi, SearchApi, UsersApi};
pub use client::{ClientBuilder, DEFAULT_APP_BASE_URL, PdapClient};
pub use error::{Error, Result};
pub use types::*;

pub use pdap_router::{Navigator, RouteTable};
pub use pdap_session::{CacheState, SessionPhase, SessionStore, TokenClaims};
