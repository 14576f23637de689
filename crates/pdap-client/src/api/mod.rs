//! API endpoint implementations.

mod auth;
mod data_sources;
mod search;
mod users;

pub use auth::{AuthApi, DEFAULT_OAUTH_RETURN_PATH};
pub use data_sources::DataSourcesApi;
pub use search::SearchApi;
pub use users::UsersApi;
