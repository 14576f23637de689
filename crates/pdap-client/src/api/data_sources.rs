//! Data sources API.

use serde::Serialize;
use serde_json::Value;
use tracing::info;

use crate::client::{AuthMode, PdapClient};
use crate::error::{Error, Result};
use crate::types::Neighbors;

/// Data sources API client.
pub struct DataSourcesApi {
    client: PdapClient,
}

impl DataSourcesApi {
    pub(crate) fn new(client: PdapClient) -> Self {
        Self { client }
    }

    /// Get a data source by ID.
    ///
    /// Served from the cache while the stored response is younger than the
    /// data source TTL.
    pub async fn get(&self, id: &str) -> Result<Value> {
        let cache = self.client.cache();
        let ttl = cache.config().data_source_ttl;
        if let Some(cached) = cache.data_sources.get_fresh(id, ttl) {
            return Ok(cached);
        }

        let response: Value = self
            .client
            .get(&format!("data-sources/{}", path_segment(id)?), AuthMode::Service)
            .await?;
        cache.data_sources.set(id, response.clone());
        Ok(response)
    }

    /// Submit a new data source. Clears the data source and search caches.
    pub async fn create<B: Serialize + ?Sized>(&self, data: &B) -> Result<Value> {
        let response: Value = self
            .client
            .post("data-sources", AuthMode::User, data)
            .await?;

        self.client.cache().clear_all();
        info!("Data source submitted");
        Ok(response)
    }

    /// Remember the data source route last visited.
    pub fn set_previous_route(&self, route: Option<String>) {
        self.client
            .session()
            .set_previous_data_source_route(route);
    }

    /// Ids before and after `id` in the most recent search results.
    pub fn neighbors(&self, id: &str) -> Neighbors {
        let ids = self.client.session().browsing().most_recent_search_ids;
        let Some(pos) = ids.iter().position(|i| i == id) else {
            return Neighbors::default();
        };

        Neighbors {
            previous: pos.checked_sub(1).map(|p| ids[p].clone()),
            next: ids.get(pos + 1).cloned(),
        }
    }
}

/// Percent-encode `id` so it stays one segment under `data-sources/`.
/// Dot segments are refused since URL joining resolves them.
fn path_segment(id: &str) -> Result<std::borrow::Cow<'_, str>> {
    if matches!(id, "" | "." | "..") {
        return Err(Error::InvalidId(id.to_string()));
    }
    Ok(urlencoding::encode(id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_segment() {
        assert_eq!(path_segment("rec1").unwrap(), "rec1");
        assert_eq!(path_segment("../user").unwrap(), "..%2Fuser");
        assert_eq!(path_segment("a b?c").unwrap(), "a%20b%3Fc");
        assert!(matches!(path_segment(".."), Err(Error::InvalidId(_))));
        assert!(matches!(path_segment(""), Err(Error::InvalidId(_))));
    }
}
