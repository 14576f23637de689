//! Search API and followed searches.

use serde_json::Value;
use tracing::warn;

use crate::client::{AuthMode, PdapClient};
use crate::error::Result;
use crate::types::{FollowedSearchLookup, FollowedSearchesResponse, SearchParams};

const RESULTS_PATH: &str = "search/search-location-and-record-type";
const FOLLOW_PATH: &str = "search/follow";

/// Search API client.
pub struct SearchApi {
    client: PdapClient,
}

impl SearchApi {
    pub(crate) fn new(client: PdapClient) -> Self {
        Self { client }
    }

    /// Search data sources by location and record type.
    ///
    /// Results are cached per parameter set for the default TTL.
    pub async fn search(&self, params: &SearchParams) -> Result<Value> {
        let cache = self.client.cache();
        let key = params.cache_key();
        if let Some(cached) = cache.search.get_fresh(&key, cache.config().default_ttl) {
            return Ok(cached);
        }

        let response: Value = self
            .client
            .get_with_query(RESULTS_PATH, AuthMode::Service, &params.query_pairs())
            .await?;
        cache.search.set(key, response.clone());
        Ok(response)
    }

    /// Follow a search.
    pub async fn follow(&self, params: &SearchParams) -> Result<Value> {
        self.client
            .post_with_query(FOLLOW_PATH, AuthMode::User, &params.query_pairs())
            .await
    }

    /// Stop following a search.
    pub async fn unfollow(&self, params: &SearchParams) -> Result<Value> {
        self.client
            .delete_with_query(FOLLOW_PATH, AuthMode::User, &params.query_pairs())
            .await
    }

    /// Searches the signed-in user follows, with falsy fields removed.
    pub async fn followed(&self) -> Result<Vec<SearchParams>> {
        let response: FollowedSearchesResponse =
            self.client.get(FOLLOW_PATH, AuthMode::User).await?;

        Ok(response
            .data
            .into_iter()
            .map(SearchParams::strip_falsy)
            .collect())
    }

    /// Look for a followed search with exactly `params`.
    ///
    /// Falsy fields are ignored on both sides.
    pub async fn find_followed(&self, params: &SearchParams) -> Result<FollowedSearchLookup> {
        if !self.client.session().is_authenticated() {
            return Ok(FollowedSearchLookup::Unauthenticated);
        }

        let wanted = params.clone().strip_falsy();
        let found = self
            .followed()
            .await?
            .into_iter()
            .find(|followed| *followed == wanted);

        Ok(match found {
            Some(followed) => FollowedSearchLookup::Found(followed),
            None => FollowedSearchLookup::NotFound,
        })
    }

    /// Like [`SearchApi::find_followed`], but any outcome other than a
    /// match is `None`. Errors are logged and dropped.
    pub async fn followed_search(&self, params: &SearchParams) -> Option<SearchParams> {
        match self.find_followed(params).await {
            Ok(FollowedSearchLookup::Found(followed)) => Some(followed),
            Ok(_) => None,
            Err(e) => {
                warn!(error = %e, "Followed search lookup failed");
                None
            }
        }
    }

    /// Remember the ids of the latest results, for next/back paging.
    pub fn set_most_recent_search_ids(&self, ids: Vec<String>) {
        self.client.session().set_most_recent_search_ids(ids);
    }
}
