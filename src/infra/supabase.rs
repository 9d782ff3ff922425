//! Read-only asynchronous client for the hosted market database (PostgREST).
//!
//! - Fetches the `cities`, `products`, `edges` and `price_records` tables.
//! - Keeps the last snapshot in memory for a short TTL and serves it as a
//!   stale fallback when the service is unreachable.

use std::{
    sync::Arc,
    time::{Duration, SystemTime},
};

use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::rows::{CityRow, EdgeRow, PriceRow, ProductRow, SnapshotRows};

pub const DEFAULT_TTL: Duration = Duration::from_secs(60);
const USER_AGENT: &str = concat!("trade-guide/", env!("CARGO_PKG_VERSION"));
const PRICE_ROW_LIMIT: u32 = 10_000;

#[derive(Debug, Error)]
pub enum SupabaseError {
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("http request error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("supabase URL and anon key must both be set")]
    MissingCredentials,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CacheStatus {
    Fresh,
    Cached,
    Stale,
}

#[derive(Clone, Debug)]
pub struct CachedPayload<T> {
    pub data: T,
    pub fetched_at: SystemTime,
    pub status: CacheStatus,
}

impl<T> CachedPayload<T> {
    fn new(data: T, fetched_at: SystemTime, status: CacheStatus) -> Self {
        Self {
            data,
            fetched_at,
            status,
        }
    }
}

#[derive(Clone)]
pub struct SupabaseClient {
    http: Client,
    rest_url: Url,
    anon_key: String,
    cache: Arc<Mutex<Option<Cached<SnapshotRows>>>>,
    ttl: Duration,
}

impl SupabaseClient {
    pub fn new(project_url: &str, anon_key: &str) -> Result<Self, SupabaseError> {
        let project_url = normalize_url(project_url);
        if project_url.is_empty() || anon_key.trim().is_empty() {
            return Err(SupabaseError::MissingCredentials);
        }

        let rest_url = Url::parse(&format!("{project_url}/rest/v1/"))?;
        let http = Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self {
            http,
            rest_url,
            anon_key: anon_key.trim().to_string(),
            cache: Arc::new(Mutex::new(None)),
            ttl: DEFAULT_TTL,
        })
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn rest_url(&self) -> &Url {
        &self.rest_url
    }

    /// All four tables, from cache when fresh, from the service otherwise.
    pub async fn fetch_rows(&self) -> Result<CachedPayload<SnapshotRows>, SupabaseError> {
        if let Some(payload) = self.cached_rows().await {
            debug!("serving cached market tables");
            return Ok(payload);
        }

        match self.fetch_all_tables().await {
            Ok(rows) => {
                info!(
                    cities = rows.cities.len(),
                    products = rows.products.len(),
                    edges = rows.edges.len(),
                    prices = rows.prices.len(),
                    "fetched market tables"
                );
                Ok(self.store_rows(rows).await)
            }
            Err(error) => {
                if let Some(stale) = self.cached_rows_stale().await {
                    warn!("market fetch failed, using previous snapshot: {error}");
                    return Ok(stale);
                }
                Err(error)
            }
        }
    }

    async fn fetch_all_tables(&self) -> Result<SnapshotRows, SupabaseError> {
        let limit = PRICE_ROW_LIMIT.to_string();
        let price_params = [("limit", limit.as_str())];
        let (cities, products, edges, prices) = tokio::try_join!(
            self.fetch_table::<CityRow>("cities", "id,name,buyable_product_ids", &[]),
            self.fetch_table::<ProductRow>("products", "id,name,weight", &[]),
            self.fetch_table::<EdgeRow>("edges", "from_city_id,to_city_id,distance", &[]),
            self.fetch_table::<PriceRow>(
                "price_records",
                "city_id,product_id,buy_price,sell_price,updated_at",
                &price_params,
            ),
        )?;

        Ok(SnapshotRows {
            cities,
            products,
            edges,
            prices,
        })
    }

    async fn fetch_table<T>(
        &self,
        table: &str,
        columns: &str,
        extra: &[(&str, &str)],
    ) -> Result<Vec<T>, SupabaseError>
    where
        T: DeserializeOwned,
    {
        let mut url = self.rest_url.join(table)?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("select", columns);
            for (key, value) in extra {
                query.append_pair(key, value);
            }
        }

        debug!(%url, "requesting table");

        let rows = self
            .http
            .get(url)
            .header("apikey", self.anon_key.as_str())
            .bearer_auth(&self.anon_key)
            .send()
            .await?
            .error_for_status()?
            .json::<Vec<T>>()
            .await?;
        Ok(rows)
    }

    async fn cached_rows(&self) -> Option<CachedPayload<SnapshotRows>> {
        let cache = self.cache.lock().await;
        cache.as_ref().and_then(|entry| entry.if_fresh(self.ttl))
    }

    async fn cached_rows_stale(&self) -> Option<CachedPayload<SnapshotRows>> {
        let cache = self.cache.lock().await;
        cache.as_ref().map(Cached::stale)
    }

    async fn store_rows(&self, rows: SnapshotRows) -> CachedPayload<SnapshotRows> {
        let fetched_at = SystemTime::now();
        let payload = CachedPayload::new(rows.clone(), fetched_at, CacheStatus::Fresh);
        *self.cache.lock().await = Some(Cached::new(rows, fetched_at));
        payload
    }
}

struct Cached<T> {
    value: T,
    fetched_at: SystemTime,
}

impl<T: Clone> Cached<T> {
    fn new(value: T, fetched_at: SystemTime) -> Self {
        Self { value, fetched_at }
    }

    fn if_fresh(&self, ttl: Duration) -> Option<CachedPayload<T>> {
        if self
            .fetched_at
            .elapsed()
            .map(|elapsed| elapsed <= ttl)
            .unwrap_or(false)
        {
            Some(CachedPayload::new(
                self.value.clone(),
                self.fetched_at,
                CacheStatus::Cached,
            ))
        } else {
            None
        }
    }

    fn stale(&self) -> CachedPayload<T> {
        CachedPayload::new(self.value.clone(), self.fetched_at, CacheStatus::Stale)
    }
}

/// Project root URL without whitespace, trailing slashes or a `/rest/v1` suffix.
pub fn normalize_url(raw: &str) -> String {
    let compact: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    let mut url = compact.trim_end_matches('/');

    let lower = url.to_ascii_lowercase();
    if lower.ends_with("/rest/v1") {
        warn!("supabase URL should be the project root without /rest/v1; stripping it");
        url = &url[..url.len() - "/rest/v1".len()];
    }

    url.trim_end_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_url_strips_rest_suffix_and_slashes() {
        let root = "https://x.supabase.co";

        assert_eq!(normalize_url(root), root);
        assert_eq!(normalize_url(" https://x.supabase.co/ "), root);
        assert_eq!(normalize_url("https://x.supabase.co/rest/v1"), root);
        assert_eq!(normalize_url("https://x.supabase.co/REST/V1/"), root);
        assert_eq!(normalize_url("https://x.supabase.co//"), root);
        assert_eq!(normalize_url(""), "");
    }

    #[test]
    fn client_requires_credentials() {
        assert!(matches!(
            SupabaseClient::new("", "key"),
            Err(SupabaseError::MissingCredentials)
        ));
        assert!(matches!(
            SupabaseClient::new("https://x.supabase.co", "  "),
            Err(SupabaseError::MissingCredentials)
        ));
    }

    #[test]
    fn client_targets_rest_endpoint() {
        let client = SupabaseClient::new("https://x.supabase.co/rest/v1/", "anon").unwrap();
        assert_eq!(client.rest_url().as_str(), "https://x.supabase.co/rest/v1/");
        assert_eq!(
            client.rest_url().join("edges").unwrap().as_str(),
            "https://x.supabase.co/rest/v1/edges"
        );
    }

    #[test]
    fn cached_entries_expire_into_stale_fallbacks() {
        let fresh = Cached::new(1_u8, SystemTime::now());
        assert_eq!(
            fresh.if_fresh(Duration::from_secs(60)).map(|p| p.status),
            Some(CacheStatus::Cached)
        );

        let old = Cached::new(1_u8, SystemTime::now() - Duration::from_secs(120));
        assert!(old.if_fresh(Duration::from_secs(60)).is_none());
        assert_eq!(old.stale().status, CacheStatus::Stale);
    }

    fn unreachable_client() -> SupabaseClient {
        SupabaseClient::new("http://127.0.0.1:9", "anon")
            .unwrap()
            .with_ttl(Duration::from_secs(60))
    }

    #[tokio::test]
    async fn failed_fetch_serves_previous_rows_as_stale() {
        let client = unreachable_client();
        let previous = crate::infra::seed::demo_rows();
        *client.cache.lock().await = Some(Cached::new(
            previous.clone(),
            SystemTime::now() - Duration::from_secs(600),
        ));

        let payload = client.fetch_rows().await.unwrap();
        assert_eq!(payload.status, CacheStatus::Stale);
        assert_eq!(payload.data, previous);
    }

    #[tokio::test]
    async fn failed_fetch_without_previous_rows_is_an_error() {
        let client = unreachable_client();

        let result = client.fetch_rows().await;
        assert!(matches!(result, Err(SupabaseError::Http(_))));
    }
}
