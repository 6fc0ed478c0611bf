/**
 * JWKS Cache
 *
 * The provider's public key set, fetched over HTTP and kept for a fixed
 * TTL. Once the TTL has passed the next lookup refetches; a failed refetch
 * is returned to the caller rather than falling back to the stale set.
 */

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use jsonwebtoken::jwk::JwkSet;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use super::ExternalAuthError;
use crate::shared::Clock;

/// Timeout applied to every provider HTTP request
pub const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Source of the provider key set
#[async_trait]
pub trait JwksFetcher: Send + Sync + fmt::Debug {
    async fn fetch(&self) -> Result<JwkSet, ExternalAuthError>;
}

/// Fetches the key set from a JWKS URL
#[derive(Debug, Clone)]
pub struct HttpJwksFetcher {
    client: reqwest::Client,
    url: String,
}

impl HttpJwksFetcher {
    pub fn new(url: impl Into<String>) -> Result<Self, ExternalAuthError> {
        let client = reqwest::Client::builder().timeout(HTTP_TIMEOUT).build()?;
        Ok(Self::with_client(client, url))
    }

    pub fn with_client(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl JwksFetcher for HttpJwksFetcher {
    async fn fetch(&self) -> Result<JwkSet, ExternalAuthError> {
        let fetch_error = |source| ExternalAuthError::JwksFetch {
            url: self.url.clone(),
            source,
        };
        let keys = self
            .client
            .get(&self.url)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(fetch_error)?
            .json::<JwkSet>()
            .await
            .map_err(fetch_error)?;
        tracing::info!(url = %self.url, keys = keys.keys.len(), "fetched provider JWKS");
        Ok(keys)
    }
}

#[derive(Debug)]
struct CachedKeys {
    keys: Arc<JwkSet>,
    fetched_at: DateTime<Utc>,
}

/// TTL-bounded cache in front of a [`JwksFetcher`]
pub struct JwksCache {
    fetcher: Arc<dyn JwksFetcher>,
    clock: Arc<dyn Clock>,
    ttl: TimeDelta,
    cached: RwLock<Option<CachedKeys>>,
}

impl fmt::Debug for JwksCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwksCache")
            .field("fetcher", &self.fetcher)
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl JwksCache {
    pub fn new(fetcher: Arc<dyn JwksFetcher>, clock: Arc<dyn Clock>, ttl: TimeDelta) -> Self {
        Self {
            fetcher,
            clock,
            ttl,
            cached: RwLock::new(None),
        }
    }

    /// The cached key set while fresh, otherwise a newly fetched one
    pub async fn get_key_set(&self) -> Result<Arc<JwkSet>, ExternalAuthError> {
        let now = self.clock.now();
        if let Some(cached) = self.cached.read().await.as_ref() {
            if now - cached.fetched_at < self.ttl {
                tracing::debug!("JWKS cache hit");
                return Ok(Arc::clone(&cached.keys));
            }
        }

        let keys = Arc::new(self.fetcher.fetch().await.map_err(|err| {
            tracing::error!(error = %err, "JWKS fetch failed");
            err
        })?);
        *self.cached.write().await = Some(CachedKeys {
            keys: Arc::clone(&keys),
            fetched_at: now,
        });
        Ok(keys)
    }

    /// Drop the cached set so the next lookup refetches
    pub async fn invalidate(&self) {
        *self.cached.write().await = None;
    }
}
