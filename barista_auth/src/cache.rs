use std::{sync::Arc, time::Duration};

use arc_swap::ArcSwapOption;
use barista_jose::{jwk::KeyIdRef, Jwks};
use reqwest::{
    header::{self, HeaderValue},
    Client, StatusCode,
};
use tokio::{sync::Mutex, task::JoinHandle, time::Instant};

use crate::KeyFetchError;

/// Tuning for a remote key cache
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CacheOptions {
    /// How long a fetched key set is served before it is fetched again
    pub ttl: Duration,
    /// Minimum time between refetches forced by an unknown key ID
    pub refetch_cooldown: Duration,
    /// Bound on each request for the key document
    pub timeout: Duration,
}

impl Default for CacheOptions {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(600),
            refetch_cooldown: Duration::from_secs(30),
            timeout: Duration::from_secs(5),
        }
    }
}

#[derive(Debug)]
struct VolatileData {
    jwks: Arc<Jwks>,
    etag: Option<HeaderValue>,
    last_modified: Option<HeaderValue>,
    fetched_at: Instant,
}

#[derive(Debug)]
struct RemoteSource {
    url: String,
    client: Client,
    options: CacheOptions,
    fetch: Mutex<FetchState>,
}

#[derive(Debug, Default)]
struct FetchState {
    last_forced: Option<Instant>,
}

#[derive(Debug)]
struct Inner {
    data: ArcSwapOption<VolatileData>,
    remote: Option<RemoteSource>,
}

/// The identity provider's signing keys
///
/// A remote cache fetches the key document lazily and serves it for the
/// configured TTL. Readers never block on each other; callers that find the
/// cache empty or stale wait on a single shared fetch. A failed fetch is
/// reported to the caller and the stale set is never served in its place.
///
/// Clones share the same cache.
#[derive(Debug, Clone)]
#[must_use]
pub struct KeyCache {
    inner: Arc<Inner>,
}

impl KeyCache {
    /// A cache that always serves `jwks` and never fetches
    pub fn fixed(jwks: Jwks) -> Self {
        let data = VolatileData {
            jwks: Arc::new(jwks),
            etag: None,
            last_modified: None,
            fetched_at: Instant::now(),
        };

        Self {
            inner: Arc::new(Inner {
                data: ArcSwapOption::from_pointee(data),
                remote: None,
            }),
        }
    }

    /// A cache backed by the key document at `url`
    ///
    /// Nothing is fetched until the first call to [`key_set`][Self::key_set]
    /// or [`refresh`][Self::refresh].
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn remote(url: impl Into<String>, options: CacheOptions) -> Result<Self, KeyFetchError> {
        let client = Client::builder()
            .user_agent(concat!("barista_auth/", env!("CARGO_PKG_VERSION")))
            .timeout(options.timeout)
            .build()
            .map_err(KeyFetchError::Transport)?;

        Ok(Self {
            inner: Arc::new(Inner {
                data: ArcSwapOption::empty(),
                remote: Some(RemoteSource {
                    url: url.into(),
                    client,
                    options,
                    fetch: Mutex::new(FetchState::default()),
                }),
            }),
        })
    }

    /// The current key set, fetching it if absent or stale
    ///
    /// # Errors
    ///
    /// Returns an error if a fetch was needed and failed.
    pub async fn key_set(&self) -> Result<Arc<Jwks>, KeyFetchError> {
        if let Some(jwks) = self.fresh() {
            return Ok(jwks);
        }

        let Some(remote) = &self.inner.remote else {
            return Ok(self.current().unwrap_or_default());
        };

        let _guard = remote.fetch.lock().await;

        // Another caller may have completed the fetch while we waited.
        if let Some(jwks) = self.fresh() {
            return Ok(jwks);
        }

        self.fetch(remote).await
    }

    /// Refetches the key set after a key ID failed to resolve
    ///
    /// Returns `None` if no refetch happened: the cache is fixed, or a forced
    /// refetch ran within the cooldown. If a concurrent refetch already
    /// brought in `kid`, that set is returned without another request.
    ///
    /// # Errors
    ///
    /// Returns an error if the refetch failed.
    pub async fn refresh_for_unknown(
        &self,
        kid: &KeyIdRef,
    ) -> Result<Option<Arc<Jwks>>, KeyFetchError> {
        let Some(remote) = &self.inner.remote else {
            return Ok(None);
        };

        let mut state = remote.fetch.lock().await;

        if let Some(jwks) = self.current() {
            if jwks.contains_key_id(kid) {
                return Ok(Some(jwks));
            }
        }

        if let Some(last) = state.last_forced {
            if last.elapsed() < remote.options.refetch_cooldown {
                tracing::debug!(%kid, "unknown key ID; refetch suppressed by cooldown");
                return Ok(None);
            }
        }

        state.last_forced = Some(Instant::now());
        tracing::debug!(%kid, "unknown key ID; refetching signing keys");
        self.fetch(remote).await.map(Some)
    }

    /// Fetches the key set now, regardless of freshness
    ///
    /// A fixed cache returns its set unchanged. On failure, the current set
    /// is left in place.
    ///
    /// # Errors
    ///
    /// Returns an error if the fetch failed.
    pub async fn refresh(&self) -> Result<Arc<Jwks>, KeyFetchError> {
        let Some(remote) = &self.inner.remote else {
            return Ok(self.current().unwrap_or_default());
        };

        let _guard = remote.fetch.lock().await;
        self.fetch(remote).await
    }

    /// Refreshes the key set in the background every `interval`
    ///
    /// Failures are logged and the current set is kept.
    pub fn spawn_refresh(&self, interval: Duration) -> JoinHandle<()> {
        let this = self.clone();

        tokio::spawn(async move {
            let mut timer = tokio::time::interval(interval);
            timer.tick().await;

            loop {
                timer.tick().await;
                // Already logged; the next tick tries again.
                let _ = this.refresh().await;
            }
        })
    }

    fn current(&self) -> Option<Arc<Jwks>> {
        let guard = self.inner.data.load();
        (*guard).as_ref().map(|d| Arc::clone(&d.jwks))
    }

    fn fresh(&self) -> Option<Arc<Jwks>> {
        let guard = self.inner.data.load();
        let data = (*guard).as_ref()?;

        match &self.inner.remote {
            Some(remote) if data.fetched_at.elapsed() >= remote.options.ttl => None,
            _ => Some(Arc::clone(&data.jwks)),
        }
    }

    /// Callers must hold the fetch lock.
    #[tracing::instrument(skip_all, fields(jwks.url = %remote.url))]
    async fn fetch(&self, remote: &RemoteSource) -> Result<Arc<Jwks>, KeyFetchError> {
        tracing::debug!("fetching signing keys");

        let previous = self.inner.data.load_full();
        let mut request = remote.client.get(&remote.url);

        if let Some(data) = &previous {
            if let Some(etag) = &data.etag {
                request = request.header(header::IF_NONE_MATCH, etag);
            }
            if let Some(last_modified) = &data.last_modified {
                request = request.header(header::IF_MODIFIED_SINCE, last_modified);
            }
        }

        let response = request.send().await.map_err(|err| {
            let error: &dyn std::error::Error = &err;
            tracing::warn!(error, "signing key fetch failed");
            KeyFetchError::Transport(err)
        })?;

        let status = response.status();

        if status == StatusCode::NOT_MODIFIED {
            if let Some(data) = previous {
                tracing::debug!("signing keys not modified");
                let jwks = Arc::clone(&data.jwks);
                self.inner.data.store(Some(Arc::new(VolatileData {
                    jwks: Arc::clone(&jwks),
                    etag: data.etag.clone(),
                    last_modified: data.last_modified.clone(),
                    fetched_at: Instant::now(),
                })));
                return Ok(jwks);
            }
        }

        if !status.is_success() {
            tracing::warn!(
                http.status_code = status.as_u16(),
                "signing key fetch failed; unexpected response status"
            );
            return Err(KeyFetchError::UnexpectedStatus { status });
        }

        let etag = response.headers().get(header::ETAG).map(ToOwned::to_owned);
        let last_modified = response
            .headers()
            .get(header::LAST_MODIFIED)
            .map(ToOwned::to_owned);

        let jwks = response.json::<Jwks>().await.map_err(|err| {
            let error: &dyn std::error::Error = &err;
            tracing::warn!(error, "signing key fetch failed; malformed key document");
            KeyFetchError::MalformedDocument(err)
        })?;

        let jwks = Arc::new(jwks);
        self.inner.data.store(Some(Arc::new(VolatileData {
            jwks: Arc::clone(&jwks),
            etag,
            last_modified,
            fetched_at: Instant::now(),
        })));

        tracing::info!(keys = jwks.len(), "signing keys refreshed");
        Ok(jwks)
    }
}
