//! # Offline Asset Cache
//!
//! Network-interception layer that keeps the app shell and audio available
//! offline.
//!
//! This module provides:
//! - Atomic install of a fixed manifest (complete or absent, never partial)
//! - Activation that purges every stale generation
//! - Per-request routing: media is looked up in the current generation and
//!   stored on a miss; everything else is looked up in any generation and
//!   fetched without storing
//! - Pass-through to the network until the cache is active
//! - Resumption of a generation installed by an earlier worker instance

use bridge_traits::http::{HttpClient, HttpRequest, HttpResponse};
use bridge_traits::storage::{CacheStorage, CachedResponse, RequestKey};
use core_runtime::events::{CacheEvent, CoreEvent, EventBus};
use futures::future::join_all;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

use crate::cache::config::CacheConfig;
use crate::cache::lifecycle::WorkerPhase;
use crate::cache::policy::RequestClass;
use crate::cache::stats::{CacheCounters, CacheStats};
use crate::error::{PlaybackError, Result};

/// Service-worker style offline asset cache.
pub struct OfflineAssetCache {
    config: CacheConfig,
    storage: Arc<dyn CacheStorage>,
    http_client: Arc<dyn HttpClient>,
    event_bus: Option<Arc<EventBus>>,
    phase: Mutex<WorkerPhase>,
    clients_claimed: AtomicBool,
    counters: CacheCounters,
}

impl OfflineAssetCache {
    /// Create a new offline asset cache.
    ///
    /// # Arguments
    ///
    /// * `config` - Cache configuration (validated on install)
    /// * `storage` - Bucketed response storage
    /// * `http_client` - Network used for install and cache misses
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// use core_playback::cache::{CacheConfig, MemoryCacheStorage, OfflineAssetCache};
    /// use std::sync::Arc;
    ///
    /// let cache = OfflineAssetCache::new(
    ///     CacheConfig::default(),
    ///     Arc::new(MemoryCacheStorage::new()),
    ///     http_client,
    /// );
    /// cache.start().await?;
    /// ```
    pub fn new(
        config: CacheConfig,
        storage: Arc<dyn CacheStorage>,
        http_client: Arc<dyn HttpClient>,
    ) -> Self {
        Self {
            config,
            storage,
            http_client,
            event_bus: None,
            phase: Mutex::new(WorkerPhase::Uninstalled),
            clients_claimed: AtomicBool::new(false),
            counters: CacheCounters::default(),
        }
    }

    /// Set event bus for lifecycle and serving events.
    pub fn with_event_bus(mut self, event_bus: Arc<EventBus>) -> Self {
        self.event_bus = Some(event_bus);
        self
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    pub fn phase(&self) -> WorkerPhase {
        *self.phase.lock()
    }

    pub fn is_active(&self) -> bool {
        self.phase().is_serving()
    }

    /// Whether activation took control of already-open clients.
    pub fn clients_claimed(&self) -> bool {
        self.clients_claimed.load(Ordering::Acquire)
    }

    pub fn stats(&self) -> CacheStats {
        self.counters.snapshot()
    }

    /// Keys stored in the current generation.
    pub async fn entries(&self) -> Result<Vec<RequestKey>> {
        self.storage
            .keys(&self.config.generation)
            .await
            .map_err(|e| PlaybackError::CacheError(e.to_string()))
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Install, then activate right away when `skip_waiting` is set.
    #[instrument(skip(self), fields(generation = %self.config.generation))]
    pub async fn start(&self) -> Result<()> {
        self.install().await?;
        if self.config.skip_waiting {
            self.activate().await?;
        } else {
            info!("Installed, waiting for activation");
        }
        Ok(())
    }

    /// Fetch every manifest entry and store it in the current generation.
    ///
    /// All entries are fetched before anything is written. Any fetch error
    /// or non-2xx status fails the install and leaves the generation absent.
    /// Returns the number of stored entries.
    #[instrument(skip(self), fields(generation = %self.config.generation))]
    pub async fn install(&self) -> Result<usize> {
        self.config
            .validate()
            .map_err(|e| PlaybackError::InvalidConfig(format!("Invalid cache configuration: {}", e)))?;
        self.transition(WorkerPhase::Installing)?;

        let generation = self.config.generation.clone();
        let manifest = self.config.resolved_manifest();
        info!(entries = manifest.len(), "Installing offline cache");
        self.emit(CacheEvent::Installing {
            generation: generation.clone(),
            manifest_len: manifest.len(),
        });

        match self.populate(&generation, &manifest).await {
            Ok(stored) => {
                self.set_phase(WorkerPhase::Installed);
                info!(stored, "Offline cache installed");
                self.emit(CacheEvent::Installed {
                    generation,
                    entries: stored,
                });
                Ok(stored)
            }
            Err(e) => {
                self.set_phase(WorkerPhase::Uninstalled);
                error!(error = %e, "Offline cache install failed");
                self.emit(CacheEvent::InstallFailed {
                    generation,
                    message: e.to_string(),
                });
                Err(e)
            }
        }
    }

    /// Delete every bucket except the current generation and start serving.
    ///
    /// Returns the names of the purged buckets.
    #[instrument(skip(self), fields(generation = %self.config.generation))]
    pub async fn activate(&self) -> Result<Vec<String>> {
        self.restore(WorkerPhase::Installed).await;
        self.transition(WorkerPhase::Activating)?;

        let purged = match self.purge_stale().await {
            Ok(purged) => purged,
            Err(e) => {
                self.set_phase(WorkerPhase::Installed);
                error!(error = %e, "Offline cache activation failed");
                return Err(e);
            }
        };

        if self.config.claim_clients {
            self.clients_claimed.store(true, Ordering::Release);
        }
        self.set_phase(WorkerPhase::Active);

        info!(purged = purged.len(), "Offline cache activated");
        self.emit(CacheEvent::Activated {
            generation: self.config.generation.clone(),
            purged: purged.clone(),
        });
        Ok(purged)
    }

    // ========================================================================
    // Serving
    // ========================================================================

    /// Answer an intercepted request.
    ///
    /// # Errors
    ///
    /// Returns [`PlaybackError::Network`] when there is no stored entry and
    /// the network fetch fails.
    #[instrument(skip(self, request), fields(url = %request.url))]
    pub async fn handle_fetch(&self, request: HttpRequest) -> Result<HttpResponse> {
        if !self.is_active() && !self.restore(WorkerPhase::Active).await {
            self.counters.pass_through();
            debug!(phase = %self.phase(), "Cache not active, passing through");
            return self.fetch_network(request).await;
        }

        match RequestClass::classify(&request, &self.config.media_extensions) {
            RequestClass::Media => self.serve_media(request).await,
            RequestClass::Static => self.serve_static(request).await,
            RequestClass::Bypass => {
                self.counters.pass_through();
                self.fetch_network(request).await
            }
        }
    }

    async fn serve_media(&self, request: HttpRequest) -> Result<HttpResponse> {
        let key = RequestKey::from(&request);
        let generation = &self.config.generation;

        match self.storage.get(generation, &key).await {
            Ok(Some(cached)) => return Ok(self.hit(&key, cached)),
            Ok(None) => {}
            Err(e) => warn!(key = %key, error = %e, "Cache read failed, treating as miss"),
        }
        self.counters.miss();

        let response = self.fetch_network(request).await?;
        if response.is_partial() {
            debug!(key = %key, "Not storing partial response");
        } else if response.is_success() {
            let entry = CachedResponse::capture(&response);
            let size = entry.size();
            match self.storage.put(generation, key.clone(), entry).await {
                Ok(()) => {
                    self.counters.write(size);
                    debug!(key = %key, bytes = size, "Stored media response");
                }
                Err(e) => {
                    self.counters.write_failure();
                    warn!(key = %key, error = %e, "Failed to store media response");
                }
            }
        } else {
            debug!(key = %key, status = response.status, "Not storing unsuccessful response");
        }
        Ok(response)
    }

    async fn serve_static(&self, request: HttpRequest) -> Result<HttpResponse> {
        let key = RequestKey::from(&request);

        match self.storage.match_any(&key).await {
            Ok(Some(cached)) => return Ok(self.hit(&key, cached)),
            Ok(None) => {}
            Err(e) => warn!(key = %key, error = %e, "Cache read failed, treating as miss"),
        }
        self.counters.miss();

        self.fetch_network(request).await
    }

    fn hit(&self, key: &RequestKey, cached: CachedResponse) -> HttpResponse {
        self.counters.hit();
        debug!(key = %key, "Serving from cache");
        self.emit(CacheEvent::Served {
            url: key.url.clone(),
            from_cache: true,
        });
        cached.to_response()
    }

    async fn fetch_network(&self, request: HttpRequest) -> Result<HttpResponse> {
        let url = request.url.clone();
        self.counters.network_fetch();

        match self.http_client.execute(request).await {
            Ok(response) => {
                self.emit(CacheEvent::Served {
                    url,
                    from_cache: false,
                });
                Ok(response)
            }
            Err(e) => {
                warn!(url = %url, error = %e, "Network fetch failed");
                self.emit(CacheEvent::FetchFailed {
                    url: url.clone(),
                    message: e.to_string(),
                });
                Err(PlaybackError::Network(format!("{url}: {e}")))
            }
        }
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    async fn populate(&self, generation: &str, manifest: &[String]) -> Result<usize> {
        let responses = join_all(
            manifest
                .iter()
                .map(|url| self.http_client.execute(HttpRequest::get(url.clone()))),
        )
        .await;

        let mut entries = Vec::with_capacity(manifest.len());
        for (url, response) in manifest.iter().zip(responses) {
            let response = response.map_err(|e| {
                PlaybackError::InstallFailed(format!("Failed to fetch {url}: {e}"))
            })?;
            if !response.is_success() {
                return Err(PlaybackError::InstallFailed(format!(
                    "Failed to fetch {url}: HTTP {}",
                    response.status
                )));
            }
            entries.push((RequestKey::get(url.clone()), CachedResponse::capture(&response)));
        }

        self.storage
            .open_bucket(generation)
            .await
            .map_err(|e| PlaybackError::InstallFailed(format!("Failed to open cache: {e}")))?;

        let stored = entries.len();
        for (key, entry) in entries {
            let size = entry.size();
            if let Err(e) = self.storage.put(generation, key.clone(), entry).await {
                // Drop the partial generation so the shell is never half-installed.
                if let Err(cleanup) = self.storage.delete_bucket(generation).await {
                    warn!(error = %cleanup, "Failed to remove partial generation");
                }
                return Err(PlaybackError::InstallFailed(format!(
                    "Failed to store {key}: {e}"
                )));
            }
            self.counters.stored(size);
        }
        Ok(stored)
    }

    async fn purge_stale(&self) -> Result<Vec<String>> {
        let names = self
            .storage
            .bucket_names()
            .await
            .map_err(|e| PlaybackError::CacheError(format!("Failed to list caches: {e}")))?;

        let mut purged = Vec::new();
        for name in names {
            if name == self.config.generation {
                continue;
            }
            self.storage
                .delete_bucket(&name)
                .await
                .map_err(|e| PlaybackError::CacheError(format!("Failed to delete {name}: {e}")))?;
            debug!(bucket = %name, "Deleted stale cache");
            purged.push(name);
        }
        Ok(purged)
    }

    /// Move a fresh instance straight to `target` when the current
    /// generation is already in storage.
    ///
    /// The host restarts idle workers without replaying install or activate,
    /// and only the activated worker receives fetches. Returns `true` when
    /// the phase was restored.
    async fn restore(&self, target: WorkerPhase) -> bool {
        if self.phase() != WorkerPhase::Uninstalled {
            return false;
        }

        let stored = match self.storage.bucket_names().await {
            Ok(names) => names.contains(&self.config.generation),
            Err(e) => {
                warn!(error = %e, "Failed to list caches, not restoring");
                return false;
            }
        };
        if !stored {
            return false;
        }

        let mut phase = self.phase.lock();
        if *phase != WorkerPhase::Uninstalled {
            return false;
        }
        *phase = target;
        info!(phase = %target, "Restored stored generation");
        true
    }

    fn transition(&self, next: WorkerPhase) -> Result<()> {
        let mut phase = self.phase.lock();
        if !phase.can_transition_to(next) {
            return Err(PlaybackError::InvalidTransition {
                from: phase.to_string(),
                to: next.to_string(),
            });
        }
        *phase = next;
        Ok(())
    }

    fn set_phase(&self, next: WorkerPhase) {
        *self.phase.lock() = next;
    }

    fn emit(&self, event: CacheEvent) {
        if let Some(event_bus) = &self.event_bus {
            let _ = event_bus.emit(CoreEvent::Cache(event));
        }
    }
}
