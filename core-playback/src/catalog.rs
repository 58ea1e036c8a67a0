//! Catalog loading with a configured fallback.

use bridge_traits::catalog::CatalogProvider;
use bridge_traits::error::Result as BridgeResult;
use tracing::{info, instrument, warn};

use crate::track::Catalog;

/// Catalog provider backed by a fixed list of URLs.
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    tracks: Vec<String>,
}

impl StaticCatalog {
    pub fn new<I, S>(tracks: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            tracks: tracks.into_iter().map(Into::into).collect(),
        }
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
impl CatalogProvider for StaticCatalog {
    async fn get_tracks(&self) -> BridgeResult<Vec<String>> {
        Ok(self.tracks.clone())
    }
}

/// Result of [`load_with_fallback`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogLoad {
    pub catalog: Catalog,
    /// `true` when the provider gave nothing usable and the fallback list was used.
    pub from_fallback: bool,
}

/// Fetch the catalog, substituting `fallback` when the provider fails or
/// returns an empty list.
///
/// Never fails: a provider error is logged and treated as an empty list.
/// The returned catalog is empty only if `fallback` is empty too.
#[instrument(skip(provider, fallback))]
pub async fn load_with_fallback(provider: &dyn CatalogProvider, fallback: &[String]) -> CatalogLoad {
    let tracks = match provider.get_tracks().await {
        Ok(tracks) => tracks,
        Err(e) => {
            warn!(error = %e, "Error fetching songs, treating catalog as empty");
            Vec::new()
        }
    };

    if !tracks.is_empty() {
        info!(count = tracks.len(), "Catalog loaded");
        return CatalogLoad {
            catalog: Catalog::from_urls(tracks),
            from_fallback: false,
        };
    }

    info!(count = fallback.len(), "Catalog empty, using fallback tracks");
    CatalogLoad {
        catalog: Catalog::from_urls(fallback.iter().cloned()),
        from_fallback: true,
    }
}
