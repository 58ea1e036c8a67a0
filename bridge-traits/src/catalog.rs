//! Track Catalog Abstraction
//!
//! Supplies the ordered list of track URLs the player cycles through. The
//! source may be a static list, a JSON manifest, or a remote endpoint.

use crate::{error::Result, platform::PlatformSendSync};

/// Provider of the playlist.
///
/// # Example
///
/// ```ignore
/// use bridge_traits::catalog::CatalogProvider;
///
/// async fn first_track(provider: &dyn CatalogProvider) -> Option<String> {
///     provider.get_tracks().await.ok()?.into_iter().next()
/// }
/// ```
#[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
pub trait CatalogProvider: PlatformSendSync {
    /// Ordered track URLs. Failures are treated by callers as an empty list.
    async fn get_tracks(&self) -> Result<Vec<String>>;
}
