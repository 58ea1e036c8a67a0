//! Next-track preloading.
//!
//! Preloading is an optimization: a failed preload is logged at debug level
//! and otherwise ignored.

use bridge_traits::playback::{MediaDevice, MediaSource};
use core_runtime::logging::strip_path;
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::debug;

use crate::track::Catalog;

/// Primes the next track's media resource on the device.
pub struct Preloader {
    device: Arc<dyn MediaDevice>,
    last_primed: Mutex<Option<String>>,
}

impl Preloader {
    pub fn new(device: Arc<dyn MediaDevice>) -> Self {
        Self {
            device,
            last_primed: Mutex::new(None),
        }
    }

    /// Source following `index` in `catalog`, or `None` when the catalog has
    /// fewer than two tracks.
    pub fn next_source(catalog: &Catalog, index: usize) -> Option<MediaSource> {
        if catalog.len() <= 1 {
            return None;
        }
        catalog
            .next_index(index)
            .and_then(|next| catalog.get(next))
            .map(|track| track.source())
    }

    /// Hand `source` to the device. Returns `true` if the device accepted it.
    ///
    /// Asking for the same URL twice in a row is a no-op.
    pub async fn prime(&self, source: &MediaSource) -> bool {
        {
            let mut last = self.last_primed.lock();
            if last.as_deref() == Some(source.url.as_str()) {
                debug!(track = strip_path(&source.url), "Next track already primed");
                return false;
            }
            *last = Some(source.url.clone());
        }

        match self.device.preload(source).await {
            Ok(()) => {
                debug!(track = strip_path(&source.url), "Preloading next track");
                true
            }
            Err(e) => {
                debug!(track = strip_path(&source.url), error = %e, "Preload failed, ignoring");
                self.last_primed.lock().take();
                false
            }
        }
    }

    /// Forget the last primed URL, e.g. after the catalog changed.
    pub fn reset(&self) {
        self.last_primed.lock().take();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_traits::error::{BridgeError, Result as BridgeResult};
    use bridge_traits::playback::{DeviceSnapshot, SwitchEpoch};
    use mockall::mock;
    use std::time::Duration;

    mock! {
        Device {}

        #[async_trait::async_trait]
        impl MediaDevice for Device {
            async fn load(&self, epoch: SwitchEpoch, source: &MediaSource) -> BridgeResult<()>;
            async fn play(&self) -> BridgeResult<()>;
            async fn pause(&self) -> BridgeResult<()>;
            async fn seek_to(&self, position: Duration) -> BridgeResult<()>;
            async fn preload(&self, source: &MediaSource) -> BridgeResult<()>;
            async fn snapshot(&self) -> BridgeResult<DeviceSnapshot>;
        }
    }

    #[test]
    fn next_source_wraps_and_skips_tiny_catalogs() {
        let catalog = Catalog::from_urls(["/a.mp3", "/b.m4a"]);
        assert_eq!(
            Preloader::next_source(&catalog, 1),
            Some(MediaSource::new("/a.mp3", "audio/mpeg"))
        );
        assert_eq!(Preloader::next_source(&Catalog::from_urls(["/a.mp3"]), 0), None);
        assert_eq!(Preloader::next_source(&Catalog::default(), 0), None);
    }

    #[tokio::test]
    async fn prime_deduplicates_consecutive_requests() {
        let mut device = MockDevice::new();
        device.expect_preload().times(1).returning(|_| Ok(()));
        let preloader = Preloader::new(Arc::new(device));
        let source = MediaSource::new("/b.m4a", "audio/mp4");

        assert!(preloader.prime(&source).await);
        assert!(!preloader.prime(&source).await);
    }

    #[tokio::test]
    async fn failed_prime_is_swallowed_and_retried_later() {
        let mut device = MockDevice::new();
        device
            .expect_preload()
            .times(2)
            .returning(|_| Err(BridgeError::Network("offline".into())));
        let preloader = Preloader::new(Arc::new(device));
        let source = MediaSource::new("/b.m4a", "audio/mp4");

        assert!(!preloader.prime(&source).await);
        assert!(!preloader.prime(&source).await);
    }
}
