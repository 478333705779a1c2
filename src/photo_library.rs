use crate::clustering::{cluster_moments, cluster_places};
use crate::config::LibraryConfig;
use crate::enrich::enrich_locations;
use crate::geocode::{ReverseGeocode, name_places};
use crate::index::{build_asset_index, merge_screenshot_ids};
use crate::screenshots::ScreenshotDetector;
use crate::source::{MediaSource, request_photo_permission};
use crate::store::{ClusterCache, KeyValueStore};
use crate::structs::{MomentRefreshOptions, MomentsState, PlaceRefreshOptions, PlacesState};
use bon::bon;
use chrono::Utc;
use std::sync::Arc;

/// Owns the cached moments and places of one photo library and refreshes them.
///
/// Reads are served synchronously from the cache. Refreshes page the library,
/// recompute the clusters and replace the cached values. A refresh never
/// fails: when access is denied or the library cannot be read, it returns the
/// cached state untouched.
///
/// Nothing here serialises refreshes. Two overlapping refreshes of the same
/// view both run to completion and the last one to write wins.
///
/// ```rust,no_run
/// # use std::sync::Arc;
/// # use photo_clusters::{FolderSource, MemoryStore, OfflineGeocoder, PhotoLibrary};
/// # use photo_clusters::structs::MomentRefreshOptions;
/// # #[tokio::main]
/// # async fn main() -> Result<(), photo_clusters::LibraryError> {
/// let library = PhotoLibrary::builder()
///     .source(Arc::new(FolderSource::open("photos")?))
///     .geocoder(Arc::new(OfflineGeocoder::new()))
///     .store(Arc::new(MemoryStore::new()))
///     .build();
///
/// let stale = library.load_cached_moments();
/// let fresh = library.refresh_moments(MomentRefreshOptions::default()).await;
/// println!("{} -> {} moments", stale.moments.len(), fresh.moments.len());
/// # Ok(())
/// # }
/// ```
pub struct PhotoLibrary {
    source: Arc<dyn MediaSource>,
    geocoder: Arc<dyn ReverseGeocode>,
    cache: ClusterCache,
    detector: ScreenshotDetector,
    config: LibraryConfig,
}

#[bon]
impl PhotoLibrary {
    /// Constructs a `PhotoLibrary` via a builder.
    ///
    /// # Builder Arguments
    ///
    /// * `source` - The media library to index.
    /// * `geocoder` - Names place clusters.
    /// * `store` - Where the derived views are persisted.
    /// * `config` - (Default: [`LibraryConfig::default`]) Limits and clustering defaults.
    #[builder]
    pub fn new(
        source: Arc<dyn MediaSource>,
        geocoder: Arc<dyn ReverseGeocode>,
        store: Arc<dyn KeyValueStore>,
        #[builder(default)] config: LibraryConfig,
    ) -> Self {
        let detector = ScreenshotDetector::for_platform(
            source.capabilities(),
            config.page_size,
            config.max_screenshot_ids,
        );
        Self {
            source,
            geocoder,
            cache: ClusterCache::new(store),
            detector,
            config,
        }
    }

    /// Last persisted moments. Never touches the media library.
    pub fn load_cached_moments(&self) -> MomentsState {
        MomentsState {
            asset_index: self.cache.asset_index(),
            moments: self.cache.moments(),
            last_sync_ts: self.cache.last_sync_ts(),
        }
    }

    /// Last persisted places. Never touches the media library.
    pub fn load_cached_places(&self) -> PlacesState {
        PlacesState {
            asset_index: self.cache.asset_index(),
            places: self.cache.places(),
            last_sync_ts: self.cache.last_sync_ts(),
        }
    }

    /// Rebuilds the asset index and the moments from the media library.
    pub async fn refresh_moments(&self, options: MomentRefreshOptions) -> MomentsState {
        let permission = request_photo_permission(self.source.as_ref()).await;
        if !permission.granted {
            tracing::warn!("Photo access denied, serving cached moments");
            return self.load_cached_moments();
        }

        match self.rebuild_moments(&options).await {
            Some(state) => state,
            None => self.load_cached_moments(),
        }
    }

    /// Pages the library into a fresh index and moments and persists both.
    /// Expects photo access to be granted already. `None` when paging failed,
    /// in which case nothing was written.
    async fn rebuild_moments(&self, options: &MomentRefreshOptions) -> Option<MomentsState> {
        let index = match build_asset_index(
            self.source.as_ref(),
            &self.detector,
            self.config.page_size,
            self.config.max_indexed_assets,
        )
        .await
        {
            Ok(index) => index,
            Err(e) => {
                tracing::warn!("Could not index photo library, serving cached state: {e}");
                return None;
            }
        };
        let mut asset_index = index.items;
        merge_screenshot_ids(&mut asset_index, &index.screenshot_ids);

        let moments = cluster_moments(&asset_index, &self.config.moment_options(options));
        let last_sync_ts = Utc::now().timestamp_millis();
        tracing::info!(
            "Indexed {} photos into {} moments",
            asset_index.len(),
            moments.len()
        );

        if let Err(e) = self.cache.save_moments(&asset_index, &moments, last_sync_ts) {
            tracing::warn!("Could not persist moments: {e}");
        }

        Some(MomentsState {
            asset_index,
            moments,
            last_sync_ts: Some(last_sync_ts),
        })
    }

    /// Locates more photos and recomputes the places.
    ///
    /// Reuses the cached index, rebuilding it and the moments if there is none
    /// yet. When that rebuild fails the cached places are returned untouched.
    pub async fn refresh_places(&self, options: PlaceRefreshOptions) -> PlacesState {
        let permission = request_photo_permission(self.source.as_ref()).await;
        if !permission.granted {
            tracing::warn!("Photo access denied, serving cached places");
            return self.load_cached_places();
        }

        let mut asset_index = self.cache.asset_index();
        if asset_index.is_empty() {
            let rebuilt = self
                .rebuild_moments(&MomentRefreshOptions {
                    include_screenshots: options.include_screenshots,
                    ..MomentRefreshOptions::default()
                })
                .await;
            match rebuilt {
                Some(moments) => asset_index = moments.asset_index,
                None => return self.load_cached_places(),
            }
        }

        let (asset_index, changed) = enrich_locations(
            self.source.as_ref(),
            asset_index,
            self.config.location_lookup_budget,
        )
        .await;
        if changed && let Err(e) = self.cache.save_asset_index(&asset_index) {
            tracing::warn!("Could not persist enriched asset index: {e}");
        }

        let mut places = cluster_places(&asset_index, &self.config.place_options(&options));
        name_places(self.geocoder.as_ref(), &mut places).await;
        let last_sync_ts = Utc::now().timestamp_millis();
        tracing::info!("Grouped located photos into {} places", places.len());

        if let Err(e) = self.cache.save_places(&places, last_sync_ts) {
            tracing::warn!("Could not persist places: {e}");
        }

        PlacesState {
            asset_index,
            places,
            last_sync_ts: Some(last_sync_ts),
        }
    }
}
