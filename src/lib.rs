//! # Photo Clusters
//!
//! Index a device photo library and group it into moments and places.
//!
//! The crate pages a media library into a flat asset index, flags
//! screenshots, looks up coordinates for a bounded number of photos per
//! refresh, and derives two views from the index:
//!
//! - **Moments**: runs of photos taken without a long pause in between.
//! - **Places**: visits, runs of photos that also stay within a small radius,
//!   named through reverse geocoding.
//!
//! Both views are persisted and served stale-while-revalidate: reads come
//! straight from the cache, refreshes recompute everything and replace it.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use photo_clusters::structs::{MomentRefreshOptions, PlaceRefreshOptions};
//! use photo_clusters::{FolderSource, JsonFileStore, OfflineGeocoder, PhotoLibrary};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let library = PhotoLibrary::builder()
//!         .source(Arc::new(FolderSource::open("photos")?))
//!         .geocoder(Arc::new(OfflineGeocoder::new()))
//!         .store(Arc::new(JsonFileStore::new("photos/.photo_clusters")?))
//!         .build();
//!
//!     // Show whatever was there last time, then refresh.
//!     println!("Cached: {} moments", library.load_cached_moments().moments.len());
//!     let moments = library.refresh_moments(MomentRefreshOptions::default()).await;
//!     let places = library.refresh_places(PlaceRefreshOptions::default()).await;
//!
//!     for place in &places.places {
//!         println!("{} ({} photos)", place.label(), place.asset_ids.len());
//!     }
//!     println!("{} moments", moments.moments.len());
//!     Ok(())
//! }
//! ```

pub mod clustering;
pub mod config;
pub mod enrich;
mod error;
pub mod geo;
pub mod geocode;
pub mod index;
pub mod logging;
pub mod photo_library;
pub mod screenshots;
pub mod source;
pub mod store;
pub mod structs;

#[cfg(test)]
mod test_support;

pub use config::LibraryConfig;
pub use error::{GeocodeError, LibraryError, SourceError, StoreError};
pub use geocode::{OfflineGeocoder, ReverseGeocode};
pub use photo_library::PhotoLibrary;
pub use source::{FolderSource, MediaSource};
pub use store::{JsonFileStore, KeyValueStore, MemoryStore};
pub use structs::{AssetIndexItem, MomentCluster, MomentsState, PlaceCluster, PlacesState};
