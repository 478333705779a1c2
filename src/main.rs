use photo_clusters::structs::{MomentRefreshOptions, PlaceRefreshOptions};
use photo_clusters::{FolderSource, JsonFileStore, OfflineGeocoder, PhotoLibrary, logging};
use std::path::PathBuf;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init()?;

    let folder = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));
    let cache_dir = folder.join(".photo_clusters");

    let library = PhotoLibrary::builder()
        .source(Arc::new(FolderSource::open(&folder)?))
        .geocoder(Arc::new(OfflineGeocoder::new()))
        .store(Arc::new(JsonFileStore::new(&cache_dir)?))
        .build();

    let cached = library.load_cached_moments();
    tracing::info!(
        "Cache holds {} photos in {} moments (last sync: {:?})",
        cached.asset_index.len(),
        cached.moments.len(),
        cached.last_sync_ts
    );

    let moments = library.refresh_moments(MomentRefreshOptions::default()).await;
    println!("{}", serde_json::to_string_pretty(&moments.moments)?);

    let places = library.refresh_places(PlaceRefreshOptions::default()).await;
    for place in &places.places {
        println!("{}: {} photos", place.label(), place.asset_ids.len());
    }

    Ok(())
}
