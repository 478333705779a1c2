use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One photo in the library index.
///
/// Items are owned by the index; clusters only refer to them by `id`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetIndexItem {
    /// Opaque, stable identifier assigned by the media source.
    pub id: String,
    /// Capture time in epoch milliseconds. Not unique.
    pub ts: i64,
    /// Locator used for display. Never parsed here.
    pub uri: String,
    pub w: u32,
    pub h: u32,
    #[serde(default)]
    pub is_screenshot: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lon: Option<f64>,
}

impl AssetIndexItem {
    /// Both coordinates, if enrichment attached them.
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        self.lat.zip(self.lon)
    }
}

/// A run of photos taken without a long pause in between.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MomentCluster {
    /// `"{start_ts}-{end_ts}-{count}"`. Stable across runs on identical
    /// input, but two clusters with the same bounds and size share an id.
    pub id: String,
    pub start_ts: i64,
    pub end_ts: i64,
    pub cover_asset_id: String,
    /// Member ids, ascending by capture time.
    pub asset_ids: Vec<String>,
}

/// A visit to one location: a moment that also stays within a radius.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceCluster {
    pub id: String,
    pub start_ts: i64,
    pub end_ts: i64,
    pub cover_asset_id: String,
    pub asset_ids: Vec<String>,
    /// Centroid of the members at the time the cluster was closed.
    pub lat: f64,
    pub lon: f64,
    /// Reverse geocoded label such as `"Amsterdam, Netherlands"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl PlaceCluster {
    /// The human label, falling back to the raw centroid.
    pub fn label(&self) -> String {
        match &self.name {
            Some(name) => name.clone(),
            None => format!("{:.3}, {:.3}", self.lat, self.lon),
        }
    }
}

/// Parameters of the moment clusterer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MomentOptions {
    /// Largest gap between consecutive photos that keeps them together.
    pub session_gap_minutes: u32,
    pub include_screenshots: bool,
}

impl Default for MomentOptions {
    fn default() -> Self {
        Self {
            session_gap_minutes: 60,
            include_screenshots: false,
        }
    }
}

/// Parameters of the place clusterer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaceOptions {
    pub radius_km: f64,
    pub max_travel_time_minutes: u32,
    pub include_screenshots: bool,
}

impl Default for PlaceOptions {
    fn default() -> Self {
        Self {
            radius_km: 0.5,
            max_travel_time_minutes: 120,
            include_screenshots: false,
        }
    }
}

/// Per-call options of [`crate::photo_library::PhotoLibrary::refresh_moments`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MomentRefreshOptions {
    /// Overrides the configured session gap.
    pub session_gap_minutes: Option<u32>,
    pub include_screenshots: bool,
}

/// Per-call options of [`crate::photo_library::PhotoLibrary::refresh_places`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlaceRefreshOptions {
    pub include_screenshots: bool,
    /// Overrides the configured maximum travel time between photos.
    pub max_travel_time_minutes: Option<u32>,
}

/// Cached read model behind the moments view.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MomentsState {
    pub asset_index: Vec<AssetIndexItem>,
    pub moments: Vec<MomentCluster>,
    pub last_sync_ts: Option<i64>,
}

impl MomentsState {
    pub fn find_moment(&self, id: &str) -> Option<&MomentCluster> {
        self.moments.iter().find(|m| m.id == id)
    }

    /// Index items of a moment, in member order. Ids missing from the index are skipped.
    pub fn assets_for(&self, moment: &MomentCluster) -> Vec<&AssetIndexItem> {
        resolve_assets(&self.asset_index, &moment.asset_ids)
    }

    /// Every flagged screenshot, newest first.
    pub fn screenshots(&self) -> Vec<&AssetIndexItem> {
        let mut shots: Vec<&AssetIndexItem> =
            self.asset_index.iter().filter(|a| a.is_screenshot).collect();
        shots.sort_by(|a, b| b.ts.cmp(&a.ts));
        shots
    }
}

/// Cached read model behind the places view.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacesState {
    pub asset_index: Vec<AssetIndexItem>,
    pub places: Vec<PlaceCluster>,
    pub last_sync_ts: Option<i64>,
}

impl PlacesState {
    pub fn find_place(&self, id: &str) -> Option<&PlaceCluster> {
        self.places.iter().find(|p| p.id == id)
    }

    pub fn assets_for(&self, place: &PlaceCluster) -> Vec<&AssetIndexItem> {
        resolve_assets(&self.asset_index, &place.asset_ids)
    }
}

fn resolve_assets<'a>(index: &'a [AssetIndexItem], ids: &[String]) -> Vec<&'a AssetIndexItem> {
    let by_id: HashMap<&str, &AssetIndexItem> = index.iter().map(|a| (a.id.as_str(), a)).collect();
    ids.iter().filter_map(|id| by_id.get(id.as_str()).copied()).collect()
}
