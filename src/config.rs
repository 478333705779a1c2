use crate::structs::{MomentOptions, MomentRefreshOptions, PlaceOptions, PlaceRefreshOptions};
use serde::{Deserialize, Serialize};

/// Tunables of the refresh pipeline. The defaults are the limits the
/// library was designed around.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LibraryConfig {
    /// Default gap that splits moments, overridable per refresh.
    #[serde(default = "default_session_gap_minutes")]
    pub session_gap_minutes: u32,

    #[serde(default = "default_place_radius_km")]
    pub place_radius_km: f64,

    /// Default time between photos that splits places, overridable per refresh.
    #[serde(default = "default_max_travel_time_minutes")]
    pub max_travel_time_minutes: u32,

    #[serde(default = "default_page_size")]
    pub page_size: usize,

    /// Photos beyond this many (oldest first) are left out of the index.
    #[serde(default = "default_max_indexed_assets")]
    pub max_indexed_assets: usize,

    #[serde(default = "default_max_screenshot_ids")]
    pub max_screenshot_ids: usize,

    /// Per-asset location lookups allowed in one places refresh.
    #[serde(default = "default_location_lookup_budget")]
    pub location_lookup_budget: usize,
}

fn default_session_gap_minutes() -> u32 {
    60
}

fn default_place_radius_km() -> f64 {
    0.5
}

fn default_max_travel_time_minutes() -> u32 {
    120
}

fn default_page_size() -> usize {
    200
}

fn default_max_indexed_assets() -> usize {
    2000
}

fn default_max_screenshot_ids() -> usize {
    2000
}

fn default_location_lookup_budget() -> usize {
    250
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            session_gap_minutes: default_session_gap_minutes(),
            place_radius_km: default_place_radius_km(),
            max_travel_time_minutes: default_max_travel_time_minutes(),
            page_size: default_page_size(),
            max_indexed_assets: default_max_indexed_assets(),
            max_screenshot_ids: default_max_screenshot_ids(),
            location_lookup_budget: default_location_lookup_budget(),
        }
    }
}

impl LibraryConfig {
    pub fn moment_options(&self, refresh: &MomentRefreshOptions) -> MomentOptions {
        MomentOptions {
            session_gap_minutes: refresh
                .session_gap_minutes
                .unwrap_or(self.session_gap_minutes),
            include_screenshots: refresh.include_screenshots,
        }
    }

    pub fn place_options(&self, refresh: &PlaceRefreshOptions) -> PlaceOptions {
        PlaceOptions {
            radius_km: self.place_radius_km,
            max_travel_time_minutes: refresh
                .max_travel_time_minutes
                .unwrap_or(self.max_travel_time_minutes),
            include_screenshots: refresh.include_screenshots,
        }
    }
}
