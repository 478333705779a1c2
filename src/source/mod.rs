//! The media library as seen by the engine: permission checks, paged asset
//! queries, album listing and per-asset location lookups.
pub mod folder;

pub use folder::FolderSource;

use crate::error::SourceError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionStatus {
    pub granted: bool,
    pub can_ask_again: bool,
}

impl PermissionStatus {
    pub const DENIED: Self = Self {
        granted: false,
        can_ask_again: false,
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum MediaSubtype {
    Screenshot,
}

/// What the underlying platform can answer natively.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SourceCapabilities {
    /// Assets can be filtered by [`MediaSubtype::Screenshot`].
    pub screenshot_subtype: bool,
}

/// One page request against the library. Pages are ordered by capture
/// time, newest first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetQuery {
    /// Only assets carrying every listed subtype.
    pub subtypes: Vec<MediaSubtype>,
    pub album_id: Option<String>,
    pub first: usize,
    pub after: Option<String>,
}

impl AssetQuery {
    /// The first page of all photos.
    pub fn photos(first: usize) -> Self {
        Self {
            subtypes: Vec::new(),
            album_id: None,
            first,
            after: None,
        }
    }
}

/// An asset as reported by the source, before normalisation.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceAsset {
    pub id: String,
    /// Epoch milliseconds.
    pub creation_time: Option<i64>,
    pub uri: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub filename: Option<String>,
    pub media_subtypes: Vec<MediaSubtype>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssetPage {
    pub assets: Vec<SourceAsset>,
    pub end_cursor: Option<String>,
    pub has_next_page: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Album {
    pub id: String,
    pub title: String,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

/// A library of photos. Videos are never reported.
#[async_trait]
pub trait MediaSource: Send + Sync {
    fn capabilities(&self) -> SourceCapabilities;

    /// Current permission without prompting.
    async fn permissions(&self) -> Result<PermissionStatus, SourceError>;

    /// Prompts for access if the platform allows it.
    async fn request_permissions(&self) -> Result<PermissionStatus, SourceError>;

    async fn assets(&self, query: &AssetQuery) -> Result<AssetPage, SourceError>;

    async fn albums(&self, include_smart_albums: bool) -> Result<Vec<Album>, SourceError>;

    /// Expensive, one asset at a time.
    async fn asset_location(&self, id: &str) -> Result<Option<GeoPoint>, SourceError>;
}

/// Checks the current permission and only prompts when it is not granted yet.
/// A failing permission call counts as denied.
pub async fn request_photo_permission(source: &dyn MediaSource) -> PermissionStatus {
    match source.permissions().await {
        Ok(existing) if existing.granted => return existing,
        Ok(_) => {}
        Err(e) => tracing::warn!("Could not read photo permission: {e}"),
    }
    match source.request_permissions().await {
        Ok(status) => status,
        Err(e) => {
            tracing::warn!("Photo permission request failed: {e}");
            PermissionStatus::DENIED
        }
    }
}
