//! A [`MediaSource`] over a directory of photo files.
//!
//! Every photo under the root is a photo asset and every directory holding
//! photos is an album named after the directory. Capture time and dimensions
//! are read with exiftool when the folder is opened; GPS is only read on
//! demand through [`MediaSource::asset_location`].
use super::{
    Album, AssetPage, AssetQuery, GeoPoint, MediaSource, PermissionStatus,
    SourceAsset, SourceCapabilities,
};
use crate::error::{LibraryError, SourceError};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use exiftool::ExifTool;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use walkdir::{DirEntry, WalkDir};

const PHOTO_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "heic", "heif", "webp", "tif", "tiff"];

/// Exif tags tried in order for the capture time.
const TIME_TAGS: &[&str] = &["DateTimeOriginal", "CreateDate", "ModifyDate"];

fn is_hidden(entry: &DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .is_some_and(|s| s.starts_with('.'))
}

fn is_photo(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| PHOTO_EXTENSIONS.contains(&e.to_lowercase().as_str()))
}

/// Photo files below `dir`, skipping hidden files and directories.
pub fn list_photo_files(dir: &Path) -> Result<Vec<PathBuf>, walkdir::Error> {
    WalkDir::new(dir)
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_hidden(e))
        .filter_map(|entry| match entry {
            Ok(entry) if entry.file_type().is_file() && is_photo(entry.path()) => {
                Some(Ok(entry.into_path()))
            }
            Ok(_) => None,
            Err(e) => Some(Err(e)),
        })
        .collect()
}

/// Epoch milliseconds of an exif date such as `"2024:08:01 12:34:56"`.
/// Sub-seconds and offsets after the seconds are ignored; the wall time is taken as UTC.
pub fn parse_exif_datetime(value: &str) -> Option<i64> {
    let head = value.get(..19)?;
    NaiveDateTime::parse_from_str(head, "%Y:%m:%d %H:%M:%S")
        .ok()
        .map(|dt| dt.and_utc().timestamp_millis())
}

pub fn capture_time_from_exif(numeric_exif: &Value) -> Option<i64> {
    TIME_TAGS.iter().find_map(|tag| {
        numeric_exif
            .get(tag)
            .and_then(Value::as_str)
            .and_then(parse_exif_datetime)
    })
}

pub fn location_from_exif(numeric_exif: &Value) -> Option<GeoPoint> {
    let (Some(latitude), Some(longitude)) = (
        numeric_exif.get("GPSLatitude").and_then(Value::as_f64),
        numeric_exif.get("GPSLongitude").and_then(Value::as_f64),
    ) else {
        return None;
    };
    Some(GeoPoint {
        latitude,
        longitude,
    })
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct FolderEntry {
    asset: SourceAsset,
    path: PathBuf,
    album_id: String,
    album_title: String,
}

impl FolderEntry {
    fn read(root: &Path, path: PathBuf, numeric_exif: &Value) -> Result<Self, std::io::Error> {
        let creation_time = match capture_time_from_exif(numeric_exif) {
            Some(ts) => ts,
            None => DateTime::<Utc>::from(std::fs::metadata(&path)?.modified()?).timestamp_millis(),
        };
        let relative = path.strip_prefix(root).unwrap_or(&path);
        let parent = relative.parent().unwrap_or(Path::new(""));
        let album_title = path
            .parent()
            .and_then(Path::file_name)
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        let dimension = |tag: &str| {
            numeric_exif
                .get(tag)
                .and_then(Value::as_u64)
                .and_then(|v| u32::try_from(v).ok())
        };

        Ok(Self {
            asset: SourceAsset {
                id: relative.to_string_lossy().into_owned(),
                creation_time: Some(creation_time),
                uri: format!("file://{}", path.display()),
                width: dimension("ImageWidth"),
                height: dimension("ImageHeight"),
                filename: path.file_name().map(|n| n.to_string_lossy().into_owned()),
                media_subtypes: Vec::new(),
            },
            album_id: parent.to_string_lossy().into_owned(),
            album_title,
            path,
        })
    }
}

/// The in-memory listing behind a [`FolderSource`], newest first.
#[derive(Debug, Clone, Default)]
pub(crate) struct FolderCatalog {
    entries: Vec<FolderEntry>,
}

impl FolderCatalog {
    fn new(mut entries: Vec<FolderEntry>) -> Self {
        entries.sort_by(|a, b| {
            b.asset
                .creation_time
                .cmp(&a.asset.creation_time)
                .then_with(|| a.asset.id.cmp(&b.asset.id))
        });
        Self { entries }
    }

    fn albums(&self) -> Vec<Album> {
        let mut albums: BTreeMap<&str, Album> = BTreeMap::new();
        for entry in &self.entries {
            albums
                .entry(entry.album_id.as_str())
                .or_insert_with(|| Album {
                    id: entry.album_id.clone(),
                    title: entry.album_title.clone(),
                });
        }
        albums.into_values().collect()
    }

    fn page(&self, query: &AssetQuery) -> Result<AssetPage, SourceError> {
        let matching: Vec<&FolderEntry> = self
            .entries
            .iter()
            .filter(|e| query.album_id.as_ref().is_none_or(|id| &e.album_id == id))
            .filter(|e| {
                query
                    .subtypes
                    .iter()
                    .all(|s| e.asset.media_subtypes.contains(s))
            })
            .collect();

        let start = match &query.after {
            Some(cursor) => cursor
                .parse::<usize>()
                .map_err(|_| SourceError::Unavailable(format!("invalid cursor {cursor:?}")))?,
            None => 0,
        };
        let end = start.saturating_add(query.first).min(matching.len());
        let assets = matching
            .get(start..end)
            .unwrap_or_default()
            .iter()
            .map(|e| e.asset.clone())
            .collect();

        Ok(AssetPage {
            assets,
            end_cursor: Some(end.to_string()),
            has_next_page: end < matching.len(),
        })
    }

    fn path_of(&self, id: &str) -> Option<&Path> {
        self.entries
            .iter()
            .find(|e| e.asset.id == id)
            .map(|e| e.path.as_path())
    }
}

pub struct FolderSource {
    catalog: FolderCatalog,
    exiftool: Mutex<ExifTool>,
}

impl FolderSource {
    /// Walks `root` and reads the capture time of every photo in it.
    ///
    /// # Errors
    ///
    /// Fails if exiftool cannot be started, the folder cannot be walked, or a
    /// photo without an exif date has no readable modification time.
    pub fn open(root: impl AsRef<Path>) -> Result<Self, LibraryError> {
        let root = root.as_ref().to_path_buf();
        let mut exiftool = ExifTool::new()?;

        let files = list_photo_files(&root)?;
        tracing::info!("Found {} photos under {}", files.len(), root.display());

        let mut entries = Vec::with_capacity(files.len());
        for path in files {
            let numeric_exif = exiftool.json(&path, &["-n"]).unwrap_or_else(|e| {
                tracing::debug!("No exif for {}: {e}", path.display());
                Value::Null
            });
            entries.push(FolderEntry::read(&root, path, &numeric_exif)?);
        }

        Ok(Self {
            catalog: FolderCatalog::new(entries),
            exiftool: Mutex::new(exiftool),
        })
    }
}

#[async_trait]
impl MediaSource for FolderSource {
    fn capabilities(&self) -> SourceCapabilities {
        SourceCapabilities {
            screenshot_subtype: false,
        }
    }

    async fn permissions(&self) -> Result<PermissionStatus, SourceError> {
        Ok(PermissionStatus {
            granted: true,
            can_ask_again: true,
        })
    }

    async fn request_permissions(&self) -> Result<PermissionStatus, SourceError> {
        self.permissions().await
    }

    async fn assets(&self, query: &AssetQuery) -> Result<AssetPage, SourceError> {
        self.catalog.page(query)
    }

    async fn albums(&self, _include_smart_albums: bool) -> Result<Vec<Album>, SourceError> {
        Ok(self.catalog.albums())
    }

    async fn asset_location(&self, id: &str) -> Result<Option<GeoPoint>, SourceError> {
        let path = self
            .catalog
            .path_of(id)
            .ok_or_else(|| SourceError::UnknownAsset(id.to_string()))?;
        let numeric_exif = self.exiftool.lock().await.json(path, &["-n"])?;
        Ok(location_from_exif(&numeric_exif))
    }
}
