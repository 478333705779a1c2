//! Scripted in-memory stand-ins for the external ports.
use crate::error::{GeocodeError, SourceError};
use crate::geocode::{PlaceName, ReverseGeocode};
use crate::source::{
    Album, AssetPage, AssetQuery, GeoPoint, MediaSource, PermissionStatus, SourceAsset,
    SourceCapabilities,
};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};

pub fn photo(id: &str, ts: i64) -> SourceAsset {
    SourceAsset {
        id: id.to_string(),
        creation_time: Some(ts),
        uri: format!("file:///photos/{id}.jpg"),
        width: Some(4032),
        height: Some(3024),
        filename: Some(format!("IMG_{id}.jpg")),
        media_subtypes: Vec::new(),
    }
}

pub struct FakeSource {
    capabilities: SourceCapabilities,
    permission: PermissionStatus,
    fail_permissions: bool,
    grant_on_prompt: bool,
    assets: Vec<SourceAsset>,
    albums: Vec<(Album, Vec<String>)>,
    fail_albums: bool,
    fail_assets: bool,
    drop_cursor: bool,
    locations: HashMap<String, GeoPoint>,
    failing_locations: HashSet<String>,
    prompts: AtomicUsize,
    page_requests: AtomicUsize,
    location_lookups: AtomicUsize,
}

impl FakeSource {
    pub fn new() -> Self {
        Self {
            capabilities: SourceCapabilities::default(),
            permission: PermissionStatus {
                granted: true,
                can_ask_again: true,
            },
            fail_permissions: false,
            grant_on_prompt: false,
            assets: Vec::new(),
            albums: Vec::new(),
            fail_albums: false,
            fail_assets: false,
            drop_cursor: false,
            locations: HashMap::new(),
            failing_locations: HashSet::new(),
            prompts: AtomicUsize::new(0),
            page_requests: AtomicUsize::new(0),
            location_lookups: AtomicUsize::new(0),
        }
    }

    pub fn with_permission(mut self, granted: bool, can_ask_again: bool) -> Self {
        self.permission = PermissionStatus {
            granted,
            can_ask_again,
        };
        self
    }

    pub fn failing_permissions(mut self) -> Self {
        self.fail_permissions = true;
        self
    }

    /// Grants access when prompted while the status check keeps reporting
    /// the configured permission.
    pub fn granting_on_prompt(mut self) -> Self {
        self.grant_on_prompt = true;
        self
    }

    pub fn with_subtype_support(mut self) -> Self {
        self.capabilities.screenshot_subtype = true;
        self
    }

    pub fn with_photos(mut self, photos: Vec<SourceAsset>) -> Self {
        self.assets.extend(photos);
        self
    }

    pub fn with_album(mut self, title: &str, members: &[&str]) -> Self {
        let album = Album {
            id: format!("album-{}", self.albums.len()),
            title: title.to_string(),
        };
        self.albums
            .push((album, members.iter().map(|m| m.to_string()).collect()));
        self
    }

    pub fn failing_albums(mut self) -> Self {
        self.fail_albums = true;
        self
    }

    pub fn failing_assets(mut self) -> Self {
        self.fail_assets = true;
        self
    }

    /// Reports further pages without ever handing out a cursor.
    pub fn dropping_cursor(mut self) -> Self {
        self.drop_cursor = true;
        self
    }

    pub fn with_location(mut self, id: &str, latitude: f64, longitude: f64) -> Self {
        self.locations.insert(
            id.to_string(),
            GeoPoint {
                latitude,
                longitude,
            },
        );
        self
    }

    pub fn failing_location(mut self, id: &str) -> Self {
        self.failing_locations.insert(id.to_string());
        self
    }

    pub fn permission_prompts(&self) -> usize {
        self.prompts.load(Ordering::SeqCst)
    }

    pub fn page_requests(&self) -> usize {
        self.page_requests.load(Ordering::SeqCst)
    }

    pub fn location_lookups(&self) -> usize {
        self.location_lookups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MediaSource for FakeSource {
    fn capabilities(&self) -> SourceCapabilities {
        self.capabilities
    }

    async fn permissions(&self) -> Result<PermissionStatus, SourceError> {
        if self.fail_permissions {
            return Err(SourceError::Unavailable("permissions".to_string()));
        }
        Ok(self.permission)
    }

    async fn request_permissions(&self) -> Result<PermissionStatus, SourceError> {
        self.prompts.fetch_add(1, Ordering::SeqCst);
        if self.fail_permissions {
            return Err(SourceError::Unavailable("permissions".to_string()));
        }
        if self.grant_on_prompt {
            return Ok(PermissionStatus {
                granted: true,
                can_ask_again: true,
            });
        }
        Ok(self.permission)
    }

    async fn assets(&self, query: &AssetQuery) -> Result<AssetPage, SourceError> {
        self.page_requests.fetch_add(1, Ordering::SeqCst);
        if self.fail_assets {
            return Err(SourceError::Unavailable("assets".to_string()));
        }

        let members: Option<&Vec<String>> = match &query.album_id {
            Some(album_id) => Some(
                self.albums
                    .iter()
                    .find(|(album, _)| &album.id == album_id)
                    .map(|(_, members)| members)
                    .ok_or_else(|| SourceError::UnknownAsset(album_id.clone()))?,
            ),
            None => None,
        };

        let mut matching: Vec<&SourceAsset> = self
            .assets
            .iter()
            .filter(|a| members.is_none_or(|m| m.contains(&a.id)))
            .filter(|a| query.subtypes.iter().all(|s| a.media_subtypes.contains(s)))
            .collect();
        matching.sort_by(|a, b| b.creation_time.cmp(&a.creation_time));

        let start: usize = match &query.after {
            Some(cursor) => cursor
                .parse()
                .map_err(|_| SourceError::Unavailable(format!("bad cursor {cursor}")))?,
            None => 0,
        };
        let end = (start + query.first).min(matching.len());
        let assets = matching
            .get(start..end)
            .unwrap_or_default()
            .iter()
            .map(|a| (*a).clone())
            .collect();
        let has_next_page = end < matching.len();

        Ok(AssetPage {
            assets,
            end_cursor: (!self.drop_cursor).then(|| end.to_string()),
            has_next_page,
        })
    }

    async fn albums(&self, _include_smart_albums: bool) -> Result<Vec<Album>, SourceError> {
        if self.fail_albums {
            return Err(SourceError::Unavailable("albums".to_string()));
        }
        Ok(self.albums.iter().map(|(album, _)| album.clone()).collect())
    }

    async fn asset_location(&self, id: &str) -> Result<Option<GeoPoint>, SourceError> {
        self.location_lookups.fetch_add(1, Ordering::SeqCst);
        if self.failing_locations.contains(id) {
            return Err(SourceError::Unavailable(format!("location of {id}")));
        }
        Ok(self.locations.get(id).copied())
    }
}

type Lookup = Box<dyn Fn(f64, f64) -> Result<PlaceName, GeocodeError> + Send + Sync>;

pub struct FakeGeocoder {
    lookup: Lookup,
    calls: AtomicUsize,
}

impl FakeGeocoder {
    pub fn new(lookup: impl Fn(f64, f64) -> Result<PlaceName, GeocodeError> + Send + Sync + 'static) -> Self {
        Self {
            lookup: Box::new(lookup),
            calls: AtomicUsize::new(0),
        }
    }

    /// Names every location after the same city.
    pub fn always(city: &str, country: &str) -> Self {
        let (city, country) = (city.to_string(), country.to_string());
        Self::new(move |_, _| {
            Ok(PlaceName {
                city_name: Some(city.clone()),
                country_name: Some(country.clone()),
            })
        })
    }

    pub fn failing() -> Self {
        Self::new(|_, _| Err(GeocodeError::Provider("offline".to_string())))
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ReverseGeocode for FakeGeocoder {
    async fn reverse_geocode(&self, lat: f64, lon: f64) -> Result<PlaceName, GeocodeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        (self.lookup)(lat, lon)
    }
}
