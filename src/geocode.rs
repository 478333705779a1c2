use crate::error::GeocodeError;
use crate::structs::PlaceCluster;
use async_trait::async_trait;
use reverse_geocoder::ReverseGeocoder;
use serde::{Deserialize, Serialize};

/// What a reverse geocoding provider knows about a coordinate.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceName {
    pub city_name: Option<String>,
    pub country_name: Option<String>,
}

#[async_trait]
pub trait ReverseGeocode: Send + Sync {
    async fn reverse_geocode(&self, lat: f64, lon: f64) -> Result<PlaceName, GeocodeError>;
}

/// Reverse geocoder backed by the bundled GeoNames city table, so naming
/// works without network access.
pub struct OfflineGeocoder {
    geocoder: ReverseGeocoder,
}

impl OfflineGeocoder {
    pub fn new() -> Self {
        Self {
            geocoder: ReverseGeocoder::new(),
        }
    }
}

impl Default for OfflineGeocoder {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ReverseGeocode for OfflineGeocoder {
    async fn reverse_geocode(&self, lat: f64, lon: f64) -> Result<PlaceName, GeocodeError> {
        if !lat.is_finite() || !lon.is_finite() {
            return Err(GeocodeError::InvalidCoordinates(lat, lon));
        }
        let search_result = self.geocoder.search((lat, lon));
        let country = rust_iso3166::from_alpha2(&search_result.record.cc);
        let record = search_result.record;

        Ok(PlaceName {
            city_name: Some(record.name.clone()).filter(|n| !n.is_empty()),
            country_name: country.map(|c| c.name.to_string()),
        })
    }
}

/// `"City, Country"`, or whichever half is known. `None` when neither is.
pub fn compose_place_name(place: &PlaceName) -> Option<String> {
    let parts: Vec<&str> = [&place.city_name, &place.country_name]
        .into_iter()
        .flatten()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .collect();
    (!parts.is_empty()).then(|| parts.join(", "))
}

/// Labels every place with the name of its centroid.
///
/// A failed lookup leaves that place unnamed and moves on to the next one.
pub async fn name_places(geocoder: &dyn ReverseGeocode, places: &mut [PlaceCluster]) {
    for place in places.iter_mut() {
        place.name = match geocoder.reverse_geocode(place.lat, place.lon).await {
            Ok(found) => compose_place_name(&found),
            Err(e) => {
                tracing::debug!("Could not name place {}: {e}", place.id);
                None
            }
        };
    }
}
