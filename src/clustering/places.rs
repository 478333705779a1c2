use super::{Members, minutes_to_ms, prepare};
use crate::geo::distance_km;
use crate::structs::{AssetIndexItem, PlaceCluster, PlaceOptions};

/// Open group of a place scan, tracking the mean coordinate of its members.
struct Visit<'a> {
    members: Vec<&'a AssetIndexItem>,
    lat_sum: f64,
    lon_sum: f64,
    located: usize,
}

impl<'a> Visit<'a> {
    fn start(item: &'a AssetIndexItem) -> Self {
        let mut visit = Self {
            members: Vec::new(),
            lat_sum: 0.0,
            lon_sum: 0.0,
            located: 0,
        };
        visit.push(item);
        visit
    }

    fn push(&mut self, item: &'a AssetIndexItem) {
        if let Some((lat, lon)) = item.coordinates() {
            self.lat_sum += lat;
            self.lon_sum += lon;
            self.located += 1;
        }
        self.members.push(item);
    }

    /// Arithmetic mean of the members that carry coordinates.
    fn centroid(&self) -> (f64, f64) {
        if self.located == 0 {
            return (0.0, 0.0);
        }
        let n = self.located as f64;
        (self.lat_sum / n, self.lon_sum / n)
    }

    fn last_ts(&self) -> Option<i64> {
        self.members.last().map(|a| a.ts)
    }

    fn close(self) -> Option<PlaceCluster> {
        let (lat, lon) = self.centroid();
        let members = Members::from_group(&self.members)?;
        Some(PlaceCluster {
            id: members.id,
            start_ts: members.start_ts,
            end_ts: members.end_ts,
            cover_asset_id: members.cover_asset_id,
            asset_ids: members.asset_ids,
            lat,
            lon,
            name: None,
        })
    }
}

/// Splits located photos into visits.
///
/// Photos without both coordinates are left out entirely. A new place starts
/// whenever the time since the previous photo exceeds `max_travel_time_minutes`
/// or the next photo lies more than `radius_km` from the running centroid of
/// the current place. Because the centroid moves as photos are added, a long
/// visit may drift within its radius. Names are attached separately by
/// [`crate::geocode::name_places`]. The result is ordered most recent first.
pub fn cluster_places(items: &[AssetIndexItem], options: &PlaceOptions) -> Vec<PlaceCluster> {
    let located = items.iter().filter(|a| a.coordinates().is_some());
    let sorted = prepare(located, options.include_screenshots);
    let max_travel_ms = minutes_to_ms(options.max_travel_time_minutes);

    let mut clusters = Vec::new();
    let mut current: Option<Visit> = None;

    for item in sorted {
        let Some((lat, lon)) = item.coordinates() else {
            continue;
        };
        current = match current {
            None => Some(Visit::start(item)),
            Some(mut visit) => {
                let (c_lat, c_lon) = visit.centroid();
                let travel_ms = visit.last_ts().map_or(0, |prev| item.ts.saturating_sub(prev));
                let dist_km = distance_km(c_lat, c_lon, lat, lon);

                if travel_ms > max_travel_ms || dist_km > options.radius_km {
                    clusters.extend(visit.close());
                    Some(Visit::start(item))
                } else {
                    visit.push(item);
                    Some(visit)
                }
            }
        };
    }
    if let Some(visit) = current {
        clusters.extend(visit.close());
    }

    clusters.sort_by(|a, b| b.start_ts.cmp(&a.start_ts));
    clusters
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINUTE: i64 = 60 * 1000;

    // One degree of latitude is ~111.195 km.
    const KM_IN_LAT_DEGREES: f64 = 1.0 / 111.195;

    fn located(id: &str, ts: i64, lat: f64, lon: f64) -> AssetIndexItem {
        AssetIndexItem {
            id: id.to_string(),
            ts,
            uri: format!("file:///{id}.jpg"),
            w: 100,
            h: 100,
            is_screenshot: false,
            lat: Some(lat),
            lon: Some(lon),
        }
    }

    fn unlocated(id: &str, ts: i64) -> AssetIndexItem {
        AssetIndexItem {
            lat: None,
            lon: None,
            ..located(id, ts, 0.0, 0.0)
        }
    }

    fn options() -> PlaceOptions {
        PlaceOptions {
            radius_km: 0.5,
            max_travel_time_minutes: 120,
            include_screenshots: false,
        }
    }

    #[test]
    fn test_empty_and_unlocated_input_gives_no_places() {
        assert!(cluster_places(&[], &options()).is_empty());
        assert!(cluster_places(&[unlocated("a", 0), unlocated("b", 1)], &options()).is_empty());
    }

    #[test]
    fn test_items_without_coordinates_are_excluded() {
        let mut half = unlocated("half", 2 * MINUTE);
        half.lat = Some(52.0);
        let items = vec![
            located("a", 0, 52.0, 4.0),
            unlocated("b", MINUTE),
            half,
            located("c", 3 * MINUTE, 52.0, 4.0),
        ];
        let places = cluster_places(&items, &options());
        assert_eq!(places.len(), 1);
        assert_eq!(places[0].asset_ids, vec!["a", "c"]);
    }

    #[test]
    fn test_splits_on_distance_not_time() {
        let far = 52.0 + KM_IN_LAT_DEGREES;
        let items = vec![
            located("a", 0, 52.0, 4.0),
            located("b", MINUTE, 52.0, 4.0),
            located("c", 6 * MINUTE, far, 4.0),
        ];
        let places = cluster_places(&items, &options());

        assert_eq!(places.len(), 2);
        assert_eq!(places[0].asset_ids, vec!["c"]);
        assert_eq!(places[1].asset_ids, vec!["a", "b"]);
        assert!((places[0].lat - far).abs() < 1e-12);
    }

    #[test]
    fn test_splits_on_time_at_same_spot() {
        let items = vec![
            located("a", 0, 52.0, 4.0),
            located("b", 121 * MINUTE, 52.0, 4.0),
        ];
        assert_eq!(cluster_places(&items, &options()).len(), 2);

        let within = vec![
            located("a", 0, 52.0, 4.0),
            located("b", 120 * MINUTE, 52.0, 4.0),
        ];
        assert_eq!(cluster_places(&within, &options()).len(), 1);
    }

    #[test]
    fn test_centroid_is_mean_of_members() {
        let step = 0.2 * KM_IN_LAT_DEGREES;
        let items = vec![
            located("a", 0, 10.0, 20.0),
            located("b", MINUTE, 10.0 + step, 20.0),
            located("c", 2 * MINUTE, 10.0 + 2.0 * step, 20.0),
        ];

        let first_two = cluster_places(&items[..2], &options());
        assert_eq!(first_two.len(), 1);
        assert!((first_two[0].lat - (10.0 + step / 2.0)).abs() < 1e-9);

        let all = cluster_places(&items, &options());
        assert_eq!(all.len(), 1);
        assert!((all[0].lat - (10.0 + step)).abs() < 1e-9);
        assert!((all[0].lon - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_running_centroid_allows_slow_drift() {
        // The last photo is 0.7 km from the first one, but only 0.475 km from
        // the centroid of the two photos before it.
        let items = vec![
            located("a", 0, 40.0, -3.0),
            located("b", MINUTE, 40.0 + 0.45 * KM_IN_LAT_DEGREES, -3.0),
            located("c", 2 * MINUTE, 40.0 + 0.7 * KM_IN_LAT_DEGREES, -3.0),
        ];
        assert!(distance_km(40.0, -3.0, items[2].lat.unwrap(), -3.0) > 0.5);

        let places = cluster_places(&items, &options());
        assert_eq!(places.len(), 1);
        assert_eq!(places[0].asset_ids, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_centroid_recorded_at_closure() {
        let far = 1.0;
        let items = vec![
            located("a", 0, 0.0, 0.0),
            located("b", MINUTE, 0.001, 0.0),
            located("c", 2 * MINUTE, far, 0.0),
        ];
        let places = cluster_places(&items, &options());
        assert_eq!(places.len(), 2);
        let first_visit = &places[1];
        assert!((first_visit.lat - 0.0005).abs() < 1e-12);
        assert!(first_visit.name.is_none());
    }

    #[test]
    fn test_screenshot_filter_and_ordering() {
        let mut shot = located("shot", MINUTE, 0.0, 0.0);
        shot.is_screenshot = true;
        let items = vec![
            located("late", 500 * MINUTE, 0.0, 0.0),
            shot,
            located("early", 0, 0.0, 0.0),
        ];

        let places = cluster_places(&items, &options());
        let ids: Vec<&Vec<String>> = places.iter().map(|p| &p.asset_ids).collect();
        assert_eq!(ids, vec![&vec!["late".to_string()], &vec!["early".to_string()]]);

        let with = cluster_places(
            &items,
            &PlaceOptions {
                include_screenshots: true,
                ..options()
            },
        );
        assert_eq!(with[1].asset_ids, vec!["early", "shot"]);
        assert_eq!(with[1].cover_asset_id, "shot");
    }

    #[test]
    fn test_extreme_timestamps_do_not_overflow() {
        let places = cluster_places(
            &[
                located("first", i64::MIN, 52.0, 4.0),
                located("last", i64::MAX, 52.0, 4.0),
            ],
            &options(),
        );
        assert_eq!(places.len(), 2);
        assert_eq!(places[0].asset_ids, vec!["last"]);
    }
}
