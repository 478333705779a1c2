use crate::index::sort_canonical;
use crate::source::MediaSource;
use crate::structs::AssetIndexItem;

/// Attaches coordinates to index items, spending at most `budget` per-asset lookups.
///
/// Newest photos are looked up first and items that already have both
/// coordinates are skipped. A lookup that fails still uses up its slot. The
/// items come back in ascending capture order, together with whether any
/// item gained coordinates.
pub async fn enrich_locations(
    source: &dyn MediaSource,
    mut items: Vec<AssetIndexItem>,
    budget: usize,
) -> (Vec<AssetIndexItem>, bool) {
    items.sort_by(|a, b| b.ts.cmp(&a.ts));

    let mut lookups = 0;
    let mut located = 0;
    for item in items.iter_mut() {
        if lookups >= budget {
            break;
        }
        if item.coordinates().is_some() {
            continue;
        }

        lookups += 1;
        match source.asset_location(&item.id).await {
            Ok(Some(point)) => {
                item.lat = Some(point.latitude);
                item.lon = Some(point.longitude);
                located += 1;
            }
            Ok(None) => {}
            Err(e) => tracing::debug!("Location lookup for {} failed: {e}", item.id),
        }
    }
    tracing::info!("Spent {lookups} location lookups, {located} assets gained coordinates");

    sort_canonical(&mut items);
    (items, located > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::FakeSource;

    fn item(id: &str, ts: i64) -> AssetIndexItem {
        AssetIndexItem {
            id: id.to_string(),
            ts,
            uri: String::new(),
            w: 1,
            h: 1,
            is_screenshot: false,
            lat: None,
            lon: None,
        }
    }

    #[tokio::test]
    async fn test_budget_caps_lookups_and_favors_newest() {
        let items: Vec<AssetIndexItem> = (0..400).map(|i| item(&format!("p{i:03}"), i)).collect();
        let mut source = FakeSource::new();
        for i in 0..400 {
            source = source.with_location(&format!("p{i:03}"), 1.0, 2.0);
        }

        let (enriched, changed) = enrich_locations(&source, items, 250).await;

        assert!(changed);
        assert_eq!(source.location_lookups(), 250);
        assert_eq!(enriched.iter().filter(|a| a.coordinates().is_some()).count(), 250);
        assert!(enriched[149].coordinates().is_none());
        assert!(enriched[150].coordinates().is_some());
        assert!(enriched.windows(2).all(|w| w[0].ts <= w[1].ts));
    }

    #[tokio::test]
    async fn test_already_located_items_are_not_charged() {
        let mut done = item("done", 10);
        done.lat = Some(5.0);
        done.lon = Some(6.0);
        let source = FakeSource::new()
            .with_location("done", 0.0, 0.0)
            .with_location("todo", 7.0, 8.0);

        let (enriched, changed) = enrich_locations(&source, vec![done, item("todo", 5)], 1).await;

        assert!(changed);
        assert_eq!(source.location_lookups(), 1);
        assert_eq!(enriched[0].coordinates(), Some((7.0, 8.0)));
        assert_eq!(enriched[1].coordinates(), Some((5.0, 6.0)));
    }

    #[tokio::test]
    async fn test_failed_lookups_are_charged() {
        let source = FakeSource::new()
            .failing_location("b")
            .failing_location("c")
            .with_location("a", 1.0, 1.0);
        let items = vec![item("a", 0), item("b", 1), item("c", 2)];

        let (enriched, changed) = enrich_locations(&source, items, 2).await;

        assert!(!changed);
        assert_eq!(source.location_lookups(), 2);
        assert!(enriched.iter().all(|a| a.coordinates().is_none()));
    }

    #[tokio::test]
    async fn test_no_coordinates_found_reports_unchanged() {
        let source = FakeSource::new();
        let (enriched, changed) = enrich_locations(&source, vec![item("a", 3), item("b", 1)], 250).await;
        assert!(!changed);
        assert_eq!(source.location_lookups(), 2);
        let ids: Vec<&str> = enriched.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a"]);
    }

    #[tokio::test]
    async fn test_half_located_item_is_looked_up_again() {
        let mut half = item("half", 0);
        half.lat = Some(3.0);
        let source = FakeSource::new().with_location("half", 9.0, 9.0);

        let (enriched, changed) = enrich_locations(&source, vec![half], 250).await;
        assert!(changed);
        assert_eq!(enriched[0].coordinates(), Some((9.0, 9.0)));
    }
}
