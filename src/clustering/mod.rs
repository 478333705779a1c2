//! Partitioning of the asset index into moments and places.
pub mod moments;
pub mod places;

pub use moments::cluster_moments;
pub use places::cluster_places;

use crate::structs::AssetIndexItem;

const MS_PER_MINUTE: i64 = 60 * 1000;

fn minutes_to_ms(minutes: u32) -> i64 {
    i64::from(minutes) * MS_PER_MINUTE
}

/// Drops screenshots unless asked to keep them, then orders by capture time.
/// Ties are broken by id so the result does not depend on input order.
fn prepare<'a>(
    items: impl IntoIterator<Item = &'a AssetIndexItem>,
    include_screenshots: bool,
) -> Vec<&'a AssetIndexItem> {
    let mut kept: Vec<&AssetIndexItem> = items
        .into_iter()
        .filter(|a| include_screenshots || !a.is_screenshot)
        .collect();
    kept.sort_by(|a, b| a.ts.cmp(&b.ts).then_with(|| a.id.cmp(&b.id)));
    kept
}

/// Fields shared by both cluster kinds, derived from a time-sorted, non-empty group.
struct Members {
    id: String,
    start_ts: i64,
    end_ts: i64,
    cover_asset_id: String,
    asset_ids: Vec<String>,
}

impl Members {
    fn from_group(group: &[&AssetIndexItem]) -> Option<Self> {
        let first = group.first()?;
        let last = group.last()?;
        let cover = group.get(group.len() / 2)?;
        Some(Self {
            id: format!("{}-{}-{}", first.ts, last.ts, group.len()),
            start_ts: first.ts,
            end_ts: last.ts,
            cover_asset_id: cover.id.clone(),
            asset_ids: group.iter().map(|a| a.id.clone()).collect(),
        })
    }
}
