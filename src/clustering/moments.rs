use super::{Members, minutes_to_ms, prepare};
use crate::structs::{AssetIndexItem, MomentCluster, MomentOptions};

/// Splits the index into moments: maximal runs of photos where every gap
/// between consecutive capture times is at most `session_gap_minutes`.
///
/// A gap exactly equal to the threshold keeps both photos in the same moment.
/// The result is ordered most recent first.
pub fn cluster_moments(items: &[AssetIndexItem], options: &MomentOptions) -> Vec<MomentCluster> {
    let sorted = prepare(items, options.include_screenshots);
    let gap_ms = minutes_to_ms(options.session_gap_minutes);

    let mut clusters = Vec::new();
    let mut current: Vec<&AssetIndexItem> = Vec::new();

    for item in sorted {
        if let Some(prev) = current.last()
            && item.ts.saturating_sub(prev.ts) > gap_ms
        {
            clusters.extend(to_moment(&current));
            current.clear();
        }
        current.push(item);
    }
    clusters.extend(to_moment(&current));

    clusters.sort_by(|a, b| b.start_ts.cmp(&a.start_ts));
    clusters
}

fn to_moment(group: &[&AssetIndexItem]) -> Option<MomentCluster> {
    let members = Members::from_group(group)?;
    Some(MomentCluster {
        id: members.id,
        start_ts: members.start_ts,
        end_ts: members.end_ts,
        cover_asset_id: members.cover_asset_id,
        asset_ids: members.asset_ids,
    })
}
