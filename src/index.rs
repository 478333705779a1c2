use crate::error::SourceError;
use crate::screenshots::{ScreenshotDetector, filename_looks_like_screenshot};
use crate::source::{AssetQuery, MediaSource, MediaSubtype, SourceAsset};
use crate::structs::AssetIndexItem;
use std::collections::HashSet;

/// Result of paging the library: the items plus the separately detected screenshots.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssetIndex {
    pub items: Vec<AssetIndexItem>,
    pub screenshot_ids: HashSet<String>,
}

fn normalize(asset: SourceAsset) -> AssetIndexItem {
    let is_screenshot = asset.media_subtypes.contains(&MediaSubtype::Screenshot)
        || asset
            .filename
            .as_deref()
            .is_some_and(filename_looks_like_screenshot);
    AssetIndexItem {
        id: asset.id,
        ts: asset.creation_time.unwrap_or(0),
        uri: asset.uri,
        w: asset.width.unwrap_or(0),
        h: asset.height.unwrap_or(0),
        is_screenshot,
        lat: None,
        lon: None,
    }
}

/// Pages through the photo library, newest first, until the source runs out
/// or `max_items` have been collected.
///
/// Whole pages are kept, so the ceiling is reached at a page boundary. The
/// returned items are in ascending capture order (ties by id). Screenshot ids
/// from `detector` are returned alongside and not yet merged; see
/// [`merge_screenshot_ids`].
pub async fn build_asset_index(
    source: &dyn MediaSource,
    detector: &ScreenshotDetector,
    page_size: usize,
    max_items: usize,
) -> Result<AssetIndex, SourceError> {
    let screenshot_ids = detector.find_screenshot_ids(source).await;

    let mut items = Vec::new();
    let mut query = AssetQuery::photos(page_size);
    loop {
        let page = source.assets(&query).await?;
        tracing::debug!("Indexed page of {} assets", page.assets.len());
        items.extend(page.assets.into_iter().map(normalize));

        if !page.has_next_page || items.len() >= max_items {
            break;
        }
        match page.end_cursor {
            Some(cursor) => query.after = Some(cursor),
            None => {
                tracing::warn!("Source reported more pages without a cursor, stopping");
                break;
            }
        }
    }

    sort_canonical(&mut items);
    Ok(AssetIndex {
        items,
        screenshot_ids,
    })
}

/// Ascending capture time, ties by id.
pub(crate) fn sort_canonical(items: &mut [AssetIndexItem]) {
    items.sort_by(|a, b| a.ts.cmp(&b.ts).then_with(|| a.id.cmp(&b.id)));
}

/// Flags every item whose id was found by the screenshot detector, keeping
/// flags that were already set.
pub fn merge_screenshot_ids(items: &mut [AssetIndexItem], screenshot_ids: &HashSet<String>) {
    for item in items.iter_mut() {
        item.is_screenshot = item.is_screenshot || screenshot_ids.contains(&item.id);
    }
}
