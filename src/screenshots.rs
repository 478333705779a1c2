//! Finding screenshots in the library.
//!
//! Platforms that tag screenshots natively are asked directly. Everywhere
//! else, and when the native query comes back empty, the detector looks for an
//! album whose title mentions screenshots and takes its members.
use crate::error::SourceError;
use crate::source::{AssetQuery, MediaSource, MediaSubtype, SourceCapabilities};
use async_trait::async_trait;
use std::collections::HashSet;

/// One way of collecting screenshot ids.
#[async_trait]
pub trait ScreenshotStrategy: Send + Sync {
    async fn collect(&self, source: &dyn MediaSource) -> Result<HashSet<String>, SourceError>;
}

/// Pages through photos tagged with the native screenshot subtype.
pub struct SubtypeQuery {
    pub page_size: usize,
    pub max_ids: usize,
}

#[async_trait]
impl ScreenshotStrategy for SubtypeQuery {
    async fn collect(&self, source: &dyn MediaSource) -> Result<HashSet<String>, SourceError> {
        let query = AssetQuery {
            subtypes: vec![MediaSubtype::Screenshot],
            ..AssetQuery::photos(self.page_size)
        };
        collect_ids(source, query, self.max_ids).await
    }
}

/// Pages through the first album whose title contains "screenshot".
pub struct AlbumScan {
    pub page_size: usize,
    pub max_ids: usize,
}

#[async_trait]
impl ScreenshotStrategy for AlbumScan {
    async fn collect(&self, source: &dyn MediaSource) -> Result<HashSet<String>, SourceError> {
        let albums = source.albums(true).await?;
        let Some(album) = albums
            .into_iter()
            .find(|a| a.title.to_lowercase().contains("screenshot"))
        else {
            return Ok(HashSet::new());
        };
        tracing::debug!("Using album {:?} for screenshot detection", album.title);

        let query = AssetQuery {
            album_id: Some(album.id),
            ..AssetQuery::photos(self.page_size)
        };
        collect_ids(source, query, self.max_ids).await
    }
}

async fn collect_ids(
    source: &dyn MediaSource,
    mut query: AssetQuery,
    max_ids: usize,
) -> Result<HashSet<String>, SourceError> {
    let mut ids = HashSet::new();
    loop {
        let page = source.assets(&query).await?;
        ids.extend(page.assets.into_iter().map(|a| a.id));

        if !page.has_next_page || ids.len() >= max_ids {
            break;
        }
        match page.end_cursor {
            Some(cursor) => query.after = Some(cursor),
            None => break,
        }
    }
    Ok(ids)
}

/// Runs its strategies in order and keeps the first non-empty answer.
pub struct ScreenshotDetector {
    strategies: Vec<Box<dyn ScreenshotStrategy>>,
}

impl ScreenshotDetector {
    pub fn new(strategies: Vec<Box<dyn ScreenshotStrategy>>) -> Self {
        Self { strategies }
    }

    /// Native subtype query first when the platform has one, album scan always.
    pub fn for_platform(capabilities: SourceCapabilities, page_size: usize, max_ids: usize) -> Self {
        let mut strategies: Vec<Box<dyn ScreenshotStrategy>> = Vec::new();
        if capabilities.screenshot_subtype {
            strategies.push(Box::new(SubtypeQuery { page_size, max_ids }));
        }
        strategies.push(Box::new(AlbumScan { page_size, max_ids }));
        Self::new(strategies)
    }

    /// Ids of every screenshot found. Never fails: any source error yields an empty set.
    pub async fn find_screenshot_ids(&self, source: &dyn MediaSource) -> HashSet<String> {
        for strategy in &self.strategies {
            match strategy.collect(source).await {
                Ok(ids) if !ids.is_empty() => return ids,
                Ok(_) => {}
                Err(e) => {
                    tracing::warn!("Screenshot detection failed: {e}");
                    return HashSet::new();
                }
            }
        }
        HashSet::new()
    }
}

/// The filename heuristic, independent of what the source reports.
pub fn filename_looks_like_screenshot(filename: &str) -> bool {
    filename.to_lowercase().contains("screenshot")
}
