use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::export::{write_csv, write_image_list, ExportError};
use crate::feed::{self, FeedError, ParentRecord};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Feed(#[from] FeedError),

    #[error(transparent)]
    Export(#[from] ExportError),
}

/// Outcome of one feed processing run.
#[derive(Debug)]
pub struct FeedReport {
    /// `<item>` entries read from the feed.
    pub items: usize,
    /// Items dropped for lack of a group id.
    pub ungroupable: usize,
    /// One per group, in first-occurrence order.
    pub parents: Vec<ParentRecord>,
    /// Lines written to the image list.
    pub image_lines: usize,
    pub csv_path: PathBuf,
    pub image_list_path: PathBuf,
}

impl FeedReport {
    /// Parents left out of the image list because they have no image.
    pub fn parents_without_image(&self) -> usize {
        self.parents.len() - self.image_lines
    }
}

/// Parses the feed, groups its items, builds parents and writes both exports.
///
/// # Errors
///
/// Fails on an unreadable or malformed feed, or when an export cannot be
/// written. Ungroupable items are not errors; they are counted.
pub async fn run(
    feed_path: &Path,
    csv_path: &Path,
    image_list_path: &Path,
) -> Result<FeedReport, PipelineError> {
    let items = feed::parse(feed_path).await?;
    let item_count = items.len();
    tracing::info!(path = %feed_path.display(), items = item_count, "Read feed");

    let groups = feed::group_items(items);
    let ungroupable = groups.ungroupable;
    if ungroupable > 0 {
        tracing::warn!(dropped = ungroupable, "Items without group id or SKU were dropped");
    }

    let parents = feed::build_parents(&groups);

    write_csv(&parents, csv_path)?;
    let image_lines = write_image_list(&parents, image_list_path)?;

    Ok(FeedReport {
        items: item_count,
        ungroupable,
        parents,
        image_lines,
        csv_path: csv_path.to_path_buf(),
        image_list_path: image_list_path.to_path_buf(),
    })
}
