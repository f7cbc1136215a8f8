use std::path::Path;

use super::DownloadError;
use crate::export::LIST_DELIMITER;

/// One valid `<sku>|<url>` line of the image list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListEntry {
    pub sku: String,
    pub url: String,
}

/// Non-blank lines of an image list, in file order.
#[derive(Debug, Clone, Default)]
pub struct ImageList {
    pub lines: Vec<String>,
    /// Blank lines that were ignored.
    pub blank_lines: usize,
}

/// Splits a list line into SKU and URL.
///
/// The line must contain exactly one `|`.
///
/// # Errors
///
/// [`DownloadError::MalformedListLine`] when the line has zero or several
/// delimiters.
pub fn parse_list_line(line: &str) -> Result<ListEntry, DownloadError> {
    let line = line.trim();
    let mut parts = line.split(LIST_DELIMITER);
    match (parts.next(), parts.next(), parts.next()) {
        (Some(sku), Some(url), None) => Ok(ListEntry {
            sku: sku.to_string(),
            url: url.to_string(),
        }),
        _ => Err(DownloadError::MalformedListLine(line.to_string())),
    }
}

/// Parses list file content, trimming lines and dropping blank ones.
pub fn parse_list_content(content: &str) -> ImageList {
    let mut list = ImageList::default();
    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() {
            list.blank_lines += 1;
        } else {
            list.lines.push(line.to_string());
        }
    }
    list
}

/// Reads an image list file produced by the feed processor.
pub async fn read_list(path: &Path) -> std::io::Result<ImageList> {
    let content = tokio::fs::read_to_string(path).await?;
    Ok(parse_list_content(&content))
}
