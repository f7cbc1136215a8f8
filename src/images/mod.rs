//! Image downloader for the `sku|url` list written by the feed processor.
//!
//! - [`list`] - Reads the list and splits lines into SKU and URL
//! - [`naming`] - Derives file names and resolves collisions with `_<n>` suffixes
//! - [`downloader`] - Sequential HTTP fetcher with a fixed delay and timeout

mod downloader;
mod list;
mod naming;

pub use downloader::{
    DownloadError, DownloadEvent, DownloadStats, Downloader, DEFAULT_DELAY, DEFAULT_TIMEOUT,
    MAX_IMAGE_SIZE, PROGRESS_EVERY,
};
pub use list::{parse_list_content, parse_list_line, read_list, ImageList, ListEntry};
pub use naming::{image_file_name, sanitize_sku, unique_path, ALLOWED_EXTENSIONS, DEFAULT_EXTENSION};
