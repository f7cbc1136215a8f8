//! Turns a Google Shopping feed into one parent record per variant group,
//! and downloads the parents' images.
//!
//! - [`feed`] - Parse feed items, group variants, build parent records
//! - [`export`] - CSV export and the `sku|url` image list
//! - [`pipeline`] - The feed processor's single pass from XML to exports
//! - [`images`] - Sequential downloader consuming the image list
//! - [`config`] - Optional `~/.config/parentsku/config.toml`

pub mod config;
pub mod export;
pub mod feed;
pub mod images;
pub mod pipeline;
pub mod util;
