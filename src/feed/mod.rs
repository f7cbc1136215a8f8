//! Google Shopping feed processing: parse items, group variants, build parents.
//!
//! - [`parser`] - Namespace-aware `quick-xml` reader for `<channel>/<item>` entries
//! - [`grouping`] - Groups variants by `item_group_id`, deriving it from the SKU when absent
//! - [`parent`] - Reduces each group to one [`ParentRecord`] with a cleaned title
//!
//! # Example
//!
//! ```ignore
//! use parentsku::feed::{build_parents, group_items, parse};
//!
//! let items = parse(Path::new("feed.xml")).await?;
//! let groups = group_items(items);
//! let parents = build_parents(&groups);
//! ```

mod grouping;
mod parent;
mod parser;

pub use grouping::{derive_group_id, group_items, resolve_group_id, Group, Groups};
pub use parent::{build_parents, clean_title, ParentRecord};
pub use parser::{parse, parse_feed_content, FeedError, ItemRecord, GOOGLE_NS};
