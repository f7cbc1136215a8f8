use regex::Regex;
use std::collections::HashMap;
use std::sync::OnceLock;

use super::parser::ItemRecord;

/// Trailing variant code on a child SKU, e.g. the `-GG` in `CAM001-GG`.
fn sku_suffix_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"-[A-Z0-9]+$").expect("static regex is valid"))
}

/// Derives a group id from a child SKU by removing its trailing
/// `-<UPPERCASE/DIGITS>` suffix.
///
/// SKUs without such a suffix are returned unchanged. Matching is case
/// sensitive: `abc-p` keeps its suffix.
///
/// ```
/// use parentsku::feed::derive_group_id;
///
/// assert_eq!(derive_group_id("CAM001-GG"), "CAM001");
/// assert_eq!(derive_group_id("A-B-42"), "A-B");
/// assert_eq!(derive_group_id("PLAIN"), "PLAIN");
/// ```
pub fn derive_group_id(child_sku: &str) -> String {
    sku_suffix_regex().replace(child_sku, "").into_owned()
}

/// All variants sharing one group id, in feed order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    pub group_id: String,
    pub items: Vec<ItemRecord>,
}

/// Items grouped by resolved group id.
///
/// Groups keep first-occurrence order. The map only indexes into `groups`.
#[derive(Debug, Default)]
pub struct Groups {
    index: HashMap<String, usize>,
    groups: Vec<Group>,
    /// Items dropped because no group id could be resolved.
    pub ungroupable: usize,
}

impl Groups {
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Group> {
        self.groups.iter()
    }

    fn push(&mut self, group_id: String, item: ItemRecord) {
        match self.index.get(&group_id) {
            Some(&i) => self.groups[i].items.push(item),
            None => {
                self.index.insert(group_id.clone(), self.groups.len());
                self.groups.push(Group {
                    group_id,
                    items: vec![item],
                });
            }
        }
    }
}

/// Resolves the group id an item belongs to.
///
/// The explicit `item_group_id` wins; otherwise it is derived from the child
/// SKU. Returns `None` when neither yields a non-empty id.
pub fn resolve_group_id(item: &ItemRecord) -> Option<String> {
    if let Some(id) = item.group_id.as_deref().filter(|id| !id.is_empty()) {
        return Some(id.to_string());
    }
    item.child_sku
        .as_deref()
        .map(derive_group_id)
        .filter(|id| !id.is_empty())
}

/// Groups feed items by resolved group id.
///
/// Items without a resolvable id are dropped and counted in
/// [`Groups::ungroupable`].
pub fn group_items(items: impl IntoIterator<Item = ItemRecord>) -> Groups {
    let mut groups = Groups::default();

    for item in items {
        match resolve_group_id(&item) {
            Some(group_id) => groups.push(group_id, item),
            None => {
                tracing::debug!(
                    title = item.title.as_deref().unwrap_or(""),
                    "Dropping item without group id or SKU"
                );
                groups.ungroupable += 1;
            }
        }
    }

    tracing::debug!(
        groups = groups.len(),
        ungroupable = groups.ungroupable,
        "Grouped feed items"
    );
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn item(sku: Option<&str>, group: Option<&str>) -> ItemRecord {
        ItemRecord {
            child_sku: sku.map(String::from),
            group_id: group.map(String::from),
            title: None,
            image_url: None,
        }
    }

    #[test]
    fn test_derive_strips_one_suffix() {
        assert_eq!(derive_group_id("A-P"), "A");
        assert_eq!(derive_group_id("CAM-001-38"), "CAM-001");
        assert_eq!(derive_group_id("VEST-XGG"), "VEST");
    }

    #[test]
    fn test_derive_is_case_sensitive() {
        assert_eq!(derive_group_id("abc-p"), "abc-p");
        assert_eq!(derive_group_id("ABC-Pp"), "ABC-Pp");
    }

    #[test]
    fn test_derive_without_suffix_unchanged() {
        assert_eq!(derive_group_id("ABC123"), "ABC123");
        assert_eq!(derive_group_id("ABC-"), "ABC-");
    }

    #[test]
    fn test_explicit_group_id_wins() {
        let it = item(Some("X-P"), Some("GROUP-1"));
        assert_eq!(resolve_group_id(&it).as_deref(), Some("GROUP-1"));
    }

    #[test]
    fn test_falls_back_to_sku() {
        let it = item(Some("X-P"), None);
        assert_eq!(resolve_group_id(&it).as_deref(), Some("X"));
    }

    #[test]
    fn test_sku_that_is_only_a_suffix_is_ungroupable() {
        let it = item(Some("-P"), None);
        assert_eq!(resolve_group_id(&it), None);
    }

    #[test]
    fn test_group_items_preserves_first_occurrence_order() {
        let groups = group_items(vec![
            item(Some("B-P"), None),
            item(Some("A-P"), None),
            item(Some("B-M"), None),
            item(None, Some("C")),
            item(Some("A-G"), None),
        ]);

        let ids: Vec<&str> = groups.iter().map(|g| g.group_id.as_str()).collect();
        assert_eq!(ids, vec!["B", "A", "C"]);

        let b = groups.iter().find(|g| g.group_id == "B").unwrap();
        let skus: Vec<_> = b.items.iter().map(|i| i.child_sku.as_deref()).collect();
        assert_eq!(skus, vec![Some("B-P"), Some("B-M")]);
    }

    #[test]
    fn test_ungroupable_items_counted() {
        let groups = group_items(vec![item(None, None), item(Some("A-1"), None), item(None, None)]);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups.ungroupable, 2);
    }

    #[test]
    fn test_empty_input() {
        let groups = group_items(Vec::new());
        assert!(groups.is_empty());
        assert_eq!(groups.ungroupable, 0);
    }

    proptest! {
        #[test]
        fn prop_derived_id_drops_uppercase_suffix(
            base in "[A-Za-z0-9]{1,8}(-[a-z]{1,4})?",
            suffix in "[A-Z0-9]{1,4}",
        ) {
            let sku = format!("{base}-{suffix}");
            prop_assert_eq!(derive_group_id(&sku), base);
        }

        #[test]
        fn prop_explicit_id_is_kept_exactly(
            id in "[A-Za-z0-9-]{1,12}",
            sku in "[A-Z0-9-]{0,12}",
        ) {
            let it = item(Some(sku.as_str()), Some(id.as_str()));
            prop_assert_eq!(resolve_group_id(&it), Some(id));
        }
    }
}
