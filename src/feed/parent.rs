use regex::Regex;
use serde::Serialize;
use std::sync::OnceLock;

use super::grouping::Groups;

/// Trailing size designator on a product title: ` - GG`, `-38`, ` - Único`.
///
/// The vocabulary is closed on purpose. Titles ending in other words after a
/// hyphen are left alone.
fn size_suffix_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)\s*-\s*(PP|P|M|G|GG|XG|EG|XGG|EGG|[0-9]+|ÚNICO|UN|U|UNICO)\s*$")
            .expect("static regex is valid")
    })
}

/// Removes one trailing size suffix from a product title and trims it.
///
/// ```
/// use parentsku::feed::clean_title;
///
/// assert_eq!(clean_title("Camisa Polo - GG"), "Camisa Polo");
/// assert_eq!(clean_title("Meia - 38"), "Meia");
/// assert_eq!(clean_title("Vestido Floral"), "Vestido Floral");
/// assert_eq!(clean_title(""), "");
/// ```
pub fn clean_title(title: &str) -> String {
    size_suffix_regex()
        .replace(title.trim(), "")
        .trim()
        .to_string()
}

/// The one-per-group record written to the exports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParentRecord {
    /// The group id.
    pub sku: String,
    /// First variant's title without its size suffix.
    pub name: String,
    /// First variant's image URL. Never taken from another variant.
    pub image: Option<String>,
}

impl ParentRecord {
    /// Image URL, if present and non-empty.
    pub fn image_url(&self) -> Option<&str> {
        self.image.as_deref().filter(|url| !url.is_empty())
    }
}

/// Builds one parent record per group from the group's first item.
pub fn build_parents(groups: &Groups) -> Vec<ParentRecord> {
    groups
        .iter()
        .filter_map(|group| {
            let first = group.items.first()?;
            Some(ParentRecord {
                sku: group.group_id.clone(),
                name: clean_title(first.title.as_deref().unwrap_or("")),
                image: first.image_url.clone(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::{group_items, ItemRecord};
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    #[test]
    fn test_clean_title_size_tokens() {
        assert_eq!(clean_title("Camisa Polo - GG"), "Camisa Polo");
        assert_eq!(clean_title("Camisa Polo - PP"), "Camisa Polo");
        assert_eq!(clean_title("Camisa Polo - XGG"), "Camisa Polo");
        assert_eq!(clean_title("Camisa Polo - EGG"), "Camisa Polo");
        assert_eq!(clean_title("Meia - 38"), "Meia");
        assert_eq!(clean_title("Boné - ÚNICO"), "Boné");
        assert_eq!(clean_title("Boné - UNICO"), "Boné");
        assert_eq!(clean_title("Boné - UN"), "Boné");
        assert_eq!(clean_title("Boné - U"), "Boné");
    }

    #[test]
    fn test_clean_title_case_insensitive() {
        assert_eq!(clean_title("Saia - gg"), "Saia");
        assert_eq!(clean_title("Boné - único"), "Boné");
        assert_eq!(clean_title("Saia - Xg"), "Saia");
    }

    #[test]
    fn test_clean_title_spacing_variants() {
        assert_eq!(clean_title("Saia-M"), "Saia");
        assert_eq!(clean_title("Saia -M  "), "Saia");
        assert_eq!(clean_title("  Saia  -   G"), "Saia");
    }

    #[test]
    fn test_clean_title_no_match_unchanged() {
        assert_eq!(clean_title("Vestido Floral"), "Vestido Floral");
        assert_eq!(clean_title("Vestido - Floral"), "Vestido - Floral");
        assert_eq!(clean_title("Camisa GG"), "Camisa GG");
        assert_eq!(clean_title("  Vestido Floral  "), "Vestido Floral");
    }

    #[test]
    fn test_clean_title_removes_only_one_suffix() {
        assert_eq!(clean_title("Kit - P - M"), "Kit - P");
    }

    #[test]
    fn test_clean_title_empty() {
        assert_eq!(clean_title(""), "");
        assert_eq!(clean_title("   "), "");
        assert_eq!(clean_title("- P"), "");
    }

    #[test]
    fn test_first_item_is_representative() {
        let groups = group_items(vec![
            ItemRecord {
                child_sku: Some("A-P".into()),
                group_id: None,
                title: Some("Camiseta - P".into()),
                image_url: Some("http://x/a.jpg".into()),
            },
            ItemRecord {
                child_sku: Some("A-M".into()),
                group_id: None,
                title: Some("Camiseta - M".into()),
                image_url: Some("http://x/b.jpg".into()),
            },
        ]);

        let parents = build_parents(&groups);
        assert_eq!(
            parents,
            vec![ParentRecord {
                sku: "A".into(),
                name: "Camiseta".into(),
                image: Some("http://x/a.jpg".into()),
            }]
        );
    }

    #[test]
    fn test_no_image_fallback_to_other_variants() {
        let groups = group_items(vec![
            ItemRecord {
                child_sku: Some("B-P".into()),
                group_id: Some("B".into()),
                title: None,
                image_url: None,
            },
            ItemRecord {
                child_sku: Some("B-M".into()),
                group_id: Some("B".into()),
                title: Some("Bermuda - M".into()),
                image_url: Some("http://x/b.jpg".into()),
            },
        ]);

        let parents = build_parents(&groups);
        assert_eq!(parents.len(), 1);
        assert_eq!(parents[0].name, "");
        assert_eq!(parents[0].image, None);
        assert_eq!(parents[0].image_url(), None);
    }

    proptest! {
        #[test]
        fn prop_clean_title_idempotent_on_single_suffix(
            name in "[A-Za-z][A-Za-z ]{0,20}[A-Za-z]",
            size in prop::sample::select(vec!["PP", "P", "M", "G", "GG", "XG", "EG", "XGG", "EGG", "42", "ÚNICO", "UN", "U", "UNICO"]),
        ) {
            let once = clean_title(&format!("{name} - {size}"));
            prop_assert_eq!(clean_title(&once), once.clone());
            prop_assert_eq!(once, name.trim().to_string());
        }
    }
}
