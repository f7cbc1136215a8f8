use quick_xml::events::{BytesStart, Event};
use quick_xml::name::{Namespace, ResolveResult};
use quick_xml::NsReader;
use std::path::Path;
use thiserror::Error;

/// Namespace URI bound to the `g:` prefix in Google Shopping feeds.
pub const GOOGLE_NS: &[u8] = b"http://base.google.com/ns/1.0";

/// Errors that can occur while reading a product feed.
#[derive(Debug, Error)]
pub enum FeedError {
    /// The document has no `<channel>` directly under its root element.
    #[error("Malformed feed: <channel> element not found")]
    MalformedFeed,

    /// XML parsing failed.
    #[error("XML parse error: {0}")]
    Xml(String),

    /// File I/O error.
    #[error("Failed to read feed file: {0}")]
    Io(#[from] std::io::Error),
}

/// One `<item>` of the feed, i.e. one product variant.
///
/// Fields are `None` when the element is missing or its text is blank.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemRecord {
    /// `g:id`, the variant's own SKU.
    pub child_sku: Option<String>,
    /// `g:item_group_id`, shared by every variant of a product.
    pub group_id: Option<String>,
    /// `title`, falling back to `g:title`.
    pub title: Option<String>,
    /// `g:image_link`.
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Id,
    GroupId,
    Title,
    GoogleTitle,
    ImageLink,
}

/// Raw field text as captured. `Some("")` means the element was present but
/// empty, which still blocks later duplicates of the same field.
#[derive(Default)]
struct ItemFields {
    id: Option<String>,
    group_id: Option<String>,
    title: Option<String>,
    google_title: Option<String>,
    image_link: Option<String>,
}

impl ItemFields {
    fn slot(&mut self, field: Field) -> &mut Option<String> {
        match field {
            Field::Id => &mut self.id,
            Field::GroupId => &mut self.group_id,
            Field::Title => &mut self.title,
            Field::GoogleTitle => &mut self.google_title,
            Field::ImageLink => &mut self.image_link,
        }
    }

    fn into_record(self) -> ItemRecord {
        ItemRecord {
            child_sku: non_blank(self.id),
            group_id: non_blank(self.group_id),
            title: non_blank(self.title).or_else(|| non_blank(self.google_title)),
            image_url: non_blank(self.image_link),
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Field text being accumulated for the element at depth 4.
struct Capture {
    field: Field,
    text: String,
    /// Set once a child element opens; text after it is not part of the field.
    closed: bool,
}

// Element depths: root = 1, channel = 2, item = 3, item fields = 4.
const CHANNEL_DEPTH: usize = 2;
const ITEM_DEPTH: usize = 3;
const FIELD_DEPTH: usize = 4;

/// Reads a feed file from disk and parses its items.
///
/// # Errors
///
/// Returns [`FeedError::Io`] if the file cannot be read, and any error from
/// [`parse_feed_content`].
pub async fn parse(path: &Path) -> Result<Vec<ItemRecord>, FeedError> {
    let content = tokio::fs::read_to_string(path).await?;
    parse_feed_content(&content)
}

/// Parses a Google Shopping feed document into item records.
///
/// Only the first `<channel>` directly under the root is read, and only its
/// direct `<item>` children. Within an item, the first occurrence of each
/// field wins. Items are returned in document order.
///
/// # Errors
///
/// - [`FeedError::MalformedFeed`] if there is no `<channel>` under the root
/// - [`FeedError::Xml`] if the document is not well-formed
pub fn parse_feed_content(content: &str) -> Result<Vec<ItemRecord>, FeedError> {
    // SEC-002: quick-xml never expands <!ENTITY> declarations; unknown entities
    // fail in `unescape()` instead of being resolved.
    // No trim_text: whitespace next to CDATA or a comment belongs to the field.
    let mut reader = NsReader::from_str(content);

    let mut state = ParseState::default();
    let mut buf = Vec::new();

    loop {
        let (ns, event) = reader
            .read_resolved_event_into(&mut buf)
            .map_err(|e| FeedError::Xml(e.to_string()))?;

        match event {
            Event::Start(e) => {
                state.depth += 1;
                state.open(&e, &ns, state.depth);
            }
            Event::Empty(e) => {
                // A self-closing element opens and closes one level down.
                let level = state.depth + 1;
                state.open(&e, &ns, level);
                state.close(level);
            }
            Event::End(_) => {
                state.close(state.depth);
                state.depth = state.depth.saturating_sub(1);
            }
            Event::Text(t) => {
                if let Some(cap) = state.capturing() {
                    let text = t.unescape().map_err(|e| FeedError::Xml(e.to_string()))?;
                    cap.text.push_str(&text);
                }
            }
            Event::CData(c) => {
                if let Some(cap) = state.capturing() {
                    cap.text.push_str(&String::from_utf8_lossy(&c.into_inner()));
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    if !state.channel_seen {
        return Err(FeedError::MalformedFeed);
    }

    tracing::debug!(items = state.items.len(), "Parsed feed items");
    Ok(state.items)
}

#[derive(Default)]
struct ParseState {
    depth: usize,
    channel_seen: bool,
    in_channel: bool,
    current: Option<ItemFields>,
    capture: Option<Capture>,
    items: Vec<ItemRecord>,
}

impl ParseState {
    fn open(&mut self, e: &BytesStart<'_>, ns: &ResolveResult<'_>, level: usize) {
        let local = e.local_name();
        let local = local.as_ref();
        let unbound = matches!(ns, ResolveResult::Unbound);

        match level {
            CHANNEL_DEPTH if !self.channel_seen && unbound && local == b"channel" => {
                self.channel_seen = true;
                self.in_channel = true;
            }
            ITEM_DEPTH if self.in_channel && unbound && local == b"item" => {
                self.current = Some(ItemFields::default());
            }
            FIELD_DEPTH if self.current.is_some() => {
                self.capture = classify_field(ns, local).map(|field| Capture {
                    field,
                    text: String::new(),
                    closed: false,
                });
            }
            l if l > FIELD_DEPTH => {
                if let Some(cap) = self.capture.as_mut() {
                    cap.closed = true;
                }
            }
            _ => {}
        }
    }

    fn close(&mut self, level: usize) {
        match level {
            FIELD_DEPTH => {
                if let (Some(cap), Some(fields)) = (self.capture.take(), self.current.as_mut()) {
                    let slot = fields.slot(cap.field);
                    if slot.is_none() {
                        *slot = Some(cap.text);
                    }
                }
            }
            ITEM_DEPTH => {
                if let Some(fields) = self.current.take() {
                    self.items.push(fields.into_record());
                }
            }
            CHANNEL_DEPTH => self.in_channel = false,
            _ => {}
        }
    }

    /// The open field capture, if text at the current depth belongs to it.
    fn capturing(&mut self) -> Option<&mut Capture> {
        if self.depth != FIELD_DEPTH {
            return None;
        }
        self.capture.as_mut().filter(|cap| !cap.closed)
    }
}

fn classify_field(ns: &ResolveResult<'_>, local: &[u8]) -> Option<Field> {
    match ns {
        ResolveResult::Bound(Namespace(uri)) if *uri == GOOGLE_NS => match local {
            b"id" => Some(Field::Id),
            b"item_group_id" => Some(Field::GroupId),
            b"title" => Some(Field::GoogleTitle),
            b"image_link" => Some(Field::ImageLink),
            _ => None,
        },
        ResolveResult::Unbound if local == b"title" => Some(Field::Title),
        _ => None,
    }
}
