use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use thiserror::Error;

/// Maximum element nesting accepted before the document is rejected.
const MAX_XML_DEPTH: usize = 256;

/// Errors produced while extracting entries from a feed document.
#[derive(Debug, Error)]
pub enum ParseError {
    /// The document is not well-formed XML, or contains an undecodable entity.
    #[error("Invalid feed XML: {0}")]
    Xml(String),
    /// The document ended while elements were still open.
    #[error("Unexpected end of feed document ({0} unclosed elements)")]
    Truncated(usize),
    #[error("Feed nesting exceeds maximum depth of {0}")]
    MaxDepthExceeded(usize),
}

/// One `<item>` of the feed.
///
/// Both fields hold the text content of the first matching descendant
/// element. An empty text content counts as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Entry {
    /// HTML fragment shown in the display element.
    pub description: Option<String>,
    pub link: Option<String>,
}

impl Entry {
    /// Entries without a description are skipped by the rotation.
    pub fn is_displayable(&self) -> bool {
        self.description.is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Description,
    Link,
}

impl Field {
    fn from_local_name(name: &[u8]) -> Option<Self> {
        match name {
            b"description" => Some(Field::Description),
            b"link" => Some(Field::Link),
            _ => None,
        }
    }
}

/// Text being collected for the first `description` or `link` under an item.
struct Capture {
    depth: usize,
    text: String,
}

/// Extraction state of one field of an open item.
#[derive(Default)]
struct FieldState {
    seen: bool,
    capture: Option<Capture>,
}

impl FieldState {
    fn begin(&mut self, depth: usize) {
        if !self.seen && self.capture.is_none() {
            self.capture = Some(Capture {
                depth,
                text: String::new(),
            });
        }
    }

    /// Returns the finished text once the captured element closes.
    fn finish(&mut self, depth: usize) -> Option<String> {
        if self.capture.as_ref().is_some_and(|c| c.depth == depth) {
            self.seen = true;
            return self.capture.take().map(|c| c.text);
        }
        None
    }
}

/// An `<item>` whose end tag has not been seen yet.
///
/// Description and link are captured independently, so a `<link>` nested
/// in a `<description>` still counts as the item's link.
struct OpenItem {
    slot: usize,
    depth: usize,
    entry: Entry,
    description: FieldState,
    link: FieldState,
}

impl OpenItem {
    fn new(slot: usize, depth: usize) -> Self {
        Self {
            slot,
            depth,
            entry: Entry::default(),
            description: FieldState::default(),
            link: FieldState::default(),
        }
    }

    fn field_mut(&mut self, field: Field) -> &mut FieldState {
        match field {
            Field::Description => &mut self.description,
            Field::Link => &mut self.link,
        }
    }

    fn begin(&mut self, field: Field, depth: usize) {
        self.field_mut(field).begin(depth);
    }

    /// Records a self-closing `<description/>` or `<link/>`: found, but empty.
    fn record_empty(&mut self, field: Field) {
        let state = self.field_mut(field);
        if !state.seen && state.capture.is_none() {
            state.seen = true;
        }
    }

    fn finish(&mut self, depth: usize) {
        if let Some(text) = self.description.finish(depth) {
            self.entry.description = non_empty(text);
        }
        if let Some(text) = self.link.finish(depth) {
            self.entry.link = non_empty(text);
        }
    }

    fn is_capturing(&self) -> bool {
        self.description.capture.is_some() || self.link.capture.is_some()
    }

    fn append(&mut self, text: &str) {
        for capture in [&mut self.description.capture, &mut self.link.capture]
            .into_iter()
            .flatten()
        {
            capture.text.push_str(text);
        }
    }
}

fn non_empty(text: String) -> Option<String> {
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

/// Extracts every `<item>` from an RSS-style document, in document order.
///
/// Items are matched by local name at any depth, so `<rss:item>` and items
/// nested inside other items are both returned. For each item the
/// description and link are the concatenated text (entities and CDATA
/// decoded) of the first descendant element with that local name.
///
/// # Security
///
/// quick-xml (0.37) never expands `<!ENTITY>` declarations. Anything other
/// than the five predefined entities and character references fails to
/// unescape and is reported as [`ParseError::Xml`].
pub fn parse_entries(bytes: &[u8]) -> Result<Vec<Entry>, ParseError> {
    let mut reader = Reader::from_reader(bytes);

    let mut entries: Vec<Entry> = Vec::new();
    let mut open: Vec<OpenItem> = Vec::new();
    let mut buf = Vec::new();
    let mut depth: usize = 0;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                depth += 1;
                if depth > MAX_XML_DEPTH {
                    return Err(ParseError::MaxDepthExceeded(MAX_XML_DEPTH));
                }
                on_start(&e, depth, &mut entries, &mut open);
            }
            Ok(Event::Empty(e)) => {
                let name = e.local_name();
                if let Some(field) = Field::from_local_name(name.as_ref()) {
                    for item in open.iter_mut() {
                        item.record_empty(field);
                    }
                } else if name.as_ref() == b"item" {
                    entries.push(Entry::default());
                }
            }
            Ok(Event::Text(t)) => {
                if open.iter().any(OpenItem::is_capturing) {
                    let text = t.unescape().map_err(|e| ParseError::Xml(e.to_string()))?;
                    append_text(&mut open, &text);
                }
            }
            Ok(Event::CData(c)) => {
                if open.iter().any(OpenItem::is_capturing) {
                    let text = String::from_utf8_lossy(&c);
                    append_text(&mut open, &text);
                }
            }
            Ok(Event::End(_)) => {
                for item in open.iter_mut() {
                    item.finish(depth);
                }
                if open.last().is_some_and(|item| item.depth == depth) {
                    if let Some(item) = open.pop() {
                        entries[item.slot] = item.entry;
                    }
                }
                depth = depth.saturating_sub(1);
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(ParseError::Xml(e.to_string())),
            _ => {}
        }
        buf.clear();
    }

    if depth > 0 {
        return Err(ParseError::Truncated(depth));
    }

    Ok(entries)
}

fn on_start(e: &BytesStart<'_>, depth: usize, entries: &mut Vec<Entry>, open: &mut Vec<OpenItem>) {
    let name = e.local_name();
    if let Some(field) = Field::from_local_name(name.as_ref()) {
        for item in open.iter_mut() {
            item.begin(field, depth);
        }
    } else if name.as_ref() == b"item" {
        // Reserve the slot now so nested items keep start-tag order.
        let slot = entries.len();
        entries.push(Entry::default());
        open.push(OpenItem::new(slot, depth));
    }
}

fn append_text(open: &mut [OpenItem], text: &str) {
    for item in open.iter_mut() {
        item.append(text);
    }
}
