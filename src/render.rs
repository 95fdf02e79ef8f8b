//! Content rendering for the display element.
//!
//! [`entry_html`] builds the inner HTML the rotator swaps into the element.
//! Feed HTML is inserted as-is: the feed is trusted content.
//!
//! [`html_to_text`] flattens that HTML for backends that cannot show markup.

use scraper::node::Node;
use scraper::Html;
use std::borrow::Cow;

/// Elements that start a new line when flattened to text.
const BLOCK_ELEMENTS: &[&str] = &[
    "p", "br", "div", "li", "ul", "ol", "blockquote", "pre", "h1", "h2", "h3", "h4", "h5", "h6",
];

/// Builds the element content for one entry.
///
/// With a link, the description is followed by a paragraph holding the link
/// as both anchor text and `href`:
///
/// ```
/// use feedroll::render::entry_html;
///
/// assert_eq!(
///     entry_html("<p>Hi</p>", Some("https://example.com/1")),
///     r#"<p>Hi</p><p><a href="https://example.com/1">https://example.com/1</a></p>"#
/// );
/// assert_eq!(entry_html("<p>Hi</p>", None), "<p>Hi</p>");
/// ```
pub fn entry_html(description: &str, link: Option<&str>) -> String {
    match link {
        Some(link) => format!(r#"{description}<p><a href="{link}">{link}</a></p>"#),
        None => description.to_string(),
    }
}

/// Converts an HTML fragment to plain text, one line per block element.
///
/// Whitespace inside a line is collapsed, blank lines are dropped, entities
/// are decoded, and terminal control sequences are stripped.
pub fn html_to_text(fragment: &str) -> String {
    let html = Html::parse_fragment(fragment);
    let mut raw = String::with_capacity(fragment.len());

    for node in html.root_element().descendants() {
        match node.value() {
            Node::Text(text) => raw.push_str(text),
            Node::Element(el) if BLOCK_ELEMENTS.contains(&el.name()) => raw.push('\n'),
            _ => {}
        }
    }

    let clean = strip_control_chars(&raw);
    clean
        .split('\n')
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Strips terminal control characters and ANSI escape sequences.
///
/// Feed text is drawn straight to the terminal, so CSI (`ESC [ ... final`)
/// and OSC (`ESC ] ... BEL|ST`) sequences, bare ESC, DEL and C0 controls
/// other than tab, newline and carriage return are removed.
///
/// Returns `Cow::Borrowed` when nothing needs removing.
pub fn strip_control_chars(s: &str) -> Cow<'_, str> {
    if !s.chars().any(is_stripped) {
        return Cow::Borrowed(s);
    }

    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '\x1b' {
            if !is_stripped(c) {
                out.push(c);
            }
            continue;
        }

        match chars.peek() {
            Some('[') => {
                chars.next();
                // Parameter and intermediate bytes up to the final byte (0x40..=0x7e)
                for c in chars.by_ref() {
                    if ('\x40'..='\x7e').contains(&c) {
                        break;
                    }
                }
            }
            Some(']') => {
                chars.next();
                while let Some(c) = chars.next() {
                    if c == '\x07' {
                        break;
                    }
                    if c == '\x1b' && chars.peek() == Some(&'\\') {
                        chars.next();
                        break;
                    }
                }
            }
            _ => {}
        }
    }

    Cow::Owned(out)
}

fn is_stripped(c: char) -> bool {
    c == '\x1b' || c == '\x7f' || (c < '\x20' && !matches!(c, '\t' | '\n' | '\r'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_entry_html_with_link() {
        let html = entry_html("<p>Post</p>", Some("https://social.example/@me/1"));
        assert_eq!(
            html,
            "<p>Post</p><p><a href=\"https://social.example/@me/1\">https://social.example/@me/1</a></p>"
        );
    }

    #[test]
    fn test_entry_html_without_link() {
        assert_eq!(entry_html("plain", None), "plain");
    }

    #[test]
    fn test_entry_html_does_not_escape() {
        // Feed content is trusted and injected verbatim
        let html = entry_html("<b>x</b>", Some("https://e.example/?a=1&b=2"));
        assert!(html.starts_with("<b>x</b>"));
        assert!(html.contains(r#"href="https://e.example/?a=1&b=2""#));
    }

    #[test]
    fn test_html_to_text_paragraphs() {
        let text = html_to_text("<p>First   paragraph</p><p>Second<br>line</p>");
        assert_eq!(text, "First paragraph\nSecond\nline");
    }

    #[test]
    fn test_html_to_text_mastodon_mention() {
        let text = html_to_text(
            r#"<p>Hi <span class="h-card"><a href="https://x.example/@bob" class="u-url mention">@<span>bob</span></a></span> &amp; all</p>"#,
        );
        assert_eq!(text, "Hi @bob & all");
    }

    #[test]
    fn test_html_to_text_entry_with_link() {
        let html = entry_html("<p>Post</p>", Some("https://example.com/1"));
        assert_eq!(html_to_text(&html), "Post\nhttps://example.com/1");
    }

    #[test]
    fn test_html_to_text_plain_input() {
        assert_eq!(html_to_text("just text"), "just text");
        assert_eq!(html_to_text(""), "");
    }

    #[test]
    fn test_html_to_text_strips_escape_sequences() {
        let text = html_to_text("<p>\x1b[31mred\x1b[0m \x1b]0;title\x07text</p>");
        assert_eq!(text, "red text");
    }

    #[test]
    fn test_strip_clean_text_returns_borrowed() {
        let input = "Hello, world!\tTabbed\r\nNext";
        let result = strip_control_chars(input);
        assert!(matches!(result, Cow::Borrowed(_)));
        assert_eq!(result, input);
    }

    #[test]
    fn test_strip_control_chars_removes_controls() {
        let result = strip_control_chars("he\x00ll\x07o\x08 wor\x7fld");
        assert!(matches!(result, Cow::Owned(_)));
        assert_eq!(result, "hello world");
    }

    #[test]
    fn test_strip_osc_with_st() {
        assert_eq!(strip_control_chars("\x1b]0;evil\x1b\\safe"), "safe");
    }

    #[test]
    fn test_strip_bare_escape() {
        assert_eq!(strip_control_chars("a\x1bb"), "ab");
    }
}
