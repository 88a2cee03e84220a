//! Locating the "Topic description" section of a portal page and turning
//! its HTML into plain text.
//!
//! The page is parsed with `scraper`, so entities are decoded by the HTML
//! parser and `<script>`/`<style>` bodies never surface as markup. The
//! section is everything that follows the matching heading in document
//! order, up to the next heading of any level.

use std::ops::ControlFlow;

use scraper::{ElementRef, Html, Selector};

const SECTION_HEADING: &str = "topic description";

const HEADINGS: &str = "h1, h2, h3, h4, h5, h6";

/// Pending separator between two runs of text. Stronger breaks win.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Break {
    None,
    Space,
    Line,
    Paragraph,
}

#[derive(Debug)]
struct TextWriter {
    out: String,
    pending: Break,
    /// Depth of enclosing `<li>` elements. Blocks inside an item stay on the
    /// item's line.
    item_depth: usize,
}

impl TextWriter {
    fn new() -> Self {
        Self {
            out: String::new(),
            pending: Break::None,
            item_depth: 0,
        }
    }

    fn request(&mut self, brk: Break) {
        self.pending = self.pending.max(brk);
    }

    fn block(&mut self, brk: Break) {
        if self.item_depth > 0 {
            self.request(Break::Space);
        } else {
            self.request(brk);
        }
    }

    fn flush(&mut self) {
        if !self.out.is_empty() {
            match self.pending {
                Break::None => {}
                Break::Space => self.out.push(' '),
                Break::Line => self.out.push('\n'),
                Break::Paragraph => self.out.push_str("\n\n"),
            }
        }
        self.pending = Break::None;
    }

    fn text(&mut self, text: &str) {
        if text.starts_with(char::is_whitespace) {
            self.request(Break::Space);
        }
        let mut words = text.split_whitespace().peekable();
        while let Some(word) = words.next() {
            self.flush();
            self.out.push_str(word);
            if words.peek().is_some() {
                self.pending = Break::Space;
            }
        }
        if text.ends_with(char::is_whitespace) {
            self.request(Break::Space);
        }
    }

    fn bullet(&mut self) {
        self.request(Break::Line);
        self.flush();
        self.out.push('•');
        self.pending = Break::Space;
    }

    fn finish(self) -> String {
        normalize::normalize_text(&self.out)
    }
}

fn is_heading(name: &str) -> bool {
    matches!(name, "h1" | "h2" | "h3" | "h4" | "h5" | "h6")
}

/// Renders `element`, stopping at the first heading inside it.
fn walk_element(element: ElementRef<'_>, writer: &mut TextWriter) -> ControlFlow<()> {
    let name = element.value().name();
    if is_heading(name) {
        return ControlFlow::Break(());
    }
    match name {
        "script" | "style" | "noscript" | "template" => ControlFlow::Continue(()),
        "br" => {
            writer.request(Break::Line);
            ControlFlow::Continue(())
        }
        "li" => {
            writer.bullet();
            writer.item_depth += 1;
            let flow = walk_children(element, writer);
            writer.item_depth -= 1;
            flow
        }
        "p" | "blockquote" | "pre" | "address" => {
            writer.block(Break::Paragraph);
            walk_children(element, writer)?;
            writer.block(Break::Paragraph);
            ControlFlow::Continue(())
        }
        "div" | "section" | "article" | "ul" | "ol" | "dl" | "dt" | "dd" | "table" | "tr" => {
            writer.block(Break::Line);
            walk_children(element, writer)?;
            writer.block(Break::Line);
            ControlFlow::Continue(())
        }
        "td" | "th" => {
            writer.request(Break::Space);
            walk_children(element, writer)?;
            writer.request(Break::Space);
            ControlFlow::Continue(())
        }
        _ => walk_children(element, writer),
    }
}

fn walk_children(element: ElementRef<'_>, writer: &mut TextWriter) -> ControlFlow<()> {
    for child in element.children() {
        if let Some(text) = child.value().as_text() {
            writer.text(text);
        } else if let Some(child) = ElementRef::wrap(child) {
            walk_element(child, writer)?;
        }
    }
    ControlFlow::Continue(())
}

fn heading_text(heading: ElementRef<'_>) -> String {
    normalize::collapse_whitespace(&heading.text().collect::<String>())
}

/// First heading of any level whose text mentions "Topic description".
pub fn find_topic_heading(document: &Html) -> Option<ElementRef<'_>> {
    let headings = Selector::parse(HEADINGS).ok()?;
    document
        .select(&headings)
        .find(|heading| heading_text(*heading).to_lowercase().contains(SECTION_HEADING))
}

/// Text of everything after `heading` up to the next heading.
///
/// Following siblings come first; when they run out the walk continues
/// with the siblings of each ancestor, so a heading wrapped in its own
/// container still finds the content placed after the container.
pub fn section_text(heading: ElementRef<'_>) -> String {
    let mut writer = TextWriter::new();
    let mut current = heading;
    'ancestors: loop {
        for sibling in current.next_siblings() {
            if let Some(text) = sibling.value().as_text() {
                writer.text(text);
            } else if let Some(element) = ElementRef::wrap(sibling) {
                if walk_element(element, &mut writer).is_break() {
                    break 'ancestors;
                }
            }
        }
        match current.parent().and_then(ElementRef::wrap) {
            Some(parent) => current = parent,
            None => break,
        }
    }
    writer.finish()
}

/// Parses a full page and returns the normalized text of its
/// "Topic description" section, or `None` when no heading names it.
pub fn topic_section_text(page: &str) -> Option<String> {
    let document = Html::parse_document(page);
    let heading = find_topic_heading(&document)?;
    Some(section_text(heading))
}

/// Converts an HTML fragment to text the segmenter can read.
///
/// Source whitespace is insignificant. Paragraphs become blank-line
/// separated, each `<li>` starts a `• ` bullet line (blocks nested in the
/// item stay on that line), inline tags vanish, and the result goes through
/// [`normalize::normalize_text`]. Rendering stops at the first heading.
pub fn html_to_text(fragment: &str) -> String {
    let fragment = Html::parse_fragment(fragment);
    let mut writer = TextWriter::new();
    let _ = walk_children(fragment.root_element(), &mut writer);
    writer.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<html><head><style>h2 { color: red }</style>
<script>var t = "<h2>Topic description</h2>";</script></head>
<body>
  <h1>HORIZON-CL5-2024-D1-01</h1>
  <h2 class="title"><span>Topic</span> Description</h2>
  <div><p><strong>Expected Outcome:</strong> Projects are expected to contribute to
     the following:</p>
  <ul><li>cleaner <em>air</em>;</li><li>better &amp; faster data.</li></ul>
  <p>Scope:&nbsp;Reduce emissions&#46;</p></div>
  <h3>Topic conditions</h3>
  <p>Eligibility text</p>
</body></html>"#;

    #[test]
    fn converts_section_to_text() {
        assert_eq!(
            topic_section_text(PAGE).as_deref(),
            Some(
                "Expected Outcome: Projects are expected to contribute to the following:\n\n• cleaner air;\n• better & faster data.\n\nScope: Reduce emissions."
            )
        );
    }

    #[test]
    fn section_stops_at_next_heading() {
        let text = topic_section_text(PAGE).expect("section present");
        assert!(!text.contains("Eligibility text"));
        assert!(!text.contains("Topic conditions"));
    }

    #[test]
    fn section_runs_to_end_without_next_heading() {
        let html = "<h4>Topic description</h4><p>Only text</p>";
        assert_eq!(topic_section_text(html).as_deref(), Some("Only text"));
    }

    #[test]
    fn heading_inside_script_is_ignored() {
        let html = r#"<script>document.write("<h2>Topic description</h2>")</script><h2>Overview</h2>"#;
        assert_eq!(topic_section_text(html), None);
    }

    #[test]
    fn missing_heading_is_none() {
        assert_eq!(topic_section_text("<h2>Overview</h2><p>Text</p>"), None);
        assert_eq!(topic_section_text("<p>Topic description</p>"), None);
    }

    #[test]
    fn wrapped_heading_continues_after_its_container() {
        let html = r#"<div class="header"><h2>Topic description</h2></div>
            <div class="body"><p>Scope text.</p><h3>Conditions</h3><p>Other</p></div>"#;
        assert_eq!(topic_section_text(html).as_deref(), Some("Scope text."));
    }

    #[test]
    fn paragraphs_inside_list_items_stay_on_the_bullet() {
        let html = "<h2>Topic description</h2><p>Scope:</p>\
            <ul><li><p>Item one</p></li><li><p>Item two</p><p>continued</p></li></ul>";
        assert_eq!(
            topic_section_text(html).as_deref(),
            Some("Scope:\n\n• Item one\n• Item two continued")
        );
    }

    #[test]
    fn named_entities_are_decoded_by_the_parser() {
        assert_eq!(
            html_to_text("<p>Coop&eacute;ration r&eacute;gionale</p>"),
            "Coopération régionale"
        );
        assert_eq!(html_to_text("<p>&lt;b&gt; &amp;lt; &#39;x&#x27; &quot;</p>"), "<b> &lt; 'x' \"");
        assert_eq!(html_to_text("<p>EUR&nbsp;5&euro; &ndash; 2024</p>"), "EUR 5\u{20AC} \u{2013} 2024");
    }

    #[test]
    fn line_breaks_and_inline_tags() {
        assert_eq!(
            html_to_text("<p>First<br>second <a href='x'>link</a><span>ed</span></p>"),
            "First\nsecond linked"
        );
    }
}
