// src/news/feed.rs
//! Event-based RSS/Atom extraction.
//!
//! Both dialects are handled by one pass over the document: any `item` (RSS 0.9x/2.0,
//! RDF) or `entry` (Atom) element opens an entry, and only its direct children are
//! considered as fields. Element names are compared by local name, with the common
//! prefixes (`atom:`, `content:encoded`, `dc:date`) mapped explicitly.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::news::fetcher::FeedError;
use crate::news::{clean_title, normalize_text};
use crate::news::types::RawFeedEntry;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Title,
    Link,
    Description,
    Summary,
    Content,
    PubDate,
    Published,
    Updated,
    DcDate,
}

fn split_name(full: &[u8]) -> (Option<&[u8]>, &[u8]) {
    match full.iter().position(|b| *b == b':') {
        Some(i) => (Some(&full[..i]), &full[i + 1..]),
        None => (None, full),
    }
}

fn field_for(prefix: Option<&[u8]>, local: &[u8]) -> Option<Field> {
    match (prefix, local) {
        (None | Some(b"atom"), b"title") => Some(Field::Title),
        (None | Some(b"atom"), b"link") => Some(Field::Link),
        (None, b"description") => Some(Field::Description),
        (None | Some(b"atom"), b"summary") => Some(Field::Summary),
        (None | Some(b"atom"), b"content") | (Some(b"content"), b"encoded") => {
            Some(Field::Content)
        }
        (None, b"pubDate") => Some(Field::PubDate),
        (None | Some(b"atom"), b"published") => Some(Field::Published),
        (None | Some(b"atom"), b"updated") => Some(Field::Updated),
        (Some(b"dc"), b"date") => Some(Field::DcDate),
        _ => None,
    }
}

fn is_entry(local: &[u8]) -> bool {
    local == b"item" || local == b"entry"
}

fn check_root(local: &[u8]) -> Result<(), FeedError> {
    match local {
        b"rss" | b"feed" | b"RDF" => Ok(()),
        other => Err(FeedError::Parse(format!(
            "unsupported root element <{}>",
            String::from_utf8_lossy(other)
        ))),
    }
}

#[derive(Debug, Default)]
struct EntryBuilder {
    depth: usize,
    position: usize,
    open_field: Option<(Field, usize)>,
    buf: String,

    title: Option<String>,
    link_text: Option<String>,
    href_alternate: Option<String>,
    href_other: Option<String>,
    description: Option<String>,
    summary: Option<String>,
    content: Option<String>,
    pub_date: Option<String>,
    published: Option<String>,
    updated: Option<String>,
    dc_date: Option<String>,
}

impl EntryBuilder {
    fn new(depth: usize, position: usize) -> Self {
        Self {
            depth,
            position,
            ..Self::default()
        }
    }

    fn is_child(&self, depth: usize) -> bool {
        self.open_field.is_none() && depth == self.depth + 1
    }

    fn open(&mut self, depth: usize, prefix: Option<&[u8]>, local: &[u8], e: &BytesStart<'_>) {
        if !self.is_child(depth) {
            return;
        }
        if let Some(field) = field_for(prefix, local) {
            if field == Field::Link {
                self.take_href(e);
            }
            self.open_field = Some((field, depth));
            self.buf.clear();
        }
    }

    /// Self-closing child, e.g. Atom's `<link href="..."/>`.
    fn empty(&mut self, depth: usize, prefix: Option<&[u8]>, local: &[u8], e: &BytesStart<'_>) {
        if self.is_child(depth) && field_for(prefix, local) == Some(Field::Link) {
            self.take_href(e);
        }
    }

    fn text(&mut self, piece: &str) {
        if self.open_field.is_none() {
            return;
        }
        let piece = piece.trim();
        if piece.is_empty() {
            return;
        }
        if !self.buf.is_empty() {
            self.buf.push(' ');
        }
        self.buf.push_str(piece);
    }

    fn close(&mut self, depth: usize) {
        let Some((field, field_depth)) = self.open_field else {
            return;
        };
        if field_depth != depth {
            return;
        }
        self.open_field = None;
        let raw = std::mem::take(&mut self.buf);

        let value = match field {
            Field::Title => clean_title(&raw),
            Field::Description | Field::Summary | Field::Content => normalize_text(&raw),
            _ => html_escape::decode_html_entities(raw.trim()).trim().to_string(),
        };
        if value.is_empty() {
            return;
        }

        let slot = match field {
            Field::Title => &mut self.title,
            Field::Link => &mut self.link_text,
            Field::Description => &mut self.description,
            Field::Summary => &mut self.summary,
            Field::Content => &mut self.content,
            Field::PubDate => &mut self.pub_date,
            Field::Published => &mut self.published,
            Field::Updated => &mut self.updated,
            Field::DcDate => &mut self.dc_date,
        };
        if slot.is_none() {
            *slot = Some(value);
        }
    }

    fn take_href(&mut self, e: &BytesStart<'_>) {
        let mut href = None;
        let mut rel = None;
        for attr in e.attributes().flatten() {
            let value = attr
                .unescape_value()
                .map(|v| v.into_owned())
                .unwrap_or_else(|_| String::from_utf8_lossy(&attr.value).into_owned());
            match attr.key.local_name().as_ref() {
                b"href" => href = Some(value.trim().to_string()),
                b"rel" => rel = Some(value),
                _ => {}
            }
        }

        let Some(href) = href.filter(|h| !h.is_empty()) else {
            return;
        };
        let slot = match rel.as_deref() {
            None | Some("alternate") => &mut self.href_alternate,
            Some(_) => &mut self.href_other,
        };
        if slot.is_none() {
            *slot = Some(href);
        }
    }

    fn finish(self) -> RawFeedEntry {
        RawFeedEntry {
            title: self.title,
            link: self.link_text.or(self.href_alternate).or(self.href_other),
            summary: self.description.or(self.summary).or(self.content),
            published: self
                .pub_date
                .or(self.published)
                .or(self.updated)
                .or(self.dc_date),
            position: self.position,
        }
    }
}

/// Extract every entry of an RSS or Atom document, in document order.
pub fn parse_feed(xml: &str) -> Result<Vec<RawFeedEntry>, FeedError> {
    let mut reader = Reader::from_str(xml.trim_start_matches('\u{feff}'));
    reader.config_mut().trim_text(true);

    let mut entries = Vec::new();
    let mut depth = 0usize;
    let mut saw_root = false;
    let mut current: Option<EntryBuilder> = None;

    loop {
        let event = reader.read_event().map_err(|e| {
            FeedError::Parse(format!("xml error at byte {}: {e}", reader.buffer_position()))
        })?;

        match event {
            Event::Start(e) => {
                depth += 1;
                let (prefix, local) = split_name(e.name().into_inner());
                if !saw_root {
                    check_root(local)?;
                    saw_root = true;
                }
                if let Some(b) = current.as_mut() {
                    b.open(depth, prefix, local, &e);
                } else if is_entry(local) {
                    current = Some(EntryBuilder::new(depth, entries.len()));
                }
            }
            Event::Empty(e) => {
                let (prefix, local) = split_name(e.name().into_inner());
                if !saw_root {
                    check_root(local)?;
                    saw_root = true;
                }
                if let Some(b) = current.as_mut() {
                    b.empty(depth + 1, prefix, local, &e);
                }
            }
            Event::End(_) => {
                let closes_entry = current.as_ref().is_some_and(|b| b.depth == depth);
                if closes_entry {
                    if let Some(b) = current.take() {
                        entries.push(b.finish());
                    }
                } else if let Some(b) = current.as_mut() {
                    b.close(depth);
                }
                depth = depth.saturating_sub(1);
            }
            Event::Text(t) => {
                if let Some(b) = current.as_mut() {
                    b.text(&String::from_utf8_lossy(&t));
                }
            }
            Event::CData(c) => {
                if let Some(b) = current.as_mut() {
                    b.text(&String::from_utf8_lossy(&c));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !saw_root {
        return Err(FeedError::Parse("document has no root element".to_string()));
    }
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rss_item_fields() {
        let xml = r#"<?xml version="1.0"?>
<rss version="2.0"><channel><title>Chan</title>
  <item>
    <title>OpenAI launches a thing</title>
    <link>https://example.test/a?x=1&amp;y=2</link>
    <description><![CDATA[<p>Body &amp; soul</p>]]></description>
    <pubDate>Tue, 14 Oct 2025 09:30:00 GMT</pubDate>
  </item>
</channel></rss>"#;
        let entries = parse_feed(xml).unwrap();
        assert_eq!(entries.len(), 1);
        let e = &entries[0];
        assert_eq!(e.title.as_deref(), Some("OpenAI launches a thing"));
        assert_eq!(e.link.as_deref(), Some("https://example.test/a?x=1&y=2"));
        assert_eq!(e.summary.as_deref(), Some("Body & soul"));
        assert_eq!(e.published.as_deref(), Some("Tue, 14 Oct 2025 09:30:00 GMT"));
        assert_eq!(e.position, 0);
    }

    #[test]
    fn escaped_markup_in_title_is_literal_text() {
        let xml = "<rss><channel><item>\
            <title>Why &lt;think&gt; tags matter for OpenAI</title>\
            <link>https://example.test/t</link>\
            <description>&lt;p&gt;Reasoning &lt;b&gt;traces&lt;/b&gt;&lt;/p&gt;</description>\
            </item></channel></rss>";
        let entries = parse_feed(xml).unwrap();
        assert_eq!(entries[0].title.as_deref(), Some("Why <think> tags matter for OpenAI"));
        assert_eq!(entries[0].summary.as_deref(), Some("Reasoning traces"));
    }

    #[test]
    fn atom_link_from_href_prefers_alternate() {
        let xml = r#"<feed xmlns="http://www.w3.org/2005/Atom">
  <title>Feed title is not an entry title</title>
  <entry>
    <title type="html">Anthropic &amp; friends</title>
    <link rel="self" href="https://example.test/self"/>
    <link rel="alternate" href="https://example.test/post"/>
    <summary>Short</summary>
    <content type="html">Longer content</content>
    <updated>2025-10-14T09:30:00Z</updated>
  </entry>
</feed>"#;
        let entries = parse_feed(xml).unwrap();
        assert_eq!(entries.len(), 1);
        let e = &entries[0];
        assert_eq!(e.title.as_deref(), Some("Anthropic & friends"));
        assert_eq!(e.link.as_deref(), Some("https://example.test/post"));
        assert_eq!(e.summary.as_deref(), Some("Short"));
        assert_eq!(e.published.as_deref(), Some("2025-10-14T09:30:00Z"));
    }

    #[test]
    fn summary_falls_back_to_content_encoded() {
        let xml = r#"<rss xmlns:content="http://purl.org/rss/1.0/modules/content/"><channel>
  <item><title>T</title><content:encoded><![CDATA[<b>Rich</b> text]]></content:encoded></item>
</channel></rss>"#;
        let entries = parse_feed(xml).unwrap();
        assert_eq!(entries[0].summary.as_deref(), Some("Rich text"));
        assert_eq!(entries[0].link, None);
        assert_eq!(entries[0].published, None);
    }

    #[test]
    fn nested_source_title_is_ignored() {
        let xml = r#"<rss><channel><item>
  <source url="https://other.test"><title>Not me</title></source>
  <title>Me</title>
</item></channel></rss>"#;
        let entries = parse_feed(xml).unwrap();
        assert_eq!(entries[0].title.as_deref(), Some("Me"));
    }

    #[test]
    fn dc_date_is_used_when_nothing_else() {
        let xml = r#"<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#" xmlns:dc="http://purl.org/dc/elements/1.1/">
  <item><title>A</title><dc:date>2025-10-14T09:30:00Z</dc:date></item>
  <item><title>B</title></item>
</rdf:RDF>"#;
        let entries = parse_feed(xml).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].published.as_deref(), Some("2025-10-14T09:30:00Z"));
        assert_eq!(entries[1].position, 1);
    }

    #[test]
    fn html_page_is_rejected() {
        let err = parse_feed("<html><body><a href='/x'>x</a></body></html>").unwrap_err();
        assert!(err.to_string().contains("unsupported root"));
    }

    #[test]
    fn malformed_xml_is_an_error() {
        assert!(parse_feed("<rss><channel><item><title>x</item></channel></rss>").is_err());
        assert!(parse_feed("").is_err());
    }
}
