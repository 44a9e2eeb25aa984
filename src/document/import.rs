//! HTML note import.
//!
//! Only the subset the application writes is understood: `<title>`,
//! `<strong>`, `<em>`, `<a href>`, `<br>` and `<math>`. Everything else is
//! walked through for its text. The parser is lenient about unclosed and
//! mismatched tags since the input is HTML, not XML.

use quick_xml::escape::resolve_html5_entity;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::ImportError;
use crate::models::{LeafData, Link, NodeId, NodeKind, NodeTree, Tag, TagSet};

/// Tags that never have a closing counterpart in HTML.
const VOID_TAGS: &[&[u8]] = &[b"br", b"meta", b"img", b"hr", b"input", b"link"];

/// Text inside these is not part of the note body.
const SKIPPED_TAGS: &[&[u8]] = &[b"head", b"style", b"script"];

pub struct ImportedNote {
    pub title: Option<String>,
    pub tree: NodeTree,
}

pub fn parse_html(html: &str) -> Result<ImportedNote, ImportError> {
    let mut reader = Reader::from_reader(html.as_bytes());
    reader.config_mut().trim_text(false);
    reader.config_mut().check_end_names = false;

    let mut builder = TreeBuilder::new();
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                let name = e.name().as_ref().to_ascii_lowercase();
                builder.open(&name, e);
                if !VOID_TAGS.contains(&name.as_slice()) {
                    builder.open_tags.push(name);
                }
            }
            Ok(Event::Empty(ref e)) => {
                let name = e.name().as_ref().to_ascii_lowercase();
                builder.open(&name, e);
                builder.close(&name);
            }
            Ok(Event::End(ref e)) => {
                let name = e.name().as_ref().to_ascii_lowercase();
                if let Some(pos) = builder.open_tags.iter().rposition(|t| *t == name) {
                    for tag in builder.open_tags.split_off(pos) {
                        builder.close(&tag);
                    }
                } else {
                    tracing::warn!(tag = %String::from_utf8_lossy(&name), "unmatched closing tag");
                }
            }
            Ok(Event::Text(ref e)) => {
                let text = match e.unescape_with(resolve_html5_entity) {
                    Ok(text) => text.into_owned(),
                    Err(err) => {
                        tracing::warn!(error = %err, "keeping undecodable text as is");
                        String::from_utf8_lossy(e).into_owned()
                    }
                };
                builder.text(&text);
            }
            Ok(Event::CData(e)) => {
                let text = String::from_utf8_lossy(&e).into_owned();
                builder.text(&text);
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                return Err(ImportError::Markup {
                    position: reader.buffer_position(),
                    message: e.to_string(),
                })
            }
        }
        buf.clear();
    }

    Ok(builder.finish())
}

struct TreeBuilder {
    tree: NodeTree,
    line: NodeId,
    title: Option<String>,
    open_tags: Vec<Vec<u8>>,
    tags: TagSet,
    link: Option<Link>,
}

impl TreeBuilder {
    fn new() -> Self {
        let mut tree = NodeTree::with_root();
        let line = tree.create_line();
        Self {
            tree,
            line,
            title: None,
            open_tags: Vec::new(),
            tags: TagSet::new(),
            link: None,
        }
    }

    fn is_open(&self, tag: &[u8]) -> bool {
        self.open_tags.iter().any(|t| t == tag)
    }

    fn open(&mut self, name: &[u8], e: &BytesStart<'_>) {
        match name {
            b"br" => self.finish_line(),
            b"strong" | b"b" => {
                self.tags.insert(Tag::Bold);
            }
            b"em" | b"i" => {
                self.tags.insert(Tag::Italic);
            }
            b"a" => {
                self.link = e
                    .html_attributes()
                    .filter_map(|attr| match attr {
                        Ok(attr) => Some(attr),
                        Err(err) => {
                            tracing::warn!(error = %err, "skipping malformed attribute");
                            None
                        }
                    })
                    .find(|attr| attr.key.as_ref() == b"href")
                    .and_then(|attr| attr.unescape_value_with(resolve_html5_entity).ok())
                    .map(|href| Link::from_href(&href));
            }
            _ => {}
        }
    }

    fn close(&mut self, name: &[u8]) {
        match name {
            b"strong" | b"b" => {
                self.tags.remove(&Tag::Bold);
            }
            b"em" | b"i" => {
                self.tags.remove(&Tag::Italic);
            }
            b"a" => self.link = None,
            _ => {}
        }
    }

    fn text(&mut self, text: &str) {
        if self.is_open(b"title") {
            self.title = Some(text.to_string());
            return;
        }
        if SKIPPED_TAGS.iter().any(|tag| self.is_open(tag)) {
            return;
        }
        if self.is_open(b"math") {
            self.push_math(text);
            return;
        }

        for c in text.chars().filter(|&c| c != '\n' && c != '\r') {
            let leaf = self.tree.create_leaf(LeafData {
                kind: NodeKind::Char(c),
                tags: self.tags.clone(),
                link: self.link.clone(),
            });
            self.insert_before_end(self.line, leaf);
        }
    }

    /// Adds one math symbol per character to the math list closing the
    /// current line, opening a new list when the line does not end in one.
    fn push_math(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        let list = match self.tree.get_child(self.line, -2) {
            Some(last) if self.tree.kind(last) == Some(&NodeKind::MathList) => last,
            _ => {
                let list = self.tree.create_math_list();
                self.insert_before_end(self.line, list);
                list
            }
        };
        for c in text.chars() {
            let leaf = self.tree.create(NodeKind::MathSymbol(c.to_string().into()));
            self.insert_before_end(list, leaf);
        }
    }

    /// Inserts ahead of the container's end slot (Eol or placeholder).
    fn insert_before_end(&mut self, parent: NodeId, child: NodeId) {
        let index = self.tree.child_count(parent).saturating_sub(1);
        if let Err(err) = self.tree.insert(parent, index, child) {
            tracing::warn!(error = %err, "dropping imported node");
        }
    }

    fn finish_line(&mut self) {
        let line = std::mem::replace(&mut self.line, self.tree.create_line());
        let root = self.tree.root();
        if let Err(err) = self.tree.append(root, line) {
            tracing::warn!(error = %err, "dropping imported line");
        }
    }

    fn finish(mut self) -> ImportedNote {
        self.finish_line();
        // The line opened by the last `finish_line` was never used.
        let unused = self.line;
        if let Err(err) = self.tree.delete(unused) {
            tracing::warn!(error = %err, "failed to free unused line");
        }
        ImportedNote {
            title: self.title,
            tree: self.tree,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/document/import.rs"]
mod tests;
