//! Multi-root streaming parser
//!
//! A save file is several complete XML documents glued back to back, with a
//! single prolog at the very start. A conforming parser stops at the end of the
//! first root element and rejects anything after it. This parser turns that
//! rejection into the boundary signal between roots:
//!
//! 1. **Feeding**: bytes are fed through a fixed-size buffered reader and
//!    element events are assembled into an [`XmlTree`].
//! 2. **Boundary detected**: once the root element has closed, the next
//!    element or text event is content after the document end. Its byte offset
//!    marks where the next root begins.
//! 3. **Resuming**: the next parse starts a fresh reader at that offset,
//!    primed with a synthetic prolog because the glued-on document has none.
//!
//! Any other parse failure is fatal and surfaces as
//! [`Error::MalformedDocument`].

use std::borrow::Cow;
use std::io::{BufReader, Read};

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use super::tree::{NodeId, XmlTree};
use crate::error::{Error, Result};

/// Prolog written at the start of a save and fed before every resumed root.
pub const XML_PROLOG: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;

/// Default number of bytes handed to the reader per fill.
pub const DEFAULT_CHUNK_SIZE: usize = 65536;

/// Where the parser is in the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParserState {
    /// Parsing from the start of the input; the input carries its own prolog.
    Feeding,
    /// The previous root ended because another root starts at `offset`.
    BoundaryDetected {
        /// Absolute byte offset of the next root.
        offset: usize,
    },
    /// A fresh reader is parsing from `offset` behind a synthetic prolog.
    Resuming {
        /// Absolute byte offset the reader started from.
        offset: usize,
    },
    /// The input is exhausted.
    Finished,
}

/// Result of feeding one logical root.
#[derive(Debug)]
pub enum RootOutcome {
    /// The root closed and another root starts at `offset` (relative to the reader's input).
    Boundary {
        /// The completed tree.
        tree: XmlTree,
        /// Offset within the reader's input where the unexpected content began.
        offset: usize,
    },
    /// The root closed and the input ended.
    Complete(XmlTree),
    /// Only whitespace, comments or a prolog remained; no root was found.
    Exhausted,
}

/// Strip line-ending characters so byte offsets stay exact across roots.
#[must_use]
pub fn normalize_line_endings(content: &str) -> String {
    content.chars().filter(|c| *c != '\r' && *c != '\n').collect()
}

/// Parses the logical roots of one buffer in order.
///
/// The whole input is held in memory: after a boundary the parser resumes from
/// an earlier byte offset, which forward-only streaming cannot do.
#[derive(Debug)]
pub struct MultiRootParser<'a> {
    input: &'a [u8],
    cursor: usize,
    chunk_size: usize,
    state: ParserState,
}

impl<'a> MultiRootParser<'a> {
    /// Creates a parser over already-normalized input.
    #[must_use]
    pub fn new(input: &'a [u8]) -> Self {
        Self {
            input,
            cursor: 0,
            chunk_size: DEFAULT_CHUNK_SIZE,
            state: ParserState::Feeding,
        }
    }

    /// Sets the reader fill size. Values below one are raised to one.
    #[must_use]
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    /// Current state of the parser.
    #[must_use]
    pub fn state(&self) -> ParserState {
        self.state
    }

    /// Absolute offset the next root will be read from.
    #[must_use]
    pub fn position(&self) -> usize {
        self.cursor
    }

    /// Tag of the element the next root starts with, without consuming it.
    ///
    /// `None` at the end of input or when the next content is not a plain
    /// element start (a comment, say).
    #[must_use]
    pub fn peek_root_tag(&self) -> Option<&'a str> {
        let input: &'a [u8] = self.input;
        let rest = input.get(self.cursor..)?;
        let start = rest.iter().position(|&b| !b.is_ascii_whitespace())?;
        let rest = rest[start..].strip_prefix(b"<")?;
        let len = rest
            .iter()
            .position(|&b| b.is_ascii_whitespace() || matches!(b, b'/' | b'>'))
            .unwrap_or(rest.len());
        let tag = std::str::from_utf8(&rest[..len]).ok()?;
        (!tag.is_empty() && !tag.starts_with(['!', '?'])).then_some(tag)
    }

    /// Parse the next logical root, which must be an element named `expected`.
    ///
    /// Returns `Ok(None)` when the input has no further roots; callers treat
    /// that root as absent.
    pub fn next_root(&mut self, expected: &str) -> Result<Option<XmlTree>> {
        if self.state == ParserState::Finished || self.cursor >= self.input.len() {
            self.state = ParserState::Finished;
            return Ok(None);
        }

        let prolog: &[u8] = if self.cursor == 0 {
            b""
        } else {
            self.state = ParserState::Resuming {
                offset: self.cursor,
            };
            XML_PROLOG.as_bytes()
        };

        tracing::debug!(
            "parsing <{}> from offset {}/{}",
            expected,
            self.cursor,
            self.input.len()
        );

        let outcome = parse_root(
            prolog,
            &self.input[self.cursor..],
            self.chunk_size,
            Some(expected),
        )?;

        match outcome {
            RootOutcome::Boundary { tree, offset } => {
                let absolute = self.cursor + offset - prolog.len();
                self.cursor = absolute;
                self.state = ParserState::BoundaryDetected { offset: absolute };
                Ok(Some(tree))
            }
            RootOutcome::Complete(tree) => {
                self.cursor = self.input.len();
                self.state = ParserState::Finished;
                Ok(Some(tree))
            }
            RootOutcome::Exhausted => {
                self.cursor = self.input.len();
                self.state = ParserState::Finished;
                Ok(None)
            }
        }
    }
}

/// Parse a single standalone document, such as an embedded state blob.
///
/// Content after the root element is ignored.
pub fn parse_document(content: &str) -> Result<XmlTree> {
    match parse_root(b"", content.as_bytes(), DEFAULT_CHUNK_SIZE, None)? {
        RootOutcome::Boundary { tree, .. } | RootOutcome::Complete(tree) => Ok(tree),
        RootOutcome::Exhausted => Err(Error::MalformedDocument {
            root: "document".to_string(),
            message: "no root element".to_string(),
        }),
    }
}

/// Feed `prolog` followed by `body` through one reader until the root closes.
///
/// Offsets in the outcome are relative to the start of `prolog`.
pub fn parse_root(
    prolog: &[u8],
    body: &[u8],
    chunk_size: usize,
    expected: Option<&str>,
) -> Result<RootOutcome> {
    let source = BufReader::with_capacity(chunk_size.max(1), prolog.chain(body));
    let mut reader = Reader::from_reader(source);
    reader.trim_text(true);

    let label = expected.unwrap_or("document");
    let mut builder = TreeBuilder::new(expected);
    let mut buf = Vec::new();

    loop {
        let event_start = reader.buffer_position();
        match reader.read_event_into(&mut buf) {
            Err(e) => return Err(malformed(label, e)),
            Ok(Event::Eof) => {
                if builder.closed {
                    return Ok(RootOutcome::Complete(builder.finish()));
                }
                if builder.started() {
                    return Err(malformed(
                        label,
                        "unexpected end of input before the root element closed",
                    ));
                }
                return Ok(RootOutcome::Exhausted);
            }
            Ok(event) if builder.closed => match event {
                Event::Start(_) | Event::Empty(_) | Event::Text(_) | Event::CData(_) => {
                    // content after document end: the next root begins here
                    return Ok(RootOutcome::Boundary {
                        tree: builder.finish(),
                        offset: event_start,
                    });
                }
                Event::Comment(_) | Event::PI(_) => {}
                other => {
                    return Err(malformed(
                        label,
                        format!("unexpected {other:?} after the root element"),
                    ));
                }
            },
            Ok(Event::Start(e)) => builder.open(&e)?,
            Ok(Event::Empty(e)) => {
                builder.open(&e)?;
                builder.close();
            }
            Ok(Event::End(_)) => builder.close(),
            Ok(Event::Text(t)) => {
                let text = t.unescape().map_err(|e| malformed(label, e))?;
                builder.text(label, &text)?;
            }
            Ok(Event::CData(c)) => {
                let raw = c.into_inner();
                builder.text(label, &String::from_utf8_lossy(&raw))?;
            }
            Ok(Event::Decl(_) | Event::Comment(_) | Event::PI(_) | Event::DocType(_)) => {}
        }
        buf.clear();
    }
}

fn malformed(root: &str, err: impl std::fmt::Display) -> Error {
    Error::MalformedDocument {
        root: root.to_string(),
        message: err.to_string(),
    }
}

/// Assembles reader events into an [`XmlTree`].
struct TreeBuilder<'e> {
    expected: Option<&'e str>,
    tree: XmlTree,
    stack: Vec<NodeId>,
    closed: bool,
}

impl<'e> TreeBuilder<'e> {
    fn new(expected: Option<&'e str>) -> Self {
        Self {
            expected,
            tree: XmlTree::new(),
            stack: Vec::new(),
            closed: false,
        }
    }

    fn started(&self) -> bool {
        self.tree.root().is_some()
    }

    fn open(&mut self, start: &BytesStart) -> Result<()> {
        let tag = String::from_utf8_lossy(start.name().as_ref()).into_owned();
        let node = self.tree.create_element(&tag);

        let label = self.expected.unwrap_or("document");
        for attr in start.attributes() {
            let attr = attr.map_err(|e| malformed(label, e))?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let value: Cow<str> = attr.unescape_value().map_err(|e| malformed(label, e))?;
            self.tree.set_attribute(node, &key, value);
        }

        if let Some(parent) = self.stack.last() {
            self.tree.append_child(*parent, node);
        } else {
            if let Some(expected) = self.expected {
                if tag != expected {
                    return Err(Error::UnexpectedRoot {
                        expected: expected.to_string(),
                        found: tag,
                    });
                }
            }
            self.tree.set_root(node);
        }
        self.stack.push(node);
        Ok(())
    }

    fn close(&mut self) {
        self.stack.pop();
        if self.stack.is_empty() && self.started() {
            self.closed = true;
        }
    }

    fn text(&mut self, label: &str, text: &str) -> Result<()> {
        match self.stack.last() {
            Some(node) => {
                let element = self.tree.element_mut(*node);
                element.text.get_or_insert_with(String::new).push_str(text);
                Ok(())
            }
            None => Err(malformed(label, "text outside of the root element")),
        }
    }

    fn finish(self) -> XmlTree {
        self.tree
    }
}
