//! XML layer: arena tree, multi-root streaming parser and serializer

pub mod reader;
pub mod tree;
pub mod writer;

pub use reader::{
    DEFAULT_CHUNK_SIZE, MultiRootParser, ParserState, XML_PROLOG, normalize_line_endings,
    parse_document,
};
pub use tree::{Element, NodeId, XmlTree};
pub use writer::{EmptyElements, serialize_embedded, serialize_root};
