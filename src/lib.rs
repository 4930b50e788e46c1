//! A parser for the sdjot markup language.
//!
//! sdjot is a lightweight block-structured markup dialect of the djot
//! family: headings, block quotes, divs, code and raw blocks, lists, pipe
//! tables, reference links and footnotes, with a rich inline layer of
//! pairable delimiters. [`parse`] turns source text into a [`Document`]
//! tree for renderers to walk.
//!
//! The grammar is forgiving: no input is rejected. Unpaired inline
//! delimiters degrade to literal text, unterminated fences close at end of
//! input, and unresolved reference labels are kept in the tree and
//! reported in the document's diagnostic lists.
//!
//! ```
//! let doc = sdjot::parse("::: note\nhello _world_\n:::\n");
//! match &doc.blocks[0] {
//!     sdjot::Block::Div { attrs, children } => {
//!         assert_eq!(attrs.classes().collect::<Vec<_>>(), ["note"]);
//!         assert_eq!(children.len(), 1);
//!     }
//!     b => panic!("{:?}", b),
//! }
//! ```

mod attr;
mod block;
mod inline;
mod lex;
mod resolve;
mod tree;

pub use attr::Attributes;
pub use tree::Alignment;
pub use tree::Block;
pub use tree::Destination;
pub use tree::Document;
pub use tree::Inline;
pub use tree::ListItem;
pub use tree::ListKind;
pub use tree::OrderedStyle;
pub use tree::Reference;
pub use tree::TableRow;

const EOF: char = '\0';

/// Parse a document.
///
/// Line endings are normalized before scanning; parsing itself is a pure
/// function of the text and always produces a tree.
#[must_use]
pub fn parse(src: &str) -> Document {
    let src = normalize_newlines(src);
    let mut doc = block::parse(&src);
    resolve::resolve(&mut doc);
    doc
}

/// `\r\n` and lone `\r` become `\n`.
fn normalize_newlines(src: &str) -> std::borrow::Cow<'_, str> {
    if src.contains('\r') {
        std::borrow::Cow::Owned(src.replace("\r\n", "\n").replace('\r', "\n"))
    } else {
        std::borrow::Cow::Borrowed(src)
    }
}
