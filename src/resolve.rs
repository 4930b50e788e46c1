use std::collections::HashMap;
use std::collections::HashSet;

use crate::tree::Block;
use crate::tree::Destination;
use crate::tree::Document;
use crate::tree::Inline;
use crate::tree::Reference;

/// Case-fold a reference label and collapse its whitespace.
pub(crate) fn normalize_label(label: &str) -> String {
    label
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Bind reference links, images and footnote references against the tables
/// built during assembly. Misses are recorded, never errors: the node stays
/// in the tree with its destination marked unresolved.
pub(crate) fn resolve(doc: &mut Document) {
    let mut blocks = std::mem::take(&mut doc.blocks);
    let mut pass = Pass {
        references: &doc.references,
        footnotes: &doc.footnotes,
        unresolved_references: Vec::new(),
        unresolved_footnotes: Vec::new(),
    };
    for block in &mut blocks {
        pass.block(block);
    }
    doc.blocks = blocks;
    doc.unresolved_references = pass.unresolved_references;
    doc.unresolved_footnotes = pass.unresolved_footnotes;
}

struct Pass<'d> {
    references: &'d HashMap<String, Reference>,
    footnotes: &'d HashSet<String>,
    unresolved_references: Vec<String>,
    unresolved_footnotes: Vec<String>,
}

impl Pass<'_> {
    fn block(&mut self, block: &mut Block) {
        match block {
            Block::Heading { content, .. } | Block::Paragraph { content, .. } => {
                self.inlines(content);
            }
            Block::Blockquote { children }
            | Block::Div { children, .. }
            | Block::FootnoteDefinition { children, .. } => {
                children.iter_mut().for_each(|c| self.block(c));
            }
            Block::List { items, .. } => {
                items.iter_mut().for_each(|i| self.inlines(&mut i.content));
            }
            Block::Table { rows, caption, .. } => {
                rows.iter_mut()
                    .flat_map(|r| r.cells.iter_mut())
                    .for_each(|c| self.inlines(c));
                if let Some(caption) = caption {
                    self.inlines(caption);
                }
            }
            Block::CodeBlock { .. } | Block::ThematicBreak | Block::ReferenceDefinition { .. } => {}
        }
    }

    fn inlines(&mut self, inlines: &mut [Inline]) {
        for inline in inlines {
            self.inline(inline);
        }
    }

    fn inline(&mut self, inline: &mut Inline) {
        match inline {
            Inline::Link {
                content,
                destination,
                attrs,
            }
            | Inline::Image {
                content,
                destination,
                attrs,
            } => {
                self.inlines(content);
                if let Destination::Reference(label) = destination {
                    // empty brackets: the link text is the label
                    let key = if label.is_empty() {
                        normalize_label(&plain_text(content))
                    } else {
                        normalize_label(label)
                    };
                    match self.references.get(&key) {
                        Some(reference) => {
                            // the node's own attributes win over the definition's
                            let mut merged = reference.attrs.clone();
                            merged.merge(attrs.take());
                            *attrs = merged;
                            *destination = Destination::Url(reference.destination.clone());
                        }
                        None => {
                            if !self.unresolved_references.contains(&key) {
                                self.unresolved_references.push(key.clone());
                            }
                            *destination = Destination::Unresolved(key);
                        }
                    }
                }
            }
            Inline::FootnoteReference(label) => {
                let key = normalize_label(label);
                if !self.footnotes.contains(&key) && !self.unresolved_footnotes.contains(&key) {
                    self.unresolved_footnotes.push(key);
                }
            }
            Inline::Emphasis { content, .. }
            | Inline::Strong { content, .. }
            | Inline::Superscript { content, .. }
            | Inline::Subscript { content, .. }
            | Inline::Insert { content, .. }
            | Inline::Delete { content, .. }
            | Inline::Highlight { content, .. }
            | Inline::Span { content, .. } => self.inlines(content),
            Inline::Text(_)
            | Inline::Verbatim { .. }
            | Inline::Autolink(_)
            | Inline::Symbol(_)
            | Inline::Math { .. }
            | Inline::LineBreak => {}
        }
    }
}

/// The text content of an inline run, used for empty-label references.
fn plain_text(inlines: &[Inline]) -> String {
    fn push(inlines: &[Inline], out: &mut String) {
        for inline in inlines {
            match inline {
                Inline::Text(t) => out.push_str(t),
                Inline::Verbatim { content, .. } => out.push_str(content),
                _ => {
                    if let Some(children) = inline.children() {
                        push(children, out);
                    }
                }
            }
        }
    }
    let mut out = String::new();
    push(inlines, &mut out);
    out
}
