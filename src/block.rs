use std::collections::HashMap;
use std::collections::HashSet;

use crate::attr;
use crate::attr::Attributes;
use crate::inline;
use crate::resolve;
use crate::tree::Alignment;
use crate::tree::Block;
use crate::tree::Document;
use crate::tree::ListItem;
use crate::tree::ListKind;
use crate::tree::OrderedStyle;
use crate::tree::Reference;
use crate::tree::TableRow;

/// Parse newline-normalized source into a document with its reference
/// tables filled in. Resolution of reference links runs as a later pass.
pub(crate) fn parse(src: &str) -> Document {
    let lines = src.lines().collect::<Vec<_>>();
    let mut parser = Parser::default();
    let blocks = parser.parse_blocks(&lines);
    Document {
        blocks,
        references: parser.references,
        footnotes: parser.footnotes,
        ..Document::default()
    }
}

/// What a line can start. Classification input is the whitespace-trimmed
/// line; each variant carries the marker information the assembler needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind<'s> {
    Heading { level: u8 },
    Blockquote,
    DivFence { len: usize, annotation: &'s str },
    CodeFence { annotation: &'s str },
    ThematicBreak,
    FootnoteDef { label: &'s str, rest: &'s str },
    RefDef { label: &'s str, dest: &'s str },
    Item(Item<'s>),
    TableRow,
    Paragraph,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Item<'s> {
    family: Family,
    checked: Option<bool>,
    number: u64,
    content: &'s str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Family {
    Bullet,
    Ordered(OrderedStyle),
    Task,
}

/// Determine what type of block a line can start.
fn start(line: &str) -> Kind {
    let l = line.trim();
    match l.chars().next() {
        Some('#') => {
            let level = l.chars().take_while(|c| *c == '#').count();
            if (1..=6).contains(&level) && l[level..].starts_with(|c: char| c.is_whitespace()) {
                return Kind::Heading { level: level as u8 };
            }
        }
        Some('>') => return Kind::Blockquote,
        Some(':') => {
            let len = l.chars().take_while(|c| *c == ':').count();
            if len >= 3 {
                return Kind::DivFence {
                    len,
                    annotation: l[len..].trim(),
                };
            }
        }
        Some('`') => {
            let len = l.chars().take_while(|c| *c == '`').count();
            if len >= 3 {
                return Kind::CodeFence {
                    annotation: l[len..].trim(),
                };
            }
        }
        Some('[') => {
            if let Some(kind) = definition(l) {
                return kind;
            }
        }
        Some('|') => return Kind::TableRow,
        _ => {}
    }
    if thematic_break(l) {
        return Kind::ThematicBreak;
    }
    if let Some(item) = item(l) {
        return Kind::Item(item);
    }
    Kind::Paragraph
}

/// A run of three or more `-` or `*`, optionally interspersed with spaces
/// and tabs. Takes priority over a dash-bullet list.
fn thematic_break(l: &str) -> bool {
    let mut marker = None;
    let mut count = 0;
    for c in l.chars() {
        match c {
            ' ' | '\t' => {}
            '-' | '*' if marker.map_or(true, |m| m == c) => {
                marker = Some(c);
                count += 1;
            }
            _ => return false,
        }
    }
    count >= 3
}

/// `[label]: dest` or `[^label]: ...`, the latter checked first.
fn definition(l: &str) -> Option<Kind> {
    let end = l.find("]:")?;
    if let Some(label) = l[..end].strip_prefix("[^") {
        (!label.is_empty() && !label.contains(']')).then(|| Kind::FootnoteDef {
            label,
            rest: l[end + 2..].trim_start(),
        })
    } else {
        let label = &l[1..end];
        (!label.is_empty() && !label.contains('[')).then(|| Kind::RefDef {
            label,
            dest: l[end + 2..].trim(),
        })
    }
}

fn item(l: &str) -> Option<Item> {
    let mut chars = l.chars();
    match chars.next()? {
        '-' | '+' | '*' => {
            let rest = l[1..].strip_prefix(' ')?;
            let task = |r: &&str| r.is_empty() || r.starts_with(' ');
            let (checked, content) = if let Some(r) = rest.strip_prefix("[ ]").filter(task) {
                (Some(false), r.trim_start())
            } else if let Some(r) = rest
                .strip_prefix("[x]")
                .or_else(|| rest.strip_prefix("[X]"))
                .filter(task)
            {
                (Some(true), r.trim_start())
            } else {
                (None, rest.trim_start())
            };
            Some(Item {
                family: if checked.is_some() {
                    Family::Task
                } else {
                    Family::Bullet
                },
                checked,
                number: 0,
                content,
            })
        }
        '0'..='9' => {
            let digits = l.chars().take_while(char::is_ascii_digit).count();
            let style = match l[digits..].chars().next() {
                Some('.') => OrderedStyle::Period,
                Some(')') => OrderedStyle::Paren,
                _ => return None,
            };
            let rest = l[digits + 1..].strip_prefix(' ')?;
            Some(Item {
                family: Family::Ordered(style),
                checked: None,
                number: l[..digits].parse().ok()?,
                content: rest.trim_start(),
            })
        }
        _ => None,
    }
}

#[derive(Default)]
struct Parser {
    references: HashMap<String, Reference>,
    footnotes: HashSet<String>,
}

impl Parser {
    /// Parse a run of lines into sibling blocks, attaching pending
    /// attribute lines to the block that follows them.
    fn parse_blocks(&mut self, lines: &[&str]) -> Vec<Block> {
        let mut blocks = Vec::new();
        let mut attrs = Attributes::new();
        let mut i = 0;
        while i < lines.len() {
            let line = lines[i];
            if line.trim().is_empty() {
                // attribute lines attach only when directly adjacent
                attrs = Attributes::new();
                i += 1;
                continue;
            }
            if let Some(a) = attr::parse_line(line) {
                attrs.merge(a);
                i += 1;
                continue;
            }
            let (block, used) = self.parse_block(&lines[i..], attrs.take());
            debug_assert!(used > 0);
            blocks.push(block);
            i += used;
        }
        blocks
    }

    /// Parse one block starting at `lines[0]`. Returns the block and the
    /// number of lines it used.
    fn parse_block(&mut self, lines: &[&str], attrs: Attributes) -> (Block, usize) {
        match start(lines[0]) {
            Kind::Heading { level } => self.heading(lines, level, attrs),
            Kind::Blockquote => self.blockquote(lines),
            Kind::DivFence { len, annotation } => self.div(lines, len, annotation, attrs),
            Kind::CodeFence { annotation } => self.code_block(lines, annotation, attrs),
            Kind::ThematicBreak => (Block::ThematicBreak, 1),
            Kind::FootnoteDef { label, rest } => self.footnote_def(lines, label, rest),
            Kind::RefDef { label, dest } => self.reference_def(label, dest, attrs),
            Kind::Item(item) => self.list(lines, item),
            Kind::TableRow => self.table(lines),
            Kind::Paragraph => self.paragraph(lines, attrs),
        }
    }

    /// Heading content may continue over lines that repeat the marker with
    /// the same or a lower level, or carry no marker at all. A blank line
    /// or any other construct ends it.
    fn heading(&mut self, lines: &[&str], level: u8, attrs: Attributes) -> (Block, usize) {
        let mut content = vec![heading_text(lines[0])];
        let mut used = 1;
        for line in &lines[1..] {
            if line.trim().is_empty() {
                break;
            }
            match start(line) {
                Kind::Heading { level: l } if l <= level => content.push(heading_text(line)),
                Kind::Paragraph => content.push(line.trim()),
                _ => break,
            }
            used += 1;
        }
        let content = inline::parse(&content.join("\n"));
        (Block::Heading { level, content, attrs }, used)
    }

    /// Marker lines continue the quote; a marker-less line lazily continues
    /// an in-progress paragraph until a blank line closes it.
    fn blockquote(&mut self, lines: &[&str]) -> (Block, usize) {
        let mut inner: Vec<&str> = Vec::new();
        let mut used = 0;
        for line in lines {
            if let Some(rest) = quote_content(line) {
                inner.push(rest);
            } else if !line.trim().is_empty()
                && matches!(start(line), Kind::Paragraph)
                && inner.last().map_or(false, |l| {
                    !l.trim().is_empty() && matches!(start(l), Kind::Paragraph)
                })
            {
                inner.push(line.trim());
            } else {
                break;
            }
            used += 1;
        }
        let children = self.parse_blocks(&inner);
        (Block::Blockquote { children }, used)
    }

    /// The fence annotation is a class word or attribute span(s). Inner
    /// lines run to a bare colon fence at least as long as the opening one,
    /// skipping fences that belong to nested divs or code blocks.
    fn div(
        &mut self,
        lines: &[&str],
        fence_len: usize,
        annotation: &str,
        mut attrs: Attributes,
    ) -> (Block, usize) {
        if annotation.starts_with('{') {
            if let Some(a) = attr::parse_line(annotation) {
                attrs.merge(a);
            }
        } else if let Some(class) = annotation.split_whitespace().next() {
            attrs.add_class(class);
        }

        let mut nested: Vec<usize> = Vec::new();
        let mut in_code = false;
        let mut end = None;
        for (j, line) in lines[1..].iter().enumerate() {
            match start(line) {
                Kind::CodeFence { .. } => in_code = !in_code,
                Kind::DivFence { len, annotation } if !in_code => {
                    if !annotation.is_empty() {
                        nested.push(len);
                    } else if let Some(p) = nested.iter().rposition(|f| len >= *f) {
                        nested.truncate(p);
                    } else if len >= fence_len {
                        end = Some(j);
                        break;
                    } else {
                        nested.push(len);
                    }
                }
                _ => {}
            }
        }
        let (inner, used) = match end {
            Some(j) => (&lines[1..=j], j + 2),
            None => (&lines[1..], lines.len()),
        };
        let children = self.parse_blocks(inner);
        (Block::Div { attrs, children }, used)
    }

    /// Content is literal up to a bare closing fence; an annotated fence
    /// line inside is content. Unterminated blocks run to end of input.
    fn code_block(
        &mut self,
        lines: &[&str],
        annotation: &str,
        mut attrs: Attributes,
    ) -> (Block, usize) {
        let (language, raw_format, fence_attrs) = code_annotation(annotation);
        attrs.merge(fence_attrs);
        let mut content = Vec::new();
        let mut used = 1;
        for line in &lines[1..] {
            used += 1;
            if matches!(start(line), Kind::CodeFence { annotation: "" }) {
                return (
                    Block::CodeBlock {
                        language,
                        raw_format,
                        attrs,
                        lines: content,
                    },
                    used,
                );
            }
            content.push((*line).to_string());
        }
        (
            Block::CodeBlock {
                language,
                raw_format,
                attrs,
                lines: content,
            },
            used,
        )
    }

    /// The first line's remainder plus following indented lines form the
    /// footnote body, parsed as blocks.
    fn footnote_def(&mut self, lines: &[&str], label: &str, rest: &str) -> (Block, usize) {
        let mut inner = vec![rest];
        let mut used = 1;
        for line in &lines[1..] {
            if line.trim().is_empty() || !line.starts_with("  ") {
                break;
            }
            inner.push(line[2..].trim_start_matches(' '));
            used += 1;
        }
        self.footnotes.insert(resolve::normalize_label(label));
        let children = self.parse_blocks(&inner);
        (
            Block::FootnoteDefinition {
                label: label.to_string(),
                children,
            },
            used,
        )
    }

    fn reference_def(&mut self, label: &str, dest: &str, attrs: Attributes) -> (Block, usize) {
        self.references
            .entry(resolve::normalize_label(label))
            .or_insert_with(|| Reference {
                destination: dest.to_string(),
                attrs: attrs.clone(),
            });
        (
            Block::ReferenceDefinition {
                label: label.to_string(),
                destination: dest.to_string(),
                attrs,
            },
            1,
        )
    }

    /// A maximal run of item lines sharing the first item's marker family.
    fn list(&mut self, lines: &[&str], first: Item) -> (Block, usize) {
        let kind = match first.family {
            Family::Bullet => ListKind::Bullet,
            Family::Task => ListKind::Task,
            Family::Ordered(style) => ListKind::Ordered {
                style,
                start: first.number,
            },
        };
        let mut items = Vec::new();
        let mut used = 0;
        for line in lines {
            match start(line) {
                Kind::Item(it) if it.family == first.family => {
                    items.push(ListItem {
                        checked: it.checked,
                        content: inline::parse(it.content),
                    });
                    used += 1;
                }
                _ => break,
            }
        }
        (Block::List { kind, items }, used)
    }

    /// Consecutive `|` rows; the first delimiter row marks preceding rows
    /// as header and fixes alignments; a `^ caption` line ends the table.
    fn table(&mut self, lines: &[&str]) -> (Block, usize) {
        let mut raw = Vec::new();
        let mut used = 0;
        for line in lines {
            if matches!(start(line), Kind::TableRow) {
                raw.push(line.trim());
                used += 1;
            } else {
                break;
            }
        }

        let mut caption = None;
        if let Some(line) = lines.get(used) {
            let t = line.trim();
            if t.len() > 1 && t.starts_with('^') && t[1..].starts_with(char::is_whitespace) {
                caption = Some(inline::parse(t[1..].trim()));
                used += 1;
            }
        }

        let delim = raw
            .iter()
            .position(|r| delimiter_row(r).is_some());
        let alignments = delim
            .map(|d| delimiter_row(raw[d]).unwrap())
            .unwrap_or_default();
        let rows = raw
            .iter()
            .enumerate()
            .filter(|(_, r)| delimiter_row(r).is_none())
            .map(|(i, r)| TableRow {
                head: delim.map_or(false, |d| i < d),
                cells: split_row(r)
                    .into_iter()
                    .map(|c| inline::parse(c.trim()))
                    .collect(),
            })
            .collect();
        (
            Block::Table {
                rows,
                alignments,
                caption,
            },
            used,
        )
    }

    fn paragraph(&mut self, lines: &[&str], attrs: Attributes) -> (Block, usize) {
        let mut content = vec![lines[0].trim()];
        let mut used = 1;
        for line in &lines[1..] {
            if line.trim().is_empty() || !matches!(start(line), Kind::Paragraph) {
                break;
            }
            content.push(line.trim());
            used += 1;
        }
        (
            Block::Paragraph {
                content: inline::parse(&content.join("\n")),
                attrs,
            },
            used,
        )
    }
}

fn heading_text(line: &str) -> &str {
    line.trim().trim_start_matches('#').trim_start()
}

/// `>` with one optional following space stripped.
fn quote_content(line: &str) -> Option<&str> {
    let rest = line.trim_start().strip_prefix('>')?;
    Some(rest.strip_prefix(' ').unwrap_or(rest))
}

/// Split the opening fence annotation into language / raw format / attrs.
fn code_annotation(ann: &str) -> (Option<String>, Option<String>, Attributes) {
    let mut language = None;
    let mut raw_format = None;
    let rest = if ann.starts_with('{') {
        ann
    } else {
        let end = ann
            .find(|c: char| c.is_whitespace() || c == '{')
            .unwrap_or(ann.len());
        match ann[..end].strip_prefix('=') {
            Some(fmt) if !fmt.is_empty() => raw_format = Some(fmt.to_string()),
            None if !ann[..end].is_empty() => language = Some(ann[..end].to_string()),
            _ => {}
        }
        ann[end..].trim_start()
    };
    let attrs = if rest.is_empty() {
        Attributes::new()
    } else {
        attr::parse_line(rest).unwrap_or_default()
    };
    (language, raw_format, attrs)
}

/// Split a `|` row into cells, honoring `\|` escapes.
fn split_row(row: &str) -> Vec<&str> {
    let row = row.strip_prefix('|').unwrap_or(row);
    let row = match row.as_bytes() {
        [.., b'\\', b'|'] => row,
        [.., b'|'] => &row[..row.len() - 1],
        _ => row,
    };
    let mut cells = Vec::new();
    let mut start = 0;
    let mut escaped = false;
    for (i, c) in row.char_indices() {
        match c {
            '\\' => escaped = !escaped,
            '|' if !escaped => {
                cells.push(&row[start..i]);
                start = i + 1;
            }
            _ => escaped = false,
        }
    }
    cells.push(&row[start..]);
    cells
}

/// `:---:`-style cells; `None` if any cell does not match the pattern.
fn delimiter_row(row: &str) -> Option<Vec<Alignment>> {
    let cells = split_row(row);
    let mut alignments = Vec::with_capacity(cells.len());
    for cell in cells {
        let cell = cell.trim();
        let left = cell.starts_with(':');
        let right = cell.ends_with(':') && cell.len() > 1;
        let dashes = &cell[usize::from(left)..cell.len() - usize::from(right)];
        if dashes.is_empty() || !dashes.chars().all(|c| c == '-') {
            return None;
        }
        alignments.push(match (left, right) {
            (true, true) => Alignment::Center,
            (true, false) => Alignment::Left,
            (false, true) => Alignment::Right,
            (false, false) => Alignment::Unspecified,
        });
    }
    Some(alignments)
}

#[cfg(test)]
mod test {
    use crate::attr::Attributes;
    use crate::tree::Alignment;
    use crate::tree::Block;
    use crate::tree::Block::*;
    use crate::tree::Inline;
    use crate::tree::ListItem;
    use crate::tree::ListKind;
    use crate::tree::OrderedStyle;
    use crate::tree::TableRow;

    fn text(s: &str) -> Vec<Inline> {
        vec![Inline::Text(s.into())]
    }

    fn attrs(src: &str) -> Attributes {
        crate::attr::parse_prefix(src).unwrap().0
    }

    macro_rules! test_parse {
        ($src:expr $(,$($block:expr),* $(,)?)?) => {
            let actual = super::parse($src).blocks;
            let expected: Vec<Block> = vec![$($($block),*,)?];
            assert_eq!(actual, expected, "\n\n{}\n\n", $src);
        };
    }

    #[test]
    fn para() {
        test_parse!(
            "para\n",
            Paragraph {
                content: text("para"),
                attrs: Attributes::new(),
            },
        );
        test_parse!(
            "para0\npara0 cont\n\npara1\n",
            Paragraph {
                content: text("para0\npara0 cont"),
                attrs: Attributes::new(),
            },
            Paragraph {
                content: text("para1"),
                attrs: Attributes::new(),
            },
        );
    }

    #[test]
    fn heading() {
        test_parse!(
            "# one\n",
            Heading {
                level: 1,
                content: text("one"),
                attrs: Attributes::new(),
            },
        );
        test_parse!(
            "## multi\n## line\nloose\n",
            Heading {
                level: 2,
                content: text("multi\nline\nloose"),
                attrs: Attributes::new(),
            },
        );
        test_parse!(
            "# a\n\n## b\n",
            Heading {
                level: 1,
                content: text("a"),
                attrs: Attributes::new(),
            },
            Heading {
                level: 2,
                content: text("b"),
                attrs: Attributes::new(),
            },
        );
        // more markers than 6 is just a paragraph
        test_parse!(
            "####### no\n",
            Paragraph {
                content: text("####### no"),
                attrs: Attributes::new(),
            },
        );
    }

    #[test]
    fn heading_interrupted_by_deeper() {
        test_parse!(
            "# a\n## b\n",
            Heading {
                level: 1,
                content: text("a"),
                attrs: Attributes::new(),
            },
            Heading {
                level: 2,
                content: text("b"),
                attrs: Attributes::new(),
            },
        );
    }

    #[test]
    fn blockquote() {
        test_parse!(
            "> a\n>\n> b\n",
            Blockquote {
                children: vec![
                    Paragraph {
                        content: text("a"),
                        attrs: Attributes::new(),
                    },
                    Paragraph {
                        content: text("b"),
                        attrs: Attributes::new(),
                    },
                ],
            },
        );
    }

    #[test]
    fn blockquote_lazy() {
        test_parse!(
            "> line one\nline two\n",
            Blockquote {
                children: vec![Paragraph {
                    content: text("line one\nline two"),
                    attrs: Attributes::new(),
                }],
            },
        );
        // a blank line ends the paragraph, so the quote closes
        test_parse!(
            "> a\n\nb\n",
            Blockquote {
                children: vec![Paragraph {
                    content: text("a"),
                    attrs: Attributes::new(),
                }],
            },
            Paragraph {
                content: text("b"),
                attrs: Attributes::new(),
            },
        );
    }

    #[test]
    fn blockquote_nested_heading() {
        test_parse!(
            "> ## hl\n> para\n",
            Blockquote {
                children: vec![
                    Heading {
                        level: 2,
                        content: text("hl\npara"),
                        attrs: Attributes::new(),
                    },
                ],
            },
        );
    }

    #[test]
    fn div() {
        test_parse!(
            "::: note\ninner text\n:::\n",
            Div {
                attrs: attrs("{.note}"),
                children: vec![Paragraph {
                    content: text("inner text"),
                    attrs: Attributes::new(),
                }],
            },
        );
    }

    #[test]
    fn div_unterminated() {
        test_parse!(
            "::: warn\nabc\n",
            Div {
                attrs: attrs("{.warn}"),
                children: vec![Paragraph {
                    content: text("abc"),
                    attrs: Attributes::new(),
                }],
            },
        );
    }

    #[test]
    fn div_nested() {
        test_parse!(
            "::: outer\n:::: inner\na\n::::\nb\n:::\n",
            Div {
                attrs: attrs("{.outer}"),
                children: vec![
                    Div {
                        attrs: attrs("{.inner}"),
                        children: vec![Paragraph {
                            content: text("a"),
                            attrs: Attributes::new(),
                        }],
                    },
                    Paragraph {
                        content: text("b"),
                        attrs: Attributes::new(),
                    },
                ],
            },
        );
    }

    #[test]
    fn div_close_needs_length() {
        // a shorter bare fence opens a nested div instead of closing
        test_parse!(
            "::::: outer\n:::\na\n:::::\n",
            Div {
                attrs: attrs("{.outer}"),
                children: vec![Div {
                    attrs: Attributes::new(),
                    children: vec![Paragraph {
                        content: text("a"),
                        attrs: Attributes::new(),
                    }],
                }],
            },
        );
    }

    #[test]
    fn div_attrs() {
        test_parse!(
            "::: {#id .cls}\nx\n:::\n",
            Div {
                attrs: attrs("{#id .cls}"),
                children: vec![Paragraph {
                    content: text("x"),
                    attrs: Attributes::new(),
                }],
            },
        );
    }

    #[test]
    fn code_block() {
        test_parse!(
            "```lang\nl0\nl1\n```\n",
            CodeBlock {
                language: Some("lang".into()),
                raw_format: None,
                attrs: Attributes::new(),
                lines: vec!["l0".into(), "l1".into()],
            },
        );
        // no inline parsing inside
        test_parse!(
            "```\n_not emphasis_\n```\n",
            CodeBlock {
                language: None,
                raw_format: None,
                attrs: Attributes::new(),
                lines: vec!["_not emphasis_".into()],
            },
        );
    }

    #[test]
    fn code_block_unterminated() {
        test_parse!(
            "```\nabc\n",
            CodeBlock {
                language: None,
                raw_format: None,
                attrs: Attributes::new(),
                lines: vec!["abc".into()],
            },
        );
    }

    #[test]
    fn raw_block() {
        test_parse!(
            "```=html\n<p>x</p>\n```\n",
            CodeBlock {
                language: None,
                raw_format: Some("html".into()),
                attrs: Attributes::new(),
                lines: vec!["<p>x</p>".into()],
            },
        );
    }

    #[test]
    fn thematic_break() {
        test_parse!("---\n", ThematicBreak);
        test_parse!("* * *\n", ThematicBreak);
        test_parse!(
            "----\ntext\n",
            ThematicBreak,
            Paragraph {
                content: text("text"),
                attrs: Attributes::new(),
            },
        );
    }

    #[test]
    fn reference_definition() {
        test_parse!(
            "[label]: /dest\n",
            ReferenceDefinition {
                label: "label".into(),
                destination: "/dest".into(),
                attrs: Attributes::new(),
            },
        );
        // empty destination is defined-but-unset
        test_parse!(
            "[label]:\n",
            ReferenceDefinition {
                label: "label".into(),
                destination: "".into(),
                attrs: Attributes::new(),
            },
        );
    }

    #[test]
    fn footnote_definition() {
        test_parse!(
            "[^note]: body\n  more\n",
            FootnoteDefinition {
                label: "note".into(),
                children: vec![Paragraph {
                    content: text("body\nmore"),
                    attrs: Attributes::new(),
                }],
            },
        );
    }

    #[test]
    fn list_bullet() {
        test_parse!(
            "- a\n- b\n+ c\n",
            List {
                kind: ListKind::Bullet,
                items: vec![
                    ListItem {
                        checked: None,
                        content: text("a"),
                    },
                    ListItem {
                        checked: None,
                        content: text("b"),
                    },
                    ListItem {
                        checked: None,
                        content: text("c"),
                    },
                ],
            },
        );
    }

    #[test]
    fn list_ordered() {
        test_parse!(
            "3. a\n4. b\n",
            List {
                kind: ListKind::Ordered {
                    style: OrderedStyle::Period,
                    start: 3,
                },
                items: vec![
                    ListItem {
                        checked: None,
                        content: text("a"),
                    },
                    ListItem {
                        checked: None,
                        content: text("b"),
                    },
                ],
            },
        );
    }

    #[test]
    fn list_task() {
        test_parse!(
            "- [ ] todo\n- [x] done\n",
            List {
                kind: ListKind::Task,
                items: vec![
                    ListItem {
                        checked: Some(false),
                        content: text("todo"),
                    },
                    ListItem {
                        checked: Some(true),
                        content: text("done"),
                    },
                ],
            },
        );
    }

    #[test]
    fn list_family_split() {
        // a family change starts a new list
        test_parse!(
            "- a\n1. b\n",
            List {
                kind: ListKind::Bullet,
                items: vec![ListItem {
                    checked: None,
                    content: text("a"),
                }],
            },
            List {
                kind: ListKind::Ordered {
                    style: OrderedStyle::Period,
                    start: 1,
                },
                items: vec![ListItem {
                    checked: None,
                    content: text("b"),
                }],
            },
        );
    }

    #[test]
    fn table() {
        test_parse!(
            "| a | b |\n|:---|---:|\n| c | d |\n",
            Table {
                rows: vec![
                    TableRow {
                        head: true,
                        cells: vec![text("a"), text("b")],
                    },
                    TableRow {
                        head: false,
                        cells: vec![text("c"), text("d")],
                    },
                ],
                alignments: vec![Alignment::Left, Alignment::Right],
                caption: None,
            },
        );
    }

    #[test]
    fn table_alignments() {
        let doc = super::parse("|:---|:---:|---:|\n");
        match &doc.blocks[0] {
            Table { alignments, rows, .. } => {
                assert_eq!(
                    alignments,
                    &[Alignment::Left, Alignment::Center, Alignment::Right]
                );
                assert!(rows.is_empty());
            }
            b => panic!("{:?}", b),
        }
    }

    #[test]
    fn table_caption() {
        test_parse!(
            "| a |\n^ the caption\n",
            Table {
                rows: vec![TableRow {
                    head: false,
                    cells: vec![text("a")],
                }],
                alignments: vec![],
                caption: Some(text("the caption")),
            },
        );
    }

    #[test]
    fn block_attributes() {
        test_parse!(
            "{#intro .lead}\npara\n",
            Paragraph {
                content: text("para"),
                attrs: attrs("{#intro .lead}"),
            },
        );
        // a blank line breaks adjacency
        test_parse!(
            "{.orphan}\n\npara\n",
            Paragraph {
                content: text("para"),
                attrs: Attributes::new(),
            },
        );
    }

    #[test]
    fn paragraph_interrupted() {
        test_parse!(
            "para\n# h\n",
            Paragraph {
                content: text("para"),
                attrs: Attributes::new(),
            },
            Heading {
                level: 1,
                content: text("h"),
                attrs: Attributes::new(),
            },
        );
        test_parse!(
            "para\n- item\n",
            Paragraph {
                content: text("para"),
                attrs: Attributes::new(),
            },
            List {
                kind: ListKind::Bullet,
                items: vec![ListItem {
                    checked: None,
                    content: text("item"),
                }],
            },
        );
    }
}
