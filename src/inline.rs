use crate::attr;
use crate::attr::Attributes;
use crate::lex;
use crate::tree::Destination;
use crate::tree::Inline;

use lex::Delimiter;
use lex::Kind;
use lex::Sequence;
use lex::Symbol;

/// Parse one logical inline run (a leaf block's lines rejoined with `\n`)
/// into a tree of inline nodes. Never fails: anything that does not pair up
/// degrades to literal text.
pub(crate) fn parse(src: &str) -> Vec<Inline> {
    Parser::new(src).parse()
}

/// Delimited constructs that wrap child inlines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Compound {
    Emphasis,
    Strong,
    Superscript,
    Subscript,
    Insert,
    Delete,
    Highlight,
}

impl Compound {
    fn wrap(self, content: Vec<Inline>, attrs: Attributes) -> Inline {
        match self {
            Self::Emphasis => Inline::Emphasis { content, attrs },
            Self::Strong => Inline::Strong { content, attrs },
            Self::Superscript => Inline::Superscript { content, attrs },
            Self::Subscript => Inline::Subscript { content, attrs },
            Self::Insert => Inline::Insert { content, attrs },
            Self::Delete => Inline::Delete { content, attrs },
            Self::Highlight => Inline::Highlight { content, attrs },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScopeKind {
    Compound(Compound),
    /// `[` or `![`, resolved when the closing bracket is reached.
    Bracket { image: bool },
}

/// An open construct. Holds the parent's finished children and pending text
/// so they can be restored whether the construct closes or degrades.
struct Scope {
    kind: ScopeKind,
    /// Source span of the opening delimiter, replayed on fallback.
    delim: (usize, usize),
    out: Vec<Inline>,
    text: String,
}

struct Parser<'s> {
    src: &'s str,
    tokens: Vec<lex::Token>,
    i: usize,
    out: Vec<Inline>,
    text: String,
    stack: Vec<Scope>,
}

impl<'s> Parser<'s> {
    fn new(src: &'s str) -> Self {
        Self {
            src,
            tokens: lex::tokenize(src),
            i: 0,
            out: Vec::new(),
            text: String::new(),
            stack: Vec::new(),
        }
    }

    fn parse(mut self) -> Vec<Inline> {
        while self.i < self.tokens.len() {
            let t = self.tokens[self.i].clone();
            self.i += 1;
            match t.kind {
                // the backslash itself, invisible
                Kind::Escape => {}
                Kind::Nbsp => self.text.push('\u{a0}'),
                Kind::Hardbreak => self.push_inline(Inline::LineBreak),
                Kind::Text | Kind::Whitespace => self.push_raw(t.start, t.end()),
                Kind::Seq(Sequence::Backtick) => self.verbatim(&t),
                Kind::Seq(Sequence::Dollar) => self.math(&t),
                Kind::Seq(Sequence::Colon) => self.symbol(&t),
                Kind::Sym(Symbol::Exclaim) => self.exclaim(&t),
                Kind::Open(Delimiter::Bracket) => self.open_bracket(&t),
                Kind::Close(Delimiter::Bracket) => self.close_bracket(&t),
                Kind::Sym(Symbol::Lt) => self.autolink(&t),
                Kind::Sym(Symbol::Asterisk) => self.flip(Compound::Strong, &t),
                Kind::Sym(Symbol::Underscore) => self.flip(Compound::Emphasis, &t),
                Kind::Sym(Symbol::Caret) => self.flip(Compound::Superscript, &t),
                Kind::Sym(Symbol::Tilde) => self.flip(Compound::Subscript, &t),
                Kind::Sym(Symbol::Gt) => self.push_raw(t.start, t.end()),
                Kind::Open(d) => match compound_of(d) {
                    Some(c) => self.open(ScopeKind::Compound(c), (t.start, t.end())),
                    None => self.push_raw(t.start, t.end()),
                },
                Kind::Close(d) => match compound_of(d) {
                    Some(c) if self.has_open(c) => self.close_compound(c, &t),
                    _ => self.push_raw(t.start, t.end()),
                },
            }
        }
        while !self.stack.is_empty() {
            self.degrade_top();
        }
        self.flush();
        self.out
    }

    fn push_raw(&mut self, start: usize, end: usize) {
        let src = self.src;
        self.text.push_str(&src[start..end]);
    }

    fn flush(&mut self) {
        if !self.text.is_empty() {
            let t = std::mem::take(&mut self.text);
            self.out.push(Inline::Text(t));
        }
    }

    fn push_inline(&mut self, node: Inline) {
        match node {
            Inline::Text(s) => self.text.push_str(&s),
            _ => {
                self.flush();
                self.out.push(node);
            }
        }
    }

    /// Advance past all tokens consumed up to byte `pos`, splitting a
    /// straddling run token if necessary.
    fn skip_to(&mut self, pos: usize) {
        while self.i < self.tokens.len() && self.tokens[self.i].end() <= pos {
            self.i += 1;
        }
        if let Some(t) = self.tokens.get_mut(self.i) {
            if t.start < pos {
                t.trim_front_to(pos);
            }
        }
    }

    /// Consume directly-adjacent `{...}` spans starting at byte `pos`.
    /// Returns the merged attributes and the position after them.
    fn adjacent_attrs(&mut self, mut pos: usize) -> (Attributes, usize) {
        let mut attrs = Attributes::new();
        while self.src[pos..].starts_with('{') {
            match attr::parse_prefix(&self.src[pos..]) {
                Some((a, len)) => {
                    attrs.merge(a);
                    pos += len;
                }
                None => break,
            }
        }
        self.skip_to(pos);
        (attrs, pos)
    }

    fn has_open(&self, c: Compound) -> bool {
        self.stack
            .iter()
            .any(|s| s.kind == ScopeKind::Compound(c))
    }

    fn open(&mut self, kind: ScopeKind, delim: (usize, usize)) {
        self.stack.push(Scope {
            kind,
            delim,
            out: std::mem::take(&mut self.out),
            text: std::mem::take(&mut self.text),
        });
    }

    /// Pop the innermost scope and splice its opener and children back into
    /// the parent as literal content.
    fn degrade_top(&mut self) {
        self.flush();
        let scope = self.stack.pop().unwrap();
        let children = std::mem::replace(&mut self.out, scope.out);
        self.text = scope.text;
        if matches!(scope.kind, ScopeKind::Bracket { image: true }) {
            self.text.push('!');
        }
        let src = self.src;
        self.text.push_str(&src[scope.delim.0..scope.delim.1]);
        for child in children {
            self.push_inline(child);
        }
    }

    /// Close the innermost matching compound scope, degrading anything
    /// opened after it.
    fn close_compound(&mut self, c: Compound, closer: &lex::Token) {
        while self.stack.last().map(|s| s.kind) != Some(ScopeKind::Compound(c)) {
            self.degrade_top();
        }
        self.flush();
        let scope = self.stack.pop().unwrap();
        let children = std::mem::replace(&mut self.out, scope.out);
        self.text = scope.text;
        if children.is_empty() {
            // an empty pairing is no pairing
            let src = self.src;
            self.text.push_str(&src[scope.delim.0..scope.delim.1]);
            self.text.push_str(&src[closer.start..closer.end()]);
            return;
        }
        let (attrs, _) = self.adjacent_attrs(closer.end());
        self.push_inline(c.wrap(children, attrs));
    }

    /// A delimiter that both opens and closes: close if a matching scope is
    /// open, otherwise open a new one.
    fn flip(&mut self, c: Compound, t: &lex::Token) {
        if self.has_open(c) {
            self.close_compound(c, t);
        } else {
            self.open(ScopeKind::Compound(c), (t.start, t.end()));
        }
    }

    /// A backtick fence: everything up to the next run of exactly the same
    /// length is literal. An unterminated span runs to the end of the input.
    fn verbatim(&mut self, t: &lex::Token) {
        let (content, fence_end) = self.verbatim_content(t);
        let (attrs, _) = match fence_end {
            Some(pos) => self.adjacent_attrs(pos),
            None => (Attributes::new(), 0),
        };
        self.push_inline(Inline::Verbatim { content, attrs });
    }

    /// `$` or `$$` immediately followed by a backtick fence.
    fn math(&mut self, t: &lex::Token) {
        let fence = match self.tokens.get(self.i) {
            Some(f) if t.len <= 2 && f.kind == Kind::Seq(Sequence::Backtick) => f.clone(),
            _ => {
                self.push_raw(t.start, t.end());
                return;
            }
        };
        self.i += 1;
        let display = t.len == 2;
        let (content, _) = self.verbatim_content(&fence);
        self.push_inline(Inline::Math { display, content });
    }

    /// Scan for the closing fence and return the literal content plus the
    /// position after the closing fence, if any.
    fn verbatim_content(&mut self, open: &lex::Token) -> (String, Option<usize>) {
        let mut close = None;
        for (j, tok) in self.tokens.iter().enumerate().skip(self.i) {
            if tok.kind == Kind::Seq(Sequence::Backtick) && tok.len == open.len {
                close = Some(j);
                break;
            }
        }
        let (mut content, fence_end) = match close {
            Some(j) => {
                let span = &self.src[open.end()..self.tokens[j].start];
                self.i = j + 1;
                (span, Some(self.tokens[j].end()))
            }
            None => {
                let span = &self.src[open.end()..];
                self.i = self.tokens.len();
                (span, None)
            }
        };
        // a single boundary space separating content backticks from the fence
        if let Some(rest) = content.strip_prefix(' ') {
            if rest.starts_with('`') {
                content = rest;
            }
        }
        if let Some(rest) = content.strip_suffix(' ') {
            if rest.ends_with('`') {
                content = rest;
            }
        }
        (content.to_string(), fence_end)
    }

    /// `:name:` with a symbol name between single colons.
    fn symbol(&mut self, t: &lex::Token) {
        if t.len == 1 {
            let rest = &self.src[t.end()..];
            let name_len = rest
                .chars()
                .take_while(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '+'))
                .count();
            if name_len > 0 && rest[name_len..].starts_with(':') {
                let name = rest[..name_len].to_string();
                self.skip_to(t.end() + name_len + 1);
                self.push_inline(Inline::Symbol(name));
                return;
            }
        }
        self.push_raw(t.start, t.end());
    }

    /// `<...>` with no whitespace inside.
    fn autolink(&mut self, t: &lex::Token) {
        let rest = &self.src[t.end()..];
        for (idx, c) in rest.char_indices() {
            match c {
                '>' if idx > 0 => {
                    let url = rest[..idx].to_string();
                    self.skip_to(t.end() + idx + 1);
                    self.push_inline(Inline::Autolink(url));
                    return;
                }
                c if c.is_whitespace() => break,
                '<' | '>' => break,
                _ => {}
            }
        }
        self.push_raw(t.start, t.end());
    }

    /// `!` opens an image bracket only when directly followed by `[`.
    fn exclaim(&mut self, t: &lex::Token) {
        match self.tokens.get(self.i) {
            Some(b) if b.kind == Kind::Open(Delimiter::Bracket) => {
                let end = b.end();
                self.i += 1;
                self.open(ScopeKind::Bracket { image: true }, (t.start, end));
            }
            _ => self.push_raw(t.start, t.end()),
        }
    }

    /// `[^label]` is a footnote reference; any other `[` opens a bracket
    /// scope for a link, image description, or attribute span.
    fn open_bracket(&mut self, t: &lex::Token) {
        let rest = &self.src[t.end()..];
        if let Some(label) = rest.strip_prefix('^') {
            if let Some(end) = label.find(']') {
                let label = label[..end].to_string();
                self.skip_to(t.end() + 1 + end + 1);
                self.push_inline(Inline::FootnoteReference(label));
                return;
            }
        }
        self.open(ScopeKind::Bracket { image: false }, (t.start, t.end()));
    }

    /// `]` resolves the innermost bracket scope into a link, image, or
    /// span depending on what directly follows, or degrades it.
    fn close_bracket(&mut self, t: &lex::Token) {
        if !self
            .stack
            .iter()
            .any(|s| matches!(s.kind, ScopeKind::Bracket { .. }))
        {
            self.push_raw(t.start, t.end());
            return;
        }
        while !matches!(
            self.stack.last().unwrap().kind,
            ScopeKind::Bracket { .. }
        ) {
            self.degrade_top();
        }
        self.flush();
        let scope = self.stack.pop().unwrap();
        let children = std::mem::replace(&mut self.out, scope.out);
        self.text = scope.text;
        let image = matches!(scope.kind, ScopeKind::Bracket { image: true });

        let pos = t.end();
        let rest = &self.src[pos..];
        if let Some(dest) = rest.strip_prefix('(') {
            if let Some(end) = dest.find(')') {
                let destination = Destination::Url(dest[..end].to_string());
                let (attrs, _) = self.adjacent_attrs(pos + 1 + end + 1);
                self.push_inline(make_link(image, children, destination, attrs));
                return;
            }
        } else if let Some(label) = rest.strip_prefix('[') {
            if let Some(end) = label.find(']') {
                // empty brackets: the bracketed text is the label
                let destination = Destination::Reference(label[..end].to_string());
                let (attrs, _) = self.adjacent_attrs(pos + 1 + end + 1);
                self.push_inline(make_link(image, children, destination, attrs));
                return;
            }
        } else if rest.starts_with('{') {
            let (attrs, new_pos) = self.adjacent_attrs(pos);
            if new_pos > pos {
                self.push_inline(Inline::Span {
                    content: children,
                    attrs,
                });
                return;
            }
        }

        // plain bracketed text, kept literally
        if image {
            self.text.push('!');
        }
        self.text.push('[');
        for child in children {
            self.push_inline(child);
        }
        self.text.push(']');
    }
}

fn make_link(
    image: bool,
    content: Vec<Inline>,
    destination: Destination,
    attrs: Attributes,
) -> Inline {
    if image {
        Inline::Image {
            content,
            destination,
            attrs,
        }
    } else {
        Inline::Link {
            content,
            destination,
            attrs,
        }
    }
}

fn compound_of(d: Delimiter) -> Option<Compound> {
    match d {
        Delimiter::BraceAsterisk => Some(Compound::Strong),
        Delimiter::BraceCaret => Some(Compound::Superscript),
        Delimiter::BraceEqual => Some(Compound::Highlight),
        Delimiter::BraceHyphen => Some(Compound::Delete),
        Delimiter::BracePlus => Some(Compound::Insert),
        Delimiter::BraceTilde => Some(Compound::Subscript),
        Delimiter::BraceUnderscore => Some(Compound::Emphasis),
        Delimiter::Brace | Delimiter::Bracket | Delimiter::Paren => None,
    }
}
