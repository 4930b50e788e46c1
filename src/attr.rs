use crate::EOF;

/// Attributes attached to a block or inline element.
///
/// `{#id .class key=value}` spans parse into one of these. Repeated ids keep
/// the last one, classes accumulate in document order, and a repeated key
/// overwrites its earlier value in place.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Attributes {
    id: Option<String>,
    classes: Vec<String>,
    kv: Vec<(String, String)>,
}

impl Attributes {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn take(&mut self) -> Self {
        std::mem::take(self)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.id.is_none() && self.classes.is_empty() && self.kv.is_empty()
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn classes(&self) -> impl Iterator<Item = &str> + '_ {
        self.classes.iter().map(String::as_str)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.kv
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Key/value pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.kv.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn set_id(&mut self, id: impl Into<String>) {
        self.id = Some(id.into());
    }

    pub fn add_class(&mut self, class: impl Into<String>) {
        self.classes.push(class.into());
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        if let Some(i) = self.kv.iter().position(|(k, _)| *k == key) {
            self.kv[i].1 = value;
        } else {
            self.kv.push((key, value));
        }
    }

    /// Apply `later` on top of self: its id wins, its classes append, its
    /// keys overwrite.
    pub fn merge(&mut self, later: Attributes) {
        if later.id.is_some() {
            self.id = later.id;
        }
        self.classes.extend(later.classes);
        for (k, v) in later.kv {
            self.insert(k, v);
        }
    }
}

/// Parse one `{...}` span at the start of `src`. Returns the attributes and
/// the number of bytes consumed, or `None` if the span is malformed — the
/// caller then treats the `{` as literal text.
pub(crate) fn parse_prefix(src: &str) -> Option<(Attributes, usize)> {
    let mut p = Parser::new(src);
    if p.eat() != '{' {
        return None;
    }
    let mut attrs = Attributes::new();
    loop {
        p.eat_whitespace();
        match p.peek() {
            '}' => {
                p.eat();
                return Some((attrs, p.pos));
            }
            '#' => {
                p.eat();
                let id = p.eat_token()?;
                attrs.set_id(id);
            }
            '.' => {
                p.eat();
                let class = p.eat_token()?;
                attrs.add_class(class);
            }
            c if is_key_start(c) => {
                let key = p.eat_key();
                if p.eat() != '=' {
                    return None;
                }
                let value = match p.peek() {
                    q @ ('\'' | '"') => {
                        p.eat();
                        p.eat_quoted(q)?
                    }
                    _ => p.eat_value()?,
                };
                attrs.insert(key, value);
            }
            _ => return None,
        }
    }
}

/// Parse a line consisting entirely of attribute spans, as used for block
/// attributes. Later spans win over earlier ones.
pub(crate) fn parse_line(line: &str) -> Option<Attributes> {
    let mut rest = line.trim();
    if !rest.starts_with('{') {
        return None;
    }
    let mut attrs = Attributes::new();
    while !rest.is_empty() {
        let (a, len) = parse_prefix(rest)?;
        attrs.merge(a);
        rest = rest[len..].trim_start();
    }
    Some(attrs)
}

struct Parser<'s> {
    src: &'s str,
    chars: std::str::Chars<'s>,
    pos: usize,
}

impl<'s> Parser<'s> {
    fn new(src: &'s str) -> Self {
        Self {
            src,
            chars: src.chars(),
            pos: 0,
        }
    }

    fn peek(&self) -> char {
        self.chars.clone().next().unwrap_or(EOF)
    }

    fn eat(&mut self) -> char {
        match self.chars.next() {
            Some(c) => {
                self.pos += c.len_utf8();
                c
            }
            None => EOF,
        }
    }

    fn eat_while(&mut self, mut predicate: impl FnMut(char) -> bool) -> &'s str {
        let start = self.pos;
        while self.peek() != EOF && predicate(self.peek()) {
            self.eat();
        }
        &self.src[start..self.pos]
    }

    fn eat_whitespace(&mut self) {
        self.eat_while(char::is_whitespace);
    }

    /// An id or class token: any non-empty run without whitespace or `}`.
    fn eat_token(&mut self) -> Option<&'s str> {
        let t = self.eat_while(|c| !c.is_whitespace() && c != '}');
        (!t.is_empty()).then_some(t)
    }

    fn eat_key(&mut self) -> &'s str {
        let start = self.pos;
        self.eat();
        self.eat_while(is_key);
        &self.src[start..self.pos]
    }

    /// A bare value: non-empty, no whitespace, `}` or quotes.
    fn eat_value(&mut self) -> Option<&'s str> {
        let v = self.eat_while(|c| !c.is_whitespace() && !matches!(c, '}' | '\'' | '"'));
        (!v.is_empty()).then_some(v)
    }

    /// A quoted value, no escapes inside.
    fn eat_quoted(&mut self, quote: char) -> Option<&'s str> {
        let v = self.eat_while(|c| c != quote);
        (self.eat() == quote).then_some(v)
    }
}

fn is_key_start(c: char) -> bool {
    c.is_ascii_alphabetic() || matches!(c, '_' | ':')
}

fn is_key(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | ':' | '.' | '-')
}
