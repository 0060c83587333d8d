//! Structural parse of the metadata store.
//!
//! The store is located by its binding (`export const seoConfig = {`), then
//! the object literal is tokenized and walked entry by entry. Each entry keeps
//! byte spans for its leading trivia, body, and separator so that rewrites
//! can splice whole entries without re-rendering their neighbours.
//!
//! Code after the closing brace is never tokenized.

use crate::error::StoreError;
use crate::lexer::{Lexer, Token, TokenKind};
use crate::record::SeoRecord;
use crate::render::Layout;
use std::collections::HashMap;
use std::ops::Range;

/// A parsed value. Only the shapes a metadata record uses are decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Str(String),
    Array(Vec<Value>),
    Object(Vec<Field>),
    /// Any other expression, kept as its source span.
    Raw(Range<usize>),
}

/// One `key: value` property of an object literal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub key: String,
    pub value: Value,
    /// Source span of the value alone.
    pub span: Range<usize>,
}

impl Value {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(text) => Some(text),
            _ => None,
        }
    }

    /// Look up an object field. Later duplicates win, as in JavaScript.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.property(name).map(|field| &field.value)
    }

    /// Like [`Value::field`], with the value's source span.
    pub fn property(&self, name: &str) -> Option<&Field> {
        match self {
            Self::Object(fields) => fields.iter().rev().find(|field| field.key == name),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryKind {
    Record { key: String },
    /// `...expr`; preserved verbatim, never a page record.
    Spread,
}

/// One entry of the store object literal with its source layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreEntry {
    pub kind: EntryKind,
    /// Whitespace and comments between the previous entry and this one.
    pub leading: Range<usize>,
    /// Key through the end of the value.
    pub body: Range<usize>,
    /// Trivia between the value and its comma. Empty without a separator.
    pub pre_separator: Range<usize>,
    /// Byte offset of the comma after this entry, if any.
    pub separator: Option<usize>,
    /// Same-line trivia after the comma, e.g. a trailing comment.
    pub separator_tail: Range<usize>,
    pub value: Value,
}

impl StoreEntry {
    pub fn key(&self) -> Option<&str> {
        match &self.kind {
            EntryKind::Record { key } => Some(key),
            EntryKind::Spread => None,
        }
    }

    /// Offset just past everything that belongs to this entry.
    pub fn end(&self) -> usize {
        if self.separator.is_some() {
            self.separator_tail.end
        } else {
            self.body.end
        }
    }
}

/// The store source plus the structure of its object literal.
#[derive(Debug, Clone)]
pub struct ParsedStore {
    source: String,
    open: usize,
    close: usize,
    entries: Vec<StoreEntry>,
    index: HashMap<String, usize>,
}

impl ParsedStore {
    /// Parse `source`, locating the object literal bound to `binding`.
    pub fn parse(source: impl Into<String>, binding: &str) -> Result<Self, StoreError> {
        let source = source.into();
        let open = locate_open_brace(&source, binding)?;

        let mut parser = Parser {
            source: &source,
            lexer: Lexer::at(&source, open + 1),
            peeked: None,
            binding,
            open,
        };
        let (entries, close) = parser.entries()?;

        let mut index = HashMap::with_capacity(entries.len());
        for (idx, entry) in entries.iter().enumerate() {
            if let Some(key) = entry.key()
                && index.insert(key.to_string(), idx).is_some()
            {
                return Err(StoreError::DuplicateKey {
                    key: key.to_string(),
                    offset: entry.body.start,
                });
            }
        }

        tracing::debug!(
            binding,
            entries = entries.len(),
            records = index.len(),
            "parsed metadata store"
        );

        Ok(Self {
            source,
            open,
            close,
            entries,
            index,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Offset of the object literal's opening brace.
    pub fn open(&self) -> usize {
        self.open
    }

    /// Offset of the object literal's closing brace.
    pub fn close(&self) -> usize {
        self.close
    }

    pub fn entries(&self) -> &[StoreEntry] {
        &self.entries
    }

    /// Record keys in written order.
    pub fn existing_keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().filter_map(StoreEntry::key)
    }

    pub fn record_count(&self) -> usize {
        self.index.len()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    pub fn entry(&self, key: &str) -> Option<&StoreEntry> {
        self.index.get(key).map(|idx| &self.entries[*idx])
    }

    /// Decode the record stored under `key`, if it has the record shape.
    pub fn record(&self, key: &str) -> Option<SeoRecord> {
        self.entry(key)
            .and_then(|entry| SeoRecord::from_value(&entry.value))
    }

    /// Whether the last entry is followed by a comma. Empty stores count as
    /// trailing-comma style.
    pub fn trailing_comma(&self) -> bool {
        self.entries
            .last()
            .is_none_or(|entry| entry.separator.is_some())
    }

    /// Trivia between the last entry and the closing brace.
    pub fn tail(&self) -> Range<usize> {
        let start = self
            .entries
            .last()
            .map_or(self.open + 1, StoreEntry::end);
        start..self.close
    }

    /// Indentation used by existing entries, for rendering new ones.
    pub fn layout(&self) -> Layout {
        let base = line_indent(&self.source, self.open);
        let first = self
            .entries
            .iter()
            .find(|entry| matches!(entry.kind, EntryKind::Record { .. }));

        let entry_indent = first
            .and_then(|entry| trailing_indent(&self.source[entry.leading.clone()]))
            .unwrap_or_else(|| format!("{base}  "));
        let field_indent = first
            .and_then(|entry| first_field_indent(&self.source[entry.body.clone()]))
            .unwrap_or_else(|| format!("{entry_indent}  "));

        Layout {
            entry_indent,
            field_indent,
        }
    }
}

/// Record keys of the store bound to `binding`, in written order.
pub fn read_existing_keys(source: &str, binding: &str) -> Result<Vec<String>, StoreError> {
    let store = ParsedStore::parse(source, binding)?;
    Ok(store.existing_keys().map(str::to_string).collect())
}

/// Find `const|let|var <binding>` by walking tokens, so declarations inside
/// comments, strings and templates never match.
fn locate_open_brace(source: &str, binding: &str) -> Result<usize, StoreError> {
    let mut lexer = Lexer::new(source);
    let mut after_declarator = false;
    while let Some(token) = lexer.next_token()? {
        match &token.kind {
            TokenKind::Ident(name) if after_declarator && name == binding => {
                if let Some(open) = initializer_brace(source, token.span.end)? {
                    return Ok(open);
                }
                after_declarator = false;
            }
            TokenKind::Ident(name) => {
                after_declarator = matches!(name.as_str(), "const" | "let" | "var");
            }
            _ => after_declarator = false,
        }
    }
    Err(StoreError::AnchorNotFound {
        binding: binding.to_string(),
    })
}

/// Walk past an optional type annotation to `=` and return the offset of the
/// `{` that follows it.
fn initializer_brace(source: &str, from: usize) -> Result<Option<usize>, StoreError> {
    let mut lexer = Lexer::at(source, from);
    let mut depth = 0usize;
    while let Some(token) = lexer.next_token()? {
        match token.kind {
            TokenKind::Punct('{' | '[' | '(' | '<') => depth += 1,
            TokenKind::Punct('}' | ']' | ')' | '>') => {
                if depth == 0 {
                    return Ok(None);
                }
                depth -= 1;
            }
            TokenKind::Punct('=') if depth == 0 => {
                let next = lexer.next_token()?;
                return Ok(next.filter(|t| t.is_punct('{')).map(|t| t.span.start));
            }
            TokenKind::Punct(';') if depth == 0 => return Ok(None),
            _ => {}
        }
    }
    Ok(None)
}

struct Parser<'a> {
    source: &'a str,
    lexer: Lexer<'a>,
    peeked: Option<Token>,
    binding: &'a str,
    open: usize,
}

impl Parser<'_> {
    fn peek(&mut self) -> Result<Option<Token>, StoreError> {
        if self.peeked.is_none() {
            self.peeked = self.lexer.next_token()?;
        }
        Ok(self.peeked.clone())
    }

    fn next(&mut self) -> Result<Option<Token>, StoreError> {
        match self.peeked.take() {
            Some(token) => Ok(Some(token)),
            None => self.lexer.next_token(),
        }
    }

    /// Everything parsed lives inside the store literal, so running out of
    /// input always means its closing brace is missing.
    fn expect_next(&mut self) -> Result<Token, StoreError> {
        self.next()?.ok_or_else(|| self.unterminated())
    }

    fn unterminated(&self) -> StoreError {
        StoreError::Unterminated {
            binding: self.binding.to_string(),
            open: self.open,
        }
    }

    fn entries(&mut self) -> Result<(Vec<StoreEntry>, usize), StoreError> {
        let mut entries = Vec::new();
        let mut cursor = self.open + 1;

        loop {
            let token = self.expect_next()?;
            if token.is_punct('}') {
                return Ok((entries, token.span.start));
            }

            let body_start = token.span.start;
            let kind = if token.kind == TokenKind::Spread {
                EntryKind::Spread
            } else {
                let key = property_key(&token)?;
                self.expect_punct(':', "expected `:` after key")?;
                EntryKind::Record { key }
            };
            let (value, value_span) = self.value()?;
            let body_end = value_span.end;

            let mut entry = StoreEntry {
                kind,
                leading: cursor..body_start,
                body: body_start..body_end,
                pre_separator: body_end..body_end,
                separator: None,
                separator_tail: body_end..body_end,
                value,
            };

            let after = self.expect_next()?;
            if after.is_punct('}') {
                entries.push(entry);
                return Ok((entries, after.span.start));
            }
            if !after.is_punct(',') {
                return Err(StoreError::syntax(
                    after.span.start,
                    "expected `,` or `}` after entry",
                ));
            }

            let comma = after.span.start;
            let limit = self
                .peek()?
                .map_or(self.source.len(), |next| next.span.start);
            let tail_end = separator_tail_end(self.source, comma + 1, limit);
            entry.pre_separator = body_end..comma;
            entry.separator = Some(comma);
            entry.separator_tail = comma + 1..tail_end;
            cursor = tail_end;
            entries.push(entry);
        }
    }

    fn expect_punct(&mut self, ch: char, message: &str) -> Result<Token, StoreError> {
        let token = self.expect_next()?;
        if token.is_punct(ch) {
            Ok(token)
        } else {
            Err(StoreError::syntax(token.span.start, message))
        }
    }

    fn value(&mut self) -> Result<(Value, Range<usize>), StoreError> {
        let first = self.expect_next()?;
        let start = first.span.start;
        let (value, end) = match first.kind {
            TokenKind::Punct('{') => self.object()?,
            TokenKind::Punct('[') => self.array()?,
            TokenKind::Str(text) => (Value::Str(text), first.span.end),
            TokenKind::Punct(',' | '}' | ']' | ')') => {
                return Err(StoreError::syntax(start, "expected a value"));
            }
            TokenKind::Punct('(') => {
                let end = self.skip_expression(first.span.end, 1)?;
                return Ok((Value::Raw(start..end), start..end));
            }
            _ => {
                let end = self.skip_expression(first.span.end, 0)?;
                return Ok((Value::Raw(start..end), start..end));
            }
        };

        // `'a' + b`, `[...] as const` and the like continue as expressions.
        if !self.at_terminator()? {
            let end = self.skip_expression(end, 0)?;
            return Ok((Value::Raw(start..end), start..end));
        }
        Ok((value, start..end))
    }

    fn at_terminator(&mut self) -> Result<bool, StoreError> {
        let token = self.peek()?.ok_or_else(|| self.unterminated())?;
        Ok(matches!(token.kind, TokenKind::Punct(',' | '}' | ']' | ')')))
    }

    /// Consume tokens up to the next `,`, `}`, `]` or `)` at depth zero and
    /// return the end of the last consumed token.
    fn skip_expression(&mut self, mut end: usize, mut depth: usize) -> Result<usize, StoreError> {
        loop {
            let token = self.peek()?.ok_or_else(|| self.unterminated())?;
            match token.kind {
                TokenKind::Punct(',' | '}' | ']' | ')') if depth == 0 => return Ok(end),
                TokenKind::Punct('{' | '[' | '(') => depth += 1,
                TokenKind::Punct('}' | ']' | ')') => depth -= 1,
                _ => {}
            }
            self.next()?;
            end = token.span.end;
        }
    }

    fn object(&mut self) -> Result<(Value, usize), StoreError> {
        let mut fields = Vec::new();
        loop {
            let token = self.expect_next()?;
            if token.is_punct('}') {
                return Ok((Value::Object(fields), token.span.end));
            }
            if token.kind == TokenKind::Spread {
                self.value()?;
            } else {
                let key = property_key(&token)?;
                self.expect_punct(':', "expected `:` after property key")?;
                let (value, span) = self.value()?;
                fields.push(Field { key, value, span });
            }

            let separator = self.expect_next()?;
            if separator.is_punct('}') {
                return Ok((Value::Object(fields), separator.span.end));
            }
            if !separator.is_punct(',') {
                return Err(StoreError::syntax(
                    separator.span.start,
                    "expected `,` or `}` in object",
                ));
            }
        }
    }

    fn array(&mut self) -> Result<(Value, usize), StoreError> {
        let mut items = Vec::new();
        loop {
            if let Some(token) = self.peek()?
                && token.is_punct(']')
            {
                self.next()?;
                return Ok((Value::Array(items), token.span.end));
            }
            let (value, _) = self.value()?;
            items.push(value);

            let separator = self.expect_next()?;
            if separator.is_punct(']') {
                return Ok((Value::Array(items), separator.span.end));
            }
            if !separator.is_punct(',') {
                return Err(StoreError::syntax(
                    separator.span.start,
                    "expected `,` or `]` in array",
                ));
            }
        }
    }
}

fn property_key(token: &Token) -> Result<String, StoreError> {
    match &token.kind {
        TokenKind::Ident(name) | TokenKind::Number(name) | TokenKind::Str(name) => {
            Ok(name.clone())
        }
        TokenKind::Punct('[') => Err(StoreError::syntax(
            token.span.start,
            "computed keys are not supported",
        )),
        _ => Err(StoreError::syntax(token.span.start, "expected a property key")),
    }
}

/// End of the trivia after a comma that stays on the comma's line. Stops at
/// the first newline outside a block comment.
fn separator_tail_end(source: &str, from: usize, limit: usize) -> usize {
    let mut pos = from;
    while pos < limit {
        let rest = &source[pos..limit];
        if rest.starts_with('\n') {
            return pos;
        }
        if rest.starts_with("//") {
            return pos + rest.find('\n').unwrap_or(rest.len());
        }
        if rest.starts_with("/*") {
            pos += rest[2..].find("*/").map_or(rest.len(), |end| end + 4);
            continue;
        }
        pos += rest.chars().next().map_or(1, char::len_utf8);
    }
    limit
}

/// Indentation of the line containing `offset`.
pub(crate) fn line_indent(source: &str, offset: usize) -> String {
    let line_start = source[..offset].rfind('\n').map_or(0, |idx| idx + 1);
    source[line_start..]
        .chars()
        .take_while(|c| *c == ' ' || *c == '\t')
        .collect()
}

fn trailing_indent(trivia: &str) -> Option<String> {
    let idx = trivia.rfind('\n')?;
    let tail = &trivia[idx + 1..];
    tail.chars()
        .all(|c| c == ' ' || c == '\t')
        .then(|| tail.to_string())
}

fn first_field_indent(body: &str) -> Option<String> {
    let line = body.lines().nth(1)?;
    let indent: String = line
        .chars()
        .take_while(|c| *c == ' ' || *c == '\t')
        .collect();
    (!indent.is_empty() && indent.len() < line.len()).then_some(indent)
}

#[cfg(test)]
mod tests {
    use super::*;

    const STORE: &str = r#"import type { SeoData } from './types';

export const seoConfig: Record<string, SeoData> = {
  home: {
    title: 'Home | D-Secure Tech',
    description: "Braces { and } and 'quotes' inside text",
    keywords: ['home', 'erasure'],
    canonicalUrl: 'https://example.com/',
  },
  'pricing-plans': {
    title: `Pricing ${'plans'}`,
    description: 'Plans',
    keywords: [],
    canonicalUrl: 'https://example.com/pricing/plans',
  }, // reviewed
  ...extraPages,
};

export const getSeo = (key: string) => ({ ...defaults, ...seoConfig[key] });
"#;

    #[test]
    fn parses_entries_in_written_order() {
        let store = ParsedStore::parse(STORE, "seoConfig").expect("store should parse");
        assert_eq!(
            store.existing_keys().collect::<Vec<_>>(),
            vec!["home", "pricing-plans"]
        );
        assert_eq!(store.entries().len(), 3);
        assert_eq!(store.entries()[2].kind, EntryKind::Spread);
        assert_eq!(&STORE[store.close()..store.close() + 2], "};");
        assert!(store.trailing_comma());
    }

    #[test]
    fn decodes_records_with_braces_in_text() {
        let store = ParsedStore::parse(STORE, "seoConfig").expect("store should parse");
        let home = store.record("home").expect("home should decode");
        assert_eq!(home.description, "Braces { and } and 'quotes' inside text");
        assert_eq!(home.keywords, vec!["home", "erasure"]);
        assert_eq!(home.canonical_url, "https://example.com/");

        // Template titles are raw expressions, so the record shape is incomplete.
        assert!(store.contains("pricing-plans"));
        assert!(store.record("pricing-plans").is_none());
    }

    #[test]
    fn separator_tail_keeps_same_line_comment() {
        let store = ParsedStore::parse(STORE, "seoConfig").expect("store should parse");
        let pricing = store.entry("pricing-plans").expect("entry");
        assert_eq!(&STORE[pricing.separator_tail.clone()], " // reviewed");
        let spread = &store.entries()[2];
        assert_eq!(&STORE[spread.leading.clone()], "\n  ");
        assert_eq!(&STORE[spread.body.clone()], "...extraPages");
    }

    #[test]
    fn layout_follows_existing_indentation() {
        let store = ParsedStore::parse(STORE, "seoConfig").expect("store should parse");
        let layout = store.layout();
        assert_eq!(layout.entry_indent, "  ");
        assert_eq!(layout.field_indent, "    ");
    }

    #[test]
    fn missing_binding_is_anchor_not_found() {
        match ParsedStore::parse(STORE, "pageMeta") {
            Err(StoreError::AnchorNotFound { binding }) => assert_eq!(binding, "pageMeta"),
            other => panic!("expected anchor-not-found, got {other:?}"),
        }
    }

    #[test]
    fn missing_closing_brace_is_unterminated() {
        let source = "export const seoConfig = {\n  home: { title: 'Home' },\n";
        match ParsedStore::parse(source, "seoConfig") {
            Err(StoreError::Unterminated { open, .. }) => assert_eq!(open, 25),
            other => panic!("expected unterminated store, got {other:?}"),
        }
    }

    #[test]
    fn duplicate_keys_are_rejected() {
        let source = "const seoConfig = { home: {}, 'home': {} };";
        match ParsedStore::parse(source, "seoConfig") {
            Err(StoreError::DuplicateKey { key, offset }) => {
                assert_eq!(key, "home");
                assert_eq!(offset, 30);
            }
            other => panic!("expected duplicate key, got {other:?}"),
        }
    }

    #[test]
    fn empty_store_parses() {
        let store = ParsedStore::parse("export const seoConfig = {};\n", "seoConfig")
            .expect("empty store should parse");
        assert_eq!(store.record_count(), 0);
        assert!(store.trailing_comma());
        assert_eq!(store.tail(), 26..26);
    }

    #[test]
    fn read_existing_keys_lists_keys() {
        let keys = read_existing_keys(STORE, "seoConfig").expect("keys");
        assert_eq!(keys, vec!["home".to_string(), "pricing-plans".to_string()]);
    }

    #[test]
    fn declarations_in_comments_and_strings_are_not_the_store() {
        let source = "// Previously: const seoConfig = {} lived in pages.ts\n/* let seoConfig = { */\nconst note = 'var seoConfig = {';\nexport const seoConfig = {\n  home: { title: 'Home' },\n};\n";
        let store = ParsedStore::parse(source, "seoConfig").expect("store should parse");
        assert_eq!(store.open(), source.find("= {\n  home").expect("real declaration") + 2);
        assert_eq!(store.existing_keys().collect::<Vec<_>>(), vec!["home"]);
    }

    #[test]
    fn commented_out_declaration_alone_is_anchor_not_found() {
        let source = "// export const seoConfig = { home: {} };\nexport const other = {};\n";
        assert!(matches!(
            ParsedStore::parse(source, "seoConfig"),
            Err(StoreError::AnchorNotFound { .. })
        ));
    }

    #[test]
    fn arrow_types_in_the_annotation_are_balanced() {
        let source = "export const seoConfig: { [k: string]: () => Meta } = {\n  home: { title: 'Home' },\n};\n";
        let store = ParsedStore::parse(source, "seoConfig").expect("store should parse");
        assert_eq!(store.existing_keys().collect::<Vec<_>>(), vec!["home"]);
    }
}
