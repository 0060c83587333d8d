//! Span-preserving rewrites of the metadata store.
//!
//! Retained entries are copied from the source byte-for-byte together with
//! their leading trivia. Only separators are regenerated: one comma between
//! entries, plus a trailing comma when the store already used that style.
//! Replacements rewrite only the record's own fields inside the entry.

use crate::error::StoreError;
use crate::parse::{ParsedStore, StoreEntry, Value, line_indent};
use crate::record::SeoRecord;
use crate::render::{Layout, field_literals, render_entry};
use std::ops::Range;
use std::collections::{HashMap, HashSet};

/// Inserts, replacements and removals to apply to one store.
#[derive(Debug, Clone, Default)]
pub struct StoreEdits {
    inserts: Vec<(String, SeoRecord)>,
    replacements: Vec<(String, SeoRecord)>,
    removals: Vec<String>,
}

impl StoreEdits {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a new record before the closing brace.
    pub fn insert(&mut self, key: impl Into<String>, record: SeoRecord) -> &mut Self {
        self.inserts.push((key.into(), record));
        self
    }

    /// Replace an existing record in place.
    pub fn replace(&mut self, key: impl Into<String>, record: SeoRecord) -> &mut Self {
        self.replacements.push((key.into(), record));
        self
    }

    /// Excise an existing record.
    pub fn remove(&mut self, key: impl Into<String>) -> &mut Self {
        self.removals.push(key.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.inserts.is_empty() && self.replacements.is_empty() && self.removals.is_empty()
    }
}

/// Result of applying [`StoreEdits`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rewrite {
    pub text: String,
    pub inserted: Vec<String>,
    pub replaced: Vec<String>,
    /// Keys whose entries were excised, in store order.
    pub removed: Vec<String>,
    /// Keys slated for removal that had no entry.
    pub not_removed: Vec<String>,
    /// Keys slated for replacement that had no entry or were removed.
    pub not_replaced: Vec<String>,
    /// Record entries in the rewritten store.
    pub record_count: usize,
    pub changed: bool,
}

enum Piece<'a> {
    Kept {
        entry: &'a StoreEntry,
        body: Option<String>,
    },
    Inserted(String),
}

/// Apply `edits` to `store`, producing the new source text.
///
/// Inserting a key the store already holds (or inserting it twice) is a
/// [`StoreError::DuplicateKey`]; nothing is produced in that case.
pub fn rewrite(store: &ParsedStore, edits: &StoreEdits) -> Result<Rewrite, StoreError> {
    let source = store.source();
    let layout = store.layout();

    let removals: HashSet<&str> = edits.removals.iter().map(String::as_str).collect();
    let mut not_removed = Vec::new();
    let mut seen = HashSet::new();
    for key in &edits.removals {
        if seen.insert(key.as_str()) && !store.contains(key) {
            tracing::debug!(key = %key, "no entry to remove");
            not_removed.push(key.clone());
        }
    }

    let mut replacements: HashMap<&str, &SeoRecord> = HashMap::new();
    let mut not_replaced = Vec::new();
    for (key, record) in &edits.replacements {
        if store.contains(key) && !removals.contains(key.as_str()) {
            replacements.insert(key.as_str(), record);
        } else {
            not_replaced.push(key.clone());
        }
    }

    let mut pieces = Vec::with_capacity(store.entries().len() + edits.inserts.len());
    let mut removed = Vec::new();
    let mut replaced = Vec::new();
    for entry in store.entries() {
        match entry.key() {
            Some(key) if removals.contains(key) => removed.push(key.to_string()),
            Some(key) => {
                let body = replacements.get(key).map(|record| {
                    replaced.push(key.to_string());
                    resync_body(source, entry, key, record, &layout)
                });
                pieces.push(Piece::Kept { entry, body });
            }
            None => pieces.push(Piece::Kept { entry, body: None }),
        }
    }

    let mut inserted = Vec::with_capacity(edits.inserts.len());
    let mut inserted_keys = HashSet::new();
    for (key, record) in &edits.inserts {
        if let Some(entry) = store.entry(key) {
            return Err(StoreError::DuplicateKey {
                key: key.clone(),
                offset: entry.body.start,
            });
        }
        if !inserted_keys.insert(key.as_str()) {
            return Err(StoreError::DuplicateKey {
                key: key.clone(),
                offset: store.close(),
            });
        }
        pieces.push(Piece::Inserted(render_entry(key, record, &layout)));
        inserted.push(key.clone());
    }

    let trailing_comma = store.trailing_comma();
    let mut out = String::with_capacity(source.len() + inserted.len() * 256);
    out.push_str(&source[..=store.open()]);

    let count = pieces.len();
    for (idx, piece) in pieces.iter().enumerate() {
        let separated = idx + 1 < count || trailing_comma;
        match piece {
            Piece::Kept { entry, body } => {
                out.push_str(&source[entry.leading.clone()]);
                match body {
                    Some(text) => out.push_str(text),
                    None => out.push_str(&source[entry.body.clone()]),
                }
                if entry.separator.is_some() {
                    out.push_str(&source[entry.pre_separator.clone()]);
                    if separated {
                        out.push(',');
                    }
                    out.push_str(&source[entry.separator_tail.clone()]);
                } else if separated {
                    out.push(',');
                }
            }
            Piece::Inserted(text) => {
                out.push('\n');
                out.push_str(&layout.entry_indent);
                out.push_str(text);
                if separated {
                    out.push(',');
                }
            }
        }
    }

    let tail = &source[store.tail()];
    if !inserted.is_empty() && !tail.contains('\n') {
        // `{}` written on one line: move the closing brace to its own line.
        out.push('\n');
        out.push_str(&line_indent(source, store.open()));
        out.push_str(tail.trim_start());
    } else {
        out.push_str(tail);
    }
    out.push_str(&source[store.close()..]);

    let record_count = store.record_count() - removed.len() + inserted.len();
    let changed = out != source;
    tracing::debug!(
        inserted = inserted.len(),
        replaced = replaced.len(),
        removed = removed.len(),
        not_removed = not_removed.len(),
        changed,
        "rewrote metadata store"
    );

    Ok(Rewrite {
        text: out,
        inserted,
        replaced,
        removed,
        not_removed,
        not_replaced,
        record_count,
        changed,
    })
}

/// Replacement text for `entry`'s body. The values of the record fields are
/// spliced in place; other properties and comments stay as written. Missing
/// record fields are appended after the last property. Values that are not
/// a non-empty object literal are rendered from scratch.
fn resync_body(
    source: &str,
    entry: &StoreEntry,
    key: &str,
    record: &SeoRecord,
    layout: &Layout,
) -> String {
    let Value::Object(fields) = &entry.value else {
        return render_entry(key, record, layout);
    };
    let Some(last) = fields.last() else {
        return render_entry(key, record, layout);
    };

    let indent = line_indent(source, last.span.start);
    let mut splices: Vec<(Range<usize>, String)> = Vec::new();
    let mut appended = String::new();
    for (name, literal) in field_literals(record) {
        match entry.value.property(name) {
            Some(field) => splices.push((field.span.clone(), literal)),
            None => appended.push_str(&format!(",\n{indent}{name}: {literal}")),
        }
    }
    if !appended.is_empty() {
        splices.push((last.span.end..last.span.end, appended));
    }
    splices.sort_by_key(|(span, _)| span.start);

    let mut out = String::with_capacity(entry.body.len() + 64);
    let mut cursor = entry.body.start;
    for (span, text) in splices {
        out.push_str(&source[cursor..span.start]);
        out.push_str(&text);
        cursor = span.end;
    }
    out.push_str(&source[cursor..entry.body.end]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const STORE: &str = "export const seoConfig = {\n  home: {\n    title: 'Home',\n    description: 'Home page',\n    keywords: ['home'],\n    canonicalUrl: 'https://example.com/',\n  },\n  'legacy-offer': {\n    title: 'Legacy }, offer',\n    description: 'Old',\n    keywords: [],\n    canonicalUrl: 'https://example.com/legacy-offer',\n  },\n};\n\nexport default seoConfig;\n";

    fn record(title: &str, url: &str) -> SeoRecord {
        SeoRecord {
            title: title.to_string(),
            description: "Generated".to_string(),
            keywords: vec!["generated".to_string()],
            canonical_url: url.to_string(),
        }
    }

    #[test]
    fn empty_edits_reproduce_source() {
        let store = ParsedStore::parse(STORE, "seoConfig").expect("store should parse");
        let result = rewrite(&store, &StoreEdits::new()).expect("rewrite should succeed");
        assert_eq!(result.text, STORE);
        assert!(!result.changed);
        assert_eq!(result.record_count, 2);
    }

    #[test]
    fn removal_excises_exactly_one_entry() {
        let store = ParsedStore::parse(STORE, "seoConfig").expect("store should parse");
        let mut edits = StoreEdits::new();
        edits.remove("legacy-offer");
        let result = rewrite(&store, &edits).expect("rewrite should succeed");
        assert_eq!(
            result.text,
            "export const seoConfig = {\n  home: {\n    title: 'Home',\n    description: 'Home page',\n    keywords: ['home'],\n    canonicalUrl: 'https://example.com/',\n  },\n};\n\nexport default seoConfig;\n"
        );
        assert_eq!(result.removed, vec!["legacy-offer"]);
        assert!(result.not_removed.is_empty());
        assert_eq!(result.record_count, 1);
    }

    #[test]
    fn unknown_removal_is_counted_not_removed() {
        let store = ParsedStore::parse(STORE, "seoConfig").expect("store should parse");
        let mut edits = StoreEdits::new();
        edits.remove("ghost").remove("ghost");
        let result = rewrite(&store, &edits).expect("rewrite should succeed");
        assert_eq!(result.text, STORE);
        assert!(result.removed.is_empty());
        assert_eq!(result.not_removed, vec!["ghost"]);
    }

    #[test]
    fn insertion_without_trailing_comma_style() {
        let source = "const seoConfig = {\n  home: { title: 'Home' }\n};\n";
        let store = ParsedStore::parse(source, "seoConfig").expect("store should parse");
        let mut edits = StoreEdits::new();
        edits.insert("about", record("About", "https://example.com/about"));
        let result = rewrite(&store, &edits).expect("rewrite should succeed");
        assert_eq!(
            result.text,
            "const seoConfig = {\n  home: { title: 'Home' },\n  'about': {\n    title: 'About',\n    description: 'Generated',\n    keywords: ['generated'],\n    canonicalUrl: 'https://example.com/about',\n  }\n};\n"
        );
    }

    #[test]
    fn insertion_into_one_line_empty_store() {
        let source = "export const seoConfig = {};\n";
        let store = ParsedStore::parse(source, "seoConfig").expect("store should parse");
        let mut edits = StoreEdits::new();
        edits.insert("about", record("About", "https://example.com/about"));
        let result = rewrite(&store, &edits).expect("rewrite should succeed");
        assert_eq!(
            result.text,
            "export const seoConfig = {\n  'about': {\n    title: 'About',\n    description: 'Generated',\n    keywords: ['generated'],\n    canonicalUrl: 'https://example.com/about',\n  },\n};\n"
        );
        assert_eq!(result.record_count, 1);
    }

    #[test]
    fn removing_the_last_entry_drops_its_separator_cleanly() {
        let source = "const seoConfig = {\n  a: { title: 'A' },\n  b: { title: 'B' }\n};";
        let store = ParsedStore::parse(source, "seoConfig").expect("store should parse");
        let mut edits = StoreEdits::new();
        edits.remove("b");
        let result = rewrite(&store, &edits).expect("rewrite should succeed");
        assert_eq!(result.text, "const seoConfig = {\n  a: { title: 'A' }\n};");
    }

    #[test]
    fn replacement_keeps_position_and_neighbours() {
        let store = ParsedStore::parse(STORE, "seoConfig").expect("store should parse");
        let mut edits = StoreEdits::new();
        edits.replace("home", record("Home | Brand", "https://example.com/"));
        let result = rewrite(&store, &edits).expect("rewrite should succeed");
        assert_eq!(result.replaced, vec!["home"]);
        assert!(result.text.starts_with(
            "export const seoConfig = {\n  home: {\n    title: 'Home | Brand',\n"
        ));
        let legacy_start = STORE.find("  'legacy-offer'").expect("legacy entry");
        assert!(result.text.ends_with(&STORE[legacy_start..]));
    }

    #[test]
    fn inserting_an_existing_key_is_rejected() {
        let store = ParsedStore::parse(STORE, "seoConfig").expect("store should parse");
        let mut edits = StoreEdits::new();
        edits.insert("home", record("Home", "https://example.com/"));
        match rewrite(&store, &edits) {
            Err(StoreError::DuplicateKey { key, .. }) => assert_eq!(key, "home"),
            other => panic!("expected duplicate key, got {other:?}"),
        }
    }

    #[test]
    fn replacement_keeps_unmodelled_properties() {
        let source = "const seoConfig = {\n  about: {\n    title: 'Old', // hand-tuned\n    ogImage: '/img/about.png',\n    description: 'Old',\n    keywords: [],\n    canonicalUrl: 'https://example.com/about',\n    noindex: false,\n  },\n};\n";
        let store = ParsedStore::parse(source, "seoConfig").expect("store should parse");
        let mut edits = StoreEdits::new();
        edits.replace("about", record("About", "https://example.com/about"));
        let result = rewrite(&store, &edits).expect("rewrite should succeed");
        assert_eq!(
            result.text,
            "const seoConfig = {\n  about: {\n    title: 'About', // hand-tuned\n    ogImage: '/img/about.png',\n    description: 'Generated',\n    keywords: ['generated'],\n    canonicalUrl: 'https://example.com/about',\n    noindex: false,\n  },\n};\n"
        );

        let reparsed = ParsedStore::parse(result.text.as_str(), "seoConfig").expect("reparse");
        assert_eq!(
            reparsed.record("about"),
            Some(record("About", "https://example.com/about"))
        );
    }

    #[test]
    fn replacement_appends_missing_record_fields() {
        let source = "const seoConfig = {\n  about: {\n    title: 'Old',\n    ogImage: '/img/about.png'\n  },\n};\n";
        let store = ParsedStore::parse(source, "seoConfig").expect("store should parse");
        let mut edits = StoreEdits::new();
        edits.replace("about", record("About", "https://example.com/about"));
        let result = rewrite(&store, &edits).expect("rewrite should succeed");
        assert_eq!(
            result.text,
            "const seoConfig = {\n  about: {\n    title: 'About',\n    ogImage: '/img/about.png',\n    description: 'Generated',\n    keywords: ['generated'],\n    canonicalUrl: 'https://example.com/about'\n  },\n};\n"
        );
    }

    #[test]
    fn replacement_of_a_non_object_renders_from_scratch() {
        let source = "const seoConfig = {\n  about: defaults,\n};\n";
        let store = ParsedStore::parse(source, "seoConfig").expect("store should parse");
        let mut edits = StoreEdits::new();
        edits.replace("about", record("About", "https://example.com/about"));
        let result = rewrite(&store, &edits).expect("rewrite should succeed");
        assert!(result.text.starts_with("const seoConfig = {\n  'about': {\n    title: 'About',\n"));
    }
}
