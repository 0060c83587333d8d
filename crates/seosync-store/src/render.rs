//! TypeScript rendering for new and resynchronized records.

use crate::record::SeoRecord;

/// Indentation observed in (or defaulted for) a store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    /// Indentation before each entry key.
    pub entry_indent: String,
    /// Indentation before each record field.
    pub field_indent: String,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            entry_indent: "  ".to_string(),
            field_indent: "    ".to_string(),
        }
    }
}

/// Render `text` as a single-quoted TypeScript string literal.
pub fn quote_single(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('\'');
    for ch in text.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{2028}' => out.push_str("\\u2028"),
            '\u{2029}' => out.push_str("\\u2029"),
            c => out.push(c),
        }
    }
    out.push('\'');
    out
}

/// Each record field as `(property name, rendered literal)`, in written order.
pub(crate) fn field_literals(record: &SeoRecord) -> [(&'static str, String); 4] {
    let keywords = record
        .keywords
        .iter()
        .map(|keyword| quote_single(keyword))
        .collect::<Vec<_>>()
        .join(", ");
    [
        ("title", quote_single(&record.title)),
        ("description", quote_single(&record.description)),
        ("keywords", format!("[{keywords}]")),
        ("canonicalUrl", quote_single(&record.canonical_url)),
    ]
}

/// Render one `'key': { ... }` entry without leading indentation or comma.
pub fn render_entry(key: &str, record: &SeoRecord, layout: &Layout) -> String {
    let mut out = format!("{}: {{\n", quote_single(key));
    for (name, literal) in field_literals(record) {
        out.push_str(&format!("{}{name}: {literal},\n", layout.field_indent));
    }
    out.push_str(&layout.entry_indent);
    out.push('}');
    out
}
