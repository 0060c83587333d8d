//! The SEO metadata record held per page key.

use crate::parse::Value;

/// Metadata for one page, as stored in the metadata store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeoRecord {
    pub title: String,
    pub description: String,
    pub keywords: Vec<String>,
    pub canonical_url: String,
}

impl SeoRecord {
    /// Decode a parsed object value. Returns `None` unless `title`,
    /// `description` and `canonicalUrl` are string literals and `keywords`
    /// is an array of string literals.
    pub fn from_value(value: &Value) -> Option<Self> {
        let keywords = match value.field("keywords")? {
            Value::Array(items) => items
                .iter()
                .map(|item| item.as_str().map(str::to_string))
                .collect::<Option<Vec<_>>>()?,
            _ => return None,
        };

        Some(Self {
            title: value.field("title")?.as_str()?.to_string(),
            description: value.field("description")?.as_str()?.to_string(),
            keywords,
            canonical_url: value.field("canonicalUrl")?.as_str()?.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::parse::Field;

    fn string(text: &str) -> Value {
        Value::Str(text.to_string())
    }

    fn object(fields: Vec<(&str, Value)>) -> Value {
        Value::Object(
            fields
                .into_iter()
                .map(|(key, value)| Field {
                    key: key.to_string(),
                    value,
                    span: 0..0,
                })
                .collect(),
        )
    }

    #[test]
    fn decodes_complete_record() {
        let value = object(vec![
            ("title", string("About")),
            ("description", string("About us")),
            (
                "keywords",
                Value::Array(vec![string("about"), string("team")]),
            ),
            ("canonicalUrl", string("https://example.com/about")),
            ("ogImage", Value::Raw(0..4)),
        ]);
        let record = SeoRecord::from_value(&value).expect("record should decode");
        assert_eq!(record.title, "About");
        assert_eq!(record.keywords, vec!["about", "team"]);
        assert_eq!(record.canonical_url, "https://example.com/about");
    }

    #[test]
    fn rejects_non_literal_keywords() {
        let value = object(vec![
            ("title", string("About")),
            ("description", string("About us")),
            (
                "keywords",
                Value::Array(vec![string("about"), Value::Raw(10..20)]),
            ),
            ("canonicalUrl", string("https://example.com/about")),
        ]);
        assert!(SeoRecord::from_value(&value).is_none());
    }

    #[test]
    fn rejects_missing_canonical_url() {
        let value = object(vec![
            ("title", string("About")),
            ("description", string("About us")),
            ("keywords", Value::Array(Vec::new())),
        ]);
        assert!(SeoRecord::from_value(&value).is_none());
    }
}
