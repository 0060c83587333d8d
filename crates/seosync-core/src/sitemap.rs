//! Sitemap reading.
//!
//! `<loc>` markers are located directly rather than parsing the document as
//! XML. A document without them yields an empty index; the sitemap is
//! produced by the same build, so that is not treated as an error.

use crate::page_key::{KeyDeriver, PageKey};
use regex::Regex;
use std::collections::{BTreeSet, HashMap};

/// One `<loc>` URL and the key derived from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SitemapEntry {
    pub url: String,
    pub key: PageKey,
}

/// Deduplicated sitemap keys in first-encounter order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SitemapIndex {
    entries: Vec<SitemapEntry>,
    positions: HashMap<PageKey, usize>,
    /// `<loc>` nodes seen, including rejected and duplicate ones.
    pub loc_count: usize,
    /// URLs whose key derivation was rejected.
    pub rejected: Vec<String>,
    /// URLs whose key was already claimed by an earlier URL.
    pub duplicates: Vec<String>,
}

impl SitemapIndex {
    pub fn entries(&self) -> &[SitemapEntry] {
        &self.entries
    }

    pub fn keys(&self) -> impl Iterator<Item = &PageKey> {
        self.entries.iter().map(|entry| &entry.key)
    }

    pub fn contains(&self, key: &PageKey) -> bool {
        self.positions.contains_key(key)
    }

    /// The first URL that produced `key`.
    pub fn url_for(&self, key: &PageKey) -> Option<&str> {
        self.positions
            .get(key)
            .map(|idx| self.entries[*idx].url.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn push(&mut self, url: String, key: PageKey) {
        if self.positions.contains_key(&key) {
            tracing::debug!(url = %url, key = %key, "duplicate sitemap key");
            self.duplicates.push(url);
            return;
        }
        self.positions.insert(key.clone(), self.entries.len());
        self.entries.push(SitemapEntry { url, key });
    }
}

/// Read every `<loc>` URL of `text` into a key index.
pub fn read_sitemap(text: &str, deriver: &KeyDeriver) -> SitemapIndex {
    let re = Regex::new(r"(?is)<loc\b[^>]*>(.*?)</loc\s*>").expect("loc regex");
    let mut index = SitemapIndex::default();
    for captures in re.captures_iter(text) {
        index.loc_count += 1;
        let url = decode_text(captures.get(1).map_or("", |m| m.as_str()));
        match deriver.derive_key(&url) {
            Some(key) => index.push(url, key),
            None => {
                tracing::debug!(url = %url, "skipping sitemap URL without a page key");
                index.rejected.push(url);
            }
        }
    }
    index
}

/// Set-valued form of [`read_sitemap`].
pub fn read_sitemap_keys(text: &str, deriver: &KeyDeriver) -> BTreeSet<PageKey> {
    read_sitemap(text, deriver).keys().cloned().collect()
}

/// Trim, unwrap CDATA, and decode XML character references.
fn decode_text(raw: &str) -> String {
    let trimmed = raw.trim();
    if let Some(inner) = trimmed
        .strip_prefix("<![CDATA[")
        .and_then(|rest| rest.strip_suffix("]]>"))
    {
        return inner.trim().to_string();
    }

    let mut out = String::with_capacity(trimmed.len());
    let mut rest = trimmed;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp..];
        match tail.find(';').and_then(|end| {
            decode_reference(&tail[1..end]).map(|decoded| (decoded, end))
        }) {
            Some((decoded, end)) => {
                out.push(decoded);
                rest = &tail[end + 1..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn decode_reference(name: &str) -> Option<char> {
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        _ => {
            let number = name.strip_prefix('#')?;
            let code = match number.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => number.parse().ok()?,
            };
            char::from_u32(code)
        }
    }
}
