//! # seosync-store
//!
//! Storage layer for the SEO metadata store: a TypeScript source file that
//! binds one object literal mapping page keys to SEO records, followed by
//! arbitrary trailing code.
//!
//! This crate provides:
//! - a lexer for the object-literal subset of TypeScript (`lexer`)
//! - a structural parser that records byte spans per entry (`parse`)
//! - the `SeoRecord` type and its decoding from parsed values (`record`)
//! - single-quoted TypeScript rendering of new records (`render`)
//! - span-preserving insert/replace/remove rewrites (`rewrite`)
//! - UTF-8 validated reads and atomic writes (`fs`)
//!
//! It knows nothing about sitemaps or reconciliation policy. Those live in
//! `seosync-core`.
//!
//! ## Data model
//!
//! ```text
//! seo.ts (on disk)
//!     ↕  read_text / write_text_atomically
//! ParsedStore (source text + entry spans)
//!     ↓  rewrite(StoreEdits)
//! Rewrite (new text, untouched entries byte-for-byte)
//! ```

pub mod error;
pub mod fs;
pub mod lexer;
pub mod parse;
pub mod record;
pub mod render;
pub mod rewrite;

pub use error::StoreError;
pub use fs::{read_text, write_text_atomically};
pub use parse::{EntryKind, Field, ParsedStore, StoreEntry, Value, read_existing_keys};
pub use record::SeoRecord;
pub use render::{Layout, quote_single, render_entry};
pub use rewrite::{Rewrite, StoreEdits, rewrite};
