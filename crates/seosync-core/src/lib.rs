//! # seosync core
//!
//! Keeps the SEO metadata store's key set in agreement with the sitemap.
//!
//! ## Architecture
//!
//! ```text
//! sitemap.xml ──► read_sitemap ──┐
//!                (KeyDeriver)    ├─► reconcile(AllowList) ─► to_add ─► Synthesizer ─┐
//! seo.ts ─────► ParsedStore ─────┘                          to_remove ─────────────┤
//!                                                                                   ▼
//!                                                              rewrite ─► write once
//! ```
//!
//! Everything up to the final write is pure: [`sync::sync_text`] takes the two
//! documents as strings and returns the new store text plus a report.

pub mod config;
pub mod error;
pub mod page_key;
pub mod reconcile;
pub mod sitemap;
pub mod sync;
pub mod synthesize;

pub use config::{DEFAULT_CONFIG_FILE, KeyMatchPolicy, SyncConfig};
pub use error::{ConfigError, SyncError};
pub use page_key::{InvalidPageKey, KeyDeriver, PageKey};
pub use reconcile::{AllowList, Reconciliation, SyncMode, reconcile};
pub use sitemap::{SitemapEntry, SitemapIndex, read_sitemap, read_sitemap_keys};
pub use sync::{SyncContext, SyncPaths, SyncReport, TextSync, run_sync, sync_text};
pub use synthesize::{SynthesisConfig, Synthesizer};
