//! One sync run: read both inputs, reconcile, rewrite, write once.

use crate::config::{KeyMatchPolicy, SyncConfig};
use crate::error::{ConfigError, SyncError};
use crate::page_key::{KeyDeriver, PageKey};
use crate::reconcile::{AllowList, Reconciliation, SyncMode, reconcile};
use crate::sitemap::{SitemapIndex, read_sitemap};
use crate::synthesize::Synthesizer;
use seosync_store::{
    ParsedStore, Rewrite, StoreEdits, StoreError, read_text, rewrite, write_text_atomically,
};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

/// Validated, ready-to-use configuration for [`sync_text`].
#[derive(Debug, Clone)]
pub struct SyncContext {
    pub deriver: KeyDeriver,
    pub allow_list: AllowList,
    pub synthesizer: Synthesizer,
    pub binding: String,
    pub on_key_match: KeyMatchPolicy,
}

impl SyncContext {
    pub fn from_config(config: &SyncConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            deriver: config.key_deriver()?,
            allow_list: config.allow_list()?,
            synthesizer: Synthesizer::new(config.synthesis.clone()),
            binding: config.binding.clone(),
            on_key_match: config.on_key_match,
        })
    }
}

/// Input file locations for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncPaths {
    pub sitemap: PathBuf,
    pub store: PathBuf,
}

impl SyncPaths {
    /// Configured paths, relative ones joined onto `root`.
    pub fn resolve(config: &SyncConfig, root: &Path) -> Self {
        Self {
            sitemap: root.join(&config.sitemap),
            store: root.join(&config.store),
        }
    }
}

/// Outcome of [`sync_text`]. Nothing has been written yet.
#[derive(Debug, Clone)]
pub struct TextSync {
    pub sitemap: SitemapIndex,
    /// Store record keys usable as page keys, in store order.
    pub existing: Vec<PageKey>,
    /// Store record keys that are not valid page keys. Never removed.
    pub skipped_store_keys: Vec<String>,
    /// Reconciliation restricted to the run's mode.
    pub plan: Reconciliation,
    pub rewrite: Rewrite,
}

/// Reconcile `store_text` against `sitemap_text` without touching disk.
pub fn sync_text(
    sitemap_text: &str,
    store_text: &str,
    ctx: &SyncContext,
    mode: SyncMode,
) -> Result<TextSync, StoreError> {
    let sitemap = read_sitemap(sitemap_text, &ctx.deriver);
    let store = ParsedStore::parse(store_text, &ctx.binding)?;

    let mut existing = Vec::with_capacity(store.record_count());
    let mut skipped_store_keys = Vec::new();
    for key in store.existing_keys() {
        match PageKey::new(key) {
            Ok(key) => existing.push(key),
            Err(err) => {
                tracing::warn!(key, reason = err.reason, "leaving store key that is not a page key");
                skipped_store_keys.push(key.to_string());
            }
        }
    }

    let plan = reconcile(sitemap.keys(), &existing, &ctx.allow_list).restrict(mode);

    let mut edits = StoreEdits::new();
    for key in &plan.to_add {
        let url = sitemap.url_for(key).unwrap_or_default();
        tracing::debug!(key = %key, url, "adding record");
        edits.insert(key.as_str(), ctx.synthesizer.synthesize(key, url));
    }
    for key in &plan.to_remove {
        tracing::debug!(key = %key, "removing record");
        edits.remove(key.as_str());
    }
    if ctx.on_key_match == KeyMatchPolicy::Resync && mode.adds() {
        for key in existing.iter().filter(|key| sitemap.contains(key)) {
            let url = sitemap.url_for(key).unwrap_or_default();
            let fresh = ctx.synthesizer.synthesize(key, url);
            if store.record(key.as_str()).as_ref() != Some(&fresh) {
                tracing::debug!(key = %key, "resyncing record");
                edits.replace(key.as_str(), fresh);
            }
        }
    }

    let rewrite = rewrite(&store, &edits)?;
    Ok(TextSync {
        sitemap,
        existing,
        skipped_store_keys,
        plan,
        rewrite,
    })
}

/// Machine-readable summary of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncReport {
    pub mode: SyncMode,
    pub sitemap_path: String,
    pub store_path: String,
    pub sitemap_locs: usize,
    pub sitemap_keys: usize,
    pub rejected_urls: usize,
    pub duplicate_urls: usize,
    pub existing_records: usize,
    pub added: Vec<String>,
    pub removed: Vec<String>,
    pub not_removed: Vec<String>,
    pub resynced: Vec<String>,
    pub skipped_store_keys: Vec<String>,
    pub remaining: usize,
    pub changed: bool,
    pub written: bool,
    pub dry_run: bool,
    pub store_digest_before: String,
    pub store_digest_after: String,
}

/// Run one sync against files on disk. Every failure happens before the
/// store is written; the store is written at most once.
pub fn run_sync(
    ctx: &SyncContext,
    paths: &SyncPaths,
    mode: SyncMode,
    dry_run: bool,
) -> Result<SyncReport, SyncError> {
    let sitemap_text = read_text(&paths.sitemap).map_err(|source| SyncError::Read {
        label: "sitemap",
        path: paths.sitemap.clone(),
        source,
    })?;
    let store_text = read_text(&paths.store).map_err(|source| SyncError::Read {
        label: "store",
        path: paths.store.clone(),
        source,
    })?;

    let outcome =
        sync_text(&sitemap_text, &store_text, ctx, mode).map_err(|source| SyncError::Store {
            path: paths.store.clone(),
            source,
        })?;
    let rewrite = &outcome.rewrite;

    let written = rewrite.changed && !dry_run;
    if written {
        write_text_atomically(&paths.store, &rewrite.text).map_err(|source| {
            SyncError::Write {
                path: paths.store.clone(),
                source,
            }
        })?;
    }

    tracing::info!(
        mode = ?mode,
        added = rewrite.inserted.len(),
        removed = rewrite.removed.len(),
        resynced = rewrite.replaced.len(),
        remaining = rewrite.record_count,
        written,
        dry_run,
        "sync finished"
    );

    Ok(SyncReport {
        mode,
        sitemap_path: paths.sitemap.display().to_string(),
        store_path: paths.store.display().to_string(),
        sitemap_locs: outcome.sitemap.loc_count,
        sitemap_keys: outcome.sitemap.len(),
        rejected_urls: outcome.sitemap.rejected.len(),
        duplicate_urls: outcome.sitemap.duplicates.len(),
        existing_records: outcome.existing.len() + outcome.skipped_store_keys.len(),
        added: rewrite.inserted.clone(),
        removed: rewrite.removed.clone(),
        not_removed: rewrite.not_removed.clone(),
        resynced: rewrite.replaced.clone(),
        skipped_store_keys: outcome.skipped_store_keys.clone(),
        remaining: rewrite.record_count,
        changed: rewrite.changed,
        written,
        dry_run,
        store_digest_before: text_digest(&store_text),
        store_digest_after: text_digest(&rewrite.text),
    })
}

fn text_digest(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    format!("sha256:{:x}", hasher.finalize())
}
