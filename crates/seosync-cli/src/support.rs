use crate::cli::StoreArgs;
use seosync_core::{DEFAULT_CONFIG_FILE, SyncConfig, SyncContext, SyncPaths};
use serde::Serialize;
use std::path::{Path, PathBuf};

pub const KEY_SAMPLE_LIMIT: usize = 25;

/// Everything a command needs to touch the sitemap and the store.
pub struct Workspace {
    pub ctx: SyncContext,
    pub paths: SyncPaths,
}

pub fn load_workspace_or_exit(args: &StoreArgs) -> Workspace {
    let (config, root) = load_config_or_exit(args);
    let ctx = SyncContext::from_config(&config).unwrap_or_else(|e| {
        eprintln!("error: {e}");
        std::process::exit(1);
    });

    let mut paths = SyncPaths::resolve(&config, &root);
    if let Some(sitemap) = &args.sitemap {
        paths.sitemap = PathBuf::from(sitemap);
    }
    if let Some(store) = &args.store {
        paths.store = PathBuf::from(store);
    }
    tracing::debug!(
        sitemap = %paths.sitemap.display(),
        store = %paths.store.display(),
        "resolved input paths"
    );
    Workspace { ctx, paths }
}

fn load_config_or_exit(args: &StoreArgs) -> (SyncConfig, PathBuf) {
    let loaded = match &args.config {
        Some(path) => {
            let path = PathBuf::from(path);
            let root = args
                .root
                .as_deref()
                .map(PathBuf::from)
                .unwrap_or_else(|| parent_dir(&path));
            SyncConfig::load(&path).map(|config| (config, root))
        }
        None => {
            let root = PathBuf::from(args.root.as_deref().unwrap_or("."));
            SyncConfig::load_or_default(root.join(DEFAULT_CONFIG_FILE)).map(|config| (config, root))
        }
    };
    loaded.unwrap_or_else(|e| {
        eprintln!("error: {e}");
        std::process::exit(1);
    })
}

fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

pub fn print_json_or_exit<T: Serialize>(payload: &T, label: &str) {
    let rendered = serde_json::to_string_pretty(payload).unwrap_or_else(|e| {
        eprintln!("error: failed to render {label} payload: {e}");
        std::process::exit(1);
    });
    println!("{rendered}");
}

pub fn sample_with_truncation<T>(items: Vec<T>, limit: usize) -> (Vec<T>, usize) {
    let total = items.len();
    let sample: Vec<T> = items.into_iter().take(limit).collect();
    let truncated = total.saturating_sub(sample.len());
    (sample, truncated)
}

pub fn print_sample_block(header: &str, items: &[String]) {
    let (sample, truncated) = sample_with_truncation(items.to_vec(), KEY_SAMPLE_LIMIT);
    if sample.is_empty() {
        return;
    }

    println!("  {header} (showing up to {}):", sample.len());
    for item in &sample {
        println!("    - {item}");
    }
    if truncated > 0 {
        println!("    - ... and {truncated} more");
    }
}

pub fn yes_no(ok: bool) -> &'static str {
    if ok { "yes" } else { "no" }
}
