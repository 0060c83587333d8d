use crate::cli::StoreArgs;
use crate::support::{load_workspace_or_exit, print_json_or_exit, print_sample_block};
use seosync_core::{PageKey, read_sitemap};
use seosync_store::{read_existing_keys, read_text};
use serde_json::json;
use std::path::Path;

fn read_or_exit(label: &str, path: &Path) -> String {
    read_text(path).unwrap_or_else(|e| {
        eprintln!("error: failed to read {label} at {}: {e}", path.display());
        std::process::exit(1);
    })
}

pub fn run(args: StoreArgs) {
    let workspace = load_workspace_or_exit(&args);
    let sitemap_text = read_or_exit("sitemap", &workspace.paths.sitemap);
    let store_text = read_or_exit("store", &workspace.paths.store);

    let sitemap = read_sitemap(&sitemap_text, &workspace.ctx.deriver);
    let store_keys = read_existing_keys(&store_text, &workspace.ctx.binding).unwrap_or_else(|e| {
        eprintln!("error: {}: {e}", workspace.paths.store.display());
        std::process::exit(1);
    });

    let sitemap_keys: Vec<String> = sitemap.keys().map(PageKey::to_string).collect();
    let missing: Vec<String> = sitemap_keys
        .iter()
        .filter(|key| !store_keys.contains(key))
        .cloned()
        .collect();
    let extra: Vec<String> = store_keys
        .iter()
        .filter(|key| {
            PageKey::new(key.as_str()).is_ok_and(|key| {
                !sitemap.contains(&key) && !workspace.ctx.allow_list.contains(&key)
            })
        })
        .cloned()
        .collect();

    if args.json {
        let payload = json!({
            "sitemapPath": workspace.paths.sitemap.display().to_string(),
            "storePath": workspace.paths.store.display().to_string(),
            "sitemapKeys": sitemap
                .entries()
                .iter()
                .map(|entry| json!({ "key": entry.key, "url": entry.url }))
                .collect::<Vec<_>>(),
            "storeKeys": store_keys,
            "rejectedUrls": sitemap.rejected,
            "duplicateUrls": sitemap.duplicates,
            "missingFromStore": missing,
            "notInSitemap": extra,
        });
        print_json_or_exit(&payload, "seo-keys");
        return;
    }

    println!(
        "[seo-keys] sitemap={} store={} missing={} extra={}",
        sitemap_keys.len(),
        store_keys.len(),
        missing.len(),
        extra.len(),
    );
    print_sample_block("sitemap keys", &sitemap_keys);
    print_sample_block("store keys", &store_keys);
    print_sample_block("missing from store", &missing);
    print_sample_block("not in sitemap", &extra);
    print_sample_block("rejected urls", &sitemap.rejected);
}
