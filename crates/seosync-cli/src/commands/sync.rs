use crate::cli::StoreArgs;
use crate::support::{load_workspace_or_exit, print_json_or_exit, print_sample_block, yes_no};
use seosync_core::{SyncMode, SyncReport, run_sync};

pub fn run(args: StoreArgs, mode: SyncMode) {
    let workspace = load_workspace_or_exit(&args);
    let report = run_sync(&workspace.ctx, &workspace.paths, mode, false).unwrap_or_else(|e| {
        eprintln!("error: {e}");
        std::process::exit(1);
    });

    if args.json {
        print_json_or_exit(&report, "seo-sync");
    } else {
        print_report("seo-sync", &report);
    }
}

pub fn print_report(tag: &str, report: &SyncReport) {
    println!(
        "[{tag}] OK (mode={}, added={}, removed={}, not_removed={}, resynced={}, remaining={}, written={})",
        report.mode.as_str(),
        report.added.len(),
        report.removed.len(),
        report.not_removed.len(),
        report.resynced.len(),
        report.remaining,
        yes_no(report.written),
    );
    println!("  store: {}", report.store_path);
    println!(
        "  sitemap: {} (locs={}, keys={}, rejected={}, duplicates={})",
        report.sitemap_path,
        report.sitemap_locs,
        report.sitemap_keys,
        report.rejected_urls,
        report.duplicate_urls,
    );
    print_sample_block("added", &report.added);
    print_sample_block("removed", &report.removed);
    print_sample_block("not removed", &report.not_removed);
    print_sample_block("resynced", &report.resynced);
    print_sample_block("skipped store keys", &report.skipped_store_keys);
}
