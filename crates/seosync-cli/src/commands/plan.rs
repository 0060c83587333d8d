use crate::cli::StoreArgs;
use crate::commands::sync::print_report;
use crate::support::{load_workspace_or_exit, print_json_or_exit};
use seosync_core::{SyncMode, run_sync};

pub fn run(args: StoreArgs, mode: SyncMode) {
    let workspace = load_workspace_or_exit(&args);
    let report = run_sync(&workspace.ctx, &workspace.paths, mode, true).unwrap_or_else(|e| {
        eprintln!("error: {e}");
        std::process::exit(1);
    });

    if args.json {
        print_json_or_exit(&report, "seo-plan");
    } else {
        print_report("seo-plan", &report);
        if report.changed {
            println!("  dry run: store not written");
        }
    }
}
