use clap::{Args, Parser, Subcommand, ValueEnum};
use seosync_core::SyncMode;

#[derive(Parser)]
#[command(
    name = "seosync",
    about = "seosync: keep the SEO metadata store in agreement with the sitemap",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Add records for new sitemap pages and remove records for pages that are gone
    Sync {
        #[command(flatten)]
        args: StoreArgs,
    },

    /// Only add records for sitemap pages missing from the store
    Add {
        #[command(flatten)]
        args: StoreArgs,
    },

    /// Only remove records whose page left the sitemap
    Remove {
        #[command(flatten)]
        args: StoreArgs,
    },

    /// Show what a run would change without writing the store
    Plan {
        /// Which changes to plan
        #[arg(long, value_enum, default_value = "sync")]
        mode: ModeArg,

        #[command(flatten)]
        args: StoreArgs,
    },

    /// List derived sitemap keys and existing store keys
    Keys {
        #[command(flatten)]
        args: StoreArgs,
    },
}

#[derive(Args, Clone, Debug)]
pub struct StoreArgs {
    /// Path to seosync.toml (defaults are used when the default file is absent)
    #[arg(long)]
    pub config: Option<String>,

    /// Directory configured paths are relative to (default: the config file's directory)
    #[arg(long)]
    pub root: Option<String>,

    /// Sitemap path, overriding the config
    #[arg(long)]
    pub sitemap: Option<String>,

    /// Metadata store path, overriding the config
    #[arg(long)]
    pub store: Option<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum ModeArg {
    #[value(name = "sync")]
    Sync,
    #[value(name = "add")]
    Add,
    #[value(name = "remove")]
    Remove,
}

impl From<ModeArg> for SyncMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Sync => SyncMode::Sync,
            ModeArg::Add => SyncMode::AddOnly,
            ModeArg::Remove => SyncMode::RemoveOnly,
        }
    }
}
