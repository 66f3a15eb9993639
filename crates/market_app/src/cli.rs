use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use market_core::{QueryMode, SortKey};

#[derive(Debug, Parser)]
#[command(
    name = "module-market",
    version,
    about = "Extract marketplace module listings and slice them with filter profiles"
)]
pub struct Cli {
    /// RON file with engine settings (timings, selectors, market URL).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory holding `profiles.ron` [default: platform data dir].
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Also write logs to ./market.log.
    #[arg(long, global = true)]
    pub log_file: bool,

    /// More log output (-v debug, -vv trace).
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run one search and print the filtered listings.
    Search(SearchArgs),
    /// Manage saved filter profiles.
    #[command(subcommand)]
    Profiles(ProfileCommand),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    Ancestor,
    Trigger,
}

impl From<ModeArg> for QueryMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Ancestor => QueryMode::Ancestor,
            ModeArg::Trigger => QueryMode::Trigger,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SortArg {
    PriceAsc,
    PriceDesc,
    NameAsc,
    NameDesc,
}

impl From<SortArg> for SortKey {
    fn from(sort: SortArg) -> Self {
        match sort {
            SortArg::PriceAsc => SortKey::PriceAsc,
            SortArg::PriceDesc => SortKey::PriceDesc,
            SortArg::NameAsc => SortKey::NameAsc,
            SortArg::NameDesc => SortKey::NameDesc,
        }
    }
}

#[derive(Debug, Clone, Default, Args)]
pub struct SearchArgs {
    /// Module type / category to select on the market page.
    #[arg(long = "type", default_value = "Ancestor")]
    pub module_type: String,

    /// Free-text module name query; also filters the results.
    #[arg(long, default_value = "")]
    pub name: String,

    #[arg(long, default_value = "")]
    pub platform: String,

    /// Load this saved profile instead of the mode's default.
    #[arg(long)]
    pub profile: Option<String>,

    /// Force the query mode instead of detecting it from the records.
    #[arg(long, value_enum)]
    pub mode: Option<ModeArg>,

    #[arg(long, value_enum)]
    pub sort: Option<SortArg>,

    /// Case-insensitive seller name substring.
    #[arg(long)]
    pub seller: Option<String>,

    #[arg(long)]
    pub min_price: Option<f64>,

    #[arg(long)]
    pub max_price: Option<f64>,

    /// Seller status to keep (repeatable), e.g. `--status Online`.
    #[arg(long = "status")]
    pub statuses: Vec<String>,

    /// Save the resulting facets as a new profile once the search ends.
    #[arg(long)]
    pub save_as: Option<String>,

    /// Retry a failed search this many times.
    #[arg(long, default_value_t = 0)]
    pub retries: u32,

    /// Stop the search after this many seconds, keeping what was collected.
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Run the browser with a visible window.
    #[arg(long)]
    pub show_browser: bool,

    #[arg(long)]
    pub settle_ms: Option<u64>,

    #[arg(long)]
    pub poll_ms: Option<u64>,

    /// Print at most this many rows.
    #[arg(long)]
    pub limit: Option<usize>,

    /// Print the visible records as JSON instead of a table.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Clone, Copy, Args)]
pub struct ModeScope {
    /// Profile collection to operate on.
    #[arg(long, value_enum, default_value_t = ModeArg::Ancestor)]
    pub mode: ModeArg,
}

#[derive(Debug, Subcommand)]
pub enum ProfileCommand {
    /// List profile names; the default is marked with `*`.
    List {
        #[command(flatten)]
        scope: ModeScope,
    },
    /// Print a profile's facet state as RON.
    Show {
        name: String,
        #[command(flatten)]
        scope: ModeScope,
    },
    Delete {
        name: String,
        #[command(flatten)]
        scope: ModeScope,
    },
    Rename {
        from: String,
        to: String,
        #[command(flatten)]
        scope: ModeScope,
    },
    SetDefault {
        name: String,
        #[command(flatten)]
        scope: ModeScope,
    },
    ClearDefault {
        #[command(flatten)]
        scope: ModeScope,
    },
    /// Create a profile from a RON facet-state file.
    Import {
        name: String,
        file: PathBuf,
        /// Replace an existing profile with the same name.
        #[arg(long)]
        overwrite: bool,
        #[command(flatten)]
        scope: ModeScope,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn search_flags_parse() {
        let cli = Cli::try_parse_from([
            "module-market",
            "search",
            "--type",
            "Trigger",
            "--name",
            "Inferno",
            "--sort",
            "price-desc",
            "--status",
            "Online",
            "--status",
            "Offline",
            "--data-dir",
            "/tmp/market",
        ])
        .unwrap();
        assert_eq!(cli.data_dir, Some(PathBuf::from("/tmp/market")));
        let Command::Search(args) = cli.command else {
            panic!("expected search");
        };
        assert_eq!(args.module_type, "Trigger");
        assert_eq!(args.name, "Inferno");
        assert_eq!(args.sort, Some(SortArg::PriceDesc));
        assert_eq!(args.statuses, vec!["Online", "Offline"]);
        assert_eq!(args.retries, 0);
    }

    #[test]
    fn profile_commands_default_to_ancestor_scope() {
        let cli = Cli::try_parse_from(["module-market", "profiles", "set-default", "Cheap"]).unwrap();
        match cli.command {
            Command::Profiles(ProfileCommand::SetDefault { name, scope }) => {
                assert_eq!(name, "Cheap");
                assert_eq!(scope.mode, ModeArg::Ancestor);
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
