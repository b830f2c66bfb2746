use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Shared application context for global flags
#[derive(Clone, Debug)]
pub struct AppContext {
    pub quiet: bool,    // global --quiet
    pub no_color: bool, // global --no-color
    pub dry_run: bool,  // global --dry-run
}

#[derive(Parser)]
#[command(name = "concord")]
#[command(
    about = "A fast CLI for searching aligned bilingual corpora with context windows and frequency statistics"
)]
#[command(version, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Suppress progress output and non-essential messages
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Run the query but write no result files
    #[arg(long, global = true)]
    pub dry_run: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Search an alignment file with a regular expression
    Search(SearchArgs),

    /// Initialize a concord.toml config file
    Init(InitArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    /// Search one side only
    Mono,
    /// Search the source side and join the target side per record
    Bilingual,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SideArg {
    /// Source-language lines
    Src,
    /// Target-language lines
    Trg,
}

#[derive(Parser)]
pub struct SearchArgs {
    /// Alignment file to search (e.g. alignments_en_fr_1000_parsed.txt)
    pub corpus: PathBuf,

    /// Regular expression applied line-locally to the queried side
    pub regex: String,

    /// Language mode
    #[arg(long, value_enum, default_value_t = ModeArg::Bilingual)]
    pub mode: ModeArg,

    /// Side to search in monolingual mode
    #[arg(long, value_enum, default_value_t = SideArg::Src)]
    pub side: SideArg,

    /// Case-insensitive matching
    #[arg(short = 'i', long)]
    pub ignore_case: bool,

    /// Lines of pre-context (config default if omitted)
    #[arg(long)]
    pub pre: Option<usize>,

    /// Lines of post-context (config default if omitted)
    #[arg(long)]
    pub post: Option<usize>,

    /// Keep (src)=/(trg)= tags in context output
    #[arg(long)]
    pub keep_annotations: bool,

    /// Bilingual statistics: group by all source lines of the record
    #[arg(long)]
    pub aggregate_src: bool,

    /// Skip the frequency statistics file
    #[arg(long)]
    pub no_stats: bool,

    /// Skip the context files
    #[arg(long)]
    pub no_context: bool,

    /// Treat the corpus as parsed/unparsed, overriding filename sniffing
    #[arg(long, action = clap::ArgAction::Set)]
    pub parsed: Option<bool>,

    /// Directory for result files
    #[arg(short, long)]
    pub out_dir: Option<PathBuf>,

    /// Emit the full query output as JSON (single line)
    #[arg(long)]
    pub json: bool,
}

#[derive(Parser)]
pub struct InitArgs {
    /// Directory to initialize config in
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Overwrite existing config file
    #[arg(long)]
    pub force: bool,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

#[derive(Parser)]
pub struct CompletionsArgs {
    /// Target shell
    #[arg(value_enum)]
    pub shell: Shell,

    /// Output directory; if omitted and --stdout not set, prints error
    #[arg(long)]
    pub out_dir: Option<PathBuf>,

    /// Print completion script to stdout instead of a file
    #[arg(long)]
    pub stdout: bool,
}
