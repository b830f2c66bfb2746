//! **concord** - Search engine for aligned bilingual corpora
//!
//! Regex queries over OPUS-style alignment dumps with context windows,
//! record-aware translation joins and frequency statistics. The corpus is
//! reparsed per query; nothing persists between runs.

/// Command-line interface with clap integration
pub mod cli;

/// Shell completion generation
pub mod completion;

/// Core query pipeline - corpus in, typed result rows out
pub mod core {
    /// Corpus loading and line classification
    pub mod corpus;
    pub use corpus::{Corpus, Line, ReadError, Role, Side, Tag};

    /// Token metadata splitting for parsed corpora
    pub mod annot;
    pub use annot::{TokenAnnot, TokenTriples, split_annotated, split_triples};

    /// Regex match location and file-provenance resolution
    pub mod locate;
    pub use locate::{FileId, Hit, compile_pattern, locate};

    /// Record segmentation and shape classification
    pub mod segment;
    pub use segment::{Record, RecordId, RecordShape};

    /// Context windows around matches
    pub mod window;
    pub use window::{BilContextRow, MonoContextRow, bilingual_context, mono_context};

    /// Per-query metadata index for parsed corpora
    pub mod record_index;
    pub use record_index::RecordIndex;

    /// Frequency aggregation over resolved matches
    pub mod stats;
    pub use stats::{FreqEntry, FreqTable, StatsBuilder};

    /// Query orchestration
    pub mod search;
    pub use search::{Mode, QueryError, QueryOutput, QueryParams, run as search_run, run_query};
}

/// Infrastructure - Configuration, I/O, and result writing
pub mod infra {
    /// Layered configuration with TOML support
    pub mod config;
    pub use config::{Config, init as config_init, load_config};

    /// Smart corpus reading (mmap over threshold)
    pub mod io;
    pub use io::{FileContent, read_file_smart, split_lines};

    /// Result rendering and file writing
    pub mod report;
    pub use report::{CorpusMeta, write_results};
}

// Strategic re-exports for clean CLI and library use
pub use cli::{AppContext, Cli, Commands};
pub use self::core::{
    Corpus, FileId, FreqTable, Hit, Mode, QueryError, QueryOutput, QueryParams, Record,
    RecordIndex, RecordShape, Side, run_query,
};
pub use self::infra::{Config, CorpusMeta, load_config};
