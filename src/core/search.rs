//! Query orchestration: one corpus pass per query.
//!
//! `run_query` is the library entry point: load → locate → segment/window/
//! index → aggregate, all in memory, nothing shared between queries. The
//! CLI-facing [`run`] wraps it with filename sniffing, result writing and
//! status output. Zero matches is a normal outcome carried in the output;
//! only unreadable corpora and malformed patterns abort a query.

use std::path::PathBuf;

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use tracing::{debug, info, instrument};

use crate::cli::{AppContext, ModeArg, SearchArgs, SideArg};
use crate::core::annot::TokenTriples;
use crate::core::corpus::{Corpus, ReadError, Side, strip_role_tag};
use crate::core::locate::{Hit, compile_pattern, locate};
use crate::core::record_index::RecordIndex;
use crate::core::segment::Record;
use crate::core::stats::{FreqTable, StatsBuilder};
use crate::core::window::{BilContextRow, MonoContextRow, bilingual_context, mono_context};
use crate::infra::config::load_config;
use crate::infra::report::{self, CorpusMeta};

/// Search scope: one side of the corpus, or both sides of each record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Monolingual(Side),
    Bilingual,
}

impl Mode {
    /// The side the regex is applied to. Bilingual queries anchor on the
    /// source side; the target side joins through the record.
    pub fn query_side(self) -> Side {
        match self {
            Mode::Monolingual(side) => side,
            Mode::Bilingual => Side::Source,
        }
    }
}

/// Parameters of one query, resolved from CLI flags and config defaults.
#[derive(Debug, Clone)]
pub struct QueryParams {
    pub pattern: String,
    pub ignore_case: bool,
    pub mode: Mode,
    pub pre: usize,
    pub post: usize,
    /// Keep `(src)=`/`(trg)=` tags in context output.
    pub keep_tags: bool,
    /// Bilingual statistics: widen the match key to all source lines of
    /// the record.
    pub aggregate_src: bool,
    /// Corpus carries inline token metadata.
    pub parsed: bool,
    pub want_stats: bool,
    pub want_context: bool,
}

/// Query failures that abort before anything is written.
#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    #[error(transparent)]
    Read(#[from] ReadError),

    #[error("invalid regular expression: {0}")]
    Pattern(#[from] regex::Error),
}

/// Everything a query produced, handed to the writers.
#[derive(Debug, serde::Serialize)]
pub struct QueryOutput {
    pub match_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mono_context: Option<Vec<MonoContextRow>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bil_context: Option<Vec<BilContextRow>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<FreqTable>,
}

/// Execute one query against a loaded corpus.
#[instrument(skip(corpus, params), fields(pattern = %params.pattern))]
pub fn run_query(corpus: &Corpus, params: &QueryParams) -> Result<QueryOutput, QueryError> {
    let re = compile_pattern(&params.pattern, params.ignore_case)?;
    let side = params.mode.query_side();

    let hits = locate(corpus, &re, side);
    info!(hits = hits.len(), "query located matches");

    if hits.is_empty() {
        return Ok(QueryOutput {
            match_count: 0,
            mono_context: None,
            bil_context: None,
            stats: None,
        });
    }

    let (mono_rows, bil_rows) = if params.want_context {
        match params.mode {
            Mode::Monolingual(side) => (
                Some(mono_context(
                    corpus,
                    &hits,
                    side,
                    params.pre,
                    params.post,
                    params.keep_tags,
                )),
                None,
            ),
            Mode::Bilingual => (
                None,
                Some(bilingual_context(
                    corpus,
                    &hits,
                    params.pre,
                    params.post,
                    params.keep_tags,
                )),
            ),
        }
    } else {
        (None, None)
    };

    let stats = params
        .want_stats
        .then(|| aggregate(corpus, &hits, params));

    Ok(QueryOutput {
        match_count: hits.len(),
        mono_context: mono_rows,
        bil_context: bil_rows,
        stats,
    })
}

/// Fold the hits into a frequency table per the query mode.
fn aggregate(corpus: &Corpus, hits: &[Hit], params: &QueryParams) -> FreqTable {
    let mut builder = StatsBuilder::new(params.pattern.clone());

    // Segment each hit once; the metadata index shares the records
    let entries: Vec<(Hit, Record)> = hits
        .iter()
        .map(|h| (h.clone(), Record::segment(corpus, h.pos)))
        .collect();

    let index = params
        .parsed
        .then(|| RecordIndex::build(corpus, &entries));

    for (hit, record) in &entries {
        match params.mode {
            Mode::Monolingual(_) => {
                let matched = strip_role_tag(&hit.text).to_string();
                let meta = index.as_ref().and_then(|idx| {
                    let tag = corpus.get(hit.pos)?.tag?;
                    let src = idx.triples(&hit.file_id, record.id, tag)?.clone();
                    Some((src, None))
                });
                builder.add(matched, None, &hit.file_id, meta);
            }
            Mode::Bilingual => {
                // Bilingual grouping needs a recognized record shape;
                // out-of-shape records are skipped, not fatal
                let Some(shape) = record.shape(corpus) else {
                    debug!(pos = hit.pos, "skipping match: unrecognized record shape");
                    continue;
                };

                let matched = if params.aggregate_src {
                    record.side_text(corpus, Side::Source, false)
                } else {
                    strip_role_tag(&hit.text).to_string()
                };
                let translation = record.side_text(corpus, Side::Target, false);

                let meta = index.as_ref().and_then(|idx| {
                    let tags = idx.tags(&hit.file_id, record.id)?;

                    let mut src = TokenTriples::default();
                    if params.aggregate_src {
                        for pos in shape.source_positions() {
                            if let Some(tag) = corpus.get(pos)?.tag
                                && let Some(t) = tags.get(&tag)
                            {
                                src.extend(t);
                            }
                        }
                    } else {
                        let tag = corpus.get(hit.pos)?.tag?;
                        src = tags.get(&tag)?.clone();
                    }

                    let mut trg = TokenTriples::default();
                    for pos in shape.target_positions() {
                        if let Some(tag) = corpus.get(pos)?.tag
                            && let Some(t) = tags.get(&tag)
                        {
                            trg.extend(t);
                        }
                    }

                    Some((src, Some(trg)))
                });

                builder.add(matched, Some(translation), &hit.file_id, meta);
            }
        }
    }

    builder.finalize()
}

/// Run the `search` command end-to-end.
pub fn run(args: SearchArgs, ctx: &AppContext) -> Result<()> {
    let cfg = load_config().unwrap_or_default();

    // Expand ~ and $VARs in the corpus path
    let corpus_path = PathBuf::from(
        shellexpand::full(&args.corpus.to_string_lossy())
            .context("failed to expand corpus path")?
            .into_owned(),
    );

    // Filename convention carries languages and the parsed/normal marker
    let meta = CorpusMeta::sniff(&corpus_path);
    let parsed = args.parsed.unwrap_or(meta.parsed);

    let mode = match args.mode {
        ModeArg::Mono => Mode::Monolingual(match args.side {
            SideArg::Src => Side::Source,
            SideArg::Trg => Side::Target,
        }),
        ModeArg::Bilingual => Mode::Bilingual,
    };

    let params = QueryParams {
        pattern: args.regex.clone(),
        ignore_case: args.ignore_case,
        mode,
        pre: args.pre.unwrap_or(cfg.search.pre_context),
        post: args.post.unwrap_or(cfg.search.post_context),
        keep_tags: args.keep_annotations || cfg.search.keep_annotations,
        aggregate_src: args.aggregate_src,
        parsed,
        want_stats: !args.no_stats,
        want_context: !args.no_context,
    };

    if !params.want_stats && !params.want_context {
        anyhow::bail!("nothing to do: both statistics and context are disabled");
    }

    let progress = if ctx.quiet {
        ProgressBar::hidden()
    } else {
        let pb = ProgressBar::new_spinner();
        pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}").unwrap());
        pb.set_message(format!("searching {}", corpus_path.display()));
        pb.enable_steady_tick(std::time::Duration::from_millis(80));
        pb
    };

    let corpus = Corpus::load(&corpus_path)?;
    let output = match run_query(&corpus, &params) {
        Ok(out) => out,
        Err(QueryError::Pattern(e)) => {
            progress.finish_and_clear();
            // Distinct user-visible state: the pattern, not the corpus
            anyhow::bail!("invalid regular expression: {e}");
        }
        Err(QueryError::Read(e)) => {
            progress.finish_and_clear();
            return Err(e).context("query aborted");
        }
    };

    progress.finish_and_clear();

    if args.json {
        println!("{}", serde_json::to_string(&output)?);
    }

    if output.match_count == 0 {
        // Distinct user-visible state: valid query, empty result
        if !ctx.quiet {
            eprintln!("{}", "no matches found".yellow());
        }
        return Ok(());
    }

    // Human-readable output stays off stdout in --json mode
    let chatty = !ctx.quiet && !args.json;

    if chatty {
        println!(
            "{} {} matches for {}",
            "✓".green(),
            output.match_count,
            params.pattern.bold()
        );
        if let Some(stats) = &output.stats {
            println!("{}", report::preview_table(stats, 10));
        }
    }

    if ctx.dry_run {
        if chatty {
            println!("{}", "DRY RUN: no result files written".yellow());
        }
        return Ok(());
    }

    let out_dir = args
        .out_dir
        .clone()
        .or(cfg.output_dir)
        .unwrap_or_else(|| PathBuf::from("."));
    std::fs::create_dir_all(&out_dir)
        .with_context(|| format!("failed to create output directory {}", out_dir.display()))?;

    let written = report::write_results(&out_dir, &output, &params, &meta)?;
    if chatty {
        for path in &written {
            println!("  {} {}", "wrote".dimmed(), path.display());
        }
    }

    Ok(())
}
