//! Result rendering and file writing.
//!
//! Two renderings per query: a qualitative text file for close reading and
//! a quantitative CSV for downstream processing, plus a terminal preview of
//! the top frequency rows. Output paths are derived from the query mode,
//! the corpus languages and a sanitized form of the pattern, mirroring the
//! naming convention of the corpus dumps themselves
//! (`alignments_<l1>_<l2>_<n>_{parsed,normal}.txt`).
//!
//! Writes are atomic: content is assembled fully in memory, written to a
//! temp file in the target directory and persisted, so a failed query never
//! leaves a half-built result file behind.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use itertools::Itertools;
use tabled::builder::Builder as TableBuilder;
use tabled::settings::Style;

use crate::core::search::{Mode, QueryOutput, QueryParams};
use crate::core::stats::FreqTable;
use crate::core::window::{BilContextRow, MonoContextRow};

/// Languages and format sniffed from the corpus filename.
#[derive(Debug, Clone, Default)]
pub struct CorpusMeta {
    pub l1: Option<String>,
    pub l2: Option<String>,
    pub parsed: bool,
}

impl CorpusMeta {
    /// Parse `…_<l1>_<l2>_<n>[_parsed|_normal].txt`; anything that does not
    /// fit yields defaults (unknown languages, unparsed).
    pub fn sniff(path: &Path) -> CorpusMeta {
        let name = match path.file_name().and_then(|n| n.to_str()) {
            Some(n) => n,
            None => return CorpusMeta::default(),
        };

        // Compiled per call: sniffing happens once per query
        let re = regex::Regex::new(r"_([a-z]{2,3})_([a-z]{2,3})_(\d+)(?:_(parsed|normal))?\.txt$")
            .expect("corpus filename pattern");

        match re.captures(name) {
            Some(caps) => CorpusMeta {
                l1: Some(caps[1].to_string()),
                l2: Some(caps[2].to_string()),
                parsed: caps.get(4).map(|m| m.as_str()) == Some("parsed"),
            },
            None => CorpusMeta::default(),
        }
    }

    pub fn l1_label(&self) -> &str {
        self.l1.as_deref().unwrap_or("src")
    }

    pub fn l2_label(&self) -> &str {
        self.l2.as_deref().unwrap_or("trg")
    }

    /// Label of the side a monolingual query ran against.
    pub fn side_label(&self, mode: Mode) -> &str {
        use crate::core::corpus::Side;
        match mode {
            Mode::Monolingual(Side::Target) => self.l2_label(),
            _ => self.l1_label(),
        }
    }
}

/// Make a pattern safe for a filename: alphabetic patterns pass through,
/// anything else keeps only word characters and spaces; spaces become `_`.
fn sanitize_pattern(pattern: &str) -> String {
    let kept: String = if pattern.chars().all(|c| c.is_alphabetic()) {
        pattern.to_string()
    } else {
        pattern
            .chars()
            .filter(|c| c.is_alphanumeric() || *c == '_' || c.is_whitespace())
            .collect()
    };
    kept.replace(' ', "_")
}

/// Path for a statistics file: `{mode}_statistics_{l1}[_{l2}]_{pattern}.csv`.
pub fn stats_path(out_dir: &Path, pattern: &str, l1: &str, l2: Option<&str>) -> PathBuf {
    let name = match l2 {
        Some(l2) => format!("bilingual_statistics_{l1}_{l2}_{}.csv", sanitize_pattern(pattern)),
        None => format!("monolingual_statistics_{l1}_{}.csv", sanitize_pattern(pattern)),
    };
    out_dir.join(name)
}

/// Path for a context file:
/// `{mode}_context_{l1}[_{l2}]_{pattern}_pre_contextN_post_contextM.{txt,csv}`.
pub fn context_path(
    out_dir: &Path,
    pattern: &str,
    l1: &str,
    l2: Option<&str>,
    pre: usize,
    post: usize,
    qualitative: bool,
) -> PathBuf {
    let ext = if qualitative { "txt" } else { "csv" };
    let langs = match l2 {
        Some(l2) => format!("bilingual_context_{l1}_{l2}"),
        None => format!("monolingual_context_{l1}"),
    };
    out_dir.join(format!(
        "{langs}_{}_pre_context{pre}_post_context{post}.{ext}",
        sanitize_pattern(pattern)
    ))
}

// ---------------------------------------------------------------------------
// CSV primitives

/// Quote a CSV field when it carries a delimiter, quote or newline.
fn csv_field(value: &str) -> String {
    if value.contains(['"', ',', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

fn csv_row(fields: &[String]) -> String {
    fields.iter().map(|f| csv_field(f)).join(",")
}

fn join_files(files: &indexmap::IndexSet<String>) -> String {
    files.iter().join("; ")
}

// ---------------------------------------------------------------------------
// Qualitative text renderings

const MATCH_MARKER: &str = "\t<<<<<<<< MATCH";
const RULE: &str =
    "****************************************************************************************************";

/// Human-readable monolingual context: window, marked match, provenance.
pub fn render_mono_context_text(rows: &[MonoContextRow], pattern: &str) -> String {
    let mut out = String::new();
    for row in rows {
        out.push_str(&row.pre.join("\n"));
        out.push('\n');
        out.push_str(&row.matched);
        out.push_str(MATCH_MARKER);
        out.push('\n');
        out.push_str(&row.post.join("\n"));
        out.push_str("\n\n");
        out.push_str(&format!("FILES: {}\n", row.file));
        out.push_str(&format!("REGEX: {pattern}\n"));
        out.push_str(&format!("FOUND {} MATCHES\n\n", rows.len()));
        out.push_str(RULE);
        out.push_str("\n\n");
    }
    out
}

/// Human-readable bilingual context: both sides of the record, each record
/// line marked, per-side windows.
pub fn render_bil_context_text(rows: &[BilContextRow], pattern: &str) -> String {
    let mark = |lines: &[String]| lines.iter().map(|l| format!("{l}{MATCH_MARKER}")).join("\n");

    let mut out = String::new();
    for row in rows {
        out.push_str(&row.pre_src.join("\n"));
        out.push('\n');
        out.push_str(&mark(&row.src));
        out.push('\n');
        out.push_str(&row.post_src.join("\n"));
        out.push_str("\n\n");

        out.push_str(&row.pre_trg.join("\n"));
        out.push('\n');
        out.push_str(&mark(&row.trg));
        out.push('\n');
        out.push_str(&row.post_trg.join("\n"));
        out.push_str("\n\n");

        out.push_str(&format!("FILES: {}\n", row.file));
        out.push_str(&format!("REGEX: {pattern}\n"));
        out.push_str(&format!("FOUND {} MATCHES\n\n", rows.len()));
        out.push_str(RULE);
        out.push_str("\n\n");
    }
    out
}

// ---------------------------------------------------------------------------
// Quantitative CSV renderings

/// Monolingual context table, one row per match.
pub fn render_mono_context_csv(
    rows: &[MonoContextRow],
    pattern: &str,
    lang: &str,
    pre: usize,
    post: usize,
) -> String {
    let mut out = String::new();
    out.push_str(&csv_row(&[
        String::new(),
        format!("Pre-Context: (-{pre})"),
        format!("Match {lang}"),
        format!("Post-Context: (+{post})"),
        "Files".into(),
        "Regex".into(),
    ]));
    out.push('\n');

    for (i, row) in rows.iter().enumerate() {
        out.push_str(&csv_row(&[
            i.to_string(),
            row.pre.join("\n"),
            row.matched.clone(),
            row.post.join("\n"),
            row.file.to_string(),
            pattern.to_string(),
        ]));
        out.push('\n');
    }
    out
}

/// Bilingual context table, one row per match; exact duplicate rows are
/// dropped (keep-first) before numbering.
pub fn render_bil_context_csv(
    rows: &[BilContextRow],
    pattern: &str,
    l1: &str,
    l2: &str,
    pre: usize,
    post: usize,
) -> String {
    let mut out = String::new();
    out.push_str(&csv_row(&[
        String::new(),
        format!("Match Pre-Context (-{pre})"),
        format!("Match {l1}"),
        format!("Match Post-Context: (+{post})"),
        format!("Translation Pre-Context (-{pre})"),
        format!("Match {l2}"),
        format!("Translation Post-Context: (+{post})"),
        "Files".into(),
        "Regex".into(),
    ]));
    out.push('\n');

    let mut seen = std::collections::HashSet::new();
    let mut i = 0usize;
    for row in rows {
        let fields = vec![
            row.pre_src.join("\n"),
            row.src.join("\n"),
            row.post_src.join("\n"),
            row.pre_trg.join("\n"),
            row.trg.join("\n"),
            row.post_trg.join("\n"),
            row.file.to_string(),
            pattern.to_string(),
        ];
        let id = xxhash_rust::xxh64::xxh64(fields.join("\u{1e}").as_bytes(), 0);
        if !seen.insert(id) {
            continue;
        }
        let mut numbered = vec![i.to_string()];
        numbered.extend(fields);
        out.push_str(&csv_row(&numbered));
        out.push('\n');
        i += 1;
    }
    out
}

/// Statistics table. Unparsed queries emit one row per group; parsed
/// monolingual queries explode one row per token, parsed bilingual queries
/// one row per distinct metadata combination.
pub fn render_stats_csv(table: &FreqTable, l1: &str, l2: Option<&str>, parsed: bool) -> String {
    let mut out = String::new();
    let count_col = if l2.is_some() { "Count_Alignment" } else { "Count_Match" };

    let mut header: Vec<String> = vec![String::new(), format!("Match {l1}")];
    if let Some(l2) = l2 {
        header.push(format!("Match {l2}"));
    }
    if parsed {
        if l2.is_some() {
            header.extend(
                ["POS_src", "Lemma_src", "Token_src", "POS_trg", "Lemma_trg", "Token_trg"]
                    .map(String::from),
            );
        } else {
            header.extend(["POS", "Lemma", "Token", "Count_POS"].map(String::from));
        }
    }
    header.extend([count_col.to_string(), "Regex".into(), "File_Pairs".into(), "File_Count".into()]);
    out.push_str(&csv_row(&header));
    out.push('\n');

    let mut i = 0usize;
    for entry in &table.entries {
        let base = |i: usize| {
            let mut fields = vec![i.to_string(), entry.matched.clone()];
            if entry.translation.is_some() {
                fields.push(entry.translation.clone().unwrap_or_default());
            }
            fields
        };
        let tail = |fields: &mut Vec<String>| {
            fields.extend([
                entry.count.to_string(),
                table.pattern.clone(),
                join_files(&entry.files),
                entry.file_count().to_string(),
            ]);
        };

        if !parsed || entry.meta.is_empty() {
            let mut fields = base(i);
            tail(&mut fields);
            out.push_str(&csv_row(&fields));
            out.push('\n');
            i += 1;
        } else if l2.is_some() {
            for meta in &entry.meta {
                let mut fields = base(i);
                let trg = meta.trg.clone().unwrap_or_default();
                fields.extend([
                    meta.src.pos_text(),
                    meta.src.lemmas.join(" "),
                    meta.src.surface_text(),
                    trg.pos_text(),
                    trg.lemmas.join(" "),
                    trg.surface_text(),
                ]);
                tail(&mut fields);
                out.push_str(&csv_row(&fields));
                out.push('\n');
                i += 1;
            }
        } else {
            // One row per token: POS/Lemma/Token columns are scalar
            for meta in &entry.meta {
                for t in 0..meta.src.len() {
                    let mut fields = base(i);
                    fields.extend([
                        meta.src.pos_tags[t].clone(),
                        meta.src.lemmas[t].clone(),
                        meta.src.surfaces[t].clone(),
                        meta.pos_count.to_string(),
                    ]);
                    tail(&mut fields);
                    out.push_str(&csv_row(&fields));
                    out.push('\n');
                    i += 1;
                }
            }
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Terminal preview

/// Compact table of the top frequency rows for interactive runs.
pub fn preview_table(table: &FreqTable, limit: usize) -> String {
    let bilingual = table.entries.iter().any(|e| e.translation.is_some());

    let mut builder = TableBuilder::default();
    if bilingual {
        builder.push_record(["Match", "Translation", "Count", "Files"]);
    } else {
        builder.push_record(["Match", "Count", "Files"]);
    }

    for entry in table.entries.iter().take(limit) {
        if bilingual {
            builder.push_record([
                entry.matched.clone(),
                entry.translation.clone().unwrap_or_default(),
                entry.count.to_string(),
                entry.file_count().to_string(),
            ]);
        } else {
            builder.push_record([
                entry.matched.clone(),
                entry.count.to_string(),
                entry.file_count().to_string(),
            ]);
        }
    }

    let mut rendered = builder.build();
    rendered.with(Style::sharp());
    rendered.to_string()
}

// ---------------------------------------------------------------------------
// File output

/// Atomic write: temp file in the target directory, then persist.
pub fn write_atomic(path: &Path, content: &str) -> Result<()> {
    let dir = path.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or(Path::new("."));
    let mut tmp = tempfile::NamedTempFile::new_in(dir)
        .with_context(|| format!("failed to create temp file in {}", dir.display()))?;
    tmp.write_all(content.as_bytes())
        .with_context(|| format!("failed to write {}", path.display()))?;
    tmp.persist(path)
        .with_context(|| format!("failed to persist {}", path.display()))?;
    Ok(())
}

/// Write every requested rendering for one query; returns the paths written.
pub fn write_results(
    out_dir: &Path,
    output: &QueryOutput,
    params: &QueryParams,
    meta: &CorpusMeta,
) -> Result<Vec<PathBuf>> {
    let mut written = Vec::new();

    if let Some(rows) = &output.mono_context {
        let lang = meta.side_label(params.mode);
        let qual = context_path(out_dir, &params.pattern, lang, None, params.pre, params.post, true);
        write_atomic(&qual, &render_mono_context_text(rows, &params.pattern))?;
        written.push(qual);

        let quant =
            context_path(out_dir, &params.pattern, lang, None, params.pre, params.post, false);
        write_atomic(
            &quant,
            &render_mono_context_csv(rows, &params.pattern, lang, params.pre, params.post),
        )?;
        written.push(quant);
    }

    if let Some(rows) = &output.bil_context {
        let (l1, l2) = (meta.l1_label(), meta.l2_label());
        let qual =
            context_path(out_dir, &params.pattern, l1, Some(l2), params.pre, params.post, true);
        write_atomic(&qual, &render_bil_context_text(rows, &params.pattern))?;
        written.push(qual);

        let quant =
            context_path(out_dir, &params.pattern, l1, Some(l2), params.pre, params.post, false);
        write_atomic(
            &quant,
            &render_bil_context_csv(rows, &params.pattern, l1, l2, params.pre, params.post),
        )?;
        written.push(quant);
    }

    if let Some(stats) = &output.stats {
        let (lang, l2) = match params.mode {
            Mode::Bilingual => (meta.l1_label(), Some(meta.l2_label())),
            Mode::Monolingual(_) => (meta.side_label(params.mode), None),
        };
        let path = stats_path(out_dir, &params.pattern, lang, l2);
        write_atomic(&path, &render_stats_csv(stats, lang, l2, params.parsed))?;
        written.push(path);
    }

    Ok(written)
}
