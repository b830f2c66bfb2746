//! Context windows around matches.
//!
//! Windows are measured over a *restricted view* of the corpus — the clean
//! lines of one role, with separators (and comments) already gone — so a
//! requested window of N lines means N sentences of that side, not N raw
//! file lines. Slices saturate at the edges of the view: a match on the
//! first sentence with `pre = 5` simply has no pre-context.

use std::collections::HashMap;

use crate::core::corpus::{Corpus, Role, Side, strip_role_tag};
use crate::core::locate::{FileId, Hit};
use crate::core::segment::Record;

/// Role-filtered positional view over the corpus.
pub struct RestrictedView {
    positions: Vec<usize>,
    index_of: HashMap<usize, usize>,
}

impl RestrictedView {
    /// View of all lines carrying `side`'s role, in document order.
    pub fn of_side(corpus: &Corpus, side: Side) -> RestrictedView {
        let role = Role::of_side(side);
        let positions: Vec<usize> = corpus
            .lines()
            .iter()
            .filter(|l| l.role == role)
            .map(|l| l.pos)
            .collect();
        let index_of = positions
            .iter()
            .enumerate()
            .map(|(i, &p)| (p, i))
            .collect();
        RestrictedView { positions, index_of }
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// View index of an absolute position, if the line is in the view.
    pub fn index_of(&self, pos: usize) -> Option<usize> {
        self.index_of.get(&pos).copied()
    }

    /// Up to `pre` view lines before index `idx`, truncated at the start.
    pub fn pre_window(&self, idx: usize, pre: usize) -> &[usize] {
        &self.positions[idx.saturating_sub(pre)..idx]
    }

    /// Up to `post` view lines after index `idx`, truncated at the end.
    pub fn post_window(&self, idx: usize, post: usize) -> &[usize] {
        let from = (idx + 1).min(self.positions.len());
        let to = (idx + 1 + post).min(self.positions.len());
        &self.positions[from..to]
    }
}

fn render(corpus: &Corpus, positions: &[usize], keep_tags: bool) -> Vec<String> {
    positions
        .iter()
        .map(|&p| {
            let clean = corpus.lines()[p].clean.as_str();
            if keep_tags {
                clean.to_string()
            } else {
                strip_role_tag(clean).to_string()
            }
        })
        .collect()
}

/// One monolingual context row: window, match, provenance.
#[derive(Debug, Clone, serde::Serialize)]
pub struct MonoContextRow {
    pub pre: Vec<String>,
    pub matched: String,
    pub post: Vec<String>,
    pub file: FileId,
}

/// Build monolingual context rows for all hits of one side.
pub fn mono_context(
    corpus: &Corpus,
    hits: &[Hit],
    side: Side,
    pre: usize,
    post: usize,
    keep_tags: bool,
) -> Vec<MonoContextRow> {
    let view = RestrictedView::of_side(corpus, side);

    hits.iter()
        .filter_map(|hit| {
            let idx = view.index_of(hit.pos)?;
            let matched = if keep_tags {
                hit.text.clone()
            } else {
                strip_role_tag(&hit.text).to_string()
            };
            Some(MonoContextRow {
                pre: render(corpus, view.pre_window(idx, pre), keep_tags),
                matched,
                post: render(corpus, view.post_window(idx, post), keep_tags),
                file: hit.file_id.clone(),
            })
        })
        .collect()
}

/// One bilingual context row: both sides of the enclosing record with
/// per-side windows.
#[derive(Debug, Clone, serde::Serialize)]
pub struct BilContextRow {
    pub pre_src: Vec<String>,
    pub src: Vec<String>,
    pub post_src: Vec<String>,
    pub pre_trg: Vec<String>,
    pub trg: Vec<String>,
    pub post_trg: Vec<String>,
    pub file: FileId,
}

/// Build bilingual context rows: for each hit, the enclosing record's
/// source and target lines, with windows counted back from the record's
/// first line and forward from its last line on each side.
pub fn bilingual_context(
    corpus: &Corpus,
    hits: &[Hit],
    pre: usize,
    post: usize,
    keep_tags: bool,
) -> Vec<BilContextRow> {
    let src_view = RestrictedView::of_side(corpus, Side::Source);
    let trg_view = RestrictedView::of_side(corpus, Side::Target);

    hits.iter()
        .map(|hit| {
            let record = Record::segment(corpus, hit.pos);
            let (pre_src, src, post_src) =
                side_segment(corpus, &record, &src_view, Side::Source, pre, post, keep_tags);
            let (pre_trg, trg, post_trg) =
                side_segment(corpus, &record, &trg_view, Side::Target, pre, post, keep_tags);
            BilContextRow {
                pre_src,
                src,
                post_src,
                pre_trg,
                trg,
                post_trg,
                file: hit.file_id.clone(),
            }
        })
        .collect()
}

fn side_segment(
    corpus: &Corpus,
    record: &Record,
    view: &RestrictedView,
    side: Side,
    pre: usize,
    post: usize,
    keep_tags: bool,
) -> (Vec<String>, Vec<String>, Vec<String>) {
    let members = record.side_positions(corpus, side);

    // A record can lack one side entirely near malformed regions
    let (first, last) = match (members.first(), members.last()) {
        (Some(&f), Some(&l)) => (f, l),
        _ => return (Vec::new(), Vec::new(), Vec::new()),
    };

    let body = render(corpus, &members, keep_tags);

    let pre_lines = match view.index_of(first) {
        Some(idx) => render(corpus, view.pre_window(idx, pre), keep_tags),
        None => Vec::new(),
    };
    let post_lines = match view.index_of(last) {
        Some(idx) => render(corpus, view.post_window(idx, post), keep_tags),
        None => Vec::new(),
    };

    (pre_lines, body, post_lines)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::locate::{compile_pattern, locate};
    use std::path::PathBuf;

    fn fixture() -> Corpus {
        Corpus::from_lines(
            PathBuf::from("t.txt"),
            [
                "# en/1/1/1.xml.gz",
                "# fr/1/1/1.xml.gz",
                "================",
                "(src)=\"1\">s1",
                "(trg)=\"1\">t1",
                "================",
                "(src)=\"2\">s2a",
                "(src)=\"3\">s2b",
                "(trg)=\"2\">t2",
                "================",
                "(src)=\"4\">s3",
                "(trg)=\"3\">t3a",
                "(trg)=\"4\">t3b",
            ],
        )
    }

    #[test]
    fn test_window_counts_content_lines_only() {
        let corpus = fixture();
        let re = compile_pattern("s3", false).unwrap();
        let hits = locate(&corpus, &re, Side::Source);
        let rows = mono_context(&corpus, &hits, Side::Source, 2, 2, false);

        assert_eq!(rows.len(), 1);
        // Separators and comments never occupy window slots
        assert_eq!(rows[0].pre, vec!["s2a", "s2b"]);
        assert_eq!(rows[0].matched, "s3");
        assert!(rows[0].post.is_empty());
    }

    #[test]
    fn test_window_truncates_at_view_start() {
        let corpus = fixture();
        let re = compile_pattern("^\\(src\\)=\"1\"", false).unwrap();
        let hits = locate(&corpus, &re, Side::Source);
        let rows = mono_context(&corpus, &hits, Side::Source, 5, 1, false);

        assert_eq!(rows.len(), 1);
        assert!(rows[0].pre.is_empty());
        assert_eq!(rows[0].post, vec!["s2a"]);
    }

    #[test]
    fn test_window_length_never_exceeds_request() {
        let corpus = fixture();
        let re = compile_pattern("s2b", false).unwrap();
        let hits = locate(&corpus, &re, Side::Source);
        let rows = mono_context(&corpus, &hits, Side::Source, 1, 1, false);

        assert_eq!(rows[0].pre.len(), 1);
        assert_eq!(rows[0].post.len(), 1);
    }

    #[test]
    fn test_bilingual_segments_and_windows() {
        let corpus = fixture();
        let re = compile_pattern("s2b", false).unwrap();
        let hits = locate(&corpus, &re, Side::Source);
        let rows = bilingual_context(&corpus, &hits, 1, 1, false);

        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        // Whole record on the source side, windowed by source sentences
        assert_eq!(row.src, vec!["s2a", "s2b"]);
        assert_eq!(row.pre_src, vec!["s1"]);
        assert_eq!(row.post_src, vec!["s3"]);
        // Target side mirrors the record's target line
        assert_eq!(row.trg, vec!["t2"]);
        assert_eq!(row.pre_trg, vec!["t1"]);
        assert_eq!(row.post_trg, vec!["t3a"]);
    }

    #[test]
    fn test_keep_tags_preserved_on_request() {
        let corpus = fixture();
        let re = compile_pattern("s1", false).unwrap();
        let hits = locate(&corpus, &re, Side::Source);
        let rows = mono_context(&corpus, &hits, Side::Source, 0, 1, true);
        assert_eq!(rows[0].matched, "(src)=\"1\">s1");
        assert_eq!(rows[0].post, vec!["(src)=\"2\">s2a"]);
    }
}
