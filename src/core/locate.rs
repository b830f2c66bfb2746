//! Regex match location and file-provenance resolution.
//!
//! Matching is line-local against the clean view: a line is a hit when the
//! user pattern matches its text AND the line carries the requested side's
//! role tag. Case folding is a compile-time flag on the pattern, never a
//! transform of the corpus.

use regex::{Regex, RegexBuilder};
use tracing::debug;

use crate::core::corpus::{Corpus, Role, Side};

/// Composite provenance identifier built from the comment pair above a
/// match; empty when no comment precedes the match.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize)]
pub struct FileId(String);

impl FileId {
    pub fn new(id: impl Into<String>) -> FileId {
        FileId(id.into())
    }

    pub fn empty() -> FileId {
        FileId(String::new())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Display for FileId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// One matching line.
#[derive(Debug, Clone)]
pub struct Hit {
    /// Absolute 0-based line position in the corpus.
    pub pos: usize,
    /// Clean text of the matched line (role tag kept).
    pub text: String,
    /// Resolved provenance for this match.
    pub file_id: FileId,
}

/// Compile the user pattern. Case-insensitivity is a matching-time flag.
pub fn compile_pattern(pattern: &str, ignore_case: bool) -> Result<Regex, regex::Error> {
    RegexBuilder::new(pattern).case_insensitive(ignore_case).build()
}

/// Scan the corpus for lines of `side` whose clean text matches `re`.
pub fn locate(corpus: &Corpus, re: &Regex, side: Side) -> Vec<Hit> {
    let role = Role::of_side(side);
    let mut hits = Vec::new();

    for line in corpus.lines() {
        if line.role == role && re.is_match(&line.clean) {
            hits.push(Hit {
                pos: line.pos,
                text: line.clean.clone(),
                file_id: resolve_file_id(corpus, line.pos),
            });
        }
    }

    debug!(pattern = %re.as_str(), side = ?side, hits = hits.len(), "match scan complete");
    hits
}

/// Walk backward from a match to the nearest comment line and join it with
/// the line immediately preceding it (the corpus-pair header), in document
/// order. Comments recur at document boundaries, so the walk is short in
/// practice. No comment before start of file yields an empty id.
pub fn resolve_file_id(corpus: &Corpus, pos: usize) -> FileId {
    for back in (0..pos).rev() {
        let line = match corpus.get(back) {
            Some(l) => l,
            None => break,
        };
        if line.role == Role::Comment {
            let mut parts: Vec<&str> = Vec::with_capacity(2);
            // Header pair reads top-down; the partner sits right above
            if back > 0
                && let Some(prev) = corpus.get(back - 1)
            {
                parts.push(&prev.clean);
            }
            parts.push(&line.clean);
            return FileId(parts.join(", "));
        }
    }

    FileId::empty()
}
