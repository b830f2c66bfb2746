//! Record segmentation: from a match position to the enclosing,
//! separator-bounded alignment unit.
//!
//! Expansion walks left and right one line at a time and stops exclusive at
//! a separator, or at the file edge — both sides are bounds-checked, so a
//! match in the first or last record truncates instead of erroring. Comment
//! and plain lines inside the scanned region are not record members.
//!
//! A record's shape is decided once, from its own composition (how many
//! source/target lines it holds and which source the match is), and
//! pattern-matched downstream. The four shapes are mutually exclusive by
//! construction; a composition outside them yields `None` and the match is
//! skipped by consumers that need a shape.

use smallvec::SmallVec;
use tracing::debug;

use crate::core::corpus::{Corpus, Line, Role, Side, strip_role_tag};

/// Stable, hashable record identifier: the record's absolute line span
/// (first and last member position). Records are disjoint, so the span
/// identifies a record even when two records carry identical text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecordId {
    pub start: usize,
    pub end: usize,
}

/// One alignment unit surrounding a match.
#[derive(Debug, Clone)]
pub struct Record {
    pub id: RecordId,
    /// The matched line's absolute position.
    pub anchor: usize,
    /// Member (Source/Target) line positions in document order.
    positions: SmallVec<[usize; 4]>,
}

/// Recognized record compositions. Positions are absolute line positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordShape {
    /// 1 source, 1 target.
    OneToOne { source: usize, target: usize },
    /// 2 sources, 1 target; the match is the first source.
    TwoSourcesFirst { sources: [usize; 2], target: usize },
    /// 2 sources, 1 target; the match is the second source.
    TwoSourcesSecond { sources: [usize; 2], target: usize },
    /// 1 source, 2 targets.
    OneToTwoTargets { source: usize, targets: [usize; 2] },
}

impl Record {
    /// Expand from `pos` to the enclosing record.
    pub fn segment(corpus: &Corpus, pos: usize) -> Record {
        let mut members: SmallVec<[usize; 4]> = SmallVec::new();

        // Scan left until a separator (exclusive) or the file start
        let mut left = pos;
        while left > 0 {
            let line = &corpus.lines()[left - 1];
            if line.role == Role::Separator {
                break;
            }
            left -= 1;
            if left == 0 {
                debug!(pos, "record expansion truncated at file start");
            }
        }

        // Scan right until a separator (exclusive) or the file end
        let mut right = pos;
        while right + 1 < corpus.len() {
            let line = &corpus.lines()[right + 1];
            if line.role == Role::Separator {
                break;
            }
            right += 1;
            if right + 1 == corpus.len() {
                debug!(pos, "record expansion truncated at file end");
            }
        }

        // Collect sentence members only
        for p in left..=right {
            match corpus.lines()[p].role {
                Role::Source | Role::Target => members.push(p),
                _ => {}
            }
        }

        let id = RecordId {
            start: members.first().copied().unwrap_or(pos),
            end: members.last().copied().unwrap_or(pos),
        };

        Record {
            id,
            anchor: pos,
            positions: members,
        }
    }

    pub fn positions(&self) -> &[usize] {
        &self.positions
    }

    /// Member lines in document order.
    pub fn lines<'c>(&'c self, corpus: &'c Corpus) -> impl Iterator<Item = &'c Line> + 'c {
        self.positions.iter().map(move |&p| &corpus.lines()[p])
    }

    /// Member positions of one side, in document order.
    pub fn side_positions(&self, corpus: &Corpus, side: Side) -> SmallVec<[usize; 4]> {
        let role = Role::of_side(side);
        self.positions
            .iter()
            .copied()
            .filter(|&p| corpus.lines()[p].role == role)
            .collect()
    }

    /// Clean text of one side's lines, joined with single spaces.
    /// `keep_tags` keeps the `(src)=`/`(trg)=` prefixes in the output.
    pub fn side_text(&self, corpus: &Corpus, side: Side, keep_tags: bool) -> String {
        self.side_positions(corpus, side)
            .iter()
            .map(|&p| {
                let clean = corpus.lines()[p].clean.as_str();
                if keep_tags { clean } else { strip_role_tag(clean) }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Decide the record's shape once; see module docs for the priority.
    pub fn shape(&self, corpus: &Corpus) -> Option<RecordShape> {
        let sources = self.side_positions(corpus, Side::Source);
        let targets = self.side_positions(corpus, Side::Target);

        match (sources.as_slice(), targets.as_slice()) {
            ([s], [t]) => Some(RecordShape::OneToOne {
                source: *s,
                target: *t,
            }),
            ([s1, s2], [t]) if self.anchor == *s1 => Some(RecordShape::TwoSourcesFirst {
                sources: [*s1, *s2],
                target: *t,
            }),
            ([s1, s2], [t]) if self.anchor == *s2 => Some(RecordShape::TwoSourcesSecond {
                sources: [*s1, *s2],
                target: *t,
            }),
            ([s], [t1, t2]) => Some(RecordShape::OneToTwoTargets {
                source: *s,
                targets: [*t1, *t2],
            }),
            _ => None,
        }
    }
}

impl RecordShape {
    /// Target positions of this shape, in document order.
    pub fn target_positions(&self) -> SmallVec<[usize; 2]> {
        match self {
            RecordShape::OneToOne { target, .. }
            | RecordShape::TwoSourcesFirst { target, .. }
            | RecordShape::TwoSourcesSecond { target, .. } => SmallVec::from_slice(&[*target]),
            RecordShape::OneToTwoTargets { targets, .. } => SmallVec::from_slice(targets),
        }
    }

    /// Source positions of this shape, in document order.
    pub fn source_positions(&self) -> SmallVec<[usize; 2]> {
        match self {
            RecordShape::OneToOne { source, .. } | RecordShape::OneToTwoTargets { source, .. } => {
                SmallVec::from_slice(&[*source])
            }
            RecordShape::TwoSourcesFirst { sources, .. }
            | RecordShape::TwoSourcesSecond { sources, .. } => SmallVec::from_slice(sources),
        }
    }
}
