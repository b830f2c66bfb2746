//! Per-query metadata index for parsed corpora.
//!
//! Three-level lookup `FileId → RecordId → {Tag → TokenTriples}`, built once
//! from the hits' records and consumed by the aggregator. Keying on the
//! record's line-span id (not its reconstructed text) means a later join for
//! the same record cannot miss: the id used to store is the id used to
//! resolve. The index lives for one query and is then dropped.

use indexmap::IndexMap;
use tracing::debug;

use crate::core::annot::{TokenTriples, split_triples};
use crate::core::corpus::{Corpus, Tag};
use crate::core::locate::{FileId, Hit};
use crate::core::segment::{Record, RecordId};

/// Metadata of one record: per-sentence triples keyed by role tag.
pub type RecordTags = IndexMap<Tag, TokenTriples>;

#[derive(Debug, Default)]
pub struct RecordIndex {
    map: IndexMap<FileId, IndexMap<RecordId, RecordTags>>,
}

impl RecordIndex {
    /// Build the index over each hit's enclosing record. Records shared by
    /// several hits (or revisited across hits) are parsed once.
    pub fn build(corpus: &Corpus, entries: &[(Hit, Record)]) -> RecordIndex {
        let mut index = RecordIndex::default();

        for (hit, record) in entries {
            let per_file = index.map.entry(hit.file_id.clone()).or_default();
            if per_file.contains_key(&record.id) {
                continue;
            }

            let mut tags = RecordTags::default();
            for line in record.lines(corpus) {
                if let Some(tag) = line.tag {
                    tags.insert(tag, split_triples(line.raw_body()));
                }
            }
            per_file.insert(record.id, tags);
        }

        debug!(
            files = index.map.len(),
            records = index.map.values().map(|m| m.len()).sum::<usize>(),
            "record index built"
        );

        index
    }

    /// All tag metadata of one record.
    pub fn tags(&self, file: &FileId, record: RecordId) -> Option<&RecordTags> {
        self.map.get(file)?.get(&record)
    }

    /// Metadata triples of a single tagged sentence.
    pub fn triples(&self, file: &FileId, record: RecordId, tag: Tag) -> Option<&TokenTriples> {
        self.tags(file, record)?.get(&tag)
    }

    pub fn file_count(&self) -> usize {
        self.map.len()
    }

    pub fn record_count(&self) -> usize {
        self.map.values().map(|m| m.len()).sum()
    }
}
