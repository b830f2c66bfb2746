//! Frequency aggregation over resolved matches.
//!
//! A `StatsBuilder` is local to one query: matches (optionally paired with
//! a translation and token metadata) are folded into groups keyed by match
//! text — or (match, translation) for bilingual queries — then finalized
//! into an immutable, ordered table. Grouping maps keep insertion order, so
//! ties resolve to first-seen and reruns are byte-identical.

use indexmap::{IndexMap, IndexSet};
use xxhash_rust::xxh64::xxh64;

use crate::core::annot::TokenTriples;
use crate::core::locate::FileId;

/// One distinct metadata combination observed for a group.
#[derive(Debug, Clone, serde::Serialize)]
pub struct MetaOccurrence {
    /// Source-side triples (the match line, or all source lines when
    /// source aggregation is on).
    pub src: TokenTriples,
    /// Target-side triples for bilingual queries.
    pub trg: Option<TokenTriples>,
    /// Occurrences of this group with this source POS sequence.
    pub pos_count: usize,
}

/// One aggregated row.
#[derive(Debug, Clone, serde::Serialize)]
pub struct FreqEntry {
    pub matched: String,
    pub translation: Option<String>,
    /// Occurrence count of the group key.
    pub count: usize,
    /// Deduplicated provenance set, insertion-ordered.
    pub files: IndexSet<String>,
    /// Distinct metadata combinations (parsed corpora only), ordered by
    /// descending POS-sequence count.
    pub meta: Vec<MetaOccurrence>,
}

impl FreqEntry {
    pub fn file_count(&self) -> usize {
        self.files.len()
    }
}

/// Finalized frequency table for one query.
#[derive(Debug, Clone, serde::Serialize)]
pub struct FreqTable {
    /// Echoed user pattern.
    pub pattern: String,
    pub entries: Vec<FreqEntry>,
}

impl FreqTable {
    /// Total occurrences across all groups. Cross-validates against the
    /// number of context rows produced for the same parameters.
    pub fn total(&self) -> usize {
        self.entries.iter().map(|e| e.count).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Default)]
struct Group {
    count: usize,
    files: IndexSet<String>,
    /// Distinct metadata combinations by content id, insertion-ordered.
    meta: IndexMap<u64, (TokenTriples, Option<TokenTriples>)>,
    /// Occurrences per source POS sequence within this group.
    pos_counts: IndexMap<String, usize>,
}

/// Accumulates one query's matches; never shared across queries.
pub struct StatsBuilder {
    pattern: String,
    groups: IndexMap<(String, Option<String>), Group>,
}

impl StatsBuilder {
    pub fn new(pattern: impl Into<String>) -> StatsBuilder {
        StatsBuilder {
            pattern: pattern.into(),
            groups: IndexMap::new(),
        }
    }

    /// Fold one resolved match into its group.
    pub fn add(
        &mut self,
        matched: String,
        translation: Option<String>,
        file: &FileId,
        meta: Option<(TokenTriples, Option<TokenTriples>)>,
    ) {
        let group = self.groups.entry((matched, translation)).or_default();

        group.count += 1;
        if !file.is_empty() {
            group.files.insert(file.as_str().to_string());
        }

        if let Some((src, trg)) = meta {
            *group.pos_counts.entry(src.pos_text()).or_default() += 1;
            // Exact-duplicate combinations collapse to one row
            let id = meta_id(&src, trg.as_ref());
            group.meta.entry(id).or_insert((src, trg));
        }
    }

    /// Finalize into an ordered table: count descending, ties by the
    /// group's best POS-sequence count, remaining ties first-seen.
    pub fn finalize(self) -> FreqTable {
        let mut entries: Vec<FreqEntry> = self
            .groups
            .into_iter()
            .map(|((matched, translation), group)| {
                let mut meta: Vec<MetaOccurrence> = group
                    .meta
                    .into_values()
                    .map(|(src, trg)| {
                        let pos_count = group.pos_counts.get(&src.pos_text()).copied().unwrap_or(0);
                        MetaOccurrence { src, trg, pos_count }
                    })
                    .collect();
                meta.sort_by(|a, b| b.pos_count.cmp(&a.pos_count));

                FreqEntry {
                    matched,
                    translation,
                    count: group.count,
                    files: group.files,
                    meta,
                }
            })
            .collect();

        entries.sort_by(|a, b| {
            b.count
                .cmp(&a.count)
                .then_with(|| best_pos_count(b).cmp(&best_pos_count(a)))
        });

        FreqTable {
            pattern: self.pattern,
            entries,
        }
    }
}

fn best_pos_count(entry: &FreqEntry) -> usize {
    entry.meta.first().map(|m| m.pos_count).unwrap_or(0)
}

/// Content id of a metadata combination (xxh64 over a canonical rendering).
fn meta_id(src: &TokenTriples, trg: Option<&TokenTriples>) -> u64 {
    let mut canon = String::new();
    for part in [&src.surfaces, &src.pos_tags, &src.lemmas] {
        canon.push_str(&part.join("\u{1f}"));
        canon.push('\u{1e}');
    }
    if let Some(trg) = trg {
        for part in [&trg.surfaces, &trg.pos_tags, &trg.lemmas] {
            canon.push_str(&part.join("\u{1f}"));
            canon.push('\u{1e}');
        }
    }
    xxh64(canon.as_bytes(), 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::annot::split_triples;

    fn file(name: &str) -> FileId {
        FileId::new(name)
    }

    #[test]
    fn test_counts_and_file_dedup() {
        let mut builder = StatsBuilder::new("x");
        let f1 = file("a.xml.gz");
        builder.add("hello".into(), None, &f1, None);
        builder.add("hello".into(), None, &f1, None);
        builder.add("world".into(), None, &f1, None);

        let table = builder.finalize();
        assert_eq!(table.total(), 3);
        assert_eq!(table.entries[0].matched, "hello");
        assert_eq!(table.entries[0].count, 2);
        assert_eq!(table.entries[0].file_count(), 1);
    }

    #[test]
    fn test_sorted_by_descending_count_then_first_seen() {
        let mut builder = StatsBuilder::new("x");
        let f = file("f");
        builder.add("one".into(), None, &f, None);
        builder.add("two".into(), None, &f, None);
        builder.add("two".into(), None, &f, None);
        builder.add("also-one".into(), None, &f, None);

        let finalized = builder.finalize();
        let order: Vec<&str> = finalized
            .entries
            .iter()
            .map(|e| e.matched.as_str())
            .collect();
        assert_eq!(order, vec!["two", "one", "also-one"]);
    }

    #[test]
    fn test_bilingual_key_includes_translation() {
        let mut builder = StatsBuilder::new("x");
        let f = file("f");
        builder.add("hi".into(), Some("salut".into()), &f, None);
        builder.add("hi".into(), Some("bonjour".into()), &f, None);

        let table = builder.finalize();
        assert_eq!(table.entries.len(), 2);
        assert_eq!(table.total(), 2);
    }

    #[test]
    fn test_duplicate_meta_rows_removed() {
        let mut builder = StatsBuilder::new("x");
        let f = file("f");
        let triples = || split_triples("How_#ADV_#how");
        builder.add("How".into(), None, &f, Some((triples(), None)));
        builder.add("How".into(), None, &f, Some((triples(), None)));

        let table = builder.finalize();
        assert_eq!(table.entries[0].count, 2);
        // Two identical combinations collapse to one row counted twice
        assert_eq!(table.entries[0].meta.len(), 1);
        assert_eq!(table.entries[0].meta[0].pos_count, 2);
    }

    #[test]
    fn test_pos_count_breaks_count_ties() {
        let mut builder = StatsBuilder::new("x");
        let f = file("f");
        // "b" first, but "a" has the stronger POS-sequence count
        builder.add("b".into(), None, &f, Some((split_triples("b_#DET_#b"), None)));
        builder.add("b".into(), None, &f, Some((split_triples("b_#NOUN_#b"), None)));
        builder.add("a".into(), None, &f, Some((split_triples("a_#ADV_#a"), None)));
        builder.add("a".into(), None, &f, Some((split_triples("a_#ADV_#a"), None)));

        let table = builder.finalize();
        assert_eq!(table.entries[0].matched, "a");
        assert_eq!(table.entries[0].meta[0].pos_count, 2);
        assert_eq!(table.entries[1].matched, "b");
    }

    #[test]
    fn test_rerun_is_deterministic() {
        let build = || {
            let mut b = StatsBuilder::new("x");
            let f = file("f");
            b.add("m".into(), Some("t".into()), &f, Some((split_triples("m_#N_#m"), None)));
            b.add("m".into(), Some("t".into()), &f, None);
            b.finalize()
        };
        let a = serde_json::to_string(&build()).unwrap();
        let b = serde_json::to_string(&build()).unwrap();
        assert_eq!(a, b);
    }
}
