//! Corpus loading and line classification.
//!
//! An alignment dump is flat, line-oriented text. Every line plays exactly
//! one role, decided by a fixed prefix:
//!
//! - `# en/2017/7084250/7204700.xml.gz` — comment carrying file provenance
//! - `================` — separator bounding an alignment record
//! - `(src)="3">…` / `(trg)="4">…` — source/target sentence with a tag id
//! - anything else — plain text, ignored by queries
//!
//! Parsed corpora decorate each token as `surface_#POS_#lemma`. The *clean*
//! view strips those runs so regex matching and display operate on plain
//! sentences, while the raw view keeps them for the metadata index.

use std::io;
use std::path::{Path, PathBuf};

use crate::infra::io::{read_file_smart, split_lines};

/// Private delimiter separating surface form, POS tag and lemma in
/// parsed corpora.
pub const META_DELIM: &str = "_#";

/// Which side of the alignment a sentence belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Source,
    Target,
}

impl Side {
    /// Keyword used inside the role tag: `(src)` or `(trg)`.
    pub fn keyword(self) -> &'static str {
        match self {
            Side::Source => "src",
            Side::Target => "trg",
        }
    }
}

/// Sentence tag: side plus the alignment-local sentence id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Tag {
    pub side: Side,
    pub id: u64,
}

impl Tag {
    /// Parse a leading `(src)="<digits>">` / `(trg)="<digits>">` tag.
    /// Returns the tag and the byte length of the consumed prefix.
    pub fn parse(text: &str) -> Option<(Tag, usize)> {
        let side = if text.starts_with("(src)=\"") {
            Side::Source
        } else if text.starts_with("(trg)=\"") {
            Side::Target
        } else {
            return None;
        };

        // 7 bytes: `(src)="` — digits run until the closing quote
        let rest = &text[7..];
        let quote = rest.find('"')?;
        let digits = &rest[..quote];
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let id: u64 = digits.parse().ok()?;

        // Tag must close with `">`
        if !rest[quote..].starts_with("\">") {
            return None;
        }

        Some((Tag { side, id }, 7 + quote + 2))
    }
}

impl std::fmt::Display for Tag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({})=\"{}\">", self.side.keyword(), self.id)
    }
}

/// Role of one corpus line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Source,
    Target,
    Comment,
    Separator,
    Plain,
}

impl Role {
    /// Role carried by sentence lines of the given side.
    pub fn of_side(side: Side) -> Role {
        match side {
            Side::Source => Role::Source,
            Side::Target => Role::Target,
        }
    }
}

/// One classified corpus line.
#[derive(Debug, Clone)]
pub struct Line {
    /// Absolute 0-based position in the file.
    pub pos: usize,
    /// Line text as read (newline stripped).
    pub raw: String,
    /// Annotation-stripped view used for matching and display.
    pub clean: String,
    pub role: Role,
    /// Sentence tag for Source/Target lines.
    pub tag: Option<Tag>,
}

impl Line {
    /// Clean sentence body with the role tag removed.
    pub fn clean_body(&self) -> &str {
        strip_role_tag(&self.clean)
    }

    /// Raw sentence body (annotations kept) with the role tag removed.
    pub fn raw_body(&self) -> &str {
        strip_role_tag(&self.raw)
    }
}

/// Remove every `_#…` annotation run (up to the next space) from a line.
pub fn strip_annotations(text: &str) -> String {
    let bytes = text.as_bytes();
    let mut out = String::with_capacity(text.len());
    let mut i = 0usize;

    while i < bytes.len() {
        match memchr::memmem::find(&bytes[i..], META_DELIM.as_bytes()) {
            Some(rel) => {
                let start = i + rel;
                out.push_str(&text[i..start]);
                // Annotation runs to the end of the token
                match memchr::memchr(b' ', &bytes[start..]) {
                    Some(sp) => i = start + sp,
                    None => break,
                }
            }
            None => {
                out.push_str(&text[i..]);
                break;
            }
        }
    }

    out
}

/// Strip a leading role tag, if any, from a sentence line.
pub fn strip_role_tag(text: &str) -> &str {
    match Tag::parse(text) {
        Some((_, len)) => &text[len..],
        None => text,
    }
}

/// Errors raised while loading a corpus. The only fatal failure class of a
/// query: everything downstream degrades at line granularity instead.
#[derive(Debug, thiserror::Error)]
pub enum ReadError {
    #[error("failed to read corpus {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("corpus {path} is not valid UTF-8 (invalid byte at offset {offset})")]
    Decode { path: PathBuf, offset: usize },
}

/// A fully loaded, classified corpus. Immutable for the query's lifetime.
#[derive(Debug)]
pub struct Corpus {
    path: PathBuf,
    lines: Vec<Line>,
}

impl Corpus {
    /// Read and classify a corpus file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Corpus, ReadError> {
        let path = path.as_ref();

        let content = read_file_smart(path).map_err(|source| ReadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let text = content.to_str().map_err(|e| ReadError::Decode {
            path: path.to_path_buf(),
            offset: e.valid_up_to(),
        })?;

        let lines = split_lines(text)
            .into_iter()
            .enumerate()
            .map(|(pos, raw)| classify(pos, raw))
            .collect::<Vec<_>>();

        tracing::debug!(path = %path.display(), lines = lines.len(), "corpus loaded");

        Ok(Corpus {
            path: path.to_path_buf(),
            lines,
        })
    }

    /// Build a corpus from already-split lines. Test seam; classification
    /// is identical to [`Corpus::load`].
    pub fn from_lines<I, S>(path: PathBuf, raw_lines: I) -> Corpus
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let lines = raw_lines
            .into_iter()
            .enumerate()
            .map(|(pos, raw)| classify(pos, raw.as_ref()))
            .collect();
        Corpus { path, lines }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    pub fn get(&self, pos: usize) -> Option<&Line> {
        self.lines.get(pos)
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

fn classify(pos: usize, raw: &str) -> Line {
    let (role, tag) = if raw.starts_with('#') {
        (Role::Comment, None)
    } else if raw.starts_with('=') {
        (Role::Separator, None)
    } else {
        match Tag::parse(raw) {
            Some((tag, _)) => (Role::of_side(tag.side), Some(tag)),
            None => (Role::Plain, None),
        }
    };

    let clean = strip_annotations(raw);

    Line {
        pos,
        raw: raw.to_string(),
        clean,
        role,
        tag,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_roles() {
        let corpus = Corpus::from_lines(
            PathBuf::from("t.txt"),
            [
                "# en/2017/1/2.xml.gz",
                "================",
                "(src)=\"3\">How are you ?",
                "(trg)=\"4\">Comment allez-vous ?",
                "stray text",
            ],
        );

        let roles: Vec<Role> = corpus.lines().iter().map(|l| l.role).collect();
        assert_eq!(
            roles,
            vec![
                Role::Comment,
                Role::Separator,
                Role::Source,
                Role::Target,
                Role::Plain
            ]
        );
        assert_eq!(
            corpus.get(2).unwrap().tag,
            Some(Tag {
                side: Side::Source,
                id: 3
            })
        );
    }

    #[test]
    fn test_tag_parse_rejects_malformed() {
        assert!(Tag::parse("(src)=\"\">x").is_none());
        assert!(Tag::parse("(src)=\"a\">x").is_none());
        assert!(Tag::parse("(src)=\"3\"x").is_none());
        assert!(Tag::parse("src=\"3\">x").is_none());
    }

    #[test]
    fn test_tag_roundtrip() {
        let (tag, len) = Tag::parse("(trg)=\"42\">Bonjour").unwrap();
        assert_eq!(tag.to_string(), "(trg)=\"42\">");
        assert_eq!(len, "(trg)=\"42\">".len());
    }

    #[test]
    fn test_strip_annotations() {
        assert_eq!(
            strip_annotations("(src)=\"1\">Je_#PRON_#je suis_#AUX_#être là"),
            "(src)=\"1\">Je suis là"
        );
        // No annotations: untouched
        assert_eq!(strip_annotations("plain text"), "plain text");
        // Annotation on the final token swallows to end of line
        assert_eq!(strip_annotations("mot_#NOUN_#mot"), "mot");
    }

    #[test]
    fn test_clean_body_strips_tag() {
        let corpus = Corpus::from_lines(
            PathBuf::from("t.txt"),
            ["(src)=\"7\">Hello_#INTJ_#hello world_#NOUN_#world"],
        );
        assert_eq!(corpus.get(0).unwrap().clean_body(), "Hello world");
        assert_eq!(
            corpus.get(0).unwrap().raw_body(),
            "Hello_#INTJ_#hello world_#NOUN_#world"
        );
    }

    #[test]
    fn test_load_missing_file_is_read_error() {
        let err = Corpus::load("/definitely/not/here.txt").unwrap_err();
        assert!(matches!(err, ReadError::Io { .. }));
    }
}
