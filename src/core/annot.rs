//! Token metadata splitting for parsed corpora.
//!
//! A parsed sentence body is whitespace-delimited tokens of the form
//! `surface_#POS_#lemma`. Splitting is pure and order-preserving; a token
//! missing fields degrades alone: POS falls back to the sentinel tag and
//! the remaining field is taken as the lemma.

use crate::core::corpus::META_DELIM;

/// Sentinel POS tag for tokens without one.
pub const POS_FALLBACK: &str = "X";

/// One annotated token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenAnnot {
    pub surface: String,
    pub pos: String,
    pub lemma: String,
}

impl TokenAnnot {
    /// Rejoin to the on-disk form `surface_#POS_#lemma`.
    pub fn rejoin(&self) -> String {
        format!(
            "{}{d}{}{d}{}",
            self.surface,
            self.pos,
            self.lemma,
            d = META_DELIM
        )
    }
}

/// Parallel (surface, POS, lemma) sequences of one sentence.
///
/// Invariant: the three vectors always have equal length.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct TokenTriples {
    pub surfaces: Vec<String>,
    pub pos_tags: Vec<String>,
    pub lemmas: Vec<String>,
}

impl TokenTriples {
    pub fn from_tokens(tokens: Vec<TokenAnnot>) -> TokenTriples {
        let mut triples = TokenTriples::default();
        for t in tokens {
            triples.surfaces.push(t.surface);
            triples.pos_tags.push(t.pos);
            triples.lemmas.push(t.lemma);
        }
        triples
    }

    pub fn len(&self) -> usize {
        self.surfaces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.surfaces.is_empty()
    }

    /// Extend with another sentence's triples, preserving order.
    pub fn extend(&mut self, other: &TokenTriples) {
        self.surfaces.extend(other.surfaces.iter().cloned());
        self.pos_tags.extend(other.pos_tags.iter().cloned());
        self.lemmas.extend(other.lemmas.iter().cloned());
    }

    /// Surface forms joined with single spaces.
    pub fn surface_text(&self) -> String {
        self.surfaces.join(" ")
    }

    /// POS tags joined with single spaces (secondary grouping key).
    pub fn pos_text(&self) -> String {
        self.pos_tags.join(" ")
    }
}

/// Split an annotated sentence body into tokens.
pub fn split_annotated(body: &str) -> Vec<TokenAnnot> {
    body.split_whitespace().map(split_token).collect()
}

/// Split one annotated sentence body straight into parallel sequences.
pub fn split_triples(body: &str) -> TokenTriples {
    TokenTriples::from_tokens(split_annotated(body))
}

fn split_token(token: &str) -> TokenAnnot {
    let mut fields = token.split(META_DELIM);

    // split() always yields at least one field
    let surface = fields.next().unwrap_or_default().to_string();
    let second = fields.next();
    let third = fields.next();

    match (second, third) {
        (Some(pos), Some(lemma)) => TokenAnnot {
            surface,
            pos: pos.to_string(),
            lemma: lemma.to_string(),
        },
        // Two fields: the remaining field is the lemma
        (Some(rest), None) => TokenAnnot {
            surface,
            pos: POS_FALLBACK.to_string(),
            lemma: rest.to_string(),
        },
        // Bare surface form
        (None, _) => TokenAnnot {
            surface: surface.clone(),
            pos: POS_FALLBACK.to_string(),
            lemma: surface,
        },
    }
}
