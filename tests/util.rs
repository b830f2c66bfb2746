//! Shared test utilities for integration tests
//!
//! Provides common fixture creation and helper functions
//! used across multiple test files.

use assert_fs::prelude::*;

/// Standard parsed fixture: three records covering the recognized record
/// shapes (1:1, 2 sources : 1 target, 1 source : 2 targets), with the
/// provenance header pair on top.
pub const PARSED_CORPUS: &str = "\
# en/2017/1/100.xml.gz
# fr/2017/1/100.xml.gz
================================
(src)=\"1\">How_#ADV_#how are_#AUX_#be you_#PRON_#you ?_#PUNCT_#?
(trg)=\"1\">Comment_#ADV_#comment allez-vous_#VERB_#aller ?_#PUNCT_#?
================================
(src)=\"2\">What_#PRON_#what
(src)=\"3\">is_#AUX_#be this_#PRON_#this ?_#PUNCT_#?
(trg)=\"2\">Qu'est-ce_#PRON_#que que_#SCONJ_#que c'est_#VERB_#être ?_#PUNCT_#?
================================
(src)=\"4\">Fine_#ADJ_#fine ._#PUNCT_#.
(trg)=\"3\">Bien_#ADV_#bien ._#PUNCT_#.
(trg)=\"4\">Très_#ADV_#très bien_#ADV_#bien ._#PUNCT_#.
";

/// Write the standard fixture under the conventional corpus filename and
/// return the temp dir holding it.
pub fn make_parsed_fixture() -> assert_fs::TempDir {
    let tmp = assert_fs::TempDir::new().expect("tempdir");
    tmp.child("alignments_en_fr_3_parsed.txt")
        .write_str(PARSED_CORPUS)
        .expect("write corpus");
    tmp
}

/// Path of the fixture corpus inside its temp dir.
pub fn corpus_path(tmp: &assert_fs::TempDir) -> std::path::PathBuf {
    tmp.path().join("alignments_en_fr_3_parsed.txt")
}
