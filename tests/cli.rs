//! End-to-end tests of the compiled binary: exit states, result files,
//! JSON output and config initialization.

mod util;

use assert_cmd::prelude::*;
use assert_fs::prelude::*;
use predicates::prelude::*;
use serde_json::Value;
use std::process::Command;
use util::make_parsed_fixture;

const CORPUS: &str = "alignments_en_fr_3_parsed.txt";

#[test]
fn test_invalid_regex_is_a_distinct_failure() {
    let tmp = make_parsed_fixture();

    Command::cargo_bin("ccord")
        .expect("bin")
        .current_dir(tmp.path())
        .args(["search", CORPUS, "(unclosed"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid regular expression"));
}

#[test]
fn test_no_matches_is_a_reported_success() {
    let tmp = make_parsed_fixture();

    Command::cargo_bin("ccord")
        .expect("bin")
        .current_dir(tmp.path())
        .args(["search", CORPUS, "zz-not-in-corpus"])
        .assert()
        .success()
        .stderr(predicate::str::contains("no matches found"));
}

#[test]
fn test_search_writes_expected_result_files() {
    let tmp = make_parsed_fixture();

    Command::cargo_bin("ccord")
        .expect("bin")
        .current_dir(tmp.path())
        .args([
            "search", CORPUS, "How", "--pre", "2", "--post", "1", "--out-dir", "results",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 matches"));

    // Languages come from the corpus filename convention
    tmp.child("results/bilingual_statistics_en_fr_How.csv")
        .assert(predicate::path::exists());
    tmp.child("results/bilingual_context_en_fr_How_pre_context2_post_context1.txt")
        .assert(predicate::str::contains("<<<<<<<< MATCH"));
    tmp.child("results/bilingual_context_en_fr_How_pre_context2_post_context1.csv")
        .assert(predicate::str::contains("Match en"));
}

#[test]
fn test_monolingual_target_side_files() {
    let tmp = make_parsed_fixture();

    Command::cargo_bin("ccord")
        .expect("bin")
        .current_dir(tmp.path())
        .args([
            "search", CORPUS, "Comment", "--mode", "mono", "--side", "trg", "--pre", "1",
            "--post", "1", "--out-dir", "out",
        ])
        .assert()
        .success();

    // Monolingual paths carry the searched side's language only
    tmp.child("out/monolingual_statistics_fr_Comment.csv")
        .assert(predicate::str::contains("Match fr"));
    tmp.child("out/monolingual_context_fr_Comment_pre_context1_post_context1.txt")
        .assert(predicate::path::exists());
}

#[test]
fn test_dry_run_writes_nothing() {
    let tmp = make_parsed_fixture();

    Command::cargo_bin("ccord")
        .expect("bin")
        .current_dir(tmp.path())
        .args(["--dry-run", "search", CORPUS, "How", "--out-dir", "results"])
        .assert()
        .success()
        .stdout(predicate::str::contains("DRY RUN"));

    tmp.child("results").assert(predicate::path::missing());
}

#[test]
fn test_json_output_is_parseable_and_exclusive() {
    let tmp = make_parsed_fixture();

    let assert = Command::cargo_bin("ccord")
        .expect("bin")
        .current_dir(tmp.path())
        .args(["--dry-run", "search", CORPUS, "How", "--json"])
        .assert()
        .success();

    let stdout = String::from_utf8(assert.get_output().stdout.clone()).expect("utf8");
    let v: Value = serde_json::from_str(stdout.trim()).expect("json");
    assert_eq!(v.get("match_count").and_then(Value::as_u64), Some(1));
    assert!(v.get("stats").is_some(), "missing stats field");
    assert!(v.get("bil_context").is_some(), "missing context field");
}

#[test]
fn test_deterministic_output_across_runs() {
    let tmp = make_parsed_fixture();

    let run_once = || {
        let out = Command::cargo_bin("ccord")
            .expect("bin")
            .current_dir(tmp.path())
            .args(["--dry-run", "search", CORPUS, ".", "--json"])
            .assert()
            .success()
            .get_output()
            .stdout
            .clone();
        String::from_utf8(out).expect("utf8")
    };

    assert_eq!(run_once(), run_once(), "query output should be deterministic");
}

#[test]
fn test_init_creates_and_protects_config() {
    let tmp = assert_fs::TempDir::new().expect("tempdir");

    Command::cargo_bin("ccord")
        .expect("bin")
        .current_dir(tmp.path())
        .args(["init"])
        .assert()
        .success();

    tmp.child("concord.toml")
        .assert(predicate::str::contains("pre_context"));

    // Second init without --force refuses to overwrite
    Command::cargo_bin("ccord")
        .expect("bin")
        .current_dir(tmp.path())
        .args(["init"])
        .assert()
        .failure();
}

#[test]
fn test_config_defaults_feed_the_query() {
    let tmp = make_parsed_fixture();
    tmp.child("concord.toml")
        .write_str("[search]\npre_context = 2\npost_context = 1\nkeep_annotations = false\n")
        .expect("write config");

    let assert = Command::cargo_bin("ccord")
        .expect("bin")
        .current_dir(tmp.path())
        .args(["--dry-run", "search", CORPUS, "Fine", "--json", "--mode", "mono"])
        .assert()
        .success();

    let stdout = String::from_utf8(assert.get_output().stdout.clone()).expect("utf8");
    let v: Value = serde_json::from_str(stdout.trim()).expect("json");
    let rows = v["mono_context"].as_array().expect("rows");
    // pre_context = 2 comes from the config file
    assert_eq!(rows[0]["pre"].as_array().unwrap().len(), 2);
}

#[test]
fn test_completions_to_stdout() {
    Command::cargo_bin("ccord")
        .expect("bin")
        .args(["completions", "bash", "--stdout"])
        .assert()
        .success()
        .stdout(predicate::str::contains("ccord"));
}
