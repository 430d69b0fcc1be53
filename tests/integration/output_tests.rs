use mimedupe::duplicates::{ByteComparator, DuplicateFinder};
use mimedupe::error::ExitCode;
use mimedupe::output::{JsonOutput, ScanSummary, TextOutput};
use mimedupe::scanner::{Collector, FileCommandDetector, WalkerConfig};
use std::fs;
use std::path::Path;
use std::time::Duration;
use tempfile::tempdir;

struct Report {
    text: String,
    json: serde_json::Value,
}

fn report(root: &Path) -> Report {
    let mut collection =
        Collector::new(WalkerConfig::default(), FileCommandDetector::new()).collect(&[root]);
    collection.catalog.sort();
    let outcome = DuplicateFinder::new(ByteComparator::new())
        .find_duplicates(&mut collection.catalog)
        .unwrap();

    let groups = outcome.groups(&collection.catalog);
    let summary = ScanSummary::from_stats(
        &collection.stats,
        &outcome.stats,
        collection.catalog.total_size(),
        Duration::from_millis(3),
    );
    let exit_code = ExitCode::for_run(summary.interrupted, summary.has_errors());

    let text = TextOutput::new(&groups, &summary).render();
    let mut buffer = Vec::new();
    JsonOutput::new(&groups, &outcome.failures, &summary, exit_code)
        .write_to(&mut buffer, false)
        .unwrap();

    Report {
        text,
        json: serde_json::from_slice(&buffer).unwrap(),
    }
}

#[test]
fn test_text_report_lists_sets_with_canonical_paths() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.txt"), b"hello").unwrap();
    fs::write(dir.path().join("b.txt"), b"hello").unwrap();
    fs::write(dir.path().join("c.txt"), b"other content").unwrap();
    let root = dir.path().canonicalize().unwrap();

    let report = report(dir.path());

    let expected = format!(
        "\n--- Duplicate Sets Found ---\n\
         \nSet 1 (Size: 5 bytes):\n  {a}\n  {b}\n\
         \n--- End of Duplicate Sets ---\n",
        a = root.join("a.txt").display(),
        b = root.join("b.txt").display(),
    );
    assert_eq!(report.text, expected);
}

#[test]
fn test_text_report_without_duplicates() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.txt"), b"one").unwrap();
    fs::write(dir.path().join("b.txt"), b"two!").unwrap();

    let report = report(dir.path());

    assert_eq!(
        report.text,
        "No duplicate files found among the processed files.\n"
    );
}

#[test]
fn test_text_report_single_file() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("only.txt"), b"alone").unwrap();

    let report = report(dir.path());

    assert_eq!(
        report.text,
        "Not enough files to compare for duplicates, or no files found.\n"
    );
}

#[test]
fn test_text_report_empty_directory() {
    let dir = tempdir().unwrap();

    let report = report(dir.path());

    assert_eq!(
        report.text,
        "No files found matching criteria in the specified valid directories.\n"
    );
}

#[test]
fn test_text_report_missing_root() {
    let dir = tempdir().unwrap();

    let report = report(&dir.path().join("missing"));

    assert_eq!(report.text, "No valid directories could be processed.\n");
    assert_eq!(report.json["summary"]["roots_failed"], 1);
    assert_eq!(report.json["summary"]["exit_code_name"], "MD003");
}

#[test]
fn test_json_report_structure() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.bin"), b"0123456789").unwrap();
    fs::write(dir.path().join("b.bin"), b"0123456789").unwrap();
    fs::write(dir.path().join("c.bin"), b"0123456789").unwrap();
    fs::write(dir.path().join("d.bin"), b"xyz").unwrap();

    let report = report(dir.path());
    let json = &report.json;

    let duplicates = json["duplicates"].as_array().unwrap();
    assert_eq!(duplicates.len(), 1);
    assert_eq!(duplicates[0]["size"], 10);
    assert_eq!(duplicates[0]["files"].as_array().unwrap().len(), 3);
    assert!(json["errors"].as_array().unwrap().is_empty());

    let summary = &json["summary"];
    assert_eq!(summary["total_files"], 4);
    assert_eq!(summary["total_size"], 33);
    assert_eq!(summary["unique_by_size"], 1);
    assert_eq!(summary["duplicate_sets"], 1);
    assert_eq!(summary["duplicate_files"], 2);
    assert_eq!(summary["reclaimable_space"], 20);
    assert_eq!(summary["scan_duration_ms"], 3);
    assert_eq!(summary["interrupted"], false);
    assert_eq!(summary["exit_code"], 0);
    assert_eq!(summary["exit_code_name"], "MD000");
}
