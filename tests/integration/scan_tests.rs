use mimedupe::duplicates::{ByteComparator, DuplicateFinder, DuplicateGroup, GroupingOutcome};
use mimedupe::scanner::{
    Collection, Collector, ContentTypeDetector, FileCommandDetector, MimeFilter, WalkerConfig,
};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::tempdir;

/// Types files by extension so tests do not depend on `file(1)`.
struct ExtensionDetector;

impl ContentTypeDetector for ExtensionDetector {
    fn detect(&self, path: &Path) -> String {
        match path.extension().and_then(|e| e.to_str()) {
            Some("txt") => "text/plain",
            Some("png") => "image/png",
            Some("gif") => "image/gif",
            _ => "application/octet-stream",
        }
        .to_string()
    }
}

fn write(path: &Path, content: &[u8]) -> PathBuf {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
    path.canonicalize().unwrap()
}

fn scan<P: AsRef<Path>>(roots: &[P], config: WalkerConfig) -> (Collection, GroupingOutcome) {
    scan_with(roots, Collector::new(config, FileCommandDetector::new()))
}

fn scan_with<P: AsRef<Path>, D: ContentTypeDetector>(
    roots: &[P],
    collector: Collector<D>,
) -> (Collection, GroupingOutcome) {
    let mut collection = collector.collect(roots);
    collection.catalog.sort();
    let outcome = DuplicateFinder::new(ByteComparator::new())
        .find_duplicates(&mut collection.catalog)
        .unwrap();
    (collection, outcome)
}

fn groups(collection: &Collection, outcome: &GroupingOutcome) -> Vec<DuplicateGroup> {
    outcome.groups(&collection.catalog)
}

fn recursive() -> WalkerConfig {
    WalkerConfig {
        recursive: true,
        ..Default::default()
    }
}

#[test]
fn test_scan_empty_directory() {
    let dir = tempdir().unwrap();

    let (collection, outcome) = scan(&[dir.path()], WalkerConfig::default());

    assert!(collection.catalog.is_empty());
    assert!(outcome.sets.is_empty());
    assert!(outcome.failures.is_empty());
    assert_eq!(collection.stats.roots_scanned, 1);
}

#[test]
fn test_scan_unique_files() {
    let dir = tempdir().unwrap();
    write(&dir.path().join("a.txt"), b"content a");
    write(&dir.path().join("b.txt"), b"content bb");
    write(&dir.path().join("c.txt"), b"content ccc");

    let (collection, outcome) = scan(&[dir.path()], WalkerConfig::default());

    assert_eq!(collection.catalog.len(), 3);
    assert!(outcome.sets.is_empty());
    assert_eq!(outcome.stats.unique_by_size, 3);
    assert_eq!(outcome.stats.comparisons, 0);
}

#[test]
fn test_scan_duplicate_files() {
    let dir = tempdir().unwrap();
    let a = write(&dir.path().join("a.txt"), b"duplicate");
    let b = write(&dir.path().join("b.txt"), b"duplicate");
    write(&dir.path().join("c.txt"), b"unique");

    let (collection, outcome) = scan(&[dir.path()], WalkerConfig::default());
    let groups = groups(&collection, &outcome);

    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].size, 9);
    assert_eq!(groups[0].files, vec![a, b]);
    assert_eq!(outcome.stats.reclaimable_space, 9);
}

#[test]
fn test_same_size_different_content_splits() {
    let dir = tempdir().unwrap();
    let a = write(&dir.path().join("a.bin"), b"0123456789");
    let b = write(&dir.path().join("b.bin"), b"0123456789");
    write(&dir.path().join("c.bin"), b"9876543210");

    let (collection, outcome) = scan(&[dir.path()], WalkerConfig::default());
    let groups = groups(&collection, &outcome);

    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].files, vec![a, b]);
    assert_eq!(outcome.stats.comparisons, 2);
}

#[test]
fn test_two_sub_clusters_in_one_size_block() {
    let dir = tempdir().unwrap();
    let a = write(&dir.path().join("a"), b"xxxx");
    let b = write(&dir.path().join("b"), b"yyyy");
    let c = write(&dir.path().join("c"), b"xxxx");
    let d = write(&dir.path().join("d"), b"yyyy");

    let (collection, outcome) = scan(&[dir.path()], WalkerConfig::default());
    let groups = groups(&collection, &outcome);

    assert_eq!(groups.len(), 2);
    assert_eq!(groups[0].files, vec![a, c]);
    assert_eq!(groups[1].files, vec![b, d]);
}

#[test]
fn test_sets_are_ordered_by_size() {
    let dir = tempdir().unwrap();
    write(&dir.path().join("big1"), b"bigger content");
    write(&dir.path().join("big2"), b"bigger content");
    write(&dir.path().join("small1"), b"tiny");
    write(&dir.path().join("small2"), b"tiny");

    let (collection, outcome) = scan(&[dir.path()], WalkerConfig::default());
    let groups = groups(&collection, &outcome);

    let sizes: Vec<u64> = groups.iter().map(|g| g.size).collect();
    assert_eq!(sizes, vec![4, 14]);
}

#[test]
fn test_non_recursive_ignores_subdirectories() {
    let dir = tempdir().unwrap();
    write(&dir.path().join("top.txt"), b"same");
    write(&dir.path().join("sub/nested.txt"), b"same");

    let (collection, outcome) = scan(&[dir.path()], WalkerConfig::default());

    assert_eq!(collection.catalog.len(), 1);
    assert!(outcome.sets.is_empty());
}

#[test]
fn test_recursive_finds_nested_duplicates() {
    let dir = tempdir().unwrap();
    let nested = write(&dir.path().join("sub/deeper/nested.txt"), b"same");
    let top = write(&dir.path().join("top.txt"), b"same");

    let (collection, outcome) = scan(&[dir.path()], recursive());
    let groups = groups(&collection, &outcome);

    assert_eq!(groups.len(), 1);
    let mut expected = vec![nested, top];
    expected.sort_by(|a, b| {
        a.as_os_str()
            .as_encoded_bytes()
            .cmp(b.as_os_str().as_encoded_bytes())
    });
    assert_eq!(groups[0].files, expected);
}

#[test]
fn test_overlapping_roots_collect_each_file_once() {
    let dir = tempdir().unwrap();
    write(&dir.path().join("sub/a.txt"), b"same");
    write(&dir.path().join("sub/b.txt"), b"same");

    let roots = vec![dir.path().to_path_buf(), dir.path().join("sub")];
    let (collection, outcome) = scan(&roots, recursive());

    assert_eq!(collection.catalog.len(), 2);
    assert_eq!(collection.stats.already_collected, 2);
    assert_eq!(outcome.sets.len(), 1);
    assert_eq!(outcome.sets[0].len(), 2);
}

#[test]
fn test_same_root_twice() {
    let dir = tempdir().unwrap();
    write(&dir.path().join("a.txt"), b"same");
    write(&dir.path().join("b.txt"), b"same");

    let roots = vec![dir.path(), dir.path()];
    let (collection, outcome) = scan(&roots, WalkerConfig::default());

    assert_eq!(collection.catalog.len(), 2);
    assert_eq!(outcome.sets.len(), 1);
}

#[test]
fn test_duplicates_across_roots() {
    let first = tempdir().unwrap();
    let second = tempdir().unwrap();
    write(&first.path().join("photo.png"), b"pixels");
    write(&second.path().join("copy.png"), b"pixels");

    let (collection, outcome) = scan(&[first.path(), second.path()], WalkerConfig::default());

    assert_eq!(collection.stats.roots_scanned, 2);
    assert_eq!(outcome.sets.len(), 1);
}

#[test]
fn test_empty_files_excluded_by_default() {
    let dir = tempdir().unwrap();
    write(&dir.path().join("empty1"), b"");
    write(&dir.path().join("empty2"), b"");

    let (collection, outcome) = scan(&[dir.path()], WalkerConfig::default());

    assert!(collection.catalog.is_empty());
    assert!(outcome.sets.is_empty());
}

#[test]
fn test_empty_files_are_identical_when_included() {
    let dir = tempdir().unwrap();
    let a = write(&dir.path().join("empty1"), b"");
    let b = write(&dir.path().join("empty2"), b"");

    let config = WalkerConfig {
        include_empty: true,
        ..Default::default()
    };
    let (collection, outcome) = scan(&[dir.path()], config);
    let groups = groups(&collection, &outcome);

    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].size, 0);
    assert_eq!(groups[0].files, vec![a, b]);
    assert_eq!(groups[0].wasted_space(), 0);
}

#[test]
fn test_size_filters() {
    let dir = tempdir().unwrap();
    write(&dir.path().join("s1"), b"ab");
    write(&dir.path().join("s2"), b"ab");
    write(&dir.path().join("m1"), b"abcdef");
    write(&dir.path().join("m2"), b"abcdef");
    write(&dir.path().join("l1"), b"abcdefghijkl");
    write(&dir.path().join("l2"), b"abcdefghijkl");

    let config = WalkerConfig {
        min_size: Some(3),
        max_size: Some(10),
        ..Default::default()
    };
    let (collection, outcome) = scan(&[dir.path()], config);
    let groups = groups(&collection, &outcome);

    assert_eq!(collection.catalog.len(), 2);
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].size, 6);
}

#[test]
fn test_skip_hidden() {
    let dir = tempdir().unwrap();
    write(&dir.path().join("visible"), b"same");
    write(&dir.path().join(".hidden"), b"same");

    let config = WalkerConfig {
        skip_hidden: true,
        ..Default::default()
    };
    let (collection, _) = scan(&[dir.path()], config);
    assert_eq!(collection.catalog.len(), 1);

    let (collection, outcome) = scan(&[dir.path()], WalkerConfig::default());
    assert_eq!(collection.catalog.len(), 2);
    assert_eq!(outcome.sets.len(), 1);
}

#[test]
fn test_mime_filter_keeps_selected_types() {
    let dir = tempdir().unwrap();
    let a = write(&dir.path().join("a.png"), b"same");
    let b = write(&dir.path().join("b.gif"), b"same");
    write(&dir.path().join("c.txt"), b"same");

    let collector = Collector::new(WalkerConfig::default(), ExtensionDetector)
        .with_mime_filter(MimeFilter::new(["image/*"]));
    let (collection, outcome) = scan_with(&[dir.path()], collector);
    let groups = groups(&collection, &outcome);

    assert_eq!(collection.stats.filtered_by_type, 1);
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].files, vec![a, b]);
}

#[test]
fn test_mime_filter_exact_type() {
    let dir = tempdir().unwrap();
    write(&dir.path().join("a.png"), b"same");
    write(&dir.path().join("b.gif"), b"same");

    let collector = Collector::new(WalkerConfig::default(), ExtensionDetector)
        .with_mime_filter(MimeFilter::new(["image/png"]));
    let (collection, outcome) = scan_with(&[dir.path()], collector);

    assert_eq!(collection.catalog.len(), 1);
    assert_eq!(collection.catalog[0].content_type(), "image/png");
    assert!(outcome.sets.is_empty());
}

#[test]
fn test_content_type_is_default_without_filter() {
    let dir = tempdir().unwrap();
    write(&dir.path().join("a.png"), b"data");

    let collector = Collector::new(WalkerConfig::default(), ExtensionDetector);
    let (collection, _) = scan_with(&[dir.path()], collector);

    assert_eq!(
        collection.catalog[0].content_type(),
        mimedupe::duplicates::DEFAULT_CONTENT_TYPE
    );
}

#[test]
fn test_collected_paths_are_absolute() {
    let dir = tempdir().unwrap();
    write(&dir.path().join("a.txt"), b"one");

    let (collection, _) = scan(&[dir.path()], WalkerConfig::default());

    assert!(collection.catalog.iter().all(|r| r.path().is_absolute()));
}

#[cfg(unix)]
#[test]
fn test_symlinks_are_not_collected() {
    use std::os::unix::fs::symlink;

    let dir = tempdir().unwrap();
    let target = write(&dir.path().join("target.txt"), b"content");
    symlink(&target, dir.path().join("link.txt")).unwrap();

    let (collection, outcome) = scan(&[dir.path()], WalkerConfig::default());

    assert_eq!(collection.catalog.len(), 1);
    assert_eq!(collection.catalog[0].path(), target.as_path());
    assert!(outcome.sets.is_empty());
}

#[cfg(unix)]
#[test]
fn test_symlinked_directory_is_not_followed() {
    use std::os::unix::fs::symlink;

    let dir = tempdir().unwrap();
    let other = tempdir().unwrap();
    write(&dir.path().join("a.txt"), b"same");
    write(&other.path().join("b.txt"), b"same");
    symlink(other.path(), dir.path().join("linked")).unwrap();

    let (collection, outcome) = scan(&[dir.path()], recursive());

    assert_eq!(collection.catalog.len(), 1);
    assert!(outcome.sets.is_empty());
}
