//! Plain concatenation of compiled submissions.

use bidbind::merge::merge_submissions;
use tempfile::TempDir;

use crate::common::{load_output, make_pdf, page_strings};

#[tokio::test]
async fn test_merge_concatenates_in_order() {
    let temp_dir = TempDir::new().unwrap();
    let a = make_pdf(&temp_dir, "a.pdf", 2, "alpha");
    let b = make_pdf(&temp_dir, "b.pdf", 3, "bravo");
    let output_path = temp_dir.path().join("all.pdf");

    let outcome = merge_submissions(&[a, b], &output_path).await.unwrap();

    assert_eq!(outcome.files_merged, 2);
    assert_eq!(outcome.total_pages, 5);
    assert!(outcome.skipped.is_empty());
    assert!(outcome.file_size > 0);

    let doc = load_output(&output_path);
    assert_eq!(doc.get_pages().len(), 5);
    assert!(page_strings(&doc, 1).contains(&"alpha page 1".to_string()));
    assert!(page_strings(&doc, 3).contains(&"bravo page 1".to_string()));
    assert!(page_strings(&doc, 5).contains(&"bravo page 3".to_string()));
}

#[tokio::test]
async fn test_merge_adds_no_decorations() {
    let temp_dir = TempDir::new().unwrap();
    let a = make_pdf(&temp_dir, "a.pdf", 1, "alpha");
    let output_path = temp_dir.path().join("all.pdf");

    merge_submissions(&[a], &output_path).await.unwrap();

    let doc = load_output(&output_path);
    let strings = page_strings(&doc, 1);
    assert!(
        !strings.iter().any(|s| s.starts_with("Page no : ")),
        "merger must not add footers: {strings:?}"
    );
    assert!(!strings.iter().any(|s| s == "INDEX"));
}

#[tokio::test]
async fn test_merge_skips_missing_and_unreadable_inputs() {
    let temp_dir = TempDir::new().unwrap();
    let good = make_pdf(&temp_dir, "good.pdf", 2, "good");
    let missing = temp_dir.path().join("missing.pdf");
    let garbage = temp_dir.path().join("garbage.pdf");
    std::fs::write(&garbage, b"not a pdf at all").unwrap();
    let output_path = temp_dir.path().join("all.pdf");

    let outcome = merge_submissions(&[missing.clone(), good, garbage.clone()], &output_path)
        .await
        .unwrap();

    assert_eq!(outcome.files_merged, 1);
    assert_eq!(outcome.total_pages, 2);
    assert_eq!(outcome.skipped.len(), 2);
    assert_eq!(outcome.skipped[0].path, missing);
    assert_eq!(outcome.skipped[1].path, garbage);

    let doc = load_output(&output_path);
    assert_eq!(doc.get_pages().len(), 2);
}

#[tokio::test]
async fn test_merge_empty_input_list_writes_zero_page_pdf() {
    let temp_dir = TempDir::new().unwrap();
    let output_path = temp_dir.path().join("all.pdf");

    let outcome = merge_submissions(&[], &output_path).await.unwrap();

    assert_eq!(outcome.files_merged, 0);
    assert_eq!(outcome.total_pages, 0);
    assert!(output_path.exists());

    let doc = load_output(&output_path);
    assert_eq!(doc.get_pages().len(), 0);
}
