use super::*;
use tempfile::TempDir;

fn seeded_dir() -> TempDir {
    let dir = TempDir::new().expect("temp dir");
    std::fs::write(
        dir.path().join("legacy_tests.csv"),
        "ID,Description\nTC_005,Verify search returns matching products\nTC_009,Verify checkout with saved card\n",
    )
    .expect("write csv");
    std::fs::write(
        dir.path().join("rules.md"),
        "# Cart rules\n\nCart total must include tax.\n\nDiscount codes expire after 30 days.",
    )
    .expect("write md");
    std::fs::write(dir.path().join("diagram.png"), [0u8, 1, 2]).expect("write png");
    dir
}

#[test]
fn test_ingest_skips_unsupported_files() {
    let dir = seeded_dir();
    let kb = FileKnowledgeBase::ingest(dir.path(), 800, 3).expect("ingest");
    assert!(kb.chunk_count() > 0);
    assert!(kb
        .search("png")
        .iter()
        .all(|p| !p.source.ends_with(".png")));
}

#[test]
fn test_ingest_missing_dir_is_error() {
    let dir = TempDir::new().expect("temp dir");
    let missing = dir.path().join("nope");
    let err = FileKnowledgeBase::ingest(&missing, 800, 3)
        .err()
        .expect("missing dir must fail");
    assert!(err.to_string().contains("not found"));
}

#[test]
fn test_search_ranks_by_term_overlap() {
    let dir = seeded_dir();
    // Small chunks so each CSV row stands alone.
    let kb = FileKnowledgeBase::ingest(dir.path(), 60, 3).expect("ingest");

    let results = kb.search("legacy test case for search returns matching products");
    assert!(!results.is_empty());
    assert!(results[0].content.contains("TC_005"));
}

#[test]
fn test_search_without_overlap_is_empty() {
    let dir = seeded_dir();
    let kb = FileKnowledgeBase::ingest(dir.path(), 800, 3).expect("ingest");
    assert!(kb.search("zebra quantum").is_empty());
}

#[test]
fn test_search_respects_top_k() {
    let dir = seeded_dir();
    let kb = FileKnowledgeBase::ingest(dir.path(), 10, 1).expect("ingest");
    assert_eq!(kb.search("verify cart tax discount search").len(), 1);
}

#[test]
fn test_chunk_text_packs_paragraphs_up_to_limit() {
    let chunks = chunk_text("alpha\n\nbeta\n\ngamma", 12, false);
    assert_eq!(chunks, vec!["alpha\n\nbeta".to_string(), "gamma".to_string()]);
}

#[test]
fn test_chunk_text_splits_long_paragraph_on_char_boundaries() {
    let chunks = chunk_text("ééééé", 2, false);
    assert_eq!(chunks, vec!["éé", "éé", "é"]);
}

#[test]
fn test_terms_are_lowercase_and_skip_single_chars() {
    let t = terms("Verify TC_005: a Search!");
    assert!(t.contains("verify"));
    assert!(t.contains("tc_005"));
    assert!(t.contains("search"));
    assert!(!t.contains("a"));
}

#[tokio::test]
async fn test_retrieve_rejects_blank_query() {
    let dir = seeded_dir();
    let kb = FileKnowledgeBase::ingest(dir.path(), 800, 3).expect("ingest");
    assert!(matches!(
        kb.retrieve("   ").await,
        Err(RetrievalError::Query(_))
    ));
}
