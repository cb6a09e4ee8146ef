//! End-to-end indexing and query scenarios through the public service API

use capsearch::{
    owned_lines, CapSearchError, CaptionIndex, CaptionIndexApi, CaptionSource, DocIds, Health,
    IndexConfig, IndexFailure, InMemorySource, LineStream, RetrievedCaptions, StagedUpload,
    Variant,
};

fn set(ids: &[&str]) -> DocIds {
    ids.iter().map(|s| s.to_string()).collect()
}

fn lines(text: &str) -> LineStream {
    owned_lines(text.to_owned())
}

/// Source whose platform is always unreachable
struct UnavailableSource;

#[async_trait::async_trait]
impl CaptionSource for UnavailableSource {
    async fn fetch(&self, locator: &str) -> Result<RetrievedCaptions, CapSearchError> {
        Err(CapSearchError::Retrieval(format!("video unavailable: {}", locator)))
    }
}

#[tokio::test]
async fn test_phrase_query_matches_whole_line_only() {
    let index = CaptionIndex::default();
    let outcome = index
        .index("v1".into(), lines("the quick brown fox"), Variant::Tokens)
        .await
        .unwrap();
    assert!(outcome.is_success());

    assert_eq!(index.query_phrase("the quick brown fox"), set(&["v1"]));
    assert!(index.query_phrase("the quick").is_empty());
}

#[tokio::test]
async fn test_intersection_across_documents() {
    let index = CaptionIndex::default();
    index
        .index("v1".into(), lines("quick\nfox"), Variant::Chars)
        .await
        .unwrap();
    index
        .index("v2".into(), lines("quick\ndog"), Variant::Chars)
        .await
        .unwrap();

    assert_eq!(index.query_intersection("quick fox"), set(&["v1"]));
    assert_eq!(index.query_intersection("quick"), set(&["v1", "v2"]));
}

#[tokio::test]
async fn test_retrieval_failure_indexes_nothing() {
    let index = CaptionIndex::default();
    let outcome = index
        .index_from_source(&UnavailableSource, "https://video.example/watch?v=gone")
        .await
        .unwrap();

    match outcome.failure() {
        Some(IndexFailure::RetrievalFailure(reason)) => {
            assert!(reason.contains("video unavailable"))
        }
        other => panic!("expected retrieval failure, got {:?}", other),
    }
    assert!(index.query_phrase("video unavailable").is_empty());
    assert!(index.query_intersection("video").is_empty());
    assert_eq!(index.stats().documents, 0);
}

/// Source whose connection drops after the first cue
struct DroppingSource;

#[async_trait::async_trait]
impl CaptionSource for DroppingSource {
    async fn fetch(&self, _locator: &str) -> Result<RetrievedCaptions, CapSearchError> {
        let lines = vec![
            Ok("WEBVTT".to_string()),
            Ok(String::new()),
            Ok("00:00:00.000 --> 00:00:02.000".to_string()),
            Ok("first cue text".to_string()),
            Ok(String::new()),
            Err(CapSearchError::Retrieval("connection reset after 1 cue".into())),
            Ok("00:00:02.000 --> 00:00:04.000".to_string()),
            Ok("second cue text".to_string()),
        ];
        Ok(RetrievedCaptions::new("partial", Box::new(lines.into_iter())))
    }
}

#[tokio::test]
async fn test_mid_document_failure_keeps_inserted_lines() {
    let index = CaptionIndex::default();
    let outcome = index
        .index_from_source(&DroppingSource, "https://video.example/partial")
        .await
        .unwrap();

    assert!(!outcome.is_success());
    assert_eq!(
        outcome.failure(),
        Some(&IndexFailure::RetrievalFailure("connection reset after 1 cue".into()))
    );
    // No rollback: the cue read before the drop stays searchable
    assert_eq!(index.query_phrase("first cue text"), set(&["partial"]));
    assert_eq!(index.query_intersection("fir cue"), set(&["partial"]));
    assert!(index.query_phrase("second cue text").is_empty());
    assert!(index.query_intersection("second").is_empty());
}

#[tokio::test]
async fn test_vtt_document_from_source() {
    let vtt = "WEBVTT\nKind: captions\nLanguage: en\n\n\
               00:00:00.000 --> 00:00:03.000\nWe're no <c.yellow>strangers</c> to love\n\n\
               00:00:03.000 --> 00:00:06.000\nYou know the rules and so do I\n";
    let source = InMemorySource::new().with_captions("https://video.example/rick", "dQw4w9WgXcQ", vtt);
    let index = CaptionIndex::default();

    let outcome = index
        .index_from_source(&source, "https://video.example/rick")
        .await
        .unwrap();
    assert_eq!(outcome.doc_id(), Some("dQw4w9WgXcQ"));

    assert_eq!(index.query_phrase("we're no strangers to love"), set(&["dQw4w9WgXcQ"]));
    assert_eq!(index.query_intersection("stra rul"), set(&["dQw4w9WgXcQ"]));
    assert!(index.query_intersection("captions").is_empty());
    assert!(index.query_intersection("yellow").is_empty());
}

#[tokio::test]
async fn test_upload_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("lecture.srt");
    std::fs::write(
        &path,
        "1\n00:00:01,000 --> 00:00:04,000\nWelcome to the lecture\n\n2\n00:00:04,000 --> 00:00:06,000\nToday we talk about tries\n",
    )
    .unwrap();

    let index = CaptionIndex::default();
    let upload = StagedUpload::from_path("lecture-01", &path).unwrap();
    let outcome = index.index_upload(upload).await.unwrap();
    assert!(outcome.is_success());

    assert_eq!(index.query_phrase("welcome to the lecture"), set(&["lecture-01"]));
    assert_eq!(index.query_intersection("tri tod"), set(&["lecture-01"]));
    assert!(index.query_phrase("lecture today").is_empty());
}

#[test]
fn test_upload_rejected_before_indexing() {
    let err = StagedUpload::validate("v1", "slides.pdf", b"%PDF".to_vec()).unwrap_err();
    assert!(matches!(err, CapSearchError::InvalidInput(_)));
}

#[tokio::test]
async fn test_unknown_terms_return_empty() {
    let index = CaptionIndex::default();
    assert!(index.query_phrase("nothing indexed yet").is_empty());
    assert!(index.query_intersection("nothing").is_empty());
    assert_eq!(index.health(), Health::Ok);
}

#[tokio::test]
async fn test_outcome_json_shape() {
    let index = CaptionIndex::new(IndexConfig::default());
    let ok = index
        .index("v1".into(), lines("hello world"), Variant::Both)
        .await
        .unwrap();
    let failed = index
        .index("v2".into(), lines("00:00:00.000 --> 00:00:01.000"), Variant::Both)
        .await
        .unwrap();

    let ok = serde_json::to_value(&ok).unwrap();
    assert_eq!(ok["status"], "indexed");
    assert_eq!(ok["lines"], 1);

    let failed = serde_json::to_value(&failed).unwrap();
    assert_eq!(failed["status"], "failed");
    assert_eq!(failed["failure"]["kind"], "no_indexable_content");
}

#[tokio::test]
async fn test_clear_then_reindex() {
    let index = CaptionIndex::default();
    index
        .index("v1".into(), lines("first pass"), Variant::Both)
        .await
        .unwrap();
    index.clear();
    assert!(index.query_phrase("first pass").is_empty());

    index
        .index("v2".into(), lines("second pass"), Variant::Both)
        .await
        .unwrap();
    assert_eq!(index.query_intersection("pass"), set(&["v2"]));
    assert_eq!(index.stats().documents, 1);
}
