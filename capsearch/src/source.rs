//! Caption retrieval seam
//!
//! The real retrieval mechanism (a video platform's subtitle download) lives
//! outside this crate. It plugs in through [`CaptionSource`]; failures it
//! reports become `IndexFailure::RetrievalFailure` outcomes.

use crate::interface::{CapSearchError, RetrievedCaptions};
use parking_lot::RwLock;
use std::collections::HashMap;

/// Produces `(video_id, lines)` for a locator such as a video URL.
#[async_trait::async_trait]
pub trait CaptionSource: Send + Sync {
    async fn fetch(&self, locator: &str) -> Result<RetrievedCaptions, CapSearchError>;
}

/// Caption source backed by a map of locator to `(video_id, text)`.
#[derive(Debug, Default)]
pub struct InMemorySource {
    captions: RwLock<HashMap<String, (String, String)>>,
}

impl InMemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, locator: impl Into<String>, video_id: impl Into<String>, text: impl Into<String>) {
        self.captions
            .write()
            .insert(locator.into(), (video_id.into(), text.into()));
    }

    pub fn with_captions(
        self,
        locator: impl Into<String>,
        video_id: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        self.insert(locator, video_id, text);
        self
    }
}

#[async_trait::async_trait]
impl CaptionSource for InMemorySource {
    async fn fetch(&self, locator: &str) -> Result<RetrievedCaptions, CapSearchError> {
        let entry = self.captions.read().get(locator).cloned();
        match entry {
            Some((video_id, text)) => Ok(RetrievedCaptions::from_text(video_id, text)),
            None => Err(CapSearchError::Retrieval(format!(
                "No captions found for {locator}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_source_hit() {
        let source = InMemorySource::new().with_captions(
            "https://video.example/watch?v=abc",
            "abc",
            "WEBVTT\n\nhello there",
        );

        let captions = source.fetch("https://video.example/watch?v=abc").await.unwrap();
        assert_eq!(captions.video_id, "abc");
        assert_eq!(captions.lines.count(), 3);
    }

    #[tokio::test]
    async fn test_in_memory_source_miss() {
        let source = InMemorySource::new();
        let err = source.fetch("https://video.example/missing").await.unwrap_err();
        assert!(matches!(err, CapSearchError::Retrieval(_)));
        assert_eq!(
            err.to_string(),
            "Retrieval error: No captions found for https://video.example/missing"
        );
    }
}
