use crate::embedder::Embedder;
use crate::error::{Result, SearchError};
use crate::resolve::QueryResolver;
use crate::searcher::{elapsed_ms, Searcher};
use std::sync::Arc;
use std::time::Instant;
use stylefind_protocol::{Filters, SearchResponse};

/// Text and image search entry point.
///
/// Composes query resolution, the embedding producer and the orchestrator.
/// All collaborators are injected at construction and shared read-only, per
/// the process lifecycle: initialized once at startup, replaced never.
pub struct SearchService {
    searcher: Searcher,
    embedder: Arc<dyn Embedder>,
    resolver: QueryResolver,
}

impl SearchService {
    #[must_use]
    pub fn new(searcher: Searcher, embedder: Arc<dyn Embedder>, resolver: QueryResolver) -> Self {
        Self {
            searcher,
            embedder,
            resolver,
        }
    }

    /// Search by free-form text. The reported time covers resolution,
    /// embedding and search.
    pub async fn search_text(
        &self,
        query: &str,
        top_k: usize,
        filters: &Filters,
    ) -> Result<SearchResponse> {
        if query.trim().is_empty() {
            return Err(SearchError::EmptyQuery);
        }
        let started = Instant::now();
        let canonical = self.resolver.resolve(query).await;
        let vector = self.embedder.embed_text(&canonical).await?;
        let results = self.searcher.search_vector(&vector, top_k, filters)?;
        Ok(SearchResponse {
            results,
            search_time_ms: elapsed_ms(started),
        })
    }

    /// Search by image blob. No resolution tier: the blob goes straight to
    /// the embedding producer.
    pub async fn search_image(
        &self,
        image: &[u8],
        top_k: usize,
        filters: &Filters,
    ) -> Result<SearchResponse> {
        if image.is_empty() {
            return Err(SearchError::EmptyQuery);
        }
        let started = Instant::now();
        let vector = self.embedder.embed_image(image).await?;
        let results = self.searcher.search_vector(&vector, top_k, filters)?;
        Ok(SearchResponse {
            results,
            search_time_ms: elapsed_ms(started),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::IndexHandle;
    use crate::resolve::TermTable;
    use crate::searcher::SearchTuning;
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;
    use stylefind_vector_store::VectorStore;

    /// Maps a handful of known phrases to fixed vectors.
    struct TableEmbedder(HashMap<String, Vec<f32>>);

    #[async_trait]
    impl Embedder for TableEmbedder {
        fn dimension(&self) -> usize {
            3
        }

        async fn embed_text(&self, text: &str) -> Result<Vec<f32>> {
            self.0
                .get(text)
                .cloned()
                .ok_or_else(|| SearchError::Upstream(format!("no embedding for '{text}'")))
        }

        async fn embed_image(&self, _image: &[u8]) -> Result<Vec<f32>> {
            Ok(vec![1.0, 0.0, 0.0])
        }
    }

    fn service() -> SearchService {
        let mut store = VectorStore::new();
        store.put("WOMEN/Denim/a.jpg", vec![1.0, 0.0, 0.0]).unwrap();
        store.put("MEN/Polo/c.jpg", vec![0.0, 1.0, 0.0]).unwrap();

        let searcher = Searcher::new(
            Arc::new(store),
            Arc::new(IndexHandle::empty()),
            SearchTuning::default(),
        );
        let embedder = TableEmbedder(HashMap::from([
            ("denim".to_string(), vec![1.0, 0.0, 0.0]),
            ("polo shirt".to_string(), vec![0.0, 1.0, 0.0]),
        ]));
        let resolver = QueryResolver::new(
            TermTable::new(HashMap::from([
                ("mezclilla".to_string(), "denim".to_string()),
                ("polo".to_string(), "polo shirt".to_string()),
            ])),
            None,
        );
        SearchService::new(searcher, Arc::new(embedder), resolver)
    }

    #[tokio::test]
    async fn text_query_is_resolved_then_embedded() {
        let response = service()
            .search_text("Mezclilla", 1, &Filters::default())
            .await
            .unwrap();
        assert_eq!(response.results[0].path, "WOMEN/Denim/a.jpg");
        assert!(response.search_time_ms >= 0.0);
    }

    #[tokio::test]
    async fn empty_query_is_rejected() {
        let err = service()
            .search_text("   ", 5, &Filters::default())
            .await
            .unwrap_err();
        assert!(matches!(err, SearchError::EmptyQuery));
    }

    #[tokio::test]
    async fn embedder_failure_propagates_as_upstream() {
        let err = service()
            .search_text("unknown phrase", 5, &Filters::default())
            .await
            .unwrap_err();
        assert!(matches!(err, SearchError::Upstream(_)));
    }

    #[tokio::test]
    async fn image_query_skips_resolution() {
        let response = service()
            .search_image(&[0xFF, 0xD8], 1, &Filters::default())
            .await
            .unwrap();
        assert_eq!(response.results[0].path, "WOMEN/Denim/a.jpg");
    }
}
