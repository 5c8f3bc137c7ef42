use crate::error::Result;
use async_trait::async_trait;

/// Embedding producer collaborator.
///
/// Maps a text string or an image blob into the collection's similarity
/// space. The search core never knows how the vector was produced; failures
/// surface as [`crate::SearchError::Upstream`].
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Fixed output dimensionality.
    fn dimension(&self) -> usize;

    async fn embed_text(&self, text: &str) -> Result<Vec<f32>>;

    async fn embed_image(&self, image: &[u8]) -> Result<Vec<f32>>;
}
