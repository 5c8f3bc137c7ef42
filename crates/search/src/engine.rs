use arc_swap::ArcSwapOption;
use std::path::Path;
use std::sync::Arc;

use crate::error::Result;
use stylefind_vector_store::HnswIndex;

/// Process-wide handle to the loaded approximate index.
///
/// The index is immutable once built; the only sanctioned mutation is
/// swapping in a freshly built one. In-flight queries keep the `Arc` they
/// loaded, so a swap never disturbs them. An empty handle means the exact
/// fallback engine is active.
#[derive(Default)]
pub struct IndexHandle {
    inner: ArcSwapOption<HnswIndex>,
}

impl IndexHandle {
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Load the artifact at `path` if it exists.
    ///
    /// A missing artifact is not an error: it silently leaves the handle
    /// empty and the fallback engine active. A present-but-unreadable
    /// artifact is surfaced.
    pub async fn load_artifact(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            log::info!(
                "No index artifact at {}, exact fallback engine active",
                path.display()
            );
            return Ok(Self::empty());
        }
        let index = HnswIndex::load(path).await?;
        let handle = Self::empty();
        handle.swap(index);
        Ok(handle)
    }

    /// Publish a rebuilt index atomically.
    pub fn swap(&self, index: HnswIndex) {
        self.inner.store(Some(Arc::new(index)));
    }

    /// Current index, if one is loaded.
    #[must_use]
    pub fn current(&self) -> Option<Arc<HnswIndex>> {
        self.inner.load_full()
    }

    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.inner.load().is_some()
    }
}
