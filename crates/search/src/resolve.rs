//! Two-tier query resolution.
//!
//! Free-form user text is mapped to a canonical query before embedding:
//! first an exact per-token lookup in a domain term table, then a
//! whole-query lookup, and only then the external translation service.
//! Translator failure degrades to the original text rather than failing
//! the request.

use crate::error::Result;
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

/// External translation collaborator.
#[async_trait]
pub trait Translator: Send + Sync {
    async fn translate(&self, text: &str) -> Result<String>;
}

/// Read-only domain term mapping (e.g. local-language fashion terms to the
/// vocabulary the embedding model was trained on).
#[derive(Debug, Clone, Default)]
pub struct TermTable {
    terms: HashMap<String, String>,
}

#[derive(Deserialize)]
struct PersistedTermTable {
    terms: HashMap<String, String>,
}

impl TermTable {
    #[must_use]
    pub fn new(terms: HashMap<String, String>) -> Self {
        let terms = terms
            .into_iter()
            .map(|(k, v)| (k.to_lowercase(), v))
            .collect();
        Self { terms }
    }

    /// Load a `{"terms": {...}}` JSON file.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let bytes = tokio::fs::read(path.as_ref())
            .await
            .map_err(stylefind_vector_store::VectorStoreError::from)?;
        let persisted: PersistedTermTable = serde_json::from_slice(&bytes)
            .map_err(stylefind_vector_store::VectorStoreError::from)?;
        Ok(Self::new(persisted.terms))
    }

    #[must_use]
    pub fn lookup(&self, term: &str) -> Option<&str> {
        self.terms.get(term).map(String::as_str)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}

/// Resolves user queries to canonical form via table-then-translator.
pub struct QueryResolver {
    table: TermTable,
    translator: Option<Box<dyn Translator>>,
}

impl QueryResolver {
    #[must_use]
    pub fn new(table: TermTable, translator: Option<Box<dyn Translator>>) -> Self {
        Self { table, translator }
    }

    /// Canonicalize `query`. Never fails: with no table hit and no usable
    /// translator the original text is returned unchanged.
    pub async fn resolve(&self, query: &str) -> String {
        let lowered = query.trim().to_lowercase();
        if lowered.is_empty() {
            return lowered;
        }

        // Tier 1: per-token substitution.
        let mut any_hit = false;
        let tokens: Vec<&str> = lowered
            .split_whitespace()
            .map(|token| match self.table.lookup(token) {
                Some(replacement) => {
                    any_hit = true;
                    replacement
                }
                None => token,
            })
            .collect();
        if any_hit {
            let resolved = tokens.join(" ");
            log::debug!("Resolved query via term table: '{query}' -> '{resolved}'");
            return resolved;
        }

        // Tier 2: the whole query as one term.
        if let Some(resolved) = self.table.lookup(&lowered) {
            log::debug!("Resolved query via term table: '{query}' -> '{resolved}'");
            return resolved.to_string();
        }

        // Tier 3: external translator, degrading to the original on failure.
        if let Some(translator) = &self.translator {
            match translator.translate(&lowered).await {
                Ok(translated) => {
                    let translated = translated.trim().to_string();
                    if !translated.is_empty() {
                        log::debug!("Resolved query via translator: '{query}' -> '{translated}'");
                        return translated;
                    }
                }
                Err(e) => {
                    log::warn!("Translation failed, using original query: {e}");
                }
            }
        }
        lowered
    }
}
