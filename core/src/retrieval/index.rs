use super::{DocumentMetadata, KnowledgeStore, RetrievedDocument};
use crate::Result;
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::RwLock;
use tracing::debug;

/// In-process keyword-overlap index.
///
/// Scores a document by how many distinct query tokens it contains; a
/// location filter keeps documents scoped to that location or unscoped.
/// Deterministic for a fixed insertion sequence.
pub struct InMemoryIndex {
    entries: RwLock<Vec<RetrievedDocument>>,
}

impl InMemoryIndex {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(Vec::new()),
        }
    }

    pub fn insert(&self, text: impl Into<String>, metadata: DocumentMetadata) {
        self.entries.write().unwrap_or_else(|e| e.into_inner()).push(RetrievedDocument {
            text: text.into(),
            metadata,
        });
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for InMemoryIndex {
    fn default() -> Self {
        Self::new()
    }
}

fn tokenize(text: &str) -> HashSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_lowercase())
        .collect()
}

#[async_trait]
impl KnowledgeStore for InMemoryIndex {
    async fn query(
        &self,
        text: &str,
        location: Option<&str>,
        top_k: usize,
    ) -> Result<Vec<RetrievedDocument>> {
        let query_tokens = tokenize(text);
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());

        let mut scored: Vec<(usize, &RetrievedDocument)> = entries
            .iter()
            .filter(|doc| match (location, &doc.metadata.location) {
                (Some(wanted), Some(scope)) => scope.eq_ignore_ascii_case(wanted),
                _ => true,
            })
            .map(|doc| {
                let doc_tokens = tokenize(&doc.text);
                let overlap = query_tokens.intersection(&doc_tokens).count();
                (overlap, doc)
            })
            .filter(|(score, _)| *score > 0)
            .collect();

        // Stable sort keeps insertion order among equal scores
        scored.sort_by(|a, b| b.0.cmp(&a.0));

        let results: Vec<RetrievedDocument> =
            scored.into_iter().take(top_k).map(|(_, d)| d.clone()).collect();
        debug!(target: "retrieval", hits = results.len(), top_k, "Knowledge query");
        Ok(results)
    }
}
