//! Knowledge retrieval.
//!
//! The pipeline only needs a nearest-neighbor text lookup: top-K passages
//! for a query, optionally scoped by location, degrading to an empty list
//! when the index has nothing. `KnowledgeStore` is that boundary; the
//! production vector index lives behind it, and `InMemoryIndex` is the
//! in-process implementation used by tests and the demo.

mod index;

pub use index::InMemoryIndex;

use crate::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Provenance attached to an indexed passage
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DocumentMetadata {
    /// Identifier of the ingested source, e.g. a file or feed name
    pub source: String,
    /// Topical grouping assigned at indexing time
    pub category: String,
    /// Location scope; `None` means the passage applies everywhere
    pub location: Option<String>,
}

/// An immutable passage snapshot returned per query
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RetrievedDocument {
    pub text: String,
    pub metadata: DocumentMetadata,
}

/// Semantic text index collaborator.
///
/// Results are ordered by descending relevance, ties broken by insertion
/// order. An empty index returns an empty list rather than an error.
#[async_trait]
pub trait KnowledgeStore: Send + Sync {
    async fn query(
        &self,
        text: &str,
        location: Option<&str>,
        top_k: usize,
    ) -> Result<Vec<RetrievedDocument>>;
}
