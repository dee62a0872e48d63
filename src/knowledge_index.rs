use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use crate::error::PlannerError;
use crate::search::data_loader::{
    split_documents, DocumentChunk, DocumentLoader, DEFAULT_CHUNK_OVERLAP, DEFAULT_CHUNK_SIZE,
};
use crate::search::embedding_engine::Embedder;
use crate::search::vector_store::VectorStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkingConfig {
    pub chunk_size: usize,
    pub overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            overlap: DEFAULT_CHUNK_OVERLAP,
        }
    }
}

/// Embedded document chunks, searchable by similarity. Read-only once built.
pub struct KnowledgeIndex<E> {
    embedder: E,
    store: VectorStore,
    chunks: Vec<DocumentChunk>,
}

impl<E: Embedder> KnowledgeIndex<E> {
    pub fn build(chunks: Vec<DocumentChunk>, embedder: E) -> Result<Self> {
        let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        info!(chunks = texts.len(), "embedding knowledge chunks");
        let embeddings = embedder
            .embed(&texts)
            .context("Failed to generate embeddings for knowledge chunks")?;
        if embeddings.len() != chunks.len() {
            anyhow::bail!(
                "Embedder returned {} vectors for {} chunks",
                embeddings.len(),
                chunks.len()
            );
        }

        let mut store = VectorStore::new(embedder.dimension());
        store
            .add_batch(&embeddings)
            .context("Failed to add chunk embeddings to the vector store")?;
        debug!(vectors = store.len(), dimension = store.dimension(), "vector store populated");

        Ok(Self {
            embedder,
            store,
            chunks,
        })
    }

    /// The `k` chunks most similar to `query`, best first.
    pub fn search(&self, query: &str, k: usize) -> Result<Vec<&DocumentChunk>> {
        let query_embedding = self
            .embedder
            .embed_one(query)
            .with_context(|| format!("Failed to embed retrieval query: {}", query))?;
        let hits = self.store.query(&query_embedding, k)?;
        Ok(hits
            .iter()
            .filter_map(|hit| self.chunks.get(hit.index))
            .collect())
    }

    pub(crate) fn len(&self) -> usize {
        self.chunks.len()
    }
}

/// Owns the session's knowledge index and builds it on first use.
///
/// A failed build leaves no index behind, so the next call starts over.
pub struct KnowledgeBase<L, E> {
    loader: L,
    init_embedder: fn() -> Result<E>,
    chunking: ChunkingConfig,
    index: Option<KnowledgeIndex<E>>,
}

impl<L: DocumentLoader, E: Embedder> KnowledgeBase<L, E> {
    pub fn new(loader: L, init_embedder: fn() -> Result<E>, chunking: ChunkingConfig) -> Self {
        Self {
            loader,
            init_embedder,
            chunking,
            index: None,
        }
    }

    pub fn is_ready(&self) -> bool {
        self.index.is_some()
    }

    /// Returns the index, building it first if it does not exist yet.
    pub fn ensure_index(&mut self) -> Result<&KnowledgeIndex<E>, PlannerError> {
        if self.index.is_none() {
            info!("Initializing nutrition knowledge base...");
            match self.build() {
                Ok(index) => {
                    info!(chunks = index.len(), "knowledge base ready");
                    self.index = Some(index);
                }
                Err(e) => {
                    warn!(error = %format!("{:#}", e), "knowledge base build failed");
                    return Err(PlannerError::IndexBuild(format!("{:#}", e)));
                }
            }
        }
        self.index
            .as_ref()
            .ok_or_else(|| PlannerError::IndexBuild("index missing after build".to_string()))
    }

    fn build(&self) -> Result<KnowledgeIndex<E>> {
        let documents = self.loader.load().context("Failed to load knowledge documents")?;
        info!(documents = documents.len(), "knowledge documents loaded");

        let chunks = split_documents(&documents, self.chunking.chunk_size, self.chunking.overlap)
            .context("Failed to split knowledge documents")?;

        let embedder = (self.init_embedder)().context("Failed to initialize embedding engine")?;
        KnowledgeIndex::build(chunks, embedder)
    }
}
