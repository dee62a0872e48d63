pub mod data_loader;
pub mod embedding_engine;
pub mod vector_store;

pub use data_loader::{split_documents, DocumentChunk, DocumentLoader, PdfDirectoryLoader, SourceDocument};
pub use embedding_engine::{Embedder, EmbeddingEngine, EMBEDDING_DIMENSION};
pub use vector_store::{ScoredHit, VectorStore};
