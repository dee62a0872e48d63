use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use text_splitter::{ChunkConfig, TextSplitter};
use tracing::{debug, warn};

pub const DEFAULT_CHUNK_SIZE: usize = 1000;
pub const DEFAULT_CHUNK_OVERLAP: usize = 200;

/// Raw text of one source document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceDocument {
    pub source: String,
    pub text: String,
}

/// One overlapping window cut from a [`SourceDocument`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentChunk {
    pub source: String,
    pub text: String,
}

pub trait DocumentLoader {
    fn load(&self) -> Result<Vec<SourceDocument>>;
}

/// Loads every `.pdf` file directly inside a directory.
#[derive(Debug, Clone)]
pub struct PdfDirectoryLoader {
    dir: PathBuf,
}

impl PdfDirectoryLoader {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl DocumentLoader for PdfDirectoryLoader {
    fn load(&self) -> Result<Vec<SourceDocument>> {
        if !self.dir.is_dir() {
            return Err(anyhow::anyhow!("Knowledge directory not found at: {:?}", self.dir));
        }

        let mut paths: Vec<PathBuf> = std::fs::read_dir(&self.dir)
            .with_context(|| format!("Failed to read knowledge directory {:?}", self.dir))?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| {
                p.is_file()
                    && p.extension()
                        .and_then(|ext| ext.to_str())
                        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
            })
            .collect();
        paths.sort();

        let mut documents = Vec::with_capacity(paths.len());
        for path in paths {
            let text = pdf_extract::extract_text(&path)
                .with_context(|| format!("Failed to extract text from {:?}", path))?;
            if text.trim().is_empty() {
                warn!(path = %path.display(), "PDF contains no extractable text, skipping");
                continue;
            }
            debug!(path = %path.display(), chars = text.len(), "loaded PDF");
            documents.push(SourceDocument {
                source: path.display().to_string(),
                text,
            });
        }

        if documents.is_empty() {
            return Err(anyhow::anyhow!("No PDF documents loaded from {:?}", self.dir));
        }
        Ok(documents)
    }
}

/// Splits documents into windows of at most `chunk_size` characters, with
/// neighbouring windows sharing up to `overlap` characters.
pub fn split_documents(
    documents: &[SourceDocument],
    chunk_size: usize,
    overlap: usize,
) -> Result<Vec<DocumentChunk>> {
    let config = ChunkConfig::new(chunk_size)
        .with_overlap(overlap)
        .map_err(|e| anyhow::anyhow!("Invalid chunking configuration: {}", e))?;
    let splitter = TextSplitter::new(config);

    let mut chunks = Vec::new();
    for doc in documents {
        chunks.extend(splitter.chunks(&doc.text).map(|text| DocumentChunk {
            source: doc.source.clone(),
            text: text.to_string(),
        }));
    }

    if chunks.is_empty() {
        return Err(anyhow::anyhow!("Splitting produced no chunks"));
    }
    Ok(chunks)
}
