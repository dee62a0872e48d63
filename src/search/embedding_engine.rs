use anyhow::Result;
use model2vec_rs::model::StaticModel;

const EMBEDDING_MODEL_ID: &str = "minishlab/potion-base-8M";

pub const EMBEDDING_DIMENSION: usize = 256;

/// Turns text into fixed-size vectors.
pub trait Embedder {
    fn dimension(&self) -> usize;

    fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    fn embed_one(&self, text: &str) -> Result<Vec<f32>> {
        self.embed(&[text.to_string()])?
            .into_iter()
            .next()
            .ok_or_else(|| anyhow::anyhow!("Failed to generate embedding for single text: {}", text))
    }
}

pub struct EmbeddingEngine {
    model: StaticModel,
}

impl EmbeddingEngine {
    /// Downloads (or reuses the cached copy of) the static embedding model.
    pub fn new() -> Result<Self> {
        let model = StaticModel::from_pretrained(EMBEDDING_MODEL_ID, None, None, None)?;
        Ok(Self { model })
    }
}

impl Embedder for EmbeddingEngine {
    fn dimension(&self) -> usize {
        // model2vec-rs does not expose the loaded dimension.
        EMBEDDING_DIMENSION
    }

    fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(self.model.encode(texts))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[ignore] // Downloads a model from the Hugging Face hub
    fn test_embedding_engine_init_and_embed() -> Result<()> {
        let engine = EmbeddingEngine::new()?;

        let sentences = vec![
            "Oats are a source of soluble fibre".to_string(),
            "Lentils provide plant protein".to_string(),
        ];
        let embeddings = engine.embed(&sentences)?;
        assert_eq!(embeddings.len(), 2);
        assert_eq!(embeddings[0].len(), engine.dimension());

        let single = engine.embed_one("Test sentence")?;
        assert_eq!(single.len(), engine.dimension());
        Ok(())
    }
}
