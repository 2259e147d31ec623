//! Offline trigram embedding provider.

use crate::embeddings::provider::EmbeddingProvider;
use docqa_core::AppResult;
use std::collections::HashMap;

/// Words too common to discriminate between chunks.
const STOP_WORDS: &[&str] = &[
    "the", "is", "at", "which", "on", "a", "an", "as", "are", "was", "were", "for", "to", "of",
    "in", "and", "or", "but", "with", "by", "from", "this", "that", "be", "have", "has", "had",
    "it", "its", "their", "they", "them",
];

/// Deterministic, content-aware embeddings built from character trigrams and
/// whole-word hashes.
///
/// Not a semantic model, but identical text always maps to the identical unit
/// vector and texts sharing vocabulary land close together, so it works as an
/// offline default.
#[derive(Debug)]
pub struct TrigramProvider {
    dimensions: usize,
}

impl TrigramProvider {
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions: dimensions.max(1),
        }
    }

    fn embed_text(&self, text: &str) -> Vec<f32> {
        let mut embedding = vec![0.0f32; self.dimensions];
        let lower = text.to_lowercase();

        let mut word_freq: HashMap<&str, u32> = HashMap::new();
        for word in lower
            .split_whitespace()
            .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric()))
            .filter(|w| w.chars().count() > 2 && !STOP_WORDS.contains(w))
        {
            *word_freq.entry(word).or_insert(0) += 1;
        }

        for (word, freq) in &word_freq {
            let chars: Vec<char> = word.chars().collect();
            for window in chars.windows(3) {
                let trigram: String = window.iter().collect();
                let slot = hash_bytes(trigram.as_bytes(), 37) as usize % self.dimensions;
                embedding[slot] += (*freq as f32).sqrt();
            }

            let slot = hash_bytes(word.as_bytes(), 31) as usize % self.dimensions;
            embedding[slot] += *freq as f32;
        }

        normalize(&mut embedding);
        embedding
    }
}

fn hash_bytes(bytes: &[u8], multiplier: u64) -> u64 {
    bytes
        .iter()
        .fold(0u64, |acc, &b| acc.wrapping_mul(multiplier).wrapping_add(b as u64))
}

/// Scale to unit length; the zero vector is left as is.
fn normalize(v: &mut [f32]) {
    let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for x in v.iter_mut() {
            *x /= norm;
        }
    }
}

#[async_trait::async_trait]
impl EmbeddingProvider for TrigramProvider {
    fn provider_name(&self) -> &str {
        "trigram"
    }

    fn model_name(&self) -> &str {
        "trigram-v1"
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|text| self.embed_text(text)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vector_index::euclidean_distance_squared;

    fn norm(v: &[f32]) -> f32 {
        v.iter().map(|x| x * x).sum::<f32>().sqrt()
    }

    #[tokio::test]
    async fn test_trigram_provider_embed_batch() {
        let provider = TrigramProvider::new(384);
        let texts = vec![
            "hello world".to_string(),
            "test embedding".to_string(),
            "rust programming".to_string(),
        ];

        let embeddings = provider.embed_batch(&texts).await.unwrap();

        assert_eq!(embeddings.len(), 3);
        for embedding in &embeddings {
            assert_eq!(embedding.len(), 384);
            assert!((norm(embedding) - 1.0).abs() < 0.001);
        }
    }

    #[tokio::test]
    async fn test_trigram_provider_deterministic() {
        let provider = TrigramProvider::new(384);

        let first = provider.embed("deterministic test").await.unwrap();
        let second = provider.embed("deterministic test").await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_shared_vocabulary_is_closer() {
        let provider = TrigramProvider::new(384);

        let query = provider.embed("Which programming languages?").await.unwrap();
        let related = provider
            .embed("Skills: programming languages Rust, Python")
            .await
            .unwrap();
        let unrelated = provider
            .embed("Hobbies: hiking, cooking pasta, gardening")
            .await
            .unwrap();

        assert!(
            euclidean_distance_squared(&query, &related)
                < euclidean_distance_squared(&query, &unrelated)
        );
    }

    #[tokio::test]
    async fn test_trigram_provider_empty_text() {
        let provider = TrigramProvider::new(384);
        let embedding = provider.embed("").await.unwrap();

        assert_eq!(embedding.len(), 384);
        assert!(embedding.iter().all(|&x| x == 0.0));
    }

    #[tokio::test]
    async fn test_trigram_provider_utf8_safety() {
        let provider = TrigramProvider::new(384);

        let text = "Gamedex é um aplicativo 🎮 brasileiro para gerenciar jogos!";
        let embedding = provider.embed(text).await.unwrap();

        assert_eq!(embedding.len(), 384);
        assert!((norm(&embedding) - 1.0).abs() < 0.001);
    }
}
