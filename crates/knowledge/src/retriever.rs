//! Query-time retrieval: embed, search, map positions back to chunk text.

use crate::embeddings::EmbeddingProvider;
use crate::store::KnowledgeBase;
use crate::vector_index::SearchHit;
use docqa_core::config::MAX_TOP_K;
use docqa_core::{AppError, AppResult};

/// Check a requested `top_k`, clamping values above [`MAX_TOP_K`].
pub fn effective_top_k(requested: usize) -> AppResult<usize> {
    if requested == 0 {
        return Err(AppError::Knowledge("top_k must be at least 1".to_string()));
    }

    if requested > MAX_TOP_K {
        tracing::warn!("top_k {} exceeds maximum, clamping to {}", requested, MAX_TOP_K);
        return Ok(MAX_TOP_K);
    }

    Ok(requested)
}

/// Retrieve the texts of the `k` chunks nearest to `query`, nearest first.
pub async fn retrieve(
    kb: &KnowledgeBase,
    embedder: &dyn EmbeddingProvider,
    query: &str,
    k: usize,
) -> AppResult<Vec<String>> {
    let query_embedding = embedder.embed(query).await?;
    let hits = kb.index().search(&query_embedding, k);

    if let (Some(first), Some(last)) = (hits.first(), hits.last()) {
        tracing::debug!(
            "Search returned {} hits (nearest: {:.4}, farthest: {:.4})",
            hits.len(),
            first.distance,
            last.distance
        );
    }

    Ok(resolve_hits(kb.chunks(), &hits))
}

/// Map hits to chunk texts, dropping positions outside the chunk sequence.
pub fn resolve_hits(chunks: &[String], hits: &[SearchHit]) -> Vec<String> {
    hits.iter()
        .filter_map(|hit| {
            let text = chunks.get(hit.position);
            if text.is_none() {
                tracing::debug!(
                    "Dropping out-of-range position {} ({} chunks)",
                    hit.position,
                    chunks.len()
                );
            }
            text.cloned()
        })
        .collect()
}
