//! The document QA service.

use crate::answer::{Answer, AnswerGenerator};
use crate::chunker::chunk_words;
use crate::embeddings::{create_provider, EmbeddingProvider};
use crate::extract::DocumentFormat;
use crate::retriever::{effective_top_k, retrieve};
use crate::store::{KnowledgeBase, KnowledgeStore};
use crate::types::{IngestReport, KnowledgeStatus};
use crate::vector_index::FlatIndex;
use docqa_core::config::{validate_chunk_size, DEFAULT_CHUNK_SIZE, DEFAULT_TOP_K};
use docqa_core::{AppConfig, AppError, AppResult};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

/// Single-document question answering over one knowledge store.
#[derive(Debug)]
pub struct DocQa {
    store: KnowledgeStore,
    embedder: Arc<dyn EmbeddingProvider>,
    answerer: AnswerGenerator,
    chunk_size: usize,
    default_top_k: usize,
}

impl DocQa {
    /// Assemble a service from explicit parts, with default chunking and `top_k`.
    pub fn new(
        store: KnowledgeStore,
        embedder: Arc<dyn EmbeddingProvider>,
        answerer: AnswerGenerator,
    ) -> Self {
        Self {
            store,
            embedder,
            answerer,
            chunk_size: DEFAULT_CHUNK_SIZE,
            default_top_k: DEFAULT_TOP_K,
        }
    }

    /// Build the service described by `config`, loading any persisted document.
    pub fn from_config(config: &AppConfig) -> AppResult<Self> {
        config.validate()?;

        let embedder = create_provider(&config.embedding)?;
        let answerer = AnswerGenerator::from_config(config)?;
        let store = KnowledgeStore::open(&config.storage_dir);

        Self::new(store, embedder, answerer)
            .with_chunk_size(config.chunk_size)?
            .with_default_top_k(config.top_k)
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> AppResult<Self> {
        validate_chunk_size(chunk_size)?;
        self.chunk_size = chunk_size;
        Ok(self)
    }

    pub fn with_default_top_k(mut self, top_k: usize) -> AppResult<Self> {
        self.default_top_k = effective_top_k(top_k)?;
        Ok(self)
    }

    pub fn store(&self) -> &KnowledgeStore {
        &self.store
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Index a document, replacing whatever was indexed before.
    ///
    /// The prior document stays in place if any step fails.
    #[tracing::instrument(skip(self, bytes), fields(size = bytes.len()))]
    pub async fn ingest(&self, file_name: &str, bytes: &[u8]) -> AppResult<IngestReport> {
        let start = Instant::now();

        let format = DocumentFormat::from_file_name(file_name)?;
        tracing::info!("Ingesting '{}' as {}", file_name, format);

        let text = format.extractor().extract(bytes).await?;

        let chunks = chunk_words(&text, self.chunk_size);
        if chunks.is_empty() {
            return Err(AppError::EmptyExtraction);
        }

        tracing::info!(
            "Embedding {} chunks with {} ({})",
            chunks.len(),
            self.embedder.provider_name(),
            self.embedder.model_name()
        );
        let vectors = self.embedder.embed_batch(&chunks).await?;
        if vectors.len() != chunks.len() {
            return Err(AppError::Knowledge(format!(
                "Embedding provider returned {} vectors for {} chunks",
                vectors.len(),
                chunks.len()
            )));
        }

        let index = FlatIndex::build(&vectors)?;
        let dimensions = index.dimensions();
        let kb = KnowledgeBase::new(index, chunks)?;
        let chunk_count = kb.len();

        self.store.replace(kb)?;

        let duration = start.elapsed();
        tracing::info!(
            "Indexed '{}': {} chunks of dimension {} in {:.2}s",
            file_name,
            chunk_count,
            dimensions,
            duration.as_secs_f64()
        );

        Ok(IngestReport {
            file_name: file_name.to_string(),
            format,
            chunks: chunk_count,
            dimensions,
            duration_secs: duration.as_secs_f64(),
        })
    }

    /// Read a file from disk and ingest it under its file name.
    pub async fn ingest_path(&self, path: &Path) -> AppResult<IngestReport> {
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| AppError::Knowledge(format!("Invalid file path: {:?}", path)))?;

        // Reject by extension before reading anything
        DocumentFormat::from_file_name(file_name)?;

        let bytes = tokio::fs::read(path).await?;
        self.ingest(file_name, &bytes).await
    }

    /// Answer a question about the indexed document.
    ///
    /// `top_k` defaults to the configured value. With nothing indexed the
    /// answer is [`Answer::NoDocument`] whatever the arguments.
    #[tracing::instrument(skip(self), fields(query_len = query.len()))]
    pub async fn ask(&self, query: &str, top_k: Option<usize>) -> AppResult<Answer> {
        // One generation for the whole query
        let Some(kb) = self.store.snapshot()? else {
            tracing::info!("Query received before any document was indexed");
            return Ok(Answer::NoDocument);
        };

        let top_k = effective_top_k(top_k.unwrap_or(self.default_top_k))?;

        if query.trim().is_empty() {
            return Err(AppError::Knowledge("Query must not be empty".to_string()));
        }

        let context = retrieve(&kb, self.embedder.as_ref(), query, top_k).await?;
        tracing::info!("Retrieved {} of {} chunks", context.len(), kb.len());

        self.answerer.answer(&context, query).await
    }

    pub fn status(&self) -> AppResult<KnowledgeStatus> {
        self.store.status()
    }
}
