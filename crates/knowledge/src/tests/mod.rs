//! Pipeline scenarios with test doubles for the embedding and language models.


use crate::embeddings::EmbeddingProvider;
use docqa_core::{AppError, AppResult};
use docqa_llm::{LlmClient, LlmRequest, LlmResponse, LlmUsage};
use std::io::{Cursor, Write};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Embeds text as per-keyword occurrence counts and counts its calls.
#[derive(Debug)]
pub(crate) struct KeywordEmbedder {
    keywords: Vec<&'static str>,
    calls: AtomicUsize,
    short_by_one: bool,
}

impl KeywordEmbedder {
    pub(crate) fn new(keywords: &[&'static str]) -> Self {
        Self {
            keywords: keywords.to_vec(),
            calls: AtomicUsize::new(0),
            short_by_one: false,
        }
    }

    /// Variant that drops the last vector of every batch.
    pub(crate) fn faulty(keywords: &[&'static str]) -> Self {
        Self {
            short_by_one: true,
            ..Self::new(keywords)
        }
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl EmbeddingProvider for KeywordEmbedder {
    fn provider_name(&self) -> &str {
        "keyword"
    }

    fn model_name(&self) -> &str {
        "keyword-test"
    }

    fn dimensions(&self) -> usize {
        self.keywords.len()
    }

    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let mut vectors: Vec<Vec<f32>> = texts
            .iter()
            .map(|text| {
                self.keywords
                    .iter()
                    .map(|k| text.split_whitespace().filter(|w| w == k).count() as f32)
                    .collect()
            })
            .collect();

        if self.short_by_one {
            vectors.pop();
        }
        Ok(vectors)
    }
}

/// Language-model client with a fixed reply that records every prompt.
pub(crate) struct ScriptedLlm {
    reply: Option<String>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedLlm {
    pub(crate) fn replying(reply: &str) -> Self {
        Self {
            reply: Some(reply.to_string()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn failing() -> Self {
        Self {
            reply: None,
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl LlmClient for ScriptedLlm {
    fn provider_name(&self) -> &str {
        "gemini"
    }

    async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
        self.prompts.lock().unwrap().push(request.prompt.clone());

        match &self.reply {
            Some(content) => Ok(LlmResponse {
                content: content.clone(),
                model: request.model.clone(),
                usage: LlmUsage::default(),
            }),
            None => Err(AppError::Llm("429 RESOURCE_EXHAUSTED".to_string())),
        }
    }
}

/// A minimal DOCX archive with one paragraph per entry of `paragraphs`.
pub(crate) fn docx_with_paragraphs(paragraphs: &[String]) -> Vec<u8> {
    let body: String = paragraphs
        .iter()
        .map(|p| format!("<w:p><w:r><w:t xml:space=\"preserve\">{}</w:t></w:r></w:p>", p))
        .collect();
    let xml = format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\
         <w:document xmlns:w=\"http://schemas.openxmlformats.org/wordprocessingml/2006/main\">\
         <w:body>{}</w:body></w:document>",
        body
    );

    let mut buffer = Cursor::new(Vec::new());
    {
        let mut writer = zip::ZipWriter::new(&mut buffer);
        writer
            .start_file("word/document.xml", zip::write::SimpleFileOptions::default())
            .unwrap();
        writer.write_all(xml.as_bytes()).unwrap();
        writer.finish().unwrap();
    }
    buffer.into_inner()
}
