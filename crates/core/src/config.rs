//! Configuration management for DocQA.
//!
//! Configuration is layered, later sources winning:
//! - Built-in defaults
//! - YAML config file (`--config`, `DOCQA_CONFIG`, or `<storage_dir>/docqa.yaml`)
//! - Environment variables
//! - Command-line flags (`with_overrides`)
//!
//! Everything DocQA persists lives under `storage_dir`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{AppError, AppResult};

/// Default number of words per chunk.
pub const DEFAULT_CHUNK_SIZE: usize = 400;

/// Upper bound on words per chunk, keeping chunks inside typical embedding input limits.
pub const MAX_CHUNK_WORDS: usize = 2048;

/// Default number of chunks retrieved per query.
pub const DEFAULT_TOP_K: usize = 3;

/// Upper bound on chunks retrieved per query; larger requests are clamped.
pub const MAX_TOP_K: usize = 50;

/// Name of the optional config file looked up inside the storage directory.
pub const CONFIG_FILE_NAME: &str = "docqa.yaml";

const KNOWN_PROVIDERS: [&str; 2] = ["gemini", "google"];
const KNOWN_EMBEDDING_PROVIDERS: [&str; 2] = ["trigram", "ollama"];

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Directory holding the persisted index and chunk artifacts
    pub storage_dir: PathBuf,

    /// Config file that was merged, if any
    pub config_file: Option<PathBuf>,

    /// Language-model provider (e.g., "gemini")
    pub provider: String,

    /// Language-model identifier
    pub model: String,

    /// Language-model credential; absence selects fallback answering
    pub api_key: Option<String>,

    /// Custom language-model endpoint
    pub llm_endpoint: Option<String>,

    /// Language-model request timeout in seconds
    pub llm_timeout_secs: u64,

    /// Embedding provider settings
    pub embedding: EmbeddingSettings,

    /// Words per chunk during ingestion
    pub chunk_size: usize,

    /// Default number of chunks retrieved per query
    pub top_k: usize,

    /// Log level override
    pub log_level: Option<String>,

    /// Verbose mode (enables debug logging)
    pub verbose: bool,

    /// Disable colored output
    pub no_color: bool,
}

/// Embedding provider settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingSettings {
    /// Provider name: "trigram" or "ollama"
    pub provider: String,

    /// Model identifier (provider-specific)
    pub model: String,

    /// Embedding vector dimensions
    pub dimensions: usize,

    /// Custom provider endpoint
    pub endpoint: Option<String>,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            provider: "trigram".to_string(),
            model: "trigram-v1".to_string(),
            dimensions: 384,
            endpoint: None,
        }
    }
}

impl EmbeddingSettings {
    /// Default model and dimensions for a provider.
    fn provider_defaults(provider: &str) -> Option<(&'static str, usize)> {
        match provider {
            "trigram" => Some(("trigram-v1", 384)),
            "ollama" => Some(("nomic-embed-text", 768)),
            _ => None,
        }
    }

    /// Switch provider, carrying over model and dimensions only when they
    /// were set explicitly (differ from the old provider's defaults).
    fn set_provider(&mut self, provider: String) {
        let old = Self::provider_defaults(&self.provider);
        if let Some((model, dimensions)) = Self::provider_defaults(&provider) {
            if old.is_some_and(|(m, _)| m == self.model) {
                self.model = model.to_string();
            }
            if old.is_some_and(|(_, d)| d == self.dimensions) {
                self.dimensions = dimensions;
            }
        }
        self.provider = provider;
    }
}

/// Full configuration file structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ConfigFile {
    #[serde(rename = "storageDir")]
    storage_dir: Option<String>,
    llm: Option<LlmSection>,
    embedding: Option<EmbeddingSection>,
    retrieval: Option<RetrievalSection>,
    logging: Option<LoggingSection>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LlmSection {
    provider: Option<String>,
    model: Option<String>,
    endpoint: Option<String>,
    #[serde(rename = "apiKeyEnv")]
    api_key_env: Option<String>,
    #[serde(rename = "timeoutSecs")]
    timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct EmbeddingSection {
    provider: Option<String>,
    model: Option<String>,
    dimensions: Option<usize>,
    endpoint: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct RetrievalSection {
    #[serde(rename = "chunkSize")]
    chunk_size: Option<usize>,
    #[serde(rename = "topK")]
    top_k: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LoggingSection {
    level: Option<String>,
    color: Option<bool>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            storage_dir: PathBuf::from("knowledge_db"),
            config_file: None,
            provider: "gemini".to_string(),
            model: "gemini-2.5-flash".to_string(),
            api_key: None,
            llm_endpoint: None,
            llm_timeout_secs: 120,
            embedding: EmbeddingSettings::default(),
            chunk_size: DEFAULT_CHUNK_SIZE,
            top_k: DEFAULT_TOP_K,
            log_level: None,
            verbose: false,
            no_color: false,
        }
    }
}

impl AppConfig {
    /// Load configuration from defaults, an optional YAML file and the environment.
    ///
    /// Environment variables:
    /// - `DOCQA_STORAGE_DIR`: Storage directory
    /// - `DOCQA_CONFIG`: Path to config file (when `config_file` is `None`)
    /// - `DOCQA_PROVIDER`: Language-model provider
    /// - `DOCQA_MODEL` / `GEMINI_MODEL`: Model identifier
    /// - `DOCQA_API_KEY` / `GEMINI_API_KEY`: Language-model credential
    /// - `DOCQA_LLM_ENDPOINT`: Language-model endpoint
    /// - `DOCQA_EMBEDDING_PROVIDER`: Embedding provider
    /// - `OLLAMA_URL`: Ollama embedding endpoint
    /// - `RUST_LOG`: Log level
    /// - `NO_COLOR`: Disable colored output
    ///
    /// # Example
    /// ```no_run
    /// use docqa_core::config::AppConfig;
    ///
    /// let config = AppConfig::load(None).expect("Failed to load config");
    /// println!("Storage: {:?}", config.storage_dir);
    /// ```
    pub fn load(config_file: Option<PathBuf>) -> AppResult<Self> {
        let env = |key: &str| std::env::var(key).ok();

        let mut config = Self::default();

        if let Some(dir) = env("DOCQA_STORAGE_DIR") {
            config.storage_dir = PathBuf::from(dir);
        }

        config.config_file = config_file.or_else(|| env("DOCQA_CONFIG").map(PathBuf::from));

        let config_path = match config.config_file {
            Some(ref cf) => {
                if !cf.exists() {
                    return Err(AppError::Config(format!(
                        "Config file does not exist: {:?}",
                        cf
                    )));
                }
                Some(cf.clone())
            }
            None => {
                let candidate = config.storage_dir.join(CONFIG_FILE_NAME);
                candidate.exists().then_some(candidate)
            }
        };

        if let Some(path) = config_path {
            config = config.merge_yaml(&path, &env)?;
            config.config_file = Some(path);
        }

        config.apply_env(&env);

        Ok(config)
    }

    /// Apply environment overrides using the given lookup.
    fn apply_env(&mut self, env: &dyn Fn(&str) -> Option<String>) {
        if let Some(provider) = env("DOCQA_PROVIDER") {
            self.provider = provider;
        }

        if let Some(model) = env("DOCQA_MODEL").or_else(|| env("GEMINI_MODEL")) {
            self.model = model;
        }

        if let Some(key) = env("DOCQA_API_KEY").or_else(|| env("GEMINI_API_KEY")) {
            self.api_key = Some(key);
        }
        // An empty credential means "not configured"
        if self.api_key.as_deref().is_some_and(|k| k.trim().is_empty()) {
            self.api_key = None;
        }

        if let Some(endpoint) = env("DOCQA_LLM_ENDPOINT") {
            self.llm_endpoint = Some(endpoint);
        }

        if let Some(provider) = env("DOCQA_EMBEDDING_PROVIDER") {
            self.embedding.set_provider(provider);
        }

        if let Some(url) = env("OLLAMA_URL") {
            self.embedding.endpoint = Some(url);
        }

        if let Some(level) = env("RUST_LOG") {
            self.log_level = Some(level);
        }

        if env("NO_COLOR").is_some() {
            self.no_color = true;
        }
    }

    /// Merge a YAML configuration file into this config.
    fn merge_yaml(&self, path: &Path, env: &dyn Fn(&str) -> Option<String>) -> AppResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        self.merge_yaml_str(&contents, env).map_err(|e| match e {
            AppError::Serialization(msg) => {
                AppError::Config(format!("Failed to parse config file {:?}: {}", path, msg))
            }
            other => other,
        })
    }

    fn merge_yaml_str(
        &self,
        contents: &str,
        env: &dyn Fn(&str) -> Option<String>,
    ) -> AppResult<Self> {
        let config_file: ConfigFile = serde_yaml::from_str(contents)?;

        let mut result = self.clone();

        if let Some(dir) = config_file.storage_dir {
            result.storage_dir = PathBuf::from(dir);
        }

        if let Some(llm) = config_file.llm {
            if let Some(provider) = llm.provider {
                result.provider = provider;
            }
            if let Some(model) = llm.model {
                result.model = model;
            }
            if let Some(endpoint) = llm.endpoint {
                result.llm_endpoint = Some(endpoint);
            }
            if let Some(timeout) = llm.timeout_secs {
                result.llm_timeout_secs = timeout;
            }
            if let Some(var) = llm.api_key_env {
                result.api_key = env(&var);
            }
        }

        if let Some(embedding) = config_file.embedding {
            if let Some(provider) = embedding.provider {
                result.embedding.set_provider(provider);
            }
            if let Some(model) = embedding.model {
                result.embedding.model = model;
            }
            if let Some(dimensions) = embedding.dimensions {
                result.embedding.dimensions = dimensions;
            }
            if let Some(endpoint) = embedding.endpoint {
                result.embedding.endpoint = Some(endpoint);
            }
        }

        if let Some(retrieval) = config_file.retrieval {
            if let Some(chunk_size) = retrieval.chunk_size {
                result.chunk_size = chunk_size;
            }
            if let Some(top_k) = retrieval.top_k {
                result.top_k = top_k;
            }
        }

        if let Some(logging) = config_file.logging {
            if let Some(level) = logging.level {
                result.log_level = Some(level);
            }
            if let Some(color) = logging.color {
                result.no_color = !color;
            }
        }

        Ok(result)
    }

    /// Apply CLI overrides to the configuration.
    ///
    /// CLI flags take precedence over the config file and environment.
    pub fn with_overrides(
        mut self,
        storage_dir: Option<PathBuf>,
        model: Option<String>,
        log_level: Option<String>,
        verbose: bool,
        no_color: bool,
    ) -> Self {
        if let Some(storage_dir) = storage_dir {
            self.storage_dir = storage_dir;
        }

        if let Some(model) = model {
            self.model = model;
        }

        if let Some(log_level) = log_level {
            self.log_level = Some(log_level);
        }

        if verbose {
            self.verbose = true;
            // Verbose mode implies debug logging
            if self.log_level.is_none() {
                self.log_level = Some("debug".to_string());
            }
        }

        if no_color {
            self.no_color = true;
        }

        self
    }

    /// Whether a language-model credential is configured.
    pub fn has_credential(&self) -> bool {
        self.api_key.is_some()
    }

    /// Ensure the storage directory exists.
    pub fn ensure_storage_dir(&self) -> AppResult<()> {
        if !self.storage_dir.exists() {
            std::fs::create_dir_all(&self.storage_dir).map_err(|e| {
                AppError::Config(format!(
                    "Failed to create storage directory {:?}: {}",
                    self.storage_dir, e
                ))
            })?;
        }
        Ok(())
    }

    /// Validate provider names and retrieval bounds.
    pub fn validate(&self) -> AppResult<()> {
        if !KNOWN_PROVIDERS.contains(&self.provider.to_lowercase().as_str()) {
            return Err(AppError::Config(format!(
                "Unknown provider: {}. Supported: {}",
                self.provider,
                KNOWN_PROVIDERS.join(", ")
            )));
        }

        if !KNOWN_EMBEDDING_PROVIDERS.contains(&self.embedding.provider.as_str()) {
            return Err(AppError::Config(format!(
                "Unknown embedding provider: {}. Supported: {}",
                self.embedding.provider,
                KNOWN_EMBEDDING_PROVIDERS.join(", ")
            )));
        }

        validate_chunk_size(self.chunk_size)?;

        if self.top_k == 0 {
            return Err(AppError::Config("top_k must be at least 1".to_string()));
        }

        if self.embedding.dimensions == 0 {
            return Err(AppError::Config(
                "Embedding dimensions must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}

/// Check a chunk size against `1..=MAX_CHUNK_WORDS`.
pub fn validate_chunk_size(chunk_size: usize) -> AppResult<()> {
    if chunk_size == 0 || chunk_size > MAX_CHUNK_WORDS {
        return Err(AppError::Config(format!(
            "chunk_size must be between 1 and {} words, got {}",
            MAX_CHUNK_WORDS, chunk_size
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.storage_dir, PathBuf::from("knowledge_db"));
        assert_eq!(config.provider, "gemini");
        assert_eq!(config.model, "gemini-2.5-flash");
        assert_eq!(config.chunk_size, 400);
        assert_eq!(config.top_k, 3);
        assert!(!config.has_credential());
        assert!(!config.verbose);
    }

    #[test]
    fn test_env_credential_and_model() {
        let mut config = AppConfig::default();
        config.apply_env(&lookup(&[
            ("GEMINI_API_KEY", "secret"),
            ("GEMINI_MODEL", "gemini-pro"),
        ]));

        assert_eq!(config.api_key.as_deref(), Some("secret"));
        assert_eq!(config.model, "gemini-pro");
        assert!(config.has_credential());
    }

    #[test]
    fn test_docqa_env_wins_over_gemini_env() {
        let mut config = AppConfig::default();
        config.apply_env(&lookup(&[
            ("GEMINI_API_KEY", "gemini"),
            ("DOCQA_API_KEY", "docqa"),
        ]));

        assert_eq!(config.api_key.as_deref(), Some("docqa"));
    }

    #[test]
    fn test_empty_credential_is_absent() {
        let mut config = AppConfig::default();
        config.apply_env(&lookup(&[("GEMINI_API_KEY", "  ")]));

        assert!(!config.has_credential());
    }

    #[test]
    fn test_env_ollama_switches_embedding_defaults() {
        let mut config = AppConfig::default();
        config.apply_env(&lookup(&[("DOCQA_EMBEDDING_PROVIDER", "ollama")]));

        assert_eq!(config.embedding.provider, "ollama");
        assert_eq!(config.embedding.model, "nomic-embed-text");
        assert_eq!(config.embedding.dimensions, 768);
    }

    #[test]
    fn test_yaml_model_survives_provider_switch() {
        let yaml = r#"
embedding:
  model: mxbai-embed-large
  dimensions: 1024
"#;
        let mut config = AppConfig::default()
            .merge_yaml_str(yaml, &lookup(&[]))
            .unwrap();
        config.apply_env(&lookup(&[("DOCQA_EMBEDDING_PROVIDER", "ollama")]));

        assert_eq!(config.embedding.model, "mxbai-embed-large");
        assert_eq!(config.embedding.dimensions, 1024);
    }

    #[test]
    fn test_merge_yaml() {
        let yaml = r#"
storageDir: /tmp/docqa-store
llm:
  model: gemini-1.5-pro
  apiKeyEnv: MY_KEY
  timeoutSecs: 30
embedding:
  provider: ollama
  model: nomic-embed-text
  dimensions: 768
retrieval:
  chunkSize: 200
  topK: 5
logging:
  level: debug
  color: false
"#;
        let merged = AppConfig::default()
            .merge_yaml_str(yaml, &lookup(&[("MY_KEY", "k")]))
            .unwrap();

        assert_eq!(merged.storage_dir, PathBuf::from("/tmp/docqa-store"));
        assert_eq!(merged.model, "gemini-1.5-pro");
        assert_eq!(merged.api_key.as_deref(), Some("k"));
        assert_eq!(merged.llm_timeout_secs, 30);
        assert_eq!(merged.embedding.provider, "ollama");
        assert_eq!(merged.embedding.dimensions, 768);
        assert_eq!(merged.chunk_size, 200);
        assert_eq!(merged.top_k, 5);
        assert_eq!(merged.log_level.as_deref(), Some("debug"));
        assert!(merged.no_color);
    }

    #[test]
    fn test_load_from_file() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("custom.yaml");
        std::fs::write(&path, "retrieval:\n  chunkSize: 128\n").unwrap();

        let config = AppConfig::load(Some(path.clone())).unwrap();
        assert_eq!(config.chunk_size, 128);
        assert_eq!(config.config_file, Some(path));
    }

    #[test]
    fn test_load_missing_file_fails() {
        let result = AppConfig::load(Some(PathBuf::from("/nonexistent/docqa.yaml")));
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn test_with_overrides() {
        let config = AppConfig::default().with_overrides(
            Some(PathBuf::from("/data")),
            Some("gemini-2.0-flash".to_string()),
            None,
            true,
            false,
        );

        assert_eq!(config.storage_dir, PathBuf::from("/data"));
        assert_eq!(config.model, "gemini-2.0-flash");
        assert!(config.verbose);
        assert_eq!(config.log_level, Some("debug".to_string()));
    }

    #[test]
    fn test_validate_default() {
        assert!(AppConfig::default().validate().is_ok());
    }

    #[test]
    fn test_validate_unknown_provider() {
        let config = AppConfig {
            provider: "unknown".to_string(),
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_chunk_size_bounds() {
        assert!(validate_chunk_size(0).is_err());
        assert!(validate_chunk_size(1).is_ok());
        assert!(validate_chunk_size(MAX_CHUNK_WORDS).is_ok());
        assert!(validate_chunk_size(MAX_CHUNK_WORDS + 1).is_err());
    }

    #[test]
    fn test_validate_zero_top_k() {
        let config = AppConfig {
            top_k: 0,
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
