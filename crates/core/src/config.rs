//! Configuration management for the policy assistant.
//!
//! Configuration is merged from several sources, later ones winning:
//! - Built-in defaults
//! - Config file (`.policy/config.yaml` or `POLICY_CONFIG`)
//! - Environment variables
//! - Command-line flags
//!
//! The configuration is workspace-centric; state lives under `.policy/`.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::{AppError, AppResult};

/// Name of the per-workspace state directory.
pub const POLICY_DIR: &str = ".policy";

/// Environment variable consulted for the Gemini key when no `apiKeyEnv` is set.
pub const DEFAULT_GEMINI_KEY_ENV: &str = "GOOGLE_API_KEY";

const KNOWN_PROVIDERS: [&str; 2] = ["gemini", "ollama"];
const KNOWN_EMBEDDING_PROVIDERS: [&str; 2] = ["trigram", "ollama"];

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to the workspace root (contains .policy/ and the policy files)
    pub workspace: PathBuf,

    /// Optional config file path
    pub config_file: Option<PathBuf>,

    /// Generation provider ("gemini", "ollama")
    pub provider: String,

    /// Generation model identifier
    pub model: String,

    /// Explicit API key for the generation provider
    pub api_key: Option<String>,

    /// Log level override
    pub log_level: Option<String>,

    /// Verbose mode (enables debug logging)
    pub verbose: bool,

    /// Disable colored output
    pub no_color: bool,

    /// Generation provider configurations
    pub llm: Option<LlmConfig>,

    /// Retrieval and embedding settings
    pub retrieval: RetrievalConfig,

    /// Intent classifier settings
    pub intent: IntentConfig,

    /// Corpus manifest path override
    pub corpus: Option<PathBuf>,
}

/// Generation provider section of config.yaml.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(rename = "activeProvider")]
    pub active_provider: String,

    pub providers: HashMap<String, ProviderConfig>,
}

/// Provider-specific configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProviderConfig {
    Gemini {
        #[serde(rename = "apiKeyEnv")]
        api_key_env: String,
        model: String,
        endpoint: Option<String>,
        timeout: Option<u64>,
    },
    Ollama {
        endpoint: String,
        model: String,
        timeout: Option<u64>,
    },
}

impl ProviderConfig {
    /// Get the model name for this provider.
    pub fn model(&self) -> &str {
        match self {
            Self::Gemini { model, .. } => model,
            Self::Ollama { model, .. } => model,
        }
    }

    /// Get the endpoint override, if any.
    pub fn endpoint(&self) -> Option<&str> {
        match self {
            Self::Gemini { endpoint, .. } => endpoint.as_deref(),
            Self::Ollama { endpoint, .. } => Some(endpoint.as_str()),
        }
    }

    /// Get the request timeout in seconds, if any.
    pub fn timeout(&self) -> Option<u64> {
        match self {
            Self::Gemini { timeout, .. } | Self::Ollama { timeout, .. } => *timeout,
        }
    }
}

/// Retrieval settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Number of documents to retrieve per query
    #[serde(rename = "topK", default = "default_top_k")]
    pub top_k: usize,

    /// Embedding provider ("trigram", "ollama")
    #[serde(rename = "embeddingProvider", default = "default_embedding_provider")]
    pub embedding_provider: String,

    /// Embedding model identifier
    #[serde(rename = "embeddingModel", default = "default_embedding_model")]
    pub embedding_model: String,

    /// Embedding vector dimensions
    #[serde(rename = "embeddingDimensions", default = "default_embedding_dimensions")]
    pub embedding_dimensions: usize,

    /// Embedding endpoint (for HTTP providers)
    #[serde(rename = "embeddingEndpoint", skip_serializing_if = "Option::is_none")]
    pub embedding_endpoint: Option<String>,

    /// SQLite index file; the index is kept in memory when unset
    #[serde(rename = "indexPath", default, skip_serializing_if = "Option::is_none")]
    pub index_path: Option<PathBuf>,
}

fn default_top_k() -> usize {
    3
}

fn default_embedding_provider() -> String {
    "trigram".to_string()
}

fn default_embedding_model() -> String {
    "trigram-v1".to_string()
}

fn default_embedding_dimensions() -> usize {
    384
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
            embedding_provider: default_embedding_provider(),
            embedding_model: default_embedding_model(),
            embedding_dimensions: default_embedding_dimensions(),
            embedding_endpoint: None,
            index_path: None,
        }
    }
}

/// Intent classifier settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IntentConfig {
    /// Forward-looking keywords added to the built-in set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keywords: Option<Vec<String>>,
}

/// Full configuration file structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ConfigFile {
    llm: Option<LlmConfig>,
    workspace: Option<WorkspaceConfig>,
    logging: Option<LoggingConfig>,
    retrieval: Option<RetrievalConfig>,
    intent: Option<IntentConfig>,
    corpus: Option<CorpusConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct WorkspaceConfig {
    path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LoggingConfig {
    level: Option<String>,
    color: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CorpusConfig {
    manifest: Option<String>,
}

/// Model used for a provider when neither flags nor config name one.
pub fn default_model(provider: &str) -> Option<&'static str> {
    match provider {
        "gemini" => Some("gemini-2.5-flash"),
        "ollama" => Some("llama3.2"),
        _ => None,
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            workspace: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            config_file: None,
            provider: "gemini".to_string(),
            model: "gemini-2.5-flash".to_string(),
            api_key: None,
            log_level: None,
            verbose: false,
            no_color: false,
            llm: None,
            retrieval: RetrievalConfig::default(),
            intent: IntentConfig::default(),
            corpus: None,
        }
    }
}

impl AppConfig {
    /// Load configuration from defaults, the config file and environment.
    ///
    /// Environment variables:
    /// - `POLICY_WORKSPACE`: Override workspace path
    /// - `POLICY_CONFIG`: Path to config file
    /// - `POLICY_PROVIDER`: Generation provider
    /// - `POLICY_MODEL`: Generation model
    /// - `POLICY_API_KEY`: API key
    /// - `RUST_LOG`: Log level
    /// - `NO_COLOR`: Disable colored output
    pub fn load() -> AppResult<Self> {
        let mut config = Self::default();

        if let Ok(workspace) = std::env::var("POLICY_WORKSPACE") {
            config.workspace = PathBuf::from(workspace);
        }

        if let Ok(config_file) = std::env::var("POLICY_CONFIG") {
            config.config_file = Some(PathBuf::from(config_file));
        }

        if !config.workspace.exists() {
            return Err(AppError::Config(format!(
                "Workspace directory does not exist: {:?}",
                config.workspace
            )));
        }

        let config_path = match config.config_file {
            Some(ref cf) => cf.clone(),
            None => config.policy_dir().join("config.yaml"),
        };

        if config_path.exists() {
            config = config.merge_yaml(&config_path)?;
        }

        // Environment variables override YAML config
        if let Ok(provider) = std::env::var("POLICY_PROVIDER") {
            config.select_provider(provider);
        }

        if let Ok(model) = std::env::var("POLICY_MODEL") {
            config.model = model;
        }

        config.api_key = std::env::var("POLICY_API_KEY").ok();
        if let Ok(level) = std::env::var("RUST_LOG") {
            config.log_level = Some(level);
        }

        if std::env::var("NO_COLOR").is_ok() {
            config.no_color = true;
        }

        Ok(config)
    }

    /// Merge a YAML configuration file into this config.
    pub fn merge_yaml(&self, path: &Path) -> AppResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        let config_file: ConfigFile = serde_yaml::from_str(&contents).map_err(|e| {
            AppError::Config(format!("Failed to parse config file {:?}: {}", path, e))
        })?;

        let mut result = self.clone();

        if let Some(path) = config_file.workspace.and_then(|ws| ws.path) {
            result.workspace = PathBuf::from(path);
        }

        if let Some(logging) = config_file.logging {
            if let Some(level) = logging.level {
                result.log_level = Some(level);
            }
            if let Some(color) = logging.color {
                result.no_color = !color;
            }
        }

        if let Some(llm) = config_file.llm {
            result.provider = llm.active_provider.clone();

            if let Some(provider_config) = llm.providers.get(&llm.active_provider) {
                result.model = provider_config.model().to_string();
            }

            result.llm = Some(llm);
        }

        if let Some(retrieval) = config_file.retrieval {
            result.retrieval = retrieval;
        }

        if let Some(intent) = config_file.intent {
            result.intent = intent;
        }

        if let Some(manifest) = config_file.corpus.and_then(|c| c.manifest) {
            result.corpus = Some(PathBuf::from(manifest));
        }

        Ok(result)
    }

    /// Apply CLI overrides to the configuration.
    #[allow(clippy::too_many_arguments)]
    pub fn with_overrides(
        mut self,
        workspace: Option<PathBuf>,
        config_file: Option<PathBuf>,
        provider: Option<String>,
        model: Option<String>,
        log_level: Option<String>,
        verbose: bool,
        no_color: bool,
    ) -> Self {
        if let Some(workspace) = workspace {
            self.workspace = workspace;
        }

        if let Some(config_file) = config_file {
            self.config_file = Some(config_file);
        }

        if let Some(provider) = provider {
            self.select_provider(provider);
        }

        if let Some(model) = model {
            self.model = model;
        }

        if let Some(log_level) = log_level {
            self.log_level = Some(log_level);
        }

        if verbose {
            self.verbose = true;
            if self.log_level.is_none() {
                self.log_level = Some("debug".to_string());
            }
        }

        if no_color {
            self.no_color = true;
        }

        self
    }

    /// Switch the generation provider, taking its model from the provider's
    /// config block or the built-in default. An explicit model set afterwards
    /// wins.
    fn select_provider(&mut self, provider: String) {
        if provider != self.provider {
            let model = self
                .get_provider_config(&provider)
                .map(|c| c.model().to_string())
                .or_else(|| default_model(&provider).map(str::to_string));
            if let Some(model) = model {
                self.model = model;
            }
        }
        self.provider = provider;
    }

    /// Get the path to the .policy directory.
    pub fn policy_dir(&self) -> PathBuf {
        self.workspace.join(POLICY_DIR)
    }

    /// Get the corpus manifest path (may not exist).
    pub fn corpus_manifest_path(&self) -> PathBuf {
        match self.corpus {
            Some(ref path) if path.is_absolute() => path.clone(),
            Some(ref path) => self.workspace.join(path),
            None => self.policy_dir().join("corpus.yaml"),
        }
    }

    /// Get the on-disk similarity index path, resolved against the workspace.
    pub fn index_path(&self) -> Option<PathBuf> {
        match self.retrieval.index_path {
            Some(ref path) if path.is_absolute() => Some(path.clone()),
            Some(ref path) => Some(self.workspace.join(path)),
            None => None,
        }
    }

    /// Get the configuration block for a provider.
    pub fn get_provider_config(&self, provider: &str) -> Option<&ProviderConfig> {
        self.llm.as_ref().and_then(|llm| llm.providers.get(provider))
    }

    /// Resolve the endpoint override for a provider.
    pub fn resolve_endpoint(&self, provider: &str) -> Option<String> {
        self.get_provider_config(provider)
            .and_then(|pc| pc.endpoint())
            .map(str::to_string)
    }

    /// Resolve the request timeout for a provider, in seconds.
    pub fn resolve_timeout(&self, provider: &str) -> Option<u64> {
        self.get_provider_config(provider).and_then(|pc| pc.timeout())
    }

    /// Resolve the API key for a provider.
    ///
    /// `POLICY_API_KEY` wins, then the provider's `apiKeyEnv`, then
    /// `GOOGLE_API_KEY` for Gemini.
    pub fn resolve_api_key(&self, provider: &str) -> Option<String> {
        if let Some(ref key) = self.api_key {
            return Some(key.clone());
        }

        let env_var = match self.get_provider_config(provider) {
            Some(ProviderConfig::Gemini { api_key_env, .. }) => Some(api_key_env.as_str()),
            Some(ProviderConfig::Ollama { .. }) => None,
            None if provider == "gemini" => Some(DEFAULT_GEMINI_KEY_ENV),
            None => None,
        };

        env_var.and_then(|var| std::env::var(var).ok())
    }

    /// Validate configuration for the active provider and retrieval settings.
    pub fn validate(&self) -> AppResult<()> {
        let provider = self.provider.as_str();

        if !KNOWN_PROVIDERS.contains(&provider) {
            return Err(AppError::Config(format!(
                "Unknown provider: {}. Supported: {}",
                provider,
                KNOWN_PROVIDERS.join(", ")
            )));
        }

        if provider == "gemini" && self.resolve_api_key(provider).is_none() {
            let env_var = match self.get_provider_config(provider) {
                Some(ProviderConfig::Gemini { api_key_env, .. }) => api_key_env.as_str(),
                _ => DEFAULT_GEMINI_KEY_ENV,
            };
            return Err(AppError::Config(format!(
                "API key not found in environment variable: {}",
                env_var
            )));
        }

        if self.retrieval.top_k == 0 {
            return Err(AppError::Config(
                "retrieval.topK must be at least 1".to_string(),
            ));
        }

        if !KNOWN_EMBEDDING_PROVIDERS.contains(&self.retrieval.embedding_provider.as_str()) {
            return Err(AppError::Config(format!(
                "Unknown embedding provider: {}. Supported: {}",
                self.retrieval.embedding_provider,
                KNOWN_EMBEDDING_PROVIDERS.join(", ")
            )));
        }

        if let Some(ref keywords) = self.intent.keywords {
            if keywords.iter().all(|k| k.trim().is_empty()) {
                return Err(AppError::Config(
                    "intent.keywords must contain at least one non-empty keyword".to_string(),
                ));
            }
        }

        Ok(())
    }
}
