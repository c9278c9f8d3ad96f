use std::path::Path;

use serde::Deserialize;
use serde::Serialize;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub cors: bool,
    #[serde(default = "default_static_dir")]
    pub static_dir: String,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_static_dir() -> String {
    "public".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors: false,
            static_dir: default_static_dir(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub backtrace: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingsConfig {
    pub endpoint: String,
    pub api_key: String,
    #[serde(default = "default_embedding_model")]
    pub model: String,
    #[serde(default = "default_embedding_dimension")]
    pub dimension: usize,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_embedding_model() -> String {
    "text-embedding-ada-002".to_string()
}

fn default_embedding_dimension() -> usize {
    1536
}

fn default_request_timeout_secs() -> u64 {
    30
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorStoreConfig {
    pub endpoint: String,
    pub api_key: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    pub llm_endpoint: String,
    pub llm_key: String,
    #[serde(default = "default_llm_model")]
    pub llm_model: String,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

fn default_llm_model() -> String {
    "gpt-4-turbo".to_string()
}

fn default_connect_timeout_secs() -> u64 {
    10
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub embeddings: EmbeddingsConfig,
    pub vector_store: VectorStoreConfig,
    pub llm: LlmConfig,
}

impl AppConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path).map_err(crate::RaglineError::Io)?;

        let config: AppConfig =
            toml::from_str(&content).map_err(crate::RaglineError::TomlParsing)?;

        Ok(config)
    }

    /// Load configuration from default config file path
    pub fn load() -> crate::Result<Self> {
        // Try to load from config.toml first, then fall back to config.example.toml
        if Path::new("config.toml").exists() {
            Self::from_file("config.toml")
        } else if Path::new("config.example.toml").exists() {
            println!(
                "Warning: Using config.example.toml. Please create config.toml for production use."
            );
            Self::from_file("config.example.toml")
        } else {
            Err(crate::RaglineError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "No config file found. Please create config.toml or config.example.toml",
            )))
        }
    }

    /// Get server bind host
    pub fn server_host(&self) -> &str {
        &self.server.host
    }

    /// Get server bind port
    pub fn server_port(&self) -> u16 {
        self.server.port
    }

    /// Check if permissive CORS is enabled
    pub fn cors_enabled(&self) -> bool {
        self.server.cors
    }

    /// Get directory served for the static client UI
    pub fn static_dir(&self) -> &str {
        &self.server.static_dir
    }

    /// Get embedding provider endpoint
    pub fn embeddings_endpoint(&self) -> &str {
        &self.embeddings.endpoint
    }

    /// Get embedding provider API key
    pub fn embeddings_api_key(&self) -> &str {
        &self.embeddings.api_key
    }

    /// Get embedding model name
    pub fn embedding_model(&self) -> &str {
        &self.embeddings.model
    }

    /// Get embedding dimension
    pub fn embedding_dimension(&self) -> usize {
        self.embeddings.dimension
    }

    /// Get embedding request timeout in seconds
    pub fn embeddings_timeout_secs(&self) -> u64 {
        self.embeddings.request_timeout_secs
    }

    /// Get vector store query endpoint
    pub fn vector_store_endpoint(&self) -> &str {
        &self.vector_store.endpoint
    }

    /// Get vector store API key
    pub fn vector_store_api_key(&self) -> &str {
        &self.vector_store.api_key
    }

    /// Get vector store request timeout in seconds
    pub fn vector_store_timeout_secs(&self) -> u64 {
        self.vector_store.request_timeout_secs
    }

    /// Get LLM endpoint
    pub fn llm_endpoint(&self) -> &str {
        &self.llm.llm_endpoint
    }

    /// Get LLM key
    pub fn llm_key(&self) -> &str {
        &self.llm.llm_key
    }

    /// Get LLM model
    pub fn llm_model(&self) -> &str {
        &self.llm.llm_model
    }

    /// Get LLM connect timeout in seconds
    pub fn llm_connect_timeout_secs(&self) -> u64 {
        self.llm.connect_timeout_secs
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            logging: LoggingConfig {
                level: "info".to_string(),
                backtrace: true,
            },
            embeddings: EmbeddingsConfig {
                endpoint: "https://api.openai.com/v1".to_string(),
                api_key: "your-api-key".to_string(),
                model: default_embedding_model(),
                dimension: default_embedding_dimension(),
                request_timeout_secs: default_request_timeout_secs(),
            },
            vector_store: VectorStoreConfig {
                endpoint: "https://your-index.svc.your-env.pinecone.io".to_string(),
                api_key: "your-api-key".to_string(),
                request_timeout_secs: default_request_timeout_secs(),
            },
            llm: LlmConfig {
                llm_endpoint: "https://api.openai.com/v1".to_string(),
                llm_key: "your-api-key".to_string(),
                llm_model: default_llm_model(),
                connect_timeout_secs: default_connect_timeout_secs(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        let config = AppConfig::default();
        assert_eq!(config.server_host(), "127.0.0.1");
        assert_eq!(config.server_port(), 3000);
        assert!(!config.cors_enabled());
        assert_eq!(config.static_dir(), "public");
        assert_eq!(config.embedding_model(), "text-embedding-ada-002");
        assert_eq!(config.embedding_dimension(), 1536);
        assert_eq!(config.llm_model(), "gpt-4-turbo");
        assert_eq!(config.llm_connect_timeout_secs(), 10);
    }

    #[test]
    fn test_from_file_parses_full_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
[server]
host = "0.0.0.0"
port = 8080
cors = true
static_dir = "ui"

[logging]
level = "debug"
backtrace = false

[embeddings]
endpoint = "https://api.example.com/v1"
api_key = "emb-key"
model = "custom-embedding"
dimension = 768
request_timeout_secs = 15

[vector_store]
endpoint = "https://index.example.com"
api_key = "vec-key"

[llm]
llm_endpoint = "https://api.example.com/v1"
llm_key = "llm-key"
llm_model = "custom-model"
connect_timeout_secs = 5
"#,
        )
        .unwrap();

        let config = AppConfig::from_file(&path).unwrap();
        assert_eq!(config.server_host(), "0.0.0.0");
        assert_eq!(config.server_port(), 8080);
        assert!(config.cors_enabled());
        assert_eq!(config.static_dir(), "ui");
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.embedding_model(), "custom-embedding");
        assert_eq!(config.embedding_dimension(), 768);
        assert_eq!(config.vector_store_timeout_secs(), 30);
        assert_eq!(config.llm_model(), "custom-model");
        assert_eq!(config.llm_connect_timeout_secs(), 5);
    }

    #[test]
    fn test_from_file_applies_section_defaults() {
        // [server] can be omitted entirely; optional keys fall back
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
[logging]
level = "info"
backtrace = true

[embeddings]
endpoint = "https://api.example.com/v1"
api_key = "emb-key"

[vector_store]
endpoint = "https://index.example.com"
api_key = "vec-key"

[llm]
llm_endpoint = "https://api.example.com/v1"
llm_key = "llm-key"
"#,
        )
        .unwrap();

        let config = AppConfig::from_file(&path).unwrap();
        assert_eq!(config.server_host(), "127.0.0.1");
        assert_eq!(config.server_port(), 3000);
        assert_eq!(config.embedding_model(), "text-embedding-ada-002");
        assert_eq!(config.embeddings_timeout_secs(), 30);
        assert_eq!(config.llm_model(), "gpt-4-turbo");
    }

    #[test]
    fn test_from_file_rejects_invalid_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "not valid toml [[[").unwrap();

        let result = AppConfig::from_file(&path);
        assert!(matches!(result, Err(crate::RaglineError::TomlParsing(_))));
    }

    #[test]
    fn test_from_file_missing_file() {
        let result = AppConfig::from_file("does-not-exist.toml");
        assert!(matches!(result, Err(crate::RaglineError::Io(_))));
    }
}
