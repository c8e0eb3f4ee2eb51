use config::{Config as ConfigLoader, ConfigError, Environment, File};
use serde::Deserialize;
use smartnotes_llm::ProviderType;
use smartnotes_sync::SyncConfig;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub supabase: SupabaseConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub sync: SyncConfig,
    #[serde(default)]
    pub logging: LoggingConfig,

    // Secrets (from ENV only)
    #[serde(default)]
    pub supabase_anon_key: String,
    #[serde(default)]
    pub groq_api_key: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SupabaseConfig {
    pub url: String,
    #[serde(default = "default_notes_table")]
    pub notes_table: String,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

impl SupabaseConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub provider: ProviderType,
    /// Overrides the provider's default endpoint
    pub base_url: Option<String>,
    pub model: String,
    pub temperature: f32,
    /// Upper bound on summary length, sent with every request
    pub max_tokens: u32,
    pub timeout_ms: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: ProviderType::Groq,
            base_url: None,
            model: "llama3-8b-8192".to_string(),
            temperature: 0.7,
            max_tokens: 300,
            timeout_ms: default_timeout_ms(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

fn default_notes_table() -> String {
    "notes".to_string()
}

fn default_timeout_ms() -> u64 {
    30_000
}

impl AppConfig {
    /// Load configuration from TOML files and environment variables
    ///
    /// Hierarchy (weakest to strongest):
    /// 1. config/default.toml
    /// 2. config/{ENV}.toml (if ENV is set)
    /// 3. `SMARTNOTES_<SECTION>__<KEY>` variables, e.g. `SMARTNOTES_LLM__MODEL`
    /// 4. `SUPABASE_URL`
    ///
    /// `SUPABASE_ANON_KEY` is required; `GROQ_API_KEY` may be empty, in which
    /// case the summarization endpoint rejects requests.
    pub fn load() -> Result<Self, ConfigError> {
        let env = std::env::var("ENV").unwrap_or_else(|_| "dev".to_string());

        let builder = ConfigLoader::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(
                Environment::with_prefix("SMARTNOTES")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override_option("supabase.url", std::env::var("SUPABASE_URL").ok())?;

        let mut cfg: AppConfig = builder.build()?.try_deserialize()?;

        cfg.supabase_anon_key = std::env::var("SUPABASE_ANON_KEY").map_err(|_| {
            ConfigError::Message("SUPABASE_ANON_KEY environment variable is required".to_string())
        })?;
        cfg.groq_api_key = std::env::var("GROQ_API_KEY").unwrap_or_default();

        Ok(cfg)
    }

    /// Load config from a specific path (useful for testing)
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        ConfigLoader::builder()
            .add_source(File::from(path.as_ref()))
            .build()?
            .try_deserialize()
    }
}
