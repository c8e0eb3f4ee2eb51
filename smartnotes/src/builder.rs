//! High-level builder wiring the store, auth and summarizer into a workspace

use anyhow::{Context, Result};
use smartnotes_llm::{ChatClient, ChatOptions, ClientFactory, ProviderConfig, ProviderType};
use smartnotes_persist::{AuthProvider, NoteStoreClient, NotesBackend, SupabaseClient};
use smartnotes_sync::{LlmSummarizer, NotesWorkspace, Summarizer, SyncConfig};
use std::sync::Arc;
use std::time::Duration;

use crate::config::AppConfig;

/// Builder for a [`NotesWorkspace`]
///
/// # Example
///
/// ```rust,no_run
/// use smartnotes::prelude::*;
///
/// # #[tokio::main]
/// # async fn main() -> anyhow::Result<()> {
/// let workspace = WorkspaceBuilder::new()
///     .supabase("https://abc.supabase.co", "anon-key")
///     .llm_api_key("gsk-...")
///     .build()?;
///
/// workspace.sign_in("ada@example.com", "secret").await?;
/// # Ok(())
/// # }
/// ```
pub struct WorkspaceBuilder {
    // Supabase
    supabase_url: Option<String>,
    anon_key: Option<String>,
    notes_table: String,
    store_timeout: Duration,

    // Replaces Supabase entirely
    backend: Option<(Arc<dyn NotesBackend>, Arc<dyn AuthProvider>)>,

    // LLM
    provider: ProviderType,
    llm_api_key: String,
    llm_base_url: Option<String>,
    llm_timeout: Duration,
    model: String,
    temperature: f32,
    max_tokens: u32,
    chat_client: Option<Arc<dyn ChatClient>>,
    summarizer: Option<Arc<dyn Summarizer>>,

    sync: SyncConfig,
}

impl Default for WorkspaceBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl WorkspaceBuilder {
    pub fn new() -> Self {
        Self {
            supabase_url: None,
            anon_key: None,
            notes_table: "notes".to_string(),
            store_timeout: Duration::from_secs(30),
            backend: None,
            provider: ProviderType::Groq,
            llm_api_key: String::new(),
            llm_base_url: None,
            llm_timeout: Duration::from_secs(30),
            model: LlmSummarizer::DEFAULT_MODEL.to_string(),
            temperature: 0.7,
            max_tokens: 300,
            chat_client: None,
            summarizer: None,
            sync: SyncConfig::default(),
        }
    }

    /// Everything except test doubles, taken from loaded configuration
    pub fn from_config(config: &AppConfig) -> Self {
        let mut builder = Self::new()
            .supabase(&config.supabase.url, &config.supabase_anon_key)
            .notes_table(&config.supabase.notes_table)
            .store_timeout(config.supabase.timeout())
            .provider(config.llm.provider)
            .llm_api_key(&config.groq_api_key)
            .llm_timeout(Duration::from_millis(config.llm.timeout_ms))
            .model(&config.llm.model)
            .temperature(config.llm.temperature)
            .max_tokens(config.llm.max_tokens)
            .sync_config(config.sync.clone());
        if let Some(url) = &config.llm.base_url {
            builder = builder.llm_base_url(url);
        }
        builder
    }

    /// Set the Supabase project URL and anon key
    pub fn supabase(mut self, url: impl Into<String>, anon_key: impl Into<String>) -> Self {
        self.supabase_url = Some(url.into());
        self.anon_key = Some(anon_key.into());
        self
    }

    /// Set the notes table (default: notes)
    pub fn notes_table(mut self, table: impl Into<String>) -> Self {
        self.notes_table = table.into();
        self
    }

    pub fn store_timeout(mut self, timeout: Duration) -> Self {
        self.store_timeout = timeout;
        self
    }

    /// Use `backend` for both notes and auth instead of Supabase
    pub fn backend<B>(mut self, backend: Arc<B>) -> Self
    where
        B: NotesBackend + AuthProvider + 'static,
    {
        let notes: Arc<dyn NotesBackend> = backend.clone();
        let auth: Arc<dyn AuthProvider> = backend;
        self.backend = Some((notes, auth));
        self
    }

    pub fn provider(mut self, provider: ProviderType) -> Self {
        self.provider = provider;
        self
    }

    /// Bearer token for the chat endpoint; not validated locally
    pub fn llm_api_key(mut self, key: impl Into<String>) -> Self {
        self.llm_api_key = key.into();
        self
    }

    pub fn llm_base_url(mut self, url: impl Into<String>) -> Self {
        self.llm_base_url = Some(url.into());
        self
    }

    pub fn llm_timeout(mut self, timeout: Duration) -> Self {
        self.llm_timeout = timeout;
        self
    }

    /// Set the summarization model (default: llama3-8b-8192)
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set temperature (default: 0.7)
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Set max summary tokens (default: 300)
    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Use an existing chat client instead of building one from the LLM settings
    pub fn chat_client(mut self, client: Arc<dyn ChatClient>) -> Self {
        self.chat_client = Some(client);
        self
    }

    /// Bypass the chat model entirely
    pub fn summarizer(mut self, summarizer: Arc<dyn Summarizer>) -> Self {
        self.summarizer = Some(summarizer);
        self
    }

    pub fn sync_config(mut self, config: SyncConfig) -> Self {
        self.sync = config;
        self
    }

    /// Build the workspace
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - no backend was given and the Supabase URL or anon key is missing
    /// - the LLM provider configuration cannot produce a client
    pub fn build(self) -> Result<NotesWorkspace> {
        let summarizer = match self.summarizer {
            Some(summarizer) => summarizer,
            None => {
                let client = match self.chat_client {
                    Some(client) => client,
                    None => {
                        let mut provider = ProviderConfig {
                            provider: self.provider,
                            api_key: self.llm_api_key,
                            base_url: None,
                            timeout_ms: None,
                        }
                        .with_timeout(self.llm_timeout);
                        if let Some(url) = self.llm_base_url {
                            provider = provider.with_base_url(url);
                        }
                        ClientFactory::create_chat_client(provider)
                            .context("Failed to create chat client")?
                    }
                };
                let options = ChatOptions::new()
                    .temperature(self.temperature)
                    .max_tokens(self.max_tokens);
                Arc::new(
                    LlmSummarizer::new(client)
                        .with_model(self.model)
                        .with_options(options),
                )
            }
        };

        let store = match self.backend {
            Some((notes, auth)) => NoteStoreClient::new(notes, auth),
            None => {
                let url = self
                    .supabase_url
                    .context("Supabase URL is required. Call .supabase(url, anon_key)")?;
                let anon_key = self.anon_key.context("Supabase anon key is required")?;
                let supabase = Arc::new(
                    SupabaseClient::builder()
                        .url(url)
                        .anon_key(anon_key)
                        .notes_table(self.notes_table)
                        .timeout(self.store_timeout)
                        .build()
                        .context("Failed to create Supabase client")?,
                );
                NoteStoreClient::new(supabase.clone(), supabase)
            }
        };

        tracing::debug!("workspace built");
        Ok(NotesWorkspace::new(store, summarizer, self.sync))
    }
}
