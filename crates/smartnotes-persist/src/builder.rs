use std::time::Duration;

use crate::dbs::supabase::SupabaseClient;
use crate::error::{PersistError, Result};

const DEFAULT_NOTES_TABLE: &str = "notes";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

pub struct SupabaseClientBuilder {
    url: Option<String>,
    anon_key: Option<String>,
    notes_table: String,
    timeout: Duration,
}

impl SupabaseClientBuilder {
    pub fn new() -> Self {
        Self {
            url: None,
            anon_key: None,
            notes_table: DEFAULT_NOTES_TABLE.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Project URL, e.g. `https://<ref>.supabase.co`
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn anon_key(mut self, key: impl Into<String>) -> Self {
        self.anon_key = Some(key.into());
        self
    }

    pub fn notes_table(mut self, table: impl Into<String>) -> Self {
        self.notes_table = table.into();
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn build(self) -> Result<SupabaseClient> {
        let url = self
            .url
            .filter(|u| !u.trim().is_empty())
            .ok_or_else(|| PersistError::Internal("Supabase url is required".to_string()))?;
        let anon_key = self
            .anon_key
            .ok_or_else(|| PersistError::Internal("Supabase anon key is required".to_string()))?;

        let http = reqwest::Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|e| PersistError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(SupabaseClient::from_parts(http, url, anon_key, self.notes_table))
    }
}

impl Default for SupabaseClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
