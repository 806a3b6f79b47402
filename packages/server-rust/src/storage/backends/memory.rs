//! In-memory [`TokenSource`] backed by [`DashMap`].

use std::io;

use async_trait::async_trait;
use dashmap::DashMap;
use themekit_core::{token_file_name, TenantId, TokenSource};

/// Raw token records keyed by tenant id.
///
/// Records are stored as raw bytes so malformed data can be staged exactly
/// as a file on disk would hold it.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    entries: DashMap<String, Vec<u8>>,
}

impl MemoryTokenStore {
    /// Creates a new, empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores raw record bytes for a tenant, returning the previous bytes.
    pub fn insert(&self, tenant: impl Into<String>, raw: impl Into<Vec<u8>>) -> Option<Vec<u8>> {
        self.entries.insert(tenant.into(), raw.into())
    }

    /// Stores a JSON record for a tenant.
    pub fn insert_json(&self, tenant: impl Into<String>, record: &serde_json::Value) {
        self.entries.insert(tenant.into(), record.to_string().into_bytes());
    }

    /// Removes a tenant's record.
    pub fn remove(&self, tenant: &str) -> Option<Vec<u8>> {
        self.entries.remove(tenant).map(|(_, raw)| raw)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl TokenSource for MemoryTokenStore {
    fn location(&self, tenant: &TenantId) -> String {
        format!("memory://{}", token_file_name(tenant))
    }

    async fn read(&self, tenant: &TenantId) -> io::Result<Vec<u8>> {
        self.entries
            .get(tenant.as_str())
            .map(|raw| raw.value().clone())
            .ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::NotFound,
                    format!("no record for tenant {tenant}"),
                )
            })
    }
}
