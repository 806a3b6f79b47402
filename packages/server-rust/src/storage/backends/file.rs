//! Filesystem [`TokenSource`] rooted at a tokens directory.

use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use themekit_core::{token_file_name, TenantId, TokenSource};

/// Reads `<root>/<tenant>.tokens.json` files.
///
/// The store never writes. Tenant ids that could escape the root directory
/// (path separators, `..`, empty) are rejected as unreadable.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    root: PathBuf,
}

impl FileTokenStore {
    /// Creates a store rooted at `root`. The directory is not checked here.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Tokens directory this store reads from.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the tenant's token file.
    #[must_use]
    pub fn path_for(&self, tenant: &TenantId) -> PathBuf {
        self.root.join(token_file_name(tenant))
    }
}

fn is_confined(tenant: &TenantId) -> bool {
    let id = tenant.as_str();
    !id.is_empty() && id != "." && id != ".." && !id.contains(['/', '\\', '\0'])
}

#[async_trait]
impl TokenSource for FileTokenStore {
    fn location(&self, tenant: &TenantId) -> String {
        self.path_for(tenant).display().to_string()
    }

    async fn read(&self, tenant: &TenantId) -> io::Result<Vec<u8>> {
        if !is_confined(tenant) {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("tenant id {tenant:?} is not a plain file name"),
            ));
        }
        tokio::fs::read(self.path_for(tenant)).await
    }
}
