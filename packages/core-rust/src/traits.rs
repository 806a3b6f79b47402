use async_trait::async_trait;

use crate::tenant::TenantId;

/// File name suffix of a stored token record: `<tenant>.tokens.json`.
pub const TOKEN_FILE_SUFFIX: &str = ".tokens.json";

/// Returns the storage key of a tenant's token record.
#[must_use]
pub fn token_file_name(tenant: &TenantId) -> String {
    format!("{tenant}{TOKEN_FILE_SUFFIX}")
}

/// Read-only, tenant-keyed store of raw token records.
/// Implementations: filesystem directory, in-memory map (tests).
#[async_trait]
pub trait TokenSource: Send + Sync {
    /// Human-readable address of the tenant's record, used in errors and logs.
    fn location(&self, tenant: &TenantId) -> String;

    /// Reads the raw bytes of the tenant's record.
    /// A missing entry is reported as `io::ErrorKind::NotFound`.
    async fn read(&self, tenant: &TenantId) -> std::io::Result<Vec<u8>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_file_name_appends_suffix() {
        assert_eq!(token_file_name(&TenantId::new("acme")), "acme.tokens.json");
    }
}
