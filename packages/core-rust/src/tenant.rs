//! Tenant identity and host-based tenant resolution.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Tenant selected when the host carries no recognizable tenant marker.
pub const DEFAULT_TENANT: &str = "beta";

/// Tenant selected for hosts containing [`ACME_MARKER`].
pub const ACME_TENANT: &str = "acme";

/// Case-insensitive substring that routes a host to the `acme` tenant.
const ACME_MARKER: &str = "acme";

/// Opaque tenant identifier.
///
/// Any string is structurally valid. There is no tenant registry: a tenant
/// without a stored token set only fails later, when its tokens are loaded.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TenantId(String);

impl TenantId {
    /// Wraps an arbitrary tenant key.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the tenant key as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for TenantId {
    fn default() -> Self {
        Self::new(DEFAULT_TENANT)
    }
}

impl fmt::Display for TenantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TenantId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for TenantId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl AsRef<str> for TenantId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Classifies a request's `Host` header value into a tenant.
///
/// Two-way split: any host containing `acme` (in any letter casing) maps to
/// the `acme` tenant, everything else, including an absent header, maps to
/// [`DEFAULT_TENANT`]. Never fails.
#[must_use]
pub fn resolve_tenant(host: Option<&str>) -> TenantId {
    let host = host.unwrap_or_default().to_lowercase();
    if host.contains(ACME_MARKER) {
        TenantId::new(ACME_TENANT)
    } else {
        TenantId::default()
    }
}
