//! Failure taxonomy for token loading.
//!
//! All variants are deterministic data-validity failures. None of them is
//! transient, so callers surface them instead of retrying.

use crate::tenant::TenantId;

/// Errors produced while loading and validating a tenant's token set.
#[derive(Debug, thiserror::Error)]
pub enum ThemeError {
    /// No readable storage entry exists for the tenant.
    #[error("no token set stored for tenant {tenant} at {location}")]
    MissingTenantTokens {
        tenant: TenantId,
        location: String,
        #[source]
        source: std::io::Error,
    },
    /// The storage entry exists but is not a well-formed token record.
    #[error("malformed token data for tenant {tenant}: {reason}")]
    MalformedTokenData { tenant: TenantId, reason: String },
    /// The record parsed but omits a required token.
    #[error("missing token \"{key}\" for tenant {tenant}")]
    MissingRequiredKey { key: &'static str, tenant: TenantId },
}

impl ThemeError {
    /// Stable machine-readable name of the error kind.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MissingTenantTokens { .. } => "missing_tenant_tokens",
            Self::MalformedTokenData { .. } => "malformed_token_data",
            Self::MissingRequiredKey { .. } => "missing_required_key",
        }
    }

    /// Tenant whose token load failed.
    #[must_use]
    pub fn tenant(&self) -> &TenantId {
        match self {
            Self::MissingTenantTokens { tenant, .. }
            | Self::MalformedTokenData { tenant, .. }
            | Self::MissingRequiredKey { tenant, .. } => tenant,
        }
    }
}
