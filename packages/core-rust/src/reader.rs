//! Token Store Reader: the I/O boundary of the theming pipeline.

use tracing::{debug, info_span, warn, Instrument};

use crate::error::ThemeError;
use crate::tenant::TenantId;
use crate::tokens::TokenSet;
use crate::traits::TokenSource;

/// Loads and validates the token set stored for `tenant`.
///
/// The storage entry is read in full before validation starts, so a
/// cancelled load never exposes a partial token set.
///
/// # Errors
///
/// - [`ThemeError::MissingTenantTokens`] if the entry is absent or unreadable.
/// - [`ThemeError::MalformedTokenData`] if it is not a well-formed record.
/// - [`ThemeError::MissingRequiredKey`] for the first required key it omits.
pub async fn load_tokens<S>(source: &S, tenant: &TenantId) -> Result<TokenSet, ThemeError>
where
    S: TokenSource + ?Sized,
{
    let span = info_span!("load_tokens", tenant = %tenant);
    async {
        let location = source.location(tenant);
        let raw = source
            .read(tenant)
            .await
            .map_err(|e| ThemeError::MissingTenantTokens {
                tenant: tenant.clone(),
                location: location.clone(),
                source: e,
            });

        let result = raw.and_then(|raw| TokenSet::parse(tenant, &raw));
        match &result {
            Ok(tokens) => debug!(
                %location,
                dark_enabled = tokens.dark_enabled(),
                extensions = tokens.extensions().count(),
                "token set loaded"
            ),
            Err(e) => warn!(%location, kind = e.kind(), error = %e, "token set rejected"),
        }
        result
    }
    .instrument(span)
    .await
}
