use std::sync::Arc;

use serde::Serialize;

use crate::css::derive_css;
use crate::error::ThemeError;
use crate::reader::load_tokens;
use crate::tenant::{resolve_tenant, TenantId};
use crate::tokens::TokenSet;
use crate::traits::TokenSource;

/// Per-request theming state, populated lazily by the pipeline stages.
///
/// Acts as a single-use cache: each field is computed at most once for the
/// lifetime of the request and later readers receive the stored value.
/// Created when request handling starts and dropped with the request; it is
/// never shared across requests.
#[derive(Debug, Clone, Default)]
pub struct RequestThemeContext {
    tenant_id: Option<TenantId>,
    tokens: Option<Arc<TokenSet>>,
    css: Option<Arc<str>>,
}

/// Fully derived theme of one request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemeSnapshot {
    pub tenant_id: TenantId,
    pub tokens: Arc<TokenSet>,
    pub css: Arc<str>,
}

impl RequestThemeContext {
    /// Creates an empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a context pre-stamped with a tenant.
    #[must_use]
    pub fn with_tenant(tenant: TenantId) -> Self {
        Self {
            tenant_id: Some(tenant),
            ..Self::default()
        }
    }

    /// The tenant stamped into this request, if resolution ran.
    #[must_use]
    pub fn tenant_id(&self) -> Option<&TenantId> {
        self.tenant_id.as_ref()
    }

    /// The loaded token set, if the reader stage ran.
    #[must_use]
    pub fn tokens(&self) -> Option<&Arc<TokenSet>> {
        self.tokens.as_ref()
    }

    /// The derived CSS block, if the deriver stage ran.
    #[must_use]
    pub fn derived_css(&self) -> Option<&str> {
        self.css.as_deref()
    }

    /// Stamps the tenant for `host` unless one is already set.
    pub fn resolve_tenant(&mut self, host: Option<&str>) -> &TenantId {
        self.tenant_id.get_or_insert_with(|| resolve_tenant(host))
    }

    /// Returns the request's token set, loading it from `source` on first use.
    ///
    /// Without a stamped tenant, the default tenant is stamped and used. A
    /// failed or cancelled load leaves the tokens field empty.
    ///
    /// # Errors
    ///
    /// Propagates the [`ThemeError`] of [`load_tokens`].
    pub async fn load_tokens<S>(&mut self, source: &S) -> Result<Arc<TokenSet>, ThemeError>
    where
        S: TokenSource + ?Sized,
    {
        if let Some(tokens) = &self.tokens {
            return Ok(Arc::clone(tokens));
        }
        let tenant = self.tenant_id.get_or_insert_with(TenantId::default).clone();
        let tokens = Arc::new(load_tokens(source, &tenant).await?);
        self.tokens = Some(Arc::clone(&tokens));
        Ok(tokens)
    }

    /// Returns the request's CSS block, deriving it on first use.
    ///
    /// Returns `None` while no token set has been loaded.
    pub fn css(&mut self) -> Option<Arc<str>> {
        let tokens = Arc::clone(self.tokens.as_ref()?);
        Some(self.css_for(&tokens))
    }

    fn css_for(&mut self, tokens: &TokenSet) -> Arc<str> {
        Arc::clone(self.css.get_or_insert_with(|| Arc::from(derive_css(tokens))))
    }

    /// Packages the three computed fields, once all of them are set.
    #[must_use]
    pub fn snapshot(&self) -> Option<ThemeSnapshot> {
        Some(ThemeSnapshot {
            tenant_id: self.tenant_id.clone()?,
            tokens: Arc::clone(self.tokens.as_ref()?),
            css: Arc::clone(self.css.as_ref()?),
        })
    }

    /// Runs resolver, reader and deriver in order, skipping stages whose
    /// output is already present.
    ///
    /// # Errors
    ///
    /// Propagates the [`ThemeError`] of the reader stage.
    pub async fn run<S>(&mut self, host: Option<&str>, source: &S) -> Result<ThemeSnapshot, ThemeError>
    where
        S: TokenSource + ?Sized,
    {
        let tenant_id = self.resolve_tenant(host).clone();
        let tokens = self.load_tokens(source).await?;
        let css = self.css_for(&tokens);
        Ok(ThemeSnapshot {
            tenant_id,
            tokens,
            css,
        })
    }
}
