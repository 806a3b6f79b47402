//! Themekit Core: tenant resolution, design-token validation, and CSS derivation.

pub mod context;
pub mod css;
pub mod error;
pub mod reader;
pub mod tenant;
pub mod tokens;
pub mod traits;

pub use context::{RequestThemeContext, ThemeSnapshot};
pub use css::derive_css;
pub use error::ThemeError;
pub use reader::load_tokens;
pub use tenant::{resolve_tenant, TenantId, DEFAULT_TENANT};
pub use tokens::{TokenSet, REQUIRED_KEYS};
pub use traits::{token_file_name, TokenSource};
