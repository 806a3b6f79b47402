//! Typed design-token records and their validation.
//!
//! A stored token record is a flat JSON object keyed by dotted token names.
//! [`TokenSet`] lifts the required keys into typed fields and keeps the
//! stored record itself, in file order, so it serializes back unchanged.

use serde::ser::{Serialize, Serializer};
use serde_json::{Map, Value};

use crate::error::ThemeError;
use crate::tenant::TenantId;

/// Dotted token names recognized by the pipeline.
pub mod keys {
    pub const COLOR_PRIMARY: &str = "color.primary";
    pub const COLOR_PRIMARY_CONTRAST: &str = "color.primary-contrast";
    pub const COLOR_BG: &str = "color.bg";
    pub const COLOR_TEXT: &str = "color.text";
    pub const RADIUS_MD: &str = "radius.md";
    pub const FONT_FAMILY_SANS: &str = "font.family.sans";
    pub const SPACE_2: &str = "space.2";
    pub const SPACE_4: &str = "space.4";
    pub const DARK_ENABLED: &str = "dark.enabled";

    /// Optional dark-mode background override.
    pub const COLOR_DARK_BG: &str = "color.dark.bg";
    /// Optional dark-mode text override.
    pub const COLOR_DARK_TEXT: &str = "color.dark.text";
}

/// Keys every stored record must define, in validation order.
pub const REQUIRED_KEYS: [&str; 9] = [
    keys::COLOR_PRIMARY,
    keys::COLOR_PRIMARY_CONTRAST,
    keys::COLOR_BG,
    keys::COLOR_TEXT,
    keys::RADIUS_MD,
    keys::FONT_FAMILY_SANS,
    keys::SPACE_2,
    keys::SPACE_4,
    keys::DARK_ENABLED,
];

/// Validated design tokens for one tenant.
///
/// Required string tokens are exposed as their rendered text: strings as-is,
/// any other JSON value as its JSON text. `dark.enabled` follows JSON
/// truthiness. Every other key is an extension and is passed through.
#[derive(Debug, Clone, PartialEq)]
pub struct TokenSet {
    color_primary: String,
    color_primary_contrast: String,
    color_bg: String,
    color_text: String,
    radius_md: String,
    font_family_sans: String,
    space_2: String,
    space_4: String,
    dark_enabled: bool,
    dark_bg: Option<String>,
    dark_text: Option<String>,
    record: Map<String, Value>,
}

impl TokenSet {
    /// Parses and validates raw stored bytes for `tenant`.
    ///
    /// # Errors
    ///
    /// Returns [`ThemeError::MalformedTokenData`] if the bytes are not a JSON
    /// object, and the errors of [`TokenSet::from_record`] otherwise.
    pub fn parse(tenant: &TenantId, raw: &[u8]) -> Result<Self, ThemeError> {
        let record: Map<String, Value> =
            serde_json::from_slice(raw).map_err(|e| malformed(tenant, e.to_string()))?;
        Self::from_record(tenant, record)
    }

    /// Validates a decoded flat record.
    ///
    /// Required keys are checked in [`REQUIRED_KEYS`] order and the first
    /// absent one is reported. A key present with any value, `null`
    /// included, is defined.
    ///
    /// # Errors
    ///
    /// Returns [`ThemeError::MissingRequiredKey`].
    pub fn from_record(tenant: &TenantId, record: Map<String, Value>) -> Result<Self, ThemeError> {
        if let Some(key) = REQUIRED_KEYS
            .into_iter()
            .find(|key| !record.contains_key(*key))
        {
            return Err(ThemeError::MissingRequiredKey {
                key,
                tenant: tenant.clone(),
            });
        }

        let text = |key: &str| record.get(key).map(token_text).unwrap_or_default();
        Ok(Self {
            color_primary: text(keys::COLOR_PRIMARY),
            color_primary_contrast: text(keys::COLOR_PRIMARY_CONTRAST),
            color_bg: text(keys::COLOR_BG),
            color_text: text(keys::COLOR_TEXT),
            radius_md: text(keys::RADIUS_MD),
            font_family_sans: text(keys::FONT_FAMILY_SANS),
            space_2: text(keys::SPACE_2),
            space_4: text(keys::SPACE_4),
            dark_enabled: record.get(keys::DARK_ENABLED).is_some_and(is_truthy),
            dark_bg: dark_override(&record, keys::COLOR_DARK_BG),
            dark_text: dark_override(&record, keys::COLOR_DARK_TEXT),
            record,
        })
    }

    /// Adds or replaces an extension token. Required key names are ignored.
    #[must_use]
    pub fn with_extension(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        let key = key.into();
        if REQUIRED_KEYS.contains(&key.as_str()) {
            return self;
        }
        self.record.insert(key, value.into());
        self.dark_bg = dark_override(&self.record, keys::COLOR_DARK_BG);
        self.dark_text = dark_override(&self.record, keys::COLOR_DARK_TEXT);
        self
    }

    #[must_use]
    pub fn color_primary(&self) -> &str {
        &self.color_primary
    }

    #[must_use]
    pub fn color_primary_contrast(&self) -> &str {
        &self.color_primary_contrast
    }

    #[must_use]
    pub fn color_bg(&self) -> &str {
        &self.color_bg
    }

    #[must_use]
    pub fn color_text(&self) -> &str {
        &self.color_text
    }

    #[must_use]
    pub fn radius_md(&self) -> &str {
        &self.radius_md
    }

    #[must_use]
    pub fn font_family_sans(&self) -> &str {
        &self.font_family_sans
    }

    #[must_use]
    pub fn space_2(&self) -> &str {
        &self.space_2
    }

    #[must_use]
    pub fn space_4(&self) -> &str {
        &self.space_4
    }

    /// Whether the dark-mode block is rendered.
    #[must_use]
    pub fn dark_enabled(&self) -> bool {
        self.dark_enabled
    }

    /// Explicit dark-mode background, if the tenant supplies a non-null one.
    #[must_use]
    pub fn dark_bg(&self) -> Option<&str> {
        self.dark_bg.as_deref()
    }

    /// Explicit dark-mode text color, if the tenant supplies a non-null one.
    #[must_use]
    pub fn dark_text(&self) -> Option<&str> {
        self.dark_text.as_deref()
    }

    /// Returns an extension token by its dotted name.
    #[must_use]
    pub fn extension(&self, key: &str) -> Option<&Value> {
        if REQUIRED_KEYS.contains(&key) {
            return None;
        }
        self.record.get(key)
    }

    /// Iterates over extension tokens in stored order.
    pub fn extensions(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.record
            .iter()
            .filter(|(k, _)| !REQUIRED_KEYS.contains(&k.as_str()))
            .map(|(k, v)| (k.as_str(), v))
    }
}

/// Serializes the stored record, key order and value types intact.
impl Serialize for TokenSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.record.serialize(serializer)
    }
}

/// Text a token value renders as inside a CSS declaration.
fn token_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// `false`, `0`, `""` and `null` are falsy; every other value is truthy.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(n) => n.as_f64().is_some_and(|n| n.abs() > 0.0),
        Value::String(text) => !text.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// A dark override counts only when present and non-null.
fn dark_override(record: &Map<String, Value>, key: &str) -> Option<String> {
    record.get(key).filter(|v| !v.is_null()).map(token_text)
}

fn malformed(tenant: &TenantId, reason: String) -> ThemeError {
    ThemeError::MalformedTokenData {
        tenant: tenant.clone(),
        reason,
    }
}

/// Token record used across the crate's tests.
#[cfg(test)]
pub(crate) fn sample_record(dark_enabled: bool) -> Value {
    serde_json::json!({
        "color.primary": "#111",
        "color.primary-contrast": "#fff",
        "color.bg": "#fff",
        "color.text": "#000",
        "radius.md": "4px",
        "font.family.sans": "sans-serif",
        "space.2": "8px",
        "space.4": "16px",
        "dark.enabled": dark_enabled,
    })
}

#[cfg(test)]
pub(crate) fn sample_tokens(dark_enabled: bool) -> TokenSet {
    let Value::Object(record) = sample_record(dark_enabled) else {
        unreachable!("sample record is an object");
    };
    TokenSet::from_record(&TenantId::default(), record).unwrap()
}
