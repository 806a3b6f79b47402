//! Fixtures shared by the server's unit tests.

use serde_json::{json, Value};

/// Complete token record with every required key.
pub(crate) fn token_record(dark_enabled: bool) -> Value {
    json!({
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
