//! CSS custom-property derivation from a validated [`TokenSet`].

use crate::tokens::TokenSet;

/// Selector of the always-present light rule block.
pub const ROOT_SELECTOR: &str = ":root";

/// Selector of the dark-mode override block.
pub const DARK_SELECTOR: &str = ":root[data-theme=\"dark\"]";

/// Renders the CSS variable block for `tokens`.
///
/// The root block declares eight properties in a fixed order. When
/// `dark.enabled` is set, a second block overrides background and text,
/// using `color.dark.bg` / `color.dark.text` when present and the light
/// values otherwise. Lines are joined with `\n`, without a trailing newline.
#[must_use]
pub fn derive_css(tokens: &TokenSet) -> String {
    let mut lines = vec![format!("{ROOT_SELECTOR} {{")];
    lines.extend(
        [
            ("color-primary", tokens.color_primary()),
            ("color-primary-contrast", tokens.color_primary_contrast()),
            ("color-bg", tokens.color_bg()),
            ("color-text", tokens.color_text()),
            ("radius-md", tokens.radius_md()),
            ("space-2", tokens.space_2()),
            ("space-4", tokens.space_4()),
            ("font-sans", tokens.font_family_sans()),
        ]
        .into_iter()
        .map(|(name, value)| declaration(name, value)),
    );
    lines.push("}".to_string());

    if tokens.dark_enabled() {
        let bg = tokens.dark_bg().unwrap_or(tokens.color_bg());
        let text = tokens.dark_text().unwrap_or(tokens.color_text());
        lines.push(format!("{DARK_SELECTOR} {{"));
        lines.push(declaration("color-bg", bg));
        lines.push(declaration("color-text", text));
        lines.push("}".to_string());
    }

    lines.join("\n")
}

fn declaration(name: &str, value: &str) -> String {
    format!("  --{name}: {value};")
}
