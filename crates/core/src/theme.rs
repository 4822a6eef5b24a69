//! Theme tokens and their projection onto CSS custom properties.
//!
//! A [`ThemeConfig`] is a flat set of color and typography tokens edited in
//! the admin dashboard. [`ThemeStylesheet::render`] turns it into a `:root`
//! block of CSS variables plus the handful of rules that consume them. The
//! storefront serves the rendered sheet and swaps it whenever the config
//! changes.
//!
//! Token values end up inside a stylesheet verbatim, so [`ThemeConfig::validate`]
//! must pass before a config is rendered or saved.

use std::fmt::Write as _;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

/// Characters that could break out of a declaration or the style element.
const FORBIDDEN_FONT_CHARS: &[char] = &[';', '{', '}', '<', '>', '\\', '\n', '\r'];

const MAX_FONT_FAMILY_LENGTH: usize = 200;

/// A token that failed validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ThemeError {
    #[error("{field} must be a hex color like #1a2b3c (got '{value}')")]
    InvalidColor { field: &'static str, value: String },

    #[error("{field} contains characters that are not allowed in a font list")]
    InvalidFontFamily { field: &'static str },

    #[error("{field} must be a size in px, rem or em (got '{value}')")]
    InvalidSize { field: &'static str, value: String },
}

impl ThemeError {
    /// Name of the offending field, for highlighting it in a form.
    #[must_use]
    pub const fn field(&self) -> &'static str {
        match self {
            Self::InvalidColor { field, .. }
            | Self::InvalidFontFamily { field }
            | Self::InvalidSize { field, .. } => field,
        }
    }
}

/// Color and typography tokens.
///
/// Missing fields in stored JSON fall back to the default theme.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeConfig {
    pub primary_color: String,
    pub secondary_color: String,
    pub accent_color: String,
    pub background_color: String,
    pub surface_color: String,
    pub text_color: String,
    pub muted_color: String,
    pub font_family: String,
    pub heading_font_family: String,
    pub base_font_size: String,
    pub border_radius: String,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            primary_color: "#2563eb".to_string(),
            secondary_color: "#0f172a".to_string(),
            accent_color: "#f59e0b".to_string(),
            background_color: "#ffffff".to_string(),
            surface_color: "#f8fafc".to_string(),
            text_color: "#111827".to_string(),
            muted_color: "#6b7280".to_string(),
            font_family: "Inter, system-ui, sans-serif".to_string(),
            heading_font_family: "Inter, system-ui, sans-serif".to_string(),
            base_font_size: "16px".to_string(),
            border_radius: "0.5rem".to_string(),
        }
    }
}

impl ThemeConfig {
    /// Built-in starting points offered by the theme editor.
    #[must_use]
    pub fn presets() -> Vec<(&'static str, Self)> {
        vec![
            ("Default", Self::default()),
            (
                "Midnight",
                Self {
                    primary_color: "#8b5cf6".to_string(),
                    secondary_color: "#e2e8f0".to_string(),
                    accent_color: "#22d3ee".to_string(),
                    background_color: "#0f172a".to_string(),
                    surface_color: "#1e293b".to_string(),
                    text_color: "#f1f5f9".to_string(),
                    muted_color: "#94a3b8".to_string(),
                    ..Self::default()
                },
            ),
            (
                "Forest",
                Self {
                    primary_color: "#15803d".to_string(),
                    secondary_color: "#14532d".to_string(),
                    accent_color: "#ca8a04".to_string(),
                    background_color: "#fefce8".to_string(),
                    surface_color: "#f7fee7".to_string(),
                    heading_font_family: "Georgia, 'Times New Roman', serif".to_string(),
                    border_radius: "2px".to_string(),
                    ..Self::default()
                },
            ),
        ]
    }

    /// Look up a preset by name (case-insensitive).
    #[must_use]
    pub fn preset(name: &str) -> Option<Self> {
        Self::presets()
            .into_iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, theme)| theme)
    }

    fn colors(&self) -> [(&'static str, &str); 7] {
        [
            ("primary_color", self.primary_color.as_str()),
            ("secondary_color", self.secondary_color.as_str()),
            ("accent_color", self.accent_color.as_str()),
            ("background_color", self.background_color.as_str()),
            ("surface_color", self.surface_color.as_str()),
            ("text_color", self.text_color.as_str()),
            ("muted_color", self.muted_color.as_str()),
        ]
    }

    /// Check every token. Returns all problems, not just the first.
    pub fn validate(&self) -> Result<(), Vec<ThemeError>> {
        let mut errors = Vec::new();

        for (field, value) in self.colors() {
            if parse_hex_color(value).is_none() {
                errors.push(ThemeError::InvalidColor {
                    field,
                    value: value.to_string(),
                });
            }
        }

        for (field, value) in [
            ("font_family", &self.font_family),
            ("heading_font_family", &self.heading_font_family),
        ] {
            if !is_valid_font_family(value) {
                errors.push(ThemeError::InvalidFontFamily { field });
            }
        }

        for (field, value) in [
            ("base_font_size", &self.base_font_size),
            ("border_radius", &self.border_radius),
        ] {
            if !is_valid_size(value) {
                errors.push(ThemeError::InvalidSize {
                    field,
                    value: value.to_string(),
                });
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// CSS custom properties in declaration order.
    ///
    /// Includes `--color-primary-contrast`, black or white depending on the
    /// primary color's luminance, for text drawn on primary backgrounds.
    #[must_use]
    pub fn css_variables(&self) -> Vec<(&'static str, String)> {
        vec![
            ("--color-primary", self.primary_color.trim().to_lowercase()),
            ("--color-primary-contrast", contrast_color(&self.primary_color).to_string()),
            ("--color-secondary", self.secondary_color.trim().to_lowercase()),
            ("--color-accent", self.accent_color.trim().to_lowercase()),
            ("--color-background", self.background_color.trim().to_lowercase()),
            ("--color-surface", self.surface_color.trim().to_lowercase()),
            ("--color-text", self.text_color.trim().to_lowercase()),
            ("--color-muted", self.muted_color.trim().to_lowercase()),
            ("--font-body", self.font_family.trim().to_string()),
            ("--font-heading", self.heading_font_family.trim().to_string()),
            ("--font-size-base", self.base_font_size.trim().to_string()),
            ("--radius", self.border_radius.trim().to_string()),
        ]
    }
}

/// A rendered theme stylesheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThemeStylesheet {
    css: String,
    version: String,
}

impl ThemeStylesheet {
    /// Render `config` into CSS.
    ///
    /// Rendering is deterministic: equal configs produce byte-identical CSS
    /// and the same version string.
    #[must_use]
    pub fn render(config: &ThemeConfig) -> Self {
        let mut css = String::from(":root {\n");
        for (name, value) in config.css_variables() {
            let _ = writeln!(css, "  {name}: {value};");
        }
        css.push_str("}\n");
        css.push_str(BASE_RULES);

        let digest = Sha256::digest(css.as_bytes());
        let version = hex::encode(digest).chars().take(8).collect();

        Self { css, version }
    }

    #[must_use]
    pub fn css(&self) -> &str {
        &self.css
    }

    /// Short content hash, used as a cache-busting query parameter.
    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }
}

impl Default for ThemeStylesheet {
    fn default() -> Self {
        Self::render(&ThemeConfig::default())
    }
}

const BASE_RULES: &str = "\
body {
  background: var(--color-background);
  color: var(--color-text);
  font-family: var(--font-body);
  font-size: var(--font-size-base);
}
h1, h2, h3, h4 {
  font-family: var(--font-heading);
  color: var(--color-secondary);
}
a { color: var(--color-primary); }
.surface { background: var(--color-surface); border-radius: var(--radius); }
.muted { color: var(--color-muted); }
.btn { border-radius: var(--radius); }
.btn-primary { background: var(--color-primary); color: var(--color-primary-contrast); }
.btn-accent { background: var(--color-accent); color: var(--color-secondary); }
.badge { border-radius: var(--radius); }
";

/// Parse `#rgb` or `#rrggbb` into channel values.
#[must_use]
pub fn parse_hex_color(value: &str) -> Option<(u8, u8, u8)> {
    let hex = value.trim().strip_prefix('#')?;
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let channel = |s: &str| u8::from_str_radix(s, 16).ok();
    match hex.len() {
        3 => {
            let mut digits = hex.chars().map(|c| c.to_string().repeat(2));
            Some((
                channel(digits.next()?.as_str())?,
                channel(digits.next()?.as_str())?,
                channel(digits.next()?.as_str())?,
            ))
        }
        6 => Some((
            channel(hex.get(0..2)?)?,
            channel(hex.get(2..4)?)?,
            channel(hex.get(4..6)?)?,
        )),
        _ => None,
    }
}

/// Black or white, whichever reads better on `background`.
fn contrast_color(background: &str) -> &'static str {
    let Some((r, g, b)) = parse_hex_color(background) else {
        return "#ffffff";
    };
    // Rec. 601 luma, good enough for picking a text color.
    let luma = 299 * u32::from(r) + 587 * u32::from(g) + 114 * u32::from(b);
    if luma > 150_000 { "#000000" } else { "#ffffff" }
}

fn is_valid_font_family(value: &str) -> bool {
    let value = value.trim();
    !value.is_empty()
        && value.len() <= MAX_FONT_FAMILY_LENGTH
        && !value.contains(FORBIDDEN_FONT_CHARS)
        && !value.contains("/*")
        && !value.contains("*/")
        && quotes_are_closed(value)
}

/// Every quoted family name ends before the value does. An apostrophe inside
/// double quotes (or the reverse) is part of the name.
fn quotes_are_closed(value: &str) -> bool {
    let mut open = None;
    for c in value.chars() {
        match open {
            Some(quote) if c == quote => open = None,
            None if c == '"' || c == '\'' => open = Some(c),
            _ => {}
        }
    }
    open.is_none()
}

fn is_valid_size(value: &str) -> bool {
    let value = value.trim();
    let Some(number) = ["rem", "px", "em"]
        .iter()
        .find_map(|unit| value.strip_suffix(unit))
    else {
        return false;
    };
    number
        .parse::<f64>()
        .is_ok_and(|n| n.is_finite() && (0.0..=200.0).contains(&n))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_default_and_presets_are_valid() {
        for (name, theme) in ThemeConfig::presets() {
            assert!(theme.validate().is_ok(), "preset {name} should be valid");
        }
    }

    #[test]
    fn test_validate_reports_every_bad_field() {
        let theme = ThemeConfig {
            primary_color: "blue".to_string(),
            text_color: "#12345".to_string(),
            font_family: "Inter; } body { display:none".to_string(),
            border_radius: "8".to_string(),
            ..ThemeConfig::default()
        };
        let errors = theme.validate().unwrap_err();
        let fields: Vec<_> = errors.iter().map(ThemeError::field).collect();
        assert_eq!(
            fields,
            ["primary_color", "text_color", "font_family", "border_radius"]
        );
    }

    #[test]
    fn test_style_tag_breakout_is_rejected() {
        let theme = ThemeConfig {
            heading_font_family: "Arial</style><script>".to_string(),
            ..ThemeConfig::default()
        };
        assert!(theme.validate().is_err());
    }

    #[test]
    fn test_comment_markers_are_rejected() {
        assert!(!is_valid_font_family("Inter /*"));
        assert!(!is_valid_font_family("Inter */ serif"));

        let theme = ThemeConfig {
            font_family: "Inter /*".to_string(),
            ..ThemeConfig::default()
        };
        let errors = theme.validate().unwrap_err();
        assert_eq!(errors.first().map(ThemeError::field), Some("font_family"));
    }

    #[test]
    fn test_unclosed_quotes_are_rejected() {
        assert!(!is_valid_font_family("Inter \""));
        assert!(!is_valid_font_family("'Times New Roman, serif"));
        assert!(!is_valid_font_family("\"Fira Sans', sans-serif"));
    }

    #[test]
    fn test_quoted_font_names_are_accepted() {
        assert!(is_valid_font_family("Georgia, 'Times New Roman', serif"));
        assert!(is_valid_font_family("\"Gill Sans\", sans-serif"));
        assert!(is_valid_font_family("\"Bob's Hand\", cursive"));
    }

    #[test]
    fn test_parse_hex_color() {
        assert_eq!(parse_hex_color("#fff"), Some((255, 255, 255)));
        assert_eq!(parse_hex_color(" #1A2b3C "), Some((0x1a, 0x2b, 0x3c)));
        assert_eq!(parse_hex_color("123456"), None);
        assert_eq!(parse_hex_color("#ggg"), None);
        assert_eq!(parse_hex_color("#1234"), None);
    }

    #[test]
    fn test_sizes() {
        assert!(is_valid_size("16px"));
        assert!(is_valid_size("0.5rem"));
        assert!(is_valid_size("1.25em"));
        assert!(!is_valid_size("px"));
        assert!(!is_valid_size("-2px"));
        assert!(!is_valid_size("12pt"));
    }

    #[test]
    fn test_css_variables_map_every_token() {
        let vars = ThemeConfig::default().css_variables();
        let names: Vec<_> = vars.iter().map(|(n, _)| *n).collect();
        assert_eq!(names.len(), 12);
        assert!(names.contains(&"--color-primary"));
        assert!(names.contains(&"--radius"));
        assert_eq!(vars[0].1, "#2563eb");
    }

    #[test]
    fn test_contrast_picks_readable_text() {
        assert_eq!(contrast_color("#ffffff"), "#000000");
        assert_eq!(contrast_color("#0f172a"), "#ffffff");
        assert_eq!(contrast_color("#fde047"), "#000000");
    }

    #[test]
    fn test_render_is_deterministic_and_versioned() {
        let a = ThemeStylesheet::render(&ThemeConfig::default());
        let b = ThemeStylesheet::render(&ThemeConfig::default());
        assert_eq!(a, b);
        assert_eq!(a.version().len(), 8);
        assert!(a.css().starts_with(":root {\n  --color-primary: #2563eb;\n"));
        assert!(a.css().contains("var(--font-heading)"));

        let midnight = ThemeStylesheet::render(&ThemeConfig::preset("midnight").unwrap());
        assert_ne!(a.version(), midnight.version());
    }

    #[test]
    fn test_partial_json_falls_back_to_defaults() {
        let theme: ThemeConfig =
            serde_json::from_str(r##"{ "primary_color": "#ff0000" }"##).unwrap();
        assert_eq!(theme.primary_color, "#ff0000");
        assert_eq!(theme.border_radius, ThemeConfig::default().border_radius);
    }
}
