//! Site configuration module.
//!
//! Handles loading, validating, and merging the optional `config.toml` at the
//! library root. Stock defaults are the base layer; the user file only needs
//! the keys it wants to override.
//!
//! ## Config File Location
//!
//! ```text
//! library/
//! ├── config.toml              # Site config (optional)
//! ├── SNES/
//! └── Mega Drive/
//! ```
//!
//! The scanner only looks at directories, so the file never shows up as a
//! console.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [site]
//! title = "Retro Library"   # Page titles and the index heading
//! lang = "en"               # <html lang="...">
//!
//! [output]
//! catalog_json = true       # Also write dist/catalog.json
//!
//! [theme]
//! card_min_width = "220px"  # Minimum width of a game card in grids
//! grid_gap = "12px"         # Gap between game cards
//!
//! [colors.light]
//! background = "#ffffff"
//! text = "#111111"
//! text_muted = "#555555"    # Year, publisher, tags
//! border = "#dddddd"
//! link = "#1d4ed8"
//! link_hover = "#1e3a8a"
//!
//! [colors.dark]
//! background = "#111111"
//! text = "#eeeeee"
//! text_muted = "#999999"
//! border = "#333333"
//! link = "#93c5fd"
//! link_hover = "#dbeafe"
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Config filename at the library root.
pub const CONFIG_FILE: &str = "config.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Site configuration loaded from `config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Site identity.
    pub site: SiteSection,
    /// What the emitter writes besides HTML.
    pub output: OutputConfig,
    /// Layout settings.
    pub theme: ThemeConfig,
    /// Color schemes for light and dark modes.
    pub colors: ColorConfig,
}

impl SiteConfig {
    /// Validate config values are usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.site.title.trim().is_empty() {
            return Err(ConfigError::Validation(
                "site.title must not be empty".into(),
            ));
        }
        if self.site.lang.trim().is_empty() {
            return Err(ConfigError::Validation("site.lang must not be empty".into()));
        }
        let mut css_values = vec![
            ("theme.card_min_width".to_string(), &self.theme.card_min_width),
            ("theme.grid_gap".to_string(), &self.theme.grid_gap),
        ];
        for (mode, scheme) in [("light", &self.colors.light), ("dark", &self.colors.dark)] {
            css_values.extend([
                (format!("colors.{mode}.background"), &scheme.background),
                (format!("colors.{mode}.text"), &scheme.text),
                (format!("colors.{mode}.text_muted"), &scheme.text_muted),
                (format!("colors.{mode}.border"), &scheme.border),
                (format!("colors.{mode}.link"), &scheme.link),
                (format!("colors.{mode}.link_hover"), &scheme.link_hover),
            ]);
        }
        for (key, value) in css_values {
            if value.trim().is_empty() || value.contains([';', '{', '}', '<']) {
                return Err(ConfigError::Validation(format!(
                    "{key} must be a single CSS value"
                )));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteSection {
    /// Shown in every page title and as the index heading.
    pub title: String,
    /// Value of the `lang` attribute on `<html>`.
    pub lang: String,
}

impl Default for SiteSection {
    fn default() -> Self {
        Self {
            title: "Retro Library".to_string(),
            lang: "en".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    /// Write `catalog.json` next to `index.html`.
    pub catalog_json: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { catalog_json: true }
    }
}

/// Theme/layout settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ThemeConfig {
    /// Minimum game card width in the responsive grid (CSS length).
    pub card_min_width: String,
    /// Gap between game cards (CSS length).
    pub grid_gap: String,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            card_min_width: "220px".to_string(),
            grid_gap: "12px".to_string(),
        }
    }
}

/// Color configuration for light and dark modes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColorConfig {
    /// Light mode color scheme.
    pub light: ColorScheme,
    /// Dark mode color scheme.
    pub dark: ColorScheme,
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            light: ColorScheme::default_light(),
            dark: ColorScheme::default_dark(),
        }
    }
}

/// Individual color scheme (light or dark).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColorScheme {
    pub background: String,
    pub text: String,
    /// Secondary text (year, publisher, tags, breadcrumbs).
    pub text_muted: String,
    pub border: String,
    pub link: String,
    pub link_hover: String,
}

impl ColorScheme {
    pub fn default_light() -> Self {
        Self {
            background: "#ffffff".to_string(),
            text: "#111111".to_string(),
            text_muted: "#555555".to_string(),
            border: "#dddddd".to_string(),
            link: "#1d4ed8".to_string(),
            link_hover: "#1e3a8a".to_string(),
        }
    }

    pub fn default_dark() -> Self {
        Self {
            background: "#111111".to_string(),
            text: "#eeeeee".to_string(),
            text_muted: "#999999".to_string(),
            border: "#333333".to_string(),
            link: "#93c5fd".to_string(),
            link_hover: "#dbeafe".to_string(),
        }
    }
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self::default_light()
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    toml::Value::try_from(SiteConfig::default())
        .map_err(|e| ConfigError::Validation(format!("stock defaults: {e}")))
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load `config.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
pub fn load_raw_config(dir: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = dir.join(CONFIG_FILE);
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Load the site config for a library root.
///
/// Merges user values on top of stock defaults, rejects unknown keys,
/// and validates the result.
pub fn load_config(library_root: &Path) -> Result<SiteConfig, ConfigError> {
    let merged = match load_raw_config(library_root)? {
        Some(overlay) => merge_toml(stock_defaults_value()?, overlay),
        None => stock_defaults_value()?,
    };
    let config: SiteConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Returns a fully-commented stock `config.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Retro Shelf Configuration
# =========================
# Place this file at the root of your library (next to the console folders).
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Site
# ---------------------------------------------------------------------------
[site]
# Shown in page titles and as the heading of the index page.
title = "Retro Library"

# Language of the generated pages (<html lang="...">).
lang = "en"

# ---------------------------------------------------------------------------
# Output
# ---------------------------------------------------------------------------
[output]
# Write a machine-readable catalog.json next to index.html.
catalog_json = true

# ---------------------------------------------------------------------------
# Theme / layout
# ---------------------------------------------------------------------------
[theme]
# Minimum width of a game card in the grid (CSS length).
card_min_width = "220px"

# Gap between game cards (CSS length).
grid_gap = "12px"

# ---------------------------------------------------------------------------
# Colors - Light mode (prefers-color-scheme: light)
# ---------------------------------------------------------------------------
[colors.light]
background = "#ffffff"
text = "#111111"
text_muted = "#555555"    # Year, publisher, tags
border = "#dddddd"
link = "#1d4ed8"
link_hover = "#1e3a8a"

# ---------------------------------------------------------------------------
# Colors - Dark mode (prefers-color-scheme: dark)
# ---------------------------------------------------------------------------
[colors.dark]
background = "#111111"
text = "#eeeeee"
text_muted = "#999999"
border = "#333333"
link = "#93c5fd"
link_hover = "#dbeafe"
"##
}

/// Generate CSS custom properties from color config.
pub fn generate_color_css(colors: &ColorConfig) -> String {
    format!(
        r#":root {{
    --color-bg: {light_bg};
    --color-text: {light_text};
    --color-text-muted: {light_text_muted};
    --color-border: {light_border};
    --color-link: {light_link};
    --color-link-hover: {light_link_hover};
}}

@media (prefers-color-scheme: dark) {{
    :root {{
        --color-bg: {dark_bg};
        --color-text: {dark_text};
        --color-text-muted: {dark_text_muted};
        --color-border: {dark_border};
        --color-link: {dark_link};
        --color-link-hover: {dark_link_hover};
    }}
}}"#,
        light_bg = colors.light.background,
        light_text = colors.light.text,
        light_text_muted = colors.light.text_muted,
        light_border = colors.light.border,
        light_link = colors.light.link,
        light_link_hover = colors.light.link_hover,
        dark_bg = colors.dark.background,
        dark_text = colors.dark.text,
        dark_text_muted = colors.dark.text_muted,
        dark_border = colors.dark.border,
        dark_link = colors.dark.link,
        dark_link_hover = colors.dark.link_hover,
    )
}

/// Generate CSS custom properties from theme config.
pub fn generate_theme_css(theme: &ThemeConfig) -> String {
    format!(
        r#":root {{
    --card-min-width: {card_min_width};
    --grid-gap: {grid_gap};
}}"#,
        card_min_width = theme.card_min_width,
        grid_gap = theme.grid_gap,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config_values() {
        let config = SiteConfig::default();
        assert_eq!(config.site.title, "Retro Library");
        assert_eq!(config.site.lang, "en");
        assert!(config.output.catalog_json);
        assert_eq!(config.colors.light.background, "#ffffff");
        assert_eq!(config.colors.dark.background, "#111111");
    }

    #[test]
    fn parse_partial_config() {
        let toml = r##"
[colors.light]
background = "#fafafa"
"##;
        let config: SiteConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.colors.light.background, "#fafafa");
        assert_eq!(config.colors.light.text, "#111111");
        assert_eq!(config.site.title, "Retro Library");
    }

    #[test]
    fn unknown_keys_rejected() {
        let toml = r#"
[site]
titel = "Typo"
"#;
        let result: Result<SiteConfig, _> = toml::from_str(toml);
        assert!(result.is_err());
    }

    #[test]
    fn merge_overlay_wins_and_base_survives() {
        let base: toml::Value = toml::from_str(
            r#"
[site]
title = "Base"
lang = "en"
"#,
        )
        .unwrap();
        let overlay: toml::Value = toml::from_str(
            r#"
[site]
title = "Overlay"
"#,
        )
        .unwrap();

        let merged = merge_toml(base, overlay);
        let site = merged.get("site").unwrap();
        assert_eq!(site.get("title").unwrap().as_str(), Some("Overlay"));
        assert_eq!(site.get("lang").unwrap().as_str(), Some("en"));
    }

    #[test]
    fn generate_css_uses_config_colors() {
        let mut colors = ColorConfig::default();
        colors.light.background = "#f0f0f0".to_string();
        colors.dark.background = "#1a1a1a".to_string();

        let css = generate_color_css(&colors);
        assert!(css.contains("--color-bg: #f0f0f0"));
        assert!(css.contains("--color-bg: #1a1a1a"));
    }

    #[test]
    fn generate_theme_css_uses_values() {
        let theme = ThemeConfig {
            card_min_width: "180px".to_string(),
            grid_gap: "1rem".to_string(),
        };
        let css = generate_theme_css(&theme);
        assert!(css.contains("--card-min-width: 180px"));
        assert!(css.contains("--grid-gap: 1rem"));
    }

    #[test]
    fn load_config_returns_default_when_no_file() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config, SiteConfig::default());
    }

    #[test]
    fn load_config_reads_file() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join(CONFIG_FILE),
            r##"
[site]
title = "My Shelf"

[output]
catalog_json = false
"##,
        )
        .unwrap();

        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config.site.title, "My Shelf");
        assert_eq!(config.site.lang, "en");
        assert!(!config.output.catalog_json);
    }

    #[test]
    fn load_config_invalid_toml_is_error() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(CONFIG_FILE), "[site\ntitle = ").unwrap();
        assert!(matches!(
            load_config(tmp.path()),
            Err(ConfigError::Toml(_))
        ));
    }

    #[test]
    fn load_config_unknown_key_is_error() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(CONFIG_FILE), "[output]\nthumbnails = true\n").unwrap();
        assert!(load_config(tmp.path()).is_err());
    }

    #[test]
    fn validation_rejects_empty_title() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(CONFIG_FILE), "[site]\ntitle = \"  \"\n").unwrap();
        assert!(matches!(
            load_config(tmp.path()),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn validation_rejects_css_injection() {
        let mut config = SiteConfig::default();
        config.theme.grid_gap = "1px; } body { display: none".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn stock_config_parses_to_defaults() {
        let config: SiteConfig = toml::from_str(stock_config_toml()).unwrap();
        assert_eq!(config, SiteConfig::default());
    }

    #[test]
    fn fixture_library_config_overrides_defaults() {
        let tmp = crate::test_helpers::setup_fixtures();
        let config = load_config(&crate::test_helpers::library_root(&tmp)).unwrap();
        assert_eq!(config.site.title, "Fixture Library");
        assert_eq!(config.theme.card_min_width, "180px");
        assert_eq!(config.theme.grid_gap, "12px");
        assert_eq!(config.site.lang, "en");
    }
}
