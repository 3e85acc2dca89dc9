use log::warn;
use serde::Deserialize;
use std::fs;
use std::path::Path;

const DEFAULT_CONFIG: &str = include_str!("default_config.toml");

/// Rendering settings, passed explicitly into every render call.
#[derive(Debug, Clone, PartialEq, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub classes: ClassConfig,
    pub image: ImageConfig,
    pub highlight: HighlightConfig,
    pub text: TextConfig,
}

/// CSS classes emitted per node kind. An empty string omits the attribute.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ClassConfig {
    pub container: String,
    pub paragraph: String,
    pub h1: String,
    pub h2: String,
    pub h3: String,
    pub h4: String,
    pub h5: String,
    pub h6: String,
    pub bullet_list: String,
    pub ordered_list: String,
    pub list_item: String,
    pub blockquote: String,
    pub pre: String,
    pub code_block: String,
    pub inline_code: String,
    pub link: String,
    pub highlight: String,
    pub image_wrapper: String,
    pub image: String,
    pub caption: String,
    pub rule: String,
}

impl Default for ClassConfig {
    fn default() -> Self {
        Self {
            container: "prose prose-gray dark:prose-invert max-w-none".to_string(),
            paragraph: "mb-4".to_string(),
            h1: "text-4xl font-bold mb-6 mt-8".to_string(),
            h2: "text-3xl font-semibold mb-5 mt-7".to_string(),
            h3: "text-2xl font-semibold mb-4 mt-6".to_string(),
            h4: "text-xl font-semibold mb-3 mt-5".to_string(),
            h5: "text-lg font-semibold mb-2 mt-4".to_string(),
            h6: "text-base font-semibold mb-2 mt-3".to_string(),
            bullet_list: "list-disc list-inside mb-4 ml-4".to_string(),
            ordered_list: "list-decimal list-inside mb-4 ml-4".to_string(),
            list_item: "mb-1".to_string(),
            blockquote:
                "border-l-4 border-gray-300 pl-4 italic mb-4 text-gray-600 dark:text-gray-400"
                    .to_string(),
            pre: "bg-gray-100 dark:bg-gray-800 p-4 rounded-lg mb-4 overflow-x-auto".to_string(),
            code_block: "text-sm".to_string(),
            inline_code: "bg-gray-100 dark:bg-gray-800 px-1 py-0.5 rounded text-sm".to_string(),
            link: "text-blue-600 dark:text-blue-400 hover:underline".to_string(),
            highlight: "px-1 py-0.5 rounded".to_string(),
            image_wrapper: "mb-4".to_string(),
            image: "rounded-lg max-w-full h-auto".to_string(),
            caption: "text-sm text-gray-600 dark:text-gray-400 mt-2 text-center italic".to_string(),
            rule: "my-6 border-gray-300 dark:border-gray-600".to_string(),
        }
    }
}

impl ClassConfig {
    /// Class for a heading level, clamped into `1..=6`.
    pub fn heading(&self, level: u8) -> &str {
        match level {
            0 | 1 => &self.h1,
            2 => &self.h2,
            3 => &self.h3,
            4 => &self.h4,
            5 => &self.h5,
            _ => &self.h6,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ImageConfig {
    /// Used whenever an image node has no usable `src`
    pub placeholder_src: String,
    pub default_alt: String,
    pub width: u32,
    pub height: u32,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            placeholder_src: "/placeholder.svg".to_string(),
            default_alt: "Image".to_string(),
            width: 800,
            height: 400,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct HighlightConfig {
    pub color: String,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            color: "#ffff00".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct TextConfig {
    /// Shown when nothing renderable was stored
    pub unavailable: String,
    pub words_per_minute: u32,
    /// Maximum excerpt length in characters
    pub excerpt_length: usize,
}

impl Default for TextConfig {
    fn default() -> Self {
        Self {
            unavailable: "No content available".to_string(),
            words_per_minute: 200,
            excerpt_length: 160,
        }
    }
}

impl Config {
    /// The config bundled with the crate.
    pub fn compiled_default() -> Self {
        // build.rs has already checked the bundled file parses
        Self::from_toml_str(DEFAULT_CONFIG).unwrap_or_default()
    }

    /// Parse a TOML config; missing keys take their defaults.
    pub fn from_toml_str(content: &str) -> Result<Self, String> {
        toml::from_str(content).map_err(|e| format!("Invalid config: {}", e))
    }

    /// Load config from a TOML file, or return defaults if it is missing or invalid.
    pub fn load(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(content) => Self::from_toml_str(&content).unwrap_or_else(|e| {
                warn!("{}: {}; using defaults", path.display(), e);
                Self::compiled_default()
            }),
            Err(e) => {
                warn!("could not read {}: {}; using defaults", path.display(), e);
                Self::compiled_default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundled_config_matches_defaults() {
        assert_eq!(
            Config::from_toml_str(DEFAULT_CONFIG),
            Ok(Config::default())
        );
    }

    #[test]
    fn partial_override() {
        let config = Config::from_toml_str("[highlight]\ncolor = \"#00ff00\"\n").unwrap();
        assert_eq!(config.highlight.color, "#00ff00");
        assert_eq!(config.image.width, 800);
        assert_eq!(config.classes.paragraph, "mb-4");
    }

    #[test]
    fn invalid_toml_is_an_error() {
        assert!(Config::from_toml_str("[image\nwidth = 3").is_err());
    }

    #[test]
    fn missing_file_falls_back() {
        let config = Config::load(Path::new("/nonexistent/folio.toml"));
        assert_eq!(config, Config::compiled_default());
    }

    #[test]
    fn heading_classes() {
        let classes = ClassConfig::default();
        assert_eq!(classes.heading(2), "text-3xl font-semibold mb-5 mt-7");
        assert_eq!(classes.heading(9), classes.h6);
    }
}
