use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::default::Default;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Application configuration module
/// This module handles the configuration consumed by the orchestration engine:
/// the target language, DOM translator settings, selection translator settings
/// and the auto-translate policy knobs.
/// Represents one immutable configuration snapshot
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Config {
    /// Target language code (ISO)
    #[serde(default = "default_target_language")]
    pub language: String,

    /// Whole-page translator settings
    #[serde(default)]
    pub page_translator: PageTranslatorConfig,

    /// Selection translator settings
    #[serde(default)]
    pub select_translator: SelectTranslatorConfig,

    /// Page-load auto-translation policy
    #[serde(default)]
    pub auto_translate: AutoTranslateConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// DOM translator settings, pushed to the controller as a whole
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct PageTranslatorConfig {
    /// Detect the page language from its text instead of the `lang` attribute
    #[serde(default = "default_true")]
    pub detect_language_by_content: bool,

    /// Translate nodes only when they scroll into view
    #[serde(default = "default_true")]
    pub lazy_translate: bool,

    /// Show the original text in a popup when hovering translated nodes
    #[serde(default)]
    pub original_text_popup: bool,

    /// Tags whose content is never translated
    #[serde(default = "default_ignored_tags")]
    pub ignored_tags: Vec<String>,

    /// Attributes translated alongside text nodes
    #[serde(default = "default_translatable_attributes")]
    pub translatable_attributes: Vec<String>,
}

impl Default for PageTranslatorConfig {
    fn default() -> Self {
        Self {
            detect_language_by_content: true,
            lazy_translate: true,
            original_text_popup: false,
            ignored_tags: default_ignored_tags(),
            translatable_attributes: default_translatable_attributes(),
        }
    }
}

/// How the selection translator is invoked
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum SelectTranslatorMode {
    /// Translate as soon as text is selected
    #[default]
    QuickTranslate,
    /// Translate from the context menu entry
    ContextMenu,
    /// Only the popup button
    Off,
}

impl SelectTranslatorMode {
    // @returns: Stable identifier used in fingerprints and the CLI
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::QuickTranslate => "quickTranslate",
            Self::ContextMenu => "contextMenu",
            Self::Off => "off",
        }
    }
}

impl std::fmt::Display for SelectTranslatorMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for SelectTranslatorMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "quicktranslate" | "quick" => Ok(Self::QuickTranslate),
            "contextmenu" | "context-menu" => Ok(Self::ContextMenu),
            "off" => Ok(Self::Off),
            _ => Err(anyhow!("Invalid selection translator mode: {}", s)),
        }
    }
}

/// Selection translator settings
///
/// The whole subtree is the construction input of a selection translator:
/// any change to it recreates the controller.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct SelectTranslatorConfig {
    /// Whether selection translation is available at all
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Invocation mode
    #[serde(default)]
    pub mode: SelectTranslatorMode,

    /// Turn selection translation off while the whole page is translated
    #[serde(default = "default_true")]
    pub disable_while_translate_page: bool,

    /// Show the original text next to the translation
    #[serde(default = "default_true")]
    pub show_original_text: bool,

    /// Only react to selections made within a single node
    #[serde(default)]
    pub strict_selection: bool,

    /// Prefer the detected language of the selection over the page language
    #[serde(default = "default_true")]
    pub detected_lang_first: bool,

    /// Delay before the popup hides itself, in milliseconds
    #[serde(default = "default_timeout_for_hiding_ms")]
    pub timeout_for_hiding_ms: u64,
}

impl Default for SelectTranslatorConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            mode: SelectTranslatorMode::default(),
            disable_while_translate_page: true,
            show_original_text: true,
            strict_selection: false,
            detected_lang_first: true,
            timeout_for_hiding_ms: default_timeout_for_hiding_ms(),
        }
    }
}

/// Stable identity of a selection translator configuration subtree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConfigFingerprint([u8; 32]);

impl ConfigFingerprint {
    /// Hex representation, handy for logs
    pub fn to_hex(&self) -> String {
        self.0.iter().map(|byte| format!("{:02x}", byte)).collect()
    }
}

impl SelectTranslatorConfig {
    /// Compute the identity of this subtree.
    ///
    /// Every field is fed into the digest with a tag so that two configurations
    /// share a fingerprint exactly when they are equal.
    pub fn fingerprint(&self) -> ConfigFingerprint {
        let mut hasher = Sha256::new();
        hasher.update(b"enabled");
        hasher.update([u8::from(self.enabled)]);
        hasher.update(b"mode");
        hasher.update(self.mode.as_str().as_bytes());
        hasher.update(b"disable_while_translate_page");
        hasher.update([u8::from(self.disable_while_translate_page)]);
        hasher.update(b"show_original_text");
        hasher.update([u8::from(self.show_original_text)]);
        hasher.update(b"strict_selection");
        hasher.update([u8::from(self.strict_selection)]);
        hasher.update(b"detected_lang_first");
        hasher.update([u8::from(self.detected_lang_first)]);
        hasher.update(b"timeout_for_hiding_ms");
        hasher.update(self.timeout_for_hiding_ms.to_le_bytes());

        ConfigFingerprint(hasher.finalize().into())
    }
}

/// Auto-translation policy knobs
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct AutoTranslateConfig {
    /// Auto-translate even when the page is already in the target language
    #[serde(default = "default_true")]
    pub allow_same_language: bool,
}

impl Default for AutoTranslateConfig {
    fn default() -> Self {
        Self {
            allow_same_language: true,
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Map onto the `log` crate filter
    pub fn to_level_filter(self) -> log::LevelFilter {
        match self {
            Self::Error => log::LevelFilter::Error,
            Self::Warn => log::LevelFilter::Warn,
            Self::Info => log::LevelFilter::Info,
            Self::Debug => log::LevelFilter::Debug,
            Self::Trace => log::LevelFilter::Trace,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_target_language() -> String {
    "en".to_string()
}

fn default_timeout_for_hiding_ms() -> u64 {
    3000
}

fn default_ignored_tags() -> Vec<String> {
    ["meta", "link", "script", "noscript", "style", "code", "textarea"]
        .iter()
        .map(|tag| tag.to_string())
        .collect()
}

fn default_translatable_attributes() -> Vec<String> {
    ["title", "alt", "placeholder", "label", "aria-label"]
        .iter()
        .map(|attr| attr.to_string())
        .collect()
}

impl Config {
    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        crate::language_utils::validate_language_code(&self.language)
            .with_context(|| format!("Invalid target language '{}'", self.language))?;

        if self.select_translator.timeout_for_hiding_ms == 0 {
            return Err(anyhow!("select_translator.timeout_for_hiding_ms must be positive"));
        }

        if self
            .page_translator
            .ignored_tags
            .iter()
            .any(|tag| tag.trim().is_empty())
        {
            return Err(anyhow!("page_translator.ignored_tags contains an empty tag"));
        }

        Ok(())
    }

    /// Parse a configuration from a JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Config =
            serde_json::from_str(json).context("Failed to parse configuration JSON")?;
        Ok(config)
    }

    /// Load a configuration file
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("Failed to open config file: {}", path.display()))?;
        let reader = BufReader::new(file);
        let config: Config = serde_json::from_reader(reader)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        Ok(config)
    }

    /// Write the configuration as pretty JSON
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .context("Failed to serialize config to JSON")?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;
        Ok(())
    }

    /// Load the file if present, otherwise write and return the defaults
    pub fn load_or_create(path: &Path) -> Result<Self> {
        if path.exists() {
            return Self::load(path);
        }

        log::warn!("Config file not found at '{}', creating default config.", path.display());
        let config = Self::default();
        config.save(path)?;
        Ok(config)
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            language: default_target_language(),
            page_translator: PageTranslatorConfig::default(),
            select_translator: SelectTranslatorConfig::default(),
            auto_translate: AutoTranslateConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}
