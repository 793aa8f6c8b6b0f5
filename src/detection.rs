/*!
 * Page language detection.
 *
 * Detection may consult the declared `lang` attribute only, or run a content
 * heuristic over the page text. Either way the answer can be "unknown", and a
 * failing detector is treated the same as an unknown result.
 */

use async_trait::async_trait;
use log::warn;
use parking_lot::RwLock;
use std::sync::Arc;

use crate::errors::LookupError;
use crate::language_utils::normalize_detected;

/// Source of the page language
#[async_trait]
pub trait PageLanguageDetector: Send + Sync {
    /// Detect the page language; `Ok(None)` means unknown
    async fn detect(&self, use_content_heuristics: bool) -> Result<Option<String>, LookupError>;
}

/// Detect the page language, degrading failures to unknown and normalizing codes
pub async fn detect_or_unknown(
    detector: &dyn PageLanguageDetector,
    use_content_heuristics: bool,
) -> Option<String> {
    match detector.detect(use_content_heuristics).await {
        Ok(language) => language.as_deref().and_then(normalize_detected),
        Err(e) => {
            warn!("Page language detection failed: {}", e);
            None
        }
    }
}

#[derive(Debug, Default)]
struct StaticLanguages {
    declared: Option<String>,
    content: Option<String>,
}

/// Detector answering from known values
///
/// `declared` plays the role of the document `lang` attribute and `content`
/// the result of the text heuristic. With heuristics enabled the content
/// language wins and the declared one is the fallback. Both can be changed
/// while a context runs to simulate a page whose language shifts after load.
#[derive(Debug, Clone, Default)]
pub struct StaticLanguageDetector {
    languages: Arc<RwLock<StaticLanguages>>,
}

impl StaticLanguageDetector {
    pub fn new(declared: Option<&str>, content: Option<&str>) -> Self {
        Self {
            languages: Arc::new(RwLock::new(StaticLanguages {
                declared: declared.map(str::to_string),
                content: content.map(str::to_string),
            })),
        }
    }

    /// Detector that always answers `language`
    pub fn fixed(language: &str) -> Self {
        Self::new(Some(language), Some(language))
    }

    pub fn set_declared(&self, language: Option<&str>) {
        self.languages.write().declared = language.map(str::to_string);
    }

    pub fn set_content(&self, language: Option<&str>) {
        self.languages.write().content = language.map(str::to_string);
    }
}

#[async_trait]
impl PageLanguageDetector for StaticLanguageDetector {
    async fn detect(&self, use_content_heuristics: bool) -> Result<Option<String>, LookupError> {
        let languages = self.languages.read();
        let detected = if use_content_heuristics {
            languages.content.clone().or_else(|| languages.declared.clone())
        } else {
            languages.declared.clone()
        };
        Ok(detected)
    }
}
