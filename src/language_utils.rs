use anyhow::{Result, anyhow};
use isolang::Language;

/// Language utilities for page and target language codes
///
/// Page languages come from detectors and HTML `lang` attributes, so they
/// arrive in many shapes (`en`, `EN`, `eng`, `fre`, `en-US`). These helpers
/// validate configured codes and compare detected ones.
/// Language code type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LanguageCodeType {
    /// ISO 639-1 (2-letter) code
    Part1,
    /// ISO 639-2/T (3-letter) code
    Part2T,
    /// ISO 639-2/B (3-letter) code
    Part2B,
}

/// Bibliographic ISO 639-2/B codes and their terminological 639-2/T forms
const PART2B_TO_PART2T: &[(&str, &str)] = &[
    ("fre", "fra"),
    ("ger", "deu"),
    ("dut", "nld"),
    ("gre", "ell"),
    ("chi", "zho"),
    ("cze", "ces"),
    ("ice", "isl"),
    ("alb", "sqi"),
    ("arm", "hye"),
    ("baq", "eus"),
    ("bur", "mya"),
    ("per", "fas"),
    ("geo", "kat"),
    ("may", "msa"),
    ("mac", "mkd"),
    ("rum", "ron"),
    ("slo", "slk"),
    ("wel", "cym"),
];

/// Markers detectors use when they could not identify a language
const UNKNOWN_MARKERS: &[&str] = &["und", "auto", "unknown", "zxx"];

fn part2b_to_part2t(code: &str) -> Option<&'static str> {
    PART2B_TO_PART2T
        .iter()
        .find(|(b, _)| *b == code)
        .map(|(_, t)| *t)
}

/// Strip a region or script subtag: `en-US` -> `en`, `zh_Hant` -> `zh`
fn primary_subtag(code: &str) -> &str {
    code.split(['-', '_']).next().unwrap_or(code)
}

/// Validate if a language code is a valid ISO 639-1 or ISO 639-2 code
pub fn validate_language_code(code: &str) -> Result<LanguageCodeType> {
    let normalized_code = code.trim().to_lowercase();

    match normalized_code.len() {
        2 if Language::from_639_1(&normalized_code).is_some() => Ok(LanguageCodeType::Part1),
        3 if Language::from_639_3(&normalized_code).is_some() => Ok(LanguageCodeType::Part2T),
        3 if part2b_to_part2t(&normalized_code).is_some() => Ok(LanguageCodeType::Part2B),
        _ => Err(anyhow!("Invalid language code: {}", code)),
    }
}

/// Normalize a language code to ISO 639-2/T (3-letter) format
pub fn normalize_to_part2t(code: &str) -> Result<String> {
    let lowered = code.trim().to_lowercase();
    let normalized_code = primary_subtag(&lowered);

    if normalized_code.len() == 2 {
        if let Some(lang) = Language::from_639_1(normalized_code) {
            return Ok(lang.to_639_3().to_string());
        }
    } else if normalized_code.len() == 3 {
        if Language::from_639_3(normalized_code).is_some() {
            return Ok(normalized_code.to_string());
        }
        if let Some(part2t) = part2b_to_part2t(normalized_code) {
            return Ok(part2t.to_string());
        }
    }

    Err(anyhow!("Cannot normalize invalid language code: {}", code))
}

/// Clean up a raw detector result.
///
/// Returns `None` when the detector could not tell (empty string or one of
/// the "undetermined" markers). Anything else is trimmed and lower-cased but
/// otherwise kept as-is, since translators accept regional codes.
pub fn normalize_detected(raw: &str) -> Option<String> {
    let cleaned = raw.trim().to_lowercase();
    if cleaned.is_empty() || UNKNOWN_MARKERS.contains(&cleaned.as_str()) {
        return None;
    }
    Some(cleaned)
}

/// Check if two language codes match (represent the same language)
///
/// Codes that are not ISO codes only match when they are textually equal.
pub fn language_codes_match(code1: &str, code2: &str) -> bool {
    if code1.trim().eq_ignore_ascii_case(code2.trim()) {
        return true;
    }

    match (normalize_to_part2t(code1), normalize_to_part2t(code2)) {
        (Ok(normalized1), Ok(normalized2)) => normalized1 == normalized2,
        _ => false,
    }
}
