/*!
 * Tests for preferences and the two-tier resolver
 */

use page_autotranslate::preferences::{
    InMemoryPreferences, LanguagePreferenceLookup, SitePreferenceLookup,
    language_preference_or_unset, site_preference_or_unset,
};
use page_autotranslate::{Preference, PreferenceDecision, resolve};

use crate::common::FailingLookups;

#[test]
fn test_resolve_decisionTable_shouldLetSiteDominate() {
    use Preference::{No, Unset, Yes};
    use PreferenceDecision::{DoNotTranslate, NoPreference, Translate};

    let table = [
        (Yes, Yes, Translate),
        (Yes, No, Translate),
        (Yes, Unset, Translate),
        (No, Yes, DoNotTranslate),
        (No, No, DoNotTranslate),
        (No, Unset, DoNotTranslate),
        (Unset, Yes, Translate),
        (Unset, No, DoNotTranslate),
        (Unset, Unset, NoPreference),
    ];

    for (site, lang, expected) in table {
        assert_eq!(resolve(site, lang), expected, "site={} lang={}", site, lang);
    }
}

#[test]
fn test_preference_parsing_shouldAcceptAliases() {
    assert_eq!("always".parse::<Preference>().unwrap(), Preference::Yes);
    assert_eq!("NEVER".parse::<Preference>().unwrap(), Preference::No);
    assert_eq!("default".parse::<Preference>().unwrap(), Preference::Unset);
    assert!("maybe".parse::<Preference>().is_err());
    assert_eq!(Preference::from(Some(false)), Preference::No);
    assert_eq!(Preference::from(None), Preference::Unset);
    assert_eq!(Preference::Yes.to_string(), "yes");
}

#[tokio::test]
async fn test_in_memory_lookups_withMixedCaseKeys_shouldNormalize() {
    let preferences = InMemoryPreferences::new();
    preferences.set_site(" Example.COM ", Preference::No);
    preferences.set_language("DE", Preference::Yes);

    assert_eq!(
        SitePreferenceLookup::lookup(&preferences, "example.com").await.unwrap(),
        Preference::No
    );
    assert_eq!(
        LanguagePreferenceLookup::lookup(&preferences, "de").await.unwrap(),
        Preference::Yes
    );
    assert_eq!(
        LanguagePreferenceLookup::lookup(&preferences, "fr").await.unwrap(),
        Preference::Unset
    );
}

#[test]
fn test_auto_translated_languages_shouldListOnlyYesSorted() {
    let preferences = InMemoryPreferences::new();
    preferences.set_language("ja", Preference::Yes);
    preferences.set_language("de", Preference::Yes);
    preferences.set_language("fr", Preference::No);

    assert_eq!(preferences.auto_translated_languages(), vec!["de", "ja"]);

    assert!(preferences.delete_language("ja"));
    assert!(!preferences.delete_language("ja"));
    assert_eq!(preferences.auto_translated_languages(), vec!["de"]);
}

#[tokio::test]
async fn test_lookup_failures_shouldDegradeToUnset() {
    crate::common::init_logging();
    let failing = FailingLookups;

    assert_eq!(site_preference_or_unset(&failing, "example.com").await, Preference::Unset);
    assert_eq!(language_preference_or_unset(&failing, "de").await, Preference::Unset);
}
