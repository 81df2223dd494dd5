use fluent_bundle::concurrent::FluentBundle;
use fluent_bundle::{FluentArgs, FluentResource, FluentValue};
use std::collections::HashMap;
use std::sync::LazyLock;
use tracing::warn;
use unic_langid::LanguageIdentifier;

/// Languages with a bundled catalogue; the first one is the fallback
pub const SUPPORTED_LANGUAGES: &[(&str, &str)] = &[
    ("en", include_str!("../locales/en/main.ftl")),
    ("ru", include_str!("../locales/ru/main.ftl")),
];

const DEFAULT_LANGUAGE: &str = "en";

/// Localization manager for the ordering bot
pub struct LocalizationManager {
    bundles: HashMap<&'static str, FluentBundle<FluentResource>>,
}

impl LocalizationManager {
    /// Create a new localization manager with every bundled language
    pub fn new() -> Self {
        let mut bundles = HashMap::new();
        for (language, source) in SUPPORTED_LANGUAGES {
            if let Some(bundle) = Self::create_bundle(language, source) {
                bundles.insert(*language, bundle);
            }
        }
        Self { bundles }
    }

    /// Create a fluent bundle for a specific locale
    fn create_bundle(language: &str, source: &str) -> Option<FluentBundle<FluentResource>> {
        let locale: LanguageIdentifier = match language.parse() {
            Ok(locale) => locale,
            Err(e) => {
                warn!(language, error = %e, "Invalid language identifier");
                return None;
            }
        };

        let resource = match FluentResource::try_new(source.to_string()) {
            Ok(resource) => resource,
            Err((resource, errors)) => {
                warn!(language, errors = errors.len(), "Locale file has syntax errors");
                resource
            }
        };

        let mut bundle = FluentBundle::new_concurrent(vec![locale]);
        bundle.set_use_isolating(false);
        if let Err(errors) = bundle.add_resource(resource) {
            warn!(language, errors = errors.len(), "Duplicate messages in locale file");
        }
        Some(bundle)
    }

    /// Get a localized message in the given language, falling back to English
    pub fn get_message_in_language(
        &self,
        key: &str,
        language: &str,
        args: Option<&HashMap<&str, &str>>,
    ) -> String {
        let bundle = match self
            .bundles
            .get(language)
            .or_else(|| self.bundles.get(DEFAULT_LANGUAGE))
        {
            Some(bundle) => bundle,
            None => return format!("Missing translation: {}", key),
        };

        let pattern = match bundle.get_message(key).and_then(|msg| msg.value()) {
            Some(pattern) => pattern,
            None => return format!("Missing translation: {}", key),
        };

        let fluent_args = args.map(|args| {
            let mut fluent_args = FluentArgs::new();
            for (k, v) in args {
                fluent_args.set(*k, FluentValue::from(*v));
            }
            fluent_args
        });

        let mut errors = vec![];
        bundle
            .format_pattern(pattern, fluent_args.as_ref(), &mut errors)
            .into_owned()
    }
}

impl Default for LocalizationManager {
    fn default() -> Self {
        Self::new()
    }
}

static LOCALIZATION_MANAGER: LazyLock<LocalizationManager> = LazyLock::new(LocalizationManager::new);

/// Pick the catalogue for a Telegram language code
pub fn detect_language(language_code: Option<&str>) -> &'static str {
    match language_code {
        Some(code) if code.to_lowercase().starts_with("ru") => "ru",
        _ => DEFAULT_LANGUAGE,
    }
}

/// Localized message for a user's language code
pub fn t_lang(key: &str, language_code: Option<&str>) -> String {
    LOCALIZATION_MANAGER.get_message_in_language(key, detect_language(language_code), None)
}

/// Localized message with arguments for a user's language code
pub fn t_args_lang(key: &str, args: &[(&str, &str)], language_code: Option<&str>) -> String {
    let args_map: HashMap<&str, &str> = args.iter().cloned().collect();
    LOCALIZATION_MANAGER.get_message_in_language(key, detect_language(language_code), Some(&args_map))
}
