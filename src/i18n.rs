//! Portal localization
//!
//! Two fixed locales keyed by the same camelCase identifiers the page markup
//! carries in its `data-i18n` / `data-i18n-placeholder` attributes.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Session key the language preference is persisted under
pub const LANGUAGE_KEY: &str = "preferredLanguage";

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Es,
    En,
}

impl Language {
    pub fn code(self) -> &'static str {
        match self {
            Language::Es => "es",
            Language::En => "en",
        }
    }

    /// Parse a supported language code, `None` for anything else
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "es" => Some(Language::Es),
            "en" => Some(Language::En),
            _ => None,
        }
    }

    /// Resolve a persisted preference, falling back to Spanish
    pub fn from_stored(stored: Option<&str>) -> Self {
        stored.and_then(Self::from_code).unwrap_or_default()
    }

    pub fn toggled(self) -> Self {
        match self {
            Language::Es => Language::En,
            Language::En => Language::Es,
        }
    }

    /// Label of the language toggle: always the code of the *other* language
    pub fn toggle_label(self) -> &'static str {
        match self.toggled() {
            Language::Es => "ES",
            Language::En => "EN",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

type Table = &'static [(&'static str, &'static str)];

const ES: Table = &[
    ("pageTitle", "Acceso WiFi"),
    ("headerTitle", "Autenticación WiFi"),
    (
        "headerSubtitle",
        "Por favor registre su red para obtener acceso a internet. Disculpe las molestias ocasionadas.",
    ),
    ("deviceConnected", "Dispositivo conectado:"),
    ("ssidLabel", "SSID:"),
    (
        "formTitle",
        "Complete el formulario para obtener acceso a internet",
    ),
    ("ssidSelect", "Seleccione su red"),
    ("passwordLabel", "Ingrese su contraseña"),
    ("confirmPasswordLabel", "Confirme su contraseña"),
    ("verifyButton", "Verificar conexión"),
    ("footerText", "Todos los derechos reservados"),
    ("languageLabel", "Idioma"),
    ("togglePassword", "Mostrar u ocultar contraseña"),
    ("closeNotification", "Cerrar notificación"),
];

const EN: Table = &[
    ("pageTitle", "WiFi Access"),
    ("headerTitle", "WiFi Authentication"),
    (
        "headerSubtitle",
        "Please register your network to get internet access. We apologize for any inconvenience.",
    ),
    ("deviceConnected", "Device connected:"),
    ("ssidLabel", "SSID:"),
    ("formTitle", "Fill the form to get internet access"),
    ("ssidSelect", "Select your network"),
    ("passwordLabel", "Input your password"),
    ("confirmPasswordLabel", "Confirm your password"),
    ("verifyButton", "Verify connection"),
    ("footerText", "All rights reserved"),
    ("languageLabel", "Language"),
    ("togglePassword", "Show or hide password"),
    ("closeNotification", "Close notification"),
];

fn table(language: Language) -> Table {
    match language {
        Language::Es => ES,
        Language::En => EN,
    }
}

/// Look up a UI string. Unknown keys yield `None` so callers keep their fallback.
pub fn translate(language: Language, key: &str) -> Option<&'static str> {
    table(language)
        .iter()
        .find_map(|(k, v)| (*k == key).then_some(*v))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_code_accepts_only_supported_codes() {
        assert_eq!(Language::from_code("es"), Some(Language::Es));
        assert_eq!(Language::from_code("en"), Some(Language::En));
        assert_eq!(Language::from_code("EN"), None);
        assert_eq!(Language::from_code("fr"), None);
        assert_eq!(Language::from_code(""), None);
    }

    #[test]
    fn from_stored_defaults_to_spanish() {
        assert_eq!(Language::from_stored(None), Language::Es);
        assert_eq!(Language::from_stored(Some("de")), Language::Es);
        assert_eq!(Language::from_stored(Some("en")), Language::En);
    }

    #[test]
    fn toggling_twice_is_identity() {
        for language in [Language::Es, Language::En] {
            assert_ne!(language.toggled(), language);
            assert_eq!(language.toggled().toggled(), language);
        }
    }

    #[test]
    fn toggle_label_names_the_other_language() {
        assert_eq!(Language::Es.toggle_label(), "EN");
        assert_eq!(Language::En.toggle_label(), "ES");
    }

    #[test]
    fn both_tables_cover_the_same_keys() {
        assert_eq!(ES.len(), EN.len());
        for (key, _) in ES {
            assert!(translate(Language::En, key).is_some(), "missing en key {key}");
        }
    }

    #[test]
    fn unknown_key_is_skipped() {
        assert_eq!(translate(Language::Es, "noSuchKey"), None);
        assert_eq!(translate(Language::En, "pageTitle"), Some("WiFi Access"));
    }

    #[test]
    fn language_serializes_as_code() {
        assert_eq!(serde_json::to_string(&Language::En).unwrap(), "\"en\"");
    }
}
