//! Registration form validation
//!
//! Pure functions, independent of HTTP concerns.

use crate::i18n::Language;
use serde::Serialize;

pub const MIN_PASSWORD_CHARS: usize = 8;

/// Display state of a single password field
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum PasswordVisibility {
    #[default]
    Masked,
    Revealed,
}

impl PasswordVisibility {
    pub fn toggled(self) -> Self {
        match self {
            PasswordVisibility::Masked => PasswordVisibility::Revealed,
            PasswordVisibility::Revealed => PasswordVisibility::Masked,
        }
    }

    /// `type` attribute of the input element
    pub fn input_type(self) -> &'static str {
        match self {
            PasswordVisibility::Masked => "password",
            PasswordVisibility::Revealed => "text",
        }
    }

    /// Class list of the toggle button
    pub fn button_class(self) -> &'static str {
        match self {
            PasswordVisibility::Masked => "toggle-password",
            PasswordVisibility::Revealed => "toggle-password show-password",
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum PasswordCheck {
    Empty,
    TooShort,
    Mismatch,
    Accepted,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct ValidationResult {
    pub valid: bool,
    pub message: &'static str,
    pub check: PasswordCheck,
}

struct Messages {
    empty: &'static str,
    short: &'static str,
    mismatch: &'static str,
    success: &'static str,
}

const MESSAGES_ES: Messages = Messages {
    empty: "Por favor ingrese una contraseña",
    short: "La contraseña debe tener al menos 8 caracteres",
    mismatch: "Las contraseñas no coinciden",
    success: "Verificando conexión...",
};

const MESSAGES_EN: Messages = Messages {
    empty: "Please enter a password",
    short: "Password must be at least 8 characters",
    mismatch: "Passwords do not match",
    success: "Verifying connection...",
};

fn messages(language: Language) -> &'static Messages {
    match language {
        Language::Es => &MESSAGES_ES,
        Language::En => &MESSAGES_EN,
    }
}

/// Check the entered password and its confirmation
///
/// Checks run in order: empty, too short, mismatch. The first failing check wins.
/// Length is counted in characters, not bytes.
pub fn validate_passwords(language: Language, password: &str, confirm: &str) -> ValidationResult {
    let t = messages(language);

    let (check, message) = if password.is_empty() || confirm.is_empty() {
        (PasswordCheck::Empty, t.empty)
    } else if password.chars().count() < MIN_PASSWORD_CHARS {
        (PasswordCheck::TooShort, t.short)
    } else if password != confirm {
        (PasswordCheck::Mismatch, t.mismatch)
    } else {
        (PasswordCheck::Accepted, t.success)
    };

    ValidationResult {
        valid: check == PasswordCheck::Accepted,
        message,
        check,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(password: &str, confirm: &str) -> PasswordCheck {
        validate_passwords(Language::Es, password, confirm).check
    }

    #[test]
    fn empty_values() {
        assert_eq!(check("", ""), PasswordCheck::Empty);
        assert_eq!(check("longenough1", ""), PasswordCheck::Empty);
        assert_eq!(check("", "longenough1"), PasswordCheck::Empty);
    }

    #[test]
    fn empty_wins_over_short() {
        assert_eq!(check("abc", ""), PasswordCheck::Empty);
    }

    #[test]
    fn short_password() {
        let result = validate_passwords(Language::Es, "abc", "abc");
        assert!(!result.valid);
        assert_eq!(result.check, PasswordCheck::TooShort);
        assert_eq!(result.message, "La contraseña debe tener al menos 8 caracteres");

        let result = validate_passwords(Language::En, "abc", "abc");
        assert_eq!(result.message, "Password must be at least 8 characters");
    }

    #[test]
    fn short_is_checked_before_mismatch() {
        assert_eq!(check("abc", "xyz"), PasswordCheck::TooShort);
    }

    #[test]
    fn seven_chars_is_short_eight_is_enough() {
        assert_eq!(check("1234567", "1234567"), PasswordCheck::TooShort);
        assert_eq!(check("12345678", "12345678"), PasswordCheck::Accepted);
    }

    #[test]
    fn length_counts_characters() {
        // 4 characters but 8 bytes
        assert_eq!(check("ñañá", "ñañá"), PasswordCheck::TooShort);
        assert_eq!(check("contraseña", "contraseña"), PasswordCheck::Accepted);
    }

    #[test]
    fn mismatch() {
        let result = validate_passwords(Language::En, "longenough1", "different1");
        assert!(!result.valid);
        assert_eq!(result.check, PasswordCheck::Mismatch);
        assert_eq!(result.message, "Passwords do not match");
    }

    #[test]
    fn equal_length_values_that_differ() {
        assert_eq!(check("password1", "password2"), PasswordCheck::Mismatch);
    }

    #[test]
    fn accepted() {
        let result = validate_passwords(Language::Es, "longenough1", "longenough1");
        assert!(result.valid);
        assert_eq!(result.message, "Verificando conexión...");
    }

    #[test]
    fn visibility_toggles_independently() {
        let password = PasswordVisibility::default();
        let confirm = PasswordVisibility::default();

        let password = password.toggled();

        assert_eq!(password.input_type(), "text");
        assert_eq!(confirm.input_type(), "password");
        assert!(password.button_class().contains("show-password"));
        assert_eq!(password.toggled(), PasswordVisibility::Masked);
    }
}
