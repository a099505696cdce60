//! Per-request UI context
//!
//! Owns the handle to the persisted language preference and the toast
//! container of the page being rendered. One context is initialized per
//! request and handed to every render and submit call.

use crate::i18n::{self, LANGUAGE_KEY, Language};
use actix_session::Session;
use anyhow::{Context, Result, anyhow};
use log::{debug, warn};
use serde::Serialize;
use std::time::Duration;
use uuid::Uuid;

/// Key-value storage the language preference is persisted in
pub trait PreferenceStore {
    fn load(&self, key: &str) -> Result<Option<String>>;
    fn store(&self, key: &str, value: &str) -> Result<()>;
}

impl PreferenceStore for Session {
    fn load(&self, key: &str) -> Result<Option<String>> {
        self.get::<String>(key)
            .map_err(|e| anyhow!("{e}"))
            .context("failed to read session value")
    }

    fn store(&self, key: &str, value: &str) -> Result<()> {
        self.insert(key, value)
            .map_err(|e| anyhow!("{e}"))
            .context("failed to write session value")
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastKind {
    Error,
    Success,
}

impl ToastKind {
    pub fn icon(self) -> &'static str {
        match self {
            ToastKind::Error => "✕",
            ToastKind::Success => "✓",
        }
    }

    pub fn css_class(self) -> &'static str {
        match self {
            ToastKind::Error => "toast-error",
            ToastKind::Success => "toast-success",
        }
    }
}

/// How long a toast stays on screen and how long it fades out afterwards
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ToastTiming {
    pub display: Duration,
    pub fade: Duration,
}

impl Default for ToastTiming {
    fn default() -> Self {
        Self {
            display: Duration::from_millis(5000),
            fade: Duration::from_millis(300),
        }
    }
}

/// Whole milliseconds, saturating at `u64::MAX`
fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Toast {
    pub id: Uuid,
    pub kind: ToastKind,
    pub icon: &'static str,
    pub message: String,
    pub display_ms: u64,
    pub fade_ms: u64,
}

impl Toast {
    pub fn new(message: impl Into<String>, kind: ToastKind, timing: ToastTiming) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            icon: kind.icon(),
            message: message.into(),
            display_ms: millis(timing.display),
            fade_ms: millis(timing.fade),
        }
    }

    /// Time from creation until the toast is removed from the document
    pub fn lifetime(&self) -> Duration {
        Duration::from_millis(self.display_ms.saturating_add(self.fade_ms))
    }
}

pub struct PortalContext {
    store: Box<dyn PreferenceStore>,
    language: Language,
    document_lang: Option<Language>,
    toast_timing: ToastTiming,
    toasts: Option<Vec<Toast>>,
}

impl PortalContext {
    /// Read and validate the persisted preference, defaulting to Spanish
    pub fn initialize(store: impl PreferenceStore + 'static, toast_timing: ToastTiming) -> Self {
        let stored = store.load(LANGUAGE_KEY).unwrap_or_else(|e| {
            warn!("ignoring stored language preference: {e:#}");
            None
        });

        let language = Language::from_stored(stored.as_deref());
        debug!("portal context initialized with language {language} (stored: {stored:?})");

        Self {
            store: Box::new(store),
            language,
            document_lang: None,
            toast_timing,
            toasts: None,
        }
    }

    pub fn language(&self) -> Language {
        self.language
    }

    /// Language attribute of the rendered document, set by [`Self::apply_translations`]
    pub fn document_lang(&self) -> Option<Language> {
        self.document_lang
    }

    /// Set the document language, persist the current choice and return the page title
    pub fn apply_translations(&mut self) -> Option<&'static str> {
        self.document_lang = Some(self.language);

        if let Err(e) = self.store.store(LANGUAGE_KEY, self.language.code()) {
            warn!("failed to persist language preference: {e:#}");
        }

        i18n::translate(self.language, "pageTitle")
    }

    /// Flip the language, reapply translations and return the new toggle label
    pub fn toggle_language(&mut self) -> &'static str {
        self.language = self.language.toggled();
        self.apply_translations();
        self.language.toggle_label()
    }

    /// Text for an element tagged with a translation key; unknown keys keep `fallback`
    pub fn text(&self, key: &str, fallback: &'static str) -> &'static str {
        i18n::translate(self.language, key).unwrap_or(fallback)
    }

    /// Placeholder of an input tagged with a translation key
    pub fn placeholder(&self, key: &str, fallback: &'static str) -> &'static str {
        self.text(key, fallback)
    }

    pub fn toast_timing(&self) -> ToastTiming {
        self.toast_timing
    }

    /// Append a toast, creating the container on first use
    pub fn notify(&mut self, message: impl Into<String>, kind: ToastKind) -> &Toast {
        let toast = Toast::new(message, kind, self.toast_timing);
        debug!("notify {:?}: {}", toast.kind, toast.message);

        let container = self.toasts.get_or_insert_with(Vec::new);
        container.push(toast);
        &container[container.len() - 1]
    }

    /// `None` until the first notification created the container
    pub fn toasts(&self) -> Option<&[Toast]> {
        self.toasts.as_deref()
    }

    pub fn take_toasts(&mut self) -> Vec<Toast> {
        self.toasts.take().unwrap_or_default()
    }
}
