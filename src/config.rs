use crate::context::ToastTiming;
use anyhow::{Context, Result, ensure};
use std::{env, str::FromStr, sync::OnceLock, time::Duration};

/// Application configuration loaded and validated at startup
#[derive(Clone, Debug)]
pub struct AppConfig {
    /// UI server configuration
    pub ui: UiConfig,

    /// Connection verification backend
    pub verifier: VerifierConfig,

    /// Toast notification timing
    pub toast: ToastTiming,

    /// Session cookie holding the language preference
    pub session: SessionConfig,
}

#[derive(Clone, Debug)]
pub struct UiConfig {
    pub bind_address: String,
    pub port: u16,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum VerifierMode {
    Simulated,
    Http { endpoint: String },
}

#[derive(Clone, Debug)]
pub struct VerifierConfig {
    pub mode: VerifierMode,
    pub timeout: Duration,
    pub simulated_delay: Duration,
}

impl Default for VerifierConfig {
    fn default() -> Self {
        Self {
            mode: VerifierMode::Simulated,
            timeout: Duration::from_secs(30),
            simulated_delay: Duration::from_millis(2500),
        }
    }
}

#[derive(Clone)]
pub struct SessionConfig {
    pub secret: Option<String>,
    pub ttl_days: i64,
}

impl std::fmt::Debug for SessionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionConfig")
            .field("secret", &self.secret.as_ref().map(|_| "<set>"))
            .field("ttl_days", &self.ttl_days)
            .finish()
    }
}

/// Minimum secret length accepted by `actix_web::cookie::Key::from`
pub const SESSION_SECRET_MIN_LEN: usize = 64;

impl AppConfig {
    /// Get or load the application configuration
    ///
    /// # Panics
    /// Panics if configuration loading fails. The portal cannot run without
    /// valid configuration, so `main` calls this once before starting the server.
    pub fn get() -> &'static Self {
        static APP_CONFIG: OnceLock<AppConfig> = OnceLock::new();
        APP_CONFIG.get_or_init(|| {
            Self::from_lookup(|name| env::var(name).ok())
                .expect("failed to load application configuration")
        })
    }

    /// Load and validate configuration through a variable lookup function
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            ui: UiConfig::load(&lookup)?,
            verifier: VerifierConfig::load(&lookup)?,
            toast: load_toast_timing(&lookup)?,
            session: SessionConfig::load(&lookup)?,
        })
    }
}

fn parse_or<F, T>(lookup: &F, name: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(name) {
        Some(value) => value
            .trim()
            .parse::<T>()
            .with_context(|| format!("failed to parse {name}: invalid format")),
        None => Ok(default),
    }
}

impl UiConfig {
    fn load<F: Fn(&str) -> Option<String>>(lookup: &F) -> Result<Self> {
        let bind_address = lookup("UI_BIND_ADDRESS").unwrap_or_else(|| "0.0.0.0".to_string());
        let port = parse_or::<_, u16>(lookup, "UI_PORT", 8080)?;

        Ok(Self { bind_address, port })
    }
}

impl VerifierConfig {
    fn load<F: Fn(&str) -> Option<String>>(lookup: &F) -> Result<Self> {
        let mode = match lookup("VERIFIER").as_deref().unwrap_or("simulated") {
            "simulated" => VerifierMode::Simulated,
            "http" => {
                let endpoint = lookup("VERIFIER_ENDPOINT")
                    .filter(|e| !e.is_empty())
                    .context("failed to get VERIFIER_ENDPOINT: required for VERIFIER=http")?;
                VerifierMode::Http { endpoint }
            }
            other => anyhow::bail!("failed to parse VERIFIER: unknown verifier {other:?}"),
        };

        let timeout_secs = parse_or::<_, u64>(lookup, "VERIFIER_TIMEOUT_SECS", 30)?;
        ensure!(
            timeout_secs > 0,
            "failed to validate VERIFIER_TIMEOUT_SECS: must be greater than zero"
        );

        let delay_ms = parse_or::<_, u64>(lookup, "SIMULATED_DELAY_MS", 2500)?;

        Ok(Self {
            mode,
            timeout: Duration::from_secs(timeout_secs),
            simulated_delay: Duration::from_millis(delay_ms),
        })
    }
}

fn load_toast_timing<F: Fn(&str) -> Option<String>>(lookup: &F) -> Result<ToastTiming> {
    let display_ms = parse_or::<_, u64>(lookup, "TOAST_DISPLAY_MS", 5000)?;
    let fade_ms = parse_or::<_, u64>(lookup, "TOAST_FADE_MS", 300)?;

    Ok(ToastTiming {
        display: Duration::from_millis(display_ms),
        fade: Duration::from_millis(fade_ms),
    })
}

impl SessionConfig {
    fn load<F: Fn(&str) -> Option<String>>(lookup: &F) -> Result<Self> {
        let secret = lookup("SESSION_SECRET").filter(|s| !s.is_empty());

        if let Some(secret) = &secret {
            ensure!(
                secret.len() >= SESSION_SECRET_MIN_LEN,
                "failed to validate SESSION_SECRET: must be at least {SESSION_SECRET_MIN_LEN} bytes"
            );
        }

        let ttl_days = parse_or::<_, i64>(lookup, "SESSION_TTL_DAYS", 365)?;
        ensure!(
            ttl_days > 0,
            "failed to validate SESSION_TTL_DAYS: must be greater than zero"
        );

        Ok(Self { secret, ttl_days })
    }
}
