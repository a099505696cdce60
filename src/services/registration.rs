//! Network registration: validation, verification and outcome notification

use crate::{
    context::{PortalContext, ToastKind},
    device_info::DeviceInfo,
    i18n::Language,
    services::{
        validation::{PasswordCheck, validate_passwords},
        verification::{ConnectionVerifier, VerificationRequest},
    },
};
use log::{debug, error, info, warn};
use serde::Deserialize;
use std::{
    collections::HashMap,
    fmt,
    sync::{
        Arc, Mutex,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};
use tokio::{task::AbortHandle, time::timeout};
use uuid::Uuid;

#[derive(Clone, Deserialize)]
pub struct RegistrationForm {
    #[serde(default)]
    pub ssid: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub confirm_password: String,
    /// Attempt id rendered into the page, lets the client cancel this submission
    #[serde(default)]
    pub attempt: Option<Uuid>,
}

impl fmt::Debug for RegistrationForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistrationForm")
            .field("ssid", &self.ssid)
            .field("attempt", &self.attempt)
            .finish_non_exhaustive()
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SubmitOutcome {
    Invalid(PasswordCheck),
    Verified,
    Rejected,
    Failed,
    TimedOut,
    Cancelled,
}

impl SubmitOutcome {
    pub fn as_str(self) -> &'static str {
        match self {
            SubmitOutcome::Invalid(_) => "invalid",
            SubmitOutcome::Verified => "verified",
            SubmitOutcome::Rejected => "rejected",
            SubmitOutcome::Failed => "failed",
            SubmitOutcome::TimedOut => "timedOut",
            SubmitOutcome::Cancelled => "cancelled",
        }
    }
}

struct Messages {
    verified: &'static str,
    failed: &'static str,
    cancelled: &'static str,
}

const MESSAGES_ES: Messages = Messages {
    verified: "¡Conexión verificada exitosamente!",
    failed: "Error al verificar la conexión. Por favor intente nuevamente.",
    cancelled: "Verificación cancelada",
};

const MESSAGES_EN: Messages = Messages {
    verified: "Connection verified successfully!",
    failed: "Error verifying connection. Please try again.",
    cancelled: "Verification cancelled",
};

fn messages(language: Language) -> &'static Messages {
    match language {
        Language::Es => &MESSAGES_ES,
        Language::En => &MESSAGES_EN,
    }
}

type InFlight = Arc<Mutex<HashMap<Uuid, (u64, AbortHandle)>>>;

/// Marks an attempt as in flight for as long as it lives
///
/// Dropping the guard aborts the verification task and removes the entry,
/// unless a newer submission with the same attempt id already replaced it.
struct InFlightGuard {
    registry: InFlight,
    attempt: Uuid,
    generation: u64,
    handle: AbortHandle,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.handle.abort();

        let mut registry = self.registry.lock().unwrap_or_else(|e| e.into_inner());
        if registry
            .get(&self.attempt)
            .is_some_and(|(generation, _)| *generation == self.generation)
        {
            registry.remove(&self.attempt);
        }
    }
}

pub struct RegistrationService<V> {
    verifier: Arc<V>,
    timeout: Duration,
    in_flight: InFlight,
    generation: Arc<AtomicU64>,
}

impl<V> Clone for RegistrationService<V> {
    fn clone(&self) -> Self {
        Self {
            verifier: Arc::clone(&self.verifier),
            timeout: self.timeout,
            in_flight: Arc::clone(&self.in_flight),
            generation: Arc::clone(&self.generation),
        }
    }
}

impl<V> RegistrationService<V>
where
    V: ConnectionVerifier + Send + Sync + 'static,
{
    pub fn new(verifier: V, timeout: Duration) -> Self {
        Self {
            verifier: Arc::new(verifier),
            timeout,
            in_flight: Arc::default(),
            generation: Arc::default(),
        }
    }

    /// Validate the form, verify the connection and report the outcome as a toast
    pub async fn submit(
        &self,
        ctx: &mut PortalContext,
        device: &DeviceInfo,
        form: RegistrationForm,
    ) -> SubmitOutcome {
        debug!("submit {form:?}");

        let validation = validate_passwords(ctx.language(), &form.password, &form.confirm_password);

        if !validation.valid {
            info!("registration rejected by validation: {:?}", validation.check);
            ctx.notify(validation.message, ToastKind::Error);
            return SubmitOutcome::Invalid(validation.check);
        }

        let attempt = form.attempt.unwrap_or_else(Uuid::new_v4);
        let ssid = if form.ssid.is_empty() {
            device.ssid.clone()
        } else {
            form.ssid
        };

        let request = VerificationRequest {
            ssid,
            password: form.password,
            mac: device.mac.clone(),
            ip: device.ip.clone(),
        };

        let outcome = self.verify(attempt, request).await;
        let t = messages(ctx.language());

        match outcome {
            SubmitOutcome::Verified => ctx.notify(t.verified, ToastKind::Success),
            SubmitOutcome::Cancelled => ctx.notify(t.cancelled, ToastKind::Error),
            _ => ctx.notify(t.failed, ToastKind::Error),
        };

        outcome
    }

    /// Abort an in-flight attempt, `false` if no such attempt is running
    pub fn cancel(&self, attempt: Uuid) -> bool {
        let entry = self.registry().remove(&attempt);

        match entry {
            Some((_, handle)) => {
                info!("cancel verification attempt {attempt}");
                handle.abort();
                true
            }
            None => false,
        }
    }

    pub fn verifier_kind(&self) -> &'static str {
        self.verifier.kind()
    }

    pub fn is_in_flight(&self, attempt: Uuid) -> bool {
        self.registry().contains_key(&attempt)
    }

    pub fn in_flight_count(&self) -> usize {
        self.registry().len()
    }

    fn registry(&self) -> std::sync::MutexGuard<'_, HashMap<Uuid, (u64, AbortHandle)>> {
        self.in_flight.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn register(&self, attempt: Uuid, handle: AbortHandle) -> InFlightGuard {
        let generation = self.generation.fetch_add(1, Ordering::Relaxed);

        if let Some((_, previous)) = self
            .registry()
            .insert(attempt, (generation, handle.clone()))
        {
            warn!("attempt {attempt} resubmitted while in flight, aborting previous");
            previous.abort();
        }

        InFlightGuard {
            registry: Arc::clone(&self.in_flight),
            attempt,
            generation,
            handle,
        }
    }

    async fn verify(&self, attempt: Uuid, request: VerificationRequest) -> SubmitOutcome {
        let verifier = Arc::clone(&self.verifier);
        let limit = self.timeout;

        let task = tokio::spawn(async move { timeout(limit, verifier.verify(request)).await });
        let _guard = self.register(attempt, task.abort_handle());

        match task.await {
            Ok(Ok(Ok(response))) if response.success => {
                info!("attempt {attempt} verified");
                SubmitOutcome::Verified
            }
            Ok(Ok(Ok(response))) => {
                info!(
                    "attempt {attempt} rejected by verifier: {}",
                    response.message.as_deref().unwrap_or("no reason given")
                );
                SubmitOutcome::Rejected
            }
            Ok(Ok(Err(e))) => {
                error!("attempt {attempt} verification failed: {e:#}");
                SubmitOutcome::Failed
            }
            Ok(Err(_)) => {
                warn!("attempt {attempt} verification timed out after {limit:?}");
                SubmitOutcome::TimedOut
            }
            Err(e) if e.is_cancelled() => {
                info!("attempt {attempt} cancelled");
                SubmitOutcome::Cancelled
            }
            Err(e) => {
                error!("attempt {attempt} verification task failed: {e}");
                SubmitOutcome::Failed
            }
        }
    }
}
