use crate::{
    context::{PortalContext, Toast, ToastTiming},
    device_info::{DeviceInfo, example_url},
    services::{
        registration::{RegistrationForm, RegistrationService, SubmitOutcome},
        validation::PasswordCheck,
        verification::ConnectionVerifier,
    },
    templates::{query_suffix, render_portal_page},
};
use actix_session::Session;
use actix_web::{HttpRequest, HttpResponse, Responder, http::header, web};
use log::{debug, info};
use serde::Serialize;
use std::time::Duration;
use uuid::Uuid;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationResponse {
    pub valid: bool,
    pub outcome: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub check: Option<PasswordCheck>,
    pub message: String,
    pub toasts: Vec<Toast>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthcheckInfo {
    pub version: &'static str,
    pub verifier: &'static str,
    pub in_flight: usize,
}

pub struct Api<Verifier>
where
    Verifier: ConnectionVerifier,
{
    pub registration: RegistrationService<Verifier>,
    pub toast_timing: ToastTiming,
}

impl<Verifier> Clone for Api<Verifier>
where
    Verifier: ConnectionVerifier,
{
    fn clone(&self) -> Self {
        Self {
            registration: self.registration.clone(),
            toast_timing: self.toast_timing,
        }
    }
}

impl<Verifier> Api<Verifier>
where
    Verifier: ConnectionVerifier + Send + Sync + 'static,
{
    pub fn new(verifier: Verifier, verify_timeout: Duration, toast_timing: ToastTiming) -> Self {
        Api {
            registration: RegistrationService::new(verifier, verify_timeout),
            toast_timing,
        }
    }

    pub async fn index(req: HttpRequest, session: Session, api: web::Data<Self>) -> impl Responder {
        debug!("index() called");

        let mut ctx = api.context(session);
        let device = Self::device_info(&req);

        debug!("example url: {}", example_url(&Self::page_url(&req)));
        debug!("device info: {device:?}");

        Self::page(&mut ctx, &device, req.query_string())
    }

    pub async fn register(
        req: HttpRequest,
        form: web::Form<RegistrationForm>,
        session: Session,
        api: web::Data<Self>,
    ) -> impl Responder {
        debug!("register() called: {:?}", *form);

        let mut ctx = api.context(session);
        let device = Self::device_info(&req);

        let outcome = api
            .registration
            .submit(&mut ctx, &device, form.into_inner())
            .await;
        info!("registration finished: {}", outcome.as_str());

        Self::page(&mut ctx, &device, req.query_string())
    }

    pub async fn api_register(
        req: HttpRequest,
        body: web::Json<RegistrationForm>,
        session: Session,
        api: web::Data<Self>,
    ) -> impl Responder {
        debug!("api_register() called: {:?}", *body);

        let mut ctx = api.context(session);
        let device = Self::device_info(&req);

        let outcome = api
            .registration
            .submit(&mut ctx, &device, body.into_inner())
            .await;

        let toasts = ctx.take_toasts();
        let response = RegistrationResponse {
            valid: !matches!(outcome, SubmitOutcome::Invalid(_)),
            outcome: outcome.as_str(),
            check: match outcome {
                SubmitOutcome::Invalid(check) => Some(check),
                _ => None,
            },
            message: toasts.last().map(|t| t.message.clone()).unwrap_or_default(),
            toasts,
        };

        if response.valid {
            HttpResponse::Ok().json(&response)
        } else {
            HttpResponse::UnprocessableEntity().json(&response)
        }
    }

    pub async fn cancel_registration(
        path: web::Path<Uuid>,
        api: web::Data<Self>,
    ) -> impl Responder {
        let attempt = path.into_inner();
        debug!("cancel_registration() called: {attempt}");

        if api.registration.cancel(attempt) {
            HttpResponse::Ok().finish()
        } else {
            HttpResponse::NotFound().body("no verification in flight for this attempt")
        }
    }

    pub async fn toggle_language(
        req: HttpRequest,
        session: Session,
        api: web::Data<Self>,
    ) -> impl Responder {
        debug!("toggle_language() called");

        let mut ctx = api.context(session);
        let label = ctx.toggle_language();
        debug!("language switched to {}, toggle now shows {label}", ctx.language());

        HttpResponse::SeeOther()
            .insert_header((
                header::LOCATION,
                format!("/{}", query_suffix(req.query_string())),
            ))
            .finish()
    }

    pub async fn api_device_info(req: HttpRequest) -> impl Responder {
        debug!("api_device_info() called");

        HttpResponse::Ok().json(Self::device_info(&req))
    }

    pub async fn api_example_url(req: HttpRequest) -> impl Responder {
        debug!("api_example_url() called");

        let info = req.connection_info();
        let base = format!("{}://{}/", info.scheme(), info.host());

        HttpResponse::Ok().body(example_url(&base))
    }

    pub async fn healthcheck(api: web::Data<Self>) -> impl Responder {
        debug!("healthcheck() called");

        HttpResponse::Ok().json(HealthcheckInfo {
            version: env!("CARGO_PKG_VERSION"),
            verifier: api.registration.verifier_kind(),
            in_flight: api.registration.in_flight_count(),
        })
    }

    pub async fn version() -> impl Responder {
        HttpResponse::Ok().body(env!("CARGO_PKG_VERSION"))
    }

    fn context(&self, session: Session) -> PortalContext {
        PortalContext::initialize(session, self.toast_timing)
    }

    fn page(ctx: &mut PortalContext, device: &DeviceInfo, query: &str) -> HttpResponse {
        let html = render_portal_page(ctx, device, query, Uuid::new_v4());

        HttpResponse::Ok()
            .content_type("text/html; charset=utf-8")
            .body(html)
    }

    /// Query parameters of the page, defaults for anything absent or empty
    fn device_info(req: &HttpRequest) -> DeviceInfo {
        DeviceInfo::from_query_string(req.query_string())
    }

    /// Origin and path of the current page, without query
    fn page_url(req: &HttpRequest) -> String {
        let info = req.connection_info();
        format!("{}://{}{}", info.scheme(), info.host(), req.path())
    }
}
