use actix_session::{
    SessionMiddleware,
    config::{CookieContentSecurity, PersistentSession},
    storage::CookieSessionStore,
};
use actix_web::{
    App, HttpServer,
    cookie::{Key, SameSite, time},
    web::{self, Data},
};
use actix_web_static_files::ResourceFiles;
use anyhow::{Context, Result};
use env_logger::{Builder, Env, Target};
use log::{debug, error, info, warn};
use std::io::Write;
use tokio::signal::unix::{SignalKind, signal};
use wifi_portal::{
    api::Api,
    config::{AppConfig, SessionConfig},
    services::verification::{ConnectionVerifier, Verifier},
};

pub const SESSION_COOKIE_NAME: &str = "wifi-portal-session";

// Include the generated static files from build.rs
include!(concat!(env!("OUT_DIR"), "/generated.rs"));

// Alias the generated function to a more descriptive name
#[inline(always)]
fn static_files() -> std::collections::HashMap<&'static str, static_files::Resource> {
    generate()
}

type PortalApi = Api<Verifier>;

#[actix_web::main]
async fn main() {
    if let Err(e) = run().await {
        error!("application error: {e:#}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    initialize();

    let config = AppConfig::get();
    debug!("configuration: {config:?}");

    let verifier =
        Verifier::from_config(&config.verifier).context("failed to create connection verifier")?;
    info!(
        "using {} verifier (timeout {:?})",
        verifier.kind(),
        config.verifier.timeout
    );

    let api = PortalApi::new(verifier, config.verifier.timeout, config.toast);
    let session_key = session_key(&config.session);
    let session_ttl = time::Duration::days(config.session.ttl_days);

    let server = HttpServer::new(move || {
        App::new()
            .wrap(
                SessionMiddleware::builder(CookieSessionStore::default(), session_key.clone())
                    .cookie_name(String::from(SESSION_COOKIE_NAME))
                    .cookie_secure(false)
                    .session_lifecycle(PersistentSession::default().session_ttl(session_ttl))
                    .cookie_same_site(SameSite::Lax)
                    .cookie_content_security(CookieContentSecurity::Signed)
                    .cookie_http_only(true)
                    .build(),
            )
            .app_data(Data::new(api.clone()))
            .route("/", web::get().to(PortalApi::index))
            .route("/register", web::post().to(PortalApi::register))
            .route("/api/register", web::post().to(PortalApi::api_register))
            .route(
                "/api/register/{attempt}/cancel",
                web::post().to(PortalApi::cancel_registration),
            )
            .route("/language/toggle", web::post().to(PortalApi::toggle_language))
            .route("/api/device-info", web::get().to(PortalApi::api_device_info))
            .route("/api/example-url", web::get().to(PortalApi::api_example_url))
            .route("/version", web::get().to(PortalApi::version))
            .route("/healthcheck", web::get().to(PortalApi::healthcheck))
            .service(ResourceFiles::new("/static", static_files()))
            .default_service(web::route().to(PortalApi::index))
    })
    .bind(format!("{}:{}", config.ui.bind_address, config.ui.port))
    .context("failed to bind server")?
    .disable_signals()
    .run();

    info!(
        "listening on {}:{}",
        config.ui.bind_address, config.ui.port
    );

    let server_handle = server.handle();
    let server_task = tokio::spawn(server);

    let mut sigterm =
        signal(SignalKind::terminate()).context("failed to install SIGTERM handler")?;

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            debug!("ctrl-c received");
            server_handle.stop(true).await;
        },
        _ = sigterm.recv() => {
            debug!("SIGTERM received");
            server_handle.stop(true).await;
        },
        result = server_task => {
            match result {
                Ok(Ok(())) => debug!("server stopped normally"),
                Ok(Err(e)) => error!("server stopped with error: {e}"),
                Err(e) => error!("server task panicked: {e}"),
            }
        },
    }

    info!("shutdown complete");

    Ok(())
}

fn initialize() {
    log_panics::init();

    let mut builder = if cfg!(debug_assertions) {
        Builder::from_env(Env::default().default_filter_or("debug"))
    } else {
        Builder::from_env(Env::default().default_filter_or("info"))
    };

    builder.format(|f, record| match record.level() {
        log::Level::Error => {
            eprintln!("{}", record.args());
            Ok(())
        }
        _ => {
            writeln!(f, "{}", record.args())
        }
    });

    builder.target(Target::Stdout).init();

    info!(
        "module version: {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_SHORT_REV")
    );
}

fn session_key(config: &SessionConfig) -> Key {
    match &config.secret {
        Some(secret) => Key::from(secret.as_bytes()),
        None => {
            warn!("SESSION_SECRET not set, language preferences reset on restart");
            Key::generate()
        }
    }
}
