//! Server-rendered portal page
//!
//! The markup keeps the ids, classes and `data-i18n` attributes the portal
//! script relies on. Every dynamic value is escaped before it is inserted.

use crate::{
    context::{PortalContext, Toast},
    device_info::{DEFAULT_LOGO, DEFAULT_LOGO_ALT, DeviceInfo, device_labels},
    services::validation::PasswordVisibility,
};
use uuid::Uuid;

pub fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// `?<query>` or nothing, so links keep the device parameters
pub fn query_suffix(query: &str) -> String {
    if query.is_empty() {
        String::new()
    } else {
        format!("?{query}")
    }
}

// ============================================================================
// Page
// ============================================================================

/// Render the complete portal page
///
/// Applies the current translations first, which also persists the
/// language preference and fixes the `<html lang>` attribute.
pub fn render_portal_page(
    ctx: &mut PortalContext,
    device: &DeviceInfo,
    query: &str,
    attempt: Uuid,
) -> String {
    let title = ctx.apply_translations().unwrap_or("Acceso WiFi");
    let lang = ctx.document_lang().unwrap_or_default();
    let suffix = escape_html(&query_suffix(query));

    format!(
        r#"<!DOCTYPE html>
<html lang="{lang}">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title data-i18n="pageTitle">{title}</title>
    <link rel="stylesheet" href="/static/portal.css">
</head>
<body data-close-label="{close_label}">
    {language_toggle}
    <main class="container">
        {header}
        {device_section}
        {form}
    </main>
    {footer}
    {toasts}
    <script src="/static/portal.js" defer></script>
</body>
</html>"#,
        title = escape_html(title),
        close_label = escape_html(ctx.text("closeNotification", "Close notification")),
        language_toggle = language_toggle(ctx, &suffix),
        header = header(ctx),
        device_section = device_section(ctx, device),
        form = registration_form(ctx, device, &suffix, attempt),
        footer = footer(ctx),
        toasts = toast_container(ctx),
    )
}

// ============================================================================
// Sections
// ============================================================================

fn language_toggle(ctx: &PortalContext, suffix: &str) -> String {
    format!(
        r#"<form class="language-switch" action="/language/toggle{suffix}" method="post">
        <span class="language-label" data-i18n="languageLabel">{label}</span>
        <button type="submit" id="language-toggle" class="language-toggle">{toggle}</button>
    </form>"#,
        label = ctx.text("languageLabel", "Idioma"),
        toggle = ctx.language().toggle_label(),
    )
}

fn header(ctx: &PortalContext) -> String {
    format!(
        r#"<header class="portal-header">
            <h1 data-i18n="headerTitle">{title}</h1>
            <p data-i18n="headerSubtitle">{subtitle}</p>
        </header>"#,
        title = ctx.text("headerTitle", "Autenticación WiFi"),
        subtitle = ctx.text("headerSubtitle", ""),
    )
}

fn device_section(ctx: &PortalContext, device: &DeviceInfo) -> String {
    let labels = device_labels(ctx.language());
    let logo = device.logo();

    let rows = [
        (labels.ssid, &device.ssid),
        (labels.mac, &device.mac),
        (labels.ip, &device.ip),
        (labels.device, &device.device_name),
        (labels.provider, &device.provider),
        (labels.gateway, &device.gateway),
        (labels.signal, &device.signal),
    ]
    .iter()
    .map(|(label, value)| {
        format!(
            r#"<div class="info-row"><span class="info-label">{label}</span> <span class="info-value">{}</span></div>"#,
            escape_html(value)
        )
    })
    .collect::<Vec<_>>()
    .join("\n                ");

    format!(
        r#"<section class="device-card">
            <img id="provider" class="provider-logo" src="{src}" alt="{alt}"
                 data-fallback-src="{DEFAULT_LOGO}" data-fallback-alt="{DEFAULT_LOGO_ALT}">
            <p><span data-i18n="deviceConnected">{connected}</span> <strong>{device_name}</strong></p>
            <p><span data-i18n="ssidLabel">{ssid_label}</span> <span id="current-ssid">{ssid}</span></p>
            <div class="device-information">
                {rows}
            </div>
        </section>"#,
        src = escape_html(&logo.src),
        alt = escape_html(&logo.alt),
        connected = ctx.text("deviceConnected", "Dispositivo conectado:"),
        device_name = escape_html(&device.device_name),
        ssid_label = ctx.text("ssidLabel", "SSID:"),
        ssid = escape_html(&device.ssid),
    )
}

fn password_field(
    ctx: &PortalContext,
    id: &str,
    name: &str,
    key: &str,
    fallback: &'static str,
) -> String {
    let visibility = PasswordVisibility::default();

    format!(
        r#"<div class="password-field">
                <input type="{input_type}" id="{id}" name="{name}" required autocomplete="off"
                       data-i18n-placeholder="{key}" placeholder="{placeholder}">
                <button type="button" class="{button_class}" data-target="{id}"
                        aria-label="{toggle_label}" aria-pressed="false"></button>
            </div>"#,
        input_type = visibility.input_type(),
        button_class = visibility.button_class(),
        placeholder = ctx.placeholder(key, fallback),
        toggle_label = ctx.text("togglePassword", "Show or hide password"),
    )
}

fn registration_form(
    ctx: &PortalContext,
    device: &DeviceInfo,
    suffix: &str,
    attempt: Uuid,
) -> String {
    let ssid = escape_html(&device.ssid);

    format!(
        r#"<form id="registration-form" class="registration-form" action="/register{suffix}"
              method="post" data-api="/api/register{suffix}">
            <h2 data-i18n="formTitle">{form_title}</h2>
            <input type="hidden" name="attempt" value="{attempt}">
            <label for="ssid" data-i18n="ssidSelect">{ssid_select}</label>
            <select id="ssid" name="ssid">
                <option value="{ssid}" selected>{ssid}</option>
            </select>
            <label for="password-init" data-i18n="passwordLabel">{password_label}</label>
            {password}
            <label for="password-confirm" data-i18n="confirmPasswordLabel">{confirm_label}</label>
            {confirm}
            <button type="submit" class="submit-btn" data-i18n="verifyButton">{verify}</button>
        </form>"#,
        form_title = ctx.text("formTitle", ""),
        ssid_select = ctx.text("ssidSelect", "Seleccione su red"),
        password_label = ctx.text("passwordLabel", "Ingrese su contraseña"),
        password = password_field(
            ctx,
            "password-init",
            "password",
            "passwordLabel",
            "Ingrese su contraseña",
        ),
        confirm_label = ctx.text("confirmPasswordLabel", "Confirme su contraseña"),
        confirm = password_field(
            ctx,
            "password-confirm",
            "confirm_password",
            "confirmPasswordLabel",
            "Confirme su contraseña",
        ),
        verify = ctx.text("verifyButton", "Verificar conexión"),
    )
}

fn footer(ctx: &PortalContext) -> String {
    format!(
        r#"<footer class="portal-footer">
        <p data-i18n="footerText">{}</p>
    </footer>"#,
        ctx.text("footerText", "Todos los derechos reservados")
    )
}

// ============================================================================
// Toasts
// ============================================================================

fn toast_container(ctx: &PortalContext) -> String {
    let Some(toasts) = ctx.toasts() else {
        return String::new();
    };

    let close_label = escape_html(ctx.text("closeNotification", "Close notification"));
    let items: String = toasts
        .iter()
        .map(|toast| render_toast(toast, &close_label))
        .collect();

    format!(r#"<div class="toast-container" aria-live="polite">{items}</div>"#)
}

fn render_toast(toast: &Toast, close_label: &str) -> String {
    format!(
        r#"
        <div class="toast {class}" id="toast-{id}" role="alert" data-display-ms="{display}" data-fade-ms="{fade}">
            <span class="toast-icon">{icon}</span>
            <span class="toast-content">{message}</span>
            <button type="button" class="toast-close" aria-label="{close_label}">&times;</button>
        </div>"#,
        class = toast.kind.css_class(),
        id = toast.id,
        display = toast.display_ms,
        fade = toast.fade_ms,
        icon = toast.icon,
        message = escape_html(&toast.message),
    )
}
