pub mod api;
pub mod config;
pub mod context;
pub mod device_info;
pub mod http_client;
pub mod i18n;
pub mod services;
pub mod templates;
