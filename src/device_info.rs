//! Device and network metadata passed to the portal by the access point
//!
//! The access point redirects clients to the portal with the connection
//! details in the query string. Every parameter is optional and falls back
//! to the example record below.

use crate::i18n::Language;
use serde::{Deserialize, Serialize};
use url::form_urlencoded;

pub const DEFAULT_LOGO: &str = "/static/images/Default/logo.svg";
pub const DEFAULT_LOGO_ALT: &str = "Default Provider Logo";

const PROVIDERS: [&str; 8] = [
    "TotalPlay",
    "Infinitum",
    "Izzi",
    "Megacable",
    "Axtel",
    "Starlink",
    "Tenda",
    "Maxcom",
];

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DeviceInfoQuery {
    pub ssid: Option<String>,
    pub mac: Option<String>,
    pub ip: Option<String>,
    pub device: Option<String>,
    pub device_name: Option<String>,
    pub provider: Option<String>,
    pub gateway: Option<String>,
    pub signal: Option<String>,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceInfo {
    pub ssid: String,
    pub mac: String,
    pub ip: String,
    pub device_name: String,
    pub provider: String,
    pub gateway: String,
    pub signal: String,
}

impl Default for DeviceInfo {
    fn default() -> Self {
        Self {
            ssid: "TotalPlay-AN829".to_string(),
            mac: "00:1A:2B:3C:4D:5E".to_string(),
            ip: "192.168.1.100".to_string(),
            device_name: "Samsung Galaxy S21".to_string(),
            provider: "TotalPlay".to_string(),
            gateway: "192.168.1.1".to_string(),
            signal: "85%".to_string(),
        }
    }
}

/// Present and non-empty, otherwise `None`
fn supplied(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

impl DeviceInfo {
    /// Build the record with per-field fallback to the defaults
    ///
    /// `device` takes precedence over `deviceName`. Empty parameters count as absent.
    pub fn from_query(query: &DeviceInfoQuery) -> Self {
        let defaults = Self::default();
        let pick = |value: &Option<String>, default: String| {
            supplied(value).map(str::to_string).unwrap_or(default)
        };

        Self {
            ssid: pick(&query.ssid, defaults.ssid),
            mac: pick(&query.mac, defaults.mac),
            ip: pick(&query.ip, defaults.ip),
            device_name: supplied(&query.device)
                .or_else(|| supplied(&query.device_name))
                .map(str::to_string)
                .unwrap_or(defaults.device_name),
            provider: pick(&query.provider, defaults.provider),
            gateway: pick(&query.gateway, defaults.gateway),
            signal: pick(&query.signal, defaults.signal),
        }
    }

    /// Extract the record from a raw query string (without the leading `?`)
    ///
    /// A repeated parameter keeps its first non-empty value.
    pub fn from_query_string(query_string: &str) -> Self {
        let mut query = DeviceInfoQuery::default();

        for (key, value) in form_urlencoded::parse(query_string.as_bytes()) {
            let slot = match key.as_ref() {
                "ssid" => &mut query.ssid,
                "mac" => &mut query.mac,
                "ip" => &mut query.ip,
                "device" => &mut query.device,
                "deviceName" => &mut query.device_name,
                "provider" => &mut query.provider,
                "gateway" => &mut query.gateway,
                "signal" => &mut query.signal,
                _ => continue,
            };
            if slot.is_none() && !value.is_empty() {
                *slot = Some(value.into_owned());
            }
        }

        Self::from_query(&query)
    }

    pub fn logo(&self) -> ProviderLogo {
        provider_logo(&self.provider)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ProviderLogo {
    pub src: String,
    pub alt: String,
}

/// Map a provider name to its logo, unknown providers get the default image
pub fn provider_logo(provider: &str) -> ProviderLogo {
    match PROVIDERS.iter().find(|p| **p == provider) {
        Some(name) => ProviderLogo {
            src: format!("/static/images/{name}/logo.svg"),
            alt: format!("{name} Logo"),
        },
        None => ProviderLogo {
            src: DEFAULT_LOGO.to_string(),
            alt: DEFAULT_LOGO_ALT.to_string(),
        },
    }
}

pub struct DeviceLabels {
    pub ssid: &'static str,
    pub mac: &'static str,
    pub ip: &'static str,
    pub device: &'static str,
    pub provider: &'static str,
    pub gateway: &'static str,
    pub signal: &'static str,
}

const LABELS_ES: DeviceLabels = DeviceLabels {
    ssid: "SSID",
    mac: "Dirección MAC",
    ip: "Dirección IP",
    device: "Dispositivo",
    provider: "Proveedor",
    gateway: "Puerta de enlace",
    signal: "Señal",
};

const LABELS_EN: DeviceLabels = DeviceLabels {
    ssid: "SSID",
    mac: "MAC Address",
    ip: "IP Address",
    device: "Device",
    provider: "Provider",
    gateway: "Gateway",
    signal: "Signal",
};

pub fn device_labels(language: Language) -> &'static DeviceLabels {
    match language {
        Language::Es => &LABELS_ES,
        Language::En => &LABELS_EN,
    }
}

/// Canonical portal URL carrying the example record, for documentation and debugging
pub fn example_url(base: &str) -> String {
    let example = DeviceInfo::default();

    let query = form_urlencoded::Serializer::new(String::new())
        .append_pair("ssid", &example.ssid)
        .append_pair("mac", &example.mac)
        .append_pair("ip", &example.ip)
        .append_pair("device", &example.device_name)
        .append_pair("provider", &example.provider)
        .append_pair("gateway", &example.gateway)
        .append_pair("signal", &example.signal)
        .finish();

    format!("{base}?{query}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn supplied_fields_are_kept_and_omitted_fields_use_defaults() {
        let info = DeviceInfo::from_query_string("ssid=Home-5G&signal=40%25");
        let defaults = DeviceInfo::default();

        assert_eq!(info.ssid, "Home-5G");
        assert_eq!(info.signal, "40%");
        assert_eq!(info.mac, defaults.mac);
        assert_eq!(info.ip, defaults.ip);
        assert_eq!(info.device_name, defaults.device_name);
        assert_eq!(info.provider, defaults.provider);
        assert_eq!(info.gateway, defaults.gateway);
    }

    #[test]
    fn bare_percent_sign_is_kept_verbatim() {
        let info = DeviceInfo::from_query_string("ssid=Home-5G&signal=40%");
        assert_eq!(info.signal, "40%");
    }

    #[test]
    fn empty_query_yields_example_record() {
        assert_eq!(DeviceInfo::from_query_string(""), DeviceInfo::default());
    }

    #[test]
    fn all_fields_supplied() {
        let info = DeviceInfo::from_query_string(
            "ssid=Cafe&mac=AA:BB:CC:DD:EE:FF&ip=10.0.0.7&deviceName=Pixel&provider=Izzi&gateway=10.0.0.1&signal=12%25",
        );

        assert_eq!(
            info,
            DeviceInfo {
                ssid: "Cafe".to_string(),
                mac: "AA:BB:CC:DD:EE:FF".to_string(),
                ip: "10.0.0.7".to_string(),
                device_name: "Pixel".to_string(),
                provider: "Izzi".to_string(),
                gateway: "10.0.0.1".to_string(),
                signal: "12%".to_string(),
            }
        );
    }

    #[test]
    fn device_wins_over_device_name() {
        let info = DeviceInfo::from_query_string("device=Laptop&deviceName=Phone");
        assert_eq!(info.device_name, "Laptop");

        let info = DeviceInfo::from_query_string("device=&deviceName=Phone");
        assert_eq!(info.device_name, "Phone");
    }

    #[test]
    fn empty_parameter_counts_as_absent() {
        let info = DeviceInfo::from_query_string("ssid=&mac=");
        assert_eq!(info.ssid, "TotalPlay-AN829");
        assert_eq!(info.mac, "00:1A:2B:3C:4D:5E");
    }

    #[test]
    fn unknown_parameters_are_ignored() {
        let info = DeviceInfo::from_query_string("ssid=Lab&foo=bar");
        assert_eq!(info.ssid, "Lab");
    }

    #[test]
    fn repeated_parameter_keeps_first_value() {
        let info = DeviceInfo::from_query_string("ssid=Home-5G&mac=AA&mac=BB");
        assert_eq!(info.ssid, "Home-5G");
        assert_eq!(info.mac, "AA");

        let info = DeviceInfo::from_query_string("signal=40%25&signal=50%25");
        assert_eq!(info.signal, "40%");

        // an empty first occurrence does not shadow a later value
        let info = DeviceInfo::from_query_string("ssid=&ssid=Lab&device=&device=Laptop");
        assert_eq!(info.ssid, "Lab");
        assert_eq!(info.device_name, "Laptop");
    }

    #[test]
    fn known_provider_maps_to_its_logo() {
        let logo = provider_logo("Starlink");
        assert_eq!(logo.src, "/static/images/Starlink/logo.svg");
        assert_eq!(logo.alt, "Starlink Logo");
    }

    #[test]
    fn unknown_provider_gets_default_logo() {
        let logo = provider_logo("AcmeNet");
        assert_eq!(logo.src, DEFAULT_LOGO);
        assert_eq!(logo.alt, DEFAULT_LOGO_ALT);

        // lookup is case sensitive
        assert_eq!(provider_logo("totalplay").src, DEFAULT_LOGO);
    }

    #[test]
    fn labels_follow_language() {
        assert_eq!(device_labels(Language::Es).gateway, "Puerta de enlace");
        assert_eq!(device_labels(Language::En).gateway, "Gateway");
    }

    #[test]
    fn example_url_is_form_encoded() {
        assert_eq!(
            example_url("http://portal.local/"),
            "http://portal.local/?ssid=TotalPlay-AN829&mac=00%3A1A%3A2B%3A3C%3A4D%3A5E\
             &ip=192.168.1.100&device=Samsung+Galaxy+S21&provider=TotalPlay\
             &gateway=192.168.1.1&signal=85%25"
        );
    }

    #[test]
    fn example_url_round_trips_to_default_record() {
        let url = example_url("");
        let query = url.trim_start_matches('?');
        assert_eq!(DeviceInfo::from_query_string(query), DeviceInfo::default());
    }

    #[test]
    fn serializes_device_name_camel_case() {
        let json = serde_json::to_value(DeviceInfo::default()).unwrap();
        assert_eq!(json["deviceName"], "Samsung Galaxy S21");
    }
}
