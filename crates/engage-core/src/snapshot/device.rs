use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::{AttributeMap, AttributeValue, Snapshot};

/// The device a conversation runs on.
///
/// Hardware and OS facts come from the environment; `custom_data` and
/// `integration_config` are owned by the host application and survive a
/// refresh from the environment.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub os_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub os_version: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub os_build: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hardware: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub carrier: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locale_raw: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locale_language_code: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locale_country_code: Option<String>,

    /// Offset from UTC in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub utc_offset: Option<i32>,

    /// Push/integration settings (e.g. push token provider).
    #[serde(default, skip_serializing_if = "AttributeMap::is_empty")]
    pub integration_config: AttributeMap,

    #[serde(default, skip_serializing_if = "AttributeMap::is_empty")]
    pub custom_data: AttributeMap,
}

impl Device {
    pub fn set_custom_data(&mut self, key: impl Into<String>, value: impl Into<AttributeValue>) {
        self.custom_data.insert(key.into(), value.into());
    }

    pub fn remove_custom_data(&mut self, key: &str) {
        self.custom_data.remove(key);
    }

    /// Attributes owned by the host application rather than the environment.
    pub const CALLER_OWNED: [&'static str; 2] = ["customData", "integrationConfig"];

    /// Takes environment-derived facts from `current`, keeping the
    /// application-owned maps of `self` and every attribute named in
    /// `overrides` (camelCase attribute names).
    pub fn refreshed_from(&self, current: Device, overrides: &BTreeSet<String>) -> Device {
        let mut refreshed = Device {
            custom_data: self.custom_data.clone(),
            integration_config: self.integration_config.clone(),
            ..current
        };
        for attribute in overrides {
            refreshed.keep_attribute(self, attribute);
        }
        refreshed
    }

    fn keep_attribute(&mut self, stored: &Device, attribute: &str) {
        match attribute {
            "uuid" => self.uuid = stored.uuid.clone(),
            "osName" => self.os_name = stored.os_name.clone(),
            "osVersion" => self.os_version = stored.os_version.clone(),
            "osBuild" => self.os_build = stored.os_build.clone(),
            "hardware" => self.hardware = stored.hardware.clone(),
            "carrier" => self.carrier = stored.carrier.clone(),
            "localeRaw" => self.locale_raw = stored.locale_raw.clone(),
            "localeLanguageCode" => {
                self.locale_language_code = stored.locale_language_code.clone()
            }
            "localeCountryCode" => self.locale_country_code = stored.locale_country_code.clone(),
            "utcOffset" => self.utc_offset = stored.utc_offset,
            other => tracing::debug!("Ignoring unknown device override '{}'", other),
        }
    }

    /// Splits a raw locale such as `en_US` or `pt-BR` into language and country.
    pub fn with_locale(mut self, raw: &str) -> Self {
        let raw = raw.split('.').next().unwrap_or(raw);
        let mut parts = raw.split(['_', '-']);
        self.locale_raw = Some(raw.to_string());
        self.locale_language_code = parts
            .next()
            .filter(|s| !s.is_empty())
            .map(str::to_string);
        self.locale_country_code = parts.next().filter(|s| !s.is_empty()).map(str::to_string);
        self
    }
}

impl Snapshot for Device {
    const KEY: &'static str = "device";
}
