//! Environment backed by `EngageConfig` and host detection.

use chrono::Local;

use engage_core::environment::Environment;
use engage_core::snapshot::{AppRelease, Device, Sdk};

use crate::config::{AppConfig, DeviceConfig, EngageConfig};

/// Reports app facts from configuration and device facts from the host,
/// with configured device values taking precedence.
#[derive(Debug, Clone)]
pub struct ConfiguredEnvironment {
    app: AppConfig,
    device: DeviceConfig,
}

impl ConfiguredEnvironment {
    pub fn new(config: &EngageConfig) -> Self {
        Self {
            app: config.app.clone(),
            device: config.device.clone(),
        }
    }

    fn detected_locale() -> Option<String> {
        ["LC_ALL", "LANG"]
            .iter()
            .filter_map(|var| std::env::var(var).ok())
            .find(|value| !value.is_empty() && value != "C" && value != "POSIX")
    }
}

impl Environment for ConfiguredEnvironment {
    fn app_release(&self) -> AppRelease {
        AppRelease {
            version: Some(self.app.version.clone()),
            build: Some(self.app.build.clone()),
            bundle_identifier: self.app.bundle_identifier.clone(),
            has_app_store_receipt: self.app.has_app_store_receipt,
            debug_build: self.app.debug_build,
            ..AppRelease::default()
        }
    }

    fn sdk(&self) -> Sdk {
        Sdk {
            platform: Some(std::env::consts::OS.to_string()),
            distribution: Some(env!("CARGO_PKG_NAME").to_string()),
            distribution_version: Some(env!("CARGO_PKG_VERSION").to_string()),
            ..Sdk::default()
        }
    }

    fn device(&self) -> Device {
        let device = Device {
            os_name: Some(
                self.device
                    .os_name
                    .clone()
                    .unwrap_or_else(|| std::env::consts::OS.to_string()),
            ),
            os_version: self.device.os_version.clone(),
            hardware: Some(
                self.device
                    .hardware
                    .clone()
                    .unwrap_or_else(|| std::env::consts::ARCH.to_string()),
            ),
            utc_offset: Some(
                self.device
                    .utc_offset
                    .unwrap_or_else(|| Local::now().offset().local_minus_utc()),
            ),
            ..Device::default()
        };

        match self.device.locale.clone().or_else(Self::detected_locale) {
            Some(locale) => device.with_locale(&locale),
            None => device,
        }
    }
}
