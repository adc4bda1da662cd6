//! Environment port.
//!
//! The conversation never reads platform facts or the clock directly; it asks
//! an [`Environment`], so tests can substitute fixed values.

use chrono::{DateTime, Utc};

use crate::snapshot::{AppRelease, Device, Sdk};

/// Supplies current app release, SDK and device facts plus wall-clock time.
pub trait Environment: Send + Sync {
    /// The app release as currently installed.
    fn app_release(&self) -> AppRelease;

    /// The SDK embedded in the app.
    fn sdk(&self) -> Sdk;

    /// Environment-derived device facts (custom data is owned by the conversation).
    fn device(&self) -> Device;

    /// Current wall-clock time, used for engagement timestamps.
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// An environment with fixed facts and the system clock.
#[derive(Debug, Clone, Default)]
pub struct StaticEnvironment {
    pub app_release: AppRelease,
    pub sdk: Sdk,
    pub device: Device,
}

impl StaticEnvironment {
    pub fn new(app_release: AppRelease, sdk: Sdk, device: Device) -> Self {
        Self {
            app_release,
            sdk,
            device,
        }
    }
}

impl Environment for StaticEnvironment {
    fn app_release(&self) -> AppRelease {
        self.app_release.clone()
    }

    fn sdk(&self) -> Sdk {
        self.sdk.clone()
    }

    fn device(&self) -> Device {
        self.device.clone()
    }
}
