use std::sync::Arc;
use std::time::Duration;

use log::warn;

use crate::camera::{CameraBackend, DeviceCameraBackend, SyntheticCameraBackend};
use crate::recorder::state::RecorderLayout;

const DEFAULT_PREVIEW_MS: u64 = 200;
const MIN_PREVIEW_MS: u64 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraSelection {
    Device(u32),
    Synthetic,
}

/// Startup configuration, read once from the environment. Nothing here
/// is persisted by the app.
#[derive(Debug, Clone)]
pub struct RecorderConfig {
    pub camera: CameraSelection,
    pub preview_interval: Duration,
    pub layout: RecorderLayout,
}

impl Default for RecorderConfig {
    fn default() -> Self {
        Self {
            camera: CameraSelection::Device(0),
            preview_interval: Duration::from_millis(DEFAULT_PREVIEW_MS),
            layout: RecorderLayout::Classic,
        }
    }
}

impl RecorderConfig {
    /// `PUNCHCLOCK_CAMERA` selects the input (`synthetic` or a device
    /// index), `PUNCHCLOCK_PREVIEW_MS` the preview cadence, and
    /// `PUNCHCLOCK_LAYOUT` the initial layout variant.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let camera = match std::env::var("PUNCHCLOCK_CAMERA") {
            Ok(value) if value.eq_ignore_ascii_case("synthetic") => CameraSelection::Synthetic,
            Ok(value) => match value.parse::<u32>() {
                Ok(index) => CameraSelection::Device(index),
                Err(_) => {
                    warn!("ignoring unrecognized PUNCHCLOCK_CAMERA value '{value}'");
                    defaults.camera
                }
            },
            Err(_) => defaults.camera,
        };

        let preview_interval = std::env::var("PUNCHCLOCK_PREVIEW_MS")
            .ok()
            .and_then(|value| value.parse::<u64>().ok())
            .map(|ms| Duration::from_millis(ms.max(MIN_PREVIEW_MS)))
            .unwrap_or(defaults.preview_interval);

        let layout = match std::env::var("PUNCHCLOCK_LAYOUT") {
            Ok(value) if value.eq_ignore_ascii_case("compact") => RecorderLayout::Compact,
            _ => defaults.layout,
        };

        Self {
            camera,
            preview_interval,
            layout,
        }
    }

    pub fn camera_backend(&self) -> Arc<dyn CameraBackend> {
        match self.camera {
            CameraSelection::Device(index) => Arc::new(DeviceCameraBackend::new(index)),
            CameraSelection::Synthetic => Arc::new(SyntheticCameraBackend::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_pick_the_first_device() {
        let config = RecorderConfig::default();
        assert_eq!(config.camera, CameraSelection::Device(0));
        assert_eq!(config.preview_interval, Duration::from_millis(DEFAULT_PREVIEW_MS));
        assert_eq!(config.layout, RecorderLayout::Classic);
    }
}
