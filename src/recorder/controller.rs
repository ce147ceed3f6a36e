use std::sync::Arc;

use anyhow::Result;
use chrono::Local;
use log::{debug, error, info, warn};
use serde::Serialize;
use tauri::{AppHandle, Emitter};
use tokio::sync::Mutex;

use crate::camera::{CameraBackend, CaptureSessionManager, PreviewFrame, PreviewSink};
use crate::config::RecorderConfig;
use crate::snapshot::encode_png_data_uri;

use super::duration::TIME_FORMAT;
use super::ledger::AppendOutcome;
use super::phase::CHECKPOINT_CAPACITY;
use super::state::{RecorderLayout, RecorderSnapshot, RecorderState};

const STATE_CHANGED_EVENT: &str = "recorder-state-changed";
const PREVIEW_FRAME_EVENT: &str = "camera-preview-frame";
const DAILY_LIMIT_EVENT: &str = "daily-limit-reached";

#[derive(Serialize, Clone)]
#[serde(rename_all = "camelCase")]
struct RecorderStateChangedEvent {
    snapshot: RecorderSnapshot,
}

#[derive(Serialize, Clone)]
#[serde(rename_all = "camelCase")]
struct PreviewFrameEvent {
    session_id: String,
    frame: String,
}

#[derive(Serialize, Clone)]
#[serde(rename_all = "camelCase")]
struct DailyLimitEvent {
    message: String,
    limit: usize,
}

/// Glues the capture session, the checkpoint ledger, and the shell
/// together. Cloneable; every command handler goes through here.
#[derive(Clone)]
pub struct RecorderController {
    state: Arc<Mutex<RecorderState>>,
    camera: Arc<Mutex<CaptureSessionManager>>,
    app_handle: AppHandle,
}

impl RecorderController {
    pub fn new(
        app_handle: AppHandle,
        backend: Arc<dyn CameraBackend>,
        config: &RecorderConfig,
    ) -> Self {
        Self {
            state: Arc::new(Mutex::new(RecorderState::new(config.layout))),
            camera: Arc::new(Mutex::new(CaptureSessionManager::new(
                backend,
                config.preview_interval,
            ))),
            app_handle,
        }
    }

    pub async fn snapshot(&self) -> RecorderSnapshot {
        let camera_active = self.camera.lock().await.is_active();
        self.state.lock().await.snapshot(camera_active)
    }

    /// Opens a capture session. A full ledger rejects the open and
    /// raises the limit notice instead; a device failure is logged and
    /// absorbed — the snapshot simply comes back with the camera
    /// inactive. Neither surfaces as a command error.
    pub async fn open_camera(&self) -> Result<RecorderSnapshot> {
        let may_open = self.state.lock().await.phase().may_open_session();
        if !may_open {
            self.camera.lock().await.stop().await;
            self.emit_daily_limit();
            self.emit_state_changed().await;
            return Ok(self.snapshot().await);
        }

        {
            let mut camera = self.camera.lock().await;
            if camera.is_active() {
                warn!("capture session already active; ignoring open request");
            } else {
                match camera.start(self.preview_sink()).await {
                    Ok(session_id) => debug!("capture session {session_id} streaming"),
                    Err(err) => error!("camera access failed: {err}"),
                }
            }
        }

        self.emit_state_changed().await;
        Ok(self.snapshot().await)
    }

    pub async fn close_camera(&self) -> Result<RecorderSnapshot> {
        self.camera.lock().await.stop().await;
        self.emit_state_changed().await;
        Ok(self.snapshot().await)
    }

    /// Freezes one frame and appends a checkpoint. With no active
    /// session, or when the frame cannot be read or encoded, this is a
    /// silent no-op (diagnostics only). Every successful capture closes
    /// the session; a capture against a full ledger force-closes it and
    /// raises the limit notice.
    pub async fn capture_checkpoint(&self) -> Result<RecorderSnapshot> {
        let read = {
            let camera = self.camera.lock().await;
            camera.read_still().await
        };

        let frame = match read {
            None => {
                debug!("capture requested without an active session");
                return Ok(self.snapshot().await);
            }
            Some(Err(err)) => {
                warn!("snapshot frame read failed: {err}");
                return Ok(self.snapshot().await);
            }
            Some(Ok(frame)) => frame,
        };

        let photo = match encode_png_data_uri(&frame) {
            Ok(uri) => Some(uri),
            Err(err) => {
                warn!("snapshot encode failed: {err}");
                return Ok(self.snapshot().await);
            }
        };

        let timestamp = Local::now().format(TIME_FORMAT).to_string();
        let outcome = self.state.lock().await.record_checkpoint(timestamp, photo);

        self.camera.lock().await.stop().await;
        match outcome {
            AppendOutcome::Recorded { index, label } => {
                info!("checkpoint {} recorded as {label}", index + 1);
            }
            AppendOutcome::LimitReached => {
                warn!("daily checkpoint limit reached; capture dropped");
                self.emit_daily_limit();
            }
        }
        self.emit_state_changed().await;

        Ok(self.snapshot().await)
    }

    pub async fn toggle_photo(&self, index: usize) -> Result<RecorderSnapshot> {
        self.state.lock().await.toggle_photo(index);
        self.emit_state_changed().await;
        Ok(self.snapshot().await)
    }

    pub async fn set_layout(&self, layout: RecorderLayout) -> Result<RecorderSnapshot> {
        self.state.lock().await.set_layout(layout);
        self.emit_state_changed().await;
        Ok(self.snapshot().await)
    }

    /// Synchronous camera release for window teardown. Must run on the
    /// event-loop thread, never inside the async runtime.
    pub fn release_camera_blocking(&self) {
        self.camera.blocking_lock().stop_blocking();
    }

    fn preview_sink(&self) -> PreviewSink {
        let app_handle = self.app_handle.clone();
        Arc::new(move |frame: PreviewFrame| {
            let payload = PreviewFrameEvent {
                session_id: frame.session_id,
                frame: frame.data_uri,
            };
            let _ = app_handle.emit(PREVIEW_FRAME_EVENT, payload);
        })
    }

    async fn emit_state_changed(&self) {
        let snapshot = self.snapshot().await;
        let _ = self
            .app_handle
            .emit(STATE_CHANGED_EVENT, RecorderStateChangedEvent { snapshot });
    }

    fn emit_daily_limit(&self) {
        let payload = DailyLimitEvent {
            message: format!("Daily limit of {CHECKPOINT_CAPACITY} checkpoints reached."),
            limit: CHECKPOINT_CAPACITY,
        };
        let _ = self.app_handle.emit(DAILY_LIMIT_EVENT, payload);
    }
}
