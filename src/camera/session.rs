use std::sync::{Arc, Mutex};
use std::time::Duration;

use image::RgbImage;
use log::{info, warn};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::snapshot::encode_preview_data_uri;

use super::{CameraBackend, CameraError, CameraStream};

/// One downscaled live frame headed for the shell's preview surface.
#[derive(Debug, Clone)]
pub struct PreviewFrame {
    pub session_id: String,
    pub data_uri: String,
}

pub type PreviewSink = Arc<dyn Fn(PreviewFrame) + Send + Sync>;

type SharedStream = Arc<Mutex<Box<dyn CameraStream>>>;

struct ActiveSession {
    id: String,
    stream: SharedStream,
    cancel: CancellationToken,
    preview: JoinHandle<()>,
}

/// Owns the camera for the recorder. At most one capture session is
/// active at a time; while one is, a preview loop pushes frames to the
/// sink. Every way out of a session — explicit close, a successful
/// capture, window teardown — stops the underlying tracks.
pub struct CaptureSessionManager {
    backend: Arc<dyn CameraBackend>,
    preview_interval: Duration,
    active: Option<ActiveSession>,
}

impl CaptureSessionManager {
    pub fn new(backend: Arc<dyn CameraBackend>, preview_interval: Duration) -> Self {
        Self {
            backend,
            preview_interval,
            active: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// Opens the device and starts the preview loop. The open call is
    /// blocking (permission prompts included) and runs off the async
    /// thread; there is no timeout on it.
    pub async fn start(&mut self, sink: PreviewSink) -> Result<String, CameraError> {
        if self.active.is_some() {
            return Err(CameraError::AlreadyActive);
        }

        let backend = Arc::clone(&self.backend);
        let opened = tokio::task::spawn_blocking(move || backend.open())
            .await
            .map_err(|err| CameraError::Access(format!("camera open task failed: {err}")))?;
        let stream = opened?;

        let size = stream.resolution();
        let session_id = Uuid::new_v4().to_string();
        info!(
            "capture session {} opened on {} at {}x{}",
            session_id,
            self.backend.label(),
            size.width,
            size.height
        );

        let stream: SharedStream = Arc::new(Mutex::new(stream));
        let cancel = CancellationToken::new();
        let preview = tokio::spawn(preview_loop(
            session_id.clone(),
            Arc::clone(&stream),
            cancel.clone(),
            self.preview_interval,
            sink,
        ));

        self.active = Some(ActiveSession {
            id: session_id.clone(),
            stream,
            cancel,
            preview,
        });

        Ok(session_id)
    }

    /// One native-resolution frame from the active session, or `None`
    /// when no session is open.
    pub async fn read_still(&self) -> Option<Result<RgbImage, CameraError>> {
        let session = self.active.as_ref()?;
        let stream = Arc::clone(&session.stream);
        let read = tokio::task::spawn_blocking(move || read_locked_frame(&stream)).await;
        Some(match read {
            Ok(result) => result,
            Err(err) => Err(CameraError::Frame(format!("still read task failed: {err}"))),
        })
    }

    /// Cancels the preview loop, waits for it, and stops every track.
    pub async fn stop(&mut self) {
        let Some(session) = self.active.take() else {
            return;
        };

        session.cancel.cancel();
        let _ = session.preview.await;

        let stream = session.stream;
        let _ = tokio::task::spawn_blocking(move || stop_locked_stream(&stream)).await;
        info!("capture session {} released", session.id);
    }

    /// Synchronous teardown for window destruction: aborts the preview
    /// loop instead of awaiting it, then stops the tracks on the calling
    /// thread.
    pub fn stop_blocking(&mut self) {
        let Some(session) = self.active.take() else {
            return;
        };

        session.cancel.cancel();
        session.preview.abort();
        stop_locked_stream(&session.stream);
        info!("capture session {} released", session.id);
    }
}

fn read_locked_frame(stream: &SharedStream) -> Result<RgbImage, CameraError> {
    let mut guard = stream.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    guard.read_frame()
}

fn stop_locked_stream(stream: &SharedStream) {
    let mut guard = stream.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    guard.stop();
}

async fn preview_loop(
    session_id: String,
    stream: SharedStream,
    cancel: CancellationToken,
    interval: Duration,
    sink: PreviewSink,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let shared = Arc::clone(&stream);
                let read = tokio::task::spawn_blocking(move || read_locked_frame(&shared)).await;
                match read {
                    Ok(Ok(frame)) => match encode_preview_data_uri(&frame) {
                        Ok(data_uri) => sink(PreviewFrame {
                            session_id: session_id.clone(),
                            data_uri,
                        }),
                        Err(err) => warn!("preview encode failed for session {session_id}: {err}"),
                    },
                    Ok(Err(err)) => warn!("preview frame read failed for session {session_id}: {err}"),
                    Err(err) => {
                        warn!("preview worker join failed for session {session_id}: {err}");
                        break;
                    }
                }
            }
            _ = cancel.cancelled() => {
                info!("preview loop for session {session_id} shutting down");
                break;
            }
        }
    }
}
