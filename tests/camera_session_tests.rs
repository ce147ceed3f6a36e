//! Capture session lifecycle: exclusivity, release, still reads.

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use punchclock_lib::camera::{
    CameraBackend, CameraError, CaptureSessionManager, FrameSize, SyntheticCameraBackend,
};

fn noop_sink() -> punchclock_lib::camera::PreviewSink {
    Arc::new(|_| {})
}

fn manager_with_backend(backend: SyntheticCameraBackend) -> CaptureSessionManager {
    let backend: Arc<dyn CameraBackend> = Arc::new(backend);
    CaptureSessionManager::new(backend, Duration::from_millis(20))
}

#[tokio::test]
async fn only_one_session_can_be_open() {
    let mut manager = manager_with_backend(SyntheticCameraBackend::new());

    manager.start(noop_sink()).await.expect("first open should succeed");
    assert!(manager.is_active());
    assert!(matches!(
        manager.start(noop_sink()).await,
        Err(CameraError::AlreadyActive)
    ));

    manager.stop().await;
    assert!(!manager.is_active());
}

#[tokio::test]
async fn failed_device_access_leaves_the_session_inactive() {
    let mut manager = manager_with_backend(SyntheticCameraBackend::failing());

    let result = manager.start(noop_sink()).await;
    assert!(matches!(result, Err(CameraError::Access(_))));
    assert!(!manager.is_active());
    assert!(manager.read_still().await.is_none());
}

#[tokio::test]
async fn still_reads_come_back_at_native_resolution() {
    let backend = SyntheticCameraBackend::with_size(FrameSize {
        width: 80,
        height: 60,
    });
    let mut manager = manager_with_backend(backend);

    manager.start(noop_sink()).await.expect("open should succeed");
    let frame = manager
        .read_still()
        .await
        .expect("session is active")
        .expect("read should succeed");
    assert_eq!(frame.dimensions(), (80, 60));

    manager.stop().await;
}

#[tokio::test]
async fn read_still_without_a_session_is_none() {
    let manager = manager_with_backend(SyntheticCameraBackend::new());
    assert!(manager.read_still().await.is_none());
}

#[tokio::test]
async fn stop_signals_every_track() {
    let backend = SyntheticCameraBackend::new();
    let witness = backend.stop_witness();
    let mut manager = manager_with_backend(backend);

    manager.start(noop_sink()).await.expect("open should succeed");
    assert!(!witness.load(Ordering::SeqCst));

    manager.stop().await;
    assert!(witness.load(Ordering::SeqCst));

    // Stopping again is harmless.
    manager.stop().await;
}

#[tokio::test]
async fn blocking_teardown_releases_an_active_session() {
    let backend = SyntheticCameraBackend::new();
    let witness = backend.stop_witness();
    let mut manager = manager_with_backend(backend);

    manager.start(noop_sink()).await.expect("open should succeed");
    manager.stop_blocking();

    assert!(witness.load(Ordering::SeqCst));
    assert!(!manager.is_active());
}

#[tokio::test]
async fn preview_frames_flow_until_the_session_stops() {
    let mut manager = manager_with_backend(SyntheticCameraBackend::new());

    let frames: Arc<std::sync::Mutex<Vec<String>>> = Arc::new(std::sync::Mutex::new(Vec::new()));
    let sink_frames = Arc::clone(&frames);
    let sink: punchclock_lib::camera::PreviewSink = Arc::new(move |frame| {
        sink_frames
            .lock()
            .expect("sink mutex should not be poisoned")
            .push(frame.data_uri);
    });

    manager.start(sink).await.expect("open should succeed");
    tokio::time::sleep(Duration::from_millis(200)).await;
    manager.stop().await;

    let delivered = frames.lock().expect("sink mutex should not be poisoned").len();
    assert!(delivered > 0, "expected at least one preview frame");
    assert!(frames
        .lock()
        .expect("sink mutex should not be poisoned")
        .iter()
        .all(|uri| uri.starts_with("data:image/png;base64,")));

    // The loop was awaited during stop; nothing arrives afterwards.
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(
        frames.lock().expect("sink mutex should not be poisoned").len(),
        delivered
    );
}
