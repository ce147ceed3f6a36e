pub mod device;
pub mod session;
pub mod synthetic;

pub use device::DeviceCameraBackend;
pub use session::{CaptureSessionManager, PreviewFrame, PreviewSink};
pub use synthetic::SyntheticCameraBackend;

use image::RgbImage;
use thiserror::Error;

/// Native pixel dimensions a stream reports once it is live.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameSize {
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Error)]
pub enum CameraError {
    #[error("camera access failed: {0}")]
    Access(String),
    #[error("a capture session is already active")]
    AlreadyActive,
    #[error("frame read failed: {0}")]
    Frame(String),
    #[error("camera worker is gone")]
    WorkerGone,
}

/// A video input the recorder can open. Implementations hand out one
/// exclusive stream per `open` call.
pub trait CameraBackend: Send + Sync {
    /// Human-readable name for diagnostics.
    fn label(&self) -> String;

    fn open(&self) -> Result<Box<dyn CameraStream>, CameraError>;
}

/// A live video stream. `stop` releases every underlying track; streams
/// must also release on drop so no exit path leaks the hardware.
pub trait CameraStream: Send {
    fn resolution(&self) -> FrameSize;

    /// Blocking read of one frame at native resolution.
    fn read_frame(&mut self) -> Result<RgbImage, CameraError>;

    fn stop(&mut self);
}
