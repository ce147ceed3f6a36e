use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use image::{Rgb, RgbImage};

use super::{CameraBackend, CameraError, CameraStream, FrameSize};

/// Deterministic in-process camera for tests and camera-less
/// development. Frames are a moving gradient so consecutive reads
/// differ; the shared stop flag lets tests observe that a stream's
/// tracks were actually released.
#[derive(Debug)]
pub struct SyntheticCameraBackend {
    size: FrameSize,
    fail_open: bool,
    stopped: Arc<AtomicBool>,
}

impl SyntheticCameraBackend {
    pub fn new() -> Self {
        Self::with_size(FrameSize {
            width: 64,
            height: 48,
        })
    }

    pub fn with_size(size: FrameSize) -> Self {
        Self {
            size,
            fail_open: false,
            stopped: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Backend whose every `open` fails, for device-access failure paths.
    pub fn failing() -> Self {
        Self {
            size: FrameSize {
                width: 64,
                height: 48,
            },
            fail_open: true,
            stopped: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Flag raised once a stream opened by this backend has been
    /// stopped. Shared across opens; fresh opens clear it.
    pub fn stop_witness(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.stopped)
    }
}

impl Default for SyntheticCameraBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl CameraBackend for SyntheticCameraBackend {
    fn label(&self) -> String {
        format!("synthetic {}x{}", self.size.width, self.size.height)
    }

    fn open(&self) -> Result<Box<dyn CameraStream>, CameraError> {
        if self.fail_open {
            return Err(CameraError::Access(
                "synthetic backend configured to refuse access".to_string(),
            ));
        }
        self.stopped.store(false, Ordering::SeqCst);
        Ok(Box::new(SyntheticCameraStream {
            size: self.size,
            sequence: 0,
            stopped: Arc::clone(&self.stopped),
        }))
    }
}

struct SyntheticCameraStream {
    size: FrameSize,
    sequence: u32,
    stopped: Arc<AtomicBool>,
}

impl CameraStream for SyntheticCameraStream {
    fn resolution(&self) -> FrameSize {
        self.size
    }

    fn read_frame(&mut self) -> Result<RgbImage, CameraError> {
        if self.stopped.load(Ordering::SeqCst) {
            return Err(CameraError::Frame("stream already stopped".to_string()));
        }
        self.sequence = self.sequence.wrapping_add(1);
        let shift = self.sequence;
        Ok(RgbImage::from_fn(self.size.width, self.size.height, move |x, y| {
            let shade = ((x + y + shift) % 256) as u8;
            Rgb([shade, 96, 255 - shade])
        }))
    }

    fn stop(&mut self) {
        self.stopped.store(true, Ordering::SeqCst);
    }
}

impl Drop for SyntheticCameraStream {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frames_vary_between_reads() {
        let backend = SyntheticCameraBackend::new();
        let mut stream = backend.open().expect("open should succeed");
        let first = stream.read_frame().expect("first read");
        let second = stream.read_frame().expect("second read");
        assert_eq!(first.dimensions(), (64, 48));
        assert_ne!(first.as_raw(), second.as_raw());
    }

    #[test]
    fn stop_raises_the_witness_and_ends_reads() {
        let backend = SyntheticCameraBackend::new();
        let witness = backend.stop_witness();
        let mut stream = backend.open().expect("open should succeed");
        assert!(!witness.load(Ordering::SeqCst));

        stream.stop();
        assert!(witness.load(Ordering::SeqCst));
        assert!(stream.read_frame().is_err());
    }

    #[test]
    fn dropping_a_stream_counts_as_stopping_it() {
        let backend = SyntheticCameraBackend::new();
        let witness = backend.stop_witness();
        drop(backend.open().expect("open should succeed"));
        assert!(witness.load(Ordering::SeqCst));
    }

    #[test]
    fn failing_backend_refuses_access() {
        let backend = SyntheticCameraBackend::failing();
        assert!(matches!(backend.open(), Err(CameraError::Access(_))));
    }
}
