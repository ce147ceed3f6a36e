use std::sync::mpsc;
use std::thread::{self, JoinHandle};

use image::RgbImage;
use log::{error, info, warn};
use nokhwa::{
    pixel_format::RgbFormat,
    utils::{CameraIndex, RequestedFormat, RequestedFormatType},
    Camera,
};

use super::{CameraBackend, CameraError, CameraStream, FrameSize};

enum WorkerCommand {
    ReadFrame(mpsc::Sender<Result<RgbImage, CameraError>>),
    Stop,
}

/// Real webcam input. The device handle is created, streamed, and
/// released entirely on a dedicated worker thread; the stream handle
/// only talks to it over a command channel, so the handle itself stays
/// `Send` regardless of what the platform backend is built from.
#[derive(Debug, Clone)]
pub struct DeviceCameraBackend {
    index: u32,
}

impl DeviceCameraBackend {
    pub fn new(index: u32) -> Self {
        Self { index }
    }
}

impl CameraBackend for DeviceCameraBackend {
    fn label(&self) -> String {
        format!("device camera {}", self.index)
    }

    fn open(&self) -> Result<Box<dyn CameraStream>, CameraError> {
        let (ready_tx, ready_rx) = mpsc::channel();
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let index = self.index;

        let worker = thread::Builder::new()
            .name(format!("camera-worker-{index}"))
            .spawn(move || camera_worker(index, ready_tx, cmd_rx))
            .map_err(|err| CameraError::Access(format!("failed to spawn camera worker: {err}")))?;

        let size = match ready_rx.recv() {
            Ok(Ok(size)) => size,
            Ok(Err(err)) => {
                let _ = worker.join();
                return Err(err);
            }
            Err(_) => {
                let _ = worker.join();
                return Err(CameraError::WorkerGone);
            }
        };

        info!(
            "camera {} streaming at {}x{}",
            index, size.width, size.height
        );

        Ok(Box::new(DeviceCameraStream {
            size,
            cmd_tx,
            worker: Some(worker),
        }))
    }
}

struct DeviceCameraStream {
    size: FrameSize,
    cmd_tx: mpsc::Sender<WorkerCommand>,
    worker: Option<JoinHandle<()>>,
}

impl CameraStream for DeviceCameraStream {
    fn resolution(&self) -> FrameSize {
        self.size
    }

    fn read_frame(&mut self) -> Result<RgbImage, CameraError> {
        let (reply_tx, reply_rx) = mpsc::channel();
        self.cmd_tx
            .send(WorkerCommand::ReadFrame(reply_tx))
            .map_err(|_| CameraError::WorkerGone)?;
        reply_rx.recv().map_err(|_| CameraError::WorkerGone)?
    }

    fn stop(&mut self) {
        if let Some(worker) = self.worker.take() {
            let _ = self.cmd_tx.send(WorkerCommand::Stop);
            if worker.join().is_err() {
                error!("camera worker panicked during shutdown");
            }
        }
    }
}

impl Drop for DeviceCameraStream {
    fn drop(&mut self) {
        self.stop();
    }
}

fn camera_worker(
    index: u32,
    ready_tx: mpsc::Sender<Result<FrameSize, CameraError>>,
    cmd_rx: mpsc::Receiver<WorkerCommand>,
) {
    let requested = RequestedFormat::new::<RgbFormat>(RequestedFormatType::AbsoluteHighestResolution);

    let mut camera = match Camera::new(CameraIndex::Index(index), requested) {
        Ok(camera) => camera,
        Err(err) => {
            let _ = ready_tx.send(Err(CameraError::Access(err.to_string())));
            return;
        }
    };

    if let Err(err) = camera.open_stream() {
        let _ = ready_tx.send(Err(CameraError::Access(err.to_string())));
        return;
    }

    let resolution = camera.resolution();
    let size = FrameSize {
        width: resolution.width(),
        height: resolution.height(),
    };

    if ready_tx.send(Ok(size)).is_err() {
        // Opener went away before the handshake finished; release now.
        let _ = camera.stop_stream();
        return;
    }

    while let Ok(command) = cmd_rx.recv() {
        match command {
            WorkerCommand::ReadFrame(reply) => {
                let frame = camera
                    .frame()
                    .map_err(|err| CameraError::Frame(err.to_string()))
                    .and_then(|buffer| {
                        buffer
                            .decode_image::<RgbFormat>()
                            .map_err(|err| CameraError::Frame(err.to_string()))
                    });
                let _ = reply.send(frame);
            }
            WorkerCommand::Stop => break,
        }
    }

    if let Err(err) = camera.stop_stream() {
        warn!("camera {index} stream did not stop cleanly: {err}");
    }
    info!("camera {index} released");
}
