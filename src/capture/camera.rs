//! Camera capture session
//!
//! A [`CameraSession`] owns exactly one open stream. The stream is stopped on
//! every exit path: after a capture, on cancel, on error, and on drop.

use anyhow::Context;

use super::ingest::ImageCandidate;

/// A live camera stream
pub trait CameraStream {
    /// Grab the current frame as an encoded image
    fn grab_frame(&mut self) -> anyhow::Result<ImageCandidate>;

    /// Stop every track of the stream
    fn stop(&mut self);
}

/// Source of camera streams (rear-facing camera preferred)
pub trait CameraDevice {
    type Stream: CameraStream;

    fn open(&mut self) -> anyhow::Result<Self::Stream>;
}

/// One capture interaction with the camera
pub struct CameraSession<S: CameraStream> {
    stream: Option<S>,
}

impl<S: CameraStream> CameraSession<S> {
    /// Open a stream on the device
    pub fn open<D>(device: &mut D) -> anyhow::Result<Self>
    where
        D: CameraDevice<Stream = S>,
    {
        let stream = device.open().context("Camera access failed")?;
        log::debug!("Camera stream opened");
        Ok(Self {
            stream: Some(stream),
        })
    }

    /// Grab one frame and release the stream, whether or not the grab succeeded
    pub fn capture(mut self) -> anyhow::Result<ImageCandidate> {
        let result = match self.stream.as_mut() {
            Some(stream) => stream.grab_frame().context("Failed to capture camera frame"),
            None => Err(anyhow::anyhow!("Camera stream already released")),
        };
        self.release();
        result
    }

    /// Close without capturing
    pub fn cancel(mut self) {
        log::debug!("Camera capture cancelled");
        self.release();
    }

    pub fn is_open(&self) -> bool {
        self.stream.is_some()
    }

    fn release(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            stream.stop();
            log::debug!("Camera stream stopped");
        }
    }
}

impl<S: CameraStream> Drop for CameraSession<S> {
    fn drop(&mut self) {
        self.release();
    }
}
