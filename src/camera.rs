use image::RgbImage;
use nokhwa::pixel_format::RgbFormat;
use nokhwa::utils::{
    ApiBackend, CameraFormat, CameraIndex, ControlValueSetter, FrameFormat, KnownCameraControl,
    RequestedFormat, RequestedFormatType, Resolution,
};
use tracing::{debug, info, warn};

use crate::config::CameraConfig;

#[derive(Debug, thiserror::Error)]
pub enum CameraError {
    /// The device could not be opened; fatal at start-up
    #[error("camera unavailable: {0}")]
    Unavailable(String),

    /// A single frame could not be read; the caller skips it
    #[error("frame read failed: {0}")]
    Read(String),
}

/// Source of camera frames
pub trait Camera {
    fn read(&mut self) -> Result<RgbImage, CameraError>;

    fn name(&self) -> String {
        "camera".to_string()
    }
}

/// Capture device opened through nokhwa
pub struct DeviceCamera {
    inner: nokhwa::Camera,
}

impl DeviceCamera {
    pub fn open(config: &CameraConfig) -> Result<Self, CameraError> {
        let frame_format = if config.mjpeg {
            FrameFormat::MJPEG
        } else {
            FrameFormat::YUYV
        };
        let requested = RequestedFormat::new::<RgbFormat>(RequestedFormatType::Closest(
            CameraFormat::new(
                Resolution::new(config.width, config.height),
                frame_format,
                config.fps,
            ),
        ));

        let mut inner = nokhwa::Camera::new(CameraIndex::Index(config.index), requested)
            .map_err(|e| CameraError::Unavailable(e.to_string()))?;

        if config.autofocus {
            // Best effort, many webcams have no focus control
            if let Err(e) = inner
                .set_camera_control(KnownCameraControl::Focus, ControlValueSetter::Boolean(true))
            {
                debug!("autofocus not applied: {e}");
            }
        }

        inner
            .open_stream()
            .map_err(|e| CameraError::Unavailable(e.to_string()))?;

        let format = inner.camera_format();
        info!(
            "opened camera {} ({}x{} @ {} fps, {:?})",
            inner.info().human_name(),
            format.width(),
            format.height(),
            format.frame_rate(),
            format.format()
        );

        Ok(Self { inner })
    }
}

impl Camera for DeviceCamera {
    fn read(&mut self) -> Result<RgbImage, CameraError> {
        let buffer = self
            .inner
            .frame()
            .map_err(|e| CameraError::Read(e.to_string()))?;
        let decoded = buffer
            .decode_image::<RgbFormat>()
            .map_err(|e| CameraError::Read(e.to_string()))?;

        let (width, height) = decoded.dimensions();
        RgbImage::from_raw(width, height, decoded.into_raw())
            .ok_or_else(|| CameraError::Read("decoded frame has wrong size".to_string()))
    }

    fn name(&self) -> String {
        self.inner.info().human_name()
    }
}

impl Drop for DeviceCamera {
    fn drop(&mut self) {
        if let Err(e) = self.inner.stop_stream() {
            warn!("failed to stop camera stream: {e}");
        }
        debug!("camera released");
    }
}

/// Enumerate capture devices as (index, name) pairs
pub fn list_cameras() -> anyhow::Result<Vec<(String, String)>> {
    let cameras = nokhwa::query(ApiBackend::Auto)?;
    Ok(cameras
        .into_iter()
        .map(|cam| (cam.index().to_string(), cam.human_name()))
        .collect())
}
