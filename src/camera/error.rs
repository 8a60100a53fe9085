use thiserror::Error;

use super::LensFacing;

/// Everything that can go wrong between asking for the camera and showing frames.
///
/// Only [`CameraError::Device`] is fatal; the rest are logged and the lifecycle
/// either re-prompts or stays closed.
#[derive(Debug, Error)]
pub enum CameraError {
    #[error("camera permission denied")]
    PermissionDenied,
    #[error("failed to enumerate cameras: {0}")]
    DeviceEnumeration(String),
    #[error("no camera facing {0}")]
    NoMatchingDevice(LensFacing),
    #[error("failed to access camera {camera_id}: {reason}")]
    DeviceAccess { camera_id: String, reason: String },
    #[error("failed to configure capture session: {0}")]
    SessionConfiguration(String),
    #[error("camera {camera_id} reported error {code}")]
    Device { camera_id: String, code: i32 },
    #[error(transparent)]
    Platform(#[from] anyhow::Error),
}

pub type CameraResult<T> = Result<T, CameraError>;
