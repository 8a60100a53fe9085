use std::fmt;

use super::error::CameraResult;

/// Direction a lens points, as reported in the device metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LensFacing {
    Front,
    Back,
    External,
}

impl LensFacing {
    /// Maps the `ACAMERA_LENS_FACING` metadata byte.
    pub fn from_metadata(value: u8) -> Option<Self> {
        match value {
            0 => Some(LensFacing::Front),
            1 => Some(LensFacing::Back),
            2 => Some(LensFacing::External),
            _ => None,
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "front" => Some(LensFacing::Front),
            "back" | "rear" => Some(LensFacing::Back),
            "external" => Some(LensFacing::External),
            _ => None,
        }
    }
}

impl fmt::Display for LensFacing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LensFacing::Front => write!(f, "front"),
            LensFacing::Back => write!(f, "back"),
            LensFacing::External => write!(f, "external"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PreviewSize {
    pub width: u32,
    pub height: u32,
}

impl PreviewSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    pub fn fits_within(&self, bound: PreviewSize) -> bool {
        self.width <= bound.width && self.height <= bound.height
    }
}

impl fmt::Display for PreviewSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// The drawable surface the UI hands over once it is available.
///
/// The controller only references it; the UI keeps owning whatever sits behind it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputTarget {
    pub size: PreviewSize,
}

impl OutputTarget {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            size: PreviewSize::new(width, height),
        }
    }
}

pub trait DeviceHandle {
    fn camera_id(&self) -> &str;
}

/// The platform camera subsystem, as seen from the worker thread.
///
/// Every method is called on the worker thread only. Asynchronous outcomes of
/// [`CameraHost::open_device`] (opened, disconnected, error) come back as
/// [`CameraEvent`](super::CameraEvent)s through the sink the host was built with.
pub trait CameraHost {
    type Device: DeviceHandle;
    type Session;

    fn has_permission(&mut self) -> CameraResult<bool>;

    fn request_permission(&mut self, request_code: i32) -> CameraResult<()>;

    fn camera_ids(&mut self) -> CameraResult<Vec<String>>;

    fn lens_facing(&mut self, camera_id: &str) -> CameraResult<LensFacing>;

    /// Starts opening a device. Success is reported later as `DeviceOpened`.
    fn open_device(&mut self, camera_id: &str) -> CameraResult<()>;

    /// Creates a capture session that renders into `target`.
    fn bind_session(
        &mut self,
        device: &Self::Device,
        target: &OutputTarget,
    ) -> CameraResult<Self::Session>;

    /// Issues the continuous preview request on a bound session.
    fn start_repeating(&mut self, session: &mut Self::Session) -> CameraResult<()>;

    fn close_session(&mut self, session: Self::Session);

    fn close_device(&mut self, device: Self::Device);

    /// Terminates the hosting screen after a fatal device error.
    fn finish(&mut self);
}
