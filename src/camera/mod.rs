//! Camera acquisition and teardown.
//!
//! The UI talks to [`Camera`]; everything that touches a camera handle runs on
//! the [`CameraWorker`] thread, driven by [`CameraEvent`]s through a
//! [`LifecycleController`]. Platform specifics live behind [`CameraHost`].

use anyhow::Result;
use log::{info, warn};

use crate::config::PreviewConfig;

mod error;
mod host;
mod lifecycle;
mod select;
mod worker;
pub mod yuv;

#[cfg(target_os = "android")]
pub mod camera2;

#[cfg(not(target_os = "android"))]
pub mod pcam;
#[cfg(not(target_os = "android"))]
mod pump;

pub use error::{CameraError, CameraResult};
pub use host::{CameraHost, DeviceHandle, LensFacing, OutputTarget, PreviewSize};
pub use lifecycle::{
    find_camera, CameraEvent, LifecycleController, LifecycleState, PermissionRequests,
};
pub use select::{choose_preview_size, select_camera};
pub use worker::{CameraWorker, EventSink};

/// Builds a fresh host for every activation, on the worker thread.
pub trait HostFactory {
    type Host: CameraHost;

    fn make_host(
        &self,
        sink: EventSink<<Self::Host as CameraHost>::Device>,
    ) -> Self::Host;

    /// The answer to an outstanding permission request, if one arrived.
    ///
    /// Only needed where the platform doesn't call back with the result.
    fn poll_permission(&self) -> Option<bool> {
        None
    }
}

pub type DeviceOf<F> = <<F as HostFactory>::Host as CameraHost>::Device;

/// Camera preview as seen from the UI thread.
pub struct Camera<F: HostFactory> {
    factory: F,
    config: PreviewConfig,
    worker: Option<CameraWorker<DeviceOf<F>>>,
    surface: Option<OutputTarget>,
    permission_requests: PermissionRequests,
}

impl<F> Camera<F>
where
    F: HostFactory + Clone + Send + 'static,
    DeviceOf<F>: Send + 'static,
{
    pub fn new(factory: F, config: PreviewConfig) -> Self {
        Self {
            factory,
            config,
            worker: None,
            surface: None,
            permission_requests: PermissionRequests::default(),
        }
    }

    pub fn is_running(&self) -> bool {
        self.worker.is_some()
    }

    /// Permission requests issued since the last grant, across activations.
    pub fn permission_requests(&self) -> u32 {
        self.permission_requests.count()
    }

    /// Starts the worker for a new activation. A second call without a
    /// [`Camera::pause`] in between does nothing.
    pub fn resume(&mut self) -> Result<()> {
        if self.worker.is_some() {
            warn!("camera already resumed");
            return Ok(());
        }
        let factory = self.factory.clone();
        let worker = CameraWorker::spawn(
            &self.config,
            self.permission_requests.clone(),
            move |sink| factory.make_host(sink),
        )?;
        if let Some(target) = self.surface {
            worker.post(CameraEvent::SurfaceAvailable(target));
        }
        self.worker = Some(worker);
        Ok(())
    }

    /// Closes session and device, then stops and joins the worker.
    pub fn pause(&mut self) {
        match self.worker.take() {
            Some(worker) => worker.stop(),
            None => info!("camera already paused"),
        }
    }

    pub fn surface_available(&mut self, target: OutputTarget) {
        self.surface = Some(target);
        if let Some(worker) = self.worker.as_ref() {
            worker.post(CameraEvent::SurfaceAvailable(target));
        }
    }

    pub fn surface_destroyed(&mut self) {
        self.surface = None;
    }

    pub fn permission_result(&mut self, request_code: i32, granted: bool) {
        match self.worker.as_ref() {
            Some(worker) => worker.post(CameraEvent::PermissionResult {
                request_code,
                granted,
            }),
            None => info!("permission result {granted} arrived while paused"),
        }
    }

    pub fn poll_permission(&mut self) {
        if let Some(granted) = self.factory.poll_permission() {
            self.permission_result(self.config.permission_request_code, granted);
        }
    }
}

impl<F: HostFactory> Drop for Camera<F> {
    fn drop(&mut self) {
        if let Some(worker) = self.worker.take() {
            worker.stop();
        }
    }
}
