use std::{
    mem,
    sync::{
        atomic::{AtomicU32, Ordering},
        Arc,
    },
};

use log::{debug, error, info, warn};

use super::{
    select::select_camera, CameraError, CameraHost, CameraResult, DeviceHandle, LensFacing,
    OutputTarget,
};
use crate::config::PreviewConfig;

/// Signals the lifecycle reacts to. UI signals and platform callbacks alike end
/// up as one of these on the worker thread.
#[derive(Debug)]
pub enum CameraEvent<D> {
    SurfaceAvailable(OutputTarget),
    PermissionResult { request_code: i32, granted: bool },
    DeviceOpened(D),
    DeviceDisconnected { camera_id: String },
    DeviceError { camera_id: String, code: i32 },
    Suspend,
}

/// Permission requests issued since the last grant.
///
/// The permission dialog itself pauses and resumes the screen, so the count is
/// shared by every activation instead of living in one controller.
#[derive(Debug, Clone, Default)]
pub struct PermissionRequests(Arc<AtomicU32>);

impl PermissionRequests {
    pub fn count(&self) -> u32 {
        self.0.load(Ordering::Acquire)
    }

    fn record(&self) {
        self.0.fetch_add(1, Ordering::AcqRel);
    }

    fn reset(&self) {
        self.0.store(0, Ordering::Release);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Idle,
    PermissionPending,
    Opening,
    Previewing,
    Closed,
}

enum Stage<D, S> {
    Idle,
    PermissionPending {
        target: OutputTarget,
    },
    Opening {
        target: OutputTarget,
        camera_id: String,
    },
    /// `session` stays empty when binding failed; the device is still ours to close.
    Previewing {
        device: D,
        session: Option<S>,
    },
    Closed,
}

/// Drives one activation of the preview: from surface available to closed.
pub struct LifecycleController<H: CameraHost> {
    host: H,
    facing: LensFacing,
    request_code: i32,
    retry_limit: Option<u32>,
    permission_requests: PermissionRequests,
    stage: Stage<H::Device, H::Session>,
}

impl<H: CameraHost> LifecycleController<H> {
    pub fn new(host: H, config: &PreviewConfig, permission_requests: PermissionRequests) -> Self {
        Self {
            host,
            facing: config.facing,
            request_code: config.permission_request_code,
            retry_limit: config.permission_retry_limit,
            permission_requests,
            stage: Stage::Idle,
        }
    }

    pub fn state(&self) -> LifecycleState {
        match self.stage {
            Stage::Idle => LifecycleState::Idle,
            Stage::PermissionPending { .. } => LifecycleState::PermissionPending,
            Stage::Opening { .. } => LifecycleState::Opening,
            Stage::Previewing { .. } => LifecycleState::Previewing,
            Stage::Closed => LifecycleState::Closed,
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn handle(&mut self, event: CameraEvent<H::Device>) {
        let stage = mem::replace(&mut self.stage, Stage::Closed);
        self.stage = self.transition(stage, event);
        debug!("camera lifecycle -> {:?}", self.state());
    }

    fn transition(
        &mut self,
        stage: Stage<H::Device, H::Session>,
        event: CameraEvent<H::Device>,
    ) -> Stage<H::Device, H::Session> {
        match (stage, event) {
            (stage, CameraEvent::Suspend) => {
                self.release(stage);
                info!("camera closed");
                Stage::Closed
            }

            (Stage::Idle, CameraEvent::SurfaceAvailable(target)) => {
                info!("preview surface available: {}", target.size);
                self.acquire(target)
            }
            (Stage::PermissionPending { .. }, CameraEvent::SurfaceAvailable(target)) => {
                Stage::PermissionPending { target }
            }
            (Stage::Opening { camera_id, .. }, CameraEvent::SurfaceAvailable(target)) => {
                Stage::Opening { target, camera_id }
            }
            (stage, CameraEvent::SurfaceAvailable(_)) => stage,

            (Stage::PermissionPending { target }, CameraEvent::PermissionResult {
                request_code,
                granted,
            }) => {
                if request_code != self.request_code {
                    debug!("ignoring permission result for request {request_code}");
                    return Stage::PermissionPending { target };
                }
                if granted {
                    info!("camera permission granted");
                    self.permission_requests.reset();
                    return self.connect(target);
                }
                warn!("camera permission denied, asking again");
                self.request_permission(target)
            }
            (stage, CameraEvent::PermissionResult { .. }) => stage,

            (Stage::Opening { target, camera_id }, CameraEvent::DeviceOpened(device)) => {
                if device.camera_id() != camera_id {
                    warn!("camera {} opened while waiting for {camera_id}", device.camera_id());
                    self.host.close_device(device);
                    return Stage::Opening { target, camera_id };
                }
                info!("camera {camera_id} opened");
                self.bind(device, &target)
            }
            (stage, CameraEvent::DeviceOpened(device)) => {
                warn!("closing camera {} opened too late", device.camera_id());
                self.host.close_device(device);
                stage
            }

            (stage, CameraEvent::DeviceDisconnected { camera_id }) => {
                if !Self::holds(&stage, &camera_id) {
                    debug!("ignoring disconnect of stale camera {camera_id}");
                    return stage;
                }
                info!("camera {camera_id} disconnected");
                self.release(stage);
                Stage::Closed
            }

            (stage, CameraEvent::DeviceError { camera_id, code }) => {
                if !Self::holds(&stage, &camera_id) {
                    debug!("ignoring error {code} of stale camera {camera_id}");
                    return stage;
                }
                error!("{}", CameraError::Device { camera_id, code });
                self.release(stage);
                self.host.finish();
                Stage::Closed
            }
        }
    }

    fn acquire(&mut self, target: OutputTarget) -> Stage<H::Device, H::Session> {
        match self.host.has_permission() {
            Ok(true) => {
                info!("camera permission already granted");
                self.permission_requests.reset();
                self.connect(target)
            }
            Ok(false) => self.request_permission(target),
            Err(err) => {
                error!("failed to check camera permission: {err}");
                Stage::Closed
            }
        }
    }

    /// The first request plus `retry_limit` re-requests, counted across activations.
    fn request_permission(&mut self, target: OutputTarget) -> Stage<H::Device, H::Session> {
        let issued = self.permission_requests.count();
        if self.retry_limit.is_some_and(|limit| issued > limit) {
            error!("{} after {issued} requests", CameraError::PermissionDenied);
            return Stage::Closed;
        }
        self.permission_requests.record();
        match self.host.request_permission(self.request_code) {
            Ok(()) => Stage::PermissionPending { target },
            Err(err) => {
                error!("failed to request camera permission: {err}");
                Stage::Closed
            }
        }
    }

    fn connect(&mut self, target: OutputTarget) -> Stage<H::Device, H::Session> {
        let camera_id = match find_camera(&mut self.host, self.facing) {
            Ok(camera_id) => camera_id,
            Err(err) => {
                error!("{err}");
                return Stage::Closed;
            }
        };
        info!("opening camera {camera_id}");
        match self.host.open_device(&camera_id) {
            Ok(()) => Stage::Opening { target, camera_id },
            Err(err) => {
                error!("{err}");
                Stage::Closed
            }
        }
    }

    fn bind(&mut self, device: H::Device, target: &OutputTarget) -> Stage<H::Device, H::Session> {
        let session = match self.host.bind_session(&device, target) {
            Ok(mut session) => {
                match self.host.start_repeating(&mut session) {
                    Ok(()) => info!("preview started on camera {}", device.camera_id()),
                    Err(err) => error!("{err}"),
                }
                Some(session)
            }
            Err(err) => {
                error!("{err}");
                None
            }
        };
        Stage::Previewing { device, session }
    }

    /// Session first, then device.
    fn release(&mut self, stage: Stage<H::Device, H::Session>) {
        if let Stage::Previewing { device, session } = stage {
            if let Some(session) = session {
                self.host.close_session(session);
            }
            self.host.close_device(device);
        }
    }

    fn holds(stage: &Stage<H::Device, H::Session>, camera_id: &str) -> bool {
        match stage {
            Stage::Opening { camera_id: id, .. } => id == camera_id,
            Stage::Previewing { device, .. } => device.camera_id() == camera_id,
            _ => false,
        }
    }
}

/// Enumerates devices and picks the first one facing `facing`.
///
/// Devices whose metadata can't be read are skipped.
pub fn find_camera<H: CameraHost>(host: &mut H, facing: LensFacing) -> CameraResult<String> {
    let ids = host.camera_ids()?;
    let mut devices = Vec::with_capacity(ids.len());
    for id in ids {
        match host.lens_facing(&id) {
            Ok(lens) => devices.push((id, lens)),
            Err(err) => warn!("skipping camera {id}: {err}"),
        }
    }
    debug!("cameras: {devices:?}");
    select_camera(&devices, facing)
        .map(str::to_string)
        .ok_or(CameraError::NoMatchingDevice(facing))
}
