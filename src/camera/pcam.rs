use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        mpsc::Sender,
        Arc,
    },
    time::{Duration, Instant},
};

use anyhow::{anyhow, Result};
use kamera::Camera as KCamera;
use log::{debug, error, info, warn};
use slint::{Rgba8Pixel, SharedPixelBuffer};

use super::{
    pump::FramePump, CameraError, CameraEvent, CameraHost, CameraResult, DeviceHandle, EventSink, HostFactory,
    LensFacing, OutputTarget,
};

const MAX_PROBED_DEVICES: usize = 4;

pub type FrameSender = Sender<SharedPixelBuffer<Rgba8Pixel>>;

#[derive(Clone)]
pub struct DesktopHostFactory {
    frame_sender: FrameSender,
}

impl DesktopHostFactory {
    pub fn new(frame_sender: FrameSender) -> Self {
        Self { frame_sender }
    }
}

impl HostFactory for DesktopHostFactory {
    type Host = DesktopHost;

    fn make_host(&self, sink: EventSink<DesktopDevice>) -> DesktopHost {
        DesktopHost {
            frame_sender: self.frame_sender.clone(),
            sink,
        }
    }
}

/// Webcams through `kamera`. There is no permission prompt and no lens
/// metadata, so every device counts as external.
pub struct DesktopHost {
    frame_sender: FrameSender,
    sink: EventSink<DesktopDevice>,
}

#[derive(Debug)]
pub struct DesktopDevice {
    camera_id: String,
    index: usize,
}

impl DeviceHandle for DesktopDevice {
    fn camera_id(&self) -> &str {
        &self.camera_id
    }
}

pub struct DesktopSession {
    index: usize,
    frame_sender: FrameSender,
    pump: Option<FramePump>,
}

impl CameraHost for DesktopHost {
    type Device = DesktopDevice;
    type Session = DesktopSession;

    fn has_permission(&mut self) -> CameraResult<bool> {
        Ok(true)
    }

    fn request_permission(&mut self, request_code: i32) -> CameraResult<()> {
        debug!("no permission prompt on desktop (code {request_code})");
        Ok(())
    }

    fn camera_ids(&mut self) -> CameraResult<Vec<String>> {
        let ids: Vec<String> = (0..MAX_PROBED_DEVICES)
            .filter(|index| KCamera::new_device(*index).is_some())
            .map(|index| format!("{index}"))
            .collect();
        info!("camera_ids: {:?}", ids);
        Ok(ids)
    }

    fn lens_facing(&mut self, _camera_id: &str) -> CameraResult<LensFacing> {
        Ok(LensFacing::External)
    }

    fn open_device(&mut self, camera_id: &str) -> CameraResult<()> {
        let access_error = |reason: &str| CameraError::DeviceAccess {
            camera_id: camera_id.to_string(),
            reason: reason.to_string(),
        };
        let index: usize = camera_id
            .parse()
            .map_err(|_| access_error("not a device index"))?;
        if KCamera::new_device(index).is_none() {
            return Err(access_error("camera id not exist"));
        }
        let device = DesktopDevice {
            camera_id: camera_id.to_string(),
            index,
        };
        if !self.sink.send(CameraEvent::DeviceOpened(device)) {
            warn!("camera {camera_id} opened after the worker stopped");
        }
        Ok(())
    }

    fn bind_session(
        &mut self,
        device: &DesktopDevice,
        target: &OutputTarget,
    ) -> CameraResult<DesktopSession> {
        info!("binding camera {} to {}", device.camera_id, target.size);
        Ok(DesktopSession {
            index: device.index,
            frame_sender: self.frame_sender.clone(),
            pump: None,
        })
    }

    fn start_repeating(&mut self, session: &mut DesktopSession) -> CameraResult<()> {
        if session.pump.is_some() {
            return Ok(());
        }
        let frame_sender = session.frame_sender.clone();
        let index = session.index;
        let pump = FramePump::spawn(format!("camera-frames-{index}"), move |running| {
            pump_frames(index, running, frame_sender)
        })
        .map_err(|err| CameraError::SessionConfiguration(err.to_string()))?;
        session.pump = Some(pump);
        Ok(())
    }

    /// Blocks until the pump has stopped the device, so a following open of
    /// the same index never races it.
    fn close_session(&mut self, mut session: DesktopSession) {
        if let Some(pump) = session.pump.take() {
            if let Err(err) = pump.stop() {
                error!("camera {} frame pump failed: {err:?}", session.index);
            }
        }
        info!("Close capture session");
    }

    fn close_device(&mut self, device: DesktopDevice) {
        info!("Close Camera {}", device.camera_id);
    }

    fn finish(&mut self) {
        let res = slint::invoke_from_event_loop(|| {
            let _ = slint::quit_event_loop();
        });
        if let Err(err) = res {
            error!("failed to quit the event loop: {err:?}");
        }
    }
}

fn pump_frames(index: usize, running: Arc<AtomicBool>, frame_sender: FrameSender) -> Result<()> {
    let camera = match KCamera::new_device(index) {
        None => return Err(anyhow!("camera id not exist")),
        Some(v) => v,
    };
    camera.start();
    let mut count = 0;
    let mut timer = Instant::now();
    let mut rgba_buffer = vec![];
    while running.load(Ordering::Acquire) {
        let frame = match camera.wait_for_frame() {
            Some(f) => f,
            None => {
                debug!("no frame from camera {index}");
                std::thread::sleep(Duration::from_millis(10));
                continue;
            }
        };

        let (width, height) = frame.size_u32();
        if rgba_buffer.len() as u32 != width * height * 4 {
            rgba_buffer = vec![0; (width * height * 4) as usize];
        }
        let frame_data = frame.data();
        let data_u8 = frame_data.data_u8();
        for (idx, bgra) in data_u8
            .chunks_exact(4)
            .take((width * height) as usize)
            .enumerate()
        {
            rgba_buffer[idx * 4] = bgra[2];
            rgba_buffer[idx * 4 + 1] = bgra[1];
            rgba_buffer[idx * 4 + 2] = bgra[0];
            rgba_buffer[idx * 4 + 3] = bgra[3];
        }

        let buf = SharedPixelBuffer::clone_from_slice(&rgba_buffer, width, height);
        frame_sender.send(buf).map_err(|err| anyhow!("{:?}", err))?;

        count += 1;
        if count == 30 {
            debug!("30 frames in {}ms", timer.elapsed().as_millis());
            count = 0;
            timer = Instant::now();
        }
    }
    camera.stop();
    Ok(())
}
