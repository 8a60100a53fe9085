use std::{
    sync::mpsc::{channel, Sender},
    thread::{self, JoinHandle},
    time::Instant,
};

use anyhow::Result;
use log::{error, info, warn};

use super::{CameraEvent, CameraHost, LifecycleController, LifecycleState, PermissionRequests};
use crate::config::PreviewConfig;

enum Job<D> {
    Event(CameraEvent<D>),
    Quit,
}

/// Hands events to the worker thread. Cheap to clone; platform callbacks keep one.
pub struct EventSink<D> {
    sender: Sender<Job<D>>,
}

impl<D> Clone for EventSink<D> {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
        }
    }
}

impl<D> EventSink<D> {
    /// Returns false once the worker is gone.
    pub fn send(&self, event: CameraEvent<D>) -> bool {
        self.sender.send(Job::Event(event)).is_ok()
    }
}

/// The single thread that owns the camera host and every handle it produces.
pub struct CameraWorker<D> {
    sink: EventSink<D>,
    thread: JoinHandle<()>,
}

impl<D: Send + 'static> CameraWorker<D> {
    /// Starts the thread. The host is built on the thread itself, so it never has
    /// to cross threads. `permission_requests` carries the request count over
    /// from earlier activations.
    pub fn spawn<H, F>(
        config: &PreviewConfig,
        permission_requests: PermissionRequests,
        make_host: F,
    ) -> Result<Self>
    where
        H: CameraHost<Device = D>,
        F: FnOnce(EventSink<D>) -> H + Send + 'static,
    {
        let (sender, receiver) = channel();
        let sink = EventSink { sender };
        let host_sink = sink.clone();
        let config = config.clone();
        let thread = thread::Builder::new()
            .name(config.worker_thread_name.clone())
            .spawn(move || {
                let host = make_host(host_sink);
                let mut controller = LifecycleController::new(host, &config, permission_requests);
                while let Ok(job) = receiver.recv() {
                    match job {
                        Job::Event(event) => controller.handle(event),
                        Job::Quit => break,
                    }
                }
                if controller.state() != LifecycleState::Closed {
                    controller.handle(CameraEvent::Suspend);
                }
                info!("camera worker stopped");
            })?;
        info!("camera worker started");
        Ok(Self { sink, thread })
    }
}

impl<D> CameraWorker<D> {
    pub fn sink(&self) -> EventSink<D> {
        self.sink.clone()
    }

    pub fn post(&self, event: CameraEvent<D>) {
        if !self.sink.send(event) {
            warn!("camera worker is gone, event dropped");
        }
    }

    /// Closes session and device, stops the thread and waits for it.
    pub fn stop(self) {
        let t = Instant::now();
        self.post(CameraEvent::Suspend);
        if self.sink.sender.send(Job::Quit).is_err() {
            warn!("camera worker is gone, quit dropped");
        }
        if self.thread.join().is_err() {
            error!("camera worker panicked");
        }
        info!("camera worker joined in {}ms", t.elapsed().as_millis());
    }
}
