use std::{
    cell::RefCell,
    rc::Rc,
    sync::mpsc::{channel, Receiver},
    time::Duration,
};

use anyhow::Result;
use log::{error, info};
use slint::{Image, Timer, TimerMode};

use crate::{
    camera::{Camera, OutputTarget},
    config::PreviewConfig,
};

#[cfg(target_os = "android")]
use crate::camera::camera2::AndroidHostFactory as PlatformHostFactory;
#[cfg(not(target_os = "android"))]
use crate::camera::pcam::DesktopHostFactory as PlatformHostFactory;

/// Host screen signals the preview follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleSignal {
    Resume,
    Pause,
    SurfaceAvailable,
    SurfaceDestroyed,
}

#[cfg(target_os = "android")]
impl LifecycleSignal {
    pub fn from_poll_event(event: &slint::android::android_activity::PollEvent<'_>) -> Option<Self> {
        use slint::android::android_activity::{MainEvent, PollEvent};
        match event {
            PollEvent::Main(MainEvent::Resume { .. }) => Some(LifecycleSignal::Resume),
            PollEvent::Main(MainEvent::Pause) => Some(LifecycleSignal::Pause),
            PollEvent::Main(MainEvent::InitWindow { .. }) => Some(LifecycleSignal::SurfaceAvailable),
            PollEvent::Main(MainEvent::TerminateWindow { .. }) => {
                Some(LifecycleSignal::SurfaceDestroyed)
            }
            _ => None,
        }
    }
}

pub fn run(
    #[cfg(target_os = "android")]
    android_app: slint::android::AndroidApp,
    signals: Receiver<LifecycleSignal>,
) -> Result<()> {
    slint::slint! {
        import { Button, HorizontalBox } from "std-widgets.slint";
        export component MainWindow inherits Window {
            in-out property <image> camera-texture <=> camera-texture.source;
            callback open-camera(bool);

            Rectangle {
                width: 100%;
                height: 100%;
                background: black;
                HorizontalLayout {
                    padding: 0px;
                    alignment: center;
                    camera-texture := Image {
                        image-fit: contain;
                    }
                }
                Rectangle {
                    height: 40px;
                    width: 200px;
                    x: (parent.width/2 - self.width/2);
                    y: (parent.height - self.height);
                    HorizontalBox {
                        padding: 0px;
                        Button {
                            text: "Start";
                            clicked => {
                                open-camera(true);
                            }
                        }
                        Button {
                            text: "Stop";
                            clicked => {
                                open-camera(false);
                            }
                        }
                    }
                }
            }
        }
    }

    let app = MainWindow::new()?;
    let config = PreviewConfig::from_env();
    info!("preview config: {:?}", config);

    let (frame_sender, frame_receiver) = channel();

    #[cfg(target_os = "android")]
    let factory = PlatformHostFactory::new(android_app, frame_sender, config.clone());
    #[cfg(not(target_os = "android"))]
    let factory = PlatformHostFactory::new(frame_sender);

    let camera = Rc::new(RefCell::new(Camera::new(factory, config)));

    let app_weak = app.as_weak();
    let camera_clone = camera.clone();
    let mut surface_pending = false;
    let timer = Timer::default();
    timer.start(TimerMode::Repeated, Duration::from_millis(10), move || {
        let Some(app) = app_weak.upgrade() else {
            return;
        };
        let mut camera = camera_clone.borrow_mut();
        while let Ok(signal) = signals.try_recv() {
            info!("lifecycle signal: {:?}", signal);
            match signal {
                LifecycleSignal::Resume => {
                    if let Err(err) = camera.resume() {
                        error!("failed to start camera worker: {err:?}");
                    }
                }
                LifecycleSignal::Pause => camera.pause(),
                LifecycleSignal::SurfaceAvailable => surface_pending = true,
                LifecycleSignal::SurfaceDestroyed => {
                    surface_pending = false;
                    camera.surface_destroyed();
                }
            }
        }

        // The window only has a size once it is laid out.
        if surface_pending {
            let size = app.window().size();
            if size.width > 0 && size.height > 0 {
                camera.surface_available(OutputTarget::new(size.width, size.height));
                surface_pending = false;
            }
        }

        if let Some(buffer) = frame_receiver.try_iter().last() {
            app.set_camera_texture(Image::from_rgba8(buffer));
        }
    });

    let camera_clone = camera.clone();
    let permission_timer = Timer::default();
    permission_timer.start(TimerMode::Repeated, Duration::from_millis(500), move || {
        camera_clone.borrow_mut().poll_permission();
    });

    let camera_clone = camera.clone();
    app.on_open_camera(move |open| {
        let mut camera = camera_clone.borrow_mut();
        if open {
            if let Err(err) = camera.resume() {
                error!("failed to start camera worker: {err:?}");
            }
        } else {
            camera.pause();
        }
    });

    app.run()?;
    camera.borrow_mut().pause();
    Ok(())
}
