pub mod app;
pub mod camera;
pub mod config;

#[cfg(target_os = "android")]
#[no_mangle]
fn android_main(app: slint::android::AndroidApp) {
    use log::{error, LevelFilter};

    android_logger::init_once(
        android_logger::Config::default()
            .with_max_level(LevelFilter::Info)
            .with_tag("camera_preview"),
    );

    let (signal_sender, signal_receiver) = std::sync::mpsc::channel();
    let res = slint::android::init_with_event_listener(app.clone(), move |event| {
        if let Some(signal) = app::LifecycleSignal::from_poll_event(event) {
            let _ = signal_sender.send(signal);
        }
    });
    if let Err(err) = res {
        error!("failed to init slint: {err:?}");
        return;
    }
    if let Err(err) = app::run(app, signal_receiver) {
        error!("{err:?}");
    }
}
