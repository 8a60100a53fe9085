#[cfg(not(target_os = "android"))]
fn main() -> anyhow::Result<()> {
    use slint_camera_preview::app::{self, LifecycleSignal};

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // A desktop window is resumed and has its surface as soon as it shows.
    let (signal_sender, signal_receiver) = std::sync::mpsc::channel();
    signal_sender.send(LifecycleSignal::Resume)?;
    signal_sender.send(LifecycleSignal::SurfaceAvailable)?;
    app::run(signal_receiver)
}

#[cfg(target_os = "android")]
fn main() {}
