use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    thread::{self, JoinHandle},
    time::Instant,
};

use anyhow::{anyhow, Result};
use log::info;

/// A frame loop on its own thread, running until its flag is cleared.
pub struct FramePump {
    name: String,
    running: Arc<AtomicBool>,
    task: Option<JoinHandle<Result<()>>>,
}

impl FramePump {
    /// `pump` must return soon after the flag it is given reads false.
    pub fn spawn<F>(name: String, pump: F) -> Result<Self>
    where
        F: FnOnce(Arc<AtomicBool>) -> Result<()> + Send + 'static,
    {
        let running = Arc::new(AtomicBool::new(true));
        let flag = running.clone();
        let task = thread::Builder::new()
            .name(name.clone())
            .spawn(move || pump(flag))?;
        Ok(Self {
            name,
            running,
            task: Some(task),
        })
    }

    /// Clears the flag and waits for the current frame to finish.
    pub fn stop(mut self) -> Result<()> {
        self.running.store(false, Ordering::Release);
        let Some(task) = self.task.take() else {
            return Ok(());
        };
        let t = Instant::now();
        let res = task
            .join()
            .map_err(|_| anyhow!("{} panicked", self.name))?;
        info!("{} joined in {}ms", self.name, t.elapsed().as_millis());
        res
    }
}

impl Drop for FramePump {
    fn drop(&mut self) {
        self.running.store(false, Ordering::Release);
    }
}
