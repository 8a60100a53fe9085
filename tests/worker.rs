use std::{
    sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Arc, Mutex,
    },
    thread,
    time::{Duration, Instant},
};

use slint_camera_preview::{
    camera::{
        Camera, CameraEvent, CameraHost, CameraResult, DeviceHandle, EventSink, HostFactory,
        LensFacing, OutputTarget,
    },
    config::PreviewConfig,
};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Op {
    RequestPermission,
    Open(String),
    Bind(String),
    Start(String),
    CloseSession(String),
    CloseDevice(String),
}

#[derive(Debug)]
struct TestDevice(String);

impl DeviceHandle for TestDevice {
    fn camera_id(&self) -> &str {
        &self.0
    }
}

struct TestSession(String);

#[derive(Clone, Default)]
struct TestFactory {
    ops: Arc<Mutex<Vec<Op>>>,
    hosts: Arc<AtomicUsize>,
    denied: bool,
    permission_answered: Arc<AtomicBool>,
    sink: Arc<Mutex<Option<EventSink<TestDevice>>>>,
}

impl TestFactory {
    fn ops(&self) -> Vec<Op> {
        self.ops.lock().unwrap().clone()
    }

    fn wait_for(&self, op: Op) {
        let start = Instant::now();
        while !self.ops().contains(&op) {
            assert!(start.elapsed() < Duration::from_secs(5), "timed out waiting for {op:?}");
            thread::sleep(Duration::from_millis(5));
        }
    }
}

struct TestHost {
    factory: TestFactory,
    sink: EventSink<TestDevice>,
}

impl TestHost {
    fn record(&self, op: Op) {
        self.factory.ops.lock().unwrap().push(op);
    }
}

impl HostFactory for TestFactory {
    type Host = TestHost;

    fn make_host(&self, sink: EventSink<TestDevice>) -> TestHost {
        self.hosts.fetch_add(1, Ordering::SeqCst);
        *self.sink.lock().unwrap() = Some(sink.clone());
        TestHost {
            factory: self.clone(),
            sink,
        }
    }

    fn poll_permission(&self) -> Option<bool> {
        if self.permission_answered.swap(false, Ordering::SeqCst) {
            Some(true)
        } else {
            None
        }
    }
}

impl CameraHost for TestHost {
    type Device = TestDevice;
    type Session = TestSession;

    fn has_permission(&mut self) -> CameraResult<bool> {
        Ok(!self.factory.denied)
    }

    fn request_permission(&mut self, _request_code: i32) -> CameraResult<()> {
        self.record(Op::RequestPermission);
        Ok(())
    }

    fn camera_ids(&mut self) -> CameraResult<Vec<String>> {
        Ok(vec!["0".to_string(), "1".to_string()])
    }

    fn lens_facing(&mut self, camera_id: &str) -> CameraResult<LensFacing> {
        Ok(if camera_id == "0" {
            LensFacing::Front
        } else {
            LensFacing::Back
        })
    }

    fn open_device(&mut self, camera_id: &str) -> CameraResult<()> {
        self.record(Op::Open(camera_id.to_string()));
        self.sink
            .send(CameraEvent::DeviceOpened(TestDevice(camera_id.to_string())));
        Ok(())
    }

    fn bind_session(
        &mut self,
        device: &TestDevice,
        _target: &OutputTarget,
    ) -> CameraResult<TestSession> {
        self.record(Op::Bind(device.0.clone()));
        Ok(TestSession(device.0.clone()))
    }

    fn start_repeating(&mut self, session: &mut TestSession) -> CameraResult<()> {
        self.record(Op::Start(session.0.clone()));
        Ok(())
    }

    fn close_session(&mut self, session: TestSession) {
        self.record(Op::CloseSession(session.0));
    }

    fn close_device(&mut self, device: TestDevice) {
        self.record(Op::CloseDevice(device.0));
    }

    fn finish(&mut self) {}
}

fn config() -> PreviewConfig {
    PreviewConfig {
        facing: LensFacing::Back,
        ..PreviewConfig::default()
    }
}

fn surface() -> OutputTarget {
    OutputTarget::new(720, 1280)
}

#[test]
fn preview_starts_and_pause_tears_down_in_order() {
    let factory = TestFactory::default();
    let mut camera = Camera::new(factory.clone(), config());
    camera.resume().unwrap();
    camera.surface_available(surface());
    factory.wait_for(Op::Start("1".to_string()));

    camera.pause();
    assert!(!camera.is_running());
    assert_eq!(
        factory.ops(),
        vec![
            Op::Open("1".to_string()),
            Op::Bind("1".to_string()),
            Op::Start("1".to_string()),
            Op::CloseSession("1".to_string()),
            Op::CloseDevice("1".to_string()),
        ]
    );
}

#[test]
fn double_resume_keeps_one_worker() {
    let factory = TestFactory::default();
    let mut camera = Camera::new(factory.clone(), config());
    camera.resume().unwrap();
    camera.resume().unwrap();
    camera.surface_available(surface());
    factory.wait_for(Op::Start("1".to_string()));
    camera.pause();

    assert_eq!(factory.hosts.load(Ordering::SeqCst), 1);
    let opens = factory
        .ops()
        .iter()
        .filter(|op| matches!(op, Op::Open(_)))
        .count();
    assert_eq!(opens, 1);
}

#[test]
fn resume_after_pause_reopens_with_known_surface() {
    let factory = TestFactory::default();
    let mut camera = Camera::new(factory.clone(), config());
    camera.surface_available(surface());
    camera.resume().unwrap();
    factory.wait_for(Op::Start("1".to_string()));
    camera.pause();

    camera.resume().unwrap();
    let start = Instant::now();
    while factory
        .ops()
        .iter()
        .filter(|op| matches!(op, Op::Start(_)))
        .count()
        < 2
    {
        assert!(start.elapsed() < Duration::from_secs(5));
        thread::sleep(Duration::from_millis(5));
    }
    camera.pause();
    assert_eq!(factory.hosts.load(Ordering::SeqCst), 2);
    assert_eq!(factory.ops().last(), Some(&Op::CloseDevice("1".to_string())));
}

#[test]
fn polled_permission_grant_opens_camera() {
    let factory = TestFactory {
        denied: true,
        ..TestFactory::default()
    };
    let mut camera = Camera::new(factory.clone(), config());
    camera.resume().unwrap();
    camera.surface_available(surface());
    factory.wait_for(Op::RequestPermission);

    camera.poll_permission();
    assert!(factory.ops().iter().all(|op| !matches!(op, Op::Open(_))));

    factory.permission_answered.store(true, Ordering::SeqCst);
    camera.poll_permission();
    factory.wait_for(Op::Start("1".to_string()));
    camera.pause();
}

#[test]
fn disconnect_from_platform_thread_closes_device_once() {
    let factory = TestFactory::default();
    let mut camera = Camera::new(factory.clone(), config());
    camera.resume().unwrap();
    camera.surface_available(surface());
    factory.wait_for(Op::Start("1".to_string()));

    let sink = factory.sink.lock().unwrap().clone().unwrap();
    thread::spawn(move || {
        sink.send(CameraEvent::DeviceDisconnected {
            camera_id: "1".to_string(),
        });
    })
    .join()
    .unwrap();
    factory.wait_for(Op::CloseDevice("1".to_string()));

    camera.pause();
    let closes = factory
        .ops()
        .iter()
        .filter(|op| **op == Op::CloseDevice("1".to_string()))
        .count();
    assert_eq!(closes, 1);
}

#[test]
fn permission_limit_holds_across_activations() {
    let factory = TestFactory {
        denied: true,
        ..TestFactory::default()
    };
    let mut camera = Camera::new(factory.clone(), config());
    camera.surface_available(surface());
    for _ in 0..8 {
        camera.resume().unwrap();
        camera.pause();
    }

    let requests = factory
        .ops()
        .iter()
        .filter(|op| **op == Op::RequestPermission)
        .count();
    assert_eq!(requests, 4);
    assert_eq!(camera.permission_requests(), 4);
    assert_eq!(factory.hosts.load(Ordering::SeqCst), 8);
}

#[test]
fn pause_without_resume_is_harmless() {
    let factory = TestFactory::default();
    let mut camera = Camera::new(factory.clone(), config());
    camera.pause();
    camera.permission_result(100, true);
    assert!(factory.ops().is_empty());
    assert_eq!(factory.hosts.load(Ordering::SeqCst), 0);
}
