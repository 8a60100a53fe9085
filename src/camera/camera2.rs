use anyhow::{anyhow, Result};
use core::slice;
use jni::{
    objects::{JObject, JValueGen},
    sys::{JNIInvokeInterface_, _jobject, jint},
    JavaVM,
};
use log::{debug, error, info, warn};
use ndk_sys::{
    acamera_metadata_tag, camera_status_t, media_status_t, ACameraCaptureSession,
    ACameraCaptureSession_close, ACameraCaptureSession_setRepeatingRequest,
    ACameraCaptureSession_stateCallbacks, ACameraDevice, ACameraDevice_StateCallbacks,
    ACameraDevice_close, ACameraDevice_createCaptureRequest, ACameraDevice_createCaptureSession,
    ACameraDevice_request_template, ACameraManager, ACameraManager_create, ACameraManager_delete,
    ACameraManager_deleteCameraIdList, ACameraManager_getCameraCharacteristics,
    ACameraManager_getCameraIdList, ACameraManager_openCamera, ACameraMetadata,
    ACameraMetadata_const_entry, ACameraMetadata_free, ACameraMetadata_getConstEntry,
    ACameraOutputTarget, ACameraOutputTarget_create, ACameraOutputTarget_free, ACaptureRequest,
    ACaptureRequest_addTarget, ACaptureRequest_free, ACaptureRequest_setEntry_u8,
    ACaptureSessionOutput, ACaptureSessionOutputContainer, ACaptureSessionOutputContainer_add,
    ACaptureSessionOutputContainer_create, ACaptureSessionOutputContainer_free,
    ACaptureSessionOutput_create, ACaptureSessionOutput_free, AImage, AImageReader,
    AImageReader_ImageListener, AImageReader_acquireLatestImage, AImageReader_delete,
    AImageReader_getWindow, AImageReader_new, AImageReader_setImageListener, AImage_delete,
    AImage_getHeight, AImage_getPlaneData, AImage_getPlanePixelStride, AImage_getPlaneRowStride,
    AImage_getWidth, ANativeWindow, AIMAGE_FORMATS,
};
use slint::{Rgba8Pixel, SharedPixelBuffer};
use std::{
    ffi::{c_int, c_void, CStr, CString},
    mem::zeroed,
    ptr::null_mut,
    sync::{
        atomic::{AtomicBool, Ordering},
        mpsc::Sender,
        Arc,
    },
    time::Instant,
};

use super::{
    choose_preview_size, yuv::Yuv420, CameraError, CameraEvent, CameraHost, CameraResult,
    DeviceHandle, EventSink, HostFactory, LensFacing, OutputTarget, PreviewSize,
};
use crate::config::{PreviewConfig, CAMERA_PERMISSION};

#[link(name = "camera2ndk")]
extern "C" {}

#[link(name = "mediandk")]
extern "C" {}

const CONTROL_AF_MODE_CONTINUOUS_PICTURE: u8 = 4;

pub type FrameSender = Sender<SharedPixelBuffer<Rgba8Pixel>>;

#[derive(Clone)]
pub struct AndroidHostFactory {
    app: slint::android::AndroidApp,
    frame_sender: FrameSender,
    config: PreviewConfig,
    permission_requested: Arc<AtomicBool>,
}

impl AndroidHostFactory {
    pub fn new(app: slint::android::AndroidApp, frame_sender: FrameSender, config: PreviewConfig) -> Self {
        Self {
            app,
            frame_sender,
            config,
            permission_requested: Arc::new(AtomicBool::new(false)),
        }
    }
}

impl HostFactory for AndroidHostFactory {
    type Host = AndroidHost;

    fn make_host(&self, sink: EventSink<AndroidDevice>) -> AndroidHost {
        AndroidHost::new(self.clone(), sink)
    }

    // NativeActivity never sees onRequestPermissionsResult, so the UI polls.
    fn poll_permission(&self) -> Option<bool> {
        if !self.permission_requested.load(Ordering::Acquire) {
            return None;
        }
        match check_self_permission(&self.app, CAMERA_PERMISSION) {
            Ok(true) => {
                self.permission_requested.store(false, Ordering::Release);
                Some(true)
            }
            Ok(false) => None,
            Err(err) => {
                error!("checkSelfPermission failed: {err:?}");
                None
            }
        }
    }
}

/// Camera2 NDK host. Lives on the camera worker thread.
pub struct AndroidHost {
    factory: AndroidHostFactory,
    sink: EventSink<AndroidDevice>,
    manager: *mut ACameraManager,
}

impl AndroidHost {
    fn new(factory: AndroidHostFactory, sink: EventSink<AndroidDevice>) -> Self {
        let manager = unsafe { ACameraManager_create() };
        Self {
            factory,
            sink,
            manager,
        }
    }

    fn characteristics(&self, camera_id: &str) -> CameraResult<Metadata> {
        let id = CString::new(camera_id)
            .map_err(|err| CameraError::DeviceEnumeration(err.to_string()))?;
        let mut raw = null_mut();
        let camera_status =
            unsafe { ACameraManager_getCameraCharacteristics(self.manager, id.as_ptr(), &mut raw) };
        if camera_status != camera_status_t::ACAMERA_OK || raw.is_null() {
            return Err(CameraError::DeviceEnumeration(format!(
                "Failed to get camera meta data of {camera_id} (reason: {:?})",
                camera_status
            )));
        }
        Ok(Metadata(raw))
    }
}

impl Drop for AndroidHost {
    fn drop(&mut self) {
        if !self.manager.is_null() {
            unsafe { ACameraManager_delete(self.manager) };
            self.manager = null_mut();
        }
    }
}

impl CameraHost for AndroidHost {
    type Device = AndroidDevice;
    type Session = AndroidSession;

    fn has_permission(&mut self) -> CameraResult<bool> {
        let sdk_version = sdk_version(&self.factory.app)?;
        info!("sdk version:{sdk_version}");
        if sdk_version < 23 {
            return Ok(true);
        }
        Ok(check_self_permission(&self.factory.app, CAMERA_PERMISSION)?)
    }

    fn request_permission(&mut self, request_code: i32) -> CameraResult<()> {
        self.factory.permission_requested.store(true, Ordering::Release);
        request_permissions(&self.factory.app, &[CAMERA_PERMISSION], request_code)?;
        Ok(())
    }

    fn camera_ids(&mut self) -> CameraResult<Vec<String>> {
        unsafe {
            let mut camera_id_list_raw = null_mut();
            let camera_status =
                ACameraManager_getCameraIdList(self.manager, &mut camera_id_list_raw);
            if camera_status != camera_status_t::ACAMERA_OK {
                return Err(CameraError::DeviceEnumeration(format!(
                    "Failed to get camera id list (reason: {:?})",
                    camera_status
                )));
            }
            if camera_id_list_raw.is_null() {
                return Err(CameraError::DeviceEnumeration(
                    "camera id list is null".to_string(),
                ));
            }

            let camera_id_list = &*camera_id_list_raw;
            let camera_ids = if camera_id_list.numCameras < 1 || camera_id_list.cameraIds.is_null() {
                vec![]
            } else {
                slice::from_raw_parts(camera_id_list.cameraIds, camera_id_list.numCameras as usize)
                    .iter()
                    .filter_map(|id| get_cstr(*id).map(str::to_string))
                    .collect()
            };
            ACameraManager_deleteCameraIdList(camera_id_list_raw);
            info!("camera_ids: {:?}", camera_ids);
            Ok(camera_ids)
        }
    }

    fn lens_facing(&mut self, camera_id: &str) -> CameraResult<LensFacing> {
        let metadata = self.characteristics(camera_id)?;
        let value = metadata.lens_facing()?;
        LensFacing::from_metadata(value).ok_or_else(|| {
            CameraError::DeviceEnumeration(format!("unknown lens facing {value} on {camera_id}"))
        })
    }

    fn open_device(&mut self, camera_id: &str) -> CameraResult<()> {
        let access_error = |reason: String| CameraError::DeviceAccess {
            camera_id: camera_id.to_string(),
            reason,
        };
        let id = CString::new(camera_id).map_err(|err| access_error(err.to_string()))?;

        let context = Box::into_raw(Box::new(DeviceContext {
            camera_id: camera_id.to_string(),
            sink: self.sink.clone(),
        }));
        let mut callbacks = Box::new(ACameraDevice_StateCallbacks {
            context: context as *mut c_void,
            onDisconnected: Some(on_disconnected),
            onError: Some(on_error),
        });

        let mut raw = null_mut();
        let camera_status = unsafe {
            ACameraManager_openCamera(self.manager, id.as_ptr(), &mut *callbacks, &mut raw)
        };
        if camera_status != camera_status_t::ACAMERA_OK || raw.is_null() {
            drop(unsafe { Box::from_raw(context) });
            return Err(access_error(format!("{:?}", camera_status)));
        }

        // The NDK hands the device back synchronously; report it like the
        // Java API's onOpened would.
        let device = AndroidDevice {
            raw,
            camera_id: camera_id.to_string(),
            _callbacks: callbacks,
            context,
        };
        if !self.sink.send(CameraEvent::DeviceOpened(device)) {
            warn!("camera {camera_id} opened after the worker stopped");
        }
        Ok(())
    }

    fn bind_session(
        &mut self,
        device: &AndroidDevice,
        target: &OutputTarget,
    ) -> CameraResult<AndroidSession> {
        let cap = PreviewSize::new(
            self.factory.config.max_preview_width,
            self.factory.config.max_preview_height,
        );
        let supported = self.characteristics(&device.camera_id)?.yuv_sizes()?;
        let size = choose_preview_size(&supported, cap);
        info!("surface {} -> preview buffer {size}", target.size);

        let mut session = AndroidSession::new(FrameContext::new(self.factory.frame_sender.clone()));
        session
            .configure(device, size, self.factory.config.max_images)
            .map_err(|err| CameraError::SessionConfiguration(err.to_string()))?;
        Ok(session)
    }

    fn start_repeating(&mut self, session: &mut AndroidSession) -> CameraResult<()> {
        let camera_status = unsafe {
            ACameraCaptureSession_setRepeatingRequest(
                session.session,
                null_mut(),
                1,
                &mut session.request,
                null_mut(),
            )
        };
        if camera_status != camera_status_t::ACAMERA_OK {
            return Err(CameraError::SessionConfiguration(format!(
                "Failed to set repeating request (reason: {:?})",
                camera_status
            )));
        }
        Ok(())
    }

    fn close_session(&mut self, session: AndroidSession) {
        drop(session);
        info!("Close capture session");
    }

    fn close_device(&mut self, device: AndroidDevice) {
        let camera_id = device.camera_id.clone();
        drop(device);
        info!("Close Camera {camera_id}");
    }

    fn finish(&mut self) {
        if let Err(err) = finish_activity(&self.factory.app) {
            error!("failed to finish activity: {err:?}");
        }
    }
}

struct DeviceContext {
    camera_id: String,
    sink: EventSink<AndroidDevice>,
}

unsafe extern "C" fn on_disconnected(context: *mut c_void, _device: *mut ACameraDevice) {
    let context = &*(context as *const DeviceContext);
    info!("Camera(id: {}) is disconnected.", context.camera_id);
    context.sink.send(CameraEvent::DeviceDisconnected {
        camera_id: context.camera_id.clone(),
    });
}

unsafe extern "C" fn on_error(context: *mut c_void, _device: *mut ACameraDevice, error: c_int) {
    let context = &*(context as *const DeviceContext);
    error!("Error(code: {}) on Camera(id: {}).", error, context.camera_id);
    context.sink.send(CameraEvent::DeviceError {
        camera_id: context.camera_id.clone(),
        code: error,
    });
}

/// An opened `ACameraDevice`. Closed when dropped.
pub struct AndroidDevice {
    raw: *mut ACameraDevice,
    camera_id: String,
    _callbacks: Box<ACameraDevice_StateCallbacks>,
    context: *mut DeviceContext,
}

// Created on the worker thread and only ever used there; it merely passes
// through the worker's own queue.
unsafe impl Send for AndroidDevice {}

impl DeviceHandle for AndroidDevice {
    fn camera_id(&self) -> &str {
        &self.camera_id
    }
}

impl Drop for AndroidDevice {
    fn drop(&mut self) {
        unsafe {
            if !self.raw.is_null() {
                let camera_status = ACameraDevice_close(self.raw);
                if camera_status != camera_status_t::ACAMERA_OK {
                    error!("Failed to close CameraDevice.");
                }
                self.raw = null_mut();
            }
            // No callbacks after close.
            if !self.context.is_null() {
                drop(Box::from_raw(self.context));
                self.context = null_mut();
            }
        }
    }
}

struct Metadata(*mut ACameraMetadata);

impl Metadata {
    fn entry(&self, tag: acamera_metadata_tag) -> CameraResult<ACameraMetadata_const_entry> {
        unsafe {
            let mut entry: ACameraMetadata_const_entry = zeroed();
            let camera_status = ACameraMetadata_getConstEntry(self.0, tag.0, &mut entry);
            if camera_status != camera_status_t::ACAMERA_OK {
                return Err(CameraError::DeviceEnumeration(format!(
                    "Failed to get ACameraMetadata_const_entry res={:?}",
                    camera_status
                )));
            }
            Ok(entry)
        }
    }

    fn lens_facing(&self) -> CameraResult<u8> {
        let entry = self.entry(acamera_metadata_tag::ACAMERA_LENS_FACING)?;
        if entry.count < 1 {
            return Err(CameraError::DeviceEnumeration("lens facing missing".to_string()));
        }
        Ok(unsafe { *entry.data.u8_ })
    }

    /// YUV_420_888 output sizes. Entries are (format, width, height, input).
    fn yuv_sizes(&self) -> CameraResult<Vec<PreviewSize>> {
        let entry =
            self.entry(acamera_metadata_tag::ACAMERA_SCALER_AVAILABLE_STREAM_CONFIGURATIONS)?;
        let data: &[i32] = if entry.count == 0 {
            &[]
        } else {
            unsafe { slice::from_raw_parts(entry.data.i32_, entry.count as usize) }
        };
        let sizes = data
            .chunks_exact(4)
            .filter(|config| {
                config[3] == 0 && config[0] == AIMAGE_FORMATS::AIMAGE_FORMAT_YUV_420_888.0 as i32
            })
            .map(|config| PreviewSize::new(config[1] as u32, config[2] as u32))
            .collect::<Vec<_>>();
        debug!("YUV_420 sizes: {:?}", sizes);
        Ok(sizes)
    }
}

impl Drop for Metadata {
    fn drop(&mut self) {
        unsafe { ACameraMetadata_free(self.0) };
    }
}

/// Everything a running preview holds: the image reader standing in for the
/// output surface, the request and the capture session. Released in reverse.
pub struct AndroidSession {
    image_reader: *mut AImageReader,
    image_listener: Box<AImageReader_ImageListener>,
    frames: *mut FrameContext,
    session_output: *mut ACaptureSessionOutput,
    output_container: *mut ACaptureSessionOutputContainer,
    output_target: *mut ACameraOutputTarget,
    request: *mut ACaptureRequest,
    session_callbacks: Box<ACameraCaptureSession_stateCallbacks>,
    session: *mut ACameraCaptureSession,
}

impl AndroidSession {
    fn new(frames: FrameContext) -> Self {
        Self {
            image_reader: null_mut(),
            image_listener: Box::new(AImageReader_ImageListener {
                context: null_mut(),
                onImageAvailable: None,
            }),
            frames: Box::into_raw(Box::new(frames)),
            session_output: null_mut(),
            output_container: null_mut(),
            output_target: null_mut(),
            request: null_mut(),
            session_callbacks: Box::new(unsafe { zeroed() }),
            session: null_mut(),
        }
    }

    fn configure(&mut self, device: &AndroidDevice, size: PreviewSize, max_images: i32) -> Result<()> {
        unsafe {
            let res = AImageReader_new(
                size.width as i32,
                size.height as i32,
                AIMAGE_FORMATS::AIMAGE_FORMAT_YUV_420_888.0 as i32,
                max_images,
                &mut self.image_reader,
            );
            if res != media_status_t::AMEDIA_OK {
                return Err(anyhow!("create Image Reader error res={:?}.", res));
            }

            self.image_listener.context = self.frames as *mut c_void;
            self.image_listener.onImageAvailable = Some(on_image_available);
            let res = AImageReader_setImageListener(self.image_reader, &mut *self.image_listener);
            if res != media_status_t::AMEDIA_OK {
                return Err(anyhow!("set Image Listener error res={:?}.", res));
            }

            let mut native_window: *mut ANativeWindow = null_mut();
            let res = AImageReader_getWindow(self.image_reader, &mut native_window);
            if res != media_status_t::AMEDIA_OK {
                return Err(anyhow!("AImageReader_getWindow error res={:?}.", res));
            }

            let camera_status = ACaptureSessionOutputContainer_create(&mut self.output_container);
            if camera_status != camera_status_t::ACAMERA_OK {
                return Err(anyhow!(
                    "Failed to create capture session output container (reason: {:?})",
                    camera_status
                ));
            }
            let camera_status = ACaptureSessionOutput_create(native_window, &mut self.session_output);
            if camera_status != camera_status_t::ACAMERA_OK {
                return Err(anyhow!(
                    "Failed to create capture session output (reason: {:?})",
                    camera_status
                ));
            }
            ACaptureSessionOutputContainer_add(self.output_container, self.session_output);

            let camera_status = ACameraDevice_createCaptureRequest(
                device.raw,
                ACameraDevice_request_template::TEMPLATE_PREVIEW,
                &mut self.request,
            );
            if camera_status != camera_status_t::ACAMERA_OK {
                return Err(anyhow!(
                    "Failed to create preview capture request (id: {})",
                    device.camera_id
                ));
            }
            ACameraOutputTarget_create(native_window, &mut self.output_target);
            ACaptureRequest_addTarget(self.request, self.output_target);
            let af_mode = CONTROL_AF_MODE_CONTINUOUS_PICTURE;
            let camera_status = ACaptureRequest_setEntry_u8(
                self.request,
                acamera_metadata_tag::ACAMERA_CONTROL_AF_MODE.0,
                1,
                &af_mode,
            );
            if camera_status != camera_status_t::ACAMERA_OK {
                warn!("continuous autofocus unavailable (reason: {:?})", camera_status);
            }

            self.session_callbacks.onReady = Some(capture_session_on_ready);
            self.session_callbacks.onActive = Some(capture_session_on_active);
            self.session_callbacks.onClosed = Some(capture_session_on_closed);

            let camera_status = ACameraDevice_createCaptureSession(
                device.raw,
                self.output_container,
                &*self.session_callbacks,
                &mut self.session,
            );
            if camera_status != camera_status_t::ACAMERA_OK {
                return Err(anyhow!(
                    "Failed to create capture session (reason: {:?})",
                    camera_status
                ));
            }
        }
        Ok(())
    }
}

// Only touched from the worker thread, like the device it was bound to.
unsafe impl Send for AndroidSession {}

impl Drop for AndroidSession {
    fn drop(&mut self) {
        unsafe {
            if !self.session.is_null() {
                ACameraCaptureSession_close(self.session);
                self.session = null_mut();
            }
            if !self.image_reader.is_null() {
                AImageReader_delete(self.image_reader);
                self.image_reader = null_mut();
            }
            // The reader is gone, so the listener can't reach the frames any more.
            if !self.frames.is_null() {
                drop(Box::from_raw(self.frames));
                self.frames = null_mut();
            }
            if !self.request.is_null() {
                ACaptureRequest_free(self.request);
                self.request = null_mut();
            }
            if !self.output_target.is_null() {
                ACameraOutputTarget_free(self.output_target);
                self.output_target = null_mut();
            }
            if !self.session_output.is_null() {
                ACaptureSessionOutput_free(self.session_output);
                self.session_output = null_mut();
            }
            if !self.output_container.is_null() {
                ACaptureSessionOutputContainer_free(self.output_container);
                self.output_container = null_mut();
            }
        }
    }
}

unsafe extern "C" fn capture_session_on_ready(_context: *mut c_void, session: *mut ACameraCaptureSession) {
    info!("Session is ready. {:?}", session);
}

unsafe extern "C" fn capture_session_on_active(_context: *mut c_void, session: *mut ACameraCaptureSession) {
    info!("Session is activated. {:?}", session);
}

unsafe extern "C" fn capture_session_on_closed(_context: *mut c_void, session: *mut ACameraCaptureSession) {
    info!("Session is closed. {:?}", session);
}

unsafe extern "C" fn on_image_available(context: *mut c_void, image_reader: *mut AImageReader) {
    let frames = &mut *(context as *mut FrameContext);
    if let Err(err) = frames.on_image_available(image_reader) {
        debug!("on_image_available: {err:?}");
    }
}

/// Converts reader images to RGBA and passes them to the window.
struct FrameContext {
    frame_sender: FrameSender,
    rgba_buffer: Vec<u8>,
    timer: Instant,
    frame_count: i32,
}

struct ImageGuard(*mut AImage);

impl Drop for ImageGuard {
    fn drop(&mut self) {
        unsafe { AImage_delete(self.0) };
    }
}

impl FrameContext {
    fn new(frame_sender: FrameSender) -> Self {
        Self {
            frame_sender,
            rgba_buffer: vec![],
            timer: Instant::now(),
            frame_count: 0,
        }
    }

    fn on_image_available(&mut self, image_reader: *mut AImageReader) -> Result<()> {
        unsafe {
            let mut image = null_mut();
            let media_status = AImageReader_acquireLatestImage(image_reader, &mut image);
            if media_status != media_status_t::AMEDIA_OK {
                let msg = if media_status == media_status_t::AMEDIA_IMGREADER_NO_BUFFER_AVAILABLE {
                    "An image reader frame was discarded".to_string()
                } else {
                    format!(
                        "Failed to acquire latest image from image reader, error: {:?}.",
                        media_status
                    )
                };
                return Err(anyhow!("{msg}"));
            }
            let image = ImageGuard(image);

            let mut width = 0;
            let mut height = 0;
            AImage_getWidth(image.0, &mut width);
            AImage_getHeight(image.0, &mut height);

            let mut y_stride = 0;
            let mut uv_stride = 0;
            let mut uv_pixel_stride = 0;
            let mut y_pixel = null_mut();
            let mut u_pixel = null_mut();
            let mut v_pixel = null_mut();
            let mut y_len = 0;
            let mut u_len = 0;
            let mut v_len = 0;

            AImage_getPlaneRowStride(image.0, 0, &mut y_stride);
            AImage_getPlaneRowStride(image.0, 1, &mut uv_stride);
            AImage_getPlanePixelStride(image.0, 1, &mut uv_pixel_stride);
            AImage_getPlaneData(image.0, 0, &mut y_pixel, &mut y_len);
            AImage_getPlaneData(image.0, 1, &mut u_pixel, &mut u_len);
            AImage_getPlaneData(image.0, 2, &mut v_pixel, &mut v_len);
            if y_pixel.is_null() || u_pixel.is_null() || v_pixel.is_null() {
                return Err(anyhow!("image without plane data"));
            }

            let frame = Yuv420 {
                width: width as usize,
                height: height as usize,
                y: slice::from_raw_parts(y_pixel, y_len as usize),
                u: slice::from_raw_parts(u_pixel, u_len as usize),
                v: slice::from_raw_parts(v_pixel, v_len as usize),
                y_row_stride: y_stride as usize,
                uv_row_stride: uv_stride as usize,
                uv_pixel_stride: uv_pixel_stride as usize,
            };
            frame.to_rgba(&mut self.rgba_buffer)?;
            drop(image);

            let buf = SharedPixelBuffer::clone_from_slice(&self.rgba_buffer, width as u32, height as u32);
            self.frame_sender.send(buf).map_err(|err| anyhow!("{:?}", err))?;
        }

        self.frame_count += 1;
        if self.timer.elapsed().as_millis() > 1000 {
            debug!("preview FPS:{}", self.frame_count);
            self.timer = Instant::now();
            self.frame_count = 0;
        }
        Ok(())
    }
}

pub fn sdk_version(app: &slint::android::AndroidApp) -> Result<i32> {
    unsafe {
        let vm = JavaVM::from_raw(app.vm_as_ptr() as *mut *const JNIInvokeInterface_)?;
        let mut env = vm.attach_current_thread()?;
        Ok(env
            .get_static_field("android/os/Build$VERSION", "SDK_INT", "I")?
            .i()?)
    }
}

pub fn check_self_permission(app: &slint::android::AndroidApp, permission: &str) -> Result<bool> {
    unsafe {
        let vm = JavaVM::from_raw(app.vm_as_ptr() as *mut *const JNIInvokeInterface_)?;
        let mut env = vm.attach_current_thread()?;
        let granted_int = env
            .get_static_field(
                "android/content/pm/PackageManager",
                "PERMISSION_GRANTED",
                "I",
            )?
            .i()?;
        let permission_str = env.new_string(permission)?;
        let activity: JObject<'_> = JObject::from_raw(app.activity_as_ptr() as *mut _jobject);
        let result = env
            .call_method(
                activity,
                "checkSelfPermission",
                "(Ljava/lang/String;)I",
                &[JValueGen::Object(&JObject::from(permission_str))],
            )?
            .i()?;
        Ok(result == granted_int)
    }
}

pub fn request_permissions(
    app: &slint::android::AndroidApp,
    permissions: &[&str],
    request_code: i32,
) -> Result<()> {
    unsafe {
        let vm = JavaVM::from_raw(app.vm_as_ptr() as *mut *const JNIInvokeInterface_)?;
        let mut env = vm.attach_current_thread()?;
        let activity: JObject<'_> = JObject::from_raw(app.activity_as_ptr() as *mut _jobject);

        let permission_count = permissions.len() as jint;
        let java_permission_array =
            env.new_object_array(permission_count, "java/lang/String", JObject::null())?;
        for (index, permission) in permissions.iter().enumerate() {
            let permission_str = env.new_string(*permission)?;
            env.set_object_array_element(&java_permission_array, index as jint, permission_str)?;
        }

        let _ = env.call_method(
            activity,
            "requestPermissions",
            "([Ljava/lang/String;I)V",
            &[
                JValueGen::Object(&JObject::from(java_permission_array)),
                request_code.into(),
            ],
        )?;
    }
    info!("requested {:?} (code {request_code})", permissions);
    Ok(())
}

pub fn finish_activity(app: &slint::android::AndroidApp) -> Result<()> {
    unsafe {
        let vm = JavaVM::from_raw(app.vm_as_ptr() as *mut *const JNIInvokeInterface_)?;
        let mut env = vm.attach_current_thread()?;
        let activity: JObject<'_> = JObject::from_raw(app.activity_as_ptr() as *mut _jobject);
        env.call_method(activity, "finish", "()V", &[])?;
    }
    Ok(())
}

pub unsafe fn get_cstr<'a>(s: *const ::std::os::raw::c_char) -> Option<&'a str> {
    if s.is_null() {
        return None;
    }
    CStr::from_ptr(s).to_str().ok()
}
