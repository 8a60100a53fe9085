use std::env;

use log::warn;

use crate::camera::LensFacing;

/// Permission requested before any camera is touched.
pub const CAMERA_PERMISSION: &str = "android.permission.CAMERA";

/// Request code attached to camera permission requests.
pub const REQUEST_CAMERA_PERMISSION: i32 = 100;

pub const MAX_PREVIEW_WIDTH: u32 = 1920;
pub const MAX_PREVIEW_HEIGHT: u32 = 1080;

/// Knobs for one preview screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewConfig {
    /// Which lens to look for when selecting a device.
    pub facing: LensFacing,
    pub max_preview_width: u32,
    pub max_preview_height: u32,
    pub permission_request_code: i32,
    /// How many times a denied permission is asked for again.
    /// `None` re-prompts forever.
    pub permission_retry_limit: Option<u32>,
    pub worker_thread_name: String,
    /// Buffers held by the Android image reader.
    pub max_images: i32,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            #[cfg(target_os = "android")]
            facing: LensFacing::Back,
            #[cfg(not(target_os = "android"))]
            facing: LensFacing::External,
            max_preview_width: MAX_PREVIEW_WIDTH,
            max_preview_height: MAX_PREVIEW_HEIGHT,
            permission_request_code: REQUEST_CAMERA_PERMISSION,
            permission_retry_limit: Some(3),
            worker_thread_name: "camera-worker".to_string(),
            max_images: 2,
        }
    }
}

impl PreviewConfig {
    /// Defaults overridden by `CAMERA_PREVIEW_*` environment variables.
    pub fn from_env() -> Self {
        Self::default().with_overrides(|key| env::var(key).ok())
    }

    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(value) = lookup("CAMERA_PREVIEW_FACING") {
            match LensFacing::parse(&value) {
                Some(facing) => self.facing = facing,
                None => warn!("ignoring CAMERA_PREVIEW_FACING={value:?}"),
            }
        }
        if let Some(width) = parse_number(&lookup, "CAMERA_PREVIEW_MAX_WIDTH") {
            self.max_preview_width = width;
        }
        if let Some(height) = parse_number(&lookup, "CAMERA_PREVIEW_MAX_HEIGHT") {
            self.max_preview_height = height;
        }
        if let Some(value) = lookup("CAMERA_PREVIEW_PERMISSION_RETRIES") {
            if value.eq_ignore_ascii_case("unlimited") {
                self.permission_retry_limit = None;
            } else {
                match value.parse() {
                    Ok(limit) => self.permission_retry_limit = Some(limit),
                    Err(_) => warn!("ignoring CAMERA_PREVIEW_PERMISSION_RETRIES={value:?}"),
                }
            }
        }
        self
    }
}

fn parse_number(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<u32> {
    let value = lookup(key)?;
    match value.parse::<u32>() {
        Ok(n) if n > 0 => Some(n),
        _ => {
            warn!("ignoring {key}={value:?}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_match_preview_constants() {
        let config = PreviewConfig::default();
        assert_eq!(config.max_preview_width, 1920);
        assert_eq!(config.max_preview_height, 1080);
        assert_eq!(config.permission_request_code, 100);
        assert_eq!(config.permission_retry_limit, Some(3));
    }

    #[test]
    fn overrides_apply() {
        let config = PreviewConfig::default().with_overrides(lookup(&[
            ("CAMERA_PREVIEW_FACING", "front"),
            ("CAMERA_PREVIEW_MAX_WIDTH", "1280"),
            ("CAMERA_PREVIEW_PERMISSION_RETRIES", "unlimited"),
        ]));
        assert_eq!(config.facing, LensFacing::Front);
        assert_eq!(config.max_preview_width, 1280);
        assert_eq!(config.max_preview_height, 1080);
        assert_eq!(config.permission_retry_limit, None);
    }

    #[test]
    fn bad_values_are_ignored() {
        let config = PreviewConfig::default().with_overrides(lookup(&[
            ("CAMERA_PREVIEW_FACING", "sideways"),
            ("CAMERA_PREVIEW_MAX_HEIGHT", "0"),
            ("CAMERA_PREVIEW_PERMISSION_RETRIES", "lots"),
        ]));
        assert_eq!(config, PreviewConfig::default());
    }
}
