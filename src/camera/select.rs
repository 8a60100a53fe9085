use super::{LensFacing, PreviewSize};

/// First device, in enumeration order, whose lens points the requested way.
pub fn select_camera(devices: &[(String, LensFacing)], facing: LensFacing) -> Option<&str> {
    devices
        .iter()
        .find(|(_, lens)| *lens == facing)
        .map(|(id, _)| id.as_str())
}

/// Largest supported size within `cap`.
///
/// Falls back to the smallest supported size when nothing fits, and to `cap`
/// itself when the device reports no sizes at all.
pub fn choose_preview_size(supported: &[PreviewSize], cap: PreviewSize) -> PreviewSize {
    supported
        .iter()
        .filter(|size| size.fits_within(cap))
        .max_by_key(|size| size.area())
        .or_else(|| supported.iter().min_by_key(|size| size.area()))
        .copied()
        .unwrap_or(cap)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn devices(list: &[(&str, LensFacing)]) -> Vec<(String, LensFacing)> {
        list.iter().map(|(id, f)| (id.to_string(), *f)).collect()
    }

    #[test]
    fn back_camera_after_front() {
        let list = devices(&[("0", LensFacing::Front), ("1", LensFacing::Back)]);
        assert_eq!(select_camera(&list, LensFacing::Back), Some("1"));
    }

    #[test]
    fn first_match_wins() {
        let list = devices(&[
            ("0", LensFacing::Back),
            ("1", LensFacing::Front),
            ("2", LensFacing::Back),
        ]);
        assert_eq!(select_camera(&list, LensFacing::Back), Some("0"));
        assert_eq!(select_camera(&list, LensFacing::Front), Some("1"));
    }

    #[test]
    fn no_match_is_none() {
        let list = devices(&[("0", LensFacing::Front), ("1", LensFacing::External)]);
        assert_eq!(select_camera(&list, LensFacing::Back), None);
        assert_eq!(select_camera(&[], LensFacing::Front), None);
    }

    #[test]
    fn preview_size_is_largest_within_cap() {
        let cap = PreviewSize::new(1920, 1080);
        let supported = [
            PreviewSize::new(4032, 3024),
            PreviewSize::new(1280, 720),
            PreviewSize::new(1920, 1080),
            PreviewSize::new(640, 480),
        ];
        assert_eq!(choose_preview_size(&supported, cap), PreviewSize::new(1920, 1080));
    }

    #[test]
    fn preview_size_fallbacks() {
        let cap = PreviewSize::new(640, 480);
        let supported = [PreviewSize::new(1920, 1080), PreviewSize::new(1280, 720)];
        assert_eq!(choose_preview_size(&supported, cap), PreviewSize::new(1280, 720));
        assert_eq!(choose_preview_size(&[], cap), cap);
    }
}
