use anyhow::{anyhow, Result};

/// One YUV_420_888 frame as the image reader hands it out: three planes with
/// their own strides. U and V may interleave (pixel stride 2).
pub struct Yuv420<'a> {
    pub width: usize,
    pub height: usize,
    pub y: &'a [u8],
    pub u: &'a [u8],
    pub v: &'a [u8],
    pub y_row_stride: usize,
    pub uv_row_stride: usize,
    pub uv_pixel_stride: usize,
}

impl<'a> Yuv420<'a> {
    /// Writes `width * height` RGBA pixels into `rgba`, resizing it as needed.
    pub fn to_rgba(&self, rgba: &mut Vec<u8>) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(anyhow!("empty frame {}x{}", self.width, self.height));
        }
        let y_needed = (self.height - 1) * self.y_row_stride + self.width;
        let uv_needed = ((self.height - 1) / 2) * self.uv_row_stride
            + ((self.width - 1) / 2) * self.uv_pixel_stride
            + 1;
        if self.y.len() < y_needed || self.u.len() < uv_needed || self.v.len() < uv_needed {
            return Err(anyhow!(
                "short planes for {}x{}: y={} u={} v={}",
                self.width,
                self.height,
                self.y.len(),
                self.u.len(),
                self.v.len()
            ));
        }

        rgba.resize(self.width * self.height * 4, 0);
        for (row, line) in rgba.chunks_exact_mut(self.width * 4).enumerate() {
            let y_row = &self.y[row * self.y_row_stride..];
            let uv_row = (row / 2) * self.uv_row_stride;
            for (col, pixel) in line.chunks_exact_mut(4).enumerate() {
                let uv = uv_row + (col / 2) * self.uv_pixel_stride;
                pixel.copy_from_slice(&yuv_to_rgba(y_row[col], self.u[uv], self.v[uv]));
            }
        }
        Ok(())
    }
}

/// Fixed point BT.601, video range.
fn yuv_to_rgba(y: u8, u: u8, v: u8) -> [u8; 4] {
    let y = (y as i32 - 16).max(0) * 1192;
    let u = u as i32 - 128;
    let v = v as i32 - 128;

    let r = y + 1634 * v;
    let g = y - 833 * v - 400 * u;
    let b = y + 2066 * u;

    let clamp = |c: i32| (c.clamp(0, 262143) >> 10) as u8;
    [clamp(r), clamp(g), clamp(b), 255]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn neutral_chroma_is_gray() {
        assert_eq!(yuv_to_rgba(16, 128, 128), [0, 0, 0, 255]);
        assert_eq!(yuv_to_rgba(128, 128, 128), [130, 130, 130, 255]);
        assert_eq!(yuv_to_rgba(235, 128, 128), [254, 254, 254, 255]);
    }

    #[test]
    fn interleaved_chroma_with_padding() {
        // 2x2 frame, luma rows padded to 4 bytes, VU interleaved like NV21.
        let y = [128, 128, 0, 0, 128, 128];
        let vu = [255, 128];
        let frame = Yuv420 {
            width: 2,
            height: 2,
            y: &y,
            u: &vu[1..],
            v: &vu[..],
            y_row_stride: 4,
            uv_row_stride: 4,
            uv_pixel_stride: 2,
        };
        let mut rgba = vec![];
        frame.to_rgba(&mut rgba).unwrap();
        assert_eq!(rgba.len(), 16);
        for pixel in rgba.chunks(4) {
            assert_eq!(pixel, [255, 27, 130, 255]);
        }
    }

    #[test]
    fn short_planes_are_rejected() {
        let y = [0u8; 3];
        let uv = [128u8; 1];
        let frame = Yuv420 {
            width: 2,
            height: 2,
            y: &y,
            u: &uv,
            v: &uv,
            y_row_stride: 2,
            uv_row_stride: 2,
            uv_pixel_stride: 1,
        };
        assert!(frame.to_rgba(&mut vec![]).is_err());
    }
}
