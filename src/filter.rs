//! Built-in neighborhood-average filter.
//!
//! This is the reference semantics for any replace-image filter working
//! on a box neighborhood: every output pixel is the per-channel average
//! of the clipped `(2k+1) x (2k+1)` box around it, computed from a
//! snapshot of the pre-filter buffer so the sweep order cannot feed
//! already-filtered pixels back into the accumulation.

use crate::buffer::ImageBuffer;
use crate::plugin::abi::LColor;

/// Apply a box-average blur with kernel radius `radius` in place.
///
/// Radius 0 leaves the image byte-for-byte unchanged (the neighbor set
/// is the pixel itself). A buffer with no image loaded is a no-op.
pub fn box_average(img: &mut ImageBuffer, radius: i32) {
    if !img.is_loaded() {
        return;
    }

    let width = img.width();
    let height = img.height();
    let channels = img.channels();
    let source = img.snapshot();
    let mut output = source.clone();

    for y in 0..height {
        for x in 0..width {
            let min_x = (x - radius).max(0);
            let max_x = (x + radius + 1).min(width);
            let min_y = (y - radius).max(0);
            let max_y = (y + radius + 1).min(height);

            let mut acc = LColor { r: 0, g: 0, b: 0, a: 0 };
            let mut count: u32 = 0;
            for ny in min_y..max_y {
                for nx in min_x..max_x {
                    let idx = ((ny * width + nx) * channels) as usize;
                    acc.r += source[idx] as u32;
                    acc.g += source[idx + 1] as u32;
                    acc.b += source[idx + 2] as u32;
                    acc.a += source[idx + 3] as u32;
                    count += 1;
                }
            }

            // the clipped box always contains the center pixel, but the
            // divisor must never be zero.
            let count = count.max(1);
            let idx = ((y * width + x) * channels) as usize;
            output[idx] = (acc.r / count) as u8;
            output[idx + 1] = (acc.g / count) as u8;
            output[idx + 2] = (acc.b / count) as u8;
            output[idx + 3] = (acc.a / count) as u8;
        }
    }

    img.replace_data(output);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::CHANNELS;

    fn gradient(width: i32, height: i32) -> ImageBuffer {
        let mut data = Vec::with_capacity((width * height * CHANNELS) as usize);
        for y in 0..height {
            for x in 0..width {
                let v = ((x * 13 + y * 31) % 256) as u8;
                data.extend_from_slice(&[v, v.wrapping_add(1), v.wrapping_add(2), 255]);
            }
        }
        ImageBuffer::from_raw(width, height, data)
    }

    #[test]
    fn test_radius_zero_is_identity() {
        let mut img = gradient(6, 5);
        let before = img.snapshot();
        box_average(&mut img, 0);
        assert_eq!(img.as_slice(), &before[..]);
    }

    #[test]
    fn test_uniform_image_is_fixed_point() {
        let data = vec![42u8; (4 * 4 * CHANNELS) as usize];
        let mut img = ImageBuffer::from_raw(4, 4, data.clone());
        box_average(&mut img, 2);
        assert_eq!(img.as_slice(), &data[..]);
    }

    #[test]
    fn test_corner_uses_clipped_box() {
        // 2x2 image, radius 1: every clipped box covers all four pixels.
        let mut data = Vec::new();
        for v in [0u8, 100, 200, 40] {
            data.extend_from_slice(&[v, v, v, 255]);
        }
        let mut img = ImageBuffer::from_raw(2, 2, data);
        box_average(&mut img, 1);
        // (0 + 100 + 200 + 40) / 4 = 85
        for y in 0..2 {
            for x in 0..2 {
                let p = img.get_pixel(x, y).unwrap();
                assert_eq!((p.r, p.g, p.b, p.a), (85, 85, 85, 255));
            }
        }
    }

    /// Reference implementation sweeping rows backward, writing
    /// straight into the buffer it reads from a snapshot of.
    fn box_average_backward(img: &mut ImageBuffer, radius: i32) {
        let width = img.width();
        let height = img.height();
        let channels = img.channels();
        let source = img.snapshot();
        let mut output = source.clone();
        for y in (0..height).rev() {
            for x in (0..width).rev() {
                let mut acc = LColor { r: 0, g: 0, b: 0, a: 0 };
                let mut count: u32 = 0;
                for ny in (y - radius).max(0)..(y + radius + 1).min(height) {
                    for nx in (x - radius).max(0)..(x + radius + 1).min(width) {
                        let idx = ((ny * width + nx) * channels) as usize;
                        acc.r += source[idx] as u32;
                        acc.g += source[idx + 1] as u32;
                        acc.b += source[idx + 2] as u32;
                        acc.a += source[idx + 3] as u32;
                        count += 1;
                    }
                }
                let count = count.max(1);
                let idx = ((y * width + x) * channels) as usize;
                output[idx] = (acc.r / count) as u8;
                output[idx + 1] = (acc.g / count) as u8;
                output[idx + 2] = (acc.b / count) as u8;
                output[idx + 3] = (acc.a / count) as u8;
            }
        }
        img.replace_data(output);
    }

    #[test]
    fn test_result_independent_of_sweep_order() {
        // Filtering from a snapshot makes the sweep order irrelevant:
        // forward and backward sweeps must agree byte for byte.
        let img = gradient(9, 7);
        let mut forward = img.clone();
        let mut backward = img;
        box_average(&mut forward, 2);
        box_average_backward(&mut backward, 2);
        assert_eq!(forward.as_slice(), backward.as_slice());
    }

    #[test]
    fn test_large_kernel_does_not_overflow_count() {
        // A 20x20 box holds 400 neighbors; the accumulator and counter
        // must not wrap.
        let data = vec![255u8; (20 * 20 * CHANNELS) as usize];
        let mut img = ImageBuffer::from_raw(20, 20, data.clone());
        box_average(&mut img, 10);
        assert_eq!(img.as_slice(), &data[..]);
    }

    #[test]
    fn test_no_image_is_noop() {
        let mut img = ImageBuffer::new();
        box_average(&mut img, 3);
        assert!(!img.is_loaded());
    }
}
