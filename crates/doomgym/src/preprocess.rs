//! Screen buffer to observation transform.
//!
//! Converts a simulator frame into the fixed `[100, 160, 1]` intensity grid:
//! channel axis moved last, RGB collapsed to luminance, cubic resize to
//! 160x100. Everything here is a pure function of the input bytes.

use crate::game::{ScreenBuffer, ScreenFormat};
use crate::{EnvError, Result};
use image::imageops::{self, FilterType};
use image::GrayImage;
use ndarray::{Array2, ArrayD, ArrayView2, ArrayView3, Axis, IxDyn};

/// Observation width in pixels
pub const TARGET_WIDTH: u32 = 160;
/// Observation height in pixels
pub const TARGET_HEIGHT: u32 = 100;

const TARGET_SHAPE: [usize; 3] = [TARGET_HEIGHT as usize, TARGET_WIDTH as usize, 1];

/// Convert a screen buffer into a `[100, 160, 1]` grayscale observation.
pub fn grayscale(buffer: &ScreenBuffer) -> Result<ArrayD<u8>> {
    let (h, w) = (buffer.height, buffer.width);
    if h == 0 || w == 0 || buffer.data.len() != buffer.format.channels() * h * w {
        return Err(EnvError::ShapeMismatch {
            expected: buffer.shape().to_vec(),
            actual: vec![buffer.data.len()],
        });
    }

    let gray = match buffer.format {
        ScreenFormat::Crcgcb => {
            let planes = ArrayView3::from_shape((3, h, w), &buffer.data)
                .map_err(|_| mismatch(&[3, h, w], buffer.data.len()))?;
            luminance(planes.permuted_axes([1, 2, 0]))
        }
        ScreenFormat::Rgb24 => {
            let pixels = ArrayView3::from_shape((h, w, 3), &buffer.data)
                .map_err(|_| mismatch(&[h, w, 3], buffer.data.len()))?;
            luminance(pixels)
        }
        ScreenFormat::Gray8 => ArrayView2::from_shape((h, w), &buffer.data)
            .map_err(|_| mismatch(&[h, w], buffer.data.len()))?
            .to_owned(),
    };

    resize_gray(gray.view())
}

/// Resize a single-channel grid to 160x100 and add the trailing channel axis.
///
/// A grid already at the target resolution is returned unchanged.
pub fn resize_gray(gray: ArrayView2<u8>) -> Result<ArrayD<u8>> {
    let (h, w) = gray.dim();
    let resized = if (w, h) == (TARGET_WIDTH as usize, TARGET_HEIGHT as usize) {
        gray.as_standard_layout().into_owned()
    } else {
        let image = GrayImage::from_raw(w as u32, h as u32, gray.iter().copied().collect())
            .ok_or_else(|| mismatch(&[h, w], gray.len()))?;
        let out = imageops::resize(&image, TARGET_WIDTH, TARGET_HEIGHT, FilterType::CatmullRom);
        Array2::from_shape_vec(
            (TARGET_HEIGHT as usize, TARGET_WIDTH as usize),
            out.into_raw(),
        )
        .map_err(|_| mismatch(&TARGET_SHAPE[..2], 0))?
    };

    resized
        .into_shape(IxDyn(&TARGET_SHAPE))
        .map_err(|_| mismatch(&TARGET_SHAPE, gray.len()))
}

/// All-zero observation used when the simulator has no state to show
pub fn blank_observation() -> ArrayD<u8> {
    ArrayD::zeros(IxDyn(&TARGET_SHAPE))
}

/// BT.601 luma in 14-bit fixed point
fn luminance(rgb: ArrayView3<u8>) -> Array2<u8> {
    rgb.map_axis(Axis(2), |px| {
        let (r, g, b) = (px[0] as u32, px[1] as u32, px[2] as u32);
        ((r * 4899 + g * 9617 + b * 1868 + 8192) >> 14) as u8
    })
}

fn mismatch(expected: &[usize], actual: usize) -> EnvError {
    EnvError::ShapeMismatch {
        expected: expected.to_vec(),
        actual: vec![actual],
    }
}
