
use std::path::{Path, PathBuf};

use image::{GrayImage, ImageBuffer, Luma, Rgb, RgbImage};

/// 4x3 gray gradient, pixel = 10 * x + y
pub(crate) fn write_gray8(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    GrayImage::from_fn(4, 3, |x, y| Luma([(10 * x + y) as u8])).save(&path).unwrap();
    path
}

pub(crate) fn write_gray16(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    let img: ImageBuffer<Luma<u16>, Vec<u16>> = ImageBuffer::from_fn(2, 2, |x, y| Luma([(1000 * (x + 2 * y)) as u16]));
    img.save(&path).unwrap();
    path
}

pub(crate) fn write_rgb8(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    RgbImage::from_pixel(3, 3, Rgb([200, 200, 200])).save(&path).unwrap();
    path
}
