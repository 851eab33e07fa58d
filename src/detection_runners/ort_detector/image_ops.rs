//! Turns a source frame into the model's input buffer.
//!
//! The frame is stretched to exactly the target size. No letterboxing, so the
//! aspect ratio is not kept and box coordinates map back with one scale factor
//! per axis.

use fast_image_resize::{
    images::{Image as FirImage, ImageRef},
    pixels::PixelType,
    FilterType, ResizeAlg, ResizeOptions, Resizer,
};
use image::imageops;
use image::RgbImage;
use crate::common::ArdImage;

/// Resizes `image` to `target_w` x `target_h` and returns `3 * w * h` floats in
/// CHW order (all red, then all green, then all blue), each scaled to `[0, 1]`.
pub fn preprocess(image: &ArdImage, target_h: u32, target_w: u32) -> Vec<f32> {
    let hw = target_w as usize * target_h as usize;
    if hw == 0 {
        return Vec::new();
    }
    if image.is_empty() {
        log::warn!("Empty source frame, feeding a blank {}x{} input", target_w, target_h);
        return vec![0.0f32; 3 * hw];
    }

    let resized = resize_image(&image.image, target_h, target_w);
    nchw_normalize_flat(&resized, hw)
}

/// `(source / model)` per axis, the factors mapping model space boxes onto the source frame.
pub fn scale_factors(image: &ArdImage, target_h: u32, target_w: u32) -> (f32, f32) {
    (image.width() as f32 / target_w as f32, image.height() as f32 / target_h as f32)
}

fn resize_image(img: &RgbImage, target_h: u32, target_w: u32) -> Vec<u8> {
    if img.width() == target_w && img.height() == target_h {
        return img.as_raw().clone();
    }

    let mut resizer = Resizer::new();
    let options = ResizeOptions::new().resize_alg(ResizeAlg::Convolution(FilterType::Bilinear));
    let mut dst = FirImage::new(target_w, target_h, PixelType::U8x3);
    let resized = ImageRef::new(img.width(), img.height(), img.as_raw(), PixelType::U8x3)
        .map_err(|e| e.to_string())
        .and_then(|src| resizer.resize(&src, &mut dst, &options).map_err(|e| e.to_string()));
    match resized {
        Ok(_) => dst.buffer().to_vec(),
        Err(err) => {
            log::warn!("Failed to use `fast_image_resize` ({}). Falling back.", err);
            imageops::resize(img, target_w, target_h, imageops::FilterType::Triangle).into_raw()
        }
    }
}

fn nchw_normalize_flat(buf: &[u8], hw: usize) -> Vec<f32> {
    let mut out = vec![0.0f32; 3 * hw];

    for (i, px) in buf.chunks_exact(3).take(hw).enumerate() {
        out[i] = px[0] as f32 / 255.0;          // Channel 0
        out[i + hw] = px[1] as f32 / 255.0;     // Channel 1
        out[i + 2 * hw] = px[2] as f32 / 255.0; // Channel 2
    }

    out
}
