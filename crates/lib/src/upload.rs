//! # Upload Preparation
//!
//! Loads an image from disk, optionally shrinks it, and re-encodes it as JPEG
//! for upload. The file on disk is never modified.

use crate::{constants::MAXIMUM_RESIZE_WIDTH, errors::TagError};
use image::{imageops::FilterType, ImageFormat};
use std::io::Cursor;
use std::path::Path;
use tracing::info;

/// An in-memory JPEG ready to be sent to the vision service.
#[derive(Debug, Clone)]
pub struct PreparedImage {
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
    /// `true` if the image was downscaled.
    pub resized: bool,
}

/// Validates a resize width. `0` disables resizing.
pub fn check_resize_width(width: u32) -> Result<u32, TagError> {
    if width >= MAXIMUM_RESIZE_WIDTH {
        return Err(TagError::InvalidResizeWidth {
            width,
            max: MAXIMUM_RESIZE_WIDTH,
        });
    }
    Ok(width)
}

/// Height that keeps the aspect ratio when scaling `width` down to `target_width`.
pub fn scaled_height(width: u32, height: u32, target_width: u32) -> u32 {
    let scaled = (u64::from(height) * u64::from(target_width)) / u64::from(width);
    (scaled as u32).max(1)
}

/// Reads `path` and produces the JPEG payload for the vision service.
///
/// Images wider than `resize_width` are scaled down to exactly that width;
/// narrower images and `resize_width == 0` keep their original size.
pub fn prepare_image(path: &Path, resize_width: u32) -> Result<PreparedImage, TagError> {
    check_resize_width(resize_width)?;
    let img = image::open(path)?;

    let (img, resized) = if resize_width > 0 && img.width() > resize_width {
        let height = scaled_height(img.width(), img.height(), resize_width);
        info!(
            "[{}] Temporarily resized to {}x{}",
            path.display(),
            resize_width,
            height
        );
        (img.resize_exact(resize_width, height, FilterType::Lanczos3), true)
    } else {
        (img, false)
    };

    let rgb = img.to_rgb8();
    let mut bytes = Vec::new();
    rgb.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Jpeg)?;

    Ok(PreparedImage {
        bytes,
        width: rgb.width(),
        height: rgb.height(),
        resized,
    })
}
