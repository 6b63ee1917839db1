//! Path validation and the image codec boundary.
//!
//! Decoding and encoding are delegated to the [`image`] crate; this module only turns images into
//! fields and back.

use std::path::{Path, PathBuf};

use image::{DynamicImage, ImageBuffer, Rgb, RgbImage};
use thiserror::Error;

use crate::{
    config::Channel,
    error::{Error, Result},
    field::{Field, FieldError, Layout},
};

/// File extensions accepted for input and output images, lowercase.
pub const SUPPORTED_EXTENSIONS: [&str; 6] = ["jpeg", "jpg", "png", "tiff", "gif", "bmp"];

/// An error raised when a path is rejected before any decoding or numeric work.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// The path does not exist.
    #[error("file {} does not exist", .0.display())]
    NotFound(PathBuf),
    /// The path exists but is not a regular file.
    #[error("path {} is not a file", .0.display())]
    NotAFile(PathBuf),
    /// The file extension is not a supported image format.
    #[error("{extension:?} file type is not supported, supported: {}", SUPPORTED_EXTENSIONS.join(", "))]
    UnsupportedExtension {
        /// The lowercased extension, empty if there is none.
        extension: String,
    },
}

/// Return the lowercased extension of `path`, or an empty string.
fn extension(path: &Path) -> String {
    path.extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default()
}

fn check_extension(path: &Path) -> Result<(), ValidationError> {
    let extension = extension(path);
    if SUPPORTED_EXTENSIONS.contains(&extension.as_str()) {
        Ok(())
    } else {
        Err(ValidationError::UnsupportedExtension { extension })
    }
}

/// Check that `path` is an existing regular file with a supported image extension.
///
/// # Errors
///
/// Returns the first failed check, in the order: existence, regular file, extension.
pub fn validate(path: &Path) -> Result<(), ValidationError> {
    if !path.exists() {
        return Err(ValidationError::NotFound(path.to_path_buf()));
    }
    if !path.is_file() {
        return Err(ValidationError::NotAFile(path.to_path_buf()));
    }
    check_extension(path)
}

/// Check that `path` names a supported image format to write.
///
/// # Errors
///
/// Returns [`ValidationError::UnsupportedExtension`] otherwise.
pub fn validate_output(path: &Path) -> Result<(), ValidationError> {
    check_extension(path)
}

/// Decode an image file.
///
/// # Errors
///
/// Returns [`Error::Decode`] if the codec fails.
pub fn load(path: &Path) -> Result<DynamicImage> {
    image::open(path).map_err(|source| Error::Decode {
        path: path.to_path_buf(),
        source,
    })
}

/// Encode an image file, in the format given by the extension of `path`.
///
/// # Errors
///
/// Returns [`Error::Encode`] if the codec fails.
pub fn save(image: &RgbImage, path: &Path) -> Result<()> {
    image.save(path).map_err(|source| Error::Encode {
        path: path.to_path_buf(),
        source,
    })
}

/// Extract one channel of `image` as a field of raw intensities in `[0, 255]`.
///
/// Color channels are read after converting the image to 8-bit RGB.
///
/// # Errors
///
/// Returns an error if the image has no pixels.
pub fn channel(image: &DynamicImage, channel: Channel) -> Result<Field, FieldError> {
    let (width, height) = (image.width() as usize, image.height() as usize);
    let layout = Layout::new(height, width).ok_or(FieldError::InvalidExtent {
        rows: height,
        cols: width,
    })?;
    let field = match channel {
        Channel::Luma => {
            let luma = image.to_luma8();
            Field::from_fn(layout, |row, col| {
                f64::from(luma.get_pixel(col as u32, row as u32)[0])
            })
        }
        Channel::Red | Channel::Green | Channel::Blue => {
            let index = match channel {
                Channel::Red => 0,
                Channel::Green => 1,
                _ => 2,
            };
            let rgb = image.to_rgb8();
            Field::from_fn(layout, |row, col| {
                f64::from(rgb.get_pixel(col as u32, row as u32)[index])
            })
        }
    };
    Ok(field)
}

/// Broadcast a single channel of samples, laid out by `layout`, to an RGB image.
///
/// # Panics
///
/// Panics if `samples` does not hold exactly as many elements as the layout.
#[must_use]
pub fn to_rgb(layout: &Layout, samples: &[u8]) -> RgbImage {
    assert_eq!(samples.len(), layout.capacity(), "to_rgb: sample count");
    ImageBuffer::from_fn(layout.cols() as u32, layout.rows() as u32, |x, y| {
        let v = samples[layout.translate(y as usize, x as usize)];
        Rgb([v, v, v])
    })
}
