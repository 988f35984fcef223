//! Receipt photo inspection and sizing.
//!
//! Dimensions are expressed in points; one source pixel maps to one point.

use std::path::Path;

use image::ImageFormat;

use super::GeneratorError;

pub const POINTS_PER_INCH: f64 = 72.0;
/// 5.5 inches.
pub const MAX_IMAGE_WIDTH: f64 = 5.5 * POINTS_PER_INCH;
/// 6.5 inches.
pub const MAX_IMAGE_HEIGHT: f64 = 6.5 * POINTS_PER_INCH;

/// Image encodings accepted for receipt photos.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReceiptImageFormat {
    Jpeg,
    Png,
}

impl ReceiptImageFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            Self::Png => "png",
        }
    }
}

/// Identify the payload by its leading bytes; only JPEG and PNG pass.
pub fn detect_image_format(bytes: &[u8]) -> Option<ReceiptImageFormat> {
    match image::guess_format(bytes) {
        Ok(ImageFormat::Jpeg) => Some(ReceiptImageFormat::Jpeg),
        Ok(ImageFormat::Png) => Some(ReceiptImageFormat::Png),
        _ => None,
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImageDimensions {
    pub width: f64,
    pub height: f64,
}

impl ImageDimensions {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Natural display size of the image stored at `path`.
    pub fn of_file(path: &Path) -> Result<Self, GeneratorError> {
        let (width, height) = image::image_dimensions(path).map_err(GeneratorError::Image)?;
        Ok(Self::new(width as f64, height as f64))
    }

    /// Shrink to fit within `max_width` x `max_height` keeping the aspect
    /// ratio. Images that already fit keep their size.
    pub fn fit_within(self, max_width: f64, max_height: f64) -> Self {
        if self.width <= 0.0 || self.height <= 0.0 {
            return self;
        }
        let w_ratio = max_width / self.width;
        let h_ratio = max_height / self.height;
        if w_ratio >= 1.0 && h_ratio >= 1.0 {
            return self;
        }

        // Snap the limiting side to its bound so rounding cannot overshoot it.
        if w_ratio <= h_ratio {
            Self::new(max_width, self.height * w_ratio)
        } else {
            Self::new(self.width * h_ratio, max_height)
        }
    }

    /// Fit within the receipt page bounds.
    pub fn fit_receipt(self) -> Self {
        self.fit_within(MAX_IMAGE_WIDTH, MAX_IMAGE_HEIGHT)
    }

    pub fn aspect_ratio(&self) -> f64 {
        self.width / self.height
    }
}
