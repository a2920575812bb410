//! Aspect-preserving scaling into a bounding box (Lanczos3).

use std::fmt;
use std::str::FromStr;

use image::DynamicImage;
use image::imageops::FilterType;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::ProcessError;

/// Bounding box an image is resized into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Geometry {
    pub width: u32,
    pub height: u32,
}

impl Geometry {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl Default for Geometry {
    fn default() -> Self {
        Self::new(56, 56)
    }
}

impl fmt::Display for Geometry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl FromStr for Geometry {
    type Err = ProcessError;

    /// Parse `WxH`, e.g. `56x56`. Both sides must be non-zero.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ProcessError::InvalidGeometry(s.to_string());
        let (w, h) = s
            .trim()
            .split_once(['x', 'X'])
            .ok_or_else(invalid)?;
        let width: u32 = w.trim().parse().map_err(|_| invalid())?;
        let height: u32 = h.trim().parse().map_err(|_| invalid())?;
        if width == 0 || height == 0 {
            return Err(invalid());
        }
        Ok(Self { width, height })
    }
}

/// Resize an image so it fits inside `geometry`, keeping its aspect ratio.
///
/// Images smaller than the box are scaled up.
pub fn resize_to_fit(img: &DynamicImage, geometry: Geometry) -> DynamicImage {
    // Wider than the box (relative to height) means width is the binding side.
    let wide = u64::from(img.width()) * u64::from(geometry.height)
        >= u64::from(img.height()) * u64::from(geometry.width);

    if wide {
        resize_to_width(img, geometry.width)
    } else {
        resize_to_height(img, geometry.height)
    }
}

/// Scale to exactly `width`, deriving the height from the aspect ratio.
pub fn resize_to_width(img: &DynamicImage, width: u32) -> DynamicImage {
    let height = scaled_side(img.height(), width, img.width());
    scale(img, width, height)
}

/// Scale to exactly `height`, deriving the width from the aspect ratio.
pub fn resize_to_height(img: &DynamicImage, height: u32) -> DynamicImage {
    let width = scaled_side(img.width(), height, img.height());
    scale(img, width, height)
}

/// `side * target / reference`, rounded, at least 1.
fn scaled_side(side: u32, target: u32, reference: u32) -> u32 {
    let scaled = f64::from(side) * f64::from(target) / f64::from(reference.max(1));
    (scaled.round() as u32).max(1)
}

fn scale(img: &DynamicImage, width: u32, height: u32) -> DynamicImage {
    if (img.width(), img.height()) == (width, height) {
        return img.clone();
    }
    debug!(
        from = %Geometry::new(img.width(), img.height()),
        to = %Geometry::new(width, height),
        "Scaling image"
    );
    img.resize_exact(width, height, FilterType::Lanczos3)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma};

    fn gray(width: u32, height: u32) -> DynamicImage {
        DynamicImage::ImageLuma8(GrayImage::from_pixel(width, height, Luma([128])))
    }

    #[test]
    fn width_and_height_keep_ratio() {
        let down = resize_to_width(&gray(800, 600), 400);
        assert_eq!((down.width(), down.height()), (400, 300));

        let up = resize_to_height(&gray(200, 100), 400);
        assert_eq!((up.width(), up.height()), (800, 400));
    }

    #[test]
    fn thin_images_never_collapse_to_zero() {
        let result = resize_to_width(&gray(1000, 1), 10);
        assert_eq!((result.width(), result.height()), (10, 1));
    }

    #[test]
    fn same_size_is_returned_unchanged() {
        let img = gray(56, 28);
        assert_eq!(resize_to_fit(&img, Geometry::default()), img);
    }

    #[test]
    fn fit_landscape_is_bounded_by_width() {
        let img = gray(200, 100);
        let result = resize_to_fit(&img, Geometry::default());
        assert_eq!(result.width(), 56);
        assert_eq!(result.height(), 28);
    }

    #[test]
    fn fit_portrait_is_bounded_by_height() {
        let img = gray(100, 400);
        let result = resize_to_fit(&img, Geometry::default());
        assert_eq!(result.height(), 56);
        assert_eq!(result.width(), 14);
    }

    #[test]
    fn fit_upscales_small_images() {
        let img = gray(8, 8);
        let result = resize_to_fit(&img, Geometry::new(56, 56));
        assert_eq!((result.width(), result.height()), (56, 56));
    }

    #[test]
    fn fit_into_non_square_box() {
        let img = gray(100, 100);
        let result = resize_to_fit(&img, Geometry::new(80, 40));
        assert_eq!((result.width(), result.height()), (40, 40));
    }

    #[test]
    fn geometry_parse() {
        assert_eq!("56x56".parse::<Geometry>().unwrap(), Geometry::new(56, 56));
        assert_eq!(" 120X80 ".parse::<Geometry>().unwrap(), Geometry::new(120, 80));
        assert!("56".parse::<Geometry>().is_err());
        assert!("0x10".parse::<Geometry>().is_err());
        assert!("axb".parse::<Geometry>().is_err());
    }

    #[test]
    fn geometry_display() {
        assert_eq!(Geometry::new(64, 32).to_string(), "64x32");
    }
}
