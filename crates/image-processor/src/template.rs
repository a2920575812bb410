//! Composite a user image onto a fixed template image.

use std::fmt;
use std::str::FromStr;

use image::DynamicImage;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::compose::overlay;
use crate::resize::{Geometry, resize_to_fit};
use crate::{ProcessError, Result};

/// Where the resized image lands on the template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Offset {
    pub x: i64,
    pub y: i64,
}

impl Offset {
    pub const fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Offset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.x, self.y)
    }
}

impl FromStr for Offset {
    type Err = ProcessError;

    /// Parse `X,Y`, e.g. `10,0`. Negative values are allowed.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let invalid = || ProcessError::InvalidGeometry(s.to_string());
        let (x, y) = s.trim().split_once(',').ok_or_else(invalid)?;
        Ok(Self {
            x: x.trim().parse().map_err(|_| invalid())?,
            y: y.trim().parse().map_err(|_| invalid())?,
        })
    }
}

/// Size and placement of the user image on the template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateLayout {
    pub geometry: Geometry,
    pub offset: Offset,
}

impl Default for TemplateLayout {
    fn default() -> Self {
        Self {
            geometry: Geometry::default(),
            offset: Offset::new(10, 0),
        }
    }
}

/// Decode `input` and `template`, fit the input into the layout's geometry,
/// and draw it over the template at the layout's offset.
///
/// The result always has the template's dimensions.
pub fn compose_on_template(
    input: &[u8],
    template: &[u8],
    layout: &TemplateLayout,
) -> Result<DynamicImage> {
    let input = image::load_from_memory(input).map_err(|source| ProcessError::Decode {
        what: "input image",
        source,
    })?;
    let template = image::load_from_memory(template).map_err(|source| ProcessError::Decode {
        what: "template image",
        source,
    })?;

    debug!(
        input_w = input.width(),
        input_h = input.height(),
        template_w = template.width(),
        template_h = template.height(),
        "Decoded input and template"
    );

    let resized = resize_to_fit(&input, layout.geometry);
    let mut canvas = template.to_rgba8();
    overlay(&mut canvas, &resized, layout.offset.x, layout.offset.y);

    info!(
        width = canvas.width(),
        height = canvas.height(),
        offset = %layout.offset,
        "Composited image onto template"
    );

    Ok(DynamicImage::ImageRgba8(canvas))
}
