//! `[imagemap]` block parsing.
//!
//! The body is one image URL followed by one hotspot record per line:
//!
//! ```text
//! https://example.com/map.png
//! 0 0 50 50 https://example.com/left The left half
//! 50 0 50 50 # Not a link
//! ```
//!
//! Each record is `left top width height url [title...]`, geometry in percent
//! of the image. A URL of `#` makes an inert region. Any invalid record rejects
//! the whole block.

use crate::validate::{is_valid_hotspot_bounds, is_valid_percentage, is_valid_url};

/// URL marking a non-interactive hotspot.
const INERT_URL: &str = "#";

/// Reason an image map was rejected. The first failing rule wins.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ImageMapError {
    #[error("Image map has no image URL")]
    Empty,

    #[error("Image map record has fewer than 5 fields: {0}")]
    TooFewFields(String),

    #[error("Image map record has an invalid coordinate: {0}")]
    InvalidCoordinate(String),

    #[error("Image map hotspot has no area: {0}")]
    EmptyArea(String),

    #[error("Image map hotspot exceeds the image bounds: {0}")]
    OutOfBounds(String),

    #[error("Image map URL is not allowed: {0}")]
    InvalidUrl(String),
}

/// One rectangular region over the image.
#[derive(Debug, Clone, PartialEq)]
pub struct Hotspot {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
    /// Link target, or `#` for an inert region.
    pub url: String,
    pub title: Option<String>,
}

impl Hotspot {
    /// Link target, `None` for an inert region.
    #[must_use]
    pub fn href(&self) -> Option<&str> {
        (self.url != INERT_URL).then_some(self.url.as_str())
    }
}

/// A validated image map.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageMapBlock {
    pub image_url: String,
    pub hotspots: Vec<Hotspot>,
}

impl ImageMapBlock {
    /// Parse a block body with one entry per line.
    ///
    /// Blank lines are ignored.
    ///
    /// # Errors
    ///
    /// Returns the first rule the block violates.
    pub fn parse(body: &str) -> Result<Self, ImageMapError> {
        let mut lines = body.lines().map(str::trim).filter(|line| !line.is_empty());
        let image_url = lines.next().ok_or(ImageMapError::Empty)?;

        let hotspots = lines.map(parse_record).collect::<Result<Vec<_>, _>>()?;

        if !is_valid_url(image_url) {
            return Err(ImageMapError::InvalidUrl(image_url.to_owned()));
        }

        Ok(Self {
            image_url: image_url.to_owned(),
            hotspots,
        })
    }
}

fn parse_record(line: &str) -> Result<Hotspot, ImageMapError> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    let [left, top, width, height, url, title @ ..] = fields.as_slice() else {
        return Err(ImageMapError::TooFewFields(line.to_owned()));
    };

    let coordinate = |field: &str| {
        field
            .parse::<f64>()
            .ok()
            .filter(|value| is_valid_percentage(*value))
            .ok_or_else(|| ImageMapError::InvalidCoordinate(line.to_owned()))
    };
    let (left, top, width, height) = (
        coordinate(left)?,
        coordinate(top)?,
        coordinate(width)?,
        coordinate(height)?,
    );

    if width <= 0.0 || height <= 0.0 {
        return Err(ImageMapError::EmptyArea(line.to_owned()));
    }
    if !is_valid_hotspot_bounds(left, top, width, height) {
        return Err(ImageMapError::OutOfBounds(line.to_owned()));
    }
    if *url != INERT_URL && !is_valid_url(url) {
        return Err(ImageMapError::InvalidUrl((*url).to_owned()));
    }

    Ok(Hotspot {
        left,
        top,
        width,
        height,
        url: (*url).to_owned(),
        title: (!title.is_empty()).then(|| title.join(" ")),
    })
}
