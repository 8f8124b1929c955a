//! Value types a [`PictureProfile`](crate::profile::PictureProfile) is built from.
//!
//! These are plain data: they serialize to and from the profile file format
//! (see [`config`](crate::config)) and are handed unchanged to the markup
//! renderer and the image backend.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::config::ConfigError;

/// A breakpoint rule: show an image of `width` pixels when `media` matches.
///
/// Unlike plain `srcset` width switching, every condition selects a separate
/// `<source>` element, so the renderer can swap in a different crop or an
/// entirely different image per breakpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MediaCondition {
    /// Media query, e.g. `"(max-width: 640px)"`. Passed through verbatim.
    pub media: String,
    /// Image width in pixels for this breakpoint.
    pub width: u32,
}

impl MediaCondition {
    pub fn new(media: impl Into<String>, width: u32) -> Self {
        Self {
            media: media.into(),
            width,
        }
    }
}

/// Source image formats a profile can ask a WebP variant for.
///
/// Serialized as the canonical file extension (`"jpg"`, `"png"`, ...).
/// Deserialized through [`FromStr`], so profile files accept the same
/// spellings as `str::parse`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub enum ImageFormat {
    #[serde(rename = "jpg")]
    Jpeg,
    #[serde(rename = "png")]
    Png,
    #[serde(rename = "webp")]
    Webp,
    #[serde(rename = "gif")]
    Gif,
}

impl ImageFormat {
    /// Canonical file extension, without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            ImageFormat::Jpeg => "jpg",
            ImageFormat::Png => "png",
            ImageFormat::Webp => "webp",
            ImageFormat::Gif => "gif",
        }
    }
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ImageFormat {
    type Err = ConfigError;

    /// Parse a format name or extension. Case-insensitive, leading dot allowed.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().trim_start_matches('.').to_ascii_lowercase();
        match name.as_str() {
            "jpg" | "jpeg" => Ok(ImageFormat::Jpeg),
            "png" => Ok(ImageFormat::Png),
            "webp" => Ok(ImageFormat::Webp),
            "gif" => Ok(ImageFormat::Gif),
            _ => Err(ConfigError::UnknownImageFormat(s.to_string())),
        }
    }
}

impl TryFrom<String> for ImageFormat {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Value of the `decoding` attribute on the fallback `<img>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageDecoding {
    Sync,
    #[default]
    Async,
    Auto,
}

impl ImageDecoding {
    pub fn as_attr(self) -> &'static str {
        match self {
            ImageDecoding::Sync => "sync",
            ImageDecoding::Async => "async",
            ImageDecoding::Auto => "auto",
        }
    }
}

impl fmt::Display for ImageDecoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_attr())
    }
}
