//! The picture profile: one named, reusable responsive-image policy.
//!
//! A profile describes *what* a renderer should produce for an image: which
//! widths go into `srcset`, the `sizes` expressions, breakpoint-specific
//! sources, encoding quality, WebP variants and the attributes of the
//! fallback `<img>`. It does not render anything and performs no I/O.
//!
//! ## Fallback Width
//!
//! Clients without `<picture>`/`srcset` support only ever load the single
//! `<img src>`. Its width is resolved in this order, first match wins:
//!
//! | # | Input | Result |
//! |---|---|---|
//! | 1 | explicit `fallback_width` (non-zero) | that value |
//! | 2 | non-empty `multi_image_media_conditions` | largest condition width |
//! | 3 | non-empty `srcset_widths` | largest srcset width |
//! | 4 | nothing | `None` |
//!
//! Ties between media conditions resolve to the first maximum in input order.
//! The value is recomputed on every call and never stored back.
//!
//! ## Construction
//!
//! Build profiles with struct update syntax over [`PictureProfile::default`]:
//!
//! ```
//! use picture_profile::{MediaCondition, PictureProfile};
//!
//! let hero = PictureProfile {
//!     srcset_widths: vec![320, 640, 1024],
//!     sizes: vec!["(max-width: 1024px) 100vw".into(), "1024px".into()],
//!     ..PictureProfile::default()
//! };
//! assert_eq!(hero.fallback_width(), Some(1024));
//!
//! let article = PictureProfile {
//!     multi_image_media_conditions: vec![
//!         MediaCondition::new("(max-width: 600px)", 600),
//!         MediaCondition::new("(min-width: 601px)", 1200),
//!     ],
//!     ..PictureProfile::default()
//! };
//! assert_eq!(article.fallback_width(), Some(1200));
//! ```
//!
//! Nothing is validated here. Out-of-range quality or a profile that sets
//! both `aspect_ratio` and `fixed_height` is the consumer's problem; the
//! [`config`](crate::config) loader rejects the former and warns on the latter.

use serde::{Deserialize, Serialize};

use crate::types::{ImageDecoding, ImageFormat, MediaCondition};

/// Encoding quality a new profile starts with.
pub const DEFAULT_QUALITY: u32 = 80;

/// Source formats that get a WebP variant unless a profile says otherwise.
pub const DEFAULT_WEBP_FORMATS: &[ImageFormat] = &[ImageFormat::Jpeg];

/// Responsive image rendering policy.
///
/// Fields map one-to-one onto the keys of a `[profiles.<name>]` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PictureProfile {
    /// Candidate widths for the `srcset` attribute.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub srcset_widths: Vec<u32>,
    /// `sizes` attribute expressions, emitted verbatim.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sizes: Vec<String>,
    /// Use this to show different images depending on a media condition,
    /// e.g. a square crop on phones and a wide one on desktops.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub multi_image_media_conditions: Vec<MediaCondition>,
    /// Encoding quality, 1-100. Not clamped.
    pub quality: u32,
    /// Source formats that should also be offered as WebP.
    /// Assigning replaces the default set.
    pub create_webp_for_format: Vec<ImageFormat>,
    /// Explicit width of the fallback `<img>`. See [`Self::fallback_width()`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback_width: Option<u32>,
    /// Wanted aspect ratio as width / height, e.g. 16:9 = 1.777.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aspect_ratio: Option<f64>,
    /// Static height for the `height` attribute without fixing the ratio.
    /// Useful for wide images on small screens that get cropped.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fixed_height: Option<u32>,
    /// Emit `width` and `height` attributes on the `<img>`.
    pub img_width_height: bool,
    /// `decoding` attribute of the `<img>`.
    pub image_decoding: ImageDecoding,
    /// Diagnostic overlay.
    pub show_info: bool,
}

impl Default for PictureProfile {
    fn default() -> Self {
        Self {
            srcset_widths: Vec::new(),
            sizes: Vec::new(),
            multi_image_media_conditions: Vec::new(),
            quality: DEFAULT_QUALITY,
            create_webp_for_format: DEFAULT_WEBP_FORMATS.to_vec(),
            fallback_width: None,
            aspect_ratio: None,
            fixed_height: None,
            img_width_height: false,
            image_decoding: ImageDecoding::default(),
            show_info: false,
        }
    }
}

/// Which input [`PictureProfile::fallback_width`] was taken from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackSource {
    /// The profile's explicit `fallback_width`.
    Explicit,
    /// The widest media condition, by index into
    /// `multi_image_media_conditions`.
    MediaCondition(usize),
    /// The largest `srcset_widths` entry.
    SrcSet,
    /// No width could be determined.
    Unset,
}

impl PictureProfile {
    /// Width of the fallback `<img>` for clients without `<picture>` support.
    ///
    /// Uses the explicit `fallback_width` when set, otherwise the largest
    /// media condition width, otherwise the largest srcset width. `None`
    /// means the renderer should omit the width and let the backend choose.
    pub fn fallback_width(&self) -> Option<u32> {
        resolve_fallback(self).map(|(width, _)| width)
    }

    /// The branch [`Self::fallback_width()`] resolved through.
    pub fn fallback_source(&self) -> FallbackSource {
        resolve_fallback(self)
            .map(|(_, source)| source)
            .unwrap_or(FallbackSource::Unset)
    }

    /// Whether a WebP variant should be produced for `format` sources.
    pub fn creates_webp_for(&self, format: ImageFormat) -> bool {
        self.create_webp_for_format.contains(&format)
    }

    /// The configured aspect ratio, if usable. `0`, negatives and NaN read
    /// as unset.
    pub fn aspect_ratio(&self) -> Option<f64> {
        self.aspect_ratio.filter(|r| r.is_finite() && *r > 0.0)
    }
}

/// Free-function form of [`PictureProfile::fallback_width`].
pub fn compute_fallback_width(profile: &PictureProfile) -> Option<u32> {
    profile.fallback_width()
}

fn resolve_fallback(profile: &PictureProfile) -> Option<(u32, FallbackSource)> {
    // Zero is the unset sentinel of older profile files.
    if let Some(width) = profile.fallback_width.filter(|&w| w > 0) {
        return Some((width, FallbackSource::Explicit));
    }

    // First maximum wins, so later equal widths must not replace it.
    let widest = profile
        .multi_image_media_conditions
        .iter()
        .enumerate()
        .reduce(|best, next| if next.1.width > best.1.width { next } else { best });
    if let Some((index, condition)) = widest {
        return Some((condition.width, FallbackSource::MediaCondition(index)));
    }

    profile
        .srcset_widths
        .iter()
        .max()
        .map(|&width| (width, FallbackSource::SrcSet))
}
