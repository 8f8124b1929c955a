//! # Picture Profile
//!
//! Configuration model for responsive images. A [`PictureProfile`] describes
//! how one kind of image (a hero banner, an article figure, a thumbnail) is
//! rendered: the `srcset` widths, the `sizes` expressions, breakpoint
//! specific sources, encoding quality, WebP variants and the fallback `<img>`
//! shown to clients without `<picture>` support.
//!
//! The profile is the contract between three parties:
//!
//! ```text
//! content layer  →  PictureProfile  →  markup renderer  (<picture>, srcset, sizes)
//!                                   →  image backend    (widths, quality, webp)
//! ```
//!
//! Neither the renderer nor the backend live in this crate.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`profile`] | `PictureProfile`, its defaults and the derived fallback width |
//! | [`types`] | Value types: `MediaCondition`, `ImageFormat`, `ImageDecoding` |
//! | [`config`] | Loading named profiles from a layered `profiles.toml` |
//! | [`output`] | CLI output formatting for loaded profiles |
//!
//! # Design Decisions
//!
//! ## Derived, Never Stored
//!
//! [`PictureProfile::fallback_width()`] is recomputed on every call from the
//! current fields. There is no cache to invalidate and the explicit
//! `fallback_width` field is never written back, so an explicit value always
//! stays distinguishable from a derived one.
//!
//! ## Explicit Option Over Zero Sentinel
//!
//! Unset widths and ratios are `None`. Profile files written for the zero
//! convention still work: a `0` fallback width or aspect ratio reads as unset.
//!
//! ## Validation Lives in the Loader
//!
//! The model accepts any value. [`config::load_profiles`] rejects values the
//! image backend cannot use, so code-built profiles stay infallible while
//! file-built profiles get typo and range checks.

pub mod config;
pub mod output;
pub mod profile;
pub mod types;

pub use config::{ConfigError, ProfileSet, load_profiles, parse_profiles};
pub use profile::{FallbackSource, PictureProfile, compute_fallback_width};
pub use types::{ImageDecoding, ImageFormat, MediaCondition};
