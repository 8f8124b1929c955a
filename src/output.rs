//! CLI output formatting for loaded profiles.
//!
//! # Output Format
//!
//! ```text
//! article
//!     Fallback: 1200px (media condition #2)
//!     Breakpoints:
//!         (max-width: 640px) → 640px
//!         (min-width: 641px) → 1200px
//!     Quality: 80
//!     WebP for: jpg
//!     Decoding: async
//!
//! hero
//!     Fallback: 1600px (largest srcset width)
//!     Srcset: 640, 1024, 1600
//!     Sizes: (max-width: 1024px) 100vw, 1600px
//!     Aspect ratio: 1.777
//!     Quality: 80
//!     WebP for: jpg
//!     Decoding: async
//!
//! 2 profiles
//! ```
//!
//! Each output has a `format_*` function (returns `Vec<String>` or a value)
//! for testability and a `print_*` wrapper that writes to stdout.

use serde::Serialize;

use crate::config::ProfileSet;
use crate::profile::{FallbackSource, PictureProfile};

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn join_widths(widths: &[u32]) -> String {
    widths
        .iter()
        .map(u32::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

fn fallback_line(profile: &PictureProfile) -> String {
    let width = match profile.fallback_width() {
        Some(w) => format!("{w}px"),
        None => return "Fallback: none (width left to the image backend)".to_string(),
    };
    let source = match profile.fallback_source() {
        FallbackSource::Explicit => "explicit".to_string(),
        FallbackSource::MediaCondition(index) => format!("media condition #{}", index + 1),
        FallbackSource::SrcSet => "largest srcset width".to_string(),
        FallbackSource::Unset => "unset".to_string(),
    };
    format!("Fallback: {width} ({source})")
}

/// Format one profile as a header line plus indented detail lines.
pub fn format_profile(name: &str, profile: &PictureProfile) -> Vec<String> {
    let pad = indent(1);
    let mut lines = vec![name.to_string()];

    lines.push(format!("{pad}{}", fallback_line(profile)));
    if !profile.srcset_widths.is_empty() {
        lines.push(format!("{pad}Srcset: {}", join_widths(&profile.srcset_widths)));
    }
    if !profile.sizes.is_empty() {
        lines.push(format!("{pad}Sizes: {}", profile.sizes.join(", ")));
    }
    if !profile.multi_image_media_conditions.is_empty() {
        lines.push(format!("{pad}Breakpoints:"));
        for condition in &profile.multi_image_media_conditions {
            lines.push(format!(
                "{}{} → {}px",
                indent(2),
                condition.media,
                condition.width
            ));
        }
    }
    if let Some(ratio) = profile.aspect_ratio() {
        lines.push(format!("{pad}Aspect ratio: {ratio}"));
    }
    if let Some(height) = profile.fixed_height {
        lines.push(format!("{pad}Fixed height: {height}px"));
    }
    lines.push(format!("{pad}Quality: {}", profile.quality));

    let webp = if profile.create_webp_for_format.is_empty() {
        "none".to_string()
    } else {
        profile
            .create_webp_for_format
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    };
    lines.push(format!("{pad}WebP for: {webp}"));
    lines.push(format!("{pad}Decoding: {}", profile.image_decoding));
    if profile.img_width_height {
        lines.push(format!("{pad}Width/height attributes: on"));
    }
    if profile.show_info {
        lines.push(format!("{pad}Info overlay: on"));
    }
    lines
}

/// Format every profile in the set, separated by blank lines, plus a count.
pub fn format_check_output(set: &ProfileSet) -> Vec<String> {
    let mut lines = Vec::new();
    for (name, profile) in set.iter() {
        lines.extend(format_profile(name, profile));
        lines.push(String::new());
    }
    let noun = if set.len() == 1 { "profile" } else { "profiles" };
    lines.push(format!("{} {noun}", set.len()));
    lines
}

pub fn print_check_output(set: &ProfileSet) {
    for line in format_check_output(set) {
        println!("{}", line);
    }
}

#[derive(Serialize)]
struct ResolvedProfile<'a> {
    #[serde(flatten)]
    profile: &'a PictureProfile,
    resolved_fallback_width: Option<u32>,
    fallback_source: FallbackSource,
}

/// Profiles keyed by name, each with its derived fallback width.
pub fn format_check_json(set: &ProfileSet) -> serde_json::Result<String> {
    let resolved: std::collections::BTreeMap<&str, ResolvedProfile<'_>> = set
        .iter()
        .map(|(name, profile)| {
            (
                name,
                ResolvedProfile {
                    profile,
                    resolved_fallback_width: profile.fallback_width(),
                    fallback_source: profile.fallback_source(),
                },
            )
        })
        .collect();
    serde_json::to_string_pretty(&resolved)
}
