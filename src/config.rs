//! Profile file loading.
//!
//! Named profiles live in a single TOML file. Each profile is layered over
//! the stock defaults and an optional shared `[defaults]` table:
//!
//! ```text
//! stock defaults  →  [defaults]  →  [profiles.<name>]
//! ```
//!
//! ## File Format
//!
//! ```toml
//! [defaults]                  # Optional, applies to every profile
//! quality = 75
//!
//! [profiles.hero]
//! srcset_widths = [640, 1024, 1600]
//! sizes = ["(max-width: 1024px) 100vw", "1600px"]
//! aspect_ratio = 1.777
//!
//! [profiles.article]
//! multi_image_media_conditions = [
//!     { media = "(max-width: 640px)", width = 640 },
//!     { media = "(min-width: 641px)", width = 1200 },
//! ]
//! create_webp_for_format = ["jpg", "png"]
//! ```
//!
//! Tables merge key by key. Arrays and scalars replace, so a profile's
//! `create_webp_for_format` never merges with the default `["jpg"]`.
//!
//! Unknown keys are rejected to catch typos early.
//!
//! ## Validation
//!
//! The profile model stores whatever it is given. Loading is where
//! out-of-range values are rejected: quality outside 1-100, zero widths or
//! fixed height, empty media queries and negative or non-finite aspect
//! ratios. Setting both `aspect_ratio` and `fixed_height` is allowed and only
//! logged, once per declared profile.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::profile::PictureProfile;
use crate::types::ImageFormat;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("profile `{name}`: {source}")]
    Profile {
        name: String,
        #[source]
        source: toml::de::Error,
    },
    #[error("Config validation error: {0}")]
    Validation(String),
    #[error("unknown image format `{0}`")]
    UnknownImageFormat(String),
}

/// Top-level layout of a profile file, before layering.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ProfileFile {
    defaults: Option<toml::Value>,
    profiles: BTreeMap<String, toml::Value>,
}

/// Named profiles resolved from a profile file, ordered by name.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ProfileSet {
    profiles: BTreeMap<String, PictureProfile>,
}

impl ProfileSet {
    pub fn get(&self, name: &str) -> Option<&PictureProfile> {
        self.profiles.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PictureProfile)> {
        self.profiles.iter().map(|(name, p)| (name.as_str(), p))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.profiles.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    /// Add or replace a profile.
    pub fn insert(&mut self, name: impl Into<String>, profile: PictureProfile) {
        self.profiles.insert(name.into(), profile);
    }
}

impl FromIterator<(String, PictureProfile)> for ProfileSet {
    fn from_iter<I: IntoIterator<Item = (String, PictureProfile)>>(iter: I) -> Self {
        Self {
            profiles: iter.into_iter().collect(),
        }
    }
}

// =============================================================================
// Loading, merging, and validation
// =============================================================================

/// Returns the stock default profile as a `toml::Value::Table`.
///
/// Base layer for every profile; unset optional fields are absent from it.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    toml::Value::try_from(PictureProfile::default())
        .map_err(|e| ConfigError::Validation(format!("stock defaults: {e}")))
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Resolve a parsed profile file into validated profiles.
pub fn resolve_profiles(raw: toml::Value) -> Result<ProfileSet, ConfigError> {
    let file: ProfileFile = raw.try_into()?;

    let mut base = stock_defaults_value()?;
    if let Some(defaults) = file.defaults {
        base = merge_toml(base, defaults);
    }
    // Catch typos in [defaults] even when no profile is declared.
    resolve_layer("defaults", base.clone())?;

    let mut set = ProfileSet::default();
    for (name, overlay) in file.profiles {
        let profile = resolve_layer(&name, merge_toml(base.clone(), overlay))?;
        set.insert(name, profile);
    }
    for name in height_conflicts(&set) {
        log::warn!(
            "profile `{name}` sets both aspect_ratio and fixed_height; the renderer decides which applies"
        );
    }
    Ok(set)
}

/// Profiles that set both `aspect_ratio` and `fixed_height`.
pub fn height_conflicts(set: &ProfileSet) -> Vec<&str> {
    set.iter()
        .filter(|(_, p)| p.aspect_ratio().is_some() && p.fixed_height.is_some())
        .map(|(name, _)| name)
        .collect()
}

/// Deserialize and validate one merged layer.
fn resolve_layer(name: &str, merged: toml::Value) -> Result<PictureProfile, ConfigError> {
    check_image_formats(&merged)?;
    let profile: PictureProfile = merged.try_into().map_err(|source| ConfigError::Profile {
        name: name.to_string(),
        source,
    })?;
    validate_profile(name, &profile)?;
    Ok(profile)
}

/// Surface unknown `create_webp_for_format` names as
/// [`ConfigError::UnknownImageFormat`] instead of a generic profile error.
fn check_image_formats(merged: &toml::Value) -> Result<(), ConfigError> {
    let Some(formats) = merged
        .get("create_webp_for_format")
        .and_then(toml::Value::as_array)
    else {
        return Ok(());
    };
    for name in formats.iter().filter_map(toml::Value::as_str) {
        name.parse::<ImageFormat>()?;
    }
    Ok(())
}

/// Check that values are within the ranges the image backend accepts.
pub fn validate_profile(name: &str, profile: &PictureProfile) -> Result<(), ConfigError> {
    let invalid = |msg: &str| -> Result<(), ConfigError> {
        Err(ConfigError::Validation(format!("profile `{name}`: {msg}")))
    };

    if !(1..=100).contains(&profile.quality) {
        return invalid("quality must be 1-100");
    }
    if profile.srcset_widths.contains(&0) {
        return invalid("srcset_widths values must be non-zero");
    }
    for condition in &profile.multi_image_media_conditions {
        if condition.width == 0 {
            return invalid("multi_image_media_conditions widths must be non-zero");
        }
        if condition.media.trim().is_empty() {
            return invalid("multi_image_media_conditions media must not be empty");
        }
    }
    if profile.fixed_height == Some(0) {
        return invalid("fixed_height must be non-zero");
    }
    if let Some(ratio) = profile.aspect_ratio {
        if !ratio.is_finite() || ratio < 0.0 {
            return invalid("aspect_ratio must be a finite number >= 0");
        }
    }
    Ok(())
}

/// Parse and resolve profiles from TOML text.
pub fn parse_profiles(content: &str) -> Result<ProfileSet, ConfigError> {
    let raw: toml::Value = toml::from_str(content)?;
    resolve_profiles(raw)
}

/// Load profiles from a profile file.
pub fn load_profiles(path: &Path) -> Result<ProfileSet, ConfigError> {
    let content = fs::read_to_string(path)?;
    let set = parse_profiles(&content)?;
    log::debug!("loaded {} profile(s) from {}", set.len(), path.display());
    Ok(set)
}

/// Returns a fully-commented stock profile file.
///
/// Used by the `gen-config` CLI command.
pub fn stock_profiles_toml() -> &'static str {
    r##"# Picture Profiles
# ================
# Each [profiles.<name>] table is one responsive image policy.
# Values in [defaults] apply to every profile; the values shown are the
# stock defaults. Unknown keys will cause an error.

[defaults]
# Encoding quality passed to the image backend (1 = worst, 100 = best).
quality = 80

# Source formats that also get a WebP variant. Setting this in a profile
# replaces the list, it does not add to it. Known: jpg, png, webp, gif.
create_webp_for_format = ["jpg"]

# Render width and height attributes on the <img> element.
img_width_height = false

# decoding attribute of the <img> element: "sync", "async" or "auto".
image_decoding = "async"

# Diagnostic overlay.
show_info = false

# ---------------------------------------------------------------------------
# Profiles
# ---------------------------------------------------------------------------
# Keys available per profile, in addition to the ones above:
#
#   srcset_widths = [320, 640, 1024]          # widths offered in srcset
#   sizes = ["(max-width: 640px) 100vw", "640px"]
#   multi_image_media_conditions = [          # a different image per breakpoint
#       { media = "(max-width: 640px)", width = 640 },
#   ]
#   fallback_width = 1024   # <img src> width; defaults to the largest
#                           # media condition width, then the largest srcset width
#   aspect_ratio = 1.777    # width / height
#   fixed_height = 400      # static height without a fixed ratio

[profiles.default]
srcset_widths = [320, 640, 768, 1024, 1366, 1600, 1920]
sizes = ["(max-width: 640px) 100vw", "(max-width: 1200px) 80vw", "1200px"]
"##
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ImageDecoding, ImageFormat};
    use tempfile::TempDir;

    // =========================================================================
    // parse_profiles tests
    // =========================================================================

    #[test]
    fn empty_file_has_no_profiles() {
        let set = parse_profiles("").unwrap();
        assert!(set.is_empty());
    }

    #[test]
    fn profile_gets_stock_defaults() {
        let set = parse_profiles(
            r#"
[profiles.thumb]
srcset_widths = [150, 300]
"#,
        )
        .unwrap();
        let thumb = set.get("thumb").unwrap();
        assert_eq!(thumb.quality, 80);
        assert_eq!(thumb.create_webp_for_format, vec![ImageFormat::Jpeg]);
        assert_eq!(thumb.image_decoding, ImageDecoding::Async);
        assert_eq!(thumb.fallback_width(), Some(300));
    }

    #[test]
    fn defaults_table_applies_to_all_profiles() {
        let set = parse_profiles(
            r#"
[defaults]
quality = 65
image_decoding = "auto"

[profiles.a]
srcset_widths = [400]

[profiles.b]
quality = 90
"#,
        )
        .unwrap();
        let a = set.get("a").unwrap();
        let b = set.get("b").unwrap();
        assert_eq!(a.quality, 65);
        assert_eq!(a.image_decoding, ImageDecoding::Auto);
        // Profile value beats [defaults]
        assert_eq!(b.quality, 90);
        assert_eq!(b.image_decoding, ImageDecoding::Auto);
    }

    #[test]
    fn webp_formats_replace_not_merge() {
        let set = parse_profiles(
            r#"
[defaults]
create_webp_for_format = ["jpg", "gif"]

[profiles.png_only]
create_webp_for_format = ["png"]
"#,
        )
        .unwrap();
        let p = set.get("png_only").unwrap();
        assert_eq!(p.create_webp_for_format, vec![ImageFormat::Png]);
    }

    #[test]
    fn empty_webp_formats_is_allowed() {
        let set = parse_profiles(
            r#"
[profiles.none]
create_webp_for_format = []
"#,
        )
        .unwrap();
        assert!(set.get("none").unwrap().create_webp_for_format.is_empty());
    }

    #[test]
    fn zero_fallback_width_reads_as_unset() {
        let set = parse_profiles(
            r#"
[profiles.legacy]
srcset_widths = [320, 640]
fallback_width = 0
aspect_ratio = 0.0
"#,
        )
        .unwrap();
        let p = set.get("legacy").unwrap();
        assert_eq!(p.fallback_width(), Some(640));
        assert_eq!(p.aspect_ratio(), None);
    }

    #[test]
    fn profiles_are_ordered_by_name() {
        let set = parse_profiles(
            r#"
[profiles.zeta]
[profiles.alpha]
[profiles.mid]
"#,
        )
        .unwrap();
        let names: Vec<&str> = set.names().collect();
        assert_eq!(names, vec!["alpha", "mid", "zeta"]);
    }

    #[test]
    fn height_conflicts_from_defaults_name_each_profile_once() {
        let set = parse_profiles(
            r#"
[defaults]
aspect_ratio = 1.5
fixed_height = 300

[profiles.a]
[profiles.b]
[profiles.c]
fixed_height = 200
aspect_ratio = 0.0
"#,
        )
        .unwrap();
        assert_eq!(height_conflicts(&set), vec!["a", "b"]);
    }

    #[test]
    fn both_height_constraints_load() {
        let set = parse_profiles(
            r#"
[profiles.wide]
aspect_ratio = 2.0
fixed_height = 300
"#,
        )
        .unwrap();
        let p = set.get("wide").unwrap();
        assert_eq!(p.aspect_ratio(), Some(2.0));
        assert_eq!(p.fixed_height, Some(300));
    }

    // =========================================================================
    // Unknown key rejection tests
    // =========================================================================

    #[test]
    fn unknown_top_level_key_rejected() {
        let result = parse_profiles("[profile.hero]\nquality = 80\n");
        assert!(matches!(result, Err(ConfigError::Toml(_))));
    }

    #[test]
    fn unknown_profile_key_names_profile() {
        let result = parse_profiles(
            r#"
[profiles.hero]
qualty = 80
"#,
        );
        match result {
            Err(ConfigError::Profile { name, source }) => {
                assert_eq!(name, "hero");
                assert!(source.to_string().contains("unknown field"));
            }
            other => panic!("expected profile error, got {other:?}"),
        }
    }

    #[test]
    fn unknown_defaults_key_rejected_without_profiles() {
        let result = parse_profiles(
            r#"
[defaults]
show_infos = true
"#,
        );
        assert!(matches!(result, Err(ConfigError::Profile { ref name, .. }) if name == "defaults"));
    }

    #[test]
    fn unknown_image_format_rejected() {
        let result = parse_profiles(
            r#"
[profiles.hero]
create_webp_for_format = ["tiff"]
"#,
        );
        assert!(matches!(result, Err(ConfigError::UnknownImageFormat(ref s)) if s == "tiff"));
    }

    #[test]
    fn unknown_image_format_in_defaults_rejected() {
        let result = parse_profiles(
            r#"
[defaults]
create_webp_for_format = ["jpg", "bmp"]
"#,
        );
        assert!(matches!(result, Err(ConfigError::UnknownImageFormat(ref s)) if s == "bmp"));
    }

    #[test]
    fn image_format_names_parse_like_from_str() {
        let set = parse_profiles(
            r#"
[profiles.a]
create_webp_for_format = ["JPG", ".png", "jpeg"]
"#,
        )
        .unwrap();
        assert_eq!(
            set.get("a").unwrap().create_webp_for_format,
            vec![ImageFormat::Jpeg, ImageFormat::Png, ImageFormat::Jpeg]
        );
    }

    #[test]
    fn unknown_media_condition_key_rejected() {
        let result = parse_profiles(
            r#"
[profiles.hero]
multi_image_media_conditions = [{ media = "(max-width: 640px)", widht = 640 }]
"#,
        );
        assert!(result.is_err());
    }

    // =========================================================================
    // Validation tests
    // =========================================================================

    #[test]
    fn validate_default_profile_passes() {
        assert!(validate_profile("default", &PictureProfile::default()).is_ok());
    }

    #[test]
    fn validate_quality_boundaries() {
        let mut p = PictureProfile::default();
        p.quality = 1;
        assert!(validate_profile("p", &p).is_ok());
        p.quality = 100;
        assert!(validate_profile("p", &p).is_ok());
        p.quality = 0;
        assert!(validate_profile("p", &p).is_err());
        p.quality = 101;
        let err = validate_profile("p", &p).unwrap_err();
        assert!(err.to_string().contains("quality"));
        assert!(err.to_string().contains("`p`"));
    }

    #[test]
    fn validate_zero_srcset_width() {
        let p = PictureProfile {
            srcset_widths: vec![320, 0],
            ..PictureProfile::default()
        };
        assert!(matches!(
            validate_profile("p", &p),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn validate_media_condition_values() {
        use crate::types::MediaCondition;

        let zero = PictureProfile {
            multi_image_media_conditions: vec![MediaCondition::new("(max-width: 640px)", 0)],
            ..PictureProfile::default()
        };
        assert!(validate_profile("p", &zero).is_err());

        let blank = PictureProfile {
            multi_image_media_conditions: vec![MediaCondition::new("  ", 640)],
            ..PictureProfile::default()
        };
        assert!(validate_profile("p", &blank).is_err());
    }

    #[test]
    fn validate_zero_fixed_height() {
        let mut p = PictureProfile::default();
        p.fixed_height = Some(0);
        let err = validate_profile("p", &p).unwrap_err();
        assert!(err.to_string().contains("fixed_height"));
        p.fixed_height = Some(1);
        assert!(validate_profile("p", &p).is_ok());
    }

    #[test]
    fn parse_rejects_zero_fixed_height() {
        let result = parse_profiles(
            r#"
[profiles.banner]
fixed_height = 0
"#,
        );
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn validate_aspect_ratio() {
        let mut p = PictureProfile::default();
        p.aspect_ratio = Some(-1.0);
        assert!(validate_profile("p", &p).is_err());
        p.aspect_ratio = Some(f64::INFINITY);
        assert!(validate_profile("p", &p).is_err());
        p.aspect_ratio = Some(0.0);
        assert!(validate_profile("p", &p).is_ok());
    }

    #[test]
    fn parse_rejects_invalid_quality() {
        let result = parse_profiles(
            r#"
[defaults]
quality = 200
"#,
        );
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    // =========================================================================
    // load_profiles tests
    // =========================================================================

    #[test]
    fn load_profiles_reads_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("profiles.toml");
        fs::write(
            &path,
            r#"
[profiles.hero]
srcset_widths = [640, 1280]
fallback_width = 960
"#,
        )
        .unwrap();

        let set = load_profiles(&path).unwrap();
        assert_eq!(set.len(), 1);
        assert_eq!(set.get("hero").unwrap().fallback_width(), Some(960));
    }

    #[test]
    fn load_profiles_missing_file_is_io_error() {
        let tmp = TempDir::new().unwrap();
        let result = load_profiles(&tmp.path().join("missing.toml"));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn load_profiles_invalid_toml_is_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("profiles.toml");
        fs::write(&path, "this is not valid toml [[[").unwrap();
        assert!(matches!(load_profiles(&path), Err(ConfigError::Toml(_))));
    }

    // =========================================================================
    // merge_toml tests
    // =========================================================================

    #[test]
    fn merge_toml_scalar_override() {
        let base: toml::Value = toml::from_str("quality = 80").unwrap();
        let overlay: toml::Value = toml::from_str("quality = 60").unwrap();
        let merged = merge_toml(base, overlay);
        assert_eq!(merged.get("quality").unwrap().as_integer(), Some(60));
    }

    #[test]
    fn merge_toml_array_replaces() {
        let base: toml::Value = toml::from_str(r#"create_webp_for_format = ["jpg"]"#).unwrap();
        let overlay: toml::Value = toml::from_str(r#"create_webp_for_format = ["png"]"#).unwrap();
        let merged = merge_toml(base, overlay);
        let formats = merged.get("create_webp_for_format").unwrap().as_array().unwrap();
        assert_eq!(formats.len(), 1);
        assert_eq!(formats[0].as_str(), Some("png"));
    }

    #[test]
    fn merge_toml_preserves_base_keys() {
        let base: toml::Value = toml::from_str("quality = 80\nshow_info = false").unwrap();
        let overlay: toml::Value = toml::from_str("quality = 70").unwrap();
        let merged = merge_toml(base, overlay);
        assert_eq!(merged.get("quality").unwrap().as_integer(), Some(70));
        assert_eq!(merged.get("show_info").unwrap().as_bool(), Some(false));
    }

    // =========================================================================
    // Stock file tests
    // =========================================================================

    #[test]
    fn stock_defaults_value_is_table() {
        let val = stock_defaults_value().unwrap();
        assert!(val.is_table());
        assert_eq!(val.get("quality").unwrap().as_integer(), Some(80));
        assert!(val.get("fallback_width").is_none());
    }

    #[test]
    fn stock_profiles_toml_loads() {
        let set = parse_profiles(stock_profiles_toml()).unwrap();
        let p = set.get("default").unwrap();
        assert_eq!(p.quality, 80);
        assert_eq!(p.fallback_width(), Some(1920));
    }

    #[test]
    fn stock_profiles_toml_defaults_match_stock() {
        let raw: toml::Value = toml::from_str(stock_profiles_toml()).unwrap();
        let defaults: PictureProfile = raw.get("defaults").cloned().unwrap().try_into().unwrap();
        assert_eq!(defaults, PictureProfile::default());
    }
}
