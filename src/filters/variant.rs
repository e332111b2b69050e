//! The fixed catalog of filter variants.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One named image filter from the fixed catalog.
///
/// The order of [`FilterVariant::all`] is the order the filter menu shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FilterVariant {
    /// Voronoi cells filled with their average colour.
    Crystallize,
    /// Edge detection.
    Edges,
    /// Gaussian blur.
    GaussianBlur,
    /// Square blocks.
    Pixellate,
    /// Warm brown tone.
    #[default]
    SepiaTone,
    /// Sharpening by subtracting a blurred copy.
    UnsharpMask,
    /// Darkened corners.
    Vignette,
    /// Soft glow around bright areas.
    Bloom,
    /// Inverted, tinted luminance.
    XRay,
    /// False-colour heat map.
    Thermal,
}

impl FilterVariant {
    /// All variants in menu order.
    pub fn all() -> &'static [FilterVariant] {
        &[
            FilterVariant::Crystallize,
            FilterVariant::Edges,
            FilterVariant::GaussianBlur,
            FilterVariant::Pixellate,
            FilterVariant::SepiaTone,
            FilterVariant::UnsharpMask,
            FilterVariant::Vignette,
            FilterVariant::Bloom,
            FilterVariant::XRay,
            FilterVariant::Thermal,
        ]
    }

    /// Stable snake_case identifier (e.g. "gaussian_blur").
    pub fn id(&self) -> &'static str {
        match self {
            FilterVariant::Crystallize => "crystallize",
            FilterVariant::Edges => "edges",
            FilterVariant::GaussianBlur => "gaussian_blur",
            FilterVariant::Pixellate => "pixellate",
            FilterVariant::SepiaTone => "sepia_tone",
            FilterVariant::UnsharpMask => "unsharp_mask",
            FilterVariant::Vignette => "vignette",
            FilterVariant::Bloom => "bloom",
            FilterVariant::XRay => "x_ray",
            FilterVariant::Thermal => "thermal",
        }
    }

    /// Name shown in the filter menu.
    pub fn display_name(&self) -> &'static str {
        match self {
            FilterVariant::Crystallize => "Crystallize",
            FilterVariant::Edges => "Edges",
            FilterVariant::GaussianBlur => "Gaussian Blur",
            FilterVariant::Pixellate => "Pixellate",
            FilterVariant::SepiaTone => "Sepia Tone",
            FilterVariant::UnsharpMask => "Unsharp Mask",
            FilterVariant::Vignette => "Vignette",
            FilterVariant::Bloom => "Bloom",
            FilterVariant::XRay => "X-Ray",
            FilterVariant::Thermal => "Thermal",
        }
    }
}

impl fmt::Display for FilterVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Error returned when a string names no known filter.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown filter '{0}'")]
pub struct UnknownFilter(pub String);

impl FromStr for FilterVariant {
    type Err = UnknownFilter;

    /// Accepts the id or the display name, ignoring case, spaces and dashes.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalize = |v: &str| {
            v.chars()
                .filter(|c| !matches!(c, ' ' | '-' | '_'))
                .flat_map(char::to_lowercase)
                .collect::<String>()
        };
        let wanted = normalize(s);

        FilterVariant::all()
            .iter()
            .copied()
            .find(|v| normalize(v.id()) == wanted)
            .ok_or_else(|| UnknownFilter(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_has_ten_unique_ids() {
        let ids: std::collections::HashSet<_> =
            FilterVariant::all().iter().map(|v| v.id()).collect();
        assert_eq!(ids.len(), 10);
    }

    #[test]
    fn test_parse_id_and_display_name() {
        assert_eq!("gaussian_blur".parse(), Ok(FilterVariant::GaussianBlur));
        assert_eq!("Gaussian Blur".parse(), Ok(FilterVariant::GaussianBlur));
        assert_eq!("X-Ray".parse(), Ok(FilterVariant::XRay));
        assert_eq!("SEPIA TONE".parse(), Ok(FilterVariant::SepiaTone));
        assert!("posterize".parse::<FilterVariant>().is_err());
    }

    #[test]
    fn test_default_is_sepia() {
        assert_eq!(FilterVariant::default(), FilterVariant::SepiaTone);
    }

    #[test]
    fn test_serde_uses_id() {
        let json = serde_json::to_string(&FilterVariant::XRay).unwrap();
        assert_eq!(json, "\"x_ray\"");
        let back: FilterVariant = serde_json::from_str("\"unsharp_mask\"").unwrap();
        assert_eq!(back, FilterVariant::UnsharpMask);
    }
}
