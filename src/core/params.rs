//! Filter parameter kinds and the normalized-to-native scaling law.
//!
//! Sliders produce values in `[0.0, 1.0]`. Each filter accepts some subset of
//! {intensity, radius, scale}; the accepted ones are scaled into the native
//! range the filter engine expects:
//!
//! - intensity = `intensity_norm * 10`
//! - radius = `radius_norm * 50`
//! - scale = `intensity_norm * 10` (the intensity slider drives scale too)

use serde::{Deserialize, Serialize};
use std::fmt;

/// Native intensity at slider position 1.0.
pub const INTENSITY_SCALE: f64 = 10.0;

/// Native radius at slider position 1.0.
pub const RADIUS_SCALE: f64 = 50.0;

/// Native scale at intensity slider position 1.0.
pub const SCALE_SCALE: f64 = 10.0;

/// Slider position used when nothing else is known.
pub const DEFAULT_SLIDER: f64 = 0.5;

/// A numeric input a filter may accept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterKind {
    /// Strength of the effect
    Intensity,
    /// Spatial extent in pixels
    Radius,
    /// Block size in pixels
    Scale,
}

impl ParameterKind {
    /// All kinds.
    pub fn all() -> &'static [ParameterKind] {
        &[ParameterKind::Intensity, ParameterKind::Radius, ParameterKind::Scale]
    }

    /// Input key name as image filter libraries usually spell it.
    pub fn key(&self) -> &'static str {
        match self {
            ParameterKind::Intensity => "inputIntensity",
            ParameterKind::Radius => "inputRadius",
            ParameterKind::Scale => "inputScale",
        }
    }
}

impl fmt::Display for ParameterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParameterKind::Intensity => write!(f, "intensity"),
            ParameterKind::Radius => write!(f, "radius"),
            ParameterKind::Scale => write!(f, "scale"),
        }
    }
}

/// Which parameter kinds a filter accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct AcceptedParameters {
    /// Reads `inputIntensity`
    pub intensity: bool,
    /// Reads `inputRadius`
    pub radius: bool,
    /// Reads `inputScale`
    pub scale: bool,
}

impl AcceptedParameters {
    /// Accepts nothing.
    pub const NONE: AcceptedParameters = AcceptedParameters {
        intensity: false,
        radius: false,
        scale: false,
    };

    /// Build from explicit flags.
    pub const fn new(intensity: bool, radius: bool, scale: bool) -> Self {
        Self {
            intensity,
            radius,
            scale,
        }
    }

    /// Build from a list of kinds.
    pub fn from_kinds(kinds: &[ParameterKind]) -> Self {
        let mut accepted = Self::NONE;
        for kind in kinds {
            match kind {
                ParameterKind::Intensity => accepted.intensity = true,
                ParameterKind::Radius => accepted.radius = true,
                ParameterKind::Scale => accepted.scale = true,
            }
        }
        accepted
    }

    /// Whether `kind` is accepted.
    pub fn accepts(&self, kind: ParameterKind) -> bool {
        match kind {
            ParameterKind::Intensity => self.intensity,
            ParameterKind::Radius => self.radius,
            ParameterKind::Scale => self.scale,
        }
    }

    /// Accepted kinds in declaration order.
    pub fn kinds(&self) -> Vec<ParameterKind> {
        ParameterKind::all()
            .iter()
            .copied()
            .filter(|k| self.accepts(*k))
            .collect()
    }

    /// True if no slider has any effect on the filter.
    pub fn is_empty(&self) -> bool {
        *self == Self::NONE
    }
}

/// Parameter values in the filter engine's native ranges.
///
/// `None` leaves the engine default in place.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct NativeParameters {
    /// Native intensity (slider × 10)
    pub intensity: Option<f64>,
    /// Native radius (slider × 50)
    pub radius: Option<f64>,
    /// Native scale (intensity slider × 10)
    pub scale: Option<f64>,
}

impl NativeParameters {
    /// Scale normalized slider values into native values for the accepted kinds.
    pub fn from_sliders(accepted: AcceptedParameters, intensity_norm: f64, radius_norm: f64) -> Self {
        let intensity_norm = clamp_unit(intensity_norm);
        let radius_norm = clamp_unit(radius_norm);

        Self {
            intensity: accepted.intensity.then(|| intensity_norm * INTENSITY_SCALE),
            radius: accepted.radius.then(|| radius_norm * RADIUS_SCALE),
            scale: accepted.scale.then(|| intensity_norm * SCALE_SCALE),
        }
    }

    /// Native intensity, or `default` if not set.
    pub fn intensity_or(&self, default: f64) -> f64 {
        self.intensity.unwrap_or(default)
    }

    /// Native radius, or `default` if not set.
    pub fn radius_or(&self, default: f64) -> f64 {
        self.radius.unwrap_or(default)
    }

    /// Native scale, or `default` if not set.
    pub fn scale_or(&self, default: f64) -> f64 {
        self.scale.unwrap_or(default)
    }
}

impl fmt::Display for NativeParameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if let Some(v) = self.intensity {
            parts.push(format!("intensity={:.3}", v));
        }
        if let Some(v) = self.radius {
            parts.push(format!("radius={:.3}", v));
        }
        if let Some(v) = self.scale {
            parts.push(format!("scale={:.3}", v));
        }
        if parts.is_empty() {
            write!(f, "(defaults)")
        } else {
            write!(f, "{}", parts.join(", "))
        }
    }
}

/// Clamp a slider value into `[0, 1]`. NaN maps to the default position.
pub fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        DEFAULT_SLIDER
    } else {
        value.clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_accepted_from_kinds() {
        let accepted = AcceptedParameters::from_kinds(&[ParameterKind::Radius, ParameterKind::Intensity]);
        assert_eq!(accepted, AcceptedParameters::new(true, true, false));
        assert_eq!(accepted.kinds(), vec![ParameterKind::Intensity, ParameterKind::Radius]);
        assert!(AcceptedParameters::NONE.is_empty());
    }

    #[test]
    fn test_scale_reuses_intensity_slider() {
        let params = NativeParameters::from_sliders(AcceptedParameters::new(false, false, true), 0.7, 0.1);
        assert_eq!(params.scale, Some(0.7 * 10.0));
        assert_eq!(params.intensity, None);
        assert_eq!(params.radius, None);
    }

    #[test]
    fn test_clamp_unit() {
        assert_eq!(clamp_unit(-1.0), 0.0);
        assert_eq!(clamp_unit(2.0), 1.0);
        assert_eq!(clamp_unit(0.25), 0.25);
        assert_eq!(clamp_unit(f64::NAN), DEFAULT_SLIDER);
    }

    #[test]
    fn test_display() {
        let params = NativeParameters::from_sliders(AcceptedParameters::new(true, false, false), 0.2, 0.9);
        assert_eq!(params.to_string(), "intensity=2.000");
        assert_eq!(NativeParameters::default().to_string(), "(defaults)");
    }

    proptest! {
        #[test]
        fn scaling_is_linear_and_exact(i in 0.0f64..=1.0, r in 0.0f64..=1.0) {
            let all = AcceptedParameters::new(true, true, true);
            let params = NativeParameters::from_sliders(all, i, r);
            prop_assert_eq!(params.intensity, Some(i * 10.0));
            prop_assert_eq!(params.radius, Some(r * 50.0));
            prop_assert_eq!(params.scale, Some(i * 10.0));
        }

        #[test]
        fn unaccepted_kinds_stay_unset(i in 0.0f64..=1.0, r in 0.0f64..=1.0) {
            let params = NativeParameters::from_sliders(AcceptedParameters::NONE, i, r);
            prop_assert_eq!(params, NativeParameters::default());
        }
    }
}
