//! Slider and filter selection state.

use crate::core::params::{clamp_unit, NativeParameters, DEFAULT_SLIDER};
use crate::filters::registry::lookup;
use crate::filters::variant::FilterVariant;
use serde::{Deserialize, Serialize};

/// Current filter plus the two slider positions.
///
/// Slider values are always in `[0, 1]`; every write is clamped. They are
/// kept when the filter changes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FilterState {
    variant: FilterVariant,
    intensity: f64,
    radius: f64,
}

impl FilterState {
    /// State with the given values, clamped.
    pub fn new(variant: FilterVariant, intensity: f64, radius: f64) -> Self {
        Self {
            variant,
            intensity: clamp_unit(intensity),
            radius: clamp_unit(radius),
        }
    }

    /// Selected filter.
    pub fn variant(&self) -> FilterVariant {
        self.variant
    }

    /// Intensity slider in `[0, 1]`.
    pub fn intensity(&self) -> f64 {
        self.intensity
    }

    /// Radius slider in `[0, 1]`.
    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Switch filters; slider positions are kept.
    pub fn set_variant(&mut self, variant: FilterVariant) {
        self.variant = variant;
    }

    /// Set the intensity slider, clamped into `[0, 1]`.
    pub fn set_intensity(&mut self, value: f64) {
        self.intensity = clamp_unit(value);
    }

    /// Set the radius slider, clamped into `[0, 1]`.
    pub fn set_radius(&mut self, value: f64) {
        self.radius = clamp_unit(value);
    }

    /// Native parameters the current filter would receive.
    pub fn native_parameters(&self) -> NativeParameters {
        NativeParameters::from_sliders(lookup(self.variant), self.intensity, self.radius)
    }
}

impl Default for FilterState {
    fn default() -> Self {
        Self::new(FilterVariant::default(), DEFAULT_SLIDER, DEFAULT_SLIDER)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let state = FilterState::default();
        assert_eq!(state.variant(), FilterVariant::SepiaTone);
        assert_eq!(state.intensity(), 0.5);
        assert_eq!(state.radius(), 0.5);
    }

    #[test]
    fn test_writes_are_clamped() {
        let mut state = FilterState::new(FilterVariant::Bloom, 4.0, -3.0);
        assert_eq!((state.intensity(), state.radius()), (1.0, 0.0));

        state.set_intensity(f64::NAN);
        assert_eq!(state.intensity(), 0.5);
        state.set_radius(0.75);
        assert_eq!(state.radius(), 0.75);
    }

    #[test]
    fn test_sliders_persist_across_variants() {
        let mut state = FilterState::default();
        state.set_intensity(0.9);
        state.set_variant(FilterVariant::GaussianBlur);
        assert_eq!(state.intensity(), 0.9);
        assert_eq!(state.native_parameters().intensity, None);
        assert_eq!(state.native_parameters().radius, Some(25.0));
    }

    #[test]
    fn test_serde() {
        let state = FilterState::new(FilterVariant::Pixellate, 0.7, 0.1);
        let json = serde_json::to_string(&state).unwrap();
        assert!(json.contains("\"pixellate\""));
        let back: FilterState = serde_json::from_str(&json).unwrap();
        assert_eq!(back, state);
    }
}
