//! Filter registry: the static capability table plus the engine filters.
//!
//! [`lookup`] is the source of truth for which sliders drive which filter.
//! The registry also holds one [`ImageFilter`] per variant and can verify at
//! startup that each implementation reads exactly the parameters the table
//! promises.

use crate::core::params::AcceptedParameters;
use crate::filters::engine::ImageFilter;
use crate::filters::variant::FilterVariant;
use indexmap::IndexMap;
use log::{debug, warn};
use serde::Serialize;
use std::fmt;

/// Which parameters `variant` accepts.
///
/// Pure and total over the catalog.
pub const fn lookup(variant: FilterVariant) -> AcceptedParameters {
    match variant {
        FilterVariant::Crystallize => AcceptedParameters::new(false, true, false),
        FilterVariant::Edges => AcceptedParameters::new(true, false, false),
        FilterVariant::GaussianBlur => AcceptedParameters::new(false, true, false),
        FilterVariant::Pixellate => AcceptedParameters::new(false, false, true),
        FilterVariant::SepiaTone => AcceptedParameters::new(true, false, false),
        FilterVariant::UnsharpMask => AcceptedParameters::new(true, true, false),
        FilterVariant::Vignette => AcceptedParameters::new(true, true, false),
        FilterVariant::Bloom => AcceptedParameters::new(true, true, false),
        FilterVariant::XRay => AcceptedParameters::NONE,
        FilterVariant::Thermal => AcceptedParameters::NONE,
    }
}

/// Registry of engine filters, one per variant.
pub struct FilterRegistry {
    /// Filters indexed by variant, in registration order.
    filters: IndexMap<FilterVariant, Box<dyn ImageFilter>>,
}

impl FilterRegistry {
    /// Create a registry with no filters.
    pub fn empty() -> Self {
        Self {
            filters: IndexMap::new(),
        }
    }

    /// Create a registry pre-populated with built-in filters.
    pub fn with_builtins() -> Self {
        let mut registry = Self::empty();
        crate::filters::builtin::register_all(&mut registry);
        registry
    }

    /// Register a filter, replacing any earlier one for the same variant.
    pub fn register<F>(&mut self, filter: F)
    where
        F: ImageFilter + 'static,
    {
        let variant = filter.variant();
        if self.filters.insert(variant, Box::new(filter)).is_some() {
            debug!("Replaced engine filter for {}", variant);
        }
    }

    /// The engine filter for `variant`.
    pub fn filter(&self, variant: FilterVariant) -> Option<&dyn ImageFilter> {
        self.filters.get(&variant).map(|f| f.as_ref())
    }

    /// Static capability lookup (see [`lookup`]).
    pub fn lookup(&self, variant: FilterVariant) -> AcceptedParameters {
        lookup(variant)
    }

    /// Check if an engine filter is registered for `variant`.
    pub fn contains(&self, variant: FilterVariant) -> bool {
        self.filters.contains_key(&variant)
    }

    /// Registered variants in catalog (menu) order.
    pub fn variants(&self) -> Vec<FilterVariant> {
        FilterVariant::all()
            .iter()
            .copied()
            .filter(|v| self.contains(*v))
            .collect()
    }

    /// Search variants by id or display name.
    pub fn search(&self, query: &str) -> Vec<FilterVariant> {
        let query = query.to_lowercase();

        self.variants()
            .into_iter()
            .filter(|v| {
                v.id().contains(&query) || v.display_name().to_lowercase().contains(&query)
            })
            .collect()
    }

    /// Compare every catalog entry with the engine filter's declared inputs.
    pub fn verify_capabilities(&self) -> CapabilityReport {
        let mut report = CapabilityReport::default();

        for &variant in FilterVariant::all() {
            let expected = lookup(variant);
            match self.filter(variant) {
                None => {
                    warn!("No engine filter registered for {}", variant);
                    report.missing.push(variant);
                }
                Some(filter) => {
                    let actual = filter.accepted();
                    if actual == expected {
                        report.verified.push(variant);
                    } else {
                        warn!(
                            "Engine filter {} reads {:?}, capability table says {:?}",
                            variant,
                            actual.kinds(),
                            expected.kinds()
                        );
                        report.mismatches.push(CapabilityMismatch {
                            variant,
                            expected,
                            actual,
                        });
                    }
                }
            }
        }

        debug!("Capability check: {}", report.summary());
        report
    }

    /// Get the total number of registered filters.
    pub fn len(&self) -> usize {
        self.filters.len()
    }

    /// Check if registry is empty.
    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }
}

impl Default for FilterRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl fmt::Debug for FilterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterRegistry")
            .field("variants", &self.filters.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// A variant whose engine filter disagrees with the capability table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CapabilityMismatch {
    /// Filter whose declaration differs
    pub variant: FilterVariant,
    /// What the capability table says
    pub expected: AcceptedParameters,
    /// What the engine filter declares
    pub actual: AcceptedParameters,
}

/// Result of [`FilterRegistry::verify_capabilities`].
#[derive(Debug, Clone, Default, Serialize)]
pub struct CapabilityReport {
    /// Variants whose filter matches the table.
    pub verified: Vec<FilterVariant>,
    /// Variants with no engine filter.
    pub missing: Vec<FilterVariant>,
    /// Variants whose filter reads different parameters.
    pub mismatches: Vec<CapabilityMismatch>,
}

impl CapabilityReport {
    /// True if every variant was verified.
    pub fn is_consistent(&self) -> bool {
        self.missing.is_empty() && self.mismatches.is_empty()
    }

    /// One-line summary.
    pub fn summary(&self) -> String {
        if self.is_consistent() {
            format!("all {} filters match the capability table", self.verified.len())
        } else {
            format!(
                "{} verified, {} missing, {} mismatched",
                self.verified.len(),
                self.missing.len(),
                self.mismatches.len()
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::params::{NativeParameters, ParameterKind};
    use crate::filters::engine::{FilterFailure, FilterOutput};
    use image::DynamicImage;

    /// Claims to be a Gaussian blur but reads intensity.
    struct WrongBlur;

    impl ImageFilter for WrongBlur {
        fn variant(&self) -> FilterVariant {
            FilterVariant::GaussianBlur
        }

        fn input_keys(&self) -> &'static [ParameterKind] {
            &[ParameterKind::Intensity]
        }

        fn render(
            &self,
            image: &DynamicImage,
            _params: &NativeParameters,
        ) -> Result<FilterOutput, FilterFailure> {
            Ok(FilterOutput::full(image.clone()))
        }
    }

    #[test]
    fn test_lookup_table() {
        assert_eq!(lookup(FilterVariant::Crystallize), AcceptedParameters::new(false, true, false));
        assert_eq!(lookup(FilterVariant::Edges), AcceptedParameters::new(true, false, false));
        assert_eq!(lookup(FilterVariant::Pixellate), AcceptedParameters::new(false, false, true));
        assert_eq!(lookup(FilterVariant::Bloom), AcceptedParameters::new(true, true, false));
        assert!(lookup(FilterVariant::XRay).is_empty());
        assert!(lookup(FilterVariant::Thermal).is_empty());
    }

    #[test]
    fn test_builtins_cover_catalog() {
        let registry = FilterRegistry::with_builtins();
        assert_eq!(registry.len(), 10);
        assert_eq!(registry.variants(), FilterVariant::all().to_vec());
    }

    #[test]
    fn test_builtins_match_capability_table() {
        let report = FilterRegistry::with_builtins().verify_capabilities();
        assert!(report.is_consistent(), "{:?}", report);
        assert_eq!(report.verified.len(), 10);
    }

    #[test]
    fn test_verify_detects_mismatch_and_missing() {
        let mut registry = FilterRegistry::empty();
        registry.register(WrongBlur);

        let report = registry.verify_capabilities();
        assert!(!report.is_consistent());
        assert_eq!(report.missing.len(), 9);
        assert_eq!(report.mismatches.len(), 1);
        assert_eq!(report.mismatches[0].variant, FilterVariant::GaussianBlur);
        assert_eq!(report.mismatches[0].actual, AcceptedParameters::new(true, false, false));
    }

    #[test]
    fn test_register_replaces() {
        let mut registry = FilterRegistry::with_builtins();
        registry.register(WrongBlur);
        assert_eq!(registry.len(), 10);
        assert!(registry.filter(FilterVariant::GaussianBlur).unwrap().accepted().intensity);
    }

    #[test]
    fn test_search() {
        let registry = FilterRegistry::with_builtins();
        assert_eq!(registry.search("blur"), vec![FilterVariant::GaussianBlur]);
        assert_eq!(registry.search("x-ray"), vec![FilterVariant::XRay]);
        assert!(registry.search("nonexistent").is_empty());
    }
}
