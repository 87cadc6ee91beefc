//! Accuracy thresholds shared by all profile instances.
//!
//! A single [`AccuracyParams`] value is constructed once (usually with
//! [`AccuracyParams::default`]) and shared by reference (`Arc`) across every
//! profile built from it. It is never mutated after construction; the
//! profiles read it only during their own construction, when they derive
//! their sampling parameters and series cutover thresholds.

use std::sync::Arc;

use crate::error::ProfileError;

/// Tolerance constants controlling rendering accuracy.
///
/// All values must be finite and positive. The two accuracy fields are
/// small fractions (much less than one); `stepk_minimum_hlr` is a
/// dimensionless multiple of the profile's half-light radius.
#[derive(Debug, Clone, PartialEq)]
pub struct AccuracyParams {
    /// Absolute accuracy of Fourier-amplitude evaluation, as a fraction of
    /// total flux. Controls the Taylor-series cutover and the zero clip.
    pub kvalue_accuracy: f64,
    /// Tolerated real-space error from truncating the frequency grid
    /// (aliasing/folding), as a fraction of total flux. Controls `step_k`.
    pub folding_threshold: f64,
    /// Amplitude level treated as negligible when choosing the maximum
    /// frequency `max_k`, as a fraction of total flux.
    pub maxk_threshold: f64,
    /// Lower bound on the real-space extent used for `step_k`, in units of
    /// the profile's half-light radius.
    pub stepk_minimum_hlr: f64,
}

impl Default for AccuracyParams {
    fn default() -> Self {
        Self {
            kvalue_accuracy: 1.0e-5,
            folding_threshold: 5.0e-3,
            maxk_threshold: 1.0e-3,
            stepk_minimum_hlr: 5.0,
        }
    }
}

impl AccuracyParams {
    /// Validate and wrap a parameter set for sharing across profiles.
    pub fn new(
        kvalue_accuracy: f64,
        folding_threshold: f64,
        maxk_threshold: f64,
        stepk_minimum_hlr: f64,
    ) -> Result<Arc<Self>, ProfileError> {
        let params = Self {
            kvalue_accuracy,
            folding_threshold,
            maxk_threshold,
            stepk_minimum_hlr,
        };
        params.validate()?;
        Ok(Arc::new(params))
    }

    /// Check the invariants documented on the struct fields.
    pub fn validate(&self) -> Result<(), ProfileError> {
        let checks = [
            ("kvalue_accuracy", self.kvalue_accuracy, true),
            ("folding_threshold", self.folding_threshold, true),
            ("maxk_threshold", self.maxk_threshold, true),
            ("stepk_minimum_hlr", self.stepk_minimum_hlr, false),
        ];
        for (name, value, strictly_positive) in checks {
            if !value.is_finite() {
                return Err(ProfileError::NonFinite {
                    context: "accuracy parameter validation",
                });
            }
            if strictly_positive && value <= 0.0 {
                return Err(ProfileError::InvalidParameter {
                    name,
                    value,
                    expected: "a finite value > 0",
                });
            }
            if !strictly_positive && value < 0.0 {
                return Err(ProfileError::InvalidParameter {
                    name,
                    value,
                    expected: "a finite value >= 0",
                });
            }
        }
        Ok(())
    }

    /// Default parameters, pre-wrapped for sharing.
    pub fn shared_default() -> Arc<Self> {
        Arc::new(Self::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(AccuracyParams::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_nonpositive_threshold() {
        let result = AccuracyParams::new(1e-5, 0.0, 1e-3, 5.0);
        assert!(matches!(
            result,
            Err(ProfileError::InvalidParameter { name: "folding_threshold", .. })
        ));
    }

    #[test]
    fn test_rejects_non_finite() {
        let result = AccuracyParams::new(f64::NAN, 5e-3, 1e-3, 5.0);
        assert!(matches!(result, Err(ProfileError::NonFinite { .. })));
    }

    #[test]
    fn test_zero_minimum_hlr_allowed() {
        assert!(AccuracyParams::new(1e-5, 5e-3, 1e-3, 0.0).is_ok());
    }
}
