//! Spergel profile.
//!
//! A galaxy-light model whose Fourier transform is the simple power law
//!
//! ```text
//! F(k) = flux · (1 + k² r0²)^(-1-ν)
//! ```
//!
//! with a continuously tunable index `ν`. Real space follows by Hankel
//! transform:
//!
//! ```text
//! I(r) = flux / (2^(ν+1) π Γ(1+ν) r0²) · (r/r0)^ν K_ν(r/r0)
//! ```
//!
//! where `K_ν` is the modified Bessel function of the second kind. The
//! index interpolates between roughly Gaussian-like (`ν` near the top of
//! the range) and steeply cuspy (`ν` negative) light distributions; at
//! `ν = 1/2` the model is exactly the circular exponential disk.
//!
//! Constants that depend only on `ν` (the half-light ratio `c_ν`, the
//! gamma-function normalizations) cost a root solve plus Bessel
//! evaluations, so they are computed once per index and shared through a
//! bounded cache; see [`crate::cache`].

use std::f64::consts::PI;
use std::sync::Arc;

use libm::tgamma;
use ndarray::Array2;
use num_complex::Complex64;
use once_cell::sync::Lazy;
use rand::RngCore;
use tracing::debug;

use crate::accuracy::AccuracyParams;
use crate::cache::ProfileCache;
use crate::error::ProfileError;
use crate::grid::{self, KGrid, ShearedKGrid};
use crate::math::bessel_kv;
use crate::profile::{Photon, Profile};
use crate::solve::BracketSolver;

/// Valid range of the Spergel index.
///
/// Below the lower bound the profile is not normalizable; above the upper
/// bound the real-space cusp flattens into territory better served by
/// other models, and the enclosed-flux solve degrades.
pub const MIN_SPERGEL_NU: f64 = -0.9;
pub const MAX_SPERGEL_NU: f64 = 0.85;

/// Most entries the per-index cache will hold.
const MAX_SPERGEL_CACHE: usize = 100;

/// Indices closer than this are treated as the same cache entry.
const NU_QUANTUM: f64 = 1.0e-10;

static SPERGEL_CACHE: Lazy<ProfileCache<i64, SpergelInfo>> =
    Lazy::new(|| ProfileCache::new(MAX_SPERGEL_CACHE));

fn quantize_nu(nu: f64) -> i64 {
    (nu / NU_QUANTUM).round() as i64
}

/// Which radius the `size` argument of [`Spergel::new`] specifies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RadiusType {
    /// `size` is the scale radius `r0` directly.
    ScaleRadius,
    /// `size` is the radius enclosing half the total flux.
    HalfLightRadius,
}

/// Index-only constants, shared across instances through the cache.
#[derive(Debug)]
struct SpergelInfo {
    nu: f64,
    /// Half-light radius in scale-radius units.
    cnu: f64,
    /// `2^ν Γ(1+ν)`, the enclosed-flux normalization.
    norm: f64,
    /// Real-space prefactor `1 / (2^(ν+1) π Γ(1+ν))`.
    xnorm0: f64,
}

impl SpergelInfo {
    fn new(nu: f64) -> Result<Self, ProfileError> {
        let gamma_nup1 = tgamma(1.0 + nu);
        let norm = 2.0_f64.powf(nu) * gamma_nup1;
        let xnorm0 = 1.0 / (2.0 * PI * norm);

        let mut info = Self {
            nu,
            cnu: 0.0,
            norm,
            xnorm0,
        };
        info.cnu = info.flux_radius(0.5, 1.0e-12)?;
        debug!(nu, cnu = info.cnu, "computed spergel index constants");
        Ok(info)
    }

    /// Fraction of total flux enclosed within radius `u` scale radii.
    fn enclosed_flux(&self, u: f64) -> f64 {
        if u <= 0.0 {
            return 0.0;
        }
        1.0 - u.powf(1.0 + self.nu) * bessel_kv(1.0 + self.nu, u) / self.norm
    }

    /// Radius (in scale radii) enclosing the flux fraction `frac`.
    fn flux_radius(&self, frac: f64, xtol: f64) -> Result<f64, ProfileError> {
        // The bracket seed only needs the right order of magnitude; the
        // solver expands it. c_nu itself is solved with a generic seed
        // before being available.
        let seed = if self.cnu > 0.0 { self.cnu } else { 1.0 };
        let result = BracketSolver::new(|u| self.enclosed_flux(u) - frac, 0.5 * seed, 2.0 * seed)
            .with_lower_limit(0.0)
            .with_xtol(xtol)
            .find_root()?;
        Ok(result.root)
    }
}

/// Spergel profile with index `ν`, scale radius `r0`, and total flux.
#[derive(Debug, Clone)]
pub struct Spergel {
    nu: f64,
    r0: f64,
    flux: f64,
    inv_r0: f64,
    accuracy: Arc<AccuracyParams>,
    info: Arc<SpergelInfo>,

    // Derived at construction.
    ksq_min: f64,
    ksq_max: f64,
    stepk: f64,
    maxk: f64,
}

impl Spergel {
    /// Construct a profile from its index, a size (interpreted per
    /// `radius_type`), and total flux.
    pub fn new(
        nu: f64,
        size: f64,
        radius_type: RadiusType,
        flux: f64,
        accuracy: Arc<AccuracyParams>,
    ) -> Result<Self, ProfileError> {
        accuracy.validate()?;
        if !nu.is_finite() || nu < MIN_SPERGEL_NU || nu > MAX_SPERGEL_NU {
            return Err(ProfileError::InvalidParameter {
                name: "nu",
                value: nu,
                expected: "a value in [-0.9, 0.85]",
            });
        }
        if !(size > 0.0) || !size.is_finite() {
            return Err(ProfileError::InvalidParameter {
                name: "size",
                value: size,
                expected: "a finite value > 0",
            });
        }
        if !flux.is_finite() {
            return Err(ProfileError::NonFinite {
                context: "spergel construction",
            });
        }

        let info = SPERGEL_CACHE.get_or_try_insert(quantize_nu(nu), || SpergelInfo::new(nu))?;

        let r0 = match radius_type {
            RadiusType::ScaleRadius => size,
            RadiusType::HalfLightRadius => size / info.cnu,
        };

        // Taylor cutover: the next dropped term of the expansion of
        // (1 + ksq)^(-1-ν) is (1+ν)(2+ν)(3+ν)/6 ksq³.
        let acc = accuracy.kvalue_accuracy;
        let ksq_min = (6.0 * acc / ((1.0 + nu) * (2.0 + nu) * (3.0 + nu))).cbrt();

        // Zero clip and maxk are both algebraic inversions of the power
        // law; no solver needed for this profile's Fourier tail.
        let ksq_max = acc.powf(-1.0 / (1.0 + nu)) - 1.0;
        let maxk = (accuracy.maxk_threshold.powf(-1.0 / (1.0 + nu)) - 1.0).sqrt();

        // stepk from the folding criterion: the real-space extent is the
        // radius enclosing all but the folding threshold of the flux.
        let mut radius = info.flux_radius(1.0 - accuracy.folding_threshold, 1.0e-9)?;
        radius = radius.max(accuracy.stepk_minimum_hlr * info.cnu);
        let stepk = PI / radius;

        debug!(nu, r0, flux, stepk, maxk, "constructed spergel profile");

        if !(stepk > 0.0 && stepk.is_finite() && maxk > 0.0 && maxk.is_finite()) {
            return Err(ProfileError::NonFinite {
                context: "spergel sampling derivation",
            });
        }

        Ok(Self {
            nu,
            r0,
            flux,
            inv_r0: 1.0 / r0,
            accuracy,
            info,
            ksq_min,
            ksq_max,
            stepk,
            maxk,
        })
    }

    /// Spergel index.
    pub fn nu(&self) -> f64 {
        self.nu
    }

    /// Scale radius `r0`.
    pub fn scale_radius(&self) -> f64 {
        self.r0
    }

    /// Radius enclosing half the total flux.
    pub fn half_light_radius(&self) -> f64 {
        self.info.cnu * self.r0
    }

    /// Accuracy parameters this profile was calibrated against.
    pub fn accuracy(&self) -> &Arc<AccuracyParams> {
        &self.accuracy
    }

    /// Dimensionless amplitude at squared frequency `ksq` (scale-radius
    /// units).
    #[inline]
    fn amplitude(&self, ksq: f64) -> f64 {
        if ksq > self.ksq_max {
            0.0
        } else if ksq < self.ksq_min {
            1.0 - (1.0 + self.nu) * ksq * (1.0 - 0.5 * (2.0 + self.nu) * ksq)
        } else {
            (1.0 + ksq).powf(-1.0 - self.nu)
        }
    }
}

impl Profile for Spergel {
    fn flux(&self) -> f64 {
        self.flux
    }

    fn eval_real(&self, x: f64, y: f64) -> Result<f64, ProfileError> {
        let u = (x * x + y * y).sqrt() * self.inv_r0;
        let value = if u > 0.0 {
            u.powf(self.nu) * bessel_kv(self.nu, u)
        } else if self.nu > 0.0 {
            // Finite central value: u^ν K_ν(u) -> 2^(ν-1) Γ(ν) as u -> 0.
            2.0_f64.powf(self.nu - 1.0) * tgamma(self.nu)
        } else {
            // The cusp diverges at the origin for ν <= 0.
            f64::INFINITY
        };
        Ok(self.flux * self.info.xnorm0 * self.inv_r0 * self.inv_r0 * value)
    }

    fn eval_fourier(&self, kx: f64, ky: f64) -> Complex64 {
        let kxr = kx * self.r0;
        let kyr = ky * self.r0;
        Complex64::new(self.flux * self.amplitude(kxr * kxr + kyr * kyr), 0.0)
    }

    fn step_k(&self) -> f64 {
        self.stepk * self.inv_r0
    }

    fn max_k(&self) -> f64 {
        self.maxk * self.inv_r0
    }

    fn k_even_axes(&self) -> bool {
        // Circularly symmetric: the amplitude depends on ksq alone.
        true
    }

    fn fill_k_grid(&self, grid: &KGrid, out: &mut Array2<Complex64>) {
        grid::fill_k_grid(grid, out, self.k_even_axes(), |kx, ky| {
            self.eval_fourier(kx, ky)
        });
    }

    fn fill_k_grid_sheared(&self, grid: &ShearedKGrid, out: &mut Array2<Complex64>) {
        grid::fill_k_grid_sheared(grid, out, |kx, ky| self.eval_fourier(kx, ky));
    }

    fn shoot(&self, _n: usize, _rng: &mut dyn RngCore) -> Result<Vec<Photon>, ProfileError> {
        Err(ProfileError::NotImplemented(
            "photon shooting for the spergel profile",
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    /// Half-light radius of the exponential disk in scale radii; the
    /// ν = 1/2 Spergel profile must reproduce it.
    const EXP_HLR: f64 = 1.6783469900166605;

    fn spergel(nu: f64, r0: f64, flux: f64) -> Spergel {
        Spergel::new(
            nu,
            r0,
            RadiusType::ScaleRadius,
            flux,
            AccuracyParams::shared_default(),
        )
        .unwrap()
    }

    #[test]
    fn test_half_index_half_light_ratio() {
        // At ν = 1/2 the profile is the exponential disk, whose half-light
        // radius is known in closed form.
        let p = spergel(0.5, 1.0, 1.0);
        assert_relative_eq!(p.half_light_radius(), EXP_HLR, max_relative = 1e-9);
    }

    #[test]
    fn test_half_index_enclosed_flux_closed_form() {
        // Exponential disk: enclosed(R) = 1 - (1 + R) e^-R.
        let p = spergel(0.5, 1.0, 1.0);
        for &u in &[0.3f64, 1.0, 2.5, 6.0] {
            let expected = 1.0 - (1.0 + u) * (-u).exp();
            assert_relative_eq!(p.info.enclosed_flux(u), expected, max_relative = 1e-10);
        }
    }

    #[test]
    fn test_half_index_real_space_closed_form() {
        // Exponential disk: I(r) = flux e^(-r/r0) / (2 pi r0²).
        let p = spergel(0.5, 2.0, 3.0);
        for &r in &[0.1, 1.0, 4.0] {
            let expected = 3.0 * (-r / 2.0f64).exp() / (2.0 * PI * 4.0);
            assert_relative_eq!(p.eval_real(r, 0.0).unwrap(), expected, max_relative = 1e-10);
        }
    }

    #[test]
    fn test_zero_frequency_equals_flux() {
        let p = spergel(-0.4, 1.3, 11.5);
        assert_eq!(p.eval_fourier(0.0, 0.0), Complex64::new(11.5, 0.0));
    }

    #[test]
    fn test_fourier_power_law() {
        let p = spergel(0.3, 1.0, 2.0);
        for &k in &[0.5f64, 1.0, 3.0] {
            let expected = 2.0 * (1.0 + k * k).powf(-1.3);
            assert_relative_eq!(p.eval_fourier(k, 0.0).re, expected, max_relative = 1e-12);
        }
    }

    #[test]
    fn test_taylor_closed_form_continuity() {
        let p = spergel(0.7, 1.0, 1.0);
        let k_cut = p.ksq_min.sqrt();
        let below = p.eval_fourier(k_cut * (1.0 - 1e-9), 0.0).re;
        let above = p.eval_fourier(k_cut * (1.0 + 1e-9), 0.0).re;
        assert!(
            (below - above).abs() < p.accuracy().kvalue_accuracy,
            "cutover jump {}",
            (below - above).abs()
        );
    }

    #[test]
    fn test_amplitude_at_maxk_equals_threshold() {
        for &nu in &[-0.85, -0.2, 0.5, 0.85] {
            let p = spergel(nu, 1.0, 1.0);
            let amp = p.eval_fourier(p.max_k(), 0.0).re;
            assert_relative_eq!(
                amp,
                p.accuracy().maxk_threshold,
                max_relative = 1e-9
            );
        }
    }

    #[test]
    fn test_stepk_positive_across_index_range() {
        for &nu in &[-0.9, -0.5, 0.0, 0.5, 0.85] {
            let p = spergel(nu, 1.0, 1.0);
            assert!(p.step_k() > 0.0, "stepk at nu = {nu}");
            assert!(p.max_k() > p.step_k(), "maxk vs stepk at nu = {nu}");
        }
    }

    #[test]
    fn test_half_light_radius_construction() {
        let hlr = 3.0;
        let by_hlr = Spergel::new(
            0.3,
            hlr,
            RadiusType::HalfLightRadius,
            1.0,
            AccuracyParams::shared_default(),
        )
        .unwrap();
        assert_relative_eq!(by_hlr.half_light_radius(), hlr, max_relative = 1e-10);

        let by_scale = spergel(0.3, by_hlr.scale_radius(), 1.0);
        assert_eq!(
            by_hlr.eval_fourier(0.7, 0.4),
            by_scale.eval_fourier(0.7, 0.4)
        );
    }

    #[test]
    fn test_central_value_finite_for_positive_index() {
        let p = spergel(0.5, 1.0, 1.0);
        // ν = 1/2 central value is the exponential disk peak.
        assert_relative_eq!(
            p.eval_real(0.0, 0.0).unwrap(),
            1.0 / (2.0 * PI),
            max_relative = 1e-12
        );
    }

    #[test]
    fn test_central_cusp_diverges_for_negative_index() {
        let p = spergel(-0.5, 1.0, 1.0);
        assert!(p.eval_real(0.0, 0.0).unwrap().is_infinite());
    }

    #[test]
    fn test_index_constants_shared_through_cache() {
        let a = spergel(0.123456, 1.0, 1.0);
        let b = spergel(0.123456, 4.0, 9.0);
        assert!(Arc::ptr_eq(&a.info, &b.info));
    }

    #[test]
    fn test_index_range_enforced() {
        let accuracy = AccuracyParams::shared_default();
        for &nu in &[-0.95, 0.9, f64::NAN] {
            assert!(matches!(
                Spergel::new(nu, 1.0, RadiusType::ScaleRadius, 1.0, accuracy.clone()),
                Err(ProfileError::InvalidParameter { name: "nu", .. })
            ));
        }
    }

    #[test]
    fn test_invalid_size_rejected() {
        assert!(matches!(
            Spergel::new(
                0.5,
                0.0,
                RadiusType::ScaleRadius,
                1.0,
                AccuracyParams::shared_default()
            ),
            Err(ProfileError::InvalidParameter { name: "size", .. })
        ));
    }

    #[test]
    fn test_shooting_not_implemented() {
        let p = spergel(0.5, 1.0, 1.0);
        let mut rng = rand::thread_rng();
        assert!(matches!(
            p.shoot(10, &mut rng),
            Err(ProfileError::NotImplemented(_))
        ));
    }

    #[test]
    fn test_fill_k_grid_matches_pointwise_evaluation() {
        let p = spergel(-0.3, 0.8, 2.5);
        let grid = KGrid::centered(0.15, 0.12, 12, 10);
        let mut out = Array2::zeros((10, 12));
        p.fill_k_grid(&grid, &mut out);
        for j in 0..10 {
            for i in 0..12 {
                assert_eq!(out[[j, i]], p.eval_fourier(grid.kx_at(i), grid.ky_at(j)));
            }
        }
    }
}
