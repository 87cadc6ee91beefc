//! Inclined exponential disk profile.
//!
//! Models a galactic disk with an exponential radial profile and an
//! isothermal (sech²) vertical profile, viewed at an arbitrary inclination
//! angle. Face-on the disk is the circular exponential; tilting it
//! foreshortens one axis and convolves the projected light with the
//! vertical structure.
//!
//! # Fourier form
//!
//! In units of the scale radius, the amplitude factors as
//!
//! ```text
//! A(kx, ky) = (1 + kx² + (ky cos i)²)^(-3/2) · s / sinh(s),
//! s = (π/2) (h/r) |sin i| ky
//! ```
//!
//! The first factor is the foreshortened exponential disk, the second the
//! vertical-structure convolution. Both factors switch to Taylor
//! expansions near the origin (the square root and sinh are the expensive
//! parts) and the whole amplitude clips to zero once it is guaranteed
//! below the accuracy threshold; the cutover frequencies are derived from
//! the next dropped series term so the switch itself stays below that
//! threshold.
//!
//! There is no closed real-space form at general inclination, so
//! `eval_real` (and photon shooting) fail with `NotImplemented`.

use std::f64::consts::PI;
use std::sync::Arc;

use ndarray::Array2;
use num_complex::Complex64;
use rand::RngCore;
use tracing::debug;
use uom::si::f64::Angle;

use crate::accuracy::AccuracyParams;
use crate::error::ProfileError;
use crate::grid::{self, KGrid, ShearedKGrid};
use crate::profile::{Photon, Profile};
use crate::solve::BracketSolver;
use crate::units::AngleExt;

/// Half-light radius of the circular exponential disk, in scale radii.
pub(crate) const EXP_HLR: f64 = 1.6783469900166605;

/// Exponential disk inclined by an angle to the line of sight.
#[derive(Debug, Clone)]
pub struct InclinedExponential {
    inclination: Angle,
    r0: f64,
    h0: f64,
    flux: f64,
    inv_r0: f64,
    accuracy: Arc<AccuracyParams>,

    // Derived at construction.
    cosi: f64,
    half_pi_h_sini_over_r: f64,
    ksq_min: f64,
    ksq_max: f64,
    stepk: f64,
    maxk: f64,
}

/// Dimensionless amplitude (flux = 1, frequencies in scale-radius units).
///
/// Free function so the constructor can calibrate `maxk` before the struct
/// exists; kept `#[inline]` so grid fills monomorphize it into their inner
/// loop.
#[inline]
fn k_amplitude(
    kx: f64,
    ky: f64,
    cosi: f64,
    half_pi_h_sini_over_r: f64,
    ksq_min: f64,
    ksq_max: f64,
) -> f64 {
    let ky_cosi = ky * cosi;
    let ksq = kx * kx + ky_cosi * ky_cosi;

    if ksq > ksq_max {
        return 0.0;
    }
    let base = if ksq < ksq_min {
        // Quartic Taylor expansion of (1 + ksq)^(-3/2); the dropped term
        // is 35/16 ksq³, below kvalue_accuracy by choice of ksq_min.
        1.0 - 1.5 * ksq * (1.0 - 1.25 * ksq)
    } else {
        let t = 1.0 + ksq;
        1.0 / (t * t.sqrt())
    };

    let s = half_pi_h_sini_over_r * ky;
    let s2 = s * s;
    let conv = if s2 < ksq_min {
        1.0 - s2 / 6.0 * (1.0 - 7.0 * s2 / 60.0)
    } else {
        s / s.sinh()
    };

    base * conv
}

impl InclinedExponential {
    /// Construct a disk from physical parameters and derive its sampling
    /// parameters.
    ///
    /// `scale_radius` must be positive and `scale_height` non-negative,
    /// both in the same length units; `inclination` is the angle between
    /// the disk axis and the line of sight (0 = face-on, π/2 = edge-on).
    pub fn new(
        inclination: Angle,
        scale_radius: f64,
        scale_height: f64,
        flux: f64,
        accuracy: Arc<AccuracyParams>,
    ) -> Result<Self, ProfileError> {
        accuracy.validate()?;
        if !(scale_radius > 0.0) || !scale_radius.is_finite() {
            return Err(ProfileError::InvalidParameter {
                name: "scale_radius",
                value: scale_radius,
                expected: "a finite value > 0",
            });
        }
        if !(scale_height >= 0.0) || !scale_height.is_finite() {
            return Err(ProfileError::InvalidParameter {
                name: "scale_height",
                value: scale_height,
                expected: "a finite value >= 0",
            });
        }
        let incl_rad = inclination.as_radians();
        if !incl_rad.is_finite() || !flux.is_finite() {
            return Err(ProfileError::NonFinite {
                context: "inclined exponential construction",
            });
        }

        let cosi = incl_rad.cos().abs();
        let half_pi_h_sini_over_r =
            0.5 * PI * scale_height * incl_rad.sin().abs() / scale_radius;

        // Zero clip: (1 + ksq cos²i)^(-3/2) = kvalue_accuracy. The
        // convolution factor only suppresses further, so it is ignored
        // here and the clip stays conservative.
        let acc = accuracy.kvalue_accuracy;
        let ksq_max = (acc.powf(-1.0 / 1.5) - 1.0) / (cosi * cosi);

        // Taylor cutover: the next term of the base expansion is
        // 35/16 ksq³; keep it below kvalue_accuracy.
        let ksq_min = (acc * 16.0 / 35.0).cbrt();

        // stepk from the folding criterion of the circular exponential
        // disk, whose half-light radius bounds ours from above: solve
        // (1+R) exp(-R) = folding_threshold by fixed point.
        let logx = accuracy.folding_threshold.ln();
        let mut radius = -logx;
        for _ in 0..3 {
            radius = (1.0 + radius).ln() - logx;
        }
        radius = radius.max(accuracy.stepk_minimum_hlr * EXP_HLR);
        let stepk = PI / radius;

        // maxk: where the amplitude falls to maxk_threshold. Face-on the
        // tail is isotropic and algebraic; otherwise solve the worst of
        // the two axis-aligned directions, bracketing from the 1/cos i
        // scaling of the foreshortened axis.
        let maxk_min = accuracy.maxk_threshold.powf(-1.0 / 3.0);
        let maxk = if cosi >= 1.0 {
            maxk_min
        } else {
            let maxk_max = if cosi > 0.01 {
                if cosi < 0.96 {
                    maxk_min / cosi
                } else {
                    1.05 * maxk_min
                }
            } else {
                100.0 * maxk_min
            };
            let threshold = accuracy.maxk_threshold;
            let f = |k: f64| {
                let along_ky = k_amplitude(0.0, k, cosi, half_pi_h_sini_over_r, ksq_min, ksq_max);
                let along_kx = k_amplitude(k, 0.0, cosi, half_pi_h_sini_over_r, ksq_min, ksq_max);
                along_ky.max(along_kx) - threshold
            };
            let mut solver = BracketSolver::new(f, maxk_min, maxk_max).with_lower_limit(0.0);
            solver.bracket()?;
            let result = solver.root()?;
            // Add the achieved tolerance back so the amplitude at maxk is
            // guaranteed at or below the threshold.
            result.root + result.tolerance
        };

        debug!(
            inclination_rad = incl_rad,
            scale_radius,
            scale_height,
            flux,
            stepk,
            maxk,
            "constructed inclined exponential profile"
        );

        if !(stepk > 0.0 && stepk.is_finite() && maxk > 0.0 && maxk.is_finite()) {
            return Err(ProfileError::NonFinite {
                context: "inclined exponential sampling derivation",
            });
        }

        Ok(Self {
            inclination,
            r0: scale_radius,
            h0: scale_height,
            flux,
            inv_r0: 1.0 / scale_radius,
            accuracy,
            cosi,
            half_pi_h_sini_over_r,
            ksq_min,
            ksq_max,
            stepk,
            maxk,
        })
    }

    /// Inclination angle (0 = face-on).
    pub fn inclination(&self) -> Angle {
        self.inclination
    }

    /// Radial scale length of the disk.
    pub fn scale_radius(&self) -> f64 {
        self.r0
    }

    /// Vertical scale height of the disk.
    pub fn scale_height(&self) -> f64 {
        self.h0
    }

    /// Accuracy parameters this profile was calibrated against.
    pub fn accuracy(&self) -> &Arc<AccuracyParams> {
        &self.accuracy
    }

    #[inline]
    fn amplitude(&self, kx: f64, ky: f64) -> f64 {
        k_amplitude(
            kx,
            ky,
            self.cosi,
            self.half_pi_h_sini_over_r,
            self.ksq_min,
            self.ksq_max,
        )
    }
}

impl Profile for InclinedExponential {
    fn flux(&self) -> f64 {
        self.flux
    }

    fn eval_real(&self, _x: f64, _y: f64) -> Result<f64, ProfileError> {
        // No closed form at general inclination; refusing is better than
        // quietly substituting an approximation.
        Err(ProfileError::NotImplemented(
            "real-space evaluation of the inclined exponential disk",
        ))
    }

    fn eval_fourier(&self, kx: f64, ky: f64) -> Complex64 {
        let value = self.flux * self.amplitude(kx * self.r0, ky * self.r0);
        Complex64::new(value, 0.0)
    }

    fn step_k(&self) -> f64 {
        self.stepk * self.inv_r0
    }

    fn max_k(&self) -> f64 {
        self.maxk * self.inv_r0
    }

    fn k_even_axes(&self) -> bool {
        // The amplitude depends on kx and ky only through kx², (ky cos i)²
        // and s², so it is even in each axis independently.
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
            "photon shooting for the inclined exponential disk",
        ))
    }
}
