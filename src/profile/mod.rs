//! Surface-brightness profile variants and their shared capability set.
//!
//! Each physical model is a concrete type implementing [`Profile`]. A
//! profile owns its precomputed derived constants: the constructor runs the
//! adaptive-accuracy derivation once (invoking the root finder where the
//! profile's Fourier tail is anisotropic), and every later call is a pure
//! read. Instances are immutable after construction and safe to share
//! across worker threads.
//!
//! Not every capability exists for every variant: profiles without a
//! closed real-space form refuse `eval_real`, and none of the variants
//! here implement photon shooting. Both failures surface as
//! [`ProfileError::NotImplemented`] rather than a silent approximation.

use ndarray::Array2;
use num_complex::Complex64;
use rand::RngCore;

use crate::error::ProfileError;
use crate::grid::{KGrid, ShearedKGrid};

pub mod inclined_exponential;
pub mod spergel;

/// A single photon sample from a stochastic rendering of a profile.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Photon {
    pub x: f64,
    pub y: f64,
    pub flux: f64,
}

/// Capability set shared by all profile variants.
pub trait Profile: Send + Sync {
    /// Total flux of the profile. `eval_fourier(0, 0)` equals this exactly.
    fn flux(&self) -> f64;

    /// Surface brightness at real-space position `(x, y)`.
    fn eval_real(&self, x: f64, y: f64) -> Result<f64, ProfileError>;

    /// Fourier amplitude at spatial frequency `(kx, ky)`, in physical
    /// (inverse-length) frequency units.
    fn eval_fourier(&self, kx: f64, ky: f64) -> Complex64;

    /// Largest frequency-grid spacing that keeps real-space folding below
    /// the folding threshold. Always positive.
    fn step_k(&self) -> f64;

    /// Frequency beyond which the amplitude is below the `maxk` threshold
    /// and may be truncated to zero. Always positive.
    fn max_k(&self) -> f64;

    /// Whether the Fourier amplitude is even in each frequency axis
    /// independently, enabling the grid filler's quadrant fast path.
    fn k_even_axes(&self) -> bool;

    /// Bulk-evaluate the Fourier amplitude over an axis-aligned grid.
    fn fill_k_grid(&self, grid: &KGrid, out: &mut Array2<Complex64>);

    /// Bulk-evaluate the Fourier amplitude over a sheared grid.
    fn fill_k_grid_sheared(&self, grid: &ShearedKGrid, out: &mut Array2<Complex64>);

    /// Draw `n` photons from the profile using `rng`.
    fn shoot(&self, n: usize, rng: &mut dyn RngCore) -> Result<Vec<Photon>, ProfileError>;
}
