//! Parametric surface-brightness profiles for astronomical sources.
//!
//! This crate models the light distribution of simulated galaxies as
//! closed-form profiles evaluated in real space and in Fourier (spatial
//! frequency) space. Rendering pipelines work in Fourier space because
//! convolution with instrumental effects is multiplication there; the hard
//! part is choosing a frequency grid that reproduces a given profile to a
//! guaranteed accuracy without wasting samples.
//!
//! Each profile derives two sampling parameters at construction time from a
//! shared set of tolerance constants ([`AccuracyParams`]):
//!
//! - `step_k` — the largest grid spacing for which real-space aliasing
//!   (folding) stays below the folding threshold, and
//! - `max_k` — the smallest frequency beyond which the amplitude is
//!   guaranteed negligible and may be truncated to zero.
//!
//! For anisotropic profiles `max_k` is calibrated with a bracket-and-bisect
//! root finder ([`solve::BracketSolver`]); isotropic tails are solved
//! algebraically. Evaluation itself switches between a Taylor series near
//! the origin, the closed form in the body, and an exact zero clip in the
//! tail, with cutover points derived from the same tolerance constants.
//!
//! Bulk sampling over rectangular or sheared frequency grids is provided by
//! [`grid::fill_k_grid`] and friends, which exploit the profiles' axis
//! symmetry to evaluate only one quadrant of origin-straddling grids.

pub mod accuracy;
pub mod cache;
pub mod error;
pub mod grid;
pub mod math;
pub mod profile;
pub mod solve;
pub mod units;

// Re-exports for easier access
pub use accuracy::AccuracyParams;
pub use error::ProfileError;
pub use grid::{KGrid, ShearedKGrid};
pub use profile::inclined_exponential::InclinedExponential;
pub use profile::spergel::{RadiusType, Spergel};
pub use profile::{Photon, Profile};
pub use solve::{BracketSolver, RootResult};
