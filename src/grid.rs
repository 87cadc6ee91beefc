//! Bulk evaluation of Fourier amplitudes over 2-D frequency grids.
//!
//! Rendering calls these routines with large grids (hundreds to thousands
//! of samples per axis), so the inner loops take the per-profile amplitude
//! formula as a statically dispatched closure — no per-cell allocation or
//! virtual dispatch — and rows are evaluated in parallel with rayon.
//!
//! Axis-aligned grids that straddle zero on both axes take a quadrant fast
//! path: only the (+,+) quadrant is evaluated and the other three are
//! mirrored. Mirroring across a single axis relies on the amplitude being
//! even in that axis independently, which is a per-profile property the
//! caller asserts via the `even_axes` flag; the double mirror is the
//! Hermitian reflection and is conjugated. Mirrored results are identical
//! to direct evaluation, not an approximation: straddling grids generate
//! their frequencies symmetric about the origin, so mirrored samples are
//! exact negations.

use ndarray::{s, Array2, Axis};
use num_complex::Complex64;
use rayon::prelude::*;

/// Axis-aligned frequency grid description.
///
/// Sample `(i, j)` lies at `(kx_at(i), ky_at(j))`. `izero`/`jzero` are the
/// indices of the zero frequency when the grid straddles the origin on that
/// axis, and 0 when it does not (a grid starting at zero has its zero at
/// the edge, which gains nothing from mirroring). When `izero > 0`, `kx0`
/// must equal `-(izero as f64) * dkx`, which [`KGrid::centered`] guarantees.
#[derive(Debug, Clone, Copy)]
pub struct KGrid {
    pub kx0: f64,
    pub dkx: f64,
    pub izero: usize,
    pub ky0: f64,
    pub dky: f64,
    pub jzero: usize,
}

impl KGrid {
    /// Grid of `nx` by `ny` samples with zero frequency at `(nx/2, ny/2)`.
    pub fn centered(dkx: f64, dky: f64, nx: usize, ny: usize) -> Self {
        let izero = nx / 2;
        let jzero = ny / 2;
        Self {
            kx0: -(izero as f64) * dkx,
            dkx,
            izero,
            ky0: -(jzero as f64) * dky,
            dky,
            jzero,
        }
    }

    /// Grid starting at an arbitrary corner frequency, no straddling.
    pub fn offset(kx0: f64, dkx: f64, ky0: f64, dky: f64) -> Self {
        Self {
            kx0,
            dkx,
            izero: 0,
            ky0,
            dky,
            jzero: 0,
        }
    }

    /// Frequency of column `i`.
    ///
    /// Straddling grids generate frequencies as signed-integer multiples of
    /// the step so mirrored samples negate exactly.
    #[inline]
    pub fn kx_at(&self, i: usize) -> f64 {
        if self.izero > 0 {
            (i as isize - self.izero as isize) as f64 * self.dkx
        } else {
            self.kx0 + i as f64 * self.dkx
        }
    }

    /// Frequency of row `j`.
    #[inline]
    pub fn ky_at(&self, j: usize) -> f64 {
        if self.jzero > 0 {
            (j as isize - self.jzero as isize) as f64 * self.dky
        } else {
            self.ky0 + j as f64 * self.dky
        }
    }
}

/// Sheared (general affine) frequency grid: sample `(i, j)` lies at
/// `(kx0 + i dkx + j dkxy, ky0 + i dkyx + j dky)`.
#[derive(Debug, Clone, Copy)]
pub struct ShearedKGrid {
    pub kx0: f64,
    pub dkx: f64,
    pub dkxy: f64,
    pub ky0: f64,
    pub dky: f64,
    pub dkyx: f64,
}

/// Fill `out[[j, i]]` with `kvalue(kx_at(i), ky_at(j))`.
///
/// `even_axes` asserts that `kvalue` is even in each frequency axis
/// independently, enabling the quadrant fast path on straddling grids.
pub fn fill_k_grid<F>(grid: &KGrid, out: &mut Array2<Complex64>, even_axes: bool, kvalue: F)
where
    F: Fn(f64, f64) -> Complex64 + Sync,
{
    let (ny, nx) = out.dim();
    let quadrant =
        even_axes && grid.izero > 0 && grid.jzero > 0 && grid.izero < nx && grid.jzero < ny;

    if !quadrant {
        out.axis_iter_mut(Axis(0))
            .into_par_iter()
            .enumerate()
            .for_each(|(j, mut row)| {
                let ky = grid.ky_at(j);
                for (i, v) in row.iter_mut().enumerate() {
                    *v = kvalue(grid.kx_at(i), ky);
                }
            });
        return;
    }

    debug_assert!(grid.kx0 == -(grid.izero as f64) * grid.dkx);
    debug_assert!(grid.ky0 == -(grid.jzero as f64) * grid.dky);

    let (izero, jzero) = (grid.izero, grid.jzero);

    // Evaluate the (+,+) quadrant directly.
    out.slice_mut(s![jzero.., izero..])
        .axis_iter_mut(Axis(0))
        .into_par_iter()
        .enumerate()
        .for_each(|(jj, mut row)| {
            let ky = grid.ky_at(jzero + jj);
            for (ii, v) in row.iter_mut().enumerate() {
                *v = kvalue(grid.kx_at(izero + ii), ky);
            }
        });

    // Mirror the remaining three quadrants. A mirror index can fall off the
    // grid when the negative side is longer than the positive side; those
    // cells are evaluated directly.
    for j in 0..ny {
        for i in 0..nx {
            if i >= izero && j >= jzero {
                continue;
            }
            let mi = if i < izero { 2 * izero - i } else { i };
            let mj = if j < jzero { 2 * jzero - j } else { j };
            out[[j, i]] = if mi < nx && mj < ny {
                let v = out[[mj, mi]];
                if i < izero && j < jzero {
                    v.conj()
                } else {
                    v
                }
            } else {
                kvalue(grid.kx_at(i), grid.ky_at(j))
            };
        }
    }
}

/// Fill `out[[j, i]]` over a sheared grid. Every cell is evaluated
/// directly; no symmetry shortcut applies under shear.
pub fn fill_k_grid_sheared<F>(grid: &ShearedKGrid, out: &mut Array2<Complex64>, kvalue: F)
where
    F: Fn(f64, f64) -> Complex64 + Sync,
{
    out.axis_iter_mut(Axis(0))
        .into_par_iter()
        .enumerate()
        .for_each(|(j, mut row)| {
            let jf = j as f64;
            for (i, v) in row.iter_mut().enumerate() {
                let fi = i as f64;
                let kx = grid.kx0 + fi * grid.dkx + jf * grid.dkxy;
                let ky = grid.ky0 + fi * grid.dkyx + jf * grid.dky;
                *v = kvalue(kx, ky);
            }
        });
}

#[cfg(test)]
mod tests {
    use super::*;

    // Even in each axis, like the profile amplitudes.
    fn sample_amplitude(kx: f64, ky: f64) -> Complex64 {
        Complex64::new((-(kx * kx + 2.0 * ky * ky)).exp(), 0.0)
    }

    fn direct_fill(grid: &KGrid, ny: usize, nx: usize) -> Array2<Complex64> {
        let mut expected = Array2::zeros((ny, nx));
        for j in 0..ny {
            for i in 0..nx {
                expected[[j, i]] = sample_amplitude(grid.kx_at(i), grid.ky_at(j));
            }
        }
        expected
    }

    #[test]
    fn test_quadrant_matches_direct_odd_dims() {
        let grid = KGrid::centered(0.13, 0.21, 9, 7);
        let mut out = Array2::zeros((7, 9));
        fill_k_grid(&grid, &mut out, true, sample_amplitude);
        let expected = direct_fill(&grid, 7, 9);
        assert_eq!(out, expected, "quadrant path must be bit-identical");
    }

    #[test]
    fn test_quadrant_matches_direct_even_dims() {
        // Even dims leave the negative side one sample longer; those cells
        // exercise the direct-evaluation fallback.
        let grid = KGrid::centered(0.05, 0.08, 8, 8);
        let mut out = Array2::zeros((8, 8));
        fill_k_grid(&grid, &mut out, true, sample_amplitude);
        let expected = direct_fill(&grid, 8, 8);
        assert_eq!(out, expected);
    }

    #[test]
    fn test_non_straddling_grid_uses_direct_path() {
        let grid = KGrid::offset(0.3, 0.1, -0.2, 0.1);
        let mut out = Array2::zeros((4, 5));
        fill_k_grid(&grid, &mut out, true, sample_amplitude);
        let expected = direct_fill(&grid, 4, 5);
        assert_eq!(out, expected);
    }

    #[test]
    fn test_even_axes_false_disables_quadrant() {
        // An odd function would be mirrored wrongly by the fast path; the
        // flag must force direct evaluation.
        let odd = |kx: f64, ky: f64| Complex64::new(kx + ky, 0.0);
        let grid = KGrid::centered(0.1, 0.1, 6, 6);
        let mut out = Array2::zeros((6, 6));
        fill_k_grid(&grid, &mut out, false, odd);
        for j in 0..6 {
            for i in 0..6 {
                assert_eq!(out[[j, i]], odd(grid.kx_at(i), grid.ky_at(j)));
            }
        }
    }

    #[test]
    fn test_sheared_fill() {
        let grid = ShearedKGrid {
            kx0: -0.4,
            dkx: 0.1,
            dkxy: 0.03,
            ky0: -0.3,
            dky: 0.1,
            dkyx: -0.02,
        };
        let mut out = Array2::zeros((5, 6));
        fill_k_grid_sheared(&grid, &mut out, sample_amplitude);
        for j in 0..5 {
            for i in 0..6 {
                let kx = grid.kx0 + i as f64 * grid.dkx + j as f64 * grid.dkxy;
                let ky = grid.ky0 + i as f64 * grid.dkyx + j as f64 * grid.dky;
                assert_eq!(out[[j, i]], sample_amplitude(kx, ky));
            }
        }
    }
}
