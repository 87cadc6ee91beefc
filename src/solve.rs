//! Bracket-and-bisect scalar root finding.
//!
//! Used to calibrate profile sampling parameters: given a continuous scalar
//! function and an initial interval, [`BracketSolver::bracket`] expands the
//! interval geometrically until the function changes sign across it, then
//! [`BracketSolver::root`] bisects down to a configurable width. The solver
//! reports the tolerance it actually achieved so callers can add it back
//! and stay on the conservative side of a threshold.
//!
//! The function is assumed pure within one solve; the solver has no side
//! effects beyond evaluating it. Iteration caps guarantee termination
//! without any external cancellation.

use thiserror::Error;
use tracing::trace;

/// Geometric expansion factor used while searching for a sign change.
const EXPANSION_FACTOR: f64 = 2.0;

/// Errors from bracketing or bisection.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SolveError {
    /// No sign change was found within the expansion cap. Usually indicates
    /// a pathological parameter combination upstream.
    #[error("no sign change in [{lo}, {hi}] after {steps} expansions")]
    Bracketing { lo: f64, hi: f64, steps: usize },

    /// The function returned a non-finite value at a probed point.
    #[error("function value at x = {x} is not finite")]
    NonFinite { x: f64 },
}

/// A root together with the accuracy it was located to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RootResult {
    /// Midpoint of the final bisection interval.
    pub root: f64,
    /// Half-width of the final interval; the root is within this distance.
    pub tolerance: f64,
}

/// Bracketing bisection solver over `f` on an expandable interval.
pub struct BracketSolver<F: Fn(f64) -> f64> {
    f: F,
    lo: f64,
    hi: f64,
    xtol: f64,
    lower_limit: Option<f64>,
    max_expansions: usize,
    max_bisections: usize,
}

impl<F: Fn(f64) -> f64> BracketSolver<F> {
    /// Create a solver for `f` with the initial interval `[lo, hi]`.
    pub fn new(f: F, lo: f64, hi: f64) -> Self {
        Self {
            f,
            lo,
            hi,
            xtol: 1.0e-6,
            lower_limit: None,
            max_expansions: 50,
            max_bisections: 200,
        }
    }

    /// Set the interval width at which bisection stops.
    pub fn with_xtol(mut self, xtol: f64) -> Self {
        self.xtol = xtol;
        self
    }

    /// Constrain downward expansion to stay above `limit`. The lower
    /// endpoint then approaches the limit geometrically instead of moving
    /// past it, which keeps probes inside a restricted domain (e.g. radii
    /// must stay positive).
    pub fn with_lower_limit(mut self, limit: f64) -> Self {
        self.lower_limit = Some(limit);
        self
    }

    /// The interval width the solver bisects down to.
    pub fn xtol(&self) -> f64 {
        self.xtol
    }

    /// Current interval (after any expansion).
    pub fn interval(&self) -> (f64, f64) {
        (self.lo, self.hi)
    }

    fn eval(&self, x: f64) -> Result<f64, SolveError> {
        let value = (self.f)(x);
        if value.is_finite() {
            Ok(value)
        } else {
            Err(SolveError::NonFinite { x })
        }
    }

    /// Expand the interval until `f` changes sign across it.
    ///
    /// Whichever endpoint has the smaller |f| is moved outward by
    /// [`EXPANSION_FACTOR`] times the interval width, on the theory that
    /// the smaller value is the one nearer a crossing.
    pub fn bracket(&mut self) -> Result<(), SolveError> {
        let mut f_lo = self.eval(self.lo)?;
        let mut f_hi = self.eval(self.hi)?;

        for step in 0..self.max_expansions {
            if f_lo == 0.0 || f_hi == 0.0 || (f_lo < 0.0) != (f_hi < 0.0) {
                trace!(lo = self.lo, hi = self.hi, step, "bracketed sign change");
                return Ok(());
            }
            if f_lo.abs() < f_hi.abs() {
                let unconstrained = self.lo + EXPANSION_FACTOR * (self.lo - self.hi);
                self.lo = match self.lower_limit {
                    Some(limit) if unconstrained <= limit => {
                        limit + (self.lo - limit) / EXPANSION_FACTOR
                    }
                    _ => unconstrained,
                };
                f_lo = self.eval(self.lo)?;
            } else {
                self.hi += EXPANSION_FACTOR * (self.hi - self.lo);
                f_hi = self.eval(self.hi)?;
            }
        }

        Err(SolveError::Bracketing {
            lo: self.lo,
            hi: self.hi,
            steps: self.max_expansions,
        })
    }

    /// Bisect the current (sign-bracketing) interval down to `xtol`.
    ///
    /// Call [`bracket`](Self::bracket) first unless the initial interval is
    /// already known to straddle the root.
    pub fn root(&self) -> Result<RootResult, SolveError> {
        let (mut a, mut b) = (self.lo, self.hi);
        let mut f_a = self.eval(a)?;
        let f_b = self.eval(b)?;

        if f_a == 0.0 {
            return Ok(RootResult { root: a, tolerance: 0.0 });
        }
        if f_b == 0.0 {
            return Ok(RootResult { root: b, tolerance: 0.0 });
        }
        if (f_a < 0.0) == (f_b < 0.0) {
            return Err(SolveError::Bracketing { lo: a, hi: b, steps: 0 });
        }

        for _ in 0..self.max_bisections {
            if (b - a).abs() <= self.xtol {
                break;
            }
            let mid = 0.5 * (a + b);
            let f_mid = self.eval(mid)?;
            if f_mid == 0.0 {
                return Ok(RootResult { root: mid, tolerance: 0.0 });
            }
            if (f_a < 0.0) == (f_mid < 0.0) {
                a = mid;
                f_a = f_mid;
            } else {
                b = mid;
            }
        }

        Ok(RootResult {
            root: 0.5 * (a + b),
            tolerance: 0.5 * (b - a).abs(),
        })
    }

    /// Bracket then bisect in one call.
    pub fn find_root(mut self) -> Result<RootResult, SolveError> {
        self.bracket()?;
        self.root()
    }
}
