//! Special-function kernels used by the profile math.

pub mod bessel;

pub use bessel::bessel_kv;
