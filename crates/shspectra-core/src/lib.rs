//! Spherical-harmonic analysis of point data on a sphere.
//!
//! Two stateless operations: fitting spherical-harmonic coefficients (and
//! per-degree spectral power) to latitude/longitude samples, and computing
//! degree-wise correlation between two previously fitted coefficient sets.

pub mod analysis;
pub mod common;
pub mod domain;
pub mod numerics;
