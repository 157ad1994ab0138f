//! Shared numeric constants for the harmonic kernels.
//!
//! Kept in one place so the expansion, power, and correlation code agree on
//! the same literals.

pub const PI: f64 = 3.141_592_653_589_793_238_462_643_383_279_5_f64;
pub const PI2: f64 = 6.283_185_307_179_586_476_925_286_766_559_f64;
pub const FOUR_PI: f64 = 4.0 * PI;
pub const DEG_TO_RAD: f64 = PI / 180.0;

/// Default confidence level for correlation intervals.
pub const DEFAULT_CONFIDENCE_LEVEL: f64 = 0.95;
