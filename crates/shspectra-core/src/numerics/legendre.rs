use crate::common::constants::FOUR_PI;
use crate::domain::{packed_index, packed_len};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AssociatedLegendreInput {
    pub max_degree: usize,
    pub x: f64,
}

impl AssociatedLegendreInput {
    pub fn new(max_degree: usize, x: f64) -> Self {
        Self { max_degree, x }
    }
}

pub trait AssociatedLegendreApi {
    fn legendre_packed(&self, input: AssociatedLegendreInput) -> Result<Vec<f64>, LegendreError>;
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LegendreError {
    #[error("associated Legendre argument must be finite, got {value}")]
    NonFiniteArgument { value: f64 },
    #[error("associated Legendre argument must satisfy |x| <= 1, got {value}")]
    ArgumentOutOfRange { value: f64 },
}

/// Orthonormalized associated Legendre functions P̄lm(x) for all
/// 0 <= m <= l <= `max_degree`, packed at offset l(l+1)/2 + m.
///
/// Normalization is the orthonormal ("ortho") convention with the
/// Condon-Shortley phase: the real harmonics P̄lm(cos θ)·{cos, sin}(mφ)
/// integrate to one over the sphere, and the order-m > 0 functions carry
/// the sqrt(2) azimuthal factor. Satisfies the sum rule
/// Σₘ P̄lm(x)² = (2l+1)/(4π) for every l and x.
///
/// Uses the normalized diagonal/three-term recursions, so no factorial
/// ratios appear and the evaluation stays stable to high degree.
pub fn legendre_packed_ortho(max_degree: usize, x: f64) -> Result<Vec<f64>, LegendreError> {
    if !x.is_finite() {
        return Err(LegendreError::NonFiniteArgument { value: x });
    }
    if x.abs() > 1.0 {
        return Err(LegendreError::ArgumentOutOfRange { value: x });
    }

    let mut packed = vec![0.0_f64; packed_len(max_degree)];
    let u = (1.0 - x * x).max(0.0).sqrt();
    let scale = 1.0 / FOUR_PI.sqrt();

    packed[packed_index(0, 0)] = scale;
    if max_degree == 0 {
        return Ok(packed);
    }

    // Diagonal: the sqrt(2) azimuthal factor enters at m = 1, after which
    // each step carries sqrt((2m+1)/(2m)) and one Condon-Shortley sign.
    packed[packed_index(1, 1)] = -3.0_f64.sqrt() * u * scale;
    for order in 2..=max_degree {
        let previous = packed[packed_index(order - 1, order - 1)];
        let factor = ((2 * order + 1) as f64 / (2 * order) as f64).sqrt();
        packed[packed_index(order, order)] = -factor * u * previous;
    }

    for order in 0..max_degree {
        let diagonal = packed[packed_index(order, order)];
        packed[packed_index(order + 1, order)] =
            ((2 * order + 3) as f64).sqrt() * x * diagonal;

        for degree in (order + 2)..=max_degree {
            let l = degree as f64;
            let m = order as f64;
            let a = ((2.0 * l + 1.0) * (2.0 * l - 1.0) / ((l - m) * (l + m))).sqrt();
            let b = ((2.0 * l + 1.0) * (l + m - 1.0) * (l - m - 1.0)
                / ((2.0 * l - 3.0) * (l - m) * (l + m)))
                .sqrt();

            packed[packed_index(degree, order)] = a * x * packed[packed_index(degree - 1, order)]
                - b * packed[packed_index(degree - 2, order)];
        }
    }

    Ok(packed)
}

pub fn legendre_packed(input: AssociatedLegendreInput) -> Result<Vec<f64>, LegendreError> {
    legendre_packed_ortho(input.max_degree, input.x)
}
