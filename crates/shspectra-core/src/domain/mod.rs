pub mod errors;

pub use errors::{AnalysisError, AnalysisErrorCategory, AnalysisResult};

use serde::{Deserialize, Serialize};

/// Number of packed (degree, order) entries for an expansion up to
/// `max_degree` inclusive.
pub const fn packed_len(max_degree: usize) -> usize {
    (max_degree + 1) * (max_degree + 2) / 2
}

/// Flat offset of (degree, order) in the packed triangular layout.
pub const fn packed_index(degree: usize, order: usize) -> usize {
    degree * (degree + 1) / 2 + order
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PackedCoefficientData {
    max_degree: usize,
    cosine: Vec<f64>,
    sine: Vec<f64>,
}

/// Cosine/sine spherical-harmonic coefficients up to a maximum degree.
///
/// Coefficients are stored packed by degree, offset `l(l+1)/2 + m` for
/// 0 <= m <= l <= max_degree. The layout is private; callers address
/// coefficients only through the logical (degree, order) accessors. Sine
/// terms at order 0 are identically zero by convention. Immutable once
/// constructed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "PackedCoefficientData")]
pub struct CoefficientSet {
    max_degree: usize,
    cosine: Vec<f64>,
    sine: Vec<f64>,
}

impl CoefficientSet {
    /// Builds a set from packed cosine/sine arrays.
    ///
    /// Order-0 sine entries are forced to zero rather than rejected, so
    /// tables produced by tools that leave them unset still load.
    pub fn from_packed(
        max_degree: usize,
        cosine: Vec<f64>,
        mut sine: Vec<f64>,
    ) -> AnalysisResult<Self> {
        let expected = packed_len(max_degree);
        if cosine.len() != expected || sine.len() != expected {
            return Err(AnalysisError::input_validation(
                "INPUT.COEFFICIENT_SHAPE",
                format!(
                    "packed coefficient arrays for max degree {} must have {} entries, got cosine={} sine={}",
                    max_degree,
                    expected,
                    cosine.len(),
                    sine.len()
                ),
            ));
        }

        for degree in 0..=max_degree {
            sine[packed_index(degree, 0)] = 0.0;
        }

        Ok(Self {
            max_degree,
            cosine,
            sine,
        })
    }

    pub fn max_degree(&self) -> usize {
        self.max_degree
    }

    pub fn cosine(&self, degree: usize, order: usize) -> f64 {
        assert!(
            order <= degree && degree <= self.max_degree,
            "coefficient index requires order <= degree <= max_degree"
        );
        self.cosine[packed_index(degree, order)]
    }

    pub fn sine(&self, degree: usize, order: usize) -> f64 {
        assert!(
            order <= degree && degree <= self.max_degree,
            "coefficient index requires order <= degree <= max_degree"
        );
        self.sine[packed_index(degree, order)]
    }

    /// Sum of squared cosine and sine coefficients over all orders at one
    /// degree. Non-negative by construction.
    pub fn degree_power(&self, degree: usize) -> f64 {
        let mut total = 0.0;
        for order in 0..=degree {
            let index = packed_index(degree, order);
            total += self.cosine[index] * self.cosine[index] + self.sine[index] * self.sine[index];
        }
        total
    }

    /// Iterates entries in packed order as (degree, order, cosine, sine).
    pub fn entries(&self) -> impl Iterator<Item = (usize, usize, f64, f64)> + '_ {
        (0..=self.max_degree).flat_map(move |degree| {
            (0..=degree).map(move |order| {
                let index = packed_index(degree, order);
                (degree, order, self.cosine[index], self.sine[index])
            })
        })
    }
}

impl TryFrom<PackedCoefficientData> for CoefficientSet {
    type Error = AnalysisError;

    fn try_from(data: PackedCoefficientData) -> AnalysisResult<Self> {
        Self::from_packed(data.max_degree, data.cosine, data.sine)
    }
}

/// One spectral-power value per degree, 0..=max_degree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PowerSpectrum {
    values: Vec<f64>,
}

impl PowerSpectrum {
    pub fn new(values: Vec<f64>) -> Self {
        Self { values }
    }

    pub fn max_degree(&self) -> usize {
        self.values.len().saturating_sub(1)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn at_degree(&self, degree: usize) -> f64 {
        self.values[degree]
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }
}

/// Lower/upper bound on a per-degree correlation at one confidence level.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfidenceInterval {
    pub level: f64,
    pub lower: f64,
    pub upper: f64,
}

/// Correlation at a single degree with its confidence intervals.
///
/// `correlation` is NaN where either input set has zero power at this
/// degree; that is reported, not raised.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DegreeCorrelation {
    pub degree: usize,
    pub correlation: f64,
    pub intervals: Vec<ConfidenceInterval>,
}

/// Degree-wise correlation between two coefficient sets, 0..=max_degree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CorrelationResult {
    pub degrees: Vec<DegreeCorrelation>,
}

impl CorrelationResult {
    pub fn max_degree(&self) -> usize {
        self.degrees.len().saturating_sub(1)
    }

    pub fn correlations(&self) -> Vec<f64> {
        self.degrees.iter().map(|entry| entry.correlation).collect()
    }
}
