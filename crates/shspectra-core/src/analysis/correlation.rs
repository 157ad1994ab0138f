use crate::common::constants::DEFAULT_CONFIDENCE_LEVEL;
use crate::domain::{
    AnalysisError, AnalysisResult, CoefficientSet, ConfidenceInterval, CorrelationResult,
    DegreeCorrelation,
};
use crate::numerics::standard_normal_quantile;
use serde::{Deserialize, Serialize};

/// Confidence levels applied when the caller does not specify any.
pub const DEFAULT_CONFIDENCE_LEVELS: &[f64] = &[DEFAULT_CONFIDENCE_LEVEL];

/// How the degree-0 correlation is reported.
///
/// A single coefficient pair lives at degree 0, so its correlation is
/// either ±1 or undefined; which convention applies is a caller decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DegreeZeroPolicy {
    /// Compute degree 0 like any other degree; zero power yields NaN.
    #[default]
    Propagate,
    /// Report degree 0 as exactly 1.0 by convention.
    UnitByConvention,
}

/// Two coefficient sets to correlate, degree by degree.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CorrelationInput<'a> {
    pub first: &'a CoefficientSet,
    pub second: &'a CoefficientSet,
    pub confidence_levels: &'a [f64],
    pub degree_zero: DegreeZeroPolicy,
}

impl<'a> CorrelationInput<'a> {
    pub fn new(first: &'a CoefficientSet, second: &'a CoefficientSet) -> Self {
        Self {
            first,
            second,
            confidence_levels: DEFAULT_CONFIDENCE_LEVELS,
            degree_zero: DegreeZeroPolicy::default(),
        }
    }

    pub fn with_confidence_levels(mut self, levels: &'a [f64]) -> Self {
        self.confidence_levels = levels;
        self
    }

    pub fn with_degree_zero(mut self, policy: DegreeZeroPolicy) -> Self {
        self.degree_zero = policy;
        self
    }
}

/// Correlates two coefficient sets per degree.
///
/// corr(l) = Σₘ(c1·c2 + s1·s2) / sqrt(Σₘ(c1²+s1²) · Σₘ(c2²+s2²)).
/// A degree where either set has zero power is reported as NaN rather
/// than raised; degree-0 and empty-data cases are common and must not
/// abort the run. Symmetric in its two inputs.
pub fn correlate_degrees(input: &CorrelationInput<'_>) -> AnalysisResult<CorrelationResult> {
    let max_degree = input.first.max_degree();
    if input.second.max_degree() != max_degree {
        return Err(AnalysisError::input_validation(
            "INPUT.DEGREE_MISMATCH",
            format!(
                "coefficient sets have mismatched maximum degree: {} vs {}",
                max_degree,
                input.second.max_degree()
            ),
        ));
    }

    for level in input.confidence_levels {
        if !level.is_finite() || !(0.0 < *level && *level < 1.0) {
            return Err(AnalysisError::input_validation(
                "INPUT.CONFIDENCE_LEVEL",
                format!("confidence level must lie strictly between 0 and 1, got {level}"),
            ));
        }
    }

    let mut degrees = Vec::with_capacity(max_degree + 1);
    for degree in 0..=max_degree {
        let correlation = degree_correlation(input, degree);
        let intervals = input
            .confidence_levels
            .iter()
            .map(|&level| fisher_interval(correlation, degree, level))
            .collect();

        degrees.push(DegreeCorrelation {
            degree,
            correlation,
            intervals,
        });
    }

    Ok(CorrelationResult { degrees })
}

fn degree_correlation(input: &CorrelationInput<'_>, degree: usize) -> f64 {
    if degree == 0 && input.degree_zero == DegreeZeroPolicy::UnitByConvention {
        return 1.0;
    }

    let first_power = input.first.degree_power(degree);
    let second_power = input.second.degree_power(degree);
    if first_power == 0.0 || second_power == 0.0 {
        return f64::NAN;
    }

    let mut numerator = 0.0;
    for order in 0..=degree {
        numerator += input.first.cosine(degree, order) * input.second.cosine(degree, order)
            + input.first.sine(degree, order) * input.second.sine(degree, order);
    }

    // Roundoff can push a perfect match a few ulps past ±1, which would
    // poison the Fisher transform.
    (numerator / (first_power * second_power).sqrt()).clamp(-1.0, 1.0)
}

/// Fisher z-transform interval around the correlation, treating the 2l+1
/// coefficient pairs at this degree as the effective sample size.
fn fisher_interval(correlation: f64, degree: usize, level: f64) -> ConfidenceInterval {
    if correlation.is_nan() {
        return ConfidenceInterval {
            level,
            lower: f64::NAN,
            upper: f64::NAN,
        };
    }

    let effective_samples = 2 * degree + 1;
    if effective_samples <= 3 {
        // Too few estimates to bound anything; the interval is the whole
        // admissible range.
        return ConfidenceInterval {
            level,
            lower: -1.0,
            upper: 1.0,
        };
    }

    let z = correlation.atanh();
    let standard_error = 1.0 / ((effective_samples - 3) as f64).sqrt();
    let half_width = standard_normal_quantile(0.5 * (1.0 + level)) * standard_error;

    ConfidenceInterval {
        level,
        lower: (z - half_width).tanh(),
        upper: (z + half_width).tanh(),
    }
}

#[cfg(test)]
mod tests {
    use super::{CorrelationInput, DegreeZeroPolicy, correlate_degrees};
    use crate::domain::{CoefficientSet, packed_len};

    fn sample_set(max_degree: usize, seed: f64) -> CoefficientSet {
        let entries = packed_len(max_degree);
        let cosine: Vec<f64> = (0..entries)
            .map(|index| seed + 0.3 * index as f64 - 0.07 * (index * index) as f64)
            .collect();
        let sine: Vec<f64> = (0..entries)
            .map(|index| 0.5 * seed - 0.11 * index as f64 + 0.02 * (index * index) as f64)
            .collect();
        CoefficientSet::from_packed(max_degree, cosine, sine).expect("sample set should build")
    }

    #[test]
    fn self_correlation_is_unity_at_every_degree() {
        let set = sample_set(4, 1.25);
        let result = correlate_degrees(&CorrelationInput::new(&set, &set))
            .expect("self-correlation should succeed");

        assert_eq!(result.degrees.len(), 5);
        for entry in &result.degrees {
            assert!(
                (entry.correlation - 1.0).abs() <= 1.0e-12,
                "degree {} self-correlation should be 1.0, got {}",
                entry.degree,
                entry.correlation
            );
        }
    }

    #[test]
    fn negated_set_correlates_to_minus_one() {
        let set = sample_set(3, 0.8);
        let negated = CoefficientSet::from_packed(
            3,
            set.entries().map(|(_, _, clm, _)| -clm).collect(),
            set.entries().map(|(_, _, _, slm)| -slm).collect(),
        )
        .expect("negated set should build");

        let result = correlate_degrees(&CorrelationInput::new(&set, &negated))
            .expect("correlation should succeed");
        for entry in &result.degrees {
            assert!(
                (entry.correlation + 1.0).abs() <= 1.0e-12,
                "degree {} should anticorrelate, got {}",
                entry.degree,
                entry.correlation
            );
        }
    }

    #[test]
    fn correlation_is_symmetric_in_its_inputs() {
        let first = sample_set(5, 0.4);
        let second = sample_set(5, -1.1);

        let forward = correlate_degrees(&CorrelationInput::new(&first, &second))
            .expect("forward correlation should succeed");
        let backward = correlate_degrees(&CorrelationInput::new(&second, &first))
            .expect("backward correlation should succeed");

        for (a, b) in forward.degrees.iter().zip(backward.degrees.iter()) {
            assert_eq!(a.correlation, b.correlation, "degree {}", a.degree);
        }
    }

    #[test]
    fn mismatched_maximum_degrees_are_rejected() {
        let first = sample_set(3, 1.0);
        let second = sample_set(4, 1.0);
        let error = correlate_degrees(&CorrelationInput::new(&first, &second))
            .expect_err("degree mismatch should be rejected");
        assert_eq!(error.code(), "INPUT.DEGREE_MISMATCH");
    }

    #[test]
    fn zero_power_degree_reports_nan_without_aborting() {
        let mut cosine = vec![1.0; packed_len(2)];
        let sine = vec![0.0; packed_len(2)];
        // Silence both degree-1 coefficients.
        cosine[1] = 0.0;
        cosine[2] = 0.0;
        let sparse = CoefficientSet::from_packed(2, cosine, sine).expect("set should build");
        let dense = sample_set(2, 0.9);

        let result = correlate_degrees(&CorrelationInput::new(&sparse, &dense))
            .expect("zero-power degree must not abort");
        assert!(result.degrees[1].correlation.is_nan());
        assert!(result.degrees[1].intervals[0].lower.is_nan());
        assert!(!result.degrees[2].correlation.is_nan());
    }

    #[test]
    fn degree_zero_policy_selects_nan_or_unit() {
        let zeroed = CoefficientSet::from_packed(
            1,
            vec![0.0, 1.0, 0.5],
            vec![0.0, 0.0, 0.25],
        )
        .expect("set should build");

        let propagate = correlate_degrees(&CorrelationInput::new(&zeroed, &zeroed))
            .expect("propagate policy should succeed");
        assert!(propagate.degrees[0].correlation.is_nan());

        let unit = correlate_degrees(
            &CorrelationInput::new(&zeroed, &zeroed)
                .with_degree_zero(DegreeZeroPolicy::UnitByConvention),
        )
        .expect("unit policy should succeed");
        assert_eq!(unit.degrees[0].correlation, 1.0);
    }

    #[test]
    fn intervals_bracket_the_correlation_and_nest_by_level() {
        let first = sample_set(6, 0.7);
        let second = sample_set(6, -0.9);
        let levels = [0.8, 0.95, 0.99];

        let result = correlate_degrees(
            &CorrelationInput::new(&first, &second).with_confidence_levels(&levels),
        )
        .expect("correlation should succeed");

        for entry in &result.degrees {
            if entry.correlation.is_nan() {
                continue;
            }
            assert_eq!(entry.intervals.len(), levels.len());
            for interval in &entry.intervals {
                assert!(
                    interval.lower <= entry.correlation && entry.correlation <= interval.upper,
                    "degree {} level {} interval [{}, {}] must bracket r={}",
                    entry.degree,
                    interval.level,
                    interval.lower,
                    interval.upper,
                    entry.correlation
                );
            }
            let narrow = &entry.intervals[0];
            let wide = &entry.intervals[2];
            assert!(
                wide.lower <= narrow.lower && narrow.upper <= wide.upper,
                "degree {} intervals should widen with the level",
                entry.degree
            );
        }
    }

    #[test]
    fn tiny_degrees_fall_back_to_the_admissible_range() {
        let set = sample_set(1, 1.6);
        let result = correlate_degrees(&CorrelationInput::new(&set, &set))
            .expect("correlation should succeed");

        // Degrees 0 and 1 carry at most 3 effective samples.
        for entry in &result.degrees {
            let interval = &entry.intervals[0];
            assert_eq!((interval.lower, interval.upper), (-1.0, 1.0));
        }
    }

    #[test]
    fn invalid_confidence_level_is_rejected() {
        let set = sample_set(2, 0.5);
        let levels = [1.0];
        let error = correlate_degrees(
            &CorrelationInput::new(&set, &set).with_confidence_levels(&levels),
        )
        .expect_err("level 1.0 should be rejected");
        assert_eq!(error.code(), "INPUT.CONFIDENCE_LEVEL");
    }
}
