use crate::common::constants::{DEG_TO_RAD, FOUR_PI};
use crate::domain::{
    AnalysisError, AnalysisResult, CoefficientSet, PowerSpectrum, packed_index, packed_len,
};
use crate::numerics::{AssociatedLegendreInput, legendre_packed};
use faer::Mat;
use faer::linalg::solvers::Solve;
use serde::{Deserialize, Serialize};

/// How the cosine/sine coefficients are fitted to the sample points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExpansionMethod {
    /// Direct projection sums over the points. This is the quadrature-style
    /// estimator; with unit values it measures point density.
    #[default]
    PointProjection,
    /// Dense least-squares fit over the full real harmonic basis, solved
    /// through the normal equations. Requires at least as many points as
    /// basis functions.
    LeastSquares,
}

/// Scaling applied to the per-degree power values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PowerNormalization {
    /// power(l) = sum over m of clm^2 + slm^2.
    #[default]
    Total,
    /// Density-estimator scaling 4π / (n · (2l+1)) applied on top of the
    /// total power, for point-density spectra comparable across sample
    /// counts.
    Density,
}

/// Latitude/longitude samples (degrees) plus fit configuration.
///
/// `values` defaults to 1.0 per point for density-only analysis.
/// Longitudes are accepted in either the [0, 360) or the [-180, 180)
/// convention.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExpansionInput<'a> {
    pub latitudes: &'a [f64],
    pub longitudes: &'a [f64],
    pub values: Option<&'a [f64]>,
    pub max_degree: usize,
    pub method: ExpansionMethod,
    pub normalization: PowerNormalization,
}

impl<'a> ExpansionInput<'a> {
    pub fn new(latitudes: &'a [f64], longitudes: &'a [f64], max_degree: usize) -> Self {
        Self {
            latitudes,
            longitudes,
            values: None,
            max_degree,
            method: ExpansionMethod::default(),
            normalization: PowerNormalization::default(),
        }
    }

    pub fn with_values(mut self, values: &'a [f64]) -> Self {
        self.values = Some(values);
        self
    }

    pub fn with_method(mut self, method: ExpansionMethod) -> Self {
        self.method = method;
        self
    }

    pub fn with_normalization(mut self, normalization: PowerNormalization) -> Self {
        self.normalization = normalization;
        self
    }
}

/// Fitted coefficients and derived per-degree power.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpansionOutput {
    pub coefficients: CoefficientSet,
    pub power: PowerSpectrum,
    pub sample_count: usize,
    pub method: ExpansionMethod,
    pub normalization: PowerNormalization,
}

/// Fits spherical-harmonic coefficients to the sample points and derives
/// the power spectrum for degrees 0..=max_degree.
///
/// Fails fast with an input-validation error on mismatched array lengths,
/// out-of-range coordinates, or an underdetermined least-squares system;
/// the numeric computation itself has no failure modes.
pub fn expand_points(input: &ExpansionInput<'_>) -> AnalysisResult<ExpansionOutput> {
    validate_points(input)?;

    let sample_count = input.latitudes.len();
    let (cosine, sine) = match input.method {
        ExpansionMethod::PointProjection => project_points(input)?,
        ExpansionMethod::LeastSquares => fit_least_squares(input)?,
    };

    let coefficients = CoefficientSet::from_packed(input.max_degree, cosine, sine)?;
    let power = power_spectrum(&coefficients, sample_count, input.normalization)?;

    Ok(ExpansionOutput {
        coefficients,
        power,
        sample_count,
        method: input.method,
        normalization: input.normalization,
    })
}

fn validate_points(input: &ExpansionInput<'_>) -> AnalysisResult<()> {
    let n_lat = input.latitudes.len();
    let n_lon = input.longitudes.len();
    if n_lat != n_lon {
        return Err(AnalysisError::input_validation(
            "INPUT.POINT_LENGTHS",
            format!("latitude and longitude arrays differ in length: {n_lat} vs {n_lon}"),
        ));
    }

    if let Some(values) = input.values {
        if values.len() != n_lat {
            return Err(AnalysisError::input_validation(
                "INPUT.POINT_LENGTHS",
                format!(
                    "value array length {} does not match {} sample points",
                    values.len(),
                    n_lat
                ),
            ));
        }
        for (index, value) in values.iter().enumerate() {
            if !value.is_finite() {
                return Err(AnalysisError::input_validation(
                    "INPUT.VALUE_RANGE",
                    format!("value at index {index} must be finite, got {value}"),
                ));
            }
        }
    }

    for (index, latitude) in input.latitudes.iter().enumerate() {
        if !latitude.is_finite() || !(-90.0..=90.0).contains(latitude) {
            return Err(AnalysisError::input_validation(
                "INPUT.LATITUDE_RANGE",
                format!("latitude at index {index} must lie in [-90, 90], got {latitude}"),
            ));
        }
    }

    for (index, longitude) in input.longitudes.iter().enumerate() {
        if !longitude.is_finite() || !(-180.0..360.0).contains(longitude) {
            return Err(AnalysisError::input_validation(
                "INPUT.LONGITUDE_RANGE",
                format!(
                    "longitude at index {index} must lie in [0, 360) or [-180, 180), got {longitude}"
                ),
            ));
        }
    }

    if input.method == ExpansionMethod::LeastSquares {
        let basis_count = basis_len(input.max_degree);
        if n_lat < basis_count {
            return Err(AnalysisError::input_validation(
                "INPUT.LEAST_SQUARES_RANK",
                format!(
                    "least-squares fit to degree {} needs at least {} points, got {}",
                    input.max_degree, basis_count, n_lat
                ),
            ));
        }
    }

    Ok(())
}

/// Number of real basis functions up to max_degree: (L+1)^2.
fn basis_len(max_degree: usize) -> usize {
    (max_degree + 1) * (max_degree + 1)
}

fn point_geometry(latitude: f64, longitude: f64) -> (f64, f64) {
    let colatitude = 90.0 - latitude;
    ((colatitude * DEG_TO_RAD).cos(), longitude * DEG_TO_RAD)
}

fn point_legendre(max_degree: usize, x: f64) -> AnalysisResult<Vec<f64>> {
    legendre_packed(AssociatedLegendreInput::new(max_degree, x)).map_err(|error| {
        AnalysisError::input_validation("INPUT.COLATITUDE", error.to_string())
    })
}

fn project_points(input: &ExpansionInput<'_>) -> AnalysisResult<(Vec<f64>, Vec<f64>)> {
    let entries = packed_len(input.max_degree);
    let mut cosine = vec![0.0_f64; entries];
    let mut sine = vec![0.0_f64; entries];

    for (index, (&latitude, &longitude)) in input
        .latitudes
        .iter()
        .zip(input.longitudes.iter())
        .enumerate()
    {
        let value = input.values.map_or(1.0, |values| values[index]);
        let (x, phi) = point_geometry(latitude, longitude);
        let plm = point_legendre(input.max_degree, x)?;

        for degree in 0..=input.max_degree {
            for order in 0..=degree {
                let offset = packed_index(degree, order);
                let azimuth = order as f64 * phi;
                cosine[offset] += value * plm[offset] * azimuth.cos();
                sine[offset] += value * plm[offset] * azimuth.sin();
            }
        }
    }

    Ok((cosine, sine))
}

fn fit_least_squares(input: &ExpansionInput<'_>) -> AnalysisResult<(Vec<f64>, Vec<f64>)> {
    let entries = packed_len(input.max_degree);
    let n_points = input.latitudes.len();
    let n_basis = basis_len(input.max_degree);

    // Columns: cosine terms in packed order, then the sine terms for
    // orders m >= 1 in packed order.
    let mut design = Mat::<f64>::zeros(n_points, n_basis);
    for (row, (&latitude, &longitude)) in input
        .latitudes
        .iter()
        .zip(input.longitudes.iter())
        .enumerate()
    {
        let (x, phi) = point_geometry(latitude, longitude);
        let plm = point_legendre(input.max_degree, x)?;

        let mut sine_column = entries;
        for degree in 0..=input.max_degree {
            for order in 0..=degree {
                let offset = packed_index(degree, order);
                let azimuth = order as f64 * phi;
                design[(row, offset)] = plm[offset] * azimuth.cos();
                if order > 0 {
                    design[(row, sine_column)] = plm[offset] * azimuth.sin();
                    sine_column += 1;
                }
            }
        }
    }

    // Normal equations (A'A) x = A'y, solved with a full-pivot LU.
    let mut gram = Mat::<f64>::zeros(n_basis, n_basis);
    for i in 0..n_basis {
        for j in 0..n_basis {
            let mut sum = 0.0;
            for k in 0..n_points {
                sum += design[(k, i)] * design[(k, j)];
            }
            gram[(i, j)] = sum;
        }
    }

    let mut rhs = Mat::<f64>::zeros(n_basis, 1);
    for i in 0..n_basis {
        let mut sum = 0.0;
        for k in 0..n_points {
            let value = input.values.map_or(1.0, |values| values[k]);
            sum += design[(k, i)] * value;
        }
        rhs[(i, 0)] = sum;
    }

    let lu = gram.as_ref().full_piv_lu();
    let solution = lu.solve(&rhs);

    let mut cosine = vec![0.0_f64; entries];
    let mut sine = vec![0.0_f64; entries];
    let mut sine_column = entries;
    for degree in 0..=input.max_degree {
        for order in 0..=degree {
            let offset = packed_index(degree, order);
            cosine[offset] = solution[(offset, 0)];
            if order > 0 {
                sine[offset] = solution[(sine_column, 0)];
                sine_column += 1;
            }
        }
    }

    Ok((cosine, sine))
}

fn power_spectrum(
    coefficients: &CoefficientSet,
    sample_count: usize,
    normalization: PowerNormalization,
) -> AnalysisResult<PowerSpectrum> {
    let max_degree = coefficients.max_degree();
    let mut values = Vec::with_capacity(max_degree + 1);

    for degree in 0..=max_degree {
        let total = coefficients.degree_power(degree);
        let value = match normalization {
            PowerNormalization::Total => total,
            PowerNormalization::Density => {
                if sample_count == 0 {
                    return Err(AnalysisError::input_validation(
                        "INPUT.EMPTY_POINTS",
                        "density-normalized power requires at least one sample point",
                    ));
                }
                FOUR_PI / (sample_count as f64 * (2 * degree + 1) as f64) * total
            }
        };
        values.push(value);
    }

    Ok(PowerSpectrum::new(values))
}

#[cfg(test)]
mod tests {
    use super::{ExpansionInput, ExpansionMethod, PowerNormalization, expand_points};
    use crate::common::constants::FOUR_PI;

    #[test]
    fn mismatched_point_arrays_fail_fast() {
        let input = ExpansionInput::new(&[0.0, 10.0], &[0.0], 2);
        let error = expand_points(&input).expect_err("length mismatch should be rejected");
        assert_eq!(error.code(), "INPUT.POINT_LENGTHS");
    }

    #[test]
    fn mismatched_value_array_fails_fast() {
        let values = [1.0];
        let input = ExpansionInput::new(&[0.0, 10.0], &[0.0, 20.0], 2).with_values(&values);
        let error = expand_points(&input).expect_err("value length mismatch should be rejected");
        assert_eq!(error.code(), "INPUT.POINT_LENGTHS");
    }

    #[test]
    fn out_of_range_latitude_fails_fast() {
        let input = ExpansionInput::new(&[0.0, 91.0], &[0.0, 20.0], 2);
        let error = expand_points(&input).expect_err("latitude 91 should be rejected");
        assert_eq!(error.code(), "INPUT.LATITUDE_RANGE");
    }

    #[test]
    fn negative_longitude_convention_is_accepted() {
        let input = ExpansionInput::new(&[10.0, -10.0], &[-170.0, 350.0], 1);
        let output = expand_points(&input).expect("both longitude conventions should be accepted");
        assert_eq!(output.power.len(), 2);
    }

    #[test]
    fn four_point_density_example_matches_mean_level_power() {
        let latitudes = [0.0, 0.0, 90.0, -90.0];
        let longitudes = [0.0, 90.0, 0.0, 0.0];
        let values = [1.0, 1.0, 1.0, 1.0];
        let input = ExpansionInput::new(&latitudes, &longitudes, 2).with_values(&values);

        let output = expand_points(&input).expect("expansion should succeed");
        assert_eq!(output.power.len(), 3);
        for degree in 0..=2 {
            assert!(
                output.power.at_degree(degree) >= 0.0,
                "power at degree {degree} must be non-negative"
            );
        }

        // Degree 0 carries only the mean-level term (n / sqrt(4 pi))^2.
        let mean_term = 4.0 / FOUR_PI.sqrt();
        let expected = mean_term * mean_term;
        let actual = output.power.at_degree(0);
        assert!(
            (actual - expected).abs() <= 1.0e-12,
            "degree-0 power expected {expected}, got {actual}"
        );
    }

    #[test]
    fn projection_coefficients_scale_linearly_with_values() {
        let latitudes = [12.0, -35.0, 60.0];
        let longitudes = [5.0, 120.0, 250.0];
        let ones = [1.0, 1.0, 1.0];
        let twos = [2.0, 2.0, 2.0];

        let base = expand_points(&ExpansionInput::new(&latitudes, &longitudes, 3).with_values(&ones))
            .expect("unit-value expansion should succeed");
        let scaled =
            expand_points(&ExpansionInput::new(&latitudes, &longitudes, 3).with_values(&twos))
                .expect("doubled-value expansion should succeed");

        for ((degree, order, c1, s1), (_, _, c2, s2)) in
            base.coefficients.entries().zip(scaled.coefficients.entries())
        {
            assert!(
                (2.0 * c1 - c2).abs() <= 1.0e-12 && (2.0 * s1 - s2).abs() <= 1.0e-12,
                "coefficients at l={degree} m={order} should double"
            );
        }
    }

    #[test]
    fn density_normalization_rescales_total_power() {
        let latitudes = [20.0, -40.0, 55.0, 5.0, -72.0];
        let longitudes = [10.0, 95.0, 200.0, 310.0, 45.0];

        let total = expand_points(&ExpansionInput::new(&latitudes, &longitudes, 4))
            .expect("total-power expansion should succeed");
        let density = expand_points(
            &ExpansionInput::new(&latitudes, &longitudes, 4)
                .with_normalization(PowerNormalization::Density),
        )
        .expect("density-power expansion should succeed");

        let n = latitudes.len() as f64;
        for degree in 0..=4_usize {
            let expected = FOUR_PI / (n * (2 * degree + 1) as f64) * total.power.at_degree(degree);
            let actual = density.power.at_degree(degree);
            assert!(
                (actual - expected).abs() <= 1.0e-12,
                "density power at degree {degree} expected {expected}, got {actual}"
            );
        }
    }

    #[test]
    fn least_squares_recovers_a_constant_field() {
        let mut latitudes = Vec::new();
        let mut longitudes = Vec::new();
        for lat_step in 0..6 {
            for lon_step in 0..12 {
                latitudes.push(-75.0 + 30.0 * lat_step as f64);
                longitudes.push(30.0 * lon_step as f64);
            }
        }
        let values = vec![1.0; latitudes.len()];

        let input = ExpansionInput::new(&latitudes, &longitudes, 2)
            .with_values(&values)
            .with_method(ExpansionMethod::LeastSquares);
        let output = expand_points(&input).expect("least-squares fit should succeed");

        // The constant field is exactly sqrt(4 pi) * Y00, so the fit must
        // reproduce it to solver precision.
        for (degree, order, clm, slm) in output.coefficients.entries() {
            let expected = if degree == 0 { FOUR_PI.sqrt() } else { 0.0 };
            assert!(
                (clm - expected).abs() <= 1.0e-8,
                "cosine at l={degree} m={order} expected {expected}, got {clm}"
            );
            assert!(slm.abs() <= 1.0e-8, "sine at l={degree} m={order} should vanish");
        }
        assert!((output.power.at_degree(0) - FOUR_PI).abs() <= 1.0e-7);
    }

    #[test]
    fn underdetermined_least_squares_fails_fast() {
        let input = ExpansionInput::new(&[0.0, 30.0, -30.0], &[0.0, 90.0, 180.0], 3)
            .with_method(ExpansionMethod::LeastSquares);
        let error = expand_points(&input).expect_err("3 points cannot fix 16 basis functions");
        assert_eq!(error.code(), "INPUT.LEAST_SQUARES_RANK");
    }

    #[test]
    fn empty_input_yields_zero_projection_power() {
        let input = ExpansionInput::new(&[], &[], 2);
        let output = expand_points(&input).expect("empty projection input is well defined");
        assert_eq!(output.power.len(), 3);
        assert!(output.power.values().iter().all(|power| *power == 0.0));
    }

    #[test]
    fn density_power_with_no_points_fails_fast() {
        let input =
            ExpansionInput::new(&[], &[], 2).with_normalization(PowerNormalization::Density);
        let error = expand_points(&input).expect_err("density scaling needs samples");
        assert_eq!(error.code(), "INPUT.EMPTY_POINTS");
    }
}
