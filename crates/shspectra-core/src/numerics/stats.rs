//! Inverse standard-normal CDF used by the Fisher-z correlation intervals.

const PROBIT_A: [f64; 6] = [
    -3.969_683_028_665_376e1,
    2.209_460_984_245_205e2,
    -2.759_285_104_469_687e2,
    1.383_577_518_672_690e2,
    -3.066_479_806_614_716e1,
    2.506_628_277_459_239e0,
];

const PROBIT_B: [f64; 5] = [
    -5.447_609_879_822_406e1,
    1.615_858_368_580_409e2,
    -1.556_989_798_598_866e2,
    6.680_131_188_771_972e1,
    -1.328_068_155_288_572e1,
];

const PROBIT_C: [f64; 6] = [
    -7.784_894_002_430_293e-3,
    -3.223_964_580_411_365e-1,
    -2.400_758_277_161_838e0,
    -2.549_732_539_343_734e0,
    4.374_664_141_464_968e0,
    2.938_163_982_698_783e0,
];

const PROBIT_D: [f64; 4] = [
    7.784_695_709_041_462e-3,
    3.224_671_290_700_398e-1,
    2.445_134_137_142_996e0,
    3.754_408_661_907_416e0,
];

// Central/tail split of the rational approximation.
const PROBIT_P_LOW: f64 = 0.02425;

/// Quantile of the standard normal distribution (inverse CDF).
///
/// Rational approximation accurate to about 1.2e-9 across the full domain.
/// Returns NaN for p outside (0, 1); callers validate confidence levels
/// before getting here.
pub fn standard_normal_quantile(p: f64) -> f64 {
    if !(p > 0.0 && p < 1.0) {
        return f64::NAN;
    }

    if p < PROBIT_P_LOW {
        let q = (-2.0 * p.ln()).sqrt();
        return tail_expansion(q);
    }

    let p_high = 1.0 - PROBIT_P_LOW;
    if p > p_high {
        let q = (-2.0 * (1.0 - p).ln()).sqrt();
        return -tail_expansion(q);
    }

    let q = p - 0.5;
    let r = q * q;
    let numerator = ((((PROBIT_A[0] * r + PROBIT_A[1]) * r + PROBIT_A[2]) * r + PROBIT_A[3]) * r
        + PROBIT_A[4])
        * r
        + PROBIT_A[5];
    let denominator = ((((PROBIT_B[0] * r + PROBIT_B[1]) * r + PROBIT_B[2]) * r + PROBIT_B[3]) * r
        + PROBIT_B[4])
        * r
        + 1.0;
    numerator * q / denominator
}

fn tail_expansion(q: f64) -> f64 {
    let numerator = ((((PROBIT_C[0] * q + PROBIT_C[1]) * q + PROBIT_C[2]) * q + PROBIT_C[3]) * q
        + PROBIT_C[4])
        * q
        + PROBIT_C[5];
    let denominator =
        (((PROBIT_D[0] * q + PROBIT_D[1]) * q + PROBIT_D[2]) * q + PROBIT_D[3]) * q + 1.0;
    numerator / denominator
}

#[cfg(test)]
mod tests {
    use super::standard_normal_quantile;

    #[test]
    fn quantile_matches_reference_values() {
        let cases = [
            (0.5, 0.0),
            (0.9, 1.281_551_565_544_600_4),
            (0.975, 1.959_963_984_540_054),
            (0.995, 2.575_829_303_548_900_4),
            (0.001, -3.090_232_306_167_813),
        ];

        for (p, expected) in cases {
            let actual = standard_normal_quantile(p);
            let abs_diff = (actual - expected).abs();
            assert!(
                abs_diff <= 1.0e-7,
                "quantile({p}) expected={expected:.12} actual={actual:.12} abs_diff={abs_diff:.3e}"
            );
        }
    }

    #[test]
    fn quantile_is_antisymmetric_about_the_median() {
        for p in [0.01, 0.1, 0.25, 0.4, 0.45] {
            let lower = standard_normal_quantile(p);
            let upper = standard_normal_quantile(1.0 - p);
            assert!(
                (lower + upper).abs() <= 1.0e-8,
                "quantile({p}) and quantile({}) should be mirror images",
                1.0 - p
            );
        }
    }

    #[test]
    fn quantile_is_monotonic() {
        let probabilities = [0.001, 0.01, 0.02425, 0.1, 0.5, 0.9, 0.97575, 0.99, 0.999];
        let mut previous = f64::NEG_INFINITY;
        for p in probabilities {
            let value = standard_normal_quantile(p);
            assert!(value > previous, "quantile must increase at p={p}");
            previous = value;
        }
    }

    #[test]
    fn quantile_is_nan_outside_the_open_unit_interval() {
        for p in [-0.1, 0.0, 1.0, 1.5, f64::NAN] {
            assert!(standard_normal_quantile(p).is_nan(), "p={p}");
        }
    }
}
