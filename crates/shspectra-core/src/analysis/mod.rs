pub mod correlation;
pub mod expansion;
pub mod serialization;

pub use correlation::{
    CorrelationInput, DEFAULT_CONFIDENCE_LEVELS, DegreeZeroPolicy, correlate_degrees,
};
pub use expansion::{
    ExpansionInput, ExpansionMethod, ExpansionOutput, PowerNormalization, expand_points,
};
pub use serialization::{
    parse_coefficients_csv, read_coefficients_csv, render_coefficients_csv,
    render_correlation_csv, render_power_csv, write_coefficients_csv, write_correlation_csv,
    write_power_csv,
};
