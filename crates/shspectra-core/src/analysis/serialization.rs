//! Delimited-text sinks and sources for analysis results.
//!
//! Output is plain header-less CSV, one row per degree (and per order for
//! coefficient tables). Writing is a single scoped operation per table;
//! the reader exists for the manual hand-off of an estimator's coefficient
//! table into the correlator.

use crate::domain::{
    AnalysisError, AnalysisResult, CoefficientSet, CorrelationResult, PowerSpectrum, packed_index,
    packed_len,
};
use std::fs;
use std::path::Path;

/// Canonicalizes line endings and guarantees a trailing newline so repeated
/// writes of the same table produce identical bytes.
pub fn normalize_text_artifact(content: &str) -> String {
    let mut normalized = content.replace("\r\n", "\n").replace('\r', "\n");
    if !normalized.is_empty() && !normalized.ends_with('\n') {
        normalized.push('\n');
    }
    normalized
}

fn write_text_artifact(path: &Path, content: &str, code: &'static str) -> AnalysisResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|source| {
            AnalysisError::io_system(
                code,
                format!("failed to create directory '{}': {}", parent.display(), source),
            )
        })?;
    }

    fs::write(path, normalize_text_artifact(content)).map_err(|source| {
        AnalysisError::io_system(
            code,
            format!("failed to write '{}': {}", path.display(), source),
        )
    })
}

/// Rows `degree,order,clm,slm` for every (degree, order) in packed order.
pub fn render_coefficients_csv(set: &CoefficientSet) -> String {
    let mut table = String::new();
    for (degree, order, clm, slm) in set.entries() {
        table.push_str(&format!("{degree},{order},{clm},{slm}\n"));
    }
    table
}

pub fn write_coefficients_csv(path: &Path, set: &CoefficientSet) -> AnalysisResult<()> {
    write_text_artifact(path, &render_coefficients_csv(set), "IO.COEFFICIENTS_CSV")
}

/// Rows `degree,power` for degrees 0..=max_degree.
pub fn render_power_csv(spectrum: &PowerSpectrum) -> String {
    let mut table = String::new();
    for (degree, power) in spectrum.values().iter().enumerate() {
        table.push_str(&format!("{degree},{power}\n"));
    }
    table
}

pub fn write_power_csv(path: &Path, spectrum: &PowerSpectrum) -> AnalysisResult<()> {
    write_text_artifact(path, &render_power_csv(spectrum), "IO.POWER_CSV")
}

/// Rows `degree,correlation` followed by `lower,upper` for each confidence
/// level. Undefined values render as `NaN`.
pub fn render_correlation_csv(result: &CorrelationResult) -> String {
    let mut table = String::new();
    for entry in &result.degrees {
        table.push_str(&format!("{},{}", entry.degree, entry.correlation));
        for interval in &entry.intervals {
            table.push_str(&format!(",{},{}", interval.lower, interval.upper));
        }
        table.push('\n');
    }
    table
}

pub fn write_correlation_csv(path: &Path, result: &CorrelationResult) -> AnalysisResult<()> {
    write_text_artifact(path, &render_correlation_csv(result), "IO.CORRELATION_CSV")
}

/// Parses a coefficients table written by [`render_coefficients_csv`].
///
/// Blank lines and `#` comments are skipped. The rows must cover the full
/// triangle up to the largest degree present; the single exception is a
/// missing (0, 0) row, which is taken as zero because the original density
/// tooling starts its tables at degree 1.
pub fn parse_coefficients_csv(source: &str) -> AnalysisResult<CoefficientSet> {
    let mut rows: Vec<(usize, usize, f64, f64)> = Vec::new();

    for (line_number, raw_line) in source.lines().enumerate() {
        let line = raw_line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let fields: Vec<&str> = line.split(',').map(str::trim).collect();
        if fields.len() != 4 {
            return Err(AnalysisError::input_validation(
                "INPUT.COEFFICIENT_ROW",
                format!(
                    "coefficient row {} must have 4 fields (degree,order,clm,slm), got {}",
                    line_number + 1,
                    fields.len()
                ),
            ));
        }

        let degree = parse_index(fields[0], "degree", line_number)?;
        let order = parse_index(fields[1], "order", line_number)?;
        if order > degree {
            return Err(AnalysisError::input_validation(
                "INPUT.COEFFICIENT_ROW",
                format!(
                    "coefficient row {} has order {} greater than degree {}",
                    line_number + 1,
                    order,
                    degree
                ),
            ));
        }

        let clm = parse_value(fields[2], "clm", line_number)?;
        let slm = parse_value(fields[3], "slm", line_number)?;
        rows.push((degree, order, clm, slm));
    }

    if rows.is_empty() {
        return Err(AnalysisError::input_validation(
            "INPUT.COEFFICIENT_ROWS",
            "coefficient table contains no data rows",
        ));
    }

    let max_degree = rows.iter().map(|(degree, ..)| *degree).max().unwrap_or(0);
    let entries = packed_len(max_degree);
    let mut cosine = vec![0.0_f64; entries];
    let mut sine = vec![0.0_f64; entries];
    let mut seen = vec![false; entries];

    for (degree, order, clm, slm) in rows {
        let offset = packed_index(degree, order);
        if seen[offset] {
            return Err(AnalysisError::input_validation(
                "INPUT.COEFFICIENT_DUPLICATE",
                format!("duplicate coefficient row for degree {degree} order {order}"),
            ));
        }
        seen[offset] = true;
        cosine[offset] = clm;
        sine[offset] = slm;
    }

    let missing: Vec<usize> = seen
        .iter()
        .enumerate()
        .filter_map(|(offset, present)| (!present).then_some(offset))
        .collect();
    if !(missing.is_empty() || missing == [packed_index(0, 0)]) {
        return Err(AnalysisError::input_validation(
            "INPUT.COEFFICIENT_SHAPE",
            format!(
                "coefficient table up to degree {} is missing {} (degree, order) entries",
                max_degree,
                missing.len()
            ),
        ));
    }

    CoefficientSet::from_packed(max_degree, cosine, sine)
}

pub fn read_coefficients_csv(path: &Path) -> AnalysisResult<CoefficientSet> {
    let source = fs::read_to_string(path).map_err(|source| {
        AnalysisError::io_system(
            "IO.COEFFICIENTS_READ",
            format!("failed to read '{}': {}", path.display(), source),
        )
    })?;
    parse_coefficients_csv(&source)
}

fn parse_index(field: &str, name: &str, line_number: usize) -> AnalysisResult<usize> {
    field.parse::<usize>().map_err(|_| {
        AnalysisError::input_validation(
            "INPUT.COEFFICIENT_ROW",
            format!(
                "coefficient row {} has non-integer {name} field '{field}'",
                line_number + 1
            ),
        )
    })
}

fn parse_value(field: &str, name: &str, line_number: usize) -> AnalysisResult<f64> {
    field.parse::<f64>().map_err(|_| {
        AnalysisError::input_validation(
            "INPUT.COEFFICIENT_ROW",
            format!(
                "coefficient row {} has non-numeric {name} field '{field}'",
                line_number + 1
            ),
        )
    })
}
