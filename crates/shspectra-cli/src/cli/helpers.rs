use anyhow::Context;
use serde::Serialize;
use shspectra_core::domain::{AnalysisError, AnalysisResult};
use std::fs;
use std::path::Path;

/// Parsed `lat,lon[,value]` sample table.
#[derive(Debug, Clone, PartialEq)]
pub(super) struct PointTable {
    pub(super) latitudes: Vec<f64>,
    pub(super) longitudes: Vec<f64>,
    pub(super) values: Option<Vec<f64>>,
}

impl PointTable {
    pub(super) fn len(&self) -> usize {
        self.latitudes.len()
    }
}

/// Reads a points CSV. Rows have two or three comma-separated numeric
/// fields; the column count must be consistent across the table. Blank
/// lines and `#` comments are skipped.
pub(super) fn read_points_csv(path: &Path) -> AnalysisResult<PointTable> {
    let source = fs::read_to_string(path).map_err(|source| {
        AnalysisError::io_system(
            "IO.POINTS_READ",
            format!("failed to read points table '{}': {}", path.display(), source),
        )
    })?;
    parse_points_csv(&source)
}

pub(super) fn parse_points_csv(source: &str) -> AnalysisResult<PointTable> {
    let mut latitudes = Vec::new();
    let mut longitudes = Vec::new();
    let mut values: Option<Vec<f64>> = None;

    for (line_number, raw_line) in source.lines().enumerate() {
        let line = raw_line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let fields: Vec<&str> = line.split(',').map(str::trim).collect();
        if fields.len() != 2 && fields.len() != 3 {
            return Err(AnalysisError::input_validation(
                "INPUT.POINTS_ROW",
                format!(
                    "points row {} must have 2 or 3 fields (lat,lon[,value]), got {}",
                    line_number + 1,
                    fields.len()
                ),
            ));
        }

        let has_value = fields.len() == 3;
        let expects_value = values.is_some();
        if !latitudes.is_empty() && has_value != expects_value {
            return Err(AnalysisError::input_validation(
                "INPUT.POINTS_ROW",
                format!(
                    "points row {} switches column count mid-table",
                    line_number + 1
                ),
            ));
        }

        latitudes.push(parse_field(fields[0], "lat", line_number)?);
        longitudes.push(parse_field(fields[1], "lon", line_number)?);
        if has_value {
            values
                .get_or_insert_with(Vec::new)
                .push(parse_field(fields[2], "value", line_number)?);
        }
    }

    Ok(PointTable {
        latitudes,
        longitudes,
        values,
    })
}

fn parse_field(field: &str, name: &str, line_number: usize) -> AnalysisResult<f64> {
    field.parse::<f64>().map_err(|_| {
        AnalysisError::input_validation(
            "INPUT.POINTS_ROW",
            format!(
                "points row {} has non-numeric {name} field '{field}'",
                line_number + 1
            ),
        )
    })
}

/// Serializes a result structure as a pretty JSON report.
pub(super) fn write_json_report<T: Serialize>(path: &Path, report: &T) -> anyhow::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create report directory '{}'", parent.display()))?;
    }

    let rendered = serde_json::to_string_pretty(report)
        .with_context(|| format!("failed to serialize report for '{}'", path.display()))?;
    fs::write(path, rendered + "\n")
        .with_context(|| format!("failed to write report '{}'", path.display()))
}
