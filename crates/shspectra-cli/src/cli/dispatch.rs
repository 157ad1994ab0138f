use super::commands::{CorrelateArgs, PowerArgs};
use super::helpers::{read_points_csv, write_json_report};
use super::{CliCommand, CliError};
use shspectra_core::analysis::{
    CorrelationInput, DEFAULT_CONFIDENCE_LEVELS, ExpansionInput, correlate_degrees, expand_points,
    read_coefficients_csv, render_correlation_csv, render_power_csv, write_coefficients_csv,
    write_correlation_csv, write_power_csv,
};
use tracing::{debug, info};

pub(super) fn dispatch_parsed(command: CliCommand) -> Result<i32, CliError> {
    match command {
        CliCommand::Power(args) => run_power(args),
        CliCommand::Correlate(args) => run_correlate(args),
    }
}

fn run_power(args: PowerArgs) -> Result<i32, CliError> {
    let table = read_points_csv(&args.points)?;
    info!(
        points = table.len(),
        max_degree = args.max_degree,
        method = ?args.method,
        "fitting spherical-harmonic expansion"
    );

    let mut input = ExpansionInput::new(&table.latitudes, &table.longitudes, args.max_degree)
        .with_method(args.method.into())
        .with_normalization(args.normalization.into());
    if let Some(values) = table.values.as_deref() {
        input = input.with_values(values);
    }

    let output = expand_points(&input)?;
    debug!(degrees = output.power.len(), "expansion complete");

    let mut wrote_table = false;
    if let Some(path) = &args.coefficients {
        write_coefficients_csv(path, &output.coefficients)?;
        info!(path = %path.display(), "wrote coefficient table");
        wrote_table = true;
    }
    if let Some(path) = &args.power {
        write_power_csv(path, &output.power)?;
        info!(path = %path.display(), "wrote power spectrum");
        wrote_table = true;
    }
    if let Some(path) = &args.report {
        write_json_report(path, &output)?;
        info!(path = %path.display(), "wrote JSON report");
        wrote_table = true;
    }

    if !wrote_table {
        print!("{}", render_power_csv(&output.power));
    }

    Ok(0)
}

fn run_correlate(args: CorrelateArgs) -> Result<i32, CliError> {
    let first = read_coefficients_csv(&args.first)?;
    let second = read_coefficients_csv(&args.second)?;
    info!(
        max_degree = first.max_degree(),
        levels = args.confidence_levels.len().max(1),
        "correlating coefficient sets per degree"
    );

    let levels: &[f64] = if args.confidence_levels.is_empty() {
        DEFAULT_CONFIDENCE_LEVELS
    } else {
        &args.confidence_levels
    };

    let result = correlate_degrees(
        &CorrelationInput::new(&first, &second)
            .with_confidence_levels(levels)
            .with_degree_zero(args.degree_zero.into()),
    )?;
    debug!(degrees = result.degrees.len(), "correlation complete");

    let mut wrote_table = false;
    if let Some(path) = &args.output {
        write_correlation_csv(path, &result)?;
        info!(path = %path.display(), "wrote correlation table");
        wrote_table = true;
    }
    if let Some(path) = &args.report {
        write_json_report(path, &result)?;
        info!(path = %path.display(), "wrote JSON report");
        wrote_table = true;
    }

    if !wrote_table {
        print!("{}", render_correlation_csv(&result));
    }

    Ok(0)
}
