mod commands;
mod dispatch;
mod helpers;

use clap::Parser;
use shspectra_core::domain::AnalysisError;

pub fn run_from_env() -> i32 {
    let args: Vec<String> = std::env::args().skip(1).collect();

    match run(args) {
        Ok(code) => code,
        Err(CliError::Usage(message)) => {
            eprintln!("{message}");
            2
        }
        Err(CliError::Compute(error)) => {
            eprintln!("{}", error.diagnostic_line());
            error.exit_code()
        }
        Err(CliError::Report(error)) => {
            eprintln!("shspectra: report error: {error:#}");
            3
        }
    }
}

pub fn run<I, S>(args: I) -> Result<i32, CliError>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let full_args = std::iter::once("shspectra".to_string())
        .chain(args.into_iter().map(Into::into))
        .collect::<Vec<_>>();
    parse_and_dispatch(full_args)
}

fn parse_and_dispatch(args: Vec<String>) -> Result<i32, CliError> {
    match Cli::try_parse_from(&args) {
        Ok(cli) => dispatch::dispatch_parsed(cli.command),
        Err(err) => match err.kind() {
            clap::error::ErrorKind::DisplayHelp | clap::error::ErrorKind::DisplayVersion => {
                print!("{err}");
                Ok(0)
            }
            _ => Err(CliError::Usage(err.to_string())),
        },
    }
}

#[derive(Parser)]
#[command(
    name = "shspectra",
    about = "Spherical-harmonic power and degree correlation for point data"
)]
struct Cli {
    #[command(subcommand)]
    command: CliCommand,
}

#[derive(clap::Subcommand)]
enum CliCommand {
    /// Fit spherical-harmonic coefficients to points and derive per-degree power
    Power(commands::PowerArgs),
    /// Correlate two coefficient tables degree by degree
    Correlate(commands::CorrelateArgs),
}

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("{0}")]
    Usage(String),
    #[error(transparent)]
    Compute(#[from] AnalysisError),
    #[error(transparent)]
    Report(#[from] anyhow::Error),
}
