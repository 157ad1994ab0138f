use shspectra_core::analysis::{DegreeZeroPolicy, ExpansionMethod, PowerNormalization};
use std::path::PathBuf;

#[derive(clap::Args)]
pub(super) struct PowerArgs {
    /// Points table: one `lat,lon[,value]` row per sample, degrees
    #[arg(long)]
    pub(super) points: PathBuf,

    /// Maximum spherical-harmonic degree of the expansion
    #[arg(long, default_value_t = 20)]
    pub(super) max_degree: usize,

    /// Coefficient fit method
    #[arg(long, value_enum, default_value = "projection")]
    pub(super) method: MethodArg,

    /// Power normalization per degree
    #[arg(long, value_enum, default_value = "total")]
    pub(super) normalization: NormalizationArg,

    /// Write the coefficient table (degree,order,clm,slm) to this CSV
    #[arg(long)]
    pub(super) coefficients: Option<PathBuf>,

    /// Write the power spectrum (degree,power) to this CSV
    #[arg(long)]
    pub(super) power: Option<PathBuf>,

    /// Write the full result as a JSON report
    #[arg(long)]
    pub(super) report: Option<PathBuf>,
}

#[derive(clap::Args)]
pub(super) struct CorrelateArgs {
    /// First coefficient table (as written by `shspectra power`)
    #[arg(long)]
    pub(super) first: PathBuf,

    /// Second coefficient table; must share the first table's max degree
    #[arg(long)]
    pub(super) second: PathBuf,

    /// Confidence level for the per-degree intervals; repeat for several
    #[arg(long = "confidence-level", value_name = "LEVEL")]
    pub(super) confidence_levels: Vec<f64>,

    /// Convention for the degree-0 correlation
    #[arg(long, value_enum, default_value = "propagate")]
    pub(super) degree_zero: DegreeZeroArg,

    /// Write the correlation table (degree,correlation,lower,upper) to this CSV
    #[arg(long)]
    pub(super) output: Option<PathBuf>,

    /// Write the full result as a JSON report
    #[arg(long)]
    pub(super) report: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub(super) enum MethodArg {
    /// Direct projection sums over the points
    Projection,
    /// Dense least-squares fit over the full basis
    LeastSquares,
}

impl From<MethodArg> for ExpansionMethod {
    fn from(method: MethodArg) -> Self {
        match method {
            MethodArg::Projection => Self::PointProjection,
            MethodArg::LeastSquares => Self::LeastSquares,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub(super) enum NormalizationArg {
    /// Plain sum of squared coefficients per degree
    Total,
    /// Density-estimator scaling 4 pi / (n (2l+1))
    Density,
}

impl From<NormalizationArg> for PowerNormalization {
    fn from(normalization: NormalizationArg) -> Self {
        match normalization {
            NormalizationArg::Total => Self::Total,
            NormalizationArg::Density => Self::Density,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub(super) enum DegreeZeroArg {
    /// Compute degree 0 normally; zero power yields NaN
    Propagate,
    /// Report degree 0 as exactly 1.0
    Unit,
}

impl From<DegreeZeroArg> for DegreeZeroPolicy {
    fn from(policy: DegreeZeroArg) -> Self {
        match policy {
            DegreeZeroArg::Propagate => Self::Propagate,
            DegreeZeroArg::Unit => Self::UnitByConvention,
        }
    }
}
