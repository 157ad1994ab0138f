use std::fmt::{Display, Formatter};

/// Failure categories surfaced by the analysis operations.
///
/// Zero-power degrees in the correlator are deliberately NOT an error
/// category: they are a numeric-warning condition reported as NaN in the
/// output so a single degenerate degree never aborts a whole run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnalysisErrorCategory {
    InputError,
    IoError,
}

impl AnalysisErrorCategory {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InputError => "INPUT",
            Self::IoError => "IO",
        }
    }
}

impl Display for AnalysisErrorCategory {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str((*self).as_str())
    }
}

/// Shared error type for the estimator, the correlator, and the CSV sinks.
///
/// Each error carries a stable placeholder code (for example
/// `INPUT.POINT_LENGTHS`) so callers and tests can match on the failure
/// site without parsing the human-readable message.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{code}: {message}")]
pub struct AnalysisError {
    category: AnalysisErrorCategory,
    code: &'static str,
    message: String,
}

impl AnalysisError {
    pub fn input_validation(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            category: AnalysisErrorCategory::InputError,
            code,
            message: message.into(),
        }
    }

    pub fn io_system(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            category: AnalysisErrorCategory::IoError,
            code,
            message: message.into(),
        }
    }

    pub fn category(&self) -> AnalysisErrorCategory {
        self.category
    }

    pub fn code(&self) -> &'static str {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn exit_code(&self) -> i32 {
        match self.category {
            AnalysisErrorCategory::InputError => 2,
            AnalysisErrorCategory::IoError => 3,
        }
    }

    pub fn diagnostic_line(&self) -> String {
        format!("shspectra: {} error [{}]: {}", self.category, self.code, self.message)
    }
}

pub type AnalysisResult<T> = Result<T, AnalysisError>;
