use crate::dependencies::TraceEntry;
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub type Result<T> = anyhow::Result<T>;

pub type AlignResult<T> = std::result::Result<T, AlignError>;

/// Outcome of running a command against one manifest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    Success,
    Excluded,
    InvalidAppRequirements,
    InvalidConfiguration,
    InvalidManifest,
    MissingRequiredDependency,
    NotConfigured,
    Unsatisfied,
    WriteFailed,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::Success => "success",
            ErrorCode::Excluded => "excluded",
            ErrorCode::InvalidAppRequirements => "invalid-app-requirements",
            ErrorCode::InvalidConfiguration => "invalid-configuration",
            ErrorCode::InvalidManifest => "invalid-manifest",
            ErrorCode::MissingRequiredDependency => "missing-required-dependency",
            ErrorCode::NotConfigured => "not-configured",
            ErrorCode::Unsatisfied => "unsatisfied",
            ErrorCode::WriteFailed => "write-failed",
        }
    }

    /// Codes that should fail a run. Skipped packages are not failures.
    pub fn is_failure(&self) -> bool {
        !matches!(self, ErrorCode::Success | ErrorCode::Excluded | ErrorCode::NotConfigured)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum AlignError {
    #[error("'{}' does not contain a valid package manifest: {reason}", path.display())]
    InvalidManifest { path: PathBuf, reason: String },

    #[error("'{0}' is excluded")]
    Excluded(String),

    #[error("'{}' is not configured", .0.display())]
    NotConfigured(PathBuf),

    #[error("{0}")]
    InvalidConfiguration(String),

    #[error("Invalid requirement: {0}")]
    InvalidRequirement(String),

    #[error("Invalid version range in requirement: {0}")]
    InvalidVersionRange(String),

    #[error("unknown preset '{0}'")]
    UnknownPreset(String),

    #[error("No profiles could satisfy requirements: {}", .0.join(", "))]
    UnsatisfiedRequirements(Vec<String>),

    #[error("No profiles could satisfy all requirements")]
    NoProfilesSatisfyAll { trace: Vec<TraceEntry> },

    #[error("The following capabilities could not be resolved: {}", .0.join(", "))]
    UnresolvedCapabilities(Vec<String>),

    #[error("Apps must target exactly one profile, but requirements are satisfied by: {}", .0.join(", "))]
    InvalidAppRequirements(Vec<String>),

    #[error("'{package}' does not depend on '{dependency}'")]
    MissingRequiredDependency { package: String, dependency: String },

    #[error("found {0} misaligned dependencies")]
    Unsatisfied(usize),

    #[error("unable to write {}: {cause:#}", .path.display())]
    WriteFailed { path: PathBuf, cause: anyhow::Error },

    #[error(transparent)]
    Io(#[from] anyhow::Error),
}

impl AlignError {
    pub fn code(&self) -> ErrorCode {
        match self {
            AlignError::InvalidManifest { .. } | AlignError::Io(_) => ErrorCode::InvalidManifest,
            AlignError::Excluded(_) => ErrorCode::Excluded,
            AlignError::NotConfigured(_) => ErrorCode::NotConfigured,
            AlignError::InvalidConfiguration(_)
            | AlignError::InvalidRequirement(_)
            | AlignError::InvalidVersionRange(_)
            | AlignError::UnknownPreset(_)
            | AlignError::UnsatisfiedRequirements(_)
            | AlignError::UnresolvedCapabilities(_) => ErrorCode::InvalidConfiguration,
            AlignError::NoProfilesSatisfyAll { .. } | AlignError::Unsatisfied(_) => {
                ErrorCode::Unsatisfied
            }
            AlignError::InvalidAppRequirements(_) => ErrorCode::InvalidAppRequirements,
            AlignError::MissingRequiredDependency { .. } => ErrorCode::MissingRequiredDependency,
            AlignError::WriteFailed { .. } => ErrorCode::WriteFailed,
        }
    }

    pub fn write_failed(path: &Path, cause: anyhow::Error) -> Self {
        AlignError::WriteFailed { path: path.to_path_buf(), cause }
    }
}

/// Collapse an operation result into the code reported for a manifest.
pub fn code_of<T>(result: &AlignResult<T>) -> ErrorCode {
    match result {
        Ok(_) => ErrorCode::Success,
        Err(e) => e.code(),
    }
}
