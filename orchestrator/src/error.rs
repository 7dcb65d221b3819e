use std::{fmt, io, path::PathBuf};

use body_model::ModelErr;
use mesh_export::ExportErr;
use specs::SpecErr;

pub type Result<T> = std::result::Result<T, OrchestratorError>;

/// All errors that can occur while serving a generation request.
#[derive(Debug)]
pub enum OrchestratorError {
    /// The request itself is invalid: a value out of range or an unknown variant.
    Rejected(SpecErr),
    /// The cache key couldn't be derived from the measurements.
    Key(SpecErr),
    /// The body model couldn't be loaded or evaluated.
    Model(ModelErr),
    /// The evaluated mesh couldn't be encoded.
    Export(ExportErr),
    /// A cache entry couldn't be read or written.
    Cache { path: PathBuf, source: io::Error },
    /// An underlying I/O error not covered by the above variants.
    Io(io::Error),
}

impl OrchestratorError {
    /// Whether the caller is at fault, as opposed to the service.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::Rejected(_))
    }
}

impl fmt::Display for OrchestratorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rejected(e) => write!(f, "{e}"),
            Self::Key(e) => write!(f, "failed to derive cache key: {e}"),
            Self::Model(e) => write!(f, "{e}"),
            Self::Export(e) => write!(f, "{e}"),
            Self::Cache { path, source } => {
                write!(f, "cache entry {} failed: {source}", path.display())
            }
            Self::Io(e) => write!(f, "io error: {e}"),
        }
    }
}

impl std::error::Error for OrchestratorError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Rejected(e) | Self::Key(e) => Some(e),
            Self::Model(e) => Some(e),
            Self::Export(e) => Some(e),
            Self::Cache { source, .. } => Some(source),
            Self::Io(e) => Some(e),
        }
    }
}

impl From<ModelErr> for OrchestratorError {
    fn from(e: ModelErr) -> Self {
        Self::Model(e)
    }
}

impl From<ExportErr> for OrchestratorError {
    fn from(e: ExportErr) -> Self {
        Self::Export(e)
    }
}

impl From<io::Error> for OrchestratorError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}
