//! Domain error types.

/// Top-level error type for gapscreen.
#[derive(Debug, thiserror::Error)]
pub enum GapscreenError {
    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("cannot read universe {path}: {reason}")]
    UniverseRead { path: String, reason: String },

    #[error("fetch failed for {ticker}: {reason}")]
    Fetch { ticker: String, reason: String },

    #[error("report error: {reason}")]
    Report { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl GapscreenError {
    /// Process exit status for this error class.
    pub fn exit_status(&self) -> u8 {
        match self {
            GapscreenError::Io(_) | GapscreenError::Report { .. } => 1,
            GapscreenError::ConfigParse { .. }
            | GapscreenError::ConfigMissing { .. }
            | GapscreenError::ConfigInvalid { .. } => 2,
            GapscreenError::UniverseRead { .. } => 3,
            GapscreenError::Fetch { .. } => 5,
        }
    }
}

impl From<&GapscreenError> for std::process::ExitCode {
    fn from(err: &GapscreenError) -> Self {
        std::process::ExitCode::from(err.exit_status())
    }
}
