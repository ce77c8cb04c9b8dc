//! Reformat error types and diagnostics.

use std::path::PathBuf;

use thiserror::Error;

use crate::util::diagnostic::{suggestions, Diagnostic};

/// Errors the maintainer has to act on before re-running.
///
/// Plain filesystem and subprocess failures travel as `anyhow::Error` with
/// context instead; these variants are the ones with a specific remedy.
#[derive(Debug, Error)]
pub enum ReformatError {
    #[error("source tree `{}` does not exist or is not a directory", path.display())]
    InvalidSourceTree { path: PathBuf },

    #[error("folder `{}` declares more than one plugin family", folder.display())]
    AmbiguousFamily {
        folder: PathBuf,
        descriptors: Vec<String>,
    },

    #[error("destination `{}` already exists", path.display())]
    DestinationExists { path: PathBuf },

    #[error("unknown template command `{command}` on line {line}")]
    UnknownTemplateCommand { line: usize, command: String },

    #[error("version file `{}` has no version on its first line", path.display())]
    MissingVersion { path: PathBuf },

    #[error("`{tool}` was not found in PATH")]
    ToolNotFound { tool: String },
}

impl ReformatError {
    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        let diag = Diagnostic::error(self.to_string());
        match self {
            ReformatError::InvalidSourceTree { path } => diag
                .with_location(path)
                .with_suggestion(suggestions::CHECK_SOURCE),

            ReformatError::AmbiguousFamily {
                folder,
                descriptors,
            } => diag
                .with_location(folder)
                .with_context(format!("descriptors: {}", descriptors.join(", ")))
                .with_suggestion(suggestions::SINGLE_DESCRIPTOR)
                .with_suggestion(suggestions::CLEAN_OUTPUT),

            ReformatError::DestinationExists { path } => diag
                .with_location(path)
                .with_suggestion("Remove it or pass a different `--destination`"),

            ReformatError::UnknownTemplateCommand { .. } => diag
                .with_suggestion(suggestions::TEMPLATE_COMMANDS)
                .with_suggestion(suggestions::CLEAN_OUTPUT),

            ReformatError::MissingVersion { path } => diag
                .with_location(path)
                .with_suggestion("Put the release version on the first line of the file")
                .with_suggestion(suggestions::CLEAN_OUTPUT),

            ReformatError::ToolNotFound { tool } => diag
                .with_suggestion(format!("Install `{}` or re-run with `--skip-package`", tool))
                .with_suggestion(suggestions::CLEAN_OUTPUT),
        }
    }
}
