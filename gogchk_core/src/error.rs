/*============================================================
  Synavera Project: Gog-Chk
  Module: gogchk_core::error
  Etiquette: Synavera Script Etiquette — Rust Profile v1.1.1
  ------------------------------------------------------------
  Purpose:
    Centralise Gog-Chk-Core error types so that naming, catalog,
    and scan failures share one taxonomy and one exit mapping.

  Security / Safety Notes:
    Error contexts carry directory names and product ids only;
    response bodies are never echoed back.

  Dependencies:
    thiserror for ergonomic error definitions.

  Operational Scope:
    Used across modules to propagate failures to the binary
    entry point, which aborts the run on the first one unless
    keep-going diagnostics are requested.

  Revision History:
    2025-11-12 COD  Established inventory error taxonomy.
  ------------------------------------------------------------
  SSE Principles Observed:
    - Explicit error taxonomy with actionable context
    - No silent failure paths
    - Stable exit codes for operational tooling
============================================================*/

use std::io;
use std::process::ExitCode;

use thiserror::Error;

/// Result alias for Gog-Chk-Core operations.
pub type Result<T> = std::result::Result<T, GogchkError>;

/// Enumerates high-level error domains surfaced by Gog-Chk-Core.
#[derive(Debug, Error)]
pub enum GogchkError {
    #[error("Malformed package directory name `{name}`")]
    MalformedName { name: String },
    #[error("Unknown version-platform [{variant}] for [{slug}]")]
    UnknownVariant { variant: String, slug: String },
    #[error("Catalog slug `{remote}` does not match local slug `{local}` for id {id}")]
    IdentityMismatch {
        id: String,
        local: String,
        remote: String,
    },
    #[error("Unknown catalog id [{id}]")]
    NotFound { id: String },
    #[error("Transport: {0}")]
    Transport(String),
    #[error("Parse: {0}")]
    Parse(String),
    #[error("Configuration: {0}")]
    Config(String),
    #[error("Filesystem: {0}")]
    Filesystem(String),
    #[error("Runtime: {0}")]
    Runtime(String),
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl GogchkError {
    /// Map error category to a deterministic exit code.
    pub fn exit_code(&self) -> ExitCode {
        ExitCode::from(self.code())
    }

    fn code(&self) -> u8 {
        match self {
            GogchkError::MalformedName { .. } => 10,
            GogchkError::UnknownVariant { .. } => 11,
            GogchkError::IdentityMismatch { .. } => 12,
            GogchkError::Config(_) => 20,
            GogchkError::NotFound { .. } => 30,
            GogchkError::Transport(_) => 31,
            GogchkError::Parse(_) => 32,
            GogchkError::Filesystem(_) => 40,
            GogchkError::Io(_) => 41,
            GogchkError::Runtime(_) => 50,
        }
    }

    /// True for failures that may clear up on a second attempt.
    pub fn is_transient(&self) -> bool {
        matches!(self, GogchkError::Transport(_))
    }
}
