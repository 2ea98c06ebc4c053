use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum KpwdError {
    #[error("no action configured (expected one of: all, search, list, file, commandline)")]
    MissingAction,

    #[error("cannot perform action '{0}' (expected one of: all, search, list, file, commandline)")]
    UnknownAction(String),

    #[error("invalid driver '{0}' (expected sequential or concurrent)")]
    UnknownDriver(String),

    #[error("invalid organism code: {0}")]
    InvalidOrganismCode(String),

    #[error("invalid pathway id: {0}")]
    InvalidPathwayId(String),

    #[error("no pathway maps configured, cannot download pathways")]
    EmptyPathwayList,

    #[error("action 'search' needs a search term (argument or config topic)")]
    MissingSearchTerm,

    #[error("action 'file' needs an input file (argument or config input_file)")]
    MissingInputFile,

    #[error("failed to read config file at {0}")]
    ConfigRead(PathBuf),

    #[error("failed to parse JSON config: {0}")]
    ConfigParse(String),

    #[error("KEGG request failed: {0}")]
    KeggHttp(String),

    #[error("KEGG returned status {status} for '{target}': {message}")]
    KeggStatus {
        target: String,
        status: u16,
        message: String,
    },

    #[error("filesystem error: {0}")]
    Filesystem(String),

    #[error("{0}")]
    Worker(String),
}

impl KpwdError {
    /// True for errors caused by configuration or user input, raised before
    /// any pathway is fetched.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            KpwdError::MissingAction
                | KpwdError::UnknownAction(_)
                | KpwdError::UnknownDriver(_)
                | KpwdError::InvalidOrganismCode(_)
                | KpwdError::InvalidPathwayId(_)
                | KpwdError::EmptyPathwayList
                | KpwdError::MissingSearchTerm
                | KpwdError::MissingInputFile
                | KpwdError::ConfigRead(_)
                | KpwdError::ConfigParse(_)
        )
    }

    /// Process exit code: 2 for configuration errors, 3 for KEGG failures,
    /// 1 for everything else.
    pub fn exit_code(&self) -> u8 {
        match self {
            err if err.is_config_error() => 2,
            KpwdError::KeggHttp(_) | KpwdError::KeggStatus { .. } => 3,
            _ => 1,
        }
    }
}
