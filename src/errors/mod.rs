use anyhow::Context as _;
use thiserror::Error;

/// Failures the tournament core refuses to recover from
#[derive(Debug, Error, PartialEq)]
pub enum TournamentError {
    #[error("pairing invariant violated: {0}")]
    InvariantViolation(String),

    #[error("manual pairing rejected after {attempts} attempt(s): {reason}")]
    ManualPairingRejected { attempts: usize, reason: String },

    #[error("tie at the qualification cutoff could not be resolved: {0}")]
    TieBreakUnresolved(String),

    #[error("unknown player: {0}")]
    UnknownPlayer(String),

    #[error("duplicate player: {0}")]
    DuplicatePlayer(String),

    #[error("no result supplied for {0}")]
    MissingResult(String),

    #[error("invalid result: {0}")]
    InvalidResult(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("bracket needs at least 4 players, got {0}")]
    BracketTooSmall(usize),

    #[error("collaborator failed: {0}")]
    Collaborator(String),
}

pub type CoreResult<T> = Result<T, TournamentError>;

/// Add context to puzzle fetch errors
pub fn fetch_context(url: &str) -> String {
    format!("Failed to fetch puzzle from: {}", url)
}

/// Add context to parse errors
pub fn parse_context(data_type: &str) -> String {
    format!("Failed to parse {}", data_type)
}

/// Add context to file errors
pub fn file_context(operation: &str, path: &str) -> String {
    format!("Failed to {} file: {}", operation, path)
}

/// Wrap result with parse context
pub fn with_parse_context<T, E>(result: Result<T, E>, data_type: &str) -> anyhow::Result<T>
where
    E: std::error::Error + Send + Sync + 'static,
{
    result.context(parse_context(data_type))
}
