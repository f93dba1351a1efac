use crate::model::team::Side;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Data error: {0}")]
    DataError(String),

    #[error("JSON parsing error: {0}")]
    JsonError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Draft(#[from] DraftError),
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::JsonError(err.to_string())
    }
}

/// A rejected draft action. The state it was proposed against is unchanged.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DraftError {
    #[error("The draft is already complete")]
    DraftComplete,

    #[error("It is {expected}'s turn, not {actual}'s")]
    OutOfTurn { expected: Side, actual: Side },

    #[error("Unknown champion: {0}")]
    UnknownChampion(String),

    #[error("{0} is already picked or banned")]
    AlreadyTaken(String),

    #[error("{0} was played earlier in this series")]
    FearlessLocked(String),

    #[error("{0} cannot fill any open role")]
    RoleUnsatisfiable(String),

    #[error("No legal champion left for turn {turn}")]
    NoLegalCandidates { turn: usize },
}
