use thiserror::Error;

/// Errors raised when a game reports malformed data to the search core
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GameError {
    #[error("Invalid utility: {0}")]
    InvalidUtility(String),

    #[error("Invalid rank: {0}")]
    InvalidRank(String),

    #[error("Expected at least one player")]
    NoPlayers,

    #[error("Invalid player id: {0}")]
    InvalidPlayer(u8),
}

/// Convenience Result type for game contract operations
pub type Result<T> = std::result::Result<T, GameError>;
