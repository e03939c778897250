use thiserror::Error;

/// Errors returned by a search call
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SearchError {
    #[error("Game is stochastic or not alternating-move")]
    UnsupportedGame,

    #[error("Game is already over")]
    TerminalState,

    #[error("No legal moves available")]
    NoLegalMoves,

    #[error("Search stopped before any root move was sampled")]
    EmptyRoot,
}
