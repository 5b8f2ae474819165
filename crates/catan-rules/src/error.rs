//! Engine error types.
//!
//! Every rule violation surfaces as [`GameError::IllegalMove`] carrying an
//! [`IllegalReason`]; the game it was checked against is left untouched.

use crate::board::BoardError;
use crate::deck::DeckError;
use crate::economy::EconomyError;
use crate::game::GameId;
use crate::player::PlayerId;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why a move was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Error)]
pub enum IllegalReason {
    #[error("not your turn")]
    NotYourTurn,

    #[error("move not allowed in the current phase")]
    WrongPhase,

    #[error("site already occupied")]
    Occupied,

    #[error("too close to another building")]
    DistanceRule,

    #[error("settlement belongs to another player")]
    NotOwner,

    #[error("no settlement to upgrade")]
    NoSettlement,

    #[error("insufficient funds")]
    InsufficientFunds,

    #[error("development card not held")]
    CardNotHeld,

    #[error("not connected to the player's network")]
    NotConnected,

    #[error("invalid target")]
    InvalidTarget,

    #[error("game is over")]
    GameOver,

    #[error("game is not over")]
    GameNotOver,

    #[error("game is full")]
    GameFull,
}

/// What could not be found
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
pub enum NotFound {
    #[error("game {0} not found")]
    Game(GameId),

    #[error("{0} not found")]
    Player(PlayerId),

    #[error("coordinate {0} out of range")]
    Coordinate(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
pub enum GameError {
    #[error("illegal move: {reason}")]
    IllegalMove { reason: IllegalReason },

    #[error(transparent)]
    NotFound(#[from] NotFound),

    #[error("invalid configuration: {0}")]
    Configuration(String),
}

impl GameError {
    pub fn illegal(reason: IllegalReason) -> Self {
        GameError::IllegalMove { reason }
    }

    /// The rejection reason, if this is a rule violation
    pub fn reason(&self) -> Option<IllegalReason> {
        match self {
            GameError::IllegalMove { reason } => Some(*reason),
            _ => None,
        }
    }
}

impl From<IllegalReason> for GameError {
    fn from(reason: IllegalReason) -> Self {
        GameError::illegal(reason)
    }
}

impl From<BoardError> for IllegalReason {
    fn from(err: BoardError) -> Self {
        match err {
            BoardError::EdgeOccupied(_) | BoardError::VertexOccupied(_) => IllegalReason::Occupied,
            BoardError::DistanceRule(_) => IllegalReason::DistanceRule,
            BoardError::NoSettlement(_) => IllegalReason::NoSettlement,
            BoardError::NotOwner(_) => IllegalReason::NotOwner,
            BoardError::RoadNotConnected(_) | BoardError::SettlementNotConnected(_) => {
                IllegalReason::NotConnected
            }
            BoardError::RobberAlreadyThere(_) => IllegalReason::InvalidTarget,
        }
    }
}

impl From<EconomyError> for IllegalReason {
    fn from(err: EconomyError) -> Self {
        match err {
            EconomyError::InsufficientFunds { .. } => IllegalReason::InsufficientFunds,
            EconomyError::SameResource(_) => IllegalReason::InvalidTarget,
        }
    }
}

impl From<DeckError> for IllegalReason {
    fn from(err: DeckError) -> Self {
        match err {
            DeckError::NotHeld(_) => IllegalReason::CardNotHeld,
        }
    }
}

impl From<BoardError> for GameError {
    fn from(err: BoardError) -> Self {
        GameError::illegal(err.into())
    }
}

impl From<EconomyError> for GameError {
    fn from(err: EconomyError) -> Self {
        GameError::illegal(err.into())
    }
}

impl From<DeckError> for GameError {
    fn from(err: DeckError) -> Self {
        GameError::illegal(err.into())
    }
}

pub type Result<T> = std::result::Result<T, GameError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::economy::Resource;
    use crate::topology::{EdgeId, VertexId};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_component_errors_map_to_reasons() {
        assert_eq!(
            GameError::from(BoardError::DistanceRule(VertexId(1))).reason(),
            Some(IllegalReason::DistanceRule)
        );
        assert_eq!(
            GameError::from(BoardError::EdgeOccupied(EdgeId(1))).reason(),
            Some(IllegalReason::Occupied)
        );
        assert_eq!(
            GameError::from(EconomyError::SameResource(Resource::Ore)).reason(),
            Some(IllegalReason::InvalidTarget)
        );
        assert_eq!(
            GameError::from(DeckError::NotHeld(crate::deck::DevelopmentCard::Monopoly)).reason(),
            Some(IllegalReason::CardNotHeld)
        );
    }

    #[test]
    fn test_error_messages() {
        let err = GameError::illegal(IllegalReason::NotYourTurn);
        assert_eq!(err.to_string(), "illegal move: not your turn");
        let err = GameError::from(NotFound::Player(PlayerId(3)));
        assert_eq!(err.to_string(), "player-3 not found");
        assert_eq!(err.reason(), None);
    }
}
