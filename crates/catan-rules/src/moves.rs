//! Moves players can submit.
//!
//! A [`Move`] is created either as a legal-move candidate or by a caller, and
//! is consumed when applied. Its payload refers to board positions by
//! topology id.

use crate::deck::DevelopmentCard;
use crate::economy::Resource;
use crate::game::GameId;
use crate::player::PlayerId;
use crate::topology::{EdgeId, TileId, VertexId};
use serde::{Deserialize, Serialize};

/// A move by one player in one game
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Move {
    pub game_id: GameId,
    pub player: PlayerId,
    pub kind: MoveKind,
}

impl Move {
    pub fn new(game_id: GameId, player: PlayerId, kind: MoveKind) -> Self {
        Self {
            game_id,
            player,
            kind,
        }
    }
}

/// What a built piece is and where it goes
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum BuildTarget {
    Road(EdgeId),
    Settlement(VertexId),
    /// Upgrade the player's settlement at this vertex
    City(VertexId),
}

/// All move variants
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MoveKind {
    // ==================== Setup Phase ====================
    /// Free settlement during setup
    FirstSettlement { vertex: VertexId },
    /// Free road touching the settlement just placed
    FirstRoad { edge: EdgeId },
    /// Skip a setup placement when none is possible
    FirstPass,

    // ==================== Turn Actions ====================
    /// Roll the dice (the only move in the roll phase)
    Dice,
    /// End the turn
    Pass,

    // ==================== Main Phase ====================
    /// Trade with the bank at the configured ratio
    Trade { offered: Resource, needed: Resource },
    /// Buy a development card
    Purchase,
    Build(BuildTarget),

    // ==================== Development Cards ====================
    /// Move the robber and optionally steal from a player on the target tile
    PlayKnight {
        tile: TileId,
        victim: Option<PlayerId>,
    },
    /// Two free roads; `second` is omitted only when no second road fits
    PlayRoadBuilding {
        first: EdgeId,
        second: Option<EdgeId>,
    },
    PlayYearOfPlenty { first: Resource, second: Resource },
    PlayMonopoly { resource: Resource },
    /// Reveal a Victory Point card (it stays in hand)
    PlayVictoryPoint,
}

impl MoveKind {
    /// The development card this move plays, if any
    pub fn card(&self) -> Option<DevelopmentCard> {
        match self {
            MoveKind::PlayKnight { .. } => Some(DevelopmentCard::Knight),
            MoveKind::PlayRoadBuilding { .. } => Some(DevelopmentCard::RoadBuilding),
            MoveKind::PlayYearOfPlenty { .. } => Some(DevelopmentCard::YearOfPlenty),
            MoveKind::PlayMonopoly { .. } => Some(DevelopmentCard::Monopoly),
            MoveKind::PlayVictoryPoint => Some(DevelopmentCard::VictoryPoint),
            _ => None,
        }
    }

    /// Short name used in logs
    pub fn name(&self) -> &'static str {
        match self {
            MoveKind::FirstSettlement { .. } => "first-settlement",
            MoveKind::FirstRoad { .. } => "first-road",
            MoveKind::FirstPass => "first-pass",
            MoveKind::Dice => "dice",
            MoveKind::Pass => "pass",
            MoveKind::Trade { .. } => "trade",
            MoveKind::Purchase => "purchase",
            MoveKind::Build(BuildTarget::Road(_)) => "build-road",
            MoveKind::Build(BuildTarget::Settlement(_)) => "build-settlement",
            MoveKind::Build(BuildTarget::City(_)) => "build-city",
            MoveKind::PlayKnight { .. } => "play-knight",
            MoveKind::PlayRoadBuilding { .. } => "play-road-building",
            MoveKind::PlayYearOfPlenty { .. } => "play-year-of-plenty",
            MoveKind::PlayMonopoly { .. } => "play-monopoly",
            MoveKind::PlayVictoryPoint => "play-victory-point",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_card_for_move() {
        assert_eq!(
            MoveKind::PlayMonopoly {
                resource: Resource::Ore
            }
            .card(),
            Some(DevelopmentCard::Monopoly)
        );
        assert_eq!(MoveKind::Purchase.card(), None);
        assert_eq!(
            MoveKind::PlayVictoryPoint.card(),
            Some(DevelopmentCard::VictoryPoint)
        );
    }

    #[test]
    fn test_move_serializes_with_payload() {
        let mv = Move::new(
            GameId(1),
            PlayerId(2),
            MoveKind::Build(BuildTarget::Road(EdgeId(9))),
        );
        let json = serde_json::to_string(&mv).unwrap();
        let back: Move = serde_json::from_str(&json).unwrap();
        assert_eq!(back, mv);
        assert!(json.contains("Road"));
    }

    #[test]
    fn test_move_names() {
        assert_eq!(MoveKind::FirstPass.name(), "first-pass");
        assert_eq!(MoveKind::Dice.name(), "dice");
        assert_eq!(MoveKind::Build(BuildTarget::City(VertexId(3))).name(), "build-city");
    }
}
