//! Player state.
//!
//! A player is identified by the external user id it was created for. Owned
//! buildings live on the [`Board`](crate::board::Board); the player only
//! caches the victory-point total derived from them.

use crate::deck::{CardHoldings, DevelopmentCard};
use crate::economy::Wallet;
use serde::{Deserialize, Serialize};
use std::fmt;

/// External user id of a player
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PlayerId(pub u64);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "player-{}", self.0)
    }
}

/// A single player's state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    /// Display name, resolved once when the player is created
    pub name: String,
    pub wallet: Wallet,
    /// Development cards in hand
    pub cards: CardHoldings,
    /// Cached total, recomputed after every applied move
    pub victory_points: u32,
}

impl Player {
    /// Create a new player with an empty wallet
    pub fn new(id: PlayerId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            wallet: Wallet::new(),
            cards: CardHoldings::new(),
            victory_points: 0,
        }
    }

    /// Victory Point cards held
    pub fn hidden_points(&self) -> u32 {
        self.cards.count(DevelopmentCard::VictoryPoint)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::economy::Resource;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_new_player_is_empty() {
        let player = Player::new(PlayerId(7), "Ada");
        assert_eq!(player.name, "Ada");
        assert!(player.wallet.is_empty());
        assert_eq!(player.cards.total(), 0);
        assert_eq!(player.victory_points, 0);
    }

    #[test]
    fn test_hidden_points() {
        let mut player = Player::new(PlayerId(1), "Bo");
        player.cards.add(DevelopmentCard::VictoryPoint);
        player.cards.add(DevelopmentCard::VictoryPoint);
        player.cards.add(DevelopmentCard::Knight);
        player.wallet.credit(Resource::Ore, 3);
        assert_eq!(player.hidden_points(), 2);
    }

    #[test]
    fn test_player_id_display() {
        assert_eq!(PlayerId(42).to_string(), "player-42");
    }
}
