//! Development cards: weighted draws and per-player holdings.
//!
//! There is no finite deck; each purchase draws a card type from fixed
//! weights over a 1-100 roll.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// Development card types
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DevelopmentCard {
    /// Move the robber and optionally steal
    Knight,
    /// Worth 1 VP while held
    VictoryPoint,
    /// Build 2 roads for free
    RoadBuilding,
    /// Take any 2 resources from the bank
    YearOfPlenty,
    /// All opponents hand over every unit of one resource
    Monopoly,
}

impl DevelopmentCard {
    pub const ALL: [DevelopmentCard; 5] = [
        DevelopmentCard::Knight,
        DevelopmentCard::VictoryPoint,
        DevelopmentCard::RoadBuilding,
        DevelopmentCard::YearOfPlenty,
        DevelopmentCard::Monopoly,
    ];

    /// Map a draw in 1..=100 onto a card type.
    pub fn from_draw(draw: u8) -> Self {
        match draw {
            0..=56 => DevelopmentCard::Knight,
            57..=76 => DevelopmentCard::VictoryPoint,
            77..=84 => DevelopmentCard::RoadBuilding,
            85..=92 => DevelopmentCard::YearOfPlenty,
            _ => DevelopmentCard::Monopoly,
        }
    }

    /// Draw a card type: Knight 56%, VictoryPoint 20%, the rest 8% each
    pub fn draw<R: Rng>(rng: &mut R) -> Self {
        Self::from_draw(rng.gen_range(1..=100))
    }

    /// Whether playing the card consumes it (VP cards are never "played")
    pub fn is_consumed(self) -> bool {
        !matches!(self, DevelopmentCard::VictoryPoint)
    }
}

impl fmt::Display for DevelopmentCard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DevelopmentCard::Knight => "knight",
            DevelopmentCard::VictoryPoint => "victory point",
            DevelopmentCard::RoadBuilding => "road building",
            DevelopmentCard::YearOfPlenty => "year of plenty",
            DevelopmentCard::Monopoly => "monopoly",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeckError {
    #[error("no {0} card held")]
    NotHeld(DevelopmentCard),
}

/// Unordered multiset of held development cards
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardHoldings {
    counts: BTreeMap<DevelopmentCard, u32>,
}

impl CardHoldings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, card: DevelopmentCard) {
        *self.counts.entry(card).or_insert(0) += 1;
    }

    pub fn count(&self, card: DevelopmentCard) -> u32 {
        self.counts.get(&card).copied().unwrap_or(0)
    }

    pub fn holds(&self, card: DevelopmentCard) -> bool {
        self.count(card) > 0
    }

    pub fn total(&self) -> u32 {
        self.counts.values().sum()
    }

    /// Check the card is held and remove one unless it is a VictoryPoint.
    pub fn play(&mut self, card: DevelopmentCard) -> Result<(), DeckError> {
        let held = self.counts.get_mut(&card).filter(|n| **n > 0);
        let Some(count) = held else {
            return Err(DeckError::NotHeld(card));
        };
        if card.is_consumed() {
            *count -= 1;
            if *count == 0 {
                self.counts.remove(&card);
            }
        }
        Ok(())
    }

    pub fn check_held(&self, card: DevelopmentCard) -> Result<(), DeckError> {
        if self.holds(card) {
            Ok(())
        } else {
            Err(DeckError::NotHeld(card))
        }
    }
}
