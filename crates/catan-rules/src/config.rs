//! Per-game configuration.

use crate::economy::BANK_TRADE_RATIO;
use crate::error::{GameError, Result};
use serde::{Deserialize, Serialize};

/// Seats any game may have
pub const PLAYER_LIMITS: std::ops::RangeInclusive<usize> = 2..=4;

/// Victory points needed to win by default
pub const VICTORY_POINTS_TO_WIN: u32 = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Joins needed before setup starts
    pub min_players: usize,
    pub max_players: usize,
    pub victory_points_to_win: u32,
    /// Units given to the bank per unit received
    pub bank_trade_ratio: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            min_players: 2,
            max_players: 4,
            victory_points_to_win: VICTORY_POINTS_TO_WIN,
            bank_trade_ratio: BANK_TRADE_RATIO,
        }
    }
}

impl GameConfig {
    /// A config that starts as soon as `players` have joined
    pub fn for_players(players: usize) -> Self {
        Self {
            min_players: players,
            max_players: players,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !PLAYER_LIMITS.contains(&self.min_players) || !PLAYER_LIMITS.contains(&self.max_players)
        {
            return Err(GameError::Configuration(format!(
                "player bounds {}..={} must lie within 2..=4",
                self.min_players, self.max_players
            )));
        }
        if self.min_players > self.max_players {
            return Err(GameError::Configuration(format!(
                "min_players {} exceeds max_players {}",
                self.min_players, self.max_players
            )));
        }
        if self.victory_points_to_win == 0 {
            return Err(GameError::Configuration(
                "victory_points_to_win must be positive".to_string(),
            ));
        }
        if self.bank_trade_ratio == 0 {
            return Err(GameError::Configuration(
                "bank_trade_ratio must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Parse and validate a JSON config; missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: GameConfig =
            serde_json::from_str(json).map_err(|e| GameError::Configuration(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }
}
