//! Host configuration from the environment.

use catan_rules::{GameConfig, GameError};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HostConfigError {
    #[error("{name} must be a non-negative integer, got {value:?}")]
    NotANumber { name: &'static str, value: String },

    #[error("CATAN_GAMES must be at least 1")]
    NoGames,

    #[error("CATAN_PLAYERS is {players}, outside {min}..={max} of the game config")]
    PlayerCount { players: usize, min: usize, max: usize },

    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error(transparent)]
    Game(#[from] GameError),
}

/// What the autoplay driver runs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostConfig {
    /// Games played concurrently
    pub games: usize,
    /// Seats filled in every game; setup starts once all are taken
    pub players: usize,
    /// Seed for the service and the move pickers; entropy when unset
    pub seed: Option<u64>,
    /// Moves after which an unfinished game is abandoned
    pub max_moves: usize,
    pub game: GameConfig,
}

impl Default for HostConfig {
    fn default() -> Self {
        let game = GameConfig::default();
        Self {
            games: 4,
            players: game.min_players,
            seed: None,
            max_moves: 5000,
            game,
        }
    }
}

impl HostConfig {
    pub fn from_env() -> Result<Self, HostConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from any variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, HostConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let game = match lookup("CATAN_CONFIG") {
            Some(path) => {
                let path = PathBuf::from(path);
                let json = std::fs::read_to_string(&path)
                    .map_err(|source| HostConfigError::Read { path, source })?;
                GameConfig::from_json_str(&json)?
            }
            None => GameConfig::default(),
        };

        let defaults = Self::default();
        let config = Self {
            games: number(&lookup, "CATAN_GAMES")?.unwrap_or(defaults.games),
            players: number(&lookup, "CATAN_PLAYERS")?.unwrap_or(game.min_players),
            seed: number(&lookup, "CATAN_SEED")?,
            max_moves: number(&lookup, "CATAN_MAX_MOVES")?.unwrap_or(defaults.max_moves),
            game,
        };
        config.validate()?;
        Ok(config)
    }

    /// Game config each playout creates its games with.
    ///
    /// A game leaves the lobby as soon as `min_players` have joined, so the
    /// minimum is raised to the seat count.
    pub fn seated_game(&self) -> GameConfig {
        GameConfig {
            min_players: self.players,
            ..self.game.clone()
        }
    }

    pub fn validate(&self) -> Result<(), HostConfigError> {
        if self.games == 0 {
            return Err(HostConfigError::NoGames);
        }
        if !(self.game.min_players..=self.game.max_players).contains(&self.players) {
            return Err(HostConfigError::PlayerCount {
                players: self.players,
                min: self.game.min_players,
                max: self.game.max_players,
            });
        }
        Ok(())
    }
}

fn number<F, T>(lookup: &F, name: &'static str) -> Result<Option<T>, HostConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(name) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| HostConfigError::NotANumber { name, value }),
    }
}
