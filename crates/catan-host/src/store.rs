//! In-memory storage and identity backed by `DashMap`.

use catan_rules::error::Result;
use catan_rules::{Game, GameId, GameRepository, GameSummary, IdentityProvider, NotFound, Player, PlayerId};
use dashmap::DashMap;

/// Game, player and archive tables shared across workers.
#[derive(Default)]
pub struct MemoryStore {
    /// Games still in progress
    games: DashMap<GameId, Game>,
    /// Player records by external user id
    players: DashMap<PlayerId, Player>,
    /// Summaries of finished games
    archive: DashMap<GameId, GameSummary>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active_games(&self) -> usize {
        self.games.len()
    }

    pub fn archived(&self, id: GameId) -> Option<GameSummary> {
        self.archive.get(&id).map(|s| s.clone())
    }

    pub fn archived_count(&self) -> usize {
        self.archive.len()
    }
}

impl GameRepository for MemoryStore {
    fn load_game(&self, id: GameId) -> Result<Game> {
        self.games
            .get(&id)
            .map(|g| g.clone())
            .ok_or_else(|| NotFound::Game(id).into())
    }

    fn save_game(&self, game: &Game) -> Result<()> {
        self.games.insert(game.id, game.clone());
        Ok(())
    }

    fn load_player(&self, user: PlayerId) -> Result<Player> {
        self.players
            .get(&user)
            .map(|p| p.clone())
            .ok_or_else(|| NotFound::Player(user).into())
    }

    fn save_player(&self, player: &Player) -> Result<()> {
        self.players.insert(player.id, player.clone());
        Ok(())
    }

    fn archive(&self, game: GameId, summary: &GameSummary) -> Result<()> {
        self.archive.insert(game, summary.clone());
        Ok(())
    }

    fn delete_game(&self, id: GameId) -> Result<()> {
        self.games.remove(&id);
        Ok(())
    }
}

/// Registered display names
#[derive(Default)]
pub struct Directory {
    names: DashMap<PlayerId, String>,
}

impl Directory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, user: PlayerId, name: impl Into<String>) {
        self.names.insert(user, name.into());
    }
}

impl IdentityProvider for Directory {
    fn display_name(&self, user: PlayerId) -> Result<String> {
        self.names
            .get(&user)
            .map(|n| n.clone())
            .ok_or_else(|| NotFound::Player(user).into())
    }
}
