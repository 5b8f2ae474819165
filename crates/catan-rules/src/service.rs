//! Orchestration over the persistence and identity collaborators.
//!
//! [`GameService`] is the only place that touches storage. Each call loads a
//! fresh [`Game`], applies one engine operation under that game's lock and
//! saves the result. Different games never wait on each other except for the
//! instant it takes to derive a per-move generator from the shared one.

use crate::config::GameConfig;
use crate::context::Context;
use crate::error::{GameError, IllegalReason, NotFound, Result};
use crate::game::{apply_move, create_game, join_game, Game, GameId};
use crate::legal;
use crate::moves::Move;
use crate::player::{Player, PlayerId};
use crate::topology::Topology;
use crate::victory::{game_summary, GameSummary};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, info, warn};

/// Storage for games, players and finished-game summaries.
///
/// Implementations decide the transaction boundaries; the service loads a
/// game before every change and saves the returned game after it.
pub trait GameRepository: Send + Sync {
    fn load_game(&self, id: GameId) -> Result<Game>;
    fn save_game(&self, game: &Game) -> Result<()>;
    /// Load the player record for an external user id
    fn load_player(&self, user: PlayerId) -> Result<Player>;
    fn save_player(&self, player: &Player) -> Result<()>;
    fn archive(&self, game: GameId, summary: &GameSummary) -> Result<()>;
    fn delete_game(&self, id: GameId) -> Result<()>;
}

/// Resolves external user ids to display names
pub trait IdentityProvider: Send + Sync {
    fn display_name(&self, user: PlayerId) -> Result<String>;
}

pub struct GameService<S, I> {
    repository: S,
    identity: I,
    topology: Arc<Topology>,
    rng: Mutex<StdRng>,
    /// One entry per live game, added by `create` and dropped when archived
    locks: Mutex<HashMap<GameId, Arc<Mutex<()>>>>,
    next_id: AtomicU64,
}

impl<S: GameRepository, I: IdentityProvider> GameService<S, I> {
    pub fn new(repository: S, identity: I) -> Self {
        Self::with_rng(repository, identity, StdRng::from_entropy())
    }

    /// Deterministic service for tests and replays
    pub fn seeded(repository: S, identity: I, seed: u64) -> Self {
        Self::with_rng(repository, identity, StdRng::seed_from_u64(seed))
    }

    fn with_rng(repository: S, identity: I, rng: StdRng) -> Self {
        Self {
            repository,
            identity,
            topology: Arc::new(Topology::standard()),
            rng: Mutex::new(rng),
            locks: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    pub fn repository(&self) -> &S {
        &self.repository
    }

    pub fn identity(&self) -> &I {
        &self.identity
    }

    pub fn topology(&self) -> &Arc<Topology> {
        &self.topology
    }

    /// Create and store an empty game
    pub fn create(&self, config: GameConfig) -> Result<Game> {
        let id = GameId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let mut ctx = self.context();
        let game = create_game(&mut ctx, id, config)?;
        self.repository.save_game(&game)?;
        lock_ignoring_poison(&self.locks).insert(id, Arc::default());
        info!(game = %id, "game created");
        Ok(game)
    }

    /// Seat a user, creating their player record on first sight.
    pub fn join(&self, id: GameId, user: PlayerId) -> Result<Game> {
        let lock = self.game_lock(id)?;
        let _guard = lock_ignoring_poison(&*lock);

        let game = self.repository.load_game(id)?;
        let player = match self.repository.load_player(user) {
            Ok(player) => player,
            Err(GameError::NotFound(_)) => {
                let player = Player::new(user, self.identity.display_name(user)?);
                self.repository.save_player(&player)?;
                player
            }
            Err(err) => return Err(err),
        };
        let mut ctx = self.context();
        let game = join_game(&mut ctx, &game, player)?;
        self.repository.save_game(&game)?;
        Ok(game)
    }

    /// Apply a move under the game's lock.
    ///
    /// A finished game is archived and deleted before this returns; the
    /// returned `Game` is the final state.
    pub fn submit(&self, mv: &Move) -> Result<Game> {
        let lock = self.game_lock(mv.game_id)?;
        let _guard = lock_ignoring_poison(&*lock);

        let game = self.repository.load_game(mv.game_id)?;
        let mut ctx = self.context();
        let next = match apply_move(&mut ctx, &game, mv) {
            Ok(next) => next,
            Err(err) => {
                warn!(game = %mv.game_id, player = %mv.player, action = mv.kind.name(), %err, "move rejected");
                return Err(err);
            }
        };
        self.repository.save_game(&next)?;
        if next.is_over() {
            self.finish(&next)?;
        }
        Ok(next)
    }

    /// Legal moves of `player` in the stored game
    pub fn legal_moves(&self, id: GameId, player: PlayerId) -> Result<Vec<Move>> {
        let game = self.repository.load_game(id)?;
        Ok(legal::legal_moves(&game, player))
    }

    /// Archive and delete a finished game that is still stored.
    pub fn teardown(&self, id: GameId) -> Result<GameSummary> {
        let lock = self.game_lock(id)?;
        let _guard = lock_ignoring_poison(&*lock);
        let game = self.repository.load_game(id)?;
        if !game.is_over() {
            return Err(IllegalReason::GameNotOver.into());
        }
        self.finish(&game)
    }

    fn finish(&self, game: &Game) -> Result<GameSummary> {
        let summary = game_summary(game)?;
        self.repository.archive(game.id, &summary)?;
        self.repository.delete_game(game.id)?;
        lock_ignoring_poison(&self.locks).remove(&game.id);
        info!(
            game = %game.id,
            winner = %summary.winner_name,
            points = summary.winner_points,
            "game archived"
        );
        Ok(summary)
    }

    /// Per-call context; the shared generator is held only to seed it.
    fn context(&self) -> Context<StdRng> {
        let seed: u64 = lock_ignoring_poison(&self.rng).gen();
        Context::with_rng(self.topology.clone(), StdRng::seed_from_u64(seed))
    }

    /// Lock of a game created by this service; unknown ids get no entry.
    fn game_lock(&self, id: GameId) -> Result<Arc<Mutex<()>>> {
        let locks = lock_ignoring_poison(&self.locks);
        let lock = locks.get(&id).cloned().ok_or(NotFound::Game(id))?;
        debug!(game = %id, "game lock acquired");
        Ok(lock)
    }
}

/// A panic in another caller does not corrupt stored games, so keep going.
fn lock_ignoring_poison<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::Phase;
    use crate::moves::MoveKind;
    use pretty_assertions::assert_eq;

    #[derive(Default)]
    struct MemoryRepository {
        games: Mutex<HashMap<GameId, Game>>,
        players: Mutex<HashMap<PlayerId, Player>>,
        archived: Mutex<Vec<(GameId, GameSummary)>>,
    }

    impl GameRepository for MemoryRepository {
        fn load_game(&self, id: GameId) -> Result<Game> {
            self.games
                .lock()
                .unwrap()
                .get(&id)
                .cloned()
                .ok_or_else(|| NotFound::Game(id).into())
        }

        fn save_game(&self, game: &Game) -> Result<()> {
            self.games.lock().unwrap().insert(game.id, game.clone());
            Ok(())
        }

        fn load_player(&self, user: PlayerId) -> Result<Player> {
            self.players
                .lock()
                .unwrap()
                .get(&user)
                .cloned()
                .ok_or_else(|| NotFound::Player(user).into())
        }

        fn save_player(&self, player: &Player) -> Result<()> {
            self.players
                .lock()
                .unwrap()
                .insert(player.id, player.clone());
            Ok(())
        }

        fn archive(&self, game: GameId, summary: &GameSummary) -> Result<()> {
            self.archived.lock().unwrap().push((game, summary.clone()));
            Ok(())
        }

        fn delete_game(&self, id: GameId) -> Result<()> {
            self.games.lock().unwrap().remove(&id);
            Ok(())
        }
    }

    struct Names;

    impl IdentityProvider for Names {
        fn display_name(&self, user: PlayerId) -> Result<String> {
            Ok(format!("user {}", user.0))
        }
    }

    fn service() -> GameService<MemoryRepository, Names> {
        GameService::seeded(MemoryRepository::default(), Names, 17)
    }

    #[test]
    fn test_join_resolves_names_once() {
        let svc = service();
        let game = svc.create(GameConfig::for_players(2)).unwrap();
        let game = svc.join(game.id, PlayerId(5)).unwrap();
        assert_eq!(game.players[0].name, "user 5");
        assert!(svc.repository().load_player(PlayerId(5)).is_ok());
    }

    #[test]
    fn test_unknown_game() {
        let svc = service();
        assert_eq!(
            svc.join(GameId(404), PlayerId(1)).unwrap_err(),
            GameError::NotFound(NotFound::Game(GameId(404)))
        );
    }

    #[test]
    fn test_rejected_move_is_not_saved() {
        let svc = service();
        let game = svc.create(GameConfig::for_players(2)).unwrap();
        svc.join(game.id, PlayerId(1)).unwrap();
        let game = svc.join(game.id, PlayerId(2)).unwrap();

        let mv = Move::new(game.id, game.current_player().unwrap().id, MoveKind::Dice);
        assert_eq!(
            svc.submit(&mv).unwrap_err().reason(),
            Some(IllegalReason::WrongPhase)
        );
        assert_eq!(svc.repository().load_game(game.id).unwrap(), game);
    }

    #[test]
    fn test_finished_game_is_archived() {
        let svc = service();
        let config = GameConfig {
            victory_points_to_win: 1,
            ..GameConfig::for_players(2)
        };
        let game = svc.create(config).unwrap();
        svc.join(game.id, PlayerId(1)).unwrap();
        let game = svc.join(game.id, PlayerId(2)).unwrap();

        let first = game.legal_moves[0].clone();
        let done = svc.submit(&first).unwrap();
        assert_eq!(done.phase, Phase::GameOver { winner: first.player });
        assert!(svc.repository().load_game(game.id).is_err());

        let archived = svc.repository().archived.lock().unwrap();
        assert_eq!(archived.len(), 1);
        assert_eq!(archived[0].1.winner, first.player);
        assert_eq!(archived[0].1.winner_points, 1);
        assert!(svc.locks.lock().unwrap().is_empty());
    }

    #[test]
    fn test_unknown_ids_leave_no_locks() {
        let svc = service();
        for n in 100..200 {
            assert_eq!(
                svc.teardown(GameId(n)).unwrap_err(),
                GameError::NotFound(NotFound::Game(GameId(n)))
            );
            assert!(svc.join(GameId(n), PlayerId(1)).is_err());
        }
        assert!(svc.locks.lock().unwrap().is_empty());

        let game = svc.create(GameConfig::for_players(2)).unwrap();
        assert_eq!(svc.locks.lock().unwrap().len(), 1);
        assert!(svc.locks.lock().unwrap().contains_key(&game.id));
    }

    #[test]
    fn test_teardown_requires_game_over() {
        let svc = service();
        let game = svc.create(GameConfig::default()).unwrap();
        assert_eq!(
            svc.teardown(game.id).unwrap_err().reason(),
            Some(IllegalReason::GameNotOver)
        );
    }
}
