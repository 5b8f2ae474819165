//! Concurrent autoplay: seat players and submit random legal moves.

use crate::config::HostConfig;
use crate::store::{Directory, MemoryStore};
use catan_rules::{GameError, GameId, GameService, GameSummary, PlayerId};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

pub type Service = GameService<MemoryStore, Directory>;

#[derive(Debug, Error)]
pub enum PlayoutError {
    #[error("game rejected a generated move: {0}")]
    Game(#[from] GameError),

    #[error("playout worker failed: {0}")]
    Worker(#[from] tokio::task::JoinError),
}

/// How one game ended
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Outcome {
    pub game: GameId,
    pub moves: usize,
    /// Set when the game finished within the move limit
    pub summary: Option<GameSummary>,
}

/// Build the service the host runs against
pub fn service(config: &HostConfig) -> Arc<Service> {
    let service = match config.seed {
        Some(seed) => GameService::seeded(MemoryStore::new(), Directory::new(), seed),
        None => GameService::new(MemoryStore::new(), Directory::new()),
    };
    Arc::new(service)
}

/// Play `config.games` games at once, each on a blocking worker.
pub async fn run(service: Arc<Service>, config: &HostConfig) -> Result<Vec<Outcome>, PlayoutError> {
    let mut handles = Vec::with_capacity(config.games);
    for index in 0..config.games {
        let service = Arc::clone(&service);
        let config = config.clone();
        handles.push(tokio::task::spawn_blocking(move || {
            play_game(&service, &config, index)
        }));
    }

    let mut outcomes = Vec::with_capacity(handles.len());
    for handle in handles {
        outcomes.push(handle.await??);
    }
    Ok(outcomes)
}

/// Create one game, seat the players and play it out.
pub fn play_game(service: &Service, config: &HostConfig, index: usize) -> Result<Outcome, PlayoutError> {
    let mut picker = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(index as u64)),
        None => StdRng::from_entropy(),
    };

    let mut game = service.create(config.seated_game())?;
    for seat in 0..config.players {
        let user = PlayerId((index * config.players + seat) as u64 + 1);
        service.identity().register(user, format!("bot {}", user.0));
        game = service.join(game.id, user)?;
    }
    info!(game = %game.id, players = game.players.len(), "autoplay started");

    let mut moves = 0;
    while !game.is_over() && moves < config.max_moves {
        if game.legal_moves.is_empty() {
            break;
        }
        let mv = game.legal_moves[picker.gen_range(0..game.legal_moves.len())].clone();
        game = service.submit(&mv)?;
        moves += 1;
    }

    let summary = if game.is_over() {
        catan_rules::game_summary(&game).ok()
    } else {
        debug!(game = %game.id, moves, "move limit reached");
        None
    };
    Ok(Outcome {
        game: game.id,
        moves,
        summary,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use catan_rules::{GameConfig, GameRepository, Phase};
    use pretty_assertions::assert_eq;
    use std::collections::BTreeSet;

    fn quick_config(games: usize) -> HostConfig {
        HostConfig {
            games,
            players: 2,
            seed: Some(9),
            max_moves: 4000,
            game: GameConfig {
                victory_points_to_win: 4,
                ..GameConfig::for_players(2)
            },
        }
    }

    #[tokio::test]
    async fn test_run_plays_every_game() {
        let config = quick_config(3);
        let service = service(&config);
        let outcomes = run(Arc::clone(&service), &config).await.unwrap();

        assert_eq!(outcomes.len(), 3);
        let ids: BTreeSet<GameId> = outcomes.iter().map(|o| o.game).collect();
        assert_eq!(ids.len(), 3);

        let store = service.repository();
        let finished = outcomes.iter().filter(|o| o.summary.is_some()).count();
        assert_eq!(store.archived_count(), finished);
        assert_eq!(store.active_games(), outcomes.len() - finished);
        for outcome in &outcomes {
            match &outcome.summary {
                Some(summary) => {
                    assert_eq!(store.archived(outcome.game).as_ref(), Some(summary));
                    assert!(summary.winner_points >= 4);
                }
                None => assert!(store.load_game(outcome.game).is_ok()),
            }
        }
    }

    #[test]
    fn test_default_config_seats_everyone() {
        let config = HostConfig {
            seed: Some(1),
            max_moves: 10,
            ..HostConfig::default()
        };
        let service = service(&config);
        let outcome = play_game(&service, &config, 0).unwrap();

        assert_eq!(outcome.moves, 10);
        let game = service.repository().load_game(outcome.game).unwrap();
        assert_eq!(game.players.len(), config.players);
    }

    #[test]
    fn test_every_seat_joins_before_setup() {
        let config = HostConfig {
            players: 3,
            seed: Some(5),
            max_moves: 0,
            ..HostConfig::default()
        };
        let service = service(&config);
        let outcome = play_game(&service, &config, 0).unwrap();

        let game = service.repository().load_game(outcome.game).unwrap();
        assert_eq!(game.players.len(), 3);
        assert!(matches!(game.phase, Phase::Setup { round: 1, .. }));
    }

    #[test]
    fn test_move_limit_leaves_game_stored() {
        let config = HostConfig {
            max_moves: 3,
            ..quick_config(1)
        };
        let service = service(&config);
        let outcome = play_game(&service, &config, 0).unwrap();

        assert_eq!(outcome.moves, 3);
        assert_eq!(outcome.summary, None);
        assert!(service.repository().load_game(outcome.game).is_ok());
        let game = service.repository().load_game(outcome.game).unwrap();
        assert!(game.players[0].name.starts_with("bot "));
    }
}
