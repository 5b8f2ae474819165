//! Victory points, game end and the final summary.

use crate::error::{IllegalReason, Result};
use crate::game::Game;
use crate::player::PlayerId;
use serde::{Deserialize, Serialize};

/// Result of a finished game
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSummary {
    pub winner: PlayerId,
    pub winner_name: String,
    pub winner_points: u32,
    /// `(name, points)` for every player in seat order
    pub per_player_points: Vec<(String, u32)>,
}

/// Settlements count 1, cities 2, held Victory Point cards 1 each.
pub fn points_for(game: &Game, player: PlayerId) -> u32 {
    let board = &game.board;
    let buildings = board.settlement_count(player) + 2 * board.city_count(player);
    let cards = game.player(player).map(|p| p.hidden_points()).unwrap_or(0);
    buildings as u32 + cards
}

/// Refresh every player's cached total.
pub fn recompute(game: &mut Game) {
    let totals: Vec<u32> = {
        let game: &Game = game;
        game.players.iter().map(|p| points_for(game, p.id)).collect()
    };
    for (player, total) in game.players.iter_mut().zip(totals) {
        player.victory_points = total;
    }
}

/// The winner after a move by the player in seat `actor`, if any.
///
/// Only the actor's total can change during their move, so only the actor
/// is checked; a tie at the threshold goes to them.
pub fn check_winner(game: &Game, actor: usize) -> Option<PlayerId> {
    game.players
        .get(actor)
        .filter(|p| p.victory_points >= game.config.victory_points_to_win)
        .map(|p| p.id)
}

/// Winner and standings of a finished game.
pub fn game_summary(game: &Game) -> Result<GameSummary> {
    let Some(winner) = game.winner() else {
        return Err(IllegalReason::GameNotOver.into());
    };
    let per_player_points: Vec<(String, u32)> = game
        .players
        .iter()
        .map(|p| (p.name.clone(), p.victory_points))
        .collect();
    let (winner_name, winner_points) = game
        .player(winner)
        .map(|p| (p.name.clone(), p.victory_points))
        .unwrap_or_default();
    Ok(GameSummary {
        winner,
        winner_name,
        winner_points,
        per_player_points,
    })
}
