//! Legal-move generation.
//!
//! The engine materializes the legal set for the current actor after every
//! applied move (see [`refresh`]); [`legal_moves`] only reads it back.

use crate::board::Board;
use crate::deck::DevelopmentCard;
use crate::economy::{costs, Resource};
use crate::game::{Game, Phase, SetupStep};
use crate::moves::{BuildTarget, Move, MoveKind};
use crate::player::PlayerId;
use crate::topology::{EdgeId, Topology, VertexId};
use std::collections::BTreeSet;

/// Legal moves for `player`; empty unless it is their turn.
pub fn legal_moves(game: &Game, player: PlayerId) -> Vec<Move> {
    game.legal_moves
        .iter()
        .filter(|m| m.player == player)
        .cloned()
        .collect()
}

/// Recompute the materialized legal set for the current actor.
pub fn refresh(topology: &Topology, game: &mut Game) {
    game.legal_moves = generate(topology, game);
}

/// Enumerate every legal move of the current actor.
pub fn generate(topology: &Topology, game: &Game) -> Vec<Move> {
    let Some(actor) = game.current_player() else {
        return Vec::new();
    };
    let kinds = match &game.phase {
        Phase::Lobby | Phase::GameOver { .. } => Vec::new(),
        Phase::Setup {
            step: SetupStep::Settlement,
            ..
        } => {
            let sites = setup_settlement_sites(topology, &game.board);
            if sites.is_empty() {
                vec![MoveKind::FirstPass]
            } else {
                sites
                    .into_iter()
                    .map(|vertex| MoveKind::FirstSettlement { vertex })
                    .collect()
            }
        }
        Phase::Setup {
            step: SetupStep::Road,
            last_settlement,
            ..
        } => {
            let sites = last_settlement
                .map(|v| setup_road_sites(topology, &game.board, v))
                .unwrap_or_default();
            if sites.is_empty() {
                vec![MoveKind::FirstPass]
            } else {
                sites
                    .into_iter()
                    .map(|edge| MoveKind::FirstRoad { edge })
                    .collect()
            }
        }
        Phase::Roll => vec![MoveKind::Dice],
        Phase::Main => main_phase_moves(topology, game, actor.id),
    };
    kinds
        .into_iter()
        .map(|kind| Move::new(game.id, actor.id, kind))
        .collect()
}

/// Vacant vertices that satisfy the distance rule
pub fn setup_settlement_sites(topology: &Topology, board: &Board) -> Vec<VertexId> {
    topology
        .vertex_ids()
        .filter(|v| board.check_settlement_site(topology, *v).is_ok())
        .collect()
}

/// Vacant edges touching the settlement just placed
pub fn setup_road_sites(topology: &Topology, board: &Board, settlement: VertexId) -> Vec<EdgeId> {
    topology
        .edges_of(settlement)
        .iter()
        .copied()
        .filter(|e| board.check_road_site(*e).is_ok())
        .collect()
}

/// Vacant edges extending the player's network
pub fn connected_road_sites(topology: &Topology, board: &Board, player: PlayerId) -> Vec<EdgeId> {
    topology
        .edge_ids()
        .filter(|e| board.check_connected_road(topology, player, *e).is_ok())
        .collect()
}

/// Vacant vertices touching the player's roads and respecting the distance rule
pub fn connected_settlement_sites(
    topology: &Topology,
    board: &Board,
    player: PlayerId,
) -> Vec<VertexId> {
    topology
        .vertex_ids()
        .filter(|v| board.check_connected_settlement(topology, player, *v).is_ok())
        .collect()
}

/// Every distinct road pair a RoadBuilding card can place.
///
/// Pairs are reported once with the smaller edge first; a single road is
/// listed only when nothing can follow it.
pub fn road_building_options(
    topology: &Topology,
    board: &Board,
    player: PlayerId,
) -> Vec<(EdgeId, Option<EdgeId>)> {
    let mut options = BTreeSet::new();
    for first in connected_road_sites(topology, board, player) {
        let mut after = board.clone();
        if after.place_road(player, first).is_err() {
            continue;
        }
        let seconds = connected_road_sites(topology, &after, player);
        if seconds.is_empty() {
            options.insert((first, None));
        }
        for second in seconds {
            options.insert((first.min(second), Some(first.max(second))));
        }
    }
    options.into_iter().collect()
}

fn main_phase_moves(topology: &Topology, game: &Game, player: PlayerId) -> Vec<MoveKind> {
    let mut moves = vec![MoveKind::Pass];
    let Some(me) = game.player(player) else {
        return moves;
    };
    let wallet = &me.wallet;
    let board = &game.board;

    for offered in Resource::ALL {
        if wallet.get(offered) < game.config.bank_trade_ratio {
            continue;
        }
        for needed in Resource::ALL {
            if needed != offered {
                moves.push(MoveKind::Trade { offered, needed });
            }
        }
    }

    if wallet.can_afford(&costs::DEVELOPMENT_CARD) {
        moves.push(MoveKind::Purchase);
    }

    if wallet.can_afford(&costs::ROAD) {
        for edge in connected_road_sites(topology, board, player) {
            moves.push(MoveKind::Build(BuildTarget::Road(edge)));
        }
    }
    if wallet.can_afford(&costs::SETTLEMENT) {
        for vertex in connected_settlement_sites(topology, board, player) {
            moves.push(MoveKind::Build(BuildTarget::Settlement(vertex)));
        }
    }
    if wallet.can_afford(&costs::CITY) {
        for vertex in board.settlements_of(player) {
            moves.push(MoveKind::Build(BuildTarget::City(vertex)));
        }
    }

    let cards = &me.cards;
    if cards.holds(DevelopmentCard::Knight) {
        let robber = board.robber();
        for tile in topology.tile_ids().filter(|t| Some(*t) != robber) {
            moves.push(MoveKind::PlayKnight { tile, victim: None });
            for victim in board.players_adjacent_to(tile) {
                if victim != player {
                    moves.push(MoveKind::PlayKnight {
                        tile,
                        victim: Some(victim),
                    });
                }
            }
        }
    }
    if cards.holds(DevelopmentCard::RoadBuilding) {
        for (first, second) in road_building_options(topology, board, player) {
            moves.push(MoveKind::PlayRoadBuilding { first, second });
        }
    }
    if cards.holds(DevelopmentCard::YearOfPlenty) {
        for (i, first) in Resource::ALL.into_iter().enumerate() {
            for second in Resource::ALL.into_iter().skip(i) {
                moves.push(MoveKind::PlayYearOfPlenty { first, second });
            }
        }
    }
    if cards.holds(DevelopmentCard::Monopoly) {
        for resource in Resource::ALL {
            moves.push(MoveKind::PlayMonopoly { resource });
        }
    }
    if cards.holds(DevelopmentCard::VictoryPoint) {
        moves.push(MoveKind::PlayVictoryPoint);
    }

    moves
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::context::Context;
    use crate::economy::Wallet;
    use crate::game::{create_game, join_game, GameId};
    use crate::player::Player;
    use pretty_assertions::assert_eq;

    fn started_game(ctx: &mut Context) -> Game {
        let game = create_game(ctx, GameId(1), GameConfig::for_players(2)).unwrap();
        let game = join_game(ctx, &game, Player::new(PlayerId(1), "a")).unwrap();
        join_game(ctx, &game, Player::new(PlayerId(2), "b")).unwrap()
    }

    #[test]
    fn test_lobby_has_no_moves() {
        let mut ctx = Context::seeded(1);
        let game = create_game(&mut ctx, GameId(1), GameConfig::default()).unwrap();
        assert!(game.legal_moves.is_empty());
    }

    #[test]
    fn test_setup_offers_every_vertex() {
        let mut ctx = Context::seeded(2);
        let game = started_game(&mut ctx);
        let actor = game.current_player().unwrap().id;
        let moves = legal_moves(&game, actor);
        assert_eq!(moves.len(), 54);
        assert!(moves
            .iter()
            .all(|m| matches!(m.kind, MoveKind::FirstSettlement { .. })));

        let other = game.players.iter().find(|p| p.id != actor).unwrap().id;
        assert!(legal_moves(&game, other).is_empty());
    }

    #[test]
    fn test_year_of_plenty_combinations() {
        let mut ctx = Context::seeded(3);
        let mut game = started_game(&mut ctx);
        game.phase = Phase::Main;
        let actor = game.current;
        game.players[actor].cards.add(DevelopmentCard::YearOfPlenty);
        let moves = generate(&ctx.topology, &game);
        let plenty = moves
            .iter()
            .filter(|m| matches!(m.kind, MoveKind::PlayYearOfPlenty { .. }))
            .count();
        // 5 doubles plus 10 unordered pairs
        assert_eq!(plenty, 15);
    }

    #[test]
    fn test_trade_needs_full_ratio() {
        let mut ctx = Context::seeded(4);
        let mut game = started_game(&mut ctx);
        game.phase = Phase::Main;
        let actor = game.current;
        game.players[actor].wallet = Wallet::single(Resource::Wool, 3);
        let has_trade = |g: &Game| {
            generate(&ctx.topology, g)
                .iter()
                .any(|m| matches!(m.kind, MoveKind::Trade { .. }))
        };
        assert!(!has_trade(&game));
        game.players[actor].wallet.credit(Resource::Wool, 1);
        assert!(has_trade(&game));
    }

    #[test]
    fn test_road_building_pairs_are_deduplicated() {
        let ctx = Context::seeded(5);
        let topology = &ctx.topology;
        let mut board = crate::board::Board::generate(topology, &mut Context::seeded(5).rng);
        let me = PlayerId(1);
        board.place_settlement(topology, me, VertexId(20)).unwrap();

        let options = road_building_options(topology, &board, me);
        assert!(!options.is_empty());
        let unique: BTreeSet<_> = options.iter().collect();
        assert_eq!(unique.len(), options.len());
        for (first, second) in &options {
            if let Some(second) = second {
                assert!(first < second);
            }
        }
    }
}
