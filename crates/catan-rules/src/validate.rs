//! Move validation.
//!
//! [`validate`] checks a move against the game without changing anything.
//! Placement checks run before cost checks, and every check a move needs
//! runs before any part of it is applied.

use crate::board::Board;
use crate::economy::costs;
use crate::error::{GameError, IllegalReason, NotFound, Result};
use crate::game::{Game, Phase, SetupStep};
use crate::legal;
use crate::moves::{BuildTarget, Move, MoveKind};
use crate::player::PlayerId;
use crate::topology::{EdgeId, TileId, Topology, VertexId};

/// Check that `mv` may be applied to `game` right now.
pub fn validate(topology: &Topology, game: &Game, mv: &Move) -> Result<()> {
    if mv.game_id != game.id {
        return Err(NotFound::Game(mv.game_id).into());
    }
    if game.is_over() {
        return Err(IllegalReason::GameOver.into());
    }
    let actor = game
        .player_index(mv.player)
        .ok_or(NotFound::Player(mv.player))?;
    if game.phase == Phase::Lobby {
        return Err(IllegalReason::WrongPhase.into());
    }
    if actor != game.current {
        return Err(IllegalReason::NotYourTurn.into());
    }

    match &game.phase {
        Phase::Setup {
            step,
            last_settlement,
            ..
        } => validate_setup(topology, &game.board, *step, *last_settlement, &mv.kind),
        Phase::Roll => match mv.kind {
            MoveKind::Dice => Ok(()),
            _ => Err(IllegalReason::WrongPhase.into()),
        },
        Phase::Main => validate_main(topology, game, mv.player, &mv.kind),
        Phase::Lobby | Phase::GameOver { .. } => Err(IllegalReason::WrongPhase.into()),
    }
}

fn validate_setup(
    topology: &Topology,
    board: &Board,
    step: SetupStep,
    last_settlement: Option<VertexId>,
    kind: &MoveKind,
) -> Result<()> {
    match (step, kind) {
        (SetupStep::Settlement, MoveKind::FirstSettlement { vertex }) => {
            vertex_in_range(topology, *vertex)?;
            board.check_settlement_site(topology, *vertex)?;
            Ok(())
        }
        (SetupStep::Road, MoveKind::FirstRoad { edge }) => {
            edge_in_range(topology, *edge)?;
            let touches = last_settlement
                .is_some_and(|v| topology.endpoints(*edge).contains(&v));
            if !touches {
                return Err(IllegalReason::NotConnected.into());
            }
            board.check_road_site(*edge)?;
            Ok(())
        }
        (SetupStep::Settlement, MoveKind::FirstPass) => {
            if legal::setup_settlement_sites(topology, board).is_empty() {
                Ok(())
            } else {
                Err(IllegalReason::WrongPhase.into())
            }
        }
        (SetupStep::Road, MoveKind::FirstPass) => {
            let sites = last_settlement
                .map(|v| legal::setup_road_sites(topology, board, v))
                .unwrap_or_default();
            if sites.is_empty() {
                Ok(())
            } else {
                Err(IllegalReason::WrongPhase.into())
            }
        }
        _ => Err(IllegalReason::WrongPhase.into()),
    }
}

fn validate_main(topology: &Topology, game: &Game, player: PlayerId, kind: &MoveKind) -> Result<()> {
    let me = game.player(player).ok_or(NotFound::Player(player))?;
    let board = &game.board;

    if let Some(card) = kind.card() {
        me.cards.check_held(card)?;
    }

    match kind {
        MoveKind::FirstSettlement { .. }
        | MoveKind::FirstRoad { .. }
        | MoveKind::FirstPass
        | MoveKind::Dice => Err(IllegalReason::WrongPhase.into()),
        MoveKind::Pass => Ok(()),
        MoveKind::Trade { offered, needed } => {
            if offered == needed {
                return Err(IllegalReason::InvalidTarget.into());
            }
            if me.wallet.get(*offered) < game.config.bank_trade_ratio {
                return Err(IllegalReason::InsufficientFunds.into());
            }
            Ok(())
        }
        MoveKind::Purchase => {
            me.wallet.check_afford(&costs::DEVELOPMENT_CARD)?;
            Ok(())
        }
        MoveKind::Build(target) => {
            let price = match *target {
                BuildTarget::Road(edge) => {
                    edge_in_range(topology, edge)?;
                    board.check_connected_road(topology, player, edge)?;
                    costs::ROAD
                }
                BuildTarget::Settlement(vertex) => {
                    vertex_in_range(topology, vertex)?;
                    board.check_connected_settlement(topology, player, vertex)?;
                    costs::SETTLEMENT
                }
                BuildTarget::City(vertex) => {
                    vertex_in_range(topology, vertex)?;
                    board.check_city_site(player, vertex)?;
                    costs::CITY
                }
            };
            me.wallet.check_afford(&price)?;
            Ok(())
        }
        MoveKind::PlayKnight { tile, victim } => {
            tile_in_range(topology, *tile)?;
            if board.robber() == Some(*tile) {
                return Err(IllegalReason::InvalidTarget.into());
            }
            if let Some(victim) = victim {
                if game.player_index(*victim).is_none() {
                    return Err(NotFound::Player(*victim).into());
                }
                if *victim == player || !board.players_adjacent_to(*tile).contains(victim) {
                    return Err(IllegalReason::InvalidTarget.into());
                }
            }
            Ok(())
        }
        MoveKind::PlayRoadBuilding { first, second } => {
            road_building_order(topology, board, player, *first, *second)?;
            Ok(())
        }
        MoveKind::PlayYearOfPlenty { .. }
        | MoveKind::PlayMonopoly { .. }
        | MoveKind::PlayVictoryPoint => Ok(()),
    }
}

/// The order in which a RoadBuilding pair can be placed.
///
/// The roads may be named in either order; the returned pair starts with the
/// road that connects on its own. A lone road is accepted only when no second
/// road could follow it.
pub fn road_building_order(
    topology: &Topology,
    board: &Board,
    player: PlayerId,
    first: EdgeId,
    second: Option<EdgeId>,
) -> Result<(EdgeId, Option<EdgeId>)> {
    edge_in_range(topology, first)?;
    let Some(second) = second else {
        board.check_connected_road(topology, player, first)?;
        let mut after = board.clone();
        after.place_road(player, first)?;
        if !legal::connected_road_sites(topology, &after, player).is_empty() {
            return Err(IllegalReason::InvalidTarget.into());
        }
        return Ok((first, None));
    };
    edge_in_range(topology, second)?;
    if first == second {
        return Err(IllegalReason::Occupied.into());
    }

    let attempt = |a: EdgeId, b: EdgeId| -> Result<()> {
        board.check_connected_road(topology, player, a)?;
        let mut after = board.clone();
        after.place_road(player, a)?;
        after.check_connected_road(topology, player, b)?;
        Ok(())
    };
    match attempt(first, second) {
        Ok(()) => Ok((first, Some(second))),
        Err(err) => match attempt(second, first) {
            Ok(()) => Ok((second, Some(first))),
            Err(_) => Err(err),
        },
    }
}

fn tile_in_range(topology: &Topology, tile: TileId) -> Result<()> {
    if topology.contains_tile(tile) {
        Ok(())
    } else {
        Err(GameError::from(NotFound::Coordinate(tile.to_string())))
    }
}

fn vertex_in_range(topology: &Topology, vertex: VertexId) -> Result<()> {
    if topology.contains_vertex(vertex) {
        Ok(())
    } else {
        Err(GameError::from(NotFound::Coordinate(vertex.to_string())))
    }
}

fn edge_in_range(topology: &Topology, edge: EdgeId) -> Result<()> {
    if topology.contains_edge(edge) {
        Ok(())
    } else {
        Err(GameError::from(NotFound::Coordinate(edge.to_string())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::context::Context;
    use crate::deck::DevelopmentCard;
    use crate::economy::{Resource, Wallet};
    use crate::game::{create_game, join_game, GameId};
    use crate::player::Player;
    use pretty_assertions::assert_eq;

    fn main_phase_game(ctx: &mut Context) -> Game {
        let game = create_game(ctx, GameId(9), GameConfig::for_players(2)).unwrap();
        let game = join_game(ctx, &game, Player::new(PlayerId(1), "a")).unwrap();
        let mut game = join_game(ctx, &game, Player::new(PlayerId(2), "b")).unwrap();
        game.phase = Phase::Main;
        game
    }

    fn reason(result: Result<()>) -> Option<IllegalReason> {
        result.err().and_then(|e| e.reason())
    }

    #[test]
    fn test_wrong_game_and_unknown_player() {
        let mut ctx = Context::seeded(1);
        let game = main_phase_game(&mut ctx);
        let actor = game.current_player().unwrap().id;

        let mv = Move::new(GameId(99), actor, MoveKind::Pass);
        assert_eq!(
            validate(&ctx.topology, &game, &mv),
            Err(GameError::NotFound(NotFound::Game(GameId(99))))
        );
        let mv = Move::new(game.id, PlayerId(77), MoveKind::Pass);
        assert_eq!(
            validate(&ctx.topology, &game, &mv),
            Err(GameError::NotFound(NotFound::Player(PlayerId(77))))
        );
    }

    #[test]
    fn test_not_your_turn() {
        let mut ctx = Context::seeded(2);
        let game = main_phase_game(&mut ctx);
        let other = game.players[1 - game.current].id;
        let mv = Move::new(game.id, other, MoveKind::Pass);
        assert_eq!(
            reason(validate(&ctx.topology, &game, &mv)),
            Some(IllegalReason::NotYourTurn)
        );
    }

    #[test]
    fn test_dice_only_in_roll_phase() {
        let mut ctx = Context::seeded(3);
        let mut game = main_phase_game(&mut ctx);
        let actor = game.current_player().unwrap().id;
        let dice = Move::new(game.id, actor, MoveKind::Dice);
        assert_eq!(
            reason(validate(&ctx.topology, &game, &dice)),
            Some(IllegalReason::WrongPhase)
        );
        game.phase = Phase::Roll;
        assert_eq!(validate(&ctx.topology, &game, &dice), Ok(()));
        let pass = Move::new(game.id, actor, MoveKind::Pass);
        assert_eq!(
            reason(validate(&ctx.topology, &game, &pass)),
            Some(IllegalReason::WrongPhase)
        );
    }

    #[test]
    fn test_trade_checks() {
        let mut ctx = Context::seeded(4);
        let mut game = main_phase_game(&mut ctx);
        let actor = game.current;
        let id = game.players[actor].id;
        game.players[actor].wallet = Wallet::single(Resource::Brick, 4);

        let same = Move::new(
            game.id,
            id,
            MoveKind::Trade {
                offered: Resource::Brick,
                needed: Resource::Brick,
            },
        );
        assert_eq!(
            reason(validate(&ctx.topology, &game, &same)),
            Some(IllegalReason::InvalidTarget)
        );
        let short = Move::new(
            game.id,
            id,
            MoveKind::Trade {
                offered: Resource::Ore,
                needed: Resource::Brick,
            },
        );
        assert_eq!(
            reason(validate(&ctx.topology, &game, &short)),
            Some(IllegalReason::InsufficientFunds)
        );
    }

    #[test]
    fn test_card_must_be_held() {
        let mut ctx = Context::seeded(5);
        let game = main_phase_game(&mut ctx);
        let actor = game.current_player().unwrap().id;
        let mv = Move::new(
            game.id,
            actor,
            MoveKind::PlayMonopoly {
                resource: Resource::Ore,
            },
        );
        assert_eq!(
            reason(validate(&ctx.topology, &game, &mv)),
            Some(IllegalReason::CardNotHeld)
        );
    }

    #[test]
    fn test_knight_cannot_stay_on_robber_tile() {
        let mut ctx = Context::seeded(6);
        let mut game = main_phase_game(&mut ctx);
        let actor = game.current;
        game.players[actor].cards.add(DevelopmentCard::Knight);
        let id = game.players[actor].id;

        let stay = Move::new(
            game.id,
            id,
            MoveKind::PlayKnight {
                tile: game.board.robber().unwrap(),
                victim: None,
            },
        );
        assert_eq!(
            reason(validate(&ctx.topology, &game, &stay)),
            Some(IllegalReason::InvalidTarget)
        );

        let off_board = Move::new(
            game.id,
            id,
            MoveKind::PlayKnight {
                tile: TileId(200),
                victim: None,
            },
        );
        assert!(matches!(
            validate(&ctx.topology, &game, &off_board),
            Err(GameError::NotFound(NotFound::Coordinate(_)))
        ));
    }

    #[test]
    fn test_knight_victim_must_touch_tile() {
        let mut ctx = Context::seeded(7);
        let mut game = main_phase_game(&mut ctx);
        let actor = game.current;
        game.players[actor].cards.add(DevelopmentCard::Knight);
        let id = game.players[actor].id;
        let victim = game.players[1 - actor].id;

        let tile = ctx
            .topology
            .tile_ids()
            .find(|t| Some(*t) != game.board.robber())
            .unwrap();
        let mv = Move::new(
            game.id,
            id,
            MoveKind::PlayKnight {
                tile,
                victim: Some(victim),
            },
        );
        assert_eq!(
            reason(validate(&ctx.topology, &game, &mv)),
            Some(IllegalReason::InvalidTarget)
        );

        let corner = ctx.topology.vertices_of(tile)[0];
        game.board
            .place_settlement(&ctx.topology, victim, corner)
            .unwrap();
        assert_eq!(validate(&ctx.topology, &game, &mv), Ok(()));
    }

    #[test]
    fn test_road_building_either_order() {
        let mut ctx = Context::seeded(8);
        let mut game = main_phase_game(&mut ctx);
        let actor = game.current;
        let id = game.players[actor].id;
        let home = VertexId(20);
        game.board.place_settlement(&ctx.topology, id, home).unwrap();

        let first = ctx.topology.edges_of(home)[0];
        let [a, b] = ctx.topology.endpoints(first);
        let far = if a == home { b } else { a };
        let beyond = ctx
            .topology
            .edges_of(far)
            .iter()
            .copied()
            .find(|e| *e != first)
            .unwrap();

        assert_eq!(
            road_building_order(&ctx.topology, &game.board, id, first, Some(beyond)),
            Ok((first, Some(beyond)))
        );
        assert_eq!(
            road_building_order(&ctx.topology, &game.board, id, beyond, Some(first)),
            Ok((first, Some(beyond)))
        );
        assert_eq!(
            road_building_order(&ctx.topology, &game.board, id, first, None)
                .err()
                .and_then(|e| e.reason()),
            Some(IllegalReason::InvalidTarget)
        );
        assert_eq!(
            road_building_order(&ctx.topology, &game.board, id, first, Some(first))
                .err()
                .and_then(|e| e.reason()),
            Some(IllegalReason::Occupied)
        );
    }
}
