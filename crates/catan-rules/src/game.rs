//! Core game state machine.
//!
//! This module contains the [`Game`] record and the pure engine entry points:
//! [`create_game`], [`join_game`] and [`apply_move`]. Each returns a new
//! `Game` and leaves its input untouched, so a rejected move can never leave
//! a half-applied state behind.

use crate::board::Board;
use crate::config::GameConfig;
use crate::context::{roll_dice, Context};
use crate::deck::DevelopmentCard;
use crate::economy::{self, costs, Wallet};
use crate::error::{IllegalReason, NotFound, Result};
use crate::legal;
use crate::moves::{BuildTarget, Move, MoveKind};
use crate::player::{Player, PlayerId};
use crate::topology::{EdgeId, TileId, Topology, VertexId};
use crate::validate::{road_building_order, validate};
use crate::victory;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info};

/// Game identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct GameId(pub u64);

impl fmt::Display for GameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "game-{}", self.0)
    }
}

/// What we're placing during setup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SetupStep {
    Settlement,
    Road,
}

/// Game phase
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    /// Waiting for enough players to join
    Lobby,

    /// Snake-order initial placement
    Setup {
        /// Which round of setup (1 or 2)
        round: u8,
        /// What we're currently placing
        step: SetupStep,
        /// Settlement placed just before the road step
        last_settlement: Option<VertexId>,
    },

    /// Current player must roll
    Roll,

    /// Build, trade, buy, play cards or pass
    Main,

    /// Terminal
    GameOver { winner: PlayerId },
}

/// The complete game state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Game {
    pub id: GameId,
    pub config: GameConfig,
    /// Players in seat order
    pub players: Vec<Player>,
    /// Seat index of the player to act
    pub current: usize,
    pub board: Board,
    pub phase: Phase,
    /// Legal moves of the player to act, recomputed after every change
    pub legal_moves: Vec<Move>,
    /// Turn number (0 during setup)
    pub turn: u32,
    /// Last dice roll
    pub last_roll: Option<(u8, u8)>,
}

impl Game {
    pub fn player_index(&self, id: PlayerId) -> Option<usize> {
        self.players.iter().position(|p| p.id == id)
    }

    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    /// The player to act, if anyone has joined
    pub fn current_player(&self) -> Option<&Player> {
        self.players.get(self.current)
    }

    pub fn is_over(&self) -> bool {
        matches!(self.phase, Phase::GameOver { .. })
    }

    pub fn winner(&self) -> Option<PlayerId> {
        match self.phase {
            Phase::GameOver { winner } => Some(winner),
            _ => None,
        }
    }

    fn player_mut(&mut self, id: PlayerId) -> Result<&mut Player> {
        self.players
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| NotFound::Player(id).into())
    }
}

/// Generate a randomized standard board
pub fn create_board<R: Rng>(ctx: &mut Context<R>) -> Board {
    Board::generate(&ctx.topology, &mut ctx.rng)
}

/// Create an empty game in the lobby; its board is generated now.
pub fn create_game<R: Rng>(ctx: &mut Context<R>, id: GameId, config: GameConfig) -> Result<Game> {
    config.validate()?;
    let board = create_board(ctx);
    debug!(game = %id, ?config, "game created");
    Ok(Game {
        id,
        config,
        players: Vec::new(),
        current: 0,
        board,
        phase: Phase::Lobby,
        legal_moves: Vec::new(),
        turn: 0,
        last_roll: None,
    })
}

/// Seat a player. The join that reaches the minimum starts setup, with
/// the seat order rotated so a random player places first.
pub fn join_game<R: Rng>(ctx: &mut Context<R>, game: &Game, player: Player) -> Result<Game> {
    match game.phase {
        Phase::Lobby => {}
        Phase::GameOver { .. } => return Err(IllegalReason::GameOver.into()),
        _ => return Err(IllegalReason::GameFull.into()),
    }
    if game.players.len() >= game.config.max_players {
        return Err(IllegalReason::GameFull.into());
    }
    if game.player_index(player.id).is_some() {
        return Err(IllegalReason::InvalidTarget.into());
    }

    let mut next = game.clone();
    debug!(game = %next.id, player = %player.id, name = %player.name, "player joined");
    next.players.push(player);

    if next.players.len() >= next.config.min_players {
        let offset = ctx.rng.gen_range(0..next.players.len());
        next.players.rotate_left(offset);
        next.current = 0;
        next.phase = Phase::Setup {
            round: 1,
            step: SetupStep::Settlement,
            last_settlement: None,
        };
        info!(
            game = %next.id,
            players = next.players.len(),
            first = %next.players[0].id,
            "game started"
        );
    }
    legal::refresh(&ctx.topology, &mut next);
    Ok(next)
}

/// Validate and apply a move, returning the resulting game.
///
/// On error the input game is untouched and the caller's legal-move set
/// still holds.
pub fn apply_move<R: Rng>(ctx: &mut Context<R>, game: &Game, mv: &Move) -> Result<Game> {
    validate(&ctx.topology, game, mv)?;

    let mut next = game.clone();
    let topology = ctx.topology.clone();
    apply_effects(&topology, &mut ctx.rng, &mut next, mv)?;
    debug!(game = %next.id, player = %mv.player, action = mv.kind.name(), "move applied");

    victory::recompute(&mut next);
    let actor = next.player_index(mv.player).unwrap_or(next.current);
    if let Some(winner) = victory::check_winner(&next, actor) {
        next.phase = Phase::GameOver { winner };
        info!(
            game = %next.id,
            winner = %winner,
            points = next.player(winner).map(|p| p.victory_points).unwrap_or(0),
            "game over"
        );
    }

    if next.phase != game.phase {
        debug!(game = %next.id, from = ?game.phase, to = ?next.phase, "phase changed");
    }
    legal::refresh(&topology, &mut next);
    Ok(next)
}

fn apply_effects<R: Rng>(
    topology: &Topology,
    rng: &mut R,
    game: &mut Game,
    mv: &Move,
) -> Result<()> {
    let actor = mv.player;
    match &mv.kind {
        MoveKind::FirstSettlement { vertex } => {
            game.board.place_settlement(topology, actor, *vertex)?;
            let Phase::Setup { round, .. } = game.phase else {
                return Err(IllegalReason::WrongPhase.into());
            };
            if round == 2 {
                let hand = starting_hand(topology, &game.board, *vertex);
                game.player_mut(actor)?.wallet.add_wallet(&hand);
            }
            game.phase = Phase::Setup {
                round,
                step: SetupStep::Road,
                last_settlement: Some(*vertex),
            };
        }
        MoveKind::FirstRoad { edge } => {
            game.board.place_road(actor, *edge)?;
            advance_setup(game);
        }
        MoveKind::FirstPass => advance_setup(game),
        MoveKind::Dice => {
            let (a, b) = roll_dice(rng);
            game.last_roll = Some((a, b));
            let roll = a + b;
            let payouts = economy::production(&game.board, roll);
            debug!(game = %game.id, roll, payouts = payouts.len(), "dice rolled");
            for (owner, wallet) in payouts {
                game.player_mut(owner)?.wallet.add_wallet(&wallet);
            }
            game.phase = Phase::Main;
        }
        MoveKind::Pass => {
            game.current = (game.current + 1) % game.players.len();
            game.turn += 1;
            game.phase = Phase::Roll;
        }
        MoveKind::Trade { offered, needed } => {
            let ratio = game.config.bank_trade_ratio;
            game.player_mut(actor)?
                .wallet
                .bank_trade(*offered, *needed, ratio)?;
        }
        MoveKind::Purchase => {
            let player = game.player_mut(actor)?;
            player.wallet.pay(&costs::DEVELOPMENT_CARD)?;
            let card = DevelopmentCard::draw(rng);
            player.cards.add(card);
        }
        MoveKind::Build(target) => build(topology, game, actor, *target)?,
        MoveKind::PlayKnight { tile, victim } => {
            game.player_mut(actor)?.cards.play(DevelopmentCard::Knight)?;
            play_knight(rng, game, actor, *tile, *victim)?;
        }
        MoveKind::PlayRoadBuilding { first, second } => {
            let (first, second) = road_building_order(topology, &game.board, actor, *first, *second)?;
            game.player_mut(actor)?
                .cards
                .play(DevelopmentCard::RoadBuilding)?;
            place_free_roads(game, actor, first, second)?;
        }
        MoveKind::PlayYearOfPlenty { first, second } => {
            let player = game.player_mut(actor)?;
            player.cards.play(DevelopmentCard::YearOfPlenty)?;
            player.wallet.credit(*first, 1);
            player.wallet.credit(*second, 1);
        }
        MoveKind::PlayMonopoly { resource } => {
            game.player_mut(actor)?.cards.play(DevelopmentCard::Monopoly)?;
            let mut taken = 0;
            for player in game.players.iter_mut().filter(|p| p.id != actor) {
                taken += player.wallet.drain(*resource);
            }
            game.player_mut(actor)?.wallet.credit(*resource, taken);
        }
        MoveKind::PlayVictoryPoint => {
            game.player_mut(actor)?
                .cards
                .play(DevelopmentCard::VictoryPoint)?;
        }
    }
    Ok(())
}

fn build(topology: &Topology, game: &mut Game, actor: PlayerId, target: BuildTarget) -> Result<()> {
    let price = match target {
        BuildTarget::Road(_) => costs::ROAD,
        BuildTarget::Settlement(_) => costs::SETTLEMENT,
        BuildTarget::City(_) => costs::CITY,
    };
    game.player_mut(actor)?.wallet.pay(&price)?;
    match target {
        BuildTarget::Road(edge) => game.board.place_road(actor, edge)?,
        BuildTarget::Settlement(vertex) => game.board.place_settlement(topology, actor, vertex)?,
        BuildTarget::City(vertex) => game.board.upgrade_to_city(actor, vertex)?,
    }
    Ok(())
}

fn play_knight<R: Rng>(
    rng: &mut R,
    game: &mut Game,
    actor: PlayerId,
    tile: TileId,
    victim: Option<PlayerId>,
) -> Result<()> {
    game.board.move_robber(tile)?;
    let Some(victim) = victim else {
        return Ok(());
    };
    let stolen = game.player_mut(victim)?.wallet.take_random(rng);
    if let Some(resource) = stolen {
        game.player_mut(actor)?.wallet.credit(resource, 1);
    }
    debug!(game = %game.id, thief = %actor, victim = %victim, ?stolen, "robber stole");
    Ok(())
}

fn place_free_roads(
    game: &mut Game,
    actor: PlayerId,
    first: EdgeId,
    second: Option<EdgeId>,
) -> Result<()> {
    game.board.place_road(actor, first)?;
    if let Some(second) = second {
        game.board.place_road(actor, second)?;
    }
    Ok(())
}

/// One unit from each producing tile around a second-round settlement
fn starting_hand(topology: &Topology, board: &Board, vertex: VertexId) -> Wallet {
    let mut hand = Wallet::new();
    for tile in topology.tiles_of(vertex) {
        if let Some(resource) = board.tile(*tile).resource() {
            hand.credit(resource, 1);
        }
    }
    hand
}

/// Move to the next seat in snake order, or on to the first roll.
fn advance_setup(game: &mut Game) {
    let Phase::Setup { round, .. } = game.phase else {
        return;
    };
    let last = game.players.len() - 1;
    let (round, current) = match (round, game.current) {
        (1, seat) if seat < last => (1, seat + 1),
        (1, _) => (2, last),
        (_, 0) => {
            game.current = 0;
            game.turn = 1;
            game.phase = Phase::Roll;
            return;
        }
        (_, seat) => (2, seat - 1),
    };
    game.current = current;
    game.phase = Phase::Setup {
        round,
        step: SetupStep::Settlement,
        last_settlement: None,
    };
}
