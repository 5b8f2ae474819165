//! Catan rules engine
//!
//! This crate holds the rules of a hex-board resource trading game:
//! - Fixed 19-tile board graph with tiles, vertices and edges
//! - Resource wallets, build costs and bank trades
//! - Development card deck and holdings
//! - Move validation, legal move generation and state transitions
//! - Victory point accounting and end-of-game summaries
//!
//! # Architecture
//!
//! Engine operations are pure: they take a [`Game`] by reference and return a
//! new one, so a rejected move never leaves a half-applied state behind. The
//! board graph and the random number generator travel in a [`Context`].
//! Storage and identity live behind the traits in [`service`].
//!
//! # Modules
//!
//! - [`hex`]: Axial coordinates for tiles, vertices and edges
//! - [`topology`]: Integer ids and adjacency for the standard board
//! - [`board`]: Tiles, placed pieces and the robber
//! - [`economy`]: Resources, wallets, costs and production
//! - [`deck`]: Development cards
//! - [`game`]: Game state machine
//! - [`legal`]: Legal move enumeration
//! - [`validate`]: Move validation
//! - [`victory`]: Scoring and game summaries
//! - [`service`]: Persistence-backed orchestration

pub mod board;
pub mod config;
pub mod context;
pub mod deck;
pub mod economy;
pub mod error;
pub mod game;
pub mod hex;
pub mod legal;
pub mod moves;
pub mod player;
pub mod service;
pub mod topology;
pub mod validate;
pub mod victory;

// Re-export commonly used types
pub use board::{Board, BuildingKind, Tile, TileKind};
pub use config::GameConfig;
pub use context::Context;
pub use deck::{CardHoldings, DevelopmentCard};
pub use economy::{Resource, Wallet};
pub use error::{GameError, IllegalReason, NotFound};
pub use game::{apply_move, create_board, create_game, join_game, Game, GameId, Phase, SetupStep};
pub use legal::legal_moves;
pub use moves::{BuildTarget, Move, MoveKind};
pub use player::{Player, PlayerId};
pub use service::{GameRepository, GameService, IdentityProvider};
pub use topology::{EdgeId, TileId, Topology, VertexId};
pub use victory::{game_summary, GameSummary};
