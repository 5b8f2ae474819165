//! Board state: tiles, the robber and everything players have built.
//!
//! This module contains:
//! - Tile types and randomized board generation
//! - Road, settlement and city maps keyed by topology ids
//! - Placement checks (occupancy, distance rule, network connectivity)
//! - Query methods used by production and the robber
//!
//! Every `place_*` mutator has a matching `check_*` that performs the same
//! validation without touching the board, so callers can validate a whole
//! move before committing any part of it.

use crate::economy::Resource;
use crate::error::GameError;
use crate::player::PlayerId;
use crate::topology::{EdgeId, TileId, Topology, VertexId};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;

/// Number tokens dealt over the non-desert tiles
pub const NUMBER_TOKENS: [u8; 18] = [2, 3, 3, 4, 4, 5, 5, 6, 6, 8, 8, 9, 9, 10, 10, 11, 11, 12];

/// Reshuffles allowed while keeping 6 and 8 tokens apart
const MAX_NUMBER_ATTEMPTS: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BoardError {
    #[error("{0} already has a road")]
    EdgeOccupied(EdgeId),

    #[error("{0} is already built on")]
    VertexOccupied(VertexId),

    #[error("{0} is next to another building")]
    DistanceRule(VertexId),

    #[error("no settlement at {0}")]
    NoSettlement(VertexId),

    #[error("settlement at {0} belongs to another player")]
    NotOwner(VertexId),

    #[error("{0} does not connect to the player's network")]
    RoadNotConnected(EdgeId),

    #[error("{0} does not touch any of the player's roads")]
    SettlementNotConnected(VertexId),

    #[error("robber is already on {0}")]
    RobberAlreadyThere(TileId),
}

/// What a tile produces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TileKind {
    /// Produces a resource when its number is rolled
    Resource(Resource),
    /// Produces nothing and starts with the robber
    Desert,
}

/// A single hex tile on the board
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    pub id: TileId,
    pub kind: TileKind,
    /// Dice number that triggers production (None for the desert)
    pub number: Option<u8>,
    /// Whether the robber is currently on this tile
    pub robber: bool,
    /// The six corners of this tile
    pub vertices: [VertexId; 6],
}

impl Tile {
    /// Get the resource this tile produces, if any
    pub fn resource(&self) -> Option<Resource> {
        match self.kind {
            TileKind::Resource(r) => Some(r),
            TileKind::Desert => None,
        }
    }
}

/// Building kinds that sit on a vertex
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum BuildingKind {
    Settlement,
    City,
}

impl BuildingKind {
    /// Victory points provided by this building
    pub fn victory_points(self) -> u32 {
        match self {
            BuildingKind::Settlement => 1,
            BuildingKind::City => 2,
        }
    }
}

/// The complete game board
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    /// Tiles indexed by `TileId`
    tiles: Vec<Tile>,
    roads: BTreeMap<EdgeId, PlayerId>,
    settlements: BTreeMap<VertexId, PlayerId>,
    cities: BTreeMap<VertexId, PlayerId>,
}

impl Board {
    /// Deal resources and number tokens over the topology's tiles.
    ///
    /// 4 lumber, 4 grain, 4 wool, 3 ore, 3 brick and 1 desert are shuffled;
    /// numbers are reshuffled until no two 6/8 tokens are adjacent (giving up
    /// after a fixed number of attempts). The robber starts on the desert.
    pub fn generate<R: Rng>(topology: &Topology, rng: &mut R) -> Self {
        let mut kinds: Vec<TileKind> = Vec::with_capacity(19);
        for (resource, count) in [
            (Resource::Lumber, 4),
            (Resource::Grain, 4),
            (Resource::Wool, 4),
            (Resource::Ore, 3),
            (Resource::Brick, 3),
        ] {
            kinds.extend(std::iter::repeat(TileKind::Resource(resource)).take(count));
        }
        kinds.push(TileKind::Desert);
        kinds.shuffle(rng);

        let numbers = assign_numbers(topology, &kinds, rng);

        let tiles = topology
            .tile_ids()
            .zip(kinds.into_iter().zip(numbers))
            .map(|(id, (kind, number))| Tile {
                id,
                kind,
                number,
                robber: kind == TileKind::Desert,
                vertices: *topology.vertices_of(id),
            })
            .collect();

        Self {
            tiles,
            roads: BTreeMap::new(),
            settlements: BTreeMap::new(),
            cities: BTreeMap::new(),
        }
    }

    /// Build a board from explicit tiles, e.g. a fixed layout.
    ///
    /// Exactly one tile must carry the robber.
    pub fn from_tiles(tiles: Vec<Tile>) -> Result<Self, GameError> {
        let robbers = tiles.iter().filter(|t| t.robber).count();
        if robbers != 1 {
            return Err(GameError::Configuration(format!(
                "board needs exactly one robber tile, found {robbers}"
            )));
        }
        Ok(Self {
            tiles,
            roads: BTreeMap::new(),
            settlements: BTreeMap::new(),
            cities: BTreeMap::new(),
        })
    }

    // ==================== Query Methods ====================

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    pub fn tile(&self, id: TileId) -> &Tile {
        &self.tiles[id.0 as usize]
    }

    /// The tile currently holding the robber, if any tile carries it
    pub fn robber(&self) -> Option<TileId> {
        self.tiles.iter().find(|t| t.robber).map(|t| t.id)
    }

    pub fn road_owner(&self, edge: EdgeId) -> Option<PlayerId> {
        self.roads.get(&edge).copied()
    }

    /// Owner and kind of the building at `vertex`
    pub fn building_at(&self, vertex: VertexId) -> Option<(PlayerId, BuildingKind)> {
        if let Some(owner) = self.settlements.get(&vertex) {
            return Some((*owner, BuildingKind::Settlement));
        }
        self.cities
            .get(&vertex)
            .map(|owner| (*owner, BuildingKind::City))
    }

    pub fn roads(&self) -> &BTreeMap<EdgeId, PlayerId> {
        &self.roads
    }

    pub fn settlements(&self) -> &BTreeMap<VertexId, PlayerId> {
        &self.settlements
    }

    pub fn cities(&self) -> &BTreeMap<VertexId, PlayerId> {
        &self.cities
    }

    pub fn road_count(&self, player: PlayerId) -> usize {
        self.roads.values().filter(|o| **o == player).count()
    }

    pub fn settlement_count(&self, player: PlayerId) -> usize {
        self.settlements.values().filter(|o| **o == player).count()
    }

    pub fn city_count(&self, player: PlayerId) -> usize {
        self.cities.values().filter(|o| **o == player).count()
    }

    /// Settlements the player could upgrade
    pub fn settlements_of(&self, player: PlayerId) -> impl Iterator<Item = VertexId> + '_ {
        self.settlements
            .iter()
            .filter(move |(_, owner)| **owner == player)
            .map(|(v, _)| *v)
    }

    /// Tiles whose number matches the roll, skipping the robbed tile.
    pub fn tiles_producing(&self, roll: u8) -> impl Iterator<Item = &Tile> + '_ {
        self.tiles
            .iter()
            .filter(move |t| t.number == Some(roll) && !t.robber)
    }

    /// Every building on the corners of `tile`
    pub fn buildings_adjacent_to(&self, tile: TileId) -> Vec<(PlayerId, BuildingKind)> {
        self.tile(tile)
            .vertices
            .iter()
            .filter_map(|v| self.building_at(*v))
            .collect()
    }

    /// Players with a building on the corners of `tile`
    pub fn players_adjacent_to(&self, tile: TileId) -> BTreeSet<PlayerId> {
        self.buildings_adjacent_to(tile)
            .into_iter()
            .map(|(owner, _)| owner)
            .collect()
    }

    // ==================== Validation Methods ====================

    pub fn check_road_site(&self, edge: EdgeId) -> Result<(), BoardError> {
        if self.roads.contains_key(&edge) {
            return Err(BoardError::EdgeOccupied(edge));
        }
        Ok(())
    }

    /// Vacant and at least two edges away from any other building
    pub fn check_settlement_site(
        &self,
        topology: &Topology,
        vertex: VertexId,
    ) -> Result<(), BoardError> {
        if self.building_at(vertex).is_some() {
            return Err(BoardError::VertexOccupied(vertex));
        }
        if topology
            .neighbors(vertex)
            .iter()
            .any(|n| self.building_at(*n).is_some())
        {
            return Err(BoardError::DistanceRule(vertex));
        }
        Ok(())
    }

    pub fn check_city_site(&self, player: PlayerId, vertex: VertexId) -> Result<(), BoardError> {
        match self.settlements.get(&vertex) {
            None => Err(BoardError::NoSettlement(vertex)),
            Some(owner) if *owner != player => Err(BoardError::NotOwner(vertex)),
            Some(_) => Ok(()),
        }
    }

    /// Whether `edge` extends the player's network.
    ///
    /// An edge connects if either endpoint holds one of the player's
    /// buildings, or touches another of the player's roads at a vertex that
    /// no opponent has built on.
    pub fn is_connected_to_network(
        &self,
        topology: &Topology,
        player: PlayerId,
        edge: EdgeId,
    ) -> bool {
        topology.endpoints(edge).into_iter().any(|endpoint| {
            match self.building_at(endpoint) {
                Some((owner, _)) if owner == player => return true,
                Some(_) => return false,
                None => {}
            }
            topology
                .edges_of(endpoint)
                .iter()
                .any(|e| *e != edge && self.road_owner(*e) == Some(player))
        })
    }

    /// Whether `vertex` touches one of the player's roads
    pub fn settlement_connected(
        &self,
        topology: &Topology,
        player: PlayerId,
        vertex: VertexId,
    ) -> bool {
        topology
            .edges_of(vertex)
            .iter()
            .any(|e| self.road_owner(*e) == Some(player))
    }

    /// Road placement check for the main phase (site plus connectivity)
    pub fn check_connected_road(
        &self,
        topology: &Topology,
        player: PlayerId,
        edge: EdgeId,
    ) -> Result<(), BoardError> {
        self.check_road_site(edge)?;
        if !self.is_connected_to_network(topology, player, edge) {
            return Err(BoardError::RoadNotConnected(edge));
        }
        Ok(())
    }

    /// Settlement placement check for the main phase (site plus road contact)
    pub fn check_connected_settlement(
        &self,
        topology: &Topology,
        player: PlayerId,
        vertex: VertexId,
    ) -> Result<(), BoardError> {
        self.check_settlement_site(topology, vertex)?;
        if !self.settlement_connected(topology, player, vertex) {
            return Err(BoardError::SettlementNotConnected(vertex));
        }
        Ok(())
    }

    // ==================== Mutation Methods ====================

    pub fn place_road(&mut self, player: PlayerId, edge: EdgeId) -> Result<(), BoardError> {
        self.check_road_site(edge)?;
        self.roads.insert(edge, player);
        Ok(())
    }

    pub fn place_settlement(
        &mut self,
        topology: &Topology,
        player: PlayerId,
        vertex: VertexId,
    ) -> Result<(), BoardError> {
        self.check_settlement_site(topology, vertex)?;
        self.settlements.insert(vertex, player);
        Ok(())
    }

    /// Replace the player's settlement with a city
    pub fn upgrade_to_city(&mut self, player: PlayerId, vertex: VertexId) -> Result<(), BoardError> {
        self.check_city_site(player, vertex)?;
        self.settlements.remove(&vertex);
        self.cities.insert(vertex, player);
        Ok(())
    }

    /// Move the robber; it must change tiles.
    pub fn move_robber(&mut self, target: TileId) -> Result<(), BoardError> {
        let current = self.robber();
        if current == Some(target) {
            return Err(BoardError::RobberAlreadyThere(target));
        }
        if let Some(current) = current {
            self.tiles[current.0 as usize].robber = false;
        }
        self.tiles[target.0 as usize].robber = true;
        Ok(())
    }
}

/// Deal number tokens over `kinds`, trying to keep 6 and 8 apart.
fn assign_numbers<R: Rng>(topology: &Topology, kinds: &[TileKind], rng: &mut R) -> Vec<Option<u8>> {
    let mut numbers = NUMBER_TOKENS.to_vec();
    let mut dealt = Vec::new();
    for _ in 0..MAX_NUMBER_ATTEMPTS {
        numbers.shuffle(rng);
        dealt = deal(kinds, &numbers);
        if is_valid_number_placement(topology, &dealt) {
            break;
        }
    }
    dealt
}

fn deal(kinds: &[TileKind], numbers: &[u8]) -> Vec<Option<u8>> {
    let mut tokens = numbers.iter().copied();
    kinds
        .iter()
        .map(|kind| match kind {
            TileKind::Desert => None,
            TileKind::Resource(_) => tokens.next(),
        })
        .collect()
}

/// No two adjacent tiles both carry a 6 or an 8
fn is_valid_number_placement(topology: &Topology, numbers: &[Option<u8>]) -> bool {
    let hot = |n: Option<u8>| matches!(n, Some(6) | Some(8));
    topology.tile_ids().all(|tile| {
        !hot(numbers[tile.0 as usize])
            || topology
                .adjacent_tiles(tile)
                .iter()
                .all(|n| !hot(numbers[n.0 as usize]))
    })
}
