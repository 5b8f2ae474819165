//! Fixed board graph: 19 tiles, 54 vertices, 72 edges.
//!
//! The topology is derived once from the hex geometry in [`crate::hex`] and
//! then only ever read. Everything else in the engine refers to board
//! positions through the small integer ids defined here.
//!
//! Indexing with an id that did not come from this topology is a programmer
//! error and panics. Ids arriving from outside (inside a [`Move`]) are checked
//! with [`Topology::contains_vertex`] and friends first.
//!
//! [`Move`]: crate::moves::Move

use crate::hex::{EdgeCoord, HexCoord, VertexCoord};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap, VecDeque};
use std::fmt;

/// Index of a land tile
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TileId(pub u8);

/// Index of a building site
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct VertexId(pub u8);

/// Index of a road site
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EdgeId(pub u8);

impl fmt::Display for TileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t{}", self.0)
    }
}

impl fmt::Display for VertexId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "e{}", self.0)
    }
}

/// Land hexes of the standard layout: center, ring 1, ring 2.
pub const STANDARD_LAYOUT: [HexCoord; 19] = [
    HexCoord::new(0, 0),
    HexCoord::new(1, 0),
    HexCoord::new(1, -1),
    HexCoord::new(0, -1),
    HexCoord::new(-1, 0),
    HexCoord::new(-1, 1),
    HexCoord::new(0, 1),
    HexCoord::new(2, 0),
    HexCoord::new(2, -1),
    HexCoord::new(2, -2),
    HexCoord::new(1, -2),
    HexCoord::new(0, -2),
    HexCoord::new(-1, -1),
    HexCoord::new(-2, 0),
    HexCoord::new(-2, 1),
    HexCoord::new(-2, 2),
    HexCoord::new(-1, 2),
    HexCoord::new(0, 2),
    HexCoord::new(1, 1),
];

/// The adjacency graph of the board.
#[derive(Debug, Clone)]
pub struct Topology {
    hexes: Vec<HexCoord>,
    vertices: Vec<VertexCoord>,
    edges: Vec<EdgeCoord>,
    tile_vertices: Vec<[VertexId; 6]>,
    vertex_tiles: Vec<Vec<TileId>>,
    vertex_neighbors: Vec<Vec<VertexId>>,
    vertex_edges: Vec<Vec<EdgeId>>,
    edge_endpoints: Vec<[VertexId; 2]>,
}

impl Topology {
    /// Build the standard 19-tile board graph.
    pub fn standard() -> Self {
        Self::from_hexes(&STANDARD_LAYOUT)
    }

    fn from_hexes(hexes: &[HexCoord]) -> Self {
        let vertex_set: BTreeSet<VertexCoord> =
            hexes.iter().flat_map(|h| h.vertices()).collect();
        let edge_set: BTreeSet<EdgeCoord> = hexes.iter().flat_map(|h| h.edges()).collect();

        let vertices: Vec<VertexCoord> = vertex_set.into_iter().collect();
        let edges: Vec<EdgeCoord> = edge_set.into_iter().collect();

        let vertex_index: HashMap<VertexCoord, VertexId> = vertices
            .iter()
            .enumerate()
            .map(|(i, v)| (*v, VertexId(i as u8)))
            .collect();
        let edge_index: HashMap<EdgeCoord, EdgeId> = edges
            .iter()
            .enumerate()
            .map(|(i, e)| (*e, EdgeId(i as u8)))
            .collect();

        let tile_vertices: Vec<[VertexId; 6]> = hexes
            .iter()
            .map(|h| h.vertices().map(|v| vertex_index[&v]))
            .collect();

        let mut vertex_tiles = vec![Vec::new(); vertices.len()];
        for (tile, corners) in tile_vertices.iter().enumerate() {
            for v in corners {
                vertex_tiles[v.0 as usize].push(TileId(tile as u8));
            }
        }

        let edge_endpoints: Vec<[VertexId; 2]> = edges
            .iter()
            .map(|e| e.endpoints().map(|v| vertex_index[&v]))
            .collect();

        let mut vertex_edges = vec![Vec::new(); vertices.len()];
        let mut vertex_neighbors = vec![Vec::new(); vertices.len()];
        for (i, [a, b]) in edge_endpoints.iter().enumerate() {
            vertex_edges[a.0 as usize].push(EdgeId(i as u8));
            vertex_edges[b.0 as usize].push(EdgeId(i as u8));
            vertex_neighbors[a.0 as usize].push(*b);
            vertex_neighbors[b.0 as usize].push(*a);
        }
        for list in &mut vertex_neighbors {
            list.sort();
        }

        Self {
            hexes: hexes.to_vec(),
            vertices,
            edges,
            tile_vertices,
            vertex_tiles,
            vertex_neighbors,
            vertex_edges,
            edge_endpoints,
        }
    }

    pub fn tile_count(&self) -> usize {
        self.hexes.len()
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn tile_ids(&self) -> impl Iterator<Item = TileId> {
        (0..self.hexes.len() as u8).map(TileId)
    }

    pub fn vertex_ids(&self) -> impl Iterator<Item = VertexId> {
        (0..self.vertices.len() as u8).map(VertexId)
    }

    pub fn edge_ids(&self) -> impl Iterator<Item = EdgeId> {
        (0..self.edges.len() as u8).map(EdgeId)
    }

    pub fn contains_tile(&self, tile: TileId) -> bool {
        (tile.0 as usize) < self.hexes.len()
    }

    pub fn contains_vertex(&self, vertex: VertexId) -> bool {
        (vertex.0 as usize) < self.vertices.len()
    }

    pub fn contains_edge(&self, edge: EdgeId) -> bool {
        (edge.0 as usize) < self.edges.len()
    }

    /// Vertices one edge away from `vertex` (2 on the coast, 3 inland)
    pub fn neighbors(&self, vertex: VertexId) -> &[VertexId] {
        &self.vertex_neighbors[vertex.0 as usize]
    }

    /// The edge joining two vertices, if they are adjacent
    pub fn edge_between(&self, a: VertexId, b: VertexId) -> Option<EdgeId> {
        self.vertex_edges[a.0 as usize]
            .iter()
            .copied()
            .find(|e| self.endpoints(*e).contains(&b))
    }

    /// The six corners of a tile
    pub fn vertices_of(&self, tile: TileId) -> &[VertexId; 6] {
        &self.tile_vertices[tile.0 as usize]
    }

    /// Edges touching a vertex
    pub fn edges_of(&self, vertex: VertexId) -> &[EdgeId] {
        &self.vertex_edges[vertex.0 as usize]
    }

    /// Tiles touching a vertex (1 to 3)
    pub fn tiles_of(&self, vertex: VertexId) -> &[TileId] {
        &self.vertex_tiles[vertex.0 as usize]
    }

    pub fn endpoints(&self, edge: EdgeId) -> [VertexId; 2] {
        self.edge_endpoints[edge.0 as usize]
    }

    /// Number of edges on the shortest path between two vertices.
    pub fn distance(&self, from: VertexId, to: VertexId) -> u32 {
        let mut seen = vec![false; self.vertices.len()];
        let mut queue = VecDeque::from([(from, 0)]);
        seen[from.0 as usize] = true;
        while let Some((vertex, steps)) = queue.pop_front() {
            if vertex == to {
                return steps;
            }
            for next in self.neighbors(vertex) {
                if !seen[next.0 as usize] {
                    seen[next.0 as usize] = true;
                    queue.push_back((*next, steps + 1));
                }
            }
        }
        // The standard board is connected.
        u32::MAX
    }

    /// Tiles sharing a side with `tile`
    pub fn adjacent_tiles(&self, tile: TileId) -> Vec<TileId> {
        self.hexes[tile.0 as usize]
            .neighbors()
            .iter()
            .filter_map(|h| self.hexes.iter().position(|x| x == h))
            .map(|i| TileId(i as u8))
            .collect()
    }
}

impl Default for Topology {
    fn default() -> Self {
        Self::standard()
    }
}
