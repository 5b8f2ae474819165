//! Axial hex geometry the [`topology`](crate::topology) is built from.
//!
//! Hexes are pointy-top. A corner is named by the hex whose top or bottom
//! point it is, which makes `(hex, Pole)` unique without any rewriting. A
//! side is shared by two hexes, so [`EdgeCoord::new`] keeps whichever name
//! has the smaller hex.

use serde::{Deserialize, Serialize};

/// Top or bottom point of a pointy-top hex
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Pole {
    North,
    South,
}

/// One of the six sides of a hex, also the step to the hex across it
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Side {
    NorthEast,
    East,
    SouthEast,
    SouthWest,
    West,
    NorthWest,
}

impl Side {
    /// Clockwise from NorthEast
    pub const ALL: [Side; 6] = [
        Side::NorthEast,
        Side::East,
        Side::SouthEast,
        Side::SouthWest,
        Side::West,
        Side::NorthWest,
    ];

    /// The same side seen from the hex across it
    pub fn flipped(self) -> Self {
        match self {
            Side::NorthEast => Side::SouthWest,
            Side::East => Side::West,
            Side::SouthEast => Side::NorthWest,
            Side::SouthWest => Side::NorthEast,
            Side::West => Side::East,
            Side::NorthWest => Side::SouthEast,
        }
    }

    fn step(self) -> (i32, i32) {
        match self {
            Side::NorthEast => (1, -1),
            Side::East => (1, 0),
            Side::SouthEast => (0, 1),
            Side::SouthWest => (-1, 1),
            Side::West => (-1, 0),
            Side::NorthWest => (0, -1),
        }
    }
}

/// A hex in axial `(q, r)` form; `q` grows east, `r` south-east.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct HexCoord {
    pub q: i32,
    pub r: i32,
}

impl HexCoord {
    pub const fn new(q: i32, r: i32) -> Self {
        Self { q, r }
    }

    pub fn across(&self, side: Side) -> HexCoord {
        let (dq, dr) = side.step();
        HexCoord::new(self.q + dq, self.r + dr)
    }

    /// The hexes across each side, in [`Side::ALL`] order
    pub fn neighbors(&self) -> [HexCoord; 6] {
        Side::ALL.map(|side| self.across(side))
    }

    /// Corners clockwise from the top; four of them are poles of neighbors.
    pub fn vertices(&self) -> [VertexCoord; 6] {
        [
            VertexCoord::new(*self, Pole::North),
            VertexCoord::new(self.across(Side::NorthEast), Pole::South),
            VertexCoord::new(self.across(Side::SouthEast), Pole::North),
            VertexCoord::new(*self, Pole::South),
            VertexCoord::new(self.across(Side::SouthWest), Pole::North),
            VertexCoord::new(self.across(Side::NorthWest), Pole::South),
        ]
    }

    pub fn edges(&self) -> [EdgeCoord; 6] {
        Side::ALL.map(|side| EdgeCoord::new(*self, side))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct VertexCoord {
    pub hex: HexCoord,
    pub pole: Pole,
}

impl VertexCoord {
    pub const fn new(hex: HexCoord, pole: Pole) -> Self {
        Self { hex, pole }
    }
}

/// A side in canonical form
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EdgeCoord {
    pub hex: HexCoord,
    pub side: Side,
}

impl EdgeCoord {
    pub fn new(hex: HexCoord, side: Side) -> Self {
        let other = hex.across(side);
        if (hex.q, hex.r) <= (other.q, other.r) {
            Self { hex, side }
        } else {
            Self {
                hex: other,
                side: side.flipped(),
            }
        }
    }

    /// The two corners this side joins
    pub fn endpoints(&self) -> [VertexCoord; 2] {
        use Pole::{North, South};
        let h = self.hex;
        let at = |side: Side, pole: Pole| VertexCoord::new(h.across(side), pole);
        match self.side {
            Side::NorthEast => [VertexCoord::new(h, North), at(Side::NorthEast, South)],
            Side::East => [at(Side::NorthEast, South), at(Side::SouthEast, North)],
            Side::SouthEast => [at(Side::SouthEast, North), VertexCoord::new(h, South)],
            Side::SouthWest => [VertexCoord::new(h, South), at(Side::SouthWest, North)],
            Side::West => [at(Side::SouthWest, North), at(Side::NorthWest, South)],
            Side::NorthWest => [at(Side::NorthWest, South), VertexCoord::new(h, North)],
        }
    }
}
