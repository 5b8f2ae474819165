//! Resources, wallets, prices and dice production.
//!
//! The bank is an implicit, unlimited supply: production and bank trades
//! credit wallets without debiting anything.

use crate::board::{Board, BuildingKind};
use crate::player::PlayerId;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// Bank exchange rate: offered units per unit received.
pub const BANK_TRADE_RATIO: u32 = 4;

/// The five tradeable resources
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Resource {
    Brick,
    Lumber,
    Ore,
    Grain,
    Wool,
}

impl Resource {
    /// All resource types
    pub const ALL: [Resource; 5] = [
        Resource::Brick,
        Resource::Lumber,
        Resource::Ore,
        Resource::Grain,
        Resource::Wool,
    ];

    const fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Resource::Brick => "brick",
            Resource::Lumber => "lumber",
            Resource::Ore => "ore",
            Resource::Grain => "grain",
            Resource::Wool => "wool",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EconomyError {
    #[error("insufficient {resource}: holds {held}, needs {needed}")]
    InsufficientFunds {
        resource: Resource,
        held: u32,
        needed: u32,
    },

    #[error("cannot trade {0} for itself")]
    SameResource(Resource),
}

/// Resource counts held by one player (or a price).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Wallet {
    counts: [u32; 5],
}

impl Wallet {
    /// Create an empty wallet
    pub const fn new() -> Self {
        Self { counts: [0; 5] }
    }

    /// Amounts in `Resource::ALL` order: brick, lumber, ore, grain, wool
    pub const fn with_amounts(brick: u32, lumber: u32, ore: u32, grain: u32, wool: u32) -> Self {
        Self {
            counts: [brick, lumber, ore, grain, wool],
        }
    }

    /// A wallet holding `amount` of a single resource
    pub fn single(resource: Resource, amount: u32) -> Self {
        let mut wallet = Self::new();
        wallet.credit(resource, amount);
        wallet
    }

    pub fn get(&self, resource: Resource) -> u32 {
        self.counts[resource.index()]
    }

    /// Total number of resource units
    pub fn total(&self) -> u32 {
        self.counts.iter().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = (Resource, u32)> + '_ {
        Resource::ALL.into_iter().zip(self.counts.iter().copied())
    }

    pub fn credit(&mut self, resource: Resource, amount: u32) {
        self.counts[resource.index()] += amount;
    }

    pub fn debit(&mut self, resource: Resource, amount: u32) -> Result<(), EconomyError> {
        let held = self.get(resource);
        if held < amount {
            return Err(EconomyError::InsufficientFunds {
                resource,
                held,
                needed: amount,
            });
        }
        self.counts[resource.index()] = held - amount;
        Ok(())
    }

    /// Take every unit of `resource`, returning how many there were
    pub fn drain(&mut self, resource: Resource) -> u32 {
        std::mem::take(&mut self.counts[resource.index()])
    }

    pub fn add_wallet(&mut self, other: &Wallet) {
        for (resource, amount) in other.iter() {
            self.credit(resource, amount);
        }
    }

    /// First shortfall against `price`, if any
    pub fn check_afford(&self, price: &Wallet) -> Result<(), EconomyError> {
        for (resource, needed) in price.iter() {
            let held = self.get(resource);
            if held < needed {
                return Err(EconomyError::InsufficientFunds {
                    resource,
                    held,
                    needed,
                });
            }
        }
        Ok(())
    }

    pub fn can_afford(&self, price: &Wallet) -> bool {
        self.check_afford(price).is_ok()
    }

    /// Deduct a whole price, or nothing at all
    pub fn pay(&mut self, price: &Wallet) -> Result<(), EconomyError> {
        self.check_afford(price)?;
        for (idx, needed) in price.counts.iter().enumerate() {
            self.counts[idx] -= needed;
        }
        Ok(())
    }

    /// Exchange `ratio` units of `offered` for one unit of `needed`.
    pub fn bank_trade(
        &mut self,
        offered: Resource,
        needed: Resource,
        ratio: u32,
    ) -> Result<(), EconomyError> {
        if offered == needed {
            return Err(EconomyError::SameResource(offered));
        }
        self.debit(offered, ratio)?;
        self.credit(needed, 1);
        Ok(())
    }

    /// The `n`-th unit (0-based) when units are laid out in `Resource::ALL` order
    pub fn nth_unit(&self, mut n: u32) -> Option<Resource> {
        for (resource, amount) in self.iter() {
            if n < amount {
                return Some(resource);
            }
            n -= amount;
        }
        None
    }

    /// Remove one unit chosen uniformly at random (for the robber)
    pub fn take_random<R: Rng>(&mut self, rng: &mut R) -> Option<Resource> {
        let total = self.total();
        if total == 0 {
            return None;
        }
        let resource = self.nth_unit(rng.gen_range(0..total))?;
        self.counts[resource.index()] -= 1;
        Some(resource)
    }
}

/// Building and card prices
pub mod costs {
    use super::Wallet;

    /// Cost to build a road: 1 brick, 1 lumber
    pub const ROAD: Wallet = Wallet::with_amounts(1, 1, 0, 0, 0);

    /// Cost to build a settlement: 1 brick, 1 lumber, 1 grain, 1 wool
    pub const SETTLEMENT: Wallet = Wallet::with_amounts(1, 1, 0, 1, 1);

    /// Cost to upgrade to city: 3 ore, 2 grain
    pub const CITY: Wallet = Wallet::with_amounts(0, 0, 3, 2, 0);

    /// Cost to buy a development card: 1 ore, 1 grain, 1 wool
    pub const DEVELOPMENT_CARD: Wallet = Wallet::with_amounts(0, 0, 1, 1, 1);
}

/// Resources owed to each player for a dice roll.
///
/// Tiles under the robber and the desert produce nothing; a settlement earns
/// one unit, a city two.
pub fn production(board: &Board, roll: u8) -> BTreeMap<PlayerId, Wallet> {
    let mut payouts: BTreeMap<PlayerId, Wallet> = BTreeMap::new();
    for tile in board.tiles_producing(roll) {
        let Some(resource) = tile.resource() else {
            continue;
        };
        for (owner, kind) in board.buildings_adjacent_to(tile.id) {
            let amount = match kind {
                BuildingKind::Settlement => 1,
                BuildingKind::City => 2,
            };
            payouts.entry(owner).or_default().credit(resource, amount);
        }
    }
    payouts
}
