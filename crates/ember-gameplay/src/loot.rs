//! Loot tables.
//!
//! Every entry is an independent Bernoulli trial: one table can drop
//! nothing, one entry, or all of them.

use ember_common::ItemId;
use fastrand::Rng;
use serde::{Deserialize, Serialize};

/// One possible drop.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DropEntry {
    /// Dropped item.
    pub item: ItemId,
    /// Probability in [0, 1]. Zero never drops, one always drops.
    pub chance: f32,
    /// Minimum units dropped.
    #[serde(default = "one")]
    pub min_quantity: u32,
    /// Maximum units dropped.
    #[serde(default = "one")]
    pub max_quantity: u32,
}

const fn one() -> u32 {
    1
}

impl DropEntry {
    /// Creates an entry dropping exactly one unit.
    #[must_use]
    pub const fn new(item: ItemId, chance: f32) -> Self {
        Self {
            item,
            chance,
            min_quantity: 1,
            max_quantity: 1,
        }
    }

    /// Set the quantity range (bounds are reordered if reversed).
    #[must_use]
    pub const fn with_quantity(mut self, min: u32, max: u32) -> Self {
        if min <= max {
            self.min_quantity = min;
            self.max_quantity = max;
        } else {
            self.min_quantity = max;
            self.max_quantity = min;
        }
        self
    }

    /// Rolls this entry. Returns the dropped quantity, if any.
    pub fn roll(&self, rng: &mut Rng) -> Option<u32> {
        if self.chance.is_nan() || self.chance <= 0.0 {
            return None;
        }
        if rng.f32() > self.chance {
            return None;
        }
        let lo = self.min_quantity.min(self.max_quantity);
        let hi = self.min_quantity.max(self.max_quantity);
        let quantity = rng.u32(lo..=hi);
        (quantity > 0).then_some(quantity)
    }
}

/// A rolled drop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LootDrop {
    /// Dropped item.
    pub item: ItemId,
    /// Units dropped.
    pub quantity: u32,
}

/// A list of independent drop entries.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LootTable {
    entries: Vec<DropEntry>,
}

impl LootTable {
    /// Creates a table from entries.
    #[must_use]
    pub fn new(entries: Vec<DropEntry>) -> Self {
        Self { entries }
    }

    /// Adds an entry.
    #[must_use]
    pub fn with_entry(mut self, entry: DropEntry) -> Self {
        self.entries.push(entry);
        self
    }

    /// Configured entries.
    #[must_use]
    pub fn entries(&self) -> &[DropEntry] {
        &self.entries
    }

    /// Checks if the table has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Rolls every entry once.
    pub fn roll(&self, rng: &mut Rng) -> Vec<LootDrop> {
        self.entries
            .iter()
            .filter_map(|entry| {
                entry.roll(rng).map(|quantity| LootDrop {
                    item: entry.item,
                    quantity,
                })
            })
            .collect()
    }
}
