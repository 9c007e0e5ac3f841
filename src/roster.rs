//! Collaborators the battle engine talks to: where opponents come from and
//! where rewards and creature changes go.

use crate::error::RosterError;
use crate::model::{Creature, Personality, Rarity, Stats};
use crate::rewards::CreatureDelta;
use crate::types::ElementType;
use rand::distributions::{Distribution, WeightedIndex};
use rand::seq::SliceRandom;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::debug;

/// Mythical is never rolled; it only appears through an override.
pub const RARITY_WEIGHTS: [(Rarity, u32); 4] = [
    (Rarity::Common, 60),
    (Rarity::Rare, 25),
    (Rarity::Epic, 10),
    (Rarity::Legendary, 5),
];

pub trait RosterSource {
    fn fetch_random(&mut self, rng: &mut dyn RngCore) -> Result<Creature, RosterError>;

    fn fetch_by_id(
        &mut self,
        species_id: u32,
        rarity: Option<Rarity>,
        rng: &mut dyn RngCore,
    ) -> Result<Creature, RosterError>;
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Currency {
    Tokens,
    Stardust,
}

pub trait RewardSink {
    fn apply_currency(&mut self, currency: Currency, amount: i64);
    fn apply_xp(&mut self, amount: i64);
}

pub trait PersistenceSink {
    fn apply_creature_delta(&mut self, delta: &CreatureDelta);
}

pub fn roll_rarity(rng: &mut dyn RngCore) -> Rarity {
    match WeightedIndex::new(RARITY_WEIGHTS.iter().map(|(_, w)| *w)) {
        Ok(dist) => RARITY_WEIGHTS[dist.sample(rng)].0,
        Err(_) => Rarity::Common,
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct Species {
    pub id: u32,
    pub name: String,
    pub types: Vec<ElementType>,
    pub stats: Stats,
}

/// A [`RosterSource`] backed by a fixed species list.
#[derive(Clone, Debug, Default)]
pub struct SpeciesPool {
    species: Vec<Species>,
    serial: u64,
}

impl SpeciesPool {
    pub fn new(species: Vec<Species>) -> Self {
        Self { species, serial: 0 }
    }

    pub fn from_json_str(raw: &str) -> Result<Self, RosterError> {
        let species: Vec<Species> = serde_json::from_str(raw)?;
        if species.is_empty() {
            return Err(RosterError::Empty);
        }
        Ok(Self::new(species))
    }

    pub fn load(path: &Path) -> Result<Self, RosterError> {
        let raw = fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    pub fn len(&self) -> usize {
        self.species.len()
    }

    pub fn is_empty(&self) -> bool {
        self.species.is_empty()
    }

    fn instantiate(&mut self, species: &Species, rarity: Rarity, rng: &mut dyn RngCore) -> Creature {
        self.serial += 1;
        let mut creature = Creature::new(
            format!("{}-{}", species.id, self.serial),
            species.name.clone(),
            species.types.clone(),
            species.stats.scaled(rarity.stat_multiplier()),
        );
        creature.species_id = species.id;
        creature.rarity = rarity;
        creature.personality = Personality::ALL.choose(rng).copied();
        debug!(id = %creature.id, rarity = ?rarity, "creature generated");
        creature
    }
}

impl RosterSource for SpeciesPool {
    fn fetch_random(&mut self, rng: &mut dyn RngCore) -> Result<Creature, RosterError> {
        let species = self.species.choose(rng).cloned().ok_or(RosterError::Empty)?;
        let rarity = roll_rarity(rng);
        Ok(self.instantiate(&species, rarity, rng))
    }

    fn fetch_by_id(
        &mut self,
        species_id: u32,
        rarity: Option<Rarity>,
        rng: &mut dyn RngCore,
    ) -> Result<Creature, RosterError> {
        let species = self
            .species
            .iter()
            .find(|s| s.id == species_id)
            .cloned()
            .ok_or(RosterError::NotFound(species_id))?;
        let rarity = match rarity {
            Some(r) => r,
            None => roll_rarity(rng),
        };
        Ok(self.instantiate(&species, rarity, rng))
    }
}

/// Wallet plus creature collection held in memory.
#[derive(Clone, Debug, Default)]
pub struct InMemoryProfile {
    pub tokens: i64,
    pub stardust: i64,
    pub xp: i64,
    pub creatures: Vec<Creature>,
}

impl InMemoryProfile {
    pub fn new(creatures: Vec<Creature>) -> Self {
        Self {
            creatures,
            ..Self::default()
        }
    }

    pub fn creature(&self, id: &str) -> Option<&Creature> {
        self.creatures.iter().find(|c| c.id == id)
    }
}

impl RewardSink for InMemoryProfile {
    fn apply_currency(&mut self, currency: Currency, amount: i64) {
        match currency {
            Currency::Tokens => self.tokens += amount,
            Currency::Stardust => self.stardust += amount,
        }
    }

    fn apply_xp(&mut self, amount: i64) {
        self.xp += amount;
    }
}

impl PersistenceSink for InMemoryProfile {
    fn apply_creature_delta(&mut self, delta: &CreatureDelta) {
        let Some(creature) = self.creatures.iter_mut().find(|c| c.id == delta.creature_id) else {
            debug!(id = %delta.creature_id, "delta for unknown creature dropped");
            return;
        };
        creature.friendship = creature.friendship.saturating_add(delta.friendship);
        creature.battles_won = creature.battles_won.saturating_add(delta.battles_won);
        creature.history.push(delta.history.clone());
        if let Some(status) = delta.status_override {
            creature.status = status;
        }
    }
}
