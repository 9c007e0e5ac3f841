//! Effective stat resolution.
//!
//! Every consumer of attack/defense/speed (damage rolls, damage previews,
//! initiative, the opponent AI) goes through [`effective_stat`] so that a
//! preview and the roll it predicts always agree.

use crate::battle::Combatant;
use crate::items::held_item_multiplier;
use crate::model::{StatusCondition, Weather};
use crate::types::ElementType;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stat {
    Attack,
    Defense,
    Speed,
}

/// `+n` stages multiply by `1 + n/2`, `-n` stages divide by the same factor.
pub fn stage_multiplier(stage: i8) -> f64 {
    let factor = 1.0 + 0.5 * f64::from(stage.unsigned_abs());
    if stage >= 0 {
        factor
    } else {
        1.0 / factor
    }
}

pub fn weather_stat_multiplier(types: &[ElementType], stat: Stat, weather: Weather) -> f64 {
    let has = |t: ElementType| types.contains(&t);
    match (weather, stat) {
        (Weather::Sandstorm, Stat::Defense)
            if has(ElementType::Rock) || has(ElementType::Ground) || has(ElementType::Steel) =>
        {
            1.5
        }
        (Weather::Rain, Stat::Speed) if has(ElementType::Water) => 2.0,
        (Weather::Sun, Stat::Speed) if has(ElementType::Grass) => 2.0,
        _ => 1.0,
    }
}

pub fn status_stat_multiplier(status: StatusCondition, stat: Stat) -> f64 {
    match (status, stat) {
        (StatusCondition::Paralysis, Stat::Speed) => 0.5,
        (StatusCondition::Burn, Stat::Attack) => 0.5,
        _ => 1.0,
    }
}

fn base_stat(combatant: &Combatant, stat: Stat) -> u32 {
    let stats = &combatant.creature.stats;
    match stat {
        Stat::Attack => stats.attack,
        Stat::Defense => stats.defense,
        Stat::Speed => stats.speed,
    }
}

fn stage_for(combatant: &Combatant, stat: Stat) -> i8 {
    match stat {
        Stat::Attack => combatant.stages.attack,
        Stat::Defense => combatant.stages.defense,
        Stat::Speed => combatant.stages.speed,
    }
}

/// Base → held item → weather → status → stage buffs → floor.
pub fn effective_stat(combatant: &Combatant, stat: Stat, weather: Weather) -> u32 {
    let mut value = f64::from(base_stat(combatant, stat));
    value *= held_item_multiplier(combatant.creature.held_item, stat);
    value *= weather_stat_multiplier(&combatant.creature.types, stat, weather);
    value *= status_stat_multiplier(combatant.status, stat);
    value *= stage_multiplier(stage_for(combatant, stat));
    value.floor() as u32
}
