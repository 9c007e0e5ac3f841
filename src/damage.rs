use crate::battle::Combatant;
use crate::items::held_item_crit_bonus;
use crate::model::{MoveCategory, Weather};
use crate::stats::{effective_stat, Stat};
use crate::types::{type_effectiveness, Effectiveness, ElementType};
use rand::Rng;
use serde::Serialize;

pub const BASE_MISS_CHANCE: f64 = 0.05;
pub const ACCURACY_STAGE_STEP: f64 = 0.05;
pub const EVASION_MISS_BONUS: f64 = 0.10;
pub const EVASION_SPEED_RATIO: f64 = 1.2;
pub const DEFAULT_CRIT_CHANCE: f64 = 1.0 / 16.0;
pub const CRIT_MULTIPLIER: f64 = 1.5;
pub const VARIANCE_MIN: f64 = 0.85;
pub const VARIANCE_MAX: f64 = 1.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DamageContext {
    pub weather: Weather,
    pub base_crit_chance: f64,
}

impl Default for DamageContext {
    fn default() -> Self {
        Self {
            weather: Weather::None,
            base_crit_chance: DEFAULT_CRIT_CHANCE,
        }
    }
}

impl DamageContext {
    pub fn with_weather(weather: Weather) -> Self {
        Self {
            weather,
            ..Self::default()
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttackOutcome {
    pub damage: u32,
    pub effectiveness: Effectiveness,
    pub is_critical: bool,
    pub is_miss: bool,
}

impl AttackOutcome {
    fn miss() -> Self {
        Self {
            damage: 0,
            effectiveness: Effectiveness::Normal,
            is_critical: false,
            is_miss: true,
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct DamageModifiers {
    pub effectiveness: f64,
    pub crit: f64,
    pub variance: f64,
}

impl Default for DamageModifiers {
    fn default() -> Self {
        Self {
            effectiveness: 1.0,
            crit: 1.0,
            variance: 1.0,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
pub struct DamageRange {
    pub min: u32,
    pub max: u32,
}

pub fn weather_move_modifier(weather: Weather, category: MoveCategory) -> f64 {
    match (weather, category.element()) {
        (Weather::Rain, Some(ElementType::Water)) => 1.5,
        (Weather::Rain, Some(ElementType::Fire)) => 0.5,
        (Weather::Sun, Some(ElementType::Fire)) => 1.5,
        (Weather::Sun, Some(ElementType::Water)) => 0.5,
        _ => 1.0,
    }
}

pub fn move_effectiveness(category: MoveCategory, defender: &Combatant) -> Effectiveness {
    match category {
        MoveCategory::Basic => Effectiveness::Normal,
        MoveCategory::Typed(t) => type_effectiveness(t, &defender.creature.types),
    }
}

pub fn miss_chance(attacker: &Combatant, defender: &Combatant, weather: Weather) -> f64 {
    let mut chance =
        (BASE_MISS_CHANCE - ACCURACY_STAGE_STEP * f64::from(attacker.stages.accuracy)).max(0.0);
    let attacker_speed = f64::from(effective_stat(attacker, Stat::Speed, weather));
    let defender_speed = f64::from(effective_stat(defender, Stat::Speed, weather));
    if defender_speed > attacker_speed * EVASION_SPEED_RATIO {
        chance += EVASION_MISS_BONUS;
    }
    chance.min(1.0)
}

pub fn crit_chance(attacker: &Combatant, base: f64) -> f64 {
    (base + held_item_crit_bonus(attacker.creature.held_item)).min(1.0)
}

/// `attack / defense × power × weather`, before type, crit and variance.
pub fn raw_damage(
    attacker: &Combatant,
    defender: &Combatant,
    category: MoveCategory,
    weather: Weather,
) -> f64 {
    let attack = f64::from(effective_stat(attacker, Stat::Attack, weather));
    let defense = f64::from(effective_stat(defender, Stat::Defense, weather).max(1));
    attack / defense * f64::from(category.power()) * weather_move_modifier(weather, category)
}

pub fn calculate_damage(raw: f64, modifiers: DamageModifiers) -> u32 {
    let total = raw * modifiers.effectiveness * modifiers.crit * modifiers.variance;
    (total.floor() as u32).max(1)
}

/// Rolls accuracy, then crit, then variance, in that order.
pub fn resolve_attack<R: Rng + ?Sized>(
    attacker: &Combatant,
    defender: &Combatant,
    category: MoveCategory,
    ctx: &DamageContext,
    rng: &mut R,
) -> AttackOutcome {
    let miss = miss_chance(attacker, defender, ctx.weather);
    if rng.gen::<f64>() < miss {
        return AttackOutcome::miss();
    }
    let raw = raw_damage(attacker, defender, category, ctx.weather);
    let effectiveness = move_effectiveness(category, defender);
    let is_critical = rng.gen::<f64>() < crit_chance(attacker, ctx.base_crit_chance);
    let variance = rng.gen_range(VARIANCE_MIN..=VARIANCE_MAX);
    let damage = calculate_damage(
        raw,
        DamageModifiers {
            effectiveness: effectiveness.multiplier(),
            crit: if is_critical { CRIT_MULTIPLIER } else { 1.0 },
            variance,
        },
    );
    AttackOutcome {
        damage,
        effectiveness,
        is_critical,
        is_miss: false,
    }
}

/// Deterministic preview: no accuracy, no crit, variance pinned to its bounds.
pub fn predict_damage(
    attacker: &Combatant,
    defender: &Combatant,
    category: MoveCategory,
    weather: Weather,
) -> DamageRange {
    let raw = raw_damage(attacker, defender, category, weather);
    let effectiveness = move_effectiveness(category, defender).multiplier();
    let at = |variance| {
        calculate_damage(
            raw,
            DamageModifiers {
                effectiveness,
                variance,
                ..DamageModifiers::default()
            },
        )
    };
    DamageRange {
        min: at(VARIANCE_MIN),
        max: at(VARIANCE_MAX),
    }
}
