//! Status conditions: per-turn effects at a combatant's action point, and
//! infliction from typed strikes.

use crate::battle::Combatant;
use crate::model::{MoveCategory, StatusCondition};
use crate::types::ElementType;
use rand::Rng;

pub const PARALYSIS_SKIP_CHANCE: f64 = 0.25;
pub const SLEEP_WAKE_CHANCE: f64 = 0.33;
pub const FREEZE_THAW_CHANCE: f64 = 0.20;
pub const INFLICT_CHANCE: f64 = 0.20;
pub const FREEZE_INFLICT_CHANCE: f64 = 0.10;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StatusTick {
    pub chip_damage: u32,
    pub can_act: bool,
    pub next_status: StatusCondition,
    pub message: Option<String>,
}

pub fn chip_damage(max_hp: u32) -> u32 {
    max_hp / 8
}

/// Chip damage and the action check are independent: a burned, paralysed
/// combatant can take burn damage and lose its turn in the same tick.
pub fn tick<R: Rng + ?Sized>(combatant: &Combatant, rng: &mut R) -> StatusTick {
    let name = &combatant.creature.name;
    let max_hp = combatant.max_hp();
    match combatant.status {
        StatusCondition::None => StatusTick {
            chip_damage: 0,
            can_act: true,
            next_status: StatusCondition::None,
            message: None,
        },
        StatusCondition::Burn => StatusTick {
            chip_damage: chip_damage(max_hp),
            can_act: true,
            next_status: StatusCondition::Burn,
            message: Some(format!("{name} is hurt by its burn!")),
        },
        StatusCondition::Poison => StatusTick {
            chip_damage: chip_damage(max_hp),
            can_act: true,
            next_status: StatusCondition::Poison,
            message: Some(format!("{name} is hurt by poison!")),
        },
        StatusCondition::Paralysis => {
            let stuck = rng.gen::<f64>() < PARALYSIS_SKIP_CHANCE;
            StatusTick {
                chip_damage: 0,
                can_act: !stuck,
                next_status: StatusCondition::Paralysis,
                message: stuck.then(|| format!("{name} is paralyzed! It can't move!")),
            }
        }
        StatusCondition::Sleep => {
            if rng.gen::<f64>() < SLEEP_WAKE_CHANCE {
                StatusTick {
                    chip_damage: 0,
                    can_act: true,
                    next_status: StatusCondition::None,
                    message: Some(format!("{name} woke up!")),
                }
            } else {
                StatusTick {
                    chip_damage: 0,
                    can_act: false,
                    next_status: StatusCondition::Sleep,
                    message: Some(format!("{name} is fast asleep.")),
                }
            }
        }
        StatusCondition::Freeze => {
            if rng.gen::<f64>() < FREEZE_THAW_CHANCE {
                StatusTick {
                    chip_damage: 0,
                    can_act: true,
                    next_status: StatusCondition::None,
                    message: Some(format!("{name} thawed out!")),
                }
            } else {
                StatusTick {
                    chip_damage: 0,
                    can_act: false,
                    next_status: StatusCondition::Freeze,
                    message: Some(format!("{name} is frozen solid!")),
                }
            }
        }
    }
}

/// Status a typed strike can leave behind, with its chance.
pub fn inflicted_by(category: MoveCategory) -> Option<(StatusCondition, f64)> {
    match category.element()? {
        ElementType::Fire => Some((StatusCondition::Burn, INFLICT_CHANCE)),
        ElementType::Electric => Some((StatusCondition::Paralysis, INFLICT_CHANCE)),
        ElementType::Poison => Some((StatusCondition::Poison, INFLICT_CHANCE)),
        ElementType::Ice => Some((StatusCondition::Freeze, FREEZE_INFLICT_CHANCE)),
        _ => None,
    }
}

/// Rolls only when the move can inflict something and the target is healthy
/// and status-free.
pub fn try_inflict<R: Rng + ?Sized>(
    category: MoveCategory,
    target: &Combatant,
    rng: &mut R,
) -> Option<StatusCondition> {
    if target.is_fainted() || !target.status.is_none() {
        return None;
    }
    let (status, chance) = inflicted_by(category)?;
    (rng.gen::<f64>() < chance).then_some(status)
}
