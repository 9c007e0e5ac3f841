use crate::model::BuffStat;
use crate::stats::Stat;
use serde::{Deserialize, Serialize};

/// Equipment a creature carries into battle. Persisted on the creature record.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum HeldItem {
    PowerBand,
    GuardCharm,
    SwiftFeather,
    ScopeLens,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ItemEffect {
    pub name: &'static str,
    pub stat: Option<Stat>,
    pub stat_bonus: f64,
    pub crit_bonus: f64,
}

impl HeldItem {
    pub fn effect(self) -> ItemEffect {
        match self {
            HeldItem::PowerBand => ItemEffect {
                name: "Power Band",
                stat: Some(Stat::Attack),
                stat_bonus: 0.10,
                ..ItemEffect::default()
            },
            HeldItem::GuardCharm => ItemEffect {
                name: "Guard Charm",
                stat: Some(Stat::Defense),
                stat_bonus: 0.10,
                ..ItemEffect::default()
            },
            HeldItem::SwiftFeather => ItemEffect {
                name: "Swift Feather",
                stat: Some(Stat::Speed),
                stat_bonus: 0.10,
                ..ItemEffect::default()
            },
            HeldItem::ScopeLens => ItemEffect {
                name: "Scope Lens",
                crit_bonus: 0.125,
                ..ItemEffect::default()
            },
        }
    }
}

/// Multiplier the held item applies to `stat`, 1.0 when it does not match.
pub fn held_item_multiplier(item: Option<HeldItem>, stat: Stat) -> f64 {
    match item.map(HeldItem::effect) {
        Some(effect) if effect.stat == Some(stat) => 1.0 + effect.stat_bonus,
        _ => 1.0,
    }
}

pub fn held_item_crit_bonus(item: Option<HeldItem>) -> f64 {
    item.map(|i| i.effect().crit_bonus).unwrap_or(0.0)
}

/// Single-use items spent from the bag during a battle.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BattleItem {
    FullHeal,
    XAttack,
    XDefense,
    XSpeed,
    XAccuracy,
}

impl BattleItem {
    pub fn name(self) -> &'static str {
        match self {
            BattleItem::FullHeal => "Full Heal",
            BattleItem::XAttack => "X Attack",
            BattleItem::XDefense => "X Defense",
            BattleItem::XSpeed => "X Speed",
            BattleItem::XAccuracy => "X Accuracy",
        }
    }

    pub fn boosted_stat(self) -> Option<BuffStat> {
        match self {
            BattleItem::FullHeal => None,
            BattleItem::XAttack => Some(BuffStat::Attack),
            BattleItem::XDefense => Some(BuffStat::Defense),
            BattleItem::XSpeed => Some(BuffStat::Speed),
            BattleItem::XAccuracy => Some(BuffStat::Accuracy),
        }
    }
}
