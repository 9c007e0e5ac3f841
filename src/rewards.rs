//! Difficulty profiles and the end-of-battle report.

use crate::battle::{BattleOutcome, BattleState, Phase, Side, StatusCarryover};
use crate::model::StatusCondition;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const BASE_STARDUST: u32 = 15;
pub const BASE_TOKENS: u32 = 5;
pub const BASE_XP: u32 = 50;
pub const FRIENDSHIP_PER_WIN: u8 = 2;

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Normal,
    Hard,
    /// 2v2.
    Double,
}

impl Difficulty {
    pub fn team_size(self) -> usize {
        match self {
            Difficulty::Double => 2,
            _ => 1,
        }
    }

    pub fn enemy_stat_multiplier(self) -> f64 {
        match self {
            Difficulty::Easy => 0.8,
            Difficulty::Normal => 1.0,
            Difficulty::Hard => 1.3,
            Difficulty::Double => 1.1,
        }
    }

    pub fn reward_multiplier(self) -> f64 {
        match self {
            Difficulty::Easy => 0.5,
            Difficulty::Normal => 1.0,
            Difficulty::Hard => 2.0,
            Difficulty::Double => 1.5,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Normal => "normal",
            Difficulty::Hard => "hard",
            Difficulty::Double => "double",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize)]
pub struct Rewards {
    pub stardust: u32,
    pub tokens: u32,
    pub xp: u32,
}

impl Rewards {
    pub fn for_outcome(outcome: BattleOutcome, difficulty: Difficulty) -> Rewards {
        if outcome != BattleOutcome::Win {
            return Rewards::default();
        }
        let mult = difficulty.reward_multiplier();
        let scale = |base: u32| (f64::from(base) * mult).floor() as u32;
        Rewards {
            stardust: scale(BASE_STARDUST),
            tokens: scale(BASE_TOKENS),
            xp: scale(BASE_XP),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.stardust == 0 && self.tokens == 0 && self.xp == 0
    }
}

/// Changes to write back onto a persisted creature.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatureDelta {
    pub creature_id: String,
    pub friendship: u8,
    pub battles_won: u32,
    pub history: String,
    /// Only set when the battle was started with status inheritance.
    pub status_override: Option<StatusCondition>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BattleReport {
    pub outcome: BattleOutcome,
    pub turns: u32,
    pub rewards: Rewards,
    pub deltas: Vec<CreatureDelta>,
}

pub fn build_report(state: &BattleState) -> Option<BattleReport> {
    let outcome = match state.phase {
        Phase::Resolved(outcome) => outcome,
        Phase::Combat | Phase::Fled => return None,
    };
    let rewards = Rewards::for_outcome(outcome, state.context.difficulty);
    let deltas = if outcome == BattleOutcome::Win {
        win_deltas(state)
    } else {
        Vec::new()
    };
    Some(BattleReport {
        outcome,
        turns: state.turn,
        rewards,
        deltas,
    })
}

fn win_deltas(state: &BattleState) -> Vec<CreatureDelta> {
    let foes: Vec<&str> = state
        .team(Side::Enemy)
        .iter()
        .map(|c| c.creature.name.as_str())
        .collect();
    let label = if state.context.rival {
        "rival battle".to_string()
    } else {
        format!("{} battle", state.context.difficulty)
    };
    let history = format!(
        "Won a {label} against {} in {} turns",
        foes.join(" & "),
        state.turn
    );
    state
        .living(Side::Player)
        .map(|c| CreatureDelta {
            creature_id: c.creature.id.clone(),
            friendship: FRIENDSHIP_PER_WIN,
            battles_won: 1,
            history: history.clone(),
            status_override: match state.options.status_carryover {
                StatusCarryover::Inherit => Some(c.status),
                StatusCarryover::Reset => None,
            },
        })
        .collect()
}
