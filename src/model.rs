use crate::items::HeldItem;
use crate::types::ElementType;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub enum Rarity {
    #[default]
    Common,
    Rare,
    Epic,
    Legendary,
    Mythical,
}

impl Rarity {
    pub fn stat_multiplier(self) -> f64 {
        match self {
            Rarity::Common => 1.0,
            Rarity::Rare => 1.2,
            Rarity::Epic => 1.5,
            Rarity::Legendary => 2.0,
            Rarity::Mythical => 2.5,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusCondition {
    #[default]
    None,
    Burn,
    Poison,
    Paralysis,
    Sleep,
    Freeze,
}

impl StatusCondition {
    pub fn is_none(self) -> bool {
        matches!(self, StatusCondition::None)
    }

    pub fn label(self) -> &'static str {
        match self {
            StatusCondition::None => "none",
            StatusCondition::Burn => "brn",
            StatusCondition::Poison => "psn",
            StatusCondition::Paralysis => "par",
            StatusCondition::Sleep => "slp",
            StatusCondition::Freeze => "frz",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Weather {
    #[default]
    None,
    Rain,
    Sun,
    Sandstorm,
}

impl Weather {
    pub const ACTIVE: [Weather; 3] = [Weather::Rain, Weather::Sun, Weather::Sandstorm];

    pub fn label(self) -> &'static str {
        match self {
            Weather::None => "none",
            Weather::Rain => "rain",
            Weather::Sun => "sun",
            Weather::Sandstorm => "sandstorm",
        }
    }
}

/// The whole move model: a plain attack, or a strike of one of the user's types.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoveCategory {
    Basic,
    Typed(ElementType),
}

impl MoveCategory {
    pub fn power(self) -> u32 {
        match self {
            MoveCategory::Basic => 40,
            MoveCategory::Typed(_) => 75,
        }
    }

    pub fn element(self) -> Option<ElementType> {
        match self {
            MoveCategory::Basic => None,
            MoveCategory::Typed(t) => Some(t),
        }
    }

    pub fn label(self) -> String {
        match self {
            MoveCategory::Basic => "attack".to_string(),
            MoveCategory::Typed(t) => format!("{t} strike"),
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Personality {
    Brave,
    Calm,
    Timid,
    Jolly,
    Hasty,
    Gentle,
    Stubborn,
    Curious,
}

impl Personality {
    pub const ALL: [Personality; 8] = [
        Personality::Brave,
        Personality::Calm,
        Personality::Timid,
        Personality::Jolly,
        Personality::Hasty,
        Personality::Gentle,
        Personality::Stubborn,
        Personality::Curious,
    ];
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    pub hp: u32,
    pub attack: u32,
    pub defense: u32,
    pub speed: u32,
}

impl Stats {
    pub fn scaled(&self, multiplier: f64) -> Stats {
        let scale = |v: u32| (v as f64 * multiplier).floor() as u32;
        Stats {
            hp: scale(self.hp),
            attack: scale(self.attack),
            defense: scale(self.defense),
            speed: scale(self.speed),
        }
    }
}

pub const MAX_STAGE: i8 = 6;

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct StageBuffs {
    pub attack: i8,
    pub defense: i8,
    pub speed: i8,
    pub accuracy: i8,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuffStat {
    Attack,
    Defense,
    Speed,
    Accuracy,
}

impl BuffStat {
    pub fn label(self) -> &'static str {
        match self {
            BuffStat::Attack => "atk",
            BuffStat::Defense => "def",
            BuffStat::Speed => "spe",
            BuffStat::Accuracy => "accuracy",
        }
    }
}

impl StageBuffs {
    pub fn get(&self, stat: BuffStat) -> i8 {
        match stat {
            BuffStat::Attack => self.attack,
            BuffStat::Defense => self.defense,
            BuffStat::Speed => self.speed,
            BuffStat::Accuracy => self.accuracy,
        }
    }

    /// Returns the stage change actually applied after clamping.
    pub fn raise(&mut self, stat: BuffStat, delta: i8) -> i8 {
        let slot = match stat {
            BuffStat::Attack => &mut self.attack,
            BuffStat::Defense => &mut self.defense,
            BuffStat::Speed => &mut self.speed,
            BuffStat::Accuracy => &mut self.accuracy,
        };
        let before = *slot;
        *slot = slot.saturating_add(delta).clamp(-MAX_STAGE, MAX_STAGE);
        *slot - before
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Creature {
    pub id: String,
    #[serde(default)]
    pub species_id: u32,
    pub name: String,
    pub types: Vec<ElementType>,
    pub stats: Stats,
    #[serde(default)]
    pub rarity: Rarity,
    #[serde(default)]
    pub status: StatusCondition,
    #[serde(default)]
    pub held_item: Option<HeldItem>,
    #[serde(default)]
    pub friendship: u8,
    #[serde(default)]
    pub battles_won: u32,
    #[serde(default)]
    pub history: Vec<String>,
    #[serde(default)]
    pub is_archived: bool,
    #[serde(default)]
    pub personality: Option<Personality>,
}

impl Creature {
    pub fn new(id: impl Into<String>, name: impl Into<String>, types: Vec<ElementType>, stats: Stats) -> Self {
        Self {
            id: id.into(),
            species_id: 0,
            name: name.into(),
            types,
            stats,
            rarity: Rarity::Common,
            status: StatusCondition::None,
            held_item: None,
            friendship: 0,
            battles_won: 0,
            history: Vec::new(),
            is_archived: false,
            personality: None,
        }
    }

    pub fn is_battle_ready(&self) -> bool {
        self.stats.hp > 0 && !self.is_archived
    }

    /// One or two types.
    pub fn has_valid_types(&self) -> bool {
        matches!(self.types.len(), 1 | 2)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterFile {
    pub creatures: Vec<Creature>,
}
