use phf::phf_map;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementType {
    Normal,
    Fire,
    Water,
    Grass,
    Electric,
    Ice,
    Fighting,
    Poison,
    Ground,
    Flying,
    Psychic,
    Bug,
    Rock,
    Ghost,
    Dragon,
    Dark,
    Steel,
    Fairy,
}

static TYPE_NAMES: phf::Map<&'static str, ElementType> = phf_map! {
    "normal" => ElementType::Normal,
    "fire" => ElementType::Fire,
    "water" => ElementType::Water,
    "grass" => ElementType::Grass,
    "electric" => ElementType::Electric,
    "ice" => ElementType::Ice,
    "fighting" => ElementType::Fighting,
    "poison" => ElementType::Poison,
    "ground" => ElementType::Ground,
    "flying" => ElementType::Flying,
    "psychic" => ElementType::Psychic,
    "bug" => ElementType::Bug,
    "rock" => ElementType::Rock,
    "ghost" => ElementType::Ghost,
    "dragon" => ElementType::Dragon,
    "dark" => ElementType::Dark,
    "steel" => ElementType::Steel,
    "fairy" => ElementType::Fairy,
};

impl ElementType {
    pub const ALL: [ElementType; 18] = [
        ElementType::Normal,
        ElementType::Fire,
        ElementType::Water,
        ElementType::Grass,
        ElementType::Electric,
        ElementType::Ice,
        ElementType::Fighting,
        ElementType::Poison,
        ElementType::Ground,
        ElementType::Flying,
        ElementType::Psychic,
        ElementType::Bug,
        ElementType::Rock,
        ElementType::Ghost,
        ElementType::Dragon,
        ElementType::Dark,
        ElementType::Steel,
        ElementType::Fairy,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ElementType::Normal => "normal",
            ElementType::Fire => "fire",
            ElementType::Water => "water",
            ElementType::Grass => "grass",
            ElementType::Electric => "electric",
            ElementType::Ice => "ice",
            ElementType::Fighting => "fighting",
            ElementType::Poison => "poison",
            ElementType::Ground => "ground",
            ElementType::Flying => "flying",
            ElementType::Psychic => "psychic",
            ElementType::Bug => "bug",
            ElementType::Rock => "rock",
            ElementType::Ghost => "ghost",
            ElementType::Dragon => "dragon",
            ElementType::Dark => "dark",
            ElementType::Steel => "steel",
            ElementType::Fairy => "fairy",
        }
    }

    /// Types this element deals double damage to. Resistances are derived by
    /// reading the table in reverse.
    pub fn strong_against(self) -> &'static [ElementType] {
        use ElementType::*;
        match self {
            Normal => &[],
            Fire => &[Grass, Ice, Bug, Steel],
            Water => &[Fire, Ground, Rock],
            Grass => &[Water, Ground, Rock],
            Electric => &[Water, Flying],
            Ice => &[Grass, Ground, Flying, Dragon],
            Fighting => &[Normal, Ice, Rock, Dark, Steel],
            Poison => &[Grass, Fairy],
            Ground => &[Fire, Electric, Poison, Rock, Steel],
            Flying => &[Grass, Fighting, Bug],
            Psychic => &[Fighting, Poison],
            Bug => &[Grass, Psychic, Dark],
            Rock => &[Fire, Ice, Flying, Bug],
            Ghost => &[Psychic, Ghost],
            Dragon => &[Dragon],
            Dark => &[Psychic, Ghost],
            Steel => &[Ice, Rock, Fairy],
            Fairy => &[Fighting, Dragon, Dark],
        }
    }

    pub fn is_strong_against(self, other: ElementType) -> bool {
        self.strong_against().contains(&other)
    }
}

impl FromStr for ElementType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase();
        TYPE_NAMES
            .get(key.as_str())
            .copied()
            .ok_or_else(|| format!("unknown element type '{s}'"))
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Effectiveness {
    Super,
    Normal,
    Weak,
}

impl Effectiveness {
    pub fn multiplier(self) -> f64 {
        match self {
            Effectiveness::Super => 2.0,
            Effectiveness::Normal => 1.0,
            Effectiveness::Weak => 0.5,
        }
    }
}

/// Super-effective wins over resistance; within each check the first match in
/// defender type order decides.
pub fn type_effectiveness(move_type: ElementType, defender_types: &[ElementType]) -> Effectiveness {
    if defender_types
        .iter()
        .any(|&t| move_type.is_strong_against(t))
    {
        return Effectiveness::Super;
    }
    if defender_types
        .iter()
        .any(|&t| t.is_strong_against(move_type))
    {
        return Effectiveness::Weak;
    }
    Effectiveness::Normal
}
