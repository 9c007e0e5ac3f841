use crate::battle::{Combatant, CombatantId};
use crate::damage::{predict_damage, DamageRange};
use crate::model::{MoveCategory, Weather};
use rand::seq::SliceRandom;
use rand::RngCore;
use serde::Deserialize;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct AiChoice {
    pub target: CombatantId,
    pub category: MoveCategory,
}

pub trait BattleAi {
    /// `targets` may contain defeated combatants; implementations skip them.
    fn choose_action(
        &mut self,
        actor: &Combatant,
        targets: &[&Combatant],
        weather: Weather,
        rng: &mut dyn RngCore,
    ) -> Option<AiChoice>;
}

/// The plain attack first, then one strike per type the actor holds.
pub fn candidate_moves(actor: &Combatant) -> Vec<MoveCategory> {
    let mut moves = vec![MoveCategory::Basic];
    for &t in &actor.creature.types {
        let typed = MoveCategory::Typed(t);
        if !moves.contains(&typed) {
            moves.push(typed);
        }
    }
    moves
}

/// Highest predicted upper bound; an earlier candidate keeps a tie.
pub fn strongest<I>(predictions: I) -> Option<MoveCategory>
where
    I: IntoIterator<Item = (MoveCategory, DamageRange)>,
{
    let mut best: Option<(MoveCategory, u32)> = None;
    for (category, range) in predictions {
        match best {
            Some((_, max)) if range.max <= max => {}
            _ => best = Some((category, range.max)),
        }
    }
    best.map(|(category, _)| category)
}

pub fn best_move(actor: &Combatant, target: &Combatant, weather: Weather) -> MoveCategory {
    let predictions = candidate_moves(actor)
        .into_iter()
        .map(|category| (category, predict_damage(actor, target, category, weather)));
    strongest(predictions).unwrap_or(MoveCategory::Basic)
}

fn pick_target<'a>(targets: &[&'a Combatant], rng: &mut dyn RngCore) -> Option<&'a Combatant> {
    let living: Vec<&Combatant> = targets.iter().copied().filter(|c| !c.is_fainted()).collect();
    living.choose(rng).copied()
}

/// Greedy single-turn lookahead: random living target, strongest predicted move.
#[derive(Clone, Copy, Debug, Default)]
pub struct GreedyAi;

impl BattleAi for GreedyAi {
    fn choose_action(
        &mut self,
        actor: &Combatant,
        targets: &[&Combatant],
        weather: Weather,
        rng: &mut dyn RngCore,
    ) -> Option<AiChoice> {
        let target = pick_target(targets, rng)?;
        Some(AiChoice {
            target: target.id,
            category: best_move(actor, target, weather),
        })
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct RandomAi;

impl BattleAi for RandomAi {
    fn choose_action(
        &mut self,
        actor: &Combatant,
        targets: &[&Combatant],
        _weather: Weather,
        rng: &mut dyn RngCore,
    ) -> Option<AiChoice> {
        let target = pick_target(targets, rng)?;
        let moves = candidate_moves(actor);
        let category = *moves.choose(rng)?;
        Some(AiChoice {
            target: target.id,
            category,
        })
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BattlePolicy {
    #[default]
    Greedy,
    Random,
}

impl BattlePolicy {
    pub fn build(self) -> Box<dyn BattleAi + Send> {
        match self {
            BattlePolicy::Greedy => Box::new(GreedyAi),
            BattlePolicy::Random => Box::new(RandomAi),
        }
    }
}
