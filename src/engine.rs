//! Thin driver around the reducer: owns the RNG, asks the AI for enemy
//! actions, keeps the battle log and hands results to the sinks.

use crate::ai::BattleAi;
use crate::battle::{
    reduce, BattleAction, BattleEvent, BattleOutcome, BattleState, CombatantId, Phase, Side,
};
use crate::battle_logger::BattleLogger;
use crate::damage::DamageRange;
use crate::error::BattleError;
use crate::model::MoveCategory;
use crate::rewards::BattleReport;
use crate::roster::{Currency, PersistenceSink, RewardSink};
use rand::rngs::SmallRng;
use rand::SeedableRng;
use tracing::{debug, info};

/// How an automated run ended.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RunResult {
    Finished(BattleOutcome),
    Fled,
    /// Hit the round cap with both sides standing.
    Stalemate,
}

pub struct BattleEngine {
    state: BattleState,
    rng: SmallRng,
    enemy_ai: Box<dyn BattleAi + Send>,
    logger: BattleLogger,
    settled: bool,
}

impl BattleEngine {
    pub fn new(state: BattleState, seed: u64, enemy_ai: Box<dyn BattleAi + Send>) -> Self {
        Self::with_rng(state, SmallRng::seed_from_u64(seed), enemy_ai)
    }

    pub fn with_rng(state: BattleState, rng: SmallRng, enemy_ai: Box<dyn BattleAi + Send>) -> Self {
        let mut logger = BattleLogger::new();
        logger.log_start(&state);
        Self {
            state,
            rng,
            enemy_ai,
            logger,
            settled: false,
        }
    }

    pub fn state(&self) -> &BattleState {
        &self.state
    }

    pub fn logger(&self) -> &BattleLogger {
        &self.logger
    }

    /// The player combatant whose action is due, if any.
    pub fn awaiting_player(&self) -> Option<CombatantId> {
        self.state.next_actor().filter(|id| id.side == Side::Player)
    }

    pub fn preview(
        &self,
        actor: CombatantId,
        target: CombatantId,
        category: MoveCategory,
    ) -> Option<DamageRange> {
        self.state.preview(actor, target, category)
    }

    /// Applies one player action. Fleeing is accepted at any point in combat.
    pub fn submit(&mut self, action: BattleAction) -> Result<Vec<BattleEvent>, BattleError> {
        if let Some(actor) = action.actor() {
            if actor.side != Side::Player {
                return Err(BattleError::IllegalAction(format!(
                    "{actor} is not a player combatant"
                )));
            }
        }
        self.apply(&action)
    }

    /// Lets the AI act for every enemy due before the player's next turn.
    pub fn run_enemy_turns(&mut self) -> Vec<BattleEvent> {
        let mut events = Vec::new();
        while let Some(actor) = self.state.next_actor().filter(|id| id.side == Side::Enemy) {
            let Some(action) = ai_action(&self.state, actor, self.enemy_ai.as_mut(), &mut self.rng)
            else {
                break;
            };
            match self.apply(&action) {
                Ok(step) => events.extend(step),
                Err(err) => {
                    debug!(error = %err, "enemy action rejected");
                    break;
                }
            }
        }
        events
    }

    /// Plays both sides automatically until the battle ends or `max_turns`
    /// rounds have passed.
    pub fn play_out(&mut self, player_ai: &mut dyn BattleAi) -> RunResult {
        let max_turns = self.state.options.max_turns;
        while !self.state.is_over() && self.state.turn <= max_turns {
            let Some(actor) = self.state.next_actor() else {
                break;
            };
            let action = if actor.side == Side::Player {
                ai_action(&self.state, actor, &mut *player_ai, &mut self.rng)
            } else {
                ai_action(&self.state, actor, self.enemy_ai.as_mut(), &mut self.rng)
            };
            let Some(action) = action else {
                break;
            };
            if let Err(err) = self.apply(&action) {
                debug!(error = %err, "automated action rejected");
                break;
            }
        }
        match self.state.phase {
            Phase::Resolved(outcome) => RunResult::Finished(outcome),
            Phase::Fled => RunResult::Fled,
            Phase::Combat => {
                self.logger.log_tie();
                info!(turn = self.state.turn, "battle hit the round cap");
                RunResult::Stalemate
            }
        }
    }

    /// Pays out a resolved battle exactly once. Later calls return `None`.
    pub fn settle(
        &mut self,
        rewards: &mut dyn RewardSink,
        persistence: &mut dyn PersistenceSink,
    ) -> Option<BattleReport> {
        if self.settled {
            return None;
        }
        let report = self.state.report()?;
        if !report.rewards.is_empty() {
            rewards.apply_currency(Currency::Stardust, i64::from(report.rewards.stardust));
            rewards.apply_currency(Currency::Tokens, i64::from(report.rewards.tokens));
            rewards.apply_xp(i64::from(report.rewards.xp));
        }
        for delta in &report.deltas {
            persistence.apply_creature_delta(delta);
        }
        self.settled = true;
        info!(
            outcome = ?report.outcome,
            stardust = report.rewards.stardust,
            xp = report.rewards.xp,
            creatures = report.deltas.len(),
            "battle settled"
        );
        Some(report)
    }

    fn apply(&mut self, action: &BattleAction) -> Result<Vec<BattleEvent>, BattleError> {
        let (next, events) = reduce(&self.state, action, &mut self.rng)?;
        self.state = next;
        self.logger.record(&self.state, &events);
        Ok(events)
    }
}

/// Asks `ai` for a move against the actor's opponents.
fn ai_action(
    state: &BattleState,
    actor: CombatantId,
    ai: &mut dyn BattleAi,
    rng: &mut SmallRng,
) -> Option<BattleAction> {
    let me = state.combatant(actor)?;
    let targets: Vec<_> = state.team(actor.side.opponent()).iter().collect();
    let choice = ai.choose_action(me, &targets, state.context.weather, rng)?;
    Some(BattleAction::Move {
        actor,
        target: choice.target,
        category: choice.category,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::GreedyAi;
    use crate::battle::{BattleOptions, TeamSelect};
    use crate::model::{Creature, Stats};
    use crate::rewards::Difficulty;
    use crate::roster::InMemoryProfile;
    use crate::types::ElementType;

    fn make_creature(id: &str, types: Vec<ElementType>, attack: u32, speed: u32) -> Creature {
        Creature::new(id, id, types, Stats { hp: 60, attack, defense: 50, speed })
    }

    fn start(player: Creature, enemy: Creature) -> BattleEngine {
        let select = TeamSelect::with_opponents(Difficulty::Normal, vec![enemy]);
        let mut rng = SmallRng::seed_from_u64(10);
        let options = BattleOptions {
            fixed_weather: Some(crate::model::Weather::None),
            ..BattleOptions::default()
        };
        let state = select.start(&[player], &options, &mut rng).unwrap();
        BattleEngine::new(state, 10, Box::new(GreedyAi))
    }

    #[test]
    fn enemy_turns_run_until_player_is_due() {
        let mut engine = start(
            make_creature("me", vec![ElementType::Water], 50, 10),
            make_creature("foe", vec![ElementType::Fire], 30, 90),
        );
        assert_eq!(engine.awaiting_player(), None);
        let events = engine.run_enemy_turns();
        assert!(events.iter().any(|e| matches!(e, BattleEvent::Moved { .. })));
        assert_eq!(engine.awaiting_player(), Some(CombatantId::new(Side::Player, 0)));
    }

    #[test]
    fn preview_matches_the_damage_prediction() {
        let engine = start(
            make_creature("me", vec![ElementType::Fire], 50, 90),
            make_creature("foe", vec![ElementType::Grass], 50, 10),
        );
        let me = CombatantId::new(Side::Player, 0);
        let foe = CombatantId::new(Side::Enemy, 0);
        let fire = MoveCategory::Typed(ElementType::Fire);
        let expected = crate::damage::predict_damage(
            &engine.state().player[0],
            &engine.state().enemy[0],
            fire,
            engine.state().context.weather,
        );
        assert_eq!(engine.preview(me, foe, fire), Some(expected));
        // fire into grass: 50/50 * 75 * 2
        assert_eq!(expected, DamageRange { min: 127, max: 150 });
        assert_eq!(engine.preview(me, CombatantId::new(Side::Enemy, 1), fire), None);
    }

    #[test]
    fn submit_rejects_enemy_actors() {
        let mut engine = start(
            make_creature("me", vec![ElementType::Water], 50, 90),
            make_creature("foe", vec![ElementType::Fire], 50, 10),
        );
        let action = BattleAction::Heal {
            actor: CombatantId::new(Side::Enemy, 0),
        };
        assert!(matches!(engine.submit(action), Err(BattleError::IllegalAction(_))));
    }

    #[test]
    fn settle_pays_once_after_a_win() {
        let me = make_creature("me", vec![ElementType::Water], 200, 90);
        let mut engine = start(me.clone(), make_creature("foe", vec![ElementType::Fire], 10, 10));
        let result = engine.play_out(&mut GreedyAi);
        assert_eq!(result, RunResult::Finished(BattleOutcome::Win));

        let mut profile = InMemoryProfile::new(vec![me]);
        let mut sink = profile.clone();
        let report = engine.settle(&mut profile, &mut sink).unwrap();
        assert_eq!(report.rewards.stardust, 15);
        assert_eq!(profile.stardust, 15);
        assert_eq!(profile.tokens, 5);
        assert_eq!(profile.xp, 50);
        assert_eq!(sink.creature("me").unwrap().battles_won, 1);
        assert!(engine.settle(&mut profile, &mut sink).is_none());
        assert_eq!(profile.stardust, 15);
    }

    #[test]
    fn round_cap_reports_stalemate() {
        let mut engine = start(
            make_creature("me", vec![ElementType::Water], 50, 90),
            make_creature("foe", vec![ElementType::Fire], 50, 10),
        );
        let mut state = engine.state().clone();
        state.options.max_turns = 0;
        engine = BattleEngine::new(state, 3, Box::new(GreedyAi));
        assert_eq!(engine.play_out(&mut GreedyAi), RunResult::Stalemate);
        assert_eq!(engine.logger().log_lines().last().map(String::as_str), Some("|tie|"));
    }
}
