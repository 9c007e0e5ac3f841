//! Battle state machine.
//!
//! [`TeamSelect`] validates the player's picks and holds the fetched
//! opponents. [`TeamSelect::start`] produces a [`BattleState`], a plain value
//! advanced one action at a time by [`reduce`]. The reducer never touches the
//! caller's state: a rejected action leaves it exactly as it was.
//!
//! Turn order is side by side. Every living combatant of the acting side acts
//! once, fastest first, then the other side does the same. `turn` counts
//! rounds and ticks over when the side that opened the battle is up again.

use crate::damage::{self, DamageContext, DamageRange, DEFAULT_CRIT_CHANCE};
use crate::error::BattleError;
use crate::faint::prevent_ko_if_applicable;
use crate::items::BattleItem;
use crate::model::{BuffStat, Creature, MoveCategory, StageBuffs, StatusCondition, Weather};
use crate::rewards::{build_report, BattleReport, Difficulty};
use crate::roster::RosterSource;
use crate::stats::{effective_stat, Stat};
use crate::status;
use crate::types::Effectiveness;
use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::collections::{HashSet, VecDeque};
use std::fmt;
use tracing::{debug, info, warn};

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Player,
    Enemy,
}

impl Side {
    pub fn opponent(self) -> Side {
        match self {
            Side::Player => Side::Enemy,
            Side::Enemy => Side::Player,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct CombatantId {
    pub side: Side,
    pub slot: u8,
}

impl CombatantId {
    pub fn new(side: Side, slot: u8) -> Self {
        Self { side, slot }
    }
}

impl fmt::Display for CombatantId {
    /// `p1a`, `p1b` for the player, `p2a`, `p2b` for the enemy.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let side = match self.side {
            Side::Player => "p1",
            Side::Enemy => "p2",
        };
        let position = (b'a' + self.slot) as char;
        write!(f, "{side}{position}")
    }
}

/// A creature inside a battle. Stats come from the snapshot; HP, status and
/// stages live here and are dropped when the battle ends.
#[derive(Clone, Debug, PartialEq)]
pub struct Combatant {
    pub id: CombatantId,
    pub creature: Creature,
    pub current_hp: u32,
    pub status: StatusCondition,
    pub stages: StageBuffs,
}

impl Combatant {
    pub fn new(creature: Creature, id: CombatantId) -> Self {
        Self {
            id,
            current_hp: creature.stats.hp,
            creature,
            status: StatusCondition::None,
            stages: StageBuffs::default(),
        }
    }

    pub fn max_hp(&self) -> u32 {
        self.creature.stats.hp
    }

    pub fn is_fainted(&self) -> bool {
        self.current_hp == 0
    }

    /// Returns the HP actually lost.
    pub fn apply_damage(&mut self, amount: u32) -> u32 {
        let lost = amount.min(self.current_hp);
        self.current_hp -= lost;
        lost
    }

    /// Returns the HP actually restored.
    pub fn restore_hp(&mut self, amount: u32) -> u32 {
        let gained = amount.min(self.max_hp().saturating_sub(self.current_hp));
        self.current_hp += gained;
        gained
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct BattleContext {
    pub weather: Weather,
    pub difficulty: Difficulty,
    pub rival: bool,
}

/// Whether a creature's persisted status follows it into battle.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusCarryover {
    /// Every battle starts status-free.
    #[default]
    Reset,
    /// Start with the persisted status and report the final one on a win.
    Inherit,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BattleOptions {
    pub status_carryover: StatusCarryover,
    pub weather_chance: f64,
    /// Skips the weather roll.
    pub fixed_weather: Option<Weather>,
    /// Round cap for automated drivers; the reducer ignores it.
    pub max_turns: u32,
    pub base_crit_chance: f64,
}

impl Default for BattleOptions {
    fn default() -> Self {
        Self {
            status_carryover: StatusCarryover::Reset,
            weather_chance: 0.3,
            fixed_weather: None,
            max_turns: 200,
            base_crit_chance: DEFAULT_CRIT_CHANCE,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BattleOutcome {
    Win,
    Lose,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Combat,
    Resolved(BattleOutcome),
    Fled,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum BattleAction {
    Move {
        actor: CombatantId,
        target: CombatantId,
        category: MoveCategory,
    },
    Heal {
        actor: CombatantId,
    },
    UseItem {
        actor: CombatantId,
        item: BattleItem,
    },
    Flee,
}

impl BattleAction {
    pub fn actor(&self) -> Option<CombatantId> {
        match *self {
            BattleAction::Move { actor, .. }
            | BattleAction::Heal { actor }
            | BattleAction::UseItem { actor, .. } => Some(actor),
            BattleAction::Flee => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum BattleEvent {
    TurnStarted {
        turn: u32,
    },
    StatusTick {
        id: CombatantId,
        status: StatusCondition,
        chip_damage: u32,
        hp: u32,
        /// Woke up or thawed out.
        recovered: bool,
        message: Option<String>,
    },
    Skipped {
        id: CombatantId,
        status: StatusCondition,
    },
    Moved {
        actor: CombatantId,
        target: CombatantId,
        category: MoveCategory,
    },
    Missed {
        actor: CombatantId,
        target: CombatantId,
    },
    Damaged {
        target: CombatantId,
        amount: u32,
        hp: u32,
        max_hp: u32,
        effectiveness: Effectiveness,
        critical: bool,
    },
    Endured {
        id: CombatantId,
    },
    StatusInflicted {
        id: CombatantId,
        status: StatusCondition,
    },
    Healed {
        id: CombatantId,
        amount: u32,
        hp: u32,
        max_hp: u32,
    },
    ItemUsed {
        id: CombatantId,
        item: BattleItem,
    },
    StatusCured {
        id: CombatantId,
        status: StatusCondition,
    },
    StageRaised {
        id: CombatantId,
        stat: BuffStat,
        change: i8,
    },
    Fainted {
        id: CombatantId,
    },
    Resolved {
        outcome: BattleOutcome,
    },
    Fled,
}

/// Phase one: the player's picks and the opponents they will face.
#[derive(Clone, Debug)]
pub struct TeamSelect {
    difficulty: Difficulty,
    rival: bool,
    opponents: Option<Vec<Creature>>,
}

impl TeamSelect {
    pub fn new(difficulty: Difficulty) -> Self {
        Self {
            difficulty,
            rival: false,
            opponents: None,
        }
    }

    /// Rival battles are always hard and need no roster fetch.
    pub fn rival(creature: Creature) -> Self {
        Self {
            difficulty: Difficulty::Hard,
            rival: true,
            opponents: Some(vec![creature]),
        }
    }

    /// Opponents supplied up front, as in simulations.
    pub fn with_opponents(difficulty: Difficulty, opponents: Vec<Creature>) -> Self {
        Self {
            difficulty,
            rival: false,
            opponents: Some(opponents),
        }
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn team_size(&self) -> usize {
        self.difficulty.team_size()
    }

    pub fn is_rival(&self) -> bool {
        self.rival
    }

    pub fn opponents(&self) -> Option<&[Creature]> {
        self.opponents.as_deref()
    }

    /// Fetches `team_size` random opponents. On failure nothing is replaced
    /// and the call may simply be retried.
    pub fn load_opponents<S: RosterSource + ?Sized>(
        &mut self,
        source: &mut S,
        rng: &mut dyn RngCore,
    ) -> Result<(), BattleError> {
        if self.rival {
            return Ok(());
        }
        let size = self.team_size();
        let mut fetched = Vec::with_capacity(size);
        for _ in 0..size {
            match source.fetch_random(rng) {
                Ok(creature) => fetched.push(creature),
                Err(err) => {
                    warn!(error = %err, difficulty = %self.difficulty, "opponent fetch failed");
                    return Err(err.into());
                }
            }
        }
        debug!(count = fetched.len(), "opponents loaded");
        self.opponents = Some(fetched);
        Ok(())
    }

    pub fn start<R: Rng + ?Sized>(
        &self,
        player_team: &[Creature],
        options: &BattleOptions,
        rng: &mut R,
    ) -> Result<BattleState, BattleError> {
        let size = self.team_size();
        if player_team.len() != size {
            return Err(BattleError::InvalidSelection(format!(
                "expected {size} creature(s), got {}",
                player_team.len()
            )));
        }
        let mut seen = HashSet::new();
        for creature in player_team {
            if !seen.insert(creature.id.as_str()) {
                return Err(BattleError::InvalidSelection(format!(
                    "{} was selected more than once",
                    creature.name
                )));
            }
            if creature.is_archived {
                return Err(BattleError::InvalidSelection(format!(
                    "{} is archived",
                    creature.name
                )));
            }
            if creature.stats.hp == 0 {
                return Err(BattleError::InvalidSelection(format!(
                    "{} has no HP",
                    creature.name
                )));
            }
            if !creature.has_valid_types() {
                return Err(BattleError::InvalidSelection(format!(
                    "{} has {} types, expected one or two",
                    creature.name,
                    creature.types.len()
                )));
            }
        }
        let opponents = self.opponents.as_ref().ok_or_else(|| {
            BattleError::DataUnavailable("opponents have not been loaded".to_string())
        })?;
        if opponents.len() != size {
            return Err(BattleError::DataUnavailable(format!(
                "expected {size} opponent(s), loaded {}",
                opponents.len()
            )));
        }

        let carryover = options.status_carryover;
        let player = player_team
            .iter()
            .enumerate()
            .map(|(slot, c)| snapshot(c.clone(), CombatantId::new(Side::Player, slot as u8), carryover))
            .collect();
        let mult = self.difficulty.enemy_stat_multiplier();
        let enemy = opponents
            .iter()
            .enumerate()
            .map(|(slot, c)| {
                let mut scaled = c.clone();
                scaled.stats = c.stats.scaled(mult);
                scaled.stats.hp = scaled.stats.hp.max(1);
                snapshot(scaled, CombatantId::new(Side::Enemy, slot as u8), carryover)
            })
            .collect();

        let context = BattleContext {
            weather: roll_weather(options, rng),
            difficulty: self.difficulty,
            rival: self.rival,
        };
        Ok(BattleState::new(context, player, enemy, options.clone()))
    }
}

fn snapshot(creature: Creature, id: CombatantId, carryover: StatusCarryover) -> Combatant {
    let status = match carryover {
        StatusCarryover::Inherit => creature.status,
        StatusCarryover::Reset => StatusCondition::None,
    };
    let mut combatant = Combatant::new(creature, id);
    combatant.status = status;
    combatant
}

pub fn roll_weather<R: Rng + ?Sized>(options: &BattleOptions, rng: &mut R) -> Weather {
    if let Some(weather) = options.fixed_weather {
        return weather;
    }
    if rng.gen::<f64>() < options.weather_chance {
        Weather::ACTIVE[rng.gen_range(0..Weather::ACTIVE.len())]
    } else {
        Weather::None
    }
}

#[derive(Clone, Debug, PartialEq)]
struct TurnCursor {
    side: Side,
    queue: VecDeque<CombatantId>,
}

/// Phases two and three: combat, then a terminal phase.
#[derive(Clone, Debug, PartialEq)]
pub struct BattleState {
    pub context: BattleContext,
    pub player: Vec<Combatant>,
    pub enemy: Vec<Combatant>,
    pub turn: u32,
    pub phase: Phase,
    pub options: BattleOptions,
    opener: Side,
    cursor: TurnCursor,
}

impl BattleState {
    /// Combatant ids are reassigned from each team's order.
    pub fn new(
        context: BattleContext,
        mut player: Vec<Combatant>,
        mut enemy: Vec<Combatant>,
        options: BattleOptions,
    ) -> Self {
        for (slot, c) in player.iter_mut().enumerate() {
            c.id = CombatantId::new(Side::Player, slot as u8);
        }
        for (slot, c) in enemy.iter_mut().enumerate() {
            c.id = CombatantId::new(Side::Enemy, slot as u8);
        }
        let mut state = BattleState {
            context,
            player,
            enemy,
            turn: 1,
            phase: Phase::Combat,
            options,
            opener: Side::Player,
            cursor: TurnCursor {
                side: Side::Player,
                queue: VecDeque::new(),
            },
        };
        if let Some(outcome) = state.outcome() {
            state.phase = Phase::Resolved(outcome);
            return state;
        }
        let opener = state.initiative();
        state.opener = opener;
        state.cursor = TurnCursor {
            side: opener,
            queue: state.side_order(opener),
        };
        info!(
            difficulty = %context.difficulty,
            weather = context.weather.label(),
            rival = context.rival,
            opener = ?opener,
            "battle started"
        );
        state
    }

    pub fn team(&self, side: Side) -> &[Combatant] {
        match side {
            Side::Player => &self.player,
            Side::Enemy => &self.enemy,
        }
    }

    fn team_mut(&mut self, side: Side) -> &mut Vec<Combatant> {
        match side {
            Side::Player => &mut self.player,
            Side::Enemy => &mut self.enemy,
        }
    }

    pub fn combatant(&self, id: CombatantId) -> Option<&Combatant> {
        self.team(id.side).get(usize::from(id.slot))
    }

    fn combatant_mut(&mut self, id: CombatantId) -> Option<&mut Combatant> {
        self.team_mut(id.side).get_mut(usize::from(id.slot))
    }

    pub fn living(&self, side: Side) -> impl Iterator<Item = &Combatant> {
        self.team(side).iter().filter(|c| !c.is_fainted())
    }

    /// Derived from HP alone, so it can never disagree with the teams.
    pub fn outcome(&self) -> Option<BattleOutcome> {
        if self.enemy.iter().all(Combatant::is_fainted) {
            Some(BattleOutcome::Win)
        } else if self.player.iter().all(Combatant::is_fainted) {
            Some(BattleOutcome::Lose)
        } else {
            None
        }
    }

    pub fn is_over(&self) -> bool {
        self.phase != Phase::Combat
    }

    /// The side whose fastest living combatant is faster; ties favour the player.
    pub fn initiative(&self) -> Side {
        let weather = self.context.weather;
        let fastest = |side| {
            self.living(side)
                .map(|c| effective_stat(c, Stat::Speed, weather))
                .max()
                .unwrap_or(0)
        };
        if fastest(Side::Enemy) > fastest(Side::Player) {
            Side::Enemy
        } else {
            Side::Player
        }
    }

    /// Side that opened the battle; `turn` advances whenever it is up again.
    pub fn opener(&self) -> Side {
        self.opener
    }

    pub fn acting_side(&self) -> Side {
        self.cursor.side
    }

    pub fn next_actor(&self) -> Option<CombatantId> {
        if self.is_over() {
            return None;
        }
        self.cursor.queue.front().copied()
    }

    /// Still to act this side turn, in order.
    pub fn pending(&self) -> Vec<CombatantId> {
        self.cursor.queue.iter().copied().collect()
    }

    pub fn damage_context(&self) -> DamageContext {
        DamageContext {
            weather: self.context.weather,
            base_crit_chance: self.options.base_crit_chance,
        }
    }

    pub fn preview(
        &self,
        actor: CombatantId,
        target: CombatantId,
        category: MoveCategory,
    ) -> Option<DamageRange> {
        let attacker = self.combatant(actor)?;
        let defender = self.combatant(target)?;
        Some(damage::predict_damage(
            attacker,
            defender,
            category,
            self.context.weather,
        ))
    }

    pub fn report(&self) -> Option<BattleReport> {
        build_report(self)
    }

    /// Living members of `side`, fastest first; equal speeds keep slot order.
    fn side_order(&self, side: Side) -> VecDeque<CombatantId> {
        let weather = self.context.weather;
        let mut order: Vec<(u32, CombatantId)> = self
            .living(side)
            .map(|c| (effective_stat(c, Stat::Speed, weather), c.id))
            .collect();
        order.sort_by_key(|&(speed, _)| Reverse(speed));
        order.into_iter().map(|(_, id)| id).collect()
    }

    fn validate(&self, action: &BattleAction) -> Result<(), BattleError> {
        if self.is_over() {
            return Err(BattleError::IllegalAction(format!(
                "battle is no longer in combat ({:?})",
                self.phase
            )));
        }
        let Some(actor_id) = action.actor() else {
            return Ok(());
        };
        let actor = self
            .combatant(actor_id)
            .ok_or_else(|| BattleError::IllegalAction(format!("no combatant at {actor_id}")))?;
        if actor.is_fainted() {
            return Err(BattleError::IllegalAction(format!(
                "{} is defeated",
                actor.creature.name
            )));
        }
        if self.next_actor() != Some(actor_id) {
            return Err(BattleError::IllegalAction(format!(
                "it is not {}'s turn",
                actor.creature.name
            )));
        }
        if let BattleAction::Move {
            target, category, ..
        } = *action
        {
            if target.side == actor_id.side {
                return Err(BattleError::IllegalAction(format!(
                    "{} cannot attack its own side",
                    actor.creature.name
                )));
            }
            let defender = self
                .combatant(target)
                .ok_or_else(|| BattleError::IllegalAction(format!("no combatant at {target}")))?;
            if defender.is_fainted() {
                return Err(BattleError::IllegalAction(format!(
                    "{} is already defeated",
                    defender.creature.name
                )));
            }
            if let MoveCategory::Typed(t) = category {
                if !actor.creature.types.contains(&t) {
                    return Err(BattleError::IllegalAction(format!(
                        "{} cannot use {}",
                        actor.creature.name,
                        category.label()
                    )));
                }
            }
        }
        Ok(())
    }

    fn resolve_if_over(&mut self, events: &mut Vec<BattleEvent>) -> bool {
        match self.outcome() {
            Some(outcome) => {
                self.phase = Phase::Resolved(outcome);
                events.push(BattleEvent::Resolved { outcome });
                info!(outcome = ?outcome, turn = self.turn, "battle resolved");
                true
            }
            None => false,
        }
    }

    /// Runs the actor's status tick. Returns whether it may still act.
    fn tick_status<R: Rng + ?Sized>(
        &mut self,
        id: CombatantId,
        rng: &mut R,
        events: &mut Vec<BattleEvent>,
    ) -> bool {
        let Some(actor) = self.combatant_mut(id) else {
            return false;
        };
        let before = actor.status;
        let tick = status::tick(actor, rng);
        actor.status = tick.next_status;
        let chip = actor.apply_damage(tick.chip_damage);
        let fainted = actor.is_fainted();
        let hp = actor.current_hp;
        if chip > 0 || tick.message.is_some() {
            debug!(combatant = %id, status = before.label(), chip, "status tick");
            events.push(BattleEvent::StatusTick {
                id,
                status: before,
                chip_damage: chip,
                hp,
                recovered: !before.is_none() && tick.next_status.is_none(),
                message: tick.message.clone(),
            });
        }
        if fainted {
            events.push(BattleEvent::Fainted { id });
            self.resolve_if_over(events);
            return false;
        }
        if !tick.can_act {
            events.push(BattleEvent::Skipped { id, status: before });
            return false;
        }
        true
    }

    fn resolve_move<R: Rng + ?Sized>(
        &mut self,
        actor: CombatantId,
        target: CombatantId,
        category: MoveCategory,
        rng: &mut R,
        events: &mut Vec<BattleEvent>,
    ) {
        let ctx = self.damage_context();
        let (Some(attacker), Some(defender)) = (self.combatant(actor), self.combatant(target)) else {
            return;
        };
        let outcome = damage::resolve_attack(attacker, defender, category, &ctx, rng);
        events.push(BattleEvent::Moved {
            actor,
            target,
            category,
        });
        debug!(
            attacker = %actor,
            defender = %target,
            category = %category.label(),
            damage = outcome.damage,
            miss = outcome.is_miss,
            crit = outcome.is_critical,
            "attack resolved"
        );
        if outcome.is_miss {
            events.push(BattleEvent::Missed { actor, target });
            return;
        }
        let (damage, endured) = prevent_ko_if_applicable(defender, outcome.damage, rng);

        let Some(defender) = self.combatant_mut(target) else {
            return;
        };
        let dealt = defender.apply_damage(damage);
        events.push(BattleEvent::Damaged {
            target,
            amount: dealt,
            hp: defender.current_hp,
            max_hp: defender.max_hp(),
            effectiveness: outcome.effectiveness,
            critical: outcome.is_critical,
        });
        if endured {
            events.push(BattleEvent::Endured { id: target });
        }
        if defender.is_fainted() {
            events.push(BattleEvent::Fainted { id: target });
            self.resolve_if_over(events);
            return;
        }
        if let Some(inflicted) = status::try_inflict(category, defender, rng) {
            defender.status = inflicted;
            events.push(BattleEvent::StatusInflicted {
                id: target,
                status: inflicted,
            });
        }
    }

    fn resolve_heal(&mut self, id: CombatantId, events: &mut Vec<BattleEvent>) {
        let Some(actor) = self.combatant_mut(id) else {
            return;
        };
        let amount = actor.restore_hp(actor.max_hp() / 2);
        events.push(BattleEvent::Healed {
            id,
            amount,
            hp: actor.current_hp,
            max_hp: actor.max_hp(),
        });
    }

    fn resolve_item(&mut self, id: CombatantId, item: BattleItem, events: &mut Vec<BattleEvent>) {
        let Some(actor) = self.combatant_mut(id) else {
            return;
        };
        events.push(BattleEvent::ItemUsed { id, item });
        match item.boosted_stat() {
            Some(stat) => {
                let change = actor.stages.raise(stat, 1);
                events.push(BattleEvent::StageRaised { id, stat, change });
            }
            None => {
                if !actor.status.is_none() {
                    let cured = actor.status;
                    actor.status = StatusCondition::None;
                    events.push(BattleEvent::StatusCured { id, status: cured });
                }
            }
        }
    }

    /// Drops the actor that just went and any queued combatant that fell,
    /// handing over to the other side when the queue runs dry.
    fn advance(&mut self, events: &mut Vec<BattleEvent>) {
        self.cursor.queue.pop_front();
        loop {
            while let Some(&id) = self.cursor.queue.front() {
                if self.combatant(id).is_some_and(|c| !c.is_fainted()) {
                    return;
                }
                self.cursor.queue.pop_front();
            }
            let side = self.cursor.side.opponent();
            if side == self.opener {
                self.turn += 1;
                events.push(BattleEvent::TurnStarted { turn: self.turn });
            }
            let queue = self.side_order(side);
            let empty = queue.is_empty();
            self.cursor = TurnCursor { side, queue };
            if empty {
                return;
            }
        }
    }
}

/// Applies one action to `state`, returning the next state and what happened.
///
/// RNG draws happen in a fixed order: status tick, accuracy, crit, variance,
/// endure, infliction. Replaying the same actions against the same seed
/// reproduces the battle exactly.
pub fn reduce<R: Rng + ?Sized>(
    state: &BattleState,
    action: &BattleAction,
    rng: &mut R,
) -> Result<(BattleState, Vec<BattleEvent>), BattleError> {
    state.validate(action)?;
    let mut next = state.clone();
    let mut events = Vec::new();

    let Some(actor) = action.actor() else {
        next.phase = Phase::Fled;
        events.push(BattleEvent::Fled);
        info!(turn = next.turn, "player fled");
        return Ok((next, events));
    };

    if next.tick_status(actor, rng, &mut events) {
        match *action {
            BattleAction::Move {
                target, category, ..
            } => next.resolve_move(actor, target, category, rng, &mut events),
            BattleAction::Heal { .. } => next.resolve_heal(actor, &mut events),
            BattleAction::UseItem { item, .. } => next.resolve_item(actor, item, &mut events),
            BattleAction::Flee => {}
        }
    }
    if !next.is_over() {
        next.advance(&mut events);
    }
    Ok((next, events))
}
