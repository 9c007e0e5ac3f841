use crate::battle::{BattleEvent, BattleOutcome, BattleState, CombatantId};
use crate::types::Effectiveness;
use serde_json::json;

/// Pipe-delimited battle log, one protocol line per entry.
#[derive(Clone, Debug, Default)]
pub struct BattleLogger {
    format_id: String,
    log: Vec<String>,
}

impl BattleLogger {
    pub fn new() -> Self {
        Self::new_with_format("creaturebattle")
    }

    pub fn new_with_format(format_id: impl Into<String>) -> Self {
        Self {
            format_id: format_id.into(),
            log: Vec::new(),
        }
    }

    pub fn log_start(&mut self, state: &BattleState) {
        self.log.push(format!(
            "|start|{}|{}",
            state.context.difficulty,
            state.context.weather.label()
        ));
        for c in state.player.iter().chain(state.enemy.iter()) {
            self.log.push(format!(
                "|switch|{}|{}|{}/{}",
                ident(state, c.id),
                c.creature.name,
                c.current_hp,
                c.max_hp()
            ));
        }
        self.log_turn(state.turn);
    }

    pub fn log_turn(&mut self, turn: u32) {
        self.log.push(format!("|turn|{turn}"));
    }

    pub fn log_move(&mut self, source: &str, move_name: &str, target: &str) {
        self.log.push(format!("|move|{source}|{move_name}|{target}"));
    }

    pub fn log_damage(&mut self, target: &str, hp: u32, max_hp: u32) {
        self.log.push(format!("|-damage|{target}|{hp}/{max_hp}"));
    }

    pub fn log_heal(&mut self, target: &str, hp: u32, max_hp: u32) {
        self.log.push(format!("|-heal|{target}|{hp}/{max_hp}"));
    }

    pub fn log_status(&mut self, target: &str, status: &str) {
        self.log.push(format!("|-status|{target}|{status}"));
    }

    pub fn log_win(&mut self, winner: &str) {
        self.log.push(format!("|win|{winner}"));
    }

    pub fn log_tie(&mut self) {
        self.log.push("|tie|".to_string());
    }

    /// Appends the lines for one reducer step. `state` is the state after
    /// the step; names and max HP are looked up there.
    pub fn record(&mut self, state: &BattleState, events: &[BattleEvent]) {
        for event in events {
            match event {
                BattleEvent::TurnStarted { turn } => self.log_turn(*turn),
                BattleEvent::StatusTick {
                    id,
                    status,
                    chip_damage,
                    hp,
                    recovered,
                    ..
                } => {
                    let target = ident(state, *id);
                    if *chip_damage > 0 {
                        let max = max_hp(state, *id);
                        self.log.push(format!("|-damage|{target}|{hp}/{max}|[from] {}", status.label()));
                    }
                    if *recovered {
                        self.log.push(format!("|-curestatus|{target}|{}", status.label()));
                    }
                }
                BattleEvent::Skipped { id, status } => {
                    self.log.push(format!("|cant|{}|{}", ident(state, *id), status.label()));
                }
                BattleEvent::Moved {
                    actor,
                    target,
                    category,
                } => {
                    let source = ident(state, *actor);
                    let target = ident(state, *target);
                    self.log_move(&source, &category.label(), &target);
                }
                BattleEvent::Missed { actor, .. } => {
                    self.log.push(format!("|-miss|{}", ident(state, *actor)));
                }
                BattleEvent::Damaged {
                    target,
                    hp,
                    max_hp,
                    effectiveness,
                    critical,
                    ..
                } => {
                    let target = ident(state, *target);
                    if *critical {
                        self.log.push(format!("|-crit|{target}"));
                    }
                    match effectiveness {
                        Effectiveness::Super => self.log.push(format!("|-supereffective|{target}")),
                        Effectiveness::Weak => self.log.push(format!("|-resisted|{target}")),
                        Effectiveness::Normal => {}
                    }
                    self.log_damage(&target, *hp, *max_hp);
                }
                BattleEvent::Endured { id } => {
                    self.log.push(format!("|-endure|{}", ident(state, *id)));
                }
                BattleEvent::StatusInflicted { id, status } => {
                    let target = ident(state, *id);
                    self.log_status(&target, status.label());
                }
                BattleEvent::Healed { id, hp, max_hp, .. } => {
                    let target = ident(state, *id);
                    self.log_heal(&target, *hp, *max_hp);
                }
                BattleEvent::ItemUsed { id, item } => {
                    self.log.push(format!("|-item|{}|{}", ident(state, *id), item.name()));
                }
                BattleEvent::StatusCured { id, status } => {
                    self.log.push(format!("|-curestatus|{}|{}", ident(state, *id), status.label()));
                }
                BattleEvent::StageRaised { id, stat, change } => {
                    self.log.push(format!("|-boost|{}|{}|{change}", ident(state, *id), stat.label()));
                }
                BattleEvent::Fainted { id } => {
                    self.log.push(format!("|faint|{}", ident(state, *id)));
                }
                BattleEvent::Resolved { outcome } => match outcome {
                    BattleOutcome::Win => self.log_win("player"),
                    BattleOutcome::Lose => self.log_win("enemy"),
                },
                BattleEvent::Fled => self.log.push("|flee|player".to_string()),
            }
        }
    }

    pub fn log_lines(&self) -> &[String] {
        &self.log
    }

    pub fn to_json(&self) -> serde_json::Value {
        json!({
            "formatid": self.format_id,
            "log": self.log,
        })
    }
}

fn max_hp(state: &BattleState, id: CombatantId) -> u32 {
    state.combatant(id).map(|c| c.max_hp()).unwrap_or(0)
}

/// `p1a: Name`, falling back to the bare position for an unknown id.
pub fn ident(state: &BattleState, id: CombatantId) -> String {
    match state.combatant(id) {
        Some(c) => format!("{id}: {}", c.creature.name),
        None => id.to_string(),
    }
}
