use creature_battle_engine::battle::{
    reduce, BattleAction, BattleContext, BattleEvent, BattleOptions, BattleOutcome, BattleState,
    Combatant, CombatantId, Phase, Side, StatusCarryover, TeamSelect,
};
use creature_battle_engine::error::{BattleError, RosterError};
use creature_battle_engine::model::{Creature, MoveCategory, Rarity, Stats, StatusCondition, Weather};
use creature_battle_engine::rewards::{Difficulty, Rewards};
use creature_battle_engine::roster::{RosterSource, SpeciesPool};
use creature_battle_engine::types::ElementType;
use rand::rngs::SmallRng;
use rand::{RngCore, SeedableRng};

fn make_creature(id: &str, hp: u32, attack: u32, speed: u32) -> Creature {
    Creature::new(
        id,
        id,
        vec![ElementType::Normal],
        Stats {
            hp,
            attack,
            defense: 50,
            speed,
        },
    )
}

fn make_combatant(creature: Creature, side: Side, slot: u8) -> Combatant {
    Combatant::new(creature, CombatantId::new(side, slot))
}

/// Never misses: accuracy +1 takes the base miss chance to zero.
fn make_sharpshooter(id: &str, speed: u32, slot: u8) -> Combatant {
    let mut c = make_combatant(make_creature(id, 100, 100, speed), Side::Player, slot);
    c.stages.accuracy = 1;
    c
}

fn make_state(player: Vec<Combatant>, enemy: Vec<Combatant>, difficulty: Difficulty) -> BattleState {
    BattleState::new(
        BattleContext {
            weather: Weather::None,
            difficulty,
            rival: false,
        },
        player,
        enemy,
        BattleOptions::default(),
    )
}

fn fixed_options() -> BattleOptions {
    BattleOptions {
        fixed_weather: Some(Weather::None),
        ..BattleOptions::default()
    }
}

fn attack(actor: CombatantId, target: CombatantId) -> BattleAction {
    BattleAction::Move {
        actor,
        target,
        category: MoveCategory::Basic,
    }
}

struct FlakySource {
    failures_left: u32,
    pool: SpeciesPool,
}

impl RosterSource for FlakySource {
    fn fetch_random(&mut self, rng: &mut dyn RngCore) -> Result<Creature, RosterError> {
        if self.failures_left > 0 {
            self.failures_left -= 1;
            return Err(RosterError::Unavailable("connection reset".into()));
        }
        self.pool.fetch_random(rng)
    }

    fn fetch_by_id(
        &mut self,
        species_id: u32,
        rarity: Option<Rarity>,
        rng: &mut dyn RngCore,
    ) -> Result<Creature, RosterError> {
        self.pool.fetch_by_id(species_id, rarity, rng)
    }
}

fn make_pool() -> SpeciesPool {
    SpeciesPool::from_json_str(
        r#"[{"id": 7, "name": "squirtle", "types": ["water"],
             "stats": {"hp": 44, "attack": 48, "defense": 65, "speed": 43}}]"#,
    )
    .unwrap()
}

#[test]
fn double_battle_continues_until_both_enemies_fall() {
    let p1a = CombatantId::new(Side::Player, 0);
    let p1b = CombatantId::new(Side::Player, 1);
    let p2a = CombatantId::new(Side::Enemy, 0);
    let p2b = CombatantId::new(Side::Enemy, 1);
    let mut foe_a = make_combatant(make_creature("foe-a", 100, 50, 40), Side::Enemy, 0);
    foe_a.current_hp = 1;
    let mut foe_b = make_combatant(make_creature("foe-b", 100, 50, 30), Side::Enemy, 1);
    foe_b.current_hp = 1;
    let state = make_state(
        vec![make_sharpshooter("ace", 90, 0), make_sharpshooter("buddy", 80, 1)],
        vec![foe_a, foe_b],
        Difficulty::Double,
    );
    let mut rng = SmallRng::seed_from_u64(21);

    let (state, events) = reduce(&state, &attack(p1a, p2a), &mut rng).unwrap();
    assert!(events.contains(&BattleEvent::Fainted { id: p2a }));
    assert_eq!(state.phase, Phase::Combat);
    assert_eq!(state.outcome(), None);
    assert_eq!(state.next_actor(), Some(p1b));

    let err = reduce(&state, &attack(p1b, p2a), &mut rng).unwrap_err();
    assert!(matches!(err, BattleError::IllegalAction(_)));

    let (state, _) = reduce(&state, &attack(p1b, p2b), &mut rng).unwrap();
    assert_eq!(state.phase, Phase::Resolved(BattleOutcome::Win));
    let report = state.report().unwrap();
    assert_eq!(report.rewards, Rewards { stardust: 22, tokens: 7, xp: 75 });
    assert_eq!(report.deltas.len(), 2);
    assert!(report.deltas.iter().all(|d| d.friendship == 2 && d.battles_won == 1));
    assert!(report.deltas.iter().all(|d| d.status_override.is_none()));
}

#[test]
fn side_turns_run_fastest_first_then_hand_over() {
    let state = make_state(
        vec![
            make_combatant(make_creature("slow", 100, 50, 30), Side::Player, 0),
            make_combatant(make_creature("fast", 100, 50, 80), Side::Player, 1),
        ],
        vec![
            make_combatant(make_creature("e-slow", 100, 50, 50), Side::Enemy, 0),
            make_combatant(make_creature("e-fast", 100, 50, 60), Side::Enemy, 1),
        ],
        Difficulty::Double,
    );
    let expected = [
        CombatantId::new(Side::Player, 1),
        CombatantId::new(Side::Player, 0),
        CombatantId::new(Side::Enemy, 1),
        CombatantId::new(Side::Enemy, 0),
        CombatantId::new(Side::Player, 1),
    ];
    assert_eq!(state.opener(), Side::Player);
    let mut rng = SmallRng::seed_from_u64(4);
    let mut state = state;
    for (step, id) in expected.iter().enumerate() {
        assert_eq!(state.next_actor(), Some(*id), "step {step}");
        assert_eq!(state.turn, if step < 4 { 1 } else { 2 });
        let (next, _) = reduce(&state, &BattleAction::Heal { actor: *id }, &mut rng).unwrap();
        state = next;
    }
}

#[test]
fn equal_speeds_keep_slot_order() {
    let state = make_state(
        vec![
            make_combatant(make_creature("a", 100, 50, 10), Side::Player, 0),
            make_combatant(make_creature("b", 100, 50, 10), Side::Player, 1),
        ],
        vec![
            make_combatant(make_creature("c", 100, 50, 70), Side::Enemy, 0),
            make_combatant(make_creature("d", 100, 50, 70), Side::Enemy, 1),
        ],
        Difficulty::Double,
    );
    assert_eq!(state.acting_side(), Side::Enemy);
    assert_eq!(
        state.pending(),
        vec![CombatantId::new(Side::Enemy, 0), CombatantId::new(Side::Enemy, 1)]
    );
}

#[test]
fn losing_pays_nothing_and_writes_no_deltas() {
    let mut me = make_combatant(make_creature("me", 100, 50, 10), Side::Player, 0);
    me.current_hp = 1;
    let mut foe = make_combatant(make_creature("foe", 100, 100, 90), Side::Enemy, 0);
    foe.stages.accuracy = 1;
    let state = make_state(vec![me], vec![foe], Difficulty::Hard);
    let mut rng = SmallRng::seed_from_u64(5);
    let (state, _) = reduce(
        &state,
        &attack(CombatantId::new(Side::Enemy, 0), CombatantId::new(Side::Player, 0)),
        &mut rng,
    )
    .unwrap();
    assert_eq!(state.phase, Phase::Resolved(BattleOutcome::Lose));
    let report = state.report().unwrap();
    assert!(report.rewards.is_empty());
    assert!(report.deltas.is_empty());
}

#[test]
fn fleeing_keeps_damage_but_reports_nothing() {
    let state = make_state(
        vec![make_sharpshooter("me", 90, 0)],
        vec![make_combatant(make_creature("foe", 500, 50, 10), Side::Enemy, 0)],
        Difficulty::Normal,
    );
    let mut rng = SmallRng::seed_from_u64(6);
    let me = CombatantId::new(Side::Player, 0);
    let foe = CombatantId::new(Side::Enemy, 0);
    let (state, _) = reduce(&state, &attack(me, foe), &mut rng).unwrap();
    let (state, _) = reduce(&state, &BattleAction::Heal { actor: foe }, &mut rng).unwrap();
    let hp_before_flee = state.enemy[0].current_hp;
    let (state, events) = reduce(&state, &BattleAction::Flee, &mut rng).unwrap();
    assert_eq!(events, vec![BattleEvent::Fled]);
    assert_eq!(state.phase, Phase::Fled);
    assert_eq!(state.enemy[0].current_hp, hp_before_flee);
    assert!(state.report().is_none());
}

#[test]
fn burned_combatant_takes_ten_per_tick_at_eighty_max_hp() {
    let mut me = make_combatant(make_creature("me", 80, 50, 90), Side::Player, 0);
    me.status = StatusCondition::Burn;
    let foe = make_combatant(make_creature("foe", 80, 50, 10), Side::Enemy, 0);
    let state = make_state(vec![me], vec![foe], Difficulty::Normal);
    let mut rng = SmallRng::seed_from_u64(7);
    let me = CombatantId::new(Side::Player, 0);
    let foe = CombatantId::new(Side::Enemy, 0);
    let (state, events) = reduce(&state, &BattleAction::Heal { actor: me }, &mut rng).unwrap();
    assert!(events
        .iter()
        .any(|e| matches!(e, BattleEvent::StatusTick { chip_damage: 10, hp: 70, .. })));
    let (state, _) = reduce(&state, &BattleAction::Heal { actor: foe }, &mut rng).unwrap();
    let (state, _) = reduce(&state, &BattleAction::Heal { actor: me }, &mut rng).unwrap();
    // second tick takes 80 -> 70 again after the heal topped it up
    assert_eq!(state.player[0].current_hp, 80);
    assert_eq!(state.player[0].status, StatusCondition::Burn);
}

#[test]
fn selection_rules_are_enforced() {
    let select = TeamSelect::with_opponents(Difficulty::Normal, vec![make_creature("foe", 50, 50, 50)]);
    let mut rng = SmallRng::seed_from_u64(8);
    let options = fixed_options();

    let two = [make_creature("a", 50, 50, 50), make_creature("b", 50, 50, 50)];
    assert!(matches!(
        select.start(&two, &options, &mut rng),
        Err(BattleError::InvalidSelection(_))
    ));

    let mut archived = make_creature("a", 50, 50, 50);
    archived.is_archived = true;
    assert!(matches!(
        select.start(&[archived], &options, &mut rng),
        Err(BattleError::InvalidSelection(_))
    ));

    let fainted = make_creature("a", 0, 50, 50);
    assert!(matches!(
        select.start(&[fainted], &options, &mut rng),
        Err(BattleError::InvalidSelection(_))
    ));

    let double = TeamSelect::with_opponents(
        Difficulty::Double,
        vec![make_creature("x", 50, 50, 50), make_creature("y", 50, 50, 50)],
    );
    let twins = [make_creature("a", 50, 50, 50), make_creature("a", 50, 50, 50)];
    assert!(matches!(
        double.start(&twins, &options, &mut rng),
        Err(BattleError::InvalidSelection(_))
    ));
    assert!(double.start(&two, &options, &mut rng).is_ok());

    let mut typeless = make_creature("a", 50, 50, 50);
    typeless.types.clear();
    assert!(matches!(
        select.start(&[typeless], &options, &mut rng),
        Err(BattleError::InvalidSelection(_))
    ));
    let mut triple = make_creature("a", 50, 50, 50);
    triple.types = vec![ElementType::Fire, ElementType::Water, ElementType::Grass];
    assert!(matches!(
        select.start(&[triple], &options, &mut rng),
        Err(BattleError::InvalidSelection(_))
    ));
    let mut dual = make_creature("a", 50, 50, 50);
    dual.types = vec![ElementType::Fire, ElementType::Flying];
    assert!(select.start(&[dual], &options, &mut rng).is_ok());
}

#[test]
fn opponents_must_load_before_start_and_failures_are_retryable() {
    let mut select = TeamSelect::new(Difficulty::Double);
    let mut rng = SmallRng::seed_from_u64(9);
    let team = [make_creature("a", 50, 50, 50), make_creature("b", 50, 50, 50)];

    let err = select.start(&team, &fixed_options(), &mut rng).unwrap_err();
    assert!(matches!(err, BattleError::DataUnavailable(_)));

    let mut source = FlakySource {
        failures_left: 1,
        pool: make_pool(),
    };
    let err = select.load_opponents(&mut source, &mut rng).unwrap_err();
    assert!(err.is_retryable());
    assert!(select.opponents().is_none());

    select.load_opponents(&mut source, &mut rng).unwrap();
    assert_eq!(select.opponents().map(|o| o.len()), Some(2));
    let state = select.start(&team, &fixed_options(), &mut rng).unwrap();
    assert_eq!(state.enemy.len(), 2);
    assert!(state.enemy.iter().all(|c| c.creature.species_id == 7));
}

#[test]
fn rival_battles_are_hard_and_scale_enemy_stats() {
    let rival = Creature::new(
        "rival-1",
        "Rival",
        vec![ElementType::Dragon],
        Stats {
            hp: 100,
            attack: 50,
            defense: 50,
            speed: 50,
        },
    );
    let mut select = TeamSelect::rival(rival);
    assert_eq!(select.difficulty(), Difficulty::Hard);
    assert!(select.is_rival());
    assert!(!TeamSelect::new(Difficulty::Hard).is_rival());
    let mut source = FlakySource {
        failures_left: 5,
        pool: make_pool(),
    };
    let mut rng = SmallRng::seed_from_u64(10);
    // no fetch happens for a rival
    select.load_opponents(&mut source, &mut rng).unwrap();
    let state = select
        .start(&[make_creature("me", 50, 50, 50)], &fixed_options(), &mut rng)
        .unwrap();
    assert!(state.context.rival);
    assert_eq!(
        state.enemy[0].creature.stats,
        Stats {
            hp: 130,
            attack: 65,
            defense: 65,
            speed: 65
        }
    );
    assert_eq!(state.enemy[0].current_hp, 130);
}

#[test]
fn status_carryover_policy_controls_starting_status() {
    let mut poisoned = make_creature("me", 80, 50, 90);
    poisoned.status = StatusCondition::Poison;
    let select = TeamSelect::with_opponents(Difficulty::Normal, vec![make_creature("foe", 50, 50, 10)]);
    let mut rng = SmallRng::seed_from_u64(11);

    let reset = select.start(&[poisoned.clone()], &fixed_options(), &mut rng).unwrap();
    assert_eq!(reset.player[0].status, StatusCondition::None);

    let inherit_options = BattleOptions {
        status_carryover: StatusCarryover::Inherit,
        ..fixed_options()
    };
    let mut state = select.start(&[poisoned], &inherit_options, &mut rng).unwrap();
    assert_eq!(state.player[0].status, StatusCondition::Poison);

    state.enemy[0].current_hp = 1;
    state.player[0].stages.accuracy = 1;
    let (state, _) = reduce(
        &state,
        &attack(CombatantId::new(Side::Player, 0), CombatantId::new(Side::Enemy, 0)),
        &mut rng,
    )
    .unwrap();
    assert_eq!(state.phase, Phase::Resolved(BattleOutcome::Win));
    let report = state.report().unwrap();
    assert_eq!(report.deltas[0].status_override, Some(StatusCondition::Poison));
}

#[test]
fn weather_roll_respects_chance_and_fixed_weather() {
    let select = TeamSelect::with_opponents(Difficulty::Normal, vec![make_creature("foe", 50, 50, 10)]);
    let team = [make_creature("me", 50, 50, 50)];
    let always = BattleOptions {
        weather_chance: 1.0,
        ..BattleOptions::default()
    };
    let never = BattleOptions {
        weather_chance: 0.0,
        ..BattleOptions::default()
    };
    let fixed = BattleOptions {
        weather_chance: 1.0,
        fixed_weather: Some(Weather::Sandstorm),
        ..BattleOptions::default()
    };
    for seed in 0..30 {
        let mut rng = SmallRng::seed_from_u64(seed);
        let rolled = select.start(&team, &always, &mut rng).unwrap();
        assert_ne!(rolled.context.weather, Weather::None);
        let calm = select.start(&team, &never, &mut rng).unwrap();
        assert_eq!(calm.context.weather, Weather::None);
        let sand = select.start(&team, &fixed, &mut rng).unwrap();
        assert_eq!(sand.context.weather, Weather::Sandstorm);
    }
}

#[test]
fn easy_difficulty_weakens_opponents() {
    let select = TeamSelect::with_opponents(Difficulty::Easy, vec![make_creature("foe", 50, 50, 50)]);
    let mut rng = SmallRng::seed_from_u64(12);
    let state = select
        .start(&[make_creature("me", 50, 50, 50)], &fixed_options(), &mut rng)
        .unwrap();
    assert_eq!(state.enemy[0].creature.stats.attack, 40);
    assert_eq!(state.enemy[0].max_hp(), 40);
}

#[test]
fn actions_after_resolution_are_illegal() {
    let mut foe = make_combatant(make_creature("foe", 100, 50, 10), Side::Enemy, 0);
    foe.current_hp = 1;
    let state = make_state(vec![make_sharpshooter("me", 90, 0)], vec![foe], Difficulty::Normal);
    let mut rng = SmallRng::seed_from_u64(13);
    let me = CombatantId::new(Side::Player, 0);
    let (state, _) = reduce(&state, &attack(me, CombatantId::new(Side::Enemy, 0)), &mut rng).unwrap();
    assert!(state.is_over());
    assert_eq!(state.next_actor(), None);
    let frozen = state.clone();
    assert!(reduce(&state, &BattleAction::Heal { actor: me }, &mut rng).is_err());
    assert_eq!(state, frozen);
}

fn make_fire_striker() -> Combatant {
    let mut creature = make_creature("ember", 100, 100, 90);
    creature.types = vec![ElementType::Fire];
    make_combatant(creature, Side::Player, 0)
}

fn fire_strike() -> BattleAction {
    BattleAction::Move {
        actor: CombatantId::new(Side::Player, 0),
        target: CombatantId::new(Side::Enemy, 0),
        category: MoveCategory::Typed(ElementType::Fire),
    }
}

#[test]
fn fire_strikes_burn_about_a_fifth_of_landed_hits() {
    let foe = make_combatant(make_creature("wall", 10_000, 10, 10), Side::Enemy, 0);
    let state = make_state(vec![make_fire_striker()], vec![foe], Difficulty::Normal);
    let mut rng = SmallRng::seed_from_u64(31);
    let mut landed = 0;
    let mut burned = 0;
    for _ in 0..4000 {
        let (next, events) = reduce(&state, &fire_strike(), &mut rng).unwrap();
        let missed = events.iter().any(|e| matches!(e, BattleEvent::Missed { .. }));
        let inflicted = events.iter().any(|e| {
            matches!(
                e,
                BattleEvent::StatusInflicted {
                    status: StatusCondition::Burn,
                    ..
                }
            )
        });
        if missed {
            assert!(!inflicted);
            assert_eq!(next.enemy[0].status, StatusCondition::None);
            continue;
        }
        landed += 1;
        if inflicted {
            burned += 1;
            assert_eq!(next.enemy[0].status, StatusCondition::Burn);
        }
    }
    assert!(landed > 3000, "landed {landed}");
    let rate = burned as f64 / landed as f64;
    assert!((rate - 0.20).abs() < 0.04, "burn rate {rate}");
}

#[test]
fn knocked_out_targets_are_never_burned() {
    let mut foe = make_combatant(make_creature("frail", 100, 10, 10), Side::Enemy, 0);
    foe.current_hp = 1;
    let state = make_state(vec![make_fire_striker()], vec![foe], Difficulty::Normal);
    let mut rng = SmallRng::seed_from_u64(32);
    for _ in 0..500 {
        let (next, events) = reduce(&state, &fire_strike(), &mut rng).unwrap();
        assert!(!events
            .iter()
            .any(|e| matches!(e, BattleEvent::StatusInflicted { .. })));
        assert_eq!(next.enemy[0].status, StatusCondition::None);
    }
}

#[test]
fn loyal_defender_endures_a_lethal_hit_at_one_hp() {
    let mut loyal = make_creature("loyal", 100, 10, 10);
    loyal.friendship = 255;
    let mut foe = make_combatant(loyal, Side::Enemy, 0);
    foe.current_hp = 10;
    let state = make_state(vec![make_sharpshooter("ace", 90, 0)], vec![foe], Difficulty::Normal);
    let me = CombatantId::new(Side::Player, 0);
    let target = CombatantId::new(Side::Enemy, 0);
    let mut rng = SmallRng::seed_from_u64(33);
    let mut endured = 0;
    for _ in 0..2000 {
        let (next, events) = reduce(&state, &attack(me, target), &mut rng).unwrap();
        if events.contains(&BattleEvent::Endured { id: target }) {
            endured += 1;
            assert_eq!(next.enemy[0].current_hp, 1);
            assert_eq!(next.phase, Phase::Combat);
            assert!(events.iter().any(|e| matches!(
                e,
                BattleEvent::Damaged { target: t, amount: 9, hp: 1, .. } if *t == target
            )));
            assert!(!events.contains(&BattleEvent::Fainted { id: target }));
        } else {
            assert!(next.enemy[0].is_fainted());
            assert_eq!(next.phase, Phase::Resolved(BattleOutcome::Win));
        }
    }
    let rate = endured as f64 / 2000.0;
    assert!((rate - 0.51).abs() < 0.05, "endure rate {rate}");
}
