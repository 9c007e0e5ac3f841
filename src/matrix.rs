use crate::ai::BattlePolicy;
use crate::battle::{BattleOptions, BattleOutcome, TeamSelect};
use crate::battle_logger::BattleLogger;
use crate::engine::{BattleEngine, RunResult};
use crate::error::BattleError;
use crate::model::{Creature, RosterFile};
use crate::rewards::Difficulty;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use tracing::debug;

#[derive(Clone, Debug, Default)]
pub struct SimulationOptions {
    /// Drives the row creature.
    pub policy_a: BattlePolicy,
    /// Drives the column creature.
    pub policy_b: BattlePolicy,
    pub battle: BattleOptions,
    pub difficulty: Difficulty,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SimulationResult {
    PlayerWins,
    EnemyWins,
    Stalemate,
}

impl From<RunResult> for SimulationResult {
    fn from(result: RunResult) -> Self {
        match result {
            RunResult::Finished(BattleOutcome::Win) => SimulationResult::PlayerWins,
            RunResult::Finished(BattleOutcome::Lose) => SimulationResult::EnemyWins,
            RunResult::Fled | RunResult::Stalemate => SimulationResult::Stalemate,
        }
    }
}

/// One seeded AI-vs-AI battle, `a` on the player side. Returns the log too.
pub fn replay_battle(
    a: &Creature,
    b: &Creature,
    seed: u64,
    sim: &SimulationOptions,
) -> Result<(SimulationResult, BattleLogger), BattleError> {
    let mut rng = SmallRng::seed_from_u64(seed);
    let select = TeamSelect::with_opponents(sim.difficulty, vec![b.clone()]);
    let state = select.start(std::slice::from_ref(a), &sim.battle, &mut rng)?;
    let mut engine = BattleEngine::with_rng(state, rng, sim.policy_b.build());
    let mut player_ai = sim.policy_a.build();
    let result = SimulationResult::from(engine.play_out(player_ai.as_mut()));
    debug!(a = %a.id, b = %b.id, seed, result = ?result, "simulated battle");
    Ok((result, engine.logger().clone()))
}

pub fn simulate_battle(
    a: &Creature,
    b: &Creature,
    seed: u64,
    sim: &SimulationOptions,
) -> Result<SimulationResult, BattleError> {
    replay_battle(a, b, seed, sim).map(|(result, _)| result)
}

/// Per-cell RNG; the n-th draw is the seed of the cell's n-th battle.
pub fn cell_rng(seed: u64, a_idx: usize, b_idx: usize) -> SmallRng {
    SmallRng::seed_from_u64(seed ^ ((a_idx as u64) << 32) ^ (b_idx as u64))
}

/// Row creature's win rate against each column creature. Stalemates count half.
pub fn compute_matrix(
    roster_a: &[Creature],
    roster_b: &[Creature],
    sims_per_cell: usize,
    seed: u64,
    sim: &SimulationOptions,
) -> Result<Vec<Vec<f64>>, BattleError> {
    let tasks: Vec<(usize, usize)> = (0..roster_a.len())
        .flat_map(|a| (0..roster_b.len()).map(move |b| (a, b)))
        .collect();
    let cell_results: Vec<CellResult> = tasks
        .par_iter()
        .map(|&(a_idx, b_idx)| -> Result<CellResult, BattleError> {
            let mut rng = cell_rng(seed, a_idx, b_idx);
            let mut wins = 0u64;
            let mut stalemates = 0u64;
            for _ in 0..sims_per_cell {
                let battle_seed = rng.gen();
                match simulate_battle(&roster_a[a_idx], &roster_b[b_idx], battle_seed, sim)? {
                    SimulationResult::PlayerWins => wins += 1,
                    SimulationResult::EnemyWins => {}
                    SimulationResult::Stalemate => stalemates += 1,
                }
            }
            let total = sims_per_cell.max(1) as f64;
            Ok(CellResult {
                a_idx,
                b_idx,
                win_rate: (wins as f64 + 0.5 * stalemates as f64) / total,
            })
        })
        .collect::<Result<_, _>>()?;

    let mut matrix = vec![vec![0.0; roster_b.len()]; roster_a.len()];
    for cell in cell_results {
        matrix[cell.a_idx][cell.b_idx] = cell.win_rate;
    }
    Ok(matrix)
}

/// Header row of column names, then one row per row creature.
pub fn render_csv(matrix: &[Vec<f64>], rows: &[Creature], cols: &[Creature]) -> String {
    let mut out = String::from("creature");
    for c in cols {
        out.push(',');
        out.push_str(&c.name);
    }
    for (row_idx, row) in matrix.iter().enumerate() {
        out.push('\n');
        out.push_str(rows.get(row_idx).map(|c| c.name.as_str()).unwrap_or(""));
        for value in row {
            out.push_str(&format!(",{value:.4}"));
        }
    }
    out
}

pub fn write_csv(
    matrix: &[Vec<f64>],
    rows: &[Creature],
    cols: &[Creature],
    path: &std::path::Path,
) -> anyhow::Result<()> {
    std::fs::write(path, render_csv(matrix, rows, cols))?;
    Ok(())
}

struct CellResult {
    a_idx: usize,
    b_idx: usize,
    win_rate: f64,
}

pub fn validate_roster(roster: &RosterFile) -> anyhow::Result<()> {
    if roster.creatures.is_empty() {
        anyhow::bail!("Roster contains no creatures");
    }
    if let Some(c) = roster.creatures.iter().find(|c| !c.is_battle_ready()) {
        anyhow::bail!("Creature {} ({}) cannot battle: no HP or archived", c.name, c.id);
    }
    if let Some(c) = roster.creatures.iter().find(|c| !c.has_valid_types()) {
        anyhow::bail!(
            "Creature {} ({}) has {} types, expected one or two",
            c.name,
            c.id,
            c.types.len()
        );
    }
    Ok(())
}
